use crate::dataset::DEFAULT_EXTENSIONS;
use crate::pipeline::PipelineStage;

/// ImageNet channel statistics on 0-255 pixel values.
pub(super) const IMAGENET_MEAN: [f32; 3] = [123.675, 116.28, 103.53];
pub(super) const IMAGENET_STD: [f32; 3] = [58.395, 57.12, 57.375];

pub(super) fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}

pub(super) fn default_pipeline() -> Vec<PipelineStage> {
    vec![
        PipelineStage::LoadImageFromFile,
        PipelineStage::Resize { size: [256, 256] },
        PipelineStage::CenterCrop {
            crop_size: [224, 224],
        },
        PipelineStage::Normalize {
            mean: IMAGENET_MEAN,
            std: IMAGENET_STD,
            to_rgb: true,
        },
        PipelineStage::ImageToTensor,
    ]
}
