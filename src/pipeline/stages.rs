use serde::{Deserialize, Serialize};

/// A recognized preprocessing stage.
///
/// Stages are tagged by `type` in config files:
///
/// ```toml
/// [[pipeline]]
/// type = "Resize"
/// size = [256, 256]
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PipelineStage {
    /// Decode the image file named by the input.
    LoadImageFromFile,
    /// Resize to exactly `size` = `[width, height]`.
    Resize { size: [u32; 2] },
    /// Cut the centered `crop_size` = `[width, height]` region.
    CenterCrop { crop_size: [u32; 2] },
    /// Per-channel `(x - mean) / std` on 0-255 pixel values.
    Normalize {
        mean: [f32; 3],
        std: [f32; 3],
        /// Keep RGB channel order; `false` emits BGR.
        #[serde(default = "default_to_rgb")]
        to_rgb: bool,
    },
    /// Reorder HWC pixels into a CHW tensor.
    ImageToTensor,
}

fn default_to_rgb() -> bool {
    true
}

impl PipelineStage {
    /// Stage name as written in config files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadImageFromFile => "LoadImageFromFile",
            Self::Resize { .. } => "Resize",
            Self::CenterCrop { .. } => "CenterCrop",
            Self::Normalize { .. } => "Normalize",
            Self::ImageToTensor => "ImageToTensor",
        }
    }

    pub(super) fn is_geometric(&self) -> bool {
        matches!(self, Self::Resize { .. } | Self::CenterCrop { .. })
    }
}

/// Loader inserted in front of pipelines that are fed a file path.
pub(super) static LOAD_STAGE: PipelineStage = PipelineStage::LoadImageFromFile;
