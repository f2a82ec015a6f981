use image::{DynamicImage, Rgb, RgbImage};
use tempfile::tempdir;

use super::*;

fn gradient(width: u32, height: u32) -> DynamicImage {
    let image = RgbImage::from_fn(width, height, |x, y| Rgb([(10 * x) as u8, (10 * y) as u8, 200]));
    DynamicImage::ImageRgb8(image)
}

fn identity_normalize(to_rgb: bool) -> PipelineStage {
    PipelineStage::Normalize {
        mean: [0.0; 3],
        std: [1.0; 3],
        to_rgb,
    }
}

#[test]
fn rejects_misplaced_stages() {
    assert!(Pipeline::new(vec![]).is_err());
    assert!(Pipeline::new(vec![PipelineStage::Resize { size: [4, 4] }]).is_err());
    assert!(
        Pipeline::new(vec![
            PipelineStage::ImageToTensor,
            PipelineStage::LoadImageFromFile,
            PipelineStage::ImageToTensor,
        ])
        .is_err()
    );
    assert!(
        Pipeline::new(vec![
            PipelineStage::Resize { size: [4, 4] },
            PipelineStage::LoadImageFromFile,
            PipelineStage::ImageToTensor,
        ])
        .is_err()
    );
    assert!(
        Pipeline::new(vec![
            identity_normalize(true),
            PipelineStage::CenterCrop { crop_size: [2, 2] },
            PipelineStage::ImageToTensor,
        ])
        .is_err()
    );
}

#[test]
fn rejects_degenerate_parameters() {
    let zero_std = PipelineStage::Normalize {
        mean: [0.0; 3],
        std: [1.0, 0.0, 1.0],
        to_rgb: true,
    };
    let err = Pipeline::new(vec![zero_std, PipelineStage::ImageToTensor]).unwrap_err();
    assert!(matches!(err, PipelineError::Invalid(_)));
    assert!(
        Pipeline::new(vec![
            PipelineStage::Resize { size: [0, 4] },
            PipelineStage::ImageToTensor,
        ])
        .is_err()
    );
}

#[test]
fn file_inputs_always_start_with_a_loader() {
    let pipeline = Pipeline::new(vec![
        PipelineStage::Resize { size: [4, 4] },
        PipelineStage::ImageToTensor,
    ])
    .unwrap();
    let file = PipelineInput::File {
        img_prefix: None,
        filename: "a.png".into(),
    };
    let names: Vec<_> = pipeline.stages_for(&file).iter().map(|s| s.name()).collect();
    assert_eq!(names, ["LoadImageFromFile", "Resize", "ImageToTensor"]);
    assert_eq!(pipeline.stages().len(), 2);
}

#[test]
fn image_inputs_skip_a_configured_loader() {
    let pipeline = Pipeline::new(vec![
        PipelineStage::LoadImageFromFile,
        PipelineStage::ImageToTensor,
    ])
    .unwrap();
    let image = PipelineInput::Image(gradient(2, 2));
    let names: Vec<_> = pipeline.stages_for(&image).iter().map(|s| s.name()).collect();
    assert_eq!(names, ["ImageToTensor"]);
    let file = PipelineInput::File {
        img_prefix: None,
        filename: "a.png".into(),
    };
    assert_eq!(pipeline.stages_for(&file).len(), 2);
}

#[test]
fn tensor_is_channel_major() {
    let pipeline = Pipeline::new(vec![identity_normalize(true), PipelineStage::ImageToTensor]).unwrap();
    let tensor = pipeline.run(PipelineInput::Image(gradient(3, 2))).unwrap();
    assert_eq!(tensor.shape(), [3, 2, 3]);
    assert_eq!(tensor[[0, 1, 2]], 20.0);
    assert_eq!(tensor[[1, 1, 2]], 10.0);
    assert_eq!(tensor[[2, 0, 0]], 200.0);
}

#[test]
fn normalize_applies_mean_std_and_channel_order() {
    let pipeline = Pipeline::new(vec![
        PipelineStage::Normalize {
            mean: [10.0, 0.0, 100.0],
            std: [2.0, 1.0, 50.0],
            to_rgb: false,
        },
        PipelineStage::ImageToTensor,
    ])
    .unwrap();
    let tensor = pipeline.run(PipelineInput::Image(gradient(3, 2))).unwrap();
    // BGR output: channel 0 holds the normalized blue plane.
    assert_eq!(tensor[[0, 0, 0]], 2.0);
    assert_eq!(tensor[[2, 0, 2]], 5.0);
}

#[test]
fn center_crop_takes_the_middle() {
    let pipeline = Pipeline::new(vec![
        PipelineStage::CenterCrop { crop_size: [2, 1] },
        PipelineStage::ImageToTensor,
    ])
    .unwrap();
    let tensor = pipeline.run(PipelineInput::Image(gradient(4, 3))).unwrap();
    assert_eq!(tensor.shape(), [3, 1, 2]);
    assert_eq!(tensor[[0, 0, 0]], 10.0);
    assert_eq!(tensor[[1, 0, 0]], 10.0);

    let err = pipeline.run(PipelineInput::Image(gradient(1, 1))).unwrap_err();
    assert!(matches!(err, PipelineError::CropTooLarge { .. }));
}

#[test]
fn loads_files_relative_to_prefix() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("cat")).unwrap();
    gradient(5, 5).save(dir.path().join("cat/a.png")).unwrap();
    let pipeline = Pipeline::new(vec![
        PipelineStage::Resize { size: [2, 3] },
        PipelineStage::ImageToTensor,
    ])
    .unwrap();
    let tensor = pipeline
        .run(PipelineInput::File {
            img_prefix: Some(dir.path().to_path_buf()),
            filename: "cat/a.png".into(),
        })
        .unwrap();
    assert_eq!(tensor.shape(), [3, 3, 2]);
    assert_eq!(collate(tensor).shape(), [1, 3, 3, 2]);

    let err = pipeline
        .run(PipelineInput::File {
            img_prefix: Some(dir.path().to_path_buf()),
            filename: "missing.png".into(),
        })
        .unwrap_err();
    assert!(matches!(err, PipelineError::Load { .. }));
}
