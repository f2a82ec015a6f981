//! Image preprocessing ahead of classification.
//!
//! A [`Pipeline`] is a validated list of [`PipelineStage`]s. Which stages run
//! for a given input is derived per call: file inputs always start with a
//! loader, in-memory images never do. The configured list is never edited.

mod stages;

use std::path::PathBuf;

use image::DynamicImage;
use image::imageops::FilterType;
use ndarray::{Array3, Array4, Axis};
use thiserror::Error;
use tracing::trace;

pub use stages::PipelineStage;
use stages::LOAD_STAGE;

/// Errors from pipeline validation or execution.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The stage list is not a usable pipeline.
    #[error("Invalid pipeline: {0}")]
    Invalid(String),
    /// Failed to open or decode an image.
    #[error("Failed to load image {path}: {source}")]
    Load {
        path: PathBuf,
        source: image::ImageError,
    },
    /// Crop larger than the image it is applied to.
    #[error("Crop {crop_width}x{crop_height} exceeds image size {width}x{height}")]
    CropTooLarge {
        crop_width: u32,
        crop_height: u32,
        width: u32,
        height: u32,
    },
    /// A stage received data it cannot handle.
    #[error("Stage {stage} cannot follow the previous stages")]
    StageOrder { stage: &'static str },
    /// Pixel buffer could not be shaped into an array.
    #[error("Pixel buffer shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
    /// Requested sample does not exist.
    #[error("Sample index {index} out of range for catalog of {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Data fed into a pipeline.
#[derive(Clone, Debug)]
pub enum PipelineInput {
    /// An image file, optionally relative to `img_prefix`.
    File {
        img_prefix: Option<PathBuf>,
        filename: PathBuf,
    },
    /// An already decoded image.
    Image(DynamicImage),
}

impl PipelineInput {
    fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }
}

/// Validated preprocessing stages.
#[derive(Clone, Debug, PartialEq)]
pub struct Pipeline {
    stages: Vec<PipelineStage>,
}

impl Pipeline {
    /// Validate `stages` and wrap them.
    ///
    /// Rules: a loader may only come first; resizing and cropping happen
    /// before normalization; `ImageToTensor` appears exactly once, last.
    pub fn new(stages: Vec<PipelineStage>) -> Result<Self, PipelineError> {
        validate(&stages)?;
        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    /// Stages that actually run for `input`.
    pub fn stages_for(&self, input: &PipelineInput) -> Vec<&PipelineStage> {
        let starts_with_load = matches!(self.stages.first(), Some(PipelineStage::LoadImageFromFile));
        let configured = self.stages.iter();
        match (input.is_file(), starts_with_load) {
            (true, false) => std::iter::once(&LOAD_STAGE).chain(configured).collect(),
            (false, true) => configured.skip(1).collect(),
            _ => configured.collect(),
        }
    }

    /// Run the pipeline, producing a CHW `f32` tensor.
    pub fn run(&self, input: PipelineInput) -> Result<Array3<f32>, PipelineError> {
        let stages = self.stages_for(&input);
        let mut state = match input {
            PipelineInput::Image(image) => State::Image(image),
            file => State::Pending(file),
        };
        for stage in stages {
            trace!(stage = stage.name(), "Applying pipeline stage");
            state = apply(stage, state)?;
        }
        match state {
            State::Tensor(tensor) => Ok(tensor),
            _ => Err(PipelineError::StageOrder {
                stage: PipelineStage::ImageToTensor.name(),
            }),
        }
    }
}

/// Stack a single CHW tensor into a batch of one.
pub fn collate(tensor: Array3<f32>) -> Array4<f32> {
    tensor.insert_axis(Axis(0))
}

enum State {
    Pending(PipelineInput),
    Image(DynamicImage),
    /// HWC pixel values.
    Pixels(Array3<f32>),
    /// CHW tensor.
    Tensor(Array3<f32>),
}

fn apply(stage: &PipelineStage, state: State) -> Result<State, PipelineError> {
    let out_of_order = || PipelineError::StageOrder { stage: stage.name() };
    match (stage, state) {
        (PipelineStage::LoadImageFromFile, State::Pending(PipelineInput::File { img_prefix, filename })) => {
            let path = match img_prefix {
                Some(prefix) => prefix.join(filename),
                None => filename,
            };
            let image = image::open(&path).map_err(|source| PipelineError::Load { path, source })?;
            Ok(State::Image(image))
        }
        (PipelineStage::Resize { size: [width, height] }, State::Image(image)) => Ok(State::Image(
            image.resize_exact(*width, *height, FilterType::Triangle),
        )),
        (PipelineStage::CenterCrop { crop_size: [crop_width, crop_height] }, State::Image(image)) => {
            let (width, height) = (image.width(), image.height());
            if *crop_width > width || *crop_height > height {
                return Err(PipelineError::CropTooLarge {
                    crop_width: *crop_width,
                    crop_height: *crop_height,
                    width,
                    height,
                });
            }
            let x = (width - crop_width) / 2;
            let y = (height - crop_height) / 2;
            Ok(State::Image(image.crop_imm(x, y, *crop_width, *crop_height)))
        }
        (PipelineStage::Normalize { mean, std, to_rgb }, State::Image(image)) => {
            let mut pixels = to_pixels(&image)?;
            for (channel, mut lane) in pixels.axis_iter_mut(Axis(2)).enumerate() {
                lane.mapv_inplace(|value| (value - mean[channel]) / std[channel]);
            }
            if !to_rgb {
                pixels.invert_axis(Axis(2));
            }
            Ok(State::Pixels(pixels))
        }
        (PipelineStage::ImageToTensor, State::Image(image)) => Ok(State::Tensor(to_chw(to_pixels(&image)?))),
        (PipelineStage::ImageToTensor, State::Pixels(pixels)) => Ok(State::Tensor(to_chw(pixels))),
        _ => Err(out_of_order()),
    }
}

fn to_pixels(image: &DynamicImage) -> Result<Array3<f32>, PipelineError> {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    let values: Vec<f32> = rgb.into_raw().into_iter().map(f32::from).collect();
    Ok(Array3::from_shape_vec((height as usize, width as usize, 3), values)?)
}

fn to_chw(pixels: Array3<f32>) -> Array3<f32> {
    pixels.permuted_axes([2, 0, 1]).as_standard_layout().into_owned()
}

fn validate(stages: &[PipelineStage]) -> Result<(), PipelineError> {
    let invalid = |message: String| Err(PipelineError::Invalid(message));
    let Some(PipelineStage::ImageToTensor) = stages.last() else {
        return invalid("the last stage must be ImageToTensor".into());
    };
    let mut normalized = false;
    for (idx, stage) in stages.iter().enumerate() {
        match stage {
            PipelineStage::LoadImageFromFile if idx != 0 => {
                return invalid(format!("LoadImageFromFile at position {idx}; it may only come first"));
            }
            PipelineStage::ImageToTensor if idx + 1 != stages.len() => {
                return invalid(format!("ImageToTensor at position {idx}; it may only come last"));
            }
            PipelineStage::Resize { size: [w, h] } | PipelineStage::CenterCrop { crop_size: [w, h] }
                if *w == 0 || *h == 0 =>
            {
                return invalid(format!("{} size must be non-zero", stage.name()));
            }
            PipelineStage::Normalize { std, .. } => {
                if normalized {
                    return invalid("Normalize appears more than once".into());
                }
                if std.iter().any(|value| *value == 0.0 || !value.is_finite()) {
                    return invalid("Normalize std values must be finite and non-zero".into());
                }
                normalized = true;
            }
            _ => {}
        }
        if stage.is_geometric() && normalized {
            return invalid(format!("{} must come before Normalize", stage.name()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
