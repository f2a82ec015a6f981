use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dataset::{SampleCatalogBuilder, SampleSource};
use crate::pipeline::{Pipeline, PipelineError, PipelineStage};

use super::defaults::{default_extensions, default_pipeline};

/// Dataset, preprocessing and inference settings.
///
/// Config keys (TOML): `data_prefix`, `ann_file`, `extensions`, `test_mode`,
/// `classes`, `pipeline`, `inference`.
///
/// Paths are kept as strings so they can name keys on non-local backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Root the sample paths are relative to.
    pub data_prefix: String,
    /// Annotation file; when set, folder discovery is skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ann_file: Option<String>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub test_mode: bool,
    /// Inline comma-separated labels or a label file path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<String>,
    #[serde(default = "default_pipeline")]
    pub pipeline: Vec<PipelineStage>,
    #[serde(default)]
    pub inference: InferenceSettings,
}

/// Settings for single-image classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceSettings {
    /// Only report this many best classes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
}

impl DatasetConfig {
    /// Config for a folder-per-class dataset with default settings.
    pub fn for_data_root(data_prefix: impl Into<String>) -> Self {
        Self {
            data_prefix: data_prefix.into(),
            ann_file: None,
            extensions: default_extensions(),
            test_mode: false,
            classes: None,
            pipeline: default_pipeline(),
            inference: InferenceSettings::default(),
        }
    }

    pub fn sample_source(&self) -> SampleSource {
        match &self.ann_file {
            Some(ann_file) => SampleSource::AnnotationFile(ann_file.clone()),
            None => SampleSource::DirectoryDiscovery,
        }
    }

    /// Catalog builder for this dataset, without a class list.
    pub fn catalog_builder(&self) -> SampleCatalogBuilder {
        SampleCatalogBuilder::new(self.data_prefix.clone())
            .source(self.sample_source())
            .extensions(&self.extensions)
            .test_mode(self.test_mode)
    }

    /// Validated preprocessing pipeline.
    pub fn pipeline(&self) -> Result<Pipeline, PipelineError> {
        Pipeline::new(self.pipeline.clone())
    }

    /// Anchor relative local paths at `base` (normally the config's folder).
    pub(super) fn anchor_paths(&mut self, base: &Path) {
        self.data_prefix = anchor(base, &self.data_prefix);
        if let Some(ann_file) = &mut self.ann_file {
            *ann_file = anchor(base, ann_file);
        }
        if let Some(classes) = &mut self.classes {
            let candidate = base.join(&*classes);
            if Path::new(classes).is_relative() && candidate.is_file() {
                *classes = candidate.to_string_lossy().into_owned();
            }
        }
    }
}

fn anchor(base: &Path, value: &str) -> String {
    if value.contains("://") || Path::new(value).is_absolute() {
        return value.to_string();
    }
    base.join(value).to_string_lossy().into_owned()
}
