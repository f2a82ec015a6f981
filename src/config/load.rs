use std::path::{Path, PathBuf};

use tracing::info;

use crate::app_dirs;
use crate::dataset::{CatalogError, ClassRegistry, ClassSource, LocalFileClient, SampleCatalog};
use crate::inference::{Classifier, InferenceError, InferenceInput, ScoreMap, inference_model};

use super::class_source::CLASSES_ENV;
use super::errors::ConfigError;
use super::types::DatasetConfig;

/// Resolve the default config path inside the app directory.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    app_dirs::default_config_path().map_err(map_app_dir_error)
}

/// Load and validate a dataset config.
///
/// Relative local paths inside the file are taken relative to the file's own
/// directory.
pub fn load_dataset_config(path: &Path) -> Result<DatasetConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: DatasetConfig =
        toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?;
    config.pipeline().map_err(|source| ConfigError::Pipeline {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(base) = path.parent() {
        config.anchor_paths(base);
    }
    Ok(config)
}

/// Write `config` as TOML, creating the parent directory when needed.
pub fn save_dataset_config(config: &DatasetConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let text = toml::to_string_pretty(config).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, text).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve the class list and build the catalog on local storage.
pub fn open_catalog(
    config: &DatasetConfig,
    classes: Option<&ClassSource>,
) -> Result<SampleCatalog, CatalogError> {
    let registry = ClassRegistry::resolve(classes, CLASSES_ENV)?;
    info!(
        classes = registry.len(),
        root = %config.data_prefix,
        "Resolved class labels"
    );
    config
        .catalog_builder()
        .classes(registry)
        .build(&LocalFileClient)
}

/// Classify one image with the configured pipeline, reporting only the
/// `[inference] top_k` best classes when that key is set.
pub fn classify_image<C: Classifier + ?Sized>(
    config: &DatasetConfig,
    classifier: &C,
    input: InferenceInput,
) -> Result<ScoreMap, InferenceError> {
    let pipeline = config.pipeline()?;
    inference_model(classifier, &pipeline, input, config.inference.top_k)
}

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => {
            ConfigError::CreateDir { path, source }
        }
    }
}
