//! Dataset configuration files and class-label lookup.
//!
//! This is the only layer that touches the process environment; the catalog
//! core receives its class list as a plain value.

mod class_source;
mod defaults;
mod errors;
mod load;
mod types;


pub use class_source::{CLASSES_ENV, class_source_from_env, resolve_class_source};
pub use errors::ConfigError;
pub use load::{
    classify_image, default_config_path, load_dataset_config, open_catalog,
    save_dataset_config,
};
pub use types::{DatasetConfig, InferenceSettings};
