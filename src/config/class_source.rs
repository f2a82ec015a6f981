//! Where the class labels come from, outside the catalog core.

use crate::dataset::ClassSource;

use super::types::DatasetConfig;

/// Environment variable holding inline class labels or a label file path.
pub const CLASSES_ENV: &str = "CLASSFOLD_CLASSES";

/// Class source from [`CLASSES_ENV`], if set.
pub fn class_source_from_env() -> Option<ClassSource> {
    std::env::var(CLASSES_ENV)
        .ok()
        .map(|value| ClassSource::from_value(&value))
}

/// Pick the class source: an explicit value wins over the config file, which
/// wins over the environment.
pub fn resolve_class_source(explicit: Option<&str>, config: &DatasetConfig) -> Option<ClassSource> {
    explicit
        .or(config.classes.as_deref())
        .map(ClassSource::from_value)
        .or_else(class_source_from_env)
}
