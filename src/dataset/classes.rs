use std::fs;
use std::path::{Path, PathBuf};

use super::errors::CatalogError;

/// Where the class labels come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassSource {
    /// Comma-separated labels, e.g. `"cat,dog"`.
    Inline(String),
    /// A file with either one comma-separated line or one label per line.
    File(PathBuf),
}

impl ClassSource {
    /// Interpret a raw configuration value: an existing path is a label file,
    /// anything else is an inline list.
    pub fn from_value(value: &str) -> Self {
        if Path::new(value).exists() {
            Self::File(PathBuf::from(value))
        } else {
            Self::Inline(value.to_string())
        }
    }
}

/// Ordered, de-duplicated class labels; the position of a label is its class id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassRegistry {
    names: Vec<String>,
}

impl ClassRegistry {
    /// Resolve the registry from a configured source.
    ///
    /// A missing source is fatal: a trained model's label ids cannot be
    /// reproduced without it.
    pub fn resolve(source: Option<&ClassSource>, env: &'static str) -> Result<Self, CatalogError> {
        match source {
            None => Err(CatalogError::NoClassSource { env }),
            Some(ClassSource::Inline(value)) => Ok(Self::from_names(value.split(','))),
            Some(ClassSource::File(path)) => {
                let text = fs::read_to_string(path).map_err(|source| {
                    CatalogError::ReadClassFile {
                        path: path.clone(),
                        source,
                    }
                })?;
                Ok(Self::from_names(parse_label_file(&text)))
            }
        }
    }

    /// Build a registry from arbitrary names, sorting and de-duplicating them.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        Self { names }
    }

    /// Labels in class-id order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Label for a class id.
    pub fn name(&self, class_id: usize) -> Option<&str> {
        self.names.get(class_id).map(String::as_str)
    }

    /// Class id of a label.
    pub fn class_id(&self, name: &str) -> Option<usize> {
        self.names.binary_search_by(|probe| probe.as_str().cmp(name)).ok()
    }
}

/// A single line is a comma-separated list; otherwise one label per line.
fn parse_label_file(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    if let [only] = lines.as_slice() {
        return only.trim().split(',').map(str::to_string).collect();
    }
    lines
        .into_iter()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const ENV: &str = "TEST_CLASSES";

    #[test]
    fn inline_labels_are_sorted() {
        let source = ClassSource::Inline("b,a,c".into());
        let registry = ClassRegistry::resolve(Some(&source), ENV).unwrap();
        assert_eq!(registry.names(), ["a", "b", "c"]);
        assert_eq!(registry.class_id("b"), Some(1));
        assert_eq!(registry.name(2), Some("c"));
    }

    #[test]
    fn missing_source_is_a_configuration_error() {
        let err = ClassRegistry::resolve(None, ENV).unwrap_err();
        assert!(matches!(err, CatalogError::NoClassSource { env } if env == ENV));
        assert!(err.to_string().contains(ENV));
    }

    #[test]
    fn label_file_one_per_line_skips_blank_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.txt");
        fs::write(&path, "zebra\n\n  ant \nmole\n").unwrap();
        let source = ClassSource::from_value(path.to_str().unwrap());
        assert_eq!(source, ClassSource::File(path.clone()));
        let registry = ClassRegistry::resolve(Some(&source), ENV).unwrap();
        assert_eq!(registry.names(), ["ant", "mole", "zebra"]);
    }

    #[test]
    fn label_file_single_line_is_comma_separated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.txt");
        fs::write(&path, "dog,cat,bird\n").unwrap();
        let registry =
            ClassRegistry::resolve(Some(&ClassSource::File(path)), ENV).unwrap();
        assert_eq!(registry.names(), ["bird", "cat", "dog"]);
    }

    #[test]
    fn duplicate_labels_collapse() {
        let registry = ClassRegistry::from_names(["b", "a", "b"]);
        assert_eq!(registry.names(), ["a", "b"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn nonexistent_path_value_is_inline() {
        let source = ClassSource::from_value("no/such/labels.txt");
        assert_eq!(source, ClassSource::Inline("no/such/labels.txt".into()));
    }

    #[test]
    fn unreadable_label_file_reports_path() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone.txt");
        let err = ClassRegistry::resolve(Some(&ClassSource::File(missing.clone())), ENV)
            .unwrap_err();
        assert!(matches!(err, CatalogError::ReadClassFile { ref path, .. } if *path == missing));
    }
}
