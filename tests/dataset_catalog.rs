mod support;

use std::fs;

use classfold::config::{
    CLASSES_ENV, DatasetConfig, class_source_from_env, load_dataset_config, open_catalog,
    resolve_class_source,
};
use classfold::dataset::{CatalogErrorKind, ClassRegistry, ClassSource};
use classfold::inference::{Classifier, InferenceInput, inference_model};
use ndarray::{Array2, ArrayView4, Axis};
use support::{env::EnvVarGuard, images::write_test_image};
use tempfile::tempdir;

/// Scores classes by how close the image's mean red value is to each class's
/// expected red level.
struct RedLevel {
    classes: Vec<String>,
    levels: Vec<f32>,
}

impl Classifier for RedLevel {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn forward(&self, batch: ArrayView4<'_, f32>) -> Result<Array2<f32>, String> {
        let red = batch
            .index_axis(Axis(1), 0)
            .mean()
            .ok_or_else(|| "empty batch".to_string())?;
        let row: Vec<f32> = self
            .levels
            .iter()
            .map(|level| 1.0 / (1.0 + (red - level).abs()))
            .collect();
        Array2::from_shape_vec((1, row.len()), row).map_err(|err| err.to_string())
    }
}

#[test]
fn env_labels_are_sorted() {
    let _env = EnvVarGuard::set(CLASSES_ENV, "b,a,c");
    let source = class_source_from_env().expect("env source");
    assert_eq!(source, ClassSource::Inline("b,a,c".into()));
    let registry = ClassRegistry::resolve(Some(&source), CLASSES_ENV).unwrap();
    assert_eq!(registry.names(), ["a", "b", "c"]);
}

#[test]
fn env_can_point_at_a_label_file() {
    let dir = tempdir().unwrap();
    let labels = dir.path().join("labels.txt");
    fs::write(&labels, "tulip\n\nrose\ndaisy\n").unwrap();
    let _env = EnvVarGuard::set(CLASSES_ENV, labels.to_str().unwrap());

    let config = DatasetConfig::for_data_root("unused");
    let source = resolve_class_source(None, &config).expect("env source");
    let registry = ClassRegistry::resolve(Some(&source), CLASSES_ENV).unwrap();
    assert_eq!(registry.names(), ["daisy", "rose", "tulip"]);
}

#[test]
fn missing_class_source_is_fatal() {
    let _env = EnvVarGuard::unset(CLASSES_ENV);
    let dir = tempdir().unwrap();
    write_test_image(&dir.path().join("a/1.png"), [0, 0, 0]);
    let config = DatasetConfig::for_data_root(dir.path().to_string_lossy());

    let source = resolve_class_source(None, &config);
    assert!(source.is_none());
    let err = open_catalog(&config, source.as_ref()).unwrap_err();
    assert_eq!(err.kind(), CatalogErrorKind::Configuration);
    assert!(err.to_string().contains(CLASSES_ENV));
}

#[test]
fn env_class_count_must_match_folders() {
    let _env = EnvVarGuard::set(CLASSES_ENV, "only_one");
    let dir = tempdir().unwrap();
    write_test_image(&dir.path().join("a/1.png"), [0, 0, 0]);
    write_test_image(&dir.path().join("b/1.png"), [0, 0, 0]);
    let config = DatasetConfig::for_data_root(dir.path().to_string_lossy());

    let source = resolve_class_source(None, &config);
    let err = open_catalog(&config, source.as_ref()).unwrap_err();
    assert_eq!(err.kind(), CatalogErrorKind::Consistency);
}

#[test]
fn config_to_prediction() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    write_test_image(&data.join("dark/x.png"), [10, 0, 0]);
    write_test_image(&data.join("dark/nested/y.PNG"), [20, 0, 0]);
    write_test_image(&data.join("light/z.png"), [240, 0, 0]);
    fs::create_dir_all(data.join("unused")).unwrap();
    fs::write(data.join("unused/readme.txt"), "no images here").unwrap();

    let config_path = dir.path().join("dataset.toml");
    fs::write(
        &config_path,
        r#"
data_prefix = "data"
classes = "light,dark,unused"

[[pipeline]]
type = "Resize"
size = [4, 4]

[[pipeline]]
type = "ImageToTensor"
"#,
    )
    .unwrap();

    let config = load_dataset_config(&config_path).unwrap();
    let source = resolve_class_source(None, &config);
    let catalog = open_catalog(&config, source.as_ref()).unwrap();
    assert_eq!(catalog.classes().names(), ["dark", "light", "unused"]);
    assert_eq!(catalog.len(), 3);
    assert_eq!(catalog.samples()[1].path, "dark/x.png");
    assert_eq!(catalog.samples()[0].path, "dark/nested/y.PNG");
    assert!(catalog.empty_folders().contains("unused"));

    let pipeline = config.pipeline().unwrap();
    let (tensor, label) = catalog.prepare(2, &pipeline).unwrap();
    assert_eq!(tensor.shape(), [3, 4, 4]);
    assert_eq!(label, 1);
    assert!(catalog.prepare(3, &pipeline).is_err());

    let classifier = RedLevel {
        classes: catalog.classes().names().to_vec(),
        levels: vec![15.0, 240.0, 128.0],
    };
    let scores = inference_model(
        &classifier,
        &pipeline,
        InferenceInput::Path(data.join("light/z.png")),
        Some(1),
    )
    .unwrap();
    assert_eq!(scores.labels(), ["light"]);
    assert!(scores.get("light").is_some_and(|score| score > 0.99));
}
