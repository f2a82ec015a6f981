//! Command-line summary of a labeled image dataset.

use std::path::{Path, PathBuf};

use classfold::config::{
    DatasetConfig, default_config_path, load_dataset_config, open_catalog, resolve_class_source,
    save_dataset_config,
};
use classfold::dataset::SampleCatalog;
use classfold::logging;

#[derive(Debug, Default, PartialEq)]
struct Options {
    config: Option<PathBuf>,
    classes: Option<String>,
    init: bool,
    list: bool,
    verbose: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    let directive = if options.verbose { "debug" } else { "info" };
    if let Err(err) = logging::init(directive) {
        eprintln!("Logging disabled: {err}");
    }

    let config_path = match options.config.clone() {
        Some(path) => path,
        None => default_config_path().map_err(|err| err.to_string())?,
    };
    if options.init {
        return write_template(&config_path);
    }

    let config = load_dataset_config(&config_path).map_err(|err| err.to_string())?;
    let source = resolve_class_source(options.classes.as_deref(), &config);
    let catalog = open_catalog(&config, source.as_ref()).map_err(|err| err.to_string())?;
    print_summary(&catalog, options.list);
    Ok(())
}

fn write_template(path: &Path) -> Result<(), String> {
    if path.exists() {
        return Err(format!("Config already exists: {}", path.display()));
    }
    save_dataset_config(&DatasetConfig::for_data_root("data"), path)
        .map_err(|err| err.to_string())?;
    println!("Wrote config template to {}", path.display());
    Ok(())
}

fn print_summary(catalog: &SampleCatalog, list: bool) {
    println!(
        "{} samples across {} classes under {}",
        catalog.len(),
        catalog.classes().len(),
        catalog.data_prefix()
    );
    println!("Per-class counts:");
    let counts = catalog.class_counts();
    for name in catalog.classes().names() {
        println!("  {name}: {}", counts.get(name).copied().unwrap_or(0));
    }
    if !catalog.empty_folders().is_empty() {
        let empty: Vec<&str> = catalog.empty_folders().iter().map(String::as_str).collect();
        println!("Empty folders: {}", empty.join(", "));
    }
    if list {
        for sample in catalog.samples() {
            println!("{} {}", sample.path, sample.label.as_i64());
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<Options, String> {
    let mut options = Options::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--config" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--config requires a value".to_string())?;
                options.config = Some(PathBuf::from(value));
            }
            "--classes" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--classes requires a value".to_string())?;
                options.classes = Some(value.to_string());
            }
            "--init" => options.init = true,
            "--list" => options.list = true,
            "-v" | "--verbose" => options.verbose = true,
            unknown => {
                return Err(format!("Unknown argument: {unknown}\n\n{}", help_text()));
            }
        }
        idx += 1;
    }
    Ok(options)
}

fn help_text() -> String {
    [
        "classfold",
        "",
        "Builds the sample catalog of a labeled image dataset and prints a summary.",
        "",
        "Usage:",
        "  classfold [--config <file>] [--classes <labels|file>] [options]",
        "",
        "Options:",
        "  --config <file>    Dataset config (default: dataset.toml in the app directory).",
        "  --classes <value>  Comma-separated labels or a label file; overrides the",
        "                     config file and CLASSFOLD_CLASSES.",
        "  --init             Write a config template and exit.",
        "  --list             Print every sample as `path label`.",
        "  -v, --verbose      Debug logging (RUST_LOG overrides).",
    ]
    .join("\n")
}
