//! CLI command implementations.

pub mod bins;
pub mod completeness;
pub mod efficiency;
pub mod flag;
pub mod metrics;
pub mod run;

use std::path::{Path, PathBuf};

use lcsift::{CsvDirectoryStore, LightCurveStore, PipelineConfig, Table};

type CommandResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Configuration from `--config`, or the defaults.
pub(crate) fn load_config(path: Option<PathBuf>) -> CommandResult<PipelineConfig> {
    match path {
        Some(path) => {
            log::info!("Loading configuration from {}", path.display());
            Ok(PipelineConfig::load(&path)?)
        }
        None => Ok(PipelineConfig::default()),
    }
}

/// Store root and table key of a `<dir>/<name>.csv` path.
fn split_table_path(path: &Path) -> CommandResult<(PathBuf, String)> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| format!("Not a file path: {}", path.display()))?;
    let key = name.strip_suffix(".csv").unwrap_or(&name).to_string();
    let root = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((root, key))
}

/// Read a catalog CSV and its `.meta.json` sidecar.
pub(crate) fn load_catalog(path: &Path) -> CommandResult<Table> {
    if !path.exists() {
        return Err(format!("Catalog not found: {}", path.display()).into());
    }
    let (root, key) = split_table_path(path)?;
    Ok(CsvDirectoryStore::new(root).get_table(&key)?)
}

/// Write a catalog CSV and its `.meta.json` sidecar.
pub(crate) fn save_catalog(table: &Table, path: &Path) -> CommandResult<()> {
    let (root, key) = split_table_path(path)?;
    CsvDirectoryStore::new(root).put_table(&key, table)?;
    Ok(())
}

/// Fixed-width number, `-` for NaN.
pub(crate) fn fmt_value(value: f64) -> String {
    if value.is_nan() {
        format!("{:>9}", "-")
    } else {
        format!("{:>9.4}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_table_path() {
        let (root, key) = split_table_path(Path::new("out/meta_sel.csv")).unwrap();
        assert_eq!(root, PathBuf::from("out"));
        assert_eq!(key, "meta_sel");

        let (root, key) = split_table_path(Path::new("catalog.csv")).unwrap();
        assert_eq!(root, PathBuf::from("."));
        assert_eq!(key, "catalog");
    }

    #[test]
    fn test_fmt_value() {
        assert_eq!(fmt_value(f64::NAN).trim(), "-");
        assert_eq!(fmt_value(0.04).trim(), "0.0400");
    }
}
