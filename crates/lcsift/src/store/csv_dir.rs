//! Directory-of-CSV store.
//!
//! A table stored at path `p` is two files under the store root:
//!
//! ```text
//! <root>/
//! ├── meta.csv              # catalog rows
//! ├── meta.meta.json        # catalog metadata (directory, file_name, ...)
//! ├── lc_000001.csv
//! └── lc_000001.meta.json   # z, t0, mwebv, ...
//! ```

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use sha2::{Digest, Sha256};

use crate::catalog::PATH_COLUMN;
use crate::error::{LcSiftError, Result};
use crate::table::{parse_bool, Column, Metadata, Table, ValueType};

use super::{LightCurveStore, DIRECTORY_KEY, FILE_NAME_KEY};

/// Tables stored as CSV files with JSON metadata sidecars.
///
/// Column types are inferred from the cells unless the store's schema
/// names the column. The catalog `path` column is always text, so paths
/// such as `1` or `2` stay strings.
#[derive(Debug, Clone)]
pub struct CsvDirectoryStore {
    root: PathBuf,
    schema: IndexMap<String, ValueType>,
}

impl CsvDirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let mut schema = IndexMap::new();
        schema.insert(PATH_COLUMN.to_string(), ValueType::Str);
        Self {
            root: root.into(),
            schema,
        }
    }

    /// Read `column` as `value_type` instead of inferring its type.
    pub fn with_column_type(mut self, column: impl Into<String>, value_type: ValueType) -> Self {
        self.schema.insert(column.into(), value_type);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// CSV file holding the rows of `path`.
    pub fn table_file(&self, path: &str) -> PathBuf {
        self.root.join(format!("{}.csv", path.trim_start_matches('/')))
    }

    /// JSON file holding the metadata of `path`.
    pub fn meta_file(&self, path: &str) -> PathBuf {
        self.root
            .join(format!("{}.meta.json", path.trim_start_matches('/')))
    }

    /// Write a table and its metadata, creating directories as needed.
    pub fn put_table(&self, path: &str, table: &Table) -> Result<()> {
        let csv_path = self.table_file(path);
        if let Some(parent) = csv_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| LcSiftError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let file = File::create(&csv_path).map_err(|e| LcSiftError::Io {
            path: csv_path.clone(),
            source: e,
        })?;
        write_csv(table, BufWriter::new(file))?;

        let meta_path = self.meta_file(path);
        let file = File::create(&meta_path).map_err(|e| LcSiftError::Io {
            path: meta_path.clone(),
            source: e,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), &table.meta)?;

        Ok(())
    }
}

impl LightCurveStore for CsvDirectoryStore {
    fn get_table(&self, path: &str) -> Result<Table> {
        let csv_path = self.table_file(path);
        if !csv_path.is_file() {
            return Err(LcSiftError::MissingData {
                path: path.to_string(),
            });
        }

        let file = File::open(&csv_path).map_err(|e| LcSiftError::Io {
            path: csv_path.clone(),
            source: e,
        })?;
        let mut table = read_csv(BufReader::new(file), &self.schema)?;

        let meta_path = self.meta_file(path);
        if meta_path.is_file() {
            let file = File::open(&meta_path).map_err(|e| LcSiftError::Io {
                path: meta_path.clone(),
                source: e,
            })?;
            table.meta = serde_json::from_reader::<_, Metadata>(BufReader::new(file))?;
        }

        log::debug!("Loaded '{}' ({} rows)", path, table.row_count());
        Ok(table)
    }

    fn contains(&self, path: &str) -> bool {
        self.table_file(path).is_file()
    }
}

/// Open the store holding a catalog's light curves, as named by the
/// catalog's `directory` and `file_name` metadata.
pub fn open_light_curve_store(catalog: &Table) -> Result<CsvDirectoryStore> {
    let directory = catalog.meta_str(DIRECTORY_KEY)?;
    let file_name = catalog.meta_str(FILE_NAME_KEY)?;
    Ok(CsvDirectoryStore::new(Path::new(directory).join(file_name)))
}

/// SHA-256 of a file's contents, as `sha256:<hex>`.
pub fn file_hash(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| LcSiftError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents).map_err(|e| LcSiftError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&contents);
    Ok(format!("sha256:{:x}", hasher.finalize()))
}

/// Parse CSV rows into typed columns. Columns named in `schema` take that
/// type; the rest are inferred.
pub(crate) fn read_csv(reader: impl Read, schema: &IndexMap<String, ValueType>) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for result in reader.records() {
        let record = result?;
        for (i, column) in cells.iter_mut().enumerate() {
            column.push(record.get(i).unwrap_or("").to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| {
            let column = match schema.get(&name) {
                Some(value_type) => typed_column(&name, values, *value_type)?,
                None => infer_column(values),
            };
            Ok((name, column))
        })
        .collect::<Result<Vec<_>>>()?;
    Table::from_columns(columns)
}

/// Serialize a table's rows as CSV.
pub(crate) fn write_csv(table: &Table, writer: impl std::io::Write) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(table.column_names())?;
    for row in 0..table.row_count() {
        writer.write_record(table.columns().map(|(_, col)| col.render(row)))?;
    }
    writer.flush().map_err(|e| LcSiftError::Io {
        path: PathBuf::from("<csv>"),
        source: e,
    })?;
    Ok(())
}

/// Parse every cell as `value_type`.
fn typed_column(name: &str, values: Vec<String>, value_type: ValueType) -> Result<Column> {
    let mismatch = || LcSiftError::ColumnType {
        column: name.to_string(),
        expected: value_type.to_string(),
    };
    Ok(match value_type {
        ValueType::Str => Column::Str(values),
        ValueType::Int => Column::Int(
            values
                .iter()
                .map(|v| v.parse::<i64>().ok())
                .collect::<Option<Vec<_>>>()
                .ok_or_else(mismatch)?,
        ),
        ValueType::Float => Column::Float(
            values
                .iter()
                .map(|v| v.parse::<f64>().ok())
                .collect::<Option<Vec<_>>>()
                .ok_or_else(mismatch)?,
        ),
        ValueType::Bool => Column::Bool(
            values
                .iter()
                .map(|v| parse_bool(v))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(mismatch)?,
        ),
    })
}

/// Pick the narrowest type every cell parses as: int, float, bool, then
/// string. A column without cells is float.
fn infer_column(values: Vec<String>) -> Column {
    if values.is_empty() {
        return Column::Float(Vec::new());
    }
    if let Some(ints) = values
        .iter()
        .map(|v| v.parse::<i64>().ok())
        .collect::<Option<Vec<_>>>()
    {
        return Column::Int(ints);
    }
    if let Some(floats) = values
        .iter()
        .map(|v| v.parse::<f64>().ok())
        .collect::<Option<Vec<_>>>()
    {
        return Column::Float(floats);
    }
    if let Some(bools) = values
        .iter()
        .map(|v| parse_bool(v))
        .collect::<Option<Vec<_>>>()
    {
        return Column::Bool(bools);
    }
    Column::Str(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_column_types() {
        let strings = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(infer_column(strings(&["1", "-1"])), Column::Int(vec![1, -1]));
        assert_eq!(infer_column(strings(&["1", "0.5"])), Column::Float(vec![1.0, 0.5]));
        assert_eq!(infer_column(strings(&["true", "False"])), Column::Bool(vec![true, false]));
        assert_eq!(
            infer_column(strings(&["ztfg", "1"])),
            Column::Str(strings(&["ztfg", "1"]))
        );
        assert_eq!(infer_column(Vec::new()), Column::Float(Vec::new()));
    }

    #[test]
    fn test_read_csv_header_only_is_zero_rows() {
        let table = read_csv("time,flux\n".as_bytes(), &IndexMap::new()).unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_csv_text_round_trip() {
        let table = Table::from_columns([
            ("z", Column::from(vec![1.0, 0.05])),
            ("path", Column::from(vec!["lc_0", "bad_1"])),
            ("sel", Column::from(vec![1_i64, 0])),
        ])
        .unwrap();

        let mut buffer = Vec::new();
        write_csv(&table, &mut buffer).unwrap();
        let read_back = read_csv(buffer.as_slice(), &IndexMap::new()).unwrap();
        assert_eq!(read_back, table);
    }

    #[test]
    fn test_numeric_looking_paths_stay_text() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = CsvDirectoryStore::new(dir.path());
        let catalog = Table::from_columns([
            ("path", Column::from(vec!["1", "2"])),
            ("band_id", Column::from(vec!["10", "20"])),
            ("z", Column::from(vec![0.02, 0.03])),
        ])
        .unwrap();
        store.put_table("meta", &catalog).unwrap();

        let read_back = store.get_table("meta").unwrap();
        assert_eq!(read_back.str_values("path").unwrap(), &["1", "2"]);
        assert_eq!(read_back.column("band_id").unwrap(), &Column::Int(vec![10, 20]));

        let typed = store
            .clone()
            .with_column_type("band_id", ValueType::Str)
            .get_table("meta")
            .unwrap();
        assert_eq!(typed.str_values("band_id").unwrap(), &["10", "20"]);

        let err = store
            .with_column_type("z", ValueType::Int)
            .get_table("meta")
            .unwrap_err();
        assert!(matches!(err, LcSiftError::ColumnType { .. }));
    }
}
