//! Jurisdiction table reading.

use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use polars::prelude::{CsvReadOptions, DataFrame, SerReader, StringChunked};

use crate::error::{LoadError, LoadResult};
use crate::join::RawRecord;

/// Names of the key columns; every other column is a jurisdiction value
#[derive(Clone, Debug)]
pub struct TableColumns {
    pub group: String,
    pub name: String,
}

impl Default for TableColumns {
    fn default() -> Self {
        Self {
            group: "state".to_string(),
            name: "county".to_string(),
        }
    }
}

/// Every cell is read as a string so numeric coercion stays with the joiner
/// and codes such as "06" keep their leading zeros.
fn string_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
}

/// Read the jurisdiction CSV at `path` into raw rows.
pub fn load_records(path: &Path, columns: &TableColumns) -> LoadResult<Vec<RawRecord>> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let df = string_options()
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let records = records_from_frame(&df, columns, path)?;
    tracing::info!(path = %path.display(), rows = records.len(), "loaded jurisdiction table");
    Ok(records)
}

/// Read raw rows from CSV text
pub fn parse_records(csv: &str, columns: &TableColumns) -> LoadResult<Vec<RawRecord>> {
    let source = Path::new("<memory>");
    let df = string_options()
        .into_reader_with_file_handle(Cursor::new(csv.as_bytes()))
        .finish()
        .map_err(|source_err| LoadError::Csv {
            path: source.to_path_buf(),
            source: source_err,
        })?;
    records_from_frame(&df, columns, source)
}

fn key_column<'a>(df: &'a DataFrame, name: &str, path: &Path) -> LoadResult<&'a StringChunked> {
    let missing = || LoadError::MissingColumn {
        path: path.to_path_buf(),
        column: name.to_string(),
    };
    df.column(name)
        .map_err(|_| missing())?
        .str()
        .map_err(|_| missing())
}

fn records_from_frame(
    df: &DataFrame,
    columns: &TableColumns,
    path: &Path,
) -> LoadResult<Vec<RawRecord>> {
    let groups = key_column(df, &columns.group, path)?;
    let names = key_column(df, &columns.name, path)?;

    let mut value_columns = Vec::new();
    for column in df.get_columns() {
        let label = column.name().as_str();
        if label == columns.group || label == columns.name {
            continue;
        }
        let cells = column.str().map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        value_columns.push((label.to_string(), cells));
    }

    let records = (0..df.height())
        .map(|row| RawRecord {
            group_code: groups.get(row).unwrap_or_default().to_string(),
            name: names.get(row).unwrap_or_default().to_string(),
            cells: value_columns
                .iter()
                .map(|(label, cells)| (label.clone(), cells.get(row).map(str::to_string)))
                .collect(),
        })
        .collect();

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_records() {
        let csv = "state,county,JD1,JD2,JD3,JD4\n06,Alpine,10,5,,x\n06,Amador,1,2,3,4\n";
        let records = parse_records(csv, &TableColumns::default()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].group_code, "06");
        assert_eq!(records[0].name, "Alpine");
        let labels: Vec<&str> = records[0].cells.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["JD1", "JD2", "JD3", "JD4"]);
        assert_eq!(records[0].cells[0].1.as_deref(), Some("10"));
        assert_eq!(records[0].cells[3].1.as_deref(), Some("x"));
        assert_eq!(records[1].cells[3].1.as_deref(), Some("4"));
    }

    #[test]
    fn test_key_columns_anywhere() {
        let csv = "JD1,county,state\n7,Alpine,06\n";
        let records = parse_records(csv, &TableColumns::default()).unwrap();
        assert_eq!(records[0].name, "Alpine");
        assert_eq!(records[0].cells.len(), 1);
        assert_eq!(records[0].cells[0].0, "JD1");
    }

    #[test]
    fn test_missing_key_column() {
        let csv = "state,JD1\n06,1\n";
        let err = parse_records(csv, &TableColumns::default()).unwrap_err();
        match err {
            LoadError::MissingColumn { column, .. } => assert_eq!(column, "county"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "st,name,JD1").unwrap();
        writeln!(file, "CA,Alpha,10").unwrap();

        let columns = TableColumns {
            group: "st".to_string(),
            name: "name".to_string(),
        };
        let records = load_records(file.path(), &columns).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].group_code, "CA");
    }

    #[test]
    fn test_missing_file() {
        let err = load_records(Path::new("/nonexistent/data.csv"), &TableColumns::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
