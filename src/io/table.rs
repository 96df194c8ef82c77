//! CSV tables.
//!
//! This module turns a CSV file with a header row into an immutable [`Table`]
//! of typed fields. It knows nothing about stiffness or gearboxes; the
//! workflows ask it for columns by name.
//!
//! Design goals:
//! - **Header-driven schema**: columns are whatever the header says
//! - **Fatal errors**: a missing file, a missing column or a text cell where a
//!   number is expected aborts the run with a message naming the culprit
//! - **No hidden coercion**: empty cells stay empty and read back as NaN

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::StringRecord;

/// Errors produced while loading or querying tables.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("Failed to read '{source_name}': {error}")]
    Io {
        source_name: String,
        error: std::io::Error,
    },
    #[error("Failed to parse CSV '{source_name}': {error}")]
    Csv { source_name: String, error: csv::Error },
    #[error("CSV '{source_name}' has no header row")]
    Empty { source_name: String },
    #[error("File {file_index} is missing required column: {column}")]
    MissingColumn { file_index: usize, column: String },
    #[error("Column `{column}` not found in '{source_name}'")]
    UnknownColumn { source_name: String, column: String },
    #[error("Non-numeric value '{value}' in column `{column}` (data row {row}) of '{source_name}'")]
    NonNumeric {
        source_name: String,
        column: String,
        row: usize,
        value: String,
    },
    #[error("Non-finite value in column `{column}` (data row {row}) of '{source_name}'")]
    NonFinite {
        source_name: String,
        column: String,
        row: usize,
    },
}

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Number(f64),
    Text(String),
    Empty,
}

impl Field {
    fn parse(raw: &str) -> Field {
        let raw = raw.trim();
        if raw.is_empty() {
            return Field::Empty;
        }
        match raw.parse::<f64>() {
            Ok(v) => Field::Number(v),
            Err(_) => Field::Text(raw.to_string()),
        }
    }

    /// Render the field back to CSV text.
    pub fn to_csv_string(&self) -> String {
        match self {
            Field::Number(v) => v.to_string(),
            Field::Text(s) => s.clone(),
            Field::Empty => String::new(),
        }
    }
}

/// An immutable, header-addressed table.
#[derive(Debug, Clone)]
pub struct Table {
    source_name: String,
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Field>>,
}

impl Table {
    /// Load a CSV file.
    pub fn from_path(path: &Path) -> Result<Table, TableError> {
        let file = File::open(path).map_err(|error| {
            if error.kind() == std::io::ErrorKind::NotFound {
                TableError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                TableError::Io {
                    source_name: path.display().to_string(),
                    error,
                }
            }
        })?;

        let table = Table::from_reader(path.display().to_string(), file)?;
        log::info!(
            "loaded '{}': {} rows, {} columns",
            table.source_name,
            table.len(),
            table.headers.len()
        );
        Ok(table)
    }

    /// Parse CSV text from any reader. `source_name` is only used in messages.
    pub fn from_reader<R: Read>(source_name: impl Into<String>, reader: R) -> Result<Table, TableError> {
        let source_name = source_name.into();
        let csv_error = |error: csv::Error| TableError::Csv {
            source_name: source_name.clone(),
            error,
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(&csv_error)?
            .iter()
            .map(normalize_header_name)
            .collect();

        if headers.iter().all(String::is_empty) {
            return Err(TableError::Empty {
                source_name: source_name.clone(),
            });
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(&csv_error)?;
            rows.push(parse_record(&record, headers.len()));
        }

        Ok(Table::from_parts(source_name, headers, rows))
    }

    fn from_parts(source_name: String, headers: Vec<String>, rows: Vec<Vec<Field>>) -> Table {
        // First occurrence wins for duplicated header names.
        let mut index = HashMap::with_capacity(headers.len());
        for (i, name) in headers.iter().enumerate() {
            index.entry(name.clone()).or_insert(i);
        }
        Table {
            source_name,
            headers,
            index,
            rows,
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Field>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Cells of one column, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<&Field>, TableError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Numeric view of one column. Empty cells read as NaN.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>, TableError> {
        let idx = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, fields)| match &fields[idx] {
                Field::Number(v) => Ok(*v),
                Field::Empty => Ok(f64::NAN),
                Field::Text(value) => Err(TableError::NonNumeric {
                    source_name: self.source_name.clone(),
                    column: name.to_string(),
                    row: row + 1,
                    value: value.clone(),
                }),
            })
            .collect()
    }

    /// Text view of one column. Numbers are rendered back to text.
    pub fn text_column(&self, name: &str) -> Result<Vec<String>, TableError> {
        Ok(self.column(name)?.into_iter().map(Field::to_csv_string).collect())
    }

    fn column_index(&self, name: &str) -> Result<usize, TableError> {
        self.index.get(name).copied().ok_or_else(|| TableError::UnknownColumn {
            source_name: self.source_name.clone(),
            column: name.to_string(),
        })
    }

    /// Tag every row with its source label and stack the tables.
    ///
    /// Columns are the union of all inputs in first-seen order, followed by
    /// `tag_column`. Rows keep their input order; nothing is deduplicated.
    /// Cells for columns a source does not have are [`Field::Empty`].
    pub fn concat_tagged(sources: &[(String, Table)], tag_column: &str) -> Table {
        let mut headers: Vec<String> = Vec::new();
        for (_, table) in sources {
            for name in &table.headers {
                if name != tag_column && !headers.contains(name) {
                    headers.push(name.clone());
                }
            }
        }

        let total: usize = sources.iter().map(|(_, t)| t.len()).sum();
        let mut rows = Vec::with_capacity(total);
        for (label, table) in sources {
            let mapping: Vec<Option<usize>> = headers.iter().map(|h| table.index.get(h).copied()).collect();
            for row in &table.rows {
                let mut out: Vec<Field> = mapping
                    .iter()
                    .map(|idx| idx.map(|i| row[i].clone()).unwrap_or(Field::Empty))
                    .collect();
                out.push(Field::Text(label.clone()));
                rows.push(out);
            }
        }
        headers.push(tag_column.to_string());

        let labels: Vec<&str> = sources.iter().map(|(label, _)| label.as_str()).collect();
        Table::from_parts(format!("combined[{}]", labels.join(",")), headers, rows)
    }
}

/// Verify that every table has every required column.
///
/// Tables are checked in order and the reported `file_index` is 1-based, so the
/// message matches the order the files were given in.
pub fn check_required_columns(tables: &[Table], required: &[&str]) -> Result<(), TableError> {
    for (i, table) in tables.iter().enumerate() {
        for column in required {
            if !table.has_column(column) {
                return Err(TableError::MissingColumn {
                    file_index: i + 1,
                    column: column.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. Column names are otherwise case-sensitive.
    name.trim().trim_start_matches('\u{feff}').trim().to_string()
}

fn parse_record(record: &StringRecord, width: usize) -> Vec<Field> {
    // `flexible(true)` lets short rows through; pad them so every row is
    // addressable by header index. Extra trailing cells are dropped.
    (0..width)
        .map(|i| record.get(i).map(Field::parse).unwrap_or(Field::Empty))
        .collect()
}
