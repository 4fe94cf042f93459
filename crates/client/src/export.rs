//! Tabular conversion and file export for search results.
//!
//! Records are free-form JSON maps; the tabular form is an Arrow
//! [`RecordBatch`]. Column order follows first appearance across the
//! record set. The reserved `_time` field is converted from Unix epoch
//! seconds to a UTC timestamp column when every present value is an
//! integer.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray, TimestampSecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::DateTime;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde_json::Value;
use thiserror::Error;

use crate::models::{Record, TIME_FIELD};

/// Errors produced while converting or exporting results.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The output path's extension matches no supported format.
    #[error("Unsupported file extension {extension:?}: use .parquet or .csv")]
    UnsupportedExtension { extension: String },

    /// CSV serialization error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Arrow conversion error.
    #[error("Arrow error: {0}")]
    Arrow(String),

    /// Parquet writer error.
    #[error("Parquet error: {0}")]
    Parquet(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Column types inferred from the values observed in a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnType {
    Timestamp,
    Int,
    Float,
    Bool,
    Text,
}

impl ColumnType {
    fn data_type(self) -> DataType {
        match self {
            Self::Timestamp => DataType::Timestamp(TimeUnit::Second, Some("UTC".into())),
            Self::Int => DataType::Int64,
            Self::Float => DataType::Float64,
            Self::Bool => DataType::Boolean,
            Self::Text => DataType::Utf8,
        }
    }
}

/// An ordered, in-memory set of result records.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    records: Vec<Record>,
}

impl ResultSet {
    /// Wrap collected records.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the result set holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Borrow the records in result order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consume the set, returning the records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Iterate over the records in result order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Convert the records to an Arrow record batch.
    ///
    /// Missing keys become nulls. Columns whose values mix types fall
    /// back to `Utf8`, with objects and arrays serialized as JSON text.
    pub fn to_record_batch(&self) -> Result<RecordBatch, ExportError> {
        if self.records.is_empty() {
            return Ok(RecordBatch::new_empty(Arc::new(Schema::empty())));
        }

        let columns = infer_columns(&self.records);

        let fields: Vec<Field> = columns
            .iter()
            .map(|(name, ty)| Field::new(name, ty.data_type(), true))
            .collect();
        let arrays: Vec<ArrayRef> = columns
            .iter()
            .map(|(name, ty)| build_array(name, *ty, &self.records))
            .collect();

        RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
            .map_err(|e| ExportError::Arrow(e.to_string()))
    }

    /// Save the records to a local file.
    ///
    /// The format is chosen by extension: `.parquet` (Snappy-compressed)
    /// or `.csv`. Any other extension fails without touching the
    /// filesystem.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        match extension {
            "parquet" => self.write_parquet(path),
            "csv" => self.write_csv(path),
            other => Err(ExportError::UnsupportedExtension {
                extension: format!(".{other}"),
            }),
        }
    }

    fn write_parquet(&self, path: &Path) -> Result<(), ExportError> {
        let batch = self.to_record_batch()?;
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();

        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
            .map_err(|e| ExportError::Parquet(e.to_string()))?;
        writer
            .write(&batch)
            .map_err(|e| ExportError::Parquet(e.to_string()))?;
        writer
            .close()
            .map_err(|e| ExportError::Parquet(e.to_string()))?;

        Ok(())
    }

    fn write_csv(&self, path: &Path) -> Result<(), ExportError> {
        let columns = infer_columns(&self.records);
        let mut writer = csv::Writer::from_path(path)?;

        if !columns.is_empty() {
            writer.write_record(columns.iter().map(|(name, _)| name.as_str()))?;
            for record in &self.records {
                let row: Vec<String> = columns
                    .iter()
                    .map(|(name, _)| {
                        record.get(name).map(|v| csv_value(name, v)).unwrap_or_default()
                    })
                    .collect();
                writer.write_record(&row)?;
            }
        }
        writer.flush()?;

        Ok(())
    }
}

impl From<Vec<Record>> for ResultSet {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

/// Determine column names (first-seen order) and inferred types.
fn infer_columns(records: &[Record]) -> Vec<(String, ColumnType)> {
    let mut names: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !names.iter().any(|n| n == key) {
                names.push(key.clone());
            }
        }
    }

    names
        .into_iter()
        .map(|name| {
            let ty = infer_column_type(&name, records);
            (name, ty)
        })
        .collect()
}

fn infer_column_type(name: &str, records: &[Record]) -> ColumnType {
    let mut any = false;
    let mut all_bool = true;
    let mut all_int = true;
    let mut all_numeric = true;

    for value in records.iter().filter_map(|r| r.get(name)) {
        if value.is_null() {
            continue;
        }
        any = true;
        all_bool &= value.is_boolean();
        all_int &= value.is_i64() || value.is_u64();
        all_numeric &= value.is_number();
    }

    if !any {
        return ColumnType::Text;
    }
    if name == TIME_FIELD && all_int {
        return ColumnType::Timestamp;
    }
    if all_bool {
        ColumnType::Bool
    } else if all_int {
        ColumnType::Int
    } else if all_numeric {
        ColumnType::Float
    } else {
        ColumnType::Text
    }
}

fn build_array(name: &str, ty: ColumnType, records: &[Record]) -> ArrayRef {
    match ty {
        ColumnType::Timestamp => {
            let values: Vec<Option<i64>> = records
                .iter()
                .map(|r| r.get(name).and_then(Value::as_i64))
                .collect();
            Arc::new(TimestampSecondArray::from(values).with_timezone("UTC"))
        }
        ColumnType::Int => {
            let values: Vec<Option<i64>> = records
                .iter()
                .map(|r| r.get(name).and_then(Value::as_i64))
                .collect();
            Arc::new(Int64Array::from(values))
        }
        ColumnType::Float => {
            let values: Vec<Option<f64>> = records
                .iter()
                .map(|r| r.get(name).and_then(Value::as_f64))
                .collect();
            Arc::new(Float64Array::from(values))
        }
        ColumnType::Bool => {
            let values: Vec<Option<bool>> = records
                .iter()
                .map(|r| r.get(name).and_then(Value::as_bool))
                .collect();
            Arc::new(BooleanArray::from(values))
        }
        ColumnType::Text => {
            let values: Vec<Option<String>> = records
                .iter()
                .map(|r| r.get(name).and_then(text_value))
                .collect();
            Arc::new(StringArray::from(values))
        }
    }
}

/// Render a value for a `Utf8` column: strings stay bare, everything
/// else (including objects and arrays) becomes JSON text.
fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Render a value for a CSV cell. Integer `_time` values become RFC 3339
/// UTC timestamps.
fn csv_value(column: &str, value: &Value) -> String {
    if column == TIME_FIELD
        && let Some(secs) = value.as_i64()
        && let Some(timestamp) = DateTime::from_timestamp(secs, 0)
    {
        return timestamp.to_rfc3339();
    }

    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
