//! CSV file source backed by the Arrow CSV reader.

use super::{DatasetKind, DatasetSource};
use crate::error::{EngineError, Result};
use crate::normalize::{RawRow, RawTable};
use arrow::array::{Array, AsArray};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Options for reading CSV files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvOptions {
    /// Field delimiter
    pub delimiter: u8,
    /// Whether the first line is a header
    pub has_header: bool,
    /// Rows per Arrow record batch
    pub batch_size: usize,
    /// Rows sampled when discovering columns
    pub max_records_for_inference: Option<usize>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            batch_size: 8192,
            max_records_for_inference: Some(1000),
        }
    }
}

/// Reads one dataset from a CSV file.
///
/// Every column is read as text so that malformed numbers reach the
/// normalizer instead of failing the whole file.
#[derive(Debug, Clone)]
pub struct CsvSource {
    kind: DatasetKind,
    path: PathBuf,
    options: CsvOptions,
}

impl CsvSource {
    pub fn new(kind: DatasetKind, path: impl Into<PathBuf>, options: CsvOptions) -> Self {
        Self {
            kind,
            path: path.into(),
            options,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn format(&self) -> Format {
        Format::default()
            .with_header(self.options.has_header)
            .with_delimiter(self.options.delimiter)
    }

    /// Parses CSV bytes into a raw table.
    pub(crate) fn parse(&self, bytes: &[u8]) -> Result<RawTable> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(RawTable::default());
        }

        let (inferred, _) = self
            .format()
            .infer_schema(bytes, self.options.max_records_for_inference)
            .map_err(|e| self.arrow_error("could not read header", e))?;

        // Force every column to text
        let schema = Schema::new(
            inferred
                .fields()
                .iter()
                .map(|field| Field::new(field.name(), DataType::Utf8, true))
                .collect::<Vec<_>>(),
        );
        let headers: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();

        let reader = ReaderBuilder::new(Arc::new(schema))
            .with_format(self.format())
            .with_batch_size(self.options.batch_size)
            .with_truncated_rows(true)
            .build(bytes)
            .map_err(|e| self.arrow_error("could not create reader", e))?;

        let mut rows = Vec::new();
        for batch in reader {
            let batch = batch.map_err(|e| self.arrow_error("malformed CSV content", e))?;
            append_rows(&batch, &headers, &mut rows);
        }

        Ok(RawTable::new(headers, rows))
    }

    fn arrow_error(&self, message: &str, error: arrow::error::ArrowError) -> EngineError {
        EngineError::fetch_with_source(
            self.kind,
            format!("{message} in {}", self.path.display()),
            Box::new(error),
        )
    }
}

fn append_rows(batch: &RecordBatch, headers: &[String], rows: &mut Vec<RawRow>) {
    let columns: Vec<_> = batch
        .columns()
        .iter()
        .map(|column| column.as_string::<i32>())
        .collect();

    for row_idx in 0..batch.num_rows() {
        let mut row = RawRow::new();
        for (header, column) in headers.iter().zip(&columns) {
            let value = if column.is_null(row_idx) {
                ""
            } else {
                column.value(row_idx)
            };
            row.insert(header, value);
        }
        rows.push(row);
    }
}

#[async_trait]
impl DatasetSource for CsvSource {
    #[instrument(skip(self), fields(dataset = %self.kind, path = %self.path.display()))]
    async fn fetch(&self) -> Result<RawTable> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            EngineError::fetch_with_source(
                self.kind,
                format!("could not read {}", self.path.display()),
                Box::new(e),
            )
        })?;

        let table = self.parse(&bytes)?;
        debug!(rows = table.len(), columns = table.headers.len(), "Parsed CSV dataset");
        Ok(table)
    }

    fn description(&self) -> String {
        format!("CSV {} ({})", self.kind, self.path.display())
    }
}
