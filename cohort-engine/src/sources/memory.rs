//! In-memory dataset source.

use super::{DatasetKind, DatasetSource};
use crate::error::Result;
use crate::normalize::{RawRow, RawTable};
use async_trait::async_trait;

/// Serves pre-built rows, e.g. rows decoded from an uploaded file.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    kind: DatasetKind,
    table: RawTable,
}

impl InMemorySource {
    pub fn new(kind: DatasetKind, table: RawTable) -> Self {
        Self { kind, table }
    }

    /// Builds a source whose header is taken from the first row.
    pub fn from_rows(kind: DatasetKind, rows: Vec<RawRow>) -> Self {
        Self::new(kind, RawTable::from_rows(rows))
    }

    /// A source with no rows and no header.
    pub fn empty(kind: DatasetKind) -> Self {
        Self::new(kind, RawTable::default())
    }
}

#[async_trait]
impl DatasetSource for InMemorySource {
    async fn fetch(&self) -> Result<RawTable> {
        Ok(self.table.clone())
    }

    fn description(&self) -> String {
        format!("in-memory {} ({} rows)", self.kind, self.table.len())
    }
}
