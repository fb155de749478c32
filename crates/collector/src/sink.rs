//! In-memory [`RowSink`].

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::{ExportTable, RowSink, SinkError};

/// Keeps every written line per table. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryRowSink {
    tables: BTreeMap<ExportTable, Vec<String>>,
    finished: bool,
}

impl MemoryRowSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines written to `table`, header included, without trailing newlines.
    pub fn lines(&self, table: ExportTable) -> Vec<&str> {
        self.tables
            .get(&table)
            .map(|lines| lines.iter().map(|l| l.trim_end_matches('\n')).collect())
            .unwrap_or_default()
    }

    /// Data lines written to `table`, skipping the header.
    pub fn rows(&self, table: ExportTable) -> Vec<&str> {
        self.lines(table).into_iter().skip(1).collect()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

#[async_trait]
impl RowSink for MemoryRowSink {
    async fn write_line(&mut self, table: ExportTable, line: &str) -> Result<(), SinkError> {
        if self.finished {
            return Err(SinkError::Closed {
                table: table.file_name(),
            });
        }
        self.tables.entry(table).or_default().push(line.to_string());
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        self.finished = true;
        Ok(())
    }
}
