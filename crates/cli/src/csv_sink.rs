//! File-backed [`RowSink`]: one buffered CSV file per table.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use collector::{ExportTable, RowSink, SinkError};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};

/// Writes every table to `<dir>/<table file name>`.
///
/// All files are created (and truncated) up front so a run that fails early
/// still leaves a consistent set of files behind.
#[derive(Debug)]
pub struct CsvFileSink {
    dir: PathBuf,
    writers: BTreeMap<ExportTable, BufWriter<File>>,
}

impl CsvFileSink {
    /// Creates `dir` if needed and opens one file per table.
    pub async fn create(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;

        let mut writers = BTreeMap::new();
        for table in ExportTable::ALL {
            let file = File::create(dir.join(table.file_name())).await?;
            writers.insert(table, BufWriter::new(file));
        }
        debug!(dir = %dir.display(), "Opened output files");
        Ok(Self { dir, writers })
    }
}

#[async_trait]
impl RowSink for CsvFileSink {
    async fn write_line(&mut self, table: ExportTable, line: &str) -> Result<(), SinkError> {
        let writer = self.writers.get_mut(&table).ok_or(SinkError::Closed {
            table: table.file_name(),
        })?;
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|source| SinkError::Io {
                table: table.file_name(),
                source,
            })
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        for (table, mut writer) in std::mem::take(&mut self.writers) {
            writer.shutdown().await.map_err(|source| SinkError::Io {
                table: table.file_name(),
                source,
            })?;
        }
        info!(dir = %self.dir.display(), "Wrote CSV files");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_one_file_per_table() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("nested").join("data");

        let mut sink = CsvFileSink::create(&out).await.unwrap();
        for table in ExportTable::ALL {
            sink.write_line(table, &table.header()).await.unwrap();
        }
        sink.write_line(ExportTable::Reviews, "widgets,1,ann@acme.dev,APPROVED,\n")
            .await
            .unwrap();
        sink.finish().await.unwrap();

        for table in ExportTable::ALL {
            let text = std::fs::read_to_string(out.join(table.file_name())).unwrap();
            assert!(text.starts_with(&table.header()));
        }
        let reviews = std::fs::read_to_string(out.join("reviews.csv")).unwrap();
        assert!(reviews.ends_with("widgets,1,ann@acme.dev,APPROVED,\n"));
        assert_eq!(reviews.lines().count(), 2);
    }

    #[tokio::test]
    async fn existing_files_are_truncated() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("repos.csv"), "stale\nrows\n").unwrap();

        let mut sink = CsvFileSink::create(tmp.path()).await.unwrap();
        sink.finish().await.unwrap();

        let repos = std::fs::read_to_string(tmp.path().join("repos.csv")).unwrap();
        assert!(repos.is_empty());
    }

    #[tokio::test]
    async fn writing_after_finish_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let mut sink = CsvFileSink::create(tmp.path()).await.unwrap();
        sink.finish().await.unwrap();

        let err = sink
            .write_line(ExportTable::Users, "late\n")
            .await
            .unwrap_err();
        assert!(matches!(err, SinkError::Closed { table: "users.csv" }));
    }
}
