//! Append-only CSV log sink.
//!
//! Mirrors the spreadsheet-less setup: one `(date, content)` row per run,
//! header written when the file is first created. Rows are RFC-4180 quoted
//! because summaries routinely contain commas and newlines.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use super::PublicationSink;
use crate::error::PublishError;
use crate::models::PublicationRecord;

const HEADER: &str = "Date,Post Content\n";

pub struct AppendLogSink {
    path: PathBuf,
}

impl AppendLogSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

/// Quote a CSV field when it contains a delimiter, quote, or line break.
fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[async_trait]
impl PublicationSink for AppendLogSink {
    fn name(&self) -> &'static str {
        "append-log"
    }

    async fn publish(&self, record: &PublicationRecord) -> Result<(), PublishError> {
        let is_new = !self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if is_new {
            file.write_all(HEADER.as_bytes())?;
        }

        let row = format!("{},{}\n", record.date, csv_field(&record.content));
        file.write_all(row.as_bytes())?;
        info!(path = %self.path.display(), status = record.status.as_str(), "Appended post row");
        Ok(())
    }
}
