//! Publication sinks: polymorphic destinations for run records.
//!
//! Sink choice is a configuration-time decision; the orchestrator only sees
//! the [`PublicationSink`] capability. No sink retries on its own; whether a
//! failed publish is attempted again is the next scheduled run's business.

mod append_log;
mod sheets;
mod wordpress;

pub use append_log::AppendLogSink;
pub use sheets::SheetsSink;
pub use wordpress::WordPressSink;

use async_trait::async_trait;

use crate::config::SinkConfig;
use crate::error::PublishError;
use crate::models::PublicationRecord;

#[async_trait]
pub trait PublicationSink: Send + Sync {
    /// Short name used in logs and error reasons.
    fn name(&self) -> &'static str;

    /// Durably record one run outcome.
    async fn publish(&self, record: &PublicationRecord) -> Result<(), PublishError>;
}

/// Build the sink the configuration selected.
pub fn build_sink(sink: &SinkConfig, http: &reqwest::Client) -> Box<dyn PublicationSink> {
    match sink {
        SinkConfig::AppendLog { path } => Box::new(AppendLogSink::new(path.clone())),
        SinkConfig::Sheets {
            token,
            spreadsheet_id,
            range,
        } => Box::new(SheetsSink::new(
            http.clone(),
            token.clone(),
            spreadsheet_id.clone(),
            range.clone(),
        )),
        SinkConfig::WordPress {
            base_url,
            user,
            app_password,
        } => Box::new(WordPressSink::new(
            http.clone(),
            base_url.clone(),
            user.clone(),
            app_password.clone(),
        )),
    }
}
