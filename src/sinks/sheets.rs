//! Google Sheets append sink.
//!
//! One `values:append` call per run against a named range. The row layout is
//! `(date, content, draft flag, run status, source link)`; the response's
//! updated-row count is logged for observability.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use super::PublicationSink;
use crate::error::PublishError;
use crate::models::PublicationRecord;

pub struct SheetsSink {
    http: reqwest::Client,
    token: String,
    spreadsheet_id: String,
    range: String,
}

impl SheetsSink {
    pub fn new(http: reqwest::Client, token: String, spreadsheet_id: String, range: String) -> Self {
        Self {
            http,
            token,
            spreadsheet_id,
            range,
        }
    }

    fn append_url(&self) -> String {
        format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}/values/{}:append?valueInputOption=USER_ENTERED",
            self.spreadsheet_id, self.range
        )
    }
}

/// Request body for the append call: one row in the range's column order.
pub(crate) fn row_values(record: &PublicationRecord) -> Value {
    json!({
        "values": [[
            record.date.to_string(),
            record.content,
            "FALSE",
            record.status.as_str(),
            record.source_link,
        ]]
    })
}

#[derive(Deserialize)]
struct AppendResponse {
    updates: Option<Updates>,
}

#[derive(Deserialize)]
struct Updates {
    #[serde(rename = "updatedRows")]
    updated_rows: Option<u32>,
}

#[async_trait]
impl PublicationSink for SheetsSink {
    fn name(&self) -> &'static str {
        "sheets"
    }

    async fn publish(&self, record: &PublicationRecord) -> Result<(), PublishError> {
        let resp = self
            .http
            .post(self.append_url())
            .bearer_auth(&self.token)
            .json(&row_values(record))
            .send()
            .await
            .map_err(|source| PublishError::Http {
                sink: self.name(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let reason = resp.text().await.unwrap_or_default();
            return Err(PublishError::Rejected {
                sink: self.name(),
                reason: format!("HTTP {status}: {reason}"),
            });
        }

        let body: AppendResponse = resp.json().await.map_err(|source| PublishError::Http {
            sink: self.name(),
            source,
        })?;
        let rows = body.updates.and_then(|u| u.updated_rows).unwrap_or(0);
        info!(rows, range = %self.range, "Appended spreadsheet row");
        Ok(())
    }
}
