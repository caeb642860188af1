//! WordPress REST create-post sink.
//!
//! Publishes the summary as a live post via `/wp-json/wp/v2/posts` with an
//! application password. The API signals creation with 201; any other status
//! is a failed publish carrying the response body as the reason.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde_json::{Value, json};
use tracing::info;

use super::PublicationSink;
use crate::error::PublishError;
use crate::models::PublicationRecord;

pub struct WordPressSink {
    http: reqwest::Client,
    base_url: String,
    user: String,
    app_password: String,
}

impl WordPressSink {
    pub fn new(http: reqwest::Client, base_url: String, user: String, app_password: String) -> Self {
        Self {
            http,
            base_url,
            user,
            app_password,
        }
    }

    fn posts_url(&self) -> String {
        format!("{}/wp-json/wp/v2/posts", self.base_url.trim_end_matches('/'))
    }
}

fn post_title(date: NaiveDate) -> String {
    format!("Security brief for {date}")
}

/// Escapes quotes as well so the result is safe in attribute position.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Create-post payload: summary as HTML paragraphs plus a source link,
/// published immediately under the run's date.
pub(crate) fn post_body(record: &PublicationRecord) -> Value {
    let summary_html = html_escape(&record.content).replace('\n', "<br/>");
    let link_html = html_escape(&record.source_link);
    let content = format!(
        "<p>{}</p>\n<p>Source: <a href=\"{}\">{}</a></p>",
        summary_html, link_html, link_html
    );
    json!({
        "title": post_title(record.date),
        "content": content,
        "date": format!("{}T00:00:00", record.date),
        "status": "publish",
    })
}

#[async_trait]
impl PublicationSink for WordPressSink {
    fn name(&self) -> &'static str {
        "wordpress"
    }

    async fn publish(&self, record: &PublicationRecord) -> Result<(), PublishError> {
        let resp = self
            .http
            .post(self.posts_url())
            .basic_auth(&self.user, Some(&self.app_password))
            .json(&post_body(record))
            .send()
            .await
            .map_err(|source| PublishError::Http {
                sink: self.name(),
                source,
            })?;

        let status = resp.status();
        if status != StatusCode::CREATED {
            let reason = resp.text().await.unwrap_or_default();
            return Err(PublishError::Rejected {
                sink: self.name(),
                reason: format!("HTTP {status}: {reason}"),
            });
        }

        info!(url = %self.posts_url(), "Created WordPress post");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunStatus;

    fn record() -> PublicationRecord {
        PublicationRecord {
            date: NaiveDate::from_ymd_opt(2026, 8, 26).unwrap(),
            content: "Headline\nA summary with <tags> & ampersands.".to_string(),
            status: RunStatus::Success,
            source_link: "https://example.com/story".to_string(),
        }
    }

    #[test]
    fn test_post_body_publishes_under_run_date() {
        let body = post_body(&record());
        assert_eq!(body["status"], "publish");
        assert_eq!(body["date"], "2026-08-26T00:00:00");
        assert_eq!(body["title"], "Security brief for 2026-08-26");
    }

    #[test]
    fn test_post_body_embeds_summary_and_source_link() {
        let body = post_body(&record());
        let content = body["content"].as_str().unwrap();
        assert!(content.contains("Headline<br/>A summary"));
        assert!(content.contains("&lt;tags&gt; &amp; ampersands."));
        assert!(content.contains("<a href=\"https://example.com/story\">"));
    }

    #[test]
    fn test_post_body_escapes_quotes_in_source_link() {
        let mut rec = record();
        rec.source_link = "https://example.com/a\"onmouseover=\"alert(1)".to_string();
        let body = post_body(&rec);
        let content = body["content"].as_str().unwrap();
        // The quote must not close the href attribute early.
        assert!(!content.contains("onmouseover=\"alert"));
        assert!(content.contains(
            "<a href=\"https://example.com/a&quot;onmouseover=&quot;alert(1)\">"
        ));
    }

    #[test]
    fn test_posts_url_normalizes_trailing_slash() {
        let sink = WordPressSink::new(
            reqwest::Client::new(),
            "https://blog.example.com/".to_string(),
            "u".to_string(),
            "p".to_string(),
        );
        assert_eq!(sink.posts_url(), "https://blog.example.com/wp-json/wp/v2/posts");
    }
}
