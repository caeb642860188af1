//! RSS feed reader for the security-news source.
//!
//! Deserializes a plain RSS 2.0 `<channel>` with serde over `quick-xml`.
//! The pipeline only ever looks at the first entry, but parsing keeps the
//! full feed order so that decision stays in the orchestrator.

use quick_xml::de::from_str;
use serde::Deserialize;
use tracing::{info, instrument, warn};
use url::Url;

use crate::error::FeedError;
use crate::models::CandidateEntry;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
}

/// Fetch the feed and return its entries in feed order.
#[instrument(level = "info", skip(http))]
pub async fn fetch_entries(
    http: &reqwest::Client,
    feed_url: &str,
) -> Result<Vec<CandidateEntry>, FeedError> {
    let body = http
        .get(feed_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    parse_entries(&body)
}

/// Parse RSS XML into candidate entries. Items without a usable link are
/// skipped; they cannot be resolved or deduplicated.
pub fn parse_entries(xml: &str) -> Result<Vec<CandidateEntry>, FeedError> {
    let cleaned = scrub_html_entities(xml);
    let rss: Rss = from_str(&cleaned)?;

    let mut entries = Vec::with_capacity(rss.channel.items.len());
    for item in rss.channel.items {
        let Some(link) = item.link.filter(|l| !l.trim().is_empty()) else {
            warn!("Feed item without a link; skipping");
            continue;
        };
        if Url::parse(&link).is_err() {
            warn!(%link, "Feed item link is not a valid URL; skipping");
            continue;
        }
        entries.push(CandidateEntry {
            title: item.title.unwrap_or_default(),
            link,
            description: item.description,
        });
    }

    info!(count = entries.len(), "Parsed feed entries");
    Ok(entries)
}

/// Replace HTML-only entities that strict XML parsing rejects.
fn scrub_html_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
