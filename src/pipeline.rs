//! Orchestrator: one scheduled run through the pipeline.
//!
//! `FetchFeed -> CheckDedup -> ResolveContent -> Summarize -> Publish ->
//! RecordOutcome`. Every fatal failure past the dedup check becomes a
//! recorded `Failed` outcome instead of an uncaught crash, so each run
//! terminates with something observable in the sink and the logs.

use chrono::{Local, NaiveDate};
use tracing::{debug, error, info, instrument, warn};

use crate::config::Config;
use crate::dedup::DedupGuard;
use crate::feed;
use crate::models::{CandidateEntry, PublicationRecord, RunOutcome, RunStatus, SummaryResult};
use crate::resolver::{ResolveArticle, select_text};
use crate::sinks::PublicationSink;
use crate::summarizer::Summarize;

/// Fetch the feed and process its top entry.
#[instrument(level = "info", skip_all, fields(feed_url = %config.feed_url))]
pub async fn run<R, S>(
    config: &Config,
    http: &reqwest::Client,
    resolver: &R,
    summarizer: &S,
    sink: &dyn PublicationSink,
    dedup: &mut DedupGuard,
) -> RunOutcome
where
    R: ResolveArticle,
    S: Summarize,
{
    let entries = match feed::fetch_entries(http, &config.feed_url).await {
        Ok(entries) => entries,
        Err(e) => {
            error!(error = %e, "Feed fetch failed");
            return record_failure(sink, "", format!("feed fetch failed: {e}")).await;
        }
    };
    process(config.record_skips, resolver, summarizer, sink, dedup, entries).await
}

/// The state machine proper, from the candidate list onward.
pub async fn process<R, S>(
    record_skips: bool,
    resolver: &R,
    summarizer: &S,
    sink: &dyn PublicationSink,
    dedup: &mut DedupGuard,
    entries: Vec<CandidateEntry>,
) -> RunOutcome
where
    R: ResolveArticle,
    S: Summarize,
{
    let Some(top) = entries.into_iter().next() else {
        warn!("No entries found in feed");
        return record_failure(sink, "", "no entries in feed".to_string()).await;
    };
    info!(title = %top.title, link = %top.link, "Top candidate entry");

    if !dedup.is_new(&top.link) {
        info!(link = %top.link, "Candidate already processed; skipping");
        if record_skips {
            let record = PublicationRecord {
                date: today(),
                content: format!("Skipped: already posted {}", top.link),
                status: RunStatus::Skipped,
                source_link: top.link.clone(),
            };
            if let Err(e) = sink.publish(&record).await {
                warn!(sink = sink.name(), error = %e, "Could not record skip");
            }
        }
        return RunOutcome::Skipped { title: top.title };
    }

    let resolved = resolver.resolve(&top.link).await;
    if resolved.is_empty() {
        info!("Full article unavailable; using feed description as fallback");
    }
    let (text, content_source) = select_text(&resolved, top.description.as_deref());
    debug!(
        source = ?content_source,
        preview = %truncate_for_log(&text, 500),
        "Content handed to the summarizer"
    );

    let summary: SummaryResult = match summarizer.summarize(&top.title, &top.link, &text).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "Summarization failed");
            return record_failure(sink, &top.link, format!("summarization failed: {e}")).await;
        }
    };
    info!(preview = %truncate_for_log(&summary.body, 500), "Summary produced");

    let record = PublicationRecord {
        date: today(),
        content: summary.body,
        status: RunStatus::Success,
        source_link: top.link.clone(),
    };
    match sink.publish(&record).await {
        Ok(()) => {
            // The slot is only advanced after a confirmed publish; a
            // persistence failure here means the next run may repeat this
            // article, which beats losing one.
            if let Err(e) = dedup.mark_processed(&top.link) {
                warn!(error = %e, "Failed to persist dedup state");
            }
            RunOutcome::Published { title: top.title }
        }
        Err(e) => {
            error!(sink = sink.name(), error = %e, "Publish failed; dedup state left unchanged");
            RunOutcome::Failed {
                reason: format!("publish failed: {e}"),
            }
        }
    }
}

/// Record a fatal outcome in the sink, best effort, and surface it.
async fn record_failure(
    sink: &dyn PublicationSink,
    source_link: &str,
    reason: String,
) -> RunOutcome {
    let record = PublicationRecord {
        date: today(),
        content: reason.clone(),
        status: RunStatus::Failed,
        source_link: source_link.to_string(),
    };
    if let Err(e) = sink.publish(&record).await {
        warn!(sink = sink.name(), error = %e, "Could not record failure outcome");
    }
    RunOutcome::Failed { reason }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Truncate a string for log previews, noting how much was cut.
pub(crate) fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…(+{} bytes)", &s[..end], s.len() - end)
    }
}
