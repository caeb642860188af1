//! Data models for one pipeline run.
//!
//! A run handles at most one feed item. The transient types here
//! ([`CandidateEntry`], [`ResolvedContent`], [`SummaryResult`]) live only for
//! the duration of a run; [`PublicationRecord`] is what the sinks persist.

use chrono::NaiveDate;

/// One feed item considered for processing in a run.
///
/// Produced by the feed reader; the pipeline consumes only the first entry
/// of the feed, in feed order.
#[derive(Debug, Clone)]
pub struct CandidateEntry {
    /// The item title as published in the feed.
    pub title: String,
    /// The item link. Unique key for deduplication.
    pub link: String,
    /// The feed's own short description, used as fallback text when the
    /// full article cannot be retrieved.
    pub description: Option<String>,
}

/// Where the text handed to the summarizer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    /// Paragraph text extracted from the article page itself.
    FullArticle,
    /// The feed-provided short description.
    FeedDescription,
    /// Nothing could be resolved; the resolver degraded to empty text.
    Empty,
}

/// Best-effort extracted article text, or the empty marker.
#[derive(Debug, Clone)]
pub struct ResolvedContent {
    pub text: String,
    pub source: ContentSource,
}

impl ResolvedContent {
    pub fn full_article(text: String) -> Self {
        Self {
            text,
            source: ContentSource::FullArticle,
        }
    }

    /// The marker returned when retrieval or extraction failed.
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            source: ContentSource::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// The AI-authored post body produced by the summarizer adapter.
#[derive(Debug, Clone)]
pub struct SummaryResult {
    pub body: String,
}

/// Terminal status of a run that reached the publication stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failed,
    Skipped,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "Success",
            RunStatus::Failed => "Failed",
            RunStatus::Skipped => "Skipped",
        }
    }
}

/// One row/post recorded by a publication sink.
#[derive(Debug, Clone)]
pub struct PublicationRecord {
    pub date: NaiveDate,
    pub content: String,
    pub status: RunStatus,
    pub source_link: String,
}

/// What a single run amounted to, as reported to the operator.
#[derive(Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Published { title: String },
    Skipped { title: String },
    Failed { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_resolved_content() {
        let empty = ResolvedContent::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.source, ContentSource::Empty);
    }

    #[test]
    fn test_whitespace_only_counts_as_empty() {
        let resolved = ResolvedContent::full_article("  \n\t ".to_string());
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_full_article_content() {
        let resolved = ResolvedContent::full_article("Some body text".to_string());
        assert!(!resolved.is_empty());
        assert_eq!(resolved.source, ContentSource::FullArticle);
    }

    #[test]
    fn test_run_status_labels() {
        assert_eq!(RunStatus::Success.as_str(), "Success");
        assert_eq!(RunStatus::Failed.as_str(), "Failed");
        assert_eq!(RunStatus::Skipped.as_str(), "Skipped");
    }
}
