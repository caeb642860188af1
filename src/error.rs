//! Error types for the pipeline stages.
//!
//! Each stage has its own error enum so the orchestrator can decide, per
//! stage, whether a failure degrades gracefully (fetching/extraction) or
//! terminates the run with a recorded `Failed` outcome (summarization,
//! publishing).

use thiserror::Error;

/// Startup configuration problems. These abort the process before a run
/// begins; everything else becomes a recorded outcome instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required option: {0}")]
    MissingRequired(String),
}

/// Failure to retrieve or parse the RSS feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed XML did not parse: {0}")]
    Parse(#[from] quick_xml::DeError),
}

/// Failure of a single article-page request.
///
/// Never propagated past the resolver: a fetch failure collapses to
/// [`crate::models::ResolvedContent::empty`] and the run falls back to the
/// feed description.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,
}

impl FetchError {
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// The text-transform service was unreachable or returned nothing usable.
/// Fatal for the run; recorded as a `Failed` outcome.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("summarization request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("summarization service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("summarization service returned no usable output")]
    EmptyResponse,
}

/// A sink could not durably record the run.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("{sink} rejected the record: {reason}")]
    Rejected { sink: &'static str, reason: String },

    #[error("{sink} request failed: {source}")]
    Http {
        sink: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("append log I/O error: {0}")]
    Io(#[from] std::io::Error),
}
