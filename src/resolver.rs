//! Article resolution: best-effort retrieval of the full story text.
//!
//! The target site blocks obvious scrapers, so every request carries one of a
//! small pool of realistic browser identities. A 403 gets exactly one retry
//! with a different identity after a short backoff; everything else that goes
//! wrong collapses to [`ResolvedContent::empty`] so the run can fall back to
//! the feed description instead of dying.
//!
//! # Extraction
//!
//! Story pages keep their body under `div.articleBody` or
//! `div.articleBodyContent`. Paragraph text inside the container is flattened
//! into one blob, paragraphs separated by newlines, in document order.

use std::time::Duration;

use once_cell::sync::Lazy;
use rand::Rng;
use scraper::{Html, Selector};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::error::FetchError;
use crate::models::{ContentSource, ResolvedContent};

/// Bounded wait for a single article-page request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause before the single retry after a 403.
pub const BLOCK_BACKOFF: Duration = Duration::from_secs(3);

/// A browser-like identity presented to the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowserIdentity {
    pub user_agent: &'static str,
    pub accept_language: &'static str,
    pub referer: &'static str,
}

/// Fixed pool of identities the resolver rotates through.
pub const IDENTITY_POOL: &[BrowserIdentity] = &[
    BrowserIdentity {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
        accept_language: "en-US,en;q=0.9",
        referer: "https://www.google.com/",
    },
    BrowserIdentity {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
        accept_language: "en-US,en;q=0.8",
        referer: "https://duckduckgo.com/",
    },
    BrowserIdentity {
        user_agent: "Mozilla/5.0 (X11; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/127.0",
        accept_language: "en-GB,en;q=0.9",
        referer: "https://www.bing.com/",
    },
];

/// Strategy for picking an identity from the pool.
///
/// Pluggable so tests can drive the rotation deterministically.
pub trait IdentitySelector {
    /// Pick an index into a pool of `pool_len` identities, never returning
    /// `avoid` unless the pool has only one entry.
    fn pick(&self, pool_len: usize, avoid: Option<usize>) -> usize;
}

/// Production selector: uniform pseudo-random choice.
#[derive(Debug, Default)]
pub struct RandomSelector;

impl IdentitySelector for RandomSelector {
    fn pick(&self, pool_len: usize, avoid: Option<usize>) -> usize {
        let mut rng = rand::rng();
        loop {
            let idx = rng.random_range(0..pool_len);
            if Some(idx) != avoid || pool_len == 1 {
                return idx;
            }
        }
    }
}

/// A fetched page, whatever its status. Transport failures are `FetchError`s.
#[derive(Debug)]
pub struct PageResponse {
    pub status: u16,
    pub body: String,
}

impl PageResponse {
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Seam over the actual HTTP GET so the retry logic is testable without a
/// network.
pub trait FetchPage {
    async fn get(
        &self,
        url: &str,
        identity: &BrowserIdentity,
    ) -> Result<PageResponse, FetchError>;
}

/// Real page fetcher backed by reqwest.
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl FetchPage for HttpFetcher {
    async fn get(
        &self,
        url: &str,
        identity: &BrowserIdentity,
    ) -> Result<PageResponse, FetchError> {
        let resp = self
            .http
            .get(url)
            .header(reqwest::header::USER_AGENT, identity.user_agent)
            .header(reqwest::header::ACCEPT_LANGUAGE, identity.accept_language)
            .header(reqwest::header::REFERER, identity.referer)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(FetchError::from_reqwest)?;
        Ok(PageResponse { status, body })
    }
}

/// Seam the orchestrator depends on; lets pipeline tests stub resolution.
pub trait ResolveArticle {
    async fn resolve(&self, link: &str) -> ResolvedContent;
}

/// The resolver: at most two requests per run, then extraction.
pub struct ArticleResolver<F, S = RandomSelector> {
    fetcher: F,
    selector: S,
    backoff: Duration,
}

impl<F, S> ArticleResolver<F, S>
where
    F: FetchPage,
    S: IdentitySelector,
{
    pub fn new(fetcher: F, selector: S) -> Self {
        Self {
            fetcher,
            selector,
            backoff: BLOCK_BACKOFF,
        }
    }

    /// Override the 403 backoff. Tests use `Duration::ZERO`.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// One GET, plus one identity-rotated retry if the origin said 403.
    async fn fetch_with_retry(&self, link: &str) -> Option<String> {
        let first = self.selector.pick(IDENTITY_POOL.len(), None);
        match self.fetcher.get(link, &IDENTITY_POOL[first]).await {
            Ok(resp) if resp.is_success() => Some(resp.body),
            Ok(resp) if resp.status == 403 => {
                warn!(%link, "Origin refused the request (403); rotating identity and retrying once");
                sleep(self.backoff).await;
                let second = self.selector.pick(IDENTITY_POOL.len(), Some(first));
                match self.fetcher.get(link, &IDENTITY_POOL[second]).await {
                    Ok(resp) if resp.is_success() => Some(resp.body),
                    Ok(resp) => {
                        warn!(%link, status = resp.status, "Retry still refused");
                        None
                    }
                    Err(e) => {
                        warn!(%link, error = %e, "Retry failed");
                        None
                    }
                }
            }
            Ok(resp) => {
                warn!(%link, status = resp.status, "Article fetch returned non-success status");
                None
            }
            Err(e) => {
                warn!(%link, error = %e, "Article fetch failed");
                None
            }
        }
    }
}

impl<F, S> ResolveArticle for ArticleResolver<F, S>
where
    F: FetchPage,
    S: IdentitySelector,
{
    #[instrument(level = "info", skip(self))]
    async fn resolve(&self, link: &str) -> ResolvedContent {
        let Some(body) = self.fetch_with_retry(link).await else {
            return ResolvedContent::empty();
        };
        match extract_article_body(&body) {
            Some(text) => {
                info!(bytes = text.len(), "Extracted article body");
                ResolvedContent::full_article(text)
            }
            None => {
                warn!(%link, "No known content container in page");
                ResolvedContent::empty()
            }
        }
    }
}

static CONTAINER_SELECTORS: Lazy<[Selector; 2]> = Lazy::new(|| {
    [
        Selector::parse("div.articleBody").expect("valid selector"),
        Selector::parse("div.articleBodyContent").expect("valid selector"),
    ]
});

static PARAGRAPH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("valid selector"));

/// Locate the article container and flatten its paragraphs, in document
/// order, separated by newlines. `None` when no known container exists or
/// it holds no paragraph text.
pub fn extract_article_body(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let container = CONTAINER_SELECTORS
        .iter()
        .find_map(|sel| document.select(sel).next())?;

    let mut paragraphs = Vec::new();
    for p in container.select(&PARAGRAPH_SELECTOR) {
        let raw = p.text().collect::<Vec<_>>().join(" ");
        let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if !text.is_empty() {
            paragraphs.push(text);
        }
    }

    if paragraphs.is_empty() {
        None
    } else {
        Some(paragraphs.join("\n"))
    }
}

/// The fallback policy: resolver text when it produced any, otherwise the
/// feed description verbatim. Total; an empty result is an empty string,
/// never an error.
pub fn select_text(
    resolved: &ResolvedContent,
    fallback: Option<&str>,
) -> (String, ContentSource) {
    if resolved.is_empty() {
        debug!("Using feed description as content");
        (
            fallback.unwrap_or_default().to_string(),
            ContentSource::FeedDescription,
        )
    } else {
        debug!("Using resolved full-article content");
        (resolved.text.clone(), resolved.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const ARTICLE_FIXTURE: &str =
        r#"<html><body><div class="articleBody"><p>A</p><p>B</p></div></body></html>"#;

    /// Replays a scripted queue of responses and records the identity used
    /// for each request.
    struct ScriptedFetcher {
        responses: Mutex<VecDeque<Result<PageResponse, FetchError>>>,
        used_agents: Mutex<Vec<&'static str>>,
    }

    impl ScriptedFetcher {
        fn new(responses: Vec<Result<PageResponse, FetchError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                used_agents: Mutex::new(Vec::new()),
            }
        }

        fn request_count(&self) -> usize {
            self.used_agents.lock().unwrap().len()
        }
    }

    impl FetchPage for &ScriptedFetcher {
        async fn get(
            &self,
            _url: &str,
            identity: &BrowserIdentity,
        ) -> Result<PageResponse, FetchError> {
            self.used_agents.lock().unwrap().push(identity.user_agent);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("fetcher called more times than scripted")
        }
    }

    /// Deterministic rotation: 0, 1, 2, ... skipping the avoided index.
    struct SequentialSelector {
        next: std::cell::Cell<usize>,
    }

    impl SequentialSelector {
        fn new() -> Self {
            Self {
                next: std::cell::Cell::new(0),
            }
        }
    }

    impl IdentitySelector for SequentialSelector {
        fn pick(&self, pool_len: usize, avoid: Option<usize>) -> usize {
            let mut idx = self.next.get() % pool_len;
            if Some(idx) == avoid {
                idx = (idx + 1) % pool_len;
            }
            self.next.set(idx + 1);
            idx
        }
    }

    fn ok(status: u16, body: &str) -> Result<PageResponse, FetchError> {
        Ok(PageResponse {
            status,
            body: body.to_string(),
        })
    }

    fn resolver(fetcher: &ScriptedFetcher) -> ArticleResolver<&ScriptedFetcher, SequentialSelector> {
        ArticleResolver::new(fetcher, SequentialSelector::new()).with_backoff(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_403_then_200_resolves_with_rotated_identity() {
        let fetcher = ScriptedFetcher::new(vec![ok(403, "blocked"), ok(200, ARTICLE_FIXTURE)]);
        let resolved = resolver(&fetcher).resolve("https://example.com/story").await;

        assert_eq!(resolved.text, "A\nB");
        assert_eq!(resolved.source, ContentSource::FullArticle);
        let agents = fetcher.used_agents.lock().unwrap();
        assert_eq!(agents.len(), 2);
        assert_ne!(agents[0], agents[1], "retry must use a different identity");
    }

    #[tokio::test]
    async fn test_second_403_collapses_to_empty() {
        let fetcher = ScriptedFetcher::new(vec![ok(403, ""), ok(403, "")]);
        let resolved = resolver(&fetcher).resolve("https://example.com/story").await;

        assert!(resolved.is_empty());
        assert_eq!(fetcher.request_count(), 2);
    }

    #[tokio::test]
    async fn test_non_403_error_is_not_retried() {
        let fetcher = ScriptedFetcher::new(vec![ok(500, "oops")]);
        let resolved = resolver(&fetcher).resolve("https://example.com/story").await;

        assert!(resolved.is_empty());
        assert_eq!(fetcher.request_count(), 1);
    }

    #[tokio::test]
    async fn test_timeout_collapses_to_empty() {
        let fetcher = ScriptedFetcher::new(vec![Err(FetchError::Timeout)]);
        let resolved = resolver(&fetcher).resolve("https://example.com/story").await;

        assert!(resolved.is_empty());
        assert_eq!(resolved.source, ContentSource::Empty);
    }

    #[tokio::test]
    async fn test_missing_container_collapses_to_empty() {
        let fetcher = ScriptedFetcher::new(vec![ok(200, "<html><body><p>loose</p></body></html>")]);
        let resolved = resolver(&fetcher).resolve("https://example.com/story").await;

        assert!(resolved.is_empty());
    }

    #[test]
    fn test_extract_from_alternate_container() {
        let html = r#"<div class="articleBodyContent"><p>First para.</p><p>Second para.</p></div>"#;
        assert_eq!(
            extract_article_body(html).as_deref(),
            Some("First para.\nSecond para.")
        );
    }

    #[test]
    fn test_extract_normalizes_inner_whitespace() {
        let html = r##"<div class="articleBody"><p>  spaced   <a href="#">out</a>  </p><p>   </p></div>"##;
        assert_eq!(extract_article_body(html).as_deref(), Some("spaced out"));
    }

    #[test]
    fn test_extract_container_without_paragraphs_is_none() {
        let html = r#"<div class="articleBody"><span>no paragraphs</span></div>"#;
        assert_eq!(extract_article_body(html), None);
    }

    #[test]
    fn test_select_text_prefers_resolved() {
        let resolved = ResolvedContent::full_article("full text".to_string());
        let (text, source) = select_text(&resolved, Some("desc"));
        assert_eq!(text, "full text");
        assert_eq!(source, ContentSource::FullArticle);
    }

    #[test]
    fn test_select_text_falls_back_verbatim() {
        let resolved = ResolvedContent::empty();
        let (text, source) = select_text(&resolved, Some("the feed desc"));
        assert_eq!(text, "the feed desc");
        assert_eq!(source, ContentSource::FeedDescription);
    }

    #[test]
    fn test_select_text_with_nothing_is_empty_string() {
        let resolved = ResolvedContent::empty();
        assert_eq!(select_text(&resolved, None).0, "");
        assert_eq!(select_text(&resolved, Some("")).0, "");
    }

    #[test]
    fn test_random_selector_respects_avoid() {
        let selector = RandomSelector;
        for _ in 0..50 {
            assert_ne!(selector.pick(IDENTITY_POOL.len(), Some(0)), 0);
        }
    }

    #[test]
    fn test_random_selector_single_entry_pool() {
        let selector = RandomSelector;
        assert_eq!(selector.pick(1, Some(0)), 0);
    }
}
