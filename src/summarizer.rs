//! Summarizer adapter for an OpenAI-compatible chat-completions endpoint.
//!
//! Pure adapter: one fixed prompt, one request, no retry. A failure here is
//! fatal for the run and the orchestrator records it as a `Failed` outcome.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::SummarizerConfig;
use crate::error::SummarizeError;
use crate::models::SummaryResult;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Fixed attribution appended to every generated post.
const CLOSING_LINE: &str = "This post was generated automatically from today's security news.";

/// Seam the orchestrator depends on; pipeline tests substitute a mock.
pub trait Summarize {
    async fn summarize(
        &self,
        title: &str,
        link: &str,
        text: &str,
    ) -> Result<SummaryResult, SummarizeError>;
}

pub struct OpenAiSummarizer {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiSummarizer {
    pub fn new(http: reqwest::Client, config: &SummarizerConfig) -> Self {
        Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// The fixed prompt. Title, link and article text are embedded verbatim;
/// length is bounded by what the resolver can extract.
pub fn build_prompt(title: &str, link: &str, text: &str) -> String {
    format!(
        "Summarize this cybersecurity news in a professional LinkedIn tone.\n\
         Title: {title}\n\
         Link: {link}\n\
         Article Content: {text}\n\n\
         Format:\n\
         - Headline\n\
         - 2-3 sentence summary\n\
         - Why it matters\n\
         - Security tip\n\
         End with: \"{CLOSING_LINE}\"\n"
    )
}

impl Summarize for OpenAiSummarizer {
    #[instrument(level = "info", skip_all, fields(%link))]
    async fn summarize(
        &self,
        title: &str,
        link: &str,
        text: &str,
    ) -> Result<SummaryResult, SummarizeError> {
        let prompt = build_prompt(title, link, text);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: 0.7,
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SummarizeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = resp.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(SummarizeError::EmptyResponse);
        }

        info!(bytes = content.len(), model = %self.model, "Received summary");
        Ok(SummaryResult { body: content })
    }
}
