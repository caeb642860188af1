//! # secbrief
//!
//! A scheduled content pipeline for security news: each run takes the newest
//! entry from an RSS feed, resolves the best available article text despite
//! anti-scraping blocking, produces a short AI-authored summary, and records
//! the result in a configurable publication sink.
//!
//! ## Pipeline
//!
//! 1. **Feed**: fetch the RSS feed and take the top entry
//! 2. **Dedup**: skip the run if that entry was the last one published
//! 3. **Resolve**: fetch the article page with a rotating browser identity,
//!    falling back to the feed description when blocked
//! 4. **Summarize**: one chat-completions call with a fixed prompt
//! 5. **Publish**: append log, Google Sheets, or WordPress, per configuration
//!
//! A scheduler (cron or similar) is expected to ensure non-overlapping runs.
//!
//! ## Usage
//!
//! ```sh
//! OPENAI_API_KEY=... secbrief --sink log
//! ```

use std::error::Error;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod dedup;
mod error;
mod feed;
mod models;
mod pipeline;
mod resolver;
mod sinks;
mod summarizer;

use cli::Cli;
use config::Config;
use dedup::DedupGuard;
use models::RunOutcome;
use resolver::{ArticleResolver, HttpFetcher, RandomSelector};
use summarizer::OpenAiSummarizer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("secbrief starting up");

    let args = Cli::parse();
    let config = Config::from_cli(args)?;

    let http = reqwest::Client::builder()
        .user_agent(concat!("secbrief/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(60))
        .build()?;

    let resolver = ArticleResolver::new(HttpFetcher::new(http.clone()), RandomSelector);
    let summarizer = OpenAiSummarizer::new(http.clone(), &config.summarizer);
    let sink = sinks::build_sink(&config.sink, &http);
    let mut dedup = DedupGuard::load(&config.state_path);
    info!(last = ?dedup.last_processed_link(), "Dedup state loaded");

    let outcome = pipeline::run(
        &config,
        &http,
        &resolver,
        &summarizer,
        sink.as_ref(),
        &mut dedup,
    )
    .await;

    // One human-readable status line per run; the process exits normally in
    // all cases so the scheduler keeps its cadence.
    match &outcome {
        RunOutcome::Published { title } => println!("secbrief: published post for \"{title}\""),
        RunOutcome::Skipped { title } => println!("secbrief: skipped, already posted \"{title}\""),
        RunOutcome::Failed { reason } => println!("secbrief: run failed: {reason}"),
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
