//! Command-line interface definitions for secbrief.
//!
//! Every credential and endpoint can come from a flag or an environment
//! variable, so the binary works the same under cron, CI schedulers, or an
//! interactive shell.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::summarizer;

/// Which publication sink records the run.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkChoice {
    /// Append a row to a local CSV log.
    Log,
    /// Append a row to a Google Sheets range.
    Sheets,
    /// Publish a post through the WordPress REST API.
    Wordpress,
}

/// Command-line arguments for the secbrief pipeline.
///
/// # Examples
///
/// ```sh
/// # Default run: CSV append log in the working directory
/// secbrief
///
/// # Record to a spreadsheet instead
/// secbrief --sink sheets --sheets-spreadsheet-id ID --sheets-token TOKEN
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// RSS feed polled for the newest story
    #[arg(
        long,
        env = "SECBRIEF_FEED_URL",
        default_value = "https://www.bleepingcomputer.com/feed/"
    )]
    pub feed_url: String,

    /// Path of the single-slot dedup state file
    #[arg(long, env = "SECBRIEF_STATE_PATH", default_value = ".secbrief_state.json")]
    pub state_path: PathBuf,

    /// Publication sink recording the run
    #[arg(long, value_enum, env = "SECBRIEF_SINK", default_value = "log")]
    pub sink: SinkChoice,

    /// Also record runs the dedup guard skipped
    #[arg(long)]
    pub record_skips: bool,

    /// API key for the summarization service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    /// Model used for summarization
    #[arg(long, env = "SECBRIEF_MODEL", default_value = "gpt-4o-mini")]
    pub model: String,

    /// Chat-completions endpoint (any OpenAI-compatible server)
    #[arg(long, env = "SECBRIEF_OPENAI_ENDPOINT", default_value = summarizer::DEFAULT_ENDPOINT)]
    pub openai_endpoint: String,

    /// CSV file used by the append-log sink
    #[arg(long, env = "SECBRIEF_LOG_PATH", default_value = "posts_log.csv")]
    pub log_path: PathBuf,

    /// OAuth bearer token for the sheets sink
    #[arg(long, env = "SHEETS_TOKEN", hide_env_values = true)]
    pub sheets_token: Option<String>,

    /// Target spreadsheet for the sheets sink
    #[arg(long, env = "SHEETS_SPREADSHEET_ID")]
    pub sheets_spreadsheet_id: Option<String>,

    /// Named range rows are appended to
    #[arg(long, env = "SHEETS_RANGE", default_value = "Posts!A:E")]
    pub sheets_range: String,

    /// WordPress site base URL, e.g. https://blog.example.com
    #[arg(long, env = "WP_BASE_URL")]
    pub wp_base_url: Option<String>,

    /// WordPress user the post is created as
    #[arg(long, env = "WP_USER")]
    pub wp_user: Option<String>,

    /// WordPress application password
    #[arg(long, env = "WP_APP_PASSWORD", hide_env_values = true)]
    pub wp_app_password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["secbrief", "--openai-api-key", "test-key"]);
        assert_eq!(cli.feed_url, "https://www.bleepingcomputer.com/feed/");
        assert_eq!(cli.model, "gpt-4o-mini");
        assert_eq!(cli.sink, SinkChoice::Log);
        assert_eq!(cli.log_path, PathBuf::from("posts_log.csv"));
        assert!(!cli.record_skips);
    }

    #[test]
    fn test_cli_sink_selection() {
        let cli = Cli::parse_from([
            "secbrief",
            "--openai-api-key",
            "test-key",
            "--sink",
            "wordpress",
            "--wp-base-url",
            "https://blog.example.com",
        ]);
        assert_eq!(cli.sink, SinkChoice::Wordpress);
        assert_eq!(cli.wp_base_url.as_deref(), Some("https://blog.example.com"));
    }

    #[test]
    fn test_cli_record_skips_flag() {
        let cli = Cli::parse_from(["secbrief", "--openai-api-key", "k", "--record-skips"]);
        assert!(cli.record_skips);
    }
}
