//! Runtime configuration, assembled once at process start.
//!
//! All credentials and endpoints live in this struct and are passed by
//! reference into the components that need them. Sink-specific requirements
//! are validated here so a misconfigured sink fails before any network work.

use std::path::PathBuf;

use crate::cli::{Cli, SinkChoice};
use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
}

/// Sink selection with the credentials that sink requires.
#[derive(Debug, Clone)]
pub enum SinkConfig {
    AppendLog {
        path: PathBuf,
    },
    Sheets {
        token: String,
        spreadsheet_id: String,
        range: String,
    },
    WordPress {
        base_url: String,
        user: String,
        app_password: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub feed_url: String,
    pub state_path: PathBuf,
    pub record_skips: bool,
    pub summarizer: SummarizerConfig,
    pub sink: SinkConfig,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let sink = match cli.sink {
            SinkChoice::Log => SinkConfig::AppendLog { path: cli.log_path },
            SinkChoice::Sheets => SinkConfig::Sheets {
                token: require(cli.sheets_token, "--sheets-token / SHEETS_TOKEN")?,
                spreadsheet_id: require(
                    cli.sheets_spreadsheet_id,
                    "--sheets-spreadsheet-id / SHEETS_SPREADSHEET_ID",
                )?,
                range: cli.sheets_range,
            },
            SinkChoice::Wordpress => SinkConfig::WordPress {
                base_url: require(cli.wp_base_url, "--wp-base-url / WP_BASE_URL")?,
                user: require(cli.wp_user, "--wp-user / WP_USER")?,
                app_password: require(cli.wp_app_password, "--wp-app-password / WP_APP_PASSWORD")?,
            },
        };

        Ok(Self {
            feed_url: cli.feed_url,
            state_path: cli.state_path,
            record_skips: cli.record_skips,
            summarizer: SummarizerConfig {
                api_key: cli.openai_api_key,
                model: cli.model,
                endpoint: cli.openai_endpoint,
            },
            sink,
        })
    }
}

fn require(value: Option<String>, key: &str) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingRequired(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_log_sink_needs_no_credentials() {
        let cli = Cli::parse_from(["secbrief", "--openai-api-key", "k"]);
        let config = Config::from_cli(cli).unwrap();
        assert!(matches!(config.sink, SinkConfig::AppendLog { .. }));
        assert_eq!(config.summarizer.model, "gpt-4o-mini");
    }

    #[test]
    fn test_sheets_sink_requires_token_and_spreadsheet() {
        let cli = Cli::parse_from(["secbrief", "--openai-api-key", "k", "--sink", "sheets"]);
        let err = Config::from_cli(cli).unwrap_err();
        assert!(err.to_string().contains("SHEETS_TOKEN"));
    }

    #[test]
    fn test_wordpress_sink_with_full_credentials() {
        let cli = Cli::parse_from([
            "secbrief",
            "--openai-api-key",
            "k",
            "--sink",
            "wordpress",
            "--wp-base-url",
            "https://blog.example.com",
            "--wp-user",
            "poster",
            "--wp-app-password",
            "s3cret",
        ]);
        let config = Config::from_cli(cli).unwrap();
        match config.sink {
            SinkConfig::WordPress { base_url, user, .. } => {
                assert_eq!(base_url, "https://blog.example.com");
                assert_eq!(user, "poster");
            }
            other => panic!("expected WordPress sink, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_credential_counts_as_missing() {
        let cli = Cli::parse_from([
            "secbrief",
            "--openai-api-key",
            "k",
            "--sink",
            "sheets",
            "--sheets-token",
            "  ",
            "--sheets-spreadsheet-id",
            "sheet-1",
        ]);
        assert!(Config::from_cli(cli).is_err());
    }
}
