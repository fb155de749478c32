//! Command-line arguments and their validation into [`ExportConfig`].
//!
//! Validation is pure: it reads nothing from the environment beyond what clap
//! already collected, so a bad configuration is rejected before any network or
//! filesystem access.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use collector::OrganizationName;
use github::DEFAULT_API_URL;
use thiserror::Error;

/// Secondary token variable consulted when `GITHUB_TOKEN` is unset.
pub const FALLBACK_TOKEN_VAR: &str = "GH_TOKEN";

/// Export a GitHub organization's repositories, commits, pull requests,
/// reviews and contributors into CSV tables.
#[derive(Debug, Parser)]
#[command(name = "org-export", version)]
pub struct Args {
    /// Organization login to export.
    #[arg(env = "GITHUB_ORG")]
    pub organization: Option<String>,

    /// API token. Falls back to GH_TOKEN when GITHUB_TOKEN is unset.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Directory the CSV files are written to.
    #[arg(long, short = 'o', default_value = "data")]
    pub out_dir: PathBuf,

    /// Pause between two repositories, in milliseconds.
    #[arg(long, default_value_t = 500)]
    pub pace_ms: u64,

    /// REST API root. GraphQL is derived from it.
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// OTLP collector endpoint for trace export.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Collect everything but keep rows in memory instead of writing files.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No organization given: pass it as an argument or set GITHUB_ORG")]
    MissingOrganization,

    #[error("No token found: set GITHUB_TOKEN or GH_TOKEN")]
    MissingToken,

    #[error("Invalid API URL '{0}': expected an http:// or https:// URL")]
    InvalidApiUrl(String),
}

/// Validated settings for one export.
#[derive(Clone)]
pub struct ExportConfig {
    pub organization: OrganizationName,
    pub token: String,
    pub out_dir: PathBuf,
    pub pacing: Duration,
    pub api_url: String,
    pub dry_run: bool,
}

impl std::fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportConfig")
            .field("organization", &self.organization)
            .field("token", &"<redacted>")
            .field("out_dir", &self.out_dir)
            .field("pacing", &self.pacing)
            .field("api_url", &self.api_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl ExportConfig {
    /// Validates `args`. `fallback_token` is the value of
    /// [`FALLBACK_TOKEN_VAR`], used only when no primary token was given.
    pub fn from_args(args: Args, fallback_token: Option<String>) -> Result<Self, ConfigError> {
        let organization = args
            .organization
            .as_deref()
            .map(str::trim)
            .and_then(OrganizationName::new)
            .ok_or(ConfigError::MissingOrganization)?;

        let token = [args.token, fallback_token]
            .into_iter()
            .flatten()
            .map(|t| t.trim().to_string())
            .find(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let api_url = args.api_url.trim().to_string();
        if !(api_url.starts_with("https://") || api_url.starts_with("http://")) {
            return Err(ConfigError::InvalidApiUrl(api_url));
        }

        Ok(Self {
            organization,
            token,
            out_dir: args.out_dir,
            pacing: Duration::from_millis(args.pace_ms),
            api_url,
            dry_run: args.dry_run,
        })
    }
}
