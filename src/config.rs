use clap::Parser;
use dotenv::dotenv;
use std::env;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/predict";

#[derive(Parser, Debug, Default)]
#[command(name = "cancer-classifier", about = "Upload gene expression data for cancer classification")]
pub struct Cli {
    /// Prediction endpoint receiving the multipart upload
    #[arg(long)]
    pub endpoint: Option<String>,
    /// Abort requests after this many seconds (no limit when unset)
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub endpoint: String,
    pub request_timeout: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: None,
        }
    }
}

impl Settings {
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(endpoint) = cli.endpoint.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            self.endpoint = endpoint.to_string();
        }
        if let Some(secs) = cli.timeout_secs {
            self.request_timeout = timeout_from_secs(secs);
        }
        self
    }
}

/// Loads `.env` (once per process is enough; later calls are no-ops), then the
/// environment, then the command line.
pub fn load_settings(cli: &Cli) -> Settings {
    dotenv().ok();
    settings_from_lookup(|key| env::var(key).ok()).with_cli(cli)
}

pub fn settings_from_lookup<F>(lookup: F) -> Settings
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = Settings::default();

    if let Some(v) = lookup("PREDICT_ENDPOINT") {
        let v = v.trim();
        if !v.is_empty() {
            settings.endpoint = v.to_string();
        }
    }

    if let Some(v) = lookup("PREDICT_TIMEOUT_SECS") {
        match v.trim().parse::<u64>() {
            Ok(secs) => settings.request_timeout = timeout_from_secs(secs),
            Err(_) => tracing::warn!(value = %v, "ignoring unparseable PREDICT_TIMEOUT_SECS"),
        }
    }

    settings
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    if secs == 0 {
        tracing::warn!("request timeout of 0 seconds ignored; requests will not time out");
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}
