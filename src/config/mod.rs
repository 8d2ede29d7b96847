use std::env;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::QuizError;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub api_token: Option<String>,
    pub http_timeout: Duration,
}

impl Config {
    /// Reads `.env` if there is one, then the process environment.
    pub fn from_env() -> Result<Self, QuizError> {
        if let Err(e) = dotenvy::dotenv() {
            log::debug!("No .env file loaded: {}", e);
        }
        // env::vars() panics on non-UTF-8 entries; those are never ours.
        Self::from_vars(
            env::vars_os().filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        )
    }

    /// Builds the settings from `KEY=value` pairs. Later pairs win.
    pub fn from_vars<I>(vars: I) -> Result<Self, QuizError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars.into_iter().collect();
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, QuizError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("SIMULATOR_API_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| QuizError::Config("SIMULATOR_API_URL is not set".to_string()))?;

        let api_token = lookup("SIMULATOR_API_TOKEN").filter(|v| !v.trim().is_empty());

        let http_timeout = match lookup("SIMULATOR_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                QuizError::Config(format!("SIMULATOR_HTTP_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Config {
            api_url: api_url.trim().trim_end_matches('/').to_string(),
            api_token,
            http_timeout: Duration::from_secs(http_timeout),
        })
    }
}
