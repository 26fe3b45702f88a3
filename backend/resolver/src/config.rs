use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::{info, warn};

use crate::ContentKind;

pub const DEFAULT_API_BASE: &str = "http://localhost:5000";

const DEFAULT_INSIGHTS_TIMEOUT_MS: u64 = 1500;
const DEFAULT_CONTACT_FALLBACK_DELAY_MS: u64 = 1500;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Origin of the site API, without a trailing slash.
    pub api_base: String,
    pub insights_timeout: Duration,
    /// How long an undelivered contact submission waits before reporting success.
    pub contact_fallback_delay: Duration,
}

impl Config {
    pub fn load() -> Self {
        Self {
            api_base: trim_base(try_load("PHEZULU_API_URL", DEFAULT_API_BASE.to_string())),
            insights_timeout: Duration::from_millis(try_load(
                "INSIGHTS_TIMEOUT_MS",
                DEFAULT_INSIGHTS_TIMEOUT_MS,
            )),
            contact_fallback_delay: Duration::from_millis(try_load(
                "CONTACT_FALLBACK_DELAY_MS",
                DEFAULT_CONTACT_FALLBACK_DELAY_MS,
            )),
        }
    }

    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: trim_base(api_base.into()),
            ..Self::default()
        }
    }

    /// Only insights race a timer, every other request waits for the API.
    pub fn timeout_for(&self, kind: ContentKind) -> Option<Duration> {
        match kind {
            ContentKind::Insights => Some(self.insights_timeout),
            _ => None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            insights_timeout: Duration::from_millis(DEFAULT_INSIGHTS_TIMEOUT_MS),
            contact_fallback_delay: Duration::from_millis(DEFAULT_CONTACT_FALLBACK_DELAY_MS),
        }
    }
}

fn trim_base(api_base: String) -> String {
    api_base.trim().trim_end_matches('/').to_string()
}

pub fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Ok(raw) = env::var(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };

    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value '{raw}': {e}, using default: {default}");
        default
    })
}
