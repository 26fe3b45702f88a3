use std::{env, fs::read_to_string};

use resolver::config::{Config as ResolverConfig, try_load};
use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    /// Bearer token for cache invalidation. Invalidation is refused when unset.
    pub admin_token: Option<String>,
    pub resolver: ResolverConfig,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", 1111),
            admin_token: env::var("ADMIN_TOKEN")
                .ok()
                .or_else(|| read_secret("ADMIN_TOKEN"))
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty()),
            resolver: ResolverConfig::load(),
        }
    }
}

fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map_err(|e| {
            warn!("Failed to read {secret_name} from file: {e}");
        })
        .ok()
        .inspect(|_| info!("Loaded {secret_name} from secrets"))
}
