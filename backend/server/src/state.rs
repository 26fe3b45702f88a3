use std::sync::Arc;

use resolver::Resolver;

use super::config::Config;

pub struct AppState {
    pub config: Config,
    pub resolver: Resolver,
}

impl AppState {
    pub fn new() -> Arc<Self> {
        Self::with_config(Config::load())
    }

    pub fn with_config(config: Config) -> Arc<Self> {
        let resolver = Resolver::new(config.resolver.clone());

        Arc::new(Self { config, resolver })
    }
}
