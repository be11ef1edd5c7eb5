use std::env;

use serde::{Deserialize, Serialize};

use self::page::PageConfig;
use self::store::StoreConfig;
use self::translator::TranslatorConfig;

pub mod page;
pub mod store;
pub mod translator;

fn default_delta_time() -> u64 {
    100
}

fn default_request_capacity() -> usize {
    64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub translator: TranslatorConfig,
    pub store: StoreConfig,
    pub page: PageConfig,

    /// Page loop tick, drives badge and popup expiry
    #[serde(default = "default_delta_time")]
    pub delta_time: u64,
    /// Capacity of the inbound command channel
    #[serde(default = "default_request_capacity")]
    pub request_capacity: usize,
}

impl Config {
    pub fn new() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Environment variables win over defaults and over a loaded profile
    pub fn apply_env(&mut self) {
        self.translator.apply_env();
        self.store.apply_env();

        if let Some(delta_time) = env::var("DELTA_TIME_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.delta_time = delta_time;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            translator: TranslatorConfig::default(),
            store: StoreConfig::default(),
            page: PageConfig::default(),
            delta_time: default_delta_time(),
            request_capacity: default_request_capacity(),
        }
    }
}
