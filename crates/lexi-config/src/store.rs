use std::env;

use serde::{Deserialize, Serialize};

fn default_data_path() -> String {
    "lexi-data.json".to_string()
}

fn default_max_context_chars() -> usize {
    500
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file holding `vocabList` and `settings`
    #[serde(default = "default_data_path")]
    pub data_path: String,
    /// Saved context is cut to this many code points
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

impl StoreConfig {
    pub fn new() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    pub fn apply_env(&mut self) {
        if let Ok(data_path) = env::var("LEXI_DATA_PATH") {
            self.data_path = data_path;
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            max_context_chars: default_max_context_chars(),
        }
    }
}
