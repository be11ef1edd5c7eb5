use serde::{Deserialize, Serialize};

fn default_max_word_chars() -> usize {
    45
}

fn default_max_context_chars() -> usize {
    500
}

fn default_badge_visible_ms() -> u64 {
    5000
}

fn default_badge_fade_ms() -> u64 {
    300
}

fn default_result_linger_ms() -> u64 {
    3000
}

fn default_tooltip_gap() -> f64 {
    8.0
}

fn default_tooltip_margin() -> f64 {
    8.0
}

fn default_pattern_size_limit() -> usize {
    // regex default is 10 MiB, vocabularies of a few thousand words need more room
    64 * 1024 * 1024
}

fn default_scan_on_load() -> bool {
    true
}

fn default_viewport_width() -> f64 {
    1280.0
}

fn default_viewport_height() -> f64 {
    800.0
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PageConfig {
    /// Longest selection still treated as a single word
    #[serde(default = "default_max_word_chars")]
    pub max_word_chars: usize,
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
    #[serde(default = "default_badge_visible_ms")]
    pub badge_visible_ms: u64,
    #[serde(default = "default_badge_fade_ms")]
    pub badge_fade_ms: u64,
    /// How long a saved translation stays on screen
    #[serde(default = "default_result_linger_ms")]
    pub result_linger_ms: u64,
    #[serde(default = "default_tooltip_gap")]
    pub tooltip_gap: f64,
    #[serde(default = "default_tooltip_margin")]
    pub tooltip_margin: f64,
    #[serde(default = "default_pattern_size_limit")]
    pub pattern_size_limit: usize,
    #[serde(default = "default_scan_on_load")]
    pub scan_on_load: bool,
    /// Viewport assumed for pages attached over the command surface
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f64,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            max_word_chars: default_max_word_chars(),
            max_context_chars: default_max_context_chars(),
            badge_visible_ms: default_badge_visible_ms(),
            badge_fade_ms: default_badge_fade_ms(),
            result_linger_ms: default_result_linger_ms(),
            tooltip_gap: default_tooltip_gap(),
            tooltip_margin: default_tooltip_margin(),
            pattern_size_limit: default_pattern_size_limit(),
            scan_on_load: default_scan_on_load(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}
