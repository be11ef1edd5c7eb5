use std::time::{Duration, Instant};

use lexi_config::page::PageConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BadgePhase {
    Visible,
    Fading { opacity: f64 },
    Expired,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BadgeView {
    pub text: String,
    pub opacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeTiming {
    pub visible: Duration,
    pub fade: Duration,
}

impl BadgeTiming {
    pub fn from_config(config: &PageConfig) -> Self {
        Self {
            visible: Duration::from_millis(config.badge_visible_ms),
            fade: Duration::from_millis(config.badge_fade_ms),
        }
    }
}

/// Transient match counter shown after a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub count: usize,
    shown_at: Instant,
}

impl Badge {
    /// Nothing is shown for a scan without matches
    pub fn for_scan(count: usize, now: Instant) -> Option<Self> {
        (count > 0).then_some(Self {
            count,
            shown_at: now,
        })
    }

    pub fn message(count: usize) -> String {
        format!("{count} vocabulary matches highlighted")
    }

    pub fn phase(&self, now: Instant, timing: BadgeTiming) -> BadgePhase {
        let elapsed = now.saturating_duration_since(self.shown_at);
        if elapsed < timing.visible {
            return BadgePhase::Visible;
        }

        let fading = elapsed - timing.visible;
        if fading >= timing.fade {
            return BadgePhase::Expired;
        }
        BadgePhase::Fading {
            opacity: 1.0 - fading.as_secs_f64() / timing.fade.as_secs_f64(),
        }
    }

    pub fn view(&self, now: Instant, timing: BadgeTiming) -> Option<BadgeView> {
        let opacity = match self.phase(now, timing) {
            BadgePhase::Visible => 1.0,
            BadgePhase::Fading { opacity } => opacity,
            BadgePhase::Expired => return None,
        };
        Some(BadgeView {
            text: Self::message(self.count),
            opacity,
        })
    }
}
