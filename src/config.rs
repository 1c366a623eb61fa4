//! Game configuration. Everything has a default so `mount()` works without any
//! JSON; a host page can override single fields, e.g. `{"ruleset":"mega_combo"}`.

use log::LevelFilter;
use serde::Deserialize;

use crate::error::PetTapError;
use crate::rules::Ruleset;

/// Seconds in one round.
pub const ROUND_SECONDS: u32 = 30;
/// Menu loading phase before the start control appears.
pub const LOADING_MS: f64 = 4000.0;
/// Score the instruction text and results card aim for.
pub const TARGET_SCORE: u64 = 7000;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub ruleset: Ruleset,
    pub round_seconds: u32,
    pub loading_ms: f64,
    pub target_score: u64,
    /// Console verbosity, e.g. `"debug"` while tuning timings.
    pub log_level: LevelFilter,
    /// The page calls `tick()` itself once a second instead of the round
    /// clock ticking on its own. Exactly one of the two drives a round.
    pub host_ticks: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            ruleset: Ruleset::Classic,
            round_seconds: ROUND_SECONDS,
            loading_ms: LOADING_MS,
            target_score: TARGET_SCORE,
            log_level: LevelFilter::Info,
            host_ticks: false,
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, PetTapError> {
        let mut cfg: GameConfig = serde_json::from_str(json)?;
        // A zero-length round would end before the first tick could run.
        if cfg.round_seconds == 0 {
            log::warn!("round_seconds = 0 is not playable; using {ROUND_SECONDS}");
            cfg.round_seconds = ROUND_SECONDS;
        }
        if !cfg.loading_ms.is_finite() || cfg.loading_ms < 0.0 {
            cfg.loading_ms = LOADING_MS;
        }
        Ok(cfg)
    }

    /// Instruction shown at the start of the countdown.
    pub fn instruction_text(&self) -> String {
        format!("Tap repeatedly to reach score of {}", self.target_score)
    }
}
