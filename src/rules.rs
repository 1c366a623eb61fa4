//! Scoring rules.
//!
//! Two mutually exclusive rulesets exist. `Classic` pays a step-function base
//! award per tap. `MegaCombo` pays the same base award, adds a fixed bonus on
//! every 10th tap and tracks a level derived from the score. A session uses
//! exactly one of them for its whole lifetime.

use serde::{Deserialize, Serialize};

/// Points paid for every tap before any milestone is reached.
pub const BASE_POINTS: u64 = 10;
/// Taps per milestone; each reached milestone raises the base award.
pub const MILESTONE_TAPS: u64 = 10;
/// Extra points per reached milestone.
pub const MILESTONE_STEP: u64 = 5;

/// Mega-combo bonus cadence and size.
pub const MEGA_INTERVAL: u64 = 10;
pub const MEGA_BONUS: u64 = 100;

/// Score per level in rulesets that track levels.
pub const LEVEL_STEP: u64 = 1000;

/// Two-digit HUD counters saturate here.
pub const DISPLAY_CAP: u64 = 99;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ruleset {
    #[default]
    Classic,
    MegaCombo,
}

/// Fixed bonus paid on interval boundaries (1-indexed tap number).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BonusRule {
    pub interval: u64,
    pub points: u64,
}

/// What a single tap paid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TapAward {
    pub base: u64,
    pub bonus: u64,
}

impl TapAward {
    pub fn total(&self) -> u64 {
        self.base + self.bonus
    }

    pub fn is_mega(&self) -> bool {
        self.bonus > 0
    }
}

/// Base award for a tap given the tap count *before* it is counted.
/// Floor-based, so it never regresses as taps accumulate.
pub fn base_award(tap_count_before: u64) -> u64 {
    BASE_POINTS + (tap_count_before / MILESTONE_TAPS) * MILESTONE_STEP
}

impl Ruleset {
    pub fn bonus_rule(self) -> Option<BonusRule> {
        match self {
            Ruleset::Classic => None,
            Ruleset::MegaCombo => Some(BonusRule {
                interval: MEGA_INTERVAL,
                points: MEGA_BONUS,
            }),
        }
    }

    pub fn tracks_level(self) -> bool {
        matches!(self, Ruleset::MegaCombo)
    }

    /// Award for the tap that takes the counter from `tap_count_before` to
    /// `tap_count_before + 1`.
    pub fn award(self, tap_count_before: u64) -> TapAward {
        let base = base_award(tap_count_before);
        let tap_number = tap_count_before + 1;
        let bonus = match self.bonus_rule() {
            Some(rule) if tap_number % rule.interval == 0 => rule.points,
            _ => 0,
        };
        TapAward { base, bonus }
    }

    /// Derived level; `None` when this ruleset has no levels.
    pub fn level(self, score: u64) -> Option<u64> {
        self.tracks_level().then(|| score / LEVEL_STEP + 1)
    }
}

/// Cosmetic HUD counter: `tap_count / per + 1`, saturating at two digits.
pub fn combo_counter(tap_count: u64, per: u64) -> u64 {
    (tap_count / per.max(1) + 1).min(DISPLAY_CAP)
}
