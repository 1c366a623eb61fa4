//! Read-only view of the controller for the rendering layer. Everything the
//! page needs to draw one frame, already formatted.

use serde::Serialize;

use crate::character::Character;
use crate::popups::ScorePopup;
use crate::rules::combo_counter;
use crate::session::{Controller, GameState, Screen};
use crate::storage::KeyValueStore;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub state: GameState,
    pub character: Character,
    pub character_name: &'static str,
    pub character_image: &'static str,

    pub score: u64,
    pub tap_count: u64,
    pub time_remaining: u32,
    /// `MM:SS`
    pub timer_text: String,
    pub level: Option<u64>,
    /// Two digits; "01" when the ruleset has no levels.
    pub level_text: String,
    /// HUD combo pips, two digits, capped at 99.
    pub combo_primary: String,
    pub combo_secondary: String,
    pub popups: Vec<ScorePopup>,

    pub high_score: u64,
    pub show_high_score: bool,
    pub new_best: bool,
    /// "OUT OF ..." on the results card.
    pub target_score: u64,

    pub loading: bool,
    pub show_start_button: bool,
    pub countdown_text: Option<String>,

    pub sound_enabled: bool,
    pub effects_enabled: bool,
}

impl<S: KeyValueStore> Controller<S> {
    pub fn snapshot(&self) -> SessionSnapshot {
        let round = self.round();
        let settings = self.settings();
        let screen = self.screen();
        let level = self.level();
        let target = self.config().target_score;

        SessionSnapshot {
            state: screen.state(),
            character: self.character(),
            character_name: self.character().display_name(),
            character_image: self.character().image_path(),
            score: round.score,
            tap_count: round.tap_count,
            time_remaining: round.time_remaining,
            timer_text: format_timer(round.time_remaining),
            level,
            level_text: format!("{:02}", level.unwrap_or(1)),
            combo_primary: format!("{:02}", combo_counter(round.tap_count, 10)),
            combo_secondary: format!("{:02}", combo_counter(round.tap_count, 25)),
            popups: self.popups().to_vec(),
            high_score: settings.high_score,
            show_high_score: settings.high_score > 0,
            new_best: matches!(screen, Screen::GameOver { new_best: true }),
            target_score: if settings.high_score > 0 {
                settings.high_score.max(target)
            } else {
                target
            },
            loading: matches!(screen, Screen::Menu { loading: true }),
            show_start_button: matches!(screen, Screen::Menu { loading: false }),
            countdown_text: match screen {
                Screen::Countdown { display } => Some(display.text(self.config())),
                _ => None,
            },
            sound_enabled: settings.sound_enabled,
            effects_enabled: settings.effects_enabled,
        }
    }
}

pub fn format_timer(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
