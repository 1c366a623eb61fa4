//! Game session controller.
//!
//! Owns the screen state machine, the round counters, the score popups and the
//! persisted settings. Inputs are the player operations below plus
//! [`Controller::advance`], which moves the clock and fires whatever timers the
//! current screen scheduled. Every screen change cancels all outstanding
//! timers, so a timer only ever fires inside the screen that created it.
//!
//! ```text
//! Menu ──open──▶ CharacterSelect ──start──▶ Countdown ──4.7s──▶ Playing
//!  ▲                   ▲                                          │ time up
//!  └──back_to_menu──── GameOver ◀───────────────────────────────┘
//!                      └──play_again──▶ CharacterSelect
//! ```

use serde::Serialize;

use crate::audio::{CueQueue, SoundCue};
use crate::character::Character;
use crate::config::GameConfig;
use crate::popups::{PopupBoard, PopupKind, TapPoint};
use crate::rules::TapAward;
use crate::settings::{Settings, SettingsStore};
use crate::storage::KeyValueStore;
use crate::timers::Scheduler;

/// One round tick.
pub const TICK_MS: f64 = 1000.0;
/// Countdown display changes, as offsets from entering the countdown.
pub const COUNTDOWN_STEPS: [(f64, CountdownDisplay); 4] = [
    (1300.0, CountdownDisplay::Number(3)),
    (2100.0, CountdownDisplay::Number(2)),
    (2900.0, CountdownDisplay::Number(1)),
    (3700.0, CountdownDisplay::Go),
];
/// Offset at which the countdown hands over to play.
pub const COUNTDOWN_TOTAL_MS: f64 = 4700.0;

/// Flat state tag, as the page sees it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameState {
    Menu,
    CharacterSelect,
    Countdown,
    Playing,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownDisplay {
    Instruction,
    Number(u8),
    Go,
}

impl CountdownDisplay {
    pub fn text(self, config: &GameConfig) -> String {
        match self {
            CountdownDisplay::Instruction => config.instruction_text(),
            CountdownDisplay::Number(n) => n.to_string(),
            CountdownDisplay::Go => "LET'S GO!!".to_string(),
        }
    }
}

/// The active screen together with the data only that screen has.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    /// `loading` is true until the start control is revealed.
    Menu { loading: bool },
    CharacterSelect,
    Countdown { display: CountdownDisplay },
    Playing,
    /// `new_best` is set when the finished round raised the high score.
    GameOver { new_best: bool },
}

impl Screen {
    pub fn state(&self) -> GameState {
        match self {
            Screen::Menu { .. } => GameState::Menu,
            Screen::CharacterSelect => GameState::CharacterSelect,
            Screen::Countdown { .. } => GameState::Countdown,
            Screen::Playing => GameState::Playing,
            Screen::GameOver { .. } => GameState::GameOver,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum TimerKind {
    RevealStart,
    CountdownStep(CountdownDisplay),
    BeginPlay,
    Tick,
}

/// Counters of the current (or last) round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Round {
    pub score: u64,
    pub tap_count: u64,
    pub time_remaining: u32,
}

pub struct Controller<S> {
    config: GameConfig,
    screen: Screen,
    character: Character,
    round: Round,
    settings: SettingsStore<S>,
    timers: Scheduler<TimerKind>,
    popups: PopupBoard,
    cues: CueQueue,
    now_ms: f64,
}

impl<S: KeyValueStore> Controller<S> {
    /// Builds a controller in the menu's loading phase, reading persisted
    /// settings from `store`. `now_ms` is the starting clock; later
    /// [`Controller::advance`] calls must use the same clock.
    pub fn new(config: GameConfig, store: S, now_ms: f64) -> Self {
        let settings = SettingsStore::load(store);
        let round = Round {
            score: 0,
            tap_count: 0,
            time_remaining: config.round_seconds,
        };
        let mut ctrl = Self {
            config,
            screen: Screen::Menu { loading: true },
            character: Character::default(),
            round,
            settings,
            timers: Scheduler::new(),
            popups: PopupBoard::default(),
            cues: CueQueue::default(),
            now_ms,
        };
        ctrl.schedule_entry_timers();
        ctrl
    }

    // --- read side ---------------------------------------------------------

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn state(&self) -> GameState {
        self.screen.state()
    }

    pub fn character(&self) -> Character {
        self.character
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn score(&self) -> u64 {
        self.round.score
    }

    pub fn tap_count(&self) -> u64 {
        self.round.tap_count
    }

    pub fn time_remaining(&self) -> u32 {
        self.round.time_remaining
    }

    /// Level derived from the score; `None` under rulesets without levels.
    pub fn level(&self) -> Option<u64> {
        self.config.ruleset.level(self.round.score)
    }

    pub fn settings(&self) -> Settings {
        self.settings.get()
    }

    pub fn store(&self) -> &S {
        self.settings.store()
    }

    pub fn popups(&self) -> &PopupBoard {
        &self.popups
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Next time `advance` would fire a timer.
    pub fn next_timer_due(&self) -> Option<f64> {
        self.timers.next_due()
    }

    pub fn drain_cues(&mut self) -> Vec<SoundCue> {
        self.cues.drain()
    }

    // --- clock -------------------------------------------------------------

    /// Moves the clock to `now_ms`, firing due timers in order and dropping
    /// expired popups. Going backwards is ignored.
    pub fn advance(&mut self, now_ms: f64) {
        if now_ms < self.now_ms {
            return;
        }
        while let Some(fired) = self.timers.pop_due(now_ms) {
            // follow-up timers are scheduled relative to when this one was due
            self.now_ms = fired.due_ms;
            self.fire(fired.kind);
        }
        self.now_ms = now_ms;
        self.popups.expire(now_ms);
    }

    fn fire(&mut self, kind: TimerKind) {
        match (kind, self.screen) {
            (TimerKind::RevealStart, Screen::Menu { .. }) => {
                self.screen = Screen::Menu { loading: false };
                log::debug!("start control revealed");
            }
            (TimerKind::CountdownStep(display), Screen::Countdown { .. }) => {
                self.screen = Screen::Countdown { display };
            }
            (TimerKind::BeginPlay, Screen::Countdown { .. }) => self.enter(Screen::Playing),
            (TimerKind::Tick, Screen::Playing) => {
                self.tick();
                if self.screen == Screen::Playing {
                    self.timers.schedule(self.now_ms + TICK_MS, TimerKind::Tick);
                }
            }
            (kind, screen) => log::debug!("timer {kind:?} ignored in {screen:?}"),
        }
    }

    // --- operations --------------------------------------------------------

    /// "START GAME" on the menu. Only available once loading has finished.
    pub fn open_character_select(&mut self) -> bool {
        if self.screen != (Screen::Menu { loading: false }) {
            return self.ignored("open_character_select");
        }
        self.click();
        self.enter(Screen::CharacterSelect);
        true
    }

    /// Picks a pet. Allowed on the menu marquee and the selection screen.
    pub fn select_character(&mut self, character: Character) -> bool {
        match self.screen {
            Screen::Menu { .. } | Screen::CharacterSelect => {
                self.character = character;
                self.click();
                true
            }
            _ => self.ignored("select_character"),
        }
    }

    /// Resets the round and starts the countdown.
    pub fn start_game(&mut self) -> bool {
        if self.screen != Screen::CharacterSelect {
            return self.ignored("start_game");
        }
        self.click();
        self.reset_round();
        if self.settings.get().sound_enabled {
            self.cues.music(SoundCue::MusicPlay);
        }
        self.enter(Screen::Countdown {
            display: CountdownDisplay::Instruction,
        });
        true
    }

    /// Scores one tap at `position` (capsule-relative pixels). No-op outside
    /// of play.
    pub fn register_tap(&mut self, position: TapPoint) -> Option<TapAward> {
        if self.screen != Screen::Playing {
            self.ignored("register_tap");
            return None;
        }
        let award = self.config.ruleset.award(self.round.tap_count);
        self.round.tap_count += 1;
        self.round.score += award.total();

        let effects = self.settings.get().effects_enabled;
        self.cues.effect(SoundCue::Tap, effects);
        self.popups
            .spawn(position, award.base, PopupKind::Regular, self.now_ms);
        if award.is_mega() {
            self.cues.effect(SoundCue::Mega, effects);
            self.popups
                .spawn(position, award.bonus, PopupKind::Mega, self.now_ms);
            log::debug!("mega combo at tap {}", self.round.tap_count);
        }
        Some(award)
    }

    /// A tick from a host that drives the round clock itself. Only honoured
    /// when `host_ticks` is configured; otherwise [`Controller::advance`] owns
    /// the round clock.
    pub fn host_tick(&mut self) -> bool {
        if !self.config.host_ticks {
            return self.ignored("host_tick");
        }
        self.tick()
    }

    /// One second of play. Ends the round when the time runs out.
    pub fn tick(&mut self) -> bool {
        if self.screen != Screen::Playing {
            return self.ignored("tick");
        }
        self.round.time_remaining = self.round.time_remaining.saturating_sub(1);
        if self.round.time_remaining == 0 {
            self.finish_round();
        }
        true
    }

    pub fn play_again(&mut self) -> bool {
        if self.state() != GameState::GameOver {
            return self.ignored("play_again");
        }
        self.click();
        self.reset_round();
        self.enter(Screen::CharacterSelect);
        true
    }

    pub fn back_to_menu(&mut self) -> bool {
        if self.state() != GameState::GameOver {
            return self.ignored("back_to_menu");
        }
        self.click();
        self.enter(Screen::Menu { loading: true });
        true
    }

    /// Flips background music and persists the choice. Returns the new value.
    pub fn toggle_sound(&mut self) -> bool {
        // the click follows the effects switch, which this does not change
        self.click();
        let enabled = !self.settings.get().sound_enabled;
        self.settings.set_sound(enabled);
        self.cues.music(if enabled {
            SoundCue::MusicPlay
        } else {
            SoundCue::MusicPause
        });
        log::info!("music {}", if enabled { "on" } else { "off" });
        enabled
    }

    /// Flips sound effects and persists the choice. Returns the new value.
    pub fn toggle_effects(&mut self) -> bool {
        // the click is judged by the switch as it was when pressed
        self.click();
        let enabled = !self.settings.get().effects_enabled;
        self.settings.set_effects(enabled);
        log::info!("effects {}", if enabled { "on" } else { "off" });
        enabled
    }

    // --- internals ---------------------------------------------------------

    fn enter(&mut self, next: Screen) {
        self.timers.cancel_all();
        log::info!("{:?} -> {:?}", self.screen.state(), next.state());
        self.screen = next;
        self.schedule_entry_timers();
    }

    fn schedule_entry_timers(&mut self) {
        let now = self.now_ms;
        match self.screen {
            Screen::Menu { loading: true } => {
                self.timers
                    .schedule(now + self.config.loading_ms, TimerKind::RevealStart);
            }
            Screen::Countdown { .. } => {
                for (offset, step) in COUNTDOWN_STEPS {
                    self.timers
                        .schedule(now + offset, TimerKind::CountdownStep(step));
                }
                self.timers
                    .schedule(now + COUNTDOWN_TOTAL_MS, TimerKind::BeginPlay);
            }
            Screen::Playing if !self.config.host_ticks => {
                self.timers.schedule(now + TICK_MS, TimerKind::Tick);
            }
            Screen::Menu { loading: false }
            | Screen::CharacterSelect
            | Screen::Playing
            | Screen::GameOver { .. } => {}
        }
    }

    fn finish_round(&mut self) {
        let score = self.round.score;
        let new_best = self.settings.record_score(score);
        log::info!(
            "round over: score {score}, best {}{}",
            self.settings.get().high_score,
            if new_best { " (new)" } else { "" }
        );
        self.enter(Screen::GameOver { new_best });
    }

    fn reset_round(&mut self) {
        self.round = Round {
            score: 0,
            tap_count: 0,
            time_remaining: self.config.round_seconds,
        };
        self.popups.clear();
    }

    fn click(&mut self) {
        self.cues
            .effect(SoundCue::Click, self.settings.get().effects_enabled);
    }

    fn ignored(&self, op: &str) -> bool {
        log::debug!("{op} ignored in {:?}", self.screen.state());
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LOADING_MS;
    use crate::rules::Ruleset;
    use crate::storage::MemoryStore;

    fn controller() -> Controller<MemoryStore> {
        Controller::new(GameConfig::default(), MemoryStore::new(), 0.0)
    }

    fn to_select(c: &mut Controller<MemoryStore>) {
        c.advance(c.now_ms() + LOADING_MS);
        assert!(c.open_character_select());
    }

    fn to_playing(c: &mut Controller<MemoryStore>) {
        to_select(c);
        assert!(c.start_game());
        c.advance(c.now_ms() + COUNTDOWN_TOTAL_MS);
        assert_eq!(c.state(), GameState::Playing);
    }

    #[test]
    fn menu_reveals_start_after_loading() {
        let mut c = controller();
        assert_eq!(c.screen(), Screen::Menu { loading: true });
        assert!(!c.open_character_select());
        c.advance(LOADING_MS - 1.0);
        assert_eq!(c.screen(), Screen::Menu { loading: true });
        c.advance(LOADING_MS);
        assert_eq!(c.screen(), Screen::Menu { loading: false });
        assert!(c.open_character_select());
        assert_eq!(c.state(), GameState::CharacterSelect);
    }

    #[test]
    fn countdown_sequence_is_timed() {
        let mut c = controller();
        to_select(&mut c);
        let t0 = c.now_ms();
        c.start_game();
        let display = |c: &Controller<MemoryStore>| match c.screen() {
            Screen::Countdown { display } => display,
            other => panic!("expected countdown, got {other:?}"),
        };
        assert_eq!(display(&c), CountdownDisplay::Instruction);
        c.advance(t0 + 1299.0);
        assert_eq!(display(&c), CountdownDisplay::Instruction);
        c.advance(t0 + 1300.0);
        assert_eq!(display(&c), CountdownDisplay::Number(3));
        c.advance(t0 + 2100.0);
        assert_eq!(display(&c), CountdownDisplay::Number(2));
        c.advance(t0 + 2900.0);
        assert_eq!(display(&c), CountdownDisplay::Number(1));
        c.advance(t0 + 3700.0);
        assert_eq!(display(&c), CountdownDisplay::Go);
        c.advance(t0 + 4699.0);
        assert_eq!(c.state(), GameState::Countdown);
        c.advance(t0 + 4700.0);
        assert_eq!(c.state(), GameState::Playing);
    }

    #[test]
    fn taps_outside_play_do_nothing() {
        let mut c = controller();
        assert_eq!(c.register_tap(TapPoint::default()), None);
        to_select(&mut c);
        c.start_game();
        assert_eq!(c.register_tap(TapPoint::default()), None);
        assert_eq!(c.score(), 0);
        assert_eq!(c.tap_count(), 0);
    }

    #[test]
    fn taps_score_and_spawn_popups() {
        let mut c = controller();
        to_playing(&mut c);
        let award = c.register_tap(TapPoint::new(40.0, 60.0)).unwrap();
        assert_eq!(award.total(), 10);
        assert_eq!(c.popups().len(), 1);
        let p = c.popups().to_vec()[0];
        assert_eq!(p.position, TapPoint::new(40.0, 60.0));
        assert_eq!(p.points, 10);
        c.advance(c.now_ms() + 800.0);
        assert!(c.popups().is_empty());
    }

    #[test]
    fn clock_runs_round_out() {
        let mut c = controller();
        to_playing(&mut c);
        let start = c.now_ms();
        c.advance(start + 999.0);
        assert_eq!(c.time_remaining(), 30);
        c.advance(start + 1000.0);
        assert_eq!(c.time_remaining(), 29);
        // one big jump fires every pending second in order
        c.advance(start + 29_000.0);
        assert_eq!(c.time_remaining(), 1);
        assert_eq!(c.state(), GameState::Playing);
        c.advance(start + 30_000.0);
        assert_eq!(c.time_remaining(), 0);
        assert_eq!(c.state(), GameState::GameOver);
        assert_eq!(c.next_timer_due(), None);
    }

    #[test]
    fn host_tick_only_counts_when_configured() {
        let mut c = controller();
        to_playing(&mut c);
        assert!(!c.host_tick());
        assert_eq!(c.time_remaining(), 30);

        let cfg = GameConfig {
            host_ticks: true,
            ..GameConfig::default()
        };
        let mut c = Controller::new(cfg, MemoryStore::new(), 0.0);
        to_playing(&mut c);
        let start = c.now_ms();
        assert_eq!(c.next_timer_due(), None);
        c.advance(start + 5_000.0);
        assert_eq!(c.time_remaining(), 30);
        assert!(c.host_tick());
        assert_eq!(c.time_remaining(), 29);
    }

    #[test]
    fn leaving_a_state_cancels_its_timers() {
        let mut c = controller();
        to_playing(&mut c);
        for _ in 0..30 {
            c.tick();
        }
        assert_eq!(c.state(), GameState::GameOver);
        // the tick scheduled while playing must not touch the next round
        assert!(c.play_again());
        assert!(c.start_game());
        c.advance(c.now_ms() + 1000.0);
        assert_eq!(c.state(), GameState::Countdown);
        assert_eq!(c.time_remaining(), 30);
    }

    #[test]
    fn character_is_locked_during_play() {
        let mut c = controller();
        assert!(c.select_character(Character::Cat));
        to_select(&mut c);
        assert!(c.select_character(Character::Husky));
        c.start_game();
        assert!(!c.select_character(Character::Beagle));
        assert_eq!(c.character(), Character::Husky);
    }

    #[test]
    fn back_to_menu_restarts_loading() {
        let mut c = controller();
        to_playing(&mut c);
        for _ in 0..30 {
            c.tick();
        }
        assert!(c.back_to_menu());
        assert_eq!(c.screen(), Screen::Menu { loading: true });
        c.advance(c.now_ms() + LOADING_MS);
        assert_eq!(c.screen(), Screen::Menu { loading: false });
    }

    #[test]
    fn game_over_only_exits_are_play_again_and_menu() {
        let mut c = controller();
        assert!(!c.play_again());
        assert!(!c.back_to_menu());
        to_select(&mut c);
        assert!(!c.play_again());
        assert!(!c.tick());
    }

    #[test]
    fn mega_combo_raises_mega_popup_and_cue() {
        let cfg = GameConfig {
            ruleset: Ruleset::MegaCombo,
            ..GameConfig::default()
        };
        let mut c = Controller::new(cfg, MemoryStore::new(), 0.0);
        to_playing(&mut c);
        c.drain_cues();
        for _ in 0..9 {
            c.register_tap(TapPoint::default());
        }
        let award = c.register_tap(TapPoint::default()).unwrap();
        assert!(award.is_mega());
        assert_eq!(c.score(), 200);
        assert_eq!(c.level(), Some(1));
        let cues = c.drain_cues();
        assert_eq!(cues.iter().filter(|&&q| q == SoundCue::Mega).count(), 1);
        assert_eq!(
            c.popups()
                .to_vec()
                .iter()
                .filter(|p| p.kind == PopupKind::Mega)
                .count(),
            1
        );
        // mega burst leaves first
        c.advance(c.now_ms() + 760.0);
        assert!(c.popups().to_vec().iter().all(|p| p.kind == PopupKind::Regular));
    }

    #[test]
    fn cues_follow_switches() {
        let mut c = controller();
        c.drain_cues();
        assert!(!c.toggle_effects());
        // click recorded before switching off
        assert_eq!(c.drain_cues(), vec![SoundCue::Click]);
        assert!(!c.toggle_sound());
        assert_eq!(c.drain_cues(), vec![SoundCue::MusicPause]);
        to_playing(&mut c);
        c.register_tap(TapPoint::default());
        assert!(c.drain_cues().is_empty());
    }
}
