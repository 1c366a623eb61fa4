//! Pet Tap core crate.
//!
//! A casual tapping game: pick a pet, tap the capsule for thirty seconds, try
//! to beat your best score. This crate owns the game logic (screen state
//! machine, scoring, timers, popups, persisted settings) and exposes it to the
//! page through `wasm-bindgen`. Markup, styling and audio playback live in the
//! page; it renders from [`snapshot_json`] and plays what [`drain_cues`] asks
//! for.
//!
//! The logic is plain Rust over a caller-supplied millisecond clock, so
//! everything except [`web`] and [`storage::BrowserStorage`] runs and tests on
//! the host.

use wasm_bindgen::prelude::*;

pub mod audio;
pub mod character;
pub mod config;
pub mod error;
mod logging;
pub mod popups;
pub mod rules;
pub mod session;
pub mod settings;
pub mod snapshot;
pub mod storage;
pub mod timers;
pub mod web;

pub use character::Character;
pub use config::GameConfig;
pub use error::PetTapError;
pub use popups::{ScorePopup, TapPoint};
pub use rules::{Ruleset, TapAward};
pub use session::{Controller, GameState, Screen};
pub use snapshot::SessionSnapshot;
pub use web::{drain_cues, mount, snapshot_json};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}
