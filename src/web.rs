//! JavaScript surface.
//!
//! The controller lives in a thread-local slot, the same way the page only ever
//! has one game. A `requestAnimationFrame` loop advances its clock; every
//! exported operation first catches the clock up to `performance.now()` so
//! taps and button presses land at the right moment.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::window;

use crate::audio::SoundCue;
use crate::character::Character;
use crate::config::GameConfig;
use crate::error::PetTapError;
use crate::popups::TapPoint;
use crate::session::Controller;
use crate::storage::AnyStore;

thread_local! {
    static GAME: RefCell<Option<Controller<AnyStore>>> = const { RefCell::new(None) };
    static LOOP_RUNNING: RefCell<bool> = const { RefCell::new(false) };
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn performance_now() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

fn with_game<R>(f: impl FnOnce(&mut Controller<AnyStore>) -> R) -> Result<R, JsValue> {
    GAME.with(|cell| {
        let mut slot = cell.borrow_mut();
        let game = slot.as_mut().ok_or(PetTapError::NotMounted)?;
        game.advance(performance_now());
        Ok(f(game))
    })
}

/// Creates (or recreates) the game. `config_json` may override any
/// `GameConfig` field; pass nothing for defaults.
#[wasm_bindgen]
pub fn mount(config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json.as_deref().map(str::trim) {
        Some(json) if !json.is_empty() => GameConfig::from_json(json)?,
        _ => GameConfig::default(),
    };
    log::set_max_level(config.log_level);
    log::info!("mounting with {:?} rules", config.ruleset);

    let game = Controller::new(config, AnyStore::detect(), performance_now());
    GAME.with(|cell| cell.replace(Some(game)));

    let running = LOOP_RUNNING.with(|r| r.replace(true));
    if !running {
        start_frame_loop();
    }
    Ok(())
}

/// Drops the game. The frame loop keeps running but has nothing to advance
/// until the next `mount`.
#[wasm_bindgen]
pub fn unmount() {
    GAME.with(|cell| cell.replace(None));
    log::info!("unmounted");
}

fn start_frame_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        GAME.with(|cell| {
            if let Some(game) = cell.borrow_mut().as_mut() {
                game.advance(ts);
            }
        });
        if let (Some(w), Some(cb)) = (window(), f.borrow().as_ref()) {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let (Some(w), Some(cb)) = (window(), g.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

/// Current frame state as JSON (see `SessionSnapshot`).
#[wasm_bindgen]
pub fn snapshot_json() -> Result<String, JsValue> {
    let snap = with_game(|g| g.snapshot())?;
    serde_json::to_string(&snap).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[derive(Serialize)]
struct CueOut {
    cue: SoundCue,
    asset: &'static str,
}

/// Sound cues queued since the last call, as a JSON array of
/// `{ "cue": ..., "asset": ... }`.
#[wasm_bindgen]
pub fn drain_cues() -> Result<String, JsValue> {
    let cues: Vec<CueOut> = with_game(|g| g.drain_cues())?
        .into_iter()
        .map(|cue| CueOut {
            cue,
            asset: cue.asset(),
        })
        .collect();
    serde_json::to_string(&cues).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn open_character_select() -> Result<bool, JsValue> {
    with_game(|g| g.open_character_select())
}

#[wasm_bindgen]
pub fn select_character(name: &str) -> Result<bool, JsValue> {
    let character: Character = name.parse()?;
    with_game(|g| g.select_character(character))
}

#[wasm_bindgen]
pub fn start_game() -> Result<bool, JsValue> {
    with_game(|g| g.start_game())
}

/// Scores a tap at capsule-relative pixel `(x, y)`. Returns the points
/// awarded, 0 when not playing.
#[wasm_bindgen]
pub fn register_tap(x: f64, y: f64) -> Result<f64, JsValue> {
    with_game(|g| {
        g.register_tap(TapPoint::new(x, y))
            .map_or(0.0, |a| a.total() as f64)
    })
}

/// Counts down one second. Only has an effect when mounted with
/// `"host_ticks": true`; by default the frame loop runs the round clock.
#[wasm_bindgen]
pub fn tick() -> Result<bool, JsValue> {
    with_game(|g| g.host_tick())
}

#[wasm_bindgen]
pub fn play_again() -> Result<bool, JsValue> {
    with_game(|g| g.play_again())
}

#[wasm_bindgen]
pub fn back_to_menu() -> Result<bool, JsValue> {
    with_game(|g| g.back_to_menu())
}

#[wasm_bindgen]
pub fn toggle_sound() -> Result<bool, JsValue> {
    with_game(|g| g.toggle_sound())
}

#[wasm_bindgen]
pub fn toggle_effects() -> Result<bool, JsValue> {
    with_game(|g| g.toggle_effects())
}

/// Routes clicks on the element with `element_id` (the capsule) into
/// `register_tap`, using coordinates relative to the element's box.
#[wasm_bindgen]
pub fn bind_tap_surface(element_id: &str) -> Result<(), JsValue> {
    let doc = window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let el = doc
        .get_element_by_id(element_id)
        .ok_or_else(|| PetTapError::MissingElement(element_id.to_string()))?;

    let target = el.clone();
    let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
        let rect = target.get_bounding_client_rect();
        let x = evt.client_x() as f64 - rect.left();
        let y = evt.client_y() as f64 - rect.top();
        if let Err(e) = register_tap(x, y) {
            log::warn!("tap dropped: {e:?}");
        }
    }) as Box<dyn FnMut(_)>);
    el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
