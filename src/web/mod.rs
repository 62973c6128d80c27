//! Browser binding: one engine per page, rendered into the DOM and driven by
//! `setInterval`/`setTimeout` and button input.

pub mod dom;
pub mod logger;
pub mod scheduler;

use std::cell::RefCell;

use rand_chacha::ChaCha8Rng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, KeyboardEvent, window};

use crate::config::GameConfig;
use crate::engine::{GameEngine, game_rng};
use dom::DomView;
use scheduler::BrowserScheduler;

pub type BrowserEngine = GameEngine<DomView, BrowserScheduler, ChaCha8Rng>;

thread_local! {
    static ENGINE: RefCell<Option<BrowserEngine>> = const { RefCell::new(None) };
    static LISTENERS: RefCell<Vec<Listener>> = const { RefCell::new(Vec::new()) };
}

/// A DOM event listener that detaches itself when dropped.
struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        target: &EventTarget,
        event: &'static str,
        callback: Closure<dyn FnMut(Event)>,
    ) -> Result<Self, JsValue> {
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self { target: target.clone(), event, callback })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref())
            .ok();
    }
}

/// Run `f` against the mounted engine. Input that arrives while the engine is
/// already borrowed (re-entrant DOM events) is dropped.
pub(crate) fn with_engine(f: impl FnOnce(&mut BrowserEngine)) {
    ENGINE.with(|cell| match cell.try_borrow_mut() {
        Ok(mut slot) => match slot.as_mut() {
            Some(engine) => f(engine),
            None => log::warn!("game is not mounted"),
        },
        Err(_) => log::warn!("engine busy, input dropped"),
    });
}

/// Bind the game to the page's markup using the default configuration.
#[wasm_bindgen]
pub fn mount_game() -> Result<(), JsValue> {
    mount(GameConfig::default())
}

/// Bind the game with a JSON configuration; unspecified fields keep defaults.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn mount_game_with_config(json: &str) -> Result<(), JsValue> {
    let config = GameConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    mount(config)
}

#[wasm_bindgen]
pub fn start_game() {
    with_engine(BrowserEngine::start);
}

#[wasm_bindgen]
pub fn reset_game() {
    with_engine(BrowserEngine::reset);
}

#[wasm_bindgen]
pub fn pump() {
    with_engine(BrowserEngine::pump);
}

#[wasm_bindgen]
pub fn purify() {
    with_engine(BrowserEngine::purify);
}

fn mount(config: GameConfig) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let view = DomView::mount(&win, &doc, config.feedback_pulse_ms)?;
    let rng = game_rng(config.seed)
        .map_err(|e| JsValue::from_str(&format!("entropy unavailable: {e}")))?;
    let mut engine = GameEngine::new(config, view, BrowserScheduler::new(win.clone()), rng)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    engine.refresh_view();

    let listeners = bind_input(engine.view())?;
    // Dropping the previous engine and listeners clears its timers and unbinds old input.
    let previous = ENGINE.with(|cell| cell.replace(Some(engine)));
    let previous_listeners = LISTENERS.with(|cell| cell.replace(listeners));
    drop(previous);
    drop(previous_listeners);
    log::info!("game mounted");
    Ok(())
}

fn bind_input(view: &DomView) -> Result<Vec<Listener>, JsValue> {
    let mut listeners = vec![
        on_click(&view.start_btn, BrowserEngine::start)?,
        on_click(&view.reset_btn, BrowserEngine::reset)?,
        on_click(&view.pump_btn, BrowserEngine::pump)?,
        on_click(&view.purify_btn, BrowserEngine::purify)?,
        // Keyboard activation for the two gameplay buttons.
        on_activate_key(&view.pump_btn, BrowserEngine::pump)?,
        on_activate_key(&view.purify_btn, BrowserEngine::purify)?,
    ];
    if let Some(replay) = &view.replay_btn {
        listeners.push(on_click(replay, BrowserEngine::start)?);
    }
    Ok(listeners)
}

fn on_click(target: &EventTarget, action: fn(&mut BrowserEngine)) -> Result<Listener, JsValue> {
    let callback = Closure::wrap(Box::new(move |_evt: Event| {
        with_engine(action);
    }) as Box<dyn FnMut(_)>);
    Listener::attach(target, "click", callback)
}

fn on_activate_key(target: &EventTarget, action: fn(&mut BrowserEngine)) -> Result<Listener, JsValue> {
    let callback = Closure::wrap(Box::new(move |evt: Event| {
        let Some(evt) = evt.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let key = evt.key();
        if key == "Enter" || key == " " {
            // Otherwise the button would also synthesize a click.
            evt.prevent_default();
            with_engine(action);
        }
    }) as Box<dyn FnMut(_)>);
    Listener::attach(target, "keydown", callback)
}
