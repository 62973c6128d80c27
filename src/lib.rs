//! Pump it Pure core crate.
//!
//! A timed arcade mini-game: pump the water meter to 100% before the countdown
//! runs out, and purify the water whenever it turns contaminated (pumping is
//! blocked until you do). The game rules live in [`GameEngine`], which is free
//! of browser APIs and driven through the [`View`] and [`Scheduler`] seams; the
//! [`web`] module binds it to the DOM for the WASM build.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod engine;
pub mod state;
pub mod timer;
pub mod view;
pub mod web;

pub use config::{ConfigError, GameConfig};
pub use engine::{GameEngine, game_rng};
pub use state::{GameResult, GameState, Phase};
pub use timer::{ManualScheduler, Scheduler, TimerHandle, TimerId, TimerKind, TimerMode};
pub use view::{Action, Controls, EventLog, Feedback, View, ViewEvent};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    web::logger::init(level);
}
