//! `setInterval` / `setTimeout` backed [`Scheduler`].

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Window;

use crate::timer::{Scheduler, TimerId, TimerKind, TimerMode};

struct BrowserTimer {
    id: TimerId,
    mode: TimerMode,
    handle: i32,
    callback: Closure<dyn FnMut()>,
}

pub struct BrowserScheduler {
    window: Window,
    countdown: Option<BrowserTimer>,
    contamination: Option<BrowserTimer>,
    // Cleared callbacks may still be on the stack (an interval that ended the
    // game); they are only dropped on the next arm.
    retired: Vec<Closure<dyn FnMut()>>,
}

/// Browser timers take a signed delay; config validation keeps ours in range.
pub(crate) fn timeout_ms(ms: u32) -> i32 {
    i32::try_from(ms).unwrap_or(i32::MAX)
}

impl BrowserScheduler {
    pub fn new(window: Window) -> Self {
        Self { window, countdown: None, contamination: None, retired: Vec::new() }
    }

    fn slot(&mut self, kind: TimerKind) -> &mut Option<BrowserTimer> {
        match kind {
            TimerKind::Countdown => &mut self.countdown,
            TimerKind::Contamination => &mut self.contamination,
        }
    }

    fn clear(&mut self, timer: BrowserTimer) {
        match timer.mode {
            TimerMode::Repeating => self.window.clear_interval_with_handle(timer.handle),
            TimerMode::Once => self.window.clear_timeout_with_handle(timer.handle),
        }
        self.retired.push(timer.callback);
    }
}

impl Scheduler for BrowserScheduler {
    fn arm(&mut self, id: TimerId, delay_ms: u32, mode: TimerMode) {
        self.retired.clear();
        if let Some(old) = self.slot(id.kind).take() {
            self.clear(old);
        }

        let callback = Closure::wrap(Box::new(move || {
            super::with_engine(|engine| engine.fire(id));
        }) as Box<dyn FnMut()>);
        let js_fn = callback.as_ref().unchecked_ref();
        let armed = match mode {
            TimerMode::Repeating => self
                .window
                .set_interval_with_callback_and_timeout_and_arguments_0(js_fn, timeout_ms(delay_ms)),
            TimerMode::Once => self
                .window
                .set_timeout_with_callback_and_timeout_and_arguments_0(js_fn, timeout_ms(delay_ms)),
        };
        match armed {
            Ok(handle) => *self.slot(id.kind) = Some(BrowserTimer { id, mode, handle, callback }),
            Err(err) => log::error!("failed to arm {:?} timer: {err:?}", id.kind),
        }
    }

    fn disarm(&mut self, id: TimerId) {
        let current = self.slot(id.kind).as_ref().is_some_and(|t| t.id == id);
        if !current {
            return;
        }
        if let Some(timer) = self.slot(id.kind).take() {
            self.clear(timer);
        }
    }
}

impl Drop for BrowserScheduler {
    fn drop(&mut self) {
        for timer in [self.countdown.take(), self.contamination.take()].into_iter().flatten() {
            self.clear(timer);
        }
    }
}
