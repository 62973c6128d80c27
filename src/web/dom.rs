//! DOM rendering of the game.
//!
//! Expects the page markup to provide the element ids listed in
//! [`DomView::mount`]; styling (`hidden`, `safe`, `contaminated`,
//! `pump-blocked`, `shake`, `glow`) comes from the page's stylesheet.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, Window};

use super::scheduler::timeout_ms;
use crate::state::GameResult;
use crate::view::{Action, Controls, Feedback, View};

/// A feedback class waiting for its removal timeout.
struct Pulse {
    class: &'static str,
    handle: i32,
    _clear: Closure<dyn FnMut()>,
}

pub struct DomView {
    window: Window,
    pub(crate) start_btn: HtmlButtonElement,
    pub(crate) pump_btn: HtmlButtonElement,
    pub(crate) purify_btn: HtmlButtonElement,
    pub(crate) reset_btn: HtmlElement,
    pub(crate) replay_btn: Option<HtmlElement>,
    time: Element,
    score: Element,
    meter_fill: HtmlElement,
    meter_pct: Element,
    status_badge: Element,
    result_panel: Element,
    result_msg: Element,
    pulse_ms: u32,
    // Indexed by `Action`: pump, purify.
    pulses: [Option<Pulse>; 2],
}

fn element(doc: &Document, id: &str) -> Result<Element, JsValue> {
    doc.get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id} element")))
}

impl DomView {
    /// Look up every element the view renders into.
    pub fn mount(window: &Window, doc: &Document, pulse_ms: u32) -> Result<Self, JsValue> {
        Ok(Self {
            window: window.clone(),
            start_btn: element(doc, "startBtn")?.dyn_into()?,
            pump_btn: element(doc, "pumpBtn")?.dyn_into()?,
            purify_btn: element(doc, "purifyBtn")?.dyn_into()?,
            reset_btn: element(doc, "resetBtn")?.dyn_into()?,
            replay_btn: match doc.get_element_by_id("replayBtn") {
                Some(el) => Some(el.dyn_into()?),
                None => None,
            },
            time: element(doc, "time")?,
            score: element(doc, "score")?,
            meter_fill: element(doc, "meterFill")?.dyn_into()?,
            meter_pct: element(doc, "meterPct")?,
            status_badge: element(doc, "statusBadge")?,
            result_panel: element(doc, "resultPanel")?,
            result_msg: element(doc, "resultMsg")?,
            pulse_ms,
            pulses: [None, None],
        })
    }

    fn button(&self, action: Action) -> &HtmlButtonElement {
        match action {
            Action::Pump => &self.pump_btn,
            Action::Purify => &self.purify_btn,
        }
    }

    /// Add `class` to the action's button and take it off again after the
    /// pulse interval. A newer pulse on the same button replaces the pending one.
    fn pulse(&mut self, action: Action, class: &'static str) {
        let slot = action as usize;
        let el: Element = self.button(action).clone().into();
        if let Some(prev) = self.pulses[slot].take() {
            self.window.clear_timeout_with_handle(prev.handle);
            el.class_list().remove_1(prev.class).ok();
        }
        el.class_list().add_1(class).ok();

        let target = el.clone();
        let clear = Closure::wrap(Box::new(move || {
            target.class_list().remove_1(class).ok();
        }) as Box<dyn FnMut()>);
        match self.window.set_timeout_with_callback_and_timeout_and_arguments_0(
            clear.as_ref().unchecked_ref(),
            timeout_ms(self.pulse_ms),
        ) {
            Ok(handle) => self.pulses[slot] = Some(Pulse { class, handle, _clear: clear }),
            Err(err) => log::warn!("could not schedule feedback clear: {err:?}"),
        }
    }
}

impl Drop for DomView {
    fn drop(&mut self) {
        for pulse in self.pulses.iter_mut().filter_map(Option::take) {
            self.window.clear_timeout_with_handle(pulse.handle);
        }
    }
}

impl View for DomView {
    fn score_changed(&mut self, score: u32) {
        self.score.set_text_content(Some(&score.to_string()));
    }

    fn time_changed(&mut self, seconds_left: u32) {
        self.time.set_text_content(Some(&seconds_left.to_string()));
    }

    fn progress_changed(&mut self, percent: f64) {
        self.meter_fill
            .style()
            .set_property("width", &format!("{percent}%"))
            .ok();
        self.meter_pct
            .set_text_content(Some(&format!("{}%", percent.round() as u32)));
    }

    fn contamination_changed(&mut self, contaminated: bool) {
        let badge = self.status_badge.class_list();
        if contaminated {
            self.status_badge.set_text_content(Some("Water: Contaminated"));
            badge.remove_1("safe").ok();
            badge.add_1("contaminated").ok();
            self.pump_btn.class_list().add_1("pump-blocked").ok();
        } else {
            self.status_badge.set_text_content(Some("Water: Clean"));
            badge.remove_1("contaminated").ok();
            badge.add_1("safe").ok();
            self.pump_btn.class_list().remove_1("pump-blocked").ok();
        }
    }

    fn buttons_changed(&mut self, controls: Controls) {
        self.pump_btn.set_disabled(!controls.pump);
        self.purify_btn.set_disabled(!controls.purify);
        self.start_btn.set_disabled(!controls.start);
    }

    fn reset_control_visible(&mut self, visible: bool) {
        self.reset_btn
            .class_list()
            .toggle_with_force("hidden", !visible)
            .ok();
    }

    fn result_shown(&mut self, result: &GameResult) {
        self.result_msg.set_text_content(Some(&result.message()));
        self.result_panel.class_list().remove_1("hidden").ok();
    }

    fn result_hidden(&mut self) {
        self.result_panel.class_list().add_1("hidden").ok();
    }

    fn feedback(&mut self, action: Action, feedback: Feedback) {
        let class = match feedback {
            Feedback::Invalid => "shake",
            Feedback::Valid => "glow",
        };
        self.pulse(action, class);
    }
}
