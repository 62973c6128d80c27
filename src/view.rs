//! Presentation seam. The engine pushes every visible change through [`View`];
//! rendering (DOM, canvas, logs) lives behind it.

use crate::state::GameResult;

/// Player action a feedback pulse belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Pump,
    Purify,
}

/// Transient pulse; the view clears it on its own after a short interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feedback {
    Valid,
    Invalid,
}

/// Button enablement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Controls {
    pub pump: bool,
    pub purify: bool,
    pub start: bool,
}

impl Controls {
    /// Nothing running: only start is usable.
    pub const STOPPED: Controls = Controls { pump: false, purify: false, start: true };

    /// Running; purify is only meaningful while contaminated.
    pub fn running(contaminated: bool) -> Self {
        Self { pump: true, purify: contaminated, start: false }
    }
}

pub trait View {
    fn score_changed(&mut self, score: u32);
    fn time_changed(&mut self, seconds_left: u32);
    /// `percent` is in 0..=100; labels show it rounded.
    fn progress_changed(&mut self, percent: f64);
    fn contamination_changed(&mut self, contaminated: bool);
    fn buttons_changed(&mut self, controls: Controls);
    fn reset_control_visible(&mut self, visible: bool);
    fn result_shown(&mut self, result: &GameResult);
    fn result_hidden(&mut self);
    fn feedback(&mut self, action: Action, feedback: Feedback);
}

/// One recorded [`View`] notification.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewEvent {
    Score(u32),
    Time(u32),
    Progress(f64),
    Contamination(bool),
    Buttons(Controls),
    ResetControl(bool),
    ResultShown(GameResult),
    ResultHidden,
    Feedback(Action, Feedback),
}

/// View that just records what it is told. Used for headless runs.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    pub events: Vec<ViewEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn last_result(&self) -> Option<GameResult> {
        self.events.iter().rev().find_map(|e| match e {
            ViewEvent::ResultShown(r) => Some(*r),
            _ => None,
        })
    }

    pub fn last_buttons(&self) -> Option<Controls> {
        self.events.iter().rev().find_map(|e| match e {
            ViewEvent::Buttons(c) => Some(*c),
            _ => None,
        })
    }

    pub fn feedback_events(&self) -> impl Iterator<Item = (Action, Feedback)> + '_ {
        self.events.iter().filter_map(|e| match e {
            ViewEvent::Feedback(a, f) => Some((*a, *f)),
            _ => None,
        })
    }

    pub fn contains(&self, event: &ViewEvent) -> bool {
        self.events.iter().any(|e| e == event)
    }
}

impl View for EventLog {
    fn score_changed(&mut self, score: u32) {
        self.events.push(ViewEvent::Score(score));
    }
    fn time_changed(&mut self, seconds_left: u32) {
        self.events.push(ViewEvent::Time(seconds_left));
    }
    fn progress_changed(&mut self, percent: f64) {
        self.events.push(ViewEvent::Progress(percent));
    }
    fn contamination_changed(&mut self, contaminated: bool) {
        self.events.push(ViewEvent::Contamination(contaminated));
    }
    fn buttons_changed(&mut self, controls: Controls) {
        self.events.push(ViewEvent::Buttons(controls));
    }
    fn reset_control_visible(&mut self, visible: bool) {
        self.events.push(ViewEvent::ResetControl(visible));
    }
    fn result_shown(&mut self, result: &GameResult) {
        self.events.push(ViewEvent::ResultShown(*result));
    }
    fn result_hidden(&mut self) {
        self.events.push(ViewEvent::ResultHidden);
    }
    fn feedback(&mut self, action: Action, feedback: Feedback) {
        self.events.push(ViewEvent::Feedback(action, feedback));
    }
}
