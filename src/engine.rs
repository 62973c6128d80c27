//! The game state machine.
//!
//! `Idle --start--> RunningClean <--purify / contamination fire--> RunningContaminated`,
//! either running phase `--meter full / time out--> Ended`, and `reset` from
//! anywhere back to `Idle`. `start` is accepted from every phase and simply
//! restarts.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{ConfigError, GameConfig};
use crate::state::{GameResult, GameState, Phase};
use crate::timer::{ManualScheduler, Scheduler, TimerHandle, TimerId, TimerKind, TimerMode};
use crate::view::{Action, Controls, Feedback, View};

pub struct GameEngine<V, S, R> {
    config: GameConfig,
    state: GameState,
    view: V,
    scheduler: S,
    rng: R,
    countdown: TimerHandle,
    contamination: TimerHandle,
    next_generation: u64,
    last_result: Option<GameResult>,
}

impl<V: View, S: Scheduler, R: Rng> GameEngine<V, S, R> {
    pub fn new(config: GameConfig, view: V, scheduler: S, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            state: GameState::idle(config.round_seconds),
            config,
            view,
            scheduler,
            rng,
            countdown: TimerHandle::default(),
            contamination: TimerHandle::default(),
            next_generation: 1,
            last_result: None,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Result of the last finished game, cleared by `start` and `reset`.
    pub fn last_result(&self) -> Option<GameResult> {
        self.last_result
    }

    pub fn phase(&self) -> Phase {
        if self.state.is_active {
            if self.state.is_contaminated {
                Phase::RunningContaminated
            } else {
                Phase::RunningClean
            }
        } else if self.last_result.is_some() {
            Phase::Ended
        } else {
            Phase::Idle
        }
    }

    pub fn is_timer_armed(&self, kind: TimerKind) -> bool {
        self.handle(kind).is_armed()
    }

    /// Start (or restart) a game.
    pub fn start(&mut self) {
        self.disarm_all();

        let clicks_to_win = self
            .rng
            .gen_range(self.config.min_clicks_to_win..=self.config.max_clicks_to_win);
        let pump_gain_percent = 100.0 / f64::from(clicks_to_win);
        self.state = GameState {
            score: 0,
            time_left_seconds: self.config.round_seconds,
            progress_percent: 0.0,
            is_active: true,
            is_contaminated: false,
            clicks_to_win,
            pump_gain_percent,
        };
        self.last_result = None;
        log::info!(
            "game started: clicks_to_win={clicks_to_win} gain={pump_gain_percent:.3}% round={}s",
            self.config.round_seconds
        );

        self.publish_state();
        self.view.result_hidden();
        self.view.buttons_changed(Controls::running(false));
        self.view.reset_control_visible(true);

        self.countdown = self.arm(
            TimerKind::Countdown,
            self.config.tick_interval_ms,
            TimerMode::Repeating,
        );
        self.schedule_contamination();
    }

    /// Abandon the current game without a result.
    pub fn reset(&mut self) {
        self.disarm_all();
        self.state = GameState::idle(self.config.round_seconds);
        self.last_result = None;
        log::info!("game reset");

        self.publish_state();
        self.view.buttons_changed(Controls::STOPPED);
        self.view.reset_control_visible(false);
        self.view.result_hidden();
    }

    /// One second of round time.
    pub fn tick(&mut self) {
        if !self.state.is_active {
            return;
        }
        self.state.time_left_seconds = self.state.time_left_seconds.saturating_sub(1);
        self.view.time_changed(self.state.time_left_seconds);
        if self.state.time_left_seconds == 0 {
            self.end(false);
        }
    }

    pub fn pump(&mut self) {
        if !self.state.is_active {
            return;
        }
        if self.state.is_contaminated {
            self.view.feedback(Action::Pump, Feedback::Invalid);
            return;
        }

        self.state.score += 1;
        // Derived from the pump count so `clicks_to_win` pumps land on exactly 100.
        let progress =
            f64::from(self.state.score) * 100.0 / f64::from(self.state.clicks_to_win);
        self.state.progress_percent = progress.min(100.0);
        self.view.progress_changed(self.state.progress_percent);
        self.view.score_changed(self.state.score);
        self.view.feedback(Action::Pump, Feedback::Valid);

        if self.state.is_full() {
            self.state.progress_percent = 100.0;
            self.end(true);
        }
    }

    pub fn purify(&mut self) {
        if !self.state.is_active {
            return;
        }
        // The view disables purify while clean, but queued input can still land here.
        if !self.state.is_contaminated {
            self.view.feedback(Action::Purify, Feedback::Invalid);
            return;
        }

        self.set_contaminated(false);
        self.schedule_contamination();
        self.view.feedback(Action::Purify, Feedback::Valid);
        log::debug!("water purified at {}s left", self.state.time_left_seconds);
    }

    /// Scheduler callback. Stale ids are ignored.
    pub fn fire(&mut self, id: TimerId) {
        if !self.handle(id.kind).matches(id) {
            log::debug!("ignoring stale {:?} timer (generation {})", id.kind, id.generation);
            return;
        }
        match id.kind {
            TimerKind::Countdown => self.tick(),
            TimerKind::Contamination => {
                self.contamination.disarm();
                self.trigger_contamination();
            }
        }
    }

    /// Push the whole state to the view, e.g. after the view was (re)mounted.
    pub fn refresh_view(&mut self) {
        self.publish_state();
        if self.state.is_active {
            self.view.buttons_changed(Controls::running(self.state.is_contaminated));
        } else {
            self.view.buttons_changed(Controls::STOPPED);
        }
        self.view.reset_control_visible(self.state.is_active);
        match self.last_result {
            Some(result) => self.view.result_shown(&result),
            None => self.view.result_hidden(),
        }
    }

    fn end(&mut self, won: bool) {
        self.state.is_active = false;
        self.disarm_all();

        self.view.buttons_changed(Controls::STOPPED);
        self.view.reset_control_visible(false);

        let result = GameResult {
            success: won || self.state.is_full(),
            progress_percent: self.state.rounded_progress(),
            score: self.state.score,
        };
        log::info!(
            "game over: success={} progress={}% score={}",
            result.success,
            result.progress_percent,
            result.score
        );
        self.last_result = Some(result);
        self.view.result_shown(&result);
    }

    fn trigger_contamination(&mut self) {
        // Re-checked at fire time: the game may have ended or been purified since arming.
        if !self.state.is_active || self.state.is_contaminated {
            return;
        }
        log::debug!("water contaminated at {}s left", self.state.time_left_seconds);
        self.set_contaminated(true);
    }

    fn set_contaminated(&mut self, contaminated: bool) {
        self.state.is_contaminated = contaminated;
        self.view.contamination_changed(contaminated);
        self.view.buttons_changed(Controls::running(contaminated));
    }

    fn schedule_contamination(&mut self) {
        self.disarm(TimerKind::Contamination);
        if !self.state.is_active {
            return;
        }
        let delay_ms = self.rng.gen_range(
            self.config.min_contamination_delay_ms..=self.config.max_contamination_delay_ms,
        );
        self.contamination = self.arm(TimerKind::Contamination, delay_ms, TimerMode::Once);
        log::debug!("next contamination in {delay_ms}ms");
    }

    fn publish_state(&mut self) {
        self.view.score_changed(self.state.score);
        self.view.time_changed(self.state.time_left_seconds);
        self.view.progress_changed(self.state.progress_percent);
        self.view.contamination_changed(self.state.is_contaminated);
    }

    fn arm(&mut self, kind: TimerKind, delay_ms: u32, mode: TimerMode) -> TimerHandle {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.scheduler.arm(TimerId { kind, generation }, delay_ms, mode);
        TimerHandle::armed(generation)
    }

    fn disarm(&mut self, kind: TimerKind) {
        let handle = self.handle(kind);
        if handle.is_armed() {
            self.scheduler.disarm(TimerId { kind, generation: handle.generation() });
        }
        match kind {
            TimerKind::Countdown => self.countdown.disarm(),
            TimerKind::Contamination => self.contamination.disarm(),
        }
    }

    fn disarm_all(&mut self) {
        self.disarm(TimerKind::Countdown);
        self.disarm(TimerKind::Contamination);
    }

    fn handle(&self, kind: TimerKind) -> TimerHandle {
        match kind {
            TimerKind::Countdown => self.countdown,
            TimerKind::Contamination => self.contamination,
        }
    }
}

impl<V: View, R: Rng> GameEngine<V, ManualScheduler, R> {
    /// Advance the virtual clock by `ms`, firing every timer that comes due.
    pub fn advance(&mut self, ms: u64) {
        let until = self.scheduler.now_ms() + ms;
        while let Some(id) = self.scheduler.pop_due(until) {
            self.fire(id);
        }
        self.scheduler.set_now(until);
    }
}

/// RNG for a game: fixed when `seed` is given, otherwise seeded from system entropy.
pub fn game_rng(seed: Option<u64>) -> Result<ChaCha8Rng, getrandom::Error> {
    match seed {
        Some(seed) => Ok(ChaCha8Rng::seed_from_u64(seed)),
        None => {
            let mut bytes = [0u8; 32];
            getrandom::getrandom(&mut bytes)?;
            Ok(ChaCha8Rng::from_seed(bytes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{EventLog, ViewEvent};

    type TestEngine = GameEngine<EventLog, ManualScheduler, ChaCha8Rng>;

    fn engine(config: GameConfig) -> TestEngine {
        GameEngine::new(config, EventLog::new(), ManualScheduler::new(), ChaCha8Rng::seed_from_u64(7))
            .unwrap()
    }

    #[test]
    fn new_rejects_invalid_config() {
        let cfg = GameConfig { round_seconds: 0, ..GameConfig::default() };
        let res = GameEngine::new(cfg, EventLog::new(), ManualScheduler::new(), ChaCha8Rng::seed_from_u64(1));
        assert!(res.is_err());
    }

    #[test]
    fn phases_follow_lifecycle() {
        let mut e = engine(GameConfig::default().with_clicks_to_win(25).with_contamination_delay_ms(900));
        assert_eq!(e.phase(), Phase::Idle);
        e.start();
        assert_eq!(e.phase(), Phase::RunningClean);
        e.advance(900);
        assert_eq!(e.phase(), Phase::RunningContaminated);
        e.purify();
        assert_eq!(e.phase(), Phase::RunningClean);
        for _ in 0..25 {
            e.pump();
        }
        assert_eq!(e.phase(), Phase::Ended);
        e.reset();
        assert_eq!(e.phase(), Phase::Idle);
    }

    #[test]
    fn timeout_with_full_meter_counts_as_win() {
        let mut e = engine(GameConfig::default().with_contamination_delay_ms(30_000));
        e.start();
        e.state.progress_percent = 100.0;
        e.state.time_left_seconds = 1;
        e.tick();
        assert!(!e.state().is_active);
        let result = e.last_result().unwrap();
        assert!(result.success);
        assert_eq!(result.progress_percent, 100);
    }

    #[test]
    fn stale_fire_is_ignored() {
        let mut e = engine(GameConfig::default().with_contamination_delay_ms(900));
        e.start();
        let stale = TimerId {
            kind: TimerKind::Contamination,
            generation: e.contamination.generation(),
        };
        e.reset();
        e.start();
        e.fire(stale);
        assert!(!e.state().is_contaminated);
        assert!(e.is_timer_armed(TimerKind::Contamination));
    }

    #[test]
    fn contamination_fire_does_not_rearm() {
        let mut e = engine(GameConfig::default().with_contamination_delay_ms(1500));
        e.start();
        e.advance(1500);
        assert!(e.state().is_contaminated);
        assert!(!e.is_timer_armed(TimerKind::Contamination));
        assert!(!e.scheduler().is_armed(TimerKind::Contamination));
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = game_rng(Some(42)).unwrap();
        let mut b = game_rng(Some(42)).unwrap();
        assert_eq!(a.gen_range(0..1000u32), b.gen_range(0..1000u32));
    }

    #[test]
    fn refresh_view_replays_current_state() {
        let mut e = engine(GameConfig::default().with_clicks_to_win(25));
        e.start();
        e.pump();
        e.view_mut().clear();
        e.refresh_view();
        let log = e.view();
        assert!(log.contains(&ViewEvent::Score(1)));
        assert!(log.contains(&ViewEvent::Progress(4.0)));
        assert!(log.contains(&ViewEvent::ResetControl(true)));
        assert!(log.contains(&ViewEvent::ResultHidden));
    }
}
