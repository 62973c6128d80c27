//! Tunable game constants.
//!
//! Defaults reproduce the shipped game: a 45 second round, a clicks-to-win draw
//! from 25..=35 and a contamination delay between 0.9 and 2.5 seconds.

use thiserror::Error;

pub const DEFAULT_ROUND_SECONDS: u32 = 45;
pub const DEFAULT_TICK_INTERVAL_MS: u32 = 1000;
pub const DEFAULT_MIN_CLICKS_TO_WIN: u32 = 25;
pub const DEFAULT_MAX_CLICKS_TO_WIN: u32 = 35;
pub const DEFAULT_MIN_CONTAMINATION_DELAY_MS: u32 = 900;
pub const DEFAULT_MAX_CONTAMINATION_DELAY_MS: u32 = 2500;
pub const DEFAULT_FEEDBACK_PULSE_MS: u32 = 350;

/// Longest delay a browser timer accepts (`setTimeout` takes a signed 32-bit value).
pub const MAX_TIMER_MS: u32 = i32::MAX as u32;

/// Reasons a [`GameConfig`] is rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("round length must be at least one second")]
    ZeroRound,
    #[error("tick interval must be non-zero")]
    ZeroTickInterval,
    #[error("clicks-to-win must be at least 1")]
    ZeroClicks,
    #[error("clicks-to-win range is inverted ({min} > {max})")]
    ClicksRange { min: u32, max: u32 },
    #[error("contamination delay range is inverted ({min}ms > {max}ms)")]
    ContaminationRange { min: u32, max: u32 },
    #[error("feedback pulse must be non-zero")]
    ZeroFeedbackPulse,
    #[error("{field} of {ms}ms exceeds the 2147483647ms timer limit")]
    DelayTooLong { field: &'static str, ms: u32 },
    #[cfg(feature = "serde_json")]
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    pub round_seconds: u32,
    pub tick_interval_ms: u32,
    pub min_clicks_to_win: u32,
    pub max_clicks_to_win: u32,
    pub min_contamination_delay_ms: u32,
    pub max_contamination_delay_ms: u32,
    /// How long a valid/invalid feedback pulse stays on a button.
    pub feedback_pulse_ms: u32,
    /// Fixed RNG seed; entropy is used when absent.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_seconds: DEFAULT_ROUND_SECONDS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            min_clicks_to_win: DEFAULT_MIN_CLICKS_TO_WIN,
            max_clicks_to_win: DEFAULT_MAX_CLICKS_TO_WIN,
            min_contamination_delay_ms: DEFAULT_MIN_CONTAMINATION_DELAY_MS,
            max_contamination_delay_ms: DEFAULT_MAX_CONTAMINATION_DELAY_MS,
            feedback_pulse_ms: DEFAULT_FEEDBACK_PULSE_MS,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.round_seconds == 0 {
            return Err(ConfigError::ZeroRound);
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.min_clicks_to_win == 0 {
            return Err(ConfigError::ZeroClicks);
        }
        if self.min_clicks_to_win > self.max_clicks_to_win {
            return Err(ConfigError::ClicksRange {
                min: self.min_clicks_to_win,
                max: self.max_clicks_to_win,
            });
        }
        if self.min_contamination_delay_ms > self.max_contamination_delay_ms {
            return Err(ConfigError::ContaminationRange {
                min: self.min_contamination_delay_ms,
                max: self.max_contamination_delay_ms,
            });
        }
        if self.feedback_pulse_ms == 0 {
            return Err(ConfigError::ZeroFeedbackPulse);
        }
        for (field, ms) in [
            ("tick_interval_ms", self.tick_interval_ms),
            ("max_contamination_delay_ms", self.max_contamination_delay_ms),
            ("feedback_pulse_ms", self.feedback_pulse_ms),
        ] {
            if ms > MAX_TIMER_MS {
                return Err(ConfigError::DelayTooLong { field, ms });
            }
        }
        Ok(())
    }

    /// Parse a (possibly partial) JSON config; missing fields keep their defaults.
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Pin clicks-to-win to a single value.
    pub fn with_clicks_to_win(mut self, clicks: u32) -> Self {
        self.min_clicks_to_win = clicks;
        self.max_clicks_to_win = clicks;
        self
    }

    /// Pin the contamination delay to a single value.
    pub fn with_contamination_delay_ms(mut self, delay_ms: u32) -> Self {
        self.min_contamination_delay_ms = delay_ms;
        self.max_contamination_delay_ms = delay_ms;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = GameConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.round_seconds, 45);
        assert_eq!((cfg.min_clicks_to_win, cfg.max_clicks_to_win), (25, 35));
        assert_eq!(
            (cfg.min_contamination_delay_ms, cfg.max_contamination_delay_ms),
            (900, 2500)
        );
    }

    #[test]
    fn rejects_inverted_ranges() {
        let cfg = GameConfig {
            min_clicks_to_win: 10,
            max_clicks_to_win: 5,
            ..GameConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ClicksRange { min: 10, max: 5 })
        ));

        let cfg = GameConfig {
            min_contamination_delay_ms: 3000,
            ..GameConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ContaminationRange { .. })
        ));
    }

    #[test]
    fn rejects_zero_values() {
        let zero_round = GameConfig { round_seconds: 0, ..GameConfig::default() };
        assert!(matches!(zero_round.validate(), Err(ConfigError::ZeroRound)));
        let zero_clicks = GameConfig::default().with_clicks_to_win(0);
        assert!(matches!(zero_clicks.validate(), Err(ConfigError::ZeroClicks)));
        let zero_tick = GameConfig { tick_interval_ms: 0, ..GameConfig::default() };
        assert!(matches!(zero_tick.validate(), Err(ConfigError::ZeroTickInterval)));
        let zero_pulse = GameConfig { feedback_pulse_ms: 0, ..GameConfig::default() };
        assert!(matches!(zero_pulse.validate(), Err(ConfigError::ZeroFeedbackPulse)));
    }

    #[test]
    fn rejects_delays_past_the_browser_timer_limit() {
        let cfg = GameConfig { tick_interval_ms: MAX_TIMER_MS, ..GameConfig::default() };
        assert!(cfg.validate().is_ok());

        let cfg = GameConfig { tick_interval_ms: 3_000_000_000, ..GameConfig::default() };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::DelayTooLong { field: "tick_interval_ms", ms: 3_000_000_000 })
        ));
        let cfg = GameConfig::default().with_contamination_delay_ms(MAX_TIMER_MS + 1);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::DelayTooLong { field: "max_contamination_delay_ms", .. })
        ));
        let cfg = GameConfig { feedback_pulse_ms: u32::MAX, ..GameConfig::default() };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::DelayTooLong { field: "feedback_pulse_ms", .. })
        ));
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn json_rejects_oversized_delays() {
        let err = GameConfig::from_json(
            r#"{ "tick_interval_ms": 3000000000, "max_contamination_delay_ms": 4000000000 }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DelayTooLong { field: "tick_interval_ms", .. }));
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = GameConfig::from_json(r#"{ "round_seconds": 30, "seed": 7 }"#).unwrap();
        assert_eq!(cfg.round_seconds, 30);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.max_clicks_to_win, DEFAULT_MAX_CLICKS_TO_WIN);
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn json_is_validated() {
        let err = GameConfig::from_json(r#"{ "tick_interval_ms": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroTickInterval));
        let err = GameConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(std::error::Error::source(&err).is_some(), "json error keeps its source");
    }
}
