//! Game state, derived phase and end-of-game result.

/// Mutable per-game state. Only [`crate::GameEngine`] writes to it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameState {
    pub score: u32,
    pub time_left_seconds: u32,
    pub progress_percent: f64, // 0..=100
    pub is_active: bool,
    pub is_contaminated: bool,
    /// Successful pumps needed to fill the meter; drawn at start.
    pub clicks_to_win: u32,
    /// `100 / clicks_to_win`, constant for the game.
    pub pump_gain_percent: f64,
}

impl GameState {
    /// Fresh, inactive state for a round of `round_seconds`.
    pub fn idle(round_seconds: u32) -> Self {
        Self {
            score: 0,
            time_left_seconds: round_seconds,
            progress_percent: 0.0,
            is_active: false,
            is_contaminated: false,
            clicks_to_win: 0,
            pump_gain_percent: 0.0,
        }
    }

    /// Meter percentage as shown on the label.
    pub fn rounded_progress(&self) -> u32 {
        self.progress_percent.round() as u32
    }

    pub fn is_full(&self) -> bool {
        self.progress_percent >= 100.0
    }
}

/// Coarse state machine position, derived from [`GameState`] plus whether a
/// result is on display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    RunningClean,
    RunningContaminated,
    Ended,
}

/// Summary shown when a game ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameResult {
    pub success: bool,
    pub progress_percent: u32,
    pub score: u32,
}

impl GameResult {
    pub fn message(&self) -> String {
        if self.success {
            format!(
                "Great job! You filled the meter to {}% and scored {}.",
                self.progress_percent, self.score
            )
        } else {
            format!(
                "Time's up! You reached {}% with a score of {}. Try again!",
                self.progress_percent, self.score
            )
        }
    }
}
