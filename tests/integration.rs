// End-to-end rounds through the public API, timed by the virtual clock.
// These tests avoid wasm-specific functionality so they run under `cargo test`.

use pump_it_pure::{EventLog, GameConfig, GameEngine, GameResult, ManualScheduler, Phase, game_rng};

fn engine(config: GameConfig) -> GameEngine<EventLog, ManualScheduler, rand_chacha::ChaCha8Rng> {
    GameEngine::new(config, EventLog::new(), ManualScheduler::new(), game_rng(Some(2024)).unwrap())
        .unwrap()
}

// Forced 25 clicks: each pump is worth exactly 4%, the 25th one wins.
#[test]
fn twenty_five_clean_pumps_win() {
    let mut e = engine(GameConfig::default().with_clicks_to_win(25));
    e.start();
    assert_eq!(e.state().pump_gain_percent, 4.0);

    for _ in 0..25 {
        e.pump();
    }
    assert_eq!(e.state().progress_percent, 100.0);
    assert_eq!(e.state().score, 25);
    assert_eq!(
        e.last_result(),
        Some(GameResult { success: true, progress_percent: 100, score: 25 })
    );
    assert_eq!(
        e.last_result().unwrap().message(),
        "Great job! You filled the meter to 100% and scored 25."
    );
}

// 45 ticks, never pumping: the round times out empty.
#[test]
fn idle_round_times_out() {
    let mut e = engine(GameConfig::default());
    e.start();
    for _ in 0..44 {
        e.tick();
    }
    assert_eq!(e.state().time_left_seconds, 1);
    assert!(e.state().is_active);
    e.tick();

    assert_eq!(
        e.last_result(),
        Some(GameResult { success: false, progress_percent: 0, score: 0 })
    );
    assert_eq!(e.phase(), Phase::Ended);
}

// Same round driven by the real countdown timer instead of manual ticks.
#[test]
fn idle_round_times_out_on_the_clock() {
    let mut e = engine(GameConfig::default());
    e.start();
    e.advance(45_000);
    let result = e.last_result().expect("round should be over after 45s");
    assert!(!result.success);
    assert_eq!(result.progress_percent, 0);
    assert_eq!(e.state().time_left_seconds, 0);
}

// A player who purifies as soon as the water turns and pumps every 400ms.
#[test]
fn attentive_player_wins_through_contamination() {
    let mut e = engine(GameConfig::default());
    e.start();
    let clicks = e.state().clicks_to_win;
    let mut blocked = 0;
    while e.state().is_active {
        if e.state().is_contaminated {
            e.purify();
        }
        let score = e.state().score;
        e.pump();
        if e.state().is_active && e.state().score == score {
            blocked += 1;
        }
        e.advance(400);
    }
    assert_eq!(blocked, 0, "pumps right after purify must go through");
    let result = e.last_result().unwrap();
    assert!(result.success);
    assert_eq!(result.score, clicks);
}

// A player who never purifies gets stuck once the water turns.
#[test]
fn ignoring_contamination_loses() {
    let mut e = engine(GameConfig::default().with_clicks_to_win(35));
    e.start();
    while e.state().is_active {
        e.pump();
        e.advance(250);
    }
    let result = e.last_result().unwrap();
    assert!(!result.success);
    assert!(result.score < 35);
    assert!(result.progress_percent < 100);
}

// Replaying after an ended round starts fresh with a new draw.
#[test]
fn replay_after_end() {
    let mut e = engine(GameConfig::default());
    e.start();
    e.advance(45_000);
    assert_eq!(e.phase(), Phase::Ended);

    e.start();
    assert_eq!(e.phase(), Phase::RunningClean);
    assert_eq!(e.last_result(), None);
    assert_eq!(e.state().time_left_seconds, 45);
    assert_eq!(e.state().score, 0);
}
