//! Tests for per-turn timeouts driven by a manual clock.

use family_turns::{ManualClock, MoveInput, Player, TokioTimer, TurnEngine, TurnState};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const LIMIT: Duration = Duration::from_secs(30);

fn timed_engine(
    ids: &[&str],
    auto_skip: bool,
    max_turns: Option<u32>,
) -> (TurnEngine, ManualClock, Arc<Mutex<Vec<String>>>, Arc<Mutex<usize>>) {
    let clock = ManualClock::default();
    let turns = Arc::new(Mutex::new(Vec::new()));
    let game_overs = Arc::new(Mutex::new(0));
    let turn_log = turns.clone();
    let over_count = game_overs.clone();

    let mut builder = TurnEngine::builder(
        ids.iter()
            .map(|id| Player::new(*id, id.to_uppercase()))
            .collect(),
    )
    .clock(clock.clone())
    .timer(clock.clone())
    .turn_time_limit(LIMIT)
    .auto_skip(auto_skip)
    .on_turn_change(move |p| turn_log.lock().unwrap().push(p.id.clone()))
    .on_game_over(move |_| *over_count.lock().unwrap() += 1);
    if let Some(max) = max_turns {
        builder = builder.max_turns(max);
    }

    (builder.build().expect("valid config"), clock, turns, game_overs)
}

/// Moves time forward and delivers every elapsed token to the engine.
fn tick(engine: &mut TurnEngine, clock: &ManualClock, by: Duration) -> bool {
    let mut advanced = false;
    clock.run_for(by, |token| advanced |= engine.handle_timeout(token));
    advanced
}

#[test]
fn test_construction_does_not_arm_timer() {
    let (_engine, clock, turns, _) = timed_engine(&["a", "b"], true, None);
    assert!(clock.pending().is_none());
    assert!(turns.lock().unwrap().is_empty());
}

#[test]
fn test_idle_player_forfeits_once_per_interval() {
    let (mut engine, clock, turns, _) = timed_engine(&["a", "b", "c"], true, None);
    engine.start_game().unwrap();
    assert_eq!(
        clock.deadline(),
        engine.start_time().map(|start| start + chrono::Duration::seconds(30))
    );

    assert!(!tick(&mut engine, &clock, LIMIT - Duration::from_secs(1)));
    assert_eq!(engine.turn_count(), 0);

    assert!(tick(&mut engine, &clock, Duration::from_secs(1)));
    assert_eq!(engine.turn_count(), 1);
    assert_eq!(engine.current_player().id, "b");

    for _ in 0..4 {
        assert!(tick(&mut engine, &clock, LIMIT));
    }
    assert_eq!(engine.turn_count(), 5);
    assert_eq!(engine.current_player().id, "c");
    assert_eq!(*turns.lock().unwrap(), vec!["a", "b", "c", "a", "b", "c"]);
}

#[test]
fn test_long_idle_forfeits_every_elapsed_interval() {
    let (mut engine, clock, turns, _) = timed_engine(&["a", "b", "c"], true, None);
    engine.start_game().unwrap();
    let start = engine.start_time().expect("started");

    assert!(tick(&mut engine, &clock, LIMIT * 3));

    assert_eq!(engine.turn_count(), 3);
    assert_eq!(engine.current_player().id, "a");
    assert_eq!(
        engine.last_move_time(),
        Some(start + chrono::Duration::seconds(90))
    );
    assert_eq!(clock.deadline(), Some(start + chrono::Duration::seconds(120)));
    assert_eq!(*turns.lock().unwrap(), vec!["a", "b", "c", "a"]);
}

#[test]
fn test_manual_turn_change_rearms_full_interval() {
    let (mut engine, clock, _, _) = timed_engine(&["a", "b"], true, None);
    engine.start_game().unwrap();

    tick(&mut engine, &clock, Duration::from_secs(20));
    engine.next_turn();

    // the old deadline would have passed here
    assert!(!tick(&mut engine, &clock, Duration::from_secs(20)));
    assert_eq!(engine.turn_count(), 1);
    assert!(tick(&mut engine, &clock, Duration::from_secs(10)));
    assert_eq!(engine.turn_count(), 2);
}

#[test]
fn test_make_move_does_not_reset_timer() {
    let (mut engine, clock, _, _) = timed_engine(&["a", "b"], true, None);
    engine.start_game().unwrap();

    tick(&mut engine, &clock, Duration::from_secs(20));
    engine.make_move(MoveInput::new()).unwrap();
    assert!(tick(&mut engine, &clock, Duration::from_secs(10)));
    assert_eq!(engine.current_player().id, "b");
}

#[test]
fn test_pause_cancels_pending_timeout() {
    let (mut engine, clock, turns, _) = timed_engine(&["a", "b"], true, None);
    engine.start_game().unwrap();
    tick(&mut engine, &clock, LIMIT - Duration::from_millis(1));

    engine.pause();
    assert!(clock.pending().is_none());
    assert!(!tick(&mut engine, &clock, LIMIT * 10));
    assert_eq!(engine.state(), TurnState::Paused);
    assert_eq!(*turns.lock().unwrap(), vec!["a"]);

    engine.resume();
    // resuming starts a fresh, full interval
    assert!(!tick(&mut engine, &clock, LIMIT - Duration::from_secs(1)));
    assert!(tick(&mut engine, &clock, Duration::from_secs(1)));
    assert_eq!(*turns.lock().unwrap(), vec!["a", "b"]);
}

#[test]
fn test_stale_token_is_ignored() {
    let (mut engine, clock, turns, _) = timed_engine(&["a", "b"], true, None);
    engine.start_game().unwrap();
    let stale = clock.pending().expect("armed at start");

    engine.next_turn();
    assert_ne!(clock.pending(), Some(stale));

    // a firing that raced the turn change must not advance again
    assert!(!engine.handle_timeout(stale));
    assert_eq!(engine.turn_count(), 1);
    assert_eq!(turns.lock().unwrap().len(), 2);
}

#[test]
fn test_token_delivered_after_pause_is_ignored() {
    let (mut engine, clock, turns, _) = timed_engine(&["a", "b"], true, None);
    engine.start_game().unwrap();
    let token = clock.pending().unwrap();

    engine.pause();
    assert!(!engine.handle_timeout(token));
    engine.resume();
    assert!(!engine.handle_timeout(token));
    assert_eq!(turns.lock().unwrap().len(), 1);
}

#[test]
fn test_auto_skip_disabled_never_arms() {
    let (mut engine, clock, _, _) = timed_engine(&["a", "b"], false, None);
    engine.start_game().unwrap();

    assert!(clock.pending().is_none());
    assert!(!tick(&mut engine, &clock, LIMIT * 3));
    assert_eq!(engine.turn_count(), 0);
}

#[test]
fn test_timeouts_reach_turn_limit() {
    let (mut engine, clock, turns, game_overs) = timed_engine(&["a", "b"], true, Some(2));
    engine.start_game().unwrap();

    tick(&mut engine, &clock, LIMIT);
    tick(&mut engine, &clock, LIMIT);

    assert!(engine.is_game_over());
    assert!(engine.winner().is_none());
    assert!(clock.pending().is_none(), "finishing cancels the timer");
    assert!(!tick(&mut engine, &clock, LIMIT));
    assert_eq!(*game_overs.lock().unwrap(), 1);
    assert_eq!(*turns.lock().unwrap(), vec!["a", "b"]);
}

#[test]
fn test_end_game_and_restart_cancel_timer() {
    let (mut engine, clock, _, game_overs) = timed_engine(&["a", "b"], true, None);
    engine.start_game().unwrap();
    let token = clock.pending().unwrap();

    engine.end_game(None);
    assert!(clock.pending().is_none());
    assert!(!engine.handle_timeout(token));

    engine.restart();
    assert!(clock.pending().is_none());
    engine.start_game().unwrap();
    assert!(clock.pending().is_some());
    assert_eq!(*game_overs.lock().unwrap(), 1);
}

#[test]
fn test_destroy_silences_engine() {
    let (mut engine, clock, turns, game_overs) = timed_engine(&["a", "b"], true, None);
    engine.start_game().unwrap();
    let token = clock.pending().unwrap();

    engine.destroy();

    assert!(clock.pending().is_none());
    assert!(!engine.handle_timeout(token));
    engine.next_turn();
    engine.end_game(None);
    assert_eq!(*turns.lock().unwrap(), vec!["a"]);
    assert_eq!(*game_overs.lock().unwrap(), 0);
}

#[test]
fn test_dropping_engine_cancels_timer() {
    let (mut engine, clock, _, _) = timed_engine(&["a"], true, None);
    engine.start_game().unwrap();
    assert!(clock.pending().is_some());

    drop(engine);
    assert!(clock.pending().is_none());
}

#[tokio::test]
async fn test_tokio_timer_drives_auto_skip() {
    let (timer, mut timeouts) = TokioTimer::new();
    let turns = Arc::new(Mutex::new(Vec::new()));
    let turn_log = turns.clone();

    let mut engine: TurnEngine = TurnEngine::builder(vec![Player::new("a", "A"), Player::new("b", "B")])
        .timer(timer)
        .turn_time_limit(Duration::from_millis(20))
        .max_turns(2)
        .on_turn_change(move |p| turn_log.lock().unwrap().push(p.id.clone()))
        .on_game_over(|_| {})
        .build()
        .unwrap();
    engine.start_game().unwrap();

    while !engine.is_game_over() {
        let token = tokio::time::timeout(Duration::from_secs(2), timeouts.recv())
            .await
            .expect("timer should fire")
            .expect("channel open");
        engine.handle_timeout(token);
    }

    assert_eq!(engine.turn_count(), 2);
    assert_eq!(*turns.lock().unwrap(), vec!["a", "b"]);
}
