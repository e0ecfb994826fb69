//! Save/load, rollback and snapshot ownership across the public API.

use std::collections::BTreeMap;

use lockstep_core::game::FrameInputs;
use lockstep_core::{
    DeterministicGame, GameConfig, PlayerId, PlayerInput, RollbackSession, SimError, StateSnapshot,
};

fn roster(n: u8) -> Vec<PlayerId> {
    (0..n).map(|i| PlayerId::new([i + 1; 16])).collect()
}

fn started(seed: u64, players: &[PlayerId]) -> DeterministicGame {
    let mut game = DeterministicGame::new(seed);
    game.initialize(players);
    game
}

fn steer(players: &[PlayerId], frame: u32) -> FrameInputs {
    players
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let turn = (((frame * 5 + i as u32 * 17) % 200) as i32 - 100) as i8;
            (*id, PlayerInput::with_axes(turn, 110))
        })
        .collect()
}

#[test]
fn test_rollback_scenario_seed_42() {
    let players = roster(3);
    let mut game = started(42, &players);
    let empty = BTreeMap::new();

    for _ in 0..10 {
        game.update(&empty).unwrap();
    }
    let snapshot = game.save_state();
    for _ in 0..5 {
        game.update(&empty).unwrap();
    }
    let before_load = game.frame();

    game.load_state(&snapshot).unwrap();
    assert_eq!(game.frame(), snapshot.frame());
    assert_eq!(game.frame(), 10);
    assert!(game.frame() < before_load);
    assert_eq!(game.checksum(), snapshot.checksum());
}

#[test]
fn test_resimulation_matches_first_run() {
    let players = roster(4);
    let mut game = started(42, &players);
    for f in 0..20 {
        game.update(&steer(&players, f)).unwrap();
    }
    let snapshot = game.save_state();

    let first_run: Vec<u64> = (20..80)
        .map(|f| game.update(&steer(&players, f)).unwrap())
        .collect();
    let first_view = game.get_state();

    game.load_state(&snapshot).unwrap();
    let resimulated: Vec<u64> = (20..80)
        .map(|f| game.update(&steer(&players, f)).unwrap())
        .collect();

    assert_eq!(first_run, resimulated);
    assert_eq!(first_view, game.get_state());
}

#[test]
fn test_snapshot_unaffected_by_later_updates() {
    let players = roster(2);
    let mut game = started(3, &players);
    game.update(&steer(&players, 0)).unwrap();

    let snapshot = game.save_state();
    let copy = snapshot.clone();
    for f in 1..30 {
        game.update(&steer(&players, f)).unwrap();
    }

    assert_eq!(snapshot, copy);
    assert_eq!(snapshot.frame(), 1);
    assert_eq!(snapshot.validate(), Ok(()));
}

#[test]
fn test_loaded_games_do_not_share_state() {
    let players = roster(2);
    let mut source = started(3, &players);
    for f in 0..10 {
        source.update(&steer(&players, f)).unwrap();
    }
    let snapshot = source.save_state();

    let mut a = DeterministicGame::new(3);
    a.load_state(&snapshot).unwrap();
    let mut b = DeterministicGame::new(3);
    b.load_state(&snapshot).unwrap();
    drop(snapshot);

    for f in 10..40 {
        a.update(&steer(&players, f)).unwrap();
    }
    assert_eq!(b.frame(), 10);
    assert_eq!(b.checksum(), source.checksum());
    assert_eq!(b.get_state(), source.get_state());
}

#[test]
fn test_view_mutation_does_not_reach_game() {
    let players = roster(2);
    let game = started(3, &players);
    let checksum = game.checksum();

    let mut view = game.get_state();
    view.players[0].position.x += 1 << 20;
    view.frame = 999;

    assert_eq!(game.checksum(), checksum);
    assert_eq!(game.frame(), 0);
    assert_ne!(game.get_state(), view);
}

#[test]
fn test_snapshot_transport_bincode_and_json() {
    let players = roster(3);
    let mut game = started(11, &players);
    for f in 0..25 {
        game.update(&steer(&players, f)).unwrap();
    }
    let snapshot = game.save_state();

    let from_bytes = StateSnapshot::from_bytes(&snapshot.to_bytes().unwrap()).unwrap();
    let from_json = StateSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
    assert_eq!(from_bytes, snapshot);
    assert_eq!(from_json, snapshot);

    // A peer that never ran the match adopts the decoded state.
    let mut peer = DeterministicGame::new(11);
    peer.load_state(&from_bytes).unwrap();
    for f in 25..50 {
        assert_eq!(
            peer.update(&steer(&players, f)).unwrap(),
            game.update(&steer(&players, f)).unwrap()
        );
    }
}

#[test]
fn test_corrupt_bytes_rejected() {
    let players = roster(2);
    let game = started(11, &players);
    let mut bytes = game.save_state().to_bytes().unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;

    let err = StateSnapshot::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, SimError::InvalidSnapshot(_)));
}

#[test]
fn test_foreign_seed_rejected() {
    let players = roster(2);
    let other = started(1, &players);
    let mut game = started(2, &players);
    let checksum = game.checksum();

    let err = game.load_state(&other.save_state()).unwrap_err();
    assert!(matches!(err, SimError::InvalidSnapshot(_)));
    assert_eq!(game.checksum(), checksum, "failed load must leave the game untouched");
}

#[test]
fn test_session_tracks_confirmed_run() {
    let players = roster(3);
    let late = players[2];
    let real = |frame: u32| PlayerInput::with_axes(-60, (frame % 120) as i8).braking();

    let mut confirmed = started(8, &players);
    let mut session = RollbackSession::new(started(8, &players), 6);

    for frame in 0..90 {
        let mut inputs = steer(&players, frame);
        session.advance(inputs.clone()).unwrap();
        inputs.insert(late, real(frame));
        confirmed.update(&inputs).unwrap();

        if let Some(late_frame) = frame.checked_sub(3) {
            let resimulated = session.correct_input(late_frame, late, real(late_frame)).unwrap();
            assert_eq!(resimulated, frame + 1 - late_frame);
        }
    }
    for f in 87..90 {
        session.correct_input(f, late, real(f)).unwrap();
    }

    assert_eq!(session.game().frame(), confirmed.frame());
    assert_eq!(session.game().checksum(), confirmed.checksum());
}

#[test]
fn test_session_window_exceeded() {
    let players = roster(2);
    let mut session = RollbackSession::new(started(8, &players), 4);
    for f in 0..12 {
        session.advance(steer(&players, f)).unwrap();
    }

    let err = session.correct_input(3, players[0], PlayerInput::idle()).unwrap_err();
    assert_eq!(err, SimError::RollbackUnavailable(3));
}

#[test]
fn test_custom_config_round_trip_through_session() {
    let config = GameConfig {
        turbulence: 0,
        dash_cooldown_frames: 10,
        ..GameConfig::default()
    };
    let players = roster(2);

    let mut game = DeterministicGame::with_config(5, config.clone()).unwrap();
    game.initialize(&players);
    let mut session = RollbackSession::new(game, 8);
    for f in 0..20 {
        session.advance(steer(&players, f)).unwrap();
    }
    assert_eq!(session.game().config(), &config);
    assert_eq!(session.into_game().frame(), 20);
}
