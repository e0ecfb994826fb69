//! Cross-instance determinism: independent games fed the same inputs must
//! agree on every frame's checksum.

use std::collections::BTreeMap;

use lockstep_core::game::FrameInputs;
use lockstep_core::{replay, DeterministicGame, GameConfig, PlayerId, PlayerInput};

fn roster(n: u8) -> Vec<PlayerId> {
    (0..n).map(|i| PlayerId::new([0x10 + i; 16])).collect()
}

fn inputs_for(frame: u32, players: &[PlayerId]) -> FrameInputs {
    players
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let turn = ((frame as i32 * 13 + i as i32 * 41) % 255 - 127) as i8;
            let thrust = ((frame as i32 * 7 + i as i32 * 29) % 255 - 127) as i8;
            let mut input = PlayerInput::with_axes(turn, thrust);
            if (frame + i as u32) % 37 == 0 {
                input = input.dashing();
            }
            if (frame / 25) % 4 == i as u32 % 4 {
                input = input.braking();
            }
            (*id, input)
        })
        .collect()
}

fn run(seed: u64, players: &[PlayerId], frames: u32) -> Vec<u64> {
    let mut game = DeterministicGame::new(seed);
    game.initialize(players);
    (0..frames)
        .map(|f| game.update(&inputs_for(f, players)).unwrap())
        .collect()
}

#[test]
fn test_independent_games_agree() {
    let players = roster(4);
    let a = run(42, &players, 600);
    let b = run(42, &players, 600);
    assert_eq!(a, b, "two games with the same seed and inputs diverged");
}

#[test]
fn test_roster_order_does_not_matter() {
    let players = roster(4);
    let mut shuffled = players.clone();
    shuffled.reverse();
    shuffled.swap(0, 2);

    let mut a = DeterministicGame::new(9);
    a.initialize(&players);
    let mut b = DeterministicGame::new(9);
    b.initialize(&shuffled);

    assert_eq!(a.checksum(), b.checksum());
    for frame in 0..120 {
        let inputs = inputs_for(frame, &players);
        assert_eq!(a.update(&inputs).unwrap(), b.update(&inputs).unwrap());
    }
}

#[test]
fn test_different_seeds_diverge() {
    let players = roster(3);
    let a = run(1, &players, 60);
    let b = run(2, &players, 60);
    assert_ne!(a.last(), b.last());
}

#[test]
fn test_input_change_changes_checksum() {
    let players = roster(2);
    let mut a = DeterministicGame::new(5);
    a.initialize(&players);
    let mut b = a.clone();

    let mut inputs = inputs_for(0, &players);
    let ca = a.update(&inputs).unwrap();
    inputs.insert(players[1], PlayerInput::with_axes(90, -90));
    let cb = b.update(&inputs).unwrap();
    assert_ne!(ca, cb);
}

#[test]
fn test_empty_inputs_equal_idle_inputs() {
    let players = roster(3);
    let mut a = DeterministicGame::new(77);
    a.initialize(&players);
    let mut b = a.clone();

    let idle: FrameInputs = players.iter().map(|id| (*id, PlayerInput::idle())).collect();
    for _ in 0..30 {
        assert_eq!(a.update(&BTreeMap::new()).unwrap(), b.update(&idle).unwrap());
    }
}

#[test]
fn test_replay_matches_live_log() {
    let players = roster(4);
    let live = run(1234, &players, 300);
    let frames: Vec<FrameInputs> = (0..300).map(|f| inputs_for(f, &players)).collect();
    let replayed = replay(1234, GameConfig::default(), &players, &frames).unwrap();
    assert_eq!(live, replayed);
}

#[test]
fn test_parallel_runs_agree() {
    let players = roster(4);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let players = players.clone();
            std::thread::spawn(move || run(31337, &players, 240))
        })
        .collect();
    let results: Vec<Vec<u64>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for result in &results[1..] {
        assert_eq!(result, &results[0], "parallel run diverged");
    }
}
