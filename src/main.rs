//! Lockstep Core Demo
//!
//! Runs a scripted match, rolls it back mid-way and checks that
//! resimulation and a from-scratch replay land on the same checksums.
//!
//! Usage: `lockstep-core [config.json] [seed]`

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lockstep_core::{
    core::rng::derive_match_seed,
    game::{first_divergence, rollback::DEFAULT_ROLLBACK_WINDOW, FrameInputs},
    replay, Checksum, DeterministicGame, GameConfig, PlayerId, PlayerInput, RollbackSession,
    StateSnapshot, FRAME_RATE, VERSION,
};

/// Frames to run in the demo (10 seconds)
const DEMO_FRAMES: u32 = 600;

/// Frame the demo saves at before rolling back
const SAVE_FRAME: u32 = 300;

/// How far behind the late player's inputs arrive
const LATE_FRAMES: u32 = 4;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Lockstep Core v{}", VERSION);
    info!("Frame Rate: {} Hz", FRAME_RATE);

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => GameConfig::from_json_file(&path)
            .with_context(|| format!("loading config from {}", path))?,
        None => GameConfig::default(),
    };

    let player_ids: Vec<PlayerId> = (0..4u8).map(|i| PlayerId::new([i + 1; 16])).collect();
    let match_id = [7u8; 16];

    let seed = match args.next() {
        Some(arg) => arg.parse::<u64>().with_context(|| format!("invalid seed {:?}", arg))?,
        None => {
            let raw: Vec<[u8; 16]> = player_ids.iter().map(|id| id.0).collect();
            derive_match_seed(&match_id, &raw)
        }
    };

    info!("Match ID: {}", hex::encode(match_id));
    info!("Seed: {}", seed);

    let log = demo_save_load(seed, &config, &player_ids)?;
    demo_session(seed, &config, &player_ids)?;
    demo_replay(seed, &config, &player_ids, &log)?;

    info!("All determinism checks passed");
    Ok(())
}

/// Scripted joystick input for a player at a frame.
fn scripted_inputs(frame: u32, players: &[PlayerId]) -> FrameInputs {
    players
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let phase = (frame as i32 * (i as i32 + 1) * 7) % 254;
            let turn = (phase - 127) as i8;
            let thrust = if (frame / 90 + i as u32) % 3 == 0 { 0 } else { 100 };
            let mut input = PlayerInput::with_axes(turn, thrust);
            if frame % 120 == 30 * i as u32 {
                input = input.dashing();
            }
            if frame % 200 > 180 {
                input = input.braking();
            }
            (*id, input)
        })
        .collect::<BTreeMap<_, _>>()
}

/// Run forward, save, keep running, load, resimulate, compare.
fn demo_save_load(seed: u64, config: &GameConfig, players: &[PlayerId]) -> Result<Vec<Checksum>> {
    info!("=== Save / Load ===");

    let mut game = DeterministicGame::with_config(seed, config.clone())?;
    game.initialize(players);

    for id in players {
        if let Some(entity) = game.get_state().player(id) {
            let (x, y) = entity.position.to_floats();
            info!("Spawned player {} at ({:.2}, {:.2})", id.short(), x, y);
        }
    }

    let mut log = Vec::with_capacity(DEMO_FRAMES as usize);
    for frame in 0..SAVE_FRAME {
        log.push(game.update(&scripted_inputs(frame, players))?);
    }

    let snapshot = game.save_state();
    let bytes = snapshot.to_bytes()?;
    info!(
        "Saved frame {} ({} bytes, checksum {:016x})",
        snapshot.frame(),
        bytes.len(),
        snapshot.checksum()
    );

    for frame in SAVE_FRAME..DEMO_FRAMES {
        log.push(game.update(&scripted_inputs(frame, players))?);
    }
    let live_final = game.checksum();

    game.load_state(&StateSnapshot::from_bytes(&bytes)?)?;
    info!("Rolled back to frame {}", game.frame());

    for frame in SAVE_FRAME..DEMO_FRAMES {
        let checksum = game.update(&scripted_inputs(frame, players))?;
        if checksum != log[frame as usize] {
            bail!("resimulation diverged at frame {}", frame);
        }
    }

    info!("Final checksum: {:016x}", live_final);
    if game.checksum() != live_final {
        bail!("resimulated final checksum {:016x} != {:016x}", game.checksum(), live_final);
    }
    info!("DETERMINISM VERIFIED: resimulation matches");

    for entity in &game.get_state().players {
        let (x, y) = entity.position.to_floats();
        let (vx, vy) = entity.velocity.to_floats();
        info!(
            "Player {}: pos ({:.2}, {:.2}) vel ({:.2}, {:.2})",
            entity.player_id.short(),
            x,
            y,
            vx,
            vy
        );
    }

    Ok(log)
}

/// Drive a rollback session with one late input per second.
fn demo_session(seed: u64, config: &GameConfig, players: &[PlayerId]) -> Result<()> {
    info!("=== Rollback Session ===");

    let late_player = players[players.len() - 1];
    let late_input = |frame: u32| PlayerInput::with_axes(-((frame % 100) as i8), 127);

    let mut confirmed = DeterministicGame::with_config(seed, config.clone())?;
    confirmed.initialize(players);

    let mut predicted = DeterministicGame::with_config(seed, config.clone())?;
    predicted.initialize(players);
    let mut session = RollbackSession::new(predicted, DEFAULT_ROLLBACK_WINDOW);

    let mut resimulated = 0u32;
    for frame in 0..DEMO_FRAMES {
        let mut inputs = scripted_inputs(frame, players);
        session.advance(inputs.clone())?;

        inputs.insert(late_player, late_input(frame));
        confirmed.update(&inputs)?;

        // The late player's real input arrives four frames behind.
        if let Some(late_frame) = frame.checked_sub(LATE_FRAMES) {
            resimulated += session.correct_input(late_frame, late_player, late_input(late_frame))?;
        }
    }

    // Flush the inputs still in flight.
    let end = session.game().frame();
    for f in end.saturating_sub(LATE_FRAMES)..end {
        resimulated += session.correct_input(f, late_player, late_input(f))?;
    }

    info!("Resimulated {} frames in total", resimulated);
    if session.game().checksum() != confirmed.checksum() {
        warn!(
            "session {:016x} != confirmed {:016x}",
            session.game().checksum(),
            confirmed.checksum()
        );
        bail!("rollback session diverged from the confirmed run");
    }
    info!("DETERMINISM VERIFIED: session matches confirmed run");
    Ok(())
}

/// Replay the save/load demo's inputs from scratch.
fn demo_replay(seed: u64, config: &GameConfig, players: &[PlayerId], log: &[Checksum]) -> Result<()> {
    info!("=== Replay ===");

    let frames: Vec<FrameInputs> = (0..DEMO_FRAMES).map(|f| scripted_inputs(f, players)).collect();
    let replayed = replay(seed, config.clone(), players, &frames)?;

    if let Some(frame) = first_divergence(log, &replayed) {
        bail!("replay diverged at frame {}", frame);
    }
    info!("DETERMINISM VERIFIED: replay matches {} frames", replayed.len());
    Ok(())
}
