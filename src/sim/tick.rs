//! Fixed timestep simulation tick
//!
//! One tick = physics, then collision passes in fixed order, then camera.

use serde::{Deserialize, Serialize};

use super::collision::{EnemyOutcome, collect_coins, land_on_platforms, resolve_enemies};
use super::events::EventQueue;
use super::physics;
use super::state::{LifeLoss, Session};
use crate::consts::WIN_SCORE;
use crate::error::GameError;
use crate::tuning::Tuning;

/// Input intent snapshot for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// How a tick ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep playing
    Continue,
    /// Flag reached; win bonus already added
    LevelComplete,
    /// Lives exhausted
    GameOver,
}

/// Advance the session by one fixed timestep.
///
/// A fall below the viewport is resolved instead of any collision pass.
/// Whatever the outcome, the camera follows and the kinematics are checked
/// before returning. An error means the tick left the session in an unusable
/// state and the caller must discard it.
pub fn tick(
    session: &mut Session,
    input: &TickInput,
    tuning: &Tuning,
    dt: f32,
    events: &mut EventQueue,
) -> Result<TickOutcome, GameError> {
    session.time_ticks += 1;

    let fell = physics::advance(
        &mut session.player,
        input,
        session.level_width,
        tuning,
        dt,
        events,
    );
    let outcome = if fell {
        match session.lose_life("Oops!", events) {
            LifeLoss::Respawned => TickOutcome::Continue,
            LifeLoss::Exhausted => TickOutcome::GameOver,
        }
    } else {
        resolve_collisions(session, tuning, dt, events)
    };

    follow_camera(session, tuning);
    check_finite(session)?;
    Ok(outcome)
}

/// Collision passes in order; game over or the flag ends the pass early
fn resolve_collisions(
    session: &mut Session,
    tuning: &Tuning,
    dt: f32,
    events: &mut EventQueue,
) -> TickOutcome {
    land_on_platforms(&mut session.player, &session.platforms, tuning.landing_band);
    collect_coins(session, events);

    if resolve_enemies(session, tuning, dt, events) == EnemyOutcome::GameOver {
        return TickOutcome::GameOver;
    }

    if session.flag.reached_by(&session.player) {
        session.score += WIN_SCORE;
        log::info!(
            "Level {} complete at tick {} with score {}",
            session.level,
            session.time_ticks,
            session.score
        );
        return TickOutcome::LevelComplete;
    }

    TickOutcome::Continue
}

fn follow_camera(session: &mut Session, tuning: &Tuning) {
    session
        .camera
        .follow(session.player.pos.x, session.level_width, tuning);
}

/// Non-finite kinematics would poison every later tick
fn check_finite(session: &Session) -> Result<(), GameError> {
    let player = &session.player;
    if !player.pos.is_finite() || !player.vel.is_finite() {
        return Err(GameError::CorruptState(format!(
            "player kinematics not finite at tick {}: pos={:?} vel={:?}",
            session.time_ticks, player.pos, player.vel
        )));
    }
    Ok(())
}
