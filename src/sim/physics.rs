//! Player kinematics for one tick

use super::events::{EventQueue, SoundKind};
use super::state::{Facing, Player};
use super::tick::TickInput;
use crate::tuning::Tuning;

/// Advance the player by one step of `dt` seconds.
///
/// Horizontal velocity is set directly from intent: left wins when both
/// directions are held. A jump starts only from the ground and queues
/// exactly one jump sound. Gravity always applies, then position is
/// integrated and clamped to the level's horizontal extent.
///
/// Returns true if the player dropped below the viewport.
pub fn advance(
    player: &mut Player,
    input: &TickInput,
    level_width: f32,
    tuning: &Tuning,
    dt: f32,
    events: &mut EventQueue,
) -> bool {
    if input.left {
        player.vel.x = -tuning.move_speed;
        player.facing = Facing::Left;
    } else if input.right {
        player.vel.x = tuning.move_speed;
        player.facing = Facing::Right;
    } else {
        player.vel.x = 0.0;
    }

    if input.jump && player.grounded {
        player.vel.y = tuning.jump_velocity;
        player.grounded = false;
        events.sound(SoundKind::Jump);
    }

    player.vel.y += tuning.gravity * dt;
    player.pos += player.vel * dt;

    let max_x = (level_width - player.size.x).max(0.0);
    player.pos.x = player.pos.x.clamp(0.0, max_x);

    player.pos.y > tuning.viewport_height
}
