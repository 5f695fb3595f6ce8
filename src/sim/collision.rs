//! Collision detection and response
//!
//! Resolvers run in a fixed order each tick: platforms, coins, enemies, flag.
//! Platform landing is a band test rather than a swept test: a falling
//! player whose feet sit within `landing_band` below a platform's top snaps
//! onto it. That is enough to stop tunneling at the speeds the tuning allows,
//! but it is not continuous collision detection.

use super::events::{EventQueue, SoundKind};
use super::state::{LifeLoss, Platform, Player, Session};
use crate::consts::*;
use crate::tuning::Tuning;

/// Outcome of the enemy pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyOutcome {
    /// Play continues (stomps and survivable hits included)
    Continue,
    /// The player lost their last life
    GameOver,
}

/// Land the player on any platform beneath their feet.
///
/// Grounded is recomputed from scratch: a player over nothing is never
/// grounded after this pass.
pub fn land_on_platforms(player: &mut Player, platforms: &[Platform], landing_band: f32) -> bool {
    player.grounded = false;
    for platform in platforms {
        let top = platform.rect.y;
        let bottom = player.bottom();
        if player.pos.x + player.size.x > platform.rect.x
            && player.pos.x < platform.rect.right()
            && bottom >= top
            && bottom < top + landing_band
            && player.vel.y >= 0.0
        {
            player.pos.y = top - player.size.y;
            player.vel.y = 0.0;
            player.grounded = true;
        }
    }
    player.grounded
}

/// Collect every uncollected coin within reach of the player's center.
/// Returns the number collected this pass.
pub fn collect_coins(session: &mut Session, events: &mut EventQueue) -> u32 {
    let center = session.player.center();
    let mut collected = 0;
    for coin in session.coins.iter_mut().filter(|c| !c.collected) {
        if (center.x - coin.pos.x).abs() < COIN_RADIUS && (center.y - coin.pos.y).abs() < COIN_RADIUS {
            coin.collected = true;
            collected += 1;
            events.sound(SoundKind::Coin);
            events.toast(format!("+{COIN_SCORE} points!"));
        }
    }
    session.coins_collected += collected;
    session.score += u64::from(collected) * COIN_SCORE;
    collected
}

/// Move each live enemy along its patrol, then resolve contact with the
/// player as either a stomp or a hit.
pub fn resolve_enemies(
    session: &mut Session,
    tuning: &Tuning,
    dt: f32,
    events: &mut EventQueue,
) -> EnemyOutcome {
    for i in 0..session.enemies.len() {
        let enemy = &mut session.enemies[i];
        if !enemy.is_active() {
            continue;
        }
        enemy.patrol(dt);
        let enemy_rect = enemy.rect;

        let player = &mut session.player;
        if !player.rect().overlaps(&enemy_rect) {
            continue;
        }

        let falling = player.vel.y > 0.0;
        let above_mid = player.bottom() - STOMP_TOLERANCE < enemy_rect.center().y;
        if falling && above_mid {
            session.enemies[i].defeated = true;
            player.vel.y = tuning.stomp_bounce;
            session.score += STOMP_SCORE;
            events.sound(SoundKind::Coin);
            events.toast(format!("Enemy defeated! +{STOMP_SCORE}"));
            log::debug!("Level {}: enemy {} stomped", session.level, i);
        } else if session.lose_life("Hit!", events) == LifeLoss::Exhausted {
            return EnemyOutcome::GameOver;
        }
    }
    EnemyOutcome::Continue
}
