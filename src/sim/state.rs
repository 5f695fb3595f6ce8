//! Game state and core simulation types
//!
//! Everything the active run owns lives in [`Session`]. Level geometry is
//! copied in from the catalog at level start and never shared.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::{EventQueue, Hud, SoundKind};
use super::level::LevelLayout;
use crate::consts::*;
use crate::tuning::Tuning;

/// Screen-level phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen
    Menu,
    /// Choosing a level
    LevelSelect,
    /// Active gameplay
    Playing,
    /// Gameplay suspended; no ticks and no countdown
    Paused,
    /// Flag reached
    Win,
    /// Out of lives or out of time
    GameOver,
}

/// Axis-aligned rectangle, y grows downward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Strict overlap test (touching edges do not count)
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.right() > other.x
            && self.x < other.right()
            && self.bottom() > other.y
            && self.y < other.bottom()
    }
}

/// Which way the player sprite faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    /// Velocity (px/s)
    pub vel: Vec2,
    pub size: Vec2,
    pub facing: Facing,
    /// Resting on a platform as of the last collision pass
    pub grounded: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(SPAWN_X, SPAWN_Y),
            vel: Vec2::ZERO,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            facing: Facing::Right,
            grounded: false,
        }
    }
}

impl Player {
    /// Put the player back at the spawn point at rest
    pub fn respawn(&mut self) {
        self.pos = Vec2::new(SPAWN_X, SPAWN_Y);
        self.vel = Vec2::ZERO;
        self.grounded = false;
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

/// Static level geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
    /// 0xRRGGBB
    pub color: u32,
}

/// A collectible coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub pos: Vec2,
    /// Only ever goes false -> true
    pub collected: bool,
}

impl Coin {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            collected: false,
        }
    }
}

/// A patrolling hazard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub rect: Rect,
    /// Patrol speed magnitude (px/s)
    pub speed: f32,
    /// +1.0 moving right, -1.0 moving left
    pub direction: f32,
    pub patrol_start: f32,
    pub patrol_end: f32,
    /// Stomped enemies stay defeated for the rest of the level
    pub defeated: bool,
}

impl Enemy {
    pub fn new(x: f32, y: f32, speed: f32, patrol_start: f32, patrol_end: f32) -> Self {
        Self {
            rect: Rect::new(x, y, 30.0, 30.0),
            speed,
            direction: 1.0,
            patrol_start,
            patrol_end,
            defeated: false,
        }
    }

    /// Advance one patrol step, turning back toward the interval once a
    /// bound is reached or passed
    pub fn patrol(&mut self, dt: f32) {
        self.rect.x += self.speed * self.direction * dt;
        if self.rect.x <= self.patrol_start {
            self.direction = 1.0;
        } else if self.rect.x >= self.patrol_end {
            self.direction = -1.0;
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        !self.defeated
    }
}

/// Goal marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    pub rect: Rect,
}

impl Flag {
    /// Whether the player is close enough to claim the flag.
    ///
    /// The flag's collision center sits below its anchor (the pole top), so
    /// the vertical test is offset.
    pub fn reached_by(&self, player: &Player) -> bool {
        let center = player.center();
        (center.x - self.rect.x).abs() < FLAG_REACH_X
            && (center.y - self.rect.y - FLAG_CENTER_OFFSET_Y).abs() < FLAG_REACH_Y
    }
}

/// Horizontal scroll offset
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub offset_x: f32,
}

impl Camera {
    /// Recompute the offset from the player position, clamped to the level
    pub fn follow(&mut self, player_x: f32, level_width: f32, tuning: &Tuning) {
        let target = player_x - tuning.viewport_width * tuning.camera_lead;
        let max = (level_width - tuning.viewport_width).max(0.0);
        self.offset_x = target.clamp(0.0, max);
    }
}

/// Result of losing a life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeLoss {
    /// Lives remain; the player is back at spawn
    Respawned,
    /// No lives left
    Exhausted,
}

/// One run of one level: the single owner of all mutable gameplay state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// 1-based level index
    pub level: u32,
    pub score: u64,
    pub coins_collected: u32,
    pub lives: u8,
    /// Whole seconds left on the countdown
    pub time_left: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: Player,
    pub platforms: Vec<Platform>,
    pub coins: Vec<Coin>,
    pub enemies: Vec<Enemy>,
    pub flag: Flag,
    /// Width of the ground platform; the scrollable extent
    pub level_width: f32,
    pub camera: Camera,
}

impl Session {
    /// Fresh run for a generated level
    pub fn new(layout: LevelLayout) -> Self {
        Self {
            level: layout.index,
            score: 0,
            coins_collected: 0,
            lives: START_LIVES,
            time_left: time_limit_for_level(layout.index),
            time_ticks: 0,
            player: Player::default(),
            platforms: layout.platforms,
            coins: layout.coins,
            enemies: layout.enemies,
            flag: layout.flag,
            level_width: layout.level_width,
            camera: Camera::default(),
        }
    }

    pub fn total_coins(&self) -> u32 {
        self.coins.len() as u32
    }

    /// Lose one life, respawning if any remain.
    ///
    /// Emits the game-over sound and, on respawn, a toast prefixed with
    /// `reason`.
    pub fn lose_life(&mut self, reason: &str, events: &mut EventQueue) -> LifeLoss {
        events.sound(SoundKind::GameOver);
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            log::info!("Level {}: out of lives", self.level);
            return LifeLoss::Exhausted;
        }
        self.player.respawn();
        events.toast(format!("{reason} Lives left: {}", self.lives));
        LifeLoss::Respawned
    }

    /// Count down one second, saturating at zero. Returns true once time is up.
    pub fn countdown(&mut self) -> bool {
        self.time_left = self.time_left.saturating_sub(1);
        self.time_left == 0
    }

    pub fn hud(&self) -> Hud {
        Hud {
            score: self.score,
            coins_collected: self.coins_collected,
            total_coins: self.total_coins(),
            lives: self.lives,
            level: self.level,
            time_left: self.time_left,
        }
    }
}

/// The parts of a [`Session`] a tick can change. Level geometry stays out.
#[derive(Debug, Clone)]
pub struct Snapshot {
    score: u64,
    coins_collected: u32,
    lives: u8,
    time_left: u32,
    time_ticks: u64,
    player: Player,
    coins: Vec<Coin>,
    enemies: Vec<Enemy>,
    camera: Camera,
}

impl Session {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            score: self.score,
            coins_collected: self.coins_collected,
            lives: self.lives,
            time_left: self.time_left,
            time_ticks: self.time_ticks,
            player: self.player.clone(),
            coins: self.coins.clone(),
            enemies: self.enemies.clone(),
            camera: self.camera,
        }
    }

    /// Put back everything captured by [`Session::snapshot`]
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.score = snapshot.score;
        self.coins_collected = snapshot.coins_collected;
        self.lives = snapshot.lives;
        self.time_left = snapshot.time_left;
        self.time_ticks = snapshot.time_ticks;
        self.player = snapshot.player;
        self.coins = snapshot.coins;
        self.enemies = snapshot.enemies;
        self.camera = snapshot.camera;
    }
}

/// Countdown length for a level
pub fn time_limit_for_level(level: u32) -> u32 {
    BASE_TIME_SECS + level * TIME_PER_LEVEL_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_overlap_is_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        // Touching edges
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(0.0, 10.0, 10.0, 10.0)));
    }

    #[test]
    fn test_enemy_turns_at_bounds() {
        let mut enemy = Enemy::new(95.0, 530.0, 10.0, 0.0, 100.0);
        enemy.patrol(1.0);
        assert_eq!(enemy.rect.x, 105.0);
        assert_eq!(enemy.direction, -1.0);
        enemy.patrol(1.0);
        assert_eq!(enemy.rect.x, 95.0);
        assert_eq!(enemy.direction, -1.0);
    }

    #[test]
    fn test_camera_clamps_to_level() {
        let tuning = Tuning::default();
        let mut camera = Camera::default();

        camera.follow(50.0, 2400.0, &tuning);
        assert_eq!(camera.offset_x, 0.0);

        camera.follow(2390.0, 2400.0, &tuning);
        assert_eq!(camera.offset_x, 1600.0);

        // Level narrower than the viewport never scrolls
        camera.follow(500.0, 600.0, &tuning);
        assert_eq!(camera.offset_x, 0.0);
    }

    #[test]
    fn test_restore_undoes_tick_state() {
        let layout = crate::sim::level::LevelCatalog::default()
            .generate(2)
            .unwrap();
        let mut session = Session::new(layout);
        let platforms = session.platforms.clone();
        let snapshot = session.snapshot();

        session.score += 500;
        session.coins_collected += 1;
        session.coins[0].collected = true;
        session.enemies[0].defeated = true;
        session.lives -= 1;
        session.time_ticks += 7;
        session.player.pos = Vec2::new(f32::NAN, 0.0);
        session.camera.offset_x = 300.0;

        session.restore(snapshot);
        assert_eq!(session.score, 0);
        assert_eq!(session.coins_collected, 0);
        assert!(!session.coins[0].collected);
        assert!(!session.enemies[0].defeated);
        assert_eq!(session.lives, START_LIVES);
        assert_eq!(session.time_ticks, 0);
        assert_eq!(session.player.pos, Vec2::new(SPAWN_X, SPAWN_Y));
        assert_eq!(session.camera.offset_x, 0.0);
        assert_eq!(session.platforms, platforms);
    }

    #[test]
    fn test_time_limit_grows_with_level() {
        assert_eq!(time_limit_for_level(1), 210);
        assert_eq!(time_limit_for_level(5), 330);
    }

    #[test]
    fn test_flag_reach_uses_offset_center() {
        let flag = Flag {
            rect: Rect::new(500.0, 300.0, 30.0, 60.0),
        };
        let mut player = Player::default();
        // Player center at (500, 330): exactly on the collision center
        player.pos = Vec2::new(475.0, 295.0);
        assert!(flag.reached_by(&player));

        player.pos.x += FLAG_REACH_X;
        assert!(!flag.reached_by(&player));
    }
}
