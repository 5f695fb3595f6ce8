//! Level catalog: static geometry for each authored level
//!
//! Generation is a pure function of the level index, the catalog seed, and
//! the enemy speed multiplier. Only the enemy speed jitter on the last two
//! levels consumes randomness, and it is drawn from a seeded PCG stream.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::{Coin, Enemy, Flag, Platform, Rect};
use crate::consts::{DEFAULT_LEVEL_SEED, LEVEL_COUNT};
use crate::error::GameError;

/// Authored speeds are in px/frame at this rate
const AUTHORED_FPS: f32 = 60.0;

const GROUND_Y: f32 = 550.0;
const GROUND_HEIGHT: f32 = 50.0;
const LEDGE_HEIGHT: f32 = 20.0;
const ENEMY_Y: f32 = 530.0;

const GROUND_COLOR: u32 = 0x8B4513;
const LEDGE_COLOR: u32 = 0x228B22;

const LEVEL_NAMES: [&str; LEVEL_COUNT as usize] =
    ["Tutorial", "Rising Up", "The Climb", "Extreme", "Master"];

/// Display name of a level
pub fn level_name(level: u32) -> &'static str {
    level
        .checked_sub(1)
        .and_then(|i| LEVEL_NAMES.get(i as usize))
        .copied()
        .unwrap_or("Unknown")
}

/// Generated geometry for one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub index: u32,
    pub platforms: Vec<Platform>,
    pub coins: Vec<Coin>,
    pub enemies: Vec<Enemy>,
    pub flag: Flag,
    /// Width of the ground platform
    pub level_width: f32,
}

/// Source of level geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelCatalog {
    /// Seed for enemy speed jitter
    pub seed: u64,
    /// Difficulty multiplier on enemy speeds (levels 2+)
    pub enemy_speed_multiplier: f32,
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self {
            seed: DEFAULT_LEVEL_SEED,
            enemy_speed_multiplier: 1.3,
        }
    }
}

impl LevelCatalog {
    pub fn new(seed: u64, enemy_speed_multiplier: f32) -> Self {
        Self {
            seed,
            enemy_speed_multiplier,
        }
    }

    /// Build the geometry for `level` (1-based)
    pub fn generate(&self, level: u32) -> Result<LevelLayout, GameError> {
        let level = GameError::check_level(level)?;
        // Separate stream per level so jitter does not depend on play order
        let mut rng = Pcg32::seed_from_u64(self.seed ^ u64::from(level).wrapping_mul(0x9E37_79B9));
        let mut b = Builder::new(level, self.enemy_speed_multiplier);

        match level {
            1 => b.tutorial(),
            2 => b.rising_up(),
            3 => b.the_climb(),
            4 => b.extreme(&mut rng),
            _ => b.master(&mut rng),
        }

        Ok(b.finish())
    }
}

/// Accumulates geometry while a level is laid out
struct Builder {
    index: u32,
    speed_mult: f32,
    level_width: f32,
    platforms: Vec<Platform>,
    coins: Vec<Coin>,
    enemies: Vec<Enemy>,
    flag: Option<Flag>,
}

impl Builder {
    fn new(index: u32, speed_mult: f32) -> Self {
        Self {
            index,
            speed_mult,
            level_width: 0.0,
            platforms: Vec::new(),
            coins: Vec::new(),
            enemies: Vec::new(),
            flag: None,
        }
    }

    fn ground(&mut self, width: f32) {
        self.level_width = width;
        self.platforms.push(Platform {
            rect: Rect::new(0.0, GROUND_Y, width, GROUND_HEIGHT),
            color: GROUND_COLOR,
        });
    }

    fn ledge(&mut self, x: f32, y: f32, width: f32) {
        self.platforms.push(Platform {
            rect: Rect::new(x, y, width, LEDGE_HEIGHT),
            color: LEDGE_COLOR,
        });
    }

    /// Coin row: `count` coins spaced `step` apart, y stepping up by `rise`
    /// and wrapping every `period`
    fn coin_row(&mut self, count: u32, x0: f32, step: f32, y0: f32, rise: f32, period: u32) {
        for i in 0..count {
            let x = x0 + i as f32 * step;
            let y = y0 - (i % period) as f32 * rise;
            self.coins.push(Coin::new(x, y));
        }
    }

    /// Ground-level patroller; `speed` is in px/frame before scaling
    fn enemy(&mut self, x: f32, speed: f32, patrol_start: f32, patrol_end: f32) {
        self.enemies.push(Enemy::new(
            x,
            ENEMY_Y,
            speed * AUTHORED_FPS,
            patrol_start,
            patrol_end,
        ));
    }

    fn flag(&mut self, x: f32, y: f32) {
        self.flag = Some(Flag {
            rect: Rect::new(x, y, 30.0, 60.0),
        });
    }

    fn tutorial(&mut self) {
        self.ground(2400.0);
        let ledges = [
            (200.0, 470.0, 120.0),
            (370.0, 410.0, 120.0),
            (540.0, 350.0, 120.0),
            (700.0, 410.0, 120.0),
            (850.0, 470.0, 100.0),
            (1000.0, 410.0, 100.0),
            (1150.0, 350.0, 120.0),
            (1300.0, 410.0, 100.0),
            (1450.0, 470.0, 120.0),
            (1600.0, 410.0, 120.0),
            (1750.0, 350.0, 140.0),
            (1920.0, 290.0, 150.0),
            (2100.0, 350.0, 120.0),
        ];
        for (x, y, w) in ledges {
            self.ledge(x, y, w);
        }
        self.coin_row(15, 250.0, 130.0, 300.0, 40.0, 3);
        for (x, start, end) in [(400.0, 300.0, 600.0), (1100.0, 1000.0, 1300.0), (1800.0, 1700.0, 2000.0)] {
            // The tutorial ignores the difficulty multiplier
            self.enemy(x, 2.5, start, end);
        }
        self.flag(2150.0, 270.0);
    }

    fn rising_up(&mut self) {
        self.ground(3000.0);
        for i in 0..25 {
            let fi = i as f32;
            let y = 480.0 - (fi * 0.5).sin() * 100.0;
            self.ledge(150.0 + fi * 110.0, y, 80.0 + (i % 3) as f32 * 20.0);
        }
        let high = [
            (500.0, 250.0, 100.0),
            (900.0, 220.0, 120.0),
            (1300.0, 200.0, 100.0),
            (1700.0, 220.0, 120.0),
            (2100.0, 240.0, 100.0),
            (2500.0, 200.0, 150.0),
            (2700.0, 250.0, 200.0),
        ];
        for (x, y, w) in high {
            self.ledge(x, y, w);
        }
        self.coin_row(20, 200.0, 130.0, 250.0, 30.0, 4);
        let m = self.speed_mult;
        for (x, speed, start, end) in [
            (300.0, 3.0, 200.0, 500.0),
            (800.0, 3.5, 700.0, 1000.0),
            (1400.0, 3.0, 1300.0, 1600.0),
            (2000.0, 3.5, 1900.0, 2200.0),
            (2600.0, 4.0, 2500.0, 2800.0),
        ] {
            self.enemy(x, speed * m, start, end);
        }
        self.flag(2750.0, 170.0);
    }

    fn the_climb(&mut self) {
        self.ground(3600.0);
        // Zigzag
        for i in 0..30 {
            let fi = i as f32;
            let y = 480.0 - (i % 2) as f32 * 80.0 - (i / 5) as f32 * 20.0;
            self.ledge(100.0 + fi * 115.0, y, 70.0 - (i % 4) as f32 * 5.0);
        }
        // Two staircases
        for (x0, w) in [(800.0, 80.0), (2000.0, 75.0)] {
            for i in 0..8 {
                let fi = i as f32;
                self.ledge(x0 + fi * 90.0, 450.0 - fi * 50.0, w);
            }
        }
        for (x, y, w) in [
            (2800.0, 280.0, 100.0),
            (3000.0, 220.0, 100.0),
            (3200.0, 160.0, 150.0),
            (3400.0, 220.0, 120.0),
        ] {
            self.ledge(x, y, w);
        }
        self.coin_row(25, 150.0, 140.0, 200.0, 30.0, 5);
        let m = self.speed_mult;
        for (x, speed, start, end) in [
            (400.0, 3.5, 300.0, 700.0),
            (1000.0, 4.0, 900.0, 1300.0),
            (1600.0, 3.5, 1500.0, 1900.0),
            (2200.0, 4.0, 2100.0, 2500.0),
            (2800.0, 4.5, 2700.0, 3100.0),
            (3300.0, 4.0, 3200.0, 3500.0),
        ] {
            self.enemy(x, speed * m, start, end);
        }
        self.flag(3450.0, 140.0);
    }

    fn extreme(&mut self, rng: &mut Pcg32) {
        self.ground(4200.0);
        for i in 0..40 {
            let fi = i as f32;
            let y = 500.0 - (fi * 0.3).sin().abs() * 150.0 - (i % 5) as f32 * 10.0;
            self.ledge(80.0 + fi * 100.0, y, 60.0 - (i % 5) as f32 * 3.0);
        }
        // Narrow vertical stacks
        for section in 0..4 {
            for i in 0..9 {
                let x = 1000.0 + section as f32 * 800.0 + i as f32 * 80.0;
                self.ledge(x, 480.0 - i as f32 * 55.0, 70.0);
            }
        }
        for (x, y, w) in [(3800.0, 300.0, 80.0), (3950.0, 240.0, 80.0), (4100.0, 180.0, 100.0)] {
            self.ledge(x, y, w);
        }
        self.coin_row(30, 130.0, 135.0, 180.0, 25.0, 6);
        let m = self.speed_mult;
        for i in 0..10 {
            let offset = i as f32 * 400.0;
            let speed = 3.5 + rng.random_range(0.0..1.5);
            self.enemy(300.0 + offset, speed * m, 250.0 + offset, 550.0 + offset);
        }
        self.flag(4130.0, 100.0);
    }

    fn master(&mut self, rng: &mut Pcg32) {
        self.ground(5000.0);
        // Wave
        for i in 0..15 {
            let fi = i as f32;
            self.ledge(100.0 + fi * 120.0, 450.0 - (fi * 0.6).sin() * 120.0, 70.0);
        }
        // Stairway
        for i in 0..12 {
            let fi = i as f32;
            self.ledge(2000.0 + fi * 80.0, 480.0 - fi * 40.0, 75.0);
        }
        // Floating islands
        for i in 0..20 {
            let x = 3000.0 + (i % 4) as f32 * 90.0 + (i / 4) as f32 * 200.0;
            self.ledge(x, 450.0 - (i % 4) as f32 * 60.0, 65.0);
        }
        // Gauntlet
        for i in 0..15 {
            self.ledge(4200.0 + i as f32 * 50.0, 500.0 - (i % 3) as f32 * 80.0, 50.0);
        }
        // Final tower
        for i in 0..10 {
            self.ledge(4700.0 + (i % 2) as f32 * 80.0, 480.0 - i as f32 * 45.0, 80.0);
        }
        self.coin_row(35, 150.0, 135.0, 150.0, 25.0, 7);
        let m = self.speed_mult;
        for i in 0..15 {
            let offset = i as f32 * 320.0;
            let speed = 3.0 + rng.random_range(0.0..2.0);
            self.enemy(250.0 + offset, speed * m, 200.0 + offset, 500.0 + offset);
        }
        self.flag(4750.0, 30.0);
    }

    fn finish(self) -> LevelLayout {
        LevelLayout {
            index: self.index,
            platforms: self.platforms,
            coins: self.coins,
            enemies: self.enemies,
            // Every authored level places a flag
            flag: self.flag.unwrap_or(Flag {
                rect: Rect::new(self.level_width - 50.0, GROUND_Y - 60.0, 30.0, 60.0),
            }),
            level_width: self.level_width,
        }
    }
}
