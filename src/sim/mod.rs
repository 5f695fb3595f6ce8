//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (level generation)
//! - Stable iteration order (authoring order)
//! - No rendering, audio, or storage dependencies

pub mod collision;
pub mod events;
pub mod level;
pub mod physics;
pub mod state;
pub mod tick;

pub use collision::{EnemyOutcome, collect_coins, land_on_platforms, resolve_enemies};
pub use events::{EventQueue, GameEvent, Hud, SoundKind};
pub use level::{LevelCatalog, LevelLayout, level_name};
pub use state::{
    Camera, Coin, Enemy, Facing, Flag, GamePhase, LifeLoss, Platform, Player, Rect, Session,
    Snapshot,
    time_limit_for_level,
};
pub use tick::{TickInput, TickOutcome, tick};
