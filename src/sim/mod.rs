//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (insertion order of each collection)
//! - No rendering or platform dependencies

pub mod collision;
pub mod physics;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Rect, obstacle_hitbox, pig_hitbox, spawn_gap_violated};
pub use physics::JumpKind;
pub use spawn::{is_clear, make_cloud, make_fan, make_item, make_obstacle};
pub use state::{
    AbsorbEffect, Cloud, Fan, GameEvent, Item, ItemKind, MAX_MUD, Mode, Obstacle, Pig, Popup,
    RunState, World,
};
pub use tick::{StepInput, invincible_ground_offset, step};
