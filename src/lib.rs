//! Pig Jump - An endless-runner arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, run state)
//! - `renderer`: WebGPU rendering pipeline
//! - `theme`: Palettes and obstacle sets
//! - `tuning`: Data-driven game balance
//! - `api`: Serverless high-score handlers and score table
//! - `client`: Leaderboard client and presentation updates
//! - `settings`: Client-local preferences
//! - `audio`: Procedural sound effects (Web Audio)

pub mod api;
pub mod audio;
pub mod client;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod theme;
pub mod tuning;

pub use settings::Settings;
pub use theme::{ThemeDefinition, ThemeId};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Frame delta clamp; a stalled tab resumes with at most this much time
    pub const MAX_FRAME_DT: f32 = 0.033;

    /// World dimensions (gameplay coordinates, y grows downward)
    pub const WORLD_W: f32 = 900.0;
    pub const WORLD_H: f32 = 360.0;
    /// Ground line, 78% of world height
    pub const GROUND_Y: f32 = 281.0;

    /// New entities enter this far past the right edge
    pub const SPAWN_MARGIN: f32 = 8.0;
    /// Entities are pruned once their right edge passes this far left of x=0
    pub const PRUNE_MARGIN: f32 = 60.0;

    /// Pig sprite
    pub const PIG_X: f32 = 162.0;
    pub const PIG_W: f32 = 54.0;
    pub const PIG_H: f32 = 40.0;

    /// Fan power-up platform
    pub const FAN_W: f32 = 64.0;
    pub const FAN_H: f32 = 16.0;

    /// Item sprite size
    pub const ITEM_SIZE: f32 = 28.0;

    /// Clouds seeded at run start
    pub const INITIAL_CLOUDS: usize = 4;
}
