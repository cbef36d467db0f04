//! World state and core simulation types
//!
//! One `World` exists per session. The host owns it, `step` mutates it and
//! the renderer only reads it.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::Rect;
use crate::consts::*;
use crate::theme::{ObstacleKind, ThemeId};
use crate::tuning::Tuning;

/// Mud hits that end a run
pub const MAX_MUD: u8 = 3;

/// Outer run lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// Menu, nothing simulates
    #[default]
    Idle,
    /// Active gameplay
    Running,
    /// Run ended, frozen until restart
    GameOver,
}

/// Gameplay mode nested inside `RunState::Running`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Mode {
    #[default]
    Normal,
    /// Fan-triggered invincibility with floaty gravity
    Invincible { remaining: f32, duration: f32 },
    /// Invincibility expired; waiting for the pig to touch ground
    Landing,
    /// Short window after landing where obstacles are ignored
    Grace { remaining: f32 },
}

impl Mode {
    pub fn is_invincible(&self) -> bool {
        matches!(self, Mode::Invincible { .. })
    }

    pub fn is_grace(&self) -> bool {
        matches!(self, Mode::Grace { .. })
    }

    /// Seconds of invincibility left (0 outside invincibility)
    pub fn invincible_remaining(&self) -> f32 {
        match self {
            Mode::Invincible { remaining, .. } => *remaining,
            _ => 0.0,
        }
    }
}

/// The player
#[derive(Debug, Clone)]
pub struct Pig {
    /// Fixed horizontal position
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub vy: f32,
    pub on_ground: bool,
    /// A double jump is armed (set by a grounded jump)
    pub can_double_jump: bool,
    /// The double jump of the current airtime was spent
    pub double_jump_used: bool,
    /// Highest point of the current airtime, px above ground
    pub peak_height: f32,
    /// Visual knock-back after a hit, decays to 0 (render only)
    pub recoil: f32,
}

impl Default for Pig {
    fn default() -> Self {
        Self {
            x: PIG_X,
            y: GROUND_Y - PIG_H,
            w: PIG_W,
            h: PIG_H,
            vy: 0.0,
            on_ground: true,
            can_double_jump: false,
            double_jump_used: false,
            peak_height: 0.0,
            recoil: 0.0,
        }
    }
}

impl Pig {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

/// Ground obstacle
#[derive(Debug, Clone)]
pub struct Obstacle {
    /// Bounds relative to the undisplaced ground line
    pub rect: Rect,
    pub kind: ObstacleKind,
    /// Set on first contact; a hit obstacle never interacts again
    pub hit: bool,
}

/// Collectible kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Coin,
    Piglet,
    /// Cleanse: removes one mud, awards nothing
    Bleon,
}

impl ItemKind {
    pub const ALL: [ItemKind; 3] = [ItemKind::Coin, ItemKind::Piglet, ItemKind::Bleon];
}

/// Floating collectible
#[derive(Debug, Clone)]
pub struct Item {
    pub rect: Rect,
    pub kind: ItemKind,
    /// Score delta on pickup
    pub value: f32,
}

/// Single-use invincibility trigger on the ground
#[derive(Debug, Clone)]
pub struct Fan {
    pub rect: Rect,
    pub active: bool,
}

/// Cosmetic background cloud
#[derive(Debug, Clone)]
pub struct Cloud {
    pub rect: Rect,
    /// Own parallax speed (px/s)
    pub speed: f32,
}

/// Rising "+N" score popup
#[derive(Debug, Clone)]
pub struct Popup {
    pub pos: Vec2,
    pub value: u32,
    pub life: f32,
    pub max_life: f32,
}

/// Burst left where an item was absorbed during invincibility
#[derive(Debug, Clone)]
pub struct AbsorbEffect {
    pub pos: Vec2,
    pub kind: ItemKind,
    pub life: f32,
    pub max_life: f32,
}

/// Things that happened during a step, drained by the host for audio/HUD
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Jumped,
    DoubleJumped,
    CoinCollected { value: u32 },
    PigletCollected { piglets: u32 },
    BleonCollected { mud: u8 },
    ObstacleHit { mud: u8 },
    /// Post-invincibility free pass consumed
    HitIgnored,
    InvincibilityStarted { duration: f32 },
    InvincibilityEnded,
    GraceStarted { mud: u8 },
    GameOver { score: u64 },
}

/// Complete world state for one session
#[derive(Debug, Clone)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    pub theme: ThemeId,
    pub run: RunState,
    pub mode: Mode,
    /// Seconds since run start
    pub t: f32,
    /// Continuous score, floored for display and submission
    pub score: f32,
    /// Floored score recorded at game over
    pub final_score: u64,
    /// Scroll speed (px/s)
    pub speed: f32,
    pub spawn_timer: f32,
    pub spawn_every: f32,
    pub item_timer: f32,
    pub fan_timer: f32,
    /// Obstacle spawns are suppressed while > 0
    pub obstacle_cooldown: f32,
    pub pig: Pig,
    pub obstacles: Vec<Obstacle>,
    pub clouds: Vec<Cloud>,
    pub items: Vec<Item>,
    pub fans: Vec<Fan>,
    /// Damage counter, 0..=3
    pub mud: u8,
    /// Collected piglets, extend the next invincibility
    pub piglets: u32,
    /// One obstacle contact is forgiven after invincibility
    pub ignore_next_hit: bool,
    /// Vertical drop of ground, obstacles and fans (px, >= 0)
    pub ground_offset: f32,
    /// Remembered jump height that biases obstacle height
    pub recent_jump_height: f32,
    pub smile_timer: f32,
    pub bleon_effect_timer: f32,
    pub shake: f32,
    pub popups: Vec<Popup>,
    pub absorbs: Vec<AbsorbEffect>,
    /// Events since the host last drained them
    pub events: Vec<GameEvent>,
}

impl World {
    /// Create an idle world with a scattered sky
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut world = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            speed: tuning.start_speed,
            spawn_every: tuning.spawn_every_max,
            tuning,
            theme: ThemeId::default(),
            run: RunState::Idle,
            mode: Mode::Normal,
            t: 0.0,
            score: 0.0,
            final_score: 0,
            spawn_timer: 0.0,
            item_timer: 0.0,
            fan_timer: 0.0,
            obstacle_cooldown: 0.0,
            pig: Pig::default(),
            obstacles: Vec::new(),
            clouds: Vec::new(),
            items: Vec::new(),
            fans: Vec::new(),
            mud: 0,
            piglets: 0,
            ignore_next_hit: false,
            ground_offset: 0.0,
            recent_jump_height: 0.0,
            smile_timer: 0.0,
            bleon_effect_timer: 0.0,
            shake: 0.0,
            popups: Vec::new(),
            absorbs: Vec::new(),
            events: Vec::new(),
        };
        world.seed_clouds();
        world
    }

    /// Begin a fresh run with a new seed, keeping tuning and theme
    pub fn reset(&mut self, seed: u64) {
        let tuning = self.tuning.clone();
        let theme = self.theme;
        *self = World::new(seed, tuning);
        self.theme = theme;
        self.run = RunState::Running;
        log::info!("Run started (seed {}, theme {})", seed, theme.as_str());
    }

    fn seed_clouds(&mut self) {
        for _ in 0..INITIAL_CLOUDS {
            let cloud = super::spawn::make_cloud(&mut self.rng, true);
            self.clouds.push(cloud);
        }
    }

    pub fn is_running(&self) -> bool {
        self.run == RunState::Running
    }

    pub fn is_invincible(&self) -> bool {
        self.mode.is_invincible()
    }

    /// Ground line including the invincibility drop
    pub fn ground_line(&self) -> f32 {
        GROUND_Y + self.ground_offset
    }

    /// Score as shown in the HUD
    pub fn display_score(&self) -> u64 {
        self.score.max(0.0).floor() as u64
    }

    /// Jump input; ignored outside an active run
    pub fn jump(&mut self) {
        if !self.is_running() {
            return;
        }
        let (jump_velocity, double_velocity) =
            (self.tuning.jump_velocity, self.tuning.double_jump_velocity);
        match self.pig.jump(jump_velocity, double_velocity) {
            Some(super::physics::JumpKind::Single) => self.events.push(GameEvent::Jumped),
            Some(super::physics::JumpKind::Double) => self.events.push(GameEvent::DoubleJumped),
            None => {}
        }
    }

    /// Hand pending events to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Terminal transition: freeze the run and record the final score
    pub(crate) fn game_over(&mut self) {
        if self.run != RunState::Running {
            return;
        }
        self.run = RunState::GameOver;
        self.final_score = self.display_score();
        self.shake = self.tuning.game_over_shake;
        self.events.push(GameEvent::GameOver {
            score: self.final_score,
        });
        log::info!("Game over: score {} at t={:.1}s", self.final_score, self.t);
    }
}
