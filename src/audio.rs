//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed!
//! The simulation never plays sounds itself; the host maps drained
//! `GameEvent`s through `SoundEffect::for_event`.

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Jump off the ground
    Jump,
    /// Mid-air jump
    DoubleJump,
    /// Coin collected
    Coin,
    /// Piglet companion collected
    Piglet,
    /// Cleanse item collected
    Bleon,
    /// Obstacle hit, mud splat
    Hit,
    /// Free pass after invincibility used up
    Dodge,
    /// Fan launch into invincibility
    FanLaunch,
    /// Game over
    GameOver,
    /// New local best
    HighScore,
}

impl SoundEffect {
    /// Sound for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Jumped => Some(SoundEffect::Jump),
            GameEvent::DoubleJumped => Some(SoundEffect::DoubleJump),
            GameEvent::CoinCollected { .. } => Some(SoundEffect::Coin),
            GameEvent::PigletCollected { .. } => Some(SoundEffect::Piglet),
            GameEvent::BleonCollected { .. } => Some(SoundEffect::Bleon),
            GameEvent::ObstacleHit { .. } => Some(SoundEffect::Hit),
            GameEvent::HitIgnored => Some(SoundEffect::Dodge),
            GameEvent::InvincibilityStarted { .. } => Some(SoundEffect::FanLaunch),
            GameEvent::GameOver { .. } => Some(SoundEffect::GameOver),
            GameEvent::InvincibilityEnded | GameEvent::GraceStarted { .. } => None,
        }
    }
}

/// Melody looped while invincible (Hz, one note per beat)
pub const INVINCIBLE_MELODY: [f32; 8] = [523.3, 659.3, 784.0, 1046.5, 784.0, 659.3, 587.3, 784.0];
/// Seconds per melody note
pub const INVINCIBLE_BEAT: f64 = 0.14;

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{INVINCIBLE_BEAT, INVINCIBLE_MELODY, SoundEffect};

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        master_volume: f32,
        muted: bool,
        /// Scheduled oscillators of the invincibility loop
        music: Vec<OscillatorNode>,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: 0.8,
                muted: false,
                music: Vec::new(),
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
            if muted {
                self.stop_all();
            }
        }

        fn volume(&self) -> f32 {
            if self.muted { 0.0 } else { self.master_volume }
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let vol = self.volume();
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Jump => self.sweep(ctx, vol * 0.3, 300.0, 620.0, 0.12, OscillatorType::Square),
                SoundEffect::DoubleJump => {
                    self.sweep(ctx, vol * 0.25, 480.0, 900.0, 0.1, OscillatorType::Square)
                }
                SoundEffect::Coin => self.arpeggio(ctx, vol * 0.25, &[988.0, 1319.0], 0.06, 0.12),
                SoundEffect::Piglet => {
                    self.arpeggio(ctx, vol * 0.25, &[660.0, 880.0, 1100.0], 0.07, 0.14)
                }
                SoundEffect::Bleon => self.sweep(ctx, vol * 0.3, 900.0, 1500.0, 0.25, OscillatorType::Sine),
                SoundEffect::Hit => self.play_splat(ctx, vol),
                SoundEffect::Dodge => self.sweep(ctx, vol * 0.2, 700.0, 350.0, 0.15, OscillatorType::Triangle),
                SoundEffect::FanLaunch => {
                    self.sweep(ctx, vol * 0.35, 200.0, 1200.0, 0.4, OscillatorType::Sawtooth)
                }
                SoundEffect::GameOver => {
                    self.arpeggio(ctx, vol * 0.3, &[400.0, 350.0, 300.0, 200.0], 0.2, 0.3)
                }
                SoundEffect::HighScore => self.arpeggio(
                    ctx,
                    vol * 0.25,
                    &[500.0, 600.0, 700.0, 800.0, 1000.0],
                    0.08,
                    0.25,
                ),
            }
        }

        /// Schedule the invincibility loop for `duration` seconds, replacing any running loop
        pub fn start_invincible_music(&mut self, duration: f32) {
            self.stop_music();
            let vol = self.volume();
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = self.ctx.clone() else { return };

            let start = ctx.current_time();
            let beats = (duration as f64 / INVINCIBLE_BEAT).ceil() as usize;
            for beat in 0..beats {
                let freq = INVINCIBLE_MELODY[beat % INVINCIBLE_MELODY.len()];
                let Some((osc, gain)) = create_osc(&ctx, freq, OscillatorType::Square) else {
                    continue;
                };
                let t = start + beat as f64 * INVINCIBLE_BEAT;
                gain.gain().set_value_at_time(vol * 0.12, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + INVINCIBLE_BEAT * 0.9)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + INVINCIBLE_BEAT).ok();
                self.music.push(osc);
            }
        }

        pub fn stop_music(&mut self) {
            for osc in self.music.drain(..) {
                // Already-finished nodes reject stop(); nothing to do then
                let _ = osc.stop();
            }
        }

        /// Silence everything that is still scheduled
        pub fn stop_all(&mut self) {
            self.stop_music();
        }

        // === Sound generators ===

        /// Single oscillator with a frequency sweep and decaying gain
        fn sweep(
            &self,
            ctx: &AudioContext,
            peak: f32,
            from: f32,
            to: f32,
            length: f64,
            osc_type: OscillatorType,
        ) {
            let Some((osc, gain)) = create_osc(ctx, from, osc_type) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(peak, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + length)
                .ok();
            osc.frequency().set_value_at_time(from, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(to, t + length)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + length + 0.05).ok();
        }

        /// Notes one after another, `step` seconds apart
        fn arpeggio(&self, ctx: &AudioContext, peak: f32, notes: &[f32], step: f64, length: f64) {
            for (i, freq) in notes.iter().enumerate() {
                let delay = i as f64 * step;
                if let Some((osc, gain)) = create_osc(ctx, *freq, OscillatorType::Triangle) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(peak, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + length)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + length + 0.05).ok();
                }
            }
        }

        /// Mud splat - low thud plus a rough buzz
        fn play_splat(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();

            if let Some((osc, gain)) = create_osc(ctx, 140.0, OscillatorType::Sine) {
                gain.gain().set_value_at_time(vol * 0.5, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.18)
                    .ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(50.0, t + 0.18)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.22).ok();
            }

            if let Some((osc, gain)) = create_osc(ctx, 90.0, OscillatorType::Sawtooth) {
                gain.gain().set_value_at_time(vol * 0.15, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.15).ok();
            }
        }
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }
}
