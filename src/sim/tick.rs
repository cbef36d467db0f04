//! Simulation step
//!
//! Advances the world by one timestep. Order matters: timers, physics,
//! ground contact, invincibility, spawning, movement, collisions, score.

use glam::Vec2;

use super::collision::{Rect, obstacle_hitbox, pig_hitbox};
use super::state::{AbsorbEffect, GameEvent, ItemKind, MAX_MUD, Mode, Popup, World};
use crate::consts::*;

/// Input commands for a single step
#[derive(Debug, Clone, Default)]
pub struct StepInput {
    /// Jump pressed (one-shot)
    pub jump: bool,
    /// Demo mode - jump automatically ahead of obstacles
    pub autopilot: bool,
}

/// Lifetime of an absorb burst (s)
const ABSORB_EFFECT_LIFE: f32 = 0.45;

/// Advance the world by `dt` seconds. No-op unless a run is active.
pub fn step(world: &mut World, input: &StepInput, dt: f32) {
    if !world.is_running() {
        return;
    }

    if input.jump || (input.autopilot && autopilot_wants_jump(world)) {
        world.jump();
    }

    // 1. Clock, speed and derived spawn interval
    world.t += dt;
    world.speed += world.tuning.speed_rate * dt;
    world.spawn_every = world.tuning.spawn_every(world.speed);

    // 2. Cosmetic timers
    world.smile_timer = (world.smile_timer - dt).max(0.0);
    world.bleon_effect_timer = (world.bleon_effect_timer - dt).max(0.0);
    world.shake = (world.shake - dt).max(0.0);
    world.pig.recoil = (world.pig.recoil - world.pig.recoil * 8.0 * dt).max(0.0);
    world.recent_jump_height =
        (world.recent_jump_height - world.recent_jump_height * world.tuning.jump_bias_decay * dt)
            .max(0.0);

    // 3. Pig physics for the current mode
    let gravity = if world.is_invincible() {
        world.tuning.gravity * world.tuning.invincible_gravity_scale
    } else {
        world.tuning.gravity
    };
    let was_airborne = !world.pig.on_ground;
    let ground_line = world.ground_line();
    let grounded = world.pig.apply_gravity(gravity, ground_line, dt);

    // 4. Ground contact
    if grounded {
        if was_airborne {
            world.recent_jump_height = world.recent_jump_height.max(world.pig.peak_height);
            world.pig.peak_height = 0.0;
        }
        if world.mode == Mode::Landing {
            world.mode = Mode::Grace {
                remaining: world.tuning.grace_window,
            };
            world.ignore_next_hit = true;
            world.mud = world.mud.saturating_sub(1);
            world.events.push(GameEvent::GraceStarted { mud: world.mud });
        }
    }

    // 5. Invincibility countdown and ground drop
    update_invincibility(world, dt);

    // 6. Grace window
    if let Mode::Grace { remaining } = world.mode {
        let remaining = remaining - dt;
        world.mode = if remaining > 0.0 {
            Mode::Grace { remaining }
        } else {
            Mode::Normal
        };
    }

    // 7. Obstacle spawn cooldown
    world.obstacle_cooldown = (world.obstacle_cooldown - dt).max(0.0);

    // 8. Transient effects
    for popup in &mut world.popups {
        popup.pos.y -= world.tuning.popup_rise * dt;
        popup.life -= dt;
    }
    world.popups.retain(|p| p.life > 0.0);
    for absorb in &mut world.absorbs {
        absorb.life -= dt;
    }
    world.absorbs.retain(|a| a.life > 0.0);

    // 9. Spawning
    if world.tuning.spawning_enabled {
        world.try_spawn_obstacle(dt);
        world.try_spawn_item(dt);
        world.try_spawn_fan(dt);
    }
    world.try_spawn_cloud(dt);

    // 10. Scroll and prune
    scroll_and_prune(world, dt);

    // 11. Collisions and pickups
    resolve_items(world, dt);
    resolve_fans(world);
    resolve_obstacles(world);

    // 12. Score
    if world.is_running() {
        world.score += dt * world.tuning.score_per_second(world.speed);
    }
}

/// Three-phase ground drop: ease down, hold, ease back up before expiry
pub fn invincible_ground_offset(
    elapsed: f32,
    remaining: f32,
    max_offset: f32,
    transition: f32,
) -> f32 {
    if transition <= 0.0 {
        return max_offset;
    }
    let ease = |t: f32| {
        let t = t.clamp(0.0, 1.0);
        t * t * (3.0 - 2.0 * t)
    };
    let down = ease(elapsed / transition);
    let up = ease(remaining / transition);
    max_offset * down.min(up)
}

fn update_invincibility(world: &mut World, dt: f32) {
    match world.mode {
        Mode::Invincible {
            remaining,
            duration,
        } => {
            let next = (remaining - dt).max(0.0);
            let threshold = world.tuning.spawn_suppress_threshold;
            if remaining > threshold && next <= threshold {
                world.obstacle_cooldown = world
                    .obstacle_cooldown
                    .max(next + world.tuning.spawn_suppress_overshoot);
            }

            if next <= 0.0 {
                world.mode = Mode::Landing;
                world.ground_offset = 0.0;
                world.events.push(GameEvent::InvincibilityEnded);
                log::debug!("Invincibility ended at t={:.2}", world.t);
            } else {
                world.mode = Mode::Invincible {
                    remaining: next,
                    duration,
                };
                world.ground_offset = invincible_ground_offset(
                    duration - next,
                    next,
                    world.tuning.ground_offset_max,
                    world.tuning.ground_offset_transition,
                );
            }
        }
        _ => {
            let recovery = (world.tuning.ground_offset_recovery * dt).min(1.0);
            world.ground_offset -= world.ground_offset * recovery;
            if world.ground_offset < 0.1 {
                world.ground_offset = 0.0;
            }
        }
    }
}

fn scroll_and_prune(world: &mut World, dt: f32) {
    let dx = world.speed * dt;
    for o in &mut world.obstacles {
        o.rect.x -= dx;
    }
    for i in &mut world.items {
        i.rect.x -= dx;
    }
    for f in &mut world.fans {
        f.rect.x -= dx;
    }
    for c in &mut world.clouds {
        c.rect.x -= c.speed * dt;
    }

    let on_screen = |r: &Rect| r.right() > -PRUNE_MARGIN;
    world.obstacles.retain(|o| on_screen(&o.rect));
    world.items.retain(|i| on_screen(&i.rect));
    world.fans.retain(|f| on_screen(&f.rect));
    world.clouds.retain(|c| on_screen(&c.rect));
}

fn resolve_items(world: &mut World, dt: f32) {
    let pig_rect = world.pig.rect();
    let mut consumed = Vec::new();

    if world.is_invincible() {
        let target = pig_rect.center();
        let (radius, pull, capture) = (
            world.tuning.absorb_radius,
            world.tuning.absorb_pull_speed,
            world.tuning.absorb_capture,
        );
        for (idx, item) in world.items.iter_mut().enumerate() {
            let center = item.rect.center();
            let to_pig = target - center;
            let dist = to_pig.length();
            if dist > radius {
                continue;
            }
            let travel = (pull * dt).min(dist);
            let moved = center + to_pig.normalize_or_zero() * travel;
            item.rect.x = moved.x - item.rect.w / 2.0;
            item.rect.y = moved.y - item.rect.h / 2.0;
            if moved.distance(target) <= capture {
                consumed.push(idx);
            }
        }
        for &idx in consumed.iter().rev() {
            let item = world.items.remove(idx);
            world.absorbs.push(AbsorbEffect {
                pos: item.rect.center(),
                kind: item.kind,
                life: ABSORB_EFFECT_LIFE,
                max_life: ABSORB_EFFECT_LIFE,
            });
            apply_item(world, item.kind, item.value, item.rect.center());
        }
    } else {
        let hitbox = pig_hitbox(&pig_rect);
        for (idx, item) in world.items.iter().enumerate() {
            if hitbox.overlaps(&item.rect) {
                consumed.push(idx);
            }
        }
        for &idx in consumed.iter().rev() {
            let item = world.items.remove(idx);
            apply_item(world, item.kind, item.value, item.rect.center());
        }
    }
}

fn apply_item(world: &mut World, kind: ItemKind, value: f32, at: Vec2) {
    match kind {
        ItemKind::Coin => {
            world.score += value;
            world.smile_timer = world.tuning.smile_duration;
            world.events.push(GameEvent::CoinCollected {
                value: value as u32,
            });
        }
        ItemKind::Piglet => {
            world.score += value;
            world.piglets += 1;
            world.events.push(GameEvent::PigletCollected {
                piglets: world.piglets,
            });
        }
        ItemKind::Bleon => {
            world.mud = world.mud.saturating_sub(1);
            world.bleon_effect_timer = world.tuning.bleon_effect_duration;
            world.events.push(GameEvent::BleonCollected { mud: world.mud });
        }
    }
    if value > 0.0 {
        world.popups.push(Popup {
            pos: at,
            value: value as u32,
            life: world.tuning.popup_life,
            max_life: world.tuning.popup_life,
        });
    }
}

fn resolve_fans(world: &mut World) {
    if !world.pig.on_ground || world.is_invincible() {
        return;
    }
    let hitbox = pig_hitbox(&world.pig.rect());
    let offset = world.ground_offset;
    let Some(fan) = world
        .fans
        .iter_mut()
        .find(|f| f.active && hitbox.overlaps(&f.rect.offset_y(offset)))
    else {
        return;
    };
    fan.active = false;

    let duration = world.tuning.invincible_duration(world.piglets);
    world.mode = Mode::Invincible {
        remaining: duration,
        duration,
    };
    if duration <= world.tuning.spawn_suppress_threshold {
        world.obstacle_cooldown = duration + world.tuning.spawn_suppress_overshoot;
    }
    world.piglets = 0;
    world.mud = 0;
    world.ignore_next_hit = false;
    world.pig.vy = world.tuning.fan_launch_velocity;
    world.pig.on_ground = false;
    world.pig.can_double_jump = false;
    world.pig.peak_height = 0.0;
    world.events.push(GameEvent::InvincibilityStarted { duration });
    log::debug!("Invincibility started for {:.1}s", duration);
}

fn resolve_obstacles(world: &mut World) {
    if world.is_invincible() || world.mode.is_grace() {
        return;
    }
    let hitbox = pig_hitbox(&world.pig.rect());
    let offset = world.ground_offset;

    for idx in 0..world.obstacles.len() {
        let obstacle = &mut world.obstacles[idx];
        if obstacle.hit || !hitbox.overlaps(&obstacle_hitbox(&obstacle.rect.offset_y(offset))) {
            continue;
        }
        obstacle.hit = true;

        if world.ignore_next_hit {
            world.ignore_next_hit = false;
            world.events.push(GameEvent::HitIgnored);
            continue;
        }

        world.shake = world.tuning.hit_shake;
        world.pig.recoil = world.tuning.hit_recoil;
        world.mud = (world.mud + 1).min(MAX_MUD);
        world.events.push(GameEvent::ObstacleHit { mud: world.mud });
        if world.mud >= MAX_MUD {
            world.game_over();
            return;
        }
    }
}

/// Demo-mode decision: jump when the next live obstacle is about to reach the pig
fn autopilot_wants_jump(world: &World) -> bool {
    if !world.pig.on_ground {
        return false;
    }
    let pig_front = world.pig.x + world.pig.w;
    let lead = world.speed * 0.22;
    world.obstacles.iter().any(|o| {
        !o.hit && o.rect.x > pig_front - 10.0 && o.rect.x - pig_front < lead
    })
}
