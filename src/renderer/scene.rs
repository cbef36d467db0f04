//! Scene tessellation
//!
//! Turns a read-only `World` into one triangle list in world coordinates.
//! Layer order: sky, stars, clouds, ground, fans, obstacles, items,
//! effects, pig, popups, overlay.

use glam::{Affine2, Vec2};

use super::shapes::{self, with_alpha};
use super::vertex::{Vertex, colors};
use crate::consts::*;
use crate::sim::{ItemKind, Mode, Obstacle, World};
use crate::theme::{Color, ObstacleKind, Palette, time_palette};

/// Tessellated frame plus the color for letterbox bars
#[derive(Debug, Clone)]
pub struct Scene {
    pub vertices: Vec<Vertex>,
    pub clear: Color,
}

/// Horizontal screen-shake offset (px). Deterministic in `t` so the renderer
/// never consumes simulation randomness.
pub fn shake_offset(shake: f32, t: f32) -> f32 {
    if shake <= 0.0 {
        return 0.0;
    }
    ((t * 97.0).sin() * 5.0 * shake * 10.0).round()
}

pub fn build_scene(world: &World) -> Scene {
    let theme = world.theme.definition();
    let palette = &theme.palette;
    let sky = time_palette(world.speed, world.tuning.start_speed);
    let mut out = Vec::with_capacity(4096);

    // Sky fills past the world so letterbox bars blend in
    shapes::rect(&mut out, -WORLD_W, -WORLD_H, WORLD_W * 3.0, WORLD_H, sky.sky_top);
    shapes::gradient_rect(&mut out, -WORLD_W, 0.0, WORLD_W * 3.0, WORLD_H, sky.sky_top, sky.sky_bottom);
    if theme.starry {
        draw_stars(&mut out, world.t);
    }

    let shaken_from = out.len();

    for cloud in &world.clouds {
        let alpha = if theme.starry { 0.08 } else { 0.16 };
        let r = cloud.rect;
        shapes::rounded_rect(&mut out, r.x, r.y, r.w, r.h, r.h / 2.0, with_alpha(colors::WHITE, alpha * 0.55));
    }

    draw_ground(&mut out, world, palette, theme.starry);

    for fan in &world.fans {
        let r = fan.rect.offset_y(world.ground_offset);
        draw_fan(&mut out, r.x, r.y, r.w, r.h, fan.active, world.t);
    }

    for obstacle in &world.obstacles {
        draw_obstacle(&mut out, obstacle, world.ground_offset, palette);
    }

    for item in &world.items {
        draw_item(&mut out, item.kind, item.rect.center(), item.rect.w / 2.0, palette, world.t);
    }

    for absorb in &world.absorbs {
        let progress = 1.0 - absorb.life / absorb.max_life;
        let radius = 6.0 + progress * 22.0;
        let color = match absorb.kind {
            ItemKind::Coin => colors::COIN,
            ItemKind::Piglet => palette.pig,
            ItemKind::Bleon => colors::BLEON,
        };
        shapes::ring(&mut out, absorb.pos, radius, radius + 3.0, with_alpha(color, 1.0 - progress));
    }

    draw_pig(&mut out, world, palette);

    for popup in &world.popups {
        let alpha = (popup.life / popup.max_life).clamp(0.0, 1.0);
        let size = if popup.value >= 10 { 7.0 } else { 5.0 };
        draw_plus(&mut out, popup.pos, size, with_alpha(colors::COIN, alpha));
    }

    let dx = shake_offset(world.shake, world.t);
    if dx != 0.0 {
        shapes::translate(&mut out[shaken_from..], Vec2::new(dx, 0.0));
    }

    if !world.is_running() {
        shapes::rect(&mut out, -WORLD_W, -WORLD_H, WORLD_W * 3.0, WORLD_H * 3.0, colors::OVERLAY);
    }

    Scene {
        vertices: out,
        clear: sky.sky_bottom,
    }
}

fn draw_stars(out: &mut Vec<Vertex>, t: f32) {
    let drift = (t * 30.0).floor() as i64;
    let band = (WORLD_H * 0.65).floor() as i64;
    for i in 0..90i64 {
        let x = (i * 97 + drift).rem_euclid(WORLD_W as i64) as f32;
        let y = (i * 53).rem_euclid(band) as f32;
        shapes::rect(out, x, y, 2.0, 2.0, with_alpha(colors::WHITE, 0.7 * 0.55));
    }
}

fn draw_ground(out: &mut Vec<Vertex>, world: &World, palette: &Palette, starry: bool) {
    let gy = world.ground_line();
    shapes::rect(out, -WORLD_W, gy, WORLD_W * 3.0, WORLD_H * 2.0, palette.ground);
    shapes::rect(out, -WORLD_W, gy - 1.0, WORLD_W * 3.0, 2.0, palette.ground_line);

    let travel = world.t * world.speed;
    if starry {
        // Craters
        for i in 0..5 {
            let x = (i as f32 * 220.0 - (travel * 0.25) % 1100.0 + 1100.0) % 1100.0 - 100.0;
            let y = gy + 24.0 + (i % 2) as f32 * 8.0;
            shapes::ellipse(out, Vec2::new(x, y), 28.0, 10.0, with_alpha(colors::WHITE, 0.08 * 0.35));
        }
        return;
    }

    // Grass dashes
    let (dash, gap) = (14.0, 16.0);
    let mut x = -((travel * 0.7) % (dash + gap));
    while x < WORLD_W {
        shapes::rect(out, x, gy + 4.0, dash, 2.0, with_alpha(palette.grass, 0.7));
        x += dash + gap;
    }
}

fn draw_fan(out: &mut Vec<Vertex>, x: f32, y: f32, w: f32, h: f32, active: bool, t: f32) {
    let base = if active { colors::FAN } else { with_alpha(colors::FAN, 0.4) };
    shapes::rounded_rect(out, x, y + h * 0.4, w, h * 0.6, 4.0, base);

    // Blades squash horizontally to fake a spin
    let center = Vec2::new(x + w / 2.0, y + h * 0.35);
    let spin = if active { (t * 18.0).sin().abs() } else { 0.3 };
    let blade = if active { colors::FAN_BLADE } else { with_alpha(colors::FAN_BLADE, 0.3) };
    shapes::ellipse(out, center, w * 0.42 * spin.max(0.15), h * 0.3, blade);
    shapes::circle(out, center, 3.0, base);
}

fn draw_obstacle(out: &mut Vec<Vertex>, obstacle: &Obstacle, ground_offset: f32, palette: &Palette) {
    let r = obstacle.rect.offset_y(ground_offset);
    let (x, y, w, h) = (r.x, r.y, r.w, r.h);
    let fade = if obstacle.hit { 0.5 } else { 1.0 };
    let main = with_alpha(palette.obstacle, fade);
    let shade = with_alpha(palette.obstacle_shade, fade);
    let accent = with_alpha(palette.accent, fade);

    match obstacle.kind {
        ObstacleKind::Fence => {
            shapes::rounded_rect(out, x, y, w, h, 8.0, shade);
            shapes::rect(out, x + 2.0, y + h * 0.3, w - 4.0, 3.0, main);
            shapes::rect(out, x + 2.0, y + h * 0.62, w - 4.0, 3.0, main);
        }
        ObstacleKind::Hay => {
            shapes::rounded_rect(out, x, y, w, h, 6.0, with_alpha(colors::HAY, fade));
            for i in 1..4 {
                let ly = y + h * i as f32 / 4.0;
                shapes::rect(out, x + 3.0, ly, w - 6.0, 1.5, with_alpha(colors::SHADOW, fade));
            }
        }
        ObstacleKind::Asteroid => {
            let c = Vec2::new(x + w / 2.0, y + h / 2.0);
            shapes::ellipse(out, c, w / 2.0, h / 2.0, shade);
            shapes::circle(out, c + Vec2::new(-w * 0.15, -h * 0.15), w * 0.14, with_alpha(colors::WHITE, 0.1 * fade));
        }
        ObstacleKind::Satellite => {
            shapes::rect(out, x + w * 0.35, y, w * 0.3, h, main);
            shapes::rect(out, x, y + h * 0.3, w, h * 0.18, accent);
        }
        ObstacleKind::Barrel => {
            shapes::rounded_rect(out, x, y, w, h, 6.0, shade);
            shapes::rect(out, x, y + h * 0.25, w, 3.0, main);
            shapes::rect(out, x, y + h * 0.7, w, 3.0, main);
        }
        ObstacleKind::Cone => {
            shapes::triangle(
                out,
                Vec2::new(x + w / 2.0, y),
                Vec2::new(x + w, y + h),
                Vec2::new(x, y + h),
                accent,
            );
            shapes::rect(out, x + w * 0.3, y + h * 0.5, w * 0.4, 3.0, with_alpha(colors::WHITE, 0.18 * fade));
        }
        ObstacleKind::Lollipop => {
            shapes::rect(out, x + w * 0.45, y + h * 0.3, w * 0.1, h * 0.7, with_alpha(colors::WHITE, 0.55 * fade));
            let c = Vec2::new(x + w * 0.5, y + h * 0.25);
            shapes::circle(out, c, w.min(h) * 0.28 + 4.0, accent);
            shapes::ring(out, c, w.min(h) * 0.1, w.min(h) * 0.18, main);
        }
        ObstacleKind::Cupcake => {
            shapes::rect(out, x + w * 0.1, y + h * 0.45, w * 0.8, h * 0.55, shade);
            shapes::sector(
                out,
                Vec2::new(x + w * 0.5, y + h * 0.45),
                w * 0.42,
                std::f32::consts::PI,
                std::f32::consts::TAU,
                10,
                main,
            );
            shapes::circle(out, Vec2::new(x + w * 0.5, y + h * 0.15), w * 0.1, accent);
        }
    }
}

fn draw_item(out: &mut Vec<Vertex>, kind: ItemKind, center: Vec2, radius: f32, palette: &Palette, t: f32) {
    let bob = Vec2::new(0.0, (t * 5.0 + center.x * 0.05).sin() * 2.0);
    let c = center + bob;
    match kind {
        ItemKind::Coin => {
            // Edge-on flip
            let squash = (t * 6.0 + center.x * 0.1).cos().abs().max(0.2);
            shapes::ellipse(out, c, radius * squash, radius, colors::COIN);
            shapes::ellipse(out, c, radius * 0.55 * squash, radius * 0.55, colors::COIN_SHINE);
        }
        ItemKind::Piglet => {
            let (w, h) = (radius * 2.0, radius * 1.5);
            shapes::rounded_rect(out, c.x - w / 2.0, c.y - h / 2.0, w, h, 8.0, palette.pig);
            shapes::rounded_rect(out, c.x + w * 0.15, c.y - h * 0.1, w * 0.3, h * 0.35, 4.0, palette.pig_shade);
            shapes::circle(out, c + Vec2::new(w * 0.05, -h * 0.15), 1.8, colors::EYE);
        }
        ItemKind::Bleon => {
            shapes::circle(out, c, radius, with_alpha(colors::BLEON, 0.2));
            shapes::ring(out, c, radius - 2.0, radius, colors::BLEON);
            shapes::circle(out, c + Vec2::new(-radius * 0.35, -radius * 0.35), radius * 0.2, with_alpha(colors::WHITE, 0.5));
        }
    }
}

fn draw_pig(out: &mut Vec<Vertex>, world: &World, palette: &Palette) {
    let pig = &world.pig;
    let x = pig.x - pig.recoil;
    let (w, h) = (pig.w, pig.h);

    // Shadow on the (possibly dropped) ground
    let shadow_w = w * if pig.on_ground { 0.9 } else { 0.6 };
    let shadow_alpha = if pig.on_ground { 0.35 } else { 0.2 };
    shapes::rounded_rect(
        out,
        x + (w - shadow_w) / 2.0,
        world.ground_line() + 10.0,
        shadow_w,
        10.0,
        6.0,
        with_alpha(colors::SHADOW, shadow_alpha),
    );

    if world.is_invincible() {
        let remaining = world.mode.invincible_remaining();
        let pulse = 0.6 + 0.4 * (world.t * 10.0).sin();
        // Blink as a warning right before expiry
        let blink = remaining > world.tuning.spawn_suppress_threshold || (world.t * 16.0).sin() > 0.0;
        if blink {
            let c = pig.rect().center() + Vec2::new(-pig.recoil, 0.0);
            shapes::circle(out, c, w * 0.75, with_alpha(colors::GLOW, pulse));
        }
    }

    // Grace window: flicker the sprite
    if matches!(world.mode, Mode::Grace { .. }) && (world.t * 20.0).sin() < -0.3 {
        return;
    }

    // Body in local coords, tilted with vertical speed
    let start = out.len();
    let body = palette.pig;
    let shade = palette.pig_shade;
    shapes::rounded_rect(out, 0.0, 4.0, w - 4.0 + 2.0, h - 10.0 + 2.0, 17.0, palette.pig_stroke);
    shapes::rounded_rect(out, 2.0, 6.0, w - 4.0, h - 10.0, 16.0, body);
    shapes::rounded_rect(out, 10.0, 12.0, w - 20.0, h - 20.0, 12.0, with_alpha(colors::WHITE, 0.25));
    shapes::triangle(out, Vec2::new(12.0, 7.0), Vec2::new(15.0, -1.0), Vec2::new(23.0, 8.0), shade);
    shapes::rounded_rect(out, w - 20.0, 16.0, 16.0, 14.0, 7.0, shade);
    shapes::circle(out, Vec2::new(w - 15.0, 23.0), 2.2, with_alpha(colors::FLY, 0.45));
    shapes::circle(out, Vec2::new(w - 9.0, 23.0), 2.2, with_alpha(colors::FLY, 0.45));
    if world.smile_timer > 0.0 {
        // Happy squint
        shapes::rect(out, w - 29.0, 17.0, 6.0, 2.0, colors::EYE);
    } else {
        shapes::circle(out, Vec2::new(w - 26.0, 18.0), 3.0, colors::EYE);
    }
    shapes::circle(out, Vec2::new(w - 30.0, 26.0), 4.0, with_alpha(palette.accent, 0.55));
    shapes::rounded_rect(out, 12.0, h - 6.0, 8.0, 10.0, 4.0, shade);
    shapes::rounded_rect(out, w - 24.0, h - 6.0, 8.0, 10.0, 4.0, shade);

    if world.mud >= 1 {
        for (fx, fy, r) in [(0.25, 0.55, 5.0), (0.75, 0.45, 6.0), (0.5, 0.8, 5.0), (0.8, 0.85, 4.0), (0.35, 0.25, 4.0)] {
            shapes::circle(out, Vec2::new(w * fx, h * fy), r, colors::MUD);
        }
    }
    if world.mud >= 2 {
        let phase = world.t * 8.0;
        for i in 0..3 {
            let off = i as f32 * std::f32::consts::TAU / 3.0;
            let p = Vec2::new(w / 2.0 + (phase + off).cos() * 20.0, -6.0 + (phase + off).sin() * 12.0);
            shapes::circle(out, p, 2.0, colors::FLY);
        }
    }

    let tilt = (pig.vy / 1100.0).clamp(-0.12, 0.12);
    let half = Vec2::new(w / 2.0, h / 2.0);
    let transform = Affine2::from_translation(Vec2::new(x, pig.y) + half)
        * Affine2::from_angle(tilt)
        * Affine2::from_translation(-half);
    for v in &mut out[start..] {
        let p = transform.transform_point2(Vec2::from(v.position));
        v.position = p.into();
    }

    if world.bleon_effect_timer > 0.0 {
        let progress = 1.0 - world.bleon_effect_timer / world.tuning.bleon_effect_duration.max(1e-3);
        let c = Vec2::new(x, pig.y) + half;
        let radius = w * 0.5 + progress * 24.0;
        shapes::ring(out, c, radius, radius + 3.0, with_alpha(colors::BLEON, 1.0 - progress));
    }
}

fn draw_plus(out: &mut Vec<Vertex>, at: Vec2, size: f32, color: Color) {
    shapes::rect(out, at.x - size, at.y - size * 0.25, size * 2.0, size * 0.5, color);
    shapes::rect(out, at.x - size * 0.25, at.y - size, size * 0.5, size * 2.0, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Popup;
    use crate::theme::ThemeId;
    use crate::tuning::Tuning;

    fn running_world() -> World {
        let mut world = World::new(5, Tuning::default());
        world.reset(5);
        world
    }

    fn count_color(scene: &Scene, color: Color) -> usize {
        scene.vertices.iter().filter(|v| v.color == color).count()
    }

    #[test]
    fn test_scene_is_triangle_list() {
        let scene = build_scene(&running_world());
        assert!(!scene.vertices.is_empty());
        assert_eq!(scene.vertices.len() % 3, 0);
    }

    #[test]
    fn test_overlay_only_outside_run() {
        let mut world = running_world();
        assert_eq!(count_color(&build_scene(&world), colors::OVERLAY), 0);
        world.game_over();
        assert_eq!(count_color(&build_scene(&world), colors::OVERLAY), 6);
        let idle = World::new(1, Tuning::default());
        assert_eq!(count_color(&build_scene(&idle), colors::OVERLAY), 6);
    }

    #[test]
    fn test_mud_adds_spots_and_flies() {
        let mut world = running_world();
        let clean = build_scene(&world).vertices.len();
        world.mud = 1;
        let muddy = build_scene(&world).vertices.len();
        world.mud = 2;
        let flies = build_scene(&world).vertices.len();
        assert!(muddy > clean);
        assert!(flies > muddy);
    }

    #[test]
    fn test_space_theme_has_stars() {
        let mut world = running_world();
        let farm = build_scene(&world).vertices.len();
        world.theme = ThemeId::Space;
        let space = build_scene(&world).vertices.len();
        assert!(space > farm);
    }

    #[test]
    fn test_clear_follows_day_night() {
        let mut world = running_world();
        let night = build_scene(&world).clear;
        world.speed = world.tuning.start_speed + 700.0;
        let morning = build_scene(&world).clear;
        assert_ne!(night, morning);
    }

    #[test]
    fn test_shake_offset() {
        assert_eq!(shake_offset(0.0, 1.23), 0.0);
        assert!(shake_offset(0.5, 0.1).abs() <= 25.0);
    }

    #[test]
    fn test_popups_drawn() {
        let mut world = running_world();
        let base = build_scene(&world).vertices.len();
        world.popups.push(Popup {
            pos: Vec2::new(200.0, 200.0),
            value: 5,
            life: 0.5,
            max_life: 0.8,
        });
        assert_eq!(build_scene(&world).vertices.len(), base + 12);
    }
}
