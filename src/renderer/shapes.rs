//! Shape generation for 2D primitives
//!
//! Everything is emitted as a triangle list in world coordinates
//! (origin top-left, y down). Callers append into one vertex buffer.

use glam::Vec2;
use std::f32::consts::{PI, TAU};

use super::vertex::Vertex;
use crate::theme::Color;

/// Default segment count for full circles
pub const CIRCLE_SEGMENTS: u32 = 20;

/// Same color with a different alpha
pub fn with_alpha(color: Color, alpha: f32) -> Color {
    [color[0], color[1], color[2], color[3] * alpha]
}

/// Linear blend between two colors
pub fn mix(a: Color, b: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

pub fn triangle(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, color: Color) {
    out.push(Vertex::new(a.x, a.y, color));
    out.push(Vertex::new(b.x, b.y, color));
    out.push(Vertex::new(c.x, c.y, color));
}

/// Quad from four corners in order
pub fn quad(out: &mut Vec<Vertex>, corners: [Vec2; 4], color: Color) {
    triangle(out, corners[0], corners[1], corners[2], color);
    triangle(out, corners[0], corners[2], corners[3], color);
}

pub fn rect(out: &mut Vec<Vertex>, x: f32, y: f32, w: f32, h: f32, color: Color) {
    gradient_rect(out, x, y, w, h, color, color);
}

/// Vertical gradient, `top` color at y and `bottom` at y + h
pub fn gradient_rect(
    out: &mut Vec<Vertex>,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    top: Color,
    bottom: Color,
) {
    if w <= 0.0 || h <= 0.0 {
        return;
    }
    let (x2, y2) = (x + w, y + h);
    out.push(Vertex::new(x, y, top));
    out.push(Vertex::new(x2, y, top));
    out.push(Vertex::new(x2, y2, bottom));
    out.push(Vertex::new(x, y, top));
    out.push(Vertex::new(x2, y2, bottom));
    out.push(Vertex::new(x, y2, bottom));
}

/// Filled circle sector between two angles
pub fn sector(
    out: &mut Vec<Vertex>,
    center: Vec2,
    radius: f32,
    start: f32,
    end: f32,
    segments: u32,
    color: Color,
) {
    ellipse_sector(out, center, Vec2::splat(radius), start, end, segments, color);
}

fn ellipse_sector(
    out: &mut Vec<Vertex>,
    center: Vec2,
    radii: Vec2,
    start: f32,
    end: f32,
    segments: u32,
    color: Color,
) {
    let segments = segments.max(1);
    let step = (end - start) / segments as f32;
    for i in 0..segments {
        let a1 = start + step * i as f32;
        let a2 = a1 + step;
        let p1 = center + Vec2::new(a1.cos() * radii.x, a1.sin() * radii.y);
        let p2 = center + Vec2::new(a2.cos() * radii.x, a2.sin() * radii.y);
        triangle(out, center, p1, p2, color);
    }
}

pub fn circle(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: Color) {
    sector(out, center, radius, 0.0, TAU, CIRCLE_SEGMENTS, color);
}

pub fn ellipse(out: &mut Vec<Vertex>, center: Vec2, rx: f32, ry: f32, color: Color) {
    ellipse_sector(out, center, Vec2::new(rx, ry), 0.0, TAU, CIRCLE_SEGMENTS, color);
}

/// Annulus, used for glows and rings
pub fn ring(out: &mut Vec<Vertex>, center: Vec2, inner: f32, outer: f32, color: Color) {
    let segments = CIRCLE_SEGMENTS * 2;
    let step = TAU / segments as f32;
    for i in 0..segments {
        let a1 = step * i as f32;
        let a2 = a1 + step;
        let (d1, d2) = (Vec2::from_angle(a1), Vec2::from_angle(a2));
        quad(
            out,
            [
                center + d1 * inner,
                center + d1 * outer,
                center + d2 * outer,
                center + d2 * inner,
            ],
            color,
        );
    }
}

/// Rectangle with rounded corners; the radius is capped at half the short side
pub fn rounded_rect(out: &mut Vec<Vertex>, x: f32, y: f32, w: f32, h: f32, r: f32, color: Color) {
    if w <= 0.0 || h <= 0.0 {
        return;
    }
    let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
    if r <= 0.5 {
        rect(out, x, y, w, h, color);
        return;
    }

    // Cross of three rects
    rect(out, x + r, y, w - 2.0 * r, h, color);
    rect(out, x, y + r, r, h - 2.0 * r, color);
    rect(out, x + w - r, y + r, r, h - 2.0 * r, color);

    // Corners (angles measured with y down)
    let corner_segments = 5;
    sector(out, Vec2::new(x + r, y + r), r, PI, 1.5 * PI, corner_segments, color);
    sector(out, Vec2::new(x + w - r, y + r), r, 1.5 * PI, TAU, corner_segments, color);
    sector(out, Vec2::new(x + w - r, y + h - r), r, 0.0, 0.5 * PI, corner_segments, color);
    sector(out, Vec2::new(x + r, y + h - r), r, 0.5 * PI, PI, corner_segments, color);
}

/// Thick line segment as a quad
pub fn line(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, width: f32, color: Color) {
    let dir = (b - a).normalize_or_zero();
    let perp = Vec2::new(-dir.y, dir.x) * (width / 2.0);
    quad(out, [a + perp, b + perp, b - perp, a - perp], color);
}

/// Offset a run of already-emitted vertices
pub fn translate(vertices: &mut [Vertex], offset: Vec2) {
    for v in vertices {
        v.position[0] += offset.x;
        v.position[1] += offset.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = [1.0, 0.0, 0.0, 1.0];

    fn bounds(vertices: &[Vertex]) -> (Vec2, Vec2) {
        let mut min = Vec2::splat(f32::MAX);
        let mut max = Vec2::splat(f32::MIN);
        for v in vertices {
            let p = Vec2::from(v.position);
            min = min.min(p);
            max = max.max(p);
        }
        (min, max)
    }

    #[test]
    fn test_rect_is_two_triangles() {
        let mut out = Vec::new();
        rect(&mut out, 10.0, 20.0, 30.0, 40.0, RED);
        assert_eq!(out.len(), 6);
        let (min, max) = bounds(&out);
        assert_eq!(min, Vec2::new(10.0, 20.0));
        assert_eq!(max, Vec2::new(40.0, 60.0));
    }

    #[test]
    fn test_degenerate_rect_emits_nothing() {
        let mut out = Vec::new();
        rect(&mut out, 0.0, 0.0, 0.0, 10.0, RED);
        rounded_rect(&mut out, 0.0, 0.0, 10.0, -1.0, 3.0, RED);
        assert!(out.is_empty());
    }

    #[test]
    fn test_rounded_rect_stays_in_bounds() {
        let mut out = Vec::new();
        rounded_rect(&mut out, 0.0, 0.0, 54.0, 30.0, 16.0, RED);
        assert_eq!(out.len() % 3, 0);
        let (min, max) = bounds(&out);
        assert!(min.x >= -1e-3 && min.y >= -1e-3);
        assert!(max.x <= 54.0 + 1e-3 && max.y <= 30.0 + 1e-3);
    }

    #[test]
    fn test_circle_vertex_count() {
        let mut out = Vec::new();
        circle(&mut out, Vec2::ZERO, 5.0, RED);
        assert_eq!(out.len(), CIRCLE_SEGMENTS as usize * 3);
        let (min, max) = bounds(&out);
        assert!((max.x - 5.0).abs() < 1e-3);
        assert!((min.y + 5.0).abs() < 0.1);
    }

    #[test]
    fn test_mix_and_alpha() {
        let blue = [0.0, 0.0, 1.0, 1.0];
        assert_eq!(mix(RED, blue, 0.5), [0.5, 0.0, 0.5, 1.0]);
        assert_eq!(with_alpha(RED, 0.25)[3], 0.25);
    }
}
