//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors shared by every theme
pub mod colors {
    use crate::theme::{Color, hex, hexa};

    pub const WHITE: Color = [1.0, 1.0, 1.0, 1.0];
    pub const SHADOW: Color = hexa(0x000000, 0.35);
    pub const MUD: Color = hexa(0x3e2723, 0.7);
    pub const FLY: Color = hex(0x000000);
    pub const EYE: Color = hexa(0x000000, 0.8);
    pub const COIN: Color = hex(0xfacc15);
    pub const COIN_SHINE: Color = hex(0xfef08a);
    pub const BLEON: Color = hex(0x4ade80);
    pub const FAN: Color = hex(0x94a3b8);
    pub const FAN_BLADE: Color = hex(0x38bdf8);
    pub const HAY: Color = hex(0xd7b15a);
    pub const GLOW: Color = hexa(0xfde047, 0.35);
    pub const OVERLAY: Color = hexa(0x000000, 0.25);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_is_tight() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        let vertices = [Vertex::new(1.0, 2.0, colors::WHITE)];
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), 24);
    }
}
