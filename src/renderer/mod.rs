//! WebGPU rendering module
//!
//! The scene is tessellated on the CPU into flat-colored triangles in world
//! coordinates; the pipeline letterboxes them into the canvas.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderState, letterbox_scale, world_to_ndc};
pub use scene::{Scene, build_scene, shake_offset};
pub use vertex::Vertex;
