//! Rendering module
//!
//! `scene` and `hud` are pure functions of the simulation state; `pipeline`
//! uploads the resulting triangles to WebGPU.

pub mod hud;
pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use hud::{gauge_class, hud_lines};
pub use pipeline::RenderState;
pub use scene::build_scene;
pub use vertex::Vertex;
