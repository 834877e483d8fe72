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

/// Colors for scene elements
pub mod colors {
    /// Bars around the letterboxed scene
    pub const LETTERBOX: [f32; 4] = [0.01, 0.015, 0.025, 1.0];
    pub const BACKGROUND: [f32; 4] = [0.03, 0.05, 0.08, 1.0];
    pub const GRID: [f32; 4] = [0.1, 0.16, 0.22, 1.0];
    pub const ROAD: [f32; 4] = [0.14, 0.15, 0.17, 1.0];
    pub const LANE_MARK: [f32; 4] = [0.85, 0.85, 0.75, 0.8];
    pub const EGO: [f32; 4] = [0.2, 0.6, 1.0, 1.0];
    pub const SENSOR: [f32; 4] = [0.3, 1.0, 0.9, 1.0];
    pub const PEDESTRIAN: [f32; 4] = [1.0, 0.8, 0.3, 1.0];
    pub const VEHICLE: [f32; 4] = [0.75, 0.75, 0.8, 1.0];
    pub const OBSTACLE: [f32; 4] = [0.8, 0.5, 0.3, 1.0];
    pub const PHANTOM: [f32; 4] = [1.0, 0.2, 0.5, 0.85];
    pub const NOISE: [f32; 4] = [1.0, 0.35, 0.1, 0.9];
    pub const FLAGGED: [f32; 4] = [0.6, 0.6, 0.6, 0.35];
    pub const FLAG_CROSS: [f32; 4] = [1.0, 0.25, 0.25, 0.9];
    pub const HIDDEN_OUTLINE: [f32; 4] = [0.9, 0.2, 0.2, 0.5];
    pub const REVEALED_OUTLINE: [f32; 4] = [0.3, 1.0, 0.5, 0.9];
    pub const TRUE_POSITION: [f32; 4] = [0.3, 1.0, 0.5, 0.7];
    pub const SPOOFED_GHOST: [f32; 4] = [1.0, 0.5, 0.1, 0.6];
    pub const RAY_MISS: [f32; 4] = [0.2, 0.9, 0.4, 0.18];
    pub const RAY_HIT: [f32; 4] = [1.0, 0.3, 0.3, 0.6];
    pub const HIT_POINT: [f32; 4] = [1.0, 0.9, 0.2, 1.0];
    pub const KILL_ZONE: [f32; 4] = [0.9, 0.1, 0.1, 0.1];
    pub const SCAN_VOLUME: [f32; 4] = [1.0, 0.5, 0.1, 0.07];
}
