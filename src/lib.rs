//! LiDAR VSOC - LiDAR spoofing attacks and a cooperative sensor-fusion defense
//!
//! Core modules:
//! - `sim`: Deterministic simulation (world scroll, attacks, defense, raycasting, risk)
//! - `renderer`: Scene geometry and WebGPU rendering pipeline
//! - `settings`: Validated configuration boundary

pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{ConfigError, SimConfig};

use glam::Vec2;

/// Scene configuration constants
///
/// World units are pixels, mapped 1:1 to simulated meters. The origin is the
/// top-left corner of the view and y grows downward.
pub mod consts {
    /// Visible scene size
    pub const VIEW_WIDTH: f32 = 800.0;
    pub const VIEW_HEIGHT: f32 = 400.0;

    /// Roadway (three lanes of `LANE_WIDTH`)
    pub const ROAD_TOP: f32 = 140.0;
    pub const ROAD_BOTTOM: f32 = 260.0;
    pub const LANE_WIDTH: f32 = 40.0;

    /// Ego vehicle body; the sensor sits on the front bumper
    pub const EGO_X: f32 = 90.0;
    pub const EGO_Y: f32 = 186.0;
    pub const EGO_WIDTH: f32 = 60.0;
    pub const EGO_HEIGHT: f32 = 28.0;
    pub const SENSOR_X: f32 = EGO_X + EGO_WIDTH;
    pub const SENSOR_Y: f32 = EGO_Y + EGO_HEIGHT / 2.0;

    /// Vehicle speed in pixels per tick
    pub const DEFAULT_SPEED: f32 = 2.0;
    pub const MIN_SPEED: f32 = 0.0;
    pub const MAX_SPEED: f32 = 10.0;
    /// Speed multiplier while braking for an undefended phantom
    pub const PHANTOM_BRAKE_FACTOR: f32 = 0.3;
    /// Speed multiplier while the point cloud is saturated with noise
    pub const SATURATION_SLOW_FACTOR: f32 = 0.6;

    /// LiDAR fan
    pub const DEFAULT_RAY_COUNT: u32 = 24;
    pub const MIN_RAY_COUNT: u32 = 8;
    pub const MAX_RAY_COUNT: u32 = 90;
    pub const DEFAULT_FOV_DEG: f32 = 60.0;
    pub const MIN_FOV_DEG: f32 = 10.0;
    pub const MAX_FOV_DEG: f32 = 120.0;
    pub const DEFAULT_MAX_RANGE: f32 = 300.0;
    pub const MIN_RANGE: f32 = 100.0;
    pub const MAX_RANGE: f32 = 600.0;
    /// March step along each ray
    pub const RAY_STEP: f32 = 2.0;
    /// Extra width on the trailing side of every hitbox
    pub const HITBOX_SLACK: f32 = 4.0;

    /// Recycling: an object whose right edge passes this x respawns off the right edge
    pub const RECYCLE_THRESHOLD: f32 = -20.0;
    pub const RESPAWN_MARGIN: f32 = 40.0;
    pub const RESPAWN_JITTER: f32 = 300.0;

    /// Phantom injection point (ahead of the vehicle, in its lane)
    pub const PHANTOM_X: f32 = 380.0;
    pub const PHANTOM_Y: f32 = 186.0;
    pub const PHANTOM_WIDTH: f32 = 50.0;
    pub const PHANTOM_HEIGHT: f32 = 28.0;

    /// Hiding attack kill zone (x interval)
    pub const KILL_ZONE_START: f32 = 200.0;
    pub const KILL_ZONE_END: f32 = 420.0;

    /// Relay attack: offset between the reported and the true position
    pub const RELAY_OFFSET_X: f32 = 80.0;

    /// Saturation attack scan volume
    pub const NOISE_COUNT: usize = 15;
    pub const NOISE_SIZE: f32 = 4.0;
    pub const SCAN_MIN_X: f32 = SENSOR_X + 20.0;
    pub const SCAN_MAX_X: f32 = SENSOR_X + 320.0;
    pub const SCAN_MIN_Y: f32 = ROAD_TOP;
    pub const SCAN_MAX_Y: f32 = ROAD_BOTTOM;

    /// Risk scoring
    pub const SMOOTHING_FACTOR: f32 = 0.1;
    /// Metrics are re-targeted on every Nth tick
    pub const METRICS_INTERVAL: u64 = 10;
    /// Collision risk above this raises an alert
    pub const COLLISION_CRITICAL: f32 = 75.0;

    /// Event log capacity
    pub const MAX_LOG_ENTRIES: usize = 8;

    /// Nominal display refresh used to turn ticks into seconds
    pub const FRAMES_PER_SECOND: f32 = 60.0;
}

/// Unit direction for an angle measured from +x (y down)
#[inline]
pub fn direction(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Simulated seconds for a tick count
#[inline]
pub fn ticks_to_secs(ticks: u64) -> f32 {
    ticks as f32 / consts::FRAMES_PER_SECOND
}
