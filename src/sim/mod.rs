//! Deterministic simulation module
//!
//! All attack/defense logic lives here. This module must be pure and deterministic:
//! - One tick per frame, no wall-clock time
//! - Seeded RNG only
//! - Stable iteration order (by object ID)
//! - No rendering or platform dependencies

pub mod attack;
pub mod defense;
pub mod driver;
pub mod events;
pub mod raycast;
pub mod risk;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use attack::{AttackMode, advance_objects, apply_attack, in_kill_zone};
pub use defense::{apply_defense, is_corrected};
pub use driver::{DriverState, FrameDriver};
pub use events::{EventLog, LogEntry, Severity};
pub use raycast::{RayHit, RayParams, RayScan, cast_rays, sensed_x};
pub use risk::{RiskMetrics, target_metrics, update_metrics};
pub use snapshot::SimSnapshot;
pub use state::{
    EgoVehicle, ObjectKind, SimObject, SimState, SimulationClock, Spawner, initial_objects,
};
pub use tick::{spoof_offset, tick};
