//! World scrolling and the attack mutator
//!
//! Both stages take the object list by value and hand it back, so no tick
//! aliases another tick's objects. The `Vec` allocation is reused in place.

use serde::{Deserialize, Serialize};

use super::state::{ObjectKind, SimObject, Spawner};
use crate::consts::*;

/// Active attack against the LiDAR sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackMode {
    #[default]
    None,
    /// Fabricated obstacle ahead of the vehicle
    Phantom,
    /// Real objects in the kill zone are erased from the point cloud
    Hiding,
    /// Returns are relayed with a delay, shifting reported positions
    Relay,
    /// Point cloud flooded with random returns
    Saturation,
}

impl AttackMode {
    pub const ALL: [AttackMode; 5] = [
        AttackMode::None,
        AttackMode::Phantom,
        AttackMode::Hiding,
        AttackMode::Relay,
        AttackMode::Saturation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttackMode::None => "none",
            AttackMode::Phantom => "phantom",
            AttackMode::Hiding => "hiding",
            AttackMode::Relay => "relay",
            AttackMode::Saturation => "saturation",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "off" => Some(AttackMode::None),
            "phantom" => Some(AttackMode::Phantom),
            "hiding" | "hide" => Some(AttackMode::Hiding),
            "relay" | "spoofing" => Some(AttackMode::Relay),
            "saturation" | "saturate" => Some(AttackMode::Saturation),
            _ => None,
        }
    }

    /// Human readable name for the event log
    pub fn description(&self) -> &'static str {
        match self {
            AttackMode::None => "no attack",
            AttackMode::Phantom => "phantom object injection",
            AttackMode::Hiding => "object hiding",
            AttackMode::Relay => "relay / position spoofing",
            AttackMode::Saturation => "sensor saturation",
        }
    }
}

/// Scroll the world left by `ego_speed`, clear per-tick flags and recycle
/// objects that left the view.
pub fn advance_objects(
    mut objects: Vec<SimObject>,
    ego_speed: f32,
    spawner: &mut Spawner,
) -> Vec<SimObject> {
    for obj in &mut objects {
        obj.x -= ego_speed;
        obj.clear_transient();

        if obj.right() < RECYCLE_THRESHOLD {
            obj.x = spawner.respawn_x();
            obj.hidden = false;
            log::debug!("Recycled {} #{} to x={:.0}", obj.kind.as_str(), obj.id, obj.x);
        }
    }
    objects
}

/// Apply the active attack. Artifacts belonging to any other mode are
/// removed in the same call.
pub fn apply_attack(
    mut objects: Vec<SimObject>,
    mode: AttackMode,
    spawner: &mut Spawner,
) -> Vec<SimObject> {
    if mode != AttackMode::Phantom {
        objects.retain(|o| o.kind != ObjectKind::Phantom);
    }
    // Noise is regenerated wholesale every tick, never carried over
    objects.retain(|o| o.kind != ObjectKind::Noise);
    if mode != AttackMode::Hiding {
        for obj in &mut objects {
            obj.hidden = false;
        }
    }

    match mode {
        AttackMode::None => {}
        AttackMode::Phantom => {
            if !objects.iter().any(|o| o.kind == ObjectKind::Phantom) {
                let phantom = spawner.phantom();
                log::debug!("Injected phantom #{} at x={:.0}", phantom.id, phantom.x);
                objects.push(phantom);
            }
        }
        AttackMode::Hiding => {
            for obj in objects.iter_mut().filter(|o| o.kind.is_real()) {
                obj.hidden = in_kill_zone(obj.x);
            }
        }
        AttackMode::Relay => {
            for obj in objects.iter_mut().filter(|o| o.kind.is_real()) {
                obj.corrected_x = Some(obj.x);
            }
        }
        AttackMode::Saturation => {
            objects.extend((0..NOISE_COUNT).map(|slot| spawner.noise(slot)));
        }
    }
    objects
}

#[inline]
pub fn in_kill_zone(x: f32) -> bool {
    (KILL_ZONE_START..=KILL_ZONE_END).contains(&x)
}
