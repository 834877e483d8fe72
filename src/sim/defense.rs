//! VSOC defense layer: cooperative sensor fusion against LiDAR attacks
//!
//! Cross-checks each return against the cloud-side fused picture:
//! - phantom returns have no corroborating signal and are flagged
//! - noise returns are flagged as filtered interference
//! - hidden real objects are revealed from the auxiliary (V2X) feed
//! - relayed objects keep their recorded true position (`corrected_x`)
//!
//! Flagged objects stay in the list for display but the ray caster ignores
//! them, so they never feed collision risk.

use super::state::{ObjectKind, SimObject};

/// Apply the defense. Identity when disabled.
pub fn apply_defense(mut objects: Vec<SimObject>, enabled: bool) -> Vec<SimObject> {
    if !enabled {
        return objects;
    }

    for obj in &mut objects {
        match obj.kind {
            ObjectKind::Phantom | ObjectKind::Noise => {
                obj.flagged = true;
            }
            _ => {
                if obj.hidden {
                    obj.hidden = false;
                    obj.revealed = true;
                }
            }
        }
    }
    objects
}

/// Whether the defense knows this object's true position despite a relay
#[inline]
pub fn is_corrected(obj: &SimObject, enabled: bool) -> bool {
    enabled && obj.corrected_x.is_some()
}
