//! Simulated LiDAR fan
//!
//! Rays are marched from the sensor origin in fixed steps. At each sample
//! the objects are tested in list order and the first box containing the
//! point ends the ray. When two boxes overlap at a sample the earlier one
//! in the list wins, even if the other is nearer along the ray.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::SimObject;
use crate::consts::*;
use crate::direction;

/// Fan geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayParams {
    pub ray_count: u32,
    /// Full opening angle (radians), centered on +x
    pub field_of_view: f32,
    pub max_range: f32,
}

impl Default for RayParams {
    fn default() -> Self {
        Self {
            ray_count: DEFAULT_RAY_COUNT,
            field_of_view: DEFAULT_FOV_DEG.to_radians(),
            max_range: DEFAULT_MAX_RANGE,
        }
    }
}

impl RayParams {
    /// Angle of ray `i`, evenly spread across the field of view
    pub fn ray_angle(&self, i: u32) -> f32 {
        if self.ray_count <= 1 {
            return 0.0;
        }
        let half = self.field_of_view / 2.0;
        -half + self.field_of_view * i as f32 / (self.ray_count - 1) as f32
    }

    /// Angular spacing between neighbouring rays
    pub fn angular_step(&self) -> f32 {
        if self.ray_count <= 1 {
            0.0
        } else {
            self.field_of_view / (self.ray_count - 1) as f32
        }
    }
}

/// Result of a single ray
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayHit {
    pub angle: f32,
    /// Where the ray stopped (hit point, or the end of its range)
    pub end: Vec2,
    pub distance: f32,
    /// Object that stopped the ray, `None` on a miss
    pub object_id: Option<u32>,
}

impl RayHit {
    pub fn is_hit(&self) -> bool {
        self.object_id.is_some()
    }
}

/// One full sweep of the fan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RayScan {
    pub hits: Vec<RayHit>,
    /// Distance to the closest hit this sweep
    pub min_distance: Option<f32>,
}

impl RayScan {
    pub fn hit_count(&self) -> usize {
        self.hits.iter().filter(|h| h.is_hit()).count()
    }

    /// Whether any ray stopped on `id`
    pub fn hits_object(&self, id: u32) -> bool {
        self.hits.iter().any(|h| h.object_id == Some(id))
    }
}

/// X position the primary sensor reports for `obj`.
///
/// Relay-tagged objects appear `spoof_offset` away from where they are.
#[inline]
pub fn sensed_x(obj: &SimObject, spoof_offset: f32) -> f32 {
    if obj.corrected_x.is_some() {
        obj.x + spoof_offset
    } else {
        obj.x
    }
}

/// Whether the sensor can see `obj` at all
#[inline]
pub fn is_detectable(obj: &SimObject) -> bool {
    !obj.hidden && !obj.flagged
}

#[inline]
fn contains(obj: &SimObject, spoof_offset: f32, p: Vec2) -> bool {
    let left = sensed_x(obj, spoof_offset);
    p.x >= left && p.x <= left + obj.width + HITBOX_SLACK && p.y >= obj.y && p.y <= obj.y + obj.height
}

/// March one ray; returns (distance, object id) of the first contact
fn march(origin: Vec2, dir: Vec2, objects: &[SimObject], max_range: f32, spoof_offset: f32) -> Option<(f32, u32)> {
    let steps = (max_range / RAY_STEP).ceil() as u32;
    for s in 1..=steps {
        let d = (s as f32 * RAY_STEP).min(max_range);
        let p = origin + dir * d;
        if let Some(obj) = objects
            .iter()
            .filter(|o| is_detectable(o))
            .find(|o| contains(o, spoof_offset, p))
        {
            return Some((d, obj.id));
        }
    }
    None
}

/// Cast the full fan against `objects`
pub fn cast_rays(origin: Vec2, objects: &[SimObject], params: &RayParams, spoof_offset: f32) -> RayScan {
    let mut hits = Vec::with_capacity(params.ray_count as usize);
    let mut min_distance: Option<f32> = None;

    for i in 0..params.ray_count {
        let angle = params.ray_angle(i);
        let dir = direction(angle);
        let hit = match march(origin, dir, objects, params.max_range, spoof_offset) {
            Some((distance, id)) => {
                min_distance = Some(min_distance.map_or(distance, |m| m.min(distance)));
                RayHit {
                    angle,
                    end: origin + dir * distance,
                    distance,
                    object_id: Some(id),
                }
            }
            None => RayHit {
                angle,
                end: origin + dir * params.max_range,
                distance: params.max_range,
                object_id: None,
            },
        };
        hits.push(hit);
    }

    RayScan { hits, min_distance }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::ObjectKind;

    fn origin() -> Vec2 {
        Vec2::new(SENSOR_X, SENSOR_Y)
    }

    fn ahead(x: f32) -> SimObject {
        SimObject::new(1, ObjectKind::Vehicle, x, SENSOR_Y - 14.0, 60.0, 28.0)
    }

    #[test]
    fn test_ray_angles_symmetric() {
        let params = RayParams::default();
        let first = params.ray_angle(0);
        let last = params.ray_angle(params.ray_count - 1);
        assert!((first + last).abs() < 1e-5);
        assert!((last - first - params.field_of_view).abs() < 1e-5);
    }

    #[test]
    fn test_object_ahead_is_hit_at_near_edge() {
        let params = RayParams::default();
        let scan = cast_rays(origin(), &[ahead(SENSOR_X + 150.0)], &params, 0.0);

        assert!(scan.hit_count() > 0);
        let d = scan.min_distance.expect("object ahead should be hit");
        let half_step = params.angular_step() / 2.0;
        let tolerance = 150.0 * (1.0 / half_step.cos() - 1.0) + RAY_STEP + 0.01;
        assert!((d - 150.0).abs() <= tolerance, "min distance {d}");
    }

    #[test]
    fn test_empty_scene_all_misses() {
        let params = RayParams::default();
        let scan = cast_rays(origin(), &[], &params, 0.0);
        assert_eq!(scan.hits.len(), params.ray_count as usize);
        assert_eq!(scan.hit_count(), 0);
        assert!(scan.min_distance.is_none());
        for h in &scan.hits {
            assert!((h.end.distance(origin()) - params.max_range).abs() < 1e-3);
        }
    }

    #[test]
    fn test_out_of_range_object_missed() {
        let params = RayParams::default();
        let scan = cast_rays(origin(), &[ahead(SENSOR_X + params.max_range + 20.0)], &params, 0.0);
        assert_eq!(scan.hit_count(), 0);
    }

    #[test]
    fn test_hidden_object_never_hit() {
        let mut obj = ahead(SENSOR_X + 100.0);
        obj.hidden = true;
        let scan = cast_rays(origin(), &[obj], &RayParams::default(), 0.0);
        assert!(!scan.hits_object(1));
        assert!(scan.min_distance.is_none());
    }

    #[test]
    fn test_flagged_object_never_hit() {
        let mut obj = ahead(SENSOR_X + 100.0);
        obj.flagged = true;
        let scan = cast_rays(origin(), &[obj], &RayParams::default(), 0.0);
        assert_eq!(scan.hit_count(), 0);
    }

    #[test]
    fn test_spoof_offset_shifts_relayed_object() {
        let params = RayParams::default();
        let mut obj = ahead(SENSOR_X + 100.0);
        obj.corrected_x = Some(obj.x);

        let honest = cast_rays(origin(), &[obj.clone()], &params, 0.0);
        let spoofed = cast_rays(origin(), &[obj], &params, RELAY_OFFSET_X);
        let d0 = honest.min_distance.unwrap();
        let d1 = spoofed.min_distance.unwrap();
        assert!((d1 - d0 - RELAY_OFFSET_X).abs() <= 2.0 * RAY_STEP);
    }

    #[test]
    fn test_first_listed_object_wins_on_overlap() {
        let params = RayParams {
            ray_count: 1,
            ..Default::default()
        };
        let far = SimObject::new(7, ObjectKind::Obstacle, SENSOR_X + 50.0, SENSOR_Y - 10.0, 40.0, 20.0);
        let near = SimObject::new(8, ObjectKind::Vehicle, SENSOR_X + 40.0, SENSOR_Y - 10.0, 60.0, 20.0);
        let scan = cast_rays(origin(), &[far, near], &params, 0.0);
        // `near` is reached first, at d=40
        assert_eq!(scan.hits[0].object_id, Some(8));

        let a = SimObject::new(7, ObjectKind::Obstacle, SENSOR_X + 40.0, SENSOR_Y - 10.0, 40.0, 20.0);
        let b = SimObject::new(8, ObjectKind::Vehicle, SENSOR_X + 40.0, SENSOR_Y - 10.0, 60.0, 20.0);
        let scan = cast_rays(origin(), &[a, b], &params, 0.0);
        assert_eq!(scan.hits[0].object_id, Some(7));
    }
}
