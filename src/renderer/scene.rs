//! Scene geometry: turns a `SimState` into a triangle list
//!
//! Read-only over the state. Coordinates are scene pixels; the pipeline maps
//! them to clip space.

use glam::Vec2;

use super::shapes::{circle, dashed_hline, line, rect, rect_outline};
use super::vertex::{Vertex, colors};
use crate::consts::*;
use crate::sim::{AttackMode, ObjectKind, SimObject, SimState, is_corrected, sensed_x, spoof_offset};

const GRID_SPACING: f32 = 50.0;

fn kind_color(kind: ObjectKind) -> [f32; 4] {
    match kind {
        ObjectKind::Pedestrian => colors::PEDESTRIAN,
        ObjectKind::Vehicle => colors::VEHICLE,
        ObjectKind::Obstacle => colors::OBSTACLE,
        ObjectKind::Phantom => colors::PHANTOM,
        ObjectKind::Noise => colors::NOISE,
    }
}

fn background(out: &mut Vec<Vertex>) {
    out.extend(rect(0.0, 0.0, VIEW_WIDTH, VIEW_HEIGHT, colors::BACKGROUND));

    let mut x = 0.0;
    while x <= VIEW_WIDTH {
        out.extend(rect(x, 0.0, 1.0, VIEW_HEIGHT, colors::GRID));
        x += GRID_SPACING;
    }
    let mut y = 0.0;
    while y <= VIEW_HEIGHT {
        out.extend(rect(0.0, y, VIEW_WIDTH, 1.0, colors::GRID));
        y += GRID_SPACING;
    }
}

/// Road with lane markings. `scroll` shifts the dashes so they move with the world.
fn road(out: &mut Vec<Vertex>, scroll: f32) {
    out.extend(rect(0.0, ROAD_TOP, VIEW_WIDTH, ROAD_BOTTOM - ROAD_TOP, colors::ROAD));
    out.extend(rect(0.0, ROAD_TOP, VIEW_WIDTH, 2.0, colors::LANE_MARK));
    out.extend(rect(0.0, ROAD_BOTTOM - 2.0, VIEW_WIDTH, 2.0, colors::LANE_MARK));

    let period = 40.0;
    let phase = scroll.rem_euclid(period);
    let mut lane_y = ROAD_TOP + LANE_WIDTH;
    while lane_y < ROAD_BOTTOM - 1.0 {
        out.extend(dashed_hline(-phase, VIEW_WIDTH, lane_y, 24.0, period - 24.0, 2.0, colors::LANE_MARK));
        lane_y += LANE_WIDTH;
    }
}

fn attack_overlays(out: &mut Vec<Vertex>, mode: AttackMode) {
    match mode {
        AttackMode::Hiding => out.extend(rect(
            KILL_ZONE_START,
            ROAD_TOP,
            KILL_ZONE_END - KILL_ZONE_START,
            ROAD_BOTTOM - ROAD_TOP,
            colors::KILL_ZONE,
        )),
        AttackMode::Saturation => out.extend(rect(
            SCAN_MIN_X,
            SCAN_MIN_Y,
            SCAN_MAX_X - SCAN_MIN_X,
            SCAN_MAX_Y - SCAN_MIN_Y,
            colors::SCAN_VOLUME,
        )),
        _ => {}
    }
}

fn rays(out: &mut Vec<Vertex>, state: &SimState) {
    let origin = state.ego.sensor_origin;
    for hit in &state.scan.hits {
        if hit.is_hit() {
            out.extend(line(origin, hit.end, 1.5, colors::RAY_HIT));
            out.extend(circle(hit.end, 2.5, colors::HIT_POINT, 8));
        } else {
            out.extend(line(origin, hit.end, 1.0, colors::RAY_MISS));
        }
    }
}

fn cross(out: &mut Vec<Vertex>, obj: &SimObject, x: f32) {
    let a = Vec2::new(x, obj.y);
    let b = Vec2::new(x + obj.width, obj.y + obj.height);
    out.extend(line(a, b, 2.0, colors::FLAG_CROSS));
    out.extend(line(Vec2::new(a.x, b.y), Vec2::new(b.x, a.y), 2.0, colors::FLAG_CROSS));
}

fn object(out: &mut Vec<Vertex>, obj: &SimObject, offset: f32, defense: bool) {
    let (w, h) = (obj.width, obj.height);

    if obj.hidden {
        // Present in the world, absent from the point cloud
        out.extend(rect_outline(obj.x, obj.y, w, h, 1.0, colors::HIDDEN_OUTLINE));
        return;
    }

    if obj.flagged {
        out.extend(rect(obj.x, obj.y, w, h, colors::FLAGGED));
        cross(out, obj, obj.x);
        return;
    }

    if let Some(true_x) = obj.corrected_x {
        if is_corrected(obj, defense) {
            out.extend(rect(true_x, obj.y, w, h, kind_color(obj.kind)));
            out.extend(rect_outline(true_x, obj.y, w, h, 2.0, colors::TRUE_POSITION));
            out.extend(rect_outline(true_x + RELAY_OFFSET_X, obj.y, w, h, 1.0, colors::SPOOFED_GHOST));
        } else {
            // What the sensor reports, plus where the object really is
            out.extend(rect(sensed_x(obj, offset), obj.y, w, h, kind_color(obj.kind)));
            out.extend(rect_outline(true_x, obj.y, w, h, 1.0, colors::SPOOFED_GHOST));
        }
        return;
    }

    out.extend(rect(obj.x, obj.y, w, h, kind_color(obj.kind)));
    if obj.revealed {
        out.extend(rect_outline(obj.x - 2.0, obj.y - 2.0, w + 4.0, h + 4.0, 2.0, colors::REVEALED_OUTLINE));
    }
}

fn ego(out: &mut Vec<Vertex>, state: &SimState) {
    out.extend(rect(EGO_X, EGO_Y, EGO_WIDTH, EGO_HEIGHT, colors::EGO));
    out.extend(circle(state.ego.sensor_origin, 4.0, colors::SENSOR, 12));
}

/// Build the full frame for `state`
pub fn build_scene(state: &SimState) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(4096);
    let scroll = state.ego.odometer;
    let offset = spoof_offset(state.attack_mode, state.defense_enabled);

    background(&mut out);
    road(&mut out, scroll);
    attack_overlays(&mut out, state.attack_mode);
    rays(&mut out, state);
    for obj in &state.objects {
        object(&mut out, obj, offset, state.defense_enabled);
    }
    ego(&mut out, state);
    out
}
