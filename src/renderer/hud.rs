//! HUD text derived from simulation state

use crate::sim::SimState;
use crate::ticks_to_secs;

/// Traffic-light class for a gauge (`good`, `warn`, `bad`)
pub fn gauge_class(value: f32, higher_is_better: bool) -> &'static str {
    let score = if higher_is_better { value } else { 100.0 - value };
    if score >= 70.0 {
        "good"
    } else if score >= 40.0 {
        "warn"
    } else {
        "bad"
    }
}

/// One line per HUD row, top to bottom
pub fn hud_lines(state: &SimState) -> Vec<String> {
    let m = &state.metrics;
    let nearest = match state.scan.min_distance {
        Some(d) => format!("{d:.0} m"),
        None => "clear".to_string(),
    };
    vec![
        format!(
            "t={:.1}s  attack: {}  VSOC: {}",
            ticks_to_secs(state.clock.ticks),
            state.attack_mode.as_str().to_uppercase(),
            if state.defense_enabled { "ON" } else { "OFF" }
        ),
        format!("Detection confidence: {:.0}%", m.detection_rate),
        format!("Collision risk: {:.0}%", m.collision_risk),
        format!("Data integrity: {:.0}%", m.integrity_score),
        format!(
            "Rays: {}/{} hit, nearest {}",
            state.scan.hit_count(),
            state.sensor.ray_count,
            nearest
        ),
    ]
}
