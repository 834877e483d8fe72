//! Serializable view of the simulation for the HUD

use serde::Serialize;

use super::attack::AttackMode;
use super::events::LogEntry;
use super::risk::RiskMetrics;
use super::state::{ObjectKind, SimState};

#[derive(Debug, Clone, Serialize)]
pub struct SimSnapshot {
    pub tick: u64,
    pub running: bool,
    pub attack_mode: AttackMode,
    pub defense_enabled: bool,
    pub speed: f32,
    pub metrics: RiskMetrics,
    pub ray_hits: usize,
    pub min_distance: Option<f32>,
    pub real_objects: usize,
    pub phantoms: usize,
    pub noise: usize,
    pub hidden: usize,
    pub flagged: usize,
    /// Newest first
    pub log: Vec<LogEntry>,
}

impl SimSnapshot {
    pub fn capture(state: &SimState) -> Self {
        let objects = &state.objects;
        Self {
            tick: state.clock.ticks,
            running: state.clock.running,
            attack_mode: state.attack_mode,
            defense_enabled: state.defense_enabled,
            speed: state.ego.effective_speed(state.attack_mode, state.defense_enabled),
            metrics: state.metrics,
            ray_hits: state.scan.hit_count(),
            min_distance: state.scan.min_distance,
            real_objects: objects.iter().filter(|o| o.kind.is_real()).count(),
            phantoms: state.count_kind(ObjectKind::Phantom),
            noise: state.count_kind(ObjectKind::Noise),
            hidden: objects.iter().filter(|o| o.hidden).count(),
            flagged: objects.iter().filter(|o| o.flagged).count(),
            log: state.log.entries().cloned().collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tick::tick;

    #[test]
    fn test_snapshot_counts() {
        let mut state = SimState::new(8);
        state.set_defense(true);
        state.set_attack_mode(AttackMode::Saturation);
        tick(&mut state);
        let snap = SimSnapshot::capture(&state);
        assert_eq!(snap.tick, 1);
        assert_eq!(snap.noise, crate::consts::NOISE_COUNT);
        assert_eq!(snap.flagged, crate::consts::NOISE_COUNT);
        assert_eq!(snap.log.len(), state.log.len());
    }

    #[test]
    fn test_snapshot_json_uses_lowercase_modes() {
        let mut state = SimState::new(8);
        state.set_attack_mode(AttackMode::Relay);
        let json = SimSnapshot::capture(&state).to_json().unwrap();
        assert!(json.contains("\"attack_mode\":\"relay\""));
        assert!(json.contains("\"severity\":\"alert\""));
    }
}
