//! One simulation step
//!
//! advance world -> attack mutator -> defense -> ray caster -> risk scorer.
//! Discrete events are derived by comparing object flags before and after.

use super::attack::{AttackMode, advance_objects, apply_attack};
use super::defense::apply_defense;
use super::events::Severity;
use super::raycast::cast_rays;
use super::risk::{target_metrics, update_metrics};
use super::state::{ObjectKind, SimObject, SimState};
use crate::consts::*;

/// Per-object flags remembered across one tick for event detection
#[derive(Debug, Clone, Copy)]
struct Seen {
    id: u32,
    hidden: bool,
    flagged: bool,
    revealed: bool,
}

fn snapshot_flags(objects: &[SimObject]) -> Vec<Seen> {
    objects
        .iter()
        .map(|o| Seen {
            id: o.id,
            hidden: o.hidden,
            flagged: o.flagged,
            revealed: o.revealed,
        })
        .collect()
}

fn previous<'a>(seen: &'a [Seen], id: u32) -> Option<&'a Seen> {
    seen.iter().find(|s| s.id == id)
}

/// Offset the primary sensor applies to relayed objects this tick
pub fn spoof_offset(mode: AttackMode, defense_enabled: bool) -> f32 {
    if mode == AttackMode::Relay && !defense_enabled {
        RELAY_OFFSET_X
    } else {
        0.0
    }
}

/// Advance the simulation by one frame
pub fn tick(state: &mut SimState) {
    state.clock.ticks += 1;
    let now = state.clock.ticks;
    let mode = state.attack_mode;
    let defense = state.defense_enabled;

    let seen = snapshot_flags(&state.objects);
    let speed = state.ego.effective_speed(mode, defense);
    state.ego.odometer += speed;

    let objects = std::mem::take(&mut state.objects);
    let objects = advance_objects(objects, speed, &mut state.spawner);
    let objects = apply_attack(objects, mode, &mut state.spawner);
    state.objects = apply_defense(objects, defense);

    report_transitions(state, &seen, now);

    state.scan = cast_rays(
        state.ego.sensor_origin,
        &state.objects,
        &state.sensor,
        spoof_offset(mode, defense),
    );

    if now.is_multiple_of(METRICS_INTERVAL) {
        let was_critical = state.metrics.collision_risk >= COLLISION_CRITICAL;
        let target = target_metrics(mode, defense, state.scan.min_distance, state.sensor.max_range);
        state.metrics = update_metrics(state.metrics, target);
        let is_critical = state.metrics.collision_risk >= COLLISION_CRITICAL;

        if is_critical && !was_critical {
            state.log.push(
                now,
                Severity::Alert,
                format!("Collision risk critical ({:.0}%)", state.metrics.collision_risk),
            );
        } else if was_critical && !is_critical {
            state.log.push(now, Severity::Success, "Collision risk back below critical");
        }
        log::debug!(
            "t={} detection={:.1} risk={:.1} integrity={:.1} hits={}",
            now,
            state.metrics.detection_rate,
            state.metrics.collision_risk,
            state.metrics.integrity_score,
            state.scan.hit_count()
        );
    }

    state.normalize_order();
}

fn report_transitions(state: &mut SimState, seen: &[Seen], now: u64) {
    let defense = state.defense_enabled;
    let mut events: Vec<(Severity, String)> = Vec::new();

    for obj in &state.objects {
        let before = previous(seen, obj.id);
        match obj.kind {
            ObjectKind::Phantom => {
                if before.is_none() && !defense {
                    events.push((
                        Severity::Alert,
                        format!("Obstacle #{} appeared {:.0}m ahead", obj.id, obj.x - SENSOR_X),
                    ));
                }
                if obj.flagged && !before.is_some_and(|b| b.flagged) {
                    events.push((
                        Severity::Success,
                        format!("VSOC rejected phantom #{}: no corroborating return", obj.id),
                    ));
                }
            }
            ObjectKind::Noise => {}
            _ => {
                let was_hidden = before.is_some_and(|b| b.hidden);
                let was_revealed = before.is_some_and(|b| b.revealed);
                if obj.hidden && !was_hidden {
                    events.push((
                        Severity::Alert,
                        format!("{} #{} vanished from point cloud", obj.kind.as_str(), obj.id),
                    ));
                }
                if obj.revealed && !was_revealed {
                    events.push((
                        Severity::Success,
                        format!("VSOC restored {} #{} from cooperative feed", obj.kind.as_str(), obj.id),
                    ));
                }
            }
        }
    }

    for (severity, message) in events {
        state.log.push(now, severity, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::initial_objects;

    #[test]
    fn test_tick_advances_clock_and_scrolls() {
        let mut state = SimState::new(12345);
        let x0 = state.objects[0].x;
        tick(&mut state);
        assert_eq!(state.clock.ticks, 1);
        assert!((state.objects[0].x - (x0 - DEFAULT_SPEED)).abs() < 1e-4);
        assert_eq!(state.scan.hits.len(), state.sensor.ray_count as usize);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut a = SimState::new(99999);
        let mut b = SimState::new(99999);
        for i in 0..300 {
            let mode = AttackMode::ALL[(i / 60) % AttackMode::ALL.len()];
            a.set_attack_mode(mode);
            b.set_attack_mode(mode);
            tick(&mut a);
            tick(&mut b);
        }
        assert_eq!(a.objects, b.objects);
        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.scan, b.scan);
    }

    #[test]
    fn test_metrics_only_move_on_interval() {
        let mut state = SimState::new(1);
        state.set_attack_mode(AttackMode::Phantom);
        for _ in 0..METRICS_INTERVAL - 1 {
            tick(&mut state);
        }
        assert_eq!(state.metrics.collision_risk, 5.0);
        tick(&mut state);
        assert!(state.metrics.collision_risk > 5.0);
    }

    #[test]
    fn test_saturation_keeps_noise_count() {
        let mut state = SimState::new(3);
        state.set_attack_mode(AttackMode::Saturation);
        for _ in 0..25 {
            tick(&mut state);
            assert_eq!(state.count_kind(ObjectKind::Noise), NOISE_COUNT);
        }
        state.set_attack_mode(AttackMode::None);
        tick(&mut state);
        assert_eq!(state.count_kind(ObjectKind::Noise), 0);
    }

    #[test]
    fn test_relay_spoofs_only_without_defense() {
        assert_eq!(spoof_offset(AttackMode::Relay, false), RELAY_OFFSET_X);
        assert_eq!(spoof_offset(AttackMode::Relay, true), 0.0);
        assert_eq!(spoof_offset(AttackMode::Phantom, false), 0.0);
    }

    #[test]
    fn test_hidden_object_logged_once() {
        let obj = SimObject::new(1, ObjectKind::Pedestrian, 300.0, 186.0, 14.0, 28.0);
        let mut state = SimState::with_objects(5, vec![obj]);
        state.ego.set_speed(0.0);
        state.set_attack_mode(AttackMode::Hiding);
        let logged = state.log.len();
        for _ in 0..5 {
            tick(&mut state);
        }
        assert_eq!(state.log.len(), logged + 1);
        assert!(state.log.latest().is_some_and(|e| e.message.contains("vanished")));
    }

    #[test]
    fn test_defense_rejection_logged() {
        let mut state = SimState::with_objects(5, initial_objects());
        state.set_defense(true);
        state.set_attack_mode(AttackMode::Phantom);
        tick(&mut state);
        assert!(state.log.entries().any(|e| e.message.contains("rejected phantom")));
    }

    #[test]
    fn test_long_saturation_does_not_consume_ids() {
        let mut state = SimState::new(3);
        state.set_attack_mode(AttackMode::Saturation);
        for _ in 0..2000 {
            tick(&mut state);
        }
        let max_id = state.objects.iter().map(|o| o.id).max().unwrap();
        assert!(max_id <= 4 + NOISE_COUNT as u32);
    }

    #[test]
    fn test_odometer_follows_braking() {
        let mut state = SimState::new(9);
        state.set_attack_mode(AttackMode::Phantom);
        let x0 = state.objects[0].x;
        for _ in 0..10 {
            tick(&mut state);
        }
        let expected = 10.0 * DEFAULT_SPEED * PHANTOM_BRAKE_FACTOR;
        assert!((state.ego.odometer - expected).abs() < 1e-3);
        assert!((x0 - state.object(1).unwrap().x - state.ego.odometer).abs() < 1e-3);

        state.reset();
        assert_eq!(state.ego.odometer, 0.0);
    }
}
