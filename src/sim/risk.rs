//! Risk scoring: detection confidence, collision risk and data integrity
//!
//! Targets come from a fixed table over (attack mode, defense). The gauges
//! chase their targets with a first-order low-pass filter so they sweep
//! instead of jumping.

use serde::{Deserialize, Serialize};

use super::attack::AttackMode;
use crate::consts::SMOOTHING_FACTOR;

/// The three HUD gauges, each in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Confidence that the point cloud reflects reality
    pub detection_rate: f32,
    pub collision_risk: f32,
    /// Trust in the sensor data stream
    pub integrity_score: f32,
}

impl RiskMetrics {
    /// Values shown before the first update and after a reset
    pub const fn baseline() -> Self {
        Self {
            detection_rate: 98.0,
            collision_risk: 5.0,
            integrity_score: 100.0,
        }
    }

    pub fn clamped(self) -> Self {
        Self {
            detection_rate: self.detection_rate.clamp(0.0, 100.0),
            collision_risk: self.collision_risk.clamp(0.0, 100.0),
            integrity_score: self.integrity_score.clamp(0.0, 100.0),
        }
    }
}

impl Default for RiskMetrics {
    fn default() -> Self {
        Self::baseline()
    }
}

/// Collision risk with no attack: 5 when the road ahead is clear, up to 25
/// as the nearest return closes in.
pub fn baseline_collision_risk(min_distance: Option<f32>, max_range: f32) -> f32 {
    match min_distance {
        Some(d) if max_range > 0.0 => {
            let closeness = (1.0 - d / max_range).clamp(0.0, 1.0);
            5.0 + 20.0 * closeness
        }
        _ => 5.0,
    }
}

/// Where the gauges are heading for the given inputs
pub fn target_metrics(
    mode: AttackMode,
    defense_enabled: bool,
    min_distance: Option<f32>,
    max_range: f32,
) -> RiskMetrics {
    let (detection_rate, collision_risk, integrity_score) = match (mode, defense_enabled) {
        (AttackMode::None, _) => (98.0, baseline_collision_risk(min_distance, max_range), 100.0),
        (AttackMode::Phantom, false) => (60.0, 85.0, 35.0),
        (AttackMode::Phantom, true) => (95.0, 8.0, 97.0),
        (AttackMode::Hiding, false) => (45.0, 95.0, 30.0),
        (AttackMode::Hiding, true) => (88.0, 35.0, 96.0),
        (AttackMode::Relay, false) => (70.0, 80.0, 25.0),
        (AttackMode::Relay, true) => (92.0, 20.0, 98.0),
        (AttackMode::Saturation, false) => (30.0, 65.0, 20.0),
        (AttackMode::Saturation, true) => (88.0, 15.0, 95.0),
    };
    RiskMetrics {
        detection_rate,
        collision_risk,
        integrity_score,
    }
}

#[inline]
fn smooth(prev: f32, target: f32) -> f32 {
    prev + (target - prev) * SMOOTHING_FACTOR
}

/// One low-pass step toward `target`
pub fn update_metrics(prev: RiskMetrics, target: RiskMetrics) -> RiskMetrics {
    RiskMetrics {
        detection_rate: smooth(prev.detection_rate, target.detection_rate),
        collision_risk: smooth(prev.collision_risk, target.collision_risk),
        integrity_score: smooth(prev.integrity_score, target.integrity_score),
    }
    .clamped()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATTACKS: [AttackMode; 4] = [
        AttackMode::Phantom,
        AttackMode::Hiding,
        AttackMode::Relay,
        AttackMode::Saturation,
    ];

    #[test]
    fn test_defense_lowers_risk_and_raises_integrity() {
        for mode in ATTACKS {
            let open = target_metrics(mode, false, Some(100.0), 300.0);
            let guarded = target_metrics(mode, true, Some(100.0), 300.0);
            assert!(guarded.collision_risk < open.collision_risk, "{mode:?}");
            assert!(guarded.integrity_score > open.integrity_score, "{mode:?}");
        }
    }

    #[test]
    fn test_table_bands() {
        let t = |m, d| target_metrics(m, d, None, 300.0);
        assert!(t(AttackMode::Phantom, false).collision_risk >= 80.0);
        assert!(t(AttackMode::Phantom, true).collision_risk <= 10.0);
        assert!(t(AttackMode::Hiding, false).collision_risk >= 90.0);
        assert!(t(AttackMode::Hiding, true).collision_risk <= 40.0);
        assert!(t(AttackMode::Relay, false).collision_risk >= 75.0);
        assert!(t(AttackMode::Relay, true).collision_risk <= 25.0);
        assert!(t(AttackMode::Saturation, false).collision_risk >= 60.0);
        assert!(t(AttackMode::Saturation, true).collision_risk <= 20.0);
        for mode in ATTACKS {
            assert!(t(mode, false).integrity_score <= 40.0);
            assert!(t(mode, true).integrity_score >= 95.0);
        }
    }

    #[test]
    fn test_no_attack_risk_grows_with_proximity() {
        let far = target_metrics(AttackMode::None, false, Some(280.0), 300.0);
        let near = target_metrics(AttackMode::None, false, Some(20.0), 300.0);
        let clear = target_metrics(AttackMode::None, false, None, 300.0);
        assert!(near.collision_risk > far.collision_risk);
        assert!(far.collision_risk >= clear.collision_risk);
        assert!(near.collision_risk <= 25.0);
        assert_eq!(near.integrity_score, 100.0);
    }

    #[test]
    fn test_smoothing_converges_monotonically() {
        let target = target_metrics(AttackMode::Hiding, false, None, 300.0);
        let mut m = RiskMetrics::baseline();
        let mut prev_gap = (target.collision_risk - m.collision_risk).abs();
        for _ in 0..200 {
            m = update_metrics(m, target);
            let gap = (target.collision_risk - m.collision_risk).abs();
            assert!(gap <= prev_gap);
            assert!(m.collision_risk <= target.collision_risk);
            prev_gap = gap;
        }
        assert!((m.collision_risk - target.collision_risk).abs() < 0.01);
        assert!((m.integrity_score - target.integrity_score).abs() < 0.01);
        assert!((m.detection_rate - target.detection_rate).abs() < 0.01);
    }

    #[test]
    fn test_update_is_not_a_snap() {
        let target = target_metrics(AttackMode::Phantom, false, None, 300.0);
        let next = update_metrics(RiskMetrics::baseline(), target);
        assert!(next.collision_risk > RiskMetrics::baseline().collision_risk);
        assert!(next.collision_risk < target.collision_risk);
    }

    #[test]
    fn test_metrics_clamped() {
        let wild = RiskMetrics {
            detection_rate: 180.0,
            collision_risk: -40.0,
            integrity_score: 101.0,
        };
        let m = update_metrics(wild, wild);
        assert_eq!(m.detection_rate, 100.0);
        assert_eq!(m.collision_risk, 0.0);
        assert_eq!(m.integrity_score, 100.0);
    }
}
