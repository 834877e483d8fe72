//! Simulation configuration
//!
//! Everything the UI controls feed into the core passes through here. Values
//! are validated (non-finite numbers rejected) and clamped into range before
//! the simulation sees them.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::{AttackMode, SimState};

/// Errors at the configuration boundary
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f32 },
    #[error("Unknown attack mode: {0}")]
    UnknownAttackMode(String),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used by the configuration boundary.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// User-facing simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub attack_mode: AttackMode,
    pub defense_enabled: bool,
    /// Vehicle speed (pixels per tick)
    pub speed: f32,
    /// LiDAR range (pixels)
    pub max_range: f32,
    pub ray_count: u32,
    /// Full fan opening in degrees
    pub field_of_view_deg: f32,
    /// RNG seed for respawn jitter and noise placement
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            attack_mode: AttackMode::None,
            defense_enabled: false,
            speed: DEFAULT_SPEED,
            max_range: DEFAULT_MAX_RANGE,
            ray_count: DEFAULT_RAY_COUNT,
            field_of_view_deg: DEFAULT_FOV_DEG,
            seed: 0x5EED_1DA2,
        }
    }
}

impl SimConfig {
    /// Parse from JSON; missing fields take defaults. The result is validated and clamped.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config.clamped())
    }

    /// Reject values no clamp can repair
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("speed", self.speed),
            ("max_range", self.max_range),
            ("field_of_view_deg", self.field_of_view_deg),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }
        Ok(())
    }

    /// Copy with every numeric field pulled into its allowed range
    pub fn clamped(&self) -> Self {
        Self {
            speed: self.speed.clamp(MIN_SPEED, MAX_SPEED),
            max_range: self.max_range.clamp(MIN_RANGE, MAX_RANGE),
            ray_count: self.ray_count.clamp(MIN_RAY_COUNT, MAX_RAY_COUNT),
            field_of_view_deg: self.field_of_view_deg.clamp(MIN_FOV_DEG, MAX_FOV_DEG),
            ..self.clone()
        }
    }

    /// Set the attack mode from a UI name
    pub fn set_attack_mode_str(&mut self, name: &str) -> Result<()> {
        self.attack_mode =
            AttackMode::from_str(name).ok_or_else(|| ConfigError::UnknownAttackMode(name.to_string()))?;
        Ok(())
    }

    /// Set speed from a UI control, rejecting non-finite input
    pub fn set_speed(&mut self, speed: f32) -> Result<()> {
        if !speed.is_finite() {
            return Err(ConfigError::NonFinite { field: "speed", value: speed });
        }
        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        Ok(())
    }

    /// Set sensor range from a UI control, rejecting non-finite input
    pub fn set_max_range(&mut self, range: f32) -> Result<()> {
        if !range.is_finite() {
            return Err(ConfigError::NonFinite { field: "max_range", value: range });
        }
        self.max_range = range.clamp(MIN_RANGE, MAX_RANGE);
        Ok(())
    }

    /// Push this configuration into a running simulation
    pub fn apply(&self, sim: &mut SimState) {
        let config = self.clamped();
        sim.ego.set_speed(config.speed);
        sim.set_max_range(config.max_range);
        sim.sensor.ray_count = config.ray_count;
        sim.set_field_of_view(config.field_of_view_deg);
        sim.set_defense(config.defense_enabled);
        sim.set_attack_mode(config.attack_mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_in_range() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.clamped(), config);
    }

    #[test]
    fn test_from_json_partial() {
        let config = SimConfig::from_json(r#"{"attack_mode":"hiding","speed":4.5}"#).unwrap();
        assert_eq!(config.attack_mode, AttackMode::Hiding);
        assert_eq!(config.speed, 4.5);
        assert_eq!(config.max_range, DEFAULT_MAX_RANGE);
    }

    #[test]
    fn test_from_json_clamps() {
        let config = SimConfig::from_json(r#"{"speed":99,"max_range":5,"ray_count":1000}"#).unwrap();
        assert_eq!(config.speed, MAX_SPEED);
        assert_eq!(config.max_range, MIN_RANGE);
        assert_eq!(config.ray_count, MAX_RAY_COUNT);
    }

    #[test]
    fn test_from_json_rejects_bad_mode() {
        let err = SimConfig::from_json(r#"{"attack_mode":"jamming"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut config = SimConfig::default();
        assert!(matches!(
            config.set_speed(f32::INFINITY),
            Err(ConfigError::NonFinite { field: "speed", .. })
        ));
        assert_eq!(config.speed, DEFAULT_SPEED);

        config.max_range = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_attack_mode_by_name() {
        let mut config = SimConfig::default();
        config.set_attack_mode_str("relay").unwrap();
        assert_eq!(config.attack_mode, AttackMode::Relay);
        assert!(matches!(
            config.set_attack_mode_str("emp"),
            Err(ConfigError::UnknownAttackMode(_))
        ));
    }

    #[test]
    fn test_apply_to_state() {
        let config = SimConfig {
            attack_mode: AttackMode::Phantom,
            defense_enabled: true,
            speed: 6.0,
            max_range: 450.0,
            ray_count: 30,
            ..Default::default()
        };
        let mut sim = SimState::new(config.seed);
        config.apply(&mut sim);
        assert_eq!(sim.attack_mode, AttackMode::Phantom);
        assert!(sim.defense_enabled);
        assert_eq!(sim.ego.base_speed, 6.0);
        assert_eq!(sim.sensor.max_range, 450.0);
        assert_eq!(sim.sensor.ray_count, 30);
    }

    #[test]
    fn test_apply_skips_non_finite_fov() {
        let mut sim = SimState::new(1);
        let before = sim.sensor.field_of_view;
        let config = SimConfig {
            field_of_view_deg: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        config.apply(&mut sim);
        assert_eq!(sim.sensor.field_of_view, before);
        assert!(sim.sensor.ray_angle(0).is_finite());
    }
}
