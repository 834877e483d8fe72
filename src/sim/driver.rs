//! Frame driver: Stopped/Running state machine around the tick
//!
//! The platform layer calls [`FrameDriver::frame`] once per display refresh.
//! Scheduling the next refresh (and cancelling it) is the platform's job;
//! the driver only decides whether a frame advances the simulation.

use serde::{Deserialize, Serialize};

use super::events::Severity;
use super::state::SimState;
use super::tick::tick;
use crate::settings::{self, SimConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverState {
    Stopped,
    Running,
}

/// Owns the simulation state; the single writer per tick
#[derive(Debug, Clone)]
pub struct FrameDriver {
    sim: SimState,
}

impl FrameDriver {
    /// Build a stopped driver from a configuration. Non-finite values are
    /// rejected before anything reaches the simulation.
    pub fn new(config: &SimConfig) -> settings::Result<Self> {
        config.validate()?;
        let mut sim = SimState::new(config.seed);
        config.apply(&mut sim);
        Ok(Self { sim })
    }

    pub fn from_state(sim: SimState) -> Self {
        Self { sim }
    }

    pub fn state(&self) -> DriverState {
        if self.sim.clock.running {
            DriverState::Running
        } else {
            DriverState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == DriverState::Running
    }

    /// Stopped -> Running. Returns false if already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.sim.clock.running = true;
        let tick = self.sim.clock.ticks;
        self.sim.log.push(tick, Severity::Info, "Simulation started");
        log::info!("Simulation started at tick {}", tick);
        true
    }

    /// Running -> Stopped. Returns false if already stopped.
    pub fn pause(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.sim.clock.running = false;
        let tick = self.sim.clock.ticks;
        self.sim.log.push(tick, Severity::Info, "Simulation paused");
        log::info!("Simulation paused at tick {}", tick);
        true
    }

    /// Force Stopped and restore the initial scene, metrics and empty log
    pub fn reset(&mut self) {
        self.sim.reset();
        log::info!("Simulation reset");
    }

    /// Called once per display refresh. Returns whether a tick ran.
    pub fn frame(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        tick(&mut self.sim);
        true
    }

    pub fn sim(&self) -> &SimState {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut SimState {
        &mut self.sim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_only_tick_while_running() {
        let mut driver = FrameDriver::new(&SimConfig::default()).unwrap();
        assert_eq!(driver.state(), DriverState::Stopped);
        assert!(!driver.frame());
        assert_eq!(driver.sim().clock.ticks, 0);

        assert!(driver.start());
        assert!(!driver.start());
        for _ in 0..3 {
            assert!(driver.frame());
        }
        assert_eq!(driver.sim().clock.ticks, 3);

        assert!(driver.pause());
        assert!(!driver.frame());
        assert_eq!(driver.sim().clock.ticks, 3);
    }

    #[test]
    fn test_reset_stops_the_driver() {
        let mut driver = FrameDriver::new(&SimConfig::default()).unwrap();
        driver.start();
        driver.frame();
        driver.reset();
        assert_eq!(driver.state(), DriverState::Stopped);
        assert_eq!(driver.sim().clock.ticks, 0);
        assert!(driver.sim().log.is_empty());
    }

    #[test]
    fn test_non_finite_config_is_rejected() {
        let config = SimConfig {
            field_of_view_deg: f32::NAN,
            ..Default::default()
        };
        let err = FrameDriver::new(&config).unwrap_err();
        assert!(matches!(
            err,
            settings::ConfigError::NonFinite { field: "field_of_view_deg", .. }
        ));
    }

    #[test]
    fn test_sensor_sees_ahead_with_configured_fov() {
        let config = SimConfig {
            field_of_view_deg: 30.0,
            ..Default::default()
        };
        let mut driver = FrameDriver::new(&config).unwrap();
        driver.start();
        driver.frame();
        let sensor = &driver.sim().sensor;
        assert!(sensor.field_of_view.is_finite());
        assert!((sensor.field_of_view - 30f32.to_radians()).abs() < 1e-6);
    }
}
