//! Simulation state and core world types
//!
//! Everything a tick reads or writes lives in [`SimState`]; subsystems get it
//! by `&mut` from the frame driver, never through globals.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::attack::AttackMode;
use super::events::{EventLog, Severity};
use super::raycast::{RayParams, RayScan};
use super::risk::RiskMetrics;
use crate::consts::*;

/// What an object is (or claims to be)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Pedestrian,
    Vehicle,
    Obstacle,
    /// Fabricated return injected by the phantom attack
    Phantom,
    /// Interference injected by the saturation attack
    Noise,
}

impl ObjectKind {
    /// Physically present objects (as opposed to attack artifacts)
    pub fn is_real(&self) -> bool {
        !matches!(self, ObjectKind::Phantom | ObjectKind::Noise)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Pedestrian => "pedestrian",
            ObjectKind::Vehicle => "vehicle",
            ObjectKind::Obstacle => "obstacle",
            ObjectKind::Phantom => "phantom",
            ObjectKind::Noise => "noise",
        }
    }
}

/// An axis-aligned object in the scene (position is the top-left corner)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimObject {
    pub id: u32,
    pub kind: ObjectKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Suppressed from the primary sensor
    pub hidden: bool,
    /// Marked untrustworthy by the defense layer (cleared every tick)
    pub flagged: bool,
    /// True x recorded under a relay attack (cleared every tick)
    pub corrected_x: Option<f32>,
    /// Hidden return restored by the cooperative feed (cleared every tick)
    pub revealed: bool,
}

impl SimObject {
    pub fn new(id: u32, kind: ObjectKind, x: f32, y: f32, width: f32, height: f32) -> Self {
        debug_assert!(width > 0.0 && height > 0.0);
        Self {
            id,
            kind,
            x,
            y,
            width,
            height,
            hidden: false,
            flagged: false,
            corrected_x: None,
            revealed: false,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Reset the flags that only describe the current tick
    pub fn clear_transient(&mut self) {
        self.flagged = false;
        self.corrected_x = None;
        self.revealed = false;
    }
}

/// The scene every run starts from (and `reset` restores)
pub fn initial_objects() -> Vec<SimObject> {
    vec![
        SimObject::new(1, ObjectKind::Vehicle, 420.0, 186.0, 60.0, 28.0),
        SimObject::new(2, ObjectKind::Pedestrian, 620.0, 148.0, 14.0, 28.0),
        SimObject::new(3, ObjectKind::Obstacle, 860.0, 226.0, 30.0, 30.0),
        SimObject::new(4, ObjectKind::Vehicle, 1100.0, 146.0, 60.0, 28.0),
    ]
}

/// The vehicle carrying the sensor. It never moves on screen; the world
/// scrolls past it at `effective_speed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EgoVehicle {
    pub sensor_origin: Vec2,
    /// User-configured speed (pixels per tick)
    pub base_speed: f32,
    /// Distance actually travelled since the last reset, braking included
    pub odometer: f32,
}

impl Default for EgoVehicle {
    fn default() -> Self {
        Self {
            sensor_origin: Vec2::new(SENSOR_X, SENSOR_Y),
            base_speed: DEFAULT_SPEED,
            odometer: 0.0,
        }
    }
}

impl EgoVehicle {
    /// Set base speed, clamped to the valid range (non-finite input is ignored)
    pub fn set_speed(&mut self, speed: f32) {
        if speed.is_finite() {
            self.base_speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        }
    }

    /// Speed after attack effects. An undefended phantom triggers emergency
    /// braking and a saturated point cloud forces a cautious crawl.
    pub fn effective_speed(&self, mode: AttackMode, defense_enabled: bool) -> f32 {
        if defense_enabled {
            return self.base_speed;
        }
        match mode {
            AttackMode::Phantom => self.base_speed * PHANTOM_BRAKE_FACTOR,
            AttackMode::Saturation => self.base_speed * SATURATION_SLOW_FACTOR,
            _ => self.base_speed,
        }
    }
}

/// Tick counter plus run flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationClock {
    pub ticks: u64,
    pub running: bool,
}

/// Seeded RNG and id allocator for attack-sourced objects
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: Pcg32,
    next_id: u32,
    /// First of `NOISE_COUNT` ids shared by every noise burst
    noise_base: Option<u32>,
}

impl Spawner {
    pub fn new(seed: u64, first_id: u32) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            next_id: first_id,
            noise_base: None,
        }
    }

    /// Allocate a new object ID
    pub fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// X position for an object re-entering from the right
    pub fn respawn_x(&mut self) -> f32 {
        VIEW_WIDTH + RESPAWN_MARGIN + self.rng.random_range(0.0..RESPAWN_JITTER)
    }

    pub fn phantom(&mut self) -> SimObject {
        SimObject::new(
            self.next_id(),
            ObjectKind::Phantom,
            PHANTOM_X,
            PHANTOM_Y,
            PHANTOM_WIDTH,
            PHANTOM_HEIGHT,
        )
    }

    /// Noise lives for one tick, so slot `i` of every burst reuses the same id
    fn noise_id(&mut self, slot: usize) -> u32 {
        let base = match self.noise_base {
            Some(base) => base,
            None => {
                let base = self.next_id;
                self.next_id += NOISE_COUNT as u32;
                self.noise_base = Some(base);
                base
            }
        };
        base + (slot % NOISE_COUNT) as u32
    }

    /// A noise return for `slot` at a uniformly random spot in the scan volume
    pub fn noise(&mut self, slot: usize) -> SimObject {
        let x = self.rng.random_range(SCAN_MIN_X..SCAN_MAX_X - NOISE_SIZE);
        let y = self.rng.random_range(SCAN_MIN_Y..SCAN_MAX_Y - NOISE_SIZE);
        SimObject::new(self.noise_id(slot), ObjectKind::Noise, x, y, NOISE_SIZE, NOISE_SIZE)
    }
}

/// Complete simulation state (deterministic for a given seed and inputs)
#[derive(Debug, Clone)]
pub struct SimState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub clock: SimulationClock,
    pub ego: EgoVehicle,
    /// Live objects, in stable iteration order
    pub objects: Vec<SimObject>,
    pub attack_mode: AttackMode,
    pub defense_enabled: bool,
    /// LiDAR fan geometry
    pub sensor: RayParams,
    pub metrics: RiskMetrics,
    /// Most recent scan
    pub scan: RayScan,
    pub log: EventLog,
    pub(crate) spawner: Spawner,
}

impl SimState {
    /// Create a fresh scene with the given seed
    pub fn new(seed: u64) -> Self {
        Self::with_objects(seed, initial_objects())
    }

    /// Create a scene around a custom object set
    pub fn with_objects(seed: u64, objects: Vec<SimObject>) -> Self {
        let first_id = objects.iter().map(|o| o.id).max().unwrap_or(0) + 1;
        Self {
            seed,
            clock: SimulationClock::default(),
            ego: EgoVehicle::default(),
            objects,
            attack_mode: AttackMode::None,
            defense_enabled: false,
            sensor: RayParams::default(),
            metrics: RiskMetrics::baseline(),
            scan: RayScan::default(),
            log: EventLog::default(),
            spawner: Spawner::new(seed, first_id),
        }
    }

    /// Back to the initial scene. Sensor geometry and speed are user
    /// configuration and survive the reset.
    pub fn reset(&mut self) {
        let objects = initial_objects();
        let first_id = objects.iter().map(|o| o.id).max().unwrap_or(0) + 1;
        self.clock = SimulationClock::default();
        self.ego.odometer = 0.0;
        self.objects = objects;
        self.attack_mode = AttackMode::None;
        self.defense_enabled = false;
        self.metrics = RiskMetrics::baseline();
        self.scan = RayScan::default();
        self.log.clear();
        self.spawner = Spawner::new(self.seed, first_id);
    }

    /// Switch attack mode. Artifacts of the previous mode are stripped on the next tick.
    pub fn set_attack_mode(&mut self, mode: AttackMode) {
        if mode == self.attack_mode {
            return;
        }
        log::info!("Attack mode: {} -> {}", self.attack_mode.as_str(), mode.as_str());
        self.attack_mode = mode;
        let tick = self.clock.ticks;
        match (mode, self.defense_enabled) {
            (AttackMode::None, _) => {
                self.log.push(tick, Severity::Info, "Attack stopped, sensor returns nominal")
            }
            (_, false) => self.log.push(
                tick,
                Severity::Alert,
                format!("Attack signature detected: {}", mode.description()),
            ),
            (_, true) => self.log.push(
                tick,
                Severity::Warning,
                format!("{} attempt under VSOC monitoring", mode.description()),
            ),
        }
    }

    pub fn set_defense(&mut self, enabled: bool) {
        if enabled == self.defense_enabled {
            return;
        }
        log::info!("VSOC defense {}", if enabled { "enabled" } else { "disabled" });
        self.defense_enabled = enabled;
        let tick = self.clock.ticks;
        if enabled {
            self.log
                .push(tick, Severity::Success, "VSOC countermeasure deployed: cooperative fusion online");
        } else {
            self.log
                .push(tick, Severity::Warning, "VSOC countermeasure withdrawn: single-sensor mode");
        }
    }

    /// Set sensor range, clamped to the valid range (non-finite input is ignored)
    pub fn set_max_range(&mut self, range: f32) {
        if range.is_finite() {
            self.sensor.max_range = range.clamp(MIN_RANGE, MAX_RANGE);
        }
    }

    /// Set the fan opening in degrees; non-finite input is ignored
    pub fn set_field_of_view(&mut self, degrees: f32) {
        if degrees.is_finite() {
            self.sensor.field_of_view = degrees.clamp(MIN_FOV_DEG, MAX_FOV_DEG).to_radians();
        }
    }

    pub fn object(&self, id: u32) -> Option<&SimObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn count_kind(&self, kind: ObjectKind) -> usize {
        self.objects.iter().filter(|o| o.kind == kind).count()
    }

    /// Keep objects sorted by id for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.objects.sort_by_key(|o| o.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_objects_are_real_and_unique() {
        let objects = initial_objects();
        assert!(objects.iter().all(|o| o.kind.is_real()));
        let mut ids: Vec<_> = objects.iter().map(|o| o.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), objects.len());
    }

    #[test]
    fn test_spawner_ids_follow_initial_set() {
        let mut state = SimState::new(7);
        let id = state.spawner.next_id();
        assert!(state.objects.iter().all(|o| o.id < id));
    }

    #[test]
    fn test_noise_stays_in_scan_volume() {
        let mut spawner = Spawner::new(42, 100);
        for i in 0..200 {
            let n = spawner.noise(i);
            assert!(n.x >= SCAN_MIN_X && n.right() <= SCAN_MAX_X);
            assert!(n.y >= SCAN_MIN_Y && n.y + n.height <= SCAN_MAX_Y);
        }
    }

    #[test]
    fn test_noise_bursts_reuse_ids() {
        let mut spawner = Spawner::new(42, 5);
        let first: Vec<u32> = (0..NOISE_COUNT).map(|i| spawner.noise(i).id).collect();
        for _ in 0..1000 {
            let burst: Vec<u32> = (0..NOISE_COUNT).map(|i| spawner.noise(i).id).collect();
            assert_eq!(burst, first);
        }
        assert_eq!(first[0], 5);
        assert!(first.iter().all(|&id| id >= 5));
        assert_eq!(spawner.next_id(), 5 + NOISE_COUNT as u32);
    }

    #[test]
    fn test_effective_speed_braking() {
        let ego = EgoVehicle::default();
        assert_eq!(ego.effective_speed(AttackMode::None, false), DEFAULT_SPEED);
        assert!(ego.effective_speed(AttackMode::Phantom, false) < DEFAULT_SPEED);
        assert_eq!(ego.effective_speed(AttackMode::Phantom, true), DEFAULT_SPEED);
    }

    #[test]
    fn test_set_speed_clamps_and_ignores_nan() {
        let mut ego = EgoVehicle::default();
        ego.set_speed(50.0);
        assert_eq!(ego.base_speed, MAX_SPEED);
        ego.set_speed(f32::NAN);
        assert_eq!(ego.base_speed, MAX_SPEED);
        ego.set_speed(-1.0);
        assert_eq!(ego.base_speed, MIN_SPEED);
    }

    #[test]
    fn test_mode_change_logs_once() {
        let mut state = SimState::new(1);
        state.set_attack_mode(AttackMode::Relay);
        state.set_attack_mode(AttackMode::Relay);
        assert_eq!(state.log.len(), 1);
        assert_eq!(state.log.entries().next().map(|e| e.severity), Some(Severity::Alert));
    }
}
