//! Ride parameters and configuration
//!
//! `SimulationParameters` is the validated physics configuration owned by a
//! ride. `Settings` is the serializable document a driver loads it from.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::{CameraPolicy, LandingPolicy, TrackProfile};

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("gravity must be finite and in (0, {max}], got {value}")]
    GravityOutOfRange { value: f64, max: f64 },

    #[error("initial speed must be finite and in [0, {max}], got {value}")]
    InitialSpeedOutOfRange { value: f64, max: f64 },

    #[error("energy ceiling {ceiling} m is below the track peak {peak} m")]
    EnergyBelowTrack { ceiling: f64, peak: f64 },

    #[error("energy ceiling is not finite for g = {gravity}, v0 = {initial_speed}")]
    EnergyNotFinite { gravity: f64, initial_speed: f64 },

    #[error("time scale must be finite and non-negative, got {0}")]
    InvalidTimeScale(f64),

    #[error("camera zoom factor must be finite and at least 1, got {0}")]
    InvalidZoomFactor(f64),

    #[error("trail capacity must be at least 1")]
    InvalidTrailCapacity,

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
}

/// Gravity, launch speed and the energy ceiling derived from them.
///
/// The ceiling `start_height + v0² / (2g)` is recomputed by every setter and is
/// the only source of the on-track speed. Setters validate first and leave the
/// previous values untouched on error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationParameters {
    gravity: f64,
    initial_speed: f64,
    start_height: f64,
    peak_height: f64,
    energy_reference_height: f64,
}

impl SimulationParameters {
    /// Default gravity and launch speed for the given track
    pub fn new(track: &TrackProfile) -> Result<Self, ConfigError> {
        Self::with_values(track, DEFAULT_GRAVITY, DEFAULT_INITIAL_SPEED)
    }

    pub fn with_values(
        track: &TrackProfile,
        gravity: f64,
        initial_speed: f64,
    ) -> Result<Self, ConfigError> {
        let mut params = Self {
            gravity,
            initial_speed,
            start_height: track.height(track.start_x()),
            peak_height: track.peak_height(),
            energy_reference_height: 0.0,
        };
        params.energy_reference_height = params.check(gravity, initial_speed)?;
        Ok(params)
    }

    #[inline]
    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    #[inline]
    pub fn initial_speed(&self) -> f64 {
        self.initial_speed
    }

    /// Height at which the cart would be at rest with the ride's total energy
    #[inline]
    pub fn energy_reference_height(&self) -> f64 {
        self.energy_reference_height
    }

    pub fn set_gravity(&mut self, gravity: f64) -> Result<(), ConfigError> {
        let ceiling = self.check(gravity, self.initial_speed).inspect_err(|e| {
            log::warn!("Rejected gravity {}: {}", gravity, e);
        })?;
        self.gravity = gravity;
        self.energy_reference_height = ceiling;
        log::info!("Gravity set to {} (energy ceiling {:.4} m)", gravity, ceiling);
        Ok(())
    }

    pub fn set_initial_speed(&mut self, initial_speed: f64) -> Result<(), ConfigError> {
        let ceiling = self.check(self.gravity, initial_speed).inspect_err(|e| {
            log::warn!("Rejected initial speed {}: {}", initial_speed, e);
        })?;
        self.initial_speed = initial_speed;
        self.energy_reference_height = ceiling;
        log::info!(
            "Initial speed set to {} (energy ceiling {:.4} m)",
            initial_speed,
            ceiling
        );
        Ok(())
    }

    pub fn reset_gravity(&mut self) -> Result<(), ConfigError> {
        self.set_gravity(DEFAULT_GRAVITY)
    }

    pub fn reset_initial_speed(&mut self) -> Result<(), ConfigError> {
        self.set_initial_speed(DEFAULT_INITIAL_SPEED)
    }

    /// Validate a candidate pair and return the energy ceiling it implies
    fn check(&self, gravity: f64, initial_speed: f64) -> Result<f64, ConfigError> {
        if !(gravity.is_finite() && gravity > 0.0 && gravity <= GRAVITY_MAX) {
            return Err(ConfigError::GravityOutOfRange {
                value: gravity,
                max: GRAVITY_MAX,
            });
        }
        if !(initial_speed.is_finite() && (0.0..=INITIAL_SPEED_MAX).contains(&initial_speed)) {
            return Err(ConfigError::InitialSpeedOutOfRange {
                value: initial_speed,
                max: INITIAL_SPEED_MAX,
            });
        }

        let ceiling = self.start_height + initial_speed * initial_speed / (2.0 * gravity);
        if !ceiling.is_finite() {
            return Err(ConfigError::EnergyNotFinite {
                gravity,
                initial_speed,
            });
        }
        if ceiling < self.peak_height - ENERGY_TOLERANCE {
            return Err(ConfigError::EnergyBelowTrack {
                ceiling,
                peak: self.peak_height,
            });
        }
        Ok(ceiling)
    }
}

/// Ride settings document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
    /// Launch speed at the track start (m/s)
    pub initial_speed: f64,
    /// Speed multiplier applied to every driver dt
    pub time_scale: f64,
    /// What happens after landing
    pub landing: LandingPolicy,
    /// How the viewport grows
    pub camera: CameraPolicy,
    /// Snap the camera back to base partway through the return animation
    /// (capped policy only)
    pub teleport_zoom_reset: bool,
    /// Projectile trail points kept for rendering
    pub trail_capacity: usize,
    /// Seed for visual jitter (never affects physics)
    pub effects_seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            initial_speed: DEFAULT_INITIAL_SPEED,
            time_scale: 1.0,
            landing: LandingPolicy::default(),
            camera: CameraPolicy::default(),
            teleport_zoom_reset: true,
            trail_capacity: TRAIL_CAPACITY,
            effects_seed: 0,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every field and build the physics parameters for `track`
    pub fn validate(&self, track: &TrackProfile) -> Result<SimulationParameters, ConfigError> {
        if !(self.time_scale.is_finite() && self.time_scale >= 0.0) {
            return Err(ConfigError::InvalidTimeScale(self.time_scale));
        }
        if self.trail_capacity == 0 {
            return Err(ConfigError::InvalidTrailCapacity);
        }
        if let CameraPolicy::Capped { factor } = self.camera {
            if !(factor.is_finite() && factor >= 1.0) {
                return Err(ConfigError::InvalidZoomFactor(factor));
            }
        }
        SimulationParameters::with_values(track, self.gravity, self.initial_speed)
    }

    /// Load settings from a JSON file (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SimulationParameters {
        SimulationParameters::new(&TrackProfile::reference()).unwrap()
    }

    #[test]
    fn test_default_energy_ceiling() {
        let p = params();
        // 20 + 0.25 / 19.62
        assert!((p.energy_reference_height() - 20.012742).abs() < 1e-5);
    }

    #[test]
    fn test_set_gravity_recomputes_ceiling() {
        let mut p = params();
        p.set_gravity(1.62).unwrap();
        assert_eq!(p.gravity(), 1.62);
        let expected = 20.0 + 0.25 / (2.0 * 1.62);
        assert!((p.energy_reference_height() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_set_initial_speed_recomputes_ceiling() {
        let mut p = params();
        p.set_initial_speed(10.0).unwrap();
        let expected = 20.0 + 100.0 / (2.0 * 9.81);
        assert!((p.energy_reference_height() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_rejected_gravity_keeps_previous() {
        let mut p = params();
        let before = p;
        for bad in [0.0, -9.81, f64::NAN, f64::INFINITY, 1.0e9 + 1.0] {
            assert!(matches!(
                p.set_gravity(bad),
                Err(ConfigError::GravityOutOfRange { .. })
            ));
            assert_eq!(p, before);
        }
        assert!(p.set_gravity(1.0e9).is_ok());
    }

    #[test]
    fn test_rejected_initial_speed_keeps_previous() {
        let mut p = params();
        let before = p;
        for bad in [-0.1, f64::NAN, f64::NEG_INFINITY, 2.0e9] {
            assert!(matches!(
                p.set_initial_speed(bad),
                Err(ConfigError::InitialSpeedOutOfRange { .. })
            ));
            assert_eq!(p, before);
        }
        assert!(p.set_initial_speed(0.0).is_ok());
        assert_eq!(p.energy_reference_height(), 20.0);
    }

    #[test]
    fn test_overflowing_ceiling_rejected() {
        let mut p = params();
        p.set_initial_speed(1e9).unwrap();
        assert!(matches!(
            p.set_gravity(f64::MIN_POSITIVE),
            Err(ConfigError::EnergyNotFinite { .. })
        ));
    }

    #[test]
    fn test_ceiling_below_peak_rejected() {
        use crate::sim::TrackSegment;

        // Track rises from 0 m to 5 m: the cart needs v0 of at least sqrt(2 g 5)
        let track =
            TrackProfile::new(vec![TrackSegment::new(0.0, 5.0, 1.0, 0.0, 1, 0.0)], 0.0).unwrap();
        let err = SimulationParameters::with_values(&track, 9.81, 1.0).unwrap_err();
        assert!(matches!(err, ConfigError::EnergyBelowTrack { .. }));

        let mut p = SimulationParameters::with_values(&track, 9.81, 10.0).unwrap();
        assert!(p.set_initial_speed(1.0).is_err());
        assert_eq!(p.initial_speed(), 10.0);
    }

    #[test]
    fn test_reset_helpers() {
        let mut p = params();
        p.set_gravity(3.0).unwrap();
        p.set_initial_speed(4.0).unwrap();
        p.reset_gravity().unwrap();
        p.reset_initial_speed().unwrap();
        assert_eq!(p, params());
    }

    #[test]
    fn test_settings_json_defaults_fill_missing() {
        let s = Settings::from_json(r#"{ "gravity": 3.7, "camera": "Sticky" }"#).unwrap();
        assert_eq!(s.gravity, 3.7);
        assert_eq!(s.camera, CameraPolicy::Sticky);
        assert_eq!(s.initial_speed, DEFAULT_INITIAL_SPEED);
        assert_eq!(s.landing, LandingPolicy::AutoReturn);
        assert!(s.teleport_zoom_reset);
    }

    #[test]
    fn test_settings_json_roundtrip() {
        let s = Settings {
            landing: LandingPolicy::Halt,
            effects_seed: 42,
            ..Default::default()
        };
        let back = Settings::from_json(&s.to_json().unwrap()).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_settings_parse_error() {
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_settings_validate() {
        let track = TrackProfile::reference();
        assert!(Settings::default().validate(&track).is_ok());

        let s = Settings {
            time_scale: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            s.validate(&track),
            Err(ConfigError::InvalidTimeScale(_))
        ));

        let s = Settings {
            trail_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(
            s.validate(&track),
            Err(ConfigError::InvalidTrailCapacity)
        ));

        let s = Settings {
            camera: CameraPolicy::Capped { factor: 0.5 },
            ..Default::default()
        };
        assert!(matches!(
            s.validate(&track),
            Err(ConfigError::InvalidZoomFactor(_))
        ));

        let s = Settings {
            gravity: -1.0,
            ..Default::default()
        };
        assert!(s.validate(&track).is_err());
    }

    #[test]
    fn test_settings_load_missing_file() {
        assert!(matches!(
            Settings::load("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
