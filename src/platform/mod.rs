//! Platform abstraction layer
//!
//! The ride never owns a clock. A `Driver` turns frame deltas from whatever
//! animation loop hosts it (browser `requestAnimationFrame`, the native
//! headless loop) into `Ride::advance` calls, and bundles each frame's output
//! for the rendering side.

#[cfg(target_arch = "wasm32")]
pub mod web;

use serde::Serialize;

use crate::consts::*;
use crate::effects::{Sparkle, TeleportEffect};
use crate::settings::{ConfigError, Settings};
use crate::sim::{CameraBounds, Ride, RideError, RideEvent, RideSnapshot, TrackProfile};

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub snapshot: RideSnapshot,
    pub camera: CameraBounds,
    pub events: Vec<RideEvent>,
    pub sparkles: Vec<Sparkle>,
    pub paused: bool,
}

/// Ride plus the per-session controls that sit outside the physics
#[derive(Debug, Clone)]
pub struct Driver {
    ride: Ride,
    effects: TeleportEffect,
    time_scale: f64,
    paused: bool,
}

impl Driver {
    pub fn new(track: TrackProfile, settings: &Settings) -> Result<Self, ConfigError> {
        let ride = Ride::new(track, settings)?;
        Ok(Self {
            ride,
            effects: TeleportEffect::new(settings.effects_seed),
            time_scale: settings.time_scale,
            paused: false,
        })
    }

    pub fn ride(&self) -> &Ride {
        &self.ride
    }

    pub fn ride_mut(&mut self) -> &mut Ride {
        &mut self.ride
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn set_time_scale(&mut self, time_scale: f64) -> Result<(), ConfigError> {
        if !(time_scale.is_finite() && time_scale >= 0.0) {
            return Err(ConfigError::InvalidTimeScale(time_scale));
        }
        self.time_scale = time_scale;
        Ok(())
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        log::info!("{}", if self.paused { "Paused" } else { "Resumed" });
        self.paused
    }

    pub fn reset(&mut self) {
        self.ride.reset();
        self.effects.reseed();
    }

    /// Run one frame of `frame_dt` wall-clock seconds.
    ///
    /// Long frames (tab switches, debugger stops) are clamped so the cart
    /// never jumps more than `MAX_FRAME_DT` of ride time at once. While paused
    /// the ride is read but not advanced.
    pub fn frame(&mut self, frame_dt: f64) -> Result<Frame, RideError> {
        let snapshot = if self.paused {
            self.ride.snapshot()
        } else {
            self.ride
                .advance(frame_dt.min(MAX_FRAME_DT), self.time_scale)?
        };

        let sparkles = self.effects.for_snapshot(&snapshot, self.ride.track());
        Ok(Frame {
            camera: self.ride.camera_bounds(),
            events: self.ride.drain_events(),
            sparkles,
            paused: self.paused,
            snapshot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::PhaseKind;

    fn driver() -> Driver {
        Driver::new(TrackProfile::reference(), &Settings::default()).unwrap()
    }

    #[test]
    fn test_long_frames_are_clamped() {
        let mut d = driver();
        let frame = d.frame(5.0).unwrap();
        assert!((frame.snapshot.ride_time - MAX_FRAME_DT).abs() < 1e-12);
    }

    #[test]
    fn test_pause_withholds_time() {
        let mut d = driver();
        d.frame(0.05).unwrap();
        assert!(d.toggle_pause());
        let before = d.frame(0.05).unwrap();
        let after = d.frame(0.05).unwrap();
        assert_eq!(before.snapshot, after.snapshot);
        assert!(after.paused);

        assert!(!d.toggle_pause());
        let resumed = d.frame(0.05).unwrap();
        assert!(resumed.snapshot.ride_time > after.snapshot.ride_time);
    }

    #[test]
    fn test_time_scale_validation() {
        let mut d = driver();
        assert!(d.set_time_scale(-1.0).is_err());
        assert!(d.set_time_scale(f64::NAN).is_err());
        assert_eq!(d.time_scale(), 1.0);
        d.set_time_scale(3.0).unwrap();
        let frame = d.frame(0.01).unwrap();
        assert!((frame.snapshot.ride_time - 0.03).abs() < 1e-12);
    }

    #[test]
    fn test_frames_carry_events_and_sparkles() {
        let mut d = driver();
        d.set_time_scale(4.0).unwrap();

        let mut saw_launch = false;
        let mut saw_sparkles = false;
        for _ in 0..20_000 {
            let frame = d.frame(1.0 / 60.0).unwrap();
            saw_launch |= frame
                .events
                .iter()
                .any(|e| matches!(e, RideEvent::Launched(_)));
            if frame.snapshot.phase == PhaseKind::Teleporting {
                saw_sparkles |= !frame.sparkles.is_empty();
            }
            if frame.snapshot.ride == 1 {
                break;
            }
        }
        assert!(saw_launch);
        assert!(saw_sparkles);
        assert_eq!(d.ride().state().ride, 1);
    }
}
