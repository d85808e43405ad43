//! Coaster Ride - a cart on an analytic track, launched into free flight
//!
//! Core modules:
//! - `sim`: Deterministic simulation (track, integrator, ride phases, camera)
//! - `settings`: Validated physical parameters and JSON configuration
//! - `effects`: Seeded visual effects layered on top of the simulation
//! - `platform`: Browser bindings for an external animation driver

pub mod effects;
pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::{ConfigError, Settings, SimulationParameters};
pub use sim::{Ride, RideError, RidePhase, RideSnapshot};

use glam::DVec2;

/// Ride configuration constants
pub mod consts {
    /// Fixed driver timestep for the headless runner (60 Hz)
    pub const SIM_DT: f64 = 1.0 / 60.0;
    /// Largest frame delta a driver should hand to the ride in one tick
    pub const MAX_FRAME_DT: f64 = 0.1;

    /// Default gravitational acceleration (m/s²)
    pub const DEFAULT_GRAVITY: f64 = 9.81;
    /// Default launch speed at the top of the first drop (m/s)
    pub const DEFAULT_INITIAL_SPEED: f64 = 0.5;
    /// Upper bound accepted by the gravity setter
    pub const GRAVITY_MAX: f64 = 1.0e9;
    /// Upper bound accepted by the initial speed setter
    pub const INITIAL_SPEED_MAX: f64 = 1.0e9;

    /// Track extent (m)
    pub const TRACK_START_X: f64 = 0.0;
    pub const TRACK_END_X: f64 = 35.0;
    /// Height returned outside every track segment
    pub const TRACK_FALLBACK_HEIGHT: f64 = 20.0;
    /// Allowed mismatch of height/slope where two segments meet
    pub const TRACK_CONTINUITY_TOLERANCE: f64 = 1.0e-9;

    /// Pause on the ground before the return animation (s)
    pub const LANDED_PAUSE_DURATION: f64 = 1.5;
    /// Duration of the return-to-start animation (s)
    pub const TELEPORT_DURATION: f64 = 1.5;

    /// Below this |vx| the explicit y(x) form is undefined
    pub const VERTICAL_LAUNCH_EPSILON: f64 = 1.0e-6;
    /// Energy deficit treated as rounding noise rather than an infeasible track
    pub const ENERGY_TOLERANCE: f64 = 1.0e-9;

    /// Camera base world extents (m)
    pub const BASE_WORLD_X_MAX: f64 = 50.0;
    pub const BASE_WORLD_Y_MAX: f64 = 22.0;
    /// Margin kept around the farthest visited point (m)
    pub const CAMERA_PADDING_X: f64 = 5.0;
    pub const CAMERA_PADDING_Y: f64 = 2.0;
    /// Capped policy: bounds never exceed this multiple of the base extents
    pub const MAX_ZOOM_OUT_FACTOR: f64 = 2.0;
    /// Fraction of the teleport after which the camera snaps back to base
    pub const TELEPORT_ZOOM_RESET_FRACTION: f64 = 1.0 / 3.0;

    /// Projectile trail points retained for rendering
    pub const TRAIL_CAPACITY: usize = 2048;
    /// Pending events kept when the driver does not drain them
    pub const MAX_PENDING_EVENTS: usize = 64;

    /// m/s to km/h
    pub const KPH_PER_MPS: f64 = 3.6;
}

/// Linear interpolation between two points, `t` clamped to [0, 1]
#[inline]
pub fn lerp_clamped(from: DVec2, to: DVec2, t: f64) -> DVec2 {
    from + (to - from) * t.clamp(0.0, 1.0)
}

/// Unit normal of a curve with the given slope, pointing "up" out of the track
#[inline]
pub fn track_normal(slope: f64) -> DVec2 {
    DVec2::new(-slope, 1.0).normalize()
}

/// Sanitize a driver-supplied time step: negative or non-finite becomes 0
#[inline]
pub fn sanitize_dt(dt: f64, time_scale: f64) -> f64 {
    let scaled = dt * time_scale;
    if scaled.is_finite() && scaled > 0.0 {
        scaled
    } else {
        0.0
    }
}
