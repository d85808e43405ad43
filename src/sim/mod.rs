//! Deterministic simulation module
//!
//! All ride physics lives here. This module must be pure and deterministic:
//! - Time only advances through `Ride::advance`
//! - No randomness
//! - No rendering or platform dependencies

pub mod camera;
pub mod integrator;
pub mod projectile;
pub mod state;
pub mod tick;
pub mod track;

pub use camera::{CameraBounds, CameraBoundsTracker, CameraPolicy};
pub use integrator::{
    RideError, TrackMotion, TrackStep, g_force, step_flight, step_on_track, track_motion,
};
pub use projectile::{
    ExplicitTrajectory, LaunchEvent, ParametricTrajectory, ProjectileError, Quadratic,
    TrajectoryEquation, solve_trajectory,
};
pub use state::{LandingPolicy, PhaseKind, RideEvent, RidePhase, RideSnapshot, RideState, Trail};
pub use tick::Ride;
pub use track::{TrackError, TrackProfile, TrackSample, TrackSegment};
