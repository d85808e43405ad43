//! Equations of motion for each ride regime
//!
//! On the track the speed comes from energy conservation against the
//! ceiling in `SimulationParameters`, resolved along the tangent and
//! integrated with forward Euler. In flight, gravity acts on vy and both
//! coordinates are stepped with the updated velocity.

use glam::DVec2;
use thiserror::Error;

use super::track::{TrackProfile, TrackSample};
use crate::consts::*;
use crate::settings::SimulationParameters;

/// Failure while integrating the ride
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RideError {
    /// The cart sits where the track rises above the energy ceiling; the
    /// energy formula has no real speed there.
    #[error("track height {height} m at x = {x} exceeds the energy ceiling {ceiling} m")]
    EnergyDeficit { x: f64, height: f64, ceiling: f64 },
}

/// Constrained motion at one point on the track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackMotion {
    /// Track geometry the speed was derived from
    pub sample: TrackSample,
    /// Speed along the track (m/s)
    pub speed: f64,
    /// Velocity resolved along the tangent
    pub vel: DVec2,
}

/// Result of one forward-Euler step on the track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackStep {
    /// Position after the step
    pub x: f64,
    /// Path length travelled, `speed * dt`
    pub distance: f64,
}

/// Speed and velocity of the cart at `x` from energy conservation
pub fn track_motion(
    track: &TrackProfile,
    params: &SimulationParameters,
    x: f64,
) -> Result<TrackMotion, RideError> {
    let sample = track.sample(x);
    let ceiling = params.energy_reference_height();
    let headroom = ceiling - sample.height;

    // Negated comparison also rejects NaN
    if !(headroom >= -ENERGY_TOLERANCE) {
        return Err(RideError::EnergyDeficit {
            x,
            height: sample.height,
            ceiling,
        });
    }

    let speed = (2.0 * params.gravity() * headroom.max(0.0)).sqrt();
    let vx = speed / (1.0 + sample.slope * sample.slope).sqrt();
    Ok(TrackMotion {
        sample,
        speed,
        vel: DVec2::new(vx, sample.slope * vx),
    })
}

/// Advance the cart along the track by `dt`
pub fn step_on_track(
    track: &TrackProfile,
    params: &SimulationParameters,
    x: f64,
    dt: f64,
) -> Result<TrackStep, RideError> {
    let motion = track_motion(track, params, x)?;
    Ok(TrackStep {
        x: x + motion.vel.x * dt,
        distance: motion.speed * dt,
    })
}

/// Ballistic step: vy first, then position with the new velocity.
///
/// Returns `(pos, vel)`. vx is untouched (no drag).
#[inline]
pub fn step_flight(pos: DVec2, vel: DVec2, gravity: f64, dt: f64) -> (DVec2, DVec2) {
    let vel = DVec2::new(vel.x, vel.y - gravity * dt);
    (pos + vel * dt, vel)
}

/// Normal acceleration in multiples of g.
///
/// `Gs = [(1 + f'²) + 2 (h_ref - h) f''] / (1 + f'²)^1.5`
///
/// Must be fed the same sample the speed was derived from. A flat sample
/// (zero slope and curvature) gives exactly 1.
pub fn g_force(sample: TrackSample, energy_reference_height: f64) -> f64 {
    let tangent_sq = 1.0 + sample.slope * sample.slope;
    let numerator =
        tangent_sq + 2.0 * (energy_reference_height - sample.height) * sample.curvature;
    numerator / tangent_sq.powf(1.5)
}
