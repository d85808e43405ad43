//! Closed-form trajectory of the launched cart
//!
//! Given launch position `(x0, y0)`, velocity `(vx0, vy0)` and gravity:
//! - parametric: `x(t) = x0 + vx0 t`, `y(t) = y0 + vy0 t - g t² / 2`
//! - explicit:   `y(x) = A x² + B x + C`, defined only when `|vx0| > ε`

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectileError {
    #[error("launch inputs must be finite (pos {pos}, vel {vel}, g {gravity})")]
    NonFinite { pos: DVec2, vel: DVec2, gravity: f64 },
}

/// `x(t)`, `y(t)` from the launch conditions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParametricTrajectory {
    pub origin: DVec2,
    pub vel: DVec2,
    pub gravity: f64,
}

impl ParametricTrajectory {
    /// Position `t` seconds after launch
    pub fn position(&self, t: f64) -> DVec2 {
        DVec2::new(
            self.origin.x + self.vel.x * t,
            self.origin.y + self.vel.y * t - 0.5 * self.gravity * t * t,
        )
    }
}

/// `y(x) = a x² + b x + c`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadratic {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    /// Same curve about the launch point: `y0 + slope (x - x0) + a (x - x0)²`
    pub x0: f64,
    pub y0: f64,
    pub slope: f64,
}

impl Quadratic {
    pub fn eval(&self, x: f64) -> f64 {
        let u = x - self.x0;
        self.y0 + self.slope * u + self.a * u * u
    }
}

/// The eliminated-parameter form, which a vertical launch does not have
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ExplicitTrajectory {
    Defined(Quadratic),
    /// `|vx0|` below the epsilon: x never changes, so y is not a function of x
    VerticalLaunch,
}

impl ExplicitTrajectory {
    pub fn quadratic(&self) -> Option<&Quadratic> {
        match self {
            ExplicitTrajectory::Defined(q) => Some(q),
            ExplicitTrajectory::VerticalLaunch => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, ExplicitTrajectory::Defined(_))
    }
}

/// Both trajectory forms for one launch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryEquation {
    pub parametric: ParametricTrajectory,
    pub explicit: ExplicitTrajectory,
}

/// Payload of the launch notification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchEvent {
    pub pos: DVec2,
    pub vel: DVec2,
    /// `None` if the launch conditions were not finite
    pub equation: Option<TrajectoryEquation>,
}

/// Derive the trajectory equations for a launch. Pure.
pub fn solve_trajectory(
    pos: DVec2,
    vel: DVec2,
    gravity: f64,
) -> Result<TrajectoryEquation, ProjectileError> {
    if !(pos.is_finite() && vel.is_finite() && gravity.is_finite()) {
        return Err(ProjectileError::NonFinite { pos, vel, gravity });
    }

    let parametric = ParametricTrajectory {
        origin: pos,
        vel,
        gravity,
    };

    let explicit = if vel.x.abs() < VERTICAL_LAUNCH_EPSILON {
        ExplicitTrajectory::VerticalLaunch
    } else {
        let a = -gravity / (2.0 * vel.x * vel.x);
        let slope = vel.y / vel.x;
        ExplicitTrajectory::Defined(Quadratic {
            a,
            b: slope - 2.0 * a * pos.x,
            c: pos.y - slope * pos.x + a * pos.x * pos.x,
            x0: pos.x,
            y0: pos.y,
            slope,
        })
    };

    Ok(TrajectoryEquation {
        parametric,
        explicit,
    })
}

/// `+ 2.00` / `- 2.00` for a term following another
fn signed(value: f64) -> String {
    if value < 0.0 {
        format!("- {:.2}", -value)
    } else {
        format!("+ {:.2}", value)
    }
}

impl fmt::Display for ParametricTrajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x(t) = {:.2} {} t, y(t) = {:.2} {} t - 0.5 * {:.2} t^2",
            self.origin.x,
            signed(self.vel.x),
            self.origin.y,
            signed(self.vel.y),
            self.gravity
        )
    }
}

impl fmt::Display for ExplicitTrajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExplicitTrajectory::Defined(q) => write!(
                f,
                "y(x) = {:.2} {} (x - {:.2}) {} (x - {:.2})^2",
                q.y0,
                signed(q.slope),
                q.x0,
                signed(q.a),
                q.x0
            ),
            ExplicitTrajectory::VerticalLaunch => {
                write!(f, "y(x) is undefined for vertical launch (vx ≈ 0).")
            }
        }
    }
}
