//! Ride state and core simulation types
//!
//! Everything a single ride mutates per tick lives in `RideState`. Nothing
//! here is shared between rides.

use std::collections::VecDeque;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::projectile::LaunchEvent;
use super::track::TrackSample;
use crate::consts::*;

/// What happens once the cart hits the ground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LandingPolicy {
    /// Pause on the ground, animate back to the start, ride again
    #[default]
    AutoReturn,
    /// Stay landed until an explicit reset
    Halt,
}

/// Current regime of the ride, with the data only that regime needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RidePhase {
    /// Constrained to the track, speed from energy conservation
    OnTrack,
    /// Ballistic flight after leaving the track end
    Flight,
    /// Resting on the ground
    Landed { landing_x: f64, timer: f64 },
    /// Scripted move from the landing point back to the start
    Teleporting { landing_x: f64, timer: f64 },
}

impl RidePhase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            RidePhase::OnTrack => PhaseKind::OnTrack,
            RidePhase::Flight => PhaseKind::Flight,
            RidePhase::Landed { .. } => PhaseKind::Landed,
            RidePhase::Teleporting { .. } => PhaseKind::Teleporting,
        }
    }

    /// Fraction of the return animation completed, if teleporting
    pub fn teleport_progress(&self) -> Option<f64> {
        match *self {
            RidePhase::Teleporting { timer, .. } => {
                Some((timer / TELEPORT_DURATION).clamp(0.0, 1.0))
            }
            _ => None,
        }
    }

    /// Where the cart came down, once it has
    pub fn landing_x(&self) -> Option<f64> {
        match *self {
            RidePhase::Landed { landing_x, .. } | RidePhase::Teleporting { landing_x, .. } => {
                Some(landing_x)
            }
            _ => None,
        }
    }
}

/// Payload-free phase tag for display layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    OnTrack,
    Flight,
    Landed,
    Teleporting,
}

impl PhaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseKind::OnTrack => "On track",
            PhaseKind::Flight => "Flight",
            PhaseKind::Landed => "Landed",
            PhaseKind::Teleporting => "Teleporting",
        }
    }
}

/// Bounded history of projectile positions (oldest first)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trail {
    points: VecDeque<DVec2>,
    capacity: usize,
}

impl Default for Trail {
    fn default() -> Self {
        Self::with_capacity(TRAIL_CAPACITY)
    }
}

impl Trail {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity.min(TRAIL_CAPACITY)),
            capacity,
        }
    }

    /// Append a point, dropping the oldest when full
    pub fn record(&mut self, pos: DVec2) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(pos);
    }

    /// Restart the trail at a single point
    pub fn restart_at(&mut self, pos: DVec2) {
        self.points.clear();
        self.points.push_back(pos);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &DVec2> {
        self.points.iter()
    }

    pub fn to_vec(&self) -> Vec<DVec2> {
        self.points.iter().copied().collect()
    }
}

/// Notifications raised by phase transitions, drained by the driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RideEvent {
    /// Cart left the track end
    Launched(LaunchEvent),
    /// Cart hit the ground
    Landed { x: f64 },
    /// Return animation began
    TeleportStarted,
    /// Return animation finished, a new ride begins
    RideRestarted { ride: u64 },
    /// Explicit reset by the user
    Reset,
}

/// Complete ride state (deterministic)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideState {
    /// Current phase
    pub phase: RidePhase,
    /// Cart position (m)
    pub pos: DVec2,
    /// Cart velocity (m/s); on track, resolved along the tangent
    pub vel: DVec2,
    /// |vel|, or the energy-derived speed on track
    pub speed: f64,
    /// Geometry under the cart that `speed` and `g_force` were derived from
    pub support: TrackSample,
    /// Normal acceleration in multiples of g
    pub g_force: f64,
    /// Time since the ride began (s), frozen while landed or teleporting
    pub ride_time: f64,
    /// Path length travelled, accumulated as Σ v·dt
    pub arc_length: f64,
    /// Projectile positions since launch
    pub trail: Trail,
    /// Most recent launch, kept until an explicit reset
    pub last_launch: Option<LaunchEvent>,
    /// Rides completed since the last reset
    pub ride: u64,
    /// Pending transition notifications
    #[serde(skip)]
    pub events: VecDeque<RideEvent>,
}

impl RideState {
    /// Fresh ride: on track, at rest at `start`
    pub fn new(start: DVec2, trail_capacity: usize) -> Self {
        Self {
            phase: RidePhase::OnTrack,
            pos: start,
            vel: DVec2::ZERO,
            speed: 0.0,
            support: TrackSample::flat(start.y),
            g_force: 1.0,
            ride_time: 0.0,
            arc_length: 0.0,
            trail: Trail::with_capacity(trail_capacity),
            last_launch: None,
            ride: 0,
            events: VecDeque::with_capacity(MAX_PENDING_EVENTS),
        }
    }

    /// Return to the start of the track for another ride.
    ///
    /// Clears per-ride accumulators but keeps the ride counter and the last
    /// launch for display.
    pub fn restart_at(&mut self, start: DVec2) {
        self.phase = RidePhase::OnTrack;
        self.pos = start;
        self.vel = DVec2::ZERO;
        self.speed = 0.0;
        self.support = TrackSample::flat(start.y);
        self.g_force = 1.0;
        self.ride_time = 0.0;
        self.arc_length = 0.0;
        self.trail.clear();
    }

    /// Queue a notification for the driver, dropping the oldest if it never drains
    pub fn push_event(&mut self, event: RideEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Read-only view of one tick for rendering and HUD collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideSnapshot {
    pub phase: PhaseKind,
    pub pos: DVec2,
    pub vel: DVec2,
    /// Unit normal of the current support (track normal on track, +y otherwise)
    pub normal: DVec2,
    /// Normal acceleration in multiples of g
    pub g_force: f64,
    /// |v| in m/s
    pub speed: f64,
    pub speed_kph: f64,
    pub ride_time: f64,
    pub arc_length: f64,
    pub trail: Vec<DVec2>,
    pub landing_x: Option<f64>,
    pub teleport_progress: Option<f64>,
    pub ride: u64,
}
