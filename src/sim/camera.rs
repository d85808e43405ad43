//! Adaptive viewport bounds
//!
//! The viewport always shows at least the base world extents and grows to
//! keep a padding margin around the farthest point the cart has reached.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::state::RideSnapshot;
use super::track::TrackProfile;
use crate::consts::*;

/// How far and how long the viewport grows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CameraPolicy {
    /// Grow within a ride, never beyond `factor` times the base extents;
    /// start over from the base when a new ride begins
    Capped { factor: f64 },
    /// Grow without limit; only an explicit reset shrinks the view
    Sticky,
}

impl Default for CameraPolicy {
    fn default() -> Self {
        CameraPolicy::Capped {
            factor: MAX_ZOOM_OUT_FACTOR,
        }
    }
}

/// Visible world extent, from the origin to `(x_max, y_max)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraBounds {
    pub x_max: f64,
    pub y_max: f64,
}

impl CameraBounds {
    pub const BASE: Self = Self {
        x_max: BASE_WORLD_X_MAX,
        y_max: BASE_WORLD_Y_MAX,
    };

    fn as_vec(self) -> DVec2 {
        DVec2::new(self.x_max, self.y_max)
    }

    fn from_vec(v: DVec2) -> Self {
        Self {
            x_max: v.x,
            y_max: v.y,
        }
    }
}

/// Derives viewport bounds from the stream of ride snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct CameraBoundsTracker {
    policy: CameraPolicy,
    teleport_zoom_reset: bool,
    base: CameraBounds,
    padding: DVec2,
    /// Points that are always in view (track start and end)
    anchors: DVec2,
    /// Largest x and y visited since the extent last restarted
    farthest: DVec2,
    ride: u64,
    current: CameraBounds,
}

impl CameraBoundsTracker {
    pub fn new(policy: CameraPolicy, teleport_zoom_reset: bool, track: &TrackProfile) -> Self {
        let anchors = track.start_point().max(track.end_point());
        let mut tracker = Self {
            policy,
            teleport_zoom_reset,
            base: CameraBounds::BASE,
            padding: DVec2::new(CAMERA_PADDING_X, CAMERA_PADDING_Y),
            anchors,
            farthest: anchors,
            ride: 0,
            current: CameraBounds::BASE,
        };
        tracker.current = tracker.extent();
        tracker
    }

    pub fn policy(&self) -> CameraPolicy {
        self.policy
    }

    /// Bounds as of the last observed tick
    pub fn bounds(&self) -> CameraBounds {
        self.current
    }

    /// Fold one tick into the tracked extremes and return the new bounds
    pub fn observe(&mut self, snapshot: &RideSnapshot) -> CameraBounds {
        if snapshot.ride != self.ride {
            self.ride = snapshot.ride;
            if matches!(self.policy, CameraPolicy::Capped { .. }) {
                self.farthest = self.anchors;
            }
        }

        self.farthest = self.farthest.max(snapshot.pos);
        if let Some(landing_x) = snapshot.landing_x {
            self.farthest.x = self.farthest.x.max(landing_x);
        }

        // Sticky bounds only shrink on an explicit reset
        let zoom_reset = self.teleport_zoom_reset
            && matches!(self.policy, CameraPolicy::Capped { .. })
            && snapshot
                .teleport_progress
                .is_some_and(|t| t >= TELEPORT_ZOOM_RESET_FRACTION);

        self.current = if zoom_reset { self.base } else { self.extent() };
        self.current
    }

    /// Back to base extents, forgetting every visited point
    pub fn reset(&mut self) {
        self.farthest = self.anchors;
        self.ride = 0;
        self.current = self.extent();
    }

    fn extent(&self) -> CameraBounds {
        let base = self.base.as_vec();
        let wanted = base.max(self.farthest + self.padding);
        let extent = match self.policy {
            CameraPolicy::Capped { factor } => wanted.min(base * factor).max(base),
            CameraPolicy::Sticky => wanted,
        };
        CameraBounds::from_vec(extent)
    }
}
