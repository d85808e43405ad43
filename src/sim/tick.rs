//! Ride state machine
//!
//! `OnTrack -> Flight -> Landed -> Teleporting -> OnTrack`. The driver calls
//! [`Ride::advance`] once per frame with the elapsed time and a speed
//! multiplier; each call applies exactly one phase's rule.

use glam::DVec2;

use super::camera::{CameraBounds, CameraBoundsTracker};
use super::integrator::{self, RideError, TrackMotion};
use super::projectile::{LaunchEvent, solve_trajectory};
use super::state::{LandingPolicy, RideEvent, RidePhase, RideSnapshot, RideState};
use super::track::{TrackProfile, TrackSample};
use crate::consts::*;
use crate::settings::{ConfigError, Settings, SimulationParameters};
use crate::{lerp_clamped, sanitize_dt, track_normal};

/// One simulated ride: track, parameters, state and camera
#[derive(Debug, Clone)]
pub struct Ride {
    track: TrackProfile,
    params: SimulationParameters,
    landing: LandingPolicy,
    trail_capacity: usize,
    state: RideState,
    camera: CameraBoundsTracker,
}

impl Ride {
    pub fn new(track: TrackProfile, settings: &Settings) -> Result<Self, ConfigError> {
        let params = settings.validate(&track)?;
        let camera =
            CameraBoundsTracker::new(settings.camera, settings.teleport_zoom_reset, &track);
        let state = RideState::new(track.start_point(), settings.trail_capacity);

        let mut ride = Self {
            track,
            params,
            landing: settings.landing,
            trail_capacity: settings.trail_capacity,
            state,
            camera,
        };
        ride.settle_at_start();
        Ok(ride)
    }

    pub fn track(&self) -> &TrackProfile {
        &self.track
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn state(&self) -> &RideState {
        &self.state
    }

    pub fn phase(&self) -> RidePhase {
        self.state.phase
    }

    pub fn landing_policy(&self) -> LandingPolicy {
        self.landing
    }

    /// Most recent launch and its trajectory equations
    pub fn last_launch(&self) -> Option<&LaunchEvent> {
        self.state.last_launch.as_ref()
    }

    pub fn camera_bounds(&self) -> CameraBounds {
        self.camera.bounds()
    }

    /// Take every event raised since the last drain
    pub fn drain_events(&mut self) -> Vec<RideEvent> {
        self.state.events.drain(..).collect()
    }

    /// Takes effect from the next `advance`; a zero-dt advance refreshes the
    /// derived speed and G-force without moving the cart.
    pub fn set_gravity(&mut self, gravity: f64) -> Result<(), ConfigError> {
        self.params.set_gravity(gravity)
    }

    pub fn set_initial_speed(&mut self, initial_speed: f64) -> Result<(), ConfigError> {
        self.params.set_initial_speed(initial_speed)
    }

    pub fn reset_gravity(&mut self) -> Result<(), ConfigError> {
        self.params.reset_gravity()
    }

    pub fn reset_initial_speed(&mut self) -> Result<(), ConfigError> {
        self.params.reset_initial_speed()
    }

    /// Back to the start of the track with a fresh state and camera
    pub fn reset(&mut self) {
        self.state = RideState::new(self.track.start_point(), self.trail_capacity);
        self.settle_at_start();
        self.camera.reset();
        self.state.push_event(RideEvent::Reset);
        log::info!("Ride reset");
    }

    /// Advance the ride by `dt * speed_multiplier` seconds.
    ///
    /// Negative, zero or non-finite scaled steps leave the cart where it is.
    /// On error the state is left as it was before the call.
    pub fn advance(&mut self, dt: f64, speed_multiplier: f64) -> Result<RideSnapshot, RideError> {
        let dt = sanitize_dt(dt, speed_multiplier);

        match self.state.phase {
            RidePhase::OnTrack => self.advance_on_track(dt)?,
            RidePhase::Flight => self.advance_flight(dt),
            RidePhase::Landed { landing_x, timer } => self.advance_landed(landing_x, timer, dt),
            RidePhase::Teleporting { landing_x, timer } => {
                self.advance_teleport(landing_x, timer, dt)
            }
        }

        let snapshot = self.snapshot();
        self.camera.observe(&snapshot);
        Ok(snapshot)
    }

    /// Current state without advancing (e.g. while paused)
    pub fn snapshot(&self) -> RideSnapshot {
        let s = &self.state;
        RideSnapshot {
            phase: s.phase.kind(),
            pos: s.pos,
            vel: s.vel,
            normal: track_normal(s.support.slope),
            g_force: s.g_force,
            speed: s.speed,
            speed_kph: s.speed * KPH_PER_MPS,
            ride_time: s.ride_time,
            arc_length: s.arc_length,
            trail: s.trail.to_vec(),
            landing_x: s.phase.landing_x(),
            teleport_progress: s.phase.teleport_progress(),
            ride: s.ride,
        }
    }

    fn advance_on_track(&mut self, dt: f64) -> Result<(), RideError> {
        let x = self.state.pos.x;
        let step = integrator::step_on_track(&self.track, &self.params, x, dt)?;
        let end_x = self.track.end_x();
        let reached_end = step.x >= end_x;
        let motion = integrator::track_motion(
            &self.track,
            &self.params,
            if reached_end { end_x } else { step.x },
        )?;

        self.state.ride_time += dt;
        self.state.arc_length += step.distance;

        if reached_end {
            self.launch(end_x, motion);
        } else {
            self.apply_track_motion(step.x, motion);
        }
        Ok(())
    }

    fn launch(&mut self, end_x: f64, motion: TrackMotion) {
        let pos = DVec2::new(end_x, motion.sample.height);
        let vel = motion.vel;
        let gravity = self.params.gravity();

        let equation = match solve_trajectory(pos, vel, gravity) {
            Ok(eq) => {
                log::debug!("{}", eq.parametric);
                log::debug!("{}", eq.explicit);
                Some(eq)
            }
            Err(e) => {
                log::warn!("Projectile equation unavailable: {}", e);
                None
            }
        };
        let launch = LaunchEvent { pos, vel, equation };

        log::info!(
            "Launch at ({:.2}, {:.2}) with v = ({:.2}, {:.2}) m/s",
            pos.x,
            pos.y,
            vel.x,
            vel.y
        );

        self.state.phase = RidePhase::Flight;
        self.state.trail.restart_at(pos);
        self.state.last_launch = Some(launch);
        self.state.push_event(RideEvent::Launched(launch));
        self.apply_flight(pos, vel);
    }

    fn advance_flight(&mut self, dt: f64) {
        if dt == 0.0 {
            return;
        }

        let (mut pos, mut vel) =
            integrator::step_flight(self.state.pos, self.state.vel, self.params.gravity(), dt);

        let landed = pos.y <= 0.0;
        if landed {
            pos.y = 0.0;
            vel.y = 0.0;
        }

        self.state.trail.record(pos);
        self.state.ride_time += dt;
        self.state.arc_length += vel.length() * dt;

        if landed {
            log::info!(
                "Landed at x = {:.2} after {:.2} s, {:.2} m travelled",
                pos.x,
                self.state.ride_time,
                self.state.arc_length
            );
            self.state.phase = RidePhase::Landed {
                landing_x: pos.x,
                timer: 0.0,
            };
            self.state.push_event(RideEvent::Landed { x: pos.x });
            self.apply_rest(pos);
        } else {
            self.apply_flight(pos, vel);
        }
    }

    fn advance_landed(&mut self, landing_x: f64, timer: f64, dt: f64) {
        if self.landing == LandingPolicy::Halt {
            return;
        }

        let timer = timer + dt;
        if timer >= LANDED_PAUSE_DURATION {
            log::info!("Returning to start from x = {:.2}", landing_x);
            self.state.phase = RidePhase::Teleporting {
                landing_x,
                timer: 0.0,
            };
            self.state.push_event(RideEvent::TeleportStarted);
        } else {
            self.state.phase = RidePhase::Landed { landing_x, timer };
        }
        self.apply_rest(DVec2::new(landing_x, 0.0));
    }

    fn advance_teleport(&mut self, landing_x: f64, timer: f64, dt: f64) {
        let timer = timer + dt;

        if timer >= TELEPORT_DURATION {
            self.state.ride += 1;
            self.settle_at_start();
            log::info!("Ride {} starting", self.state.ride);
            self.state.push_event(RideEvent::RideRestarted {
                ride: self.state.ride,
            });
            return;
        }

        self.state.phase = RidePhase::Teleporting { landing_x, timer };
        let from = DVec2::new(landing_x, 0.0);
        let pos = lerp_clamped(from, self.track.start_point(), timer / TELEPORT_DURATION);
        self.apply_rest(pos);
    }

    /// Put the cart at the track start with accumulators cleared
    fn settle_at_start(&mut self) {
        let start = self.track.start_point();
        self.state.restart_at(start);
        match integrator::track_motion(&self.track, &self.params, start.x) {
            Ok(motion) => self.apply_track_motion(start.x, motion),
            Err(e) => log::error!("Track start is unreachable: {}", e),
        }
    }

    fn apply_track_motion(&mut self, x: f64, motion: TrackMotion) {
        self.state.pos = DVec2::new(x, motion.sample.height);
        self.state.vel = motion.vel;
        self.state.speed = motion.speed;
        self.state.support = motion.sample;
        self.state.g_force =
            integrator::g_force(motion.sample, self.params.energy_reference_height());
    }

    fn apply_flight(&mut self, pos: DVec2, vel: DVec2) {
        self.state.pos = pos;
        self.state.vel = vel;
        self.state.speed = vel.length();
        self.apply_flat_support(pos.y);
    }

    fn apply_rest(&mut self, pos: DVec2) {
        self.state.pos = pos;
        self.state.vel = DVec2::ZERO;
        self.state.speed = 0.0;
        self.apply_flat_support(pos.y);
    }

    fn apply_flat_support(&mut self, height: f64) {
        let support = TrackSample::flat(height);
        self.state.support = support;
        self.state.g_force = integrator::g_force(support, self.params.energy_reference_height());
    }
}
