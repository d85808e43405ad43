//! Visual effects derived from ride snapshots
//!
//! Effects read the simulation but never feed back into it. Jitter comes from
//! a seeded PCG stream so a given seed always looks the same.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::sim::{RideSnapshot, TrackProfile};

/// Sparkles along the full return path
pub const TELEPORT_SPARKLE_STEPS: usize = 30;
/// Max offset of a sparkle from the return path (m)
pub const SPARKLE_JITTER: f64 = 0.15;
/// Sparkle edge length range (m)
pub const SPARKLE_SIZE_MIN: f64 = 0.12;
pub const SPARKLE_SIZE_MAX: f64 = 0.2;

/// One square of the teleport trail
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sparkle {
    pub pos: DVec2,
    pub size: f64,
}

/// Jittered dotted line from the landing point back to the start
#[derive(Debug, Clone)]
pub struct TeleportEffect {
    seed: u64,
    rng: Pcg32,
}

impl TeleportEffect {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restart the jitter stream from the seed
    pub fn reseed(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
    }

    /// Sparkles revealed so far, `progress` in [0, 1]
    pub fn sparkles(&mut self, from: DVec2, to: DVec2, progress: f64) -> Vec<Sparkle> {
        let progress = progress.clamp(0.0, 1.0);
        let mut out = Vec::with_capacity(TELEPORT_SPARKLE_STEPS);

        for i in 0..TELEPORT_SPARKLE_STEPS {
            let frac = (i + 1) as f64 / TELEPORT_SPARKLE_STEPS as f64;
            if frac > progress {
                break;
            }
            let jitter = DVec2::new(
                self.rng.random_range(-SPARKLE_JITTER..SPARKLE_JITTER),
                self.rng.random_range(-SPARKLE_JITTER..SPARKLE_JITTER),
            );
            out.push(Sparkle {
                pos: from + (to - from) * frac + jitter,
                size: self.rng.random_range(SPARKLE_SIZE_MIN..SPARKLE_SIZE_MAX),
            });
        }
        out
    }

    /// Sparkles for the current tick; empty unless the ride is teleporting
    pub fn for_snapshot(&mut self, snapshot: &RideSnapshot, track: &TrackProfile) -> Vec<Sparkle> {
        match (snapshot.teleport_progress, snapshot.landing_x) {
            (Some(progress), Some(landing_x)) => {
                self.sparkles(DVec2::new(landing_x, 0.0), track.start_point(), progress)
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FROM: DVec2 = DVec2::new(47.0, 0.0);
    const TO: DVec2 = DVec2::new(0.0, 20.0);

    #[test]
    fn test_reveal_follows_progress() {
        let mut fx = TeleportEffect::new(7);
        assert!(fx.sparkles(FROM, TO, 0.0).is_empty());
        assert_eq!(fx.sparkles(FROM, TO, 0.5).len(), 15);
        assert_eq!(fx.sparkles(FROM, TO, 1.0).len(), TELEPORT_SPARKLE_STEPS);
        assert_eq!(fx.sparkles(FROM, TO, 4.0).len(), TELEPORT_SPARKLE_STEPS);
    }

    #[test]
    fn test_sparkles_hug_the_path() {
        let mut fx = TeleportEffect::new(99);
        for (i, s) in fx.sparkles(FROM, TO, 1.0).iter().enumerate() {
            let frac = (i + 1) as f64 / TELEPORT_SPARKLE_STEPS as f64;
            let on_path = FROM + (TO - FROM) * frac;
            assert!((s.pos - on_path).abs().max_element() <= SPARKLE_JITTER);
            assert!((SPARKLE_SIZE_MIN..SPARKLE_SIZE_MAX).contains(&s.size));
        }
    }

    #[test]
    fn test_same_seed_same_sparkles() {
        let mut a = TeleportEffect::new(1234);
        let mut b = TeleportEffect::new(1234);
        assert_eq!(a.sparkles(FROM, TO, 0.8), b.sparkles(FROM, TO, 0.8));

        let first = {
            a.reseed();
            a.sparkles(FROM, TO, 1.0)
        };
        a.reseed();
        assert_eq!(a.sparkles(FROM, TO, 1.0), first);
    }

    #[test]
    fn test_no_sparkles_off_teleport() {
        use crate::settings::Settings;
        use crate::sim::Ride;

        let ride = Ride::new(TrackProfile::reference(), &Settings::default()).unwrap();
        let mut fx = TeleportEffect::new(0);
        assert!(fx.for_snapshot(&ride.snapshot(), ride.track()).is_empty());
    }
}
