//! Analytic track profile
//!
//! The track is a piecewise function over disjoint horizontal intervals.
//! Each piece is a centered power curve:
//! - height:    h(x)   = k * (x - c)^p + d
//! - slope:     h'(x)  = p * k * (x - c)^(p-1)
//! - curvature: h''(x) = p * (p-1) * k * (x - c)^(p-2)
//!
//! Intervals are half-open `[start, end)` except the last, which is closed, so
//! every real x maps to at most one segment. Outside every segment the track
//! reports the fallback height with zero slope and curvature.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Height and its first two derivatives at one x
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackSample {
    pub height: f64,
    pub slope: f64,
    pub curvature: f64,
}

impl TrackSample {
    /// Sample used for every off-track phase: flat, straight, at the given height
    pub fn flat(height: f64) -> Self {
        Self {
            height,
            slope: 0.0,
            curvature: 0.0,
        }
    }
}

/// One polynomial piece of the track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackSegment {
    /// Left edge of the interval (inclusive)
    pub start: f64,
    /// Right edge of the interval (exclusive unless last)
    pub end: f64,
    /// Leading coefficient k
    pub coeff: f64,
    /// Center c of the power term
    pub center: f64,
    /// Exponent p
    pub power: i32,
    /// Vertical offset d
    pub offset: f64,
}

impl TrackSegment {
    pub fn new(start: f64, end: f64, coeff: f64, center: f64, power: i32, offset: f64) -> Self {
        Self {
            start,
            end,
            coeff,
            center,
            power,
            offset,
        }
    }

    #[inline]
    pub fn height(&self, x: f64) -> f64 {
        self.coeff * (x - self.center).powi(self.power) + self.offset
    }

    #[inline]
    pub fn slope(&self, x: f64) -> f64 {
        if self.power == 0 {
            return 0.0;
        }
        let p = self.power as f64;
        p * self.coeff * (x - self.center).powi(self.power - 1)
    }

    #[inline]
    pub fn curvature(&self, x: f64) -> f64 {
        if self.power < 2 {
            return 0.0;
        }
        let p = self.power as f64;
        p * (p - 1.0) * self.coeff * (x - self.center).powi(self.power - 2)
    }

    pub fn sample(&self, x: f64) -> TrackSample {
        TrackSample {
            height: self.height(x),
            slope: self.slope(x),
            curvature: self.curvature(x),
        }
    }

    /// Highest point over the segment's interval.
    ///
    /// `(x - c)^p` is monotone on each side of `c`, so the extremes sit at the
    /// interval edges or at the center.
    pub fn peak_height(&self) -> f64 {
        let mut peak = self.height(self.start).max(self.height(self.end));
        if self.center > self.start && self.center < self.end {
            peak = peak.max(self.height(self.center));
        }
        peak
    }

    /// Lowest point over the segment's interval
    pub fn floor_height(&self) -> f64 {
        let mut floor = self.height(self.start).min(self.height(self.end));
        if self.center > self.start && self.center < self.end {
            floor = floor.min(self.height(self.center));
        }
        floor
    }
}

/// Track construction errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    #[error("track has no segments")]
    Empty,

    #[error("segment {index} has an empty or inverted interval [{start}, {end}]")]
    InvertedSegment { index: usize, start: f64, end: f64 },

    #[error("segment {index} has negative exponent {power}")]
    NegativePower { index: usize, power: i32 },

    #[error("segment {index} starts at {start} but the previous one ends at {previous_end}")]
    Gap {
        index: usize,
        start: f64,
        previous_end: f64,
    },

    #[error("height jumps by {jump} at x = {x}")]
    HeightDiscontinuity { x: f64, jump: f64 },

    #[error("slope jumps by {jump} at x = {x}")]
    SlopeDiscontinuity { x: f64, jump: f64 },
}

/// The full piecewise track. Stateless once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackProfile {
    segments: Vec<TrackSegment>,
    fallback_height: f64,
}

impl Default for TrackProfile {
    fn default() -> Self {
        Self::reference()
    }
}

impl TrackProfile {
    /// Build a track, checking that segments tile the domain left to right
    /// with continuous height and slope. Exponents must be non-negative so
    /// every segment is a polynomial with no pole inside its interval.
    pub fn new(segments: Vec<TrackSegment>, fallback_height: f64) -> Result<Self, TrackError> {
        if segments.is_empty() {
            return Err(TrackError::Empty);
        }

        for (index, seg) in segments.iter().enumerate() {
            if !(seg.end > seg.start) {
                return Err(TrackError::InvertedSegment {
                    index,
                    start: seg.start,
                    end: seg.end,
                });
            }
            if seg.power < 0 {
                return Err(TrackError::NegativePower {
                    index,
                    power: seg.power,
                });
            }
        }

        for (index, pair) in segments.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            if (next.start - prev.end).abs() > TRACK_CONTINUITY_TOLERANCE {
                return Err(TrackError::Gap {
                    index: index + 1,
                    start: next.start,
                    previous_end: prev.end,
                });
            }

            let x = next.start;
            let scale = 1.0 + prev.height(x).abs();
            let jump = next.height(x) - prev.height(x);
            if jump.abs() > TRACK_CONTINUITY_TOLERANCE * scale {
                return Err(TrackError::HeightDiscontinuity { x, jump });
            }

            let scale = 1.0 + prev.slope(x).abs();
            let jump = next.slope(x) - prev.slope(x);
            if jump.abs() > TRACK_CONTINUITY_TOLERANCE * scale {
                return Err(TrackError::SlopeDiscontinuity { x, jump });
            }
        }

        Ok(Self {
            segments,
            fallback_height,
        })
    }

    /// Two drops and two valleys over 0..35 m.
    ///
    /// Heights meet at 12 m on every boundary with slopes of ±3.2.
    pub fn reference() -> Self {
        Self {
            segments: vec![
                // First drop off the 20 m start
                TrackSegment::new(0.0, 5.0, -0.32, 0.0, 2, 20.0),
                // Flat-bottomed valley
                TrackSegment::new(5.0, 15.0, 0.0064, 10.0, 4, 8.0),
                // Second hill, back to 20 m
                TrackSegment::new(15.0, 25.0, -0.32, 20.0, 2, 20.0),
                // Deeper valley rising to the launch lip
                TrackSegment::new(25.0, TRACK_END_X, 0.32, 30.0, 2, 4.0),
            ],
            fallback_height: TRACK_FALLBACK_HEIGHT,
        }
    }

    pub fn segments(&self) -> &[TrackSegment] {
        &self.segments
    }

    pub fn fallback_height(&self) -> f64 {
        self.fallback_height
    }

    /// x where the cart starts
    pub fn start_x(&self) -> f64 {
        self.segments[0].start
    }

    /// x where the cart leaves the track
    pub fn end_x(&self) -> f64 {
        self.segments[self.segments.len() - 1].end
    }

    pub fn start_point(&self) -> DVec2 {
        let x = self.start_x();
        DVec2::new(x, self.height(x))
    }

    pub fn end_point(&self) -> DVec2 {
        let x = self.end_x();
        DVec2::new(x, self.height(x))
    }

    fn segment_at(&self, x: f64) -> Option<&TrackSegment> {
        let last = self.segments.len() - 1;
        self.segments.iter().enumerate().find_map(|(i, seg)| {
            let inside = if i == last {
                x >= seg.start && x <= seg.end
            } else {
                x >= seg.start && x < seg.end
            };
            inside.then_some(seg)
        })
    }

    pub fn height(&self, x: f64) -> f64 {
        self.segment_at(x)
            .map_or(self.fallback_height, |seg| seg.height(x))
    }

    pub fn slope(&self, x: f64) -> f64 {
        self.segment_at(x).map_or(0.0, |seg| seg.slope(x))
    }

    pub fn curvature(&self, x: f64) -> f64 {
        self.segment_at(x).map_or(0.0, |seg| seg.curvature(x))
    }

    /// Height, slope and curvature from one segment lookup
    pub fn sample(&self, x: f64) -> TrackSample {
        self.segment_at(x)
            .map_or(TrackSample::flat(self.fallback_height), |seg| seg.sample(x))
    }

    /// Highest point the cart must pass between start and end
    pub fn peak_height(&self) -> f64 {
        self.segments
            .iter()
            .map(TrackSegment::peak_height)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Lowest point of the track
    pub fn floor_height(&self) -> f64 {
        self.segments
            .iter()
            .map(TrackSegment::floor_height)
            .fold(f64::INFINITY, f64::min)
    }

    /// Points along the track every `step` metres, always including the end
    pub fn polyline(&self, step: f64) -> Vec<DVec2> {
        let start = self.start_x();
        let end = self.end_x();
        if !(step.is_finite() && step > 0.0) {
            return vec![self.start_point(), self.end_point()];
        }

        let count = ((end - start) / step).floor() as usize;
        let mut points: Vec<DVec2> = (0..=count)
            .map(|i| {
                let x = (start + i as f64 * step).min(end);
                DVec2::new(x, self.height(x))
            })
            .collect();

        if points.last().is_some_and(|p| p.x < end) {
            points.push(self.end_point());
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const H: f64 = 1e-6;

    fn boundaries() -> Vec<f64> {
        TrackProfile::reference()
            .segments()
            .iter()
            .skip(1)
            .map(|s| s.start)
            .collect()
    }

    #[test]
    fn test_reference_known_values() {
        let track = TrackProfile::reference();
        assert_eq!(track.height(0.0), 20.0);
        assert_eq!(track.height(10.0), 8.0);
        assert_eq!(track.height(20.0), 20.0);
        assert_eq!(track.height(30.0), 4.0);
        assert!((track.height(35.0) - 12.0).abs() < 1e-12);
        assert!((track.slope(35.0) - 3.2).abs() < 1e-12);
        assert_eq!(track.curvature(2.0), -0.64);
        assert_eq!(track.curvature(30.0), 0.64);
    }

    #[test]
    fn test_out_of_range_is_fallback() {
        let track = TrackProfile::reference();
        for x in [-1.0, 35.0001, 1e9, f64::NEG_INFINITY, f64::NAN] {
            assert_eq!(track.height(x), TRACK_FALLBACK_HEIGHT);
            assert_eq!(track.slope(x), 0.0);
            assert_eq!(track.curvature(x), 0.0);
        }
    }

    #[test]
    fn test_last_segment_is_closed() {
        let track = TrackProfile::reference();
        let end = track.end_x();
        assert_eq!(track.sample(end), track.segments()[3].sample(end));
    }

    #[test]
    fn test_boundaries_use_right_segment() {
        let track = TrackProfile::reference();
        for (i, x) in boundaries().into_iter().enumerate() {
            assert_eq!(track.curvature(x), track.segments()[i + 1].curvature(x));
        }
    }

    #[test]
    fn test_height_and_slope_continuous_at_boundaries() {
        let track = TrackProfile::reference();
        for x in boundaries() {
            let left = track.height(x - 1e-9);
            let right = track.height(x);
            assert!((left - right).abs() < 1e-6, "height jump at {x}");

            let left = track.slope(x - 1e-9);
            let right = track.slope(x);
            assert!((left - right).abs() < 1e-6, "slope jump at {x}");
        }
    }

    #[test]
    fn test_peak_and_floor() {
        let track = TrackProfile::reference();
        assert_eq!(track.peak_height(), 20.0);
        assert_eq!(track.floor_height(), 4.0);
    }

    #[test]
    fn test_new_rejects_height_jump() {
        let segs = vec![
            TrackSegment::new(0.0, 5.0, -0.32, 0.0, 2, 20.0),
            TrackSegment::new(5.0, 10.0, 0.0, 0.0, 0, 3.0),
        ];
        assert!(matches!(
            TrackProfile::new(segs, 20.0),
            Err(TrackError::HeightDiscontinuity { .. })
        ));
    }

    #[test]
    fn test_new_rejects_slope_kink() {
        // Heights meet at 12 m but slope goes from -3.2 to 0
        let segs = vec![
            TrackSegment::new(0.0, 5.0, -0.32, 0.0, 2, 20.0),
            TrackSegment::new(5.0, 10.0, 0.0, 0.0, 0, 12.0),
        ];
        assert!(matches!(
            TrackProfile::new(segs, 20.0),
            Err(TrackError::SlopeDiscontinuity { .. })
        ));
    }

    #[test]
    fn test_new_rejects_gaps_and_inverted() {
        assert_eq!(TrackProfile::new(Vec::new(), 0.0), Err(TrackError::Empty));

        let inverted = vec![TrackSegment::new(5.0, 1.0, 1.0, 0.0, 1, 0.0)];
        assert!(matches!(
            TrackProfile::new(inverted, 0.0),
            Err(TrackError::InvertedSegment { index: 0, .. })
        ));

        let gap = vec![
            TrackSegment::new(0.0, 1.0, 0.0, 0.0, 0, 1.0),
            TrackSegment::new(2.0, 3.0, 0.0, 0.0, 0, 1.0),
        ];
        assert!(matches!(
            TrackProfile::new(gap, 0.0),
            Err(TrackError::Gap { index: 1, .. })
        ));
    }

    #[test]
    fn test_new_rejects_negative_power() {
        let pole = vec![TrackSegment::new(0.0, 5.0, 1.0, -1.0, -1, 0.0)];
        assert_eq!(
            TrackProfile::new(pole, 0.0),
            Err(TrackError::NegativePower {
                index: 0,
                power: -1
            })
        );

        let flat_then_pole = vec![
            TrackSegment::new(0.0, 1.0, 0.0, 0.0, 0, 1.0),
            TrackSegment::new(1.0, 2.0, 0.0, 0.0, -2, 1.0),
        ];
        assert!(matches!(
            TrackProfile::new(flat_then_pole, 0.0),
            Err(TrackError::NegativePower { index: 1, .. })
        ));
    }

    #[test]
    fn test_new_accepts_reference_segments() {
        let reference = TrackProfile::reference();
        let rebuilt =
            TrackProfile::new(reference.segments().to_vec(), reference.fallback_height()).unwrap();
        assert_eq!(rebuilt, reference);
    }

    #[test]
    fn test_polyline_covers_track() {
        let track = TrackProfile::reference();
        let pts = track.polyline(0.1);
        assert_eq!(pts.first().unwrap().x, 0.0);
        assert_eq!(pts.last().unwrap().x, 35.0);
        assert!(pts.windows(2).all(|w| w[1].x > w[0].x));

        let coarse = track.polyline(-1.0);
        assert_eq!(coarse.len(), 2);
    }

    fn interior_x() -> impl Strategy<Value = f64> {
        // Stay clear of the boundaries so central differences hit one segment
        prop_oneof![
            0.01f64..4.99,
            5.01f64..14.99,
            15.01f64..24.99,
            25.01f64..34.99,
        ]
    }

    proptest! {
        #[test]
        fn slope_matches_numerical_derivative(x in interior_x()) {
            let track = TrackProfile::reference();
            let numeric = (track.height(x + H) - track.height(x - H)) / (2.0 * H);
            prop_assert!((numeric - track.slope(x)).abs() < 1e-4);
        }

        #[test]
        fn curvature_matches_numerical_derivative(x in interior_x()) {
            let track = TrackProfile::reference();
            let numeric = (track.slope(x + H) - track.slope(x - H)) / (2.0 * H);
            prop_assert!((numeric - track.curvature(x)).abs() < 1e-4);
        }

        #[test]
        fn height_never_exceeds_peak(x in -10.0f64..45.0) {
            let track = TrackProfile::reference();
            prop_assert!(track.height(x) <= track.peak_height());
        }
    }
}
