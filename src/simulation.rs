//! Rider-position simulation along a route.
//!
//! Maps a normalized progress value to a coordinate and heading by walking cumulative
//! great-circle distance over the raw route edges, then interpolating linearly inside the
//! edge that contains the target distance.
//!
//! The heading looks ahead: it points from the simulated location toward the start of the
//! next edge, so the map turns before the rider reaches a junction. On the final edge it
//! follows the edge itself.

use log::debug;

use crate::geo_utils::{bearing, haversine_distance, interpolate};
use crate::{saturating_u32, Coordinate, RouteError, RouteStep};

/// Tolerance when testing whether the target distance falls inside an edge.
pub const SCRUB_EPSILON_METERS: f64 = 0.001;

/// Result of mapping a progress value to a point on the route.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct ScrubPosition {
    /// Simulated rider location
    pub location: Coordinate,
    /// Compass heading in degrees; `None` when the walk fell through to the route end,
    /// in which case the previous heading should be kept
    pub heading: Option<f64>,
    /// Raw edge containing the location; `None` on the route-end fallback
    pub segment_index: Option<u32>,
}

/// Precomputed edge lengths for repeated scrubbing over one path.
#[derive(Debug, Clone)]
pub struct RouteSimulator {
    endpoints: Vec<(Coordinate, Coordinate)>,
    segment_lengths: Vec<f64>,
    total_length: f64,
}

impl RouteSimulator {
    /// Measure every edge of `path` once.
    ///
    /// Returns [`RouteError::EmptyPath`] for an empty path.
    pub fn new(path: &[RouteStep]) -> Result<Self, RouteError> {
        if path.is_empty() {
            return Err(RouteError::EmptyPath);
        }

        let endpoints: Vec<(Coordinate, Coordinate)> = path
            .iter()
            .map(|step| (step.start_coords, step.end_coords))
            .collect();
        let segment_lengths: Vec<f64> = endpoints
            .iter()
            .map(|(start, end)| haversine_distance(start, end))
            .collect();
        let total_length = segment_lengths.iter().sum();

        debug!(
            "[Simulator] {} segments, {:.0}m total",
            segment_lengths.len(),
            total_length
        );

        Ok(Self { endpoints, segment_lengths, total_length })
    }

    /// Great-circle length of each raw edge in meters.
    pub fn segment_lengths(&self) -> &[f64] {
        &self.segment_lengths
    }

    /// Sum of all edge lengths in meters.
    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    /// Start of the first edge.
    pub fn start(&self) -> Coordinate {
        self.endpoints[0].0
    }

    /// End of the last edge.
    pub fn end(&self) -> Coordinate {
        self.endpoints[self.endpoints.len() - 1].1
    }

    /// Map `progress` (fraction of total route length) to a position and heading.
    ///
    /// Progress is clamped to [0, 1]; NaN is rejected with [`RouteError::InvalidProgress`].
    ///
    /// # Example
    /// ```
    /// use skifinder_core::{Coordinate, RouteSimulator, RouteStep, SegmentType};
    ///
    /// let path = vec![
    ///     RouteStep::new(1, Some("Lift"), SegmentType::Lift, Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0)),
    /// ];
    /// let sim = RouteSimulator::new(&path).unwrap();
    ///
    /// let end = sim.scrub(1.0).unwrap();
    /// assert_eq!(end.location, Coordinate::new(1.0, 0.0));
    /// assert_eq!(end.heading, Some(0.0)); // due north
    /// ```
    pub fn scrub(&self, progress: f64) -> Result<ScrubPosition, RouteError> {
        if progress.is_nan() {
            return Err(RouteError::InvalidProgress(progress));
        }

        let target = self.total_length * progress.clamp(0.0, 1.0);
        let mut cumulative = 0.0;

        for (k, ((start, end), &length)) in self
            .endpoints
            .iter()
            .zip(self.segment_lengths.iter())
            .enumerate()
        {
            if cumulative + length >= target - SCRUB_EPSILON_METERS {
                let fraction = if length > 0.0 {
                    (target - cumulative) / length
                } else {
                    0.0
                };
                let location = interpolate(start, end, fraction.clamp(0.0, 1.0));

                let heading = match self.endpoints.get(k + 1) {
                    Some((next_start, _)) => bearing(&location, next_start),
                    None => bearing(start, end),
                };

                return Ok(ScrubPosition {
                    location,
                    heading: Some(heading),
                    segment_index: Some(saturating_u32(k)),
                });
            }
            cumulative += length;
        }

        // Only reachable when the lengths do not add up (non-finite geometry)
        Ok(ScrubPosition {
            location: self.end(),
            heading: None,
            segment_index: None,
        })
    }
}

/// One-shot scrub without keeping the precomputed lengths.
pub fn scrub_route(path: &[RouteStep], progress: f64) -> Result<ScrubPosition, RouteError> {
    RouteSimulator::new(path)?.scrub(progress)
}
