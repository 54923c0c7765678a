//! # Geographic Utilities
//!
//! Spherical geometry primitives shared by step grouping, position simulation and the
//! route display session.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two coordinates |
//! | [`bearing`] | Initial compass bearing from one coordinate toward another |
//! | [`interpolate`] | Linear interpolation of latitude and longitude |
//! | [`polyline_length`] | Total length of a coordinate list in meters |
//! | [`compute_bounds`] | Bounding box of a coordinate list |
//! | [`to_line_string`] | Convert a coordinate list to a `geo::LineString` |
//!
//! ## Example
//!
//! ```rust
//! use skifinder_core::{Coordinate, geo_utils};
//!
//! let base = Coordinate::new(39.6042, -105.9538);
//! let summit = Coordinate::new(39.6090, -105.9430);
//!
//! let dist = geo_utils::haversine_distance(&base, &summit);
//! let heading = geo_utils::bearing(&base, &summit);
//! println!("{:.0}m at {:.0} degrees", dist, heading);
//! ```
//!
//! ## Algorithm Notes
//!
//! Distances use the haversine formula on a sphere of radius 6,371,000 m. Bearings use the
//! forward-azimuth formula normalized to [0, 360). Interpolation is plain linear
//! interpolation per component, not geodesic; route edges are short enough on a ski hill
//! that the difference is far below GPS noise.

use geo::{BoundingRect, Coord, LineString};

use crate::Coordinate;

/// Earth radius used for all distance computations, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

// =============================================================================
// Distance and Direction
// =============================================================================

/// Calculate the great-circle distance between two coordinates using the haversine formula.
///
/// # Example
///
/// ```rust
/// use skifinder_core::{Coordinate, geo_utils};
///
/// // One degree of longitude at the equator
/// let d = geo_utils::haversine_distance(&Coordinate::new(0.0, 0.0), &Coordinate::new(0.0, 1.0));
/// assert!((d - 111_195.0).abs() < 1.0);
/// ```
#[inline]
pub fn haversine_distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_METERS * c
}

/// Initial compass bearing from `start` toward `end`, in degrees clockwise from north.
///
/// Returns a value in [0, 360). Identical coordinates return exactly 0.
///
/// # Example
///
/// ```rust
/// use skifinder_core::{Coordinate, geo_utils};
///
/// let east = geo_utils::bearing(&Coordinate::new(0.0, 0.0), &Coordinate::new(0.0, 1.0));
/// assert!((east - 90.0).abs() < 1e-9);
/// ```
pub fn bearing(start: &Coordinate, end: &Coordinate) -> f64 {
    if start.lat == end.lat && start.lng == end.lng {
        return 0.0;
    }

    let lat1 = start.lat.to_radians();
    let lat2 = end.lat.to_radians();
    let d_lng = (end.lng - start.lng).to_radians();

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Linear interpolation between two coordinates, independently per component.
///
/// `fraction` 0 yields `start`, 1 yields `end`. The fraction is not clamped.
#[inline]
pub fn interpolate(start: &Coordinate, end: &Coordinate, fraction: f64) -> Coordinate {
    Coordinate::new(
        start.lat + (end.lat - start.lat) * fraction,
        start.lng + (end.lng - start.lng) * fraction,
    )
}

/// Calculate the total length of a polyline in meters.
///
/// Empty or single-point polylines return 0.0.
pub fn polyline_length(points: &[Coordinate]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

// =============================================================================
// Bounding Box Functions
// =============================================================================

/// Axis-aligned bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Get the center point of the bounds.
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    /// Latitude span in degrees.
    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Longitude span in degrees.
    pub fn lng_span(&self) -> f64 {
        self.max_lng - self.min_lng
    }
}

/// Convert coordinates to a `geo::LineString` (x = longitude, y = latitude).
pub fn to_line_string(points: &[Coordinate]) -> LineString<f64> {
    points
        .iter()
        .map(|p| Coord { x: p.lng, y: p.lat })
        .collect::<Vec<_>>()
        .into()
}

/// Compute the bounding box of a coordinate list.
///
/// Returns `None` for empty input.
///
/// # Example
///
/// ```rust
/// use skifinder_core::{Coordinate, geo_utils};
///
/// let bounds = geo_utils::compute_bounds(&[
///     Coordinate::new(39.60, -105.96),
///     Coordinate::new(39.62, -105.94),
/// ]).unwrap();
/// assert_eq!(bounds.min_lat, 39.60);
/// assert_eq!(bounds.max_lng, -105.94);
/// ```
pub fn compute_bounds(points: &[Coordinate]) -> Option<Bounds> {
    let rect = to_line_string(points).bounding_rect()?;
    Some(Bounds {
        min_lat: rect.min().y,
        max_lat: rect.max().y,
        min_lng: rect.min().x,
        max_lng: rect.max().x,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
