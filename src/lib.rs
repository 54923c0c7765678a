//! # SkiFinder Core
//!
//! On-mountain route display logic for the SkiFinder mobile app.
//!
//! The routing service computes the path; this library turns that path into something a
//! rider can follow:
//! - Grouping raw trail/lift/connector edges into user-facing steps
//! - Simulating a rider position and heading anywhere along the route
//! - A display session model producing polylines, markers, camera commands and the step overlay
//! - A typed client for the SkiFinder API (resorts, POIs, lifts, routes, auth)
//!
//! ## Features
//!
//! - **`http`** - Enable the async API client
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use skifinder_core::{Coordinate, RouteStep, SegmentType, group_route_steps, scrub_route};
//!
//! let path = vec![
//!     RouteStep::new(1, Some("Run1"), SegmentType::Trail, Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0)),
//!     RouteStep::new(2, Some("Run1"), SegmentType::Trail, Coordinate::new(0.0, 1.0), Coordinate::new(0.0, 2.0)),
//! ];
//!
//! let steps = group_route_steps(&path).unwrap();
//! assert_eq!(steps.len(), 1);
//! assert_eq!(steps[0].end_coords, Coordinate::new(0.0, 2.0));
//!
//! let position = scrub_route(&path, 0.5).unwrap();
//! assert!((position.location.lng - 1.0).abs() < 1e-9);
//! ```

use log::warn;
use serde::de::IntoDeserializer;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub mod geo_utils;
pub use geo_utils::Bounds;

pub mod grouping;
pub use grouping::group_route_steps;

pub mod simulation;
pub use simulation::{RouteSimulator, ScrubPosition, scrub_route};

pub mod display;
pub use display::{
    CameraCommand, InitialCamera, RouteDisplay, RoutePolylines, StepIndicator, StepMarker,
    StepTransition, UserMarker,
};

pub mod catalog;
pub use catalog::{
    AutocompleteOption, Lift, Poi, Resort, RouteRequest, filter_options, poi_to_options,
    pois_to_options,
};

pub mod auth;

pub mod config;
pub use config::{ApiConfig, Environment};

// HTTP module for the SkiFinder API
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{ApiClient, ApiError, MemoryTokenStore, RefreshCoordinator, TokenStore};

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("SkiFinderRust")
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// Name the routing service gives to joining edges between two named features.
pub const CONNECTOR_NAME: &str = "Connector";

/// A latitude/longitude pair in degrees.
///
/// # Example
/// ```
/// use skifinder_core::Coordinate;
/// let summit = Coordinate::new(39.6042, -105.9538);
/// assert!(summit.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Create a new coordinate.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Check if the coordinate is finite and within WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lng >= -180.0
            && self.lng <= 180.0
    }

    /// Both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Kind of edge in a computed route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[serde(rename_all = "lowercase")]
pub enum SegmentType {
    Trail,
    Lift,
    Intersection,
}

/// Trail difficulty rating, ordered from easiest to hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Green,
    Blue,
    BlueBlack,
    Black,
    DoubleBlack,
}

impl Difficulty {
    /// Parse a wire label such as `"blue_black"`.
    pub fn from_label(label: &str) -> Option<Self> {
        let parsed: Result<Self, serde::de::value::Error> =
            Self::deserialize(label.into_deserializer());
        parsed.ok()
    }
}

/// Unknown difficulty labels decode as `None` so one unexpected rating does not reject
/// the whole route.
fn deserialize_difficulty<'de, D>(deserializer: D) -> Result<Option<Difficulty>, D::Error>
where
    D: Deserializer<'de>,
{
    let label: Option<String> = Option::deserialize(deserializer)?;
    Ok(label.and_then(|label| {
        let difficulty = Difficulty::from_label(&label);
        if difficulty.is_none() {
            warn!("[RouteStep] Unknown difficulty '{}', ignoring", label);
        }
        difficulty
    }))
}

/// Narrow an index or count for the FFI records, saturating at `u32::MAX`.
pub(crate) fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// One atomic traversable edge as returned by the routing service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct RouteStep {
    /// Edge identifier (not unique across a route)
    pub id: i64,
    /// Trail or lift name; `"Connector"` for joining edges, may be absent
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub segment_type: SegmentType,
    pub start_point_id: i64,
    pub end_point_id: i64,
    /// Non-negative traversal estimate
    pub estimated_time_minutes: f64,
    /// Absent for lifts and connectors; unknown labels decode as `None`
    #[serde(default, deserialize_with = "deserialize_difficulty")]
    pub difficulty: Option<Difficulty>,
    pub start_coords: Coordinate,
    pub end_coords: Coordinate,
}

impl RouteStep {
    /// Create a step with zero duration, no difficulty and zeroed point ids.
    ///
    /// Mostly useful for building paths by hand; paths from the routing service are
    /// deserialized directly.
    pub fn new(
        id: i64,
        name: Option<&str>,
        segment_type: SegmentType,
        start_coords: Coordinate,
        end_coords: Coordinate,
    ) -> Self {
        Self {
            id,
            name: name.map(str::to_string),
            segment_type,
            start_point_id: 0,
            end_point_id: 0,
            estimated_time_minutes: 0.0,
            difficulty: None,
            start_coords,
            end_coords,
        }
    }

    /// Builder-style duration setter.
    pub fn with_minutes(mut self, minutes: f64) -> Self {
        self.estimated_time_minutes = minutes;
        self
    }

    /// Builder-style difficulty setter.
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    /// True for joining edges that are never shown as a step of their own.
    pub fn is_connector(&self) -> bool {
        self.name.as_deref() == Some(CONNECTOR_NAME)
    }
}

/// A user-facing instruction covering a contiguous run of raw edges.
///
/// Representative fields (`id`, `name`, `segment_type`, point ids, `difficulty`) come from
/// the first non-connector edge of the run. Coordinates and duration cover the whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GroupedStep {
    pub id: i64,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub segment_type: SegmentType,
    pub start_point_id: i64,
    pub end_point_id: i64,
    /// Sum over `original_steps`
    pub estimated_time_minutes: f64,
    #[serde(default, deserialize_with = "deserialize_difficulty")]
    pub difficulty: Option<Difficulty>,
    /// Start of the first edge in `original_steps`
    pub start_coords: Coordinate,
    /// End of the last edge in `original_steps`
    pub end_coords: Coordinate,
    /// The contiguous slice of raw edges this step subsumes
    pub original_steps: Vec<RouteStep>,
}

impl GroupedStep {
    /// Name shown in the step overlay.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(CONNECTOR_NAME)
    }

    /// Ordered `start, end` pairs of every raw edge in this step.
    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.original_steps
            .iter()
            .flat_map(|step| [step.start_coords, step.end_coords])
            .collect()
    }
}

/// Errors raised when a route cannot be displayed or simulated.
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error), uniffi(flat_error))]
pub enum RouteError {
    #[error("route path is empty")]
    EmptyPath,
    #[error("route path of {segments} segments contains only connectors")]
    NoNavigableSteps { segments: usize },
    #[error("step index {index} out of range for {len} steps")]
    StepOutOfRange { index: usize, len: usize },
    #[error("invalid simulation progress: {0}")]
    InvalidProgress(f64),
}

// ============================================================================
// FFI Exports (only when feature enabled)
// ============================================================================

#[cfg(feature = "ffi")]
mod ffi {
    use super::*;
    use log::{debug, info};

    /// Group a raw route path into display steps.
    #[uniffi::export]
    pub fn group_steps(path: Vec<RouteStep>) -> Result<Vec<GroupedStep>, RouteError> {
        init_logging();
        info!("[SkiFinderRust] group_steps called with {} segments", path.len());
        let steps = group_route_steps(&path)?;
        info!("[SkiFinderRust] Grouped into {} steps", steps.len());
        Ok(steps)
    }

    /// Map a progress value in [0, 1] to a simulated rider position.
    #[uniffi::export]
    pub fn scrub_path(path: Vec<RouteStep>, progress: f64) -> Result<ScrubPosition, RouteError> {
        init_logging();
        debug!("[SkiFinderRust] scrub_path progress={:.3} over {} segments", progress, path.len());
        scrub_route(&path, progress)
    }

    /// Build the step overlay for a step index and simulated rider location.
    #[uniffi::export]
    pub fn step_indicator(
        path: Vec<RouteStep>,
        step_index: u32,
        location: Coordinate,
    ) -> Result<StepIndicator, RouteError> {
        init_logging();
        let steps = group_route_steps(&path)?;
        StepIndicator::for_step(&steps, step_index as usize, location)
    }

    /// Expand POIs into autocomplete options (aliases included).
    #[uniffi::export]
    pub fn poi_options(pois: Vec<Poi>) -> Vec<AutocompleteOption> {
        pois_to_options(&pois)
    }

    /// Suggestions for the text typed into a start/destination picker.
    #[uniffi::export]
    pub fn search_options(
        options: Vec<AutocompleteOption>,
        query: String,
        show_all: bool,
        max_options: u32,
    ) -> Vec<AutocompleteOption> {
        filter_options(&options, &query, show_all, max_options as usize)
    }

    /// Base URL of the API for the environment the library was configured with.
    #[uniffi::export]
    pub fn default_api_base_url() -> String {
        init_logging();
        let config = ApiConfig::from_env();
        info!("[SkiFinderRust] API base url: {}", config.base_url);
        config.base_url
    }
}

// ============================================================================
// Tests
// ============================================================================
