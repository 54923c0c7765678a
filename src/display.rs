//! Route display session: the state behind the turn-by-turn map screen.
//!
//! A [`RouteDisplay`] is created once per received path and owns everything the screen
//! shows:
//! - grouped steps and the index of the step being narrated
//! - the simulated rider position driven by the scrubber
//! - polylines, markers, camera commands and the step overlay derived from both
//!
//! Step advance and scrubbing are independent. "Next" only changes the narrated step and
//! never moves the rider marker; scrubbing only moves the rider and the camera.

use log::{debug, info};

use crate::geo_utils::{bearing, compute_bounds, haversine_distance, Bounds};
use crate::simulation::RouteSimulator;
use crate::{group_route_steps, saturating_u32, Coordinate, GroupedStep, RouteError, RouteStep};

/// Camera pitch used while following the rider, in degrees.
pub const CAMERA_PITCH: f64 = 60.0;
/// Initial map zoom level.
pub const CAMERA_ZOOM: f64 = 18.0;
/// Latitude/longitude span of the region kept around the rider, in degrees.
pub const REGION_DELTA: f64 = 0.002;

/// Instruction for the map surface. Commands apply immediately, without animation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum CameraCommand {
    /// Center the map on a point, keeping a fixed span
    Region {
        latitude: f64,
        longitude: f64,
        latitude_delta: f64,
        longitude_delta: f64,
    },
    /// Rotate and tilt the camera
    Orientation { heading: f64, pitch: f64 },
}

/// Camera pose for the first render of the map.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct InitialCamera {
    pub center: Coordinate,
    pub pitch: f64,
    pub heading: f64,
    pub zoom: f64,
}

/// Outcome of pressing "Next".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum StepTransition {
    /// Moved on to the step at `index`
    Advanced { index: u32 },
    /// The last step was already showing; the screen should close
    Finished,
}

/// Coordinate lists for the three route layers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct RoutePolylines {
    /// Every raw edge, in order
    pub full_route: Vec<Coordinate>,
    /// Edges of the narrated step (highlighted)
    pub current_step: Vec<Coordinate>,
    /// One polyline per remaining step
    pub other_steps: Vec<Vec<Coordinate>>,
}

/// End point of a grouped step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct StepMarker {
    pub step_index: u32,
    pub location: Coordinate,
    pub is_current: bool,
}

/// The simulated rider arrow.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct UserMarker {
    pub location: Coordinate,
    pub heading: f64,
}

/// Content of the step overlay card.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct StepIndicator {
    /// Step name, "Connector" when the step has none
    pub name: String,
    /// 1-based position of the step
    pub ordinal: u32,
    pub total: u32,
    /// Step duration rounded to one decimal
    pub estimated_minutes: f64,
    /// Rider distance to the step's end point, whole meters
    pub distance_to_next_meters: u32,
    pub is_last: bool,
    /// "Next Step" or "Finish Route"
    pub action_label: String,
}

impl StepIndicator {
    /// Overlay for `steps[index]` with the rider at `location`.
    pub fn for_step(
        steps: &[GroupedStep],
        index: usize,
        location: Coordinate,
    ) -> Result<Self, RouteError> {
        let step = steps.get(index).ok_or(RouteError::StepOutOfRange {
            index,
            len: steps.len(),
        })?;
        Ok(Self::build(step, index, steps.len(), location))
    }

    fn build(step: &GroupedStep, index: usize, total: usize, location: Coordinate) -> Self {
        let is_last = index + 1 == total;
        let distance = haversine_distance(&location, &step.end_coords);

        Self {
            name: step.display_name().to_string(),
            ordinal: saturating_u32(index + 1),
            total: saturating_u32(total),
            estimated_minutes: (step.estimated_time_minutes * 10.0).round() / 10.0,
            distance_to_next_meters: distance.round() as u32,
            is_last,
            action_label: if is_last { "Finish Route" } else { "Next Step" }.to_string(),
        }
    }

    /// Secondary overlay line, e.g. "Step 2 of 5 • About 3.5 min".
    pub fn summary(&self) -> String {
        format!(
            "Step {} of {} • About {} min",
            self.ordinal, self.total, self.estimated_minutes
        )
    }
}

/// State of one route display screen.
#[derive(Debug, Clone)]
pub struct RouteDisplay {
    path: Vec<RouteStep>,
    steps: Vec<GroupedStep>,
    simulator: RouteSimulator,
    user_location: Coordinate,
    user_heading: f64,
    progress: f64,
    step_index: usize,
    finished: bool,
}

impl RouteDisplay {
    /// Start a display session for a path received from the routing service.
    ///
    /// Fails for an empty or all-connector path.
    pub fn new(path: Vec<RouteStep>) -> Result<Self, RouteError> {
        let steps = group_route_steps(&path)?;
        let simulator = RouteSimulator::new(&path)?;
        let user_location = simulator.start();

        info!(
            "[RouteDisplay] {} segments grouped into {} steps ({:.0}m)",
            path.len(),
            steps.len(),
            simulator.total_length()
        );

        Ok(Self {
            path,
            steps,
            simulator,
            user_location,
            user_heading: 0.0,
            progress: 0.0,
            step_index: 0,
            finished: false,
        })
    }

    pub fn path(&self) -> &[RouteStep] {
        &self.path
    }

    pub fn steps(&self) -> &[GroupedStep] {
        &self.steps
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn current_step(&self) -> &GroupedStep {
        &self.steps[self.step_index]
    }

    pub fn user_location(&self) -> Coordinate {
        self.user_location
    }

    pub fn user_heading(&self) -> f64 {
        self.user_heading
    }

    /// Last scrub value, clamped to [0, 1].
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// True once "Next" was pressed on the last step.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Camera for the first render: route start, facing along the first edge.
    pub fn initial_camera(&self) -> InitialCamera {
        let first = &self.path[0];
        InitialCamera {
            center: first.start_coords,
            pitch: CAMERA_PITCH,
            heading: bearing(&first.start_coords, &first.end_coords),
            zoom: CAMERA_ZOOM,
        }
    }

    /// Advance the narrated step. Does not move the rider or the camera.
    pub fn advance(&mut self) -> StepTransition {
        if self.finished {
            return StepTransition::Finished;
        }

        if self.step_index + 1 < self.steps.len() {
            self.step_index += 1;
            debug!(
                "[RouteDisplay] step {}/{}",
                self.step_index + 1,
                self.steps.len()
            );
            StepTransition::Advanced {
                index: saturating_u32(self.step_index),
            }
        } else {
            info!("[RouteDisplay] route finished");
            self.finished = true;
            StepTransition::Finished
        }
    }

    /// Move the simulated rider to `progress` along the route.
    ///
    /// Returns the camera commands the map surface should apply: a region update when the
    /// location changed (and is finite), an orientation update when the heading changed.
    /// The narrated step is left untouched.
    pub fn scrub(&mut self, progress: f64) -> Result<Vec<CameraCommand>, RouteError> {
        let position = self.simulator.scrub(progress)?;
        self.progress = progress.clamp(0.0, 1.0);

        let mut commands = Vec::with_capacity(2);

        if position.location != self.user_location {
            self.user_location = position.location;
            if position.location.is_finite() {
                commands.push(CameraCommand::Region {
                    latitude: position.location.lat,
                    longitude: position.location.lng,
                    latitude_delta: REGION_DELTA,
                    longitude_delta: REGION_DELTA,
                });
            }
        }

        // Route-end fallback keeps the previous heading
        if let Some(heading) = position.heading {
            if heading != self.user_heading {
                self.user_heading = heading;
                commands.push(CameraCommand::Orientation {
                    heading,
                    pitch: CAMERA_PITCH,
                });
            }
        }

        debug!(
            "[RouteDisplay] scrub {:.3} -> ({:.6}, {:.6}) heading {:.1}",
            self.progress, self.user_location.lat, self.user_location.lng, self.user_heading
        );

        Ok(commands)
    }

    /// Polylines for the full route, the narrated step and every other step.
    pub fn polylines(&self) -> RoutePolylines {
        let full_route = self
            .path
            .iter()
            .flat_map(|step| [step.start_coords, step.end_coords])
            .collect();

        let other_steps = self
            .steps
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != self.step_index)
            .map(|(_, step)| step.coordinates())
            .collect();

        RoutePolylines {
            full_route,
            current_step: self.current_step().coordinates(),
            other_steps,
        }
    }

    /// One marker per grouped step end point.
    pub fn step_markers(&self) -> Vec<StepMarker> {
        self.steps
            .iter()
            .enumerate()
            .map(|(index, step)| StepMarker {
                step_index: saturating_u32(index),
                location: step.end_coords,
                is_current: index == self.step_index,
            })
            .collect()
    }

    pub fn user_marker(&self) -> UserMarker {
        UserMarker {
            location: self.user_location,
            heading: self.user_heading,
        }
    }

    /// Overlay for the narrated step.
    pub fn indicator(&self) -> StepIndicator {
        StepIndicator::build(
            self.current_step(),
            self.step_index,
            self.steps.len(),
            self.user_location,
        )
    }

    /// Bounding box of the whole route, for an overview camera.
    pub fn route_bounds(&self) -> Option<Bounds> {
        compute_bounds(&self.polylines().full_route)
    }
}
