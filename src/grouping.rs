//! Step grouping: collapse a raw route path into user-facing steps.
//!
//! The routing service returns one edge per graph hop. A single named run often spans
//! several edges, and short "Connector" edges join every lift to every trail. Riders want
//! one instruction per run or lift, so:
//! - consecutive trail edges with the same name merge into one step
//! - connectors never form a step of their own; leading connectors join the step they lead
//!   into and trailing connectors join the step they follow
//! - lifts and intersections are always a step of their own
//!
//! Every raw edge ends up in exactly one step, in path order.

use log::debug;

use crate::{GroupedStep, RouteError, RouteStep, SegmentType};

/// Group a raw route path into display steps.
///
/// Returns [`RouteError::EmptyPath`] for an empty path and
/// [`RouteError::NoNavigableSteps`] when every edge is a connector.
///
/// # Example
/// ```
/// use skifinder_core::{Coordinate, RouteStep, SegmentType, group_route_steps};
///
/// let c = |lng: f64| Coordinate::new(0.0, lng);
/// let path = vec![
///     RouteStep::new(1, Some("A"), SegmentType::Trail, c(0.0), c(1.0)),
///     RouteStep::new(2, Some("A"), SegmentType::Trail, c(1.0), c(2.0)),
///     RouteStep::new(3, Some("B"), SegmentType::Lift, c(2.0), c(3.0)),
/// ];
///
/// let steps = group_route_steps(&path).unwrap();
/// assert_eq!(steps.len(), 2);
/// assert_eq!(steps[0].original_steps.len(), 2);
/// assert_eq!(steps[1].name.as_deref(), Some("B"));
/// ```
pub fn group_route_steps(path: &[RouteStep]) -> Result<Vec<GroupedStep>, RouteError> {
    if path.is_empty() {
        return Err(RouteError::EmptyPath);
    }

    let mut grouped = Vec::new();
    let mut i = 0;
    // End of the last emitted group; leading connectors are never taken from before it
    let mut floor = 0;

    while i < path.len() {
        let current = &path[i];

        // Absorbed by a neighbouring group
        if current.is_connector() {
            i += 1;
            continue;
        }

        let mut start = i;
        while start > floor && path[start - 1].is_connector() {
            start -= 1;
        }

        let mut end = i + 1;
        if current.segment_type == SegmentType::Trail {
            while end < path.len()
                && path[end].segment_type == SegmentType::Trail
                && path[end].name == current.name
                && !path[end].is_connector()
            {
                end += 1;
            }
        }
        while end < path.len() && path[end].is_connector() {
            end += 1;
        }

        grouped.push(build_group(current, &path[start..end]));
        i = end;
        floor = end;
    }

    if grouped.is_empty() {
        return Err(RouteError::NoNavigableSteps { segments: path.len() });
    }

    debug!(
        "[Grouping] {} segments -> {} steps",
        path.len(),
        grouped.len()
    );

    Ok(grouped)
}

/// Build one step from its representative edge and the slice it covers.
fn build_group(representative: &RouteStep, slice: &[RouteStep]) -> GroupedStep {
    // Slices are never empty: they always contain the representative
    let first = &slice[0];
    let last = &slice[slice.len() - 1];

    GroupedStep {
        id: representative.id,
        name: representative.name.clone(),
        segment_type: representative.segment_type,
        start_point_id: representative.start_point_id,
        end_point_id: representative.end_point_id,
        estimated_time_minutes: slice.iter().map(|s| s.estimated_time_minutes).sum(),
        difficulty: representative.difficulty,
        start_coords: first.start_coords,
        end_coords: last.end_coords,
        original_steps: slice.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Coordinate, Difficulty, CONNECTOR_NAME};

    /// Build a contiguous path along the equator, one degree of longitude per edge.
    fn path_of(edges: &[(&str, SegmentType, f64)]) -> Vec<RouteStep> {
        edges
            .iter()
            .enumerate()
            .map(|(k, (name, kind, minutes))| {
                RouteStep::new(
                    k as i64,
                    Some(*name),
                    *kind,
                    Coordinate::new(0.0, k as f64),
                    Coordinate::new(0.0, k as f64 + 1.0),
                )
                .with_minutes(*minutes)
            })
            .collect()
    }

    fn flatten(groups: &[GroupedStep]) -> Vec<RouteStep> {
        groups.iter().flat_map(|g| g.original_steps.clone()).collect()
    }

    #[test]
    fn test_empty_path_rejected() {
        assert_eq!(group_route_steps(&[]), Err(RouteError::EmptyPath));
    }

    #[test]
    fn test_all_connector_path_rejected() {
        let path = path_of(&[
            (CONNECTOR_NAME, SegmentType::Trail, 0.1),
            (CONNECTOR_NAME, SegmentType::Trail, 0.1),
        ]);
        assert_eq!(
            group_route_steps(&path),
            Err(RouteError::NoNavigableSteps { segments: 2 })
        );
    }

    #[test]
    fn test_same_named_trails_merge_before_lift() {
        let path = path_of(&[
            ("A", SegmentType::Trail, 1.0),
            ("A", SegmentType::Trail, 2.0),
            ("B", SegmentType::Lift, 5.0),
        ]);

        let groups = group_route_steps(&path).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name.as_deref(), Some("A"));
        assert_eq!(groups[0].original_steps.len(), 2);
        assert_eq!(groups[1].name.as_deref(), Some("B"));
        assert_eq!(groups[1].original_steps.len(), 1);
    }

    #[test]
    fn test_two_segment_run_scenario() {
        let path = vec![
            RouteStep::new(1, Some("Run1"), SegmentType::Trail, Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0)),
            RouteStep::new(2, Some("Run1"), SegmentType::Trail, Coordinate::new(0.0, 1.0), Coordinate::new(0.0, 2.0)),
        ];

        let groups = group_route_steps(&path).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name.as_deref(), Some("Run1"));
        assert_eq!(groups[0].start_coords, Coordinate::new(0.0, 0.0));
        assert_eq!(groups[0].end_coords, Coordinate::new(0.0, 2.0));
    }

    #[test]
    fn test_different_trail_names_do_not_merge() {
        let path = path_of(&[
            ("A", SegmentType::Trail, 1.0),
            ("B", SegmentType::Trail, 1.0),
            ("A", SegmentType::Trail, 1.0),
        ]);

        let groups = group_route_steps(&path).unwrap();
        let names: Vec<_> = groups.iter().map(|g| g.display_name()).collect();
        assert_eq!(names, vec!["A", "B", "A"]);
    }

    #[test]
    fn test_consecutive_lifts_stay_separate() {
        let path = path_of(&[
            ("Gondola", SegmentType::Lift, 6.0),
            ("Gondola", SegmentType::Lift, 6.0),
        ]);
        assert_eq!(group_route_steps(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_leading_connectors_join_first_step() {
        let path = path_of(&[
            (CONNECTOR_NAME, SegmentType::Trail, 0.5),
            (CONNECTOR_NAME, SegmentType::Trail, 0.5),
            ("Chair 6", SegmentType::Lift, 7.0),
        ]);

        let groups = group_route_steps(&path).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name.as_deref(), Some("Chair 6"));
        assert_eq!(groups[0].original_steps.len(), 3);
        assert_eq!(groups[0].start_coords, path[0].start_coords);
        assert_eq!(groups[0].estimated_time_minutes, 8.0);
    }

    #[test]
    fn test_trailing_connectors_join_preceding_step() {
        let path = path_of(&[
            ("Chair 6", SegmentType::Lift, 7.0),
            (CONNECTOR_NAME, SegmentType::Trail, 0.5),
            ("Bonanza", SegmentType::Trail, 3.0),
            (CONNECTOR_NAME, SegmentType::Trail, 0.25),
        ]);

        let groups = group_route_steps(&path).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].original_steps.len(), 2);
        assert_eq!(groups[0].end_coords, path[1].end_coords);
        assert_eq!(groups[1].original_steps.len(), 2);
        assert_eq!(groups[1].end_coords, path[3].end_coords);
    }

    #[test]
    fn test_connector_breaks_trail_run() {
        // A connector between two same-named edges is absorbed by the first run,
        // the second edge starts a new step
        let path = path_of(&[
            ("A", SegmentType::Trail, 1.0),
            (CONNECTOR_NAME, SegmentType::Trail, 0.5),
            ("A", SegmentType::Trail, 1.0),
        ]);

        let groups = group_route_steps(&path).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].original_steps.len(), 2);
        assert_eq!(groups[1].original_steps.len(), 1);
    }

    #[test]
    fn test_representative_fields_come_from_first_named_edge() {
        let mut path = path_of(&[
            (CONNECTOR_NAME, SegmentType::Trail, 0.5),
            ("Peak 8", SegmentType::Trail, 2.0),
            ("Peak 8", SegmentType::Trail, 2.0),
        ]);
        path[1] = path[1].clone().with_difficulty(Difficulty::Black);
        path[1].start_point_id = 81;
        path[1].end_point_id = 82;

        let group = &group_route_steps(&path).unwrap()[0];
        assert_eq!(group.id, path[1].id);
        assert_eq!(group.difficulty, Some(Difficulty::Black));
        assert_eq!(group.start_point_id, 81);
        assert_eq!(group.end_point_id, 82);
        assert_eq!(group.start_coords, path[0].start_coords);
        assert_eq!(group.end_coords, path[2].end_coords);
    }

    #[test]
    fn test_every_edge_covered_once_in_order() {
        let path = path_of(&[
            (CONNECTOR_NAME, SegmentType::Trail, 0.1),
            ("Lift 1", SegmentType::Lift, 6.0),
            (CONNECTOR_NAME, SegmentType::Trail, 0.2),
            ("Alpha", SegmentType::Trail, 1.0),
            ("Alpha", SegmentType::Trail, 1.5),
            ("Junction", SegmentType::Intersection, 0.0),
            (CONNECTOR_NAME, SegmentType::Trail, 0.3),
            (CONNECTOR_NAME, SegmentType::Trail, 0.3),
            ("Beta", SegmentType::Trail, 2.0),
            (CONNECTOR_NAME, SegmentType::Trail, 0.4),
        ]);

        let groups = group_route_steps(&path).unwrap();
        assert_eq!(flatten(&groups), path);
        assert!(groups.iter().all(|g| !g.original_steps.is_empty()));
        assert!(groups.iter().all(|g| g.display_name() != CONNECTOR_NAME));
    }

    #[test]
    fn test_connectors_between_groups_not_duplicated() {
        let path = path_of(&[
            ("Lift 1", SegmentType::Lift, 6.0),
            (CONNECTOR_NAME, SegmentType::Trail, 0.5),
            (CONNECTOR_NAME, SegmentType::Trail, 0.5),
            ("Lift 2", SegmentType::Lift, 4.0),
        ]);

        let groups = group_route_steps(&path).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].original_steps.len(), 3);
        assert_eq!(groups[1].original_steps.len(), 1);
        assert_eq!(groups[1].start_coords, path[3].start_coords);
        assert_eq!(flatten(&groups).len(), path.len());
    }

    #[test]
    fn test_durations_are_summed_per_group() {
        let path = path_of(&[
            ("Lift 1", SegmentType::Lift, 6.0),
            (CONNECTOR_NAME, SegmentType::Trail, 0.25),
            ("Alpha", SegmentType::Trail, 1.0),
            ("Alpha", SegmentType::Trail, 1.5),
        ]);

        let groups = group_route_steps(&path).unwrap();
        for group in &groups {
            let expected: f64 = group.original_steps.iter().map(|s| s.estimated_time_minutes).sum();
            assert_eq!(group.estimated_time_minutes, expected);
        }
        assert_eq!(groups[0].estimated_time_minutes, 6.25);
        assert_eq!(groups[1].estimated_time_minutes, 2.5);
    }

    #[test]
    fn test_unnamed_trails_merge_with_each_other() {
        let origin = Coordinate::new(0.0, 0.0);
        let path = vec![
            RouteStep::new(1, None, SegmentType::Trail, origin, origin),
            RouteStep::new(2, None, SegmentType::Trail, origin, origin),
        ];
        assert_eq!(group_route_steps(&path).unwrap().len(), 1);
    }
}
