//! Walk through a route the way the display screen does.
//!
//! Run with: cargo run --example route_walkthrough

use skifinder_core::{
    Coordinate, Difficulty, RouteDisplay, RouteStep, SegmentType, StepTransition,
    group_route_steps,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Base area -> lift -> connector -> two edges of one blue run -> connector -> lodge
    let path = vec![
        RouteStep::new(1, Some("Gondola"), SegmentType::Lift, Coordinate::new(46.0200, 7.7480), Coordinate::new(46.0320, 7.7530))
            .with_minutes(8.0),
        RouteStep::new(2, Some("Connector"), SegmentType::Trail, Coordinate::new(46.0320, 7.7530), Coordinate::new(46.0322, 7.7536))
            .with_minutes(0.3),
        RouteStep::new(3, Some("Sunny Side"), SegmentType::Trail, Coordinate::new(46.0322, 7.7536), Coordinate::new(46.0290, 7.7570))
            .with_minutes(2.5)
            .with_difficulty(Difficulty::Blue),
        RouteStep::new(4, Some("Sunny Side"), SegmentType::Trail, Coordinate::new(46.0290, 7.7570), Coordinate::new(46.0250, 7.7590))
            .with_minutes(2.0)
            .with_difficulty(Difficulty::Blue),
        RouteStep::new(5, Some("Connector"), SegmentType::Trail, Coordinate::new(46.0250, 7.7590), Coordinate::new(46.0248, 7.7596))
            .with_minutes(0.2),
        RouteStep::new(6, Some("Lodge Trail"), SegmentType::Trail, Coordinate::new(46.0248, 7.7596), Coordinate::new(46.0215, 7.7620))
            .with_minutes(3.0)
            .with_difficulty(Difficulty::Green),
    ];

    println!("Route Walkthrough\n");
    println!("Raw path: {} segments", path.len());

    let steps = group_route_steps(&path)?;
    println!("Grouped into {} steps:", steps.len());
    for (i, step) in steps.iter().enumerate() {
        println!(
            "  {}. {:<12} {:?} {} edges, {:.1} min",
            i + 1,
            step.display_name(),
            step.segment_type,
            step.original_steps.len(),
            step.estimated_time_minutes
        );
    }

    let mut display = RouteDisplay::new(path)?;
    let camera = display.initial_camera();
    println!(
        "\nInitial camera: ({:.4}, {:.4}) heading {:.0} pitch {} zoom {}",
        camera.center.lat, camera.center.lng, camera.heading, camera.pitch, camera.zoom
    );

    println!("\nScrubbing the simulation slider:");
    for progress in [0.0, 0.25, 0.5, 0.75, 1.0] {
        let commands = display.scrub(progress)?;
        let location = display.user_location();
        println!(
            "  {:>4.0}% -> ({:.5}, {:.5}) heading {:>5.1}, {} camera commands",
            progress * 100.0,
            location.lat,
            location.lng,
            display.user_heading(),
            commands.len()
        );
    }

    println!("\nStepping through the route:");
    loop {
        let indicator = display.indicator();
        println!(
            "  {} - {} ({}m to go) [{}]",
            indicator.name,
            indicator.summary(),
            indicator.distance_to_next_meters,
            indicator.action_label
        );
        match display.advance() {
            StepTransition::Advanced { .. } => continue,
            StepTransition::Finished => break,
        }
    }
    println!("Route finished");

    if let Some(bounds) = display.route_bounds() {
        let center = bounds.center();
        println!("\nRoute bounds center: ({:.4}, {:.4})", center.lat, center.lng);
    }

    Ok(())
}
