//! Fetch a resort catalog and a route from the SkiFinder API.
//!
//! Run with: cargo run --example fetch_route --features http -- <resort_id> <start_poi> <end_poi>
//!
//! Uses `SKIFINDER_ENVIRONMENT` / `SKIFINDER_API_URL` to pick the server.

use std::sync::Arc;
use std::time::Instant;

use skifinder_core::{
    ApiClient, ApiConfig, MemoryTokenStore, RouteRequest, group_route_steps, pois_to_options,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<i64> = std::env::args()
        .skip(1)
        .map(|a| a.parse())
        .collect::<Result<_, _>>()?;
    let [resort_id, start, end] = args[..] else {
        eprintln!("usage: fetch_route <resort_id> <start_poi> <end_poi>");
        std::process::exit(2);
    };

    let config = ApiConfig::from_env();
    println!("API: {}", config.base_url);
    let client = ApiClient::new(config, Arc::new(MemoryTokenStore::new()))?;

    let start_time = Instant::now();
    let resorts = client.fetch_resorts().await?;
    println!("{} resorts ({:?})", resorts.len(), start_time.elapsed());

    let pois = client.fetch_resort_pois(resort_id).await?;
    let lifts = client.fetch_resort_lifts(resort_id).await?;
    println!(
        "Resort {}: {} POIs ({} searchable options), {} lifts",
        resort_id,
        pois.len(),
        pois_to_options(&pois).len(),
        lifts.len()
    );

    let start_time = Instant::now();
    let path = client.find_route(&RouteRequest::new(resort_id, start, end)).await?;
    println!("Route: {} segments ({:?})", path.len(), start_time.elapsed());

    for (i, step) in group_route_steps(&path)?.iter().enumerate() {
        println!(
            "  {}. {} ({:?}, {:.1} min)",
            i + 1,
            step.display_name(),
            step.segment_type,
            step.estimated_time_minutes
        );
    }

    Ok(())
}
