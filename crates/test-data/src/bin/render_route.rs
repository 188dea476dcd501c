//! Writes a synthetic route as GPX to stdout.
//!
//! Serve the output from any static file server and point `ROUTE_API_URL` at
//! it to try the announcement service without a route-sharing account:
//! ```
//! ROUTE_NAME="Pfannenstiel" ROUTE_KM=55 cargo run -p test-data --bin render-route > 42
//! ```

use std::io::Write as _;

use rand::{SeedableRng, rngs::StdRng};
use test_data::{
    gpx::{GpxMeta, generate_gpx},
    routes::{RouteGenerator, Start},
    terrain::ElevationGenerator,
};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let name = std::env::var("ROUTE_NAME").unwrap_or_else(|_| "Synthetic Loop".to_string());
    let km: f64 = std::env::var("ROUTE_KM")
        .ok()
        .map(|v| v.parse())
        .transpose()?
        .unwrap_or(40.0);
    let seed: u64 = std::env::var("ROUTE_SEED")
        .ok()
        .map(|v| v.parse())
        .transpose()?
        .unwrap_or(12345);

    let mut rng = StdRng::seed_from_u64(seed);
    let points = RouteGenerator::new(Start::WITIKON)
        .with_distance(km * 1000.0)
        .with_elevation(ElevationGenerator::zurich(seed as u32))
        .out_and_back()
        .generate(&mut rng)?;

    tracing::info!(route = %name, km, seed, points = points.len(), "Generated route");

    let gpx = generate_gpx(&points, &GpxMeta::named(name));
    std::io::stdout().write_all(&gpx)?;

    Ok(())
}
