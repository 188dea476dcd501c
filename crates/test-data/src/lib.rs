//! Test fixtures for ride-post.
//!
//! Generates synthetic cycling routes around Zürich, serializes them as GPX
//! the way route services deliver them, and provides in-process
//! implementations of the route and sunset sources so the whole announcement
//! pipeline can run without network access.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_data::prelude::*;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let points = RouteGenerator::new(Start::WITIKON)
//!     .with_distance(42_000.0)
//!     .with_elevation(ElevationGenerator::zurich(7))
//!     .generate(&mut rng)?;
//!
//! let routes = GpxRouteSource::new()
//!     .with_route("42", generate_gpx(&points, &GpxMeta::named("Pfannenstiel")));
//! ```

pub mod fakes;
pub mod gpx;
pub mod routes;
pub mod terrain;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::fakes::{FixedSunset, GpxRouteSource};
    pub use crate::gpx::{GpxLayout, GpxMeta, generate_gpx};
    pub use crate::routes::{RouteGenerator, Start};
    pub use crate::terrain::ElevationGenerator;
    pub use rand::{SeedableRng, rngs::StdRng};
}
