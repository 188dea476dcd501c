//! Procedural route generation.

use rand::Rng;
use rand_distr::{Distribution, Normal, NormalError};
use ride_post::{
    errors::AppError,
    models::{GeoPoint, TrackPoint},
};
use thiserror::Error;

use crate::terrain::ElevationGenerator;

/// Meters per degree of latitude, close enough for short steps.
const METERS_PER_DEGREE: f64 = 111_000.0;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Invalid route configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid jitter: {0}")]
    Jitter(#[from] NormalError),
    #[error(transparent)]
    Point(#[from] AppError),
}

/// Well-known start locations, each right next to a default meeting point.
pub struct Start;

impl Start {
    pub const WITIKON: GeoPoint = GeoPoint {
        latitude: 47.36150,
        longitude: 8.60240,
    };
    pub const TIEFENBRUNNEN: GeoPoint = GeoPoint {
        latitude: 47.35010,
        longitude: 8.56130,
    };
    pub const TRIEMLI: GeoPoint = GeoPoint {
        latitude: 47.36790,
        longitude: 8.49460,
    };
    pub const FRONWALD: GeoPoint = GeoPoint {
        latitude: 47.41500,
        longitude: 8.51850,
    };
}

/// Generates routes as a random walk with momentum from a fixed start.
#[derive(Debug, Clone)]
pub struct RouteGenerator {
    start: GeoPoint,
    /// Nominal length in meters.
    distance_m: f64,
    point_spacing_m: f64,
    /// Initial heading in radians, clockwise from north. Random when unset.
    heading: Option<f64>,
    /// Maximum heading change per step in radians.
    turn_rate: f64,
    gps_jitter_m: f64,
    elevation_jitter_m: f64,
    elevation: Option<ElevationGenerator>,
    out_and_back: bool,
}

impl RouteGenerator {
    pub fn new(start: GeoPoint) -> Self {
        Self {
            start,
            distance_m: 30_000.0,
            point_spacing_m: 50.0,
            heading: None,
            turn_rate: 0.3,
            gps_jitter_m: 3.0,
            elevation_jitter_m: 2.0,
            elevation: None,
            out_and_back: false,
        }
    }

    pub fn with_distance(mut self, meters: f64) -> Self {
        self.distance_m = meters;
        self
    }

    pub fn with_point_spacing(mut self, meters: f64) -> Self {
        self.point_spacing_m = meters;
        self
    }

    /// Heading in degrees, clockwise from north.
    pub fn with_heading(mut self, degrees: f64) -> Self {
        self.heading = Some(degrees.to_radians());
        self
    }

    pub fn with_turn_rate(mut self, radians: f64) -> Self {
        self.turn_rate = radians;
        self
    }

    pub fn with_gps_jitter(mut self, meters: f64) -> Self {
        self.gps_jitter_m = meters;
        self
    }

    /// Samples elevations from `terrain`. Without terrain, points carry none.
    pub fn with_elevation(mut self, terrain: ElevationGenerator) -> Self {
        self.elevation = Some(terrain);
        self
    }

    pub fn with_elevation_jitter(mut self, meters: f64) -> Self {
        self.elevation_jitter_m = meters;
        self
    }

    /// Rides half the distance out and returns the same way, ending at the start.
    pub fn out_and_back(mut self) -> Self {
        self.out_and_back = true;
        self
    }

    /// A straight, noise-free line: handy when a test asserts exact lengths.
    pub fn straight(start: GeoPoint, heading_degrees: f64, meters: f64) -> Self {
        Self::new(start)
            .with_distance(meters)
            .with_heading(heading_degrees)
            .with_turn_rate(0.0)
            .with_gps_jitter(0.0)
            .with_elevation_jitter(0.0)
    }

    pub fn generate(&self, rng: &mut impl Rng) -> Result<Vec<TrackPoint>, RouteError> {
        self.start.validate()?;
        if !(self.distance_m > 0.0 && self.point_spacing_m > 0.0) {
            return Err(RouteError::InvalidConfig(format!(
                "distance {} m and point spacing {} m must be positive",
                self.distance_m, self.point_spacing_m
            )));
        }
        if self.turn_rate < 0.0 {
            return Err(RouteError::InvalidConfig(format!(
                "turn rate must not be negative, got {}",
                self.turn_rate
            )));
        }

        let outbound = if self.out_and_back {
            self.distance_m / 2.0
        } else {
            self.distance_m
        };

        let mut path = self.generate_path(outbound, rng);
        if self.out_and_back {
            let back: Vec<_> = path.iter().rev().skip(1).copied().collect();
            path.extend(back);
        }

        self.apply_noise(path, rng)
    }

    /// Walks `meters` from the start, returning raw `(lat, lon)` pairs.
    fn generate_path(&self, meters: f64, rng: &mut impl Rng) -> Vec<(f64, f64)> {
        let mut current = (self.start.latitude, self.start.longitude);
        let mut path = vec![current];
        let mut heading = self
            .heading
            .unwrap_or_else(|| rng.gen_range(0.0..std::f64::consts::TAU));
        let mut travelled = 0.0;

        while travelled < meters {
            if self.turn_rate > 0.0 {
                heading += rng.gen_range(-self.turn_rate..self.turn_rate);
            }
            let step = self.point_spacing_m.min(meters - travelled);

            let lat_delta = step * heading.cos() / METERS_PER_DEGREE;
            let lon_delta = step * heading.sin() / (METERS_PER_DEGREE * current.0.to_radians().cos());

            current = (current.0 + lat_delta, current.1 + lon_delta);
            path.push(current);
            travelled += step;
        }

        path
    }

    /// Adds GPS jitter and elevations. The first point stays exact.
    fn apply_noise(
        &self,
        path: Vec<(f64, f64)>,
        rng: &mut impl Rng,
    ) -> Result<Vec<TrackPoint>, RouteError> {
        let jitter = Normal::new(0.0, self.gps_jitter_m / METERS_PER_DEGREE)?;
        let elev_jitter = Normal::new(0.0, self.elevation_jitter_m)?;

        path.into_iter()
            .enumerate()
            .map(|(i, (lat, lon))| -> Result<TrackPoint, RouteError> {
                let (lat, lon) = if i == 0 {
                    (lat, lon)
                } else {
                    (lat + jitter.sample(rng), lon + jitter.sample(rng))
                };
                let elevation = self
                    .elevation
                    .as_ref()
                    .map(|terrain| terrain.elevation_at(lat, lon) + elev_jitter.sample(rng));
                Ok(TrackPoint::new(GeoPoint::new(lat, lon)?, elevation))
            })
            .collect()
    }
}
