//! Perlin noise elevation for synthetic routes.

use noise::{NoiseFn, Perlin};

/// Deterministic elevation field over lat/lon.
///
/// Sums several octaves of Perlin noise (fractal Brownian motion) so terrain
/// has both long climbs and small bumps.
#[derive(Debug, Clone)]
pub struct ElevationGenerator {
    perlin: Perlin,
    /// Valley floor in meters.
    base_elevation: f64,
    /// Maximum deviation from the base in meters.
    height_scale: f64,
    /// Noise frequency per degree; higher means shorter hills.
    frequency: f64,
    octaves: u32,
}

impl ElevationGenerator {
    /// Hills around the Zürich lake basin, roughly 400 to 900 m.
    pub fn zurich(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            base_elevation: 650.0,
            height_scale: 250.0,
            frequency: 40.0,
            octaves: 4,
        }
    }

    /// Gently rolling terrain for routes where climbing should not matter.
    pub fn flat(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            base_elevation: 410.0,
            height_scale: 15.0,
            frequency: 20.0,
            octaves: 2,
        }
    }

    pub fn with_base_elevation(mut self, elevation: f64) -> Self {
        self.base_elevation = elevation;
        self
    }

    pub fn with_height_scale(mut self, scale: f64) -> Self {
        self.height_scale = scale;
        self
    }

    pub fn elevation_at(&self, lat: f64, lon: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = self.frequency;
        let mut max_amplitude = 0.0;

        for _ in 0..self.octaves {
            total += self.perlin.get([lat * frequency, lon * frequency]) * amplitude;
            max_amplitude += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        self.base_elevation + total / max_amplitude * self.height_scale
    }
}
