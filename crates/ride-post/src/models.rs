use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, AppError> {
        let point = Self {
            latitude,
            longitude,
        };
        point.validate()?;
        Ok(point)
    }

    /// Checks the coordinate ranges. Points deserialized from config skip
    /// `new`, so distance calculations call this again.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(AppError::InvalidInput(format!(
                "latitude {} must be between -90 and 90",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(AppError::InvalidInput(format!(
                "longitude {} must be between -180 and 180",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// A single point of a route with optional elevation in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub location: GeoPoint,
    pub elevation: Option<f64>,
}

impl TrackPoint {
    pub fn new(location: GeoPoint, elevation: Option<f64>) -> Self {
        Self {
            location,
            elevation,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Track {
    pub name: String,
    pub description: Option<String>,
    pub source_id: String,
    pub points: Vec<TrackPoint>,
}

impl Track {
    pub fn first_point(&self) -> Option<&TrackPoint> {
        self.points.first()
    }

    pub fn has_elevations(&self) -> bool {
        !self.points.is_empty() && self.points.iter().all(|p| p.elevation.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingPoint {
    pub name: String,
    pub location: GeoPoint,
}

impl MeetingPoint {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            location: GeoPoint {
                latitude,
                longitude,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideLevel {
    Social,
    #[default]
    Moderate,
    Hard,
}

impl RideLevel {
    pub const ALL: [RideLevel; 3] = [RideLevel::Social, RideLevel::Moderate, RideLevel::Hard];

    pub fn symbol(self) -> &'static str {
        match self {
            RideLevel::Social => "☕️",
            RideLevel::Moderate => "🦵",
            RideLevel::Hard => "🔥",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organizer {
    pub name: String,
    pub contact: String,
}

impl fmt::Display for Organizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.contact)
    }
}

/// Choices made by the person announcing the ride.
#[derive(Debug, Clone)]
pub struct RideConfig {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub organizers: Vec<Organizer>,
    pub level: RideLevel,
    pub average_speed_kmh: f64,
    pub weather_disclaimer: bool,
    pub race_disclaimer: bool,
    pub off_road: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElevationGain {
    Meters(u32),
    NotAvailable,
}

impl fmt::Display for ElevationGain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElevationGain::Meters(m) => write!(f, "{m}m"),
            ElevationGain::NotAvailable => write!(f, "n/a m"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteMetrics {
    pub distance_km: u32,
    pub elevation_gain: ElevationGain,
    pub title: String,
    /// Route description as published, untrimmed.
    pub description: Option<String>,
}

/// Average speed after difficulty adjustments. Always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct EffectiveSpeed(f64);

impl EffectiveSpeed {
    pub fn new(kmh: f64) -> Result<Self, AppError> {
        if !kmh.is_finite() || kmh <= 0.0 {
            return Err(AppError::InvalidInput(format!(
                "effective speed must be positive, got {kmh} km/h"
            )));
        }
        Ok(Self(kmh))
    }

    pub fn kmh(self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnouncementText {
    pub full: String,
    pub short: String,
}
