//! Registries and fixed texts used to build announcements.
//!
//! Everything here is read-only once the service starts. The defaults describe
//! the Zürich group; a deployment can override any part through a JSON file
//! (see [`crate::config::Config`]).

use std::collections::BTreeMap;

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::Deserialize;

use crate::{
    errors::AppError,
    models::{GeoPoint, MeetingPoint, Organizer},
};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnnouncementSettings {
    /// Candidate start locations. Order matters: the first entry wins ties.
    pub meeting_points: Vec<MeetingPoint>,
    /// Titles used when a route has no usable name.
    pub fallback_titles: Vec<String>,
    /// Organizer display name to contact.
    pub organizers: BTreeMap<String, String>,
    pub texts: AnnouncementTexts,
    pub off_road: OffRoadVariant,
    pub return_time: ReturnTimeModel,
    pub sunset: SunsetSettings,
    pub speed: SpeedRange,
    /// Prefix of the short route reference, followed by the route id.
    pub route_link_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnnouncementTexts {
    pub registration: String,
    pub lights_warning: String,
    pub weather_disclaimer: String,
    pub race_disclaimer: String,
    pub unsupervised_notice: String,
    pub sign_off: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OffRoadVariant {
    pub title_suffix: String,
    pub level_symbol: String,
    pub speed_penalty_kmh: f64,
    pub sign_off: String,
}

/// Estimated ride duration is `distance / speed * moving_time_factor + buffer_hours`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReturnTimeModel {
    pub moving_time_factor: f64,
    pub buffer_hours: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SunsetSettings {
    pub location: GeoPoint,
    pub fallback_time: NaiveTime,
    pub timezone: Tz,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SpeedRange {
    pub min_kmh: f64,
    pub max_kmh: f64,
    pub default_kmh: f64,
}

impl Default for AnnouncementSettings {
    fn default() -> Self {
        Self {
            meeting_points: vec![
                MeetingPoint::new("Fork & Bottle parking lot", 47.35262, 8.52454),
                MeetingPoint::new("Frohburg-/Letzistrasse", 47.39252, 8.55045),
                MeetingPoint::new("Thiwa's Cafe, Triemli", 47.36783, 8.49466),
                MeetingPoint::new("OIL! petrol station, Fronwaldstrasse", 47.41510, 8.51845),
                MeetingPoint::new("Graveyard Witikon", 47.36144, 8.60253),
                MeetingPoint::new("Train station Tiefenbrunnen", 47.35007, 8.56122),
            ],
            fallback_titles: [
                "Mystery Tour",
                "Ride Into the Unknown",
                "The Nameless Loop",
                "Pedals & Pastries",
                "Where the Road Takes Us",
                "Tour de Surprise",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            organizers: BTreeMap::new(),
            texts: AnnouncementTexts::default(),
            off_road: OffRoadVariant::default(),
            return_time: ReturnTimeModel::default(),
            sunset: SunsetSettings::default(),
            speed: SpeedRange::default(),
            route_link_prefix: "strava.com/routes/".to_string(),
        }
    }
}

impl Default for AnnouncementTexts {
    fn default() -> Self {
        Self {
            registration: "Sign up here:  registration.zürides.ch\n\
                Select the ride you prefer, make sure you received the confirmation email, \
                and please use the link in that email if you want to remove or change your registration."
                .to_string(),
            lights_warning: "🚨 Do not forget to bring lights! 🚨".to_string(),
            weather_disclaimer: "⛈️ Watch the forecast ⛈️\n\
                If the weather forecast gets worse, we cancel the ride."
                .to_string(),
            race_disclaimer: "⚠️ No regular ride ⚠️\n\
                This is not a regular ride. Participation in the race is at your own risk, \
                ZüRides will not take any responsibility, we just ride to the start and back \
                to Zürich together. If you are unsure or have any questions, please get in \
                touch with the organizers."
                .to_string(),
            unsupervised_notice: "⚠️ No organizer yet, this ride is unsupervised ⚠️".to_string(),
            sign_off: "Thanks & see you on the road 👋".to_string(),
        }
    }
}

impl Default for OffRoadVariant {
    fn default() -> Self {
        Self {
            title_suffix: " - Gravel/CX ride".to_string(),
            level_symbol: "⛰️".to_string(),
            speed_penalty_kmh: 10.0,
            sign_off: "Thanks & see you on the dirt! 🫎".to_string(),
        }
    }
}

impl Default for ReturnTimeModel {
    fn default() -> Self {
        Self {
            moving_time_factor: 1.2,
            buffer_hours: 0.3,
        }
    }
}

impl Default for SunsetSettings {
    fn default() -> Self {
        Self {
            // Zürich city center
            location: GeoPoint {
                latitude: 47.3769,
                longitude: 8.5417,
            },
            fallback_time: NaiveTime::from_hms_opt(20, 0, 0).unwrap_or(NaiveTime::MIN),
            timezone: chrono_tz::Europe::Berlin,
        }
    }
}

impl Default for SpeedRange {
    fn default() -> Self {
        Self {
            min_kmh: 20.0,
            max_kmh: 32.0,
            default_kmh: 26.0,
        }
    }
}

impl AnnouncementSettings {
    /// Looks up the contact for each selected organizer.
    pub fn resolve_organizers(&self, names: &[String]) -> Result<Vec<Organizer>, AppError> {
        names
            .iter()
            .map(|name| {
                self.organizers
                    .get(name)
                    .map(|contact| Organizer {
                        name: name.clone(),
                        contact: contact.clone(),
                    })
                    .ok_or_else(|| AppError::InvalidInput(format!("unknown organizer: {name}")))
            })
            .collect()
    }
}
