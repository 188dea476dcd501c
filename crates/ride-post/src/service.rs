//! Runs one form submission through the whole pipeline.

use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use rand::Rng;
use serde::Deserialize;

use crate::{
    composer::compose,
    errors::AppError,
    geo_utils::nearest_meeting_point,
    metrics::{apply_ride_variant, extract_metrics},
    models::{AnnouncementText, RideConfig, RideLevel},
    route_source::{RouteLink, RouteSource},
    settings::AnnouncementSettings,
    sunset::{SunsetLookup, resolve_sunset},
};

/// Raw form submission.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnouncementRequest {
    /// Route URL or bare route id.
    pub route: String,
    /// Defaults to tomorrow in the local zone.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Defaults to 10:00 on weekends and 18:00 otherwise.
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub organizers: Vec<String>,
    #[serde(default)]
    pub level: RideLevel,
    #[serde(default)]
    pub average_speed_kmh: Option<f64>,
    #[serde(default)]
    pub weather_disclaimer: bool,
    #[serde(default)]
    pub race_disclaimer: bool,
    #[serde(default)]
    pub off_road: bool,
}

#[derive(Clone)]
pub struct AnnouncementService {
    routes: Arc<dyn RouteSource>,
    sunset: Arc<dyn SunsetLookup>,
    settings: Arc<AnnouncementSettings>,
}

impl AnnouncementService {
    pub fn new(
        routes: Arc<dyn RouteSource>,
        sunset: Arc<dyn SunsetLookup>,
        settings: Arc<AnnouncementSettings>,
    ) -> Self {
        Self {
            routes,
            sunset,
            settings,
        }
    }

    pub fn settings(&self) -> &AnnouncementSettings {
        &self.settings
    }

    /// Builds both announcement texts, or fails without producing any text.
    pub async fn create<R: Rng + Send + ?Sized>(
        &self,
        request: &AnnouncementRequest,
        rng: &mut R,
    ) -> Result<AnnouncementText, AppError> {
        let settings = self.settings.as_ref();
        let link = RouteLink::parse(&request.route)?;
        let ride = self.ride_config(request)?;

        let track = self.routes.fetch_route(link.id()).await?;
        let metrics = extract_metrics(&track, &settings.fallback_titles, rng)?;
        let (metrics, speed) = apply_ride_variant(metrics, &ride, settings)?;

        let start = track.first_point().ok_or(AppError::EmptyTrack)?;
        let meeting_point = nearest_meeting_point(&start.location, &settings.meeting_points)?;

        let sunset = resolve_sunset(
            self.sunset.as_ref(),
            ride.date,
            settings.sunset.location,
            &settings.sunset,
        )
        .await;

        tracing::info!(
            route_id = link.id(),
            date = %ride.date,
            distance_km = metrics.distance_km,
            meeting_point,
            "Composed announcement"
        );

        Ok(compose(
            &ride,
            &metrics,
            speed,
            meeting_point,
            sunset,
            &link.reference(&settings.route_link_prefix),
            settings,
        ))
    }

    /// Validates the submission and fills in defaults.
    pub fn ride_config(&self, request: &AnnouncementRequest) -> Result<RideConfig, AppError> {
        let settings = self.settings.as_ref();
        let range = settings.speed;

        let average_speed_kmh = request.average_speed_kmh.unwrap_or(range.default_kmh);
        if !(range.min_kmh..=range.max_kmh).contains(&average_speed_kmh) {
            return Err(AppError::InvalidInput(format!(
                "average speed must be between {} and {} km/h, got {average_speed_kmh}",
                range.min_kmh, range.max_kmh
            )));
        }

        let date = request.date.unwrap_or_else(|| {
            Utc::now().with_timezone(&settings.sunset.timezone).date_naive() + Duration::days(1)
        });

        Ok(RideConfig {
            date,
            start_time: request.start_time.unwrap_or_else(|| default_start_time(date)),
            organizers: settings.resolve_organizers(&request.organizers)?,
            level: request.level,
            average_speed_kmh,
            weather_disclaimer: request.weather_disclaimer,
            race_disclaimer: request.race_disclaimer,
            off_road: request.off_road,
        })
    }
}

/// Weekend rides start in the morning, weekday rides after work.
pub fn default_start_time(date: NaiveDate) -> NaiveTime {
    let hour = match date.weekday() {
        Weekday::Sat | Weekday::Sun => 10,
        _ => 18,
    };
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
}
