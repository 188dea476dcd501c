//! Local sunset time for a ride date, with a fixed fallback.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;

use crate::{errors::SunsetError, models::GeoPoint, settings::SunsetSettings};

pub const DEFAULT_SUNSET_API_URL: &str = "https://api.sunrisesunset.io/json";

/// Looks up the sunset for a date and place.
///
/// Returns the UTC clock time as reported by the service, e.g. `7:45:12 PM`.
#[async_trait]
pub trait SunsetLookup: Send + Sync {
    async fn fetch_sunset(&self, date: NaiveDate, location: GeoPoint) -> Result<String, SunsetError>;
}

/// Client for the sunrisesunset.io API.
pub struct SunriseSunsetClient {
    client: Client,
    base_url: String,
}

impl SunriseSunsetClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SunsetApiResponse {
    results: SunsetApiResults,
}

#[derive(Debug, Deserialize)]
struct SunsetApiResults {
    sunset: Option<String>,
}

#[async_trait]
impl SunsetLookup for SunriseSunsetClient {
    async fn fetch_sunset(&self, date: NaiveDate, location: GeoPoint) -> Result<String, SunsetError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("timezone", "UTC".to_string()),
                ("lat", location.latitude.to_string()),
                ("lng", location.longitude.to_string()),
                ("date", date.format("%Y-%m-%d").to_string()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SunsetError::Status(resp.status().as_u16()));
        }

        let body: SunsetApiResponse = resp
            .json()
            .await
            .map_err(|e| SunsetError::MalformedPayload(e.to_string()))?;

        body.results
            .sunset
            .ok_or_else(|| SunsetError::MalformedPayload("missing results.sunset".into()))
    }
}

/// Sunset in the local zone for `date`.
///
/// Never fails: any lookup or parsing problem yields the configured fallback
/// time on that date.
pub async fn resolve_sunset(
    lookup: &dyn SunsetLookup,
    date: NaiveDate,
    location: GeoPoint,
    settings: &SunsetSettings,
) -> DateTime<Tz> {
    let resolved = lookup
        .fetch_sunset(date, location)
        .await
        .and_then(|clock| parse_utc_clock(date, &clock))
        .map(|utc| utc.with_timezone(&settings.timezone));

    match resolved {
        Ok(sunset) => {
            tracing::debug!(%date, %sunset, "Resolved sunset");
            sunset
        }
        Err(e) => {
            let fallback = local_datetime(date, settings.fallback_time, settings.timezone);
            tracing::warn!(%date, %fallback, "Sunset lookup failed, using fallback: {e}");
            fallback
        }
    }
}

/// Parses a 12-hour clock time such as `7:45:12 PM` on `date` as UTC.
pub fn parse_utc_clock(date: NaiveDate, clock: &str) -> Result<DateTime<Utc>, SunsetError> {
    let time = NaiveTime::parse_from_str(clock.trim(), "%I:%M:%S %p")
        .map_err(|e| SunsetError::MalformedPayload(format!("{clock:?}: {e}")))?;
    Ok(Utc.from_utc_datetime(&NaiveDateTime::new(date, time)))
}

/// Wall-clock time in `tz`.
///
/// Ambiguous times resolve to the earlier instant. Times skipped by a
/// spring-forward jump move one hour later, landing just past the gap.
pub fn local_datetime(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Tz> {
    let naive = NaiveDateTime::new(date, time);
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            naive
                .checked_add_signed(TimeDelta::hours(1))
                .and_then(|shifted| tz.from_local_datetime(&shifted).latest())
        })
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}
