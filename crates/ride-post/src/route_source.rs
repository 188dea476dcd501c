//! Fetching and parsing shared routes.

use std::{fmt, sync::LazyLock, time::Duration};

use async_trait::async_trait;
use bytes::{Buf as _, Bytes};
use gpx::Gpx;
use regex::Regex;
use reqwest::Client;

use crate::{
    errors::AppError,
    models::{GeoPoint, Track, TrackPoint},
};

static ROUTE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:[\w-]+\.)?strava\.com/routes/(\d+)").expect("route URL pattern is valid")
});

/// Identifier of a route on the route-sharing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteLink {
    id: String,
}

impl RouteLink {
    /// Accepts a route URL (`https://www.strava.com/routes/123...`) or a bare id.
    pub fn parse(input: &str) -> Result<Self, AppError> {
        let input = input.trim();
        if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
            return Ok(Self {
                id: input.to_string(),
            });
        }

        ROUTE_URL
            .captures(input)
            .and_then(|caps| caps.get(1))
            .map(|id| Self {
                id: id.as_str().to_string(),
            })
            .ok_or_else(|| AppError::InvalidInput(format!("not a route link: {input:?}")))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Short reference shown in the announcement.
    pub fn reference(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.id)
    }
}

impl fmt::Display for RouteLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[async_trait]
pub trait RouteSource: Send + Sync {
    async fn fetch_route(&self, route_id: &str) -> Result<Track, AppError>;
}

/// Downloads routes as GPX from `{base_url}{route_id}`.
pub struct HttpRouteSource {
    client: Client,
    base_url: String,
}

impl HttpRouteSource {
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

#[async_trait]
impl RouteSource for HttpRouteSource {
    async fn fetch_route(&self, route_id: &str) -> Result<Track, AppError> {
        let url = format!("{}{}", self.base_url, route_id);
        tracing::debug!(route_id, "Fetching route");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::RouteFetch(format!("request for route {route_id} failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            tracing::warn!(route_id, %status, "Route lookup returned an error status");
            return Err(AppError::RouteFetch(format!(
                "route {route_id} returned HTTP {status}"
            )));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| AppError::RouteFetch(format!("reading route {route_id} failed: {e}")))?;

        parse_gpx(body, route_id)
    }
}

/// Parses a GPX document into a [`Track`].
///
/// Name and description come from the metadata block when present, otherwise
/// from the first track. Points are taken from all tracks and segments in
/// order; documents without track points fall back to their routes.
pub fn parse_gpx(bytes: Bytes, source_id: &str) -> Result<Track, AppError> {
    let gpx: Gpx = gpx::read(bytes.reader()).map_err(|e| AppError::GpxParsing(e.to_string()))?;

    let first_track = gpx.tracks.first();
    let metadata = gpx.metadata.as_ref();

    let name = metadata
        .and_then(|m| m.name.clone())
        .or_else(|| first_track.and_then(|t| t.name.clone()))
        .or_else(|| gpx.routes.first().and_then(|r| r.name.clone()))
        .unwrap_or_default();
    let description = metadata
        .and_then(|m| m.description.clone())
        .or_else(|| first_track.and_then(|t| t.description.clone()));

    let mut points = Vec::new();
    for track in &gpx.tracks {
        for segment in &track.segments {
            for waypoint in &segment.points {
                points.push(to_track_point(waypoint)?);
            }
        }
    }

    if points.is_empty() {
        for route in &gpx.routes {
            for waypoint in &route.points {
                points.push(to_track_point(waypoint)?);
            }
        }
    }

    Ok(Track {
        name,
        description,
        source_id: source_id.to_string(),
        points,
    })
}

fn to_track_point(waypoint: &gpx::Waypoint) -> Result<TrackPoint, AppError> {
    let point = waypoint.point();
    Ok(TrackPoint::new(
        GeoPoint::new(point.y(), point.x())?,
        waypoint.elevation,
    ))
}
