//! In-process route and sunset sources.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;
use ride_post::{
    errors::{AppError, SunsetError},
    models::{GeoPoint, Track},
    route_source::{RouteSource, parse_gpx},
    sunset::SunsetLookup,
};

/// Serves GPX documents by route id, like the route-sharing service would.
///
/// Documents are parsed on every fetch, so malformed fixtures surface as
/// [`AppError::GpxParsing`]. Unknown ids fail with a 404-style error.
#[derive(Debug, Default)]
pub struct GpxRouteSource {
    routes: HashMap<String, Bytes>,
    fetched: Mutex<Vec<String>>,
}

impl GpxRouteSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, route_id: impl Into<String>, gpx: impl Into<Bytes>) -> Self {
        self.routes.insert(route_id.into(), gpx.into());
        self
    }

    /// Ids requested so far, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched
            .lock()
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RouteSource for GpxRouteSource {
    async fn fetch_route(&self, route_id: &str) -> Result<Track, AppError> {
        if let Ok(mut ids) = self.fetched.lock() {
            ids.push(route_id.to_string());
        }

        let gpx = self
            .routes
            .get(route_id)
            .ok_or_else(|| AppError::RouteFetch(format!("route {route_id} returned HTTP 404 Not Found")))?;
        parse_gpx(gpx.clone(), route_id)
    }
}

/// Answers every sunset lookup the same way.
#[derive(Debug)]
pub struct FixedSunset {
    clock: Option<String>,
    calls: AtomicUsize,
}

impl FixedSunset {
    /// Reports `clock` (UTC, e.g. `7:26:41 PM`) for any date and place.
    pub fn at(clock: impl Into<String>) -> Self {
        Self {
            clock: Some(clock.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fails every lookup as if the service were down.
    pub fn unavailable() -> Self {
        Self {
            clock: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SunsetLookup for FixedSunset {
    async fn fetch_sunset(&self, _date: NaiveDate, _location: GeoPoint) -> Result<String, SunsetError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.clock.clone().ok_or(SunsetError::Status(503))
    }
}
