//! HTTP handlers.

use axum::{Extension, http::StatusCode, response::Json};
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;

use crate::{
    errors::AppError,
    models::{AnnouncementText, RideLevel},
    service::{AnnouncementRequest, AnnouncementService},
};

/// Health check endpoint.
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Serialize)]
pub struct LevelOption {
    pub id: RideLevel,
    pub symbol: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SpeedOption {
    pub min_kmh: f64,
    pub max_kmh: f64,
    pub default_kmh: f64,
}

/// Choices a form needs to offer.
#[derive(Debug, Serialize)]
pub struct FormOptions {
    pub meeting_points: Vec<String>,
    pub organizers: Vec<String>,
    pub levels: Vec<LevelOption>,
    pub speed: SpeedOption,
}

pub async fn get_form_options(Extension(service): Extension<AnnouncementService>) -> Json<FormOptions> {
    let settings = service.settings();

    Json(FormOptions {
        meeting_points: settings
            .meeting_points
            .iter()
            .map(|mp| mp.name.clone())
            .collect(),
        organizers: settings.organizers.keys().cloned().collect(),
        levels: RideLevel::ALL
            .iter()
            .map(|&level| LevelOption {
                id: level,
                symbol: level.symbol(),
            })
            .collect(),
        speed: SpeedOption {
            min_kmh: settings.speed.min_kmh,
            max_kmh: settings.speed.max_kmh,
            default_kmh: settings.speed.default_kmh,
        },
    })
}

/// Create both announcement texts from a form submission.
pub async fn create_announcement(
    Extension(service): Extension<AnnouncementService>,
    Json(request): Json<AnnouncementRequest>,
) -> Result<Json<AnnouncementText>, AppError> {
    let mut rng = StdRng::from_entropy();
    let text = service.create(&request, &mut rng).await?;
    Ok(Json(text))
}
