use geo::{Distance as _, Haversine, geometry::Point};

use crate::{
    errors::AppError,
    models::{GeoPoint, MeetingPoint},
};

/// Great-circle distance in meters.
pub fn distance(a: &GeoPoint, b: &GeoPoint) -> Result<f64, AppError> {
    a.validate()?;
    b.validate()?;
    Ok(Haversine.distance(to_point(a), to_point(b)))
}

/// Name of the registry entry closest to `point`.
///
/// Ties go to the earliest entry in the registry.
pub fn nearest_meeting_point<'a>(
    point: &GeoPoint,
    registry: &'a [MeetingPoint],
) -> Result<&'a str, AppError> {
    let mut best: Option<(&MeetingPoint, f64)> = None;

    for candidate in registry {
        let d = distance(point, &candidate.location)?;
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((candidate, d)),
        }
    }

    best.map(|(mp, _)| mp.name.as_str())
        .ok_or(AppError::EmptyRegistry)
}

fn to_point(p: &GeoPoint) -> Point {
    Point::new(p.longitude, p.latitude)
}
