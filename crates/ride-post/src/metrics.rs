//! Route metrics: path length, elevation gain and a presentable title.

use rand::{Rng, seq::SliceRandom};

use crate::{
    errors::AppError,
    geo_utils::distance,
    models::{EffectiveSpeed, ElevationGain, RideConfig, RouteMetrics, Track, TrackPoint},
    settings::AnnouncementSettings,
};

pub trait TrackMetric {
    type Score;
    fn next_point(&mut self, point: &TrackPoint) -> Result<(), AppError>;
    fn finish(&mut self) -> Self::Score;
}

pub fn extract_metrics<R: Rng + ?Sized>(
    track: &Track,
    fallback_titles: &[String],
    rng: &mut R,
) -> Result<RouteMetrics, AppError> {
    if track.points.is_empty() {
        return Err(AppError::EmptyTrack);
    }

    let mut path = PathLengthMetric::default();
    let mut gain = ElevationGainMetric::default();

    for point in &track.points {
        path.next_point(point)?;
        gain.next_point(point)?;
    }

    let distance_km = (path.finish() / 1000.0).ceil() as u32;
    let elevation_gain = gain.finish();
    let title = route_title(&track.name, fallback_titles, rng)?;

    tracing::debug!(
        source_id = %track.source_id,
        points = track.points.len(),
        distance_km,
        elevation_gain = %elevation_gain,
        "Extracted route metrics"
    );

    Ok(RouteMetrics {
        distance_km,
        elevation_gain,
        title,
        description: track.description.clone(),
    })
}

/// Applies the off-road variant to metrics and speed.
///
/// Returns the (possibly suffixed) metrics with the speed to plan with.
pub fn apply_ride_variant(
    mut metrics: RouteMetrics,
    ride: &RideConfig,
    settings: &AnnouncementSettings,
) -> Result<(RouteMetrics, EffectiveSpeed), AppError> {
    let mut speed = ride.average_speed_kmh;
    if ride.off_road {
        metrics.title.push_str(&settings.off_road.title_suffix);
        speed -= settings.off_road.speed_penalty_kmh;
    }
    Ok((metrics, EffectiveSpeed::new(speed)?))
}

/// Trimmed track name, or a fallback pick when it has no real word in it.
pub fn route_title<R: Rng + ?Sized>(
    name: &str,
    fallback_titles: &[String],
    rng: &mut R,
) -> Result<String, AppError> {
    let trimmed = name.trim();
    if has_word(trimmed) {
        return Ok(trimmed.to_string());
    }

    fallback_titles
        .choose(rng)
        .cloned()
        .ok_or_else(|| {
            AppError::InvalidInput("route has no title and no fallback titles are configured".into())
        })
}

/// True when `s` holds at least three alphabetic characters in a row.
fn has_word(s: &str) -> bool {
    let mut run = 0;
    for c in s.chars() {
        if c.is_alphabetic() {
            run += 1;
            if run >= 3 {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

/// Sum of segment lengths in meters, including climbs when both ends have elevation.
#[derive(Debug, Clone, Default)]
struct PathLengthMetric {
    total_distance: f64,
    last_point: Option<TrackPoint>,
}

impl TrackMetric for PathLengthMetric {
    type Score = f64;
    fn next_point(&mut self, point: &TrackPoint) -> Result<(), AppError> {
        if let Some(prev) = self.last_point {
            let flat = distance(&prev.location, &point.location)?;
            self.total_distance += match (prev.elevation, point.elevation) {
                (Some(a), Some(b)) => flat.hypot(b - a),
                _ => flat,
            };
        }
        self.last_point = Some(*point);
        Ok(())
    }

    fn finish(&mut self) -> f64 {
        self.total_distance
    }
}

#[derive(Debug, Clone, Default)]
struct ElevationGainMetric {
    total_gain: f64,
    last_elevation: Option<f64>,
    missing: bool,
}

impl TrackMetric for ElevationGainMetric {
    type Score = ElevationGain;
    fn next_point(&mut self, point: &TrackPoint) -> Result<(), AppError> {
        match point.elevation {
            Some(elevation) => {
                if let Some(last) = self.last_elevation {
                    let gain = elevation - last;
                    if gain > 0.0 {
                        self.total_gain += gain;
                    }
                }
                self.last_elevation = Some(elevation);
            }
            None => self.missing = true,
        }
        Ok(())
    }

    fn finish(&mut self) -> ElevationGain {
        if self.missing || self.last_elevation.is_none() {
            ElevationGain::NotAvailable
        } else {
            ElevationGain::Meters(self.total_gain.ceil() as u32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoPoint, RideLevel};
    use chrono::{NaiveDate, NaiveTime};
    use rand::{SeedableRng, rngs::StdRng};

    fn pt(lat: f64, lon: f64, ele: Option<f64>) -> TrackPoint {
        TrackPoint::new(GeoPoint::new(lat, lon).unwrap(), ele)
    }

    fn track(name: &str, points: Vec<TrackPoint>) -> Track {
        Track {
            name: name.to_string(),
            description: None,
            source_id: "test".to_string(),
            points,
        }
    }

    fn pool() -> Vec<String> {
        vec!["Mystery Tour".into(), "The Nameless Loop".into(), "Pedals & Pastries".into()]
    }

    fn ride(speed: f64, off_road: bool) -> RideConfig {
        RideConfig {
            date: NaiveDate::from_ymd_opt(2025, 6, 7).unwrap(),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            organizers: vec![],
            level: RideLevel::Hard,
            average_speed_kmh: speed,
            weather_disclaimer: false,
            race_disclaimer: false,
            off_road,
        }
    }

    fn planar_km(points: &[TrackPoint]) -> f64 {
        points
            .windows(2)
            .map(|w| distance(&w[0].location, &w[1].location).unwrap())
            .sum::<f64>()
            / 1000.0
    }

    #[test]
    fn test_empty_track_fails() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = extract_metrics(&track("Alpine Loop", vec![]), &pool(), &mut rng);
        assert!(matches!(result, Err(AppError::EmptyTrack)));
    }

    #[test]
    fn test_single_point_track() {
        let mut rng = StdRng::seed_from_u64(1);
        let metrics =
            extract_metrics(&track("Alpine Loop", vec![pt(47.0, 8.0, Some(400.0))]), &pool(), &mut rng)
                .unwrap();
        assert_eq!(metrics.distance_km, 0);
        assert_eq!(metrics.elevation_gain, ElevationGain::Meters(0));
    }

    #[test]
    fn test_ten_point_four_km_with_climbs() {
        // Four points on the equator, three equal legs of roughly 3.47 km each
        let step = 10.4 / 3.0 / 111.195;
        let points = vec![
            pt(0.0, 0.0, Some(100.0)),
            pt(0.0, step, Some(150.0)),
            pt(0.0, 2.0 * step, Some(120.0)),
            pt(0.0, 3.0 * step, Some(180.0)),
        ];
        let mut rng = StdRng::seed_from_u64(1);
        let metrics = extract_metrics(&track("Alpine Loop", points), &pool(), &mut rng).unwrap();

        // Climbs of 50 and 60 m; the 30 m descent does not count
        assert_eq!(metrics.elevation_gain, ElevationGain::Meters(110));
        assert_eq!(metrics.distance_km, 11);
        assert_eq!(metrics.title, "Alpine Loop");
    }

    #[test]
    fn test_distance_is_ceil_of_cumulative_planar_distance() {
        let points = vec![
            pt(47.35262, 8.52454, None),
            pt(47.39252, 8.55045, None),
            pt(47.41510, 8.51845, None),
            pt(47.36144, 8.60253, None),
        ];
        let expected = planar_km(&points).ceil() as u32;
        let mut rng = StdRng::seed_from_u64(1);
        let metrics = extract_metrics(&track("Zürich tour", points), &pool(), &mut rng).unwrap();
        assert_eq!(metrics.distance_km, expected);
        assert_eq!(metrics.elevation_gain, ElevationGain::NotAvailable);
    }

    #[test]
    fn test_distance_symmetric_under_reversal_but_not_shuffle() {
        let a = pt(47.30, 8.50, None);
        let b = pt(47.40, 8.50, None);
        let c = pt(47.50, 8.50, None);
        let mut rng = StdRng::seed_from_u64(1);

        let forward = extract_metrics(&track("Line", vec![a, b, c]), &pool(), &mut rng).unwrap();
        let reversed = extract_metrics(&track("Line", vec![c, b, a]), &pool(), &mut rng).unwrap();
        let shuffled = extract_metrics(&track("Line", vec![a, c, b]), &pool(), &mut rng).unwrap();

        assert_eq!(forward.distance_km, reversed.distance_km);
        assert_eq!(forward.distance_km, 23);
        assert_eq!(shuffled.distance_km, 34);
    }

    #[test]
    fn test_elevation_gain_requires_every_point() {
        let points = vec![
            pt(47.0, 8.0, Some(400.0)),
            pt(47.01, 8.0, None),
            pt(47.02, 8.0, Some(500.0)),
        ];
        let mut rng = StdRng::seed_from_u64(1);
        let metrics = extract_metrics(&track("Partial", points), &pool(), &mut rng).unwrap();
        assert_eq!(metrics.elevation_gain, ElevationGain::NotAvailable);
    }

    #[test]
    fn test_elevation_gain_monotone_when_appending_climbs() {
        let mut points = vec![pt(47.0, 8.0, Some(500.0)), pt(47.01, 8.0, Some(450.0))];
        let mut previous = 0;
        let mut rng = StdRng::seed_from_u64(1);

        for i in 0..5 {
            let last = points.last().unwrap().elevation.unwrap();
            points.push(pt(47.02 + i as f64 * 0.01, 8.0, Some(last + 12.5)));
            let metrics = extract_metrics(&track("Climb", points.clone()), &pool(), &mut rng).unwrap();
            let ElevationGain::Meters(gain) = metrics.elevation_gain else {
                panic!("expected elevation gain");
            };
            assert!(gain >= previous);
            previous = gain;
        }
        assert_eq!(previous, 63);
    }

    #[test]
    fn test_descending_track_has_zero_gain() {
        let points = vec![
            pt(47.0, 8.0, Some(900.0)),
            pt(47.01, 8.0, Some(700.0)),
            pt(47.02, 8.0, Some(410.0)),
        ];
        let mut rng = StdRng::seed_from_u64(1);
        let metrics = extract_metrics(&track("Downhill", points), &pool(), &mut rng).unwrap();
        assert_eq!(metrics.elevation_gain, ElevationGain::Meters(0));
    }

    #[test]
    fn test_title_fallback() {
        let pool = pool();
        for name in ["", "1234", "---", "  ab 12 cd  "] {
            let mut rng = StdRng::seed_from_u64(7);
            let title = route_title(name, &pool, &mut rng).unwrap();
            assert!(pool.contains(&title), "{name:?} produced {title:?}");
            assert_ne!(title, name);
        }
    }

    #[test]
    fn test_title_fallback_is_deterministic_for_a_seed() {
        let pool = pool();
        let mut expected_rng = StdRng::seed_from_u64(42);
        let expected = pool.choose(&mut expected_rng).unwrap().clone();

        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(route_title("1234", &pool, &mut rng).unwrap(), expected);
    }

    #[test]
    fn test_title_kept_when_it_has_a_word() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(route_title("  Alpine Loop ", &pool(), &mut rng).unwrap(), "Alpine Loop");
        assert_eq!(route_title("Üto 2x", &pool(), &mut rng).unwrap(), "Üto 2x");
    }

    #[test]
    fn test_title_fallback_without_pool_fails() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(matches!(
            route_title("123", &[], &mut rng),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_off_road_variant() {
        let settings = AnnouncementSettings::default();
        let metrics = RouteMetrics {
            distance_km: 40,
            elevation_gain: ElevationGain::Meters(600),
            title: "Albis".into(),
            description: None,
        };

        let (adjusted, speed) = apply_ride_variant(metrics.clone(), &ride(26.0, true), &settings).unwrap();
        assert_eq!(adjusted.title, "Albis - Gravel/CX ride");
        assert_eq!(speed.kmh(), 16.0);

        let (unchanged, speed) = apply_ride_variant(metrics.clone(), &ride(26.0, false), &settings).unwrap();
        assert_eq!(unchanged, metrics);
        assert_eq!(speed.kmh(), 26.0);

        assert!(matches!(
            apply_ride_variant(metrics, &ride(10.0, true), &settings),
            Err(AppError::InvalidInput(_))
        ));
    }
}
