//! Renders the announcement texts.

use std::fmt::Write as _;

use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;

use crate::{
    models::{AnnouncementText, EffectiveSpeed, RideConfig, RouteMetrics},
    settings::AnnouncementSettings,
    sunset::local_datetime,
};

/// Builds the full post and the short post for one ride.
pub fn compose(
    ride: &RideConfig,
    metrics: &RouteMetrics,
    speed: EffectiveSpeed,
    meeting_point: &str,
    sunset: DateTime<Tz>,
    route_ref: &str,
    settings: &AnnouncementSettings,
) -> AnnouncementText {
    let texts = &settings.texts;
    let mut full = String::new();

    let _ = write!(
        full,
        "*— {} —*\n\n{}\n\n",
        ride.date.format("%A, %B %-d"),
        texts.registration
    );

    let back_after_sunset =
        estimated_return(ride, metrics, speed, settings).is_none_or(|back| back > sunset);
    if back_after_sunset {
        let _ = write!(full, "{}\n\n", texts.lights_warning);
    }

    let _ = writeln!(full, "*{}*", metrics.title);
    let _ = writeln!(full, "{}", organizer_line(ride, settings));
    let _ = writeln!(
        full,
        "*Route*: {}km, {}, {}",
        metrics.distance_km, metrics.elevation_gain, route_ref
    );

    let level = if ride.off_road {
        settings.off_road.level_symbol.as_str()
    } else {
        ride.level.symbol()
    };
    let _ = writeln!(full, "*Ride level*: {level}, ~{:.0}km/h", speed.kmh());
    let _ = writeln!(
        full,
        "*Meeting time & place*: {} at {meeting_point}",
        ride.start_time.format("%H:%M")
    );

    match &metrics.description {
        Some(description) => {
            let _ = write!(full, "{}\n\n", description.trim());
        }
        None => full.push('\n'),
    }

    if ride.race_disclaimer {
        let _ = write!(full, "{}\n\n", texts.race_disclaimer);
    }
    if ride.weather_disclaimer {
        let _ = write!(full, "{}\n\n", texts.weather_disclaimer);
    }

    full.push_str(if ride.off_road {
        &settings.off_road.sign_off
    } else {
        &texts.sign_off
    });

    AnnouncementText {
        full,
        short: format!("{} @ {meeting_point}", metrics.title),
    }
}

/// Start time plus moving time, padded for breaks.
///
/// `None` when the ride would end outside the representable date range.
pub fn estimated_return(
    ride: &RideConfig,
    metrics: &RouteMetrics,
    speed: EffectiveSpeed,
    settings: &AnnouncementSettings,
) -> Option<DateTime<Tz>> {
    let model = &settings.return_time;
    let hours =
        metrics.distance_km as f64 / speed.kmh() * model.moving_time_factor + model.buffer_hours;
    let duration = TimeDelta::try_seconds((hours * 3600.0).round() as i64)?;
    local_datetime(ride.date, ride.start_time, settings.sunset.timezone).checked_add_signed(duration)
}

fn organizer_line(ride: &RideConfig, settings: &AnnouncementSettings) -> String {
    if ride.organizers.is_empty() {
        return settings.texts.unsupervised_notice.clone();
    }
    let mut names: Vec<String> = ride.organizers.iter().map(|o| o.to_string()).collect();
    names.sort();
    names.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ElevationGain, Organizer, RideLevel};
    use chrono::{NaiveDate, NaiveTime, Timelike};
    use regex::Regex;

    fn settings() -> AnnouncementSettings {
        AnnouncementSettings::default()
    }

    fn organizer(name: &str, contact: &str) -> Organizer {
        Organizer {
            name: name.into(),
            contact: contact.into(),
        }
    }

    fn saturday_ride() -> RideConfig {
        RideConfig {
            date: NaiveDate::from_ymd_opt(2025, 6, 7).unwrap(),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            organizers: vec![organizer("Zoe", "+41 2"), organizer("Anna", "+41 1")],
            level: RideLevel::Moderate,
            average_speed_kmh: 26.0,
            weather_disclaimer: false,
            race_disclaimer: false,
            off_road: false,
        }
    }

    fn metrics() -> RouteMetrics {
        RouteMetrics {
            distance_km: 63,
            elevation_gain: ElevationGain::Meters(812),
            title: "Pfannenstiel".into(),
            description: Some("  Coffee in Meilen. \n".into()),
        }
    }

    fn sunset_at(date: NaiveDate, h: u32, m: u32) -> DateTime<Tz> {
        local_datetime(
            date,
            NaiveTime::from_hms_opt(h, m, 0).unwrap(),
            chrono_tz::Europe::Berlin,
        )
    }

    fn speed(kmh: f64) -> EffectiveSpeed {
        EffectiveSpeed::new(kmh).unwrap()
    }

    #[test]
    fn test_full_layout() {
        let settings = settings();
        let ride = saturday_ride();
        let text = compose(
            &ride,
            &metrics(),
            speed(26.0),
            "Graveyard Witikon",
            sunset_at(ride.date, 21, 26),
            "strava.com/routes/42",
            &settings,
        );

        let expected = format!(
            "*— Saturday, June 7 —*\n\n{}\n\n\
             *Pfannenstiel*\n\
             Anna (+41 1), Zoe (+41 2)\n\
             *Route*: 63km, 812m, strava.com/routes/42\n\
             *Ride level*: 🦵, ~26km/h\n\
             *Meeting time & place*: 10:00 at Graveyard Witikon\n\
             Coffee in Meilen.\n\n\
             Thanks & see you on the road 👋",
            settings.texts.registration
        );
        assert_eq!(text.full, expected);
        assert_eq!(text.short, "Pfannenstiel @ Graveyard Witikon");
    }

    #[test]
    fn test_lights_warning_when_returning_after_sunset() {
        let settings = settings();
        let mut ride = saturday_ride();
        ride.date = NaiveDate::from_ymd_opt(2025, 9, 3).unwrap();
        ride.start_time = NaiveTime::from_hms_opt(18, 0, 0).unwrap();

        let text = compose(
            &ride,
            &metrics(),
            speed(26.0),
            "Graveyard Witikon",
            sunset_at(ride.date, 20, 0),
            "strava.com/routes/42",
            &settings,
        );

        let warning = format!("{}\n\n*Pfannenstiel*", settings.texts.lights_warning);
        assert!(text.full.contains(&warning), "{}", text.full);
        assert!(text.full.starts_with("*— Wednesday, September 3 —*"));
    }

    #[test]
    fn test_no_lights_warning_when_back_exactly_at_sunset() {
        let settings = settings();
        let ride = saturday_ride();
        let back = estimated_return(&ride, &metrics(), speed(26.0), &settings).unwrap();

        let text = compose(
            &ride,
            &metrics(),
            speed(26.0),
            "Graveyard Witikon",
            back,
            "strava.com/routes/42",
            &settings,
        );
        assert!(!text.full.contains(&settings.texts.lights_warning));
    }

    #[test]
    fn test_estimated_return() {
        let settings = settings();
        let mut ride = saturday_ride();
        ride.start_time = NaiveTime::from_hms_opt(18, 0, 0).unwrap();

        // 63 / 26 * 1.2 + 0.3 hours is 3h 12m 28s
        let back = estimated_return(&ride, &metrics(), speed(26.0), &settings).unwrap();
        assert_eq!((back.hour(), back.minute(), back.second()), (21, 12, 28));
    }

    #[test]
    fn test_crawling_speed_does_not_overflow() {
        let settings = settings();
        let ride = saturday_ride();

        for kmh in [1e-9, 1e-300] {
            assert_eq!(estimated_return(&ride, &metrics(), speed(kmh), &settings), None);

            let text = compose(
                &ride,
                &metrics(),
                speed(kmh),
                "Graveyard Witikon",
                sunset_at(ride.date, 21, 26),
                "strava.com/routes/42",
                &settings,
            );
            assert!(text.full.contains(&settings.texts.lights_warning), "{kmh}");
        }
    }

    #[test]
    fn test_unsupervised_notice_without_organizers() {
        let settings = settings();
        let mut ride = saturday_ride();
        ride.organizers.clear();

        let text = compose(
            &ride,
            &metrics(),
            speed(26.0),
            "Graveyard Witikon",
            sunset_at(ride.date, 21, 26),
            "strava.com/routes/42",
            &settings,
        );
        let expected = format!("*Pfannenstiel*\n{}\n*Route*", settings.texts.unsupervised_notice);
        assert!(text.full.contains(&expected), "{}", text.full);
    }

    #[test]
    fn test_off_road_ride() {
        let settings = settings();
        let mut ride = saturday_ride();
        ride.off_road = true;
        ride.level = RideLevel::Social;
        let mut metrics = metrics();
        metrics.title = "Uetliberg - Gravel/CX ride".into();

        let text = compose(
            &ride,
            &metrics,
            speed(16.0),
            "Thiwa's Cafe, Triemli",
            sunset_at(ride.date, 21, 26),
            "strava.com/routes/42",
            &settings,
        );

        assert!(text.full.contains("*Ride level*: ⛰️, ~16km/h\n"));
        assert!(!text.full.contains("☕️"));
        assert!(text.full.ends_with("Thanks & see you on the dirt! 🫎"));
        assert_eq!(text.short, "Uetliberg - Gravel/CX ride @ Thiwa's Cafe, Triemli");
    }

    #[test]
    fn test_disclaimers_follow_description_in_order() {
        let settings = settings();
        let mut ride = saturday_ride();
        ride.race_disclaimer = true;
        ride.weather_disclaimer = true;
        let mut metrics = metrics();
        metrics.description = None;
        metrics.elevation_gain = ElevationGain::NotAvailable;

        let text = compose(
            &ride,
            &metrics,
            speed(26.0),
            "Graveyard Witikon",
            sunset_at(ride.date, 21, 26),
            "strava.com/routes/42",
            &settings,
        );

        let tail = format!(
            "at Graveyard Witikon\n\n{}\n\n{}\n\nThanks & see you on the road 👋",
            settings.texts.race_disclaimer, settings.texts.weather_disclaimer
        );
        assert!(text.full.ends_with(&tail), "{}", text.full);
        assert!(text.full.contains("*Route*: 63km, n/a m, strava.com/routes/42\n"));
    }

    #[test]
    fn test_distance_and_elevation_round_trip_through_text() {
        let settings = settings();
        let ride = saturday_ride();
        let pattern = Regex::new(r"\*Route\*: (\d+)km, (\d+)m, ").unwrap();

        for (km, gain) in [(1, 0), (11, 140), (63, 812), (212, 3456)] {
            let mut metrics = metrics();
            metrics.distance_km = km;
            metrics.elevation_gain = ElevationGain::Meters(gain);

            let text = compose(
                &ride,
                &metrics,
                speed(26.0),
                "Graveyard Witikon",
                sunset_at(ride.date, 23, 59),
                "strava.com/routes/42",
                &settings,
            );
            let caps = pattern.captures(&text.full).unwrap();
            assert_eq!(caps[1].parse::<u32>().unwrap(), km);
            assert_eq!(caps[2].parse::<u32>().unwrap(), gain);
        }
    }
}
