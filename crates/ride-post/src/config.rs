//! Process configuration read from the environment.
//!
//! | Variable            | Default                              |
//! |---------------------|--------------------------------------|
//! | `PORT`              | `3001`                               |
//! | `ROUTE_API_URL`     | required, route id is appended       |
//! | `SUNSET_API_URL`    | `https://api.sunrisesunset.io/json`  |
//! | `HTTP_TIMEOUT_SECS` | `10`                                 |
//! | `SETTINGS_FILE`     | built-in Zürich settings             |
//! | `ORGANIZERS_FILE`   | organizers from `SETTINGS_FILE`      |

use std::{collections::BTreeMap, env, fs, path::Path, time::Duration};

use serde::de::DeserializeOwned;

use crate::{errors::ConfigError, settings::AnnouncementSettings, sunset::DEFAULT_SUNSET_API_URL};

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub route_api_url: String,
    pub sunset_api_url: String,
    pub http_timeout: Duration,
    pub settings: AnnouncementSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source, which keeps tests off the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let timeout_secs = parse_or(
            "HTTP_TIMEOUT_SECS",
            lookup("HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;
        let route_api_url = lookup("ROUTE_API_URL").ok_or(ConfigError::Missing("ROUTE_API_URL"))?;
        let sunset_api_url =
            lookup("SUNSET_API_URL").unwrap_or_else(|| DEFAULT_SUNSET_API_URL.to_string());

        let mut settings = match lookup("SETTINGS_FILE") {
            Some(path) => read_json::<AnnouncementSettings>(&path)?,
            None => AnnouncementSettings::default(),
        };
        if let Some(path) = lookup("ORGANIZERS_FILE") {
            settings.organizers = read_json::<BTreeMap<String, String>>(&path)?;
        }

        tracing::debug!(
            meeting_points = settings.meeting_points.len(),
            organizers = settings.organizers.len(),
            "Loaded announcement settings"
        );

        Ok(Self {
            port,
            route_api_url,
            sunset_api_url,
            http_timeout: Duration::from_secs(timeout_secs),
            settings,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: v }),
        None => Ok(default),
    }
}

fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: display,
        source,
    })
}
