//! Server configuration read from the environment.

use std::{path::PathBuf, time::Duration};

use stopwise::{
    feed,
    shared::{Coordinate, Distance},
};
use tracing::warn;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the raw archive and the extracted artifacts.
    pub data_dir: PathBuf,
    /// Where `POST /refresh` and the scheduled refresh download from.
    pub feed_url: Option<String>,
    pub port: u16,
    /// Period of the background refresh. Disabled when unset.
    pub refresh_interval: Option<Duration>,
    pub request_timeout: Duration,
    /// Local archive extracted once at startup.
    pub archive: Option<PathBuf>,
    pub feed: feed::Config,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            feed_url: None,
            port: DEFAULT_PORT,
            refresh_interval: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            archive: None,
            feed: feed::Config::default(),
        }
    }
}

impl Config {
    /// Reads `STOPWISE_*` variables. The first argument, if any, is a local
    /// archive to extract at startup.
    pub fn from_env(args: impl IntoIterator<Item = String>) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), args)
    }

    pub fn from_lookup<F>(lookup: F, args: impl IntoIterator<Item = String>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(dir) = lookup("STOPWISE_DATA_DIR") {
            config.data_dir = dir.into();
        }
        config.feed_url = lookup("STOPWISE_FEED_URL").filter(|url| !url.trim().is_empty());
        if let Some(port) = parse_var(&lookup, "STOPWISE_PORT") {
            config.port = port;
        }
        config.refresh_interval = parse_var(&lookup, "STOPWISE_REFRESH_INTERVAL_SECS")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        if let Some(secs) = parse_var(&lookup, "STOPWISE_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(area) = lookup("STOPWISE_AREA") {
            match parse_area(&area) {
                Some((center, radius)) => config.feed = config.feed.with_area(center, radius),
                None => warn!("Ignoring STOPWISE_AREA={area}, expected lat,lng,radius_m"),
            }
        }
        config.archive = args.into_iter().next().map(PathBuf::from);
        config
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let value = lookup(key)?;
    match value.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid {key}={value}");
            None
        }
    }
}

fn parse_area(value: &str) -> Option<(Coordinate, Distance)> {
    let mut split = value.split(',').map(|part| part.trim().parse::<f64>());
    let latitude = split.next()?.ok()?;
    let longitude = split.next()?.ok()?;
    let radius = split.next()?.ok()?;
    if split.next().is_some() || radius <= 0.0 {
        return None;
    }
    Some((
        Coordinate::new(latitude, longitude),
        Distance::from_meters(radius),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)], args: &[&str]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(
            |key| vars.get(key).cloned(),
            args.iter().map(|arg| arg.to_string()),
        )
    }

    #[test]
    fn defaults() {
        let config = config(&[], &[]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert!(config.feed_url.is_none());
        assert!(config.refresh_interval.is_none());
        assert!(config.archive.is_none());
        assert!(config.feed.area.is_none());
    }

    #[test]
    fn reads_variables() {
        let config = config(
            &[
                ("STOPWISE_DATA_DIR", "/tmp/stopwise"),
                ("STOPWISE_FEED_URL", "https://example.com/gtfs.zip"),
                ("STOPWISE_PORT", "8080"),
                ("STOPWISE_REFRESH_INTERVAL_SECS", "3600"),
                ("STOPWISE_REQUEST_TIMEOUT_SECS", "2"),
                ("STOPWISE_AREA", "59.33, 18.06, 15000"),
            ],
            &["feed.zip"],
        );
        assert_eq!(config.data_dir, PathBuf::from("/tmp/stopwise"));
        assert_eq!(
            config.feed_url.as_deref(),
            Some("https://example.com/gtfs.zip")
        );
        assert_eq!(config.port, 8080);
        assert_eq!(config.refresh_interval, Some(Duration::from_secs(3600)));
        assert_eq!(config.request_timeout, Duration::from_secs(2));
        assert_eq!(config.archive, Some(PathBuf::from("feed.zip")));
        let area = config.feed.area.unwrap();
        assert_eq!(area.radius, Distance::from_meters(15000.0));
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config(
            &[
                ("STOPWISE_PORT", "eighty"),
                ("STOPWISE_REFRESH_INTERVAL_SECS", "0"),
                ("STOPWISE_AREA", "59.33,18.06"),
                ("STOPWISE_FEED_URL", " "),
            ],
            &[],
        );
        assert_eq!(config.port, 3000);
        assert!(config.refresh_interval.is_none());
        assert!(config.feed.area.is_none());
        assert!(config.feed_url.is_none());
    }
}
