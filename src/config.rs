use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::controller::ControllerSettings;
use crate::geo::{Coordinate, DEFAULT_SPAN_DEG, FALLBACK_CENTER};
use crate::sampler::SamplerTimeouts;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub capture: CaptureConfig,
    pub sampler: SamplerConfig,
    pub map: MapConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/locations.jsonl"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    #[serde(deserialize_with = "duration")]
    pub period: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            period: ControllerSettings::default().auto_capture_period,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    #[serde(deserialize_with = "duration")]
    pub preferred_timeout: Duration,
    #[serde(deserialize_with = "duration")]
    pub hard_timeout: Duration,
    /// Fixes played back in place of a GPS receiver, as `"lat,lon"` strings.
    #[serde(deserialize_with = "coordinates")]
    pub track: Vec<Coordinate>,
    pub cycle: bool,
    pub deny_permission: bool,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        let timeouts = SamplerTimeouts::default();
        Self {
            preferred_timeout: timeouts.preferred,
            hard_timeout: timeouts.hard,
            track: Vec::new(),
            cycle: true,
            deny_permission: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    #[serde(deserialize_with = "coordinate")]
    pub center: Coordinate,
    pub span_deg: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: FALLBACK_CENTER,
            span_deg: DEFAULT_SPAN_DEG,
            width: 300.0,
            height: 300.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub output: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("heat.svg"),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            auto_capture_period: self.capture.period,
        }
    }

    pub fn sampler_timeouts(&self) -> SamplerTimeouts {
        SamplerTimeouts {
            preferred: self.sampler.preferred_timeout,
            hard: self.sampler.hard_timeout,
        }
    }
}

fn duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

fn coordinate<'de, D>(deserializer: D) -> Result<Coordinate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

fn coordinates<'de, D>(deserializer: D) -> Result<Vec<Coordinate>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<String>::deserialize(deserializer)?
        .iter()
        .map(|s| s.parse().map_err(serde::de::Error::custom))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_str("{}").unwrap();
        assert_eq!(config.capture.period, Duration::from_secs(15));
        assert_eq!(config.sampler.preferred_timeout, Duration::from_secs(8));
        assert_eq!(config.sampler.hard_timeout, Duration::from_secs(12));
        assert_eq!(config.map.center, FALLBACK_CENTER);
        assert_eq!(config.map.span_deg, 0.004);
        assert!(config.sampler.track.is_empty());
    }

    #[test]
    fn parses_full_document() {
        let yaml = r#"
store:
  path: /tmp/points.jsonl
capture:
  period: 1m 30s
sampler:
  preferred_timeout: 5s
  hard_timeout: 10s
  track:
    - "48.8566, 2.3522"
    - "48.8570,2.3530"
  cycle: false
map:
  center: "48.8566,2.3522"
  width: 640
  height: 480
render:
  output: paris.svg
"#;
        let config = Config::from_str(yaml).unwrap();
        assert_eq!(config.store.path, PathBuf::from("/tmp/points.jsonl"));
        assert_eq!(config.controller_settings().auto_capture_period, Duration::from_secs(90));
        assert_eq!(config.sampler_timeouts().preferred, Duration::from_secs(5));
        assert_eq!(config.sampler_timeouts().hard, Duration::from_secs(10));
        assert_eq!(config.sampler.track.len(), 2);
        assert!(!config.sampler.cycle);
        assert_eq!(config.map.center.latitude(), 48.8566);
        assert_eq!((config.map.width, config.map.height), (640.0, 480.0));
        assert_eq!(config.map.span_deg, 0.004);
        assert_eq!(config.render.output, PathBuf::from("paris.svg"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_str("capture:\n  period: soon\n").is_err());
        assert!(Config::from_str("map:\n  center: \"91,0\"\n").is_err());
        assert!(Config::from_str("sampler:\n  track: [\"1\"]\n").is_err());
    }
}
