use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{load_yaml, parse_yaml, ConfigError};

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub unit: UnitConfig,
    pub collector: CollectorEndpoint,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub liveness: LivenessConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitConfig {
    pub mac: Option<String>,
    #[serde(default = "default_interface")]
    pub interface: String,
}

impl Default for UnitConfig {
    fn default() -> Self {
        UnitConfig {
            mac: None,
            interface: default_interface(),
        }
    }
}

fn default_interface() -> String {
    "eth0".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectorEndpoint {
    pub url: String,
    #[serde(default = "default_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

fn default_timeout() -> Duration {
    Duration::from_secs(5)
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub root: PathBuf,
    #[serde(default = "default_orientation")]
    pub orientation: PathBuf,
    #[serde(default = "default_position")]
    pub position: PathBuf,
    #[serde(default = "default_alert_level")]
    pub alert_level: PathBuf,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        SourcesConfig {
            root: PathBuf::new(),
            orientation: default_orientation(),
            position: default_position(),
            alert_level: default_alert_level(),
        }
    }
}

fn default_orientation() -> PathBuf {
    PathBuf::from("cytron/compass_broadcast.txt")
}

fn default_position() -> PathBuf {
    PathBuf::from("cytron/gps_broadcast.txt")
}

fn default_alert_level() -> PathBuf {
    PathBuf::from("swarm/alert_level.txt")
}

impl SourcesConfig {
    /// Resolves a configured path against `root`. Absolute paths are kept as is.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    pub fn orientation_path(&self) -> PathBuf {
        self.resolve(&self.orientation)
    }

    pub fn position_path(&self) -> PathBuf {
        self.resolve(&self.position)
    }

    pub fn alert_level_path(&self) -> PathBuf {
        self.resolve(&self.alert_level)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LivenessMode {
    #[default]
    Channel,
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LivenessConfig {
    #[serde(default)]
    pub mode: LivenessMode,
    #[serde(default = "default_liveness_path")]
    pub path: PathBuf,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        LivenessConfig {
            mode: LivenessMode::default(),
            path: default_liveness_path(),
        }
    }
}

fn default_liveness_path() -> PathBuf {
    PathBuf::from("realtime/heartbeat_broadcast.txt")
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "one_second", deserialize_with = "deserialize_duration")]
    pub sensor_period: Duration,
    #[serde(default = "five_seconds", deserialize_with = "deserialize_duration")]
    pub restart_delay: Duration,
    #[serde(default = "one_second", deserialize_with = "deserialize_duration")]
    pub heartbeat_fallback: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            sensor_period: one_second(),
            restart_delay: five_seconds(),
            heartbeat_fallback: one_second(),
        }
    }
}

fn one_second() -> Duration {
    Duration::from_secs(1)
}

fn five_seconds() -> Duration {
    Duration::from_secs(5)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

impl AgentConfig {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        load_yaml(path)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        parse_yaml(yaml)
    }

    /// The unit identifier: the configured MAC, or the hardware address of
    /// the configured network interface.
    pub fn unit_mac(&self) -> Result<String, ConfigError> {
        let mac = match &self.unit.mac {
            Some(mac) => mac.trim().to_string(),
            None => {
                let path = Path::new("/sys/class/net")
                    .join(&self.unit.interface)
                    .join("address");
                std::fs::read_to_string(path)
                    .map(|s| s.trim().to_string())
                    .map_err(|source| ConfigError::Mac {
                        interface: self.unit.interface.clone(),
                        source,
                    })?
            }
        };
        if mac.is_empty() {
            return Err(ConfigError::BlankMac);
        }
        Ok(mac)
    }

    pub fn liveness_path(&self) -> PathBuf {
        self.sources.resolve(&self.liveness.path)
    }
}
