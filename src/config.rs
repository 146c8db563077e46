// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Configuration file handling.
//!
//! Persists the active curve, named curves, and daemon settings to TOML.
//! Default path: `/etc/fancurve/config.toml`

use crate::curve::{self, CurveSpec, SampleRange};
use crate::error::CurveError;
use crate::store::NamedCurve;
use crate::thermal::TemperatureSource;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default config file location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/fancurve/config.toml";

/// Default daemon socket path.
pub const DEFAULT_SOCKET_PATH: &str = "/run/fancurve.sock";

/// Default thermal zone read by the daemon.
pub const DEFAULT_THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0/temp";

/// Default `ipmitool` executable.
pub const DEFAULT_IPMITOOL: &str = "ipmitool";

/// Default IPMI sensors averaged by the `ipmi` temperature source.
pub const DEFAULT_IPMI_SENSORS: [&str; 2] = ["CPU1 Temp", "CPU2 Temp"];

/// Default poll interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Daemon settings.
    #[serde(default)]
    pub daemon: DaemonConfig,

    /// Range used when sampling a curve for display.
    #[serde(default)]
    pub sample: SampleRange,

    /// The active curve.
    #[serde(default = "curve::default_spec")]
    pub session: CurveSpec,

    /// Named curves.
    #[serde(default)]
    pub curves: Vec<NamedCurve>,
}

/// Daemon-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaemonConfig {
    /// How often the current temperature is read, in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Path for the Unix domain socket.
    #[serde(default = "default_socket_path")]
    pub socket_path: String,

    /// Sysfs file holding the temperature in millidegrees Celsius.
    #[serde(default = "default_thermal_zone")]
    pub thermal_zone: String,

    /// `thermal` reads `thermal_zone`; `ipmi` averages `ipmi_sensors` and
    /// falls back to `thermal_zone`.
    #[serde(default)]
    pub temperature_source: TemperatureSource,

    /// `ipmitool` executable name or path.
    #[serde(default = "default_ipmitool")]
    pub ipmitool: String,

    /// IPMI sensor names passed to `ipmitool sensor get`.
    #[serde(default = "default_ipmi_sensors")]
    pub ipmi_sensors: Vec<String>,

    /// Save the config whenever the active curve changes.
    #[serde(default = "default_true")]
    pub autosave: bool,

    /// Where to write the last generated curve as JSON, if anywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve_output_path: Option<String>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            socket_path: DEFAULT_SOCKET_PATH.to_string(),
            thermal_zone: DEFAULT_THERMAL_ZONE.to_string(),
            temperature_source: TemperatureSource::default(),
            ipmitool: default_ipmitool(),
            ipmi_sensors: default_ipmi_sensors(),
            autosave: true,
            curve_output_path: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daemon: DaemonConfig::default(),
            sample: SampleRange::default(),
            session: curve::default_spec(),
            curves: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Load / Save
// ---------------------------------------------------------------------------

/// Load config from a TOML file, or return the default if the file doesn't exist.
pub fn load_config(path: &Path) -> io::Result<Config> {
    if !path.exists() {
        log::info!("No config file at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let contents = fs::read_to_string(path)?;
    let config = parse_config(&contents)?;

    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Parse and validate config text.
pub fn parse_config(contents: &str) -> io::Result<Config> {
    let config: Config = toml::from_str(contents).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Failed to parse config: {e}"),
        )
    })?;

    let invalid = |e: CurveError| {
        io::Error::new(io::ErrorKind::InvalidData, format!("Invalid config: {e}"))
    };
    config.session.validate().map_err(invalid)?;
    for named in &config.curves {
        named.curve.validate().map_err(invalid)?;
    }
    Ok(config)
}

/// Save config to a TOML file, creating parent directories if needed.
pub fn save_config(path: &Path, config: &Config) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Failed to serialize config: {e}"),
        )
    })?;

    fs::write(path, contents)?;
    log::info!("Saved config to {}", path.display());
    Ok(())
}

/// Resolve the config file path from CLI arg or default.
pub fn resolve_config_path(cli_path: Option<&str>) -> PathBuf {
    cli_path
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_socket_path() -> String {
    DEFAULT_SOCKET_PATH.to_string()
}

fn default_thermal_zone() -> String {
    DEFAULT_THERMAL_ZONE.to_string()
}

fn default_ipmitool() -> String {
    DEFAULT_IPMITOOL.to_string()
}

fn default_ipmi_sensors() -> Vec<String> {
    DEFAULT_IPMI_SENSORS.iter().map(|s| s.to_string()).collect()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{ControlPoint, InterpolationMode};
    use crate::store::FanControlMode;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("fancurve-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.session.points.len(), 3);
    }

    #[test]
    fn test_parse_partial_config() {
        let config = parse_config(
            r#"
            [daemon]
            socket_path = "/tmp/fc.sock"
            autosave = false

            [session]
            interpolationMode = "hardcut"

            [[session.points]]
            temperature = 40.0
            fanSpeed = 30.0

            [[curves]]
            id = "loud"
            name = "Loud"
            mode = "rpm"

            [curves.curve]
            points = [{ temperature = 20.0, fanSpeed = 1200.0 }]
            "#,
        )
        .unwrap();

        assert_eq!(config.daemon.socket_path, "/tmp/fc.sock");
        assert!(!config.daemon.autosave);
        assert_eq!(config.daemon.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        assert_eq!(config.session.interpolation_mode, InterpolationMode::HardCut);
        assert_eq!(config.session.points, vec![ControlPoint::new(40.0, 30.0)]);
        assert_eq!(config.curves[0].mode, FanControlMode::Rpm);
        assert_eq!(config.curves[0].curve.interpolation_mode, InterpolationMode::Gradual);
        assert_eq!(config.sample, SampleRange::default());
    }

    #[test]
    fn test_parse_ipmi_source() {
        let config = parse_config(
            r#"
            [daemon]
            temperature_source = "ipmi"
            ipmi_sensors = ["CPU1 Temp"]
            "#,
        )
        .unwrap();
        assert_eq!(config.daemon.temperature_source, TemperatureSource::Ipmi);
        assert_eq!(config.daemon.ipmi_sensors, ["CPU1 Temp"]);
        assert_eq!(config.daemon.ipmitool, DEFAULT_IPMITOOL);

        let defaults = DaemonConfig::default();
        assert_eq!(defaults.temperature_source, TemperatureSource::Thermal);
        assert_eq!(defaults.ipmi_sensors, DEFAULT_IPMI_SENSORS);
    }

    #[test]
    fn test_parse_rejects_non_finite_points() {
        let err = parse_config(
            r#"
            [[session.points]]
            temperature = nan
            fanSpeed = 30.0
            "#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_save_then_load() {
        let path = scratch_path("roundtrip/config.toml");
        let mut config = Config::default();
        config.daemon.curve_output_path = Some("/tmp/curve.json".to_string());
        config
            .curves
            .push(NamedCurve::new("quiet", "Quiet", curve::default_spec()));

        save_config(&path, &config).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let loaded = load_config(&scratch_path("does/not/exist.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_resolve_config_path() {
        assert_eq!(resolve_config_path(None), PathBuf::from(DEFAULT_CONFIG_PATH));
        assert_eq!(resolve_config_path(Some("/x.toml")), PathBuf::from("/x.toml"));
    }
}
