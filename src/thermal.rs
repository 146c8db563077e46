// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! System temperature sources.
//!
//! Scans `/sys/class/thermal/` for `thermal_zoneN` entries. Each zone exposes
//! a `temp` file in millidegrees Celsius and a `type` file naming the source.
//! Servers with a BMC can instead be read through `ipmitool sensor get`.
//! Nothing in this module writes to sysfs or the BMC.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

const THERMAL_ROOT: &str = "/sys/class/thermal";

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Where the daemon gets the current temperature from.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureSource {
    /// A sysfs thermal zone file.
    #[default]
    Thermal,
    /// The average of IPMI sensors, falling back to the thermal zone.
    Ipmi,
}

/// Everything needed to take one temperature reading.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSettings<'a> {
    pub source: TemperatureSource,
    pub thermal_zone: &'a Path,
    pub ipmitool: &'a str,
    pub ipmi_sensors: &'a [String],
}

/// A discovered thermal zone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThermalZone {
    /// Directory name, e.g. "thermal_zone0"
    pub id: String,
    /// Contents of the `type` file, e.g. "x86_pkg_temp"
    pub kind: Option<String>,
    /// Absolute path to the `temp` file (millidegrees C)
    pub input_path: PathBuf,
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Scan `/sys/class/thermal` and return all zones with a readable `temp` file.
pub fn discover_zones() -> io::Result<Vec<ThermalZone>> {
    discover_zones_in(Path::new(THERMAL_ROOT))
}

/// Scan an arbitrary directory laid out like `/sys/class/thermal`.
pub fn discover_zones_in(root: &Path) -> io::Result<Vec<ThermalZone>> {
    let mut zones = Vec::new();

    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let id = entry.file_name().to_string_lossy().to_string();
        if !id.starts_with("thermal_zone") {
            continue;
        }

        let zone_dir = entry.path();
        let input_path = zone_dir.join("temp");
        if !input_path.exists() {
            continue;
        }

        zones.push(ThermalZone {
            id,
            kind: read_trimmed(&zone_dir.join("type")),
            input_path,
        });
    }

    zones.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(zones)
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Read the current temperature of a zone in degrees Celsius.
pub fn read_zone_temp(zone: &ThermalZone) -> io::Result<f64> {
    read_temp_c(&zone.input_path)
}

/// Read a millidegree sysfs file and convert to degrees Celsius.
pub fn read_temp_c(path: &Path) -> io::Result<f64> {
    let raw = fs::read_to_string(path)?;
    parse_millidegrees(&raw).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Unparseable temperature in {}: {:?}", path.display(), raw.trim()),
        )
    })
}

/// Parse a millidegree reading such as `"45000\n"` into degrees Celsius.
pub fn parse_millidegrees(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .map(|millic| millic as f64 / 1000.0)
}

// ---------------------------------------------------------------------------
// IPMI
// ---------------------------------------------------------------------------

/// Read the current temperature from the configured source.
///
/// The IPMI source falls back to the thermal zone when any sensor fails.
pub fn read_temperature(settings: &SensorSettings) -> io::Result<f64> {
    match settings.source {
        TemperatureSource::Thermal => read_temp_c(settings.thermal_zone),
        TemperatureSource::Ipmi => {
            read_ipmi_average(settings.ipmitool, settings.ipmi_sensors).or_else(|e| {
                let zone = settings.thermal_zone.display();
                log::debug!("IPMI read failed ({e}), using {zone}");
                read_temp_c(settings.thermal_zone)
            })
        }
    }
}

/// Average of several IPMI sensors. Fails if any one of them fails.
pub fn read_ipmi_average(ipmitool: &str, sensors: &[String]) -> io::Result<f64> {
    if sensors.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "No IPMI sensors configured",
        ));
    }
    let mut total = 0.0;
    for name in sensors {
        total += read_ipmi_sensor(ipmitool, name)?;
    }
    Ok(total / sensors.len() as f64)
}

/// Run `ipmitool sensor get <name>` and parse its reading.
pub fn read_ipmi_sensor(ipmitool: &str, name: &str) -> io::Result<f64> {
    let output = Command::new(ipmitool).args(["sensor", "get", name]).output()?;
    if !output.status.success() {
        return Err(io::Error::other(format!(
            "{ipmitool} exited with {} for sensor '{name}'",
            output.status
        )));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_ipmi_reading(&stdout).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("No reading for IPMI sensor '{name}'"),
        )
    })
}

/// Extract the value of the `Sensor Reading` line from `ipmitool sensor get`
/// output, e.g. `" Sensor Reading : 45 (+/- 0) degrees C"` gives 45.
pub fn parse_ipmi_reading(output: &str) -> Option<f64> {
    output
        .lines()
        .filter(|line| line.contains("Sensor Reading"))
        .filter_map(|line| line.split_once(':'))
        .find_map(|(_, value)| value.split_whitespace().next()?.parse::<f64>().ok())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_root(name: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "fancurve-thermal-{}-{name}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();
        root
    }

    fn write_zone(root: &Path, id: &str, kind: &str, temp: &str) {
        let dir = root.join(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("type"), format!("{kind}\n")).unwrap();
        fs::write(dir.join("temp"), temp).unwrap();
    }

    #[test]
    fn test_parse_millidegrees() {
        assert_eq!(parse_millidegrees("45000\n"), Some(45.0));
        assert_eq!(parse_millidegrees("  -2500 "), Some(-2.5));
        assert_eq!(parse_millidegrees("hot"), None);
        assert_eq!(parse_millidegrees(""), None);
    }

    #[test]
    fn test_discover_and_read() {
        let root = scratch_root("discover");
        write_zone(&root, "thermal_zone1", "acpitz", "38500\n");
        write_zone(&root, "thermal_zone0", "x86_pkg_temp", "52000\n");
        fs::create_dir_all(root.join("cooling_device0")).unwrap();

        let zones = discover_zones_in(&root).unwrap();
        let ids: Vec<&str> = zones.iter().map(|z| z.id.as_str()).collect();
        assert_eq!(ids, ["thermal_zone0", "thermal_zone1"]);
        assert_eq!(zones[0].kind.as_deref(), Some("x86_pkg_temp"));
        assert_eq!(read_zone_temp(&zones[0]).unwrap(), 52.0);
        assert_eq!(read_zone_temp(&zones[1]).unwrap(), 38.5);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_read_garbage_is_invalid_data() {
        let root = scratch_root("garbage");
        let path = root.join("temp");
        fs::write(&path, "n/a\n").unwrap();
        assert_eq!(
            read_temp_c(&path).unwrap_err().kind(),
            io::ErrorKind::InvalidData
        );
        assert!(read_temp_c(&root.join("missing")).is_err());

        let _ = fs::remove_dir_all(&root);
    }

    const IPMI_CPU1: &str = "\
Locating sensor record...
Sensor ID              : CPU1 Temp (0x1)
 Entity ID             : 3.1
 Sensor Type (Threshold)  : Temperature
 Sensor Reading        : 45 (+/- 0) degrees C
 Status                : ok
 Lower Non-Recoverable : 0.000
 Upper Critical        : 90.000
";

    #[test]
    fn test_parse_ipmi_reading() {
        assert_eq!(parse_ipmi_reading(IPMI_CPU1), Some(45.0));
        assert_eq!(
            parse_ipmi_reading(" Sensor Reading        : 38.500 (+/- 0.500) degrees C\n"),
            Some(38.5)
        );
    }

    #[test]
    fn test_parse_ipmi_without_reading() {
        let absent = "Sensor ID : CPU2 Temp (0x2)\n Sensor Reading : No Reading\n";
        assert_eq!(parse_ipmi_reading(absent), None);
        assert_eq!(parse_ipmi_reading("Locating sensor record...\n"), None);
        assert_eq!(parse_ipmi_reading(""), None);
    }

    #[test]
    fn test_ipmi_falls_back_to_thermal_zone() {
        let root = scratch_root("ipmi-fallback");
        let zone = root.join("temp");
        fs::write(&zone, "41000\n").unwrap();
        let sensors = vec!["CPU1 Temp".to_string(), "CPU2 Temp".to_string()];
        let missing_tool = root.join("no-such-ipmitool").display().to_string();

        let settings = SensorSettings {
            source: TemperatureSource::Ipmi,
            thermal_zone: &zone,
            ipmitool: &missing_tool,
            ipmi_sensors: &sensors,
        };
        assert!(read_ipmi_average(&missing_tool, &sensors).is_err());
        assert_eq!(read_temperature(&settings).unwrap(), 41.0);

        let thermal_only = SensorSettings {
            source: TemperatureSource::Thermal,
            ..settings
        };
        assert_eq!(read_temperature(&thermal_only).unwrap(), 41.0);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_ipmi_without_sensors_is_an_error() {
        assert_eq!(
            read_ipmi_average("ipmitool", &[]).unwrap_err().kind(),
            io::ErrorKind::InvalidInput
        );
    }
}
