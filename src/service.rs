// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Request handling over the daemon's state.
//!
//! [`ServiceState`] owns the active curve, the named curve store, and the
//! last temperature reading. The daemon keeps it behind a single mutex, so
//! each call to [`ServiceState::handle`] is applied as one atomic step.

use crate::config::{self, Config};
use crate::curve::CurveSpec;
use crate::protocol::{FanSpeedReading, GenerateCurveResponse, Request, Response, StatusInfo};
use crate::store::CurveStore;
use crate::thermal::{self, SensorSettings};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub struct ServiceState {
    /// Settings and active curve. `config.curves` is kept empty; named
    /// curves live in `store`.
    config: Config,
    store: CurveStore,
    config_path: PathBuf,
    last_reading: Option<FanSpeedReading>,
}

impl ServiceState {
    pub fn new(mut config: Config, config_path: PathBuf) -> Self {
        let store = CurveStore::from_curves(std::mem::take(&mut config.curves));
        Self {
            config,
            store,
            config_path,
            last_reading: None,
        }
    }

    pub fn active(&self) -> &CurveSpec {
        &self.config.session
    }

    pub fn store(&self) -> &CurveStore {
        &self.store
    }

    pub fn last_reading(&self) -> Option<FanSpeedReading> {
        self.last_reading
    }

    /// Time between temperature polls. Never zero.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.daemon.poll_interval_ms.max(1))
    }

    /// The full config as it would be written to disk.
    pub fn snapshot_config(&self) -> Config {
        Config {
            curves: self.store.to_vec(),
            ..self.config.clone()
        }
    }

    /// Read the configured temperature source and evaluate the active curve.
    pub fn read_fan_speed(&self) -> io::Result<FanSpeedReading> {
        let daemon = &self.config.daemon;
        let temperature = thermal::read_temperature(&SensorSettings {
            source: daemon.temperature_source,
            thermal_zone: Path::new(&daemon.thermal_zone),
            ipmitool: &daemon.ipmitool,
            ipmi_sensors: &daemon.ipmi_sensors,
        })?;
        Ok(FanSpeedReading {
            temperature,
            fan_speed: self.config.session.evaluate(temperature),
        })
    }

    /// Take a reading and remember it for `get_status`.
    pub fn poll(&mut self) -> io::Result<FanSpeedReading> {
        let reading = self.read_fan_speed()?;
        log::debug!(
            "{:.1}°C -> fan speed {:.1}",
            reading.temperature,
            reading.fan_speed
        );
        self.last_reading = Some(reading);
        Ok(reading)
    }

    /// Replace config from disk, keeping the current config path.
    pub fn reload(&mut self) -> io::Result<()> {
        let cfg = config::load_config(&self.config_path)?;
        *self = Self {
            last_reading: self.last_reading,
            ..Self::new(cfg, self.config_path.clone())
        };
        Ok(())
    }

    pub fn save(&self) -> io::Result<()> {
        config::save_config(&self.config_path, &self.snapshot_config())
    }

    pub fn handle(&mut self, req: Request) -> Response {
        match req {
            Request::GetConfig => Response::Config(self.config.session.clone()),

            Request::SetConfig(spec) => match self.set_active(spec) {
                Ok(()) => Response::Ok {
                    message: "Curve updated".to_string(),
                },
                Err(message) => Response::Error { message },
            },

            Request::GenerateCurve(spec) => {
                if let Err(message) = self.set_active(spec) {
                    return Response::Error { message };
                }
                let response = GenerateCurveResponse {
                    curve_data: self.config.session.sample(self.config.sample),
                    control_points: self.config.session.points.clone(),
                };
                self.write_curve_output(&response);
                Response::CurveData(response)
            }

            Request::Evaluate { temperature } => Response::FanSpeed(FanSpeedReading {
                temperature,
                fan_speed: self.config.session.evaluate(temperature),
            }),

            Request::GetFanSpeed => match self.read_fan_speed() {
                Ok(reading) => Response::FanSpeed(reading),
                Err(e) => Response::Error {
                    message: format!(
                        "Failed to read temperature from {}: {e}",
                        self.config.daemon.thermal_zone
                    ),
                },
            },

            Request::GetStatus => Response::Status(StatusInfo {
                interpolation_mode: self.config.session.interpolation_mode,
                point_count: self.config.session.points.len(),
                curve_count: self.store.len(),
                last_reading: self.last_reading,
                thermal_zone: self.config.daemon.thermal_zone.clone(),
                sample: self.config.sample,
            }),

            Request::ListCurves => Response::Curves {
                curves: self.store.to_vec(),
            },

            Request::GetCurve { id } => match self.store.get(&id) {
                Ok(curve) => Response::NamedCurve {
                    curve: curve.clone(),
                },
                Err(e) => Response::Error {
                    message: e.to_string(),
                },
            },

            Request::UpsertCurve { curve } => {
                let id = curve.id.clone();
                match self.store.upsert(curve) {
                    Ok(previous) => {
                        self.autosave();
                        let verb = if previous.is_some() { "updated" } else { "saved" };
                        Response::Ok {
                            message: format!("Curve '{id}' {verb}"),
                        }
                    }
                    Err(e) => Response::Error {
                        message: e.to_string(),
                    },
                }
            }

            Request::DeleteCurve { id } => match self.store.delete(&id) {
                Ok(_) => {
                    self.autosave();
                    Response::Ok {
                        message: format!("Deleted curve '{id}'"),
                    }
                }
                Err(e) => Response::Error {
                    message: e.to_string(),
                },
            },

            Request::SaveConfig => match self.save() {
                Ok(()) => Response::Ok {
                    message: format!("Config saved to {}", self.config_path.display()),
                },
                Err(e) => Response::Error {
                    message: format!("Failed to save config: {e}"),
                },
            },

            Request::ReloadConfig => match self.reload() {
                Ok(()) => Response::Ok {
                    message: "Config reloaded".to_string(),
                },
                Err(e) => Response::Error {
                    message: format!("Failed to reload config: {e}"),
                },
            },
        }
    }

    fn set_active(&mut self, spec: CurveSpec) -> Result<(), String> {
        spec.validate().map_err(|e| e.to_string())?;
        self.config.session = spec;
        self.autosave();
        Ok(())
    }

    fn autosave(&self) {
        if !self.config.daemon.autosave {
            return;
        }
        if let Err(e) = self.save() {
            log::error!("Failed to autosave config: {e}");
        }
    }

    fn write_curve_output(&self, response: &GenerateCurveResponse) {
        let Some(path) = &self.config.daemon.curve_output_path else {
            return;
        };
        let result = serde_json::to_string_pretty(response)
            .map_err(io::Error::other)
            .and_then(|json| fs::write(path, json));
        if let Err(e) = result {
            log::error!("Could not write curve file {path}: {e}");
        }
    }
}
