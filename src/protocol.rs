// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Client-daemon protocol over Unix domain sockets.
//!
//! Messages are newline-delimited JSON. The client sends a [`Request`]
//! and the daemon replies with a [`Response`]. Both are tagged by a
//! `"type"` field. Apart from the tag, `config` carries
//! `{points, interpolationMode}` and `curve_data` carries
//! `{curveData, controlPoints}`.

use crate::curve::{ControlPoint, CurveDataPoint, CurveSpec, InterpolationMode, SampleRange};
use crate::store::NamedCurve;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Requests (TUI -> Daemon)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Fetch the active curve.
    #[serde(rename = "get_config")]
    GetConfig,

    /// Replace the active curve without sampling it.
    #[serde(rename = "set_config")]
    SetConfig(CurveSpec),

    /// Replace the active curve and return it sampled for plotting.
    #[serde(rename = "generate_curve")]
    GenerateCurve(CurveSpec),

    /// Evaluate the active curve at a given temperature.
    #[serde(rename = "evaluate")]
    Evaluate { temperature: f64 },

    /// Evaluate the active curve at the current system temperature.
    #[serde(rename = "get_fan_speed")]
    GetFanSpeed,

    /// Last reading taken by the daemon's poll loop.
    #[serde(rename = "get_status")]
    GetStatus,

    /// List all named curves.
    #[serde(rename = "list_curves")]
    ListCurves,

    /// Fetch one named curve.
    #[serde(rename = "get_curve")]
    GetCurve { id: String },

    /// Create or replace a named curve.
    #[serde(rename = "upsert_curve")]
    UpsertCurve { curve: NamedCurve },

    /// Delete a named curve by id.
    #[serde(rename = "delete_curve")]
    DeleteCurve { id: String },

    /// Save current configuration to disk.
    #[serde(rename = "save_config")]
    SaveConfig,

    /// Reload configuration from disk.
    #[serde(rename = "reload_config")]
    ReloadConfig,
}

// ---------------------------------------------------------------------------
// Responses (Daemon -> TUI)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// The active curve.
    #[serde(rename = "config")]
    Config(CurveSpec),

    /// A sampled curve and the control points it was built from.
    #[serde(rename = "curve_data")]
    CurveData(GenerateCurveResponse),

    /// A single evaluation.
    #[serde(rename = "fan_speed")]
    FanSpeed(FanSpeedReading),

    /// Daemon status.
    #[serde(rename = "status")]
    Status(StatusInfo),

    /// List of named curves.
    #[serde(rename = "curves")]
    Curves { curves: Vec<NamedCurve> },

    /// One named curve.
    #[serde(rename = "named_curve")]
    NamedCurve { curve: NamedCurve },

    /// Operation succeeded.
    #[serde(rename = "ok")]
    Ok { message: String },

    /// Operation failed.
    #[serde(rename = "error")]
    Error { message: String },
}

/// Body of a `curve_data` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCurveResponse {
    pub curve_data: Vec<CurveDataPoint>,
    /// The request's points, in the order they were sent.
    pub control_points: Vec<ControlPoint>,
}

/// A temperature and the fan speed the active curve gives for it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FanSpeedReading {
    pub temperature: f64,
    pub fan_speed: f64,
}

/// Summary of daemon state sent in `status` messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusInfo {
    pub interpolation_mode: InterpolationMode,
    pub point_count: usize,
    pub curve_count: usize,
    /// Most recent poll result, if a temperature could be read.
    pub last_reading: Option<FanSpeedReading>,
    pub thermal_zone: String,
    /// Range clients should use when sampling curves for display.
    pub sample: SampleRange,
}

// ---------------------------------------------------------------------------
// Serialization helpers
// ---------------------------------------------------------------------------

/// Encode a message as a newline-delimited JSON string.
pub fn encode<T: Serialize>(msg: &T) -> Result<String, serde_json::Error> {
    let mut s = serde_json::to_string(msg)?;
    s.push('\n');
    Ok(s)
}

/// Decode a message from a JSON string (newline-trimmed).
pub fn decode<'a, T: Deserialize<'a>>(s: &'a str) -> Result<T, serde_json::Error> {
    serde_json::from_str(s.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::default_spec;
    use serde_json::json;

    #[test]
    fn test_generate_request_shape() {
        let req: Request = decode(
            r#"{"type":"generate_curve","points":[{"temperature":20,"fanSpeed":20}],"interpolationMode":"hardcut"}"#,
        )
        .unwrap();
        assert_eq!(
            req,
            Request::GenerateCurve(CurveSpec::new(
                vec![ControlPoint::new(20.0, 20.0)],
                InterpolationMode::HardCut
            ))
        );
    }

    #[test]
    fn test_config_response_shape() {
        let encoded = encode(&Response::Config(default_spec())).unwrap();
        assert!(encoded.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "config",
                "points": [
                    { "temperature": 30.0, "fanSpeed": 25.0 },
                    { "temperature": 60.0, "fanSpeed": 50.0 },
                    { "temperature": 80.0, "fanSpeed": 100.0 }
                ],
                "interpolationMode": "gradual"
            })
        );
    }

    #[test]
    fn test_curve_data_response_shape() {
        let resp = Response::CurveData(GenerateCurveResponse {
            curve_data: vec![CurveDataPoint { x: 0.0, y: 25.0 }],
            control_points: vec![ControlPoint::new(30.0, 25.0)],
        });
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["type"], "curve_data");
        assert_eq!(value["curveData"], json!([{ "x": 0.0, "y": 25.0 }]));
        assert_eq!(
            value["controlPoints"],
            json!([{ "temperature": 30.0, "fanSpeed": 25.0 }])
        );
    }

    #[test]
    fn test_fan_speed_response_shape() {
        let value = serde_json::to_value(Response::FanSpeed(FanSpeedReading {
            temperature: 50.0,
            fan_speed: 60.0,
        }))
        .unwrap();
        assert_eq!(
            value,
            json!({ "type": "fan_speed", "temperature": 50.0, "fanSpeed": 60.0 })
        );
    }

    #[test]
    fn test_status_response_shape() {
        let value = serde_json::to_value(Response::Status(StatusInfo {
            interpolation_mode: InterpolationMode::HardCut,
            point_count: 3,
            curve_count: 0,
            last_reading: None,
            thermal_zone: "/sys/class/thermal/thermal_zone0/temp".to_string(),
            sample: SampleRange::default(),
        }))
        .unwrap();
        assert_eq!(value["type"], "status");
        assert_eq!(value["interpolationMode"], "hardcut");
        assert_eq!(value["lastReading"], serde_json::Value::Null);
        assert_eq!(
            value["sample"],
            json!({ "from": 0.0, "to": 100.0, "step": 1.0 })
        );
    }

    #[test]
    fn test_unit_and_struct_requests() {
        assert_eq!(
            decode::<Request>("{\"type\":\"get_config\"}\n").unwrap(),
            Request::GetConfig
        );
        assert_eq!(
            decode::<Request>(r#"{"type":"delete_curve","id":"quiet"}"#).unwrap(),
            Request::DeleteCurve {
                id: "quiet".to_string()
            }
        );
        assert!(decode::<Request>(r#"{"type":"spin_up"}"#).is_err());
    }

    #[test]
    fn test_response_round_trip() {
        let resp = Response::Curves {
            curves: vec![NamedCurve::new("quiet", "Quiet", default_spec())],
        };
        let back: Response = decode(&encode(&resp).unwrap()).unwrap();
        assert_eq!(back, resp);
    }
}
