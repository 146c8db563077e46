// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Fan curve definitions and evaluation.
//!
//! A curve is an unordered set of (temperature, fan speed) control points
//! plus an [`InterpolationMode`]. Evaluation sorts a private copy of the
//! points and either interpolates linearly between neighbours
//! ([`InterpolationMode::Gradual`]) or holds the last point at or below the
//! query ([`InterpolationMode::HardCut`]).
//!
//! Neither mode clamps its output. Values outside 0-100 pass straight
//! through; bounding them is up to the caller.

use crate::error::CurveError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound on the number of samples produced by [`sample_curve`].
pub const MAX_SAMPLES: usize = 100_000;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single point on a fan curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ControlPoint {
    /// Temperature in degrees Celsius
    pub temperature: f64,
    /// Fan speed, percent or RPM depending on the owning curve's label
    pub fan_speed: f64,
}

impl ControlPoint {
    pub fn new(temperature: f64, fan_speed: f64) -> Self {
        Self {
            temperature,
            fan_speed,
        }
    }
}

/// How values between control points are derived.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMode {
    /// Piecewise-linear between neighbouring points.
    #[default]
    Gradual,
    /// Step function holding the last point at or below the query.
    HardCut,
}

impl InterpolationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            InterpolationMode::Gradual => "gradual",
            InterpolationMode::HardCut => "hardcut",
        }
    }

    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            InterpolationMode::Gradual => InterpolationMode::HardCut,
            InterpolationMode::HardCut => InterpolationMode::Gradual,
        }
    }
}

impl fmt::Display for InterpolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterpolationMode {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gradual" => Ok(InterpolationMode::Gradual),
            "hardcut" => Ok(InterpolationMode::HardCut),
            other => Err(CurveError::InvalidMode(other.to_string())),
        }
    }
}

/// A set of control points and the mode used to evaluate them.
///
/// Points are kept in the order they were given. Nothing here requires
/// them to be sorted or to have distinct temperatures.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurveSpec {
    pub points: Vec<ControlPoint>,
    #[serde(default)]
    pub interpolation_mode: InterpolationMode,
}

/// One sample of an evaluated curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CurveDataPoint {
    pub x: f64,
    pub y: f64,
}

/// Inclusive temperature range and step for [`sample_curve`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SampleRange {
    #[serde(default = "default_from")]
    pub from: f64,
    #[serde(default = "default_to")]
    pub to: f64,
    #[serde(default = "default_step")]
    pub step: f64,
}

impl Default for SampleRange {
    fn default() -> Self {
        Self {
            from: default_from(),
            to: default_to(),
            step: default_step(),
        }
    }
}

impl SampleRange {
    /// Number of samples this range yields, or 0 if the range is unusable.
    pub fn len(&self) -> usize {
        if !self.from.is_finite() || !self.to.is_finite() || !self.step.is_finite() {
            return 0;
        }
        if self.step <= 0.0 || self.to < self.from {
            return 0;
        }
        let steps = ((self.to - self.from) / self.step).floor();
        if steps >= MAX_SAMPLES as f64 {
            return MAX_SAMPLES;
        }
        steps as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Map a temperature to a fan speed.
///
/// - No points: 0
/// - One point: that point's fan speed, whatever the temperature
/// - Otherwise see [`InterpolationMode`]
///
/// Never panics and never divides by zero. A NaN temperature against two or
/// more points yields NaN.
pub fn evaluate(points: &[ControlPoint], mode: InterpolationMode, temperature: f64) -> f64 {
    evaluate_sorted(&sorted(points), mode, temperature)
}

/// Evaluate at each temperature of `range`, in ascending order.
pub fn sample_curve(
    points: &[ControlPoint],
    mode: InterpolationMode,
    range: SampleRange,
) -> Vec<CurveDataPoint> {
    let sorted = sorted(points);
    (0..range.len())
        .map(|i| {
            let x = range.from + i as f64 * range.step;
            CurveDataPoint {
                x,
                y: evaluate_sorted(&sorted, mode, x),
            }
        })
        .collect()
}

/// Stable sort by temperature on a copy. Equal temperatures keep their
/// input order.
fn sorted(points: &[ControlPoint]) -> Vec<ControlPoint> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.temperature.total_cmp(&b.temperature));
    sorted
}

fn evaluate_sorted(points: &[ControlPoint], mode: InterpolationMode, temperature: f64) -> f64 {
    match points {
        [] => 0.0,
        [only] => only.fan_speed,
        _ if temperature.is_nan() => f64::NAN,
        _ => match mode {
            InterpolationMode::Gradual => gradual(points, temperature),
            InterpolationMode::HardCut => hard_cut(points, temperature),
        },
    }
}

fn gradual(points: &[ControlPoint], temp: f64) -> f64 {
    let first = &points[0];
    let last = &points[points.len() - 1];
    if temp <= first.temperature {
        return first.fan_speed;
    }
    if temp >= last.temperature {
        return last.fan_speed;
    }

    // First pair containing the query wins
    for window in points.windows(2) {
        let lo = &window[0];
        let hi = &window[1];

        if temp >= lo.temperature && temp <= hi.temperature {
            let range_t = hi.temperature - lo.temperature;
            if range_t == 0.0 || temp == lo.temperature {
                return lo.fan_speed;
            }
            if temp == hi.temperature {
                return hi.fan_speed;
            }
            let frac = (temp - lo.temperature) / range_t;
            return lo.fan_speed + frac * (hi.fan_speed - lo.fan_speed);
        }
    }

    // Only reachable when a NaN temperature sits among the points
    f64::NAN
}

fn hard_cut(points: &[ControlPoint], temp: f64) -> f64 {
    let first = &points[0];
    if temp < first.temperature {
        return first.fan_speed;
    }

    points
        .iter()
        .rev()
        .find(|p| p.temperature <= temp)
        .map_or(first.fan_speed, |p| p.fan_speed)
}

// ---------------------------------------------------------------------------
// CurveSpec
// ---------------------------------------------------------------------------

impl CurveSpec {
    pub fn new(points: Vec<ControlPoint>, interpolation_mode: InterpolationMode) -> Self {
        Self {
            points,
            interpolation_mode,
        }
    }

    pub fn evaluate(&self, temperature: f64) -> f64 {
        evaluate(&self.points, self.interpolation_mode, temperature)
    }

    pub fn sample(&self, range: SampleRange) -> Vec<CurveDataPoint> {
        sample_curve(&self.points, self.interpolation_mode, range)
    }

    /// The control points ordered by temperature, leaving `self` untouched.
    pub fn sorted_points(&self) -> Vec<ControlPoint> {
        sorted(&self.points)
    }

    /// Reject points carrying NaN or infinite values.
    pub fn validate(&self) -> Result<(), CurveError> {
        for (index, p) in self.points.iter().enumerate() {
            if !p.temperature.is_finite() {
                return Err(CurveError::InvalidNumeric {
                    index,
                    field: "temperature",
                    value: p.temperature,
                });
            }
            if !p.fan_speed.is_finite() {
                return Err(CurveError::InvalidNumeric {
                    index,
                    field: "fanSpeed",
                    value: p.fan_speed,
                });
            }
        }
        Ok(())
    }
}

/// The curve served when nothing has been configured yet.
pub fn default_spec() -> CurveSpec {
    CurveSpec::new(
        vec![
            ControlPoint::new(30.0, 25.0),
            ControlPoint::new(60.0, 50.0),
            ControlPoint::new(80.0, 100.0),
        ],
        InterpolationMode::Gradual,
    )
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn default_from() -> f64 {
    0.0
}

fn default_to() -> f64 {
    100.0
}

fn default_step() -> f64 {
    1.0
}
