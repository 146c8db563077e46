// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Named curve storage.
//!
//! Curves are keyed by a caller-chosen id. Updates replace the whole entry.
//! Deleting or fetching an id that is not present is an error.

use crate::curve::CurveSpec;
use crate::error::CurveError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// What the fan speed values of a curve are measured in.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FanControlMode {
    #[default]
    Percentage,
    Rpm,
}

impl FanControlMode {
    /// Unit suffix for display.
    pub fn unit(self) -> &'static str {
        match self {
            FanControlMode::Percentage => "%",
            FanControlMode::Rpm => " RPM",
        }
    }
}

impl fmt::Display for FanControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FanControlMode::Percentage => f.write_str("percentage"),
            FanControlMode::Rpm => f.write_str("rpm"),
        }
    }
}

impl FromStr for FanControlMode {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percentage" | "percent" | "%" => Ok(FanControlMode::Percentage),
            "rpm" => Ok(FanControlMode::Rpm),
            other => Err(CurveError::InvalidMode(other.to_string())),
        }
    }
}

/// A curve with an identity and a display name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedCurve {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mode: FanControlMode,
    pub curve: CurveSpec,
}

impl NamedCurve {
    pub fn new(id: impl Into<String>, name: impl Into<String>, curve: CurveSpec) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mode: FanControlMode::default(),
            curve,
        }
    }

    pub fn with_mode(mut self, mode: FanControlMode) -> Self {
        self.mode = mode;
        self
    }
}

/// In-memory map of named curves.
#[derive(Debug, Clone, Default)]
pub struct CurveStore {
    curves: HashMap<String, NamedCurve>,
}

impl CurveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a list. Later entries replace earlier ones with the
    /// same id.
    pub fn from_curves(curves: impl IntoIterator<Item = NamedCurve>) -> Self {
        let curves = curves.into_iter().map(|c| (c.id.clone(), c)).collect();
        Self { curves }
    }

    /// Insert or replace a curve, returning the previous entry for its id.
    ///
    /// The curve is validated first; an invalid curve leaves the store as it
    /// was.
    pub fn upsert(&mut self, curve: NamedCurve) -> Result<Option<NamedCurve>, CurveError> {
        curve.curve.validate()?;
        Ok(self.curves.insert(curve.id.clone(), curve))
    }

    pub fn get(&self, id: &str) -> Result<&NamedCurve, CurveError> {
        self.curves
            .get(id)
            .ok_or_else(|| CurveError::NotFound(format!("curve '{id}'")))
    }

    /// All curves, ordered by id.
    pub fn list(&self) -> Vec<&NamedCurve> {
        let mut curves: Vec<&NamedCurve> = self.curves.values().collect();
        curves.sort_by(|a, b| a.id.cmp(&b.id));
        curves
    }

    pub fn delete(&mut self, id: &str) -> Result<NamedCurve, CurveError> {
        self.curves
            .remove(id)
            .ok_or_else(|| CurveError::NotFound(format!("curve '{id}'")))
    }

    /// Evaluate a stored curve at `temperature`.
    pub fn evaluate(&self, id: &str, temperature: f64) -> Result<f64, CurveError> {
        Ok(self.get(id)?.curve.evaluate(temperature))
    }

    /// Owned copies in id order, for persisting.
    pub fn to_vec(&self) -> Vec<NamedCurve> {
        self.list().into_iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{ControlPoint, InterpolationMode, default_spec};

    fn quiet() -> NamedCurve {
        NamedCurve::new("quiet", "Quiet", default_spec())
    }

    #[test]
    fn test_upsert_then_get() {
        let mut store = CurveStore::new();
        assert_eq!(store.upsert(quiet()), Ok(None));
        assert_eq!(store.get("quiet").unwrap().name, "Quiet");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_upsert_replaces_whole_entry() {
        let mut store = CurveStore::new();
        store.upsert(quiet()).unwrap();

        let replacement = NamedCurve::new(
            "quiet",
            "Quieter",
            CurveSpec::new(vec![ControlPoint::new(50.0, 10.0)], InterpolationMode::HardCut),
        )
        .with_mode(FanControlMode::Rpm);
        let previous = store.upsert(replacement.clone()).unwrap();

        assert_eq!(previous, Some(quiet()));
        assert_eq!(store.get("quiet").unwrap(), &replacement);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_upsert_rejects_invalid_curve() {
        let mut store = CurveStore::new();
        store.upsert(quiet()).unwrap();
        let bad = NamedCurve::new(
            "quiet",
            "Broken",
            CurveSpec::new(vec![ControlPoint::new(f64::NAN, 10.0)], InterpolationMode::Gradual),
        );
        assert!(store.upsert(bad).is_err());
        assert_eq!(store.get("quiet").unwrap().name, "Quiet");
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = CurveStore::new();
        assert!(matches!(store.get("nope"), Err(CurveError::NotFound(_))));
    }

    #[test]
    fn test_delete() {
        let mut store = CurveStore::from_curves([quiet()]);
        assert_eq!(store.delete("quiet").unwrap().id, "quiet");
        assert!(store.is_empty());
        assert!(matches!(store.delete("quiet"), Err(CurveError::NotFound(_))));
    }

    #[test]
    fn test_delete_missing_leaves_others() {
        let mut store = CurveStore::from_curves([quiet()]);
        assert!(store.delete("loud").is_err());
        assert!(store.get("quiet").is_ok());
    }

    #[test]
    fn test_list_is_ordered_by_id() {
        let store = CurveStore::from_curves([
            NamedCurve::new("b", "B", default_spec()),
            NamedCurve::new("c", "C", default_spec()),
            NamedCurve::new("a", "A", default_spec()),
        ]);
        let ids: Vec<&str> = store.list().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_evaluate_by_id() {
        let store = CurveStore::from_curves([quiet()]);
        assert_eq!(store.evaluate("quiet", 45.0).unwrap(), 37.5);
        assert!(store.evaluate("missing", 45.0).is_err());
    }

    #[test]
    fn test_named_curve_json_shape() {
        let json = serde_json::to_value(quiet().with_mode(FanControlMode::Rpm)).unwrap();
        assert_eq!(json["mode"], "rpm");
        assert_eq!(json["curve"]["interpolationMode"], "gradual");
        assert_eq!(json["curve"]["points"][0]["fanSpeed"], 25.0);
    }

    #[test]
    fn test_control_mode_parse() {
        assert_eq!("RPM".parse::<FanControlMode>(), Ok(FanControlMode::Rpm));
        assert_eq!("percent".parse::<FanControlMode>(), Ok(FanControlMode::Percentage));
        assert!("volts".parse::<FanControlMode>().is_err());
    }
}
