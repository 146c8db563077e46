// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Editable curve state owned by a UI.
//!
//! A [`CurveSession`] holds the points and mode a user is working on.
//! Evaluation is delegated to [`crate::curve`], which stays stateless.

use crate::curve::{self, ControlPoint, CurveDataPoint, CurveSpec, InterpolationMode, SampleRange};
use crate::error::CurveError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveSession {
    points: Vec<ControlPoint>,
    mode: InterpolationMode,
}

impl CurveSession {
    pub fn new(mode: InterpolationMode) -> Self {
        Self {
            points: Vec::new(),
            mode,
        }
    }

    pub fn from_spec(spec: CurveSpec) -> Self {
        Self {
            points: spec.points,
            mode: spec.interpolation_mode,
        }
    }

    /// Points in insertion order.
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    pub fn mode(&self) -> InterpolationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: InterpolationMode) {
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) -> InterpolationMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    /// Append a point, returning its index.
    pub fn add_point(&mut self, point: ControlPoint) -> usize {
        self.points.push(point);
        self.points.len() - 1
    }

    pub fn update_point(&mut self, index: usize, point: ControlPoint) -> Result<(), CurveError> {
        let slot = self
            .points
            .get_mut(index)
            .ok_or_else(|| CurveError::NotFound(format!("point {index}")))?;
        *slot = point;
        Ok(())
    }

    pub fn remove_point(&mut self, index: usize) -> Result<ControlPoint, CurveError> {
        if index >= self.points.len() {
            return Err(CurveError::NotFound(format!("point {index}")));
        }
        Ok(self.points.remove(index))
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn evaluate(&self, temperature: f64) -> f64 {
        curve::evaluate(&self.points, self.mode, temperature)
    }

    pub fn sample(&self, range: SampleRange) -> Vec<CurveDataPoint> {
        curve::sample_curve(&self.points, self.mode, range)
    }

    pub fn to_spec(&self) -> CurveSpec {
        CurveSpec::new(self.points.clone(), self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::default_spec;

    #[test]
    fn test_edit_cycle() {
        let mut session = CurveSession::new(InterpolationMode::Gradual);
        assert!(session.is_empty());
        assert_eq!(session.evaluate(50.0), 0.0);

        let i = session.add_point(ControlPoint::new(20.0, 20.0));
        session.add_point(ControlPoint::new(80.0, 100.0));
        assert_eq!(session.evaluate(50.0), 60.0);

        session.update_point(i, ControlPoint::new(50.0, 40.0)).unwrap();
        assert_eq!(session.evaluate(50.0), 40.0);

        assert_eq!(session.toggle_mode(), InterpolationMode::HardCut);
        assert_eq!(session.evaluate(79.0), 40.0);

        assert_eq!(session.remove_point(0).unwrap(), ControlPoint::new(50.0, 40.0));
        assert_eq!(session.evaluate(0.0), 100.0);
    }

    #[test]
    fn test_bad_index_is_not_found() {
        let mut session = CurveSession::from_spec(default_spec());
        assert!(matches!(
            session.update_point(9, ControlPoint::new(0.0, 0.0)),
            Err(CurveError::NotFound(_))
        ));
        assert!(session.remove_point(3).is_err());
        assert_eq!(session.len(), 3);
    }

    #[test]
    fn test_spec_round_trip_keeps_insertion_order() {
        let spec = CurveSpec::new(
            vec![ControlPoint::new(80.0, 90.0), ControlPoint::new(10.0, 5.0)],
            InterpolationMode::HardCut,
        );
        let session = CurveSession::from_spec(spec.clone());
        assert_eq!(session.points()[0].temperature, 80.0);
        assert_eq!(session.to_spec(), spec);
        assert_eq!(session.sample(SampleRange::default()).len(), 101);
    }
}
