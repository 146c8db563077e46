// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Fan curve editing and evaluation.
//!
//! [`curve`] maps temperatures to fan speeds. Everything else is plumbing
//! around it: [`session`] and [`store`] hold curves, [`config`] persists
//! them, [`protocol`] and [`service`] serve them to clients of the daemon.

pub mod config;
pub mod curve;
pub mod error;
pub mod protocol;
pub mod service;
pub mod session;
pub mod store;
pub mod thermal;

pub use curve::{ControlPoint, CurveSpec, InterpolationMode, SampleRange, evaluate, sample_curve};
pub use error::CurveError;
