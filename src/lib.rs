//! # dynafit
//!
//! Data-driven identification of flight-dynamics parameters from recorded
//! flight logs. The crate turns a tabular time series of sensor and
//! actuator data into a linear regression system `X·θ = y` whose solution —
//! computed by an external least-squares optimizer — is a named coefficient
//! set usable by a flight-dynamics simulator.
//!
//! The pipeline: actuator normalization and body-frame airspeed derivation,
//! per-rotor force/moment feature models (plain, bidirectional, tilting,
//! changing-axis), additive aggregation within named rotor groups,
//! horizontal concatenation across groups, pluggable aerodynamic feature
//! models, and block-diagonal composition of the force and moment systems.
//!
//! Log parsing, resampling, the optimizers themselves, plotting, and YAML
//! export are external collaborators; the core consumes a
//! [`FlightData`](crate::flight_data::FlightData) table and produces a
//! [`RegressionSystem`](crate::regression::RegressionSystem).

pub mod actuators;
pub mod config;
pub mod constants;
pub mod dynafit_errors;
pub mod features;
pub mod flight_data;
pub mod frames;
pub mod model;
pub mod regression;
pub mod rotor_models;

pub use config::ModelConfig;
pub use dynafit_errors::DynafitError;
pub use flight_data::FlightData;
pub use model::DynamicsModel;
pub use regression::{ModelResult, Optimizer, RegressionSystem};
pub use rotor_models::{RotorConfig, RotorKind, RotorModel};
