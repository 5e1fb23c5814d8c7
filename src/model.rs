//! # Dynamics model façade
//!
//! [`DynamicsModel`] wires the pipeline stages together for one estimation
//! run:
//!
//! ```text
//! raw flight data
//!   → actuator normalization
//!   → body airspeed / flow angle derivation
//!   → per-rotor feature matrices, aggregated by rotor group
//!   → aerodynamic extension models
//!   → regression system (X, y, coefficient names)
//!   → external optimizer → named coefficient set
//! ```
//!
//! Each stage consumes the table of the previous one and returns an
//! extended table, so the order dependency between stages is explicit. The
//! model holds the validated configuration and the assembled feature blocks
//! (the latter so Fisher-information scoring can reuse them); it owns no
//! dataframe state beyond that.
//!
//! ## Example
//! -----------------
//! ```rust,no_run
//! use dynafit::config::ModelConfig;
//! use dynafit::flight_data::FlightData;
//! use dynafit::model::DynamicsModel;
//! use dynafit::rotor_models::RotorConfig;
//!
//! # fn run(data: FlightData) -> Result<(), dynafit::dynafit_errors::DynafitError> {
//! let config = ModelConfig::builder()
//!     .rotor_group("main", vec![RotorConfig::plain("u0")])
//!     .estimate_forces(true)
//!     .build()?;
//!
//! let mut model = DynamicsModel::new(config)?;
//! let (system, _data) = model.prepare_regression_matrices(data)?;
//! assert_eq!(system.coefficient_names.len(), system.x.ncols());
//! # Ok(()) }
//! ```

use nalgebra::DMatrix;

use crate::actuators::{normalize_actuators, NormalizationRange};
use crate::config::ModelConfig;
use crate::constants::{AIRSPEED_COLS, ANGULAR_VELOCITY_COLS};
use crate::dynafit_errors::DynafitError;
use crate::features::aero::AeroModel;
use crate::features::fisher::append_fisher_information;
use crate::features::rotor_group::compute_rotor_features;
use crate::features::FeatureBlock;
use crate::flight_data::FlightData;
use crate::frames::append_airspeed_columns;
use crate::regression::{
    assemble_regression_system, ModelResult, Optimizer, RegressionSystem,
};

/// One estimation run over one flight log.
pub struct DynamicsModel {
    config: ModelConfig,
    aero_models: Vec<Box<dyn AeroModel>>,
    /// Assembled feature blocks of the last `prepare_regression_matrices`
    /// call, kept for Fisher-information scoring.
    forces: Option<FeatureBlock>,
    moments: Option<FeatureBlock>,
    n_samples: usize,
}

impl DynamicsModel {
    /// Create a model from a validated configuration.
    pub fn new(config: ModelConfig) -> Result<Self, DynafitError> {
        config.validate()?;
        Ok(DynamicsModel {
            config,
            aero_models: Vec::new(),
            forces: None,
            moments: None,
            n_samples: 0,
        })
    }

    /// Register an aerodynamic extension model; its feature columns are
    /// appended after the rotor blocks in registration order.
    pub fn with_aero_model(mut self, model: Box<dyn AeroModel>) -> Self {
        self.aero_models.push(model);
        self
    }

    /// Run the feature pipeline and assemble the regression system.
    ///
    /// Normalization and airspeed derivation are skipped when the body
    /// airspeed columns are already present (a table prepared by an earlier
    /// pass or by a data-selection front end).
    ///
    /// Arguments
    /// -----------------
    /// * `data`: the loaded, resampled flight-log table.
    ///
    /// Return
    /// ----------
    /// * The assembled [`RegressionSystem`] and the extended table, or the
    ///   first fatal configuration/data error.
    pub fn prepare_regression_matrices(
        &mut self,
        data: FlightData,
    ) -> Result<(RegressionSystem, FlightData), DynafitError> {
        let data = if data.contains(AIRSPEED_COLS[0]) {
            data
        } else {
            let range = if self.config.control_outputs_used {
                NormalizationRange::control_outputs()
            } else {
                NormalizationRange::pwm()
            };
            let data = normalize_actuators(data, &self.config.channel_pairs(), &range)?;
            append_airspeed_columns(data)?
        };
        self.n_samples = data.n_samples();

        let v_airspeed = data.matrix(&AIRSPEED_COLS)?;
        let angular_vel = self.angular_velocity_matrix(&data)?;

        let rotor_features = compute_rotor_features(
            &data,
            &self.config.rotor_groups,
            &v_airspeed,
            angular_vel.as_ref(),
            self.config.estimate_forces,
            self.config.estimate_moments,
        )?;

        let mut force_blocks = rotor_features.forces.into_iter().collect::<Vec<_>>();
        let mut moment_blocks = rotor_features.moments.into_iter().collect::<Vec<_>>();
        for aero in &self.aero_models {
            if self.config.estimate_forces {
                if let Some(block) = aero.force_features(&data)? {
                    force_blocks.push(block);
                }
            }
            if self.config.estimate_moments {
                if let Some(block) = aero.moment_features(&data)? {
                    moment_blocks.push(block);
                }
            }
        }

        self.forces = if force_blocks.is_empty() {
            None
        } else {
            Some(FeatureBlock::hstack(&force_blocks)?)
        };
        self.moments = if moment_blocks.is_empty() {
            None
        } else {
            Some(FeatureBlock::hstack(&moment_blocks)?)
        };

        let system =
            assemble_regression_system(&data, self.forces.as_ref(), self.moments.as_ref())?;
        Ok((system, data))
    }

    /// Append per-sample informativeness columns for the blocks assembled
    /// by the last [`prepare_regression_matrices`](Self::prepare_regression_matrices) call.
    pub fn compute_fisher_information(
        &self,
        data: FlightData,
    ) -> Result<FlightData, DynafitError> {
        append_fisher_information(data, self.forces.as_ref(), self.moments.as_ref())
    }

    /// Hand the assembled system to the external optimizer and package the
    /// estimated coefficients under their column names.
    ///
    /// Return
    /// ----------
    /// * The named [`ModelResult`], or the optimizer's error, or a
    ///   [`DynafitError::CoefficientNameMismatch`] if the optimizer returned
    ///   a coefficient vector of the wrong length.
    pub fn estimate(
        &self,
        system: &RegressionSystem,
        optimizer: &mut dyn Optimizer,
    ) -> Result<ModelResult, DynafitError> {
        let values = optimizer.estimate(&system.x, &system.y)?;
        ModelResult::package(
            &system.coefficient_names,
            &values,
            optimizer.metrics(),
            self.n_samples,
        )
    }

    /// The run configuration this model was built from.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn angular_velocity_matrix(
        &self,
        data: &FlightData,
    ) -> Result<Option<DMatrix<f64>>, DynafitError> {
        if ANGULAR_VELOCITY_COLS.iter().all(|c| data.contains(c)) {
            Ok(Some(data.matrix(&ANGULAR_VELOCITY_COLS)?))
        } else {
            Ok(None)
        }
    }
}
