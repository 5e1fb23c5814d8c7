//! # Regression system assembly
//!
//! Combines the rotor and aerodynamic feature blocks into the final design
//! matrix `X` and target vector `y` handed to the external optimizer, and
//! packages the optimizer's output back into named coefficients.
//!
//! ## Assembly cases
//! -----------------
//! * forces only: `X = X_forces`, `y = y_forces`,
//! * moments only: `X = X_moments`, `y = y_moments`,
//! * both: `X = block_diag(X_forces, X_moments)` and `y` stacked forces
//!   first. The block-diagonal form keeps the two linear systems
//!   independent — force coefficients never explain moment residuals and
//!   vice versa; no coupling terms are introduced here.
//!
//! Requesting neither target is rejected before any matrix is touched.

use ahash::RandomState;
use itertools::Itertools;
use nalgebra::{DMatrix, DVector};
use std::collections::HashMap;
use std::fmt;

use crate::constants::{CoefName, MEASURED_FORCE_COLS, MEASURED_MOMENT_COLS};
use crate::dynafit_errors::DynafitError;
use crate::features::{block_diag, stack_targets, FeatureBlock};
use crate::flight_data::FlightData;

/// The assembled linear system `X·θ = y` with named columns.
#[derive(Debug, Clone)]
pub struct RegressionSystem {
    pub x: DMatrix<f64>,
    pub y: DVector<f64>,
    pub coefficient_names: Vec<CoefName>,
}

impl RegressionSystem {
    /// Number of samples behind the system (3 equation rows per sample and
    /// per estimated target).
    pub fn n_equations(&self) -> usize {
        self.x.nrows()
    }
}

/// Assemble the final system from the per-target feature blocks.
///
/// Arguments
/// -----------------
/// * `data`: table holding the measured force/moment target columns.
/// * `forces`: complete `(3n, m_f)` force block, when forces are estimated.
/// * `moments`: complete `(3n, m_m)` moment block, when moments are
///   estimated.
///
/// Return
/// ----------
/// * The [`RegressionSystem`], or [`DynafitError::NothingToEstimate`] when
///   both blocks are absent, or a missing-column error if a measured target
///   column is not in the table.
pub fn assemble_regression_system(
    data: &FlightData,
    forces: Option<&FeatureBlock>,
    moments: Option<&FeatureBlock>,
) -> Result<RegressionSystem, DynafitError> {
    match (forces, moments) {
        (Some(f), Some(m)) => {
            let y_forces = data.stacked_target(&MEASURED_FORCE_COLS)?;
            let y_moments = data.stacked_target(&MEASURED_MOMENT_COLS)?;
            let joint = block_diag(f, m);
            let (x, coefficient_names) = joint.into_parts();
            Ok(RegressionSystem {
                x,
                y: stack_targets(&y_forces, &y_moments),
                coefficient_names,
            })
        }
        (Some(f), None) => {
            let y = data.stacked_target(&MEASURED_FORCE_COLS)?;
            let (x, coefficient_names) = f.clone().into_parts();
            Ok(RegressionSystem {
                x,
                y,
                coefficient_names,
            })
        }
        (None, Some(m)) => {
            let y = data.stacked_target(&MEASURED_MOMENT_COLS)?;
            let (x, coefficient_names) = m.clone().into_parts();
            Ok(RegressionSystem {
                x,
                y,
                coefficient_names,
            })
        }
        (None, None) => Err(DynafitError::NothingToEstimate),
    }
}

/// Contract the external optimizer collaborator must fulfil.
///
/// The optimizer returns one coefficient per design-matrix column, aligned
/// 1:1 with [`RegressionSystem::coefficient_names`], plus whatever fit
/// metrics it computed.
pub trait Optimizer {
    /// Solve `X·θ ≈ y` and return `θ`.
    fn estimate(&mut self, x: &DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>, DynafitError>;

    /// Fit metrics of the last [`estimate`](Self::estimate) call.
    fn metrics(&self) -> HashMap<String, f64, RandomState>;
}

/// Named result of one estimation run.
#[derive(Debug, Clone)]
pub struct ModelResult {
    pub coefficients: Vec<(CoefName, f64)>,
    pub metrics: HashMap<String, f64, RandomState>,
    pub n_samples: usize,
}

impl ModelResult {
    /// Zip coefficient names with estimated values.
    ///
    /// Return
    /// ----------
    /// * The packaged result, or
    ///   [`DynafitError::CoefficientNameMismatch`] when the two lists
    ///   disagree in length — an invariant violation indicating a
    ///   programming or configuration fault, not bad input data.
    pub fn package(
        coefficient_names: &[CoefName],
        values: &DVector<f64>,
        metrics: HashMap<String, f64, RandomState>,
        n_samples: usize,
    ) -> Result<Self, DynafitError> {
        if coefficient_names.len() != values.len() {
            return Err(DynafitError::CoefficientNameMismatch {
                names: coefficient_names.len(),
                values: values.len(),
            });
        }
        Ok(ModelResult {
            coefficients: coefficient_names
                .iter()
                .cloned()
                .zip(values.iter().copied())
                .collect(),
            metrics,
            n_samples,
        })
    }

    /// Look up one coefficient by its full (group-prefixed) name.
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.coefficients
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

impl fmt::Display for ModelResult {
    /// Compact by default; one coefficient per line with `{:#}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Estimated coefficients ({} samples)", self.n_samples)?;
            writeln!(f, "--------------------------------------")?;
            for (name, value) in &self.coefficients {
                writeln!(f, "{name:<32} : {value:>12.6}")?;
            }
            for (name, value) in self.metrics.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
                writeln!(f, "metric {name:<25} : {value:>12.6}")?;
            }
            Ok(())
        } else {
            write!(
                f,
                "{} coefficients over {} samples",
                self.coefficients.len(),
                self.n_samples
            )
        }
    }
}
