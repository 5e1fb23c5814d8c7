use thiserror::Error;

use crate::actuators::VALID_ACTUATOR_TYPES;
use crate::rotor_models::VALID_ROTOR_TYPES;

/// Crate-wide error type.
///
/// Every failure in the regression pipeline is fatal for the whole run:
/// the pipeline is a batch numerical process and any inconsistency
/// invalidates the assembled system. Errors fall into three families:
///
/// * **Configuration errors** — unknown rotor or actuator type tags,
///   neither forces nor moments requested, missing tilt channel for a
///   tilting rotor. Detected while interpreting the model configuration.
/// * **Data errors** — a required column is absent from the loaded flight
///   data, or a column has the wrong length. Detected at first access.
/// * **Invariant violations** — coefficient names out of sync with matrix
///   columns or estimated values. These indicate a programming or
///   configuration mismatch rather than bad input data.
#[derive(Error, Debug)]
pub enum DynafitError {
    #[error("'{0}' is not a valid rotor model, valid rotor models are: {valid}", valid = VALID_ROTOR_TYPES.join(", "))]
    InvalidRotorType(String),

    #[error("actuator type unknown: '{0}', valid actuator types are: {valid}", valid = VALID_ACTUATOR_TYPES.join(", "))]
    InvalidActuatorType(String),

    #[error("tilting rotor '{rotor}' has no tilt actuator channel configured")]
    MissingTiltActuator { rotor: String },

    #[error("neither forces nor moments estimation activated")]
    NothingToEstimate,

    #[error("required column missing from flight data: '{0}'")]
    MissingColumn(String),

    #[error("column '{column}' has {found} samples, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("feature block shape mismatch within a rotor group: expected {expected:?}, found {found:?}")]
    FeatureShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("coefficient name list has {names} entries but feature matrix has {columns} columns")]
    NameColumnMismatch { names: usize, columns: usize },

    #[error("length of coefficient list ({values}) and coefficient name list ({names}) does not match")]
    CoefficientNameMismatch { names: usize, values: usize },

    #[error("rotor group '{0}' contains no rotor configuration")]
    EmptyRotorGroup(String),
}

impl PartialEq for DynafitError {
    fn eq(&self, other: &Self) -> bool {
        use DynafitError::*;
        match (self, other) {
            (InvalidRotorType(a), InvalidRotorType(b)) => a == b,
            (InvalidActuatorType(a), InvalidActuatorType(b)) => a == b,
            (MissingTiltActuator { rotor: a }, MissingTiltActuator { rotor: b }) => a == b,
            (NothingToEstimate, NothingToEstimate) => true,
            (MissingColumn(a), MissingColumn(b)) => a == b,
            (
                ColumnLengthMismatch {
                    column: c1,
                    expected: e1,
                    found: f1,
                },
                ColumnLengthMismatch {
                    column: c2,
                    expected: e2,
                    found: f2,
                },
            ) => c1 == c2 && e1 == e2 && f1 == f2,
            (
                FeatureShapeMismatch {
                    expected: e1,
                    found: f1,
                },
                FeatureShapeMismatch {
                    expected: e2,
                    found: f2,
                },
            ) => e1 == e2 && f1 == f2,
            (
                NameColumnMismatch {
                    names: n1,
                    columns: c1,
                },
                NameColumnMismatch {
                    names: n2,
                    columns: c2,
                },
            ) => n1 == n2 && c1 == c2,
            (
                CoefficientNameMismatch {
                    names: n1,
                    values: v1,
                },
                CoefficientNameMismatch {
                    names: n2,
                    values: v2,
                },
            ) => n1 == n2 && v1 == v2,
            (EmptyRotorGroup(a), EmptyRotorGroup(b)) => a == b,
            _ => false,
        }
    }
}
