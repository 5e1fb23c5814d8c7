//! # Aerodynamic feature extension point
//!
//! Vehicle-specific aerodynamic models (wing lift/drag, control-surface
//! effectiveness, fuselage drag) contribute feature columns with the same
//! contract as rotor models: a `(3n, k)` block per target with aligned
//! coefficient names. They are appended after the rotor blocks by the
//! assembly stage.
//!
//! [`BodyRotationModel`] is the one model every airframe shares: the moment
//! contribution of rotating the body frame, `ω × Iω = X · v` with
//! `v = (I_yy−I_zz, I_zz−I_xx, I_xx−I_yy)ᵀ` the inertia differences to be
//! estimated.

use nalgebra::DMatrix;

use crate::constants::ANGULAR_VELOCITY_COLS;
use crate::dynafit_errors::DynafitError;
use crate::features::FeatureBlock;
use crate::flight_data::FlightData;

/// A pluggable aerodynamic feature model.
///
/// Implementations return `None` for a target they do not contribute to
/// (a pure lift/drag model has no moment columns, the body-rotation model
/// has no force columns).
pub trait AeroModel {
    /// Force feature columns, `(3n, k)`, or `None`.
    fn force_features(&self, data: &FlightData) -> Result<Option<FeatureBlock>, DynafitError>;

    /// Moment feature columns, `(3n, k)`, or `None`.
    fn moment_features(&self, data: &FlightData) -> Result<Option<FeatureBlock>, DynafitError>;
}

/// Inertial cross-coupling moment features.
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyRotationModel;

impl AeroModel for BodyRotationModel {
    fn force_features(&self, _data: &FlightData) -> Result<Option<FeatureBlock>, DynafitError> {
        Ok(None)
    }

    /// `(3n, 3)` block with one inertia-difference column per body axis:
    /// row triple `(ω_y ω_z, ω_z ω_x, ω_x ω_y)` on the diagonal positions.
    fn moment_features(&self, data: &FlightData) -> Result<Option<FeatureBlock>, DynafitError> {
        let n = data.n_samples();
        let mut x = DMatrix::zeros(3 * n, 3);
        for i in 0..n {
            let omega = data.vector3_at(&ANGULAR_VELOCITY_COLS, i)?;
            x[(3 * i, 0)] = omega.y * omega.z;
            x[(3 * i + 1, 1)] = omega.z * omega.x;
            x[(3 * i + 2, 2)] = omega.x * omega.y;
        }
        Ok(Some(FeatureBlock::new(
            x,
            vec!["I_yy-I_zz", "I_zz-I_xx", "I_xx-I_yy"],
        )?))
    }
}
