//! Per-rotor local airflow.
//!
//! The airspeed seen by one rotor disk differs from the body airspeed by the
//! rigid-body term `ω × r` at the rotor position. Feature computation needs
//! that local flow split relative to the (possibly per-sample) rotor axis
//! into an axis-parallel magnitude and the in-plane remainder.

use nalgebra::{DMatrix, Vector3};

use crate::constants::MIN_AIRSPEED_THRESH;

/// Local airflow at the rotor hub for every sample.
#[derive(Debug, Clone)]
pub(crate) struct LocalAirflow {
    v_local: DMatrix<f64>,
}

/// Airflow of one sample decomposed relative to a rotor axis.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AxialDecomposition {
    /// Magnitude of the airspeed component along the rotor axis.
    pub v_parallel_abs: f64,
    /// In-plane airspeed component, zeroed below the minimum-airspeed
    /// threshold so near-hover noise does not pick a spurious direction.
    pub v_perpendicular: Vector3<f64>,
}

impl LocalAirflow {
    /// Combine body airspeed with the `ω × r` contribution at the rotor
    /// position. With no angular rates available the body airspeed is used
    /// unchanged.
    pub(crate) fn new(
        v_airspeed: &DMatrix<f64>,
        angular_vel: Option<&DMatrix<f64>>,
        rotor_position: &Vector3<f64>,
    ) -> Self {
        let n = v_airspeed.nrows();
        let mut v_local = DMatrix::zeros(n, 3);
        for i in 0..n {
            let mut v = Vector3::new(v_airspeed[(i, 0)], v_airspeed[(i, 1)], v_airspeed[(i, 2)]);
            if let Some(rates) = angular_vel {
                let omega = Vector3::new(rates[(i, 0)], rates[(i, 1)], rates[(i, 2)]);
                v += omega.cross(rotor_position);
            }
            v_local.set_row(i, &v.transpose());
        }
        LocalAirflow { v_local }
    }

    #[inline]
    pub(crate) fn n_samples(&self) -> usize {
        self.v_local.nrows()
    }

    #[inline]
    pub(crate) fn sample(&self, i: usize) -> Vector3<f64> {
        Vector3::new(
            self.v_local[(i, 0)],
            self.v_local[(i, 1)],
            self.v_local[(i, 2)],
        )
    }

    /// Split sample `i` into axial and in-plane components relative to
    /// `rotor_axis` (assumed unit length).
    pub(crate) fn decompose(&self, i: usize, rotor_axis: &Vector3<f64>) -> AxialDecomposition {
        let v = self.sample(i);
        let axial = rotor_axis.dot(&v);
        let mut v_perpendicular = v - axial * rotor_axis;
        if v_perpendicular.norm() < MIN_AIRSPEED_THRESH {
            v_perpendicular = Vector3::zeros();
        }
        AxialDecomposition {
            v_parallel_abs: axial.abs(),
            v_perpendicular,
        }
    }
}
