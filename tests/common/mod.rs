//! Synthetic flight-log builders shared by the integration suites.

use ahash::RandomState;
use dynafit::dynafit_errors::DynafitError;
use dynafit::flight_data::FlightData;
use dynafit::regression::Optimizer;
use nalgebra::{DMatrix, DVector};
use std::collections::HashMap;

/// A forward-flight log with identity attitude, a PWM ramp on `u0`, and
/// synthetic measured force/moment targets.
///
/// Identity attitude makes body airspeed equal to ground velocity, which
/// keeps expected feature values easy to write down in the tests.
pub fn forward_flight_log(n: usize) -> FlightData {
    let ramp: Vec<f64> = (0..n)
        .map(|i| 1000.0 + 1000.0 * i as f64 / (n.max(2) - 1) as f64)
        .collect();
    let shaped = |scale: f64| -> Vec<f64> {
        (0..n).map(|i| scale * (0.1 * i as f64).sin()).collect()
    };

    FlightData::from_columns([
        ("timestamp", (0..n).map(|i| i as f64).collect::<Vec<_>>()),
        ("vx", vec![5.0; n]),
        ("vy", vec![0.0; n]),
        ("vz", vec![0.0; n]),
        ("ang_vel_x", shaped(0.2)),
        ("ang_vel_y", shaped(0.1)),
        ("ang_vel_z", shaped(0.3)),
        ("q0", vec![1.0; n]),
        ("q1", vec![0.0; n]),
        ("q2", vec![0.0; n]),
        ("q3", vec![0.0; n]),
        ("u0", ramp.clone()),
        ("u1", ramp.clone()),
        ("u_tilt", (0..n).map(|i| i as f64 / n as f64).collect()),
        ("measured_force_x", shaped(2.0)),
        ("measured_force_y", shaped(0.5)),
        ("measured_force_z", shaped(9.0)),
        ("measured_moment_x", shaped(0.4)),
        ("measured_moment_y", shaped(0.6)),
        ("measured_moment_z", shaped(0.2)),
    ])
    .unwrap()
}

/// Optimizer stub returning a fixed-length coefficient vector, to exercise
/// result packaging without a numerical solver.
pub struct StubOptimizer {
    /// Length of the returned vector; `None` matches the design matrix.
    pub forced_len: Option<usize>,
}

impl Optimizer for StubOptimizer {
    fn estimate(
        &mut self,
        x: &DMatrix<f64>,
        _y: &DVector<f64>,
    ) -> Result<DVector<f64>, DynafitError> {
        let len = self.forced_len.unwrap_or(x.ncols());
        Ok(DVector::from_iterator(len, (0..len).map(|i| i as f64 + 1.0)))
    }

    fn metrics(&self) -> HashMap<String, f64, RandomState> {
        let mut metrics = HashMap::default();
        metrics.insert("rmse".to_string(), 0.125);
        metrics
    }
}
