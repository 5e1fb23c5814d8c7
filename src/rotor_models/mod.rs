//! # Rotor force/moment feature models
//!
//! Each physical rotor contributes a set of linear feature columns to the
//! force and moment regression matrices. The feature model depends on the
//! rotor kind:
//!
//! * [`RotorKind::Plain`] — thrust and hub drag as functions of the
//!   normalized command and the local airflow; `(3n, 3)` force and `(3n, 5)`
//!   moment columns.
//! * [`RotorKind::BiDirectional`] — as plain, but the command sign selects
//!   the rotation direction per sample; forces and moments are not symmetric
//!   about zero command.
//! * [`RotorKind::Tilting`] — the thrust axis rotates with a second tilt
//!   actuator, so command/tilt mixing is evaluated per sample; one extra
//!   in-plane drag column on each block.
//! * [`RotorKind::ChangingAxis`] — the rotor axis reacts to body rates
//!   (gyroscopic coupling); extra angular-rate-dependent columns.
//!
//! Kind selection is a closed `match` over the enum; an unrecognized rotor
//! type tag in the configuration is a fatal error listing the valid tags.
//!
//! ## Physical model
//! -----------------
//! With `ρ` the air density, `D` the propeller diameter, `u` the normalized
//! command, `v∥` the airspeed magnitude along the rotor axis `a`, `v⊥` the
//! in-plane airspeed, `d` the turning direction and `r` the rotor position:
//!
//! ```text
//! force  : rot_drag_lin    = -ρD³ · u · v⊥
//!          rot_thrust_quad =  ρD⁴ · u² · a
//!          rot_thrust_lin  =  ρD⁴ · u · v∥ · a
//! moment : c_m_leaver_quad =  ρD⁴ · u² · (r × a)
//!          c_m_leaver_lin  =  ρD⁴ · u · v∥ · (r × a)
//!          c_m_drag_z_quad = -ρD⁵ · d · u² · a
//!          c_m_drag_z_lin  = -ρD⁵ · d · u · v∥ · a
//!          c_m_rolling     = -d · u · v⊥
//! ```
//!
//! The unknown coefficients multiplying these columns are what the external
//! optimizer estimates.

use nalgebra::{DMatrix, DVector, Rotation3, Unit, Vector3};
use serde::Deserialize;
use std::str::FromStr;

use crate::constants::{AIR_DENSITY, Meter, Radian};
use crate::dynafit_errors::DynafitError;
use crate::features::FeatureBlock;
use crate::flight_data::FlightData;

mod airflow;
use airflow::{AxialDecomposition, LocalAirflow};

/// Valid rotor type tags, in the order reported by error messages.
pub const VALID_ROTOR_TYPES: [&str; 4] = [
    "RotorModel",
    "ChangingAxisRotorModel",
    "BiDirectionalRotorModel",
    "TiltingRotorModel",
];

/// Closed set of rotor feature models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotorKind {
    Plain,
    BiDirectional,
    Tilting,
    ChangingAxis,
}

impl FromStr for RotorKind {
    type Err = DynafitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RotorModel" => Ok(RotorKind::Plain),
            "BiDirectionalRotorModel" => Ok(RotorKind::BiDirectional),
            "TiltingRotorModel" => Ok(RotorKind::Tilting),
            "ChangingAxisRotorModel" => Ok(RotorKind::ChangingAxis),
            other => Err(DynafitError::InvalidRotorType(other.to_string())),
        }
    }
}

/// Placement and airframe-fixed properties of one rotor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RotorGeometry {
    /// Thrust axis in the body frame, unit length.
    pub rotor_axis: Vector3<f64>,
    /// Rotor hub position relative to the center of gravity, meters.
    pub position: Vector3<f64>,
    /// `+1` or `-1`, sign of the reaction torque about the rotor axis.
    pub turning_direction: f64,
    /// Propeller diameter, meters.
    pub diameter: Meter,
}

impl Default for RotorGeometry {
    fn default() -> Self {
        // z-up lifting rotor at the center of gravity (FRD body frame, so
        // thrust points along -z).
        RotorGeometry {
            rotor_axis: Vector3::new(0.0, 0.0, -1.0),
            position: Vector3::zeros(),
            turning_direction: 1.0,
            diameter: 0.25,
        }
    }
}

/// Configuration of one rotor instance, as enumerated in a rotor group.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RotorConfig {
    /// Actuator command column driving this rotor.
    pub dataframe_name: String,
    /// Rotor type tag; absent selects the plain `RotorModel`.
    #[serde(default)]
    pub rotor_type: Option<String>,
    /// Tilt actuator column, required for `TiltingRotorModel`.
    #[serde(default)]
    pub tilt_actuator_dataframe_name: Option<String>,
    /// Maximum tilt angle reached at full tilt command, radians.
    #[serde(default = "default_max_tilt_angle")]
    pub max_tilt_angle: Radian,
    /// Hinge axis the rotor tilts about, body frame.
    #[serde(default = "default_tilt_axis")]
    pub tilt_axis: Vector3<f64>,
    #[serde(default)]
    pub geometry: RotorGeometry,
}

fn default_max_tilt_angle() -> f64 {
    std::f64::consts::FRAC_PI_2
}

fn default_tilt_axis() -> Vector3<f64> {
    Vector3::new(0.0, 1.0, 0.0)
}

impl RotorConfig {
    /// Minimal configuration: a plain rotor with default geometry driven by
    /// the given actuator column.
    pub fn plain(dataframe_name: impl Into<String>) -> Self {
        RotorConfig {
            dataframe_name: dataframe_name.into(),
            rotor_type: None,
            tilt_actuator_dataframe_name: None,
            max_tilt_angle: default_max_tilt_angle(),
            tilt_axis: default_tilt_axis(),
            geometry: RotorGeometry::default(),
        }
    }

    /// Same as [`plain`](Self::plain) with an explicit rotor type tag.
    pub fn with_type(dataframe_name: impl Into<String>, rotor_type: impl Into<String>) -> Self {
        RotorConfig {
            rotor_type: Some(rotor_type.into()),
            ..Self::plain(dataframe_name)
        }
    }
}

/// One rotor instance bound to the flight data of the current run.
#[derive(Debug, Clone)]
pub struct RotorModel {
    kind: RotorKind,
    name: String,
    geometry: RotorGeometry,
    actuator_input: DVector<f64>,
    airflow: LocalAirflow,
    angular_vel: Option<DMatrix<f64>>,
    /// Per-sample tilt angle in radians, tilting rotors only.
    tilt_angle: Option<DVector<f64>>,
    /// Hinge axis the rotor tilts about, tilting rotors only.
    tilt_hinge: Option<Unit<Vector3<f64>>>,
}

impl RotorModel {
    /// Bind a rotor configuration to the per-run data.
    ///
    /// Arguments
    /// -----------------
    /// * `config`: the rotor entry of a rotor group.
    /// * `data`: flight-log table with normalized actuator columns.
    /// * `v_airspeed`: `(n, 3)` body-frame airspeed matrix.
    /// * `angular_vel`: optional `(n, 3)` body angular rate matrix.
    ///
    /// Return
    /// ----------
    /// * The bound model, or a fatal configuration error: unknown rotor
    ///   type tag ([`DynafitError::InvalidRotorType`]), a tilting rotor with
    ///   no tilt channel ([`DynafitError::MissingTiltActuator`]), or a
    ///   missing actuator column.
    pub fn new(
        config: &RotorConfig,
        data: &FlightData,
        v_airspeed: &DMatrix<f64>,
        angular_vel: Option<&DMatrix<f64>>,
    ) -> Result<Self, DynafitError> {
        let kind = match &config.rotor_type {
            Some(tag) => tag.parse()?,
            None => RotorKind::Plain,
        };

        let actuator_input = data.column(&config.dataframe_name)?.clone();
        let (tilt_angle, tilt_hinge) = if kind == RotorKind::Tilting {
            let tilt_name = config.tilt_actuator_dataframe_name.as_ref().ok_or_else(|| {
                DynafitError::MissingTiltActuator {
                    rotor: config.dataframe_name.clone(),
                }
            })?;
            (
                Some(data.column(tilt_name)? * config.max_tilt_angle),
                Some(Unit::new_normalize(config.tilt_axis)),
            )
        } else {
            (None, None)
        };

        Ok(RotorModel {
            kind,
            name: config.dataframe_name.clone(),
            geometry: config.geometry.clone(),
            actuator_input,
            airflow: LocalAirflow::new(v_airspeed, angular_vel, &config.geometry.position),
            angular_vel: angular_vel.cloned(),
            tilt_angle,
            tilt_hinge,
        })
    }

    /// Coefficient names of the force block, in column order.
    pub fn force_coef_names(&self) -> Vec<&'static str> {
        let mut names = vec!["rot_drag_lin", "rot_thrust_quad", "rot_thrust_lin"];
        match self.kind {
            RotorKind::Tilting => names.push("rot_drag_tilt_quad"),
            RotorKind::ChangingAxis => names.push("rot_thrust_gyro_quad"),
            _ => {}
        }
        names
    }

    /// Coefficient names of the moment block, in column order.
    pub fn moment_coef_names(&self) -> Vec<&'static str> {
        let mut names = vec![
            "c_m_leaver_quad",
            "c_m_leaver_lin",
            "c_m_drag_z_quad",
            "c_m_drag_z_lin",
            "c_m_rolling",
        ];
        match self.kind {
            RotorKind::Tilting => names.push("c_m_rolling_quad"),
            RotorKind::ChangingAxis => {
                names.push("c_m_gyro_quad");
                names.push("c_m_gyro_lin");
            }
            _ => {}
        }
        names
    }

    /// Effective command, rotor axis, and turning direction for sample `i`.
    ///
    /// Bidirectional rotors flip axis and turning direction with the sign
    /// of the command; tilting rotors rotate the axis about the hinge by
    /// the per-sample tilt angle.
    fn sample_state(&self, i: usize) -> (f64, Vector3<f64>, f64) {
        let u = self.actuator_input[i];
        match self.kind {
            RotorKind::Plain | RotorKind::ChangingAxis => (
                u,
                self.geometry.rotor_axis,
                self.geometry.turning_direction,
            ),
            RotorKind::BiDirectional => {
                let direction = if u < 0.0 { -1.0 } else { 1.0 };
                (
                    u.abs(),
                    direction * self.geometry.rotor_axis,
                    direction * self.geometry.turning_direction,
                )
            }
            RotorKind::Tilting => {
                let angle = self
                    .tilt_angle
                    .as_ref()
                    .map(|angles| angles[i])
                    .unwrap_or(0.0);
                let hinge = self
                    .tilt_hinge
                    .unwrap_or_else(|| Unit::new_normalize(default_tilt_axis()));
                let rotation = Rotation3::from_axis_angle(&hinge, angle);
                (
                    u,
                    rotation * self.geometry.rotor_axis,
                    self.geometry.turning_direction,
                )
            }
        }
    }

    fn body_rate(&self, i: usize) -> Vector3<f64> {
        match &self.angular_vel {
            Some(rates) => Vector3::new(rates[(i, 0)], rates[(i, 1)], rates[(i, 2)]),
            None => Vector3::zeros(),
        }
    }

    /// Force feature matrix of this rotor: `(3n, k_f)` with three rows per
    /// sample (body x/y/z force equations).
    pub fn compute_actuator_force_matrix(&self) -> Result<FeatureBlock, DynafitError> {
        let n = self.airflow.n_samples();
        let names = self.force_coef_names();
        let mut x = DMatrix::zeros(3 * n, names.len());
        let rho = AIR_DENSITY;
        let d3 = self.geometry.diameter.powi(3);
        let d4 = self.geometry.diameter.powi(4);

        for i in 0..n {
            let (u, axis, _) = self.sample_state(i);
            let AxialDecomposition {
                v_parallel_abs,
                v_perpendicular,
            } = self.airflow.decompose(i, &axis);

            let drag_lin = -rho * d3 * u * v_perpendicular;
            let thrust_quad = rho * d4 * u * u * axis;
            let thrust_lin = rho * d4 * u * v_parallel_abs * axis;

            for row in 0..3 {
                x[(3 * i + row, 0)] = drag_lin[row];
                x[(3 * i + row, 1)] = thrust_quad[row];
                x[(3 * i + row, 2)] = thrust_lin[row];
            }

            match self.kind {
                RotorKind::Tilting => {
                    let drag_tilt_quad = -rho * d3 * u * u * v_perpendicular;
                    for row in 0..3 {
                        x[(3 * i + row, 3)] = drag_tilt_quad[row];
                    }
                }
                RotorKind::ChangingAxis => {
                    let gyro = self.body_rate(i).cross(&axis);
                    let thrust_gyro_quad = rho * d4 * u * u * gyro;
                    for row in 0..3 {
                        x[(3 * i + row, 3)] = thrust_gyro_quad[row];
                    }
                }
                _ => {}
            }
        }
        FeatureBlock::new(x, names)
    }

    /// Moment feature matrix of this rotor: `(3n, k_m)` with three rows per
    /// sample (body roll/pitch/yaw moment equations).
    pub fn compute_actuator_moment_matrix(&self) -> Result<FeatureBlock, DynafitError> {
        let n = self.airflow.n_samples();
        let names = self.moment_coef_names();
        let mut x = DMatrix::zeros(3 * n, names.len());
        let rho = AIR_DENSITY;
        let d4 = self.geometry.diameter.powi(4);
        let d5 = self.geometry.diameter.powi(5);

        for i in 0..n {
            let (u, axis, direction) = self.sample_state(i);
            let AxialDecomposition {
                v_parallel_abs,
                v_perpendicular,
            } = self.airflow.decompose(i, &axis);
            let lever = self.geometry.position.cross(&axis);

            let leaver_quad = rho * d4 * u * u * lever;
            let leaver_lin = rho * d4 * u * v_parallel_abs * lever;
            let drag_z_quad = -rho * d5 * direction * u * u * axis;
            let drag_z_lin = -rho * d5 * direction * u * v_parallel_abs * axis;
            let rolling = -direction * u * v_perpendicular;

            for row in 0..3 {
                x[(3 * i + row, 0)] = leaver_quad[row];
                x[(3 * i + row, 1)] = leaver_lin[row];
                x[(3 * i + row, 2)] = drag_z_quad[row];
                x[(3 * i + row, 3)] = drag_z_lin[row];
                x[(3 * i + row, 4)] = rolling[row];
            }

            match self.kind {
                RotorKind::Tilting => {
                    let rolling_quad = -direction * u * u * v_perpendicular;
                    for row in 0..3 {
                        x[(3 * i + row, 5)] = rolling_quad[row];
                    }
                }
                RotorKind::ChangingAxis => {
                    let gyro = self.body_rate(i).cross(&axis);
                    let gyro_quad = rho * d5 * u * u * gyro;
                    let gyro_lin = rho * d5 * u * v_parallel_abs * gyro;
                    for row in 0..3 {
                        x[(3 * i + row, 5)] = gyro_quad[row];
                        x[(3 * i + row, 6)] = gyro_lin[row];
                    }
                }
                _ => {}
            }
        }
        FeatureBlock::new(x, names)
    }

    /// Actuator column name this rotor is driven by.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The feature model kind of this rotor.
    pub fn kind(&self) -> RotorKind {
        self.kind
    }
}
