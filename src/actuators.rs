//! # Actuator command normalization
//!
//! Maps raw actuator command units (PWM-like, or control outputs already in
//! `[-1, 1]`) onto the physically meaningful range consumed by the rotor and
//! control-surface models:
//!
//! * `motor` → `[0, 1]` (zero below the output deadband),
//! * `control_surface` / `bi_directional_motor` → `[-1, 1]` around trim.
//!
//! Values below `min_output` are forced to exactly `0`, conflating
//! "below deadband" with "exactly zero output". Downstream rotor features
//! rely on that exact zero for idle motors.

use serde::Deserialize;
use std::str::FromStr;

use crate::dynafit_errors::DynafitError;
use crate::flight_data::FlightData;

/// Valid actuator type tags, in the order reported by error messages.
pub const VALID_ACTUATOR_TYPES: [&str; 3] = ["motor", "control_surface", "bi_directional_motor"];

/// Kind of physical actuator behind a command channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum ActuatorType {
    /// Unidirectional rotor throttle, normalized to `[0, 1]`.
    Motor,
    /// Deflecting surface, normalized to `[-1, 1]` around trim.
    ControlSurface,
    /// Reversible rotor throttle, normalized to `[-1, 1]` around trim.
    BiDirectionalMotor,
}

impl FromStr for ActuatorType {
    type Err = DynafitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "motor" => Ok(ActuatorType::Motor),
            "control_surface" => Ok(ActuatorType::ControlSurface),
            "bi_directional_motor" => Ok(ActuatorType::BiDirectionalMotor),
            other => Err(DynafitError::InvalidActuatorType(other.to_string())),
        }
    }
}

impl TryFrom<String> for ActuatorType {
    type Error = DynafitError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Raw command range shared by all channels of one normalization pass.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct NormalizationRange {
    pub min_output: f64,
    pub max_output: f64,
    pub trim_output: f64,
}

impl NormalizationRange {
    /// PWM-style outputs as recorded in most flight logs.
    pub fn pwm() -> Self {
        NormalizationRange {
            min_output: 1000.0,
            max_output: 2000.0,
            trim_output: 1500.0,
        }
    }

    /// Inputs that are already control outputs in `[-1, 1]`.
    ///
    /// `max_output` is set slightly above 1 so that a saturated command
    /// still maps below the top of the range.
    pub fn control_outputs() -> Self {
        NormalizationRange {
            min_output: -1.0,
            max_output: 1.01,
            trim_output: 0.0,
        }
    }

    /// Normalize one raw sample for the given actuator type.
    #[inline]
    pub fn normalize(&self, actuator_type: ActuatorType, raw: f64) -> f64 {
        if raw < self.min_output {
            return 0.0;
        }
        match actuator_type {
            ActuatorType::Motor => (raw - self.min_output) / (self.max_output - self.min_output),
            ActuatorType::ControlSurface | ActuatorType::BiDirectionalMotor => {
                2.0 * (raw - self.trim_output) / (self.max_output - self.min_output)
            }
        }
    }
}

/// Replace raw actuator columns by their normalized values.
///
/// Arguments
/// -----------------
/// * `data`: flight-log table holding the raw actuator columns.
/// * `channels`: `(column name, actuator type)` pairs to normalize.
/// * `range`: the shared raw command range
///   ([`NormalizationRange::pwm`] or [`NormalizationRange::control_outputs`]).
///
/// Return
/// ----------
/// * The table with each listed column replaced in place, or a
///   [`DynafitError::MissingColumn`] if a channel is absent. Designed to run
///   once per estimation run; a second pass would rescale already-normalized
///   values.
pub fn normalize_actuators(
    mut data: FlightData,
    channels: &[(String, ActuatorType)],
    range: &NormalizationRange,
) -> Result<FlightData, DynafitError> {
    for (name, actuator_type) in channels {
        let normalized: Vec<f64> = data
            .column(name)?
            .iter()
            .map(|&raw| range.normalize(*actuator_type, raw))
            .collect();
        data.insert_column(name.clone(), normalized)?;
    }
    Ok(data)
}
