//! # Estimation run configuration
//!
//! [`ModelConfig`] describes one estimation run: which actuator channels
//! exist and how to normalize them, how rotors are grouped, and whether
//! forces, moments, or both are estimated. The structure is *consumed* by
//! the pipeline — loading it from a YAML file is the front end's concern,
//! hence the plain `serde::Deserialize` derives without any I/O here.
//!
//! Validation happens in [`ModelConfigBuilder::build`] (and again in
//! [`ModelConfig::validate`] for deserialized configs): requesting neither
//! forces nor moments, or declaring an empty rotor group, is a fatal
//! configuration error raised before any matrix is built.

use serde::Deserialize;

use crate::actuators::ActuatorType;
use crate::dynafit_errors::DynafitError;
use crate::rotor_models::RotorConfig;

/// One actuator channel and its normalization class.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActuatorChannel {
    pub dataframe_name: String,
    pub actuator_type: ActuatorType,
}

/// Named group of rotors whose force/moment contributions are summed.
///
/// Group membership does not change the physics, only the label prefix on
/// the output coefficient names; groups are concatenated in declaration
/// order, which fixes the column order of the assembled matrix.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RotorGroupConfig {
    pub name: String,
    pub rotors: Vec<RotorConfig>,
}

/// Full configuration of one estimation run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelConfig {
    /// Rotor groups in declaration order.
    pub rotor_groups: Vec<RotorGroupConfig>,
    /// Actuator channels to normalize before feature computation.
    #[serde(default)]
    pub actuator_channels: Vec<ActuatorChannel>,
    pub estimate_forces: bool,
    pub estimate_moments: bool,
    /// Inputs are already control outputs in `[-1, 1]` rather than PWM.
    #[serde(default)]
    pub control_outputs_used: bool,
}

impl ModelConfig {
    pub fn builder() -> ModelConfigBuilder {
        ModelConfigBuilder::new()
    }

    /// Check the cross-field constraints a deserialized config may violate.
    ///
    /// Return
    /// ----------
    /// * `Ok(())`, or [`DynafitError::NothingToEstimate`] /
    ///   [`DynafitError::EmptyRotorGroup`] naming the offending group.
    pub fn validate(&self) -> Result<(), DynafitError> {
        if !self.estimate_forces && !self.estimate_moments {
            return Err(DynafitError::NothingToEstimate);
        }
        for group in &self.rotor_groups {
            if group.rotors.is_empty() {
                return Err(DynafitError::EmptyRotorGroup(group.name.clone()));
            }
        }
        Ok(())
    }

    /// `(name, type)` pairs for the normalization stage.
    pub(crate) fn channel_pairs(&self) -> Vec<(String, ActuatorType)> {
        self.actuator_channels
            .iter()
            .map(|c| (c.dataframe_name.clone(), c.actuator_type))
            .collect()
    }
}

/// Fluent builder for [`ModelConfig`].
///
/// ```rust
/// use dynafit::config::ModelConfig;
/// use dynafit::rotor_models::RotorConfig;
///
/// let config = ModelConfig::builder()
///     .rotor_group("main", vec![RotorConfig::plain("u0")])
///     .estimate_forces(true)
///     .build()
///     .unwrap();
/// # assert_eq!(config.rotor_groups.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModelConfigBuilder {
    rotor_groups: Vec<RotorGroupConfig>,
    actuator_channels: Vec<ActuatorChannel>,
    estimate_forces: bool,
    estimate_moments: bool,
    control_outputs_used: bool,
}

impl ModelConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rotor group; declaration order is column order.
    pub fn rotor_group(mut self, name: impl Into<String>, rotors: Vec<RotorConfig>) -> Self {
        self.rotor_groups.push(RotorGroupConfig {
            name: name.into(),
            rotors,
        });
        self
    }

    /// Declare an actuator channel for the normalization stage.
    pub fn actuator(mut self, dataframe_name: impl Into<String>, actuator_type: ActuatorType) -> Self {
        self.actuator_channels.push(ActuatorChannel {
            dataframe_name: dataframe_name.into(),
            actuator_type,
        });
        self
    }

    pub fn estimate_forces(mut self, enabled: bool) -> Self {
        self.estimate_forces = enabled;
        self
    }

    pub fn estimate_moments(mut self, enabled: bool) -> Self {
        self.estimate_moments = enabled;
        self
    }

    pub fn control_outputs_used(mut self, enabled: bool) -> Self {
        self.control_outputs_used = enabled;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<ModelConfig, DynafitError> {
        let config = ModelConfig {
            rotor_groups: self.rotor_groups,
            actuator_channels: self.actuator_channels,
            estimate_forces: self.estimate_forces,
            estimate_moments: self.estimate_moments,
            control_outputs_used: self.control_outputs_used,
        };
        config.validate()?;
        Ok(config)
    }
}
