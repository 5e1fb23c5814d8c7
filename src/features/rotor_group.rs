//! # Rotor-group aggregation
//!
//! Combines the per-rotor feature matrices into the rotor-force and
//! rotor-moment blocks of the design matrix:
//!
//! * **within a group** the contributions of all rotors are *summed*
//!   (physically, the total force/moment is the sum over rotors sharing one
//!   coefficient set),
//! * **across groups** the per-group sums are *horizontally concatenated*
//!   so every group keeps independently identifiable coefficients, with the
//!   group name prefixed onto each coefficient label.
//!
//! Groups are walked in configuration order, which is stable, so the i-th
//! aggregated coefficient name always labels the i-th aggregated column.
//! Each group carries an explicit accumulator seeded by its first rotor's
//! block; later rotors are added into it after a shape check.

use nalgebra::DMatrix;

use crate::config::RotorGroupConfig;
use crate::dynafit_errors::DynafitError;
use crate::features::FeatureBlock;
use crate::flight_data::FlightData;
use crate::rotor_models::RotorModel;

/// The aggregated rotor feature blocks of one run.
///
/// Both blocks are `None` when the corresponding target is not estimated or
/// when no rotor groups are configured (an airframe whose features come
/// entirely from aerodynamic models).
#[derive(Debug, Clone)]
pub struct RotorFeatures {
    /// `(3n, m_f)` rotor force block, when forces are estimated.
    pub forces: Option<FeatureBlock>,
    /// `(3n, m_m)` rotor moment block, when moments are estimated.
    pub moments: Option<FeatureBlock>,
}

/// Build the per-group rotor models and aggregate their features.
///
/// Arguments
/// -----------------
/// * `data`: flight-log table with normalized actuators and airspeed
///   columns.
/// * `groups`: rotor groups in configuration order.
/// * `v_airspeed`: `(n, 3)` body airspeed matrix.
/// * `angular_vel`: optional `(n, 3)` body rate matrix.
/// * `estimate_forces` / `estimate_moments`: which blocks to build.
///
/// Return
/// ----------
/// * The aggregated [`RotorFeatures`], or the first fatal error raised by
///   rotor construction (unknown type tag, missing column, missing tilt
///   channel) or aggregation (mixed feature widths within one group).
pub fn compute_rotor_features(
    data: &FlightData,
    groups: &[RotorGroupConfig],
    v_airspeed: &DMatrix<f64>,
    angular_vel: Option<&DMatrix<f64>>,
    estimate_forces: bool,
    estimate_moments: bool,
) -> Result<RotorFeatures, DynafitError> {
    let mut group_force_blocks: Vec<FeatureBlock> = Vec::with_capacity(groups.len());
    let mut group_moment_blocks: Vec<FeatureBlock> = Vec::with_capacity(groups.len());

    for group in groups {
        if group.rotors.is_empty() {
            return Err(DynafitError::EmptyRotorGroup(group.name.clone()));
        }

        let mut force_sum: Option<FeatureBlock> = None;
        let mut moment_sum: Option<FeatureBlock> = None;

        for rotor_config in &group.rotors {
            let rotor = RotorModel::new(rotor_config, data, v_airspeed, angular_vel)?;

            if estimate_forces {
                let block = rotor.compute_actuator_force_matrix()?;
                match &mut force_sum {
                    None => force_sum = Some(block),
                    Some(sum) => sum.add_in_place(&block)?,
                }
            }
            if estimate_moments {
                let block = rotor.compute_actuator_moment_matrix()?;
                match &mut moment_sum {
                    None => moment_sum = Some(block),
                    Some(sum) => sum.add_in_place(&block)?,
                }
            }
        }

        if let Some(mut block) = force_sum {
            block.prefix_names(&group.name);
            group_force_blocks.push(block);
        }
        if let Some(mut block) = moment_sum {
            block.prefix_names(&group.name);
            group_moment_blocks.push(block);
        }
    }

    // no groups configured: leave both blocks absent so aerodynamic models
    // can supply the features on their own
    Ok(RotorFeatures {
        forces: if estimate_forces && !group_force_blocks.is_empty() {
            Some(FeatureBlock::hstack(&group_force_blocks)?)
        } else {
            None
        },
        moments: if estimate_moments && !group_moment_blocks.is_empty() {
            Some(FeatureBlock::hstack(&group_moment_blocks)?)
        } else {
            None
        },
    })
}
