//! # Per-sample Fisher information
//!
//! Data-selection front ends rank flight-log segments by how much each
//! sample constrains the parameter estimate. The score used here is the
//! trace of the per-sample information matrix `X_iᵀ X_i`, where `X_i` is
//! the sample's three equation rows of the feature block — the A-optimality
//! criterion, cheap to evaluate and monotone in feature excitation.
//!
//! Scores are appended as columns (`fisher_information_force`,
//! `fisher_information_rot`) and are not consumed anywhere else in the
//! core.

use crate::constants::{FISHER_FORCE_COL, FISHER_MOMENT_COL};
use crate::dynafit_errors::DynafitError;
use crate::features::FeatureBlock;
use crate::flight_data::FlightData;

/// Trace of `X_iᵀ X_i` per sample: the squared Frobenius norm of the three
/// equation rows belonging to sample `i`.
pub fn per_sample_information(block: &FeatureBlock) -> Vec<f64> {
    let matrix = block.matrix();
    let n = matrix.nrows() / 3;
    let mut scores = Vec::with_capacity(n);
    for i in 0..n {
        let rows = matrix.rows(3 * i, 3);
        scores.push(rows.iter().map(|v| v * v).sum());
    }
    scores
}

/// Append informativeness columns for whichever blocks were built.
///
/// Arguments
/// -----------------
/// * `data`: the run's flight-log table.
/// * `forces` / `moments`: the assembled feature blocks, when estimated.
///
/// Return
/// ----------
/// * The table extended with `fisher_information_force` and/or
///   `fisher_information_rot`.
pub fn append_fisher_information(
    mut data: FlightData,
    forces: Option<&FeatureBlock>,
    moments: Option<&FeatureBlock>,
) -> Result<FlightData, DynafitError> {
    if let Some(block) = forces {
        data.insert_column(FISHER_FORCE_COL, per_sample_information(block))?;
    }
    if let Some(block) = moments {
        data.insert_column(FISHER_MOMENT_COL, per_sample_information(block))?;
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    #[test]
    fn information_is_squared_row_energy_per_sample() {
        // Two samples, one column: rows [1,2,3] and [0,0,2].
        let block = FeatureBlock::new(
            DMatrix::from_column_slice(6, 1, &[1.0, 2.0, 3.0, 0.0, 0.0, 2.0]),
            vec!["c"],
        )
        .unwrap();
        let scores = per_sample_information(&block);
        assert_eq!(scores.len(), 2);
        assert_relative_eq!(scores[0], 14.0);
        assert_relative_eq!(scores[1], 4.0);
    }

    #[test]
    fn larger_excitation_scores_higher() {
        let quiet = DMatrix::from_column_slice(3, 1, &[0.1, 0.0, 0.0]);
        let excited = DMatrix::from_column_slice(3, 1, &[2.0, 1.0, 0.5]);
        let mut stacked = DMatrix::zeros(6, 1);
        stacked.view_mut((0, 0), (3, 1)).copy_from(&quiet);
        stacked.view_mut((3, 0), (3, 1)).copy_from(&excited);
        let block = FeatureBlock::new(stacked, vec!["c"]).unwrap();
        let scores = per_sample_information(&block);
        assert!(scores[1] > scores[0]);
    }
}
