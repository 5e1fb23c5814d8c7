//! # Feature blocks
//!
//! A [`FeatureBlock`] is the unit of currency of the regression pipeline: a
//! `(3n, k)` matrix of linear features together with the ordered list of `k`
//! coefficient names labelling its columns. Every composition primitive the
//! pipeline needs lives here:
//!
//! * [`FeatureBlock::add_in_place`] — same-shape summation (rotors of one
//!   group contribute additively to the total wrench),
//! * [`FeatureBlock::hstack`] — horizontal concatenation (independent
//!   coefficient sets of different rotor groups, aero models),
//! * [`block_diag`] — block-diagonal gluing of the force and moment systems.
//!
//! ## The name/column invariant
//! -----------------
//! The i-th entry of the name list labels the i-th matrix column. Any
//! reordering of columns without reordering names silently mislabels the
//! estimation result, so constructors check the lengths and every
//! composition keeps names and columns moving together.

use nalgebra::{DMatrix, DVector};

use crate::constants::CoefName;
use crate::dynafit_errors::DynafitError;

pub mod aero;
pub mod fisher;
pub mod rotor_group;

/// A feature matrix and the coefficient names aligned with its columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBlock {
    matrix: DMatrix<f64>,
    names: Vec<CoefName>,
}

impl FeatureBlock {
    /// Wrap a matrix and its column labels, enforcing the name/column
    /// invariant.
    pub fn new(
        matrix: DMatrix<f64>,
        names: Vec<impl Into<CoefName>>,
    ) -> Result<Self, DynafitError> {
        let names: Vec<CoefName> = names.into_iter().map(Into::into).collect();
        if names.len() != matrix.ncols() {
            return Err(DynafitError::NameColumnMismatch {
                names: names.len(),
                columns: matrix.ncols(),
            });
        }
        Ok(FeatureBlock { matrix, names })
    }

    #[inline]
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    #[inline]
    pub fn names(&self) -> &[CoefName] {
        &self.names
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    /// Add another block of identical shape into this one.
    ///
    /// Used to sum the per-rotor contributions of one rotor group. A shape
    /// mismatch means rotors of incompatible kinds share a group, which is
    /// a configuration fault.
    pub fn add_in_place(&mut self, other: &FeatureBlock) -> Result<(), DynafitError> {
        if self.matrix.shape() != other.matrix.shape() {
            return Err(DynafitError::FeatureShapeMismatch {
                expected: self.matrix.shape(),
                found: other.matrix.shape(),
            });
        }
        self.matrix += &other.matrix;
        Ok(())
    }

    /// Concatenate blocks horizontally, names following columns.
    ///
    /// Arguments
    /// -----------------
    /// * `blocks`: blocks with a common row count, in the column order of
    ///   the assembled matrix.
    ///
    /// Return
    /// ----------
    /// * One block of width `Σ kᵢ`, or a shape error if row counts differ.
    pub fn hstack(blocks: &[FeatureBlock]) -> Result<FeatureBlock, DynafitError> {
        let nrows = blocks.first().map_or(0, |b| b.nrows());
        let ncols = blocks.iter().map(|b| b.ncols()).sum();
        let mut matrix = DMatrix::zeros(nrows, ncols);
        let mut names = Vec::with_capacity(ncols);
        let mut offset = 0;
        for block in blocks {
            if block.nrows() != nrows {
                return Err(DynafitError::FeatureShapeMismatch {
                    expected: (nrows, block.ncols()),
                    found: block.matrix.shape(),
                });
            }
            matrix
                .view_mut((0, offset), (nrows, block.ncols()))
                .copy_from(&block.matrix);
            names.extend(block.names.iter().cloned());
            offset += block.ncols();
        }
        Ok(FeatureBlock { matrix, names })
    }

    /// Prefix every coefficient name, separated by `_`.
    ///
    /// Rotor-group aggregation uses this to disambiguate the otherwise
    /// identical coefficient names of different groups.
    pub fn prefix_names(&mut self, prefix: &str) {
        for name in &mut self.names {
            *name = format!("{prefix}_{name}");
        }
    }

    /// Consume the block into its matrix and names.
    pub fn into_parts(self) -> (DMatrix<f64>, Vec<CoefName>) {
        (self.matrix, self.names)
    }
}

/// Block-diagonal composition of the force and moment systems.
///
/// Produces the `(r_a + r_b, c_a + c_b)` matrix with `a` in the top-left
/// block, `b` in the bottom-right block, and exact zeros elsewhere, so force
/// coefficients never explain moment residuals and vice versa. The combined
/// name list is `a`'s names followed by `b`'s.
pub fn block_diag(a: &FeatureBlock, b: &FeatureBlock) -> FeatureBlock {
    let mut matrix = DMatrix::zeros(a.nrows() + b.nrows(), a.ncols() + b.ncols());
    matrix
        .view_mut((0, 0), (a.nrows(), a.ncols()))
        .copy_from(&a.matrix);
    matrix
        .view_mut((a.nrows(), a.ncols()), (b.nrows(), b.ncols()))
        .copy_from(&b.matrix);
    let mut names = a.names.clone();
    names.extend(b.names.iter().cloned());
    FeatureBlock { matrix, names }
}

/// Stack two target vectors, forces first.
pub fn stack_targets(y_forces: &DVector<f64>, y_moments: &DVector<f64>) -> DVector<f64> {
    let mut y = DVector::zeros(y_forces.len() + y_moments.len());
    y.rows_mut(0, y_forces.len()).copy_from(y_forces);
    y.rows_mut(y_forces.len(), y_moments.len())
        .copy_from(y_moments);
    y
}
