//! # Flight-log table
//!
//! [`FlightData`] is the in-memory tabular dataset the pipeline operates on:
//! a fixed number of time-ordered samples with named numeric columns
//! (timestamps, world velocity, body rates, attitude quaternion, actuator
//! commands, measured forces/moments). Loading and resampling the log is an
//! external concern; the core only requires the columns it reads to be
//! present and of consistent length.
//!
//! ## Staged transformation
//! -----------------
//! Pipeline stages are written *owned-in / owned-out*: each stage consumes a
//! `FlightData` and returns an extended (or rewritten) one. This keeps the
//! order-of-calls dependency between stages explicit instead of hiding it in
//! shared mutable state.
//!
//! ## Error semantics
//! -----------------
//! Accessing a missing column is a fatal data error
//! ([`DynafitError::MissingColumn`]) surfaced at the point of first access;
//! inserting a column of the wrong length is rejected immediately.

use ahash::RandomState;
use nalgebra::{DMatrix, DVector, Vector3};
use std::collections::HashMap;

use crate::dynafit_errors::DynafitError;

/// Named-column numeric table with a fixed row count.
#[derive(Debug, Clone)]
pub struct FlightData {
    columns: HashMap<String, DVector<f64>, RandomState>,
    n_samples: usize,
}

impl FlightData {
    /// Create an empty table for `n_samples` rows.
    pub fn new(n_samples: usize) -> Self {
        FlightData {
            columns: HashMap::default(),
            n_samples,
        }
    }

    /// Build a table from `(name, values)` pairs.
    ///
    /// The row count is taken from the first column; every further column
    /// must match it.
    ///
    /// Return
    /// ----------
    /// * The populated table, or [`DynafitError::ColumnLengthMismatch`] if
    ///   the columns disagree on length.
    pub fn from_columns<I, S>(columns: I) -> Result<Self, DynafitError>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut iter = columns.into_iter();
        let Some((first_name, first_values)) = iter.next() else {
            return Ok(FlightData::new(0));
        };
        let mut data = FlightData::new(first_values.len());
        data.insert_column(first_name, first_values)?;
        for (name, values) in iter {
            data.insert_column(name, values)?;
        }
        Ok(data)
    }

    /// Number of samples (rows) in the table.
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Whether a column of the given name is present.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Insert or replace a column, checking its length against the table.
    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        values: impl Into<DVector<f64>>,
    ) -> Result<(), DynafitError> {
        let name = name.into();
        let values = values.into();
        if values.len() != self.n_samples {
            return Err(DynafitError::ColumnLengthMismatch {
                column: name,
                expected: self.n_samples,
                found: values.len(),
            });
        }
        self.columns.insert(name, values);
        Ok(())
    }

    /// Borrow one column as a vector.
    ///
    /// Return
    /// ----------
    /// * `&DVector<f64>` of length [`n_samples`](Self::n_samples), or
    ///   [`DynafitError::MissingColumn`] naming the absent column.
    pub fn column(&self, name: &str) -> Result<&DVector<f64>, DynafitError> {
        self.columns
            .get(name)
            .ok_or_else(|| DynafitError::MissingColumn(name.to_string()))
    }

    /// Gather several columns into an `(n, k)` matrix, one column per name.
    pub fn matrix(&self, names: &[&str]) -> Result<DMatrix<f64>, DynafitError> {
        let mut mat = DMatrix::zeros(self.n_samples, names.len());
        for (j, name) in names.iter().enumerate() {
            mat.set_column(j, self.column(name)?);
        }
        Ok(mat)
    }

    /// Row `i` of three named columns as a 3-vector.
    ///
    /// Convenience for per-sample access to vector quantities stored as
    /// three scalar columns (velocities, rates, airspeed).
    pub fn vector3_at(&self, names: &[&str; 3], i: usize) -> Result<Vector3<f64>, DynafitError> {
        Ok(Vector3::new(
            self.column(names[0])?[i],
            self.column(names[1])?[i],
            self.column(names[2])?[i],
        ))
    }

    /// Stack three measured-target columns into a `3n` vector, samples kept
    /// in row triples `(x, y, z)` to match the feature matrices.
    pub fn stacked_target(&self, names: &[&str; 3]) -> Result<DVector<f64>, DynafitError> {
        let x = self.column(names[0])?;
        let y = self.column(names[1])?;
        let z = self.column(names[2])?;
        let mut out = DVector::zeros(3 * self.n_samples);
        for i in 0..self.n_samples {
            out[3 * i] = x[i];
            out[3 * i + 1] = y[i];
            out[3 * i + 2] = z[i];
        }
        Ok(out)
    }

    /// Iterate over `(name, values)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &DVector<f64>)> {
        self.columns.iter()
    }
}
