//! Elliptical weighted averaging: weight table, per-column footprints, the
//! accumulation loop and the final normalization into typed grids.
pub mod accumulate;
pub mod finalize;
pub mod parameters;
pub mod weights;

pub use accumulate::accumulate;
pub use finalize::{finalize, finalize_as};
pub use parameters::{EwaParameter, compute_parameters};
pub use weights::WeightTable;

/// Threshold below which Jacobian determinants and weight sums count as zero.
pub const EPSILON: f64 = 1e-8;

/// A swath channel sample counts as fill if it equals the channel fill or is NaN.
#[inline]
pub(crate) fn is_fill_sample(value: f32, fill: f32) -> bool {
    value == fill || value.is_nan()
}

/// Equality that also treats two NaNs as equal, for NaN fill values.
#[inline]
pub(crate) fn same_value<T: PartialEq>(a: T, b: T) -> bool {
    #[allow(clippy::eq_op)]
    let both_nan = a != a && b != b;
    a == b || both_nan
}
