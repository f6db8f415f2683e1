use ndarray::{Array2, ArrayView2, Zip};
use num_traits::NumCast;
use tracing::debug;

use crate::core::ewa::{EPSILON, same_value};
use crate::error::{Error, Result};
use crate::types::{DataType, GridImage, Sample};

/// Normalize one channel's accumulator into a typed output grid.
///
/// Cells whose weight sum is below `weight_sum_min` become `grid_fill`. In maximum-weight
/// mode the accumulator already holds a raw sample and is only clamped and cast; otherwise
/// the value is `accum / weight`, rounded half away from zero for integer outputs.
///
/// Returns the grid and the number of cells equal to `grid_fill`.
pub fn finalize<T: Sample>(
    accum: ArrayView2<f32>,
    weights: ArrayView2<f32>,
    weight_sum_min: f64,
    maximum_weight_mode: bool,
    grid_fill: T,
) -> (Array2<T>, usize) {
    debug_assert_eq!(accum.dim(), weights.dim());
    let min_weight = if weight_sum_min > 0.0 {
        weight_sum_min
    } else {
        EPSILON
    };

    let out = Zip::from(&accum)
        .and(&weights)
        .par_map_collect(|&acc, &weight| {
            let weight = weight as f64;
            if weight < min_weight {
                grid_fill
            } else if maximum_weight_mode {
                T::cast_clamped(acc as f64, grid_fill, false)
            } else {
                T::from_grid_value(acc as f64 / weight, grid_fill)
            }
        });

    let fill_count = out.iter().filter(|&&v| same_value(v, grid_fill)).count();
    (out, fill_count)
}

/// `finalize` for an output type chosen at run time.
///
/// Fails if `grid_fill` is not representable in `data_type`.
pub fn finalize_as(
    data_type: DataType,
    accum: ArrayView2<f32>,
    weights: ArrayView2<f32>,
    weight_sum_min: f64,
    maximum_weight_mode: bool,
    grid_fill: f64,
) -> Result<(GridImage, usize)> {
    fn fill_as<T: Sample>(fill: f64) -> Result<T> {
        if fill.is_nan() && T::DATA_TYPE.is_integer() {
            return Err(Error::invalid("grid_fill", fill));
        }
        <T as NumCast>::from(fill).ok_or_else(|| Error::invalid("grid_fill", fill))
    }

    debug!(
        "Finalizing {}x{} grid as {} (maximum_weight_mode={})",
        accum.ncols(),
        accum.nrows(),
        data_type,
        maximum_weight_mode
    );

    let result = match data_type {
        DataType::U1 => {
            let (g, n) = finalize(
                accum,
                weights,
                weight_sum_min,
                maximum_weight_mode,
                fill_as::<u8>(grid_fill)?,
            );
            (GridImage::U1(g), n)
        }
        DataType::U2 => {
            let (g, n) = finalize(
                accum,
                weights,
                weight_sum_min,
                maximum_weight_mode,
                fill_as::<u16>(grid_fill)?,
            );
            (GridImage::U2(g), n)
        }
        DataType::S2 => {
            let (g, n) = finalize(
                accum,
                weights,
                weight_sum_min,
                maximum_weight_mode,
                fill_as::<i16>(grid_fill)?,
            );
            (GridImage::S2(g), n)
        }
        DataType::U4 => {
            let (g, n) = finalize(
                accum,
                weights,
                weight_sum_min,
                maximum_weight_mode,
                fill_as::<u32>(grid_fill)?,
            );
            (GridImage::U4(g), n)
        }
        DataType::S4 => {
            let (g, n) = finalize(
                accum,
                weights,
                weight_sum_min,
                maximum_weight_mode,
                fill_as::<i32>(grid_fill)?,
            );
            (GridImage::S4(g), n)
        }
        DataType::F4 => {
            let (g, n) = finalize(
                accum,
                weights,
                weight_sum_min,
                maximum_weight_mode,
                fill_as::<f32>(grid_fill)?,
            );
            (GridImage::F4(g), n)
        }
        DataType::F8 => {
            let (g, n) = finalize(
                accum,
                weights,
                weight_sum_min,
                maximum_weight_mode,
                fill_as::<f64>(grid_fill)?,
            );
            (GridImage::F8(g), n)
        }
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn weighted_average_divides_and_rounds_integers() {
        let accum = array![[10.0f32, 5.0], [7.0, 0.0]];
        let weights = array![[1.0f32, 2.0], [2.0, 0.0]];
        let (out, fills) = finalize::<u8>(accum.view(), weights.view(), 0.01, false, 0);
        assert_eq!(out, array![[10u8, 3], [4, 0]]);
        assert_eq!(fills, 1);

        let (out, _) = finalize::<f32>(accum.view(), weights.view(), 0.01, false, -1.0);
        assert_eq!(out, array![[10.0f32, 2.5], [3.5, -1.0]]);
    }

    #[test]
    fn low_weight_cells_become_fill() {
        let accum = array![[9.0f32, 9.0]];
        let weights = array![[0.2f32, 0.6]];
        let (out, fills) = finalize::<i16>(accum.view(), weights.view(), 0.5, false, -999);
        assert_eq!(out, array![[-999i16, 15]]);
        assert_eq!(fills, 1);
    }

    #[test]
    fn max_weight_mode_emits_raw_samples() {
        let accum = array![[3.0f32, 200.7]];
        let weights = array![[0.3f32, 0.9]];
        let (out, _) = finalize::<u8>(accum.view(), weights.view(), 0.01, true, 0);
        assert_eq!(out, array![[3u8, 200]]);
    }

    #[test]
    fn integer_output_clamps() {
        let accum = array![[1000.0f32, -50.0]];
        let weights = array![[1.0f32, 1.0]];
        let (out, _) = finalize::<u8>(accum.view(), weights.view(), 0.01, false, 0);
        assert_eq!(out, array![[255u8, 0]]);
    }

    #[test]
    fn zero_weight_sum_min_still_fills_untouched_cells() {
        let accum = array![[5.0f32]];
        let weights = array![[0.0f32]];
        let (out, fills) = finalize::<f32>(accum.view(), weights.view(), 0.0, false, -1.0);
        assert_eq!(out[[0, 0]], -1.0);
        assert_eq!(fills, 1);
    }

    #[test]
    fn nan_fill_is_counted() {
        let accum = array![[f32::NAN, 1.0]];
        let weights = array![[0.0f32, 1.0]];
        let (_, fills) = finalize::<f32>(accum.view(), weights.view(), 0.01, false, f32::NAN);
        assert_eq!(fills, 1);
    }

    #[test]
    fn dynamic_dispatch_matches_type() {
        let accum = array![[4.0f32]];
        let weights = array![[2.0f32]];
        let (img, _) =
            finalize_as(DataType::S4, accum.view(), weights.view(), 0.01, false, -1.0).unwrap();
        assert_eq!(img.data_type(), DataType::S4);
        assert_eq!(img.get_f64(0, 0), Some(2.0));
        assert!(
            finalize_as(DataType::U1, accum.view(), weights.view(), 0.01, false, -1.0).is_err()
        );
    }
}
