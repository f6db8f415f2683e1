use ndarray::ArrayView2;

use crate::core::ewa::parameters::EwaParameter;
use crate::core::ewa::weights::WeightTable;
use crate::core::ewa::{is_fill_sample, same_value};
use crate::core::grid::GridAccumulator;

/// Distribute every valid swath cell of one scan into the grid.
///
/// `u`, `v` and every channel are `rows x cols` views of the same scan; `params` holds
/// one footprint per swath column. Cells whose `u` or `v` equals `col_row_fill` or is not
/// finite are skipped without touching the grid. If any channel of a cell is fill (or NaN) the whole cell is
/// treated as fill: it is dropped in weighted-average mode and writes channel fills in
/// maximum-weight mode.
///
/// Returns true if any cell's footprint box intersected the grid.
#[allow(clippy::too_many_arguments)]
pub fn accumulate(
    u: ArrayView2<f32>,
    v: ArrayView2<f32>,
    channels: &[ArrayView2<f32>],
    params: &[EwaParameter],
    weights: &WeightTable,
    grid: &mut GridAccumulator,
    col_row_fill: f32,
    maximum_weight_mode: bool,
) -> bool {
    let (rows, cols) = u.dim();
    debug_assert_eq!(v.dim(), u.dim());
    debug_assert_eq!(params.len(), cols);
    debug_assert_eq!(channels.len(), grid.channel_count());

    let grid_cols = grid.cols() as i64;
    let grid_rows = grid.rows() as i64;
    let (accums, grid_weights, fills) = grid.parts_mut();

    let mut values = vec![0.0f32; channels.len()];
    let mut got_point = false;

    for row in 0..rows {
        for col in 0..cols {
            let u0 = u[[row, col]];
            let v0 = v[[row, col]];
            if !u0.is_finite() || !v0.is_finite() || u0 == col_row_fill || v0 == col_row_fill {
                continue;
            }
            let u0 = u0 as f64;
            let v0 = v0 as f64;
            let p = &params[col];

            let iu1 = (u0 - p.u_del).floor() as i64;
            let iu2 = (u0 + p.u_del).floor() as i64;
            let iv1 = (v0 - p.v_del).floor() as i64;
            let iv2 = (v0 + p.v_del).floor() as i64;
            if iu2 < 0 || iu1 >= grid_cols || iv2 < 0 || iv1 >= grid_rows {
                continue;
            }
            got_point = true;

            let iu1 = iu1.max(0);
            let iu2 = iu2.min(grid_cols - 1);
            let iv1 = iv1.max(0);
            let iv2 = iv2.min(grid_rows - 1);

            let mut all_fill = false;
            for (chan, channel) in channels.iter().enumerate() {
                let value = channel[[row, col]];
                values[chan] = value;
                if is_fill_sample(value, fills[chan]) {
                    all_fill = true;
                }
            }
            if all_fill && !maximum_weight_mode {
                continue;
            }

            // q(u, v) = a*u^2 + b*u*v + c*v^2 stepped along each grid row by forward
            // differences: q += dq, dq += ddq.
            let ddq = 2.0 * p.a;
            let du = iu1 as f64 - u0;
            let a2up1 = p.a * (2.0 * du + 1.0);
            let bu = p.b * du;
            let au2 = p.a * du * du;

            for iv in iv1..=iv2 {
                let dv = iv as f64 - v0;
                let mut dq = a2up1 + p.b * dv;
                let mut q = (p.c * dv + bu) * dv + au2;
                for iu in iu1..=iu2 {
                    if q < p.f {
                        let weight = weights.lookup(q);
                        let cell = [iv as usize, iu as usize];
                        if maximum_weight_mode {
                            if weight > grid_weights[cell] {
                                grid_weights[cell] = weight;
                                for (chan, acc) in accums.iter_mut().enumerate() {
                                    acc[cell] = if all_fill { fills[chan] } else { values[chan] };
                                }
                            }
                        } else {
                            grid_weights[cell] += weight;
                            for (chan, acc) in accums.iter_mut().enumerate() {
                                let contribution = values[chan] * weight;
                                let slot = &mut acc[cell];
                                // An accumulator still at its fill value has not been
                                // written yet; replace it rather than add to the fill.
                                if same_value(*slot, fills[chan]) {
                                    *slot = contribution;
                                } else {
                                    *slot += contribution;
                                }
                            }
                        }
                    }
                    q += dq;
                    dq += ddq;
                }
            }
        }
    }

    got_point
}
