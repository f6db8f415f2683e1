use ndarray::ArrayView2;

use crate::core::ewa::EPSILON;

/// Elliptical footprint of one swath column for the current scan.
///
/// A point `(u, v)` relative to a swath cell's projected center is inside the footprint
/// iff `a*u^2 + b*u*v + c*v^2 < f`. `u_del`/`v_del` are the half-widths, in grid cells,
/// of the bounding box that covers the ellipse.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EwaParameter {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub f: f64,
    pub u_del: f64,
    pub v_del: f64,
}

impl EwaParameter {
    /// Direct evaluation of the quadratic form at an offset from the cell center.
    #[inline]
    pub fn q(&self, du: f64, dv: f64) -> f64 {
        self.a * du * du + self.b * du * dv + self.c * dv * dv
    }
}

/// Derive per-column footprints from the projected coordinates of one scan.
///
/// `u` and `v` are `rows x cols` with `rows >= 2` and `cols >= 3`; `params` has `cols`
/// entries. Column derivatives come from the middle row, row derivatives from the first
/// and last rows. The two edge columns copy their interior neighbor.
pub fn compute_parameters(
    u: ArrayView2<f32>,
    v: ArrayView2<f32>,
    qmax: f64,
    distance_max: f64,
    delta_max: f64,
    params: &mut [EwaParameter],
) {
    let (rows, cols) = u.dim();
    debug_assert_eq!(u.dim(), v.dim());
    debug_assert!(rows >= 2 && cols >= 3);
    debug_assert_eq!(params.len(), cols);

    let mid = rows / 2;
    let last = rows - 1;
    let rows_m1 = last as f64;
    let half_distance = distance_max / 2.0;

    for col in 1..cols - 1 {
        let ux = (u[[mid, col + 1]] as f64 - u[[mid, col - 1]] as f64) * half_distance;
        let vx = (v[[mid, col + 1]] as f64 - v[[mid, col - 1]] as f64) * half_distance;
        let uy = (u[[last, col]] as f64 - u[[0, col]] as f64) / rows_m1 * distance_max;
        let vy = (v[[last, col]] as f64 - v[[0, col]] as f64) / rows_m1 * distance_max;

        let det = ux * vy - uy * vx;
        let f_scale = det * det;
        let (a, b, c) = if f_scale > EPSILON {
            let f_scale = qmax / f_scale;
            (
                (vx * vx + vy * vy) * f_scale,
                -2.0 * (ux * vx + uy * vy) * f_scale,
                (ux * ux + uy * uy) * f_scale,
            )
        } else {
            // Singular Jacobian (e.g. repeated coordinates): unit circle
            (1.0, 0.0, 1.0)
        };

        let d = 4.0 * a * c - b * b;
        let d = if d > EPSILON { 4.0 * qmax / d } else { 1.0 };

        params[col] = EwaParameter {
            a,
            b,
            c,
            f: qmax,
            u_del: (c * d).sqrt().min(delta_max),
            v_del: (a * d).sqrt().min(delta_max),
        };
    }

    params[0] = params[1];
    params[cols - 1] = params[cols - 2];
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    /// A regular swath mapped one-to-one onto the grid, offset by (10, 20).
    fn identity_scan(rows: usize, cols: usize) -> (Array2<f32>, Array2<f32>) {
        let u = Array2::from_shape_fn((rows, cols), |(_, c)| 10.0 + c as f32);
        let v = Array2::from_shape_fn((rows, cols), |(r, _)| 20.0 + r as f32);
        (u, v)
    }

    #[test]
    fn identity_mapping_gives_unit_circle() {
        let (u, v) = identity_scan(4, 5);
        let mut params = vec![EwaParameter::default(); 5];
        compute_parameters(u.view(), v.view(), 1.0, 1.0, 10.0, &mut params);

        for p in &params {
            assert_relative_eq!(p.a, 1.0, epsilon = 1e-9);
            assert_relative_eq!(p.b, 0.0, epsilon = 1e-9);
            assert_relative_eq!(p.c, 1.0, epsilon = 1e-9);
            assert_eq!(p.f, 1.0);
            assert_relative_eq!(p.u_del, 1.0, epsilon = 1e-9);
            assert_relative_eq!(p.v_del, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn stretched_swath_widens_footprint() {
        // Each swath column steps 3 grid columns; rows step 1 grid row.
        let u = Array2::from_shape_fn((2, 4), |(_, c)| 3.0 * c as f32);
        let v = Array2::from_shape_fn((2, 4), |(r, _)| r as f32);
        let mut params = vec![EwaParameter::default(); 4];
        compute_parameters(u.view(), v.view(), 1.0, 1.0, 10.0, &mut params);

        let p = params[1];
        assert_relative_eq!(p.a, 1.0 / 9.0, epsilon = 1e-9);
        assert_relative_eq!(p.c, 1.0, epsilon = 1e-9);
        assert_relative_eq!(p.u_del, 3.0, epsilon = 1e-9);
        assert_relative_eq!(p.v_del, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_scan_falls_back_to_circle() {
        let u = Array2::from_elem((3, 4), 7.0f32);
        let v = Array2::from_elem((3, 4), 7.0f32);
        let mut params = vec![EwaParameter::default(); 4];
        compute_parameters(u.view(), v.view(), 1.0, 1.0, 10.0, &mut params);

        for p in &params {
            assert_eq!((p.a, p.b, p.c), (1.0, 0.0, 1.0));
            assert_relative_eq!(p.u_del, 1.0, epsilon = 1e-12);
            assert_relative_eq!(p.v_del, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn deltas_are_clamped() {
        let u = Array2::from_shape_fn((2, 3), |(_, c)| 100.0 * c as f32);
        let v = Array2::from_shape_fn((2, 3), |(r, _)| 100.0 * r as f32);
        let mut params = vec![EwaParameter::default(); 3];
        compute_parameters(u.view(), v.view(), 1.0, 1.0, 10.0, &mut params);
        assert!(params.iter().all(|p| p.u_del <= 10.0 && p.v_del <= 10.0));
        assert_eq!(params[1].u_del, 10.0);
    }

    #[test]
    fn edges_copy_interior_neighbours() {
        let u = Array2::from_shape_fn((3, 6), |(r, c)| (c * c) as f32 + 0.5 * r as f32);
        let v = Array2::from_shape_fn((3, 6), |(r, c)| r as f32 * (1.0 + c as f32));
        let mut params = vec![EwaParameter::default(); 6];
        compute_parameters(u.view(), v.view(), 1.0, 1.0, 10.0, &mut params);
        assert_eq!(params[0], params[1]);
        assert_eq!(params[5], params[4]);
        assert_ne!(params[1], params[4]);
    }
}
