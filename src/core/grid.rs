use ndarray::Array2;

use crate::core::params::GridShape;

/// Per-channel weighted accumulators plus the shared weight-sum grid.
///
/// Arrays are `rows x cols` of the output grid. Accumulators start at the channel's swath
/// fill value, weights at zero. They persist across scans until finalized.
#[derive(Debug, Clone)]
pub struct GridAccumulator {
    accum: Vec<Array2<f32>>,
    weights: Array2<f32>,
    fills: Vec<f32>,
}

impl GridAccumulator {
    pub fn new(shape: GridShape, channel_fills: &[f32]) -> Self {
        let dim = (shape.rows, shape.cols);
        Self {
            accum: channel_fills
                .iter()
                .map(|&fill| Array2::from_elem(dim, fill))
                .collect(),
            weights: Array2::zeros(dim),
            fills: channel_fills.to_vec(),
        }
    }

    pub fn channel_count(&self) -> usize {
        self.accum.len()
    }

    pub fn cols(&self) -> usize {
        self.weights.ncols()
    }

    pub fn rows(&self) -> usize {
        self.weights.nrows()
    }

    pub fn accum(&self, chan: usize) -> &Array2<f32> {
        &self.accum[chan]
    }

    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    pub fn fills(&self) -> &[f32] {
        &self.fills
    }

    /// Split borrow for the accumulation loop.
    pub(crate) fn parts_mut(&mut self) -> (&mut [Array2<f32>], &mut Array2<f32>, &[f32]) {
        (&mut self.accum, &mut self.weights, &self.fills)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_fill_with_zero_weight() {
        let grid = GridAccumulator::new(GridShape { cols: 4, rows: 3 }, &[-1.0, 7.0]);
        assert_eq!(grid.channel_count(), 2);
        assert_eq!((grid.rows(), grid.cols()), (3, 4));
        assert!(grid.accum(0).iter().all(|&v| v == -1.0));
        assert!(grid.accum(1).iter().all(|&v| v == 7.0));
        assert!(grid.weights().iter().all(|&w| w == 0.0));
    }
}
