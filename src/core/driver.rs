use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::ewa::{EwaParameter, WeightTable, accumulate, compute_parameters};
use crate::core::grid::GridAccumulator;
use crate::core::params::{EwaParams, GridShape, SwathShape};
use crate::error::{Error, Result};

/// Working buffers for one scan: projected grid column (`u`), grid row (`v`) and every
/// channel widened to f32, each `rows_per_scan x swath_cols`.
#[derive(Debug, Clone)]
pub struct ScanBuffers {
    pub u: Array2<f32>,
    pub v: Array2<f32>,
    pub channels: Vec<Array2<f32>>,
}

impl ScanBuffers {
    pub fn new(swath: &SwathShape, chan_count: usize) -> Self {
        let dim = (swath.rows_per_scan, swath.cols);
        Self {
            u: Array2::zeros(dim),
            v: Array2::zeros(dim),
            channels: (0..chan_count).map(|_| Array2::zeros(dim)).collect(),
        }
    }

    fn check_shape(&self, swath: &SwathShape) -> Result<()> {
        let expected = (swath.rows_per_scan, swath.cols);
        let named = std::iter::once(("u", &self.u))
            .chain(std::iter::once(("v", &self.v)))
            .chain(self.channels.iter().map(|c| ("channel", c)));
        for (what, array) in named {
            if array.dim() != expected {
                return Err(Error::DimensionMismatch {
                    what: format!("{} scan buffer", what),
                    expected_rows: expected.0,
                    expected_cols: expected.1,
                    rows: array.nrows(),
                    cols: array.ncols(),
                });
            }
        }
        Ok(())
    }
}

/// Supplies scans to the driver in order.
pub trait ScanSource {
    fn channel_count(&self) -> usize;

    /// Load scan `scan` (0-based, counted from the source's first scan) into `buffers`.
    fn read_scan(&mut self, scan: usize, buffers: &mut ScanBuffers) -> Result<()>;
}

/// Scan offsets and count that would cover exactly the scans that mapped into the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWindow {
    pub chan_scan_first: usize,
    pub colrow_scan_first: usize,
    pub swath_scans: usize,
}

/// Outcome of a driver run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub scans_processed: usize,
    pub first_scan_with_data: Option<usize>,
    pub last_scan_with_data: Option<usize>,
    /// Present when the scans with data differ from the processed range
    pub recommended: Option<ScanWindow>,
}

/// Sequential per-scan EWA pipeline: read, derive footprints, accumulate.
pub struct ScanDriver {
    params: EwaParams,
    swath: SwathShape,
    weights: WeightTable,
    ewa: Vec<EwaParameter>,
    grid: GridAccumulator,
    first_scan_with_data: Option<usize>,
    last_scan_with_data: Option<usize>,
    scans_processed: usize,
}

impl ScanDriver {
    /// Validate the configuration and allocate the weight table and grid.
    /// `channel_fills` holds the swath fill value of every channel.
    pub fn new(
        params: EwaParams,
        swath: SwathShape,
        grid: GridShape,
        channel_fills: &[f32],
    ) -> Result<Self> {
        params.validate()?;
        swath.validate()?;
        grid.validate()?;
        if channel_fills.is_empty() {
            return Err(Error::Config("at least one channel is required".into()));
        }

        let weights = WeightTable::new(
            params.weight_count,
            params.weight_min,
            params.weight_distance_max,
        )?;
        debug!(
            "Weight table: count={} qmax={} qfactor={}",
            weights.len(),
            weights.qmax(),
            weights.qfactor()
        );

        Ok(Self {
            ewa: vec![EwaParameter::default(); swath.cols],
            grid: GridAccumulator::new(grid, channel_fills),
            params,
            swath,
            weights,
            first_scan_with_data: None,
            last_scan_with_data: None,
            scans_processed: 0,
        })
    }

    pub fn params(&self) -> &EwaParams {
        &self.params
    }

    pub fn grid(&self) -> &GridAccumulator {
        &self.grid
    }

    pub fn into_grid(self) -> GridAccumulator {
        self.grid
    }

    /// Footprints computed for the most recent scan.
    pub fn ewa_parameters(&self) -> &[EwaParameter] {
        &self.ewa
    }

    /// Process one loaded scan. Coordinates are shifted in place by the grid start offsets.
    /// Returns true if any cell of the scan mapped into the grid.
    pub fn accumulate_scan(&mut self, scan: usize, buffers: &mut ScanBuffers) -> Result<bool> {
        buffers.check_shape(&self.swath)?;
        if buffers.channels.len() != self.grid.channel_count() {
            return Err(Error::Config(format!(
                "scan has {} channels, grid has {}",
                buffers.channels.len(),
                self.grid.channel_count()
            )));
        }

        let fill = self.params.col_row_fill;
        shift_coordinates(&mut buffers.u, self.params.grid_col_start, fill);
        shift_coordinates(&mut buffers.v, self.params.grid_row_start, fill);

        compute_parameters(
            buffers.u.view(),
            buffers.v.view(),
            self.weights.qmax(),
            self.weights.distance_max(),
            self.params.weight_delta_max,
            &mut self.ewa,
        );

        let channels: Vec<ArrayView2<f32>> = buffers.channels.iter().map(|c| c.view()).collect();
        let got_point = accumulate(
            buffers.u.view(),
            buffers.v.view(),
            &channels,
            &self.ewa,
            &self.weights,
            &mut self.grid,
            fill,
            self.params.maximum_weight_mode,
        );

        self.scans_processed += 1;
        if got_point {
            if self.first_scan_with_data.is_none() {
                self.first_scan_with_data = Some(scan);
            }
            self.last_scan_with_data = Some(scan);
        }
        debug!("Scan {}: mapped={}", scan, got_point);
        Ok(got_point)
    }

    /// Read and accumulate `swath.scans` scans from `source`.
    pub fn run<S: ScanSource>(&mut self, source: &mut S) -> Result<ScanSummary> {
        if source.channel_count() != self.grid.channel_count() {
            return Err(Error::Config(format!(
                "source has {} channels, grid has {}",
                source.channel_count(),
                self.grid.channel_count()
            )));
        }

        info!(
            "Resampling {} scans of {}x{} onto {}x{} grid ({} channel(s), {})",
            self.swath.scans,
            self.swath.cols,
            self.swath.rows_per_scan,
            self.grid.cols(),
            self.grid.rows(),
            self.grid.channel_count(),
            if self.params.maximum_weight_mode {
                "maximum weight"
            } else {
                "weighted average"
            }
        );

        let mut buffers = ScanBuffers::new(&self.swath, self.grid.channel_count());
        for scan in 0..self.swath.scans {
            source.read_scan(scan, &mut buffers)?;
            self.accumulate_scan(scan, &mut buffers)?;
        }

        Ok(self.summary())
    }

    /// Scan range diagnostics so far, with a next-invocation window when the scans that
    /// mapped into the grid do not span the whole processed range.
    pub fn summary(&self) -> ScanSummary {
        let recommended = match (self.first_scan_with_data, self.last_scan_with_data) {
            (Some(first), Some(last)) => {
                if first > 0 || last + 1 < self.scans_processed {
                    let window = ScanWindow {
                        chan_scan_first: self.params.chan_scan_first + first,
                        colrow_scan_first: self.params.colrow_scan_first + first,
                        swath_scans: last - first + 1,
                    };
                    info!(
                        "Data found in scans {}..={} of {}; next run can use chan_scan_first={} colrow_scan_first={} swath_scans={}",
                        first,
                        last,
                        self.scans_processed,
                        window.chan_scan_first,
                        window.colrow_scan_first,
                        window.swath_scans
                    );
                    Some(window)
                } else {
                    None
                }
            }
            _ => {
                if self.scans_processed > 0 {
                    warn!("No swath data mapped into the grid");
                }
                None
            }
        };

        ScanSummary {
            scans_processed: self.scans_processed,
            first_scan_with_data: self.first_scan_with_data,
            last_scan_with_data: self.last_scan_with_data,
            recommended,
        }
    }
}

fn shift_coordinates(coords: &mut Array2<f32>, start: f32, fill: f32) {
    if start == 0.0 {
        return;
    }
    coords.mapv_inplace(|c| if c == fill { c } else { c - start });
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scans laid out one grid row per swath row, starting at `row0 + scan * rows`.
    struct Ramp {
        cols: usize,
        rows: usize,
        row0: f32,
        value: f32,
    }

    impl ScanSource for Ramp {
        fn channel_count(&self) -> usize {
            1
        }

        fn read_scan(&mut self, scan: usize, buffers: &mut ScanBuffers) -> Result<()> {
            for r in 0..self.rows {
                for c in 0..self.cols {
                    buffers.u[[r, c]] = c as f32;
                    buffers.v[[r, c]] = self.row0 + (scan * self.rows + r) as f32;
                    buffers.channels[0][[r, c]] = self.value;
                }
            }
            Ok(())
        }
    }

    fn swath(scans: usize) -> SwathShape {
        SwathShape {
            cols: 4,
            scans,
            rows_per_scan: 2,
        }
    }

    #[test]
    fn full_coverage_needs_no_recommendation() {
        let grid = GridShape { cols: 4, rows: 6 };
        let mut driver = ScanDriver::new(EwaParams::default(), swath(3), grid, &[0.0]).unwrap();
        let mut source = Ramp { cols: 4, rows: 2, row0: 0.0, value: 5.0 };
        let summary = driver.run(&mut source).unwrap();

        assert_eq!(summary.scans_processed, 3);
        assert_eq!(summary.first_scan_with_data, Some(0));
        assert_eq!(summary.last_scan_with_data, Some(2));
        assert_eq!(summary.recommended, None);
        assert!(driver.grid().weights().iter().all(|&w| w > 0.0));
    }

    #[test]
    fn partial_coverage_recommends_window() {
        // Scans 0..=1 land above the grid; scan 2 reaches its top row through the footprint.
        let grid = GridShape { cols: 4, rows: 4 };
        let params = EwaParams {
            chan_scan_first: 10,
            colrow_scan_first: 20,
            ..EwaParams::default()
        };
        let mut driver = ScanDriver::new(params, swath(5), grid, &[0.0]).unwrap();
        let mut source = Ramp { cols: 4, rows: 2, row0: -6.0, value: 1.0 };
        let summary = driver.run(&mut source).unwrap();

        assert_eq!(summary.first_scan_with_data, Some(2));
        assert_eq!(summary.last_scan_with_data, Some(4));
        let window = summary.recommended.unwrap();
        assert_eq!(window.chan_scan_first, 12);
        assert_eq!(window.colrow_scan_first, 22);
        assert_eq!(window.swath_scans, 3);
    }

    #[test]
    fn grid_start_offsets_shift_coordinates() {
        let grid = GridShape { cols: 4, rows: 2 };
        let params = EwaParams {
            grid_row_start: 100.0,
            ..EwaParams::default()
        };
        let mut driver = ScanDriver::new(params, swath(1), grid, &[0.0]).unwrap();
        let mut source = Ramp { cols: 4, rows: 2, row0: 100.0, value: 3.0 };
        let summary = driver.run(&mut source).unwrap();
        assert_eq!(summary.first_scan_with_data, Some(0));
        assert!(driver.grid().weights()[[0, 0]] > 0.0);
        assert!(driver.grid().weights()[[1, 3]] > 0.0);
    }

    #[test]
    fn rejects_narrow_swath() {
        let shape = SwathShape {
            cols: 2,
            scans: 1,
            rows_per_scan: 2,
        };
        let grid = GridShape { cols: 4, rows: 4 };
        assert!(ScanDriver::new(EwaParams::default(), shape, grid, &[0.0]).is_err());
    }

    #[test]
    fn rejects_mismatched_buffers() {
        let grid = GridShape { cols: 4, rows: 4 };
        let mut driver = ScanDriver::new(EwaParams::default(), swath(1), grid, &[0.0]).unwrap();
        let mut buffers = ScanBuffers::new(&swath(1), 2);
        assert!(driver.accumulate_scan(0, &mut buffers).is_err());
        let mut buffers = ScanBuffers::new(
            &SwathShape {
                cols: 5,
                scans: 1,
                rows_per_scan: 2,
            },
            1,
        );
        assert!(driver.accumulate_scan(0, &mut buffers).is_err());
    }
}
