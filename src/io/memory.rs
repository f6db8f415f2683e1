use ndarray::{Array2, s};

use crate::core::driver::{ScanBuffers, ScanSource};
use crate::error::{Error, Result};

/// Whole-swath arrays held in memory, served one scan at a time.
///
/// `u`, `v` and every channel are `(total_rows, swath_cols)`. Scan `k` covers rows
/// `(first + k) * rows_per_scan ..` where `first` is the coordinate or channel scan offset.
pub struct ArraySwath<'a> {
    u: &'a Array2<f32>,
    v: &'a Array2<f32>,
    channels: Vec<&'a Array2<f32>>,
    rows_per_scan: usize,
    colrow_scan_first: usize,
    chan_scan_first: usize,
}

impl<'a> ArraySwath<'a> {
    pub fn new(
        u: &'a Array2<f32>,
        v: &'a Array2<f32>,
        channels: &'a [Array2<f32>],
        rows_per_scan: usize,
    ) -> Result<Self> {
        if u.dim() != v.dim() {
            return Err(Error::DimensionMismatch {
                what: "row coordinates".into(),
                expected_rows: u.nrows(),
                expected_cols: u.ncols(),
                rows: v.nrows(),
                cols: v.ncols(),
            });
        }
        for channel in channels {
            if channel.ncols() != u.ncols() {
                return Err(Error::DimensionMismatch {
                    what: "channel".into(),
                    expected_rows: channel.nrows(),
                    expected_cols: u.ncols(),
                    rows: channel.nrows(),
                    cols: channel.ncols(),
                });
            }
        }
        Ok(Self {
            u,
            v,
            channels: channels.iter().collect(),
            rows_per_scan,
            colrow_scan_first: 0,
            chan_scan_first: 0,
        })
    }

    /// Start the coordinate and channel arrays at different scans.
    pub fn with_scan_offsets(mut self, colrow_scan_first: usize, chan_scan_first: usize) -> Self {
        self.colrow_scan_first = colrow_scan_first;
        self.chan_scan_first = chan_scan_first;
        self
    }

    /// Number of whole scans available given both offsets.
    pub fn available_scans(&self) -> usize {
        let colrow = (self.u.nrows() / self.rows_per_scan).saturating_sub(self.colrow_scan_first);
        self.channels
            .iter()
            .map(|c| (c.nrows() / self.rows_per_scan).saturating_sub(self.chan_scan_first))
            .fold(colrow, usize::min)
    }

    fn copy_scan(
        &self,
        src: &Array2<f32>,
        scan: usize,
        dst: &mut Array2<f32>,
        what: &str,
    ) -> Result<()> {
        let start = scan * self.rows_per_scan;
        let end = start + self.rows_per_scan;
        if end > src.nrows() {
            return Err(Error::Config(format!(
                "{} has {} rows, scan needs rows {}..{}",
                what,
                src.nrows(),
                start,
                end
            )));
        }
        dst.assign(&src.slice(s![start..end, ..]));
        Ok(())
    }
}

impl ScanSource for ArraySwath<'_> {
    fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn read_scan(&mut self, scan: usize, buffers: &mut ScanBuffers) -> Result<()> {
        let colrow = self.colrow_scan_first + scan;
        let chan = self.chan_scan_first + scan;
        self.copy_scan(self.u, colrow, &mut buffers.u, "col array")?;
        self.copy_scan(self.v, colrow, &mut buffers.v, "row array")?;
        for (src, dst) in self.channels.iter().zip(buffers.channels.iter_mut()) {
            self.copy_scan(src, chan, dst, "channel array")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::SwathShape;

    #[test]
    fn serves_scans_with_offsets() {
        let u = Array2::from_shape_fn((6, 3), |(r, _)| r as f32);
        let v = u.clone();
        let chans = vec![Array2::from_shape_fn((6, 3), |(r, _)| 10.0 * r as f32)];
        let mut source = ArraySwath::new(&u, &v, &chans, 2)
            .unwrap()
            .with_scan_offsets(1, 0);
        assert_eq!(source.available_scans(), 2);

        let swath = SwathShape {
            cols: 3,
            scans: 2,
            rows_per_scan: 2,
        };
        let mut buffers = ScanBuffers::new(&swath, 1);
        source.read_scan(0, &mut buffers).unwrap();
        assert_eq!(buffers.u[[0, 0]], 2.0);
        assert_eq!(buffers.channels[0][[1, 0]], 10.0);

        source.read_scan(1, &mut buffers).unwrap();
        assert_eq!(buffers.v[[1, 2]], 5.0);
        assert!(source.read_scan(2, &mut buffers).is_err());
    }
}
