use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use ndarray::Array2;
use num_traits::ToPrimitive;
use tracing::debug;

use crate::core::driver::{ScanBuffers, ScanSource};
use crate::core::params::SwathShape;
use crate::error::{Error, Result};
use crate::types::{DataType, GridImage, Sample};

/// Sequential reader of one raw row-major swath file, one scan at a time.
pub struct RawScanReader {
    path: PathBuf,
    reader: BufReader<File>,
    data_type: DataType,
    bytes: Vec<u8>,
}

impl RawScanReader {
    /// Open `path` and position it at scan `scan_first`.
    pub fn open(
        path: &Path,
        data_type: DataType,
        swath: &SwathShape,
        scan_first: usize,
    ) -> Result<Self> {
        let file = File::open(path)?;
        let scan_bytes = swath.cells_per_scan() * data_type.size();
        let mut reader = BufReader::new(file);
        if scan_first > 0 {
            reader.seek(SeekFrom::Start((scan_first * scan_bytes) as u64))?;
        }
        debug!(
            "Opened {:?} as {} starting at scan {}",
            path, data_type, scan_first
        );
        Ok(Self {
            path: path.to_path_buf(),
            reader,
            data_type,
            bytes: vec![0u8; scan_bytes],
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the next scan and widen it into `out` (row-major order).
    pub fn read_next(&mut self, out: &mut Array2<f32>) -> Result<()> {
        let expected = out.len() * self.data_type.size();
        if self.bytes.len() != expected {
            self.bytes.resize(expected, 0);
        }
        let got = read_full(&mut self.reader, &mut self.bytes)?;
        if got < expected {
            return Err(Error::ShortRead {
                path: self.path.clone(),
                expected,
                got,
            });
        }
        decode_into(self.data_type, &self.bytes, out);
        Ok(())
    }
}

fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Widen raw native-endian elements of `data_type` into `out`.
pub fn decode_into(data_type: DataType, bytes: &[u8], out: &mut Array2<f32>) {
    fn widen<T: Sample>(bytes: &[u8], out: &mut Array2<f32>) {
        let size = T::DATA_TYPE.size();
        for (dst, chunk) in out.iter_mut().zip(bytes.chunks_exact(size)) {
            *dst = T::from_ne_slice(chunk).to_f32().unwrap_or(f32::NAN);
        }
    }
    match data_type {
        DataType::U1 => widen::<u8>(bytes, out),
        DataType::U2 => widen::<u16>(bytes, out),
        DataType::S2 => widen::<i16>(bytes, out),
        DataType::U4 => widen::<u32>(bytes, out),
        DataType::S4 => widen::<i32>(bytes, out),
        DataType::F4 => widen::<f32>(bytes, out),
        DataType::F8 => widen::<f64>(bytes, out),
    }
}

/// Col/row coordinate files plus one file per channel, read in lockstep.
///
/// Coordinates are always 4-byte floats. Channel files may start at a different scan
/// than the coordinate files (`chan_scan_first` vs `colrow_scan_first`).
pub struct RawSwathFiles {
    cols: RawScanReader,
    rows: RawScanReader,
    channels: Vec<RawScanReader>,
}

impl RawSwathFiles {
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        col_file: &Path,
        row_file: &Path,
        channel_files: &[(PathBuf, DataType)],
        swath: &SwathShape,
        colrow_scan_first: usize,
        chan_scan_first: usize,
    ) -> Result<Self> {
        let cols = RawScanReader::open(col_file, DataType::F4, swath, colrow_scan_first)?;
        let rows = RawScanReader::open(row_file, DataType::F4, swath, colrow_scan_first)?;
        let channels = channel_files
            .iter()
            .map(|(path, data_type)| RawScanReader::open(path, *data_type, swath, chan_scan_first))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            cols,
            rows,
            channels,
        })
    }
}

impl ScanSource for RawSwathFiles {
    fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn read_scan(&mut self, _scan: usize, buffers: &mut ScanBuffers) -> Result<()> {
        self.cols.read_next(&mut buffers.u)?;
        self.rows.read_next(&mut buffers.v)?;
        for (reader, out) in self.channels.iter_mut().zip(buffers.channels.iter_mut()) {
            reader.read_next(out)?;
        }
        Ok(())
    }
}

/// Write a finalized grid as raw row-major native-endian elements.
pub fn write_grid(path: &Path, grid: &GridImage) -> Result<()> {
    std::fs::write(path, grid.to_ne_bytes())?;
    let (rows, cols) = grid.dim();
    debug!("Wrote {}x{} {} grid to {:?}", cols, rows, grid.data_type(), path);
    Ok(())
}

/// Write any 2D array of samples as raw row-major native-endian elements.
pub fn write_array<T: Sample>(path: &Path, data: &Array2<T>) -> Result<()> {
    let mut bytes = Vec::with_capacity(data.len() * T::DATA_TYPE.size());
    for &v in data.iter() {
        v.extend_ne_bytes(&mut bytes);
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Read a whole raw row-major file of `rows x cols` samples.
pub fn read_array<T: Sample>(path: &Path, rows: usize, cols: usize) -> Result<Array2<T>> {
    let bytes = std::fs::read(path)?;
    let size = T::DATA_TYPE.size();
    let expected = rows * cols * size;
    if bytes.len() < expected {
        return Err(Error::ShortRead {
            path: path.to_path_buf(),
            expected,
            got: bytes.len(),
        });
    }
    let values: Vec<T> = bytes[..expected]
        .chunks_exact(size)
        .map(T::from_ne_slice)
        .collect();
    Array2::from_shape_vec((rows, cols), values).map_err(|e| Error::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn decodes_signed_shorts() {
        let mut bytes = Vec::new();
        for v in [-3i16, 0, 7, 32767] {
            v.extend_ne_bytes(&mut bytes);
        }
        let mut out = Array2::<f32>::zeros((2, 2));
        decode_into(DataType::S2, &bytes, &mut out);
        assert_eq!(out, array![[-3.0f32, 0.0], [7.0, 32767.0]]);
    }

    #[test]
    fn scans_are_read_in_order_from_offset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chan.u1");
        // 3 scans of 2x3 bytes, scan k filled with k
        let data: Vec<u8> = (0..3u8).flat_map(|k| std::iter::repeat(k).take(6)).collect();
        std::fs::write(&path, &data).unwrap();

        let swath = SwathShape {
            cols: 3,
            scans: 2,
            rows_per_scan: 2,
        };
        let mut reader = RawScanReader::open(&path, DataType::U1, &swath, 1).unwrap();
        let mut out = Array2::<f32>::zeros((2, 3));
        reader.read_next(&mut out).unwrap();
        assert!(out.iter().all(|&v| v == 1.0));
        reader.read_next(&mut out).unwrap();
        assert!(out.iter().all(|&v| v == 2.0));

        match reader.read_next(&mut out) {
            Err(Error::ShortRead { expected, got, .. }) => {
                assert_eq!(expected, 6);
                assert_eq!(got, 0);
            }
            other => panic!("expected short read, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn array_files_keep_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.s4");
        let grid = array![[1i32, -2, 3], [4, 5, -6]];
        write_array(&path, &grid).unwrap();
        let back: Array2<i32> = read_array(&path, 2, 3).unwrap();
        assert_eq!(back, grid);
        assert!(read_array::<i32>(&path, 3, 3).is_err());
    }
}
