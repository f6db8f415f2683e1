#![doc = r#"
swathgrid: elliptical weighted averaging (EWA) of satellite swath data onto grids.

Swath sensors sample the ground in scans whose footprint size and orientation vary
across the scene. Given, for every swath cell, its fractional projected position on an
output grid (column `u`, row `v`), swathgrid spreads each cell's value(s) over the grid
cells covered by an elliptical footprint derived from the local Jacobian of the
swath-to-grid mapping, then normalizes the weighted sums. This antialiases correctly where
nearest-neighbour or fixed-kernel resampling would not.

The crate powers the `swathgrid` CLI and can be embedded directly.

Quick start: in-memory arrays
-----------------------------
```rust
use ndarray::Array2;
use swathgrid::{resample_arrays, ChannelSpec, DataType, EwaParams, GridShape};

fn main() -> swathgrid::Result<()> {
    // Two scans of 2 rows x 4 columns, mapped one-to-one onto a 4x4 grid.
    let u = Array2::from_shape_fn((4, 4), |(_, c)| c as f32);
    let v = Array2::from_shape_fn((4, 4), |(r, _)| r as f32);
    let chan = Array2::from_elem((4, 4), 42.0f32);

    let out = resample_arrays(
        &u,
        &v,
        &[chan],
        &[ChannelSpec::new(DataType::U2, 0.0)],
        2,
        GridShape { cols: 4, rows: 4 },
        &EwaParams::default(),
    )?;

    assert_eq!(out.grids[0].dim(), (4, 4));
    assert_eq!(out.grids[0].get_f64(1, 1), Some(42.0));
    Ok(())
}
```

Raw files
---------
```rust,no_run
use std::path::PathBuf;
use swathgrid::{
    resample_files, ChannelJob, ChannelSpec, DataType, EwaParams, GridShape, ResampleJob,
    SwathShape,
};

fn main() -> swathgrid::Result<()> {
    let job = ResampleJob {
        swath: SwathShape { cols: 1354, scans: 203, rows_per_scan: 10 },
        grid: GridShape { cols: 1200, rows: 1200 },
        params: EwaParams::default(),
        col_file: PathBuf::from("/data/cols.f4"),
        row_file: PathBuf::from("/data/rows.f4"),
        channels: vec![ChannelJob {
            input: PathBuf::from("/data/band1.s2"),
            output: PathBuf::from("/out/band1_grid.s2"),
            spec: ChannelSpec::new(DataType::S2, -32768.0),
        }],
    };

    let out = resample_files(&job)?;
    job.report(&out).write(std::path::Path::new("/out/report.json"))?;
    Ok(())
}
```

Error handling
--------------
All fallible functions return `swathgrid::Result<T>`. Configuration errors are reported
before any scan is read; short or missing input files abort the run. Geometric
degeneracies and fill values are handled per cell and never surface as errors.

Useful modules
--------------
- [`api`]: high-level entry points.
- [`core`]: weight table, footprint parameters, accumulation, finalization, scan driver.
- [`io`]: raw binary readers/writers and the JSON run report.
- [`types`]: element type tags and the `Sample` trait.
- [`error`]: crate-level `Error` and `Result`.
"#]

pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Types
pub use core::params::{ChannelSpec, EwaParams, GridShape, SwathShape};
pub use error::{Error, Result};
pub use types::{DataType, GridImage, Sample};

// Engine stages
pub use core::driver::{ScanBuffers, ScanDriver, ScanSource, ScanSummary, ScanWindow};
pub use core::ewa::{EwaParameter, WeightTable, accumulate, compute_parameters, finalize, finalize_as};
pub use core::grid::GridAccumulator;

// I/O
pub use io::{ArraySwath, RawSwathFiles, RunReport};

// High-level API re-exports
pub use api::{ChannelJob, ResampleJob, ResampleOutput, resample_arrays, resample_files};
