//! High-level library API: resample in-memory swath arrays or raw swath files onto a
//! grid. Prefer these entry points over the low-level `core` stages when integrating
//! swathgrid.
use std::path::PathBuf;

use ndarray::Array2;
use tracing::info;

use crate::core::driver::{ScanDriver, ScanSource, ScanSummary};
use crate::core::ewa::finalize_as;
use crate::core::params::{ChannelSpec, EwaParams, GridShape, SwathShape};
use crate::error::{Error, Result};
use crate::io::raw::{RawSwathFiles, write_grid};
use crate::io::memory::ArraySwath;
use crate::io::report::{ChannelReport, RunReport};
use crate::types::GridImage;

/// Finalized grids and diagnostics of one run.
#[derive(Debug, Clone)]
pub struct ResampleOutput {
    pub grids: Vec<GridImage>,
    pub fill_counts: Vec<usize>,
    pub summary: ScanSummary,
}

/// One input channel file and its output grid file.
#[derive(Debug, Clone)]
pub struct ChannelJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub spec: ChannelSpec,
}

/// A file-to-file resampling run.
#[derive(Debug, Clone)]
pub struct ResampleJob {
    pub swath: SwathShape,
    pub grid: GridShape,
    pub params: EwaParams,
    pub col_file: PathBuf,
    pub row_file: PathBuf,
    pub channels: Vec<ChannelJob>,
}

impl ResampleJob {
    /// Build the report sidecar for a finished run of this job.
    pub fn report(&self, output: &ResampleOutput) -> RunReport {
        let channels = self
            .channels
            .iter()
            .zip(&output.fill_counts)
            .enumerate()
            .map(|(index, (chan, &fill_count))| ChannelReport {
                index,
                output: Some(chan.output.clone()),
                spec: chan.spec,
                fill_count,
            })
            .collect();
        RunReport::new(
            self.swath,
            self.grid,
            self.params.clone(),
            channels,
            output.summary.clone(),
        )
    }
}

fn run_and_finalize<S: ScanSource>(
    source: &mut S,
    swath: SwathShape,
    grid: GridShape,
    specs: &[ChannelSpec],
    params: &EwaParams,
) -> Result<ResampleOutput> {
    let fills: Vec<f32> = specs.iter().map(|s| s.swath_fill as f32).collect();
    let mut driver = ScanDriver::new(params.clone(), swath, grid, &fills)?;
    let summary = driver.run(source)?;

    let accumulated = driver.into_grid();
    let mut grids = Vec::with_capacity(specs.len());
    let mut fill_counts = Vec::with_capacity(specs.len());
    for (chan, spec) in specs.iter().enumerate() {
        let (image, fill_count) = finalize_as(
            spec.grid_type,
            accumulated.accum(chan).view(),
            accumulated.weights().view(),
            params.weight_sum_min(),
            params.maximum_weight_mode,
            spec.grid_fill,
        )?;
        info!("Channel {}: {} fill cells", chan, fill_count);
        grids.push(image);
        fill_counts.push(fill_count);
    }

    Ok(ResampleOutput {
        grids,
        fill_counts,
        summary,
    })
}

/// Resample whole-swath arrays held in memory.
///
/// `u`, `v` and every channel are `(scans * rows_per_scan, swath_cols)`, channel values
/// already widened to f32. `specs` gives each channel's fill and output type.
pub fn resample_arrays(
    u: &Array2<f32>,
    v: &Array2<f32>,
    channels: &[Array2<f32>],
    specs: &[ChannelSpec],
    rows_per_scan: usize,
    grid: GridShape,
    params: &EwaParams,
) -> Result<ResampleOutput> {
    if channels.len() != specs.len() {
        return Err(Error::Config(format!(
            "{} channels but {} channel specs",
            channels.len(),
            specs.len()
        )));
    }
    if rows_per_scan == 0 {
        return Err(Error::invalid("swath_rows_per_scan", rows_per_scan));
    }
    for spec in specs {
        spec.validate()?;
    }

    let mut source = ArraySwath::new(u, v, channels, rows_per_scan)?
        .with_scan_offsets(params.colrow_scan_first, params.chan_scan_first);
    let swath = SwathShape {
        cols: u.ncols(),
        scans: source.available_scans(),
        rows_per_scan,
    };
    run_and_finalize(&mut source, swath, grid, specs, params)
}

/// Resample raw swath files and write one raw grid file per channel.
pub fn resample_files(job: &ResampleJob) -> Result<ResampleOutput> {
    if job.channels.is_empty() {
        return Err(Error::Config("at least one channel is required".into()));
    }
    job.params.validate()?;
    job.swath.validate()?;
    job.grid.validate()?;
    for chan in &job.channels {
        chan.spec.validate()?;
    }

    let inputs: Vec<(PathBuf, _)> = job
        .channels
        .iter()
        .map(|c| (c.input.clone(), c.spec.swath_type))
        .collect();
    let mut source = RawSwathFiles::open(
        &job.col_file,
        &job.row_file,
        &inputs,
        &job.swath,
        job.params.colrow_scan_first,
        job.params.chan_scan_first,
    )?;

    let specs: Vec<ChannelSpec> = job.channels.iter().map(|c| c.spec).collect();
    let output = run_and_finalize(&mut source, job.swath, job.grid, &specs, &job.params)?;

    for (chan, image) in job.channels.iter().zip(&output.grids) {
        write_grid(&chan.output, image)?;
        info!("Wrote grid: {:?}", chan.output);
    }
    Ok(output)
}
