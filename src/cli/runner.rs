use tracing::info;
use tracing_subscriber::EnvFilter;

use swathgrid::core::params::broadcast;
use swathgrid::{
    ChannelJob, ChannelSpec, DataType, EwaParams, GridShape, ResampleJob, SwathShape,
    resample_files,
};

use super::args::CliArgs;
use super::errors::AppError;

/// Swath channel type when `--swath-type` is not given
const DEFAULT_SWATH_TYPE: DataType = DataType::U1;

fn build_params(args: &CliArgs) -> Result<EwaParams, AppError> {
    let mut params = match &args.config {
        Some(path) => {
            info!("Loading EWA parameters from {:?}", path);
            EwaParams::from_json_file(path)?
        }
        None => EwaParams::default(),
    };

    if let Some(v) = args.col_row_fill {
        params.col_row_fill = v;
    }
    if let Some(v) = args.weight_count {
        params.weight_count = v;
    }
    if let Some(v) = args.weight_min {
        params.weight_min = v;
    }
    if let Some(v) = args.weight_distance_max {
        params.weight_distance_max = v;
    }
    if let Some(v) = args.weight_delta_max {
        params.weight_delta_max = v;
    }
    if let Some(v) = args.weight_sum_min {
        params.weight_sum_min = Some(v);
    }
    if let Some(v) = args.maximum_weight_mode {
        params.maximum_weight_mode = v;
    }
    if let Some(v) = args.grid_col_start {
        params.grid_col_start = v;
    }
    if let Some(v) = args.grid_row_start {
        params.grid_row_start = v;
    }
    if let Some(v) = args.chan_scan_first {
        params.chan_scan_first = v;
    }
    if let Some(v) = args.colrow_scan_first {
        params.colrow_scan_first = v;
    }

    params.validate()?;
    Ok(params)
}

fn build_job(args: &CliArgs) -> Result<ResampleJob, AppError> {
    let chan_count = args.chan_files.len();
    if args.grid_files.len() != chan_count {
        return Err(AppError::GridFileCount {
            chan_count,
            got: args.grid_files.len(),
        });
    }

    let swath_types = broadcast("--swath-type", &args.swath_types, DEFAULT_SWATH_TYPE, chan_count)?;
    let swath_fills = broadcast("--swath-fill", &args.swath_fills, 0.0, chan_count)?;
    let grid_types: Vec<Option<DataType>> = broadcast(
        "--grid-type",
        &args.grid_types.iter().copied().map(Some).collect::<Vec<_>>(),
        None,
        chan_count,
    )?;
    let grid_fills: Vec<Option<f64>> = broadcast(
        "--grid-fill",
        &args.grid_fills.iter().copied().map(Some).collect::<Vec<_>>(),
        None,
        chan_count,
    )?;

    let channels = (0..chan_count)
        .map(|i| {
            let spec = ChannelSpec::new(swath_types[i], swath_fills[i]).with_grid(
                grid_types[i].unwrap_or(swath_types[i]),
                grid_fills[i].unwrap_or(swath_fills[i]),
            );
            ChannelJob {
                input: args.chan_files[i].clone(),
                output: args.grid_files[i].clone(),
                spec,
            }
        })
        .collect();

    Ok(ResampleJob {
        swath: SwathShape {
            cols: args.swath_cols,
            scans: args.swath_scans,
            rows_per_scan: args.rows_per_scan,
        },
        grid: GridShape {
            cols: args.grid_cols,
            rows: args.grid_rows,
        },
        params: build_params(args)?,
        col_file: args.col_file.clone(),
        row_file: args.row_file.clone(),
        channels,
    })
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let job = build_job(&args)?;
    for (i, chan) in job.channels.iter().enumerate() {
        info!(
            "Channel {}: {:?} ({}, fill {}) -> {:?} ({}, fill {})",
            i,
            chan.input,
            chan.spec.swath_type,
            chan.spec.swath_fill,
            chan.output,
            chan.spec.grid_type,
            chan.spec.grid_fill
        );
    }

    let output = resample_files(&job)?;

    if let Some(path) = &args.report {
        job.report(&output).write(path)?;
    }

    for (i, count) in output.fill_counts.iter().enumerate() {
        info!("Channel {}: {} of {} grid cells are fill", i, count, job.grid.cols * job.grid.rows);
    }
    info!("Successfully resampled {} channel(s)", job.channels.len());
    Ok(())
}
