use clap::Parser;
use std::path::PathBuf;

use swathgrid::DataType;

#[derive(Parser)]
#[command(
    name = "swathgrid",
    version,
    about = "Resample swath data onto a grid by elliptical weighted averaging"
)]
pub struct CliArgs {
    /// Number of columns in each swath file
    #[arg(long)]
    pub swath_cols: usize,

    /// Number of scans to process
    #[arg(long)]
    pub swath_scans: usize,

    /// Number of swath rows in each scan (at least 2)
    #[arg(long)]
    pub rows_per_scan: usize,

    /// Swath file of grid column coordinates (4-byte floats)
    #[arg(long)]
    pub col_file: PathBuf,

    /// Swath file of grid row coordinates (4-byte floats)
    #[arg(long)]
    pub row_file: PathBuf,

    /// Swath channel file; repeat once per channel
    #[arg(long = "chan-file", required = true)]
    pub chan_files: Vec<PathBuf>,

    /// Number of columns in the output grid
    #[arg(long)]
    pub grid_cols: usize,

    /// Number of rows in the output grid
    #[arg(long)]
    pub grid_rows: usize,

    /// Output grid file; repeat once per channel, in channel order
    #[arg(long = "grid-file", required = true)]
    pub grid_files: Vec<PathBuf>,

    /// Swath channel data type (u1, u2, s2, u4, s4, f4, f8); one for all or one per channel
    #[arg(long = "swath-type", value_enum)]
    pub swath_types: Vec<DataType>,

    /// Swath channel fill value; one for all or one per channel
    #[arg(long = "swath-fill", allow_negative_numbers = true)]
    pub swath_fills: Vec<f64>,

    /// Output grid data type; defaults to the swath type of each channel
    #[arg(long = "grid-type", value_enum)]
    pub grid_types: Vec<DataType>,

    /// Output grid fill value; defaults to the swath fill of each channel
    #[arg(long = "grid-fill", allow_negative_numbers = true)]
    pub grid_fills: Vec<f64>,

    /// JSON file with EWA parameters; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Fill value marking invalid coordinates in the col/row files
    #[arg(long, allow_negative_numbers = true)]
    pub col_row_fill: Option<f32>,

    /// Number of entries in the weight table
    #[arg(long)]
    pub weight_count: Option<usize>,

    /// Weight at the edge of the footprint
    #[arg(long)]
    pub weight_min: Option<f64>,

    /// Footprint radius in units of swath spacing
    #[arg(long)]
    pub weight_distance_max: Option<f64>,

    /// Maximum footprint half-width in grid cells
    #[arg(long)]
    pub weight_delta_max: Option<f64>,

    /// Minimum weight sum for a valid output cell (defaults to --weight-min)
    #[arg(long)]
    pub weight_sum_min: Option<f64>,

    /// Keep the highest-weight sample per cell instead of averaging (for coded data);
    /// `--maximum-weight-mode false` turns off a mode set by --config
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub maximum_weight_mode: Option<bool>,

    /// Grid column of the first grid cell, subtracted from every column coordinate
    #[arg(long, allow_negative_numbers = true)]
    pub grid_col_start: Option<f32>,

    /// Grid row of the first grid cell, subtracted from every row coordinate
    #[arg(long, allow_negative_numbers = true)]
    pub grid_row_start: Option<f32>,

    /// First scan to read from the channel files
    #[arg(long)]
    pub chan_scan_first: Option<usize>,

    /// First scan to read from the col/row files
    #[arg(long)]
    pub colrow_scan_first: Option<usize>,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,
}
