use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::DataType;

/// EWA weighting and run parameters, suitable for JSON config files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EwaParams {
    /// Number of entries in the weight lookup table
    pub weight_count: usize,
    /// Weight at the footprint boundary
    pub weight_min: f64,
    /// Footprint radius in units of the local swath spacing
    pub weight_distance_max: f64,
    /// Upper bound on the footprint bounding-box half-width, in grid cells
    pub weight_delta_max: f64,
    /// Minimum accumulated weight for an output cell to be valid; None means `weight_min`
    pub weight_sum_min: Option<f64>,
    /// Keep the highest-weight sample per cell instead of blending
    pub maximum_weight_mode: bool,
    /// Sentinel marking invalid geolocation in the col/row files
    pub col_row_fill: f32,
    /// Grid column subtracted from every swath column coordinate
    pub grid_col_start: f32,
    /// Grid row subtracted from every swath row coordinate
    pub grid_row_start: f32,
    /// First scan to read from the channel files
    pub chan_scan_first: usize,
    /// First scan to read from the col/row files
    pub colrow_scan_first: usize,
}

impl Default for EwaParams {
    fn default() -> Self {
        Self {
            weight_count: 10000,
            weight_min: 0.01,
            weight_distance_max: 1.0,
            weight_delta_max: 10.0,
            weight_sum_min: None,
            maximum_weight_mode: false,
            col_row_fill: -1e30,
            grid_col_start: 0.0,
            grid_row_start: 0.0,
            chan_scan_first: 0,
            colrow_scan_first: 0,
        }
    }
}

impl EwaParams {
    /// Load parameters from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let params: EwaParams = serde_json::from_str(&text)?;
        params.validate()?;
        Ok(params)
    }

    pub fn weight_sum_min(&self) -> f64 {
        self.weight_sum_min.unwrap_or(self.weight_min)
    }

    pub fn validate(&self) -> Result<()> {
        if self.weight_count < 2 {
            return Err(Error::invalid("weight_count", self.weight_count));
        }
        if !(self.weight_min > 0.0 && self.weight_min < 1.0) {
            return Err(Error::invalid("weight_min", self.weight_min));
        }
        if !(self.weight_distance_max > 0.0 && self.weight_distance_max.is_finite()) {
            return Err(Error::invalid(
                "weight_distance_max",
                self.weight_distance_max,
            ));
        }
        if !(self.weight_delta_max > 0.0) {
            return Err(Error::invalid("weight_delta_max", self.weight_delta_max));
        }
        if let Some(min) = self.weight_sum_min {
            if min.is_nan() || min < 0.0 {
                return Err(Error::invalid("weight_sum_min", min));
            }
        }
        Ok(())
    }
}

/// Swath geometry: fixed width, processed in scans of `rows_per_scan` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwathShape {
    pub cols: usize,
    pub scans: usize,
    pub rows_per_scan: usize,
}

impl SwathShape {
    pub fn validate(&self) -> Result<()> {
        // Need one interior column plus both edges for the finite differences.
        if self.cols < 3 {
            return Err(Error::invalid("swath_cols", self.cols));
        }
        if self.rows_per_scan < 2 {
            return Err(Error::invalid("swath_rows_per_scan", self.rows_per_scan));
        }
        if self.scans == 0 {
            return Err(Error::invalid("swath_scans", self.scans));
        }
        Ok(())
    }

    pub fn cells_per_scan(&self) -> usize {
        self.cols * self.rows_per_scan
    }
}

/// Output grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub cols: usize,
    pub rows: usize,
}

impl GridShape {
    pub fn validate(&self) -> Result<()> {
        if self.cols == 0 {
            return Err(Error::invalid("grid_cols", self.cols));
        }
        if self.rows == 0 {
            return Err(Error::invalid("grid_rows", self.rows));
        }
        Ok(())
    }
}

/// Per-channel element types and fill values for the swath input and grid output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelSpec {
    pub swath_type: DataType,
    pub swath_fill: f64,
    pub grid_type: DataType,
    pub grid_fill: f64,
}

impl ChannelSpec {
    /// Grid type and fill default to the swath type and fill.
    pub fn new(swath_type: DataType, swath_fill: f64) -> Self {
        Self {
            swath_type,
            swath_fill,
            grid_type: swath_type,
            grid_fill: swath_fill,
        }
    }

    pub fn with_grid(mut self, grid_type: DataType, grid_fill: f64) -> Self {
        self.grid_type = grid_type;
        self.grid_fill = grid_fill;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.swath_type.can_represent(self.swath_fill) {
            return Err(Error::Config(format!(
                "swath fill {} does not fit swath type {}",
                self.swath_fill, self.swath_type
            )));
        }
        if !self.grid_type.can_represent(self.grid_fill) {
            return Err(Error::Config(format!(
                "grid fill {} does not fit grid type {}",
                self.grid_fill, self.grid_type
            )));
        }
        Ok(())
    }
}

/// Expand a per-channel option list: one value applies to every channel, otherwise
/// exactly one value per channel is required.
pub fn broadcast<T: Clone>(
    arg: &'static str,
    values: &[T],
    default: T,
    chan_count: usize,
) -> Result<Vec<T>> {
    match values.len() {
        0 => Ok(vec![default; chan_count]),
        1 => Ok(vec![values[0].clone(); chan_count]),
        n if n == chan_count => Ok(values.to_vec()),
        n => Err(Error::Config(format!(
            "{} given {} values for {} channels",
            arg, n, chan_count
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let p = EwaParams::default();
        assert!(p.validate().is_ok());
        assert_eq!(p.weight_sum_min(), 0.01);
    }

    #[test]
    fn rejects_bad_weights() {
        let mut p = EwaParams::default();
        p.weight_count = 1;
        assert!(p.validate().is_err());

        let mut p = EwaParams::default();
        p.weight_min = 1.0;
        assert!(p.validate().is_err());

        let mut p = EwaParams::default();
        p.weight_distance_max = 0.0;
        assert!(p.validate().is_err());

        let mut p = EwaParams::default();
        p.weight_sum_min = Some(-0.5);
        assert!(p.validate().is_err());
    }

    #[test]
    fn swath_shape_needs_interior_column_and_two_rows() {
        let ok = SwathShape { cols: 3, scans: 1, rows_per_scan: 2 };
        assert!(ok.validate().is_ok());
        assert!(SwathShape { cols: 2, ..ok }.validate().is_err());
        assert!(SwathShape { rows_per_scan: 1, ..ok }.validate().is_err());
    }

    #[test]
    fn partial_json_takes_defaults() {
        let p: EwaParams =
            serde_json::from_str(r#"{ "weight_min": 0.05, "maximum_weight_mode": true }"#)
                .unwrap();
        assert_eq!(p.weight_min, 0.05);
        assert!(p.maximum_weight_mode);
        assert_eq!(p.weight_count, 10000);
        assert_eq!(p.weight_sum_min(), 0.05);
    }

    #[test]
    fn misspelled_json_key_is_rejected() {
        let err = serde_json::from_str::<EwaParams>(r#"{ "weight_mni": 0.05 }"#).unwrap_err();
        assert!(err.to_string().contains("weight_mni"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(&path, r#"{ "maximum_weight_mode": true, "weight_mni": 0.05 }"#).unwrap();
        assert!(matches!(EwaParams::from_json_file(&path), Err(Error::Json(_))));
    }

    #[test]
    fn channel_fill_must_fit_types() {
        assert!(ChannelSpec::new(DataType::U1, 0.0).validate().is_ok());
        assert!(ChannelSpec::new(DataType::U1, -1.0).validate().is_err());
        let spec = ChannelSpec::new(DataType::F4, -999.0).with_grid(DataType::U2, 65535.0);
        assert!(spec.validate().is_ok());
        assert!(spec.with_grid(DataType::U2, -999.0).validate().is_err());
    }

    #[test]
    fn broadcast_rules() {
        assert_eq!(broadcast("t", &[1], 0, 3).unwrap(), vec![1, 1, 1]);
        assert_eq!(broadcast("t", &[1, 2, 3], 0, 3).unwrap(), vec![1, 2, 3]);
        assert_eq!(broadcast::<i32>("t", &[], 9, 2).unwrap(), vec![9, 9]);
        assert!(broadcast("t", &[1, 2], 0, 3).is_err());
    }
}
