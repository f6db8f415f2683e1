use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::driver::ScanSummary;
use crate::core::params::{ChannelSpec, EwaParams, GridShape, SwathShape};
use crate::error::Result;

/// Per-channel outcome recorded in the run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelReport {
    pub index: usize,
    pub output: Option<PathBuf>,
    #[serde(flatten)]
    pub spec: ChannelSpec,
    pub fill_count: usize,
}

/// JSON sidecar describing one resampling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub created: String,
    pub tool: String,
    pub swath: SwathShape,
    pub grid: GridShape,
    pub params: EwaParams,
    pub channels: Vec<ChannelReport>,
    pub scans: ScanSummary,
}

impl RunReport {
    pub fn new(
        swath: SwathShape,
        grid: GridShape,
        params: EwaParams,
        channels: Vec<ChannelReport>,
        scans: ScanSummary,
    ) -> Self {
        Self {
            created: chrono::Utc::now().to_rfc3339(),
            tool: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            swath,
            grid,
            params,
            channels,
            scans,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        info!("Wrote run report: {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataType;

    #[test]
    fn report_serializes_diagnostics() {
        let report = RunReport::new(
            SwathShape {
                cols: 10,
                scans: 4,
                rows_per_scan: 2,
            },
            GridShape { cols: 5, rows: 5 },
            EwaParams::default(),
            vec![ChannelReport {
                index: 0,
                output: None,
                spec: ChannelSpec::new(DataType::U2, 0.0),
                fill_count: 17,
            }],
            ScanSummary {
                scans_processed: 4,
                first_scan_with_data: Some(1),
                last_scan_with_data: Some(2),
                recommended: None,
            },
        );

        let json: serde_json::Value =
            serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["channels"][0]["fill_count"], 17);
        assert_eq!(json["channels"][0]["swath_type"], "u2");
        assert_eq!(json["scans"]["first_scan_with_data"], 1);
        assert_eq!(json["params"]["weight_count"], 10000);
        assert!(chrono::DateTime::parse_from_rfc3339(&report.created).is_ok());
    }
}
