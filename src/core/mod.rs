//! Core resampling building blocks: run parameters, the grid accumulator, the EWA
//! stages and the scan driver. These are consumed by the high-level `api` module.
pub mod driver;
pub mod ewa;
pub mod grid;
pub mod params;
