//! Command Line Interface (CLI) layer for swathgrid.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for a file-to-file resampling run.
//! It wires user-provided options to the library API exposed via `swathgrid::api`.
//!
//! If you are embedding swathgrid into another application, prefer using
//! the high-level `swathgrid::api` module instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
