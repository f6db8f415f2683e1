use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Expected {chan_count} --grid-file values (one per --chan-file), got {got}")]
    GridFileCount { chan_count: usize, got: usize },

    #[error(transparent)]
    Library(#[from] swathgrid::Error),
}
