//! I/O layer: raw row-major binary swath readers and grid writers, an in-memory
//! scan source, and the JSON run report sidecar.
pub mod memory;
pub use memory::ArraySwath;

pub mod raw;
pub use raw::{RawScanReader, RawSwathFiles, read_array, write_array, write_grid};

pub mod report;
pub use report::{ChannelReport, RunReport};
