//! # Memory Sources
//!
//! Implementations of [`Process`](crate::host::Process) that the CLI and the
//! tests use:
//!
//! - [`MemorySnapshot`]: regions of a captured image (core dumps, raw dumps)
//! - [`ProcMemory`]: a live Linux process through `/proc/<pid>/mem`
//! - [`ReadRecorder`]: wraps any source and records the reads issued
//!
//! Every source is read-only. Nothing in this crate writes target memory.

pub mod image;
#[cfg(target_os = "linux")]
pub mod procfs;
pub mod recorder;
pub mod snapshot;

pub use image::architecture_of_image;
#[cfg(target_os = "linux")]
pub use procfs::ProcMemory;
pub use recorder::{ReadRecord, ReadRecorder};
pub use snapshot::MemorySnapshot;
