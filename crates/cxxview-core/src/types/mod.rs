//! # Types
//!
//! Target-independent vocabulary shared by the formatters and the memory
//! sources: addresses in the target's address space, how those addresses are
//! classified, and the architecture profile that drives every
//! width-dependent decision.

pub mod address;
pub mod arch;

// Re-export all public types
pub use address::{Address, AddressType};
pub use arch::{ArchitectureProfile, ByteOrder};
