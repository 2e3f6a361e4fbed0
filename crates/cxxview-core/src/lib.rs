//! # cxxview-core
//!
//! Layout decoders that present GNU C++ standard library internals the way a
//! user thinks about them.
//!
//! This crate provides:
//! - Synthetic children for `std::map`/`std::set` iterators (the pointed-to pair)
//! - Synthetic children for `std::vector` iterators (the pointed-to element)
//! - Summaries for `std::string` and `std::wstring`
//! - A type-name registry that picks the right decoder for a value
//!
//! ## Host Integration
//!
//! The decoders do not own a type system or a process. A debugger plugs in
//! through the traits in [`host`]. For tools without a debugger behind them,
//! [`layout`] describes types by hand and [`memory`] reads captured dumps or
//! (on Linux) a live process.
//!
//! ## Example
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use cxxview_core::layout::{libstdcpp, MemoryContext};
//! use cxxview_core::memory::MemorySnapshot;
//! use cxxview_core::prelude::*;
//!
//! let arch = ArchitectureProfile::lp64();
//! let mut image = MemorySnapshot::new(arch);
//! let mut object = Vec::new();
//! object.extend_from_slice(&0x2000u64.to_le_bytes());
//! object.extend_from_slice(&5u64.to_le_bytes());
//! image.add_region(Address::new(0x1000), object).unwrap();
//! image.add_region(Address::new(0x2000), b"hello".to_vec()).unwrap();
//!
//! let context = MemoryContext::new(Rc::new(image));
//! let value = context.value("s", Rc::new(libstdcpp::string(&arch)), Address::new(0x1000));
//!
//! let mut out = String::new();
//! let registry = FormatterRegistry::libstdcpp();
//! assert_eq!(registry.summarize(&*value, &mut out, &SummaryOptions::default()), Some(true));
//! assert_eq!(out, "\"hello\"");
//! ```

pub mod error;
pub mod formatters;
pub mod host;
pub mod layout;
pub mod memory;
pub mod prelude;
pub mod types;

pub use error::{FormatterError, FormatterResult};
pub use formatters::{FormatterRegistry, SyntheticChildren, SyntheticFrontEnd};
pub use types::{Address, AddressType, ArchitectureProfile};
