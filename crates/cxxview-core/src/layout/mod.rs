//! # Reference Host
//!
//! A small, self-contained implementation of the host interfaces, used by the
//! `cxxview` CLI and by the tests. Types are described explicitly with
//! [`TypeLayout`] instead of being read from debug info, and values are
//! [`MemoryValue`]s read through any [`Process`](crate::host::Process).
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use cxxview_core::host::{TypeRef, ValueObject};
//! use cxxview_core::layout::{MemoryContext, TypeLayout};
//! use cxxview_core::memory::MemorySnapshot;
//! use cxxview_core::types::{Address, ArchitectureProfile};
//!
//! let arch = ArchitectureProfile::lp64();
//! let mut snapshot = MemorySnapshot::new(arch);
//! snapshot.add_region(Address::new(0x1000), 7u32.to_le_bytes().to_vec())?;
//!
//! let context = MemoryContext::new(Rc::new(snapshot));
//! let int: TypeRef = Rc::new(TypeLayout::primitive("int", &arch).unwrap());
//! let value = context.value("x", int, Address::new(0x1000));
//! assert_eq!(value.value_as_unsigned(), Some(7));
//! # Ok::<(), cxxview_core::error::FormatterError>(())
//! ```

pub mod libstdcpp;
pub mod types;
pub mod value;

pub use types::{LayoutKind, TypeLayout};
pub use value::{scalar_display, MemoryContext, MemoryValue};
