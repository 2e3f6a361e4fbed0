//! Common module for library exports

pub use crate::error::{FormatterError, FormatterResult};
pub use crate::formatters::{
    string_summary, wstring_summary, FormatterRegistry, MapIteratorFrontEnd, SummaryKind, SummaryOptions,
    SyntheticChildren, SyntheticFrontEnd, SyntheticKind, VectorIteratorFrontEnd,
};
pub use crate::host::{CompilerType, ExecutionContext, Process, ProcessRef, TypeRef, ValueObject, ValueRef};
pub use crate::types::{Address, AddressType, ArchitectureProfile, ByteOrder};
