//! # Error Types
//!
//! Errors raised by the collaborators the formatters talk to: memory sources,
//! architecture probing and the reference host.
//!
//! The formatters themselves never surface these to the host. A failed read or
//! an unresolved field turns into "no children" or "no summary", and the error
//! is only logged. The variants below exist so memory sources can say *why* a
//! read failed.

use thiserror::Error;

/// Main error type for memory and layout operations
///
/// ## Error Categories
///
/// 1. **Read errors**: ReadFailed, InvalidAddress
/// 2. **Context errors**: NoProcess
/// 3. **Target errors**: UnsupportedAddressWidth, ObjectParse
/// 4. **Caller errors**: InvalidArgument, Output
/// 5. **I/O errors**: Io (for `/proc` and dump files)
#[derive(Error, Debug)]
pub enum FormatterError
{
    /// A remote read could not be satisfied
    ///
    /// This happens when:
    /// - The range is not mapped in the snapshot or the live process
    /// - The process exited or was detached between requests
    /// - The kernel refused the read (permissions, guard pages)
    #[error("Failed to read {len} bytes at 0x{address:x}: {reason}")]
    ReadFailed
    {
        /// Start of the requested range
        address: u64,
        /// Number of bytes requested
        len: usize,
        /// Why the read failed
        reason: String,
    },

    /// The address is the invalid sentinel or would overflow the address space
    #[error("Invalid address: 0x{0:x}")]
    InvalidAddress(u64),

    /// The value has no owning process (static data, expression results)
    #[error("No process is associated with the value")]
    NoProcess,

    /// The target reports an address size other than 4 or 8 bytes
    #[error("Unsupported address width: {0} bytes")]
    UnsupportedAddressWidth(u8),

    /// The target executable could not be parsed to derive its architecture
    #[error("Failed to parse target image: {0}")]
    ObjectParse(String),

    /// Invalid argument passed to a constructor or reader
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The output sink rejected the rendered summary
    #[error("Failed to write summary: {0}")]
    Output(#[from] std::fmt::Error),

    /// I/O error (dump files, `/proc/<pid>/mem`)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<object::Error> for FormatterError
{
    fn from(err: object::Error) -> Self
    {
        FormatterError::ObjectParse(err.to_string())
    }
}

/// Convenience type alias for `Result<T, FormatterError>`
///
/// ```rust
/// use cxxview_core::error::FormatterResult;
/// fn foo() -> FormatterResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type FormatterResult<T> = std::result::Result<T, FormatterError>;
