//! Read accounting for any memory source.

use std::cell::RefCell;

use crate::error::FormatterResult;
use crate::host::{Process, ProcessRef};
use crate::types::{Address, ArchitectureProfile};

/// One read forwarded to the wrapped process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRecord
{
    /// Start of the requested range
    pub address: Address,
    /// Bytes requested
    pub len: usize,
    /// Whether the wrapped source satisfied the read
    pub ok: bool,
}

/// Wraps a [`Process`] and remembers every read issued through it
///
/// Formatters are expected to keep their remote footprint small (a string
/// summary costs two pointer reads and one payload read). The recorder makes
/// that footprint observable, both in tests and in the CLI's `--trace-reads`
/// output.
pub struct ReadRecorder
{
    inner: ProcessRef,
    reads: RefCell<Vec<ReadRecord>>,
}

impl ReadRecorder
{
    /// Start recording reads against `inner`
    pub fn new(inner: ProcessRef) -> Self
    {
        Self {
            inner,
            reads: RefCell::new(Vec::new()),
        }
    }

    /// Reads issued so far, oldest first
    pub fn reads(&self) -> Vec<ReadRecord>
    {
        self.reads.borrow().clone()
    }

    /// Forget all recorded reads
    pub fn clear(&self)
    {
        self.reads.borrow_mut().clear();
    }
}

impl Process for ReadRecorder
{
    fn architecture(&self) -> ArchitectureProfile
    {
        self.inner.architecture()
    }

    fn read_memory(&self, address: Address, len: usize) -> FormatterResult<Vec<u8>>
    {
        let result = self.inner.read_memory(address, len);
        self.reads.borrow_mut().push(ReadRecord {
            address,
            len,
            ok: result.is_ok(),
        });
        result
    }
}
