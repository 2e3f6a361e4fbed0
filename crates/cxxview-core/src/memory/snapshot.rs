//! Captured memory image.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, trace};

use crate::error::{FormatterError, FormatterResult};
use crate::host::Process;
use crate::types::{Address, ArchitectureProfile};

/// Post-mortem view of a process: a set of non-overlapping byte regions
///
/// Reads are satisfied only when every byte of the requested range falls
/// inside a region; adjacent regions are stitched together. Nothing is ever
/// written back.
///
/// ## Example
///
/// ```rust
/// use cxxview_core::host::Process;
/// use cxxview_core::memory::MemorySnapshot;
/// use cxxview_core::types::{Address, ArchitectureProfile};
///
/// let mut snapshot = MemorySnapshot::new(ArchitectureProfile::lp64());
/// snapshot.add_region(Address::new(0x1000), vec![0x10, 0x20, 0, 0, 0, 0, 0, 0])?;
///
/// assert_eq!(snapshot.read_pointer(Address::new(0x1000))?, Address::new(0x2010));
/// assert!(snapshot.read_memory(Address::new(0x1004), 8).is_err());
/// # Ok::<(), cxxview_core::error::FormatterError>(())
/// ```
#[derive(Debug, Clone)]
pub struct MemorySnapshot
{
    arch: ArchitectureProfile,
    regions: BTreeMap<u64, Vec<u8>>,
}

impl MemorySnapshot
{
    /// Create an empty snapshot for a target with the given profile
    pub fn new(arch: ArchitectureProfile) -> Self
    {
        Self {
            arch,
            regions: BTreeMap::new(),
        }
    }

    /// Load a raw dump file as a single region starting at `base`
    ///
    /// ## Errors
    ///
    /// - `Io`: the file cannot be read
    /// - `InvalidArgument`: the region would wrap around the address space
    pub fn from_dump_file(path: impl AsRef<Path>, base: Address, arch: ArchitectureProfile) -> FormatterResult<Self>
    {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        debug!(path = %path.display(), %base, len = bytes.len(), "loaded memory dump");

        let mut snapshot = Self::new(arch);
        snapshot.add_region(base, bytes)?;
        Ok(snapshot)
    }

    /// Add the bytes captured at `base`
    ///
    /// ## Errors
    ///
    /// `InvalidArgument` if the region is empty, wraps around the address
    /// space, or overlaps a region already present.
    pub fn add_region(&mut self, base: Address, bytes: Vec<u8>) -> FormatterResult<()>
    {
        if bytes.is_empty() {
            return Err(FormatterError::InvalidArgument(format!("empty region at {base}")));
        }
        let start = base.value();
        let end = base
            .checked_add(bytes.len() as u64)
            .ok_or_else(|| FormatterError::InvalidArgument(format!("region at {base} wraps the address space")))?
            .value();

        let overlaps_previous = self
            .regions
            .range(..=start)
            .next_back()
            .is_some_and(|(prev, data)| prev + data.len() as u64 > start);
        let overlaps_next = self.regions.range(start..end).next().is_some();
        if overlaps_previous || overlaps_next {
            return Err(FormatterError::InvalidArgument(format!("region at {base} overlaps an existing region")));
        }

        self.regions.insert(start, bytes);
        Ok(())
    }

    /// Iterate over `(base, bytes)` pairs in address order
    pub fn regions(&self) -> impl Iterator<Item = (Address, &[u8])>
    {
        self.regions.iter().map(|(base, bytes)| (Address::new(*base), bytes.as_slice()))
    }

    /// Total number of captured bytes
    pub fn len(&self) -> usize
    {
        self.regions.values().map(Vec::len).sum()
    }

    /// Does the snapshot hold no bytes at all?
    pub fn is_empty(&self) -> bool
    {
        self.regions.is_empty()
    }

    fn region_containing(&self, address: u64) -> Option<(u64, &[u8])>
    {
        self.regions
            .range(..=address)
            .next_back()
            .filter(|(base, bytes)| address - **base < bytes.len() as u64)
            .map(|(base, bytes)| (*base, bytes.as_slice()))
    }
}

impl Process for MemorySnapshot
{
    fn architecture(&self) -> ArchitectureProfile
    {
        self.arch
    }

    fn read_memory(&self, address: Address, len: usize) -> FormatterResult<Vec<u8>>
    {
        if !address.is_valid() || address.checked_add(len as u64).is_none() {
            return Err(FormatterError::InvalidAddress(address.value()));
        }
        trace!(%address, len, "snapshot read");

        // Holds only captured bytes; `len` never sizes the allocation
        let mut output = Vec::new();
        let mut cursor = address.value();
        while output.len() < len {
            let Some((base, bytes)) = self.region_containing(cursor) else {
                return Err(FormatterError::ReadFailed {
                    address: address.value(),
                    len,
                    reason: format!("0x{cursor:x} is not captured"),
                });
            };
            // Lossless: the cursor lies inside a region held in memory
            let offset = (cursor - base) as usize;
            let chunk = (len - output.len()).min(bytes.len() - offset);
            output.extend_from_slice(&bytes[offset..offset + chunk]);
            cursor += chunk as u64;
        }
        Ok(output)
    }
}
