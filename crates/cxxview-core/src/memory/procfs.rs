//! Live process reads through procfs.

use std::fs::File;
use std::os::unix::fs::FileExt;

use tracing::{debug, trace};

use super::image::architecture_of_image;
use crate::error::{FormatterError, FormatterResult};
use crate::host::Process;
use crate::types::{Address, ArchitectureProfile};

/// Bytes fetched per `pread` of `/proc/<pid>/mem`
const READ_CHUNK: usize = 4096;

/// Reads the memory of a running (ideally stopped) Linux process
///
/// Uses `/proc/<pid>/mem`, which needs the same permissions as `ptrace`
/// attach: the caller must be the tracer, or `kernel.yama.ptrace_scope` must
/// allow access. The architecture is taken from `/proc/<pid>/exe`, not from
/// the host, so a 32-bit process is decoded with 4-byte pointers.
#[derive(Debug)]
pub struct ProcMemory
{
    pid: u32,
    mem: File,
    arch: ArchitectureProfile,
}

impl ProcMemory
{
    /// Open the memory of process `pid`
    ///
    /// ## Errors
    ///
    /// - `Io`: the process does not exist or access is denied
    /// - `ObjectParse`: the executable image cannot be parsed
    pub fn open(pid: u32) -> FormatterResult<Self>
    {
        let mem = File::open(format!("/proc/{pid}/mem"))?;
        let exe = std::fs::read(format!("/proc/{pid}/exe"))?;
        let arch = architecture_of_image(&exe)?;
        debug!(pid, %arch, "opened process memory");
        Ok(Self { pid, mem, arch })
    }

    /// Process being read
    pub fn pid(&self) -> u32
    {
        self.pid
    }
}

impl Process for ProcMemory
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
        trace!(pid = self.pid, %address, len, "procfs read");

        let mut output = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];
        let mut cursor = address.value();
        while output.len() < len {
            let want = (len - output.len()).min(READ_CHUNK);
            self.mem
                .read_exact_at(&mut chunk[..want], cursor)
                .map_err(|err| FormatterError::ReadFailed {
                    address: address.value(),
                    len,
                    reason: format!("at 0x{cursor:x}: {err}"),
                })?;
            output.extend_from_slice(&chunk[..want]);
            cursor += want as u64;
        }
        Ok(output)
    }
}
