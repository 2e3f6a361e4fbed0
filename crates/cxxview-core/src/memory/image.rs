//! Architecture detection from executable images.

use object::{BinaryFormat, Object};
use tracing::debug;

use crate::error::FormatterResult;
use crate::types::{ArchitectureProfile, ByteOrder};

/// Derive the [`ArchitectureProfile`] of the program contained in `data`
///
/// Address width and byte order come from the image header. `wchar_t` is 16
/// bits for PE/COFF images (Windows ABI) and 32 bits everywhere else.
///
/// ## Errors
///
/// `ObjectParse` if `data` is not a recognized ELF, Mach-O, PE or COFF image.
pub fn architecture_of_image(data: &[u8]) -> FormatterResult<ArchitectureProfile>
{
    let file = object::File::parse(data)?;

    let address_byte_size = if file.is_64() { 8 } else { 4 };
    let byte_order = if file.is_little_endian() {
        ByteOrder::Little
    } else {
        ByteOrder::Big
    };
    let wchar_bits = match file.format() {
        BinaryFormat::Pe | BinaryFormat::Coff => 16,
        _ => 32,
    };

    let arch = ArchitectureProfile::new(address_byte_size, byte_order)?.with_wchar_bit_size(Some(wchar_bits));
    debug!(format = ?file.format(), %arch, "derived target architecture");
    Ok(arch)
}
