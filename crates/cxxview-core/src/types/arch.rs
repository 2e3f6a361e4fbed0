//! Target architecture profile.
//!
//! Every place where decoding depends on the target rather than on the host
//! goes through [`ArchitectureProfile`]: pointer width, the libstdc++
//! red-black tree node header size, the width of `wchar_t` and byte order.

use std::fmt;

use crate::error::{FormatterError, FormatterResult};
use crate::formatters::string_printer::StringElementType;
use crate::types::Address;

/// Size of `std::_Rb_tree_color`, the enum at the start of every tree node.
const RB_TREE_COLOR_SIZE: u64 = 4;

/// Pointers stored after the color tag: `_M_parent`, `_M_left`, `_M_right`.
const RB_TREE_LINK_COUNT: u64 = 3;

/// Byte order of integers in target memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ByteOrder
{
    /// Least significant byte first (x86, x86-64, most AArch64 targets)
    #[default]
    Little,
    /// Most significant byte first (s390x, some PowerPC and MIPS targets)
    Big,
}

/// Address width, `wchar_t` width and byte order of the process under inspection
///
/// These come from the *target*: a 64-bit debugger inspecting a 32-bit core
/// file must decode with 4-byte pointers. Formatters ask the process for a
/// fresh profile on every refresh, so a value that moves to another process
/// is decoded with that process's profile.
///
/// ## Example
///
/// ```rust
/// use cxxview_core::types::ArchitectureProfile;
///
/// let lp64 = ArchitectureProfile::lp64();
/// assert_eq!(lp64.pointer_size(), 8);
/// assert_eq!(lp64.rb_tree_node_header_size(), 32);
///
/// let ilp32 = ArchitectureProfile::ilp32();
/// assert_eq!(ilp32.rb_tree_node_header_size(), 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArchitectureProfile
{
    address_byte_size: u8,
    wchar_bit_size: Option<u32>,
    byte_order: ByteOrder,
}

impl ArchitectureProfile
{
    /// Create a profile with the given address width
    ///
    /// `wchar_t` starts out unreported; set it with
    /// [`ArchitectureProfile::with_wchar_bit_size`].
    ///
    /// ## Errors
    ///
    /// `UnsupportedAddressWidth` unless `address_byte_size` is 4 or 8.
    pub fn new(address_byte_size: u8, byte_order: ByteOrder) -> FormatterResult<Self>
    {
        match address_byte_size {
            4 | 8 => Ok(Self {
                address_byte_size,
                wchar_bit_size: None,
                byte_order,
            }),
            other => Err(FormatterError::UnsupportedAddressWidth(other)),
        }
    }

    /// 64-bit Unix-like target: 8-byte pointers, 32-bit `wchar_t`, little endian
    #[must_use]
    pub const fn lp64() -> Self
    {
        Self {
            address_byte_size: 8,
            wchar_bit_size: Some(32),
            byte_order: ByteOrder::Little,
        }
    }

    /// 32-bit Unix-like target: 4-byte pointers, 32-bit `wchar_t`, little endian
    #[must_use]
    pub const fn ilp32() -> Self
    {
        Self {
            address_byte_size: 4,
            wchar_bit_size: Some(32),
            byte_order: ByteOrder::Little,
        }
    }

    /// 64-bit Windows target (MinGW libstdc++): 8-byte pointers, 16-bit `wchar_t`
    #[must_use]
    pub const fn llp64() -> Self
    {
        Self {
            address_byte_size: 8,
            wchar_bit_size: Some(16),
            byte_order: ByteOrder::Little,
        }
    }

    /// Replace the reported `wchar_t` width (`None` when the target has no such type)
    #[must_use]
    pub const fn with_wchar_bit_size(mut self, bits: Option<u32>) -> Self
    {
        self.wchar_bit_size = bits;
        self
    }

    /// Replace the byte order
    #[must_use]
    pub const fn with_byte_order(mut self, byte_order: ByteOrder) -> Self
    {
        self.byte_order = byte_order;
        self
    }

    /// Address width in bytes (4 or 8)
    pub const fn address_byte_size(&self) -> u8
    {
        self.address_byte_size
    }

    /// Address width in bytes, widened for offset arithmetic
    pub const fn pointer_size(&self) -> u64
    {
        self.address_byte_size as u64
    }

    /// Reported width of `wchar_t` in bits, if any
    pub const fn wchar_bit_size(&self) -> Option<u32>
    {
        self.wchar_bit_size
    }

    /// Byte order of the target
    pub const fn byte_order(&self) -> ByteOrder
    {
        self.byte_order
    }

    /// Offset from a `_Rb_tree_node_base` to the value stored in the node
    ///
    /// The header is the color tag padded to pointer alignment followed by
    /// three links, so 16 bytes on 32-bit targets and 32 bytes on 64-bit ones.
    pub const fn rb_tree_node_header_size(&self) -> u64
    {
        let ptr = self.pointer_size();
        let color = RB_TREE_COLOR_SIZE.div_ceil(ptr) * ptr;
        color + RB_TREE_LINK_COUNT * ptr
    }

    /// Decoding used for `wchar_t` strings on this target
    ///
    /// Returns `None` for widths other than 8, 16 and 32 bits, or when the
    /// target does not report a width.
    pub const fn wide_string_element_type(&self) -> Option<StringElementType>
    {
        match self.wchar_bit_size {
            Some(8) => Some(StringElementType::Utf8),
            Some(16) => Some(StringElementType::Utf16),
            Some(32) => Some(StringElementType::Utf32),
            _ => None,
        }
    }

    /// Decode an unsigned integer of 1 to 8 bytes in target byte order
    ///
    /// Returns `None` for an empty slice or one longer than 8 bytes.
    pub fn decode_unsigned(&self, bytes: &[u8]) -> Option<u64>
    {
        let len = bytes.len();
        if len == 0 || len > 8 {
            return None;
        }

        let mut buf = [0u8; 8];
        match self.byte_order {
            ByteOrder::Little => {
                buf[..len].copy_from_slice(bytes);
                Some(u64::from_le_bytes(buf))
            }
            ByteOrder::Big => {
                buf[8 - len..].copy_from_slice(bytes);
                Some(u64::from_be_bytes(buf))
            }
        }
    }

    /// Decode a pointer-sized integer as an address
    pub fn decode_address(&self, bytes: &[u8]) -> Option<Address>
    {
        if bytes.len() != self.address_byte_size as usize {
            return None;
        }
        self.decode_unsigned(bytes).map(Address::new)
    }
}

impl Default for ArchitectureProfile
{
    fn default() -> Self
    {
        Self::lp64()
    }
}

impl fmt::Display for ArchitectureProfile
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let order = match self.byte_order {
            ByteOrder::Little => "little-endian",
            ByteOrder::Big => "big-endian",
        };
        write!(f, "{}-bit {order}", u32::from(self.address_byte_size) * 8)?;
        match self.wchar_bit_size {
            Some(bits) => write!(f, ", wchar_t = {bits} bits"),
            None => write!(f, ", wchar_t unknown"),
        }
    }
}
