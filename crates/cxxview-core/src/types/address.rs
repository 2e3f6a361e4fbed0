//! Target address type and address classification.

use std::fmt;
use std::ops::Add;

/// Strongly typed address in the *target* address space
///
/// The target may be a 32-bit process inspected from a 64-bit host, so the
/// value is always stored as `u64` and never converted to a host pointer.
///
/// Two values are reserved:
///
/// - [`Address::ZERO`]: the null pointer. An iterator at `end()` or a
///   default-constructed one holds it.
/// - [`Address::INVALID`]: "could not be determined". Hosts return it when a
///   value has no location at all.
///
/// Both mean "nothing to decode here" to the formatters; see
/// [`Address::is_resolved`].
///
/// ## Example
///
/// ```rust
/// use cxxview_core::types::Address;
///
/// let node = Address::from(0x1000);
/// let pair = node + 32; // 64-bit red-black tree header
/// assert_eq!(pair.value(), 0x1020);
/// assert!(pair.is_resolved());
/// assert!(!Address::INVALID.is_resolved());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    pub const ZERO: Self = Address(0);

    /// Sentinel for "no address could be determined"
    pub const INVALID: Self = Address(u64::MAX);

    /// Create a new address from a `u64` value
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Get the raw `u64` value of this address
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Is this the null pointer?
    pub const fn is_null(self) -> bool
    {
        self.0 == 0
    }

    /// Is this something other than the invalid sentinel?
    pub const fn is_valid(self) -> bool
    {
        self.0 != u64::MAX
    }

    /// Neither null nor the invalid sentinel
    ///
    /// Only resolved addresses are ever dereferenced.
    pub const fn is_resolved(self) -> bool
    {
        !self.is_null() && self.is_valid()
    }

    /// Add an offset to this address, checking for overflow
    ///
    /// Landing exactly on the invalid sentinel also counts as overflow.
    ///
    /// ```rust
    /// use cxxview_core::types::Address;
    ///
    /// let addr = Address::from(0x1000);
    /// assert_eq!(addr.checked_add(0x100), Some(Address::from(0x1100)));
    /// assert_eq!(addr.checked_add(u64::MAX), None);
    /// ```
    pub fn checked_add(self, offset: u64) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address).filter(|addr| addr.is_valid())
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        if self.is_valid() {
            write!(f, "0x{:x}", self.0)
        } else {
            f.write_str("<invalid>")
        }
    }
}

impl fmt::LowerHex for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl Add<u64> for Address
{
    type Output = Address;

    fn add(self, rhs: u64) -> Self::Output
    {
        Address(self.0.wrapping_add(rhs))
    }
}

/// Where a value's address points
///
/// Only [`AddressType::Load`] addresses can be read through a process. The
/// others describe values the formatters must not dereference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressType
{
    /// No usable location
    #[default]
    Invalid,
    /// An offset inside an object file that is not loaded anywhere
    File,
    /// An address in the target process (live or captured)
    Load,
    /// The value lives in the debugger's own memory
    Host,
}

impl AddressType
{
    /// Can the target's memory model satisfy reads at this kind of address?
    pub const fn is_addressable(self) -> bool
    {
        matches!(self, AddressType::Load)
    }
}

impl fmt::Display for AddressType
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let name = match self {
            AddressType::Invalid => "invalid",
            AddressType::File => "file",
            AddressType::Load => "load",
            AddressType::Host => "host",
        };
        f.write_str(name)
    }
}
