//! # Host Interfaces
//!
//! The formatters never own a type system or a process. The debugger hosting
//! them supplies both through the traits in this module:
//!
//! - [`CompilerType`]: a type descriptor that can resolve template arguments
//!   and pointee types.
//! - [`Process`]: byte-granular, read-only access to a live process or a
//!   captured image, plus the target's [`ArchitectureProfile`].
//! - [`ExecutionContext`]: the process a value belongs to, and the factory
//!   that turns an address and a type into a new value.
//! - [`ValueObject`]: one in-memory instance the user is looking at.
//!
//! A reference implementation of the value side lives in
//! [`crate::layout`], and two memory sources live in [`crate::memory`].
//!
//! ## Ownership
//!
//! Values and contexts are shared with `Rc`: everything here runs on the
//! host's UI thread, one request at a time. Formatters keep a `Weak` back
//! reference to the value they are bound to so that a decoder never keeps a
//! stale value alive.

use std::fmt;
use std::rc::Rc;

use crate::error::{FormatterError, FormatterResult};
use crate::types::{Address, AddressType, ArchitectureProfile};

/// Shared handle to a host value
pub type ValueRef = Rc<dyn ValueObject>;

/// Shared handle to a host type descriptor
pub type TypeRef = Rc<dyn CompilerType>;

/// Shared handle to a target process or memory image
pub type ProcessRef = Rc<dyn Process>;

/// Shared handle to an execution context
pub type ExecutionContextRef = Rc<dyn ExecutionContext>;

/// Kind of a template argument, as reported by the type system
///
/// Mirrors the argument kinds a C++ template can take. Only [`Type`],
/// [`Template`] and [`TemplateExpansion`] name something the formatters can
/// use as an element type; see [`TemplateArgumentKind::names_type`].
///
/// [`Type`]: TemplateArgumentKind::Type
/// [`Template`]: TemplateArgumentKind::Template
/// [`TemplateExpansion`]: TemplateArgumentKind::TemplateExpansion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateArgumentKind
{
    /// Argument slot with nothing in it
    Null,
    /// A concrete type, e.g. `int` in `vector<int>`
    Type,
    /// A declaration (pointer or reference to an entity)
    Declaration,
    /// An integral constant, e.g. `3` in `array<int, 3>`
    Integral,
    /// A template instantiation passed as an argument
    Template,
    /// A template pack expansion
    TemplateExpansion,
    /// An unevaluated expression
    Expression,
    /// A parameter pack
    Pack,
    /// `nullptr`
    NullPtr,
}

impl TemplateArgumentKind
{
    /// Can the argument be used to interpret bytes in memory?
    pub const fn names_type(self) -> bool
    {
        matches!(
            self,
            TemplateArgumentKind::Type | TemplateArgumentKind::Template | TemplateArgumentKind::TemplateExpansion
        )
    }
}

/// One resolved template argument
#[derive(Clone)]
pub struct TemplateArgument
{
    /// What kind of argument this is
    pub kind: TemplateArgumentKind,
    /// The type it names, when the kind names a type
    pub ty: Option<TypeRef>,
}

impl TemplateArgument
{
    /// A type argument
    pub fn of_type(ty: TypeRef) -> Self
    {
        Self {
            kind: TemplateArgumentKind::Type,
            ty: Some(ty),
        }
    }
}

impl fmt::Debug for TemplateArgument
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("TemplateArgument")
            .field("kind", &self.kind)
            .field("ty", &self.ty.as_ref().map(|ty| ty.name()))
            .finish()
    }
}

/// How the bytes of a scalar type are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScalarEncoding
{
    /// Not a scalar (aggregates, `void`)
    #[default]
    None,
    /// Unsigned integer
    Unsigned,
    /// Two's complement signed integer
    Signed,
    /// IEEE 754 binary floating point
    Float,
    /// `bool`
    Bool,
    /// Character type (`char`, `wchar_t`, `char16_t`, `char32_t`)
    Char,
    /// Pointer or reference
    Pointer,
}

/// A direct data member of an aggregate type
#[derive(Clone)]
pub struct FieldInfo
{
    /// Member name as written in the source
    pub name: String,
    /// Offset from the start of the aggregate, in bytes
    pub offset: u64,
    /// Declared type of the member
    pub ty: TypeRef,
}

impl fmt::Debug for FieldInfo
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("offset", &self.offset)
            .field("ty", &self.ty.name())
            .finish()
    }
}

/// Type descriptor supplied by the host's type system
///
/// Only the template-argument and pointee queries are needed by the
/// formatters. The layout queries (`byte_size`, `field_at_index`, `encoding`)
/// are what a host value implementation needs to materialize children, and
/// default to "opaque".
pub trait CompilerType
{
    /// Fully qualified type name, e.g. `std::_Rb_tree_iterator<std::pair<const int, int> >`
    fn name(&self) -> String;

    /// Size of one instance in bytes, if the type is complete
    fn byte_size(&self) -> Option<u64>;

    /// Number of template arguments of this instantiation
    fn num_template_arguments(&self) -> usize
    {
        0
    }

    /// Template argument at `index`, or `None` if out of range
    fn template_argument(&self, _index: usize) -> Option<TemplateArgument>
    {
        None
    }

    /// Type pointed to, for pointer and reference types
    fn pointee_type(&self) -> Option<TypeRef>
    {
        None
    }

    /// Number of direct data members
    fn num_fields(&self) -> usize
    {
        0
    }

    /// Direct data member at `index`
    fn field_at_index(&self, _index: usize) -> Option<FieldInfo>
    {
        None
    }

    /// How to interpret the bytes of a scalar of this type
    fn encoding(&self) -> ScalarEncoding
    {
        ScalarEncoding::None
    }
}

impl fmt::Debug for dyn CompilerType
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "CompilerType({})", self.name())
    }
}

/// Read-only access to target memory
///
/// Implemented by live process readers and by captured images. The read
/// primitive owns any timeout or interruption policy; callers treat every
/// error as final for the current request.
///
/// ## Thread Safety
///
/// Not required. A process is shared between the values of one debugging
/// session on one thread.
pub trait Process
{
    /// Address width, `wchar_t` width and byte order of the target
    fn architecture(&self) -> ArchitectureProfile;

    /// Read exactly `len` bytes starting at `address`
    ///
    /// ## Errors
    ///
    /// - `InvalidAddress`: `address` is the invalid sentinel or the range overflows
    /// - `ReadFailed`: any part of the range is not readable
    fn read_memory(&self, address: Address, len: usize) -> FormatterResult<Vec<u8>>;

    /// Read one target pointer at `address`
    ///
    /// The default implementation reads `address_byte_size` bytes and decodes
    /// them in target byte order.
    ///
    /// ## Errors
    ///
    /// Whatever [`Process::read_memory`] reports.
    fn read_pointer(&self, address: Address) -> FormatterResult<Address>
    {
        let arch = self.architecture();
        let bytes = self.read_memory(address, usize::from(arch.address_byte_size()))?;
        arch.decode_address(&bytes).ok_or_else(|| FormatterError::ReadFailed {
            address: address.value(),
            len: usize::from(arch.address_byte_size()),
            reason: format!("short read of {} bytes", bytes.len()),
        })
    }
}

/// The process a value belongs to, plus the host's value factory
pub trait ExecutionContext
{
    /// The owning process, if the value lives in one
    fn process(&self) -> Option<ProcessRef>;

    /// Create a value named `name` of type `ty` located at `address`
    ///
    /// No memory is read until the returned value is inspected. Returns
    /// `None` if the host cannot create values in this context.
    fn create_value_from_address(&self, name: &str, address: Address, ty: TypeRef) -> Option<ValueRef>;
}

/// One in-memory instance of a type, as presented by the host
pub trait ValueObject
{
    /// Display name (variable or member name)
    fn name(&self) -> &str;

    /// Resolved type of the value
    fn compiler_type(&self) -> TypeRef;

    /// Context that owns this value
    fn execution_context(&self) -> ExecutionContextRef;

    /// Address of the value and how that address is classified
    ///
    /// Returns `(Address::INVALID, AddressType::Invalid)` when the value has
    /// no location (registers, constants).
    fn address_of(&self) -> (Address, AddressType);

    /// First-level member called `name`
    fn child_member_with_name(&self, name: &str) -> Option<ValueRef>;

    /// Child at `index`, in declaration order
    fn child_at_index(&self, index: usize) -> Option<ValueRef>;

    /// The value's own scalar content widened to `u64`
    ///
    /// Pointers yield the address they hold. Returns `None` for aggregates or
    /// when the backing memory cannot be read.
    fn value_as_unsigned(&self) -> Option<u64>;

    /// Owning process, shortcut for `execution_context().process()`
    fn process(&self) -> Option<ProcessRef>
    {
        self.execution_context().process()
    }
}
