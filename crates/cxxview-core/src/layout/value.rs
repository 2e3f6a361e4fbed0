//! Values read straight out of a memory source.

use std::rc::Rc;

use tracing::trace;

use crate::error::{FormatterError, FormatterResult};
use crate::host::{
    CompilerType, ExecutionContext, ExecutionContextRef, FieldInfo, ProcessRef, ScalarEncoding, TypeRef, ValueObject,
    ValueRef,
};
use crate::types::{Address, AddressType};

/// Execution context backed by one memory source
///
/// Cheap to clone: it only holds a shared handle to the process.
#[derive(Clone)]
pub struct MemoryContext
{
    process: Option<ProcessRef>,
}

impl MemoryContext
{
    /// Context whose values are read from `process`
    pub fn new(process: ProcessRef) -> Rc<Self>
    {
        Rc::new(Self { process: Some(process) })
    }

    /// Context without a process; its values can never be read
    pub fn detached() -> Rc<Self>
    {
        Rc::new(Self { process: None })
    }

    /// A load-address value of type `ty` at `address`
    pub fn value(self: &Rc<Self>, name: &str, ty: TypeRef, address: Address) -> ValueRef
    {
        Rc::new(MemoryValue::new(name, ty, address, self.clone()))
    }
}

impl ExecutionContext for MemoryContext
{
    fn process(&self) -> Option<ProcessRef>
    {
        self.process.clone()
    }

    fn create_value_from_address(&self, name: &str, address: Address, ty: TypeRef) -> Option<ValueRef>
    {
        trace!(name, %address, ty = %ty.name(), "creating value");
        Some(Rc::new(MemoryValue::new(name, ty, address, Rc::new(self.clone()))))
    }
}

/// A value of a known type at a known address
///
/// Nothing is read on construction. Members are located through the type's
/// field offsets, and scalars are read on demand.
pub struct MemoryValue
{
    name: String,
    ty: TypeRef,
    address: Address,
    address_type: AddressType,
    context: Rc<MemoryContext>,
}

impl MemoryValue
{
    /// A value at a load address in `context`'s process
    pub fn new(name: &str, ty: TypeRef, address: Address, context: Rc<MemoryContext>) -> Self
    {
        Self {
            name: name.to_owned(),
            ty,
            address,
            address_type: AddressType::Load,
            context,
        }
    }

    /// Reclassify the value's address (e.g. an object-file address)
    #[must_use]
    pub fn with_address_type(mut self, address_type: AddressType) -> Self
    {
        self.address_type = address_type;
        self
    }

    /// Raw bytes of the value
    ///
    /// ## Errors
    ///
    /// - `NoProcess`: the context has no process
    /// - `InvalidArgument`: the type has no known size
    /// - anything the process reports for the read
    pub fn read_bytes(&self) -> FormatterResult<Vec<u8>>
    {
        let process = self.context.process.as_ref().ok_or(FormatterError::NoProcess)?;
        let size = self
            .ty
            .byte_size()
            .and_then(|size| usize::try_from(size).ok())
            .ok_or_else(|| FormatterError::InvalidArgument(format!("{} has no known size", self.ty.name())))?;
        process.read_memory(self.address, size)
    }

    fn child_from_field(&self, field: &FieldInfo) -> Option<ValueRef>
    {
        let address = self.address.checked_add(field.offset)?;
        let child = MemoryValue::new(&field.name, field.ty.clone(), address, self.context.clone())
            .with_address_type(self.address_type);
        Some(Rc::new(child))
    }
}

impl ValueObject for MemoryValue
{
    fn name(&self) -> &str
    {
        &self.name
    }

    fn compiler_type(&self) -> TypeRef
    {
        self.ty.clone()
    }

    fn execution_context(&self) -> ExecutionContextRef
    {
        self.context.clone()
    }

    fn address_of(&self) -> (Address, AddressType)
    {
        (self.address, self.address_type)
    }

    fn child_member_with_name(&self, name: &str) -> Option<ValueRef>
    {
        let field = (0..self.ty.num_fields())
            .filter_map(|index| self.ty.field_at_index(index))
            .find(|field| field.name == name)?;
        self.child_from_field(&field)
    }

    fn child_at_index(&self, index: usize) -> Option<ValueRef>
    {
        let field = self.ty.field_at_index(index)?;
        self.child_from_field(&field)
    }

    fn value_as_unsigned(&self) -> Option<u64>
    {
        if self.ty.encoding() == ScalarEncoding::None || !self.address_type.is_addressable() {
            return None;
        }
        let bytes = self.read_bytes().ok()?;
        let process = self.context.process.as_ref()?;
        process.architecture().decode_unsigned(&bytes)
    }
}

/// Render a scalar value the way a debugger's variable view would
///
/// Works with any host value: it only needs the value's raw content and its
/// type's encoding and size. Returns `None` for aggregates and unreadable
/// values.
pub fn scalar_display(value: &dyn ValueObject) -> Option<String>
{
    let ty = value.compiler_type();
    let size = ty.byte_size()?;
    let raw = value.value_as_unsigned()?;

    let rendered = match ty.encoding() {
        ScalarEncoding::None => return None,
        ScalarEncoding::Unsigned => raw.to_string(),
        ScalarEncoding::Signed => sign_extend(raw, size).to_string(),
        ScalarEncoding::Float => match size {
            4 => f32::from_bits(u32::try_from(raw).ok()?).to_string(),
            8 => f64::from_bits(raw).to_string(),
            _ => return None,
        },
        ScalarEncoding::Bool => (raw != 0).to_string(),
        ScalarEncoding::Char => match u32::try_from(raw).ok().and_then(char::from_u32) {
            Some(c) => format!("{raw} {c:?}"),
            None => raw.to_string(),
        },
        ScalarEncoding::Pointer => format!("0x{raw:x}"),
    };
    Some(rendered)
}

fn sign_extend(raw: u64, size: u64) -> i64
{
    if size == 0 || size >= 8 {
        return raw as i64;
    }
    let shift = 64 - size * 8;
    ((raw << shift) as i64) >> shift
}
