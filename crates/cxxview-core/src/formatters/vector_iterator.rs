//! Contiguous iterator decoding.
//!
//! `__gnu_cxx::__normal_iterator<T*, Container>` wraps a single `T*` called
//! `_M_current`. The element it designates is read straight through that
//! pointer using the pointer's declared pointee type.

use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use super::SyntheticFrontEnd;
use crate::host::{ExecutionContextRef, TypeRef, ValueObject, ValueRef};
use crate::types::Address;

/// Current-position field of libstdc++'s `__normal_iterator`
pub const LIBSTDCPP_CURRENT_FIELD: &str = "_M_current";

/// Name given to the materialized element
pub const ITEM_NAME: &str = "item";

#[derive(Clone)]
struct ItemLocation
{
    exe_ctx: ExecutionContextRef,
    address: Address,
    item_type: TypeRef,
}

/// Synthetic children for a pointer-wrapping iterator
///
/// Exposes one child, `item`, located at the wrapped pointer's target. The
/// element is created on first access, not on refresh.
pub struct VectorIteratorFrontEnd
{
    backend: Weak<dyn ValueObject>,
    field_name: &'static str,
    location: Option<ItemLocation>,
    item: Option<ValueRef>,
}

impl VectorIteratorFrontEnd
{
    /// Bind to a libstdc++ `__normal_iterator` and refresh once
    pub fn new(backend: &ValueRef) -> Self
    {
        Self::with_field_name(backend, LIBSTDCPP_CURRENT_FIELD)
    }

    /// Bind to an iterator whose position pointer is called `field_name`
    pub fn with_field_name(backend: &ValueRef, field_name: &'static str) -> Self
    {
        let mut front_end = Self {
            backend: Rc::downgrade(backend),
            field_name,
            location: None,
            item: None,
        };
        front_end.refresh();
        front_end
    }

    /// Field holding the current position
    pub fn field_name(&self) -> &'static str
    {
        self.field_name
    }

    /// Address of the designated element, once resolved
    pub fn item_address(&self) -> Option<Address>
    {
        self.location.as_ref().map(|location| location.address)
    }

    fn resolve(&self, backend: &dyn ValueObject) -> Option<ItemLocation>
    {
        let Some(current) = backend.child_member_with_name(self.field_name) else {
            debug!(value = backend.name(), field = self.field_name, "iterator has no position field");
            return None;
        };
        let address = Address::new(current.value_as_unsigned().unwrap_or(0));
        if !address.is_resolved() {
            debug!(value = backend.name(), "iterator position is null");
            return None;
        }

        let Some(item_type) = current.compiler_type().pointee_type() else {
            debug!(value = backend.name(), field = self.field_name, "position field is not a pointer");
            return None;
        };

        trace!(value = backend.name(), item = %address, "resolved contiguous iterator");
        Some(ItemLocation {
            exe_ctx: backend.execution_context(),
            address,
            item_type,
        })
    }
}

impl SyntheticFrontEnd for VectorIteratorFrontEnd
{
    fn refresh(&mut self) -> bool
    {
        self.location = None;
        self.item = None;

        let Some(backend) = self.backend.upgrade() else {
            return false;
        };
        self.location = self.resolve(&*backend);
        self.location.is_some()
    }

    fn num_children(&self) -> usize
    {
        usize::from(self.location.is_some())
    }

    fn child_at_index(&mut self, index: usize) -> Option<ValueRef>
    {
        if index != 0 {
            return None;
        }
        let location = self.location.as_ref()?;
        if self.item.is_none() {
            self.item =
                location
                    .exe_ctx
                    .create_value_from_address(ITEM_NAME, location.address, location.item_type.clone());
        }
        self.item.clone()
    }

    fn index_of_child_with_name(&self, name: &str) -> Option<usize>
    {
        (name == ITEM_NAME).then_some(0)
    }
}
