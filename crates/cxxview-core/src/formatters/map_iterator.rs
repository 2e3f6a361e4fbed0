//! `std::map` / `std::set` iterator decoding.
//!
//! A libstdc++ tree iterator holds one field, `_M_node`, pointing at a
//! `_Rb_tree_node_base`:
//!
//! ```text
//! _Rb_tree_node<pair<const K, V>>
//! +------------+-----------+---------+----------+-----------------+
//! | _M_color   | _M_parent | _M_left | _M_right | _M_storage      |
//! | (padded)   |           |         |          | pair<const K,V> |
//! +------------+-----------+---------+----------+-----------------+
//! ^ _M_node                                     ^ node + header
//! ```
//!
//! The header is 16 bytes on 32-bit targets and 32 bytes on 64-bit targets
//! (see [`ArchitectureProfile::rb_tree_node_header_size`]). The stored value's
//! type is the iterator's first template argument.
//!
//! [`ArchitectureProfile::rb_tree_node_header_size`]: crate::types::ArchitectureProfile::rb_tree_node_header_size

use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use super::{template_type_argument, SyntheticFrontEnd};
use crate::host::{ExecutionContextRef, TypeRef, ValueObject, ValueRef};
use crate::types::Address;

/// Name of the node pointer inside `std::_Rb_tree_iterator`
pub const NODE_FIELD: &str = "_M_node";

/// Name given to the materialized pair value
pub const PAIR_NAME: &str = "pair";

/// Where the pair lives and how to read it
#[derive(Clone)]
struct PairLocation
{
    exe_ctx: ExecutionContextRef,
    address: Address,
    pair_type: TypeRef,
}

/// Synthetic children for a red-black tree iterator
///
/// Presents the iterator as the `{first, second}` pair stored in the node it
/// points at. An end or singular iterator has no children.
pub struct MapIteratorFrontEnd
{
    backend: Weak<dyn ValueObject>,
    location: Option<PairLocation>,
    pair: Option<ValueRef>,
}

impl MapIteratorFrontEnd
{
    /// Bind to `backend` and refresh once
    pub fn new(backend: &ValueRef) -> Self
    {
        let mut front_end = Self {
            backend: Rc::downgrade(backend),
            location: None,
            pair: None,
        };
        front_end.refresh();
        front_end
    }

    /// Address of the pair inside the current node, once resolved
    pub fn pair_address(&self) -> Option<Address>
    {
        self.location.as_ref().map(|location| location.address)
    }

    /// Type used to read the pair, once resolved
    pub fn pair_type(&self) -> Option<TypeRef>
    {
        self.location.as_ref().map(|location| location.pair_type.clone())
    }

    fn resolve(backend: &dyn ValueObject) -> Option<PairLocation>
    {
        let exe_ctx = backend.execution_context();
        let Some(process) = exe_ctx.process() else {
            debug!(value = backend.name(), "map iterator has no process");
            return None;
        };
        let arch = process.architecture();

        let Some(node) = backend.child_member_with_name(NODE_FIELD) else {
            debug!(value = backend.name(), "map iterator has no {NODE_FIELD}");
            return None;
        };
        let node_address = Address::new(node.value_as_unsigned().unwrap_or(0));
        if !node_address.is_resolved() {
            debug!(value = backend.name(), "map iterator is singular or at end");
            return None;
        }

        let address = node_address.checked_add(arch.rb_tree_node_header_size())?;
        let pair_type = template_type_argument(&*backend.compiler_type(), 0)?;

        trace!(value = backend.name(), node = %node_address, pair = %address, "resolved map iterator");
        Some(PairLocation {
            exe_ctx,
            address,
            pair_type,
        })
    }
}

impl SyntheticFrontEnd for MapIteratorFrontEnd
{
    fn refresh(&mut self) -> bool
    {
        self.location = None;
        self.pair = None;

        let Some(backend) = self.backend.upgrade() else {
            return false;
        };
        self.location = Self::resolve(&*backend);
        self.location.is_some()
    }

    fn num_children(&self) -> usize
    {
        if self.location.is_some() {
            2
        } else {
            0
        }
    }

    fn child_at_index(&mut self, index: usize) -> Option<ValueRef>
    {
        let location = self.location.as_ref()?;
        if self.pair.is_none() {
            self.pair =
                location
                    .exe_ctx
                    .create_value_from_address(PAIR_NAME, location.address, location.pair_type.clone());
        }
        self.pair.as_ref()?.child_at_index(index)
    }

    fn index_of_child_with_name(&self, name: &str) -> Option<usize>
    {
        match name {
            "first" => Some(0),
            "second" => Some(1),
            _ => None,
        }
    }
}
