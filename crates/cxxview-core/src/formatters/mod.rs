//! # Formatters
//!
//! Decoders that present libstdc++ internals the way a user thinks about them.
//!
//! - [`MapIteratorFrontEnd`]: `std::map`/`std::set` iterators shown as the
//!   `{first, second}` pair they point at.
//! - [`VectorIteratorFrontEnd`]: `std::vector` iterators shown as the single
//!   `item` they point at.
//! - [`string_summary`] / [`wstring_summary`]: `std::string` and
//!   `std::wstring` rendered as literals.
//!
//! The iterator decoders implement [`SyntheticFrontEnd`], the lifecycle the
//! host drives: construct, [`refresh`](SyntheticFrontEnd::refresh), then ask
//! for children. [`SyntheticChildren`] wraps either decoder so the host can
//! hold one without knowing which. [`FormatterRegistry`] picks the decoder
//! from a type name.
//!
//! Nothing in here runs target code or writes target memory. When something
//! cannot be resolved the answer is "no children" or "no summary", never an
//! error.

pub mod map_iterator;
pub mod registry;
pub mod string;
pub mod string_printer;
pub mod vector_iterator;

pub use map_iterator::MapIteratorFrontEnd;
pub use registry::{FormatterRegistry, SummaryKind, SyntheticKind};
pub use string::{string_summary, wstring_summary};
pub use string_printer::{ReadStringOptions, StringElementType, SummaryOptions};
pub use vector_iterator::VectorIteratorFrontEnd;

use tracing::debug;

use crate::host::{CompilerType, TypeRef, ValueRef};

/// Synthetic children provider for one bound value
///
/// ## Lifecycle
///
/// 1. The host constructs the front end for a value (construction refreshes once)
/// 2. The host calls [`refresh`](Self::refresh) whenever it considers the value stale
/// 3. The host queries [`num_children`](Self::num_children),
///    [`child_at_index`](Self::child_at_index) and
///    [`index_of_child_with_name`](Self::index_of_child_with_name)
///
/// Derived state is only recomputed by `refresh`; there is no implicit
/// invalidation.
pub trait SyntheticFrontEnd
{
    /// Recompute derived addresses and types; `false` when nothing resolved
    fn refresh(&mut self) -> bool;

    /// Number of synthetic children currently available
    fn num_children(&self) -> usize;

    /// Child at `index`, materialized on first access and cached
    fn child_at_index(&mut self, index: usize) -> Option<ValueRef>;

    /// Index of the child called `name`
    fn index_of_child_with_name(&self, name: &str) -> Option<usize>;

    /// Whether children may exist, regardless of the current state
    fn might_have_children(&self) -> bool
    {
        true
    }
}

/// Either iterator decoder, dispatched by the host
pub enum SyntheticChildren
{
    /// `std::_Rb_tree_iterator` and `std::_Rb_tree_const_iterator`
    MapIterator(MapIteratorFrontEnd),
    /// `__gnu_cxx::__normal_iterator`
    VectorIterator(VectorIteratorFrontEnd),
}

impl SyntheticChildren
{
    /// Bind the decoder for `kind` to `backend`
    pub fn new(kind: SyntheticKind, backend: &ValueRef) -> Self
    {
        match kind {
            SyntheticKind::MapIterator => SyntheticChildren::MapIterator(MapIteratorFrontEnd::new(backend)),
            SyntheticKind::VectorIterator => SyntheticChildren::VectorIterator(VectorIteratorFrontEnd::new(backend)),
        }
    }

    /// Which decoder this is
    pub fn kind(&self) -> SyntheticKind
    {
        match self {
            SyntheticChildren::MapIterator(_) => SyntheticKind::MapIterator,
            SyntheticChildren::VectorIterator(_) => SyntheticKind::VectorIterator,
        }
    }

    fn front_end(&self) -> &dyn SyntheticFrontEnd
    {
        match self {
            SyntheticChildren::MapIterator(fe) => fe,
            SyntheticChildren::VectorIterator(fe) => fe,
        }
    }

    fn front_end_mut(&mut self) -> &mut dyn SyntheticFrontEnd
    {
        match self {
            SyntheticChildren::MapIterator(fe) => fe,
            SyntheticChildren::VectorIterator(fe) => fe,
        }
    }
}

impl SyntheticFrontEnd for SyntheticChildren
{
    fn refresh(&mut self) -> bool
    {
        self.front_end_mut().refresh()
    }

    fn num_children(&self) -> usize
    {
        self.front_end().num_children()
    }

    fn child_at_index(&mut self, index: usize) -> Option<ValueRef>
    {
        self.front_end_mut().child_at_index(index)
    }

    fn index_of_child_with_name(&self, name: &str) -> Option<usize>
    {
        self.front_end().index_of_child_with_name(name)
    }

    fn might_have_children(&self) -> bool
    {
        self.front_end().might_have_children()
    }
}

/// Template argument `index` of `ty`, if it names a usable type
///
/// Arguments that are integral constants, declarations, packs and the like
/// cannot describe bytes in memory and are rejected.
pub fn template_type_argument(ty: &dyn CompilerType, index: usize) -> Option<TypeRef>
{
    if ty.num_template_arguments() <= index {
        debug!(ty = %ty.name(), index, "missing template argument");
        return None;
    }

    let argument = ty.template_argument(index)?;
    if !argument.kind.names_type() {
        debug!(ty = %ty.name(), index, kind = ?argument.kind, "template argument does not name a type");
        return None;
    }
    argument.ty
}
