//! Hand-written layouts of the libstdc++ types the formatters understand.
//!
//! These mirror what a compiler emits in debug info for GCC's standard
//! library, reduced to the members the formatters touch.

use std::rc::Rc;

use super::types::{align_up, TypeLayout};
use crate::formatters::map_iterator::NODE_FIELD;
use crate::formatters::vector_iterator::LIBSTDCPP_CURRENT_FIELD;
use crate::host::{FieldInfo, ScalarEncoding, TemplateArgument, TypeRef};
use crate::types::ArchitectureProfile;

/// Bytes of inline storage in a `basic_string` (small string optimization)
const STRING_LOCAL_CAPACITY_BYTES: u64 = 16;

/// `std::_Rb_tree_iterator<Value>`: a single `_M_node` pointer
pub fn rb_tree_iterator(value: TypeRef, arch: &ArchitectureProfile) -> TypeLayout
{
    let node_base: TypeRef = Rc::new(TypeLayout::opaque("std::_Rb_tree_node_base"));
    let node_ptr: TypeRef = Rc::new(TypeLayout::pointer_to(node_base, arch));
    let fields = vec![FieldInfo {
        name: NODE_FIELD.to_owned(),
        offset: 0,
        ty: node_ptr,
    }];

    TypeLayout::record(
        format!("std::_Rb_tree_iterator<{}>", value.name()),
        arch.pointer_size(),
        arch.pointer_size(),
        fields,
    )
    .with_template_argument(TemplateArgument::of_type(value))
}

/// `__gnu_cxx::__normal_iterator<T*, std::vector<T> >`: a single `_M_current` pointer
pub fn normal_iterator(element: TypeRef, arch: &ArchitectureProfile) -> TypeLayout
{
    let element_name = element.name();
    let pointer: TypeRef = Rc::new(TypeLayout::pointer_to(element, arch));
    let fields = vec![FieldInfo {
        name: LIBSTDCPP_CURRENT_FIELD.to_owned(),
        offset: 0,
        ty: pointer.clone(),
    }];

    TypeLayout::record(
        format!("__gnu_cxx::__normal_iterator<{element_name} *, std::vector<{element_name}, std::allocator<{element_name}> > >"),
        arch.pointer_size(),
        arch.pointer_size(),
        fields,
    )
    .with_template_argument(TemplateArgument::of_type(pointer))
}

/// `std::string` (the C++11 ABI `basic_string<char>`)
pub fn string(arch: &ArchitectureProfile) -> TypeLayout
{
    let char_type = TypeLayout::scalar("char", 1, ScalarEncoding::Char);
    basic_string("std::__cxx11::basic_string<char, std::char_traits<char>, std::allocator<char> >", char_type, arch)
}

/// `std::wstring` (the C++11 ABI `basic_string<wchar_t>`)
pub fn wstring(arch: &ArchitectureProfile) -> TypeLayout
{
    let wchar_size = arch.wchar_bit_size().map_or(4, |bits| u64::from(bits / 8).max(1));
    let wchar_type = TypeLayout::scalar("wchar_t", wchar_size, ScalarEncoding::Char);
    basic_string(
        "std::__cxx11::basic_string<wchar_t, std::char_traits<wchar_t>, std::allocator<wchar_t> >",
        wchar_type,
        arch,
    )
}

fn basic_string(name: &str, char_type: TypeLayout, arch: &ArchitectureProfile) -> TypeLayout
{
    let ptr = arch.pointer_size();
    let char_type: TypeRef = Rc::new(char_type);
    let size_type: TypeRef = Rc::new(TypeLayout::scalar("size_t", ptr, ScalarEncoding::Unsigned));
    let fields = vec![
        FieldInfo {
            name: "_M_p".to_owned(),
            offset: 0,
            ty: Rc::new(TypeLayout::pointer_to(char_type.clone(), arch)),
        },
        FieldInfo {
            name: "_M_string_length".to_owned(),
            offset: ptr,
            ty: size_type,
        },
    ];

    TypeLayout::record(name, align_up(2 * ptr + STRING_LOCAL_CAPACITY_BYTES, ptr), ptr, fields)
        .with_template_argument(TemplateArgument::of_type(char_type))
}
