//! Tests for type-name based formatter lookup

mod common;

use std::rc::Rc;

use common::{primitive, Target};
use cxxview_core::formatters::{FormatterRegistry, SummaryKind, SummaryOptions, SyntheticFrontEnd, SyntheticKind};
use cxxview_core::layout::{libstdcpp, TypeLayout};
use cxxview_core::types::ArchitectureProfile;

#[test]
fn test_libstdcpp_string_names()
{
    let registry = FormatterRegistry::libstdcpp();
    for name in [
        "std::string",
        "std::__cxx11::basic_string<char, std::char_traits<char>, std::allocator<char> >",
        "std::basic_string<char,std::char_traits<char>,std::allocator<char> >",
    ] {
        assert_eq!(registry.summary_kind(name), Some(SummaryKind::String), "{name}");
    }
    for name in ["std::wstring", "std::__cxx11::basic_string<wchar_t>"] {
        assert_eq!(registry.summary_kind(name), Some(SummaryKind::WString), "{name}");
    }
    assert_eq!(registry.summary_kind("std::u16string"), None);
    assert_eq!(registry.summary_kind("std::string_view"), None);
}

#[test]
fn test_libstdcpp_iterator_names()
{
    let registry = FormatterRegistry::libstdcpp();
    assert_eq!(
        registry.synthetic_kind("std::_Rb_tree_iterator<std::pair<const int, int> >"),
        Some(SyntheticKind::MapIterator)
    );
    assert_eq!(
        registry.synthetic_kind("std::_Rb_tree_const_iterator<std::pair<const int, int> >"),
        Some(SyntheticKind::MapIterator)
    );
    assert_eq!(
        registry.synthetic_kind("__gnu_cxx::__normal_iterator<int *, std::vector<int, std::allocator<int> > >"),
        Some(SyntheticKind::VectorIterator)
    );
    assert_eq!(registry.synthetic_kind("std::_Rb_tree_node_base"), None);
    assert_eq!(registry.synthetic_kind("std::vector<int>"), None);
}

#[test]
fn test_custom_registrations()
{
    let mut registry = FormatterRegistry::new();
    assert_eq!(registry.summary_kind("std::string"), None);

    registry.add_summary(r"^my::str(ing)?$", SummaryKind::String).unwrap();
    registry.add_synthetic(r"^my::vec_iter<.+>$", SyntheticKind::VectorIterator).unwrap();
    registry.add_summary_exact("my::wide", SummaryKind::WString);

    assert_eq!(registry.summary_kind("my::str"), Some(SummaryKind::String));
    assert_eq!(registry.summary_kind("my::wide"), Some(SummaryKind::WString));
    assert_eq!(registry.synthetic_kind("my::vec_iter<int>"), Some(SyntheticKind::VectorIterator));
    assert!(registry.add_summary("(unclosed", SummaryKind::String).is_err());
}

#[test]
fn test_first_registration_wins()
{
    let mut registry = FormatterRegistry::new();
    registry.add_summary_exact("std::string", SummaryKind::WString);
    registry.add_summary("^std::.*$", SummaryKind::String).unwrap();

    assert_eq!(registry.summary_kind("std::string"), Some(SummaryKind::WString));
    assert_eq!(registry.summary_kind("std::other"), Some(SummaryKind::String));
}

#[test]
fn test_synthetic_for_binds_the_right_decoder()
{
    let arch = ArchitectureProfile::lp64();
    let int = primitive("int", &arch);
    let pair = Rc::new(TypeLayout::pair(&int, &int));

    let mut target = Target::new(arch);
    target
        .words(0x1000, &[0x2000, 0x3000])
        .bytes(0x2000, &[0; 32])
        .bytes(0x2020, &[1, 0, 0, 0, 2, 0, 0, 0])
        .bytes(0x3000, &9i32.to_le_bytes());
    let host = target.attach();
    let registry = FormatterRegistry::libstdcpp();

    let map_it = host.value("m", Rc::new(libstdcpp::rb_tree_iterator(pair, &arch)), 0x1000);
    let mut children = registry.synthetic_for(&map_it).unwrap();
    assert_eq!(children.kind(), SyntheticKind::MapIterator);
    assert!(children.might_have_children());
    assert_eq!(children.num_children(), 2);
    assert_eq!(children.child_at_index(1).unwrap().value_as_unsigned(), Some(2));

    let vec_it = host.value("v", Rc::new(libstdcpp::normal_iterator(int.clone(), &arch)), 0x1008);
    let mut children = registry.synthetic_for(&vec_it).unwrap();
    assert_eq!(children.kind(), SyntheticKind::VectorIterator);
    assert_eq!(children.index_of_child_with_name("item"), Some(0));
    assert_eq!(children.child_at_index(0).unwrap().value_as_unsigned(), Some(9));

    let plain = host.value("i", int, 0x3000);
    assert!(registry.synthetic_for(&plain).is_none());
}

#[test]
fn test_summarize_dispatches_by_type_name()
{
    let arch = ArchitectureProfile::lp64();
    let mut target = Target::new(arch);
    target.words(0x1000, &[0x2000, 2]).bytes(0x2000, &[b'o', 0, 0, 0, b'k', 0, 0, 0]);
    let host = target.attach();
    let registry = FormatterRegistry::libstdcpp();
    let options = SummaryOptions::default();

    let narrow = host.value("s", Rc::new(libstdcpp::string(&arch)), 0x1000);
    let mut out = String::new();
    assert_eq!(registry.summarize(&*narrow, &mut out, &options), Some(true));
    assert_eq!(out, "\"o\"");

    let wide = host.value("w", Rc::new(libstdcpp::wstring(&arch)), 0x1000);
    let mut out = String::new();
    assert_eq!(registry.summarize(&*wide, &mut out, &options), Some(true));
    assert_eq!(out, "L\"ok\"");

    let plain = host.value("i", primitive("int", &arch), 0x2000);
    let mut out = String::new();
    assert_eq!(registry.summarize(&*plain, &mut out, &options), None);
    assert!(out.is_empty());
}
