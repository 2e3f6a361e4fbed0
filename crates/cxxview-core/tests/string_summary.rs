//! Tests for `std::string` and `std::wstring` summaries

mod common;

use std::rc::Rc;

use common::{Host, Target};
use cxxview_core::formatters::string::{INVALID_WCHAR_SIZE, SUMMARY_UNAVAILABLE};
use cxxview_core::formatters::{string_summary, wstring_summary, SummaryOptions};
use cxxview_core::host::{TypeRef, ValueObject};
use cxxview_core::layout::{libstdcpp, MemoryContext, MemoryValue};
use cxxview_core::types::{Address, AddressType, ArchitectureProfile, ByteOrder};

const OBJECT: u64 = 0x1000;
const DATA: u64 = 0x2000;

fn narrow(host: &Host, arch: &ArchitectureProfile) -> Rc<dyn ValueObject>
{
    host.value("s", Rc::new(libstdcpp::string(arch)), OBJECT)
}

fn wide(host: &Host, arch: &ArchitectureProfile) -> Rc<dyn ValueObject>
{
    host.value("ws", Rc::new(libstdcpp::wstring(arch)), OBJECT)
}

fn summarize(
    summary: fn(&dyn ValueObject, &mut dyn std::fmt::Write, &SummaryOptions) -> bool,
    value: &dyn ValueObject,
) -> (bool, String)
{
    let mut out = String::new();
    let ok = summary(value, &mut out, &SummaryOptions::default());
    (ok, out)
}

#[test]
fn test_narrow_string_read_pattern()
{
    let arch = ArchitectureProfile::lp64();
    let mut target = Target::new(arch);
    target.words(OBJECT, &[DATA, 5]).bytes(DATA, b"hello");
    let host = target.attach();

    let (ok, out) = summarize(string_summary, &*narrow(&host, &arch));
    assert!(ok);
    assert_eq!(out, "\"hello\"");
    assert_eq!(host.reads(), vec![(OBJECT, 8), (OBJECT + 8, 8), (DATA, 5)]);
}

#[test]
fn test_narrow_string_on_32_bit_target()
{
    let arch = ArchitectureProfile::ilp32();
    let mut target = Target::new(arch);
    target.words(OBJECT, &[DATA, 3]).bytes(DATA, b"abc");
    let host = target.attach();

    let (ok, out) = summarize(string_summary, &*narrow(&host, &arch));
    assert!(ok);
    assert_eq!(out, "\"abc\"");
    assert_eq!(host.reads(), vec![(OBJECT, 4), (OBJECT + 4, 4), (DATA, 3)]);
}

#[test]
fn test_narrow_string_on_big_endian_target()
{
    let arch = ArchitectureProfile::lp64().with_byte_order(ByteOrder::Big);
    let mut target = Target::new(arch);
    target.words(OBJECT, &[DATA, 2]).bytes(DATA, b"hi");
    let host = target.attach();

    assert_eq!(summarize(string_summary, &*narrow(&host, &arch)), (true, "\"hi\"".to_owned()));
}

#[test]
fn test_narrow_string_stops_at_embedded_zero()
{
    let arch = ArchitectureProfile::lp64();
    let mut target = Target::new(arch);
    target.words(OBJECT, &[DATA, 5]).bytes(DATA, b"ab\0cd");
    let host = target.attach();

    let (ok, out) = summarize(string_summary, &*narrow(&host, &arch));
    assert!(ok);
    assert_eq!(out, "\"ab\"");
    // The whole declared length is still fetched in one read
    assert_eq!(host.reads().last(), Some(&(DATA, 5)));
}

#[test]
fn test_narrow_string_escapes()
{
    let arch = ArchitectureProfile::lp64();
    let mut target = Target::new(arch);
    target.words(OBJECT, &[DATA, 6]).bytes(DATA, b"\"a\"\n\xffz");
    let host = target.attach();

    let (_, out) = summarize(string_summary, &*narrow(&host, &arch));
    assert_eq!(out, r#""\"a\"\n\xffz""#);
}

#[test]
fn test_empty_string_skips_payload_read()
{
    let arch = ArchitectureProfile::lp64();
    let mut target = Target::new(arch);
    target.words(OBJECT, &[DATA, 0]);
    let host = target.attach();

    assert_eq!(summarize(string_summary, &*narrow(&host, &arch)), (true, "\"\"".to_owned()));
    assert_eq!(host.reads().len(), 2);
}

#[test]
fn test_long_string_is_capped()
{
    let arch = ArchitectureProfile::lp64();
    let mut target = Target::new(arch);
    target.words(OBJECT, &[DATA, 10]).bytes(DATA, b"0123456789");
    let host = target.attach();
    let value = narrow(&host, &arch);

    let capped = SummaryOptions {
        capping: true,
        max_string_len: 4,
    };
    let mut out = String::new();
    assert!(string_summary(&*value, &mut out, &capped));
    assert_eq!(out, "\"0123\"...");
    assert_eq!(host.reads().last(), Some(&(DATA, 4)));

    let mut out = String::new();
    assert!(string_summary(&*value, &mut out, &SummaryOptions::uncapped()));
    assert_eq!(out, "\"0123456789\"");
}

#[test]
fn test_garbage_length_with_capping_off()
{
    let arch = ArchitectureProfile::lp64();
    let mut target = Target::new(arch);
    target.words(OBJECT, &[DATA, 0x8000_0000_0000_0000]).bytes(DATA, b"hi");
    let host = target.attach();

    let mut out = String::new();
    assert!(string_summary(&*narrow(&host, &arch), &mut out, &SummaryOptions::uncapped()));
    assert_eq!(out, SUMMARY_UNAVAILABLE);
    assert_eq!(host.reads(), vec![(OBJECT, 8), (OBJECT + 8, 8)]);

    let mut out = String::new();
    assert!(wstring_summary(&*wide(&host, &arch), &mut out, &SummaryOptions::uncapped()));
    assert_eq!(out, SUMMARY_UNAVAILABLE);
}

#[test]
fn test_unreadable_payload_is_reported_in_band()
{
    let arch = ArchitectureProfile::lp64();
    let mut target = Target::new(arch);
    target.words(OBJECT, &[DATA, 5]);
    let host = target.attach();

    assert_eq!(
        summarize(string_summary, &*narrow(&host, &arch)),
        (true, SUMMARY_UNAVAILABLE.to_owned())
    );
    assert_eq!(
        summarize(wstring_summary, &*wide(&host, &arch)),
        (true, SUMMARY_UNAVAILABLE.to_owned())
    );
}

#[test]
fn test_null_data_pointer_fails()
{
    let arch = ArchitectureProfile::lp64();
    let mut target = Target::new(arch);
    target.words(OBJECT, &[0, 5]);
    let host = target.attach();

    assert_eq!(summarize(string_summary, &*narrow(&host, &arch)), (false, String::new()));
    assert_eq!(host.reads(), vec![(OBJECT, 8)]);
}

#[test]
fn test_unreadable_header_fails()
{
    let arch = ArchitectureProfile::lp64();
    let mut target = Target::new(arch);
    target.words(OBJECT, &[DATA]);
    let host = target.attach();

    assert_eq!(summarize(string_summary, &*narrow(&host, &arch)), (false, String::new()));
    assert_eq!(host.reads().len(), 2);
}

#[test]
fn test_non_load_addresses_are_not_read()
{
    let arch = ArchitectureProfile::lp64();
    let mut target = Target::new(arch);
    target.words(OBJECT, &[DATA, 5]).bytes(DATA, b"hello");
    let host = target.attach();
    let ty: TypeRef = Rc::new(libstdcpp::string(&arch));

    for address_type in [AddressType::File, AddressType::Host, AddressType::Invalid] {
        let value = MemoryValue::new("s", ty.clone(), Address::new(OBJECT), host.context.clone())
            .with_address_type(address_type);
        assert_eq!(summarize(string_summary, &value), (false, String::new()));
        assert_eq!(summarize(wstring_summary, &value), (false, String::new()));
    }

    let value = MemoryValue::new("s", ty, Address::INVALID, host.context.clone());
    assert_eq!(summarize(string_summary, &value), (false, String::new()));
    assert!(host.reads().is_empty());
}

#[test]
fn test_value_without_process_fails()
{
    let arch = ArchitectureProfile::lp64();
    let value = MemoryContext::detached().value("s", Rc::new(libstdcpp::string(&arch)), Address::new(OBJECT));

    assert_eq!(summarize(string_summary, &*value), (false, String::new()));
    assert_eq!(summarize(wstring_summary, &*value), (false, String::new()));
}

#[test]
fn test_wide_string_utf32_keeps_zeros()
{
    let arch = ArchitectureProfile::lp64();
    let mut target = Target::new(arch);
    target.words(OBJECT, &[DATA, 4]).units32(DATA, &[u32::from('h'), 0, 0x1f600, u32::from('!')]);
    let host = target.attach();

    let (ok, out) = summarize(wstring_summary, &*wide(&host, &arch));
    assert!(ok);
    assert_eq!(out, "L\"h\\0\u{1f600}!\"");
    assert_eq!(host.reads(), vec![(OBJECT, 8), (OBJECT + 8, 8), (DATA, 16)]);
}

#[test]
fn test_wide_string_utf16()
{
    let arch = ArchitectureProfile::llp64();
    let mut target = Target::new(arch);
    target.words(OBJECT, &[DATA, 4]).units16(DATA, &[0x63, 0x61, 0x66, 0xe9]);
    let host = target.attach();

    let (ok, out) = summarize(wstring_summary, &*wide(&host, &arch));
    assert!(ok);
    assert_eq!(out, "L\"caf\u{e9}\"");
    assert_eq!(host.reads().last(), Some(&(DATA, 8)));
}

#[test]
fn test_wide_string_with_byte_wide_wchar()
{
    let arch = ArchitectureProfile::lp64().with_wchar_bit_size(Some(8));
    let mut target = Target::new(arch);
    target.words(OBJECT, &[DATA, 3]).bytes(DATA, b"a\0b");
    let host = target.attach();

    assert_eq!(
        summarize(wstring_summary, &*wide(&host, &arch)),
        (true, "L\"a\\0b\"".to_owned())
    );
}

#[test]
fn test_wide_string_with_unsupported_wchar_width()
{
    for bits in [Some(24), None] {
        let arch = ArchitectureProfile::lp64().with_wchar_bit_size(bits);
        let mut target = Target::new(arch);
        target.words(OBJECT, &[DATA, 2]).bytes(DATA, &[0; 8]);
        let host = target.attach();

        assert_eq!(
            summarize(wstring_summary, &*wide(&host, &arch)),
            (true, INVALID_WCHAR_SIZE.to_owned())
        );
        // The header is still read; the payload is not
        assert_eq!(host.reads(), vec![(OBJECT, 8), (OBJECT + 8, 8)]);
    }
}

#[test]
fn test_empty_wide_string()
{
    let arch = ArchitectureProfile::lp64();
    let mut target = Target::new(arch);
    target.words(OBJECT, &[DATA, 0]);
    let host = target.attach();

    assert_eq!(summarize(wstring_summary, &*wide(&host, &arch)), (true, "L\"\"".to_owned()));
}
