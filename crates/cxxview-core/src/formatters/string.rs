//! `std::string` and `std::wstring` summaries.
//!
//! A libstdc++ `basic_string` starts with a pointer to its character buffer
//! followed by its length in characters:
//!
//! ```text
//! +-------------+--------------------+----------------------------+
//! | _M_p        | _M_string_length   | _M_local_buf / capacity    |
//! +-------------+--------------------+----------------------------+
//! ^ object      ^ object + ptr size
//! ```
//!
//! Each summary costs two pointer-sized reads for those fields plus one
//! read of the payload.

use std::fmt;

use tracing::debug;

use super::string_printer::{read_string_and_dump, ReadStringOptions, StringElementType, SummaryOptions};
use crate::host::{Process, ProcessRef, ValueObject};
use crate::types::{Address, ArchitectureProfile};

/// Written when the payload read fails
pub const SUMMARY_UNAVAILABLE: &str = "Summary Unavailable";

/// Written when the target's `wchar_t` width is not 8, 16 or 32 bits
pub const INVALID_WCHAR_SIZE: &str = "size for wchar_t is not valid";

/// Prefix that marks wide string output
pub const WIDE_PREFIX: &str = "L";

/// Render a narrow `std::string` into `stream`
///
/// The text is decoded as UTF-8 and stops at the first embedded zero.
/// Returns `false` only when no summary could be attempted at all (no
/// process, no readable address, unreadable header). An unreadable payload
/// still returns `true` after writing [`SUMMARY_UNAVAILABLE`].
pub fn string_summary(valobj: &dyn ValueObject, stream: &mut dyn fmt::Write, options: &SummaryOptions) -> bool
{
    let Some((process, payload)) = locate_payload(valobj) else {
        return false;
    };

    let read_options = payload.read_options().with_binary_zero_is_terminator(true);
    render(&*process, StringElementType::Utf8, &read_options, options, stream)
}

/// Render a wide `std::wstring` into `stream`
///
/// Output carries the [`WIDE_PREFIX`], embedded zeros are kept as content,
/// and code units are decoded according to the target's `wchar_t` width.
/// An unusable width writes [`INVALID_WCHAR_SIZE`] and still returns `true`.
pub fn wstring_summary(valobj: &dyn ValueObject, stream: &mut dyn fmt::Write, options: &SummaryOptions) -> bool
{
    let Some((process, payload)) = locate_payload(valobj) else {
        return false;
    };

    let Some(element_type) = payload.arch.wide_string_element_type() else {
        debug!(
            value = valobj.name(),
            wchar_bits = ?payload.arch.wchar_bit_size(),
            "unsupported wchar_t width"
        );
        return stream.write_str(INVALID_WCHAR_SIZE).is_ok();
    };

    let read_options = payload
        .read_options()
        .with_binary_zero_is_terminator(false)
        .with_prefix_token(WIDE_PREFIX);
    render(&*process, element_type, &read_options, options, stream)
}

/// Buffer location and length read from a string object's header
#[derive(Debug, Clone, Copy)]
struct StringPayload
{
    arch: ArchitectureProfile,
    data: Address,
    len: u64,
}

impl StringPayload
{
    fn read_options(&self) -> ReadStringOptions
    {
        ReadStringOptions::new(self.data, self.len)
    }
}

fn locate_payload(valobj: &dyn ValueObject) -> Option<(ProcessRef, StringPayload)>
{
    let (object, address_type) = valobj.address_of();
    if !object.is_valid() {
        debug!(value = valobj.name(), "string has no address");
        return None;
    }
    if !address_type.is_addressable() {
        debug!(value = valobj.name(), %address_type, "string is not in target memory");
        return None;
    }
    let Some(process) = valobj.process() else {
        debug!(value = valobj.name(), "string has no process");
        return None;
    };
    let arch = process.architecture();

    let data = match process.read_pointer(object) {
        Ok(data) if data.is_resolved() => data,
        Ok(data) => {
            debug!(value = valobj.name(), %data, "string buffer pointer is unset");
            return None;
        }
        Err(err) => {
            debug!(value = valobj.name(), %object, "failed to read string buffer pointer: {err}");
            return None;
        }
    };

    let len_address = object.checked_add(arch.pointer_size())?;
    let len = match process.read_pointer(len_address) {
        Ok(len) => len.value(),
        Err(err) => {
            debug!(value = valobj.name(), address = %len_address, "failed to read string length: {err}");
            return None;
        }
    };

    Some((process, StringPayload { arch, data, len }))
}

fn render(
    process: &dyn Process,
    element_type: StringElementType,
    read_options: &ReadStringOptions,
    options: &SummaryOptions,
    stream: &mut dyn fmt::Write,
) -> bool
{
    match read_string_and_dump(process, element_type, read_options, options, stream) {
        Ok(()) => true,
        Err(err) => {
            debug!(location = %read_options.location, len = read_options.source_size, "string payload unavailable: {err}");
            stream.write_str(SUMMARY_UNAVAILABLE).is_ok()
        }
    }
}
