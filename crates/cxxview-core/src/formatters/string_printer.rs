//! # String Printer
//!
//! Reads a character buffer out of the target and renders it as a quoted,
//! escaped literal. This is the "render" half of the string summaries; the
//! summaries only work out where the buffer is and how long it is.
//!
//! ## Output format
//!
//! ```text
//! L"caf\u{e9}\n"...
//! ^ ^            ^
//! | |            +-- appended when capping cut the string short
//! | +--------------- quote character
//! +----------------- optional prefix token
//! ```
//!
//! Control characters are escaped C-style (`\n`, `\t`, `\0`, `\x1b`), bytes
//! that are not valid UTF-8 become `\xNN`, unpaired UTF-16 surrogates become
//! `\uNNNN` and out-of-range UTF-32 units become `\UNNNNNNNN`.

use std::fmt::{self, Write as _};

use smallvec::SmallVec;
use tracing::trace;

use crate::error::{FormatterError, FormatterResult};
use crate::host::Process;
use crate::types::{Address, ArchitectureProfile};

/// Default cap on the number of characters rendered in a summary
pub const DEFAULT_MAX_STRING_SUMMARY_LEN: usize = 1024;

/// Largest payload fetched for one string, capped or not
pub const MAX_STRING_PAYLOAD_BYTES: usize = 64 << 20;

/// Character encoding of the code units in a string buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringElementType
{
    /// 8-bit code units
    Utf8,
    /// 16-bit code units in target byte order
    Utf16,
    /// 32-bit code units in target byte order
    Utf32,
}

impl StringElementType
{
    /// Size of one code unit in bytes
    pub const fn unit_size(self) -> usize
    {
        match self {
            StringElementType::Utf8 => 1,
            StringElementType::Utf16 => 2,
            StringElementType::Utf32 => 4,
        }
    }
}

/// Host-wide options that apply to every summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions
{
    /// Limit how many characters are read and rendered
    pub capping: bool,
    /// Limit applied when `capping` is on
    pub max_string_len: usize,
}

impl Default for SummaryOptions
{
    fn default() -> Self
    {
        Self {
            capping: true,
            max_string_len: DEFAULT_MAX_STRING_SUMMARY_LEN,
        }
    }
}

impl SummaryOptions
{
    /// Options that never truncate
    #[must_use]
    pub const fn uncapped() -> Self
    {
        Self {
            capping: false,
            max_string_len: DEFAULT_MAX_STRING_SUMMARY_LEN,
        }
    }
}

/// Where a string's characters live and how to render them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadStringOptions
{
    /// Address of the first code unit
    pub location: Address,
    /// Declared length in code units (not bytes)
    pub source_size: u64,
    /// Emitted before the opening quote, e.g. `L` for wide strings
    pub prefix_token: Option<&'static str>,
    /// Quote character; `None` renders the bare text
    pub quote: Option<char>,
    /// Stop at the first zero code unit inside the declared length
    pub binary_zero_is_terminator: bool,
    /// Escape control characters and invalid sequences
    pub escape_non_printables: bool,
}

impl ReadStringOptions
{
    /// Options for `source_size` code units at `location`, quoted with `"`
    pub fn new(location: Address, source_size: u64) -> Self
    {
        Self {
            location,
            source_size,
            prefix_token: None,
            quote: Some('"'),
            binary_zero_is_terminator: true,
            escape_non_printables: true,
        }
    }

    /// Set the prefix token
    #[must_use]
    pub fn with_prefix_token(mut self, prefix: &'static str) -> Self
    {
        self.prefix_token = Some(prefix);
        self
    }

    /// Set whether an embedded zero ends the string
    #[must_use]
    pub fn with_binary_zero_is_terminator(mut self, terminates: bool) -> Self
    {
        self.binary_zero_is_terminator = terminates;
        self
    }
}

/// Read a string from `process` and write its rendering to `stream`
///
/// Performs at most one memory read. Nothing is written to `stream` unless
/// the read succeeds, so callers can fall back to a placeholder.
///
/// ## Errors
///
/// - `InvalidAddress`: `options.location` is null or the invalid sentinel
///   (only when there is something to read)
/// - `InvalidArgument`: the byte length overflows the host's `usize`
/// - `ReadFailed`: the buffer could not be read
/// - `Output`: `stream` rejected the text
pub fn read_string_and_dump(
    process: &dyn Process,
    element_type: StringElementType,
    options: &ReadStringOptions,
    summary: &SummaryOptions,
    stream: &mut dyn fmt::Write,
) -> FormatterResult<()>
{
    let mut count = options.source_size;
    let truncated = summary.capping && count > summary.max_string_len as u64;
    if truncated {
        count = summary.max_string_len as u64;
    }

    let mut rendered = String::new();
    if let Some(prefix) = options.prefix_token {
        rendered.push_str(prefix);
    }
    if let Some(quote) = options.quote {
        rendered.push(quote);
    }

    if count > 0 {
        if !options.location.is_resolved() {
            return Err(FormatterError::InvalidAddress(options.location.value()));
        }

        let byte_len = usize::try_from(count)
            .ok()
            .and_then(|units| units.checked_mul(element_type.unit_size()))
            .filter(|&bytes| bytes <= MAX_STRING_PAYLOAD_BYTES)
            .ok_or_else(|| FormatterError::InvalidArgument(format!("string of {count} code units is too large")))?;

        trace!(location = %options.location, byte_len, ?element_type, "reading string payload");
        let bytes = process.read_memory(options.location, byte_len)?;
        let arch = process.architecture();
        decode_into(&mut rendered, &bytes, element_type, &arch, options);
    }

    if let Some(quote) = options.quote {
        rendered.push(quote);
    }
    if truncated {
        rendered.push_str("...");
    }

    stream.write_str(&rendered)?;
    Ok(())
}

fn decode_into(
    out: &mut String,
    bytes: &[u8],
    element_type: StringElementType,
    arch: &ArchitectureProfile,
    options: &ReadStringOptions,
)
{
    let escaper = Escaper {
        quote: options.quote,
        enabled: options.escape_non_printables,
    };

    match element_type {
        StringElementType::Utf8 => {
            let bytes = if options.binary_zero_is_terminator {
                bytes.split(|&b| b == 0).next().unwrap_or_default()
            } else {
                bytes
            };
            for chunk in bytes.utf8_chunks() {
                for c in chunk.valid().chars() {
                    escaper.push(out, c);
                }
                for b in chunk.invalid() {
                    push_hex(out, "\\x", u32::from(*b), 2);
                }
            }
        }
        StringElementType::Utf16 => {
            let units = code_units(bytes, 2, arch, options.binary_zero_is_terminator);
            let units = units.iter().map(|&unit| u16::try_from(unit).unwrap_or(u16::MAX));
            for decoded in char::decode_utf16(units) {
                match decoded {
                    Ok(c) => escaper.push(out, c),
                    Err(err) => push_hex(out, "\\u", u32::from(err.unpaired_surrogate()), 4),
                }
            }
        }
        StringElementType::Utf32 => {
            for unit in code_units(bytes, 4, arch, options.binary_zero_is_terminator) {
                match char::from_u32(unit) {
                    Some(c) => escaper.push(out, c),
                    None => push_hex(out, "\\U", unit, 8),
                }
            }
        }
    }
}

/// Split `bytes` into `width`-byte units, stopping at a zero unit if asked
fn code_units(bytes: &[u8], width: usize, arch: &ArchitectureProfile, zero_terminates: bool) -> SmallVec<[u32; 64]>
{
    let mut units = SmallVec::new();
    for chunk in bytes.chunks_exact(width) {
        let unit = arch.decode_unsigned(chunk).and_then(|v| u32::try_from(v).ok()).unwrap_or(0);
        if unit == 0 && zero_terminates {
            break;
        }
        units.push(unit);
    }
    units
}

struct Escaper
{
    quote: Option<char>,
    enabled: bool,
}

impl Escaper
{
    fn push(&self, out: &mut String, c: char)
    {
        if !self.enabled {
            out.push(c);
            return;
        }

        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            '\\' => out.push_str("\\\\"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\u{b}' => out.push_str("\\v"),
            '\u{c}' => out.push_str("\\f"),
            c if Some(c) == self.quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => push_hex(out, "\\x", u32::from(c), 2),
            c => out.push(c),
        }
    }
}

fn push_hex(out: &mut String, prefix: &str, value: u32, width: usize)
{
    out.push_str(prefix);
    // Writing into a String cannot fail
    let _ = write!(out, "{value:0width$x}");
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::memory::MemorySnapshot;

    fn snapshot(bytes: &[u8]) -> MemorySnapshot
    {
        let mut snapshot = MemorySnapshot::new(ArchitectureProfile::lp64());
        snapshot.add_region(Address::new(0x1000), bytes.to_vec()).unwrap();
        snapshot
    }

    fn render(bytes: &[u8], element_type: StringElementType, options: &ReadStringOptions) -> String
    {
        let process = snapshot(bytes);
        let mut out = String::new();
        read_string_and_dump(&process, element_type, options, &SummaryOptions::default(), &mut out).unwrap();
        out
    }

    #[test]
    fn test_utf8_escapes_controls_and_quotes()
    {
        let options = ReadStringOptions::new(Address::new(0x1000), 7);
        assert_eq!(render(b"a\"b\n\\\x1b!", StringElementType::Utf8, &options), r#""a\"b\n\\\x1b!""#);
    }

    #[test]
    fn test_utf8_invalid_bytes_are_hex_escaped()
    {
        let options = ReadStringOptions::new(Address::new(0x1000), 3);
        assert_eq!(render(&[b'o', 0xff, b'k'], StringElementType::Utf8, &options), r#""o\xffk""#);
    }

    #[test]
    fn test_utf8_zero_terminator_policy()
    {
        let terminated = ReadStringOptions::new(Address::new(0x1000), 5);
        assert_eq!(render(b"ab\0cd", StringElementType::Utf8, &terminated), r#""ab""#);

        let kept = terminated.with_binary_zero_is_terminator(false);
        assert_eq!(render(b"ab\0cd", StringElementType::Utf8, &kept), r#""ab\0cd""#);
    }

    #[test]
    fn test_utf16_unpaired_surrogate()
    {
        let bytes = [b'h', 0, 0x00, 0xd8, b'i', 0];
        let options = ReadStringOptions::new(Address::new(0x1000), 3).with_prefix_token("L");
        assert_eq!(render(&bytes, StringElementType::Utf16, &options), r#"L"h\ud800i""#);
    }

    #[test]
    fn test_utf32_out_of_range_unit()
    {
        let mut bytes = Vec::new();
        for unit in [0x41u32, 0x0011_0000, 0x1f600] {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let options = ReadStringOptions::new(Address::new(0x1000), 3);
        assert_eq!(render(&bytes, StringElementType::Utf32, &options), "\"A\\U00110000\u{1f600}\"");
    }

    #[test]
    fn test_capping_truncates_and_marks()
    {
        let process = snapshot(b"abcdefgh");
        let options = ReadStringOptions::new(Address::new(0x1000), 8);
        let summary = SummaryOptions {
            capping: true,
            max_string_len: 3,
        };
        let mut out = String::new();
        read_string_and_dump(&process, StringElementType::Utf8, &options, &summary, &mut out).unwrap();
        assert_eq!(out, r#""abc"..."#);
    }

    #[test]
    fn test_oversized_payload_is_rejected_before_reading()
    {
        let process = snapshot(b"hi");
        let options = ReadStringOptions::new(Address::new(0x1000), 1 << 62);
        let mut out = String::new();
        let result = read_string_and_dump(&process, StringElementType::Utf32, &options, &SummaryOptions::uncapped(), &mut out);
        assert!(matches!(result, Err(FormatterError::InvalidArgument(_))));
        assert!(out.is_empty());
    }

    #[test]
    fn test_empty_string_needs_no_read()
    {
        let process = MemorySnapshot::new(ArchitectureProfile::lp64());
        let options = ReadStringOptions::new(Address::ZERO, 0);
        let mut out = String::new();
        read_string_and_dump(&process, StringElementType::Utf8, &options, &SummaryOptions::default(), &mut out)
            .unwrap();
        assert_eq!(out, "\"\"");
    }

    #[test]
    fn test_failed_read_writes_nothing()
    {
        let process = MemorySnapshot::new(ArchitectureProfile::lp64());
        let options = ReadStringOptions::new(Address::new(0x1000), 4);
        let mut out = String::new();
        let result =
            read_string_and_dump(&process, StringElementType::Utf8, &options, &SummaryOptions::default(), &mut out);
        assert!(result.is_err());
        assert!(out.is_empty());
    }
}
