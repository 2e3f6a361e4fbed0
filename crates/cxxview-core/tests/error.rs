//! Tests for error handling

use cxxview_core::error::{FormatterError, FormatterResult};
use cxxview_core::memory::architecture_of_image;

#[test]
fn test_read_failed_display()
{
    let error = FormatterError::ReadFailed {
        address: 0x1000,
        len: 8,
        reason: "not captured".to_string(),
    };
    let message = format!("{}", error);
    assert!(message.contains("8 bytes"));
    assert!(message.contains("0x1000"));
    assert!(message.contains("not captured"));
}

#[test]
fn test_invalid_address_display()
{
    let message = format!("{}", FormatterError::InvalidAddress(0xdead));
    assert!(message.contains("0xdead"));
}

#[test]
fn test_unsupported_width_display()
{
    let message = format!("{}", FormatterError::UnsupportedAddressWidth(2));
    assert!(message.contains("2 bytes"));
}

#[test]
fn test_io_error_conversion()
{
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let error: FormatterError = io.into();

    match error {
        FormatterError::Io(_) => {
            // Expected: io::Error should convert to Io variant
        }
        _ => panic!("Expected Io variant"),
    }
}

#[test]
fn test_fmt_error_conversion()
{
    let error: FormatterError = std::fmt::Error.into();
    assert!(matches!(error, FormatterError::Output(_)));
}

#[test]
fn test_garbage_image_is_an_object_error()
{
    match architecture_of_image(b"definitely not an executable") {
        Err(FormatterError::ObjectParse(_)) => {}
        other => panic!("Expected ObjectParse, got {other:?}"),
    }
}

#[test]
fn test_result_type()
{
    let _result: FormatterResult<()> = Ok(());
    let _error_result: FormatterResult<()> = Err(FormatterError::NoProcess);
}
