use std::io;

use stencil::error::Error;

#[test]
fn test_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();

    match err {
        Error::IoError(_) => (),
        _ => panic!("Expected IoError variant"),
    }
}

#[test]
fn test_error_display() {
    let err = Error::ContextError("invalid JSON context".to_string());
    assert_eq!(err.to_string(), "Context error: invalid JSON context.");

    let err = Error::TemplateError("cannot read 'x'".to_string());
    assert_eq!(err.to_string(), "Template error: cannot read 'x'.");
}
