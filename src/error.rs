//! Error handling for the stencil application.
//! Defines custom error types and results used around the rendering engine.
//!
//! Rendering itself is total and never produces an error; everything here
//! covers the I/O surface that feeds templates and contexts into it.

use std::io;
use thiserror::Error;

/// Custom error types for stencil operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// Represents errors that occur while reading a template file
    #[error("Template error: {0}.")]
    TemplateError(String),

    /// Represents errors that occur while parsing the render context
    #[error("Context error: {0}.")]
    ContextError(String),
}

/// Convenience type alias for Results with stencil's Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The Error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{}", err);
    std::process::exit(1);
}
