//! Command-line interface implementation for stencil.
//! Provides argument parsing and help text formatting using clap, plus
//! context loading from a JSON file or stdin.

use crate::error::{Error, Result};
use clap::{error::ErrorKind, CommandFactory, Parser};
use std::io::Read;
use std::path::PathBuf;

/// Command-line arguments structure for stencil.
#[derive(Parser, Debug)]
#[command(author, version, about = "stencil: fail-open template rendering for prompt and report text", long_about = None)]
pub struct Args {
    /// Path to the template file to render
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Path to a JSON file with the render context
    #[arg(short, long, value_name = "FILE")]
    pub context: Option<PathBuf>,

    /// Read the JSON render context from stdin
    #[arg(short, long)]
    pub stdin: bool,

    /// Write rendered output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Returns
/// * `Args` - Parsed command line arguments
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help()
                    .unwrap();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}

/// Loads the render context according to the parsed arguments: a JSON
/// file when `--context` is given, stdin when `--stdin` is set, and an
/// empty object otherwise.
pub fn load_context(args: &Args) -> Result<serde_json::Value> {
    if let Some(path) = &args.context {
        let raw = std::fs::read_to_string(path)?;
        return parse_context(&raw);
    }
    if args.stdin {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        return parse_context(&raw);
    }
    Ok(serde_json::Value::Object(serde_json::Map::new()))
}

/// Parses a raw JSON string into a context object.
pub fn parse_context(raw: &str) -> Result<serde_json::Value> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| Error::ContextError(format!("invalid JSON context: {}", e)))?;
    if !value.is_object() {
        return Err(Error::ContextError("context must be a JSON object".to_string()));
    }
    Ok(value)
}
