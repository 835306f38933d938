//! stencil's main application entry point.
//! Reads a template file, loads a JSON context, renders, and writes the
//! result to stdout or a file. Rendering itself cannot fail; every error
//! surfaced here comes from the I/O around it.

use std::fs;

use stencil::{
    cli::{get_args, load_context, Args},
    error::{default_error_handler, Error, Result},
    renderer::{Engine, TemplateRenderer},
};

/// Main application entry point.
fn main() {
    let args = get_args();

    // Logger configuration
    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Off
        })
        .init();

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

fn run(args: Args) -> Result<()> {
    let template = fs::read_to_string(&args.template).map_err(|e| {
        Error::TemplateError(format!("cannot read '{}': {}", args.template.display(), e))
    })?;
    let context = load_context(&args)?;

    let engine = Engine::new();
    let rendered = engine.render(&template, &context);

    match &args.output {
        Some(path) => fs::write(path, rendered)?,
        None => print!("{}", rendered),
    }
    Ok(())
}
