// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Command dispatch and execution.

use crate::config::{format, Configuration, Value};
use crate::error::Result;
use std::io::Write;

use super::args::{Cli, Commands, OutputFormat};
use super::context::{InvocationContext, SharedState};

/// Run the CLI with the given arguments, writing to stdout.
pub fn run(cli: Cli) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_with_output(cli, &mut out)
}

/// Run the CLI with the given arguments, writing to `out`.
pub fn run_with_output(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let mut ctx = InvocationContext::new(cli.name.as_str());
    let explicit = cli.config_paths();
    if !explicit.is_empty() {
        ctx.obj = Some(SharedState::with_config(Configuration::with_paths(
            cli.name.as_str(),
            explicit,
        )));
    }
    let cfg = Configuration::from_context(&mut ctx);

    tracing::debug!("Running {} command for {}", cli.command.name(), cfg.name());

    match &cli.command {
        Commands::Locations { missing } => run_locations(cfg, cli.format, *missing, out),
        Commands::Dump => run_dump(cfg, cli.format, out),
        Commands::Get { key, default } => run_get(cfg, cli.format, key, default.as_deref(), out),
        Commands::Show => {
            let sub = InvocationContext::new(cli.command.name());
            let section = cfg.section(&sub)?.clone();
            write_value(&Value::Section(section), cli.format, out)
        }
    }
}

/// Run the locations command.
fn run_locations(
    cfg: &Configuration,
    output_format: OutputFormat,
    missing: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let locations = cfg.locations(!missing);

    match output_format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &locations)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            for path in &locations {
                writeln!(out, "{}", path.display())?;
            }
        }
    }
    Ok(())
}

/// Run the dump command.
fn run_dump(
    cfg: &mut Configuration,
    output_format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    match output_format {
        OutputFormat::Json => {
            let values = cfg.load()?;
            serde_json::to_writer_pretty(&mut *out, &*values)?;
            writeln!(out)?;
            Ok(())
        }
        OutputFormat::Text => cfg.dump(out),
    }
}

/// Run the get command.
fn run_get(
    cfg: &mut Configuration,
    output_format: OutputFormat,
    key: &str,
    default: Option<&str>,
    out: &mut dyn Write,
) -> Result<()> {
    let value = match default {
        Some(default) => cfg.get_or(key, default)?,
        None => cfg.get(key)?.clone(),
    };
    write_value(&value, output_format, out)
}

fn write_value(value: &Value, output_format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    match (output_format, value) {
        (OutputFormat::Json, value) => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        (OutputFormat::Text, Value::Scalar(text)) => writeln!(out, "{}", text)?,
        (OutputFormat::Text, Value::Section(section)) => format::write(section, out)?,
    }
    Ok(())
}
