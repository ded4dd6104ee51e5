//! `regdef` - build, write and print the registration definition.

use anyhow::{Context, Result};
use std::fs;

use regdef_core::{default_output_path, Pipeline, RegdefError};

use super::args::Cli;
use crate::exit_codes;
use crate::prompt::TerminalPrompt;

pub fn run(cli: Cli) -> i32 {
    match run_build(&cli) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            if let Some(err) = e.downcast_ref::<RegdefError>() {
                eprintln!("error: {}: {err}", err.stage());
                err.exit_code()
            } else {
                eprintln!("error: {e:#}");
                exit_codes::OUTPUT_ERROR
            }
        }
    }
}

fn run_build(cli: &Cli) -> Result<()> {
    let pipeline = Pipeline::with_docker(cli.build_config(), TerminalPrompt);
    let definition = pipeline.build(&cli.request())?;
    let data = definition.to_canonical_string()?;

    let output = cli.outputfile.clone().unwrap_or_else(default_output_path);
    fs::write(&output, &data).with_context(|| {
        format!(
            "failed to write registration definition: {}",
            output.display()
        )
    })?;
    tracing::info!(path = %output.display(), "wrote registration definition");

    println!("{data}");
    Ok(())
}
