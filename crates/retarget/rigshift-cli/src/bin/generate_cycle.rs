use std::process::ExitCode;

use anyhow::{Context, Result};
use rigshift_cli::{init_tracing, load_config, parse_or_exit, GenerateArgs};
use rigshift_core::{run_generate_cycle, Host};
use tracing::error;

fn run(args: GenerateArgs) -> Result<()> {
    let cfg = load_config(args.config.as_ref()).context("loading configuration")?;
    let report = run_generate_cycle(Host::json(), &args.input, &args.output, &cfg)?;
    println!(
        "Generated '{}' [{}, {}] for {} locomotion roles -> {}",
        report.clip_name,
        report.range.start,
        report.range.end,
        report.roles,
        args.output.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = match parse_or_exit::<GenerateArgs>() {
        Ok(args) => args,
        Err(code) => return code,
    };
    init_tracing();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
