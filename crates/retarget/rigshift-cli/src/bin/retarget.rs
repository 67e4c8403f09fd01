use std::process::ExitCode;

use anyhow::{Context, Result};
use rigshift_cli::{exit_code_of, init_tracing, load_config, parse_or_exit, RetargetArgs};
use rigshift_core::{run_retarget, Host};
use tracing::error;

fn run(args: RetargetArgs) -> Result<()> {
    let mut cfg = load_config(args.config.as_ref()).context("loading configuration")?;
    if let Some(mode) = args.mode {
        cfg.mode = mode.into();
    }
    let report = run_retarget(
        Host::json(),
        &args.character,
        &args.animation,
        &args.output,
        &cfg,
    )?;
    println!(
        "Retargeted '{}' [{}, {}] ({} bones{}) -> {}",
        report.clip_name,
        report.range.start,
        report.range.end,
        report.mapped_bones,
        if report.auto_rigged { ", auto-rigged" } else { "" },
        args.output.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = match parse_or_exit::<RetargetArgs>() {
        Ok(args) => args,
        Err(code) => return code,
    };
    init_tracing();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(exit_code_of(&err))
        }
    }
}
