use std::process::ExitCode;

use anyhow::Result;
use rigshift_cli::{init_tracing, parse_or_exit, AutoRigArgs};
use rigshift_core::{run_auto_rig, Host};
use tracing::error;

fn run(args: AutoRigArgs) -> Result<()> {
    let report = run_auto_rig(Host::json(), &args.input, &args.output)?;
    println!(
        "Rigged {} mesh(es) with '{}' ({} bones, height {:.3}) -> {}",
        report.meshes,
        report.skeleton,
        report.bones,
        report.height,
        args.output.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = match parse_or_exit::<AutoRigArgs>() {
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
