use agent_embed::EmbedError;
use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod workflow;

use cli::{Command, RootArgs};
use workflow::WorkflowContext;

fn main() -> ExitCode {
    let args = RootArgs::parse();
    init_tracing(args.global.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &RootArgs) -> Result<()> {
    // List and validate never touch the backup directory, so a broken config
    // should not stop them.
    match &args.command {
        Command::List(cmd) => return workflow::run_list(cmd),
        Command::Validate(cmd) => return workflow::run_validate(cmd),
        _ => {}
    }

    let ctx = WorkflowContext::load(&args.global)?;
    match &args.command {
        Command::Embed(cmd) => workflow::run_embed(&ctx, cmd),
        Command::Unembed(cmd) => workflow::run_unembed(&ctx, cmd),
        Command::Export(cmd) => workflow::run_export(&ctx, cmd),
        Command::Backups(cmd) => workflow::run_backups(&ctx, cmd),
        Command::Restore(cmd) => workflow::run_restore(&ctx, cmd),
        Command::Cleanup(cmd) => workflow::run_cleanup(&ctx, cmd),
        Command::List(_) | Command::Validate(_) => Ok(()),
    }
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
/// `RUST_LOG` wins unless `--verbose` is given.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn report_error(err: &anyhow::Error) {
    eprintln!("error: {err:#}");
    let Some(engine) = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<EmbedError>())
    else {
        return;
    };
    let steps = engine.remediation();
    if !steps.is_empty() {
        eprintln!();
        eprintln!("To recover:");
        for step in steps {
            eprintln!("  - {step}");
        }
    }
    if engine.requires_manual_intervention() {
        eprintln!();
        eprintln!("Manual intervention required; nothing will be retried automatically.");
    }
}
