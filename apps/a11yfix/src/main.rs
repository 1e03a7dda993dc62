//! a11yfix CLI binary entry point.
//! Resolves configuration, delegates to the runner, and prints results.

use a11yfix::cli::{Cli, Commands, RepairArgs};
use a11yfix::config::{self, Effective};
use a11yfix::utils::{error_prefix, info_prefix, note_prefix};
use a11yfix::{engine, output, runner};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Log to stderr; `A11YFIX_LOG` takes an `EnvFilter` directive.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("A11YFIX_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn resolve_or_exit(args: &RepairArgs) -> Effective {
    match config::resolve_effective(args.overrides()) {
        Ok(eff) => eff,
        Err(e) => {
            eprintln!("{} {}", error_prefix(), e);
            std::process::exit(2);
        }
    }
}

fn run_stdin(eff: &Effective) {
    let html = match std::io::read_to_string(std::io::stdin()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{} failed to read stdin: {}", error_prefix(), e);
            std::process::exit(2);
        }
    };
    let res = engine::repair(&html, &eff.repair);
    output::print_single(&res, &eff.output);
    if eff.check && (res.changed() || res.summary.needs_manual_review > 0) {
        std::process::exit(1);
    }
}

fn run_files(args: RepairArgs, eff: Effective) {
    if !eff.config_found && eff.output != "json" {
        eprintln!("{} No a11yfix.toml found; using defaults.", note_prefix());
    }
    let patterns = if args.paths.is_empty() {
        if eff.output != "json" {
            eprintln!("{} Using include patterns: [{}]", info_prefix(), eff.include.join(", "));
        }
        eff.include.clone()
    } else {
        args.paths
    };
    // --diff and --check preview only
    let write = eff.write && !eff.diff && !eff.check;
    let (reports, errors) = runner::run_repair(&eff.repo_root, &patterns, &eff.repair, write);
    output::print_repair(&reports, &eff.output, write, eff.diff, &errors);
    if !errors.is_empty() {
        std::process::exit(2);
    }
    if eff.check
        && reports
            .iter()
            .any(|r| r.changed() || r.result.summary.needs_manual_review > 0)
    {
        std::process::exit(1);
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Rules { output: mode } => {
            output::print_rules(mode.as_deref().unwrap_or("human"));
        }
        Commands::Repair(args) => {
            let eff = resolve_or_exit(&args);
            if args.is_stdin() {
                run_stdin(&eff);
            } else {
                run_files(args, eff);
            }
        }
    }
}
