//! CLI argument parsing via `clap`.

use crate::config::{ConfigInput, Overrides, RulesInput};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "a11yfix",
    version,
    about = "Offline accessibility repair for HTML/CSS fragments",
    long_about = "a11yfix — repairs common WCAG 2.1 defects in HTML fragments and reports what still needs a human.\n\nConfiguration precedence: CLI > a11yfix.toml > defaults.",
    after_help = "Examples:\n  a11yfix repair --diff\n  a11yfix repair 'site/**/*.html' --write\n  cat page.html | a11yfix repair - --output json\n  a11yfix rules",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current a11yfix version.")]
    Version,
    /// Repair HTML files
    #[command(
        about = "Repair HTML files",
        long_about = "Repair files matched by the given paths or globs (default: `include` from a11yfix.toml, else **/*.html). Pass `-` to read one fragment from stdin. When --diff or --check is set, write is disabled.",
        after_help = "Examples:\n  a11yfix repair --check\n  a11yfix repair page.html --disable link-title --base-px 10\n  a11yfix repair --enable th-scope,table-row-header --write"
    )]
    Repair(RepairArgs),
    /// List the rule catalog
    #[command(
        about = "List rules",
        long_about = "Print every rule with its WCAG success criterion, local code, level, and whether it auto-fixes."
    )]
    Rules {
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
}

#[derive(clap::Args, Debug, Default)]
pub struct RepairArgs {
    #[arg(help = "Files or glob patterns relative to the repository root, or `-` for stdin")]
    pub paths: Vec<String>,
    #[arg(long, help = "Repository root (default: current dir)")]
    pub repo_root: Option<String>,
    #[arg(long, help = "Config file relative to the repository root (default: a11yfix.toml|yaml|yml)")]
    pub config: Option<String>,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Write repaired files in place")]
    pub write: bool,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Show diffs for changed files (implies write=false)")]
    pub diff: bool,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Exit non-zero if files would change or need review (implies write=false)")]
    pub check: bool,
    #[arg(long, value_delimiter = ',', help = "Only run these rule ids (comma-separated)")]
    pub enable: Vec<String>,
    #[arg(long, value_delimiter = ',', help = "Skip these rule ids (comma-separated)")]
    pub disable: Vec<String>,
    #[arg(long, help = "Pixels per em (default: 16)")]
    pub base_px: Option<f64>,
    #[arg(long, help = "Points per em (default: 12)")]
    pub base_pt: Option<f64>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Keep inline width declarations")]
    pub keep_width: bool,
}

impl RepairArgs {
    /// Whether the command reads a single fragment from stdin.
    pub fn is_stdin(&self) -> bool {
        self.paths.len() == 1 && self.paths[0] == "-"
    }

    /// Map flags onto configuration overrides. Unset flags stay `None` so
    /// config file values win over defaults.
    pub fn overrides(&self) -> Overrides {
        let rules = (!self.enable.is_empty() || !self.disable.is_empty()).then(|| RulesInput {
            enabled: (!self.enable.is_empty()).then(|| self.enable.clone()),
            disabled: self.disable.clone(),
        });
        Overrides {
            repo_root: self.repo_root.clone(),
            config: self.config.clone(),
            output: self.output.clone(),
            write: self.write.then_some(true),
            diff: self.diff.then_some(true),
            check: self.check.then_some(true),
            engine: ConfigInput {
                rules,
                base_px: self.base_px,
                base_pt: self.base_pt,
                remove_width: self.keep_width.then_some(false),
                placeholders: None,
            },
        }
    }
}
