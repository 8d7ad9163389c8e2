use crate::output::Format;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "patscan - pattern-based source-code security linter",
    subcommand_required = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan files or directories for rule violations
    Scan(ScanArgs),
    /// Rule set maintenance
    #[command(subcommand)]
    Rules(RulesCmd),
}

#[derive(ClapArgs)]
pub struct ScanArgs {
    /// Files or directories to analyze
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Directory containing rule files
    #[arg(long)]
    pub rules: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Settings file (TOML)
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Rule ids to skip, repeatable
    #[arg(long = "ignore-rule")]
    pub ignore_rules: Vec<String>,

    /// Enable manual-review rules
    #[arg(long)]
    pub manual_review: bool,

    /// Disable best-practice rules
    #[arg(long)]
    pub no_best_practice: bool,

    /// Only print findings
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose diagnostics on stderr
    #[arg(long)]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum RulesCmd {
    /// Check that every rule file loads and every pattern compiles
    Verify {
        /// Directory containing rule files
        path: PathBuf,
    },
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
