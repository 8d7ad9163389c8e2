//! Entry point for the command-line interface.

use patscan::args::{parse_cli, Commands, RulesCmd};
use patscan::scan::{run_scan, verify_rules};

fn main() -> anyhow::Result<()> {
    let cli = parse_cli();
    match cli.command {
        Commands::Scan(args) => run_scan(args),
        Commands::Rules(RulesCmd::Verify { path }) => verify_rules(&path),
    }
}
