use clap::ValueEnum;
use engine::{Problem, Severity};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
/// Problems grouped by the file they were found in.
pub struct FileProblems {
    pub file: String,
    pub problems: Vec<Problem>,
}

pub fn print_results(results: &[FileProblems], format: Format) -> anyhow::Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(results)?),
        Format::Text => {
            for entry in results {
                for p in &entry.problems {
                    let text = if p.message.is_empty() { &p.name } else { &p.message };
                    println!(
                        "{}:{}:{} [{}] {}: {}",
                        entry.file,
                        p.range.start.line + 1,
                        p.range.start.character + 1,
                        p.severity,
                        p.rule_id,
                        text
                    );
                }
            }
        }
    }
    Ok(())
}

/// Findings that should fail the scan; suppression markers do not count.
pub fn live_problem_count(results: &[FileProblems]) -> usize {
    results
        .iter()
        .flat_map(|r| r.problems.iter())
        .filter(|p| p.severity != Severity::WarningInfo)
        .count()
}
