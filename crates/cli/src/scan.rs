use crate::args::ScanArgs;
use crate::config::load_settings;
use crate::languages::language_id;
use crate::output::{live_problem_count, print_results, FileProblems};
use engine::{Analyzer, Settings};
use rules::{load_rules, validate_rules, visit};
use std::fs;
use std::path::Path;
use tracing::{debug, level_filters::LevelFilter};

fn init_tracing(args: &ScanArgs) {
    let level = if args.debug {
        LevelFilter::DEBUG
    } else if args.quiet {
        LevelFilter::ERROR
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_settings(args: &ScanArgs) -> anyhow::Result<Settings> {
    let mut settings = match &args.settings {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };
    settings
        .ignore_rules_list
        .extend(args.ignore_rules.iter().cloned());
    if args.manual_review {
        settings.enable_manual_review_rules = true;
    }
    if args.no_best_practice {
        settings.enable_best_practice_rules = false;
    }
    Ok(settings)
}

pub fn run_scan(args: ScanArgs) -> anyhow::Result<()> {
    init_tracing(&args);
    let rule_set = load_rules(&args.rules)?;
    let settings = build_settings(&args)?;
    if settings.validate_rules_files {
        validate_rules(&rule_set)?;
    }
    debug!(rules = rule_set.rules.len(), "Rule set loaded");
    let analyzer = Analyzer::new(rule_set, settings);

    let mut results: Vec<FileProblems> = Vec::new();
    let excl = |p: &Path| {
        p.file_name()
            .and_then(|n| n.to_str())
            .map(|n| n == ".git")
            .unwrap_or(false)
    };
    for path in &args.paths {
        visit(path, &excl, &mut |file| {
            let Some(lang) = language_id(file) else {
                debug!(file = %file.display(), "Unknown language, skipping");
                return Ok(());
            };
            let text = match fs::read_to_string(file) {
                Ok(text) => text,
                Err(e) => {
                    debug!(file = %file.display(), error = %e, "Unreadable file, skipping");
                    return Ok(());
                }
            };
            let uri = file.display().to_string();
            let problems = analyzer.analyze(&text, lang, &uri);
            debug!(file = %uri, count = problems.len(), "File analyzed");
            if !problems.is_empty() {
                results.push(FileProblems {
                    file: uri,
                    problems,
                });
            }
            Ok(())
        })?;
    }

    print_results(&results, args.format)?;
    if live_problem_count(&results) > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// `patscan rules verify`: loads a rule directory and compiles every
/// pattern, condition and fix.
pub fn verify_rules(path: &Path) -> anyhow::Result<()> {
    let rule_set = load_rules(path)?;
    validate_rules(&rule_set)?;
    println!("{} rules OK", rule_set.rules.len());
    Ok(())
}
