//! Scans the document with every applicable rule pattern and emits candidate
//! problems, consulting the comment oracle, the suppression detector and the
//! condition evaluator for each match.

use crate::comments::comment_style;
use crate::conditions::conditions_match;
use crate::suppression::check_suppression;
use crate::{advance_cursor, fixes, line_col_at, Position, Problem, Range};
use chrono::NaiveDate;
use rules::regexes::compile_analysis;
use rules::{Rule, RuleSet, Settings, Severity};
use tracing::{debug, warn};

fn rule_applies(rule: &Rule, lang_id: &str, uri: &str) -> bool {
    if rule.applies_to.is_empty() {
        return true;
    }
    rule.applies_to.iter().any(|entry| {
        // Entries with a dot are filename fragments, the rest are language
        // ids.
        entry.eq_ignore_ascii_case(lang_id) || (entry.contains('.') && uri.contains(entry.as_str()))
    })
}

fn match_range(doc: &str, start: usize, matched: &str) -> Range {
    let (start_line, start_col) = line_col_at(doc, start);
    let newlines = matched.matches('\n').count();
    let (end_line, end_col) = if newlines == 0 {
        (start_line, start_col + matched.len())
    } else {
        let last_newline = matched.rfind('\n').expect("match contains a newline");
        (start_line + newlines, matched.len() - last_newline - 1)
    };
    Range {
        start: Position {
            line: start_line,
            character: start_col,
        },
        end: Position {
            line: end_line,
            character: end_col,
        },
    }
}

/// Runs every rule over the document and returns the candidate problems in
/// scan order, suppression markers included. Override resolution happens
/// afterwards.
pub fn find_problems(
    doc: &str,
    lang_id: &str,
    uri: &str,
    rules: &RuleSet,
    settings: &Settings,
    today: NaiveDate,
) -> Vec<Problem> {
    let style = comment_style(lang_id);
    let mut problems = Vec::new();

    for rule in &rules.rules {
        if settings.ignore_rules_list.contains(&rule.id) {
            debug!(rule = %rule.id, "Rule ignored by settings");
            continue;
        }
        if !rule_applies(rule, lang_id, uri) {
            continue;
        }
        let severity = rule.parsed_severity();
        if !settings.severity_enabled(severity) {
            debug!(rule = %rule.id, %severity, "Severity gated off");
            continue;
        }

        for pattern in &rule.patterns {
            let re = match compile_analysis(pattern) {
                Ok(re) => re,
                Err(e) => {
                    warn!(rule = %rule.id, error = %e, "Skipping malformed pattern");
                    continue;
                }
            };
            let mut cursor = 0usize;
            while cursor <= doc.len() {
                let m = match re.find_from_pos(doc, cursor) {
                    Ok(Some(m)) => m,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(rule = %rule.id, error = %e, "Aborting pattern scan");
                        break;
                    }
                };
                let range = match_range(doc, m.start(), m.as_str());
                let suppression =
                    check_suppression(doc, m.start(), &style, &rule.id, severity, today);

                if !suppression.suppressed {
                    let in_comment = style.is_in_comment(&doc[..m.start()], false);
                    if pattern.scope_allows(in_comment)
                        && conditions_match(doc, &rule.conditions, &range, &style)
                    {
                        problems.push(Problem {
                            rule_id: rule.id.clone(),
                            severity,
                            range: range.clone(),
                            message: rule.description.clone(),
                            name: rule.name.clone(),
                            recommendation: rule.recommendation.clone(),
                            rule_info: rule.rule_info.clone(),
                            fixes: fixes::build_fixes(rule, m.as_str(), &range),
                            overrides: rule.overrides.clone(),
                            suppressed_finding_range: None,
                        });
                    }
                } else if let Some(marker_range) = suppression.rule_id_range {
                    // Decorate the rule id inside the directive instead of
                    // reporting the finding itself.
                    problems.push(Problem {
                        rule_id: rule.id.clone(),
                        severity: Severity::WarningInfo,
                        range: marker_range,
                        message: format!("Suppressed finding for rule {}", rule.id),
                        name: rule.name.clone(),
                        recommendation: rule.recommendation.clone(),
                        rule_info: rule.rule_info.clone(),
                        fixes: Vec::new(),
                        overrides: rule.overrides.clone(),
                        suppressed_finding_range: Some(range),
                    });
                }

                cursor = advance_cursor(doc, m.start(), m.end());
            }
        }
    }
    problems
}
