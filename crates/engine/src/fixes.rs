//! Builds fix edits for a matched finding from the rule's fix templates.
//!
//! Templates apply in rule-author order; a template whose pattern does not
//! compile, or whose pattern does not occur in the matched text, is skipped
//! without aborting the analysis.

use crate::{FixEdit, Range};
use rules::regexes::compile_fix;
use rules::Rule;
use tracing::debug;

pub fn build_fixes(rule: &Rule, matched_text: &str, range: &Range) -> Vec<FixEdit> {
    let mut fixes = Vec::with_capacity(rule.fix_its.len());
    for template in &rule.fix_its {
        let re = match compile_fix(&template.pattern) {
            Ok(re) => re,
            Err(e) => {
                debug!(rule = %rule.id, error = %e, "Skipping malformed fix pattern");
                continue;
            }
        };
        if !re.is_match(matched_text) {
            continue;
        }
        let new_text = re
            .replace(matched_text, template.replacement.as_str())
            .into_owned();
        let label = if template.name.is_empty() {
            format!("Fix this {} problem", rule.id)
        } else {
            template.name.clone()
        };
        fixes.push(FixEdit {
            label,
            range: range.clone(),
            new_text,
        });
    }
    fixes
}
