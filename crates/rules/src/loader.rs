//! Loads rule files from disk into a [`RuleSet`].
//!
//! A rule file is either a JSON array or a YAML sequence of rules. Loading
//! checks structural validity (unique ids, non-empty pattern lists);
//! [`validate_rules`] additionally compiles every pattern in its target
//! dialect so malformed regexes surface before an analysis session starts.

use crate::regexes::{compile_analysis, compile_fix};
use crate::{visit, Rule, RuleSet};
use anyhow::Context;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Recursively reads a directory and collects the rules found in it.
pub fn load_rules(dir: &Path) -> anyhow::Result<RuleSet> {
    let mut rs = RuleSet::default();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let excl = |p: &Path| {
        p.file_name()
            .and_then(|name| name.to_str())
            .map(|name| name == ".git")
            .unwrap_or(false)
    };
    visit(dir, &excl, &mut |path| {
        let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if name.ends_with(".json") {
            debug!(file = %path.display(), "Parsing JSON rule file");
            let data = fs::read_to_string(path)
                .with_context(|| format!("Failed to read rule file: {}", path.display()))?;
            let rules: Vec<Rule> = serde_json::from_str(&data)
                .with_context(|| format!("Failed to parse rule file: {}", path.display()))?;
            for rule in rules {
                add_rule(&mut rs, &mut seen_ids, rule, path)?;
            }
        } else if name.ends_with(".yaml") || name.ends_with(".yml") {
            debug!(file = %path.display(), "Parsing YAML rule file");
            let data = fs::read_to_string(path)
                .with_context(|| format!("Failed to read rule file: {}", path.display()))?;
            let rules: Vec<Rule> = serde_yaml::from_str(&data)
                .with_context(|| format!("Failed to parse rule file: {}", path.display()))?;
            for rule in rules {
                add_rule(&mut rs, &mut seen_ids, rule, path)?;
            }
        } else {
            debug!(file = %path.display(), "Skipping non-rule file");
        }
        Ok(())
    })?;
    Ok(rs)
}

fn add_rule(
    rs: &mut RuleSet,
    seen: &mut HashSet<String>,
    rule: Rule,
    path: &Path,
) -> anyhow::Result<()> {
    if !seen.insert(rule.id.clone()) {
        anyhow::bail!("duplicate rule id '{}' in {}", rule.id, path.display());
    }
    if rule.patterns.is_empty() {
        anyhow::bail!("rule '{}' has no patterns ({})", rule.id, path.display());
    }
    rs.rules.push(rule);
    Ok(())
}

/// Compiles every pattern, condition and fix in the set, reporting the first
/// rule that fails. Analysis patterns compile in the analysis dialect, fix
/// patterns in the substitution dialect.
pub fn validate_rules(rs: &RuleSet) -> anyhow::Result<()> {
    for rule in &rs.rules {
        for pattern in &rule.patterns {
            compile_analysis(pattern).with_context(|| format!("rule '{}'", rule.id))?;
        }
        for cond in &rule.conditions {
            compile_analysis(&cond.pattern)
                .with_context(|| format!("condition of rule '{}'", rule.id))?;
        }
        for fix in &rule.fix_its {
            compile_fix(&fix.pattern).with_context(|| format!("fix of rule '{}'", rule.id))?;
        }
    }
    Ok(())
}
