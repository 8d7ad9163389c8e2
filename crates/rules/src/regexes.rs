//! Compiles rule patterns into executable regexes.
//!
//! Two dialects are in play: analysis patterns compile to
//! [`fancy_regex::Regex`] (look-around, `(?s)` dot-matches-newline) and are
//! scanned cursor-style across the whole document, while fix substitutions
//! compile to the plain [`regex::Regex`] engine and replace only the first
//! occurrence inside the matched text.

use crate::{PatternKind, RulePattern};
use anyhow::Context;
use fancy_regex::Regex as FancyRegex;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegexDialect {
    Analysis,
    Fix,
}

fn pattern_source(kind: PatternKind, raw: &str) -> String {
    match kind {
        PatternKind::Regex => raw.to_string(),
        PatternKind::RegexWord => format!(r"\b{raw}\b"),
        PatternKind::String => format!(r"\b{}\b", regex::escape(raw)),
        PatternKind::Substring => regex::escape(raw),
    }
}

/// Modifier letters are copied verbatim into an inline flag group, except
/// `d` (dot-matches-newline): the analysis engine spells it `s`, the fix
/// engine has no equivalent and drops it.
fn inline_flags(modifiers: &[String], dialect: RegexDialect) -> String {
    let mut flags = String::new();
    for m in modifiers {
        for ch in m.chars() {
            match ch {
                'd' => {
                    if dialect == RegexDialect::Analysis && !flags.contains('s') {
                        flags.push('s');
                    }
                }
                // `g` is a scanning mode, not a compile flag: analysis
                // iterates from a cursor, fixes replace once.
                'g' => {}
                _ => {
                    if !flags.contains(ch) {
                        flags.push(ch);
                    }
                }
            }
        }
    }
    flags
}

fn with_flags(source: String, flags: &str) -> String {
    if flags.is_empty() {
        source
    } else {
        format!("(?{flags}){source}")
    }
}

/// Compiles a rule or condition pattern for document scanning.
pub fn compile_analysis(pattern: &RulePattern) -> anyhow::Result<FancyRegex> {
    let source = pattern_source(pattern.kind, &pattern.pattern);
    let flags = inline_flags(&pattern.modifiers, RegexDialect::Analysis);
    FancyRegex::new(&with_flags(source, &flags))
        .with_context(|| format!("invalid analysis pattern: {}", pattern.pattern))
}

/// Compiles a fix template pattern for first-occurrence substitution.
pub fn compile_fix(pattern: &RulePattern) -> anyhow::Result<Regex> {
    let source = pattern_source(pattern.kind, &pattern.pattern);
    let flags = inline_flags(&pattern.modifiers, RegexDialect::Fix);
    Regex::new(&with_flags(source, &flags))
        .with_context(|| format!("invalid fix pattern: {}", pattern.pattern))
}
