//! Analysis engine: evaluates pattern rules over a document and produces
//! problems with ranges, severities and fix edits.
//!
//! The engine is a pure function of the document text, language id,
//! document URI, rule set and settings; analyses of different documents are
//! independent. The only mutable state is the fix-action store on
//! [`Analyzer`], guarded for concurrent hosts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, warn};

pub mod comments;
pub mod conditions;
pub mod fixes;
pub mod matcher;
pub mod overrides;
pub mod suppression;

pub use rules::{Rule, RuleSet, Settings, Severity};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Zero-based position in a document.
pub struct Position {
    pub line: usize,
    pub character: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
/// Half-open document range.
pub struct Range {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// A single automatic code change the user may apply.
pub struct FixEdit {
    pub label: String,
    pub range: Range,
    pub new_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Result of evaluating the rules over a document.
pub struct Problem {
    /// Rule that generated the problem; doubles as the diagnostic code.
    pub rule_id: String,
    pub severity: Severity,
    pub range: Range,
    pub message: String,
    pub name: String,
    pub recommendation: String,
    pub rule_info: String,
    /// Fix edits in rule-author order.
    pub fixes: Vec<FixEdit>,
    /// Rule ids this problem supersedes at the same location.
    pub overrides: Vec<String>,
    /// Set only on suppression markers: the range that would have been
    /// flagged had the directive not been present.
    pub suppressed_finding_range: Option<Range>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Fix edit recorded for later retrieval by the host, stamped with the
/// document version it was computed against.
pub struct FixRecord {
    pub fix: FixEdit,
    pub rule_id: String,
    pub document_version: i64,
}

/// Engine facade. Holds the immutable rule set and settings for a session
/// plus the fix-action store.
pub struct Analyzer {
    rules: RuleSet,
    settings: Settings,
    ignore_globs: Vec<glob::Pattern>,
    fix_actions: Mutex<HashMap<String, HashMap<String, FixRecord>>>,
}

impl Analyzer {
    pub fn new(rules: RuleSet, settings: Settings) -> Self {
        let ignore_globs = settings
            .ignore_files_list
            .iter()
            .filter_map(|raw| match glob::Pattern::new(raw) {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!(pattern = %raw, error = %e, "Ignoring invalid ignore-files glob");
                    None
                }
            })
            .collect();
        Analyzer {
            rules,
            settings,
            ignore_globs,
            fix_actions: Mutex::new(HashMap::new()),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Analyzes a document and returns its problems, override resolution
    /// applied. Suppression expiry is anchored at the current date.
    pub fn analyze(&self, doc: &str, lang_id: &str, uri: &str) -> Vec<Problem> {
        self.analyze_as_of(doc, lang_id, uri, chrono::Local::now().date_naive())
    }

    /// [`Analyzer::analyze`] with an explicit expiry anchor, fully
    /// deterministic in its inputs.
    pub fn analyze_as_of(
        &self,
        doc: &str,
        lang_id: &str,
        uri: &str,
        today: NaiveDate,
    ) -> Vec<Problem> {
        if self.rules.rules.is_empty() {
            return Vec::new();
        }
        if self.ignore_globs.iter().any(|g| g.matches(uri)) {
            debug!(%uri, "Document ignored by settings");
            return Vec::new();
        }
        let mut problems =
            matcher::find_problems(doc, lang_id, uri, &self.rules, &self.settings, today);
        overrides::resolve_overrides(&mut problems);
        problems
    }

    /// Stores a fix for later retrieval, keyed by document and by a hash of
    /// (range, diagnostic code) plus the smallest free ordinal.
    pub fn record_code_action(
        &self,
        uri: &str,
        document_version: i64,
        range: &Range,
        diagnostic_code: &str,
        mut fix: FixEdit,
        rule_id: &str,
    ) {
        if fix.label.is_empty() {
            fix.label = format!("Fix this {rule_id} problem");
        }
        let mut store = self.fix_actions.lock().unwrap_or_else(|e| e.into_inner());
        let doc_actions = store.entry(uri.to_string()).or_default();
        let base = fix_key(range, diagnostic_code);
        let mut ordinal = 0usize;
        let key = loop {
            let candidate = format!("{base}:{ordinal}");
            if !doc_actions.contains_key(&candidate) {
                break candidate;
            }
            ordinal += 1;
        };
        doc_actions.insert(
            key,
            FixRecord {
                fix,
                rule_id: rule_id.to_string(),
                document_version,
            },
        );
    }

    /// Recorded fixes for a document, in stable key order.
    pub fn code_actions_for(&self, uri: &str) -> Vec<FixRecord> {
        let store = self.fix_actions.lock().unwrap_or_else(|e| e.into_inner());
        let Some(doc_actions) = store.get(uri) else {
            return Vec::new();
        };
        let mut entries: Vec<(&String, &FixRecord)> = doc_actions.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter().map(|(_, r)| r.clone()).collect()
    }

    /// Drops recorded fixes for a document, typically on edit or close.
    pub fn clear_code_actions(&self, uri: &str) {
        self.fix_actions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(uri);
    }
}

fn fix_key(range: &Range, diagnostic_code: &str) -> String {
    blake3::hash(
        format!(
            "{}:{}:{}:{}:{}",
            range.start.line,
            range.start.character,
            range.end.line,
            range.end.character,
            diagnostic_code
        )
        .as_bytes(),
    )
    .to_hex()
    .to_string()
}

/// Zero-based (line, column) of a byte offset.
pub(crate) fn line_col_at(doc: &str, pos: usize) -> (usize, usize) {
    let mut line = 0usize;
    let mut line_start = 0usize;
    for (idx, ch) in doc[..pos].char_indices() {
        if ch == '\n' {
            line += 1;
            line_start = idx + 1;
        }
    }
    (line, pos - line_start)
}

/// Byte offset of the start of `line`; the document length when the line is
/// past the end.
pub(crate) fn line_start_offset(doc: &str, line: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let mut count = 0usize;
    for (idx, ch) in doc.char_indices() {
        if ch == '\n' {
            count += 1;
            if count == line {
                return idx + 1;
            }
        }
    }
    doc.len()
}

pub(crate) fn offset_at(doc: &str, pos: Position) -> usize {
    (line_start_offset(doc, pos.line) + pos.character).min(doc.len())
}

/// Next scan position after a match. Zero-width matches step over one
/// character so scanning always makes progress.
pub(crate) fn advance_cursor(doc: &str, match_start: usize, match_end: usize) -> usize {
    if match_end > match_start {
        return match_end;
    }
    let mut next = match_start + 1;
    while next < doc.len() && !doc.is_char_boundary(next) {
        next += 1;
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_is_zero_based() {
        let doc = "ab\ncd\n";
        assert_eq!(line_col_at(doc, 0), (0, 0));
        assert_eq!(line_col_at(doc, 4), (1, 1));
        assert_eq!(line_col_at(doc, 6), (2, 0));
    }

    #[test]
    fn line_start_offsets_clamp() {
        let doc = "ab\ncd\n";
        assert_eq!(line_start_offset(doc, 0), 0);
        assert_eq!(line_start_offset(doc, 1), 3);
        assert_eq!(line_start_offset(doc, 2), 6);
        assert_eq!(line_start_offset(doc, 99), 6);
    }

    #[test]
    fn cursor_always_advances() {
        let doc = "aé b";
        assert_eq!(advance_cursor(doc, 0, 3), 3);
        assert_eq!(advance_cursor(doc, 0, 0), 1);
        // A zero-width match before a multibyte char steps past it whole.
        assert_eq!(advance_cursor(doc, 1, 1), 3);
        assert_eq!(advance_cursor(doc, doc.len(), doc.len()), doc.len() + 1);
    }

    #[test]
    fn code_actions_round_trip_with_ordinals() {
        let analyzer = Analyzer::new(RuleSet::default(), Settings::default());
        let range = Range {
            start: Position { line: 0, character: 0 },
            end: Position { line: 0, character: 6 },
        };
        let fix = FixEdit {
            label: String::new(),
            range: range.clone(),
            new_text: "strcpy_s(".into(),
        };
        analyzer.record_code_action("file:///a.c", 1, &range, "DS100", fix.clone(), "DS100");
        analyzer.record_code_action("file:///a.c", 1, &range, "DS100", fix, "DS100");
        let actions = analyzer.code_actions_for("file:///a.c");
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].fix.label, "Fix this DS100 problem");
        assert!(analyzer.code_actions_for("file:///other.c").is_empty());
        analyzer.clear_code_actions("file:///a.c");
        assert!(analyzer.code_actions_for("file:///a.c").is_empty());
    }
}
