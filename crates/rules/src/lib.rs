//! Rule data model for the pattern-based security linter.
//! Rules are authored as JSON arrays or YAML sequences and loaded into an
//! immutable [`RuleSet`] that the analysis engine consumes by reference.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

mod loader;
pub mod regexes;
mod walk;

pub use loader::{load_rules, validate_rules};
pub use walk::visit;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
/// Severity associated with a rule or finding.
pub enum Severity {
    Critical,
    Important,
    Moderate,
    BestPractice,
    ManualReview,
    /// Reserved for suppression markers, never assigned to live findings.
    WarningInfo,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Critical => "critical",
            Severity::Important => "important",
            Severity::Moderate => "moderate",
            Severity::BestPractice => "best-practice",
            Severity::ManualReview => "manual-review",
            Severity::WarningInfo => "warning-info",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "important" => Ok(Severity::Important),
            "moderate" => Ok(Severity::Moderate),
            "best-practice" | "bestpractice" | "best_practice" => Ok(Severity::BestPractice),
            "manual-review" | "manualreview" | "manual_review" => Ok(Severity::ManualReview),
            "warning-info" | "warninginfo" | "warning_info" => Ok(Severity::WarningInfo),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
/// How a pattern's source text is turned into a regex.
pub enum PatternKind {
    Regex,
    RegexWord,
    String,
    Substring,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
/// Lexical context a pattern is allowed to match in.
pub enum PatternScope {
    Code,
    Comment,
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Individual textual pattern within a rule.
pub struct RulePattern {
    #[serde(rename = "type")]
    pub kind: PatternKind,
    pub pattern: String,
    /// Single-letter regex flags, copied into the compiled expression.
    #[serde(default)]
    pub modifiers: Vec<String>,
    /// Empty means the pattern matches everywhere.
    #[serde(default)]
    pub scopes: Vec<PatternScope>,
}

impl RulePattern {
    pub fn scope_allows(&self, in_comment: bool) -> bool {
        if self.scopes.is_empty() || self.scopes.contains(&PatternScope::All) {
            return true;
        }
        (self.scopes.contains(&PatternScope::Code) && !in_comment)
            || (self.scopes.contains(&PatternScope::Comment) && in_comment)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
/// Region of the document a condition pattern is evaluated against,
/// relative to the finding that triggered the rule.
pub enum SearchIn {
    /// The full line range of the finding. Default for anything that is not
    /// one of the explicit tokens below.
    #[default]
    FindingLine,
    /// The finding's exact character range.
    FindingOnly,
    /// Line range `[finding.start + a, finding.end + b]`, inclusive.
    FindingRegion(i64, i64),
}

static FINDING_REGION_RE: OnceLock<regex::Regex> = OnceLock::new();

impl SearchIn {
    /// Parses the `search_in` value of a rule file. Explicit tokens take
    /// precedence; unset, booleans and unrecognized strings all mean the
    /// finding's line range.
    pub fn parse(raw: Option<&str>) -> SearchIn {
        let Some(raw) = raw else {
            return SearchIn::FindingLine;
        };
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("finding-only") {
            return SearchIn::FindingOnly;
        }
        let re = FINDING_REGION_RE.get_or_init(|| {
            regex::Regex::new(r"^finding-region\s*\(\s*(-?\d+)\s*,\s*(-?\d+)\s*\)$")
                .expect("valid finding-region regex")
        });
        if let Some(caps) = re.captures(raw) {
            // Offsets are numbers, not strings: parse before adding to line
            // indices.
            let a = caps[1].parse::<i64>();
            let b = caps[2].parse::<i64>();
            if let (Ok(a), Ok(b)) = (a, b) {
                return SearchIn::FindingRegion(a, b);
            }
        }
        SearchIn::FindingLine
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSearchIn {
    Text(String),
    Flag(bool),
}

fn de_search_in<'de, D>(deserializer: D) -> Result<SearchIn, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<RawSearchIn> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawSearchIn::Text(s)) => SearchIn::parse(Some(&s)),
        Some(RawSearchIn::Flag(_)) | None => SearchIn::FindingLine,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Secondary pattern that must (or must not) match near a finding for the
/// finding to be reported.
pub struct Condition {
    pub pattern: RulePattern,
    #[serde(default, deserialize_with = "de_search_in")]
    pub search_in: SearchIn,
    #[serde(default)]
    pub negate_finding: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Template for an automatic fix, applied to the matched text.
pub struct FixTemplate {
    #[serde(default)]
    pub name: String,
    pub pattern: RulePattern,
    pub replacement: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A single lint rule as authored in a rule file.
pub struct Rule {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub rule_info: String,
    pub severity: String,
    /// Language ids and/or filename fragments. Empty applies to everything.
    #[serde(default)]
    pub applies_to: Vec<String>,
    /// Rule ids whose findings this rule supersedes at the same location.
    #[serde(default)]
    pub overrides: Vec<String>,
    pub patterns: Vec<RulePattern>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub fix_its: Vec<FixTemplate>,
}

impl Rule {
    /// Severity with the engine's fallback: anything unparsable counts as
    /// best practice.
    pub fn parsed_severity(&self) -> Severity {
        self.severity.parse().unwrap_or(Severity::BestPractice)
    }
}

#[derive(Debug, Clone, Default)]
/// Collection of loaded rules, held immutable for the duration of a session.
pub struct RuleSet {
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
/// Analysis settings, validated by the host before an analysis call.
pub struct Settings {
    #[serde(alias = "ignoreFilesList")]
    pub ignore_files_list: Vec<String>,
    #[serde(alias = "ignoreRulesList")]
    pub ignore_rules_list: Vec<String>,
    #[serde(alias = "enableBestPracticeRules")]
    pub enable_best_practice_rules: bool,
    #[serde(alias = "enableManualReviewRules")]
    pub enable_manual_review_rules: bool,
    /// Consumed by the rule loader, not the engine.
    #[serde(alias = "validateRulesFiles")]
    pub validate_rules_files: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            ignore_files_list: Vec::new(),
            ignore_rules_list: Vec::new(),
            enable_best_practice_rules: true,
            enable_manual_review_rules: false,
            validate_rules_files: false,
        }
    }
}

impl Settings {
    pub fn severity_enabled(&self, severity: Severity) -> bool {
        match severity {
            Severity::Critical | Severity::Important | Severity::Moderate => true,
            Severity::BestPractice => self.enable_best_practice_rules,
            Severity::ManualReview => self.enable_manual_review_rules,
            Severity::WarningInfo => false,
        }
    }
}
