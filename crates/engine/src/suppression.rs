//! Inline suppression directives.
//!
//! A finding is suppressed by a comment on its own line, or in a whole-line
//! comment on the line directly above, of the form
//! `DevSkim: ignore DS1234,DS5678 until 2027-01-01`. The directive keyword
//! is the DevSkim comment surface, kept for compatibility with rule sets and
//! sources annotated for that tool. `reviewed` stands in for `ignore` on
//! manual-review rules, an id list of `all` (or none) covers every rule, and
//! an `until` date in the past deactivates the directive.

use crate::comments::CommentStyle;
use crate::{Position, Range};
use chrono::NaiveDate;
use regex::Regex;
use rules::Severity;
use std::sync::OnceLock;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct SuppressionCheck {
    pub suppressed: bool,
    /// Range of the rule id inside the directive comment, when the id is
    /// spelled out. Used to decorate the directive with a marker.
    pub rule_id_range: Option<Range>,
}

static DIRECTIVE_RE: OnceLock<Regex> = OnceLock::new();
static UNTIL_RE: OnceLock<Regex> = OnceLock::new();

fn directive_re() -> &'static Regex {
    DIRECTIVE_RE.get_or_init(|| {
        Regex::new(r"(?i)devskim\s*:\s*(ignore|reviewed)\b").expect("valid directive regex")
    })
}

fn until_re() -> &'static Regex {
    UNTIL_RE
        .get_or_init(|| Regex::new(r"(?i)\buntil\s+(\d{4})-(\d{2})-(\d{2})").expect("valid until regex"))
}

/// Decides whether the finding at `offset` has been suppressed for
/// `rule_id`. `today` anchors the expiration check.
pub fn check_suppression(
    doc: &str,
    offset: usize,
    style: &CommentStyle,
    rule_id: &str,
    severity: Severity,
    today: NaiveDate,
) -> SuppressionCheck {
    let line_start = doc[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line_end = doc[offset..].find('\n').map_or(doc.len(), |i| offset + i);
    let line_number = doc[..line_start].matches('\n').count();

    if let Some(check) = directive_on_line(
        doc,
        line_start,
        line_end,
        line_number,
        style,
        rule_id,
        severity,
        today,
    ) {
        return check;
    }

    // A whole-line comment directly above the finding may carry the
    // directive instead.
    if line_start > 0 {
        let prev_end = line_start - 1;
        let prev_start = doc[..prev_end].rfind('\n').map_or(0, |i| i + 1);
        let prev_prefix = &doc[..prev_end];
        if style.is_whole_line_line_comment(prev_prefix)
            || style.is_whole_line_block_commented(prev_prefix)
        {
            if let Some(check) = directive_on_line(
                doc,
                prev_start,
                prev_end,
                line_number.saturating_sub(1),
                style,
                rule_id,
                severity,
                today,
            ) {
                return check;
            }
        }
    }

    SuppressionCheck::default()
}

#[allow(clippy::too_many_arguments)]
fn directive_on_line(
    doc: &str,
    line_start: usize,
    line_end: usize,
    line_number: usize,
    style: &CommentStyle,
    rule_id: &str,
    severity: Severity,
    today: NaiveDate,
) -> Option<SuppressionCheck> {
    let line = &doc[line_start..line_end];
    let m = directive_re().captures(line)?;
    let keyword_match = m.get(0).expect("whole directive match");

    // The directive must actually sit in a comment.
    if !style.is_in_comment(&doc[..line_start + keyword_match.start()], false) {
        return None;
    }

    let keyword = m.get(1).expect("directive keyword").as_str().to_lowercase();
    if keyword == "reviewed" && severity != Severity::ManualReview {
        return None;
    }

    let rest_start = keyword_match.end();
    let rest = &line[rest_start..];
    let (ids_part, until) = match until_re().captures(rest) {
        Some(u) => {
            let whole = u.get(0).expect("until clause");
            let date = NaiveDate::from_ymd_opt(
                u[1].parse().unwrap_or(0),
                u[2].parse().unwrap_or(0),
                u[3].parse().unwrap_or(0),
            );
            (&rest[..whole.start()], date)
        }
        None => (rest, None),
    };
    if let Some(expiry) = until {
        if expiry <= today {
            debug!(rule = rule_id, %expiry, "Suppression directive expired");
            return Some(SuppressionCheck::default());
        }
    }

    let Some(token) = ids_part.split_whitespace().next() else {
        // No id list: the directive covers every rule on this line.
        return Some(SuppressionCheck {
            suppressed: true,
            rule_id_range: None,
        });
    };
    if token.eq_ignore_ascii_case("all") {
        return Some(SuppressionCheck {
            suppressed: true,
            rule_id_range: None,
        });
    }

    let token_start = rest_start
        + (token.as_ptr() as usize - ids_part.as_ptr() as usize);
    let mut part_start = token_start;
    for part in token.split(',') {
        if part == rule_id {
            let start_col = part_start;
            return Some(SuppressionCheck {
                suppressed: true,
                rule_id_range: Some(Range {
                    start: Position {
                        line: line_number,
                        character: start_col,
                    },
                    end: Position {
                        line: line_number,
                        character: start_col + part.len(),
                    },
                }),
            });
        }
        part_start += part.len() + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::comment_style;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    fn check(doc: &str, offset: usize, rule: &str, severity: Severity) -> SuppressionCheck {
        check_suppression(doc, offset, &comment_style("c"), rule, severity, today())
    }

    #[test]
    fn ignore_with_matching_id_suppresses() {
        let doc = "strcpy(a,b); // DevSkim: ignore DS001\n";
        let res = check(doc, 0, "DS001", Severity::Critical);
        assert!(res.suppressed);
        let range = res.rule_id_range.unwrap();
        assert_eq!((range.start.line, range.start.character), (0, 32));
        assert_eq!((range.end.line, range.end.character), (0, 37));
    }

    #[test]
    fn ignore_with_other_id_does_not_suppress() {
        let doc = "strcpy(a,b); // DevSkim: ignore DS999\n";
        assert!(!check(doc, 0, "DS001", Severity::Critical).suppressed);
    }

    #[test]
    fn id_list_is_comma_separated() {
        let doc = "strcpy(a,b); // DevSkim: ignore DS111,DS001\n";
        let res = check(doc, 0, "DS001", Severity::Critical);
        assert!(res.suppressed);
        let range = res.rule_id_range.unwrap();
        assert_eq!(range.start.character, 38);
    }

    #[test]
    fn bare_ignore_suppresses_everything_without_marker() {
        let doc = "strcpy(a,b); // DevSkim: ignore\n";
        let res = check(doc, 0, "DS001", Severity::Critical);
        assert!(res.suppressed);
        assert!(res.rule_id_range.is_none());
        let doc = "strcpy(a,b); // DevSkim: ignore all\n";
        assert!(check(doc, 0, "DS001", Severity::Critical).suppressed);
    }

    #[test]
    fn reviewed_only_applies_to_manual_review_rules() {
        let doc = "eval(x); // DevSkim: reviewed DS500\n";
        assert!(check(doc, 0, "DS500", Severity::ManualReview).suppressed);
        assert!(!check(doc, 0, "DS500", Severity::Critical).suppressed);
    }

    #[test]
    fn until_dates_expire() {
        let live = "strcpy(a,b); // DevSkim: ignore DS001 until 2027-01-01\n";
        assert!(check(live, 0, "DS001", Severity::Critical).suppressed);
        let expired = "strcpy(a,b); // DevSkim: ignore DS001 until 2020-01-01\n";
        assert!(!check(expired, 0, "DS001", Severity::Critical).suppressed);
    }

    #[test]
    fn directive_outside_a_comment_is_inert() {
        let doc = "s = \"DevSkim: ignore DS001\"; strcpy(a,b);\n";
        assert!(!check(doc, 29, "DS001", Severity::Critical).suppressed);
    }

    #[test]
    fn whole_line_comment_above_counts() {
        let doc = "// DevSkim: ignore DS001\nstrcpy(a,b);\n";
        let res = check(doc, 25, "DS001", Severity::Critical);
        assert!(res.suppressed);
        assert_eq!(res.rule_id_range.unwrap().start.line, 0);
    }

    #[test]
    fn code_line_above_does_not_count() {
        let doc = "x(); // DevSkim: ignore DS001\nstrcpy(a,b);\n";
        assert!(!check(doc, 30, "DS001", Severity::Critical).suppressed);
    }

    #[test]
    fn keyword_is_case_insensitive() {
        let doc = "strcpy(a,b); // devskim: IGNORE DS001\n";
        assert!(check(doc, 0, "DS001", Severity::Critical).suppressed);
    }
}
