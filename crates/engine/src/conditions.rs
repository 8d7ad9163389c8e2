//! Evaluates the conditions attached to a rule against the region of the
//! document prescribed by each condition's `search_in`.

use crate::comments::CommentStyle;
use crate::{advance_cursor, line_start_offset, offset_at, Range};
use rules::regexes::compile_analysis;
use rules::{Condition, SearchIn};
use tracing::debug;

fn clamped_line_start(doc: &str, line: i64) -> usize {
    if line <= 0 {
        return 0;
    }
    line_start_offset(doc, line as usize)
}

fn region(doc: &str, finding: &Range, search_in: SearchIn) -> (usize, usize) {
    match search_in {
        SearchIn::FindingLine => (
            line_start_offset(doc, finding.start.line),
            line_start_offset(doc, finding.end.line + 1),
        ),
        SearchIn::FindingOnly => (offset_at(doc, finding.start), offset_at(doc, finding.end)),
        SearchIn::FindingRegion(a, b) => (
            clamped_line_start(doc, finding.start.line as i64 + a),
            clamped_line_start(doc, finding.end.line as i64 + b + 1),
        ),
    }
}

/// True iff every condition holds. Short-circuits on the first failure.
pub fn conditions_match(
    doc: &str,
    conditions: &[Condition],
    finding: &Range,
    style: &CommentStyle,
) -> bool {
    for cond in conditions {
        let (start, end) = region(doc, finding, cond.search_in);
        let re = match compile_analysis(&cond.pattern) {
            Ok(re) => re,
            Err(e) => {
                debug!(error = %e, "Skipping rule with malformed condition pattern");
                return false;
            }
        };
        let mut cursor = start;
        let mut found = false;
        while cursor <= doc.len() {
            let m = match re.find_from_pos(doc, cursor) {
                Ok(Some(m)) => m,
                _ => break,
            };
            if m.start() > end {
                break;
            }
            let in_comment = style.is_in_comment(&doc[..m.start()], false);
            if cond.pattern.scope_allows(in_comment) {
                found = true;
                break;
            }
            cursor = advance_cursor(doc, m.start(), m.end());
        }
        // A negated condition fails on presence, a plain one on absence.
        if found == cond.negate_finding {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::comment_style;
    use crate::Position;
    use rules::{PatternKind, RulePattern, PatternScope};

    fn range(sl: usize, sc: usize, el: usize, ec: usize) -> Range {
        Range {
            start: Position {
                line: sl,
                character: sc,
            },
            end: Position {
                line: el,
                character: ec,
            },
        }
    }

    fn substring(pattern: &str) -> RulePattern {
        RulePattern {
            kind: PatternKind::Substring,
            pattern: pattern.into(),
            modifiers: Vec::new(),
            scopes: Vec::new(),
        }
    }

    fn cond(pattern: &str, search_in: SearchIn, negate: bool) -> Condition {
        Condition {
            pattern: substring(pattern),
            search_in,
            negate_finding: negate,
        }
    }

    const DOC: &str = "open(f)\nread(f)\nclose(f)\nuse(f)\n";

    #[test]
    fn line_range_condition_sees_the_finding_line() {
        let style = comment_style("c");
        let finding = range(0, 0, 0, 5);
        assert!(conditions_match(
            DOC,
            &[cond("open", SearchIn::FindingLine, false)],
            &finding,
            &style
        ));
        assert!(!conditions_match(
            DOC,
            &[cond("close", SearchIn::FindingLine, false)],
            &finding,
            &style
        ));
    }

    #[test]
    fn finding_only_restricts_to_the_match() {
        let style = comment_style("c");
        let finding = range(0, 0, 0, 5);
        assert!(conditions_match(
            DOC,
            &[cond("open(", SearchIn::FindingOnly, false)],
            &finding,
            &style
        ));
        // `)` first occurs past the end of the finding range.
        assert!(!conditions_match(
            DOC,
            &[cond(")", SearchIn::FindingOnly, false)],
            &finding,
            &style
        ));
    }

    #[test]
    fn finding_region_spans_following_lines() {
        let style = comment_style("c");
        let finding = range(0, 0, 0, 5);
        // close( appears on line 2, inside [0, 0+3].
        assert!(!conditions_match(
            DOC,
            &[cond("close(", SearchIn::FindingRegion(0, 3), true)],
            &finding,
            &style
        ));
        let without_close = "open(f)\nread(f)\nseek(f)\nuse(f)\n";
        assert!(conditions_match(
            without_close,
            &[cond("close(", SearchIn::FindingRegion(0, 3), true)],
            &finding,
            &style
        ));
    }

    #[test]
    fn region_clamps_at_document_edges() {
        let style = comment_style("c");
        let finding = range(0, 0, 0, 5);
        assert!(conditions_match(
            DOC,
            &[cond("use(", SearchIn::FindingRegion(-10, 100), false)],
            &finding,
            &style
        ));
    }

    #[test]
    fn out_of_scope_matches_are_skipped() {
        let style = comment_style("c");
        let doc = "open(f) // close(g)\nclose(f)\n";
        let finding = range(0, 0, 0, 5);
        let mut c = cond("close(", SearchIn::FindingLine, false);
        c.pattern.scopes = vec![PatternScope::Code];
        // The only close( on the finding line is commented out.
        assert!(!conditions_match(doc, &[c], &finding, &style));
    }

    #[test]
    fn conditions_all_must_hold() {
        let style = comment_style("c");
        let finding = range(0, 0, 0, 5);
        assert!(!conditions_match(
            DOC,
            &[
                cond("open", SearchIn::FindingLine, false),
                cond("missing", SearchIn::FindingLine, false),
            ],
            &finding,
            &style
        ));
    }

    #[test]
    fn malformed_condition_pattern_fails_closed() {
        let style = comment_style("c");
        let finding = range(0, 0, 0, 5);
        let mut c = cond("x", SearchIn::FindingLine, false);
        c.pattern.kind = PatternKind::Regex;
        c.pattern.pattern = "(unclosed".into();
        assert!(!conditions_match(DOC, &[c], &finding, &style));
    }
}
