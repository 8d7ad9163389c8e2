//! Removes findings superseded by a more specific rule at the same location.

use crate::Problem;

/// Resolves rule overrides to a fixed point: afterwards no surviving problem
/// has a non-empty override list, and none coexists with a same-start peer
/// whose rule it overrode. Relative order of survivors is preserved.
pub fn resolve_overrides(problems: &mut Vec<Problem>) {
    loop {
        let Some(idx) = problems.iter().position(|p| !p.overrides.is_empty()) else {
            break;
        };
        let overridden = std::mem::take(&mut problems[idx].overrides);
        // A suppression marker anchors at the finding it replaced, not at
        // the directive comment.
        let anchor = problems[idx]
            .suppressed_finding_range
            .as_ref()
            .unwrap_or(&problems[idx].range)
            .start;
        let mut keep_idx = 0usize;
        problems.retain(|q| {
            let keep = keep_idx == idx
                || q.range.start != anchor
                || !overridden.iter().any(|o| *o == q.rule_id);
            keep_idx += 1;
            keep
        });
    }
}
