//! Unified text diffs between configuration snapshots.

use similar::TextDiff;

/// Label of the old side of a diff.
pub const BEFORE_LABEL: &str = "before";

/// Label of the new side of a diff.
pub const AFTER_LABEL: &str = "after";

/// Builds a line-based unified diff from `before` to `after`.
///
/// Returns an empty string when both texts are identical.
pub fn unified_diff(before: &str, after: &str) -> String {
    unified_diff_labeled(before, after, BEFORE_LABEL, AFTER_LABEL)
}

/// Same as [`unified_diff`] with custom file labels.
pub fn unified_diff_labeled(before: &str, after: &str, old_label: &str, new_label: &str) -> String {
    if before == after {
        return String::new();
    }

    TextDiff::from_lines(before, after)
        .unified_diff()
        .context_radius(3)
        .header(old_label, new_label)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_is_empty() {
        let text = "route-map RM-A permit 10\n match tag 10\n";
        assert_eq!(unified_diff(text, text), "");
        assert_eq!(unified_diff("", ""), "");
    }

    #[test]
    fn test_changed_line() {
        let diff = unified_diff(
            "hostname tor1\nlog syslog informational\n",
            "hostname tor1\nlog syslog debugging\n",
        );
        assert!(diff.starts_with("--- before\n+++ after\n"));
        assert!(diff.contains("-log syslog informational\n"));
        assert!(diff.contains("+log syslog debugging\n"));
        assert!(diff.contains(" hostname tor1\n"));
    }

    #[test]
    fn test_from_empty() {
        let diff = unified_diff("", "snmp_rocommunity: public\n");
        assert!(diff.contains("+snmp_rocommunity: public"));
    }
}
