//! Verification status classification
//!
//! A node's status is a pure function of the counts of its children per
//! verification category. Rules are evaluated in a fixed precedence order
//! and the first match wins.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verification category a single child contributes to its parent's counts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Verified,
    ExpectedNear,
    ExpectedFar,
    Out,
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Verified => write!(f, "verified"),
            Category::ExpectedNear => write!(f, "expected_near"),
            Category::ExpectedFar => write!(f, "expected_far"),
            Category::Out => write!(f, "out"),
            Category::Other => write!(f, "other"),
        }
    }
}

/// Primary rollup status of a node
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// No children and nothing that demands any
    #[serde(rename = "")]
    Empty,
    /// No children although the text states an obligation
    MissingChildren,
    Verified,
    ExpectedNear,
    ExpectedFar,
    Out,
    Partial,
    Other,
}

impl Status {
    /// Label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            Status::Empty => "",
            Status::MissingChildren => "MISSING_CHILDREN",
            Status::Verified => "VERIFIED",
            Status::ExpectedNear => "EXPECTED_NEAR",
            Status::ExpectedFar => "EXPECTED_FAR",
            Status::Out => "OUT",
            Status::Partial => "PARTIAL",
            Status::Other => "OTHER",
        }
    }

    /// Category this status counts as when its node is rolled up one level
    pub fn category(&self) -> Category {
        match self {
            Status::Verified => Category::Verified,
            Status::ExpectedNear => Category::ExpectedNear,
            Status::ExpectedFar => Category::ExpectedFar,
            Status::Out => Category::Out,
            Status::Empty | Status::MissingChildren | Status::Partial | Status::Other => {
                Category::Other
            }
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Secondary, binary classification of a node
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Coverage {
    #[serde(rename = "")]
    Empty,
    Addressed,
    NotAddressed,
}

impl Coverage {
    pub fn label(&self) -> &'static str {
        match self {
            Coverage::Empty => "",
            Coverage::Addressed => "ADDRESSED",
            Coverage::NotAddressed => "NOT_ADDRESSED",
        }
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Aggregated child counts for one parent node
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChildCounts {
    pub total: usize,
    pub verified: usize,
    pub expected_near: usize,
    pub expected_far: usize,
    pub out: usize,
}

impl ChildCounts {
    /// Records one child of the given category
    pub fn add(&mut self, category: Category) {
        self.total += 1;
        match category {
            Category::Verified => self.verified += 1,
            Category::ExpectedNear => self.expected_near += 1,
            Category::ExpectedFar => self.expected_far += 1,
            Category::Out => self.out += 1,
            Category::Other => {}
        }
    }

    /// Children in none of the named categories. Negative when the
    /// category counts exceed the total.
    pub fn other(&self) -> i64 {
        self.total as i64
            - self.verified as i64
            - self.expected_near as i64
            - self.expected_far as i64
            - self.out as i64
    }

    /// Children that are verified or expected soon
    pub fn addressed(&self) -> usize {
        self.verified + self.expected_near
    }
}

impl FromIterator<Category> for ChildCounts {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        let mut counts = ChildCounts::default();
        for category in iter {
            counts.add(category);
        }
        counts
    }
}

/// Result of classifying one node
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    pub status: Status,
    pub status2: Coverage,
    /// Truncated percentage of addressed children, absent without children
    pub percent_complete: Option<u32>,
}

/// Classifies a node from its child counts.
///
/// `text` is the node's own statement; it only matters when the node has no
/// children, in which case containing `shall_marker` yields
/// [`Status::MissingChildren`].
pub fn classify(counts: &ChildCounts, text: &str, shall_marker: &str) -> Classification {
    let n = counts.total as i64;
    let verified = counts.verified as i64;
    let near = counts.expected_near as i64;
    let far = counts.expected_far as i64;
    let out = counts.out as i64;
    let other = counts.other();

    let status = if n == 0 {
        if !shall_marker.is_empty() && text.contains(shall_marker) {
            Status::MissingChildren
        } else {
            Status::Empty
        }
    } else if n == verified {
        Status::Verified
    } else if n == verified + near {
        Status::ExpectedNear
    } else if n == verified + near + far {
        Status::ExpectedFar
    } else if n == out + other {
        Status::Out
    } else if verified > 0 || near > 0 {
        Status::Partial
    } else {
        Status::Other
    };

    let status2 = if n > 0 && verified + near > 0 {
        Coverage::Addressed
    } else if status == Status::Empty || n == 0 {
        Coverage::Empty
    } else {
        Coverage::NotAddressed
    };

    let percent_complete = if counts.total > 0 {
        Some((counts.addressed() as u64 * 100 / counts.total as u64) as u32)
    } else {
        None
    };

    Classification {
        status,
        status2,
        percent_complete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHALL: &str = " shall ";

    fn counts(total: usize, verified: usize, near: usize, far: usize, out: usize) -> ChildCounts {
        ChildCounts {
            total,
            verified,
            expected_near: near,
            expected_far: far,
            out,
        }
    }

    #[test]
    fn test_no_children_without_obligation_is_blank() {
        let c = classify(&ChildCounts::default(), "Background information", SHALL);
        assert_eq!(c.status, Status::Empty);
        assert_eq!(c.status2, Coverage::Empty);
        assert_eq!(c.percent_complete, None);
    }

    #[test]
    fn test_no_children_with_shall_is_missing_children() {
        let c = classify(
            &ChildCounts::default(),
            "The system shall archive all telemetry",
            SHALL,
        );
        assert_eq!(c.status, Status::MissingChildren);
        assert_eq!(c.status2, Coverage::Empty);
        assert_eq!(c.percent_complete, None);
    }

    #[test]
    fn test_shall_needs_surrounding_spaces() {
        let c = classify(&ChildCounts::default(), "Marshall the data", SHALL);
        assert_eq!(c.status, Status::Empty);
    }

    #[test]
    fn test_all_verified() {
        let c = classify(&counts(3, 3, 0, 0, 0), "", SHALL);
        assert_eq!(c.status, Status::Verified);
        assert_eq!(c.status2, Coverage::Addressed);
        assert_eq!(c.percent_complete, Some(100));
    }

    #[test]
    fn test_expected_near_and_far() {
        let near = classify(&counts(3, 1, 2, 0, 0), "", SHALL);
        assert_eq!(near.status, Status::ExpectedNear);
        assert_eq!(near.percent_complete, Some(100));

        let far = classify(&counts(4, 1, 1, 2, 0), "", SHALL);
        assert_eq!(far.status, Status::ExpectedFar);
        assert_eq!(far.status2, Coverage::Addressed);
        assert_eq!(far.percent_complete, Some(50));

        let only_far = classify(&counts(2, 0, 0, 2, 0), "", SHALL);
        assert_eq!(only_far.status, Status::ExpectedFar);
        assert_eq!(only_far.status2, Coverage::NotAddressed);
        assert_eq!(only_far.percent_complete, Some(0));
    }

    #[test]
    fn test_out_covers_out_and_other() {
        let c = classify(&counts(3, 0, 0, 0, 2), "", SHALL);
        assert_eq!(c.status, Status::Out);
        assert_eq!(c.status2, Coverage::NotAddressed);
        assert_eq!(c.percent_complete, Some(0));
    }

    #[test]
    fn test_partial_scenario() {
        let c: ChildCounts = [
            Category::Verified,
            Category::Verified,
            Category::ExpectedNear,
            Category::Other,
        ]
        .into_iter()
        .collect();
        assert_eq!(c, counts(4, 2, 1, 0, 0));
        assert_eq!(c.other(), 1);

        let result = classify(&c, "", SHALL);
        assert_eq!(result.status, Status::Partial);
        assert_eq!(result.status2, Coverage::Addressed);
        assert_eq!(result.percent_complete, Some(75));
    }

    #[test]
    fn test_partial_from_expected_near_alone() {
        let c = classify(&counts(3, 0, 1, 0, 1), "", SHALL);
        assert_eq!(c.status, Status::Partial);
        assert_eq!(c.percent_complete, Some(33));
    }

    #[test]
    fn test_other_when_far_mixed_with_out() {
        let c = classify(&counts(3, 0, 0, 1, 1), "", SHALL);
        assert_eq!(c.status, Status::Other);
        assert_eq!(c.status2, Coverage::NotAddressed);
    }

    #[test]
    fn test_percent_truncates() {
        assert_eq!(classify(&counts(4, 2, 1, 0, 0), "", SHALL).percent_complete, Some(75));
        assert_eq!(classify(&counts(3, 2, 0, 0, 0), "", SHALL).percent_complete, Some(66));
        assert_eq!(classify(&counts(7, 1, 0, 0, 0), "", SHALL).percent_complete, Some(14));
    }

    #[test]
    fn test_negative_other_still_classifies() {
        // Category counts exceeding the total must not panic or be rejected.
        let c = counts(2, 1, 1, 1, 0);
        assert_eq!(c.other(), -1);

        let result = classify(&c, "", SHALL);
        assert_eq!(result.status, Status::ExpectedNear);
        assert_eq!(result.percent_complete, Some(100));

        let c = counts(2, 0, 0, 1, 2);
        assert_eq!(c.other(), -1);
        assert_eq!(classify(&c, "", SHALL).status, Status::Other);
    }

    #[test]
    fn test_exactly_one_rule_fires_for_nonempty_nodes() {
        for total in 1..=4usize {
            for verified in 0..=total {
                for near in 0..=(total - verified) {
                    for far in 0..=(total - verified - near) {
                        for out in 0..=(total - verified - near - far) {
                            let c = counts(total, verified, near, far, out);
                            let result = classify(&c, " shall ", SHALL);
                            assert_ne!(result.status, Status::Empty);
                            assert_ne!(result.status, Status::MissingChildren);
                            assert_ne!(result.status2, Coverage::Empty);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_classification_is_repeatable() {
        let c = counts(5, 1, 1, 1, 1);
        let first = classify(&c, "x", SHALL);
        for _ in 0..3 {
            assert_eq!(classify(&c, "x", SHALL), first);
        }
    }

    #[test]
    fn test_status_category_for_rollup() {
        assert_eq!(Status::Verified.category(), Category::Verified);
        assert_eq!(Status::ExpectedFar.category(), Category::ExpectedFar);
        assert_eq!(Status::Partial.category(), Category::Other);
        assert_eq!(Status::Empty.category(), Category::Other);
        assert_eq!(Status::MissingChildren.category(), Category::Other);
    }

    #[test]
    fn test_labels_serialize_as_report_text() {
        assert_eq!(serde_json::to_string(&Status::ExpectedNear).unwrap(), "\"EXPECTED_NEAR\"");
        assert_eq!(serde_json::to_string(&Status::Empty).unwrap(), "\"\"");
        assert_eq!(serde_json::to_string(&Coverage::NotAddressed).unwrap(), "\"NOT_ADDRESSED\"");
        assert_eq!(Status::MissingChildren.to_string(), "MISSING_CHILDREN");
    }
}
