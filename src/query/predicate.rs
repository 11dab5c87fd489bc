//! Typed comparison predicates and the page-skip test backing predicate
//! pushdown.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::format::PageStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// An integer comparison against a named column.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Predicate {
    pub column: String,
    pub op: CompareOp,
    pub value: i64,
}

impl Predicate {
    pub fn new(column: impl Into<String>, op: CompareOp, value: i64) -> Self {
        Self {
            column: column.into(),
            op,
            value,
        }
    }

    pub fn eval(&self, value: i64) -> bool {
        match self.op {
            CompareOp::Eq => value == self.value,
            CompareOp::Ne => value != self.value,
            CompareOp::Lt => value < self.value,
            CompareOp::Le => value <= self.value,
            CompareOp::Gt => value > self.value,
            CompareOp::Ge => value >= self.value,
        }
    }

    /// True iff the page's statistics prove no row can satisfy this
    /// predicate. A page without bounds (string pages) is never skipped.
    pub fn can_skip_page(&self, stats: &PageStats) -> bool {
        match (stats.min, stats.max) {
            (Some(min), Some(max)) => page_cannot_match(self.op, self.value, min, max),
            _ => false,
        }
    }
}

/// The pure page-skip test: no value in `[min, max]` can satisfy
/// `op value`. Stateless, so scanners and planner-style callers share it.
pub fn page_cannot_match(op: CompareOp, value: i64, min: i64, max: i64) -> bool {
    match op {
        CompareOp::Gt => max <= value,
        CompareOp::Ge => max < value,
        CompareOp::Lt => min >= value,
        CompareOp::Le => min > value,
        CompareOp::Eq => value < min || value > max,
        CompareOp::Ne => min == max && min == value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(min: i64, max: i64) -> PageStats {
        PageStats {
            min: Some(min),
            max: Some(max),
            null_count: 0,
            distinct_count_estimate: 0,
        }
    }

    #[test]
    fn skip_table() {
        // page holds values in [10, 20]
        assert!(Predicate::new("c", CompareOp::Gt, 20).can_skip_page(&stats(10, 20)));
        assert!(!Predicate::new("c", CompareOp::Gt, 19).can_skip_page(&stats(10, 20)));
        assert!(Predicate::new("c", CompareOp::Ge, 21).can_skip_page(&stats(10, 20)));
        assert!(!Predicate::new("c", CompareOp::Ge, 20).can_skip_page(&stats(10, 20)));
        assert!(Predicate::new("c", CompareOp::Lt, 10).can_skip_page(&stats(10, 20)));
        assert!(!Predicate::new("c", CompareOp::Lt, 11).can_skip_page(&stats(10, 20)));
        assert!(Predicate::new("c", CompareOp::Le, 9).can_skip_page(&stats(10, 20)));
        assert!(!Predicate::new("c", CompareOp::Le, 10).can_skip_page(&stats(10, 20)));
        assert!(Predicate::new("c", CompareOp::Eq, 9).can_skip_page(&stats(10, 20)));
        assert!(Predicate::new("c", CompareOp::Eq, 21).can_skip_page(&stats(10, 20)));
        assert!(!Predicate::new("c", CompareOp::Eq, 15).can_skip_page(&stats(10, 20)));
        assert!(Predicate::new("c", CompareOp::Ne, 7).can_skip_page(&stats(7, 7)));
        assert!(!Predicate::new("c", CompareOp::Ne, 7).can_skip_page(&stats(7, 8)));
    }

    #[test]
    fn pages_without_bounds_are_never_skipped() {
        let stats = PageStats::without_bounds(3);
        for op in [
            CompareOp::Eq,
            CompareOp::Ne,
            CompareOp::Lt,
            CompareOp::Le,
            CompareOp::Gt,
            CompareOp::Ge,
        ] {
            assert!(!Predicate::new("c", op, 0).can_skip_page(&stats));
        }
    }

    #[test]
    fn skip_is_sound_over_the_range() {
        // every skipped page must contain no satisfying value
        for op in [
            CompareOp::Eq,
            CompareOp::Ne,
            CompareOp::Lt,
            CompareOp::Le,
            CompareOp::Gt,
            CompareOp::Ge,
        ] {
            for value in -3i64..=3 {
                let pred = Predicate::new("c", op, value);
                if pred.can_skip_page(&stats(-1, 1)) {
                    for v in -1i64..=1 {
                        assert!(!pred.eval(v), "{op:?} {value} wrongly skipped page holding {v}");
                    }
                }
            }
        }
    }
}
