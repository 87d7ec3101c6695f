//! Contiguous row key intervals.
//!
//! A [`RowRange`] pairs an optional lower and upper bound, each inclusive or
//! exclusive. Ranges are built through named factories rather than raw bound
//! assignment so that inverted ranges are rejected at construction time.

use std::{fmt, ops::Bound};

use thiserror::Error;

use crate::key::RowKey;

/// Error raised when a row range cannot be constructed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    /// The start key sorts after the end key.
    #[error("inverted range: start {start} sorts after end {end}")]
    Inverted {
        /// Requested lower endpoint.
        start: RowKey,
        /// Requested upper endpoint.
        end: RowKey,
    },
    /// No finite end bound exists for the requested prefix.
    #[error("prefix {0} admits no finite end bound")]
    UnboundedPrefix(RowKey),
}

/// A contiguous interval of row keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowRange {
    start: Bound<RowKey>,
    end: Bound<RowKey>,
}

impl RowRange {
    /// Range covering every key.
    pub fn infinite() -> Self {
        RowRange {
            start: Bound::Unbounded,
            end: Bound::Unbounded,
        }
    }

    /// Range covering no key at all.
    pub fn empty() -> Self {
        RowRange {
            start: Bound::Included(RowKey::from("")),
            end: Bound::Excluded(RowKey::from("")),
        }
    }

    /// Range containing both endpoints, `[start, end]`.
    pub fn closed(start: impl Into<RowKey>, end: impl Into<RowKey>) -> Result<Self, RangeError> {
        Self::bounded(start.into(), end.into(), true, true)
    }

    /// Range containing neither endpoint, `(start, end)`.
    pub fn open(start: impl Into<RowKey>, end: impl Into<RowKey>) -> Result<Self, RangeError> {
        Self::bounded(start.into(), end.into(), false, false)
    }

    /// Range excluding the start and containing the end, `(start, end]`.
    pub fn left_open(start: impl Into<RowKey>, end: impl Into<RowKey>) -> Result<Self, RangeError> {
        Self::bounded(start.into(), end.into(), false, true)
    }

    /// Range containing the start and excluding the end, `[start, end)`.
    pub fn right_open(
        start: impl Into<RowKey>,
        end: impl Into<RowKey>,
    ) -> Result<Self, RangeError> {
        Self::bounded(start.into(), end.into(), true, false)
    }

    /// Range of every key starting with `prefix`.
    ///
    /// Fails when no finite end bound exists: the prefix is empty or consists
    /// entirely of `0xFF` bytes.
    pub fn prefix(prefix: impl Into<RowKey>) -> Result<Self, RangeError> {
        let prefix = prefix.into();
        match prefix.prefix_successor() {
            Some(end) => Ok(RowRange {
                start: Bound::Included(prefix),
                end: Bound::Excluded(end),
            }),
            None => Err(RangeError::UnboundedPrefix(prefix)),
        }
    }

    /// Range of every key at or after `start`, `[start, +inf)`.
    pub fn starting_at(start: impl Into<RowKey>) -> Self {
        RowRange {
            start: Bound::Included(start.into()),
            end: Bound::Unbounded,
        }
    }

    /// Range of every key at or before `end`, `(-inf, end]`.
    pub fn ending_at(end: impl Into<RowKey>) -> Self {
        RowRange {
            start: Bound::Unbounded,
            end: Bound::Included(end.into()),
        }
    }

    fn bounded(
        start: RowKey,
        end: RowKey,
        start_inclusive: bool,
        end_inclusive: bool,
    ) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Inverted { start, end });
        }
        let start = if start_inclusive {
            Bound::Included(start)
        } else {
            Bound::Excluded(start)
        };
        let end = if end_inclusive {
            Bound::Included(end)
        } else {
            Bound::Excluded(end)
        };
        Ok(RowRange { start, end })
    }

    pub(crate) fn from_bounds(start: Bound<RowKey>, end: Bound<RowKey>) -> Self {
        RowRange { start, end }
    }

    /// Borrowed view of the bounds, usable with `BTreeMap::range`.
    pub fn bounds(&self) -> (Bound<&RowKey>, Bound<&RowKey>) {
        (self.start.as_ref(), self.end.as_ref())
    }

    /// Whether `key` falls inside the range.
    pub fn contains(&self, key: &RowKey) -> bool {
        let after_start = match &self.start {
            Bound::Included(start) => key >= start,
            Bound::Excluded(start) => key > start,
            Bound::Unbounded => true,
        };
        let before_end = match &self.end {
            Bound::Included(end) => key <= end,
            Bound::Excluded(end) => key < end,
            Bound::Unbounded => true,
        };
        after_start && before_end
    }

    /// Whether the range admits no key.
    ///
    /// A doubly exclusive range whose end is the immediate byte successor of
    /// its start is empty even though the endpoints differ: no key sorts
    /// strictly between `k` and `k` followed by a zero byte. A range ending
    /// exclusively at the empty key is empty too, since the empty key is the
    /// smallest and nothing sorts below it.
    pub fn is_empty(&self) -> bool {
        match (&self.start, &self.end) {
            (Bound::Unbounded, Bound::Excluded(end)) => end.is_empty(),
            (Bound::Unbounded, _) | (_, Bound::Unbounded) => false,
            (Bound::Included(start), Bound::Included(end)) => start > end,
            (Bound::Included(start), Bound::Excluded(end))
            | (Bound::Excluded(start), Bound::Included(end)) => start >= end,
            (Bound::Excluded(start), Bound::Excluded(end)) => {
                start >= end || *end == start.successor()
            }
        }
    }
}

impl fmt::Display for RowRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(empty)");
        }
        match &self.start {
            Bound::Included(start) => write!(f, "[{start}, ")?,
            Bound::Excluded(start) => write!(f, "({start}, ")?,
            Bound::Unbounded => write!(f, "(-inf, ")?,
        }
        match &self.end {
            Bound::Included(end) => write!(f, "{end}]"),
            Bound::Excluded(end) => write!(f, "{end})"),
            Bound::Unbounded => write!(f, "+inf)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_contains_both_endpoints() {
        let range = RowRange::closed("b", "d").expect("valid range");
        assert!(range.contains(&RowKey::from("b")));
        assert!(range.contains(&RowKey::from("c")));
        assert!(range.contains(&RowKey::from("d")));
        assert!(!range.contains(&RowKey::from("a")));
        assert!(!range.contains(&RowKey::from("e")));
    }

    #[test]
    fn open_contains_neither_endpoint() {
        let range = RowRange::open("b", "d").expect("valid range");
        assert!(!range.contains(&RowKey::from("b")));
        assert!(range.contains(&RowKey::from("c")));
        assert!(!range.contains(&RowKey::from("d")));
    }

    #[test]
    fn half_open_contains_exactly_one_endpoint() {
        let left = RowRange::left_open("b", "d").expect("valid range");
        assert!(!left.contains(&RowKey::from("b")));
        assert!(left.contains(&RowKey::from("d")));

        let right = RowRange::right_open("b", "d").expect("valid range");
        assert!(right.contains(&RowKey::from("b")));
        assert!(!right.contains(&RowKey::from("d")));
    }

    #[test]
    fn inverted_endpoints_are_rejected() {
        let err = RowRange::closed("d", "b").expect_err("inverted");
        assert_eq!(
            err,
            RangeError::Inverted {
                start: RowKey::from("d"),
                end: RowKey::from("b"),
            }
        );
        assert!(RowRange::open("z", "a").is_err());
    }

    #[test]
    fn equal_endpoints_admit_a_single_key() {
        let range = RowRange::closed("b", "b").expect("valid range");
        assert!(range.contains(&RowKey::from("b")));
        assert!(!range.is_empty());

        let range = RowRange::open("b", "b").expect("valid range");
        assert!(range.is_empty());
    }

    #[test]
    fn prefix_matches_exactly_the_prefixed_keys() {
        let range = RowRange::prefix("row").expect("valid prefix");
        assert!(range.contains(&RowKey::from("row")));
        assert!(range.contains(&RowKey::from("row000")));
        assert!(range.contains(&RowKey::from("rowZZZ")));
        assert!(range.contains(&RowKey::from(b"row\xFF\xFF".as_slice())));
        assert!(!range.contains(&RowKey::from("rox")));
        assert!(!range.contains(&RowKey::from("ro")));
        assert!(!range.contains(&RowKey::from("rp")));
    }

    #[test]
    fn prefix_without_finite_bound_is_rejected() {
        assert_eq!(
            RowRange::prefix(""),
            Err(RangeError::UnboundedPrefix(RowKey::from("")))
        );
        assert_eq!(
            RowRange::prefix(vec![0xFF, 0xFF]),
            Err(RangeError::UnboundedPrefix(RowKey::from(vec![0xFF, 0xFF])))
        );
    }

    #[test]
    fn infinite_and_empty_extremes() {
        let all = RowRange::infinite();
        assert!(all.contains(&RowKey::from("")));
        assert!(all.contains(&RowKey::from(vec![0xFF; 64])));
        assert!(!all.is_empty());

        let none = RowRange::empty();
        assert!(!none.contains(&RowKey::from("")));
        assert!(!none.contains(&RowKey::from("a")));
        assert!(none.is_empty());
    }

    #[test]
    fn adjacent_exclusive_bounds_are_empty() {
        let start = RowKey::from("k");
        let gap = RowRange::from_bounds(
            Bound::Excluded(start.clone()),
            Bound::Excluded(start.successor()),
        );
        assert!(gap.is_empty());

        // One byte further up there is exactly one admitted key.
        let wider = RowRange::from_bounds(
            Bound::Excluded(start.clone()),
            Bound::Excluded(start.successor().successor()),
        );
        assert!(!wider.is_empty());
        assert!(wider.contains(&start.successor()));
    }

    #[test]
    fn nothing_sorts_below_the_empty_key() {
        let below = RowRange::from_bounds(Bound::Unbounded, Bound::Excluded(RowKey::from("")));
        assert!(below.is_empty());
        assert!(!below.contains(&RowKey::from("")));

        let up_to_a = RowRange::from_bounds(Bound::Unbounded, Bound::Excluded(RowKey::from("a")));
        assert!(!up_to_a.is_empty());
        assert!(up_to_a.contains(&RowKey::from("")));
    }

    #[test]
    fn display_renders_bound_kinds() {
        let range = RowRange::right_open("a", "d").expect("valid range");
        assert_eq!(range.to_string(), "[a, d)");
        assert_eq!(RowRange::infinite().to_string(), "(-inf, +inf)");
        assert_eq!(RowRange::empty().to_string(), "(empty)");
        assert_eq!(RowRange::starting_at("a").to_string(), "[a, +inf)");
        assert_eq!(RowRange::ending_at("d").to_string(), "(-inf, d]");
    }
}
