//! Row set normalization for the in-memory store.
//!
//! The scan surface accepts row sets exactly as callers wrote them, overlaps
//! and all. Before touching its tree the store flattens a set into sorted,
//! pairwise-disjoint, non-empty ranges so every matching key is visited once,
//! and intersects two flattened sets by walking them in lockstep.

use std::ops::Bound;

use crate::{
    key::RowKey,
    range::RowRange,
    row_set::{RowSet, RowSetMember},
};

/// Position of a range bound on the key line, ordered so that bounds from
/// either side compare directly: `At(k, 0)` sits just before key `k`,
/// `At(k, 1)` just after it.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum Cut<'a> {
    Low,
    At(&'a RowKey, u8),
    High,
}

fn lower_cut(bound: Bound<&RowKey>) -> Cut<'_> {
    match bound {
        Bound::Included(key) => Cut::At(key, 0),
        Bound::Excluded(key) => Cut::At(key, 1),
        Bound::Unbounded => Cut::Low,
    }
}

fn upper_cut(bound: Bound<&RowKey>) -> Cut<'_> {
    match bound {
        Bound::Included(key) => Cut::At(key, 1),
        Bound::Excluded(key) => Cut::At(key, 0),
        Bound::Unbounded => Cut::High,
    }
}

/// Whether `right`, which sorts at or after `left` by lower bound, overlaps
/// or exactly abuts it.
fn touches(left: &RowRange, right: &RowRange) -> bool {
    lower_cut(right.bounds().0) <= upper_cut(left.bounds().1)
}

fn max_lower<'a>(a: Bound<&'a RowKey>, b: Bound<&'a RowKey>) -> Bound<&'a RowKey> {
    if lower_cut(a) >= lower_cut(b) {
        a
    } else {
        b
    }
}

fn min_upper<'a>(a: Bound<&'a RowKey>, b: Bound<&'a RowKey>) -> Bound<&'a RowKey> {
    if upper_cut(a) <= upper_cut(b) {
        a
    } else {
        b
    }
}

fn single_key(key: &RowKey) -> RowRange {
    RowRange::from_bounds(Bound::Included(key.clone()), Bound::Included(key.clone()))
}

/// Flatten a row set into sorted, disjoint, non-empty ranges.
pub(crate) fn normalize(set: &RowSet) -> Vec<RowRange> {
    let mut ranges: Vec<RowRange> = set
        .members()
        .iter()
        .filter_map(|member| match member {
            RowSetMember::Row(key) => Some(single_key(key)),
            RowSetMember::Range(range) if range.is_empty() => None,
            RowSetMember::Range(range) => Some(range.clone()),
        })
        .collect();
    ranges.sort_by(|a, b| lower_cut(a.bounds().0).cmp(&lower_cut(b.bounds().0)));

    let mut merged: Vec<RowRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if touches(last, &range) => {
                if upper_cut(range.bounds().1) > upper_cut(last.bounds().1) {
                    let start = last.bounds().0.cloned();
                    let end = range.bounds().1.cloned();
                    *last = RowRange::from_bounds(start, end);
                }
            }
            _ => merged.push(range),
        }
    }
    merged
}

/// Intersect two flattened range lists, producing a flattened result.
pub(crate) fn clip(left: &[RowRange], right: &[RowRange]) -> Vec<RowRange> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        let a = &left[i];
        let b = &right[j];
        let start = max_lower(a.bounds().0, b.bounds().0).cloned();
        let end = min_upper(a.bounds().1, b.bounds().1).cloned();
        let candidate = RowRange::from_bounds(start, end);
        if !candidate.is_empty() {
            out.push(candidate);
        }
        // Advance whichever side ends first; its remainder cannot reach the
        // other side's later ranges.
        if upper_cut(a.bounds().1) <= upper_cut(b.bounds().1) {
            i += 1;
        } else {
            j += 1;
        }
    }
    out
}

/// Repack flattened ranges as a row set, using an explicit empty range when
/// nothing is left.
pub(crate) fn to_row_set(ranges: Vec<RowRange>) -> RowSet {
    let mut ranges = ranges.into_iter();
    let mut set = match ranges.next() {
        Some(range) => RowSet::from(range),
        None => return RowSet::from(RowRange::empty()),
    };
    for range in ranges {
        set = set.append(range);
    }
    set
}
