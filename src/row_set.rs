//! Unordered unions of row keys and row ranges.
//!
//! A [`RowSet`] names the rows a scan should visit: any mix of single keys
//! and [`RowRange`]s, kept exactly as the caller supplied them. Overlap
//! between members is legal; deduplication and ordering are the storage
//! driver's concern, not this type's.

use std::fmt;

use thiserror::Error;

use crate::{key::RowKey, range::RowRange};

/// Error raised when a row set cannot be constructed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowSetError {
    /// No keys and no ranges were supplied.
    ///
    /// A set with no members is ambiguous between "read nothing" and "read
    /// everything", so it is rejected; pass [`RowRange::empty`] to read
    /// nothing.
    #[error("row set requires at least one row or range; use an explicit empty range to read nothing")]
    NoMembers,
}

/// One member of a [`RowSet`]: a single key or a contiguous range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowSetMember {
    /// A single row key.
    Row(RowKey),
    /// A contiguous interval of row keys.
    Range(RowRange),
}

impl RowSetMember {
    /// Whether the member matches no key at all.
    pub fn is_empty(&self) -> bool {
        match self {
            RowSetMember::Row(_) => false,
            RowSetMember::Range(range) => range.is_empty(),
        }
    }
}

impl fmt::Display for RowSetMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowSetMember::Row(key) => write!(f, "{key}"),
            RowSetMember::Range(range) => write!(f, "{range}"),
        }
    }
}

impl From<RowKey> for RowSetMember {
    fn from(key: RowKey) -> Self {
        RowSetMember::Row(key)
    }
}

impl From<RowRange> for RowSetMember {
    fn from(range: RowRange) -> Self {
        RowSetMember::Range(range)
    }
}

impl From<&str> for RowSetMember {
    fn from(key: &str) -> Self {
        RowSetMember::Row(RowKey::from(key))
    }
}

/// Union of row keys and row ranges selecting the rows of a scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowSet {
    members: Vec<RowSetMember>,
}

impl RowSet {
    /// Build a set from any mix of keys and ranges.
    ///
    /// Fails with [`RowSetError::NoMembers`] when `members` yields nothing.
    pub fn from_rows_or_ranges(
        members: impl IntoIterator<Item = RowSetMember>,
    ) -> Result<Self, RowSetError> {
        let members: Vec<RowSetMember> = members.into_iter().collect();
        if members.is_empty() {
            return Err(RowSetError::NoMembers);
        }
        Ok(RowSet { members })
    }

    /// Add one more key or range to the set.
    pub fn append(mut self, member: impl Into<RowSetMember>) -> Self {
        self.members.push(member.into());
        self
    }

    /// The members in the order they were supplied.
    pub fn members(&self) -> &[RowSetMember] {
        &self.members
    }

    /// Whether every member matches no key.
    ///
    /// A set holding at least one single key is never empty, even when that
    /// key is absent from the table being scanned.
    pub fn is_empty(&self) -> bool {
        self.members.iter().all(RowSetMember::is_empty)
    }
}

impl fmt::Display for RowSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (index, member) in self.members.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{member}")?;
        }
        write!(f, "}}")
    }
}

impl From<RowKey> for RowSet {
    fn from(key: RowKey) -> Self {
        RowSet {
            members: vec![RowSetMember::Row(key)],
        }
    }
}

impl From<RowRange> for RowSet {
    fn from(range: RowRange) -> Self {
        RowSet {
            members: vec![RowSetMember::Range(range)],
        }
    }
}
