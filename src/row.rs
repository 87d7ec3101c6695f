//! Rows and column identifiers.

use std::{fmt, str::FromStr};

use bytes::Bytes;
use thiserror::Error;

use crate::key::RowKey;

/// Error raised when a column identifier cannot be parsed or built.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("column id must take the form `family:qualifier` with a non-empty family, got {0:?}")]
pub struct InvalidColumnId(pub String);

/// Identifier of a single column: a family name plus a qualifier.
///
/// The wire form is `family:qualifier`, split on the first colon. Families
/// must be non-empty and colon-free; qualifiers may be empty and may contain
/// colons.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ColumnId {
    family: String,
    qualifier: String,
}

impl ColumnId {
    /// Build a column id from its two parts.
    pub fn new(
        family: impl Into<String>,
        qualifier: impl Into<String>,
    ) -> Result<Self, InvalidColumnId> {
        let family = family.into();
        let qualifier = qualifier.into();
        if family.is_empty() || family.contains(':') {
            return Err(InvalidColumnId(format!("{family}:{qualifier}")));
        }
        Ok(ColumnId { family, qualifier })
    }

    /// The column family name.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// The qualifier within the family.
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }
}

impl FromStr for ColumnId {
    type Err = InvalidColumnId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((family, qualifier)) = s.split_once(':') else {
            return Err(InvalidColumnId(s.to_owned()));
        };
        ColumnId::new(family, qualifier)
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.family, self.qualifier)
    }
}

/// One scanned row: its key plus one cell value per requested column.
///
/// Cells appear in the order the columns were requested. A column with no
/// stored cell for the row yields an empty byte string, indistinguishable
/// from a cell whose stored value is empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    key: RowKey,
    cells: Vec<Bytes>,
}

impl Row {
    /// Assemble a row from its key and cell values.
    pub fn new(key: RowKey, cells: Vec<Bytes>) -> Self {
        Row { key, cells }
    }

    /// The row's key.
    pub fn key(&self) -> &RowKey {
        &self.key
    }

    /// Cell values, one per requested column.
    pub fn cells(&self) -> &[Bytes] {
        &self.cells
    }

    /// Split the row into its key and cells.
    pub fn into_parts(self) -> (RowKey, Vec<Bytes>) {
        (self.key, self.cells)
    }
}
