//! Row key representation.
//!
//! A [`RowKey`] is an opaque byte sequence ordered lexicographically by
//! unsigned byte comparison. Keys are backed by a reference-counted buffer so
//! clones stay cheap while equality, ordering, and hashing follow the raw
//! bytes.

use std::fmt;

use bytes::Bytes;

/// Byte-string identity of a row, ordered lexicographically.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowKey(Bytes);

impl RowKey {
    /// Borrow the raw bytes of the key.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the key and return the backing buffer.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// Length of the key in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key has zero bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The smallest key strictly greater than this one (this key with a zero
    /// byte appended).
    pub fn successor(&self) -> RowKey {
        let mut out = Vec::with_capacity(self.0.len() + 1);
        out.extend_from_slice(&self.0);
        out.push(0);
        RowKey::from(out)
    }

    /// The exclusive upper bound of the set of keys starting with this key,
    /// obtained by incrementing the last non-maximal byte and truncating.
    ///
    /// Returns `None` when no finite bound exists: the key is empty, or every
    /// byte is `0xFF`.
    pub fn prefix_successor(&self) -> Option<RowKey> {
        let last = self.0.iter().rposition(|&b| b != u8::MAX)?;
        let mut out = self.0[..=last].to_vec();
        out[last] += 1;
        Some(RowKey::from(out))
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.escape_ascii())
    }
}

impl AsRef<[u8]> for RowKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for RowKey {
    fn from(value: &str) -> Self {
        RowKey(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<String> for RowKey {
    fn from(value: String) -> Self {
        RowKey(Bytes::from(value.into_bytes()))
    }
}

impl From<&[u8]> for RowKey {
    fn from(value: &[u8]) -> Self {
        RowKey(Bytes::copy_from_slice(value))
    }
}

impl From<Vec<u8>> for RowKey {
    fn from(value: Vec<u8>) -> Self {
        RowKey(Bytes::from(value))
    }
}

impl From<Bytes> for RowKey {
    fn from(value: Bytes) -> Self {
        RowKey(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_lexicographic_on_bytes() {
        assert!(RowKey::from("a") < RowKey::from("b"));
        assert!(RowKey::from("a") < RowKey::from("aa"));
        assert!(RowKey::from(vec![0x00]) < RowKey::from(vec![0xFF]));
        assert!(RowKey::from("row") < RowKey::from("row000"));
        assert_eq!(RowKey::from("row000"), RowKey::from(b"row000".as_slice()));
    }

    #[test]
    fn successor_is_immediately_adjacent() {
        let key = RowKey::from("row");
        let next = key.successor();
        assert!(key < next);
        assert_eq!(next.as_bytes(), b"row\x00");
    }

    #[test]
    fn prefix_successor_increments_last_byte() {
        assert_eq!(
            RowKey::from("row").prefix_successor(),
            Some(RowKey::from("rox"))
        );
        assert_eq!(
            RowKey::from(vec![0x61, 0xFF, 0xFF]).prefix_successor(),
            Some(RowKey::from(vec![0x62]))
        );
    }

    #[test]
    fn prefix_successor_has_no_finite_bound() {
        assert_eq!(RowKey::from("").prefix_successor(), None);
        assert_eq!(RowKey::from(vec![0xFF, 0xFF]).prefix_successor(), None);
    }

    #[test]
    fn display_escapes_non_printable_bytes() {
        assert_eq!(RowKey::from("row000").to_string(), "row000");
        assert_eq!(RowKey::from(vec![0x00, 0x61]).to_string(), "\\x00a");
    }
}
