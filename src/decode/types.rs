//! Decoder types

use crate::types::Record;

/// A decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// The body was a single object
    Single(Record),
    /// The body was an array of objects
    Collection(Vec<Record>),
}

impl Decoded {
    /// Number of records carried
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Collection(records) => records.len(),
        }
    }

    /// Check if no records are carried
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the records in document order
    pub fn records(&self) -> &[Record] {
        match self {
            Self::Single(record) => std::slice::from_ref(record),
            Self::Collection(records) => records,
        }
    }

    /// The single record, or the only element of a one-element collection
    pub fn into_single(self) -> Option<Record> {
        match self {
            Self::Single(record) => Some(record),
            Self::Collection(mut records) if records.len() == 1 => records.pop(),
            Self::Collection(_) => None,
        }
    }

    /// All records, in document order
    pub fn into_records(self) -> Vec<Record> {
        match self {
            Self::Single(record) => vec![record],
            Self::Collection(records) => records,
        }
    }
}
