//! Board column types.
//!
//! Columns are the workflow stages a card moves through. The set of columns
//! is fixed and supplied from outside (configuration or the caller); the
//! board never creates or deletes one.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};

/// The key identifying a column.
///
/// This is the value the backend stores in a task's `status` field, so it
/// is compared verbatim (including case and spaces).
///
/// # Examples
///
/// ```
/// use loanboard_protocol::ColumnKey;
///
/// let key = ColumnKey::new("In Progress");
/// assert_eq!(key.as_str(), "In Progress");
/// assert_eq!(key, "In Progress");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnKey(String);

impl ColumnKey {
    /// Creates a column key from any string-like value.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColumnKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ColumnKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl PartialEq<str> for ColumnKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ColumnKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A single column (lane) on the board.
///
/// # Examples
///
/// ```
/// use loanboard_protocol::Column;
///
/// let column = Column::new("Done", "Done");
/// assert_eq!(column.key, "Done");
/// assert_eq!(column.title, "Done");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Identifier stored as the card's status.
    pub key: ColumnKey,
    /// Human-readable label.
    pub title: String,
}

impl Column {
    /// Creates a column with the given key and display title.
    #[must_use]
    pub fn new(key: impl Into<ColumnKey>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
        }
    }

    /// Creates a column whose title is the same as its key.
    #[must_use]
    pub fn keyed(key: &str) -> Self {
        Self::new(key, key)
    }
}

/// The ordered, fixed set of columns a board is laid out in.
///
/// Order matters: it is the left-to-right display order and the order in
/// which canonical positions are computed.
///
/// # Examples
///
/// ```
/// use loanboard_protocol::Columns;
///
/// let columns = Columns::loan_workflow();
/// assert_eq!(columns.len(), 4);
/// assert_eq!(columns.index_of(&"In Review".into()), Some(2));
/// assert!(!columns.contains(&"Backlog".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Column>", into = "Vec<Column>")]
pub struct Columns(Vec<Column>);

/// Status values used by the loan task backend, in workflow order.
pub const LOAN_WORKFLOW: [&str; 4] = ["To Do", "In Progress", "In Review", "Done"];

impl Columns {
    /// Builds a column set, checking it is non-empty and keys are unique.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::NoColumns`] for an empty list and
    /// [`ProtocolError::DuplicateColumn`] if a key appears twice.
    ///
    /// # Examples
    ///
    /// ```
    /// use loanboard_protocol::{Column, Columns};
    ///
    /// let ok = Columns::new(vec![Column::keyed("To Do"), Column::keyed("Done")]);
    /// assert!(ok.is_ok());
    ///
    /// let dup = Columns::new(vec![Column::keyed("Done"), Column::keyed("Done")]);
    /// assert!(dup.is_err());
    /// ```
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if columns.is_empty() {
            return Err(ProtocolError::NoColumns);
        }
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.key == column.key) {
                return Err(ProtocolError::DuplicateColumn(column.key.clone()));
            }
        }
        Ok(Self(columns))
    }

    /// The four-stage loan task workflow: To Do, In Progress, In Review, Done.
    #[must_use]
    pub fn loan_workflow() -> Self {
        Self(LOAN_WORKFLOW.iter().map(|key| Column::keyed(key)).collect())
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for a validated set; provided for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the columns in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.0.iter()
    }

    /// Iterates over the column keys in display order.
    pub fn keys(&self) -> impl Iterator<Item = &ColumnKey> {
        self.0.iter().map(|c| &c.key)
    }

    /// Returns the display index of a column, if it belongs to the set.
    #[must_use]
    pub fn index_of(&self, key: &ColumnKey) -> Option<usize> {
        self.0.iter().position(|c| &c.key == key)
    }

    /// Returns `true` if the key names one of the columns.
    #[must_use]
    pub fn contains(&self, key: &ColumnKey) -> bool {
        self.index_of(key).is_some()
    }

    /// Like [`contains`](Self::contains), but as an error for callers that
    /// need to reject unknown columns.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownColumn`] if the key is not in the set.
    pub fn require(&self, key: &ColumnKey) -> Result<&Column> {
        self.0
            .iter()
            .find(|c| &c.key == key)
            .ok_or_else(|| ProtocolError::UnknownColumn(key.clone()))
    }
}

impl Default for Columns {
    fn default() -> Self {
        Self::loan_workflow()
    }
}

impl TryFrom<Vec<Column>> for Columns {
    type Error = ProtocolError;

    fn try_from(columns: Vec<Column>) -> Result<Self> {
        Self::new(columns)
    }
}

impl From<Columns> for Vec<Column> {
    fn from(columns: Columns) -> Self {
        columns.0
    }
}

impl<'a> IntoIterator for &'a Columns {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
