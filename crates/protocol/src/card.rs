//! Card types for the task board.
//!
//! A card is the board's view of a loan task: an id, some text, the column
//! (backend `status`) it sits in and its ordinal position in that column.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::column::ColumnKey;
use crate::error::{ProtocolError, Result};

/// Identifier of a card.
///
/// Ids are assigned by the backend and never change. They are opaque to
/// the board; the only operation that matters is equality.
///
/// # Examples
///
/// ```
/// use loanboard_protocol::CardId;
///
/// let id: CardId = "42".parse().unwrap();
/// assert_eq!(id, CardId::new(42));
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(u64);

impl CardId {
    /// Wraps a raw backend id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw backend id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CardId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<u64> for CardId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// A card on the board.
///
/// On the wire the column is called `status`. Extra backend fields
/// (`loan`, `assignee`, `tags`, `created_at`) are ignored when decoding.
///
/// # Examples
///
/// ```
/// use loanboard_protocol::{Card, CardId};
///
/// let card = Card::new(CardId::new(1), "Order appraisal", "To Do", 0)
///     .with_description("Request from AMC");
/// assert_eq!(card.column, "To Do");
/// assert!(card.has_description());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Backend-assigned identifier.
    pub id: CardId,
    /// Short summary.
    pub title: String,
    /// Longer text; empty when the task has none.
    #[serde(default)]
    pub description: String,
    /// Column the card sits in.
    #[serde(rename = "status")]
    pub column: ColumnKey,
    /// Order within the column, ascending top to bottom.
    #[serde(default)]
    pub position: u32,
    /// Last modification time reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Card {
    /// Creates a card with an empty description.
    #[must_use]
    pub fn new(
        id: CardId,
        title: impl Into<String>,
        column: impl Into<ColumnKey>,
        position: u32,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            column: column.into(),
            position,
            updated_at: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns `true` if the card carries a non-blank description.
    #[must_use]
    pub fn has_description(&self) -> bool {
        !self.description.trim().is_empty()
    }

    /// Copies the fields the server owns outside of ordering (text and
    /// timestamps) from `other`, leaving column and position alone.
    pub fn refresh_content_from(&mut self, other: &Card) {
        self.title.clone_from(&other.title);
        self.description.clone_from(&other.description);
        self.updated_at = other.updated_at;
    }
}

/// Payload for creating a card on the backend.
///
/// The loan id travels in the URL, not in the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCard {
    /// Parent loan.
    #[serde(skip)]
    pub loan: u64,
    /// Title, already trimmed.
    pub title: String,
    /// Description, already trimmed; may be empty.
    pub description: String,
    /// Target column.
    pub status: ColumnKey,
    /// Requested position (end of the column).
    pub position: u32,
}

/// Body of a task listing: either a bare array or a paginated page.
#[derive(Deserialize)]
#[serde(untagged)]
enum CardListBody {
    Plain(Vec<Card>),
    Paginated { results: Vec<Card> },
}

/// Decodes a task listing returned by the backend.
///
/// The list endpoint is unpaginated today but accepts both shapes.
///
/// # Errors
///
/// Returns [`ProtocolError::DeserializationFailed`] if the body is neither
/// a card array nor an object with a `results` card array.
///
/// # Examples
///
/// ```
/// use loanboard_protocol::decode_card_list;
///
/// let plain = decode_card_list(r#"[{"id": 1, "title": "a", "status": "Done"}]"#).unwrap();
/// let paged = decode_card_list(r#"{"count": 1, "results": [{"id": 1, "title": "a", "status": "Done"}]}"#).unwrap();
/// assert_eq!(plain, paged);
/// ```
pub fn decode_card_list(body: &str) -> Result<Vec<Card>> {
    let body: CardListBody =
        serde_json::from_str(body).map_err(ProtocolError::DeserializationFailed)?;
    Ok(match body {
        CardListBody::Plain(cards) | CardListBody::Paginated { results: cards } => cards,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_backend_task() {
        let json = r#"{
            "id": 17,
            "loan": 3,
            "title": "Collect paystubs",
            "description": "",
            "status": "In Progress",
            "position": 2,
            "assignee": null,
            "tags": ["Docs"],
            "created_at": "2025-01-02T10:00:00Z",
            "updated_at": "2025-01-03T11:30:00Z"
        }"#;
        let card: Card = serde_json::from_str(json).expect("deserialize");

        assert_eq!(card.id, CardId::new(17));
        assert_eq!(card.column, "In Progress");
        assert_eq!(card.position, 2);
        assert!(!card.has_description());
        assert!(card.updated_at.is_some());
    }

    #[test]
    fn decode_defaults_missing_fields() {
        let json = r#"{"id": 1, "title": "t", "status": "Done"}"#;
        let card: Card = serde_json::from_str(json).expect("deserialize");
        assert_eq!(card.position, 0);
        assert_eq!(card.description, "");
        assert_eq!(card.updated_at, None);
    }

    #[test]
    fn encode_uses_status_field() {
        let card = Card::new(CardId::new(5), "Title", "Done", 1);
        let value = serde_json::to_value(&card).expect("serialize");
        assert_eq!(value["status"], "Done");
        assert!(value.get("column").is_none());
        assert!(value.get("updated_at").is_none());
    }

    #[test]
    fn new_card_body_omits_loan() {
        let body = NewCard {
            loan: 9,
            title: "Title".into(),
            description: String::new(),
            status: "To Do".into(),
            position: 3,
        };
        let value = serde_json::to_value(&body).expect("serialize");
        assert!(value.get("loan").is_none());
        assert_eq!(value["position"], 3);
    }

    #[test]
    fn refresh_keeps_ordering_fields() {
        let mut local = Card::new(CardId::new(1), "old", "Done", 4);
        let server = Card::new(CardId::new(1), "new", "To Do", 0).with_description("d");

        local.refresh_content_from(&server);

        assert_eq!(local.title, "new");
        assert_eq!(local.description, "d");
        assert_eq!(local.column, "Done");
        assert_eq!(local.position, 4);
    }

    #[test]
    fn decode_list_shapes() {
        let plain = r#"[{"id": 2, "title": "b", "status": "To Do", "position": 1}]"#;
        assert_eq!(decode_card_list(plain).expect("plain").len(), 1);

        let paged = r#"{"count": 0, "next": null, "results": []}"#;
        assert!(decode_card_list(paged).expect("paged").is_empty());

        assert!(matches!(
            decode_card_list(r#"{"detail": "Not found."}"#),
            Err(ProtocolError::DeserializationFailed(_))
        ));
    }

    #[test]
    fn card_id_parse() {
        assert_eq!(" 12 ".parse::<CardId>().unwrap(), CardId::new(12));
        assert!("abc".parse::<CardId>().is_err());
    }
}
