//! Commit planning for board reorders.
//!
//! After a drop, every card's canonical position is its 0-based index among
//! the cards of its column, in array order. Only cards whose `(status,
//! position)` pair actually changed need a write; everything else is left
//! alone so a drag near the top of a long column does not turn into one
//! request per card below it for nothing.

use std::collections::HashMap;

use serde::Serialize;

use crate::card::{Card, CardId};
use crate::column::{ColumnKey, Columns};

/// The ordering fields of one card, as sent in a partial update.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PositionUpdate {
    /// Card being updated (goes in the URL).
    #[serde(skip_serializing)]
    pub id: CardId,
    /// New column.
    pub status: ColumnKey,
    /// New 0-based position within the column.
    pub position: u32,
}

impl PositionUpdate {
    /// Returns `true` if `card` already has this column and position.
    #[must_use]
    pub fn matches(&self, card: &Card) -> bool {
        card.column == self.status && card.position == self.position
    }

    /// Writes the update's column and position into `card`.
    pub fn apply_to(&self, card: &mut Card) {
        card.column = self.status.clone();
        card.position = self.position;
    }
}

/// Computes the canonical `(status, position)` of every card.
///
/// Columns are visited in set order; within a column, cards keep array
/// order. Cards whose column is not in `columns` get no entry.
///
/// # Examples
///
/// ```
/// use loanboard_protocol::{Card, CardId, Columns, canonical_positions};
///
/// let cards = vec![
///     Card::new(CardId::new(1), "a", "Done", 7),
///     Card::new(CardId::new(2), "b", "To Do", 3),
///     Card::new(CardId::new(3), "c", "Done", 2),
/// ];
///
/// let updates = canonical_positions(&cards, &Columns::loan_workflow());
/// let positions: Vec<(u64, u32)> = updates.iter().map(|u| (u.id.get(), u.position)).collect();
/// assert_eq!(positions, [(2, 0), (1, 0), (3, 1)]);
/// ```
#[must_use]
pub fn canonical_positions(cards: &[Card], columns: &Columns) -> Vec<PositionUpdate> {
    let mut updates = Vec::with_capacity(cards.len());
    for key in columns.keys() {
        let in_column = cards.iter().filter(|c| &c.column == key);
        for (index, card) in in_column.enumerate() {
            updates.push(PositionUpdate {
                id: card.id,
                status: key.clone(),
                position: u32::try_from(index).unwrap_or(u32::MAX),
            });
        }
    }
    updates
}

/// Plans the writes needed to move the backend from `old` to `new`.
///
/// Emits one update per card whose canonical column or position in `new`
/// differs from what `old` holds for it. Cards missing from `old` emit
/// nothing: they were created server-side with their position already.
///
/// # Examples
///
/// ```
/// use loanboard_protocol::{Card, CardId, Columns, plan_commit};
///
/// let old = vec![
///     Card::new(CardId::new(1), "a", "To Do", 0),
///     Card::new(CardId::new(2), "b", "To Do", 1),
/// ];
/// let mut new = old.clone();
/// new[1].column = "Done".into();
///
/// let updates = plan_commit(&old, &new, &Columns::loan_workflow());
/// assert_eq!(updates.len(), 1);
/// assert_eq!(updates[0].id, CardId::new(2));
/// assert_eq!(updates[0].status, "Done");
/// assert_eq!(updates[0].position, 0);
/// ```
#[must_use]
pub fn plan_commit(old: &[Card], new: &[Card], columns: &Columns) -> Vec<PositionUpdate> {
    let previous: HashMap<CardId, &Card> = old.iter().map(|c| (c.id, c)).collect();

    canonical_positions(new, columns)
        .into_iter()
        .filter(|update| {
            previous
                .get(&update.id)
                .is_some_and(|card| !update.matches(card))
        })
        .collect()
}

/// Writes canonical positions back into a card list.
pub fn apply_positions(cards: &mut [Card], updates: &[PositionUpdate]) {
    let by_id: HashMap<CardId, &PositionUpdate> = updates.iter().map(|u| (u.id, u)).collect();
    for card in cards {
        if let Some(update) = by_id.get(&card.id) {
            update.apply_to(card);
        }
    }
}
