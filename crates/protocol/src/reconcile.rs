//! Drag-and-drop reconciliation.
//!
//! Turns a drop event into a new full card ordering. Positions are not
//! touched here: within a column, order is implied by array order, and
//! [`crate::sync`] derives the integers when the move is committed.

use serde::{Deserialize, Serialize};

use crate::card::{Card, CardId};
use crate::column::ColumnKey;

/// Vertical distance, in pointer units, added below a drop slot's top edge
/// before comparing it to the pointer.
pub const DROP_DISTANCE_OFFSET: f64 = 50.0;

/// The card a dropped card lands in front of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeforeCard {
    /// Insert immediately before this card.
    Card(CardId),
    /// Append after the last card of the column.
    End,
}

/// Where a card was dropped: a column and a slot in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTarget {
    /// Column the card now belongs to.
    pub column: ColumnKey,
    /// Slot within the column.
    pub before: BeforeCard,
}

impl DropTarget {
    /// Drop at the end of `column`.
    #[must_use]
    pub fn end_of(column: impl Into<ColumnKey>) -> Self {
        Self {
            column: column.into(),
            before: BeforeCard::End,
        }
    }

    /// Drop in `column`, right before `card`.
    #[must_use]
    pub fn before(column: impl Into<ColumnKey>, card: CardId) -> Self {
        Self {
            column: column.into(),
            before: BeforeCard::Card(card),
        }
    }
}

/// A completed drag gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragEnd {
    /// The card being dragged.
    pub card: CardId,
    /// Where it was released.
    pub target: DropTarget,
}

impl DragEnd {
    /// Creates a drag-end event.
    #[must_use]
    pub fn new(card: CardId, target: DropTarget) -> Self {
        Self { card, target }
    }
}

/// Computes the card list that results from a drop.
///
/// Returns `None` when nothing changes: the dragged card is no longer in
/// the list (stale event), or it was dropped onto its own slot. A
/// before-card that cannot be found is treated as [`BeforeCard::End`].
///
/// # Examples
///
/// ```
/// use loanboard_protocol::{Card, CardId, DragEnd, DropTarget, reorder};
///
/// let cards = vec![
///     Card::new(CardId::new(1), "a", "To Do", 0),
///     Card::new(CardId::new(2), "b", "To Do", 1),
/// ];
///
/// let drag = DragEnd::new(CardId::new(2), DropTarget::before("To Do", CardId::new(1)));
/// let reordered = reorder(&cards, &drag).unwrap();
/// assert_eq!(reordered[0].id, CardId::new(2));
/// assert_eq!(reordered[1].id, CardId::new(1));
/// ```
#[must_use]
pub fn reorder(cards: &[Card], drag: &DragEnd) -> Option<Vec<Card>> {
    let from = cards.iter().position(|c| c.id == drag.card)?;

    if drag.target.before == BeforeCard::Card(drag.card) {
        return None;
    }

    let mut next = cards.to_vec();
    let mut moved = next.remove(from);
    moved.column = drag.target.column.clone();

    let insert_at = match drag.target.before {
        BeforeCard::End => None,
        BeforeCard::Card(before) => next.iter().position(|c| c.id == before),
    };

    match insert_at {
        Some(index) => next.insert(index, moved),
        None => next.push(moved),
    }

    Some(next)
}

/// A drop indicator's geometry, as measured by the UI toolkit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropSlot {
    /// Column the slot belongs to.
    pub column: ColumnKey,
    /// Card the slot sits above, or `End` for the trailing slot.
    pub before: BeforeCard,
    /// Top edge of the slot, in the same units as the pointer.
    pub top: f64,
}

/// Picks the drop target for a pointer position using a nearest-edge rule.
///
/// Among `slots`, chooses the one whose top edge plus
/// [`DROP_DISTANCE_OFFSET`] is closest to, but still below, the pointer
/// (i.e. the nearest slot whose anchor is not yet passed). If the pointer
/// is past every anchor, the last slot wins. Returns `None` only when
/// there are no slots.
///
/// # Examples
///
/// ```
/// use loanboard_protocol::{BeforeCard, CardId, DropSlot, resolve_drop_target};
///
/// let slots = vec![
///     DropSlot { column: "Done".into(), before: BeforeCard::Card(CardId::new(1)), top: 0.0 },
///     DropSlot { column: "Done".into(), before: BeforeCard::Card(CardId::new(2)), top: 100.0 },
///     DropSlot { column: "Done".into(), before: BeforeCard::End, top: 200.0 },
/// ];
///
/// let target = resolve_drop_target(120.0, &slots).unwrap();
/// assert_eq!(target.before, BeforeCard::Card(CardId::new(2)));
///
/// let target = resolve_drop_target(900.0, &slots).unwrap();
/// assert_eq!(target.before, BeforeCard::End);
/// ```
#[must_use]
pub fn resolve_drop_target(pointer_y: f64, slots: &[DropSlot]) -> Option<DropTarget> {
    let fallback = slots.last()?;

    let nearest = slots
        .iter()
        .filter_map(|slot| {
            let offset = pointer_y - (slot.top + DROP_DISTANCE_OFFSET);
            (offset < 0.0).then_some((offset, slot))
        })
        .fold(None::<(f64, &DropSlot)>, |closest, (offset, slot)| match closest {
            Some((best, _)) if best >= offset => closest,
            _ => Some((offset, slot)),
        })
        .map_or(fallback, |(_, slot)| slot);

    Some(DropTarget {
        column: nearest.column.clone(),
        before: nearest.before,
    })
}
