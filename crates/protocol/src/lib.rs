//! Shared protocol types for the loanboard workspace.
//!
//! This crate defines the board's data model and the pure parts of the
//! board engine: how a drop turns into a new card order, and which backend
//! writes a new order requires.
//!
//! # Overview
//!
//! The crate is organized into the following modules:
//!
//! - [`card`]: Card identifiers, cards and create payloads
//! - [`column`]: Column keys and the fixed, ordered column set
//! - [`reconcile`]: Drag-end reconciliation and drop-target resolution
//! - [`sync`]: Canonical positions and minimal commit planning
//! - [`dummy`]: Sample board for tests and offline use
//! - [`error`]: Error types for protocol operations
//!
//! # Examples
//!
//! Dropping a card into another column and planning the writes:
//!
//! ```
//! use loanboard_protocol::{CardId, Columns, DragEnd, DropTarget, plan_commit, reorder};
//! use loanboard_protocol::dummy::dummy_cards;
//!
//! let columns = Columns::loan_workflow();
//! let cards = dummy_cards();
//!
//! // Move "Request VOE" (id 2) to the end of "Done".
//! let drag = DragEnd::new(CardId::new(2), DropTarget::end_of("Done"));
//! let next = reorder(&cards, &drag).expect("card exists");
//!
//! let updates = plan_commit(&cards, &next, &columns);
//! // Card 2 moves, and card 3 below it in "To Do" shifts up by one.
//! assert_eq!(updates.len(), 2);
//! ```

pub mod card;
pub mod column;
pub mod dummy;
pub mod error;
pub mod reconcile;
pub mod sync;

// Re-export primary types at crate root for convenience
pub use card::{Card, CardId, NewCard, decode_card_list};
pub use column::{Column, ColumnKey, Columns, LOAN_WORKFLOW};
pub use error::{ProtocolError, Result};
pub use reconcile::{
    BeforeCard, DROP_DISTANCE_OFFSET, DragEnd, DropSlot, DropTarget, reorder, resolve_drop_target,
};
pub use sync::{PositionUpdate, apply_positions, canonical_positions, plan_commit};
