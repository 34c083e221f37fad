//! Dummy data generation for testing and demonstration.
//!
//! This module provides a sample loan task board with realistic cards,
//! used to seed the in-memory backend and by tests.
//!
//! # Examples
//!
//! ```
//! use loanboard_protocol::dummy::dummy_cards;
//!
//! let cards = dummy_cards();
//! assert_eq!(cards.len(), 8);
//! ```

use crate::card::{Card, CardId};
use crate::column::LOAN_WORKFLOW;

/// A builder for sample cards.
///
/// Positions are assigned in the order cards are pushed per column.
struct CardBuilder {
    cards: Vec<Card>,
}

impl CardBuilder {
    fn new() -> Self {
        Self { cards: Vec::new() }
    }

    /// Appends a card to the end of `column`.
    fn push(mut self, column: &str, title: &str, description: &str) -> Self {
        let position = self.cards.iter().filter(|c| c.column == column).count();
        let id = CardId::new(self.cards.len() as u64 + 1);
        self.cards.push(
            Card::new(id, title, column, position as u32).with_description(description),
        );
        self
    }

    fn build(self) -> Vec<Card> {
        self.cards
    }
}

/// Generates the task board of a loan in underwriting.
///
/// Cards are spread across the loan workflow columns:
///
/// - **To Do**: 3 cards
/// - **In Progress**: 2 cards
/// - **In Review**: 1 card
/// - **Done**: 2 cards
///
/// Ids run from 1 to 8 in list order and positions are contiguous per
/// column.
///
/// # Examples
///
/// ```
/// use loanboard_protocol::dummy::dummy_cards;
///
/// let cards = dummy_cards();
/// let todo = cards.iter().filter(|c| c.column == "To Do").count();
/// assert_eq!(todo, 3);
/// ```
#[must_use]
pub fn dummy_cards() -> Vec<Card> {
    let [todo, in_progress, in_review, done] = LOAN_WORKFLOW;

    CardBuilder::new()
        .push(
            todo,
            "Order appraisal",
            "Send the order to the AMC once the intent to proceed is signed.",
        )
        .push(
            todo,
            "Request VOE",
            "Verbal verification of employment within 10 business days of closing.",
        )
        .push(todo, "Collect HOI declaration page", "")
        .push(
            in_progress,
            "Clear title conditions",
            "Payoff letter for the second lien is still missing.",
        )
        .push(
            in_progress,
            "Gather two months of bank statements",
            "Borrower uploaded one month; large deposit on the 14th needs a letter of explanation.",
        )
        .push(
            in_review,
            "Submit file to underwriting",
            "Checklist complete, waiting on the underwriter's first pass.",
        )
        .push(done, "Pull credit report", "Tri-merge pulled, middle score 742.")
        .push(done, "Send initial disclosures", "")
        .build()
}
