//! Error types for board operations.

use loanboard_client::Error as ClientError;
use loanboard_protocol::{CardId, ColumnKey};

/// Errors that can occur while working with a board.
///
/// Stale drag references never show up here: a drop onto a card that no
/// longer exists is resolved locally as a drop at the end of the column.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// The initial fetch of the board failed. No partial board is kept.
    #[error("failed to load tasks for loan {loan}: {source}")]
    Load {
        /// The loan whose tasks were requested.
        loan: u64,
        /// The underlying client error.
        #[source]
        source: ClientError,
    },

    /// Creating a task failed; the working copy was left untouched.
    #[error("failed to create task: {0}")]
    Create(#[source] ClientError),

    /// Deleting a task failed; the card was put back where it was.
    #[error("failed to delete task {id}: {source}")]
    Delete {
        /// The card that could not be deleted.
        id: CardId,
        /// The underlying client error.
        #[source]
        source: ClientError,
    },

    /// Some position updates of a commit failed.
    ///
    /// The working copy keeps the new order; the failed cards will be
    /// planned again by the next commit.
    #[error("{} position update(s) failed, {succeeded} succeeded", .failed.len())]
    PartialCommit {
        /// Each failed card with its error.
        failed: Vec<(CardId, ClientError)>,
        /// Number of updates that went through.
        succeeded: usize,
    },

    /// The board cannot be replaced while a card is being dragged.
    #[error("card {0} is being dragged")]
    DragInProgress(CardId),

    /// The card is not on the board.
    #[error("card not found: {0}")]
    CardNotFound(CardId),

    /// The column is not part of the board's column set.
    #[error("unknown column: {0}")]
    UnknownColumn(ColumnKey),

    /// A task title was empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,
}

impl BoardError {
    /// Returns the ids of the cards whose updates failed, if this is a
    /// partial commit.
    #[must_use]
    pub fn failed_cards(&self) -> Vec<CardId> {
        match self {
            Self::PartialCommit { failed, .. } => failed.iter().map(|(id, _)| *id).collect(),
            _ => Vec::new(),
        }
    }
}

/// A specialized Result type for board operations.
pub type Result<T> = std::result::Result<T, BoardError>;
