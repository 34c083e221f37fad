//! The board state manager.
//!
//! [`BoardManager`] owns the working copy of one loan's board and keeps the
//! backend in step with it. Two card lists are tracked:
//!
//! - the *working copy*, which is what the user sees and drags around;
//! - the *baseline*, the last state known to (or already requested from)
//!   the backend. Commits diff the working copy against it.
//!
//! Every mutation of the working copy bumps an epoch. A commit records the
//! epoch it started from, and responses that arrive after a newer commit or
//! a reload touched the same card are dropped instead of overwriting newer
//! local state.
//!
//! All methods take `&self`. State sits behind a mutex that is only locked
//! for synchronous sections, so a second drag may be dropped and committed
//! while an earlier commit is still waiting on the backend.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::join_all;
use loanboard_client::TaskApi;
use loanboard_protocol::{
    Card, CardId, ColumnKey, Columns, DragEnd, NewCard, PositionUpdate, apply_positions,
    canonical_positions, plan_commit, reorder,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{BoardError, Result};

/// Outcome of a commit in which every update succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Updates sent to and accepted by the backend, in plan order.
    pub updated: Vec<PositionUpdate>,
    /// Whether the working copy changed while the updates were in flight.
    pub stale: bool,
}

impl CommitReport {
    /// Returns `true` if nothing had to be written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty()
    }
}

#[derive(Debug, Default)]
struct BoardState {
    working: Vec<Card>,
    baseline: Vec<Card>,
    epoch: u64,
    drag: Option<CardId>,
    /// Epoch of the commit that last wrote each card's baseline entry.
    written_by: HashMap<CardId, u64>,
}

impl BoardState {
    fn replace(&mut self, cards: Vec<Card>) {
        self.baseline.clone_from(&cards);
        self.working = cards;
        self.written_by.clear();
        self.epoch += 1;
    }

    fn baseline_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.baseline.iter_mut().find(|c| c.id == id)
    }
}

/// Orders cards by column, then position.
///
/// Columns follow the set's order; ties keep their input order. Cards of a
/// column outside the set go last, in input order.
///
/// # Examples
///
/// ```
/// use loanboard_board::order_cards;
/// use loanboard_protocol::{Card, CardId, Columns};
///
/// let cards = vec![
///     Card::new(CardId::new(1), "a", "Done", 0),
///     Card::new(CardId::new(2), "b", "Archived", 0),
///     Card::new(CardId::new(3), "c", "To Do", 1),
///     Card::new(CardId::new(4), "d", "To Do", 0),
/// ];
///
/// let ids: Vec<u64> = order_cards(cards, &Columns::loan_workflow())
///     .iter()
///     .map(|c| c.id.get())
///     .collect();
/// assert_eq!(ids, [4, 3, 1, 2]);
/// ```
#[must_use]
pub fn order_cards(mut cards: Vec<Card>, columns: &Columns) -> Vec<Card> {
    cards.sort_by_key(|card| match columns.index_of(&card.column) {
        Some(index) => (index, card.position),
        None => (columns.len(), 0),
    });
    cards
}

/// Working copy of one loan's task board, synchronized with a [`TaskApi`].
///
/// # Examples
///
/// ```
/// use loanboard_board::BoardManager;
/// use loanboard_client::InMemoryTaskApi;
/// use loanboard_protocol::dummy::dummy_cards;
/// use loanboard_protocol::{CardId, Columns, DragEnd, DropTarget};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> loanboard_board::Result<()> {
/// let api = InMemoryTaskApi::seeded(7, dummy_cards());
/// let board = BoardManager::open(api, 7, Columns::loan_workflow()).await?;
///
/// // Move the first "To Do" card to the end of "Done".
/// let drag = DragEnd::new(CardId::new(1), DropTarget::end_of("Done"));
/// let report = board.drop_card(&drag).await?;
///
/// // The card itself plus the two "To Do" cards that moved up.
/// assert_eq!(report.updated.len(), 3);
/// assert_eq!(board.cards_by_column(&"Done".into()).last().map(|c| c.id), Some(CardId::new(1)));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BoardManager<A> {
    api: A,
    loan: u64,
    columns: Columns,
    state: Mutex<BoardState>,
}

impl<A: TaskApi> BoardManager<A> {
    /// Fetches the tasks of `loan` and builds a board from them.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Load`] if the tasks cannot be listed.
    #[instrument(skip(api, columns))]
    pub async fn open(api: A, loan: u64, columns: Columns) -> Result<Self> {
        let cards = api
            .list_tasks(loan)
            .await
            .map_err(|source| BoardError::Load { loan, source })?;

        let board = Self::with_cards(api, loan, columns, cards);
        debug!(cards = board.lock().working.len(), "opened board");
        Ok(board)
    }

    /// Builds a board from cards that were already fetched.
    #[must_use]
    pub fn with_cards(api: A, loan: u64, columns: Columns, cards: Vec<Card>) -> Self {
        let mut state = BoardState::default();
        state.replace(order_cards(cards, &columns));
        Self {
            api,
            loan,
            columns,
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The loan this board belongs to.
    #[must_use]
    pub fn loan(&self) -> u64 {
        self.loan
    }

    /// The board's column set.
    #[must_use]
    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// The backend this board talks to.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Returns a snapshot of the working copy.
    #[must_use]
    pub fn cards(&self) -> Vec<Card> {
        self.lock().working.clone()
    }

    /// Returns the cards of one column, in board order.
    #[must_use]
    pub fn cards_by_column(&self, column: &ColumnKey) -> Vec<Card> {
        self.lock()
            .working
            .iter()
            .filter(|c| &c.column == column)
            .cloned()
            .collect()
    }

    /// Returns a card of the working copy.
    #[must_use]
    pub fn card(&self, id: CardId) -> Option<Card> {
        self.lock().working.iter().find(|c| c.id == id).cloned()
    }

    /// Returns the current epoch. It changes on every local mutation.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.lock().epoch
    }

    /// Returns the updates the next commit would send.
    ///
    /// Non-empty after a partial commit, or after a delete left a gap in
    /// its column.
    #[must_use]
    pub fn pending_changes(&self) -> Vec<PositionUpdate> {
        let state = self.lock();
        plan_commit(&state.baseline, &state.working, &self.columns)
    }

    /// Replaces the board with `cards`, ordered by column then position.
    ///
    /// Commits still in flight keep running but no longer touch the board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::DragInProgress`] while a card is being dragged.
    pub fn load(&self, cards: Vec<Card>) -> Result<()> {
        let mut state = self.lock();
        if let Some(id) = state.drag {
            return Err(BoardError::DragInProgress(id));
        }
        state.replace(order_cards(cards, &self.columns));
        debug!(cards = state.working.len(), epoch = state.epoch, "loaded board");
        Ok(())
    }

    /// Fetches the loan's tasks again and loads them.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Load`] if the tasks cannot be listed, or
    /// [`BoardError::DragInProgress`] if a drag started in the meantime.
    #[instrument(skip(self), fields(loan = self.loan))]
    pub async fn refresh(&self) -> Result<()> {
        let cards = self
            .api
            .list_tasks(self.loan)
            .await
            .map_err(|source| BoardError::Load {
                loan: self.loan,
                source,
            })?;
        self.load(cards)
    }

    /// Marks `id` as being dragged. Returns `false` if no such card exists.
    pub fn begin_drag(&self, id: CardId) -> bool {
        let mut state = self.lock();
        if !state.working.iter().any(|c| c.id == id) {
            return false;
        }
        state.drag = Some(id);
        true
    }

    /// Abandons the current drag, if any.
    pub fn cancel_drag(&self) {
        self.lock().drag = None;
    }

    /// Returns the card being dragged.
    #[must_use]
    pub fn dragging(&self) -> Option<CardId> {
        self.lock().drag
    }

    /// Completes a drag and commits the resulting order.
    ///
    /// A drop onto the card's own slot, or of a card that is no longer on
    /// the board, changes nothing and returns an empty report.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::UnknownColumn`] if the target column is not in
    /// the board's set, leaving the board and the drag untouched, or
    /// [`BoardError::PartialCommit`] if some updates fail.
    #[instrument(skip(self, drag), fields(card = %drag.card, column = %drag.target.column))]
    pub async fn drop_card(&self, drag: &DragEnd) -> Result<CommitReport> {
        if !self.columns.contains(&drag.target.column) {
            return Err(BoardError::UnknownColumn(drag.target.column.clone()));
        }

        let reordered = {
            let mut state = self.lock();
            state.drag = None;
            reorder(&state.working, drag)
        };

        match reordered {
            Some(cards) => self.apply_reorder(cards).await,
            None => {
                debug!("drop changed nothing");
                Ok(CommitReport::default())
            }
        }
    }

    /// Replaces the working copy with a reordered card list and commits it.
    ///
    /// Each card's position is rewritten to its index within its column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::UnknownColumn`] if a card was moved into a
    /// column outside the board's set, or [`BoardError::PartialCommit`] if
    /// some updates fail.
    pub async fn apply_reorder(&self, mut cards: Vec<Card>) -> Result<CommitReport> {
        let positions = canonical_positions(&cards, &self.columns);
        apply_positions(&mut cards, &positions);
        {
            let mut state = self.lock();
            // Cards may stay in a column outside the set, but not move into one.
            for card in cards.iter().filter(|c| !self.columns.contains(&c.column)) {
                let moved = state
                    .working
                    .iter()
                    .find(|c| c.id == card.id)
                    .is_none_or(|c| c.column != card.column);
                if moved {
                    return Err(BoardError::UnknownColumn(card.column.clone()));
                }
            }
            state.working = cards;
            state.epoch += 1;
        }
        self.commit().await
    }

    /// Sends the difference between the working copy and the baseline.
    async fn commit(&self) -> Result<CommitReport> {
        let (epoch, planned) = {
            let mut state = self.lock();
            let epoch = state.epoch;
            let updates = plan_commit(&state.baseline, &state.working, &self.columns);

            let mut planned = Vec::with_capacity(updates.len());
            for update in updates {
                if let Some(card) = state.baseline_mut(update.id) {
                    let prior = card.clone();
                    update.apply_to(card);
                    state.written_by.insert(update.id, epoch);
                    planned.push((update, prior));
                }
            }
            (epoch, planned)
        };

        if planned.is_empty() {
            return Ok(CommitReport::default());
        }
        debug!(epoch, updates = planned.len(), "committing positions");

        let results = join_all(
            planned
                .iter()
                .map(|(update, _)| self.api.update_task(update)),
        )
        .await;

        let mut state = self.lock();
        let stale = state.epoch != epoch;
        let mut updated = Vec::with_capacity(planned.len());
        let mut failed = Vec::new();

        for ((update, prior), result) in planned.into_iter().zip(results) {
            let latest = state.written_by.get(&update.id) == Some(&epoch);
            match result {
                Ok(server) => {
                    if latest {
                        if let Some(card) = state.baseline_mut(update.id) {
                            *card = server.clone();
                        }
                    }
                    if !stale {
                        if let Some(card) = state.working.iter_mut().find(|c| c.id == update.id) {
                            card.refresh_content_from(&server);
                        }
                    }
                    updated.push(update);
                }
                Err(err) => {
                    warn!(card = %update.id, error = %err, "position update failed");
                    if latest {
                        if let Some(card) = state.baseline_mut(update.id) {
                            *card = prior;
                        }
                        state.written_by.remove(&update.id);
                    }
                    failed.push((update.id, err));
                }
            }
        }

        if failed.is_empty() {
            info!(updated = updated.len(), stale, "committed board order");
            Ok(CommitReport { updated, stale })
        } else {
            Err(BoardError::PartialCommit {
                failed,
                succeeded: updated.len(),
            })
        }
    }

    /// Creates a task at the end of `column` and adds it to the board.
    ///
    /// The backend decides the final id and position.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::EmptyTitle`] or [`BoardError::UnknownColumn`]
    /// for invalid input, and [`BoardError::Create`] if the backend refuses.
    /// The board is unchanged on error.
    #[instrument(skip(self, column, description), fields(column = %column))]
    pub async fn add_card(
        &self,
        column: &ColumnKey,
        title: &str,
        description: &str,
    ) -> Result<Card> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BoardError::EmptyTitle);
        }
        if !self.columns.contains(column) {
            return Err(BoardError::UnknownColumn(column.clone()));
        }

        let position = {
            let state = self.lock();
            state.working.iter().filter(|c| &c.column == column).count()
        };
        let new_card = NewCard {
            loan: self.loan,
            title: title.to_owned(),
            description: description.to_owned(),
            status: column.clone(),
            position: u32::try_from(position).unwrap_or(u32::MAX),
        };

        let created = self
            .api
            .create_task(&new_card)
            .await
            .map_err(BoardError::Create)?;

        let mut state = self.lock();
        state.working.push(created.clone());
        state.baseline.push(created.clone());
        state.epoch += 1;
        info!(card = %created.id, position = created.position, "added card");
        Ok(created)
    }

    /// Deletes a card, removing it from the board right away.
    ///
    /// Cards below it keep their positions until the next commit.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::CardNotFound`] for an unknown id, or
    /// [`BoardError::Delete`] if the backend refuses, in which case the card
    /// is put back at its former index.
    #[instrument(skip(self))]
    pub async fn remove_card(&self, id: CardId) -> Result<Card> {
        let (index, card) = {
            let mut state = self.lock();
            let index = state
                .working
                .iter()
                .position(|c| c.id == id)
                .ok_or(BoardError::CardNotFound(id))?;
            if state.drag == Some(id) {
                state.drag = None;
            }
            state.epoch += 1;
            (index, state.working.remove(index))
        };

        match self.api.delete_task(id).await {
            Ok(()) => {
                let mut state = self.lock();
                state.baseline.retain(|c| c.id != id);
                state.written_by.remove(&id);
                info!(column = %card.column, "removed card");
                Ok(card)
            }
            Err(source) => {
                warn!(error = %source, "delete failed, restoring card");
                let mut state = self.lock();
                let index = index.min(state.working.len());
                state.working.insert(index, card);
                state.epoch += 1;
                Err(BoardError::Delete { id, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use loanboard_client::{FailOn, InMemoryTaskApi};
    use loanboard_protocol::dummy::dummy_cards;
    use loanboard_protocol::{Column, DropTarget};
    use proptest::prelude::*;

    use super::*;

    const LOAN: u64 = 7;

    fn id(n: u64) -> CardId {
        CardId::new(n)
    }

    fn card(n: u64, column: &str, position: u32) -> Card {
        Card::new(id(n), format!("card {n}"), column, position)
    }

    fn ids(cards: &[Card]) -> Vec<u64> {
        cards.iter().map(|c| c.id.get()).collect()
    }

    fn update(n: u64, status: &str, position: u32) -> PositionUpdate {
        PositionUpdate {
            id: id(n),
            status: status.into(),
            position,
        }
    }

    async fn sample_board() -> BoardManager<Arc<InMemoryTaskApi>> {
        let api = Arc::new(InMemoryTaskApi::seeded(LOAN, dummy_cards()));
        BoardManager::open(api, LOAN, Columns::loan_workflow())
            .await
            .unwrap()
    }

    fn two_columns() -> Columns {
        Columns::new(vec![Column::keyed("To Do"), Column::keyed("Done")]).unwrap()
    }

    #[tokio::test]
    async fn open_orders_by_column_then_position() {
        let api = InMemoryTaskApi::seeded(
            LOAN,
            [card(1, "Done", 0), card(2, "To Do", 1), card(3, "To Do", 0)],
        );
        let board = BoardManager::open(api, LOAN, Columns::loan_workflow())
            .await
            .unwrap();
        assert_eq!(ids(&board.cards()), [3, 2, 1]);
        assert!(board.pending_changes().is_empty());
    }

    #[tokio::test]
    async fn open_failure_is_a_load_error() {
        let api = InMemoryTaskApi::new();
        api.fail(FailOn::List);
        let err = BoardManager::open(api, LOAN, Columns::loan_workflow())
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::Load { loan: LOAN, .. }));
    }

    #[tokio::test]
    async fn load_is_refused_while_dragging() {
        let board = sample_board().await;
        assert!(board.begin_drag(id(2)));
        assert!(matches!(
            board.load(Vec::new()),
            Err(BoardError::DragInProgress(dragged)) if dragged == id(2)
        ));
        assert_eq!(board.cards().len(), 8);

        board.cancel_drag();
        board.load(vec![card(9, "Done", 0)]).unwrap();
        assert_eq!(ids(&board.cards()), [9]);
    }

    #[tokio::test]
    async fn begin_drag_of_unknown_card() {
        let board = sample_board().await;
        assert!(!board.begin_drag(id(99)));
        assert_eq!(board.dragging(), None);
    }

    #[tokio::test]
    async fn cards_by_column_keeps_board_order() {
        let board = sample_board().await;
        assert_eq!(ids(&board.cards_by_column(&"To Do".into())), [1, 2, 3]);
        assert_eq!(ids(&board.cards_by_column(&"In Review".into())), [6]);
        assert!(board.cards_by_column(&"Funded".into()).is_empty());
    }

    #[tokio::test]
    async fn drop_onto_own_slot_sends_nothing() {
        let board = sample_board().await;
        let epoch = board.epoch();
        assert!(board.begin_drag(id(2)));

        let report = board
            .drop_card(&DragEnd::new(id(2), DropTarget::before("To Do", id(2))))
            .await
            .unwrap();

        assert!(report.is_empty());
        assert_eq!(board.dragging(), None);
        assert_eq!(board.epoch(), epoch);
        assert!(board.api().updates().is_empty());
    }

    #[tokio::test]
    async fn drop_before_next_card_sends_nothing() {
        let board = sample_board().await;
        let report = board
            .drop_card(&DragEnd::new(id(1), DropTarget::before("To Do", id(2))))
            .await
            .unwrap();
        assert!(report.is_empty());
        assert!(board.api().updates().is_empty());
    }

    #[tokio::test]
    async fn drop_of_vanished_card_is_ignored() {
        let board = sample_board().await;
        let report = board
            .drop_card(&DragEnd::new(id(42), DropTarget::end_of("Done")))
            .await
            .unwrap();
        assert!(report.is_empty());
        assert_eq!(board.cards().len(), 8);
    }

    #[tokio::test]
    async fn drop_into_unknown_column_is_refused() {
        let board = BoardManager::open(
            InMemoryTaskApi::seeded(LOAN, [card(1, "To Do", 0), card(2, "To Do", 1)]),
            LOAN,
            two_columns(),
        )
        .await
        .unwrap();
        assert!(board.begin_drag(id(1)));
        let epoch = board.epoch();

        let err = board
            .drop_card(&DragEnd::new(id(1), DropTarget::end_of("Funded")))
            .await
            .unwrap_err();

        assert!(matches!(err, BoardError::UnknownColumn(column) if column == "Funded"));
        assert_eq!(board.dragging(), Some(id(1)));
        assert_eq!(board.epoch(), epoch);
        assert_eq!(board.card(id(1)).unwrap().column, "To Do");
        assert!(board.api().updates().is_empty());
        assert!(board.pending_changes().is_empty());
    }

    #[tokio::test]
    async fn apply_reorder_refuses_move_into_unknown_column() {
        let board = sample_board().await;
        let mut cards = board.cards();
        cards[0].column = "Funded".into();

        let err = board.apply_reorder(cards).await.unwrap_err();
        assert!(matches!(err, BoardError::UnknownColumn(column) if column == "Funded"));
        assert_eq!(board.card(id(1)).unwrap().column, "To Do");
        assert!(board.api().updates().is_empty());
    }

    #[tokio::test]
    async fn move_from_middle_of_column_to_end_of_another() {
        let api = Arc::new(InMemoryTaskApi::seeded(
            LOAN,
            [
                card(1, "To Do", 0),
                card(2, "To Do", 1),
                card(3, "To Do", 2),
                card(4, "To Do", 3),
                card(5, "To Do", 4),
                card(6, "Done", 0),
                card(7, "Done", 1),
            ],
        ));
        let board = BoardManager::open(Arc::clone(&api), LOAN, two_columns())
            .await
            .unwrap();

        let report = board
            .drop_card(&DragEnd::new(id(3), DropTarget::end_of("Done")))
            .await
            .unwrap();

        let mut sent = report.updated.clone();
        sent.sort_by_key(|u| u.id);
        assert_eq!(
            sent,
            [update(3, "Done", 2), update(4, "To Do", 2), update(5, "To Do", 3)]
        );
        assert!(!report.stale);
        assert_eq!(api.updates().len(), 3);
        assert_eq!(ids(&board.cards_by_column(&"Done".into())), [6, 7, 3]);
        assert!(board.pending_changes().is_empty());
    }

    #[tokio::test]
    async fn move_second_card_to_empty_column() {
        let board = BoardManager::open(
            InMemoryTaskApi::seeded(LOAN, [card(1, "To Do", 0), card(2, "To Do", 1)]),
            LOAN,
            two_columns(),
        )
        .await
        .unwrap();

        let report = board
            .drop_card(&DragEnd::new(id(2), DropTarget::end_of("Done")))
            .await
            .unwrap();

        assert_eq!(report.updated, [update(2, "Done", 0)]);
        assert_eq!(board.api().updates(), [update(2, "Done", 0)]);
    }

    #[tokio::test]
    async fn missing_before_card_drops_at_end() {
        let board = sample_board().await;
        let report = board
            .drop_card(&DragEnd::new(id(7), DropTarget::before("In Review", id(77))))
            .await
            .unwrap();

        assert!(report.updated.contains(&update(7, "In Review", 1)));
        assert_eq!(ids(&board.cards_by_column(&"In Review".into())), [6, 7]);
    }

    #[tokio::test]
    async fn commit_refreshes_content_from_server() {
        let board = sample_board().await;
        assert!(board.card(id(1)).unwrap().updated_at.is_none());

        board
            .drop_card(&DragEnd::new(id(1), DropTarget::end_of("Done")))
            .await
            .unwrap();

        assert!(board.card(id(1)).unwrap().updated_at.is_some());
    }

    #[tokio::test]
    async fn partial_commit_keeps_local_order() {
        let board = sample_board().await;
        board.api().fail(FailOn::Update(id(3)));

        // 1 moves to Done; 2 and 3 move up in To Do.
        let err = board
            .drop_card(&DragEnd::new(id(1), DropTarget::end_of("Done")))
            .await
            .unwrap_err();

        match &err {
            BoardError::PartialCommit { failed, succeeded } => {
                assert_eq!(failed.len(), 1);
                assert_eq!(*succeeded, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.failed_cards(), [id(3)]);
        assert_eq!(ids(&board.cards_by_column(&"To Do".into())), [2, 3]);
        assert_eq!(board.card(id(3)).unwrap().position, 1);

        // The failed card is planned again.
        assert_eq!(board.pending_changes(), [update(3, "To Do", 1)]);
        board.api().succeed(FailOn::Update(id(3)));
        board.api().clear_updates();
        board
            .drop_card(&DragEnd::new(id(6), DropTarget::end_of("In Review")))
            .await
            .unwrap();
        assert_eq!(board.api().updates(), [update(3, "To Do", 1)]);
    }

    #[tokio::test]
    async fn add_card_appends_with_server_id() {
        let board = sample_board().await;
        let epoch = board.epoch();

        let card = board
            .add_card(&"In Review".into(), "  Order flood cert  ", "Zone AE")
            .await
            .unwrap();

        assert_eq!(card.id, id(9));
        assert_eq!(card.title, "Order flood cert");
        assert_eq!(card.position, 1);
        assert_eq!(ids(&board.cards_by_column(&"In Review".into())), [6, 9]);
        assert!(board.epoch() > epoch);
        assert!(board.pending_changes().is_empty());
    }

    #[tokio::test]
    async fn add_card_rejects_bad_input() {
        let board = sample_board().await;
        assert!(matches!(
            board.add_card(&"To Do".into(), "   ", "").await,
            Err(BoardError::EmptyTitle)
        ));
        assert!(matches!(
            board.add_card(&"Funded".into(), "Wire", "").await,
            Err(BoardError::UnknownColumn(column)) if column == "Funded"
        ));
        assert_eq!(board.cards().len(), 8);
    }

    #[tokio::test]
    async fn add_card_failure_leaves_board_alone() {
        let board = sample_board().await;
        board.api().fail(FailOn::Create);
        let before = board.cards();

        let err = board.add_card(&"To Do".into(), "Wire", "").await.unwrap_err();
        assert!(matches!(err, BoardError::Create(_)));
        assert_eq!(board.cards(), before);
    }

    #[tokio::test]
    async fn remove_card_does_not_renumber() {
        let board = sample_board().await;

        let removed = board.remove_card(id(1)).await.unwrap();
        assert_eq!(removed.title, "Order appraisal");

        let todo = board.cards_by_column(&"To Do".into());
        assert_eq!(ids(&todo), [2, 3]);
        let positions: Vec<u32> = todo.iter().map(|c| c.position).collect();
        assert_eq!(positions, [1, 2]);
        assert!(board.api().updates().is_empty());
        assert!(board.api().get(id(1)).is_none());

        // The gap is closed by the next commit.
        assert_eq!(
            board.pending_changes(),
            [update(2, "To Do", 0), update(3, "To Do", 1)]
        );
    }

    #[tokio::test]
    async fn remove_card_failure_restores_it() {
        let board = sample_board().await;
        board.api().fail(FailOn::Delete(id(2)));

        let err = board.remove_card(id(2)).await.unwrap_err();
        assert!(matches!(err, BoardError::Delete { id: failed, .. } if failed == id(2)));
        assert_eq!(ids(&board.cards_by_column(&"To Do".into())), [1, 2, 3]);
        assert_eq!(board.cards().len(), 8);
    }

    #[tokio::test]
    async fn remove_unknown_card() {
        let board = sample_board().await;
        assert!(matches!(
            board.remove_card(id(99)).await,
            Err(BoardError::CardNotFound(missing)) if missing == id(99)
        ));
    }

    #[tokio::test]
    async fn refresh_replaces_board() {
        let board = sample_board().await;
        board.api().insert(LOAN, [card(20, "In Review", 5)]);

        board.refresh().await.unwrap();
        assert_eq!(board.cards().len(), 9);
        assert_eq!(ids(&board.cards_by_column(&"In Review".into())), [6, 20]);
    }

    #[tokio::test]
    async fn late_responses_do_not_overwrite_newer_commit() {
        let api = Arc::new(InMemoryTaskApi::seeded(LOAN, dummy_cards()));
        let board = Arc::new(
            BoardManager::open(Arc::clone(&api), LOAN, Columns::loan_workflow())
                .await
                .unwrap(),
        );
        api.hold_updates();

        // 1 -> end of Done: three updates held.
        let first = tokio::spawn({
            let board = Arc::clone(&board);
            async move {
                board
                    .drop_card(&DragEnd::new(id(1), DropTarget::end_of("Done")))
                    .await
            }
        });
        while api.held_updates() < 3 {
            tokio::task::yield_now().await;
        }

        // 1 -> end of In Review while the first commit is in flight.
        let second = tokio::spawn({
            let board = Arc::clone(&board);
            async move {
                board
                    .drop_card(&DragEnd::new(id(1), DropTarget::end_of("In Review")))
                    .await
            }
        });
        while api.held_updates() < 4 {
            tokio::task::yield_now().await;
        }

        api.release_updates();
        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap();

        assert!(first.stale);
        assert_eq!(first.updated.len(), 3);
        assert!(!second.stale);
        assert_eq!(second.updated, [update(1, "In Review", 1)]);

        let moved = board.card(id(1)).unwrap();
        assert_eq!((moved.column.as_str(), moved.position), ("In Review", 1));
        assert!(board.pending_changes().is_empty());
    }

    #[tokio::test]
    async fn reload_during_commit_discards_responses() {
        let api = Arc::new(InMemoryTaskApi::seeded(LOAN, dummy_cards()));
        let board = Arc::new(
            BoardManager::open(Arc::clone(&api), LOAN, Columns::loan_workflow())
                .await
                .unwrap(),
        );
        api.hold_updates();

        let commit = tokio::spawn({
            let board = Arc::clone(&board);
            async move {
                board
                    .drop_card(&DragEnd::new(id(8), DropTarget::end_of("To Do")))
                    .await
            }
        });
        while api.held_updates() == 0 {
            tokio::task::yield_now().await;
        }

        board.load(vec![card(8, "Done", 0)]).unwrap();
        api.release_updates();

        let report = commit.await.unwrap().unwrap();
        assert!(report.stale);
        assert_eq!(ids(&board.cards()), [8]);
        assert_eq!(board.card(id(8)).unwrap().column, "Done");
        assert!(board.pending_changes().is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn positions_match_column_index_after_drops(
            moves in prop::collection::vec((1u64..=8, 0usize..4, 0u64..=9), 1..12)
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            runtime.block_on(async {
                let board = sample_board().await;
                for (card, column, before) in moves {
                    let column = loanboard_protocol::LOAN_WORKFLOW[column];
                    let target = if before == 0 {
                        DropTarget::end_of(column)
                    } else {
                        DropTarget::before(column, id(before))
                    };
                    board.drop_card(&DragEnd::new(id(card), target)).await.unwrap();
                }

                for column in board.columns().keys() {
                    let positions: Vec<u32> = board
                        .cards_by_column(column)
                        .iter()
                        .map(|c| c.position)
                        .collect();
                    let expected: Vec<u32> = (0..positions.len() as u32).collect();
                    assert_eq!(positions, expected);
                }
                assert!(board.pending_changes().is_empty());
                assert_eq!(board.cards().len(), 8);
            });
        }
    }
}
