//! In-memory task backend.
//!
//! [`InMemoryTaskApi`] stands in for the REST service in tests and offline
//! runs. It keeps tasks for any number of loans and follows the backend's
//! observable rules:
//!
//! - ids are assigned sequentially from 1;
//! - a created task goes to the end of its column, at the highest position
//!   in that loan and column plus one (0 when the column is empty),
//!   whatever position the client asked for. The REST service computes
//!   `(last or -1) + 1`, which also yields 0 when the highest position is
//!   0; this backend uses the intended `max + 1` instead;
//! - an update writes the given column and position and nothing else,
//!   last write wins;
//! - listings come back ordered by status, then position.
//!
//! It also records every update it receives and can be told to fail
//! specific calls or to hold updates until released.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use loanboard_protocol::{Card, CardId, NewCard, PositionUpdate};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::api::TaskApi;
use crate::error::{Error, Result};

/// A call the in-memory backend can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailOn {
    /// Every `list_tasks` call.
    List,
    /// Every `create_task` call.
    Create,
    /// `update_task` for this card.
    Update(CardId),
    /// `delete_task` for this card.
    Delete(CardId),
}

#[derive(Debug, Clone)]
struct StoredTask {
    loan: u64,
    card: Card,
}

#[derive(Debug, Default)]
struct Store {
    tasks: Vec<StoredTask>,
    next_id: u64,
    updates: Vec<PositionUpdate>,
    failures: HashSet<FailOn>,
    gate: Option<Arc<Semaphore>>,
    held: usize,
}

impl Store {
    fn find_mut(&mut self, id: CardId) -> Result<&mut StoredTask> {
        self.tasks
            .iter_mut()
            .find(|t| t.card.id == id)
            .ok_or(Error::NotFound(id))
    }

    fn fail_if(&self, on: FailOn, operation: &'static str) -> Result<()> {
        if self.failures.contains(&on) {
            debug!(?on, "injected failure");
            return Err(Error::Simulated { operation });
        }
        Ok(())
    }
}

/// Task backend held entirely in memory.
///
/// # Examples
///
/// ```
/// use loanboard_client::{InMemoryTaskApi, TaskApi};
/// use loanboard_protocol::dummy::dummy_cards;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> loanboard_client::Result<()> {
/// let api = InMemoryTaskApi::seeded(1, dummy_cards());
/// let cards = api.list_tasks(1).await?;
/// assert_eq!(cards.len(), 8);
/// assert!(api.list_tasks(2).await?.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct InMemoryTaskApi {
    store: Mutex<Store>,
}

impl InMemoryTaskApi {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend holding `cards` for `loan`, keeping their ids.
    #[must_use]
    pub fn seeded(loan: u64, cards: impl IntoIterator<Item = Card>) -> Self {
        let api = Self::new();
        api.insert(loan, cards);
        api
    }

    /// Adds cards for `loan` as-is. Later creates get ids above the highest
    /// id seen.
    pub fn insert(&self, loan: u64, cards: impl IntoIterator<Item = Card>) {
        let mut store = self.store();
        for card in cards {
            store.next_id = store.next_id.max(card.id.get());
            store.tasks.push(StoredTask { loan, card });
        }
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a stored task, regardless of loan.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<Card> {
        self.store()
            .tasks
            .iter()
            .find(|t| t.card.id == id)
            .map(|t| t.card.clone())
    }

    /// Returns every update received so far, in arrival order.
    #[must_use]
    pub fn updates(&self) -> Vec<PositionUpdate> {
        self.store().updates.clone()
    }

    /// Forgets the recorded updates.
    pub fn clear_updates(&self) {
        self.store().updates.clear();
    }

    /// Makes the given call fail until [`succeed`](Self::succeed) is called.
    pub fn fail(&self, on: FailOn) {
        self.store().failures.insert(on);
    }

    /// Stops failing the given call.
    pub fn succeed(&self, on: FailOn) {
        self.store().failures.remove(&on);
    }

    /// Makes subsequent `update_task` calls wait until
    /// [`release_updates`](Self::release_updates).
    pub fn hold_updates(&self) {
        self.store().gate = Some(Arc::new(Semaphore::new(0)));
    }

    /// Lets held and future updates through.
    pub fn release_updates(&self) {
        if let Some(gate) = self.store().gate.take() {
            gate.close();
        }
    }

    /// Number of updates currently waiting on a hold.
    #[must_use]
    pub fn held_updates(&self) -> usize {
        self.store().held
    }

    /// Waits while updates are held, returning once released.
    async fn pass_gate(&self) {
        let gate = self.store().gate.clone();
        if let Some(gate) = gate {
            self.store().held += 1;
            // The gate never hands out permits; closing it is the release.
            let _ = gate.acquire().await;
            self.store().held -= 1;
        }
    }
}

#[async_trait]
impl TaskApi for InMemoryTaskApi {
    async fn list_tasks(&self, loan: u64) -> Result<Vec<Card>> {
        let store = self.store();
        store.fail_if(FailOn::List, "list")?;

        let mut cards: Vec<Card> = store
            .tasks
            .iter()
            .filter(|t| t.loan == loan)
            .map(|t| t.card.clone())
            .collect();
        cards.sort_by(|a, b| (&a.column, a.position).cmp(&(&b.column, b.position)));
        Ok(cards)
    }

    async fn create_task(&self, card: &NewCard) -> Result<Card> {
        let mut store = self.store();
        store.fail_if(FailOn::Create, "create")?;

        let position = store
            .tasks
            .iter()
            .filter(|t| t.loan == card.loan && t.card.column == card.status)
            .map(|t| t.card.position + 1)
            .max()
            .unwrap_or(0);

        store.next_id += 1;
        let mut created = Card::new(
            CardId::new(store.next_id),
            card.title.clone(),
            card.status.clone(),
            position,
        )
        .with_description(card.description.clone());
        created.updated_at = Some(Utc::now());

        store.tasks.push(StoredTask {
            loan: card.loan,
            card: created.clone(),
        });
        Ok(created)
    }

    async fn update_task(&self, update: &PositionUpdate) -> Result<Card> {
        self.pass_gate().await;

        let mut store = self.store();
        store.fail_if(FailOn::Update(update.id), "update")?;
        store.updates.push(update.clone());

        let task = store.find_mut(update.id)?;
        update.apply_to(&mut task.card);
        task.card.updated_at = Some(Utc::now());
        Ok(task.card.clone())
    }

    async fn delete_task(&self, id: CardId) -> Result<()> {
        let mut store = self.store();
        store.fail_if(FailOn::Delete(id), "delete")?;

        let index = store
            .tasks
            .iter()
            .position(|t| t.card.id == id)
            .ok_or(Error::NotFound(id))?;
        store.tasks.remove(index);
        Ok(())
    }
}
