//! The task resource contract.
//!
//! The board engine only ever talks to the backend through [`TaskApi`], so
//! it can run against the REST service or the in-memory stand-in alike.

use std::sync::Arc;

use async_trait::async_trait;
use loanboard_protocol::{Card, CardId, NewCard, PositionUpdate};

use crate::error::Result;

/// CRUD operations on the task resource of a loan.
///
/// Implementations must tolerate concurrent calls: a commit fires all its
/// updates at once.
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Lists the tasks of a loan. Order carries no meaning.
    async fn list_tasks(&self, loan: u64) -> Result<Vec<Card>>;

    /// Creates a task; the backend assigns the id.
    async fn create_task(&self, card: &NewCard) -> Result<Card>;

    /// Partially updates a task's column and position.
    async fn update_task(&self, update: &PositionUpdate) -> Result<Card>;

    /// Deletes a task.
    async fn delete_task(&self, id: CardId) -> Result<()>;
}

#[async_trait]
impl<T: TaskApi + ?Sized> TaskApi for Arc<T> {
    async fn list_tasks(&self, loan: u64) -> Result<Vec<Card>> {
        (**self).list_tasks(loan).await
    }

    async fn create_task(&self, card: &NewCard) -> Result<Card> {
        (**self).create_task(card).await
    }

    async fn update_task(&self, update: &PositionUpdate) -> Result<Card> {
        (**self).update_task(update).await
    }

    async fn delete_task(&self, id: CardId) -> Result<()> {
        (**self).delete_task(id).await
    }
}
