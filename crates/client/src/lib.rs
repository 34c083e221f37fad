//! Task API client for loanboard.
//!
//! This crate provides access to the task resource of a loan, the only
//! backend surface the board engine depends on.
//!
//! # Overview
//!
//! - [`TaskApi`]: The async contract (list, create, update, delete)
//! - [`HttpTaskApi`]: JSON over HTTP against the loan backend
//! - [`InMemoryTaskApi`]: A backend held in memory, for tests and offline use
//! - [`Error`]: Error types for task API operations
//!
//! # Examples
//!
//! ```
//! use loanboard_client::{InMemoryTaskApi, TaskApi};
//! use loanboard_protocol::{CardId, PositionUpdate};
//! use loanboard_protocol::dummy::dummy_cards;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> loanboard_client::Result<()> {
//! let api = InMemoryTaskApi::seeded(7, dummy_cards());
//!
//! let update = PositionUpdate {
//!     id: CardId::new(1),
//!     status: "Done".into(),
//!     position: 2,
//! };
//! let card = api.update_task(&update).await?;
//! assert_eq!(card.column, "Done");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod error;
pub mod http;
pub mod memory;

pub use api::TaskApi;
pub use error::{Error, Result};
pub use http::HttpTaskApi;
pub use memory::{FailOn, InMemoryTaskApi};
