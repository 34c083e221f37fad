//! Board engine for loanboard.
//!
//! This crate ties the pure reconciliation and planning functions of
//! `loanboard-protocol` to a [`TaskApi`](loanboard_client::TaskApi)
//! backend:
//!
//! - [`BoardManager`]: the working copy of one loan's board, with drag
//!   handling, add/remove and commits of position changes
//! - [`CommitReport`]: what a successful commit wrote
//! - [`BoardError`]: Error types for board operations
//!
//! Drops are committed right away. Only cards whose column or position
//! actually changed are written, and all writes of a commit are sent
//! concurrently.

pub mod error;
pub mod manager;

pub use error::{BoardError, Result};
pub use manager::{BoardManager, CommitReport, order_cards};
