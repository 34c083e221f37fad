//! Configuration management for loanboard.
//!
//! This crate handles loading, validating, and persisting configuration
//! from files, environment variables and built-in defaults.
//!
//! # Overview
//!
//! - [`config`]: Core configuration struct, loading and env overrides
//! - [`api`]: Task API endpoint settings
//! - [`persistence`]: Config file discovery, reading and writing
//! - [`error`]: Error types for configuration operations
//!
//! # Configuration Sources (Priority)
//!
//! 1. Environment variables (`LOANBOARD_API_URL`, `LOANBOARD_LOAN`)
//! 2. Local config (`./loanboard.json5` or `./loanboard.json`)
//! 3. User config (`~/.config/loanboard/config.json5` or `config.json`)
//! 4. Built-in defaults
//!
//! # Example File
//!
//! ```json5
//! {
//!   api: {
//!     base_url: "https://backend.example.com/api/",
//!     timeout_secs: 30,
//!   },
//!   // Keys are the backend's task status values.
//!   columns: [
//!     { key: "To Do", title: "To Do" },
//!     { key: "In Progress", title: "In Progress" },
//!     { key: "In Review", title: "In Review" },
//!     { key: "Done", title: "Done" },
//!   ],
//!   default_loan: 42,
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod persistence;

// Re-export primary types at crate root for convenience
pub use api::ApiConfig;
pub use config::{Config, ENV_API_URL, ENV_LOAN};
pub use error::{ConfigError, Result};
