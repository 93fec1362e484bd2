//! # prdeck-core
//!
//! Client-side sync layer for prdeck, a pull request dashboard.
//!
//! This library provides:
//! - Domain types for accounts, repos, pull requests, the merge queue,
//!   code-review jobs and repository analytics
//! - A typed client for the dashboard REST backend
//! - Resource slices with loading/error state, sorting and pagination
//! - PR filter settings and the query derived from them
//! - Debounced persistence and startup restore of filters and selections
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! State flows in one direction:
//! - **Backend:** [`api::DashboardApi`], implemented over HTTP by [`ApiClient`]
//! - **Slices:** [`slice::ListSlice`] / [`slice::ValueSlice`] hold the last
//!   answer for each resource and drop out-of-order responses
//! - **Coordinator:** [`Dashboard`] reacts to selection and filter changes,
//!   refetches what depends on them and autosaves the snapshot
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use prdeck_core::{ApiClient, Config, Dashboard};
//!
//! # async fn run() -> prdeck_core::Result<()> {
//! let config = Config::load()?;
//! let api = Arc::new(ApiClient::new(&config.server)?);
//!
//! let dashboard = Dashboard::new(api, config.sync.clone());
//! dashboard.mount().await;
//! dashboard.select_account("acme").await;
//! dashboard.select_repo("acme/widgets").await?;
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use api::{ApiClient, DashboardApi};
pub use config::Config;
pub use dashboard::{Dashboard, DashboardState};
pub use error::{Error, Result};
pub use filters::{FilterField, FilterSettings, PageLimit, PrState};
pub use queue::MergeQueue;
pub use reviews::ReviewTracker;
pub use settings::{PersistedSettingsSnapshot, SettingsStore};
pub use types::*;

// Public modules
pub mod api;
pub mod columns;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filters;
pub mod logging;
pub mod queue;
pub mod restore;
pub mod reviews;
pub mod settings;
pub mod slice;
pub mod sort;
pub mod types;
