//! # Choreo Core Library
//!
//! Recurring chores with per-occurrence overrides, expanded on demand into
//! calendar events.
//!
//! ## Features
//!
//! - **Deterministic Expansion**: occurrences are a pure function of a task's
//!   anchor, repeat rule and override sets; "now" and the horizon are inputs
//! - **Per-Occurrence Overrides**: mark one occurrence done or delete it
//!   without touching the rest of the series
//! - **Timezone Awareness**: day, month and weekend arithmetic happen on the
//!   user's local calendar, DST included
//! - **Whole-Document Storage**: one document per user with `chores` and
//!   `sections` fields
//!
//! ## Core Modules
//!
//! - [`models`]: Task records, repeat rules and occurrences
//! - [`recurrence`]: The occurrence expander
//! - [`agenda`]: Calendar and today views merged across tasks
//! - [`store`]: Task store trait with JSON file and in-memory backends
//! - [`book`]: User-facing operations (add, edit, delete, toggle done, sections)
//! - [`timezone`]: Timezone utilities
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use choreo_core::{
//!     book::ChoreBook, models::{NewTask, Repeat}, recurrence::ExpandOptions,
//!     store::JsonFileStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), choreo_core::error::CoreError> {
//!     let book = ChoreBook::new(JsonFileStore::new("choreo-data"), "local")?;
//!
//!     book.add(NewTask {
//!         name: "Take out the trash".to_string(),
//!         date_time: Some(Utc::now()),
//!         repeat: Repeat::Weekly,
//!         ..Default::default()
//!     })
//!     .await?;
//!
//!     let now = Utc::now();
//!     let options = ExpandOptions::rolling(now, ExpandOptions::DEFAULT_HORIZON_MONTHS);
//!     for occurrence in book.today(&options, now).await? {
//!         println!("{} {}", occurrence.timestamp, occurrence.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod agenda;
pub mod book;
pub mod error;
pub mod models;
pub mod recurrence;
pub mod store;
pub mod timezone;
