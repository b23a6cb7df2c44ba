//! Core library surface for the jornada record manager.
//!
//! The store and view modules hold all record logic; `ui` and `cli` are thin
//! front-ends that call into them, so the same operations serve the terminal
//! UI, the headless subcommands and the tests.
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod ui;
pub mod view;

pub use error::{SchemaError, StoreError};

/// The domain types other layers manipulate.
pub use models::{Field, Record, RecordEdit, SearchField, SortOrder};

pub use store::{Document, Matches, OpenOutcome, RecordStore, SaveOutcome};
pub use view::{Page, ViewState};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
