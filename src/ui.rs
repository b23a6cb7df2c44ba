//! Ratatui front-end. The UI never owns record logic: every key either edits
//! a form buffer or calls into `Document`/`RecordStore`, and every frame is
//! drawn from a fresh `ViewState::project` of the store.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
