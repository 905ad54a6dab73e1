//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the catalog, the selection
//! cursor and the play order that next/previous follow.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
