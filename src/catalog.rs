//! The song catalog: read-only `Track` records the player consumes.
//!
//! Tracks come from scanning a local directory or from ad-hoc paths and
//! URLs given on the command line. Nothing here ever mutates a track once
//! it has been handed out.

mod model;
mod scan;

pub use model::Track;
pub use scan::{from_arg, scan};
