//! Document model.
//!
//! This module defines the catalog decoded from a help file and the
//! records produced when topics are decoded on demand.

mod document;
mod header;
mod text;

pub use document::*;
pub use header::*;
pub use text::*;
