//! Access evaluation and classification of the roster

pub mod access;
pub mod summary;

pub use access::{AccessMatrix, has_access};
pub use summary::{AccessCategory, AccessSummary};
