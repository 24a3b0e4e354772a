//! Core shared types for jfix.
//!
//! This crate is intentionally small: file identities, byte ranges, text edits and a handful of
//! line/indentation helpers used when edits are rendered.

mod edit;
pub mod text;

pub use edit::{apply_text_edits, EditError, FileId, TextEdit, TextRange, WorkspaceEdit};
