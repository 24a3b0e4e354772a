//! Utilities shared by jfix tests.
//!
//! The fix engine consumes fully resolved trees, so tests cannot start from plain Java text.
//! Instead they describe a unit with the small Java DSL in [`java`] and let
//! [`ProjectFixture::write_unit`] render it: the renderer emits formatted source (four-space
//! indentation) and records node ranges, roles and bindings as it goes, so assertions can
//! compare exact before/after text.

mod fixture;
pub mod java;
mod render;

pub use fixture::{find_node, find_nodes, problem_at, ProjectFixture};
