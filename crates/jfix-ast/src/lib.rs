//! Bound Java syntax trees.
//!
//! This crate is the engine's view of the resolution oracle: an immutable, fully resolved tree
//! per compilation unit ([`SyntaxTree`]), a shared [`BindingTable`] with identity-based
//! bindings and an explicit erasure projection, and the compiler problems reported against a
//! unit ([`ProblemLocation`]). Trees are produced through [`TreeBuilder`]; nothing in the fix
//! engine mutates them.

mod bindings;
mod problem;
mod project;
mod syntax;
mod tree;
pub mod visit;

pub use bindings::{
    Binding, BindingTable, MethodBinding, MethodId, TypeBinding, TypeId, TypeKind,
    VarId, VariableBinding, VariableKind, WellKnownTypes,
};
pub use problem::{ProblemKind, ProblemLocation};
pub use project::Project;
pub use syntax::{Modifiers, Role, SyntaxKind};
pub use tree::{ImportInfo, Node, NodeId, SyntaxTree, TreeBuilder, TreeError};

pub use jfix_core::{FileId, TextRange};
