//! Code-style quick fixes and clean-ups for bound Java trees.
//!
//! Today this crate exposes:
//! - `this` / declaring-class qualification of unqualified accesses (`code_style`)
//! - removal of redundant `this.` qualifiers (`this_qualifier`)
//! - static accesses through instances or subtypes rewritten to the declaring type
//!   (`static_access`)
//! - proposals for unresolved methods, constructors, fields and annotation attributes
//!   (`unresolved`)
//!
//! Detection only reads the [`jfix_ast::Project`] and returns [`Fix`]es; edits are produced when
//! a fix is materialized with [`Fix::create_change`].

mod clean_up;
mod code_style;
mod error;
mod fix;
mod imports;
mod messages;
mod operation;
mod options;
mod pattern;
mod preview;
mod rewrite;
mod scope;
mod static_access;
mod this_qualifier;
pub mod unresolved;

pub use clean_up::{create_clean_up, create_clean_up_for_problems};
pub use code_style::CodeStyleVisitor;
pub use error::FixError;
pub use fix::{
    apply_fixes, create_add_field_qualifier_fix, create_indirect_access_to_static_fix,
    create_non_static_access_fixes, Fix,
};
pub use imports::ImportRewrite;
pub use operation::{
    ArgumentChange, ArgumentSlot, ParameterSlot, RemoveTarget, RewriteOperation, SignatureChange,
    StaticAccessKind,
};
pub use options::{CodeStyleOptions, FormatOptions};
pub use pattern::{DetectContext, Pattern};
pub use preview::{generate_preview, FixPreview};
pub use rewrite::{AstRewrite, CompilationUnitChange, CompilationUnitRewrite, EditGroup, Template};
pub use scope::ScopeAnalyzer;
pub use static_access::{resolve_static_accesses, to_static_access_operations};
pub use this_qualifier::ThisQualifierVisitor;
pub use unresolved::get_unresolved_proposals;
