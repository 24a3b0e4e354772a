use jfix_core::TextRange;
use serde::{Deserialize, Serialize};

use crate::tree::{NodeId, SyntaxTree};

/// Compiler problems the fix engine knows how to address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProblemKind {
    /// A field is referenced without `this.` (style diagnostic).
    UnqualifiedFieldAccess,
    NonStaticAccessToStaticField,
    NonStaticAccessToStaticMethod,
    NonStaticOrAlienTypeReceiver,
    IndirectAccessToStaticField,
    IndirectAccessToStaticMethod,
    UndefinedMethod,
    UndefinedConstructor,
    UndefinedField,
    UndefinedName,
    UndefinedAnnotationMember,
    /// A method or constructor exists but the arguments do not match.
    ParameterMismatch,
}

impl ProblemKind {
    pub fn is_non_static_access(self) -> bool {
        matches!(
            self,
            ProblemKind::NonStaticAccessToStaticField
                | ProblemKind::NonStaticAccessToStaticMethod
                | ProblemKind::NonStaticOrAlienTypeReceiver
        )
    }

    pub fn is_indirect_static_access(self) -> bool {
        matches!(
            self,
            ProblemKind::IndirectAccessToStaticField | ProblemKind::IndirectAccessToStaticMethod
        )
    }

    pub fn is_static_access(self) -> bool {
        self.is_non_static_access() || self.is_indirect_static_access()
    }

    pub fn is_unresolved_reference(self) -> bool {
        matches!(
            self,
            ProblemKind::UndefinedMethod
                | ProblemKind::UndefinedConstructor
                | ProblemKind::UndefinedField
                | ProblemKind::UndefinedName
                | ProblemKind::UndefinedAnnotationMember
                | ProblemKind::ParameterMismatch
        )
    }
}

/// A diagnosed problem in one compilation unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemLocation {
    pub kind: ProblemKind,
    pub offset: usize,
    pub length: usize,
    /// Compiler-provided arguments (for example the unresolved name).
    #[serde(default)]
    pub arguments: Vec<String>,
}

impl ProblemLocation {
    pub fn new(kind: ProblemKind, offset: usize, length: usize) -> Self {
        Self {
            kind,
            offset,
            length,
            arguments: Vec::new(),
        }
    }

    /// Problem spanning exactly the source of `node`.
    pub fn at_node(kind: ProblemKind, tree: &SyntaxTree, node: NodeId) -> Self {
        let range = tree.range(node);
        Self::new(kind, range.start, range.len())
    }

    pub fn range(&self) -> TextRange {
        TextRange::new(self.offset, self.offset + self.length)
    }

    /// Innermost node covering the whole problem range.
    pub fn covering_node(&self, tree: &SyntaxTree) -> Option<NodeId> {
        tree.covering_node(self.range())
    }
}
