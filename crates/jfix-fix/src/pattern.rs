use jfix_ast::{ProblemLocation, Project, SyntaxTree};

use crate::code_style::CodeStyleVisitor;
use crate::operation::RewriteOperation;
use crate::options::CodeStyleOptions;
use crate::static_access;
use crate::this_qualifier::ThisQualifierVisitor;

/// Inputs shared by every detector.
#[derive(Clone, Copy)]
pub struct DetectContext<'a> {
    pub project: &'a Project,
    pub tree: &'a SyntaxTree,
    pub problems: &'a [ProblemLocation],
    pub options: CodeStyleOptions,
}

/// The code-style patterns a clean-up can look for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Unqualified field and method accesses.
    UnqualifiedAccess,
    /// Static members reached through an instance or a subtype.
    StaticAccess,
    /// `this.` qualifiers that can be dropped.
    RedundantThisQualifier,
}

impl Pattern {
    /// Detection order of a clean-up.
    pub const ALL: [Pattern; 3] = [
        Pattern::UnqualifiedAccess,
        Pattern::StaticAccess,
        Pattern::RedundantThisQualifier,
    ];

    pub fn is_enabled(self, options: &CodeStyleOptions) -> bool {
        match self {
            Pattern::UnqualifiedAccess => options.any_qualify(),
            Pattern::StaticAccess => options.any_static_access(),
            Pattern::RedundantThisQualifier => options.any_remove(),
        }
    }

    /// Appends the operations this pattern finds to `operations`.
    ///
    /// Static-access conversions take over qualifier additions queued earlier on the same
    /// name, so patterns run in [`Pattern::ALL`] order.
    pub fn detect(self, cx: &DetectContext<'_>, operations: &mut Vec<RewriteOperation>) {
        if !self.is_enabled(&cx.options) {
            return;
        }
        match self {
            Pattern::UnqualifiedAccess => {
                let visitor = CodeStyleVisitor::new(cx.project, cx.tree, cx.options);
                operations.extend(visitor.collect(cx.tree));
            }
            Pattern::StaticAccess => static_access::resolve_static_accesses(
                cx.project,
                cx.tree,
                cx.problems,
                cx.options.change_non_static_access_to_static,
                cx.options.change_indirect_static_access_to_direct,
                operations,
            ),
            Pattern::RedundantThisQualifier => operations.extend(
                ThisQualifierVisitor::new(
                    cx.project,
                    cx.tree,
                    cx.options.remove_field_qualifier,
                    cx.options.remove_method_qualifier,
                )
                .collect(cx.tree),
            ),
        }
    }
}
