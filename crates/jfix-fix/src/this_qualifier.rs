//! Detection of redundant `this.` / `Outer.this.` qualifiers.

use jfix_ast::visit::{walk, Visitor};
use jfix_ast::{Binding, BindingTable, NodeId, Project, Role, SyntaxKind, SyntaxTree};

use crate::operation::{RemoveTarget, RewriteOperation};
use crate::scope::ScopeAnalyzer;

pub struct ThisQualifierVisitor<'a> {
    bindings: &'a BindingTable,
    scope: ScopeAnalyzer<'a>,
    remove_field_qualifier: bool,
    remove_method_qualifier: bool,
    operations: Vec<RewriteOperation>,
}

impl<'a> ThisQualifierVisitor<'a> {
    pub fn new(
        project: &'a Project,
        tree: &'a SyntaxTree,
        remove_field_qualifier: bool,
        remove_method_qualifier: bool,
    ) -> Self {
        Self {
            bindings: project.bindings(),
            scope: ScopeAnalyzer::new(project, tree),
            remove_field_qualifier,
            remove_method_qualifier,
            operations: Vec::new(),
        }
    }

    pub fn collect(mut self, tree: &SyntaxTree) -> Vec<RewriteOperation> {
        walk(&mut self, tree, tree.root());
        self.operations
    }

    fn field_access(&mut self, tree: &SyntaxTree, node: NodeId) {
        let b = self.bindings;
        let Some(this) = this_receiver(tree, node) else {
            return;
        };
        let binding = tree.child(node, Role::Name).and_then(|n| tree.binding(n));
        let Some(Binding::Variable(var)) = binding else {
            return;
        };
        if self.scope.has_variable_conflict(this, var) {
            tracing::trace!(
                target: "jfix.fix",
                name = %b.variable(var).name,
                "keeping qualifier, name would rebind"
            );
            return;
        }
        if let Some(qualifier) = tree.child(this, Role::Qualifier) {
            let Some(Binding::Type(outer)) = tree.binding(qualifier) else {
                return;
            };
            let Some(declaring) = b.variable(var).declaring else {
                return;
            };
            if outer != declaring {
                return;
            }
            match tree.enclosing_type(node) {
                Some(enclosing) if !b.is_subtype(declaring, enclosing, true) => {}
                _ => return,
            }
        }
        self.operations
            .push(RewriteOperation::RemoveThisQualifier(RemoveTarget::Field(node)));
    }

    fn method_invocation(&mut self, tree: &SyntaxTree, node: NodeId) {
        let b = self.bindings;
        let Some(this) = this_receiver(tree, node) else {
            return;
        };
        let binding = tree.child(node, Role::Name).and_then(|n| tree.binding(n));
        let Some(Binding::Method(method)) = binding else {
            return;
        };
        if self.scope.has_method_conflict(this, method) {
            tracing::trace!(
                target: "jfix.fix",
                name = %b.method(method).name,
                "keeping qualifier, call would rebind"
            );
            return;
        }
        if let Some(qualifier) = tree.child(this, Role::Qualifier) {
            let declaring = b.method(method).declaring;
            let caller = tree
                .ancestors(node)
                .find(|n| tree.kind(*n) == SyntaxKind::TypeDeclaration)
                .and_then(|n| tree.binding(n))
                .and_then(Binding::as_type);
            let callee = tree.binding(qualifier).and_then(Binding::as_type);
            if let (Some(caller), Some(callee)) = (caller, callee) {
                if b.is_assignable(callee, declaring) && b.is_assignable(caller, declaring) {
                    return;
                }
            }
        }
        self.operations
            .push(RewriteOperation::RemoveThisQualifier(RemoveTarget::Method(node)));
    }
}

/// The `this` / `Outer.this` receiver of a field access or invocation.
fn this_receiver(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    tree.child(node, Role::Expression)
        .filter(|receiver| tree.kind(*receiver) == SyntaxKind::ThisExpression)
}

impl Visitor for ThisQualifierVisitor<'_> {
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> bool {
        match tree.kind(node) {
            SyntaxKind::FieldAccess if self.remove_field_qualifier => self.field_access(tree, node),
            SyntaxKind::MethodInvocation if self.remove_method_qualifier => {
                self.method_invocation(tree, node)
            }
            _ => {}
        }
        true
    }
}
