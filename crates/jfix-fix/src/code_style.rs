//! Detection of unqualified field and method accesses.

use std::collections::HashSet;

use jfix_ast::visit::{walk, Visitor};
use jfix_ast::{
    Binding, BindingTable, MethodId, NodeId, Project, Role, SyntaxKind, SyntaxTree, TypeId,
    TypeKind, VarId, VariableKind,
};

use crate::imports::ImportRewrite;
use crate::operation::RewriteOperation;
use crate::options::CodeStyleOptions;

/// Collects qualifier additions for every unqualified access the options ask for.
pub struct CodeStyleVisitor<'a> {
    bindings: &'a BindingTable,
    options: CodeStyleOptions,
    /// Only used to spell `Outer.this` qualifiers; its imports are never written.
    imports: ImportRewrite,
    targeted: HashSet<NodeId>,
    operations: Vec<RewriteOperation>,
}

impl<'a> CodeStyleVisitor<'a> {
    pub fn new(project: &'a Project, tree: &SyntaxTree, options: CodeStyleOptions) -> Self {
        Self {
            bindings: project.bindings(),
            options,
            imports: ImportRewrite::new(tree, project.bindings()),
            targeted: HashSet::new(),
            operations: Vec::new(),
        }
    }

    /// Runs the visitor over the whole unit.
    pub fn collect(mut self, tree: &SyntaxTree) -> Vec<RewriteOperation> {
        walk(&mut self, tree, tree.root());
        self.operations
    }

    fn wants_fields(&self) -> bool {
        self.options.qualify_field_access || self.options.qualify_static_field_access
    }

    fn wants_methods(&self) -> bool {
        self.options.qualify_method_access || self.options.qualify_static_method_access
    }

    fn push(&mut self, node: NodeId, operation: RewriteOperation) {
        if self.targeted.insert(node) {
            self.operations.push(operation);
        }
    }

    fn handle_simple_name(&mut self, tree: &SyntaxTree, mut node: NodeId) {
        let Some(parent) = tree.parent(node) else {
            return;
        };
        match tree.kind(parent) {
            SyntaxKind::SuperFieldAccess => return,
            SyntaxKind::FieldAccess => {
                let mut expression = tree.child(parent, Role::Expression);
                while let Some(expr) = expression {
                    if tree.kind(expr) != SyntaxKind::FieldAccess {
                        break;
                    }
                    expression = tree.child(expr, Role::Expression);
                }
                match expression {
                    Some(root) if tree.kind(root) == SyntaxKind::SimpleName => node = root,
                    _ => return,
                }
            }
            SyntaxKind::VariableDeclarationFragment if tree.role(node) == Role::Name => return,
            _ => {}
        }
        if tree.role(node) == Role::SwitchCaseLabel {
            return;
        }
        if let Some(Binding::Variable(var)) = tree.binding(node) {
            self.handle_variable(tree, node, var);
        }
    }

    fn handle_variable(&mut self, tree: &SyntaxTree, node: NodeId, var: VarId) {
        let b = self.bindings;
        let binding = b.variable(var);
        if binding.kind != VariableKind::Field {
            return;
        }
        let Some(declaring) = binding.declaring else {
            return;
        };

        if binding.modifiers.is_static() {
            if !self.options.qualify_static_field_access {
                return;
            }
            if binding.modifiers.is_final() && assigns_in_static_initializer(tree, node) {
                tracing::trace!(
                    target: "jfix.fix",
                    name = %binding.name,
                    "skipping static final assignment"
                );
                return;
            }
            if b.is_anonymous(declaring) {
                return;
            }
            self.push(
                node,
                RewriteOperation::AddStaticQualifier {
                    name: node,
                    declaring,
                    is_method: false,
                },
            );
        } else if self.options.qualify_field_access {
            let qualifier = this_qualifier(b, &mut self.imports, tree, declaring, node);
            let Some(qualifier) = qualifier else {
                return;
            };
            self.push(
                node,
                RewriteOperation::AddThisQualifier {
                    name: node,
                    identifier: binding.name.clone(),
                    qualifier: (!qualifier.is_empty()).then_some(qualifier),
                },
            );
        }
    }

    fn handle_method(&mut self, tree: &SyntaxTree, name: NodeId, method: MethodId) {
        let b = self.bindings;
        let binding = b.method(method);
        let declaring = binding.declaring;
        if binding.modifiers.is_static() {
            if !self.options.qualify_static_method_access || b.is_anonymous(declaring) {
                return;
            }
            self.push(
                name,
                RewriteOperation::AddStaticQualifier {
                    name,
                    declaring,
                    is_method: true,
                },
            );
        } else if self.options.qualify_method_access {
            let qualifier = this_qualifier(b, &mut self.imports, tree, declaring, name);
            let Some(qualifier) = qualifier else {
                return;
            };
            self.push(
                name,
                RewriteOperation::AddThisQualifier {
                    name,
                    identifier: binding.name.clone(),
                    qualifier: (!qualifier.is_empty()).then_some(qualifier),
                },
            );
        }
    }
}

impl Visitor for CodeStyleVisitor<'_> {
    fn visit(&mut self, tree: &SyntaxTree, node: NodeId) -> bool {
        match tree.kind(node) {
            SyntaxKind::TypeDeclaration => {
                let is_interface = tree
                    .binding(node)
                    .and_then(Binding::as_type)
                    .is_some_and(|ty| self.bindings.ty(ty).kind == TypeKind::Interface);
                !is_interface || self.options.any_qualify()
            }
            SyntaxKind::QualifiedName => {
                if self.wants_fields() {
                    let mut leftmost = node;
                    while tree.kind(leftmost) == SyntaxKind::QualifiedName {
                        match tree.child(leftmost, Role::Qualifier) {
                            Some(qualifier) => leftmost = qualifier,
                            None => return false,
                        }
                    }
                    if tree.kind(leftmost) == SyntaxKind::SimpleName {
                        self.handle_simple_name(tree, leftmost);
                    }
                }
                false
            }
            SyntaxKind::SimpleName => {
                if self.wants_fields() {
                    self.handle_simple_name(tree, node);
                }
                false
            }
            SyntaxKind::MethodInvocation => {
                if self.wants_methods() && tree.child(node, Role::Expression).is_none() {
                    if let Some(name) = tree.child(node, Role::Name) {
                        if let Some(Binding::Method(method)) = tree.binding(name) {
                            self.handle_method(tree, name, method);
                        }
                    }
                }
                true
            }
            _ => true,
        }
    }
}

/// `node` is the left-hand side of an assignment inside a `static { }` initializer.
fn assigns_in_static_initializer(tree: &SyntaxTree, node: NodeId) -> bool {
    let is_lhs = tree.role(node) == Role::LeftHandSide
        && tree
            .parent(node)
            .is_some_and(|parent| tree.kind(parent) == SyntaxKind::Assignment);
    if !is_lhs {
        return false;
    }
    tree.ancestors(node)
        .find(|ancestor| tree.kind(*ancestor).is_body_declaration())
        .is_some_and(|decl| {
            tree.kind(decl) == SyntaxKind::Initializer && tree.node(decl).modifiers.is_static()
        })
}

/// Qualifier that makes `this` refer to an instance of `declaring` at `name`.
///
/// Returns `Some("")` when a plain `this` suffices and `None` when no enclosing instance is
/// usable (no enclosing subtype, or only an anonymous one).
pub(crate) fn this_qualifier(
    b: &BindingTable,
    imports: &mut ImportRewrite,
    tree: &SyntaxTree,
    declaring: TypeId,
    name: NodeId,
) -> Option<String> {
    let parent_type = tree.enclosing_type(name)?;
    let find = |target: TypeId, consider_type_arguments: bool| {
        std::iter::successors(Some(parent_type), |ty| b.ty(*ty).enclosing)
            .find(|ty| b.is_subtype(target, *ty, consider_type_arguments))
    };
    let current = find(declaring, true).or_else(|| find(b.erased_type(declaring), false))?;
    if current == parent_type {
        return Some(String::new());
    }
    if b.is_anonymous(current) {
        tracing::trace!(target: "jfix.fix", "no qualifier for an anonymous enclosing instance");
        return None;
    }
    Some(imports.add_import(b, current, 0))
}
