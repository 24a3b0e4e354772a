//! Proposals for references the compiler could not resolve: create the missing member, adjust
//! the call's arguments, or adjust the declaration it almost matches.

mod naming;
mod signature;
mod stub;

use jfix_ast::{
    Binding, BindingTable, FileId, MethodId, Modifiers, NodeId, ProblemKind, ProblemLocation,
    Project, Role, SyntaxKind, SyntaxTree, TypeId, TypeKind,
};
use smol_str::SmolStr;

use crate::fix::Fix;
use crate::messages;
use crate::operation::RewriteOperation;

pub use stub::{default_value, MemberStub, StubKind};

use signature::{Argument, Shape};

/// Every proposal for `problem`, in preference order: create the member, change the call's
/// arguments, change an existing declaration, create an overload.
pub fn get_unresolved_proposals(
    project: &Project,
    file: &FileId,
    problem: &ProblemLocation,
) -> Vec<Fix> {
    if !problem.kind.is_unresolved_reference() {
        return Vec::new();
    }
    let Some(tree) = project.unit(file) else {
        return Vec::new();
    };
    let Some(covering) = problem.covering_node(tree) else {
        return Vec::new();
    };
    let cx = Site {
        project,
        b: project.bindings(),
        tree,
        file,
    };
    let proposals = match problem.kind {
        ProblemKind::UndefinedMethod
        | ProblemKind::UndefinedConstructor
        | ProblemKind::ParameterMismatch => cx.invocation_proposals(covering, problem.kind),
        ProblemKind::UndefinedField | ProblemKind::UndefinedName => cx.field_proposals(covering),
        ProblemKind::UndefinedAnnotationMember => cx.attribute_proposals(covering),
        _ => Vec::new(),
    };
    tracing::debug!(
        target: "jfix.fix",
        kind = ?problem.kind,
        proposals = proposals.len(),
        "unresolved reference proposals"
    );
    proposals
}

struct Site<'a> {
    project: &'a Project,
    b: &'a BindingTable,
    tree: &'a SyntaxTree,
    file: &'a FileId,
}

/// An invocation or instance creation and the type that should declare its target.
struct Call {
    node: NodeId,
    name: SmolStr,
    target: TypeId,
    is_constructor: bool,
    is_static: bool,
    args: Vec<Argument>,
}

impl Site<'_> {
    /// Unit declaring `ty` in source, if any.
    fn source_file(&self, ty: TypeId) -> Option<FileId> {
        let (tree, _) = self.project.type_declaration(self.b.erased_type(ty))?;
        Some(tree.file().clone())
    }

    /// Type written for a value of static type `ty`: `Object` for `null`, the supertype for an
    /// anonymous class.
    fn stub_type(&self, ty: TypeId) -> TypeId {
        let b = self.b;
        let wk = b.well_known();
        if ty == wk.null || ty == wk.void {
            return wk.object;
        }
        let binding = b.ty(ty);
        if binding.kind == TypeKind::Anonymous {
            return match (binding.superclass, binding.interfaces.first()) {
                (Some(sup), _) if sup != wk.object => sup,
                (_, Some(iface)) => *iface,
                _ => wk.object,
            };
        }
        ty
    }

    fn invocation(&self, covering: NodeId) -> Option<NodeId> {
        let tree = self.tree;
        std::iter::once(covering)
            .chain(tree.ancestors(covering))
            .take_while(|node| !tree.kind(*node).is_statement())
            .find(|node| {
                matches!(
                    tree.kind(*node),
                    SyntaxKind::MethodInvocation | SyntaxKind::ClassInstanceCreation
                )
            })
    }

    fn call(&self, node: NodeId) -> Option<Call> {
        let tree = self.tree;
        let b = self.b;
        let wk = b.well_known();
        let args = tree
            .children_with_role(node, Role::Argument)
            .map(|arg| {
                let ty = tree.type_binding(arg).unwrap_or(wk.object);
                Argument {
                    node: arg,
                    ty,
                    stub_ty: self.stub_type(ty),
                }
            })
            .collect();

        if tree.kind(node) == SyntaxKind::ClassInstanceCreation {
            let created = tree
                .child(node, Role::Type)
                .and_then(|ty| tree.binding(ty))
                .and_then(Binding::as_type)?;
            let target = b.erased_type(created);
            return Some(Call {
                node,
                name: b.ty(target).name.clone(),
                target,
                is_constructor: true,
                is_static: false,
                args,
            });
        }

        let name = tree.child(node, Role::Name)?;
        let (target, is_static) = match tree.child(node, Role::Expression) {
            None => (tree.enclosing_type(node)?, in_static_context(tree, node)),
            Some(receiver) => match tree.binding(receiver) {
                Some(Binding::Type(ty)) if tree.kind(receiver).is_name() => (ty, true),
                _ => {
                    let ty = tree.type_binding(receiver)?;
                    if !b.is_reference(ty) || ty == wk.null {
                        return None;
                    }
                    (ty, false)
                }
            },
        };
        Some(Call {
            node,
            name: tree.identifier(name)?.into(),
            target: b.erased_type(target),
            is_constructor: false,
            is_static,
            args,
        })
    }

    fn invocation_proposals(&self, covering: NodeId, kind: ProblemKind) -> Vec<Fix> {
        let b = self.b;
        let Some(call) = self.invocation(covering).and_then(|node| self.call(node)) else {
            tracing::debug!(target: "jfix.fix", "no invocation at problem");
            return Vec::new();
        };

        let mut candidates: Vec<MethodId> = Vec::new();
        let found = if call.is_constructor {
            b.constructors(call.target).collect::<Vec<_>>()
        } else {
            b.methods_named(call.target, &call.name)
        };
        for method in found {
            if !candidates.iter().any(|c| b.same_parameters(*c, method)) {
                candidates.push(method);
            }
        }

        let arg_types: Vec<TypeId> = call.args.iter().map(|arg| arg.ty).collect();
        let applicable = candidates
            .iter()
            .any(|method| Shape::of(b, *method).accepts(b, &arg_types));
        if applicable {
            tracing::debug!(
                target: "jfix.fix",
                name = %call.name,
                "call already matches a declaration"
            );
            return Vec::new();
        }

        let mut proposals = Vec::new();
        if kind != ProblemKind::ParameterMismatch {
            proposals.extend(self.create_invoked(&call));
        }
        for method in &candidates {
            for change in signature::argument_changes(self.tree, b, *method, &call.args) {
                proposals.extend(Fix::new(
                    change.label.clone(),
                    self.file.clone(),
                    vec![RewriteOperation::ChangeArguments {
                        invocation: call.node,
                        change,
                    }],
                ));
            }
        }
        for method in &candidates {
            let Some(file) = self.source_file(b.method(*method).declaring) else {
                continue;
            };
            for change in signature::signature_changes(self.tree, b, *method, &call.args) {
                proposals.extend(Fix::new(
                    change.label.clone(),
                    file.clone(),
                    vec![RewriteOperation::ChangeSignature {
                        method: *method,
                        change,
                    }],
                ));
            }
        }
        if kind == ProblemKind::ParameterMismatch {
            proposals.extend(self.create_invoked(&call));
        }
        proposals
    }

    /// `Create method` / `Create constructor` for `call`.
    fn create_invoked(&self, call: &Call) -> Option<Fix> {
        let b = self.b;
        let tree = self.tree;
        let file = self.source_file(call.target)?;
        let site = tree.enclosing_type(call.node)?;
        let target = b.ty(call.target);
        if matches!(target.kind, TypeKind::Annotation | TypeKind::Enum) && call.is_constructor {
            return None;
        }

        let arg_nodes: Vec<(NodeId, TypeId)> =
            call.args.iter().map(|arg| (arg.node, arg.stub_ty)).collect();
        let names = naming::parameter_names(tree, b, &arg_nodes, &[]);
        let params: Vec<(TypeId, String)> = call
            .args
            .iter()
            .zip(names)
            .map(|(arg, name)| (arg.stub_ty, name))
            .collect();
        let shape = Shape {
            params: params.iter().map(|(ty, _)| *ty).collect(),
            varargs: false,
        };

        let is_interface = target.is_interface();
        let mut modifiers = visibility(b, call.target, site, call.is_constructor);
        if call.is_static {
            modifiers |= Modifiers::STATIC;
        }
        let (ty, label) = if call.is_constructor {
            (None, messages::create_constructor(&signature::signature(b, &call.name, &shape)))
        } else {
            let ret = expected_type(tree, b, call.node);
            (
                Some(self.stub_type_or_void(ret)),
                messages::create_method(
                    &signature::signature(b, &call.name, &shape),
                    &b.nested_name(call.target),
                ),
            )
        };
        let stub = MemberStub {
            kind: if call.is_constructor {
                StubKind::Constructor
            } else {
                StubKind::Method
            },
            target: call.target,
            name: call.name.clone(),
            modifiers,
            ty,
            params,
            is_abstract: is_interface && !call.is_static,
            label: label.clone(),
        };
        Fix::new(label, file, vec![RewriteOperation::CreateMember(stub)])
    }

    fn stub_type_or_void(&self, ty: TypeId) -> TypeId {
        if ty == self.b.well_known().void {
            ty
        } else {
            self.stub_type(ty)
        }
    }

    fn field_proposals(&self, covering: NodeId) -> Vec<Fix> {
        let tree = self.tree;
        let b = self.b;
        let name = match tree.kind(covering) {
            SyntaxKind::SimpleName => Some(covering),
            SyntaxKind::QualifiedName | SyntaxKind::FieldAccess => tree.child(covering, Role::Name),
            _ => None,
        };
        let Some(name) = name.filter(|name| tree.binding(*name).is_none()) else {
            return Vec::new();
        };
        let Some(identifier) = tree.identifier(name) else {
            return Vec::new();
        };

        let parent = tree.parent(name);
        let qualified = parent.filter(|parent| {
            tree.role(name) == Role::Name
                && matches!(
                    tree.kind(*parent),
                    SyntaxKind::QualifiedName | SyntaxKind::FieldAccess
                )
        });
        let (target, is_static, expression) = match qualified {
            Some(access) => {
                let Some(receiver) = tree
                    .child(access, Role::Qualifier)
                    .or_else(|| tree.child(access, Role::Expression))
                else {
                    return Vec::new();
                };
                match tree.binding(receiver) {
                    Some(Binding::Type(ty)) if tree.kind(receiver).is_name() => (ty, true, access),
                    _ => match tree.type_binding(receiver) {
                        Some(ty) if b.is_reference(ty) && ty != b.well_known().null => {
                            (ty, false, access)
                        }
                        _ => return Vec::new(),
                    },
                }
            }
            None => match tree.enclosing_type(name) {
                Some(ty) => (ty, in_static_context(tree, name), name),
                None => return Vec::new(),
            },
        };
        let target = b.erased_type(target);
        if b.ty(target).is_interface() {
            return Vec::new();
        }
        let (Some(file), Some(site)) = (self.source_file(target), tree.enclosing_type(name)) else {
            return Vec::new();
        };

        let mut modifiers = visibility(b, target, site, false);
        if is_static {
            modifiers |= Modifiers::STATIC;
        }
        let ty = self.stub_type(expected_type(tree, b, expression));
        let label = messages::create_field(identifier, &b.nested_name(target));
        let stub = MemberStub {
            kind: StubKind::Field,
            target,
            name: identifier.into(),
            modifiers,
            ty: Some(ty),
            params: Vec::new(),
            is_abstract: false,
            label: label.clone(),
        };
        Fix::new(label, file, vec![RewriteOperation::CreateMember(stub)])
            .into_iter()
            .collect()
    }

    fn attribute_proposals(&self, covering: NodeId) -> Vec<Fix> {
        let tree = self.tree;
        let b = self.b;
        let pair = std::iter::once(covering)
            .chain(tree.ancestors(covering))
            .find(|node| tree.kind(*node) == SyntaxKind::MemberValuePair);
        let Some(pair) = pair else {
            return Vec::new();
        };
        let annotation = tree
            .parent(pair)
            .filter(|parent| tree.kind(*parent) == SyntaxKind::Annotation)
            .and_then(|parent| tree.binding(parent))
            .and_then(Binding::as_type);
        let (Some(annotation), Some(name)) = (annotation, tree.child(pair, Role::Name)) else {
            return Vec::new();
        };
        let Some(identifier) = tree.identifier(name) else {
            return Vec::new();
        };
        let Some(file) = self.source_file(annotation) else {
            return Vec::new();
        };
        let value_ty = tree
            .child(pair, Role::Expression)
            .and_then(|value| tree.type_binding(value))
            .map(|ty| self.stub_type(ty))
            .unwrap_or(b.well_known().string);

        let label = messages::create_attribute(identifier, &b.nested_name(annotation));
        let stub = MemberStub {
            kind: StubKind::AnnotationAttribute,
            target: b.erased_type(annotation),
            name: identifier.into(),
            modifiers: Modifiers::NONE,
            ty: Some(value_ty),
            params: Vec::new(),
            is_abstract: true,
            label: label.clone(),
        };
        Fix::new(label, file, vec![RewriteOperation::CreateMember(stub)])
            .into_iter()
            .collect()
    }
}

/// Innermost member declaring `node` is `static`.
fn in_static_context(tree: &SyntaxTree, node: NodeId) -> bool {
    for ancestor in tree.ancestors(node) {
        let kind = tree.kind(ancestor);
        if kind.is_type_body() {
            return false;
        }
        if matches!(
            kind,
            SyntaxKind::MethodDeclaration | SyntaxKind::FieldDeclaration | SyntaxKind::Initializer
        ) {
            return tree.node(ancestor).modifiers.is_static();
        }
    }
    false
}

/// Weakest visibility that lets `site` see a new member of `target`.
fn visibility(b: &BindingTable, target: TypeId, site: TypeId, is_constructor: bool) -> Modifiers {
    if b.ty(target).is_interface() {
        Modifiers::NONE
    } else if b.top_level(target) == b.top_level(site) {
        Modifiers::PRIVATE
    } else if b.package_of(target) == b.package_of(site) {
        Modifiers::NONE
    } else if !is_constructor && b.is_subtype(target, site, false) {
        Modifiers::PROTECTED
    } else {
        Modifiers::PUBLIC
    }
}

/// Type the context of `node` expects. `void` for expression statements, `Object` when the
/// context says nothing.
fn expected_type(tree: &SyntaxTree, b: &BindingTable, node: NodeId) -> TypeId {
    let wk = b.well_known();
    let mut node = node;
    while let Some(parent) = tree.parent(node) {
        if tree.kind(parent) != SyntaxKind::ParenthesizedExpression {
            break;
        }
        node = parent;
    }
    let Some(parent) = tree.parent(node) else {
        return wk.object;
    };
    let sibling = |role: Role| tree.child(parent, role).and_then(|n| tree.type_binding(n));

    let expected = match (tree.kind(parent), tree.role(node)) {
        (SyntaxKind::Assignment, Role::RightHandSide) => sibling(Role::LeftHandSide),
        (SyntaxKind::Assignment, Role::LeftHandSide) => sibling(Role::RightHandSide),
        (SyntaxKind::VariableDeclarationFragment, Role::Initializer) => tree
            .binding(parent)
            .and_then(Binding::as_variable)
            .and_then(|var| b.variable(var).ty),
        (SyntaxKind::IfStatement | SyntaxKind::WhileStatement, Role::Condition) => Some(wk.boolean),
        (SyntaxKind::PrefixExpression, _) if tree.identifier(parent) == Some("!") => {
            Some(wk.boolean)
        }
        (SyntaxKind::InfixExpression, Role::Operand) => match tree.identifier(parent) {
            Some("&&" | "||") => Some(wk.boolean),
            _ => tree
                .children_with_role(parent, Role::Operand)
                .find(|operand| *operand != node)
                .and_then(|operand| tree.type_binding(operand)),
        },
        (SyntaxKind::ExpressionStatement, _) => Some(wk.void),
        (SyntaxKind::MethodInvocation | SyntaxKind::ClassInstanceCreation, Role::Argument) => {
            let idx = tree
                .children_with_role(parent, Role::Argument)
                .position(|arg| arg == node);
            tree.binding(parent)
                .and_then(Binding::as_method)
                .zip(idx)
                .and_then(|(method, idx)| {
                    let params = &b.method(method).params;
                    params.get(idx).or(params.last()).copied()
                })
        }
        (SyntaxKind::ReturnStatement, _) => tree
            .enclosing(node, SyntaxKind::MethodDeclaration)
            .and_then(|decl| tree.binding(decl))
            .and_then(Binding::as_method)
            .and_then(|method| b.method(method).return_type),
        (SyntaxKind::CastExpression, Role::Expression) => tree.type_binding(parent),
        (SyntaxKind::SwitchStatement, Role::Expression) => Some(wk.int),
        _ => None,
    };
    expected.filter(|ty| *ty != wk.null).unwrap_or(wk.object)
}
