use jfix_ast::{Binding, MethodId, NodeId, Role, SyntaxKind, SyntaxTree, TypeId};
use smol_str::SmolStr;

use crate::messages;
use crate::rewrite::{CompilationUnitRewrite, Template};
use crate::unresolved::MemberStub;
use crate::FixError;

/// Target of a redundant-qualifier removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemoveTarget {
    /// `this.x` / `Outer.this.x` field access.
    Field(NodeId),
    /// `this.m()` / `Outer.this.m()` invocation.
    Method(NodeId),
}

/// Which type a static-access conversion qualifies with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StaticAccessKind {
    /// The member's declaring type.
    Declaring,
    /// The static type of the instance expression.
    Instance,
    /// The declaring type, replacing an indirect (subtype) access.
    Indirect,
}

/// One argument of a rewritten argument list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgumentSlot {
    /// Keep the existing argument at this index.
    Existing(usize),
    New(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArgumentChange {
    pub arguments: Vec<ArgumentSlot>,
    pub label: String,
}

/// One parameter of a rewritten parameter list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParameterSlot {
    Existing(usize),
    /// Keep the parameter name, change its type.
    Retyped(usize, TypeId),
    New { ty: TypeId, name: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureChange {
    pub params: Vec<ParameterSlot>,
    pub label: String,
}

/// An atomic source transformation anchored at a node of one unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RewriteOperation {
    /// `name` → `this.name` or `Q.this.name`.
    AddThisQualifier {
        name: NodeId,
        identifier: SmolStr,
        qualifier: Option<String>,
    },
    /// `name` → `Declaring.name`.
    AddStaticQualifier {
        name: NodeId,
        declaring: TypeId,
        is_method: bool,
    },
    RemoveThisQualifier(RemoveTarget),
    /// `expr.member` → `Type.member`, hoisting side-effecting qualifiers first.
    ToStaticAccess {
        qualifier: NodeId,
        declaring: TypeId,
        accessor: SmolStr,
        kind: StaticAccessKind,
    },
    CreateMember(MemberStub),
    ChangeArguments {
        invocation: NodeId,
        change: ArgumentChange,
    },
    ChangeSignature {
        method: MethodId,
        change: SignatureChange,
    },
}

impl RewriteOperation {
    /// Short label shown for the operation's edit group.
    pub fn description(&self) -> String {
        match self {
            RewriteOperation::AddThisQualifier {
                identifier,
                qualifier,
                ..
            } => messages::qualify_with_this(identifier, qualifier.as_deref()),
            RewriteOperation::AddStaticQualifier { is_method, .. } => {
                if *is_method {
                    messages::QUALIFY_METHOD_WITH_DECLARING_CLASS.to_string()
                } else {
                    messages::QUALIFY_FIELD_WITH_DECLARING_CLASS.to_string()
                }
            }
            RewriteOperation::RemoveThisQualifier(_) => messages::REMOVE_THIS_QUALIFIER.to_string(),
            RewriteOperation::ToStaticAccess { .. } => {
                messages::CHANGE_ACCESS_USING_DECLARING.to_string()
            }
            RewriteOperation::CreateMember(stub) => stub.label.clone(),
            RewriteOperation::ChangeArguments { change, .. } => change.label.clone(),
            RewriteOperation::ChangeSignature { change, .. } => change.label.clone(),
        }
    }

    /// Node the operation rewrites, if it is anchored at one.
    pub fn target(&self) -> Option<NodeId> {
        match self {
            RewriteOperation::AddThisQualifier { name, .. }
            | RewriteOperation::AddStaticQualifier { name, .. } => Some(*name),
            RewriteOperation::RemoveThisQualifier(RemoveTarget::Field(node))
            | RewriteOperation::RemoveThisQualifier(RemoveTarget::Method(node)) => Some(*node),
            RewriteOperation::ToStaticAccess { qualifier, .. } => Some(*qualifier),
            RewriteOperation::ChangeArguments { invocation, .. } => Some(*invocation),
            RewriteOperation::CreateMember(_) | RewriteOperation::ChangeSignature { .. } => None,
        }
    }

    pub fn rewrite(&self, cu: &mut CompilationUnitRewrite<'_>) -> Result<(), FixError> {
        cu.begin_group(self.description());
        let tree = cu.tree();
        match self {
            RewriteOperation::AddThisQualifier {
                name, qualifier, ..
            } => {
                let prefix = match qualifier {
                    Some(qualifier) => format!("{qualifier}.this."),
                    None => "this.".to_string(),
                };
                cu.replace(
                    *name,
                    Template::concat([Template::text(prefix), Template::node(*name)]),
                )
            }
            RewriteOperation::AddStaticQualifier {
                name, declaring, ..
            } => {
                let qualifier = cu.add_import(*declaring);
                cu.replace(
                    *name,
                    Template::concat([
                        Template::text(format!("{qualifier}.")),
                        Template::node(*name),
                    ]),
                )
            }
            RewriteOperation::RemoveThisQualifier(RemoveTarget::Field(access)) => {
                let name = required_child(tree, *access, Role::Name)?;
                cu.replace(*access, Template::node(name))
            }
            RewriteOperation::RemoveThisQualifier(RemoveTarget::Method(invocation)) => {
                let receiver = required_child(tree, *invocation, Role::Expression)?;
                cu.remove(receiver)
            }
            RewriteOperation::ToStaticAccess {
                qualifier,
                declaring,
                ..
            } => {
                if matches!(
                    tree.kind(*qualifier),
                    SyntaxKind::MethodInvocation | SyntaxKind::ClassInstanceCreation
                ) {
                    if let Some(stmt) = tree.enclosing_statement(*qualifier) {
                        cu.extract_before(
                            stmt,
                            Template::concat([Template::node(*qualifier), Template::text(";")]),
                        )?;
                    }
                }
                let name = cu.add_import(*declaring);
                cu.replace(*qualifier, Template::text(name))
            }
            RewriteOperation::CreateMember(stub) => stub.apply(cu),
            RewriteOperation::ChangeArguments { invocation, change } => {
                let args: Vec<NodeId> =
                    tree.children_with_role(*invocation, Role::Argument).collect();
                let mut items = Vec::with_capacity(change.arguments.len());
                for slot in &change.arguments {
                    items.push(match slot {
                        ArgumentSlot::Existing(idx) => {
                            Template::node(list_item(tree, *invocation, &args, *idx)?)
                        }
                        ArgumentSlot::New(text) => Template::text(text.clone()),
                    });
                }
                let rebuilt = rebuild_list(tree, *invocation, Role::Argument, items)?;
                cu.replace(*invocation, rebuilt)
            }
            RewriteOperation::ChangeSignature { method, change } => {
                let bindings = cu.bindings();
                let decl = tree
                    .find_declaration(Binding::Method(bindings.erased_method(*method)))
                    .ok_or_else(|| {
                        FixError::NoMethodDeclaration(bindings.method(*method).name.to_string())
                    })?;
                let params: Vec<NodeId> = tree.children_with_role(decl, Role::Parameter).collect();
                let mut items = Vec::with_capacity(change.params.len());
                for slot in &change.params {
                    items.push(match slot {
                        ParameterSlot::Existing(idx) => {
                            Template::node(list_item(tree, decl, &params, *idx)?)
                        }
                        ParameterSlot::Retyped(idx, ty) => {
                            let param = list_item(tree, decl, &params, *idx)?;
                            let name = required_child(tree, param, Role::Name)?;
                            let ty = cu.add_import(*ty);
                            Template::concat([
                                Template::text(format!("{ty} ")),
                                Template::node(name),
                            ])
                        }
                        ParameterSlot::New { ty, name } => {
                            let ty = cu.add_import(*ty);
                            Template::text(format!("{ty} {name}"))
                        }
                    });
                }
                let rebuilt = rebuild_list(tree, decl, Role::Parameter, items)?;
                cu.replace(decl, rebuilt)
            }
        }
    }
}

fn stale(tree: &SyntaxTree, node: NodeId) -> FixError {
    FixError::StaleNode {
        file: tree.file().clone(),
        node,
    }
}

fn required_child(tree: &SyntaxTree, node: NodeId, role: Role) -> Result<NodeId, FixError> {
    if !tree.contains(node) {
        return Err(stale(tree, node));
    }
    tree.child(node, role).ok_or_else(|| stale(tree, node))
}

fn list_item(
    tree: &SyntaxTree,
    owner: NodeId,
    items: &[NodeId],
    idx: usize,
) -> Result<NodeId, FixError> {
    items.get(idx).copied().ok_or_else(|| stale(tree, owner))
}

/// Template for `owner` with the parenthesized list of `role` children replaced by `items`.
///
/// Everything outside the parentheses is kept, including rewrites inside it.
fn rebuild_list(
    tree: &SyntaxTree,
    owner: NodeId,
    role: Role,
    items: Vec<Template>,
) -> Result<Template, FixError> {
    if !tree.contains(owner) {
        return Err(stale(tree, owner));
    }
    let source = tree.text();
    let range = tree.range(owner);
    let children = tree.children(owner);
    let current: Vec<NodeId> = tree.children_with_role(owner, role).collect();

    let header_end = children
        .iter()
        .filter(|child| matches!(tree.role(**child), Role::Name | Role::Type))
        .map(|child| tree.range(*child).end)
        .next_back()
        .unwrap_or(range.start);
    let open = match current.first() {
        Some(first) => source[..tree.range(*first).start].rfind('('),
        None => source[header_end..range.end].find('(').map(|idx| header_end + idx),
    }
    .ok_or_else(|| stale(tree, owner))?;
    let after_items = current.last().map_or(open + 1, |last| tree.range(*last).end);
    let close = source[after_items..range.end]
        .find(')')
        .map(|idx| after_items + idx)
        .ok_or_else(|| stale(tree, owner))?;

    let mut parts = Vec::new();
    let mut cursor = range.start;
    for child in children.iter().filter(|child| tree.range(**child).end <= open) {
        let child_range = tree.range(*child);
        parts.push(Template::text(&source[cursor..child_range.start]));
        parts.push(Template::node(*child));
        cursor = child_range.end;
    }
    parts.push(Template::text(&source[cursor..=open]));
    for (idx, item) in items.into_iter().enumerate() {
        if idx > 0 {
            parts.push(Template::text(", "));
        }
        parts.push(item);
    }
    cursor = close;
    for child in children.iter().filter(|child| tree.range(**child).start > close) {
        let child_range = tree.range(*child);
        parts.push(Template::text(&source[cursor..child_range.start]));
        parts.push(Template::node(*child));
        cursor = child_range.end;
    }
    parts.push(Template::text(&source[cursor..range.end]));
    Ok(Template::concat(parts))
}
