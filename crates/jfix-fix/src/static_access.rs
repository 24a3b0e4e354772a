//! Conversion of instance-qualified and indirect static accesses, and the resolver that merges
//! those conversions with the qualifier additions of the code-style visitor.

use jfix_ast::{
    Binding, BindingTable, NodeId, ProblemLocation, Project, Role, SyntaxKind, SyntaxTree, TypeId,
    TypeKind,
};

use crate::operation::{RewriteOperation, StaticAccessKind};

/// Conversions for one static-access problem: the declaring-type candidate first, then the
/// instance-type candidate when it differs.
///
/// In conservative mode (clean-ups) nothing is proposed for qualifiers outside a statement, or
/// when the declaring type cannot be named from the unit.
pub fn to_static_access_operations(
    project: &Project,
    tree: &SyntaxTree,
    problem: &ProblemLocation,
    conservative: bool,
) -> Vec<RewriteOperation> {
    let b = project.bindings();
    let Some(mut node) = problem.covering_node(tree) else {
        return Vec::new();
    };
    if tree.kind(node) == SyntaxKind::SimpleName {
        match tree.parent(node) {
            Some(parent) => node = parent,
            None => return Vec::new(),
        }
    }

    let (qualifier, access) = match tree.kind(node) {
        SyntaxKind::QualifiedName => (
            tree.child(node, Role::Qualifier),
            tree.binding(node).or_else(|| name_binding(tree, node)),
        ),
        SyntaxKind::MethodInvocation | SyntaxKind::FieldAccess => {
            (tree.child(node, Role::Expression), name_binding(tree, node))
        }
        _ => (None, None),
    };
    let (Some(qualifier), Some(access)) = (qualifier, access) else {
        tracing::debug!(target: "jfix.fix", kind = ?problem.kind, "no qualifier for static access");
        return Vec::new();
    };
    if conservative && tree.enclosing_statement(qualifier).is_none() {
        return Vec::new();
    }

    let declaring = match access {
        Binding::Method(method) => Some(b.method(method).declaring),
        Binding::Variable(var) => b.variable(var).declaring,
        Binding::Type(_) => None,
    };
    let Some(declaring) = declaring.map(|ty| b.erased_type(ty)) else {
        return Vec::new();
    };

    let indirect = problem.kind.is_indirect_static_access();
    let mut operations = Vec::new();
    if accessible_from_unit(b, tree, declaring) {
        operations.push(RewriteOperation::ToStaticAccess {
            qualifier,
            declaring,
            accessor: b.ty(declaring).name.clone(),
            kind: if indirect {
                StaticAccessKind::Indirect
            } else {
                StaticAccessKind::Declaring
            },
        });
    } else {
        tracing::debug!(
            target: "jfix.fix",
            declaring = %b.qualified_name(declaring),
            "declaring type is not visible from the unit"
        );
        if conservative {
            return Vec::new();
        }
    }

    if !indirect {
        let instance = tree
            .type_binding(qualifier)
            .filter(|ty| !matches!(b.ty(*ty).kind, TypeKind::Null | TypeKind::Primitive))
            .map(|ty| b.erased_type(ty));
        if let Some(instance) = instance.filter(|ty| *ty != declaring) {
            operations.push(RewriteOperation::ToStaticAccess {
                qualifier,
                declaring: instance,
                accessor: b.ty(instance).name.clone(),
                kind: StaticAccessKind::Instance,
            });
        }
    }
    operations
}

fn name_binding(tree: &SyntaxTree, node: NodeId) -> Option<Binding> {
    tree.child(node, Role::Name).and_then(|name| tree.binding(name))
}

/// A package-private declaring type is only nameable from its own package.
fn accessible_from_unit(b: &BindingTable, tree: &SyntaxTree, declaring: TypeId) -> bool {
    if !b.ty(declaring).modifiers.is_package_private() {
        return true;
    }
    b.package_of(declaring) == tree.package()
}

/// Merges static-access conversions for `problems` into `operations`.
///
/// A conversion whose qualifier is already targeted by a `this` qualifier addition replaces
/// that addition. Conversions are appended inner-before-outer, then left-to-right.
pub fn resolve_static_accesses(
    project: &Project,
    tree: &SyntaxTree,
    problems: &[ProblemLocation],
    change_non_static_access: bool,
    change_indirect_access: bool,
    operations: &mut Vec<RewriteOperation>,
) {
    if !change_non_static_access && !change_indirect_access {
        return;
    }

    let mut conversions: Vec<RewriteOperation> = Vec::new();
    for problem in problems {
        let wanted = (change_non_static_access && problem.kind.is_non_static_access())
            || (change_indirect_access && problem.kind.is_indirect_static_access());
        if !wanted {
            continue;
        }
        let Some(conversion) = to_static_access_operations(project, tree, problem, true)
            .into_iter()
            .next()
        else {
            continue;
        };
        let Some(qualifier) = conversion.target() else {
            continue;
        };
        if conversions.iter().any(|op| op.target() == Some(qualifier)) {
            continue;
        }
        if let Some(pos) = operations.iter().position(|op| {
            matches!(op, RewriteOperation::AddThisQualifier { name, .. } if *name == qualifier)
        }) {
            tracing::debug!(
                target: "jfix.fix",
                ?qualifier,
                "static conversion replaces 'this' qualifier"
            );
            operations.remove(pos);
        }
        conversions.push(conversion);
    }

    // Inside-out: a hoisted inner qualifier must run before the qualifier containing it.
    conversions.sort_by_key(|op| {
        let node = op.target().unwrap_or_else(|| tree.root());
        let range = tree.range(node);
        (
            range.end,
            std::cmp::Reverse(range.start),
            std::cmp::Reverse(tree.depth(node)),
        )
    });
    operations.extend(conversions);
}
