//! Name lookup at a position in a bound tree.
//!
//! The analyzer answers "what would a plain `x` (or `x()`) bind to if written here?". It is
//! used to decide whether a `this.` qualifier can be dropped without silently rebinding the
//! reference.

use jfix_ast::{
    Binding, BindingTable, MethodId, Modifiers, NodeId, Project, Role, SyntaxKind, SyntaxTree,
    TypeId, VarId,
};

pub struct ScopeAnalyzer<'a> {
    bindings: &'a BindingTable,
    tree: &'a SyntaxTree,
}

impl<'a> ScopeAnalyzer<'a> {
    pub fn new(project: &'a Project, tree: &'a SyntaxTree) -> Self {
        Self {
            bindings: project.bindings(),
            tree,
        }
    }

    /// Variable a plain `name` resolves to at `at`: locals declared earlier in enclosing blocks,
    /// parameters of the enclosing method, then visible fields of each enclosing type.
    ///
    /// A local is in scope from its own declarator on, initializer included.
    pub fn resolve_variable(&self, at: NodeId, name: &str) -> Option<VarId> {
        let tree = self.tree;
        let position = tree.range(at).start;
        let site = tree.enclosing_type(at);

        for scope in tree.ancestors(at) {
            match tree.kind(scope) {
                SyntaxKind::Block | SyntaxKind::SwitchStatement => {
                    let local = tree
                        .children_with_role(scope, Role::Statement)
                        .filter(|stmt| {
                            tree.kind(*stmt) == SyntaxKind::VariableDeclarationStatement
                                && tree.range(*stmt).start < position
                        })
                        .flat_map(|stmt| tree.children_with_role(stmt, Role::Fragment))
                        .filter(|fragment| {
                            tree.identifier(*fragment) == Some(name)
                                && tree.range(*fragment).start < position
                        })
                        .filter_map(|fragment| tree.binding(fragment)?.as_variable())
                        .last();
                    if local.is_some() {
                        return local;
                    }
                }
                SyntaxKind::MethodDeclaration => {
                    let param = tree
                        .children_with_role(scope, Role::Parameter)
                        .find(|param| tree.identifier(*param) == Some(name))
                        .and_then(|param| tree.binding(param)?.as_variable());
                    if param.is_some() {
                        return param;
                    }
                }
                SyntaxKind::TypeDeclaration | SyntaxKind::AnonymousClassDeclaration => {
                    let Some(Binding::Type(ty)) = tree.binding(scope) else {
                        continue;
                    };
                    if let Some(field) = self.visible_field(ty, name, site.unwrap_or(ty)) {
                        return Some(field);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn visible_field(&self, ty: TypeId, name: &str, site: TypeId) -> Option<VarId> {
        let b = self.bindings;
        let own = b.erased_type(ty);
        b.hierarchy(ty).into_iter().find_map(|holder| {
            b.declared_fields(holder).find(|field| {
                let var = b.variable(*field);
                var.name == name
                    && (holder == own || self.is_visible(var.modifiers, holder, site))
            })
        })
    }

    /// Methods named `name` a plain call would consider at `at`: those of the innermost
    /// enclosing type that declares or inherits a visible method with that name.
    pub fn resolve_methods(&self, at: NodeId, name: &str) -> Vec<MethodId> {
        let b = self.bindings;
        let tree = self.tree;
        let site = tree.enclosing_type(at);

        for scope in tree.ancestors(at) {
            if !tree.kind(scope).is_type_body() {
                continue;
            }
            let Some(Binding::Type(ty)) = tree.binding(scope) else {
                continue;
            };
            let own = b.erased_type(ty);
            let methods: Vec<MethodId> = b
                .methods_named(ty, name)
                .into_iter()
                .filter(|method| {
                    let binding = b.method(*method);
                    binding.declaring == own
                        || self.is_visible(binding.modifiers, binding.declaring, site.unwrap_or(ty))
                })
                .collect();
            if !methods.is_empty() {
                return methods;
            }
        }
        Vec::new()
    }

    /// `true` when the simple name of `current`, written unqualified at `at`, would bind to
    /// something else. Types never conflict.
    pub fn has_conflict(&self, at: NodeId, current: Binding) -> bool {
        match current {
            Binding::Variable(var) => self.has_variable_conflict(at, var),
            Binding::Method(method) => self.has_method_conflict(at, method),
            Binding::Type(_) => false,
        }
    }

    /// `true` when a plain `name` at `at` would not bind to `current`.
    ///
    /// Two fields sharing an erased declaration are the same field. A name that resolves to
    /// nothing is reported as a conflict.
    pub fn has_variable_conflict(&self, at: NodeId, current: VarId) -> bool {
        let b = self.bindings;
        let name = &b.variable(current).name;
        match self.resolve_variable(at, name) {
            None => true,
            Some(found) if found == current => false,
            Some(found) => {
                let same_field = b.variable(found).is_field()
                    && b.variable(current).is_field()
                    && b.erased_variable(found) == b.erased_variable(current);
                !same_field
            }
        }
    }

    /// `true` when a plain call `name(..)` at `at` would not bind to `current`.
    pub fn has_method_conflict(&self, at: NodeId, current: MethodId) -> bool {
        let b = self.bindings;
        let current = b.erased_method(current);
        let name = &b.method(current).name;
        let candidates = self.resolve_methods(at, name);
        match candidates
            .into_iter()
            .find(|candidate| b.same_parameters(*candidate, current))
        {
            Some(candidate) => b.erased_method(candidate) != current,
            None => true,
        }
    }

    /// Java access check for a member with `modifiers` declared in `declaring`, referenced from
    /// code inside `site`.
    pub fn is_visible(&self, modifiers: Modifiers, declaring: TypeId, site: TypeId) -> bool {
        is_accessible(self.bindings, modifiers, declaring, site)
    }
}

/// Protected members are treated as accessible; the engine only asks from inside the
/// hierarchy or the package.
pub(crate) fn is_accessible(
    b: &BindingTable,
    modifiers: Modifiers,
    declaring: TypeId,
    site: TypeId,
) -> bool {
    if modifiers.is_public() || modifiers.is_protected() {
        return true;
    }
    if modifiers.is_private() {
        return b.top_level(declaring) == b.top_level(site);
    }
    b.package_of(declaring) == b.package_of(site)
}
