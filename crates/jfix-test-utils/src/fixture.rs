use std::collections::HashMap;

use jfix_ast::{
    BindingTable, FileId, MethodBinding, MethodId, Modifiers, NodeId, ProblemKind,
    ProblemLocation, Project, SyntaxKind, SyntaxTree, TypeBinding, TypeId, TypeKind, VarId,
    VariableBinding, VariableKind, WellKnownTypes,
};

use crate::java::Unit;
use crate::render::Renderer;

/// Builder for a resolved [`Project`].
///
/// Bindings are declared first (types, fields, methods, locals); units are then rendered with
/// [`ProjectFixture::write_unit`]. Types declared by a rendered unit get their `source_unit`
/// set to that unit.
#[derive(Debug, Default)]
pub struct ProjectFixture {
    bindings: BindingTable,
    params: HashMap<MethodId, Vec<VarId>>,
    units: Vec<SyntaxTree>,
}

impl ProjectFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut BindingTable {
        &mut self.bindings
    }

    pub fn wk(&self) -> WellKnownTypes {
        self.bindings.well_known()
    }

    // Types --------------------------------------------------------------------------------

    fn add_type(
        &mut self,
        package: &str,
        name: &str,
        kind: TypeKind,
        modifiers: Modifiers,
    ) -> TypeId {
        let package = (!package.is_empty()).then_some(package);
        let mut binding = TypeBinding::new(name, package, kind);
        binding.modifiers = modifiers;
        self.bindings.add_type(binding)
    }

    /// A `public` top-level class. Pass an empty package for the default package.
    pub fn class(&mut self, package: &str, name: &str) -> TypeId {
        self.add_type(package, name, TypeKind::Class, Modifiers::PUBLIC)
    }

    /// A package-private top-level class.
    pub fn package_class(&mut self, package: &str, name: &str) -> TypeId {
        self.add_type(package, name, TypeKind::Class, Modifiers::NONE)
    }

    pub fn interface(&mut self, package: &str, name: &str) -> TypeId {
        self.add_type(package, name, TypeKind::Interface, Modifiers::PUBLIC)
    }

    pub fn enumeration(&mut self, package: &str, name: &str) -> TypeId {
        self.add_type(package, name, TypeKind::Enum, Modifiers::PUBLIC)
    }

    pub fn annotation(&mut self, package: &str, name: &str) -> TypeId {
        self.add_type(package, name, TypeKind::Annotation, Modifiers::PUBLIC)
    }

    /// A member class of `outer` with the given modifiers.
    pub fn nested_class(&mut self, outer: TypeId, name: &str, modifiers: Modifiers) -> TypeId {
        let mut binding = TypeBinding::new(name, None, TypeKind::Class);
        binding.modifiers = modifiers;
        binding.enclosing = Some(outer);
        self.bindings.add_type(binding)
    }

    /// An anonymous class created inside `enclosing`, extending (or implementing) `supertype`.
    pub fn anonymous(&mut self, enclosing: TypeId, supertype: TypeId) -> TypeId {
        let mut binding = TypeBinding::new("", None, TypeKind::Anonymous);
        binding.enclosing = Some(enclosing);
        if self.bindings.ty(supertype).is_interface() {
            binding.interfaces.push(supertype);
        } else {
            binding.superclass = Some(supertype);
        }
        self.bindings.add_type(binding)
    }

    pub fn extends(&mut self, sub: TypeId, sup: TypeId) {
        if self.bindings.ty(sup).is_interface() {
            self.bindings.type_mut(sub).interfaces.push(sup);
        } else {
            self.bindings.type_mut(sub).superclass = Some(sup);
        }
    }

    pub fn set_type_modifiers(&mut self, ty: TypeId, modifiers: Modifiers) {
        self.bindings.type_mut(ty).modifiers = modifiers;
    }

    // Members ------------------------------------------------------------------------------

    pub fn field(
        &mut self,
        declaring: TypeId,
        name: &str,
        ty: TypeId,
        modifiers: Modifiers,
    ) -> VarId {
        self.bindings.add_variable(VariableBinding {
            name: name.into(),
            kind: VariableKind::Field,
            declaring: Some(declaring),
            modifiers,
            ty: Some(ty),
            declaration: None,
        })
    }

    pub fn enum_constant(&mut self, declaring: TypeId, name: &str) -> VarId {
        self.bindings.add_variable(VariableBinding {
            name: name.into(),
            kind: VariableKind::EnumConstant,
            declaring: Some(declaring),
            modifiers: Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL,
            ty: Some(declaring),
            declaration: None,
        })
    }

    pub fn local(&mut self, name: &str, ty: TypeId) -> VarId {
        self.bindings.add_variable(VariableBinding {
            name: name.into(),
            kind: VariableKind::Local,
            declaring: None,
            modifiers: Modifiers::NONE,
            ty: Some(ty),
            declaration: None,
        })
    }

    /// A method with named parameters. `ret == None` declares a `void` method.
    pub fn method(
        &mut self,
        declaring: TypeId,
        name: &str,
        params: &[(TypeId, &str)],
        ret: Option<TypeId>,
        modifiers: Modifiers,
    ) -> MethodId {
        let ret = ret.unwrap_or(self.bindings.well_known().void);
        let mut binding = MethodBinding::new(
            name,
            declaring,
            params.iter().map(|(ty, _)| *ty).collect(),
            Some(ret),
        );
        binding.modifiers = modifiers;
        binding.param_names = params.iter().map(|(_, name)| (*name).into()).collect();
        let method = self.bindings.add_method(binding);
        self.declare_params(method, params);
        method
    }

    pub fn constructor(
        &mut self,
        declaring: TypeId,
        params: &[(TypeId, &str)],
        modifiers: Modifiers,
    ) -> MethodId {
        let name = self.bindings.ty(declaring).name.clone();
        let mut binding = MethodBinding::new(
            name,
            declaring,
            params.iter().map(|(ty, _)| *ty).collect(),
            None,
        );
        binding.modifiers = modifiers;
        binding.is_constructor = true;
        binding.param_names = params.iter().map(|(_, name)| (*name).into()).collect();
        let method = self.bindings.add_method(binding);
        self.declare_params(method, params);
        method
    }

    /// Marks the last parameter of `method` as varargs.
    pub fn set_varargs(&mut self, method: MethodId) {
        self.bindings.method_mut(method).varargs = true;
    }

    fn declare_params(&mut self, method: MethodId, params: &[(TypeId, &str)]) {
        let vars = params
            .iter()
            .map(|(ty, name)| {
                self.bindings.add_variable(VariableBinding {
                    name: (*name).into(),
                    kind: VariableKind::Parameter,
                    declaring: None,
                    modifiers: Modifiers::NONE,
                    ty: Some(*ty),
                    declaration: None,
                })
            })
            .collect();
        self.params.insert(method, vars);
    }

    /// Parameter `idx` of `method`.
    pub fn param(&self, method: MethodId, idx: usize) -> VarId {
        self.params[&method][idx]
    }

    // Units --------------------------------------------------------------------------------

    /// Renders `unit`, records it and returns its file id.
    pub fn write_unit(&mut self, unit: Unit) -> FileId {
        let (tree, declared) = Renderer::new(&self.bindings, &self.params, &unit).render(&unit);
        for ty in declared {
            self.bindings.type_mut(ty).source_unit = Some(unit.file.clone());
        }
        tracing::trace!(
            target: "jfix.test",
            file = %unit.file,
            nodes = tree.len(),
            "rendered fixture unit"
        );
        self.units.push(tree);
        unit.file
    }

    pub fn into_project(self) -> Project {
        let mut project = Project::new(self.bindings);
        for unit in self.units {
            project.add_unit(unit);
        }
        project
    }
}

/// All nodes of `kind` whose source text is exactly `source`, in source order.
pub fn find_nodes(tree: &SyntaxTree, kind: SyntaxKind, source: &str) -> Vec<NodeId> {
    tree.preorder()
        .filter(|node| tree.kind(*node) == kind && tree.source(*node) == source)
        .collect()
}

/// The first node of `kind` whose source text is exactly `source`.
///
/// Panics when there is no such node.
pub fn find_node(tree: &SyntaxTree, kind: SyntaxKind, source: &str) -> NodeId {
    find_nodes(tree, kind, source)
        .into_iter()
        .next()
        .unwrap_or_else(|| panic!("no {kind:?} node with source `{source}` in {}", tree.file()))
}

/// A problem of `kind` spanning the first `node_kind` node with source `source`.
pub fn problem_at(
    tree: &SyntaxTree,
    kind: ProblemKind,
    node_kind: SyntaxKind,
    source: &str,
) -> ProblemLocation {
    ProblemLocation::at_node(kind, tree, find_node(tree, node_kind, source))
}
