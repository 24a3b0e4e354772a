//! Semantic bindings produced by the resolution oracle.
//!
//! Bindings are compared by raw identity ([`TypeId`], [`MethodId`], [`VarId`]). A binding that
//! stems from a generic instantiation (for example `Box<String>` or a field of `Box<String>`)
//! records its generic declaration in `declaration`; the `erased_*` projections return that
//! declaration. Callers that want "same declaration" semantics must compare erased ids
//! explicitly.

use std::collections::{HashMap, HashSet};
use std::fmt;

use jfix_core::FileId;
use smol_str::SmolStr;

use crate::syntax::Modifiers;

macro_rules! binding_id {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            #[must_use]
            pub fn idx(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

binding_id!(TypeId);
binding_id!(MethodId);
binding_id!(VarId);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Binding {
    Type(TypeId),
    Method(MethodId),
    Variable(VarId),
}

impl Binding {
    pub fn as_type(self) -> Option<TypeId> {
        match self {
            Binding::Type(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_method(self) -> Option<MethodId> {
        match self {
            Binding::Method(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_variable(self) -> Option<VarId> {
        match self {
            Binding::Variable(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Anonymous,
    Primitive,
    /// The type of the `null` literal.
    Null,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeBinding {
    pub name: SmolStr,
    /// Dotted package name; `None` is the default package.
    pub package: Option<SmolStr>,
    pub kind: TypeKind,
    pub modifiers: Modifiers,
    /// Lexically enclosing type for member, local and anonymous classes.
    pub enclosing: Option<TypeId>,
    pub superclass: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub type_arguments: Vec<TypeId>,
    /// Generic declaration of a parameterized type.
    pub declaration: Option<TypeId>,
    /// Unit declaring the type when it is available as source.
    pub source_unit: Option<FileId>,
}

impl TypeBinding {
    pub fn new(name: impl Into<SmolStr>, package: Option<&str>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            package: package.map(SmolStr::new),
            kind,
            modifiers: Modifiers::NONE,
            enclosing: None,
            superclass: None,
            interfaces: Vec::new(),
            type_arguments: Vec::new(),
            declaration: None,
            source_unit: None,
        }
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface | TypeKind::Annotation)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodBinding {
    pub name: SmolStr,
    pub declaring: TypeId,
    pub modifiers: Modifiers,
    pub params: Vec<TypeId>,
    /// `None` for constructors.
    pub return_type: Option<TypeId>,
    /// The last parameter is a varargs parameter; `params` holds its component type.
    pub varargs: bool,
    pub is_constructor: bool,
    /// Parameter names as declared, when known.
    pub param_names: Vec<SmolStr>,
    pub declaration: Option<MethodId>,
}

impl MethodBinding {
    pub fn new(
        name: impl Into<SmolStr>,
        declaring: TypeId,
        params: Vec<TypeId>,
        return_type: Option<TypeId>,
    ) -> Self {
        Self {
            name: name.into(),
            declaring,
            modifiers: Modifiers::NONE,
            params,
            return_type,
            varargs: false,
            is_constructor: false,
            param_names: Vec::new(),
            declaration: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Field,
    EnumConstant,
    Local,
    Parameter,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableBinding {
    pub name: SmolStr,
    pub kind: VariableKind,
    /// Declaring class of fields and enum constants.
    pub declaring: Option<TypeId>,
    pub modifiers: Modifiers,
    pub ty: Option<TypeId>,
    pub declaration: Option<VarId>,
}

impl VariableBinding {
    pub fn is_field(&self) -> bool {
        matches!(self.kind, VariableKind::Field | VariableKind::EnumConstant)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WellKnownTypes {
    pub object: TypeId,
    pub string: TypeId,
    pub void: TypeId,
    pub boolean: TypeId,
    pub byte: TypeId,
    pub short: TypeId,
    pub char: TypeId,
    pub int: TypeId,
    pub long: TypeId,
    pub float: TypeId,
    pub double: TypeId,
    pub null: TypeId,
}

const PRIMITIVES: [&str; 9] = [
    "boolean", "byte", "short", "char", "int", "long", "float", "double", "void",
];

const BOXES: [(&str, &str); 8] = [
    ("boolean", "Boolean"),
    ("byte", "Byte"),
    ("short", "Short"),
    ("char", "Character"),
    ("int", "Integer"),
    ("long", "Long"),
    ("float", "Float"),
    ("double", "Double"),
];

/// All bindings known to the oracle for one project snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingTable {
    types: Vec<TypeBinding>,
    methods: Vec<MethodBinding>,
    variables: Vec<VariableBinding>,
    well_known: WellKnownTypes,
    primitives: HashMap<SmolStr, TypeId>,
}

impl Default for BindingTable {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingTable {
    /// A table pre-populated with `java.lang.Object`, `java.lang.String`, the primitive types
    /// and the null type.
    pub fn new() -> Self {
        let mut types = Vec::new();
        let mut push = |binding: TypeBinding| {
            types.push(binding);
            TypeId((types.len() - 1) as u32)
        };

        let mut object = TypeBinding::new("Object", Some("java.lang"), TypeKind::Class);
        object.modifiers = Modifiers::PUBLIC;
        let object = push(object);
        let mut string = TypeBinding::new("String", Some("java.lang"), TypeKind::Class);
        string.modifiers = Modifiers::PUBLIC | Modifiers::FINAL;
        string.superclass = Some(object);
        let string = push(string);

        let mut primitives = HashMap::new();
        for name in PRIMITIVES {
            let id = push(TypeBinding::new(name, None, TypeKind::Primitive));
            primitives.insert(SmolStr::new(name), id);
        }
        let null = push(TypeBinding::new("null", None, TypeKind::Null));

        let well_known = WellKnownTypes {
            object,
            string,
            void: primitives["void"],
            boolean: primitives["boolean"],
            byte: primitives["byte"],
            short: primitives["short"],
            char: primitives["char"],
            int: primitives["int"],
            long: primitives["long"],
            float: primitives["float"],
            double: primitives["double"],
            null,
        };

        Self {
            types,
            methods: Vec::new(),
            variables: Vec::new(),
            well_known,
            primitives,
        }
    }

    pub fn well_known(&self) -> WellKnownTypes {
        self.well_known
    }

    pub fn primitive(&self, name: &str) -> Option<TypeId> {
        self.primitives.get(name).copied()
    }

    // Registration -------------------------------------------------------------------------

    pub fn add_type(&mut self, binding: TypeBinding) -> TypeId {
        let mut binding = binding;
        if binding.superclass.is_none()
            && matches!(
                binding.kind,
                TypeKind::Class | TypeKind::Enum | TypeKind::Anonymous
            )
        {
            binding.superclass = Some(self.well_known.object);
        }
        self.types.push(binding);
        TypeId((self.types.len() - 1) as u32)
    }

    pub fn add_method(&mut self, binding: MethodBinding) -> MethodId {
        self.methods.push(binding);
        MethodId((self.methods.len() - 1) as u32)
    }

    pub fn add_variable(&mut self, binding: VariableBinding) -> VarId {
        self.variables.push(binding);
        VarId((self.variables.len() - 1) as u32)
    }

    pub fn type_mut(&mut self, id: TypeId) -> &mut TypeBinding {
        &mut self.types[id.idx()]
    }

    pub fn method_mut(&mut self, id: MethodId) -> &mut MethodBinding {
        &mut self.methods[id.idx()]
    }

    pub fn variable_mut(&mut self, id: VarId) -> &mut VariableBinding {
        &mut self.variables[id.idx()]
    }

    /// Parameterization of `generic` with `arguments`; members must be registered separately.
    pub fn parameterize(&mut self, generic: TypeId, arguments: Vec<TypeId>) -> TypeId {
        let mut binding = self.ty(generic).clone();
        binding.type_arguments = arguments;
        binding.declaration = Some(generic);
        self.types.push(binding);
        TypeId((self.types.len() - 1) as u32)
    }

    /// Look up a type by dotted qualified name (`p.Outer.Inner`).
    pub fn find_type(&self, qualified: &str) -> Option<TypeId> {
        (0..self.types.len())
            .map(|idx| TypeId(idx as u32))
            .find(|id| {
                self.ty(*id).declaration.is_none()
                    && self.ty(*id).kind != TypeKind::Anonymous
                    && self.qualified_name(*id) == qualified
            })
    }

    // Accessors ----------------------------------------------------------------------------

    pub fn ty(&self, id: TypeId) -> &TypeBinding {
        &self.types[id.idx()]
    }

    pub fn method(&self, id: MethodId) -> &MethodBinding {
        &self.methods[id.idx()]
    }

    pub fn variable(&self, id: VarId) -> &VariableBinding {
        &self.variables[id.idx()]
    }

    pub fn name(&self, binding: Binding) -> &str {
        match binding {
            Binding::Type(id) => &self.ty(id).name,
            Binding::Method(id) => &self.method(id).name,
            Binding::Variable(id) => &self.variable(id).name,
        }
    }

    // Erasure projection -------------------------------------------------------------------

    pub fn erased_type(&self, id: TypeId) -> TypeId {
        self.ty(id).declaration.unwrap_or(id)
    }

    pub fn erased_method(&self, id: MethodId) -> MethodId {
        self.method(id).declaration.unwrap_or(id)
    }

    pub fn erased_variable(&self, id: VarId) -> VarId {
        self.variable(id).declaration.unwrap_or(id)
    }

    pub fn erased(&self, binding: Binding) -> Binding {
        match binding {
            Binding::Type(id) => Binding::Type(self.erased_type(id)),
            Binding::Method(id) => Binding::Method(self.erased_method(id)),
            Binding::Variable(id) => Binding::Variable(self.erased_variable(id)),
        }
    }

    // Type queries -------------------------------------------------------------------------

    pub fn is_anonymous(&self, id: TypeId) -> bool {
        self.ty(id).kind == TypeKind::Anonymous
    }

    pub fn is_primitive(&self, id: TypeId) -> bool {
        self.ty(id).kind == TypeKind::Primitive
    }

    pub fn is_reference(&self, id: TypeId) -> bool {
        !matches!(self.ty(id).kind, TypeKind::Primitive | TypeKind::Null)
    }

    /// Outermost enclosing type.
    pub fn top_level(&self, id: TypeId) -> TypeId {
        let mut current = self.erased_type(id);
        while let Some(outer) = self.ty(current).enclosing {
            current = self.erased_type(outer);
        }
        current
    }

    /// Enclosing types of `id`, innermost first, excluding `id`.
    pub fn enclosing_types(&self, id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        std::iter::successors(self.ty(id).enclosing, move |t| self.ty(*t).enclosing)
    }

    /// Dotted source name, `p.Outer.Inner`. Empty for anonymous classes.
    pub fn qualified_name(&self, id: TypeId) -> String {
        let ty = self.ty(self.erased_type(id));
        match ty.kind {
            TypeKind::Anonymous => String::new(),
            TypeKind::Primitive | TypeKind::Null => ty.name.to_string(),
            _ => match ty.enclosing {
                Some(outer) => format!("{}.{}", self.qualified_name(outer), ty.name),
                None => match &ty.package {
                    Some(pkg) => format!("{pkg}.{}", ty.name),
                    None => ty.name.to_string(),
                },
            },
        }
    }

    /// JVM binary name, `p.Outer$Inner`.
    pub fn binary_name(&self, id: TypeId) -> String {
        let ty = self.ty(self.erased_type(id));
        match ty.enclosing {
            Some(outer) => format!("{}${}", self.binary_name(outer), ty.name),
            None => self.qualified_name(id),
        }
    }

    /// Name relative to the package, `Outer.Inner`.
    pub fn nested_name(&self, id: TypeId) -> String {
        let ty = self.ty(self.erased_type(id));
        match ty.enclosing {
            Some(outer) if ty.kind != TypeKind::Anonymous => {
                format!("{}.{}", self.nested_name(outer), ty.name)
            }
            _ => ty.name.to_string(),
        }
    }

    /// Package of the outermost enclosing type.
    pub fn package_of(&self, id: TypeId) -> Option<&str> {
        self.ty(self.top_level(id)).package.as_deref()
    }

    /// Source-style display, including type arguments (`Box<String>`).
    pub fn display(&self, id: TypeId) -> String {
        let ty = self.ty(id);
        if ty.type_arguments.is_empty() {
            return ty.name.to_string();
        }
        let args: Vec<String> = ty.type_arguments.iter().map(|a| self.display(*a)).collect();
        format!("{}<{}>", ty.name, args.join(", "))
    }

    /// Direct supertypes (superclass first, then interfaces).
    pub fn supertypes(&self, id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        let ty = self.ty(id);
        ty.superclass.into_iter().chain(ty.interfaces.iter().copied())
    }

    /// `true` when `possible_super` is `ty` or one of its transitive supertypes.
    ///
    /// With `consider_type_arguments == false` both sides are compared by erasure.
    pub fn is_subtype(
        &self,
        possible_super: TypeId,
        ty: TypeId,
        consider_type_arguments: bool,
    ) -> bool {
        if !self.is_reference(ty) || !self.is_reference(possible_super) {
            return possible_super == ty;
        }
        let normalize = |t: TypeId| {
            if consider_type_arguments {
                t
            } else {
                self.erased_type(t)
            }
        };
        let target = normalize(possible_super);
        let mut seen = HashSet::new();
        let mut stack = vec![ty];
        while let Some(current) = stack.pop() {
            let current = normalize(current);
            if !seen.insert(current) {
                continue;
            }
            if current == target {
                return true;
            }
            stack.extend(self.supertypes(current));
            // Parameterized types inherit the declaration's hierarchy when no explicit
            // supertypes were recorded for the instantiation.
            if let Some(decl) = self.ty(current).declaration {
                if self.ty(current).superclass.is_none() {
                    stack.extend(self.supertypes(decl));
                }
            }
        }
        target == self.well_known.object
    }

    /// Assignment compatibility (identity, widening reference, primitive widening, boxing,
    /// unboxing, `null`).
    pub fn is_assignable(&self, from: TypeId, to: TypeId) -> bool {
        if from == to || self.erased_type(from) == self.erased_type(to) {
            return true;
        }
        let wk = self.well_known;
        if from == wk.null {
            return self.is_reference(to);
        }
        if from == wk.void || to == wk.void {
            return false;
        }
        match (self.is_primitive(from), self.is_primitive(to)) {
            (true, true) => self.is_primitive_widening(from, to),
            (false, false) => self.is_subtype(to, from, false),
            (true, false) => match self.boxed_name(from) {
                Some(boxed) => {
                    let name = &self.ty(self.erased_type(to)).name;
                    name == boxed || to == wk.object
                }
                None => false,
            },
            (false, true) => {
                let from_name = &self.ty(self.erased_type(from)).name;
                let java_lang = self.package_of(from) == Some("java.lang");
                BOXES.iter().any(|(prim, boxed)| {
                    java_lang
                        && from_name == boxed
                        && self
                            .primitive(prim)
                            .is_some_and(|p| p == to || self.is_primitive_widening(p, to))
                })
            }
        }
    }

    fn boxed_name(&self, primitive: TypeId) -> Option<&'static str> {
        let name = &self.ty(primitive).name;
        BOXES
            .iter()
            .find(|(prim, _)| name == prim)
            .map(|(_, boxed)| *boxed)
    }

    fn is_primitive_widening(&self, from: TypeId, to: TypeId) -> bool {
        const RANK: [&str; 6] = ["byte", "short", "int", "long", "float", "double"];
        let from_name = self.ty(from).name.as_str();
        let to_name = self.ty(to).name.as_str();
        if from_name == to_name {
            return true;
        }
        if from_name == "char" {
            return matches!(to_name, "int" | "long" | "float" | "double");
        }
        let from_rank = RANK.iter().position(|n| *n == from_name);
        let to_rank = RANK.iter().position(|n| *n == to_name);
        match (from_rank, to_rank) {
            // `byte` does not widen to `char`, which is not in RANK anyway.
            (Some(f), Some(t)) => f < t,
            _ => false,
        }
    }

    // Members ------------------------------------------------------------------------------

    /// Fields (and enum constants) declared directly in `ty`.
    pub fn declared_fields(&self, ty: TypeId) -> impl Iterator<Item = VarId> + '_ {
        (0..self.variables.len())
            .map(|idx| VarId(idx as u32))
            .filter(move |id| {
                let var = self.variable(*id);
                var.is_field() && var.declaring == Some(ty)
            })
    }

    /// Methods (including constructors) declared directly in `ty`.
    pub fn declared_methods(&self, ty: TypeId) -> impl Iterator<Item = MethodId> + '_ {
        (0..self.methods.len())
            .map(|idx| MethodId(idx as u32))
            .filter(move |id| self.method(*id).declaring == ty)
    }

    pub fn constructors(&self, ty: TypeId) -> impl Iterator<Item = MethodId> + '_ {
        self.declared_methods(self.erased_type(ty))
            .filter(|id| self.method(*id).is_constructor)
    }

    /// Visits `ty` and its supertypes breadth-first (each type once).
    pub fn hierarchy(&self, ty: TypeId) -> Vec<TypeId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = std::collections::VecDeque::from([self.erased_type(ty)]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            out.push(current);
            for sup in self.supertypes(current) {
                queue.push_back(self.erased_type(sup));
            }
        }
        out
    }

    /// Non-constructor methods named `name` declared in `ty` or inherited by it.
    pub fn methods_named(&self, ty: TypeId, name: &str) -> Vec<MethodId> {
        self.hierarchy(ty)
            .into_iter()
            .flat_map(|t| self.declared_methods(t).collect::<Vec<_>>())
            .filter(|m| {
                let method = self.method(*m);
                !method.is_constructor && method.name == name
            })
            .collect()
    }

    /// Field named `name` declared in `ty` or the nearest supertype declaring one.
    pub fn field_named(&self, ty: TypeId, name: &str) -> Option<VarId> {
        self.hierarchy(ty)
            .into_iter()
            .find_map(|t| self.declared_fields(t).find(|f| self.variable(*f).name == name))
    }

    /// Parameter types of `method`, compared by erasure.
    pub fn same_parameters(&self, a: MethodId, b: MethodId) -> bool {
        let a = &self.method(a).params;
        let b = &self.method(b).params;
        a.len() == b.len()
            && a
                .iter()
                .zip(b)
                .all(|(x, y)| self.erased_type(*x) == self.erased_type(*y))
    }
}
