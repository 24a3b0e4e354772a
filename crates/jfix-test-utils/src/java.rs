//! A tiny Java DSL for describing resolved compilation units.
//!
//! Every name carries the binding the oracle would attach to it; unresolved references keep
//! only their identifier.

use jfix_ast::{Binding, FileId, MethodId, TypeId, VarId};
use smol_str::SmolStr;

#[derive(Clone, Debug)]
pub struct Unit {
    pub file: FileId,
    pub package: Option<String>,
    /// `(name, is_static)`; on-demand imports end in `.*`.
    pub imports: Vec<(String, bool)>,
    pub types: Vec<TypeDecl>,
}

impl Unit {
    pub fn new(file: &str) -> Self {
        Self {
            file: FileId::new(file),
            package: None,
            imports: Vec::new(),
            types: Vec::new(),
        }
    }

    pub fn package(mut self, package: &str) -> Self {
        self.package = Some(package.to_string());
        self
    }

    pub fn import(mut self, name: &str) -> Self {
        self.imports.push((name.to_string(), false));
        self
    }

    pub fn static_import(mut self, name: &str) -> Self {
        self.imports.push((name.to_string(), true));
        self
    }

    pub fn ty(mut self, decl: TypeDecl) -> Self {
        self.types.push(decl);
        self
    }
}

#[derive(Clone, Debug)]
pub struct TypeDecl {
    pub ty: TypeId,
    pub members: Vec<Member>,
}

impl TypeDecl {
    pub fn new(ty: TypeId) -> Self {
        Self {
            ty,
            members: Vec::new(),
        }
    }

    pub fn field(mut self, var: VarId, init: Option<Expr>) -> Self {
        self.members.push(Member::Field(var, init));
        self
    }

    pub fn method(mut self, method: MethodId, body: Vec<Stmt>) -> Self {
        self.members.push(Member::Method(method, Some(body)));
        self
    }

    /// A method without a body (interface or abstract method).
    pub fn abstract_method(mut self, method: MethodId) -> Self {
        self.members.push(Member::Method(method, None));
        self
    }

    pub fn initializer(mut self, is_static: bool, body: Vec<Stmt>) -> Self {
        self.members.push(Member::Initializer { is_static, body });
        self
    }

    pub fn nested(mut self, decl: TypeDecl) -> Self {
        self.members.push(Member::Type(decl));
        self
    }

    pub fn constant(mut self, var: VarId) -> Self {
        self.members.push(Member::EnumConstant(var));
        self
    }

    pub fn attribute(mut self, method: MethodId) -> Self {
        self.members.push(Member::AnnotationMember(method));
        self
    }

    /// Puts `annotation` on the member added last.
    pub fn annotate(mut self, annotation: AnnotationUse) -> Self {
        if let Some(last) = self.members.pop() {
            let member = match last {
                Member::Annotated(mut annotations, inner) => {
                    annotations.push(annotation);
                    Member::Annotated(annotations, inner)
                }
                other => Member::Annotated(vec![annotation], Box::new(other)),
            };
            self.members.push(member);
        }
        self
    }
}

/// `@Type(name = value, ..)` on a declaration.
#[derive(Clone, Debug)]
pub struct AnnotationUse {
    pub ty: TypeId,
    pub values: Vec<(NameRef, Expr)>,
}

#[derive(Clone, Debug)]
pub enum Member {
    Field(VarId, Option<Expr>),
    Method(MethodId, Option<Vec<Stmt>>),
    Initializer { is_static: bool, body: Vec<Stmt> },
    Type(TypeDecl),
    EnumConstant(VarId),
    AnnotationMember(MethodId),
    Annotated(Vec<AnnotationUse>, Box<Member>),
}

#[derive(Clone, Debug)]
pub enum Stmt {
    Expr(Expr),
    Local(VarId, Option<Expr>),
    Return(Option<Expr>),
    If(Expr, Box<Stmt>, Option<Box<Stmt>>),
    While(Expr, Box<Stmt>),
    Block(Vec<Stmt>),
    Switch(Expr, Vec<Case>),
}

#[derive(Clone, Debug)]
pub struct Case {
    /// `None` renders `default:`.
    pub label: Option<Expr>,
    pub body: Vec<Stmt>,
}

/// A name as written in source, with its binding when it resolves.
#[derive(Clone, Debug)]
pub struct NameRef {
    pub name: SmolStr,
    pub binding: Option<Binding>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Long,
    Double,
    Boolean,
    Char,
    String,
    Null,
}

#[derive(Clone, Debug)]
pub enum Expr {
    Name(NameRef),
    /// A type used as an expression qualifier (`E.foo`).
    TypeName(TypeId),
    Qualified(Box<Expr>, NameRef),
    Field(Box<Expr>, NameRef),
    SuperField(VarId),
    This(Option<TypeId>),
    Call {
        receiver: Option<Box<Expr>>,
        method: NameRef,
        args: Vec<Expr>,
    },
    New {
        ty: TypeId,
        constructor: Option<MethodId>,
        args: Vec<Expr>,
        body: Option<TypeDecl>,
    },
    Assign(Box<Expr>, Box<Expr>),
    Infix(Box<Expr>, &'static str, Box<Expr>),
    Not(Box<Expr>),
    Lit(String, LitKind),
    Paren(Box<Expr>),
    Cast(TypeId, Box<Expr>),
}

// Constructors ---------------------------------------------------------------------------

pub fn var(var: VarId) -> Expr {
    Expr::Name(NameRef::bound(String::new(), Binding::Variable(var)))
}

pub fn unresolved(name: &str) -> Expr {
    Expr::Name(NameRef::unresolved(name))
}

pub fn type_name(ty: TypeId) -> Expr {
    Expr::TypeName(ty)
}

pub fn qualified(qualifier: Expr, field: VarId) -> Expr {
    Expr::Qualified(
        Box::new(qualifier),
        NameRef::bound(String::new(), Binding::Variable(field)),
    )
}

pub fn qualified_unresolved(qualifier: Expr, name: &str) -> Expr {
    Expr::Qualified(Box::new(qualifier), NameRef::unresolved(name))
}

pub fn field(receiver: Expr, field: VarId) -> Expr {
    Expr::Field(
        Box::new(receiver),
        NameRef::bound(String::new(), Binding::Variable(field)),
    )
}

pub fn field_unresolved(receiver: Expr, name: &str) -> Expr {
    Expr::Field(Box::new(receiver), NameRef::unresolved(name))
}

pub fn super_field(field: VarId) -> Expr {
    Expr::SuperField(field)
}

pub fn this() -> Expr {
    Expr::This(None)
}

pub fn outer_this(ty: TypeId) -> Expr {
    Expr::This(Some(ty))
}

pub fn call(method: MethodId, args: Vec<Expr>) -> Expr {
    Expr::Call {
        receiver: None,
        method: NameRef::bound(String::new(), Binding::Method(method)),
        args,
    }
}

pub fn call_on(receiver: Expr, method: MethodId, args: Vec<Expr>) -> Expr {
    Expr::Call {
        receiver: Some(Box::new(receiver)),
        method: NameRef::bound(String::new(), Binding::Method(method)),
        args,
    }
}

pub fn call_unresolved(receiver: Option<Expr>, name: &str, args: Vec<Expr>) -> Expr {
    Expr::Call {
        receiver: receiver.map(Box::new),
        method: NameRef::unresolved(name),
        args,
    }
}

pub fn new_object(ty: TypeId, constructor: Option<MethodId>, args: Vec<Expr>) -> Expr {
    Expr::New {
        ty,
        constructor,
        args,
        body: None,
    }
}

pub fn new_anonymous(ty: TypeId, body: TypeDecl) -> Expr {
    Expr::New {
        ty,
        constructor: None,
        args: Vec::new(),
        body: Some(body),
    }
}

pub fn assign(lhs: Expr, rhs: Expr) -> Expr {
    Expr::Assign(Box::new(lhs), Box::new(rhs))
}

pub fn infix(lhs: Expr, op: &'static str, rhs: Expr) -> Expr {
    Expr::Infix(Box::new(lhs), op, Box::new(rhs))
}

pub fn not(operand: Expr) -> Expr {
    Expr::Not(Box::new(operand))
}

pub fn int(value: i64) -> Expr {
    Expr::Lit(value.to_string(), LitKind::Int)
}

pub fn boolean(value: bool) -> Expr {
    Expr::Lit(value.to_string(), LitKind::Boolean)
}

pub fn string(value: &str) -> Expr {
    Expr::Lit(format!("\"{value}\""), LitKind::String)
}

pub fn null() -> Expr {
    Expr::Lit("null".to_string(), LitKind::Null)
}

pub fn lit(text: &str, kind: LitKind) -> Expr {
    Expr::Lit(text.to_string(), kind)
}

pub fn paren(inner: Expr) -> Expr {
    Expr::Paren(Box::new(inner))
}

pub fn cast(ty: TypeId, inner: Expr) -> Expr {
    Expr::Cast(ty, Box::new(inner))
}

pub fn expr(e: Expr) -> Stmt {
    Stmt::Expr(e)
}

pub fn local(var: VarId, init: Option<Expr>) -> Stmt {
    Stmt::Local(var, init)
}

pub fn ret(value: Option<Expr>) -> Stmt {
    Stmt::Return(value)
}

pub fn if_(cond: Expr, then: Stmt, otherwise: Option<Stmt>) -> Stmt {
    Stmt::If(cond, Box::new(then), otherwise.map(Box::new))
}

pub fn while_(cond: Expr, body: Stmt) -> Stmt {
    Stmt::While(cond, Box::new(body))
}

pub fn block(stmts: Vec<Stmt>) -> Stmt {
    Stmt::Block(stmts)
}

pub fn switch(selector: Expr, cases: Vec<Case>) -> Stmt {
    Stmt::Switch(selector, cases)
}

pub fn case(label: Option<Expr>, body: Vec<Stmt>) -> Case {
    Case { label, body }
}

pub fn annotation(ty: TypeId, values: Vec<(NameRef, Expr)>) -> AnnotationUse {
    AnnotationUse { ty, values }
}

/// Name of an existing annotation attribute.
pub fn attribute_ref(method: MethodId) -> NameRef {
    NameRef::bound(String::new(), Binding::Method(method))
}

impl NameRef {
    /// A resolved name. An empty `name` is filled in from the binding when rendering.
    pub fn bound(name: impl Into<SmolStr>, binding: Binding) -> Self {
        Self {
            name: name.into(),
            binding: Some(binding),
        }
    }

    pub fn unresolved(name: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            binding: None,
        }
    }
}
