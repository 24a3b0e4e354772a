use std::collections::HashMap;

use jfix_ast::{
    Binding, BindingTable, MethodId, Modifiers, NodeId, Role, SyntaxKind, SyntaxTree, TextRange,
    TreeBuilder, TypeId, TypeKind, VarId,
};
use smol_str::SmolStr;

use crate::java::{AnnotationUse, Case, Expr, LitKind, Member, NameRef, Stmt, TypeDecl, Unit};

const INDENT: &str = "    ";

/// Renders a [`Unit`] to text while recording the bound tree.
pub(crate) struct Renderer<'a> {
    table: &'a BindingTable,
    params: &'a HashMap<MethodId, Vec<VarId>>,
    builder: TreeBuilder,
    out: String,
    indent: usize,
    types: Vec<TypeId>,
    /// Annotations for the next declaration node.
    annotations: Vec<AnnotationUse>,
    pub(crate) declared: Vec<TypeId>,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(
        table: &'a BindingTable,
        params: &'a HashMap<MethodId, Vec<VarId>>,
        unit: &Unit,
    ) -> Self {
        Self {
            table,
            params,
            builder: TreeBuilder::new(unit.file.clone()),
            out: String::new(),
            indent: 0,
            types: Vec::new(),
            annotations: Vec::new(),
            declared: Vec::new(),
        }
    }

    pub(crate) fn render(mut self, unit: &Unit) -> (SyntaxTree, Vec<TypeId>) {
        self.start(SyntaxKind::CompilationUnit, Role::Root);
        if let Some(package) = &unit.package {
            let node = self.start(SyntaxKind::PackageDeclaration, Role::Package);
            self.text("package ");
            self.leaf(SyntaxKind::SimpleName, Role::Name, package);
            self.text(";");
            self.finish();
            self.builder.set_identifier(node, package.as_str());
            self.text("\n\n");
        }
        for (name, is_static) in &unit.imports {
            let node = self.start(SyntaxKind::ImportDeclaration, Role::Import);
            self.text(if *is_static { "import static " } else { "import " });
            self.leaf(SyntaxKind::SimpleName, Role::Name, name);
            self.text(";");
            self.finish();
            self.builder.set_identifier(node, name.as_str());
            if *is_static {
                self.builder.set_modifiers(node, Modifiers::STATIC);
            }
            self.text("\n");
        }
        if !unit.imports.is_empty() {
            self.text("\n");
        }
        for (idx, decl) in unit.types.iter().enumerate() {
            if idx > 0 {
                self.text("\n");
            }
            self.type_decl(decl, Role::Member);
            self.text("\n");
        }
        self.finish();

        let tree = self
            .builder
            .finish(self.out)
            .expect("fixture renderer produced an invalid tree");
        (tree, self.declared)
    }

    // Primitives ---------------------------------------------------------------------------

    fn table(&self) -> &'a BindingTable {
        self.table
    }

    fn start(&mut self, kind: SyntaxKind, role: Role) -> NodeId {
        self.builder.start_node(kind, role, self.out.len())
    }

    fn finish(&mut self) -> NodeId {
        self.builder
            .finish_node(self.out.len())
            .expect("fixture renderer finished more nodes than it started")
    }

    fn text(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
    }

    fn leaf(&mut self, kind: SyntaxKind, role: Role, text: &str) -> NodeId {
        let start = self.out.len();
        self.out.push_str(text);
        self.builder
            .leaf(kind, role, TextRange::new(start, self.out.len()))
    }

    fn modifiers(&mut self, modifiers: Modifiers) {
        let text = modifiers.to_string();
        if !text.is_empty() {
            self.text(&text);
            self.text(" ");
        }
    }

    fn type_of(&self, binding: Binding) -> Option<TypeId> {
        match binding {
            Binding::Type(ty) => Some(ty),
            Binding::Variable(var) => self.table().variable(var).ty,
            Binding::Method(method) => self.table().method(method).return_type,
        }
    }

    fn name(&mut self, role: Role, name: &NameRef) -> NodeId {
        let text: SmolStr = if name.name.is_empty() {
            match name.binding {
                Some(binding) => self.table().name(binding).into(),
                None => SmolStr::default(),
            }
        } else {
            name.name.clone()
        };
        let node = self.leaf(SyntaxKind::SimpleName, role, &text);
        self.builder.set_identifier(node, text);
        if let Some(binding) = name.binding {
            self.builder.set_binding(node, binding);
            if !matches!(binding, Binding::Method(_)) {
                if let Some(ty) = self.type_of(binding) {
                    self.builder.set_type_binding(node, ty);
                }
            }
        }
        node
    }

    fn bound_name(&mut self, role: Role, binding: Binding) -> NodeId {
        self.name(role, &NameRef::bound(String::new(), binding))
    }

    fn type_ref(&mut self, role: Role, ty: TypeId) -> NodeId {
        let kind = if self.table().is_primitive(ty) {
            SyntaxKind::PrimitiveType
        } else {
            SyntaxKind::SimpleType
        };
        let display = self.table().display(ty);
        let node = self.leaf(kind, role, &display);
        self.builder.set_binding(node, Binding::Type(ty));
        self.builder.set_type_binding(node, ty);
        node
    }

    /// Renders pending annotations, each on its own line, inside the current declaration.
    fn flush_annotations(&mut self) {
        for annotation in std::mem::take(&mut self.annotations) {
            let node = self.start(SyntaxKind::Annotation, Role::Annotation);
            self.text("@");
            let name = self.table().ty(annotation.ty).name.clone();
            let ty = self.leaf(SyntaxKind::SimpleName, Role::Type, &name);
            self.builder.set_identifier(ty, name);
            self.builder.set_binding(ty, Binding::Type(annotation.ty));
            if !annotation.values.is_empty() {
                self.text("(");
                for (idx, (name, value)) in annotation.values.iter().enumerate() {
                    if idx > 0 {
                        self.text(", ");
                    }
                    self.start(SyntaxKind::MemberValuePair, Role::MemberValue);
                    self.name(Role::Name, name);
                    self.text(" = ");
                    self.expr(value, Role::Expression);
                    self.finish();
                }
                self.text(")");
            }
            self.finish();
            self.builder.set_binding(node, Binding::Type(annotation.ty));
            self.builder.set_type_binding(node, annotation.ty);
            self.newline();
        }
    }

    fn child_type(&mut self, node: NodeId) -> Option<TypeId> {
        self.builder.node_mut(node).type_binding
    }

    // Declarations -------------------------------------------------------------------------

    fn type_decl(&mut self, decl: &TypeDecl, role: Role) -> NodeId {
        let table = self.table;
        let binding = table.ty(decl.ty);
        let node = self.start(SyntaxKind::TypeDeclaration, role);
        self.flush_annotations();
        self.builder.set_binding(node, Binding::Type(decl.ty));
        self.builder.set_identifier(node, binding.name.clone());
        self.builder.set_modifiers(node, binding.modifiers);

        self.modifiers(binding.modifiers);
        self.text(match binding.kind {
            TypeKind::Interface => "interface ",
            TypeKind::Enum => "enum ",
            TypeKind::Annotation => "@interface ",
            _ => "class ",
        });
        self.bound_name(Role::Name, Binding::Type(decl.ty));

        if binding.kind == TypeKind::Class {
            if let Some(superclass) = binding.superclass {
                if superclass != table.well_known().object {
                    self.text(" extends ");
                    self.type_ref(Role::Type, superclass);
                }
            }
        }
        if !binding.interfaces.is_empty() {
            self.text(if binding.kind == TypeKind::Interface {
                " extends "
            } else {
                " implements "
            });
            for (idx, iface) in binding.interfaces.iter().enumerate() {
                if idx > 0 {
                    self.text(", ");
                }
                self.type_ref(Role::Type, *iface);
            }
        }

        self.text(" {");
        self.type_body(decl);
        self.newline();
        self.text("}");
        self.finish()
    }

    fn type_body(&mut self, decl: &TypeDecl) {
        self.declared.push(decl.ty);
        self.types.push(decl.ty);
        self.indent += 1;

        let constants: Vec<VarId> = decl
            .members
            .iter()
            .filter_map(|m| match m {
                Member::EnumConstant(var) => Some(*var),
                _ => None,
            })
            .collect();
        if !constants.is_empty() {
            self.newline();
            for (idx, constant) in constants.iter().enumerate() {
                if idx > 0 {
                    self.text(", ");
                }
                let node = self.start(SyntaxKind::EnumConstantDeclaration, Role::Member);
                self.builder.set_binding(node, Binding::Variable(*constant));
                self.bound_name(Role::Name, Binding::Variable(*constant));
                self.finish();
            }
            self.text(";");
        }

        for member in &decl.members {
            if matches!(member, Member::EnumConstant(_)) {
                continue;
            }
            self.newline();
            self.member(member);
        }

        self.indent -= 1;
        self.types.pop();
    }

    fn member(&mut self, member: &Member) {
        match member {
            Member::Field(var, init) => {
                let binding = self.table().variable(*var);
                let node = self.start(SyntaxKind::FieldDeclaration, Role::Member);
                self.flush_annotations();
                self.builder.set_modifiers(node, binding.modifiers);
                self.modifiers(binding.modifiers);
                if let Some(ty) = binding.ty {
                    self.type_ref(Role::Type, ty);
                    self.text(" ");
                }
                self.fragment(*var, init.as_ref());
                self.text(";");
                self.finish();
            }
            Member::Method(method, body) => self.method(*method, body.as_deref()),
            Member::Initializer { is_static, body } => {
                let node = self.start(SyntaxKind::Initializer, Role::Member);
                if *is_static {
                    self.builder.set_modifiers(node, Modifiers::STATIC);
                    self.text("static ");
                }
                self.block(body, Role::Body);
                self.finish();
            }
            Member::Type(decl) => {
                self.type_decl(decl, Role::Member);
            }
            Member::EnumConstant(_) => {}
            Member::Annotated(annotations, inner) => {
                self.annotations.extend(annotations.iter().cloned());
                self.member(inner);
            }
            Member::AnnotationMember(method) => {
                let binding = self.table().method(*method);
                let node = self.start(SyntaxKind::AnnotationTypeMemberDeclaration, Role::Member);
                self.builder.set_binding(node, Binding::Method(*method));
                self.builder.set_identifier(node, binding.name.clone());
                let ret = binding.return_type.unwrap_or(self.table().well_known().void);
                self.type_ref(Role::ReturnType, ret);
                self.text(" ");
                self.bound_name(Role::Name, Binding::Method(*method));
                self.text("();");
                self.finish();
            }
        }
    }

    fn method(&mut self, method: MethodId, body: Option<&[Stmt]>) {
        let table = self.table;
        let binding = table.method(method);
        let node = self.start(SyntaxKind::MethodDeclaration, Role::Member);
        self.flush_annotations();
        self.builder.set_binding(node, Binding::Method(method));
        self.builder.set_identifier(node, binding.name.clone());
        self.builder.set_modifiers(node, binding.modifiers);

        self.modifiers(binding.modifiers);
        if !binding.is_constructor {
            let ret = binding.return_type.unwrap_or(table.well_known().void);
            self.type_ref(Role::ReturnType, ret);
            self.text(" ");
        }
        self.bound_name(Role::Name, Binding::Method(method));
        self.text("(");
        let params = self.params.get(&method).cloned().unwrap_or_default();
        for (idx, param) in params.iter().enumerate() {
            if idx > 0 {
                self.text(", ");
            }
            let var = table.variable(*param);
            let node = self.start(SyntaxKind::SingleVariableDeclaration, Role::Parameter);
            self.builder.set_binding(node, Binding::Variable(*param));
            self.builder.set_identifier(node, var.name.clone());
            if let Some(ty) = var.ty {
                self.type_ref(Role::Type, ty);
            }
            if binding.varargs && idx + 1 == params.len() {
                self.text("...");
            }
            self.text(" ");
            self.bound_name(Role::Name, Binding::Variable(*param));
            self.finish();
        }
        self.text(")");
        match body {
            Some(body) => {
                self.text(" ");
                self.block(body, Role::Body);
            }
            None => self.text(";"),
        }
        self.finish();
    }

    fn fragment(&mut self, var: VarId, init: Option<&Expr>) {
        let node = self.start(SyntaxKind::VariableDeclarationFragment, Role::Fragment);
        self.builder.set_binding(node, Binding::Variable(var));
        self.builder
            .set_identifier(node, self.table().variable(var).name.clone());
        self.bound_name(Role::Name, Binding::Variable(var));
        if let Some(init) = init {
            self.text(" = ");
            self.expr(init, Role::Initializer);
        }
        self.finish();
    }

    // Statements ---------------------------------------------------------------------------

    fn block(&mut self, stmts: &[Stmt], role: Role) -> NodeId {
        self.start(SyntaxKind::Block, role);
        self.text("{");
        self.indent += 1;
        for stmt in stmts {
            self.newline();
            self.stmt(stmt, Role::Statement);
        }
        self.indent -= 1;
        self.newline();
        self.text("}");
        self.finish()
    }

    /// Body of `if`/`while`: blocks stay on the same line, other statements go on their own
    /// indented line.
    fn nested_stmt(&mut self, stmt: &Stmt, role: Role) {
        if matches!(stmt, Stmt::Block(_)) {
            self.text(" ");
            self.stmt(stmt, role);
        } else {
            self.indent += 1;
            self.newline();
            self.stmt(stmt, role);
            self.indent -= 1;
        }
    }

    fn stmt(&mut self, stmt: &Stmt, role: Role) -> NodeId {
        match stmt {
            Stmt::Expr(e) => {
                self.start(SyntaxKind::ExpressionStatement, role);
                self.expr(e, Role::Expression);
                self.text(";");
                self.finish()
            }
            Stmt::Local(var, init) => {
                self.start(SyntaxKind::VariableDeclarationStatement, role);
                if let Some(ty) = self.table().variable(*var).ty {
                    self.type_ref(Role::Type, ty);
                    self.text(" ");
                }
                self.fragment(*var, init.as_ref());
                self.text(";");
                self.finish()
            }
            Stmt::Return(value) => {
                self.start(SyntaxKind::ReturnStatement, role);
                self.text("return");
                if let Some(value) = value {
                    self.text(" ");
                    self.expr(value, Role::Expression);
                }
                self.text(";");
                self.finish()
            }
            Stmt::If(cond, then, otherwise) => {
                self.start(SyntaxKind::IfStatement, role);
                self.text("if (");
                self.expr(cond, Role::Condition);
                self.text(")");
                self.nested_stmt(then, Role::Then);
                if let Some(otherwise) = otherwise {
                    if matches!(**then, Stmt::Block(_)) {
                        self.text(" else");
                    } else {
                        self.newline();
                        self.text("else");
                    }
                    if matches!(**otherwise, Stmt::If(..)) {
                        self.text(" ");
                        self.stmt(otherwise, Role::Else);
                    } else {
                        self.nested_stmt(otherwise, Role::Else);
                    }
                }
                self.finish()
            }
            Stmt::While(cond, body) => {
                self.start(SyntaxKind::WhileStatement, role);
                self.text("while (");
                self.expr(cond, Role::Condition);
                self.text(")");
                self.nested_stmt(body, Role::Body);
                self.finish()
            }
            Stmt::Block(stmts) => self.block(stmts, role),
            Stmt::Switch(selector, cases) => {
                self.start(SyntaxKind::SwitchStatement, role);
                self.text("switch (");
                self.expr(selector, Role::Expression);
                self.text(") {");
                self.indent += 1;
                for Case { label, body } in cases {
                    self.newline();
                    self.start(SyntaxKind::SwitchCase, Role::Statement);
                    match label {
                        Some(label) => {
                            self.text("case ");
                            self.expr(label, Role::SwitchCaseLabel);
                            self.text(":");
                        }
                        None => self.text("default:"),
                    }
                    self.finish();
                    self.indent += 1;
                    for stmt in body {
                        self.newline();
                        self.stmt(stmt, Role::Statement);
                    }
                    self.indent -= 1;
                }
                self.indent -= 1;
                self.newline();
                self.text("}");
                self.finish()
            }
        }
    }

    // Expressions --------------------------------------------------------------------------

    fn expr(&mut self, e: &Expr, role: Role) -> NodeId {
        let wk = self.table().well_known();
        match e {
            Expr::Name(name) => self.name(role, name),
            Expr::TypeName(ty) => self.bound_name(role, Binding::Type(*ty)),
            Expr::Qualified(qualifier, name) => {
                let node = self.start(SyntaxKind::QualifiedName, role);
                self.expr(qualifier, Role::Qualifier);
                self.text(".");
                let simple = self.name(Role::Name, name);
                self.finish();
                self.copy_binding(simple, node);
                node
            }
            Expr::Field(receiver, name) => {
                let node = self.start(SyntaxKind::FieldAccess, role);
                self.expr(receiver, Role::Expression);
                self.text(".");
                let simple = self.name(Role::Name, name);
                self.finish();
                self.copy_binding(simple, node);
                node
            }
            Expr::SuperField(var) => {
                let node = self.start(SyntaxKind::SuperFieldAccess, role);
                self.text("super.");
                let simple = self.bound_name(Role::Name, Binding::Variable(*var));
                self.finish();
                self.copy_binding(simple, node);
                node
            }
            Expr::This(qualifier) => {
                let node = self.start(SyntaxKind::ThisExpression, role);
                if let Some(ty) = qualifier {
                    self.bound_name(Role::Qualifier, Binding::Type(*ty));
                    self.text(".");
                }
                self.text("this");
                self.finish();
                if let Some(ty) = qualifier.or_else(|| self.types.last().copied()) {
                    self.builder.set_type_binding(node, ty);
                }
                node
            }
            Expr::Call {
                receiver,
                method,
                args,
            } => {
                let node = self.start(SyntaxKind::MethodInvocation, role);
                if let Some(receiver) = receiver {
                    self.expr(receiver, Role::Expression);
                    self.text(".");
                }
                self.name(Role::Name, method);
                self.args(args);
                self.finish();
                if let Some(binding) = method.binding {
                    self.builder.set_binding(node, binding);
                    if let Some(ty) = self.type_of(binding) {
                        self.builder.set_type_binding(node, ty);
                    }
                }
                node
            }
            Expr::New {
                ty,
                constructor,
                args,
                body,
            } => {
                let node = self.start(SyntaxKind::ClassInstanceCreation, role);
                self.text("new ");
                self.type_ref(Role::Type, *ty);
                self.args(args);
                let mut created = *ty;
                if let Some(body) = body {
                    self.text(" ");
                    let anon =
                        self.start(SyntaxKind::AnonymousClassDeclaration, Role::AnonymousBody);
                    self.builder.set_binding(anon, Binding::Type(body.ty));
                    self.text("{");
                    self.type_body(body);
                    self.newline();
                    self.text("}");
                    self.finish();
                    created = body.ty;
                }
                self.finish();
                if let Some(constructor) = constructor {
                    self.builder.set_binding(node, Binding::Method(*constructor));
                }
                self.builder.set_type_binding(node, created);
                node
            }
            Expr::Assign(lhs, rhs) => {
                let node = self.start(SyntaxKind::Assignment, role);
                let left = self.expr(lhs, Role::LeftHandSide);
                self.text(" = ");
                self.expr(rhs, Role::RightHandSide);
                self.finish();
                self.builder.set_identifier(node, "=");
                if let Some(ty) = self.child_type(left) {
                    self.builder.set_type_binding(node, ty);
                }
                node
            }
            Expr::Infix(lhs, op, rhs) => {
                let node = self.start(SyntaxKind::InfixExpression, role);
                let left = self.expr(lhs, Role::Operand);
                self.text(&format!(" {op} "));
                self.expr(rhs, Role::Operand);
                self.finish();
                self.builder.set_identifier(node, *op);
                let ty = match *op {
                    "==" | "!=" | "<" | ">" | "<=" | ">=" | "&&" | "||" => Some(wk.boolean),
                    _ => self.child_type(left),
                };
                if let Some(ty) = ty {
                    self.builder.set_type_binding(node, ty);
                }
                node
            }
            Expr::Not(operand) => {
                let node = self.start(SyntaxKind::PrefixExpression, role);
                self.text("!");
                self.expr(operand, Role::Operand);
                self.finish();
                self.builder.set_identifier(node, "!");
                self.builder.set_type_binding(node, wk.boolean);
                node
            }
            Expr::Lit(text, kind) => {
                let node = self.leaf(SyntaxKind::Literal, role, text);
                let ty = match kind {
                    LitKind::Int => wk.int,
                    LitKind::Long => wk.long,
                    LitKind::Double => wk.double,
                    LitKind::Boolean => wk.boolean,
                    LitKind::Char => wk.char,
                    LitKind::String => wk.string,
                    LitKind::Null => wk.null,
                };
                self.builder.set_type_binding(node, ty);
                node
            }
            Expr::Paren(inner) => {
                let node = self.start(SyntaxKind::ParenthesizedExpression, role);
                self.text("(");
                let inner = self.expr(inner, Role::Expression);
                self.text(")");
                self.finish();
                if let Some(ty) = self.child_type(inner) {
                    self.builder.set_type_binding(node, ty);
                }
                node
            }
            Expr::Cast(ty, inner) => {
                let node = self.start(SyntaxKind::CastExpression, role);
                self.text("(");
                self.type_ref(Role::Type, *ty);
                self.text(") ");
                self.expr(inner, Role::Expression);
                self.finish();
                self.builder.set_type_binding(node, *ty);
                node
            }
        }
    }

    fn args(&mut self, args: &[Expr]) {
        self.text("(");
        for (idx, arg) in args.iter().enumerate() {
            if idx > 0 {
                self.text(", ");
            }
            self.expr(arg, Role::Argument);
        }
        self.text(")");
    }

    fn copy_binding(&mut self, from: NodeId, to: NodeId) {
        let source = self.builder.node_mut(from).clone();
        let target = self.builder.node_mut(to);
        target.binding = source.binding;
        target.type_binding = source.type_binding;
    }
}
