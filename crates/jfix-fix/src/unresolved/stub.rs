use jfix_ast::{Binding, BindingTable, Modifiers, NodeId, Role, SyntaxKind, SyntaxTree, TypeId};
use jfix_core::text;
use smol_str::SmolStr;

use crate::rewrite::CompilationUnitRewrite;
use crate::FixError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StubKind {
    Method,
    Constructor,
    Field,
    /// `Type name();` in an annotation type.
    AnnotationAttribute,
}

/// A member declaration to synthesize in `target`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberStub {
    pub kind: StubKind,
    pub target: TypeId,
    pub name: SmolStr,
    pub modifiers: Modifiers,
    /// Return type of methods and attributes, type of fields. `None` for constructors.
    pub ty: Option<TypeId>,
    pub params: Vec<(TypeId, String)>,
    /// Declared without a body (interface methods).
    pub is_abstract: bool,
    pub label: String,
}

impl MemberStub {
    pub(crate) fn apply(&self, cu: &mut CompilationUnitRewrite<'_>) -> Result<(), FixError> {
        let tree = cu.tree();
        let b = cu.bindings();
        let decl = tree
            .find_declaration(Binding::Type(self.target))
            .ok_or_else(|| FixError::NoSourceDeclaration(b.qualified_name(self.target)))?;
        let sep = cu.line_separator();
        let unit = cu.format().indent_unit();
        let indent = format!("{}{unit}", text::line_indent(tree.text(), tree.range(decl).start));

        let declaration = self.render(cu, b, &indent, &unit, sep);
        let (offset, insert) = insertion(tree, decl, self.kind, &indent, sep, &declaration)
            .ok_or_else(|| FixError::NoSourceDeclaration(b.qualified_name(self.target)))?;
        cu.insert_text(offset, insert);
        Ok(())
    }

    fn render(
        &self,
        cu: &mut CompilationUnitRewrite<'_>,
        b: &BindingTable,
        indent: &str,
        unit: &str,
        sep: &str,
    ) -> String {
        let mut out = String::new();
        let modifiers = self.modifiers.to_string();
        if !modifiers.is_empty() {
            out.push_str(&modifiers);
            out.push(' ');
        }
        let ty = self.ty.map(|ty| cu.add_import(ty));
        match self.kind {
            StubKind::Field => {
                out.push_str(&format!("{} {};", ty.unwrap_or_default(), self.name));
            }
            StubKind::AnnotationAttribute => {
                out.push_str(&format!("{} {}();", ty.unwrap_or_default(), self.name));
            }
            StubKind::Method | StubKind::Constructor => {
                if let Some(ty) = &ty {
                    out.push_str(ty);
                    out.push(' ');
                }
                out.push_str(&self.name);
                out.push('(');
                for (idx, (param_ty, name)) in self.params.iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    let param_ty = cu.add_import(*param_ty);
                    out.push_str(&format!("{param_ty} {name}"));
                }
                out.push(')');
                if self.is_abstract {
                    out.push(';');
                } else {
                    out.push_str(" {");
                    out.push_str(sep);
                    if let Some(value) = self.ty.and_then(|ty| default_value(b, ty)) {
                        out.push_str(&format!("{indent}{unit}return {value};{sep}"));
                    }
                    out.push_str(indent);
                    out.push('}');
                }
            }
        }
        out
    }
}

/// `0`, `false` or `null`; nothing for `void`.
pub fn default_value(b: &BindingTable, ty: TypeId) -> Option<&'static str> {
    let wk = b.well_known();
    if ty == wk.void {
        None
    } else if ty == wk.boolean {
        Some("false")
    } else if b.is_primitive(ty) {
        Some("0")
    } else {
        Some("null")
    }
}

/// End of a member, past the `;` closing an enum constant list.
fn member_end(tree: &SyntaxTree, member: NodeId, limit: usize) -> usize {
    let end = tree.range(member).end;
    if tree.kind(member) != SyntaxKind::EnumConstantDeclaration {
        return end;
    }
    let after = text::skip_whitespace_forward(tree.text(), end);
    if after < limit && tree.text()[after..].starts_with(';') {
        after + 1
    } else {
        end
    }
}

/// Offset of the `{` opening the body of `decl`.
fn body_open(tree: &SyntaxTree, decl: NodeId) -> Option<usize> {
    let range = tree.range(decl);
    if tree.kind(decl) == SyntaxKind::AnonymousClassDeclaration {
        return Some(range.start);
    }
    let header_end = tree
        .children(decl)
        .iter()
        .filter(|child| matches!(tree.role(**child), Role::Name | Role::Type))
        .map(|child| tree.range(*child).end)
        .max()
        .unwrap_or(range.start);
    tree.text()[header_end..range.end]
        .find('{')
        .map(|idx| header_end + idx)
}

/// Where to insert `declaration` and the text to insert: methods and constructors after the last
/// member with a blank line, fields after the last field, attributes after the last member.
fn insertion(
    tree: &SyntaxTree,
    decl: NodeId,
    kind: StubKind,
    indent: &str,
    sep: &str,
    declaration: &str,
) -> Option<(usize, String)> {
    let open = body_open(tree, decl)?;
    let close = tree.range(decl).end.checked_sub(1)?;
    let members: Vec<NodeId> = tree.children_with_role(decl, Role::Member).collect();
    let last_end = |nodes: &[NodeId]| nodes.last().map(|last| member_end(tree, *last, close));

    let placed = match kind {
        StubKind::Field => {
            let fields: Vec<NodeId> = members
                .iter()
                .copied()
                .filter(|m| {
                    matches!(
                        tree.kind(*m),
                        SyntaxKind::FieldDeclaration | SyntaxKind::EnumConstantDeclaration
                    )
                })
                .collect();
            match last_end(&fields) {
                Some(end) => (end, format!("{sep}{indent}{declaration}")),
                None if members.is_empty() => (open + 1, format!("{sep}{indent}{declaration}")),
                None => (open + 1, format!("{sep}{indent}{declaration}{sep}")),
            }
        }
        StubKind::AnnotationAttribute => match last_end(&members) {
            Some(end) => (end, format!("{sep}{indent}{declaration}")),
            None => (open + 1, format!("{sep}{indent}{declaration}")),
        },
        StubKind::Method | StubKind::Constructor => match last_end(&members) {
            Some(end) => (end, format!("{sep}{sep}{indent}{declaration}")),
            None => (open + 1, format!("{sep}{indent}{declaration}")),
        },
    };
    Some(placed)
}
