//! Parameter names for synthesized declarations.

use jfix_ast::{Binding, BindingTable, NodeId, Role, SyntaxKind, SyntaxTree, TypeId};

const KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "null", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "true", "try", "void", "volatile", "while",
];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// `Introspector.decapitalize`: `Name` → `name`, `URL` stays `URL`.
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    if chars.next().is_some_and(char::is_uppercase) && first.is_uppercase() {
        return name.to_string();
    }
    first.to_lowercase().chain(name.chars().skip(1)).collect()
}

/// `getName` → `name`, `isEmpty` → `empty`, `toString` → `string`; other selectors as is.
fn strip_accessor_prefix(selector: &str) -> String {
    for prefix in ["get", "is", "to"] {
        if let Some(rest) = selector.strip_prefix(prefix) {
            if rest.chars().next().is_some_and(char::is_uppercase) {
                return decapitalize(rest);
            }
        }
    }
    selector.to_string()
}

/// Name derived from a type: first letter for primitives, de-capitalized simple name otherwise.
pub fn name_for_type(b: &BindingTable, ty: TypeId) -> String {
    let ty = b.erased_type(ty);
    let name = &b.ty(ty).name;
    if b.is_primitive(ty) {
        return name.chars().next().map(String::from).unwrap_or_default();
    }
    if name.is_empty() {
        return "o".to_string();
    }
    decapitalize(name)
}

/// Base name suggested for a parameter receiving `arg`, whose (stub) type is `ty`.
pub fn argument_name(tree: &SyntaxTree, b: &BindingTable, arg: NodeId, ty: TypeId) -> String {
    let from_expression = match tree.kind(arg) {
        SyntaxKind::SimpleName => match tree.binding(arg) {
            Some(Binding::Type(_)) => None,
            _ => tree.identifier(arg).map(str::to_string),
        },
        SyntaxKind::QualifiedName | SyntaxKind::FieldAccess | SyntaxKind::SuperFieldAccess => tree
            .child(arg, Role::Name)
            .and_then(|name| tree.identifier(name))
            .map(str::to_string),
        SyntaxKind::MethodInvocation => tree
            .child(arg, Role::Name)
            .and_then(|name| tree.identifier(name))
            .map(strip_accessor_prefix),
        SyntaxKind::ParenthesizedExpression | SyntaxKind::CastExpression => {
            return match tree.child(arg, Role::Expression) {
                Some(inner) if tree.kind(arg) == SyntaxKind::ParenthesizedExpression => {
                    argument_name(tree, b, inner, ty)
                }
                _ => name_for_type(b, ty),
            };
        }
        _ => None,
    };
    from_expression
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| name_for_type(b, ty))
}

/// `base` unless taken (or a keyword), else the first free `base2`, `base3`, …
pub fn unique_name(base: &str, taken: &[String]) -> String {
    let free = |candidate: &str| !is_keyword(candidate) && !taken.iter().any(|t| t == candidate);
    if free(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}{n}"))
        .find(|candidate| free(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Distinct parameter names for `args`, avoiding `reserved`.
pub fn parameter_names(
    tree: &SyntaxTree,
    b: &BindingTable,
    args: &[(NodeId, TypeId)],
    reserved: &[String],
) -> Vec<String> {
    let mut taken: Vec<String> = reserved.to_vec();
    let mut names = Vec::with_capacity(args.len());
    for (arg, ty) in args {
        let name = unique_name(&argument_name(tree, b, *arg, *ty), &taken);
        taken.push(name.clone());
        names.push(name);
    }
    names
}
