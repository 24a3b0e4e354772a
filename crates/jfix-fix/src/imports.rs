use std::collections::BTreeMap;

use jfix_ast::{BindingTable, ImportInfo, SyntaxTree, TypeId, TypeKind};
use jfix_core::{FileId, TextEdit};

/// Import bookkeeping for one compilation unit.
///
/// [`ImportRewrite::add_import`] returns the name under which a type can be referenced from the
/// unit and records a new single-type import when one is needed.
#[derive(Debug, Clone)]
pub struct ImportRewrite {
    package: Option<String>,
    existing: Vec<ImportInfo>,
    /// Simple names of types declared in the unit.
    local_names: Vec<String>,
    local_types: Vec<TypeId>,
    /// Qualified name → group that requested it, in request order.
    added: BTreeMap<String, usize>,
}

impl ImportRewrite {
    pub fn new(tree: &SyntaxTree, bindings: &BindingTable) -> Self {
        let local_types: Vec<TypeId> = tree
            .preorder()
            .filter(|node| tree.kind(*node) == jfix_ast::SyntaxKind::TypeDeclaration)
            .filter_map(|node| tree.binding(node)?.as_type())
            .collect();
        let local_names = local_types
            .iter()
            .map(|ty| bindings.ty(*ty).name.to_string())
            .collect();
        Self {
            package: tree.package().map(str::to_string),
            existing: tree.imports(),
            local_names,
            local_types,
            added: BTreeMap::new(),
        }
    }

    /// Name to write for `ty` in this unit. `group` tags the import edit, if one is needed.
    pub fn add_import(&mut self, bindings: &BindingTable, ty: TypeId, group: usize) -> String {
        let ty = bindings.erased_type(ty);
        if matches!(bindings.ty(ty).kind, TypeKind::Primitive | TypeKind::Null) {
            return bindings.ty(ty).name.to_string();
        }

        let top = bindings.top_level(ty);
        if self.local_types.contains(&top) {
            return bindings.nested_name(ty);
        }

        let simple = bindings.ty(ty).name.to_string();
        let qualified = bindings.qualified_name(ty);
        let is_top_level = bindings.ty(ty).enclosing.is_none();
        let package = bindings.package_of(ty);

        if is_top_level && (package == Some("java.lang") || package == self.package.as_deref()) {
            if !self.local_names.contains(&simple) && !self.imports_other(&simple, &qualified) {
                return simple;
            }
            return qualified;
        }

        if self
            .existing
            .iter()
            .any(|import| !import.is_static && !import.on_demand && import.name == qualified)
            || self.added.contains_key(&qualified)
        {
            return simple;
        }

        if self.local_names.contains(&simple) || self.imports_other(&simple, &qualified) {
            return qualified;
        }

        let on_demand = self.existing.iter().any(|import| {
            !import.is_static
                && import.on_demand
                && Some(import.name.as_str()) == qualified.rsplit_once('.').map(|(p, _)| p)
        });
        if !on_demand {
            tracing::trace!(target: "jfix.fix", import = %qualified, "adding import");
            self.added.insert(qualified, group);
        }
        simple
    }

    /// Another single-type import (existing or added) already claims `simple`.
    fn imports_other(&self, simple: &str, qualified: &str) -> bool {
        let existing = self.existing.iter().any(|import| {
            !import.is_static
                && !import.on_demand
                && import.simple_name() == simple
                && import.name != qualified
        });
        let added = self.added.keys().any(|name| {
            name != qualified && name.rsplit('.').next() == Some(simple)
        });
        existing || added
    }

    pub fn added(&self) -> impl Iterator<Item = &str> {
        self.added.keys().map(String::as_str)
    }

    pub fn has_changes(&self) -> bool {
        !self.added.is_empty()
    }

    /// One insert edit per added import, tagged with the requesting group.
    ///
    /// Imports go after the last existing import, else after the package declaration, else at
    /// the top of the unit.
    pub fn create_edits(&self, tree: &SyntaxTree, sep: &str) -> Vec<(usize, TextEdit)> {
        let file: &FileId = tree.file();
        let last_import = self.existing.last().map(|import| tree.range(import.node).end);
        let package_end = tree.package_declaration().map(|node| tree.range(node).end);

        let mut edits = Vec::new();
        for (idx, (name, group)) in self.added.iter().enumerate() {
            let (offset, text) = match (last_import, package_end) {
                (Some(end), _) => (end, format!("{sep}import {name};")),
                (None, Some(end)) if idx == 0 => (end, format!("{sep}{sep}import {name};")),
                (None, Some(end)) => (end, format!("{sep}import {name};")),
                (None, None) if idx + 1 == self.added.len() => {
                    (0, format!("import {name};{sep}{sep}"))
                }
                (None, None) => (0, format!("import {name};{sep}")),
            };
            edits.push((*group, TextEdit::insert(file.clone(), offset, text)));
        }
        edits
    }
}
