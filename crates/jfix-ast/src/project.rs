use std::collections::BTreeMap;

use jfix_core::FileId;

use crate::bindings::{BindingTable, TypeId};
use crate::tree::{NodeId, SyntaxTree};
use crate::Binding;

/// A snapshot of every compilation unit the oracle resolved, sharing one binding table.
#[derive(Debug, Clone, Default)]
pub struct Project {
    bindings: BindingTable,
    units: BTreeMap<FileId, SyntaxTree>,
}

impl Project {
    pub fn new(bindings: BindingTable) -> Self {
        Self {
            bindings,
            units: BTreeMap::new(),
        }
    }

    /// Adds (or replaces) the unit identified by the tree's file id.
    pub fn add_unit(&mut self, tree: SyntaxTree) {
        let file = tree.file().clone();
        if self.units.insert(file.clone(), tree).is_some() {
            tracing::debug!(target: "jfix.ast", file = %file, "replaced compilation unit");
        }
    }

    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    pub fn unit(&self, file: &FileId) -> Option<&SyntaxTree> {
        self.units.get(file)
    }

    pub fn units(&self) -> impl Iterator<Item = &SyntaxTree> {
        self.units.values()
    }

    /// Source unit and declaration node of `ty` (erased), when the type is declared in source.
    pub fn type_declaration(&self, ty: TypeId) -> Option<(&SyntaxTree, NodeId)> {
        let ty = self.bindings.erased_type(ty);
        let file = self.bindings.ty(ty).source_unit.as_ref()?;
        let tree = self.unit(file)?;
        let node = tree.find_declaration(Binding::Type(ty))?;
        Some((tree, node))
    }
}
