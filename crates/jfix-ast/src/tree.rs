use std::fmt;

use jfix_core::{FileId, TextRange};
use smol_str::SmolStr;
use thiserror::Error;

use crate::bindings::{Binding, TypeId};
use crate::syntax::{Modifiers, Role, SyntaxKind};

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: SyntaxKind,
    pub range: TextRange,
    pub parent: Option<NodeId>,
    pub role: Role,
    pub children: Vec<NodeId>,
    /// Identifier for names and declarations, operator for infix/prefix/assignment nodes,
    /// dotted name for package and import declarations.
    pub identifier: Option<SmolStr>,
    pub binding: Option<Binding>,
    /// Resolved static type of an expression.
    pub type_binding: Option<TypeId>,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportInfo {
    pub node: NodeId,
    /// Dotted name without the trailing `.*` of on-demand imports.
    pub name: String,
    pub is_static: bool,
    pub on_demand: bool,
}

impl ImportInfo {
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// A resolved syntax tree for one compilation unit.
///
/// Node ids are dense indices into an arena. Children are stored in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    file: FileId,
    text: String,
    nodes: Vec<Node>,
}

impl SyntaxTree {
    pub fn file(&self) -> &FileId {
        &self.file
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.idx() < self.nodes.len()
    }

    /// Panics when `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.idx()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.idx())
    }

    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.node(id).kind
    }

    pub fn range(&self, id: NodeId) -> TextRange {
        self.node(id).range
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn role(&self, id: NodeId) -> Role {
        self.node(id).role
    }

    pub fn binding(&self, id: NodeId) -> Option<Binding> {
        self.node(id).binding
    }

    pub fn type_binding(&self, id: NodeId) -> Option<TypeId> {
        self.node(id).type_binding
    }

    pub fn identifier(&self, id: NodeId) -> Option<&str> {
        self.node(id).identifier.as_deref()
    }

    pub fn source(&self, id: NodeId) -> &str {
        let range = self.range(id);
        &self.text[range.start..range.end]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// First child with `role`.
    pub fn child(&self, id: NodeId, role: Role) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self.role(*child) == role)
    }

    pub fn children_with_role(&self, id: NodeId, role: Role) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |child| self.role(*child) == role)
    }

    /// Strict ancestors, innermost first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |n| self.parent(*n))
    }

    /// `true` when `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|n| n == ancestor)
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// All nodes in pre-order.
    pub fn preorder(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![self.root()];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.children(id).iter().rev().copied());
            Some(id)
        })
    }

    /// Innermost enclosing type body (`TypeDeclaration` or anonymous class body), excluding
    /// `id` itself.
    pub fn enclosing_type_body(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id).find(|n| self.kind(*n).is_type_body())
    }

    /// Binding of the innermost enclosing type body.
    pub fn enclosing_type(&self, id: NodeId) -> Option<TypeId> {
        let body = self.enclosing_type_body(id)?;
        match self.binding(body)? {
            Binding::Type(ty) => Some(ty),
            _ => None,
        }
    }

    /// Innermost enclosing node of `kind`, excluding `id` itself.
    pub fn enclosing(&self, id: NodeId, kind: SyntaxKind) -> Option<NodeId> {
        self.ancestors(id).find(|n| self.kind(*n) == kind)
    }

    /// Statement containing `id` (or `id` itself when it is a statement). Never crosses a body
    /// declaration, so expressions in field initializers have no statement.
    pub fn enclosing_statement(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            if self.kind(current).is_statement() {
                return Some(current);
            }
            current = self.parent(current)?;
            if self.kind(current).is_body_declaration() {
                return None;
            }
        }
    }

    /// Innermost node covering the whole of `range`, or `None` when the range lies outside
    /// the unit.
    pub fn covering_node(&self, range: TextRange) -> Option<NodeId> {
        let mut current = self.root();
        if !self.range(current).covers(range) {
            return None;
        }
        'descend: loop {
            for child in self.children(current) {
                if self.range(*child).covers(range) {
                    current = *child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }

    /// Declaration node (type, method, fragment, parameter, enum constant) carrying `binding`.
    pub fn find_declaration(&self, binding: Binding) -> Option<NodeId> {
        self.preorder().find(|n| {
            let node = self.node(*n);
            node.binding == Some(binding)
                && matches!(
                    node.kind,
                    SyntaxKind::TypeDeclaration
                        | SyntaxKind::AnonymousClassDeclaration
                        | SyntaxKind::MethodDeclaration
                        | SyntaxKind::AnnotationTypeMemberDeclaration
                        | SyntaxKind::VariableDeclarationFragment
                        | SyntaxKind::SingleVariableDeclaration
                        | SyntaxKind::EnumConstantDeclaration
                )
        })
    }

    pub fn package(&self) -> Option<&str> {
        let decl = self.child(self.root(), Role::Package)?;
        self.identifier(decl)
    }

    pub fn package_declaration(&self) -> Option<NodeId> {
        self.child(self.root(), Role::Package)
    }

    pub fn imports(&self) -> Vec<ImportInfo> {
        self.children_with_role(self.root(), Role::Import)
            .filter_map(|node| {
                let raw = self.identifier(node)?;
                let (name, on_demand) = match raw.strip_suffix(".*") {
                    Some(prefix) => (prefix.to_string(), true),
                    None => (raw.to_string(), false),
                };
                Some(ImportInfo {
                    node,
                    name,
                    is_static: self.node(node).modifiers.is_static(),
                    on_demand,
                })
            })
            .collect()
    }

    /// Top-level type declarations.
    pub fn types(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children_with_role(self.root(), Role::Member)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("tree has no root node")]
    Empty,
    #[error("node {0:?} was started but never finished")]
    Unfinished(NodeId),
    #[error("finish_node called without an open node")]
    UnbalancedFinish,
    #[error("node {node:?} range {range:?} exceeds the source length {len}")]
    OutOfBounds {
        node: NodeId,
        range: TextRange,
        len: usize,
    },
    #[error("node {node:?} range {range:?} is not inside its parent range {parent:?}")]
    NotNested {
        node: NodeId,
        range: TextRange,
        parent: TextRange,
    },
}

/// Incremental builder for a [`SyntaxTree`].
///
/// Nodes are opened with [`TreeBuilder::start_node`] and closed with
/// [`TreeBuilder::finish_node`]; the first node started becomes the root. Attribute setters act
/// on the innermost open node.
#[derive(Debug)]
pub struct TreeBuilder {
    file: FileId,
    nodes: Vec<Node>,
    stack: Vec<NodeId>,
}

impl TreeBuilder {
    pub fn new(file: FileId) -> Self {
        Self {
            file,
            nodes: Vec::new(),
            stack: Vec::new(),
        }
    }

    pub fn start_node(&mut self, kind: SyntaxKind, role: Role, start: usize) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let parent = self.stack.last().copied();
        self.nodes.push(Node {
            kind,
            range: TextRange::empty(start),
            parent,
            role,
            children: Vec::new(),
            identifier: None,
            binding: None,
            type_binding: None,
            modifiers: Modifiers::NONE,
        });
        if let Some(parent) = parent {
            self.nodes[parent.idx()].children.push(id);
        }
        self.stack.push(id);
        id
    }

    pub fn finish_node(&mut self, end: usize) -> Result<NodeId, TreeError> {
        let id = self.stack.pop().ok_or(TreeError::UnbalancedFinish)?;
        let start = self.nodes[id.idx()].range.start;
        self.nodes[id.idx()].range = TextRange::new(start, end.max(start));
        Ok(id)
    }

    /// Shorthand for a childless node.
    pub fn leaf(&mut self, kind: SyntaxKind, role: Role, range: TextRange) -> NodeId {
        let id = self.start_node(kind, role, range.start);
        // A leaf is finished immediately, so the stack cannot be empty here.
        let _ = self.finish_node(range.end);
        id
    }

    pub fn current(&self) -> Option<NodeId> {
        self.stack.last().copied()
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.idx()]
    }

    pub fn set_identifier(&mut self, id: NodeId, identifier: impl Into<SmolStr>) {
        self.node_mut(id).identifier = Some(identifier.into());
    }

    pub fn set_binding(&mut self, id: NodeId, binding: Binding) {
        self.node_mut(id).binding = Some(binding);
    }

    pub fn set_type_binding(&mut self, id: NodeId, ty: TypeId) {
        self.node_mut(id).type_binding = Some(ty);
    }

    pub fn set_modifiers(&mut self, id: NodeId, modifiers: Modifiers) {
        self.node_mut(id).modifiers = modifiers;
    }

    pub fn finish(self, text: impl Into<String>) -> Result<SyntaxTree, TreeError> {
        if let Some(open) = self.stack.last() {
            return Err(TreeError::Unfinished(*open));
        }
        if self.nodes.is_empty() {
            return Err(TreeError::Empty);
        }

        let text = text.into();
        for (idx, node) in self.nodes.iter().enumerate() {
            let id = NodeId(idx as u32);
            if node.range.end > text.len() {
                return Err(TreeError::OutOfBounds {
                    node: id,
                    range: node.range,
                    len: text.len(),
                });
            }
            if let Some(parent) = node.parent {
                let parent_range = self.nodes[parent.idx()].range;
                if !parent_range.covers(node.range) {
                    return Err(TreeError::NotNested {
                        node: id,
                        range: node.range,
                        parent: parent_range,
                    });
                }
            }
        }

        Ok(SyntaxTree {
            file: self.file,
            text,
            nodes: self.nodes,
        })
    }
}
