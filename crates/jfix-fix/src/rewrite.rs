//! Staged, tree-aware rewriting of one compilation unit.
//!
//! Operations record node-level changes into an [`AstRewrite`]; nothing touches the source
//! until [`CompilationUnitRewrite::into_change`] renders the changes into text edits. A change
//! on a node swallows the changes recorded on its descendants: they are rendered into the
//! replacement text instead of producing edits of their own, so a moved node carries the
//! rewrites made inside it.

use std::collections::BTreeMap;

use jfix_ast::{BindingTable, NodeId, Project, Role, SyntaxKind, SyntaxTree, TypeId};
use jfix_core::{apply_text_edits, text, FileId, TextEdit, TextRange, WorkspaceEdit};

use crate::imports::ImportRewrite;
use crate::options::FormatOptions;
use crate::FixError;

/// Replacement text for a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Template {
    Text(String),
    /// The original source of a node, with the rewrites of its descendants applied.
    Node(NodeId),
    Concat(Vec<Template>),
}

impl Template {
    pub fn text(text: impl Into<String>) -> Self {
        Template::Text(text.into())
    }

    pub fn node(node: NodeId) -> Self {
        Template::Node(node)
    }

    pub fn concat(parts: impl IntoIterator<Item = Template>) -> Self {
        Template::Concat(parts.into_iter().collect())
    }
}

#[derive(Clone, Debug)]
enum Change {
    Replace(Template),
    Remove,
    /// Replace a non-block statement with a block holding the hoisted statements followed by
    /// the original statement.
    WrapInBlock(Vec<Template>),
}

#[derive(Clone, Debug)]
struct Recorded {
    change: Change,
    group: usize,
}

#[derive(Debug)]
struct Pending {
    range: TextRange,
    text: String,
    group: usize,
}

/// Node-level change buffer for one tree.
#[derive(Clone, Debug, Default)]
pub struct AstRewrite {
    changes: BTreeMap<NodeId, Recorded>,
    /// Statements inserted before a statement of a block.
    inserts_before: BTreeMap<NodeId, Vec<(Template, usize)>>,
    /// Free text insertions (member stubs, parameters).
    raw_inserts: Vec<(usize, String, usize)>,
}

impl AstRewrite {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.inserts_before.is_empty() && self.raw_inserts.is_empty()
    }

    pub fn is_changed(&self, node: NodeId) -> bool {
        self.changes.contains_key(&node)
    }
}

struct Renderer<'r> {
    tree: &'r SyntaxTree,
    rewrite: &'r AstRewrite,
    sep: &'r str,
    indent_unit: String,
}

impl Renderer<'_> {
    fn collect_children(&self, node: NodeId, out: &mut Vec<Pending>) -> Result<(), FixError> {
        for child in self.tree.children(node) {
            self.collect_node(*child, out)?;
        }
        Ok(())
    }

    fn collect_node(&self, node: NodeId, out: &mut Vec<Pending>) -> Result<(), FixError> {
        let start = self.tree.range(node).start;
        // One edit for all hoisted statements: identical inserts would be deduplicated.
        if let Some(inserts) = self.rewrite.inserts_before.get(&node) {
            let indent = text::line_indent(self.tree.text(), start);
            let mut text = String::new();
            for (template, _) in inserts {
                text.push_str(&self.render(template)?);
                text.push_str(self.sep);
                text.push_str(indent);
            }
            out.push(Pending {
                range: TextRange::empty(start),
                text,
                group: inserts.first().map_or(0, |(_, group)| *group),
            });
        }
        match self.rewrite.changes.get(&node) {
            Some(recorded) => out.push(self.render_change(node, recorded)?),
            None => self.collect_children(node, out)?,
        }
        Ok(())
    }

    fn render_change(&self, node: NodeId, recorded: &Recorded) -> Result<Pending, FixError> {
        let tree = self.tree;
        let (range, text) = match &recorded.change {
            Change::Replace(template) => (tree.range(node), self.render(template)?),
            Change::Remove => (self.removal_range(node), String::new()),
            Change::WrapInBlock(hoisted) => {
                let source = tree.text();
                let anchor = tree.parent(node).unwrap_or(node);
                let outer = text::line_indent(source, tree.range(anchor).start);
                let inner = format!("{outer}{}", self.indent_unit);
                let start = text::skip_whitespace_backward(source, tree.range(node).start);

                let mut out = String::from(" {");
                out.push_str(self.sep);
                for statement in hoisted {
                    out.push_str(&inner);
                    out.push_str(&self.render(statement)?);
                    out.push_str(self.sep);
                }
                out.push_str(&inner);
                out.push_str(&self.render_original(node)?);
                out.push_str(self.sep);
                out.push_str(outer);
                out.push('}');
                (TextRange::new(start, tree.range(node).end), out)
            }
        };
        Ok(Pending {
            range,
            text,
            group: recorded.group,
        })
    }

    /// Removing a receiver takes the following `.` with it; removing a list element takes one
    /// adjacent comma.
    fn removal_range(&self, node: NodeId) -> TextRange {
        let tree = self.tree;
        let source = tree.text();
        let range = tree.range(node);
        let Some(parent) = tree.parent(node) else {
            return range;
        };

        match tree.role(node) {
            Role::Expression if tree.kind(parent) == SyntaxKind::MethodInvocation => {
                let after = text::skip_whitespace_forward(source, range.end);
                if source[after..].starts_with('.') {
                    let end = text::skip_whitespace_forward(source, after + 1);
                    return TextRange::new(range.start, end);
                }
                range
            }
            role @ (Role::Argument | Role::Parameter) => {
                let siblings: Vec<NodeId> = tree.children_with_role(parent, role).collect();
                let idx = siblings.iter().position(|s| *s == node).unwrap_or(0);
                if let Some(next) = siblings.get(idx + 1) {
                    TextRange::new(range.start, tree.range(*next).start)
                } else if idx > 0 {
                    TextRange::new(tree.range(siblings[idx - 1]).end, range.end)
                } else {
                    range
                }
            }
            _ => range,
        }
    }

    fn render(&self, template: &Template) -> Result<String, FixError> {
        match template {
            Template::Text(text) => Ok(text.clone()),
            Template::Node(node) => self.render_original(*node),
            Template::Concat(parts) => {
                let mut out = String::new();
                for part in parts {
                    out.push_str(&self.render(part)?);
                }
                Ok(out)
            }
        }
    }

    fn render_original(&self, node: NodeId) -> Result<String, FixError> {
        if !self.tree.contains(node) {
            return Err(FixError::StaleNode {
                file: self.tree.file().clone(),
                node,
            });
        }
        let base = self.tree.range(node);
        let mut pending = Vec::new();
        self.collect_children(node, &mut pending)?;
        let edits: Vec<TextEdit> = pending
            .into_iter()
            .map(|p| {
                TextEdit::replace(
                    self.tree.file().clone(),
                    TextRange::new(p.range.start - base.start, p.range.end - base.start),
                    p.text,
                )
            })
            .collect();
        Ok(apply_text_edits(self.tree.source(node), &edits)?)
    }
}

/// A labelled group of edits, one per rewrite operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditGroup {
    pub description: String,
    pub edits: Vec<TextEdit>,
}

/// The materialized result of a fix for one unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilationUnitChange {
    pub name: String,
    pub file: FileId,
    /// All edits, normalized.
    pub edit: WorkspaceEdit,
    pub groups: Vec<EditGroup>,
}

impl CompilationUnitChange {
    pub fn is_empty(&self) -> bool {
        self.edit.is_empty()
    }

    pub fn apply(&self, original: &str) -> Result<String, FixError> {
        Ok(apply_text_edits(original, &self.edit.edits)?)
    }
}

/// A rewrite session over one compilation unit.
///
/// The session owns the change buffer and the import rewrite. Operations mutate it through
/// `&mut`, so one unit is never rewritten by two sessions at once.
pub struct CompilationUnitRewrite<'a> {
    project: &'a Project,
    tree: &'a SyntaxTree,
    format: &'a FormatOptions,
    rewrite: AstRewrite,
    imports: ImportRewrite,
    groups: Vec<String>,
}

impl<'a> CompilationUnitRewrite<'a> {
    pub fn new(
        project: &'a Project,
        file: &FileId,
        format: &'a FormatOptions,
    ) -> Result<Self, FixError> {
        let tree = project
            .unit(file)
            .ok_or_else(|| FixError::UnknownUnit(file.clone()))?;
        Ok(Self {
            project,
            tree,
            format,
            rewrite: AstRewrite::default(),
            imports: ImportRewrite::new(tree, project.bindings()),
            groups: Vec::new(),
        })
    }

    pub fn project(&self) -> &'a Project {
        self.project
    }

    pub fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }

    pub fn bindings(&self) -> &'a BindingTable {
        self.project.bindings()
    }

    pub fn format(&self) -> &'a FormatOptions {
        self.format
    }

    pub fn line_separator(&self) -> &'a str {
        self.format.line_separator(self.tree.text())
    }

    /// Starts a new edit group; subsequent changes are attributed to it.
    pub fn begin_group(&mut self, description: impl Into<String>) {
        self.groups.push(description.into());
    }

    fn group(&mut self) -> usize {
        if self.groups.is_empty() {
            self.groups.push(String::new());
        }
        self.groups.len() - 1
    }

    fn check(&self, node: NodeId) -> Result<(), FixError> {
        if self.tree.contains(node) {
            Ok(())
        } else {
            Err(FixError::StaleNode {
                file: self.tree.file().clone(),
                node,
            })
        }
    }

    fn record(&mut self, node: NodeId, change: Change) -> Result<(), FixError> {
        self.check(node)?;
        if self.rewrite.changes.contains_key(&node) {
            return Err(FixError::ConflictingChange {
                file: self.tree.file().clone(),
                node,
            });
        }
        let group = self.group();
        self.rewrite.changes.insert(node, Recorded { change, group });
        Ok(())
    }

    pub fn replace(&mut self, node: NodeId, template: Template) -> Result<(), FixError> {
        self.record(node, Change::Replace(template))
    }

    pub fn remove(&mut self, node: NodeId) -> Result<(), FixError> {
        self.record(node, Change::Remove)
    }

    pub fn insert_text(&mut self, offset: usize, text: impl Into<String>) {
        let group = self.group();
        self.rewrite.raw_inserts.push((offset, text.into(), group));
    }

    /// Inserts `statement` (without trailing separator) before `stmt`.
    ///
    /// When `stmt` is not directly inside a block, it is wrapped into a new block the first
    /// time; later extractions before the same statement append to that block.
    pub fn extract_before(&mut self, stmt: NodeId, statement: Template) -> Result<(), FixError> {
        self.check(stmt)?;
        let group = self.group();
        let in_list = self.tree.parent(stmt).is_some_and(|parent| {
            matches!(
                self.tree.kind(parent),
                SyntaxKind::Block | SyntaxKind::SwitchStatement
            )
        });
        if in_list {
            self.rewrite
                .inserts_before
                .entry(stmt)
                .or_default()
                .push((statement, group));
            return Ok(());
        }

        match self.rewrite.changes.get_mut(&stmt) {
            Some(Recorded {
                change: Change::WrapInBlock(hoisted),
                ..
            }) => {
                hoisted.push(statement);
                Ok(())
            }
            Some(_) => Err(FixError::ConflictingChange {
                file: self.tree.file().clone(),
                node: stmt,
            }),
            None => {
                tracing::trace!(target: "jfix.fix", ?stmt, "wrapping statement into a new block");
                self.rewrite.changes.insert(
                    stmt,
                    Recorded {
                        change: Change::WrapInBlock(vec![statement]),
                        group,
                    },
                );
                Ok(())
            }
        }
    }

    /// Name to reference `ty` by, adding an import when needed.
    pub fn add_import(&mut self, ty: TypeId) -> String {
        let group = self.group();
        self.imports.add_import(self.project.bindings(), ty, group)
    }

    pub fn is_changed(&self, node: NodeId) -> bool {
        self.rewrite.is_changed(node)
    }

    /// Renders every staged change into text edits.
    pub fn into_change(self, name: impl Into<String>) -> Result<CompilationUnitChange, FixError> {
        let tree = self.tree;
        let file = tree.file().clone();
        let sep = self.line_separator();
        let renderer = Renderer {
            tree,
            rewrite: &self.rewrite,
            sep,
            indent_unit: self.format.indent_unit(),
        };

        let mut pending = Vec::new();
        renderer.collect_node(tree.root(), &mut pending)?;

        let mut groups: Vec<EditGroup> = self
            .groups
            .iter()
            .map(|description| EditGroup {
                description: description.clone(),
                edits: Vec::new(),
            })
            .collect();
        if groups.is_empty() {
            groups.push(EditGroup {
                description: String::new(),
                edits: Vec::new(),
            });
        }

        for p in pending {
            groups[p.group]
                .edits
                .push(TextEdit::replace(file.clone(), p.range, p.text));
        }
        for (offset, text, group) in &self.rewrite.raw_inserts {
            groups[*group]
                .edits
                .push(TextEdit::insert(file.clone(), *offset, text.clone()));
        }
        for (group, edit) in self.imports.create_edits(tree, sep) {
            groups[group].edits.push(edit);
        }

        let mut edit = WorkspaceEdit::new(
            groups
                .iter()
                .flat_map(|group| group.edits.iter().cloned())
                .collect(),
        );
        edit.normalize()?;

        Ok(CompilationUnitChange {
            name: name.into(),
            file,
            edit,
            groups,
        })
    }
}
