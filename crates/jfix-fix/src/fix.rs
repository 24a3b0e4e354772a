//! Fixes and the quick-fix entry points for single problems.

use jfix_ast::{
    Binding, FileId, ProblemKind, ProblemLocation, Project, Role, SyntaxKind, SyntaxTree,
};

use crate::code_style::this_qualifier;
use crate::imports::ImportRewrite;
use crate::messages;
use crate::operation::{RewriteOperation, StaticAccessKind};
use crate::options::FormatOptions;
use crate::preview::{generate_preview, FixPreview};
use crate::rewrite::{CompilationUnitChange, CompilationUnitRewrite};
use crate::static_access::to_static_access_operations;
use crate::FixError;

/// A named, non-empty set of operations on one compilation unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fix {
    name: String,
    file: FileId,
    operations: Vec<RewriteOperation>,
}

impl Fix {
    /// `None` when there is nothing to do.
    pub fn new(
        name: impl Into<String>,
        file: FileId,
        operations: Vec<RewriteOperation>,
    ) -> Option<Self> {
        if operations.is_empty() {
            return None;
        }
        Some(Self {
            name: name.into(),
            file,
            operations,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file(&self) -> &FileId {
        &self.file
    }

    pub fn operations(&self) -> &[RewriteOperation] {
        &self.operations
    }

    /// Runs every operation in one rewrite session and renders the edits.
    pub fn create_change(
        &self,
        project: &Project,
        format: &FormatOptions,
    ) -> Result<CompilationUnitChange, FixError> {
        let mut cu = CompilationUnitRewrite::new(project, &self.file, format)?;
        for operation in &self.operations {
            operation.rewrite(&mut cu)?;
        }
        cu.into_change(self.name.clone())
    }

    pub fn preview(
        &self,
        project: &Project,
        format: &FormatOptions,
    ) -> Result<FixPreview, FixError> {
        let change = self.create_change(project, format)?;
        let original = project
            .unit(&self.file)
            .ok_or_else(|| FixError::UnknownUnit(self.file.clone()))?
            .text();
        generate_preview(&change, original)
    }
}

/// Materializes each fix on its own. A failing fix is logged and reported without affecting
/// the others.
pub fn apply_fixes(
    project: &Project,
    fixes: &[Fix],
    format: &FormatOptions,
) -> Vec<Result<CompilationUnitChange, FixError>> {
    fixes
        .iter()
        .map(|fix| {
            let result = fix.create_change(project, format);
            if let Err(err) = &result {
                tracing::warn!(
                    target: "jfix.fix",
                    fix = %fix.name,
                    file = %fix.file,
                    error = %err,
                    "fix failed"
                );
            }
            result
        })
        .collect()
}

fn unit<'p>(project: &'p Project, file: &FileId) -> Option<&'p SyntaxTree> {
    let tree = project.unit(file);
    if tree.is_none() {
        tracing::debug!(target: "jfix.fix", %file, "no such unit");
    }
    tree
}

/// Quick fix for an unqualified field access: `count` → `this.count`.
pub fn create_add_field_qualifier_fix(
    project: &Project,
    file: &FileId,
    problem: &ProblemLocation,
) -> Option<Fix> {
    if problem.kind != ProblemKind::UnqualifiedFieldAccess {
        return None;
    }
    let b = project.bindings();
    let tree = unit(project, file)?;
    let mut name = problem.covering_node(tree)?;
    if tree.kind(name) == SyntaxKind::QualifiedName {
        while let Some(qualifier) = tree.child(name, Role::Qualifier) {
            name = qualifier;
        }
    }
    if tree.kind(name) != SyntaxKind::SimpleName {
        return None;
    }
    let Some(Binding::Variable(var)) = tree.binding(name) else {
        return None;
    };
    let field = b.variable(var);
    if !field.is_field() || field.modifiers.is_static() {
        return None;
    }
    let declaring = field.declaring?;

    let mut imports = ImportRewrite::new(tree, b);
    let qualifier = this_qualifier(b, &mut imports, tree, declaring, name)?;
    let qualifier = (!qualifier.is_empty()).then_some(qualifier);
    let label = messages::qualify_with_this(&field.name, qualifier.as_deref());
    Fix::new(
        label,
        file.clone(),
        vec![RewriteOperation::AddThisQualifier {
            name,
            identifier: field.name.clone(),
            qualifier,
        }],
    )
}

/// Quick fixes for a static member reached through an instance: one qualifying with the
/// declaring type and, when it differs, one qualifying with the instance type.
pub fn create_non_static_access_fixes(
    project: &Project,
    file: &FileId,
    problem: &ProblemLocation,
) -> Vec<Fix> {
    if !problem.kind.is_non_static_access() {
        return Vec::new();
    }
    let Some(tree) = unit(project, file) else {
        return Vec::new();
    };
    to_static_access_operations(project, tree, problem, false)
        .into_iter()
        .filter_map(|operation| {
            let label = match &operation {
                RewriteOperation::ToStaticAccess {
                    accessor,
                    kind: StaticAccessKind::Instance,
                    ..
                } => messages::change_access_to_static_using_instance_type(accessor),
                RewriteOperation::ToStaticAccess { accessor, .. } => {
                    messages::change_access_to_static(accessor)
                }
                _ => return None,
            };
            Fix::new(label, file.clone(), vec![operation])
        })
        .collect()
}

/// Quick fix for a static member reached through a subtype: `Sub.MAX` → `Base.MAX`.
pub fn create_indirect_access_to_static_fix(
    project: &Project,
    file: &FileId,
    problem: &ProblemLocation,
) -> Option<Fix> {
    if !problem.kind.is_indirect_static_access() {
        return None;
    }
    let tree = unit(project, file)?;
    let operation = to_static_access_operations(project, tree, problem, false)
        .into_iter()
        .next()?;
    let RewriteOperation::ToStaticAccess { accessor, .. } = &operation else {
        return None;
    };
    let label = messages::change_indirect_access_to_static(accessor);
    Fix::new(label, file.clone(), vec![operation])
}
