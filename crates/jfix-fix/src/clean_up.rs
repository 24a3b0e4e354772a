//! Whole-unit clean-ups.

use jfix_ast::{FileId, ProblemLocation, Project};

use crate::fix::{create_add_field_qualifier_fix, Fix};
use crate::messages;
use crate::operation::RewriteOperation;
use crate::options::CodeStyleOptions;
use crate::pattern::{DetectContext, Pattern};
use crate::static_access::resolve_static_accesses;

/// Code-style clean-up of one unit. `problems` are the compiler problems of the unit; only the
/// static-access ones are used. `None` when every flag is off or nothing matches.
pub fn create_clean_up(
    project: &Project,
    file: &FileId,
    problems: &[ProblemLocation],
    options: CodeStyleOptions,
) -> Option<Fix> {
    if !options.any() {
        return None;
    }
    let tree = project.unit(file)?;
    let cx = DetectContext {
        project,
        tree,
        problems,
        options,
    };
    let mut operations = Vec::new();
    for pattern in Pattern::ALL {
        pattern.detect(&cx, &mut operations);
    }
    tracing::debug!(
        target: "jfix.fix",
        %file,
        operations = operations.len(),
        "code style clean-up"
    );
    Fix::new(messages::CHANGE_CODE_STYLE, file.clone(), operations)
}

/// Clean-up driven by a set of problems: `this` qualifiers for unqualified field accesses, and
/// static-access conversions.
pub fn create_clean_up_for_problems(
    project: &Project,
    file: &FileId,
    problems: &[ProblemLocation],
    add_this_qualifier: bool,
    change_non_static_access: bool,
    change_indirect_access: bool,
) -> Option<Fix> {
    if !add_this_qualifier && !change_non_static_access && !change_indirect_access {
        return None;
    }
    let tree = project.unit(file)?;
    let mut operations: Vec<RewriteOperation> = Vec::new();
    if add_this_qualifier {
        let additions = problems
            .iter()
            .filter_map(|problem| create_add_field_qualifier_fix(project, file, problem))
            .flat_map(|fix| fix.operations().to_vec());
        for operation in additions {
            if operations.iter().all(|op| op.target() != operation.target()) {
                operations.push(operation);
            }
        }
    }
    resolve_static_accesses(
        project,
        tree,
        problems,
        change_non_static_access,
        change_indirect_access,
        &mut operations,
    );
    Fix::new(messages::CHANGE_CODE_STYLE, file.clone(), operations)
}
