use jfix_ast::Project;
use jfix_fix::{Fix, FormatOptions};

mod clean_up;
mod quick_fix;
mod remove_qualifier;

/// Text of the fix's unit after applying the fix.
pub(crate) fn apply(project: &Project, fix: &Fix) -> String {
    let change = fix
        .create_change(project, &FormatOptions::default())
        .expect("fix should materialize");
    let original = project.unit(fix.file()).expect("unit of the fix").text();
    change.apply(original).expect("edits should apply")
}

pub(crate) fn labels(fixes: &[Fix]) -> Vec<&str> {
    fixes.iter().map(Fix::name).collect()
}
