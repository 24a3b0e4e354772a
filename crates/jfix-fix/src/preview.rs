use similar::TextDiff;

use jfix_ast::FileId;

use crate::rewrite::CompilationUnitChange;
use crate::FixError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixPreview {
    pub file: FileId,
    pub name: String,
    pub original: String,
    pub modified: String,
    pub unified_diff: String,
    pub edit_count: usize,
}

/// Applies `change` to `original` and renders a unified diff of the result.
pub fn generate_preview(
    change: &CompilationUnitChange,
    original: &str,
) -> Result<FixPreview, FixError> {
    let modified = change.apply(original)?;
    let unified_diff = if modified == original {
        String::new()
    } else {
        TextDiff::from_lines(original, modified.as_str())
            .unified_diff()
            .context_radius(3)
            .header(
                &format!("a/{}", change.file),
                &format!("b/{}", change.file),
            )
            .to_string()
    };
    Ok(FixPreview {
        file: change.file.clone(),
        name: change.name.clone(),
        original: original.to_string(),
        modified,
        unified_diff,
        edit_count: change.edit.edits.len(),
    })
}
