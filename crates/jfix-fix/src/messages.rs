//! User-visible labels of fixes and edit groups.

pub const CHANGE_CODE_STYLE: &str = "Change code style";
pub const QUALIFY_FIELD_WITH_DECLARING_CLASS: &str = "Qualify field access with declaring class";
pub const QUALIFY_METHOD_WITH_DECLARING_CLASS: &str = "Qualify method call with declaring class";
pub const REMOVE_THIS_QUALIFIER: &str = "Remove 'this' qualifier";
pub const CHANGE_ACCESS_USING_DECLARING: &str = "Change access using declaring type";

pub fn qualify_with_this(name: &str, qualifier: Option<&str>) -> String {
    match qualifier {
        Some(qualifier) => format!("Qualify '{name}' with '{qualifier}.this'"),
        None => format!("Qualify '{name}' with 'this'"),
    }
}

pub fn change_access_to_static(accessor: &str) -> String {
    format!("Change access to static using '{accessor}' (declaring type)")
}

pub fn change_access_to_static_using_instance_type(accessor: &str) -> String {
    format!("Change access to static using '{accessor}' (instance type)")
}

pub fn change_indirect_access_to_static(accessor: &str) -> String {
    format!("Change indirect access to static using '{accessor}'")
}

pub fn create_method(signature: &str, ty: &str) -> String {
    format!("Create method '{signature}' in type '{ty}'")
}

pub fn create_constructor(signature: &str) -> String {
    format!("Create constructor '{signature}'")
}

pub fn create_field(name: &str, ty: &str) -> String {
    format!("Create field '{name}' in type '{ty}'")
}

pub fn create_attribute(name: &str, annotation: &str) -> String {
    format!("Create attribute '{name}' in annotation '{annotation}'")
}

pub fn remove_arguments(count: usize, signature: &str) -> String {
    if count == 1 {
        format!("Remove argument to match '{signature}'")
    } else {
        format!("Remove arguments to match '{signature}'")
    }
}

pub fn add_arguments(count: usize, signature: &str) -> String {
    if count == 1 {
        format!("Add argument to match '{signature}'")
    } else {
        format!("Add arguments to match '{signature}'")
    }
}

pub fn swap_arguments(first: &str, second: &str) -> String {
    format!("Swap arguments '{first}' and '{second}'")
}

pub fn change_signature(is_constructor: bool, old: &str, new: &str) -> String {
    let what = if is_constructor { "constructor" } else { "method" };
    format!("Change {what} '{old}' to '{new}'")
}
