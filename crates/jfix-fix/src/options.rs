use serde::{Deserialize, Serialize};

/// Code-style clean-up switches. Every switch is off by default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeStyleOptions {
    /// `count` → `this.count`
    pub qualify_field_access: bool,
    /// `MAX` → `E.MAX`
    pub qualify_static_field_access: bool,
    /// `foo()` → `this.foo()`
    pub qualify_method_access: bool,
    /// `create()` → `E.create()`
    pub qualify_static_method_access: bool,
    /// `this.count` → `count`
    pub remove_field_qualifier: bool,
    /// `this.foo()` → `foo()`
    pub remove_method_qualifier: bool,
    /// `e.MAX` → `E.MAX`
    pub change_non_static_access_to_static: bool,
    /// `Sub.MAX` → `Base.MAX`
    pub change_indirect_static_access_to_direct: bool,
}

impl CodeStyleOptions {
    pub fn any(&self) -> bool {
        self.any_qualify() || self.any_remove() || self.any_static_access()
    }

    pub fn any_qualify(&self) -> bool {
        self.qualify_field_access
            || self.qualify_static_field_access
            || self.qualify_method_access
            || self.qualify_static_method_access
    }

    pub fn any_remove(&self) -> bool {
        self.remove_field_qualifier || self.remove_method_qualifier
    }

    pub fn any_static_access(&self) -> bool {
        self.change_non_static_access_to_static || self.change_indirect_static_access_to_direct
    }
}

/// Layout of generated code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    pub indent_width: usize,
    pub use_tabs: bool,
    /// `None` keeps the separator already used by the unit.
    pub line_separator: Option<String>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent_width: 4,
            use_tabs: false,
            line_separator: None,
        }
    }
}

impl FormatOptions {
    /// One level of indentation.
    pub fn indent_unit(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.indent_width)
        }
    }

    pub fn line_separator<'a>(&'a self, text: &str) -> &'a str {
        match &self.line_separator {
            Some(sep) => sep,
            None => jfix_core::text::line_separator(text),
        }
    }
}
