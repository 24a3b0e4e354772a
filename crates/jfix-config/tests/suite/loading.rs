use std::io::Write;

use jfix_config::{ConfigError, ConfigWarning, JfixConfig, LoggingConfig};
use jfix_fix::{CodeStyleOptions, FormatOptions};
use pretty_assertions::assert_eq;
use tempfile::{tempdir, NamedTempFile};

#[test]
fn empty_config_uses_defaults() {
    let (config, diagnostics) = JfixConfig::load_from_str_with_diagnostics("").expect("parse");

    assert_eq!(config, JfixConfig::default());
    assert!(!config.code_style_options().any());
    assert_eq!(config.format_options().indent_unit(), "    ");
    assert_eq!(config.logging.level, "info");
    assert!(config.logging.stderr);
    assert!(diagnostics.is_empty());
}

#[test]
fn sections_map_onto_engine_options() {
    let text = r#"
[clean_up]
qualify_field_access = true
change_non_static_access_to_static = true

[format]
indent_width = 2
line_separator = "\r\n"

[logging]
level = "debug"
json = true
"#;

    let config = JfixConfig::load_from_str(text).expect("parse");
    assert_eq!(
        config.code_style_options(),
        CodeStyleOptions {
            qualify_field_access: true,
            change_non_static_access_to_static: true,
            ..CodeStyleOptions::default()
        }
    );
    assert_eq!(
        config.format_options(),
        FormatOptions {
            indent_width: 2,
            use_tabs: false,
            line_separator: Some("\r\n".to_string()),
        }
    );
    assert_eq!(
        config.logging,
        LoggingConfig {
            level: "debug".to_string(),
            json: true,
            stderr: true,
        }
    );
}

#[test]
fn reports_unknown_keys_with_full_paths() {
    let text = r#"
typo = 1

[clean_up]
qualify_feild_access = true

[logging]
colour = false
"#;

    let (config, diagnostics) =
        JfixConfig::load_from_str_with_diagnostics(text).expect("config should parse");

    assert_eq!(
        diagnostics.unknown_keys,
        vec!["clean_up.qualify_feild_access", "logging.colour", "typo"]
    );
    assert!(!config.clean_up.qualify_field_access);
}

#[test]
fn unusable_format_values_fall_back_to_defaults() {
    let text = r#"
[format]
indent_width = 0
line_separator = ";"
"#;

    let (config, diagnostics) =
        JfixConfig::load_from_str_with_diagnostics(text).expect("config should parse");

    assert_eq!(config.format, FormatOptions::default());
    let paths: Vec<&str> = diagnostics
        .warnings
        .iter()
        .map(|warning| match warning {
            ConfigWarning::InvalidValue { toml_path, .. } => toml_path.as_str(),
            other => panic!("unexpected warning {other:?}"),
        })
        .collect();
    assert_eq!(paths, vec!["format.indent_width", "format.line_separator"]);
}

#[test]
fn tabs_do_not_need_an_indent_width() {
    let text = r#"
[format]
use_tabs = true
indent_width = 0
"#;

    let (config, diagnostics) =
        JfixConfig::load_from_str_with_diagnostics(text).expect("config should parse");

    assert_eq!(config.format_options().indent_unit(), "\t");
    assert!(diagnostics.warnings.is_empty());
}

#[test]
fn type_errors_do_not_echo_the_source_line() {
    let text = r#"
[clean_up]
qualify_field_access = "secret-value"
"#;

    let err = JfixConfig::load_from_str(text).expect_err("string is not a bool");
    match &err {
        ConfigError::Toml(message) => assert!(!message.contains("qualify_field_access =")),
        other => panic!("expected a toml error, got {other:?}"),
    }
}

#[test]
fn loads_from_path() {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(file, "[clean_up]\nremove_field_qualifier = true").expect("write config");

    let config = JfixConfig::load_from_path(file.path()).expect("load");
    assert!(config.clean_up.remove_field_qualifier);
    assert!(config.code_style_options().any_remove());
}

#[test]
fn missing_file_reports_its_path() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("jfix.toml");

    let err = JfixConfig::load_from_path(&path).expect_err("file does not exist");
    match err {
        ConfigError::Io { path: reported, .. } => assert_eq!(reported, path.display().to_string()),
        other => panic!("expected an io error, got {other:?}"),
    }
}
