use jfix_config::{init_tracing, LoggingConfig};

#[test]
fn tracing_is_installed_at_most_once() {
    let config = LoggingConfig {
        level: "jfix.fix=trace".to_string(),
        json: true,
        stderr: false,
    };

    init_tracing(&config);
    assert!(!init_tracing(&config));
    tracing::info!(target: "jfix.fix", "still logs after a second init");
}
