//! Integration tests for logging system

use bridge_traits::time::{ConsoleLogger, LogLevel};
use core_runtime::logging::{
    init_logging, redact_if_sensitive, strip_path, LogFormat, LoggingConfig,
};
use std::sync::Arc;

#[test]
fn test_logging_config() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Json)
        .with_level(LogLevel::Debug)
        .with_spans(true);

    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level, LogLevel::Debug);
    assert!(config.enable_spans);
    assert!(config.logger_sink.is_none());
}

// The global subscriber can only be installed once per process, so both
// calls live in the same test.
#[test]
fn test_init_logging_only_once() {
    let sink = Arc::new(ConsoleLogger::default());
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_logger_sink(sink);

    assert!(init_logging(config).is_ok());
    tracing::info!(target: "core_sync", "logging ready");

    let second = init_logging(LoggingConfig::default());
    assert!(second.is_err());
}

#[test]
fn test_invalid_filter_rejected() {
    let config = LoggingConfig::default().with_filter("core_sync=notalevel");
    assert!(init_logging(config).is_err());
}

#[test]
fn test_redaction_tokens() {
    assert_eq!(redact_if_sensitive("access_token", "ya29.abc"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("refresh_token", "1//xyz"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("api_key", "AIza"), "[REDACTED]");
}

#[test]
fn test_redaction_normal_values() {
    assert_eq!(redact_if_sensitive("media_id", "dQw4w9WgXcQ"), "dQw4w9WgXcQ");
    assert_eq!(redact_if_sensitive("title", "Artist - Song"), "Artist - Song");
    assert_eq!(redact_if_sensitive("collection_id", "PL123"), "PL123");
}

#[test]
fn test_path_stripping() {
    assert_eq!(
        strip_path("/home/user/.cache/playlist-sync/membership_PL1.csv"),
        "membership_PL1.csv"
    );
    assert_eq!(strip_path("C:\\Users\\Me\\cache\\statistics_PL1.csv"), "statistics_PL1.csv");
    assert_eq!(strip_path("snapshot_PL1.csv"), "snapshot_PL1.csv");
    assert_eq!(strip_path("/var/cache/"), "");
    assert_eq!(strip_path(""), "");
}

#[test]
fn test_format_selection() {
    #[cfg(debug_assertions)]
    assert_eq!(LoggingConfig::default().format, LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(LoggingConfig::default().format, LogFormat::Json);
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_filter("core_sync=trace,provider_youtube=debug")
        .with_spans(false)
        .with_target(false);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert_eq!(
        config.filter.as_deref(),
        Some("core_sync=trace,provider_youtube=debug")
    );
    assert!(!config.enable_spans);
    assert!(!config.display_target);
}
