use crate::config::{ServeConfig, TypeOverride};
use crate::pipeline::policy::select;

use pretty_assertions::assert_eq;

#[test]
fn html_gets_mime_type_and_default_policy() {
    // Arrange
    let config = ServeConfig::default();

    // Act
    let policy = select(&config, "/docs/index.html");

    // Assert
    assert_eq!(policy.content_type, "text/html");
    assert_eq!(policy.extension.as_deref(), Some(".html"));
    assert_eq!(policy.valid_for, 86_400);
    assert_eq!(
        policy.cache_control,
        vec!["max-age=86400".to_string(), "public".to_string()]
    );
    assert!(policy.should_etag);
}

#[test]
fn extensionless_file_falls_back_to_text_plain() {
    // Arrange
    let config = ServeConfig::default();

    // Act
    let policy = select(&config, "/text");

    // Assert
    assert_eq!(policy.content_type, "text/plain");
    assert_eq!(policy.extension, None);
}

#[test]
fn unknown_extension_falls_back_to_text_plain() {
    // Arrange
    let config = ServeConfig::default();

    // Act
    let policy = select(&config, "/data.qqzz");

    // Assert
    assert_eq!(policy.content_type, "text/plain");
    assert_eq!(policy.extension.as_deref(), Some(".qqzz"));
}

#[test]
fn configured_content_type_wins_over_mime_table() {
    // Arrange
    let mut config = ServeConfig::default();
    config.types.insert(
        ".less".to_string(),
        TypeOverride {
            content_type: Some("text/stylesheet-less".to_string()),
            ..TypeOverride::default()
        },
    );

    // Act
    let policy = select(&config, "/style2.less");

    // Assert
    assert_eq!(policy.content_type, "text/stylesheet-less");
}

#[test]
fn type_override_replaces_validity_and_directives() {
    // Arrange
    let mut config = ServeConfig::default();
    config.types.insert(
        ".json".to_string(),
        TypeOverride {
            valid_for: Some(60),
            cache_control: Some(vec!["private".to_string()]),
            ..TypeOverride::default()
        },
    );

    // Act
    let policy = select(&config, "/api/data.json");

    // Assert
    assert_eq!(policy.valid_for, 60);
    assert_eq!(
        policy.cache_control,
        vec!["max-age=60".to_string(), "private".to_string()]
    );
    assert!(policy.should_etag);
}

#[test]
fn no_store_suppresses_etag_and_max_age() {
    // Arrange
    let mut config = ServeConfig::default();
    config.types.insert(
        ".txt".to_string(),
        TypeOverride {
            cache_control: Some(vec!["no-store".to_string()]),
            ..TypeOverride::default()
        },
    );

    // Act
    let policy = select(&config, "/notes.txt");

    // Assert
    assert_eq!(policy.cache_control, vec!["no-store".to_string()]);
    assert!(!policy.should_etag);
}

#[test]
fn etag_default_flag_disables_etags() {
    // Arrange
    let mut config = ServeConfig::default();
    config.defaults.etag = false;

    // Act
    let policy = select(&config, "/index.html");

    // Assert
    assert!(!policy.should_etag);
}

#[test]
fn extension_starts_at_final_dot() {
    // Arrange
    let config = ServeConfig::default();

    // Act
    let policy = select(&config, "/archive.tar.gz");

    // Assert
    assert_eq!(policy.extension.as_deref(), Some(".gz"));
}

#[test]
fn dotted_directory_does_not_leak_into_extension() {
    // Arrange
    let config = ServeConfig::default();

    // Act
    let policy = select(&config, "/v1.2/readme");

    // Assert
    assert_eq!(policy.extension, None);
    assert_eq!(policy.content_type, "text/plain");
}
