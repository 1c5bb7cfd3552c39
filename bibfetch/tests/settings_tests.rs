//! Configuration file → resolver settings

use bibfetch::config::{SOURCES_ENV_VAR, TIMEOUT_ENV_VAR};
use bibfetch::{resolve_settings, CliOverrides, Field, Resolver, SourceId};
use bibfetch_common::config::load_toml_config;
use serial_test::serial;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn clear_env() {
    std::env::remove_var(SOURCES_ENV_VAR);
    std::env::remove_var(TIMEOUT_ENV_VAR);
}

#[test]
#[serial]
fn test_settings_from_config_file() {
    clear_env();
    let file = write_config(
        r#"
        sources = ["amazon", "google_books"]

        [fetch]
        timeout_secs = 4
        user_agent = "bibfetch-test"

        [priority]
        description = ["amazon", "open_library"]
        "#,
    );

    let toml_config = load_toml_config(file.path()).unwrap();
    let settings = resolve_settings(&CliOverrides::default(), &toml_config).unwrap();

    assert_eq!(settings.sources, vec![SourceId::Amazon, SourceId::GoogleBooks]);
    assert_eq!(settings.fetch.timeout, Some(Duration::from_secs(4)));
    assert_eq!(settings.fetch.user_agent.as_deref(), Some("bibfetch-test"));
    assert_eq!(
        settings.priority.sources_for(Field::Description),
        &[SourceId::Amazon, SourceId::OpenLibrary]
    );
    // Fields not overridden keep the built-in order
    assert_eq!(
        settings.priority.sources_for(Field::Title),
        &[
            SourceId::GoogleBooks,
            SourceId::OpenLibrary,
            SourceId::IsbnDb,
            SourceId::Amazon
        ]
    );

    assert!(Resolver::from_settings(&settings).is_ok());
}

#[test]
#[serial]
fn test_cli_overrides_config_file() {
    clear_env();
    let file = write_config("sources = [\"isbndb\"]\n\n[fetch]\ntimeout_secs = 4\n");

    let toml_config = load_toml_config(file.path()).unwrap();
    let cli = CliOverrides {
        sources: Some(vec![SourceId::OpenLibrary]),
        timeout_secs: Some(0),
    };
    let settings = resolve_settings(&cli, &toml_config).unwrap();

    assert_eq!(settings.sources, vec![SourceId::OpenLibrary]);
    assert_eq!(settings.fetch.timeout, None);
}

#[test]
#[serial]
fn test_unknown_source_in_config_file() {
    clear_env();
    let file = write_config("sources = [\"goodreads\"]\n");

    let toml_config = load_toml_config(file.path()).unwrap();
    let result = resolve_settings(&CliOverrides::default(), &toml_config);

    assert!(matches!(result, Err(bibfetch_common::Error::Config(_))));
}

#[test]
#[serial]
fn test_invalid_user_agent_fails_resolver_construction() {
    clear_env();
    let file = write_config("[fetch]\nuser_agent = \"bad\\nagent\"\n");

    let toml_config = load_toml_config(file.path()).unwrap();
    let settings = resolve_settings(&CliOverrides::default(), &toml_config).unwrap();

    assert!(matches!(
        Resolver::from_settings(&settings),
        Err(bibfetch_common::Error::Config(_))
    ));
}
