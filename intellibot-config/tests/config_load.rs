use intellibot_config::{IntellibotConfigLoader, LogFormat};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn test_config_load() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
version: "0.1"
search:
  endpoint: "${SEARCH_HOST}/"
  user_agent: "Mozilla/5.0 (X11; Linux x86_64)"
  max_snippets: 2
images:
  cache: false
logging:
  format: json
  emit_stderr: true
  "#;
    let p = write_yaml(&tmp, "intellibot.yaml", file_yaml);

    temp_env::with_var("SEARCH_HOST", Some("http://127.0.0.1:8080"), || {
        let config = IntellibotConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load config");

        assert_eq!(config.version.as_deref(), Some("0.1"));
        assert_eq!(config.search.endpoint, "http://127.0.0.1:8080/");
        assert_eq!(config.search.user_agent, "Mozilla/5.0 (X11; Linux x86_64)");
        assert_eq!(config.search.max_snippets, 2);
        assert_eq!(config.search.max_images, 3);
        assert!(!config.images.cache);
        assert_eq!(config.images.timeout_secs, 5);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.logging.emit_stderr);
    });
}

#[test]
#[serial]
fn environment_overrides_file_values() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "intellibot.yaml", "search:\n  max_snippets: 2\n");

    temp_env::with_vars(
        [
            ("INTELLIBOT__SEARCH__MAX_SNIPPETS", Some("7")),
            ("INTELLIBOT__IMAGES__CACHE", Some("false")),
        ],
        || {
            let config = IntellibotConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load config");
            assert_eq!(config.search.max_snippets, 7);
            assert!(!config.images.cache);
        },
    );
}

#[test]
#[serial]
fn missing_optional_file_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = IntellibotConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .expect("defaults load");

    assert_eq!(config.reference.sentences, 2);
    assert_eq!(config.search.endpoint, "https://www.google.com/");
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let res = IntellibotConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(res.is_err());
}
