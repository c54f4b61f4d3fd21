#![cfg(test)]

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tempfile::tempdir;

use crate::environment::{ConfigFormat, Environment, EnvironmentError, FilePropertySource, load_document};

#[test]
fn test_format_from_path() {
    assert_eq!(ConfigFormat::from_path(Path::new("a.json")), Some(ConfigFormat::Json));
    assert_eq!(ConfigFormat::from_path(Path::new("a.JSON")), Some(ConfigFormat::Json));
    #[cfg(feature = "yaml-config")]
    assert_eq!(ConfigFormat::from_path(Path::new("a.yml")), Some(ConfigFormat::Yaml));
    #[cfg(feature = "toml-config")]
    assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), Some(ConfigFormat::Toml));
    assert_eq!(ConfigFormat::from_path(Path::new("a.ini")), None);
    assert_eq!(ConfigFormat::from_path(Path::new("noext")), None);
}

#[test]
fn test_json_file_is_flattened() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.json");
    fs::write(
        &path,
        r#"{"ignite": {"autoconfigure": {"exclude": ["a", "b"], "enabled": true}}, "name": "demo"}"#,
    )
    .unwrap();

    let source = FilePropertySource::load(&path).unwrap();
    assert_eq!(source.path(), path.as_path());
    let env = Environment::new().with_source(source);
    assert_eq!(env.get_list("ignite.autoconfigure.exclude"), vec!["a", "b"]);
    assert_eq!(env.get_bool("ignite.autoconfigure.enabled").unwrap(), Some(true));
    assert_eq!(env.get_property("name").as_deref(), Some("demo"));
}

#[cfg(feature = "toml-config")]
#[test]
fn test_toml_file_is_flattened() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.toml");
    fs::write(
        &path,
        "[ignite.group]\ncache-backend = \"simple\"\n\n[logging]\nregister-shutdown-hook = false\n",
    )
    .unwrap();

    let env = Environment::new().with_source(FilePropertySource::load(&path).unwrap());
    assert_eq!(env.get_property("ignite.group.cache-backend").as_deref(), Some("simple"));
    assert_eq!(env.get_bool("logging.register-shutdown-hook").unwrap(), Some(false));
}

#[cfg(feature = "yaml-config")]
#[test]
fn test_yaml_file_is_flattened() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.yaml");
    fs::write(&path, "server:\n  port: 8080\n").unwrap();

    let env = Environment::new().with_source(FilePropertySource::load(&path).unwrap());
    assert_eq!(env.get_property("server.port").as_deref(), Some("8080"));
}

#[test]
fn test_missing_file_and_unknown_format() {
    let dir = tempdir().unwrap();
    match FilePropertySource::load(dir.path().join("absent.json")) {
        Err(EnvironmentError::FileNotFound { .. }) => {}
        other => panic!("Expected FileNotFound, got {:?}", other),
    }
    let ini = dir.path().join("app.ini");
    fs::write(&ini, "a=b").unwrap();
    match FilePropertySource::load(&ini) {
        Err(EnvironmentError::UnsupportedFormat { .. }) => {}
        other => panic!("Expected UnsupportedFormat, got {:?}", other),
    }
}

#[test]
fn test_parse_error_names_format() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    match FilePropertySource::load(&path) {
        Err(EnvironmentError::Parse { format, .. }) => assert_eq!(format, "JSON"),
        other => panic!("Expected Parse error, got {:?}", other),
    }
}

#[test]
fn test_load_typed_document() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Doc {
        name: String,
        tags: Vec<String>,
    }

    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.json");
    fs::write(&path, r#"{"name": "x", "tags": ["a"]}"#).unwrap();
    let doc: Doc = load_document(&path).unwrap();
    assert_eq!(
        doc,
        Doc {
            name: "x".into(),
            tags: vec!["a".into()]
        }
    );
}
