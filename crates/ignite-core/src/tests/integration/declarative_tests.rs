#![cfg(test)]

use std::fs;

use tempfile::tempdir;

use crate::condition::Condition;
use crate::environment::config::FilePropertySource;
use crate::environment::{Classpath, Environment};
use crate::kernel::bootstrap::Application;
use crate::kernel::constants::AUTO_CONFIGURATION_CAPABILITY;
use crate::module_system::declarative::{DeclarativeModule, DeclaredComponent, ModuleDescriptor};
use crate::module_system::manifest::ModuleManifest;
use crate::module_system::registry::FactoryRegistry;
use crate::module_system::traits::{ConfigurationModule, ModulePriority};

#[test]
fn test_descriptor_from_json() {
    let descriptor: ModuleDescriptor = serde_json::from_str(
        r#"{
            "id": "CacheRedis",
            "priority": "highest+5",
            "group": { "name": "cache-backend", "alias": "redis" },
            "conditions": [
                { "type": "on_class", "names": ["redis-client"] },
                { "type": "on_missing_component", "types": ["CacheManager"] }
            ],
            "provides": ["cacheManager: CacheManager"]
        }"#,
    )
    .unwrap();

    assert_eq!(descriptor.manifest.id, "CacheRedis");
    assert_eq!(descriptor.manifest.priority, Some(ModulePriority::highest_plus(5)));
    assert_eq!(descriptor.manifest.group.as_ref().unwrap().alias, "redis");
    assert_eq!(descriptor.manifest.conditions.len(), 2);
    assert!(matches!(descriptor.manifest.conditions[0], Condition::OnClass { .. }));
    assert_eq!(descriptor.manifest.class_requirements(), vec!["redis-client"]);
    assert_eq!(descriptor.provides, vec!["cacheManager: CacheManager"]);
}

#[cfg(feature = "toml-config")]
#[test]
fn test_descriptor_from_toml() {
    let descriptor: ModuleDescriptor = toml::from_str(
        r#"
id = "Tomcat"
priority = 10
after = ["Web"]
provides = ["servletContainer"]

[[conditions]]
type = "on_property"
name = "server.enabled"
match_if_missing = true
"#,
    )
    .unwrap();

    assert_eq!(descriptor.manifest.priority, Some(ModulePriority::new(10)));
    assert_eq!(descriptor.manifest.after, vec!["Web"]);
    assert!(matches!(
        descriptor.manifest.conditions[0],
        Condition::OnProperty {
            match_if_missing: true,
            ..
        }
    ));
}

#[tokio::test]
async fn test_declarative_modules_register_components() {
    let mut registry = FactoryRegistry::new();
    DeclarativeModule::register(
        &mut registry,
        ModuleDescriptor::new(
            ModuleManifest::builder("Jackson")
                .condition(Condition::on_class(["serde"]))
                .build(),
        )
        .providing("objectMapper: ObjectMapper"),
    )
    .unwrap();
    DeclarativeModule::register(
        &mut registry,
        ModuleDescriptor::new(ModuleManifest::new("Gson")).providing("gson"),
    )
    .unwrap();

    let mut app = Application::builder("declared")
        .registry(registry)
        .classpath(Classpath::new().with_library("serde"))
        .build()
        .unwrap();
    let run = app.run().await.unwrap();

    assert_eq!(run.activated_module_ids().await, vec!["Jackson", "Gson"]);
    let components = run.context().components().await;
    assert!(components.contains_type("ObjectMapper"));
    let gson = components.get_concrete::<DeclaredComponent>("gson").unwrap();
    assert_eq!(gson.module_id, "Gson");
}

#[tokio::test]
async fn test_registry_resources_and_property_file() {
    let dir = tempdir().unwrap();
    let resource = dir.path().join("registry.json");
    fs::write(
        &resource,
        format!(r#"{{ "{}": ["Alpha", "Beta"] }}"#, AUTO_CONFIGURATION_CAPABILITY),
    )
    .unwrap();
    let properties = dir.path().join("application.json");
    fs::write(
        &properties,
        r#"{ "ignite": { "autoconfigure": { "exclude": ["Beta"] } } }"#,
    )
    .unwrap();

    let mut registry = FactoryRegistry::new();
    registry.load_resource(&resource).unwrap();
    for id in ["Alpha", "Beta"] {
        let descriptor = ModuleDescriptor::new(ModuleManifest::new(id));
        registry
            .define_module(id, move || {
                Box::new(DeclarativeModule::new(descriptor.clone()))
                    as Box<dyn ConfigurationModule>
            })
            .unwrap();
    }
    let environment = Environment::new().with_source(FilePropertySource::load(&properties).unwrap());

    let mut app = Application::builder("resources")
        .registry(registry)
        .environment(environment)
        .build()
        .unwrap();
    let run = app.run().await.unwrap();

    assert_eq!(run.activated_module_ids().await, vec!["Alpha"]);
    assert_eq!(run.report().exclusions(), &["Beta".to_string()]);
}
