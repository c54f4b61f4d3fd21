#![cfg(test)]

use std::sync::{Arc, Mutex};

use crate::condition::{ComponentQuery, Condition};
use crate::environment::{Classpath, Environment, MapPropertySource};
use crate::kernel::bootstrap::Application;
use crate::kernel::constants::{ENABLED_PROPERTY, EXCLUDE_PROPERTY};
use crate::kernel::error::Error;
use crate::module_system::error::ModuleSystemError;
use crate::module_system::manifest::ModuleManifest;
use crate::module_system::metadata::{MetadataIndex, ModuleHints};
use crate::module_system::registry::FactoryRegistry;
use crate::module_system::traits::{ConfigurationModule, ModulePriority};
use crate::tests::integration::common::{register_test_module, shared_log, snapshot, TestModule};

fn excluding(ids: &str) -> Environment {
    Environment::new().with_source(MapPropertySource::new("test").with_property(EXCLUDE_PROPERTY, ids))
}

#[tokio::test]
async fn test_exclude_property_and_priorities() {
    let configured = shared_log();
    let mut registry = FactoryRegistry::new();
    register_test_module(
        &mut registry,
        ModuleManifest::builder("X").priority(ModulePriority::new(10)).build(),
        &configured,
    );
    register_test_module(&mut registry, ModuleManifest::new("Y"), &configured);
    register_test_module(
        &mut registry,
        ModuleManifest::builder("Z").priority(ModulePriority::new(5)).build(),
        &configured,
    );

    let mut app = Application::builder("e2e")
        .registry(registry)
        .environment(excluding("Y"))
        .build()
        .unwrap();
    let run = app.run().await.unwrap();

    assert_eq!(run.activated_module_ids().await, vec!["Z", "X"]);
    assert_eq!(snapshot(&configured), vec!["Z", "X"]);
    assert_eq!(run.report().exclusions(), &["Y".to_string()]);
    assert!(run.context().is_active());
}

#[tokio::test]
async fn test_cache_backend_without_redis_client() {
    let configured = shared_log();
    let mut registry = FactoryRegistry::new();
    let redis = ModuleManifest::builder("CacheRedis")
        .group("cache-backend", "redis")
        .condition(Condition::on_class(["redis-client"]))
        .build();
    let simple = ModuleManifest::builder("CacheSimple")
        .group("cache-backend", "simple")
        .condition(Condition::on_missing_component(ComponentQuery::of_type("CacheManager")))
        .build();
    register_test_module(&mut registry, redis, &configured);
    register_test_module(&mut registry, simple, &configured);

    let mut app = Application::builder("cache")
        .registry(registry)
        .classpath(Classpath::new().with_library("serde"))
        .build()
        .unwrap();
    let run = app.run().await.unwrap();

    assert_eq!(run.activated_module_ids().await, vec!["CacheSimple"]);
    let outcome = run.report().outcome_for("CacheRedis").unwrap();
    assert!(!outcome.is_match());
    assert!(outcome.reasons()[0].contains("redis-client"));
}

#[tokio::test]
async fn test_cache_backend_filtered_by_index_before_conditions() {
    let configured = shared_log();
    let mut registry = FactoryRegistry::new();
    let redis = ModuleManifest::builder("CacheRedis")
        .group("cache-backend", "redis")
        .condition(Condition::on_class(["redis-client"]))
        .build();
    let simple = ModuleManifest::builder("CacheSimple")
        .group("cache-backend", "simple")
        .build();
    let index = Arc::new(MetadataIndex::from_manifests([&redis, &simple]));
    let instantiated = shared_log();
    let seen = Arc::clone(&instantiated);
    let log = Arc::clone(&configured);
    registry
        .register_module("CacheRedis", move || {
            seen.lock().unwrap().push("CacheRedis".to_string());
            Box::new(TestModule::new(redis.clone(), Arc::clone(&log))) as Box<dyn ConfigurationModule>
        })
        .unwrap();
    register_test_module(&mut registry, simple, &configured);

    let mut app = Application::builder("cache")
        .registry(registry)
        .metadata_index(index)
        .build()
        .unwrap();
    let run = app.run().await.unwrap();

    assert_eq!(run.activated_module_ids().await, vec!["CacheSimple"]);
    let filtered = run.report().filtered();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].module_id, "CacheRedis");
    assert_eq!(filtered[0].filter, "OnClassFilter");
    assert!(run.report().outcome_for("CacheRedis").is_none());
    assert!(run.report().outcome_for("CacheSimple").unwrap().is_match());
    assert!(snapshot(&instantiated).is_empty());
    assert_eq!(snapshot(&configured), vec!["CacheSimple"]);
}

#[tokio::test]
async fn test_index_entry_does_not_override_manifest_ordering() {
    let configured = shared_log();
    let mut registry = FactoryRegistry::new();
    let x = ModuleManifest::builder("X").priority(ModulePriority::new(10)).build();
    let z = ModuleManifest::builder("Z").priority(ModulePriority::new(5)).build();
    let mut index = MetadataIndex::new();
    index.insert("X", ModuleHints::default());
    register_test_module(&mut registry, x, &configured);
    register_test_module(&mut registry, z, &configured);

    let mut app = Application::builder("indexed")
        .registry(registry)
        .metadata_index(Arc::new(index))
        .build()
        .unwrap();
    let run = app.run().await.unwrap();

    assert_eq!(run.activated_module_ids().await, vec!["Z", "X"]);
}

#[tokio::test]
async fn test_both_alternatives_applicable_keeps_first() {
    let configured = shared_log();
    let mut registry = FactoryRegistry::new();
    register_test_module(
        &mut registry,
        ModuleManifest::builder("CacheRedis").group("cache-backend", "redis").build(),
        &configured,
    );
    register_test_module(
        &mut registry,
        ModuleManifest::builder("CacheSimple").group("cache-backend", "simple").build(),
        &configured,
    );

    let mut app = Application::builder("cache").registry(registry).build().unwrap();
    let run = app.run().await.unwrap();

    assert_eq!(run.activated_module_ids().await, vec!["CacheRedis"]);
    let conflicts = run.report().conflicts();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].first_module, "CacheRedis");
    assert_eq!(conflicts[0].second_module, "CacheSimple");
}

#[tokio::test]
async fn test_group_selection_property_picks_alternative() {
    let configured = shared_log();
    let mut registry = FactoryRegistry::new();
    for (id, alias) in [("CacheRedis", "redis"), ("CacheSimple", "simple")] {
        let manifest = ModuleManifest::builder(id)
            .group("cache-backend", alias)
            .condition(Condition::selected_alternative("cache-backend", alias))
            .build();
        register_test_module(&mut registry, manifest, &configured);
    }
    let environment = Environment::new()
        .with_source(MapPropertySource::new("test").with_property("ignite.group.cache-backend", "simple"));

    let mut app = Application::builder("cache")
        .registry(registry)
        .environment(environment)
        .build()
        .unwrap();
    let run = app.run().await.unwrap();

    assert_eq!(run.activated_module_ids().await, vec!["CacheSimple"]);
}

#[tokio::test]
async fn test_invalid_exclude_fails_run() {
    let configured = shared_log();
    let mut registry = FactoryRegistry::new();
    register_test_module(&mut registry, ModuleManifest::new("A"), &configured);
    let log = Arc::clone(&configured);
    registry
        .define_module("Orphan", move || {
            Box::new(TestModule::new(ModuleManifest::new("Orphan"), Arc::clone(&log))) as Box<dyn ConfigurationModule>
        })
        .unwrap();

    let mut app = Application::builder("bad")
        .registry(registry)
        .exclude("Orphan")
        .build()
        .unwrap();
    let err = app.run().await.unwrap_err();

    match err.root_cause() {
        Error::ModuleSystem(ModuleSystemError::InvalidExcludes { ids }) => {
            assert_eq!(ids, &vec!["Orphan".to_string()]);
        }
        other => panic!("Expected InvalidExcludes, got {:?}", other),
    }
    assert!(snapshot(&configured).is_empty());
}

#[tokio::test]
async fn test_disabled_auto_configuration_activates_nothing() {
    let configured = shared_log();
    let mut registry = FactoryRegistry::new();
    register_test_module(&mut registry, ModuleManifest::new("A"), &configured);
    let environment =
        Environment::new().with_source(MapPropertySource::new("test").with_property(ENABLED_PROPERTY, false));

    let mut app = Application::builder("off")
        .registry(registry)
        .environment(environment)
        .build()
        .unwrap();
    let run = app.run().await.unwrap();

    assert!(run.activated_module_ids().await.is_empty());
}

#[tokio::test]
async fn test_nested_import_is_resolved_from_module_site() {
    let configured = shared_log();
    let mut registry = FactoryRegistry::new();
    register_test_module(
        &mut registry,
        ModuleManifest::builder("Web").imports("ignite.web.Servers").build(),
        &configured,
    );
    let tomcat = ModuleManifest::builder("Tomcat").after("Web").build();
    let id = tomcat.id.clone();
    let log = Arc::clone(&configured);
    registry
        .define_module(&id, move || {
            Box::new(TestModule::new(tomcat.clone(), Arc::clone(&log))) as Box<dyn ConfigurationModule>
        })
        .unwrap();
    registry.add_names("ignite.web.Servers", ["Tomcat"]);

    let mut app = Application::builder("nested").registry(registry).build().unwrap();
    let run = app.run().await.unwrap();

    let entries = run.activated_modules().await;
    let ids: Vec<&str> = entries.iter().map(|e| e.module_id.as_str()).collect();
    assert_eq!(ids, vec!["Web", "Tomcat"]);
    assert_eq!(entries[0].site.name(), "nested");
    assert_eq!(entries[1].site.name(), "Web");
}

fn web_with_servers(log: &Arc<Mutex<Vec<String>>>) -> FactoryRegistry {
    let mut registry = FactoryRegistry::new();
    register_test_module(
        &mut registry,
        ModuleManifest::builder("Web").imports("ignite.web.Servers").build(),
        log,
    );
    register_test_module(&mut registry, ModuleManifest::new("Y"), log);
    let tomcat = ModuleManifest::builder("Tomcat").after("Web").build();
    let factory_log = Arc::clone(log);
    registry
        .define_module("Tomcat", move || {
            Box::new(TestModule::new(tomcat.clone(), Arc::clone(&factory_log))) as Box<dyn ConfigurationModule>
        })
        .unwrap();
    registry.add_names("ignite.web.Servers", ["Tomcat"]);
    registry
}

#[tokio::test]
async fn test_exclude_property_applies_across_nested_imports() {
    let configured = shared_log();
    let registry = web_with_servers(&configured);

    let mut app = Application::builder("nested-exclude")
        .registry(registry)
        .environment(excluding("Y"))
        .build()
        .unwrap();
    let run = app.run().await.unwrap();

    assert_eq!(run.activated_module_ids().await, vec!["Web", "Tomcat"]);
    assert_eq!(snapshot(&configured), vec!["Web", "Tomcat"]);
}

#[tokio::test]
async fn test_exclude_property_naming_unlisted_module_still_fails() {
    let configured = shared_log();
    let mut registry = web_with_servers(&configured);
    let log = Arc::clone(&configured);
    registry
        .define_module("Orphan", move || {
            Box::new(TestModule::new(ModuleManifest::new("Orphan"), Arc::clone(&log))) as Box<dyn ConfigurationModule>
        })
        .unwrap();

    let mut app = Application::builder("nested-orphan")
        .registry(registry)
        .environment(excluding("Y,Orphan"))
        .build()
        .unwrap();
    let err = app.run().await.unwrap_err();

    match err.root_cause() {
        Error::ModuleSystem(ModuleSystemError::InvalidExcludes { ids }) => {
            assert_eq!(ids, &vec!["Orphan".to_string()]);
        }
        other => panic!("Expected InvalidExcludes, got {:?}", other),
    }
    assert!(snapshot(&configured).is_empty());
}

#[tokio::test]
async fn test_ordering_cycle_fails_run() {
    let configured = shared_log();
    let mut registry = FactoryRegistry::new();
    register_test_module(&mut registry, ModuleManifest::builder("A").after("B").build(), &configured);
    register_test_module(&mut registry, ModuleManifest::builder("B").after("A").build(), &configured);

    let mut app = Application::builder("cycle").registry(registry).build().unwrap();
    let err = app.run().await.unwrap_err();

    match err.root_cause() {
        Error::ModuleSystem(ModuleSystemError::OrderingCycle { cycle }) => {
            assert!(cycle.contains(&"A".to_string()));
            assert!(cycle.contains(&"B".to_string()));
        }
        other => panic!("Expected OrderingCycle, got {:?}", other),
    }
}

#[tokio::test]
async fn test_conditions_see_user_components() {
    let configured = shared_log();
    let mut registry = FactoryRegistry::new();
    register_test_module(
        &mut registry,
        ModuleManifest::builder("DataSourceAuto")
            .condition(Condition::on_missing_component(ComponentQuery::named("dataSource")))
            .build(),
        &configured,
    );
    register_test_module(
        &mut registry,
        ModuleManifest::builder("JdbcTemplateAuto")
            .condition(Condition::on_component(ComponentQuery::named("dataSource")))
            .build(),
        &configured,
    );

    let mut app = Application::builder("jdbc")
        .registry(registry)
        .component("dataSource", "user-provided".to_string())
        .build()
        .unwrap();
    let run = app.run().await.unwrap();

    assert_eq!(run.activated_module_ids().await, vec!["JdbcTemplateAuto"]);
    let components = run.context().components().await;
    assert!(components.contains_name("dataSource"));
    assert!(components.contains_name("JdbcTemplateAutoComponent"));
}
