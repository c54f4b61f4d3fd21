#![cfg(test)]

use std::sync::Arc;

use crate::context::ComponentRegistry;
use crate::kernel::error::Error;

#[derive(Debug, PartialEq)]
struct CacheManager {
    backend: &'static str,
}

#[test]
fn test_register_and_lookup() {
    let mut registry = ComponentRegistry::new();
    registry
        .register_instance("cacheManager", CacheManager { backend: "simple" })
        .unwrap();

    assert!(registry.contains_name("cacheManager"));
    assert!(registry.contains_type("CacheManager"));
    assert!(!registry.contains_type("Manager"));
    assert_eq!(registry.names_for_type("CacheManager"), vec!["cacheManager".to_string()]);

    let manager = registry.get_concrete::<CacheManager>("cacheManager").unwrap();
    assert_eq!(manager.backend, "simple");
    assert!(registry.get_concrete::<String>("cacheManager").is_none());
    assert!(registry.get_concrete::<CacheManager>("other").is_none());
}

#[test]
fn test_duplicate_name_is_rejected() {
    let mut registry = ComponentRegistry::new();
    registry.register_instance("dataSource", 1u32).unwrap();
    match registry.register_instance("dataSource", 2u32) {
        Err(Error::ComponentRegistryError { operation, component_name, .. }) => {
            assert_eq!(operation, "RegisterComponent");
            assert_eq!(component_name.as_deref(), Some("dataSource"));
        }
        other => panic!("Expected ComponentRegistryError, got {:?}", other),
    }
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_explicit_type_tag() {
    let mut registry = ComponentRegistry::new();
    registry
        .register_tagged("jmsTemplate", "JmsTemplate", Arc::new(()))
        .unwrap();
    assert!(registry.contains_type("JmsTemplate"));
    assert_eq!(registry.get("jmsTemplate").unwrap().type_tag(), "JmsTemplate");
}

#[test]
fn test_drain_reverse_order() {
    let mut registry = ComponentRegistry::new();
    for name in ["a", "b", "c"] {
        registry.register_instance(name, name.to_string()).unwrap();
    }
    assert_eq!(registry.names(), vec!["a", "b", "c"]);

    let drained: Vec<String> = registry
        .drain_reverse()
        .into_iter()
        .map(|e| e.name().to_string())
        .collect();
    assert_eq!(drained, vec!["c", "b", "a"]);
    assert!(registry.is_empty());
    assert!(!registry.contains_name("a"));
}
