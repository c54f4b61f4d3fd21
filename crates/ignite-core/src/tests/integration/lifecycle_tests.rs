#![cfg(test)]

use std::sync::{Arc, Mutex};

use crate::kernel::bootstrap::Application;
use crate::kernel::error::Error;
use crate::lifecycle::error::{LifecycleError, ListenerError};
use crate::lifecycle::error_handler::ErrorHandler;
use crate::lifecycle::listener::LifecycleListener;
use crate::lifecycle::LifecyclePhase;
use crate::module_system::manifest::ModuleManifest;
use crate::module_system::registry::FactoryRegistry;
use crate::module_system::traits::{ConfigurationModule, ModulePriority};
use crate::tests::integration::common::{
    register_test_module, shared_log, single_module_registry, snapshot, RecordingListener, TestModule,
};

#[derive(Default)]
struct CollectingHandler {
    handled: Mutex<Vec<(String, LifecyclePhase)>>,
}

impl ErrorHandler for CollectingHandler {
    fn handle(&self, listener: &str, phase: LifecyclePhase, _error: &ListenerError) {
        self.handled.lock().unwrap().push((listener.to_string(), phase));
    }
}

fn phases_of(log: &[String], listener: &str) -> Vec<String> {
    log.iter()
        .filter_map(|entry| entry.strip_prefix(&format!("{}:", listener)).map(str::to_string))
        .collect()
}

#[tokio::test]
async fn test_successful_run_publishes_every_phase_once() {
    let log = shared_log();
    let mut app = Application::builder("phases")
        .registry(single_module_registry())
        .listener(Arc::new(RecordingListener::new("rec", Arc::clone(&log))))
        .build()
        .unwrap();
    app.run().await.unwrap();

    assert_eq!(
        phases_of(&snapshot(&log), "rec"),
        vec![
            "starting",
            "environment-prepared",
            "context-prepared",
            "context-loaded",
            "started",
            "running"
        ]
    );
}

#[tokio::test]
async fn test_listeners_notified_in_priority_order() {
    let log = shared_log();
    let mut app = Application::builder("ordered")
        .registry(single_module_registry())
        .listener(Arc::new(RecordingListener::new("late", Arc::clone(&log))))
        .listener(Arc::new(
            RecordingListener::new("early", Arc::clone(&log)).with_priority(ModulePriority::HIGHEST),
        ))
        .build()
        .unwrap();
    app.run().await.unwrap();

    let entries = snapshot(&log);
    assert_eq!(entries[0], "early:starting");
    assert_eq!(entries[1], "late:starting");
}

#[tokio::test]
async fn test_event_payload_grows_with_phases() {
    let log = shared_log();
    let listener = RecordingListener::new("rec", Arc::clone(&log));
    let observations = listener.observations();
    let mut app = Application::builder("payload")
        .registry(single_module_registry())
        .listener(Arc::new(listener))
        .build()
        .unwrap();
    app.run().await.unwrap();

    let observed = observations.lock().unwrap().clone();
    assert_eq!(observed[0], (LifecyclePhase::Starting, false, false));
    assert_eq!(observed[1], (LifecyclePhase::EnvironmentPrepared, true, false));
    assert_eq!(observed[2], (LifecyclePhase::ContextPrepared, true, true));
    assert!(observed[3..].iter().all(|(_, env, ctx)| *env && *ctx));
}

#[tokio::test]
async fn test_early_listener_failure_does_not_stop_siblings() {
    let log = shared_log();
    let handler = Arc::new(CollectingHandler::default());
    let mut app = Application::builder("tolerant")
        .registry(single_module_registry())
        .listener(Arc::new(
            RecordingListener::new("broken", Arc::clone(&log)).failing_on(LifecyclePhase::Starting),
        ))
        .listener(Arc::new(RecordingListener::new("healthy", Arc::clone(&log))))
        .error_handler(handler.clone())
        .build()
        .unwrap();
    app.run().await.unwrap();

    let entries = snapshot(&log);
    assert!(entries.contains(&"healthy:starting".to_string()));
    assert!(entries.contains(&"healthy:running".to_string()));
    assert_eq!(
        handler.handled.lock().unwrap().clone(),
        vec![("broken".to_string(), LifecyclePhase::Starting)]
    );
}

#[tokio::test]
async fn test_started_failure_publishes_failed_and_closes_context() {
    let log = shared_log();
    let first = RecordingListener::new("first", Arc::clone(&log)).failing_on(LifecyclePhase::Started);
    let observations = first.observations();
    let mut app = Application::builder("fragile")
        .registry(single_module_registry())
        .listener(Arc::new(first))
        .listener(Arc::new(RecordingListener::new("second", Arc::clone(&log))))
        .build()
        .unwrap();
    let err = app.run().await.unwrap_err();

    match &err {
        Error::RunFailed { phase, .. } => assert_eq!(*phase, LifecyclePhase::Started),
        other => panic!("Expected RunFailed, got {:?}", other),
    }
    assert!(matches!(
        err.root_cause(),
        Error::Lifecycle(LifecycleError::ListenerFailed { .. })
    ));

    let entries = snapshot(&log);
    assert!(!entries.contains(&"second:started".to_string()));
    assert!(!entries.iter().any(|e| e.ends_with(":running")));
    assert_eq!(entries.iter().filter(|e| e.as_str() == "first:failed").count(), 1);
    assert_eq!(entries.iter().filter(|e| e.as_str() == "second:failed").count(), 1);

    let failed_observation = observations
        .lock()
        .unwrap()
        .iter()
        .find(|(phase, _, _)| *phase == LifecyclePhase::Failed)
        .copied()
        .unwrap();
    assert!(failed_observation.2);
}

#[tokio::test]
async fn test_running_failure_sends_no_failed_notification() {
    let log = shared_log();
    let mut app = Application::builder("late-failure")
        .registry(single_module_registry())
        .listener(Arc::new(
            RecordingListener::new("rec", Arc::clone(&log)).failing_on(LifecyclePhase::Running),
        ))
        .build()
        .unwrap();
    let err = app.run().await.unwrap_err();

    assert!(matches!(
        err,
        Error::RunFailed {
            phase: LifecyclePhase::Running,
            ..
        }
    ));
    let phases = phases_of(&snapshot(&log), "rec");
    assert_eq!(phases.last().map(String::as_str), Some("running"));
    assert!(!phases.contains(&"failed".to_string()));
}

#[tokio::test]
async fn test_module_failure_reports_once_with_context() {
    let log = shared_log();
    let configured = shared_log();
    let mut registry = FactoryRegistry::new();
    let log_for_factory = Arc::clone(&configured);
    registry
        .register_module("Broken", move || {
            Box::new(TestModule::new(ModuleManifest::new("Broken"), Arc::clone(&log_for_factory)).failing())
                as Box<dyn ConfigurationModule>
        })
        .unwrap();
    register_test_module(&mut registry, ModuleManifest::new("Healthy"), &configured);

    let mut app = Application::builder("module-failure")
        .registry(registry)
        .listener(Arc::new(RecordingListener::new("rec", Arc::clone(&log))))
        .build()
        .unwrap();
    let err = app.run().await.unwrap_err();

    match err.root_cause() {
        Error::ModuleConfiguration { module_id, .. } => assert_eq!(module_id, "Broken"),
        other => panic!("Expected ModuleConfiguration, got {:?}", other),
    }
    let phases = phases_of(&snapshot(&log), "rec");
    assert_eq!(phases.last().map(String::as_str), Some("failed"));
    assert_eq!(phases.iter().filter(|p| p.as_str() == "failed").count(), 1);
    assert!(!phases.contains(&"started".to_string()));
    assert!(snapshot(&configured).is_empty());
}

#[tokio::test]
async fn test_registered_listener_factories_are_notified() {
    let log = shared_log();
    let mut registry = single_module_registry();
    let factory_log = Arc::clone(&log);
    registry
        .register_listener("registered", move || {
            Arc::new(RecordingListener::new("registered", Arc::clone(&factory_log))) as Arc<dyn LifecycleListener>
        })
        .unwrap();

    let mut app = Application::builder("factories").registry(registry).build().unwrap();
    app.run().await.unwrap();

    assert_eq!(phases_of(&snapshot(&log), "registered").len(), 6);
}

#[tokio::test]
async fn test_application_runs_only_once() {
    let mut app = Application::builder("once")
        .registry(single_module_registry())
        .build()
        .unwrap();
    app.run().await.unwrap();

    let err = app.run().await.unwrap_err();
    assert!(matches!(err, Error::KernelLifecycleError { .. }));
}
