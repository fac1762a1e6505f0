//! Library-level scenarios: trigger payload in, memory and artifacts out.

use echo_nexus::artifacts::ArtifactWriter;
use echo_nexus::envelope::{OperationEnvelope, TriggerPayload, TriggerSource};
use echo_nexus::handlers::{CommandRegistry, Resolution};
use echo_nexus::memory::{FileMemoryStore, MemoryLoad, MemoryStore};
use echo_nexus::processor::Processor;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

struct Scenario {
    temp_dir: TempDir,
    store: Arc<FileMemoryStore>,
    processor: Processor,
}

impl Scenario {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(FileMemoryStore::new(temp_dir.path().join("memory/echo_memory.json")));
        let processor = Processor::new(
            store.clone(),
            CommandRegistry::with_builtin_handlers(),
            ArtifactWriter::new(temp_dir.path().join("artifacts")),
        );
        Self {
            temp_dir,
            store,
            processor,
        }
    }

    fn envelope(event_name: &str, event: serde_json::Value) -> OperationEnvelope {
        let source = TriggerSource::from_event_name(event_name).unwrap();
        let payload = TriggerPayload::from_event(event_name, &event).unwrap();
        OperationEnvelope::from_payload(payload, source, "text_analysis").unwrap()
    }
}

#[tokio::test]
async fn test_workflow_dispatch_form_inputs() {
    let scenario = Scenario::new();
    let envelope = Scenario::envelope(
        "workflow_dispatch",
        json!({
            "inputs": {
                "operation_id": "echo-1700000000-0000000000000001",
                "command": "workflow_synthesis",
                "inputs": "{\"goal\": \"nightly backup\"}",
                "session_id": ""
            }
        }),
    );
    assert_eq!(envelope.session_id, "manual");

    let report = scenario.processor.process(&envelope, "corr-1").await.unwrap();
    assert_eq!(report.resolution, Resolution::Registered("workflow_synthesis"));
    assert_eq!(report.result["workflow"], "Synthesized workflow for: nightly backup");
    assert!(!report.memory_existed);
}

#[tokio::test]
async fn test_operations_accumulate_in_memory() {
    let scenario = Scenario::new();
    let ids = [
        "echo-1700000000-00000000000000a1",
        "echo-1700000001-00000000000000a2",
        "echo-1700000002-00000000000000a3",
    ];

    for id in ids {
        let envelope = Scenario::envelope(
            "repository_dispatch",
            json!({"client_payload": {"operation_id": id, "command": "diagnostic_scan"}}),
        );
        scenario.processor.process(&envelope, "corr").await.unwrap();
    }

    match scenario.store.load().await {
        MemoryLoad::Loaded(memory) => {
            assert_eq!(memory.len(), 3);
            for id in ids {
                assert_eq!(memory.get(id).unwrap().result["status"], "healthy");
            }
        }
        other => panic!("expected loaded memory, got {other:?}"),
    }
}

#[tokio::test]
async fn test_structured_client_payload_inputs() {
    let scenario = Scenario::new();
    let envelope = Scenario::envelope(
        "repository_dispatch",
        json!({
            "client_payload": {
                "operation_id": "echo-1700000000-00000000000000b1",
                "command": "text_analysis",
                "inputs": {"text": "one two three four"}
            }
        }),
    );

    let report = scenario.processor.process(&envelope, "corr").await.unwrap();
    assert_eq!(report.result["word_count"], 4);
    assert!(scenario.temp_dir.path().join("artifacts/echo_result.json").exists());
}

#[tokio::test]
async fn test_handler_failure_leaves_existing_memory_untouched() {
    let scenario = Scenario::new();
    let first = Scenario::envelope(
        "repository_dispatch",
        json!({"client_payload": {"operation_id": "echo-1-00000000000000c1", "command": "diagnostic_scan"}}),
    );
    scenario.processor.process(&first, "corr").await.unwrap();
    let before = std::fs::read_to_string(scenario.store.path()).unwrap();

    let failing = Scenario::envelope(
        "repository_dispatch",
        json!({"client_payload": {
            "operation_id": "echo-2-00000000000000c2",
            "command": "code_generation",
            "inputs": "{\"prompt\": 42}"
        }}),
    );
    assert!(scenario.processor.process(&failing, "corr").await.is_err());

    let after = std::fs::read_to_string(scenario.store.path()).unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_blank_workflow_dispatch_form() {
    let scenario = Scenario::new();
    let envelope = Scenario::envelope(
        "workflow_dispatch",
        json!({
            "inputs": {
                "operation_id": "",
                "command": "diagnostic_scan",
                "inputs": "",
                "session_id": ""
            }
        }),
    );
    assert!(envelope.operation_id.as_str().starts_with("echo-"));
    assert_eq!(envelope.inputs, json!({}));

    let report = scenario.processor.process(&envelope, "corr").await.unwrap();
    assert_eq!(report.result["status"], "healthy");

    match scenario.store.load().await {
        MemoryLoad::Loaded(memory) => assert!(memory.get(envelope.operation_id.as_str()).is_some()),
        other => panic!("expected loaded memory, got {other:?}"),
    }
}
