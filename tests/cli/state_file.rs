//! Command sequences sharing one state file

use queuegate::app::cli::args::{Command, GroupArgs};
use queuegate::app::cli::config::ServiceConfig;
use queuegate::app::cli::display::OutputFormat;
use queuegate::app::error::AppError;
use queuegate::app::startup::execute;
use queuegate::service::api::ServiceError;
use serial_test::serial;
use std::path::Path;

const TEXT: OutputFormat = OutputFormat::Text { color: false };

async fn run(command: Command, state: &Path) -> Result<String, AppError> {
    execute(&command, &ServiceConfig::default(), Some(state), TEXT).await
}

fn group_args(group: &str, queue: &str) -> GroupArgs {
    GroupArgs {
        group: group.to_string(),
        queue: queue.to_string(),
        write: false,
        read: true,
        url: String::new(),
        ips: vec!["127.0.0.1".to_string()],
    }
}

#[tokio::test]
#[serial]
async fn test_queue_and_group_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("queuegate.json");

    run(Command::CreateQueue { queue: "orders".into() }, &state)
        .await
        .unwrap();
    run(Command::AddGroup(group_args("billing", "orders")), &state)
        .await
        .unwrap();

    let out = run(
        Command::GetGroup {
            group: "billing".into(),
            queue: "orders".into(),
        },
        &state,
    )
    .await
    .unwrap();
    assert!(out.starts_with("billing @ orders"), "{}", out);
    assert!(out.contains("ips: 127.0.0.1"));

    run(
        Command::DeleteGroup {
            group: "billing".into(),
            queue: "orders".into(),
        },
        &state,
    )
    .await
    .unwrap();
    run(Command::DeleteQueue { queue: "orders".into() }, &state)
        .await
        .unwrap();

    let out = run(
        Command::LookupQueue {
            queue: String::new(),
            group: String::new(),
        },
        &state,
    )
    .await
    .unwrap();
    assert_eq!(out, "No queues.");
    assert_eq!(
        run(Command::Audit, &state).await.unwrap(),
        "Broker and metadata store agree."
    );
}

#[tokio::test]
#[serial]
async fn test_duplicate_create_fails_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("queuegate.json");

    run(Command::CreateQueue { queue: "orders".into() }, &state)
        .await
        .unwrap();
    let err = run(Command::CreateQueue { queue: "orders".into() }, &state)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Service(ServiceError::AlreadyExists { .. })
    ));
}

#[tokio::test]
#[serial]
async fn test_group_on_missing_queue_fails() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("queuegate.json");

    let err = run(Command::AddGroup(group_args("g1", "missing-queue")), &state)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Service(ref e) if e.is_not_found()));

    let out = run(Command::LookupGroup { group: String::new() }, &state)
        .await
        .unwrap();
    assert_eq!(out, "No groups.");
}

#[tokio::test]
#[serial]
async fn test_corrupt_state_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("queuegate.json");
    std::fs::write(&state, "not json").unwrap();

    let err = run(Command::Audit, &state).await.unwrap_err();
    assert!(matches!(err, AppError::State(_)));
}
