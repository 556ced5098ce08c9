// tests/target_execution.rs

//! End-to-end ordering semantics of a target run.

use std::error::Error;
use std::sync::Arc;

use rundag::context::RunContext;
use rundag::target::TargetTree;
use rundag_test_utils::init_tracing;
use rundag_test_utils::probe::{count_of, events, index_of, new_event_log, ProbeUnit};
use rundag_test_utils::with_timeout;

type TestResult = Result<(), Box<dyn Error>>;

/// The canonical mixed-mode scenario:
/// `build` depends on `clean`; `clean` has one synchronous task
/// `delete-files`; `build` has an action and tasks
/// `[compile:Sync, package-a:Parallel, package-b:Parallel, publish:Sync]`.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn mixed_mode_scenario_preserves_ordering() -> TestResult {
    init_tracing();

    let log = new_event_log();
    let mut tree = TargetTree::new();

    tree.create_target("clean")?
        .add_task(ProbeUnit::new("delete-files", log.clone()).with_delay_ms(10));

    {
        let action_log = log.clone();
        let build = tree.create_target("build")?;
        build
            .depends_on("clean")
            .set_action(move |_ctx| {
                action_log.lock().unwrap().push("build:action".to_string());
                Ok(())
            })?
            .add_task(ProbeUnit::new("compile", log.clone()).with_delay_ms(10))
            .add_parallel_task(ProbeUnit::new("package-a", log.clone()).with_delay_ms(50))
            .add_parallel_task(ProbeUnit::new("package-b", log.clone()).with_delay_ms(30))
            .add_task(ProbeUnit::new("publish", log.clone()));
    }

    let ctx = Arc::new(RunContext::new());
    let status = with_timeout(tree.run(&ctx, "build")).await?;
    assert_eq!(status, 0);

    // clean fully finishes before build's action runs.
    assert!(index_of(&log, "delete-files:end") < index_of(&log, "build:action"));
    // compile finishes before either parallel package task starts.
    assert!(index_of(&log, "compile:end") < index_of(&log, "package-a:start"));
    assert!(index_of(&log, "compile:end") < index_of(&log, "package-b:start"));
    // Both package tasks finish before publish starts.
    assert!(index_of(&log, "package-a:end") < index_of(&log, "publish:start"));
    assert!(index_of(&log, "package-b:end") < index_of(&log, "publish:start"));

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dependency_only_target_executes_dependency() -> TestResult {
    init_tracing();

    let log = new_event_log();
    let mut tree = TargetTree::new();

    tree.create_target("prepare")?
        .add_task(ProbeUnit::new("setup", log.clone()));
    tree.create_target("all")?.depends_on("prepare");

    let ctx = Arc::new(RunContext::new());
    let status = with_timeout(tree.run(&ctx, "all")).await?;

    assert_eq!(status, 0);
    assert_eq!(count_of(&log, "setup:end"), 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_target_succeeds() -> TestResult {
    init_tracing();

    let mut tree = TargetTree::new();
    tree.create_target("noop")?;

    let ctx = Arc::new(RunContext::new());
    assert_eq!(with_timeout(tree.run(&ctx, "noop")).await?, 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn run_default_uses_default_target() -> TestResult {
    init_tracing();

    let log = new_event_log();
    let mut tree = TargetTree::new();
    tree.create_target("main")?
        .add_task(ProbeUnit::new("main-task", log.clone()));
    tree.set_default("main")?;

    let ctx = Arc::new(RunContext::new());
    assert_eq!(with_timeout(tree.run_default(&ctx)).await?, 0);
    assert_eq!(count_of(&log, "main-task:end"), 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failing_sync_task_aborts_remaining_tasks() -> TestResult {
    init_tracing();

    let log = new_event_log();
    let mut tree = TargetTree::new();
    tree.create_target("fragile")?
        .add_task(ProbeUnit::new("first", log.clone()))
        .add_task(ProbeUnit::new("breaks", log.clone()).failing(9))
        .add_task(ProbeUnit::new("never", log.clone()));

    let ctx = Arc::new(RunContext::new());
    let err = with_timeout(tree.run(&ctx, "fragile")).await.unwrap_err();

    assert_eq!(err.exit_code(), 9);
    let seen = events(&log);
    assert!(seen.contains(&"first:end".to_string()));
    assert!(seen.contains(&"breaks:fail".to_string()));
    assert!(!seen.iter().any(|e| e.starts_with("never:")));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failing_dependency_aborts_dependent() -> TestResult {
    init_tracing();

    let log = new_event_log();
    let mut tree = TargetTree::new();
    tree.create_target("dep")?
        .add_task(ProbeUnit::new("dep-task", log.clone()).failing(4));
    tree.create_target("top")?
        .depends_on("dep")
        .add_task(ProbeUnit::new("top-task", log.clone()));

    let ctx = Arc::new(RunContext::new());
    let err = with_timeout(tree.run(&ctx, "top")).await.unwrap_err();

    assert_eq!(err.exit_code(), 4);
    assert!(!events(&log).iter().any(|e| e.starts_with("top-task:")));
    Ok(())
}
