// tests/builder_surface.rs

//! Target builder guards, registry operations and the requested-target
//! allow-list.

use std::error::Error;
use std::sync::Arc;

use rundag::context::RunContext;
use rundag::errors::RundagError;
use rundag::target::TargetTree;
use rundag::types::NOT_REQUESTED_EXIT_CODE;
use rundag_test_utils::init_tracing;
use rundag_test_utils::probe::{events, new_event_log, ProbeUnit};
use rundag_test_utils::with_timeout;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn setting_action_twice_fails() {
    init_tracing();

    let mut tree = TargetTree::new();
    let target = tree.create_target("build").unwrap();

    target.set_action(|_ctx| Ok(())).unwrap();
    let err = target.set_action(|_ctx| Ok(())).unwrap_err();
    assert!(matches!(err, RundagError::ActionAlreadySet(ref name) if name == "build"));
}

#[test]
fn force_action_always_succeeds() {
    init_tracing();

    let mut tree = TargetTree::new();
    let target = tree.create_target("build").unwrap();

    target.set_action(|_ctx| Ok(())).unwrap();
    // Overwriting through the force path is always allowed.
    target.force_action(|_ctx| Ok(()));
    target.force_action(|_ctx| Ok(()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn forced_action_replaces_original() -> TestResult {
    init_tracing();

    let log = new_event_log();
    let mut tree = TargetTree::new();
    {
        let first = log.clone();
        let second = log.clone();
        let target = tree.create_target("build")?;
        target.set_action(move |_ctx| {
            first.lock().unwrap().push("first".to_string());
            Ok(())
        })?;
        target.force_action(move |_ctx| {
            second.lock().unwrap().push("second".to_string());
            Ok(())
        });
    }

    let ctx = Arc::new(RunContext::new());
    with_timeout(tree.run(&ctx, "build")).await?;

    assert_eq!(events(&log), vec!["second".to_string()]);
    Ok(())
}

#[test]
fn duplicate_target_creation_fails() {
    init_tracing();

    let mut tree = TargetTree::new();
    tree.create_target("build").unwrap();
    let err = tree.create_target("build").unwrap_err();
    assert!(matches!(err, RundagError::ConfigError(_)));
}

#[test]
fn dependency_on_target_is_recorded_by_name() {
    init_tracing();

    let mut scratch = TargetTree::new();
    scratch.create_target("clean").unwrap();
    let clean = scratch.target("clean").unwrap();

    let mut tree = TargetTree::new();
    tree.create_target("build")
        .unwrap()
        .depends_on_target(clean)
        .depends_on("lint");

    assert_eq!(
        tree.target("build").unwrap().dependencies(),
        &["clean".to_string(), "lint".to_string()]
    );
}

#[test]
fn hidden_targets_are_excluded_from_listings() {
    init_tracing();

    let mut tree = TargetTree::new();
    tree.create_target("public")
        .unwrap()
        .set_description("a visible target");
    tree.create_target("internal").unwrap().hide();

    let visible: Vec<&str> = tree.visible_targets().map(|t| t.name()).collect();
    assert_eq!(visible, vec!["public"]);
    assert!(tree.target("internal").unwrap().is_hidden());
}

#[test]
fn set_default_requires_existing_target() {
    init_tracing();

    let mut tree = TargetTree::new();
    tree.create_target("build").unwrap();

    assert!(tree.set_default("build").is_ok());
    assert_eq!(tree.default_target(), Some("build"));

    let err = tree.set_default("missing").unwrap_err();
    assert!(matches!(err, RundagError::TargetNotFound(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn run_default_without_default_fails() -> TestResult {
    init_tracing();

    let mut tree = TargetTree::new();
    tree.create_target("build")?;

    let ctx = Arc::new(RunContext::new());
    let err = with_timeout(tree.run_default(&ctx)).await.unwrap_err();
    assert!(matches!(err, RundagError::ConfigError(_)));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn target_outside_allow_list_fails_with_exit_code_3() -> TestResult {
    init_tracing();

    let log = new_event_log();
    let mut tree = TargetTree::new();
    {
        let action_log = log.clone();
        tree.create_target("deploy")?
            .set_action(move |_ctx| {
                action_log.lock().unwrap().push("deploy:action".to_string());
                Ok(())
            })?
            .add_task(ProbeUnit::new("upload", log.clone()));
    }

    let ctx = Arc::new(RunContext::new().with_requested_targets(["build"]));
    let err = with_timeout(tree.run(&ctx, "deploy")).await.unwrap_err();

    assert!(matches!(
        err,
        RundagError::TaskExecution {
            exit_code: NOT_REQUESTED_EXIT_CODE,
            ..
        }
    ));
    assert_eq!(err.exit_code(), 3);
    // Neither the action nor any task ran.
    assert!(events(&log).is_empty());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn target_inside_allow_list_runs() -> TestResult {
    init_tracing();

    let log = new_event_log();
    let mut tree = TargetTree::new();
    tree.create_target("build")?
        .add_task(ProbeUnit::new("compile", log.clone()));

    let ctx = Arc::new(RunContext::new().with_requested_targets(["build"]));
    assert_eq!(with_timeout(tree.run(&ctx, "build")).await?, 0);
    assert!(events(&log).contains(&"compile:end".to_string()));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_allow_list_is_unrestricted() -> TestResult {
    init_tracing();

    let log = new_event_log();
    let mut tree = TargetTree::new();
    tree.create_target("anything")?
        .add_task(ProbeUnit::new("task", log.clone()));

    let ctx = Arc::new(RunContext::new());
    assert!(ctx.requested_targets().is_empty());
    assert_eq!(with_timeout(tree.run(&ctx, "anything")).await?, 0);
    Ok(())
}
