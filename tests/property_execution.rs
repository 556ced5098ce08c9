// tests/property_execution.rs

//! Property test: for arbitrary DAGs, running every target in one session
//! executes each target body exactly once, with every dependency finished
//! before its dependent starts.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;
use rundag::context::RunContext;
use rundag::target::TargetTree;
use rundag_test_utils::probe::{count_of, index_of, new_event_log, EventLog, ProbeUnit};

// Strategy to generate a valid DAG as a list of dependency index lists.
// Acyclicity is ensured by only allowing target N to depend on targets
// 0..N-1: generate arbitrary indices, then sanitize modulo the current
// index.
fn dag_strategy(max_targets: usize) -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1..=max_targets).prop_flat_map(move |num_targets| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_targets),
            num_targets,
        )
        .prop_map(move |raw_deps| {
            raw_deps
                .into_iter()
                .enumerate()
                .map(|(i, potential)| {
                    let mut valid: Vec<usize> = Vec::new();
                    let mut seen = HashSet::new();
                    for dep in potential {
                        if i > 0 {
                            let dep = dep % i;
                            if seen.insert(dep) {
                                valid.push(dep);
                            }
                        }
                    }
                    valid
                })
                .collect()
        })
    })
}

fn build_tree(deps: &[Vec<usize>], log: &EventLog) -> TargetTree {
    let mut tree = TargetTree::new();
    for (i, dep_indices) in deps.iter().enumerate() {
        let target = tree
            .create_target(format!("target_{i}"))
            .expect("unique names");
        target.add_task(ProbeUnit::new(format!("t{i}"), log.clone()));
        for dep in dep_indices {
            target.depends_on(format!("target_{dep}"));
        }
    }
    tree
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn every_target_runs_once_in_dependency_order(deps in dag_strategy(8)) {
        let log = new_event_log();
        let tree = build_tree(&deps, &log);
        let ctx = Arc::new(RunContext::new());

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("build runtime");

        runtime.block_on(async {
            for i in 0..deps.len() {
                tree.run(&ctx, &format!("target_{i}"))
                    .await
                    .expect("target run succeeds");
            }
        });

        // Exactly once each, even when reachable via multiple paths.
        for i in 0..deps.len() {
            prop_assert_eq!(count_of(&log, &format!("t{}:start", i)), 1);
            prop_assert_eq!(count_of(&log, &format!("t{}:end", i)), 1);
        }

        // Every dependency's task finished before its dependent's started.
        for (i, dep_indices) in deps.iter().enumerate() {
            for dep in dep_indices {
                prop_assert!(
                    index_of(&log, &format!("t{dep}:end"))
                        < index_of(&log, &format!("t{i}:start")),
                    "dependency t{} must finish before t{} starts",
                    dep,
                    i
                );
            }
        }

        // Depth bookkeeping unwound fully.
        prop_assert_eq!(ctx.depth(), 0);
    }
}
