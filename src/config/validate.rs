// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{BuildFile, RawBuildFile};
use crate::errors::{Result, RundagError};

impl TryFrom<RawBuildFile> for BuildFile {
    type Error = crate::errors::RundagError;

    fn try_from(raw: RawBuildFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(BuildFile::new_unchecked(raw.config, raw.target))
    }
}

fn validate_raw_config(cfg: &RawBuildFile) -> Result<()> {
    ensure_has_targets(cfg)?;
    validate_default_target(cfg)?;
    validate_dependencies(cfg)?;
    validate_dag(cfg)?;
    Ok(())
}

fn ensure_has_targets(cfg: &RawBuildFile) -> Result<()> {
    if cfg.target.is_empty() {
        return Err(RundagError::ConfigError(
            "build file must contain at least one [target.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_default_target(cfg: &RawBuildFile) -> Result<()> {
    if let Some(default) = &cfg.config.default_target {
        if !cfg.target.contains_key(default) {
            return Err(RundagError::ConfigError(format!(
                "[config].default_target references unknown target '{default}'"
            )));
        }
    }
    Ok(())
}

fn validate_dependencies(cfg: &RawBuildFile) -> Result<()> {
    // Duplicate entries in `deps` are deliberately accepted; execution
    // runs each dependency once per run regardless.
    for (name, target) in cfg.target.iter() {
        for dep in target.deps.iter() {
            if !cfg.target.contains_key(dep) {
                return Err(RundagError::ConfigError(format!(
                    "target '{name}' has unknown dependency '{dep}' in `deps`"
                )));
            }
            if dep == name {
                return Err(RundagError::ConfigError(format!(
                    "target '{name}' cannot depend on itself in `deps`"
                )));
            }
        }
    }
    Ok(())
}

fn validate_dag(cfg: &RawBuildFile) -> Result<()> {
    // Build a petgraph graph from the targets and their dependencies.
    //
    // Edge direction: dep -> target
    // For:
    //   [target.build]
    //   deps = ["clean"]
    // we add edge clean -> build.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.target.keys() {
        graph.add_node(name.as_str());
    }

    for (name, target) in cfg.target.iter() {
        for dep in target.deps.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    // A topological sort will fail if there is a cycle.
    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(RundagError::DependencyCycle(node.to_string()))
        }
    }
}
