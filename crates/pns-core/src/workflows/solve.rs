use crate::core::io::pns::PnsFile;
use crate::core::io::traits::ProblemFile;
use crate::core::models::network::ProcessNetwork;
use crate::engine::config::SearchConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::search::BranchAndBoundEngine;
use crate::engine::solver::{MicrolpSolver, RelaxationSolver};
use crate::engine::state::SearchTree;
use std::path::Path;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct SolveResult {
    pub tree: SearchTree,
    /// Materials whose positive demand has no producing unit and is therefore unenforced.
    pub unmet_demands: Vec<String>,
    pub solver: String,
}

/// Solves `network` with the bundled `microlp` backend.
pub fn run(
    network: &ProcessNetwork,
    config: &SearchConfig,
    reporter: &ProgressReporter,
) -> Result<SolveResult, EngineError> {
    let solver = MicrolpSolver::new(config.integrality);
    run_with_solver(network, config, &solver, reporter)
}

#[instrument(skip_all, name = "solve_workflow", fields(solver = solver.name()))]
pub fn run_with_solver(
    network: &ProcessNetwork,
    config: &SearchConfig,
    solver: &dyn RelaxationSolver,
    reporter: &ProgressReporter,
) -> Result<SolveResult, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Preparation",
    });
    info!(
        materials = network.material_count(),
        units = network.units().len(),
        strategy = %config.strategy,
        integrality = %config.integrality,
        prune = config.prune,
        "Preparing branch-and-bound search."
    );

    let unmet_demands: Vec<String> = network
        .unmet_demands()
        .into_iter()
        .map(|material| {
            warn!(
                material = material.name(),
                lower_bound = material.lower_bound(),
                "Material has a positive lower bound but no producing unit; its demand is not enforced."
            );
            material.name().to_string()
        })
        .collect();

    let engine = BranchAndBoundEngine::new(network, solver, config, reporter)?;
    reporter.report(Progress::PhaseFinish);

    let tree = reporter.phase("Branch and Bound", || engine.run())?;

    Ok(SolveResult {
        tree,
        unmet_demands,
        solver: solver.name().to_string(),
    })
}

/// Reads a problem definition from `path` and solves it.
pub fn run_file(
    path: impl AsRef<Path>,
    config: &SearchConfig,
    reporter: &ProgressReporter,
) -> Result<(ProcessNetwork, SolveResult), EngineError> {
    let network = PnsFile::read_from_path(path)?;
    let result = run(&network, config, reporter)?;
    Ok((network, result))
}
