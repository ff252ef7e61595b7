use super::config::{SearchConfig, SearchStrategy};
use super::error::EngineError;
use super::model::{BoundOverrides, ConstraintBuilder};
use super::progress::{Progress, ProgressReporter};
use super::solver::RelaxationSolver;
use super::state::{Branch, Node, NodeOutcome, SearchTree, SolutionStatus, VariableState};
use crate::core::models::network::ProcessNetwork;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, instrument, trace, warn};

/// Objective values closer than this are treated as a tie.
const OBJECTIVE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
struct Incumbent {
    value: f64,
    path: Vec<Branch>,
}

impl Incumbent {
    /// Strictly lower objective wins; a tie goes to the leaf earlier in pre-order.
    fn is_beaten_by(&self, value: f64, path: &[Branch]) -> bool {
        if value < self.value - OBJECTIVE_EPSILON {
            return true;
        }
        (value - self.value).abs() <= OBJECTIVE_EPSILON && path < self.path.as_slice()
    }
}

struct IncumbentSlot(Mutex<Option<Incumbent>>);

impl IncumbentSlot {
    fn new() -> Self {
        Self(Mutex::new(None))
    }

    fn lock(&self) -> MutexGuard<'_, Option<Incumbent>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn value(&self) -> Option<f64> {
        self.lock().as_ref().map(|inc| inc.value)
    }

    /// Offers an integral leaf; returns `true` if it became the incumbent.
    fn offer(&self, value: f64, path: &[Branch]) -> bool {
        let mut guard = self.lock();
        let accept = guard
            .as_ref()
            .is_none_or(|current| current.is_beaten_by(value, path));
        if accept {
            *guard = Some(Incumbent {
                value,
                path: path.to_vec(),
            });
        }
        accept
    }

    fn into_path(self) -> Option<Vec<Branch>> {
        self.0
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .map(|inc| inc.path)
    }
}

struct ChildSpec {
    overrides: BoundOverrides,
    changed: VariableState,
}

/// A solved node, plus the two children to create when it branched.
struct Expansion {
    node: Node,
    children: Option<[ChildSpec; 2]>,
}

struct PendingNode {
    slot: usize,
    level: usize,
    overrides: BoundOverrides,
    changed: Option<VariableState>,
    path: Vec<Branch>,
}

/// Builds the complete branch-and-bound tree for one process network.
pub struct BranchAndBoundEngine<'a> {
    builder: ConstraintBuilder<'a>,
    solver: &'a dyn RelaxationSolver,
    config: &'a SearchConfig,
    reporter: &'a ProgressReporter<'a>,
}

impl<'a> BranchAndBoundEngine<'a> {
    pub fn new(
        network: &'a ProcessNetwork,
        solver: &'a dyn RelaxationSolver,
        config: &'a SearchConfig,
        reporter: &'a ProgressReporter<'a>,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            builder: ConstraintBuilder::new(network)?,
            solver,
            config,
            reporter,
        })
    }

    #[instrument(skip_all, name = "branch_and_bound", fields(strategy = %self.config.strategy))]
    pub fn run(&self) -> Result<SearchTree, EngineError> {
        let root_overrides = BoundOverrides::none(self.builder.variable_count());
        let incumbent = IncumbentSlot::new();

        self.reporter.report(Progress::TaskStart { total_steps: None });
        let root = match self.config.strategy {
            SearchStrategy::Sequential => self.explore_sequential(root_overrides, &incumbent),
            SearchStrategy::Parallel => self.explore_concurrent(root_overrides, &incumbent),
        };
        self.reporter.report(Progress::TaskFinish);
        let root = root?;

        let tree = SearchTree::new(root, incumbent.into_path());
        let summary = tree.summary();
        match summary.best_value {
            Some(best) => info!(
                nodes = summary.nodes,
                max_level = summary.max_level,
                best,
                "Search finished with an optimal integral solution."
            ),
            None => warn!(
                nodes = summary.nodes,
                max_level = summary.max_level,
                "Search finished without an integral solution."
            ),
        }
        Ok(tree)
    }

    /// Pre-order, left-first traversal driven by an explicit stack.
    ///
    /// Nodes are stored in an arena while the search runs. Children always occupy
    /// higher slots than their parent, so assembling the owned tree from the last slot
    /// backwards attaches complete subtrees.
    fn explore_sequential(
        &self,
        root_overrides: BoundOverrides,
        incumbent: &IncumbentSlot,
    ) -> Result<Node, EngineError> {
        let mut arena: Vec<Option<Node>> = vec![None];
        let mut links: Vec<Option<(usize, usize)>> = vec![None];
        let mut worklist = vec![PendingNode {
            slot: 0,
            level: 1,
            overrides: root_overrides,
            changed: None,
            path: Vec::new(),
        }];

        while let Some(pending) = worklist.pop() {
            let expansion = self.expand(
                &pending.overrides,
                pending.level,
                pending.changed,
                &pending.path,
                incumbent,
            )?;
            arena[pending.slot] = Some(expansion.node);

            if let Some([left, right]) = expansion.children {
                let left_slot = arena.len();
                let right_slot = left_slot + 1;
                arena.extend([None, None]);
                links.extend([None, None]);
                links[pending.slot] = Some((left_slot, right_slot));

                let mut right_path = pending.path.clone();
                right_path.push(Branch::Right);
                let mut left_path = pending.path;
                left_path.push(Branch::Left);

                worklist.push(PendingNode {
                    slot: right_slot,
                    level: pending.level + 1,
                    overrides: right.overrides,
                    changed: Some(right.changed),
                    path: right_path,
                });
                worklist.push(PendingNode {
                    slot: left_slot,
                    level: pending.level + 1,
                    overrides: left.overrides,
                    changed: Some(left.changed),
                    path: left_path,
                });
            }
        }

        for slot in (0..arena.len()).rev() {
            if let Some((l, r)) = links[slot] {
                let left = arena[l].take();
                let right = arena[r].take();
                match (arena[slot].as_mut(), left, right) {
                    (Some(parent), Some(left), Some(right)) => parent.attach(left, right),
                    _ => {
                        return Err(EngineError::Internal(format!(
                            "search arena slot {} is missing a node",
                            slot
                        )));
                    }
                }
            }
        }

        arena
            .into_iter()
            .next()
            .flatten()
            .ok_or_else(|| EngineError::Internal("search produced no root node".to_string()))
    }

    #[cfg(feature = "parallel")]
    fn explore_concurrent(
        &self,
        root_overrides: BoundOverrides,
        incumbent: &IncumbentSlot,
    ) -> Result<Node, EngineError> {
        debug!(threads = rayon::current_num_threads(), "Exploring subtrees in parallel.");
        self.explore_subtree(root_overrides, 1, None, Vec::new(), incumbent)
    }

    #[cfg(not(feature = "parallel"))]
    fn explore_concurrent(
        &self,
        root_overrides: BoundOverrides,
        incumbent: &IncumbentSlot,
    ) -> Result<Node, EngineError> {
        warn!("Parallel search requested but the 'parallel' feature is disabled; searching sequentially.");
        self.explore_sequential(root_overrides, incumbent)
    }

    #[cfg(feature = "parallel")]
    fn explore_subtree(
        &self,
        overrides: BoundOverrides,
        level: usize,
        changed: Option<VariableState>,
        path: Vec<Branch>,
        incumbent: &IncumbentSlot,
    ) -> Result<Node, EngineError> {
        let expansion = self.expand(&overrides, level, changed, &path, incumbent)?;
        let Some([left, right]) = expansion.children else {
            return Ok(expansion.node);
        };

        let mut left_path = path.clone();
        left_path.push(Branch::Left);
        let mut right_path = path;
        right_path.push(Branch::Right);

        let (left_node, right_node) = rayon::join(
            || {
                self.explore_subtree(
                    left.overrides,
                    level + 1,
                    Some(left.changed),
                    left_path,
                    incumbent,
                )
            },
            || {
                self.explore_subtree(
                    right.overrides,
                    level + 1,
                    Some(right.changed),
                    right_path,
                    incumbent,
                )
            },
        );

        let mut node = expansion.node;
        node.attach(left_node?, right_node?);
        Ok(node)
    }

    /// Solves one node and decides whether it is terminal or branches.
    fn expand(
        &self,
        overrides: &BoundOverrides,
        level: usize,
        changed: Option<VariableState>,
        path: &[Branch],
        incumbent: &IncumbentSlot,
    ) -> Result<Expansion, EngineError> {
        let model = self.builder.build(overrides)?;
        let result = self.solver.solve(&model);
        self.reporter.report(Progress::TaskIncrement);

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(level, solver = self.solver.name(), error = %e, "Relaxation solve failed.");
                let status = SolutionStatus::solver_error(changed, e.to_string());
                return Ok(terminal(level, overrides, status));
            }
        };

        if !outcome.status.is_usable() {
            debug!(level, "Relaxation is infeasible.");
            return Ok(terminal(level, overrides, SolutionStatus::infeasible(changed)));
        }

        if outcome.values.len() != model.variables().len() {
            let message = format!(
                "solver returned {} value(s) for {} variable(s)",
                outcome.values.len(),
                model.variables().len()
            );
            error!(level, solver = self.solver.name(), %message, "Relaxation result is malformed.");
            let status = SolutionStatus::solver_error(changed, message);
            return Ok(terminal(level, overrides, status));
        }

        let variables: Vec<VariableState> = model
            .variables()
            .iter()
            .zip(&outcome.values)
            .map(|(var, &value)| VariableState::snapshot(var.name.clone(), value))
            .collect();

        let prune_bound = if self.config.prune {
            incumbent
                .value()
                .filter(|&bound| outcome.objective >= bound - OBJECTIVE_EPSILON)
        } else {
            None
        };
        if let Some(bound) = prune_bound {
            debug!(level, value = outcome.objective, bound, "Node pruned by incumbent.");
            let status =
                SolutionStatus::solved(outcome.objective, variables, changed, NodeOutcome::Pruned);
            return Ok(terminal(level, overrides, status));
        }

        let tolerance = self.config.integrality_tolerance;
        let to_change = variables
            .iter()
            .enumerate()
            .find(|(index, var)| !overrides.is_pinned(*index) && !var.is_integral(tolerance));

        let Some((index, fractional)) = to_change else {
            let accepted = incumbent.offer(outcome.objective, path);
            debug!(level, value = outcome.objective, accepted, "Integral leaf reached.");
            if accepted {
                self.reporter.report(Progress::Message(format!(
                    "New incumbent {:.4} at level {}",
                    outcome.objective, level
                )));
            }
            let status =
                SolutionStatus::solved(outcome.objective, variables, changed, NodeOutcome::Integral);
            return Ok(terminal(level, overrides, status));
        };

        let previous = fractional.value();
        let left_value = previous.abs().floor();
        let right_value = left_value + 1.0;
        let name = fractional.name().to_string();
        trace!(level, variable = %name, value = previous, "Branching on fractional variable.");

        let children = [left_value, right_value].map(|pinned| ChildSpec {
            overrides: overrides.with(index, pinned as i64),
            changed: VariableState::new(name.clone(), pinned, previous),
        });
        let status =
            SolutionStatus::solved(outcome.objective, variables, changed, NodeOutcome::Branched);

        Ok(Expansion {
            node: Node::leaf(level, overrides.clone(), status),
            children: Some(children),
        })
    }
}

fn terminal(level: usize, overrides: &BoundOverrides, status: SolutionStatus) -> Expansion {
    Expansion {
        node: Node::leaf(level, overrides.clone(), status),
        children: None,
    }
}
