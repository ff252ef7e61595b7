use super::config::IntegralityMode;
use super::model::{LinearModel, VariableKind};
use microlp::{ComparisonOp, OptimizationDirection, Problem, Variable};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaxationStatus {
    Optimal,
    Feasible,
    Infeasible,
}

impl RelaxationStatus {
    pub fn is_usable(&self) -> bool {
        !matches!(self, RelaxationStatus::Infeasible)
    }
}

/// Result of one relaxation solve. `values` follow the model's variable order and are
/// empty when the status is `Infeasible`.
#[derive(Debug, Clone, PartialEq)]
pub struct RelaxationOutcome {
    pub status: RelaxationStatus,
    pub objective: f64,
    pub values: Vec<f64>,
}

impl RelaxationOutcome {
    pub fn optimal(objective: f64, values: Vec<f64>) -> Self {
        Self {
            status: RelaxationStatus::Optimal,
            objective,
            values,
        }
    }

    pub fn infeasible() -> Self {
        Self {
            status: RelaxationStatus::Infeasible,
            objective: f64::INFINITY,
            values: Vec::new(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    #[error("The relaxation is unbounded")]
    Unbounded,
    #[error("Solver backend failure: {0}")]
    Backend(String),
}

/// A black-box LP/MIP backend used by the search to solve node relaxations.
pub trait RelaxationSolver: Send + Sync {
    fn name(&self) -> &str;

    fn solve(&self, model: &LinearModel) -> Result<RelaxationOutcome, SolverError>;
}

/// [`RelaxationSolver`] backed by the pure-Rust `microlp` simplex/branch-and-cut solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicrolpSolver {
    integrality: IntegralityMode,
}

impl MicrolpSolver {
    pub fn new(integrality: IntegralityMode) -> Self {
        Self { integrality }
    }

    pub fn integrality(&self) -> IntegralityMode {
        self.integrality
    }
}

impl RelaxationSolver for MicrolpSolver {
    fn name(&self) -> &str {
        "microlp"
    }

    fn solve(&self, model: &LinearModel) -> Result<RelaxationOutcome, SolverError> {
        let mut problem = Problem::new(OptimizationDirection::Minimize);

        let vars: Vec<Variable> = model
            .variables()
            .iter()
            .map(|v| match v.kind {
                VariableKind::Binary
                    if self.integrality == IntegralityMode::Enforced && !v.is_fixed() =>
                {
                    problem.add_integer_var(v.objective, (v.lower as i32, v.upper as i32))
                }
                _ => problem.add_var(v.objective, (v.lower, v.upper)),
            })
            .collect();

        for constraint in model.constraints() {
            if constraint.terms.is_empty() {
                if constraint.lower > 0.0 || constraint.upper < 0.0 {
                    trace!(constraint = %constraint.name, "Empty constraint cannot be met.");
                    return Ok(RelaxationOutcome::infeasible());
                }
                continue;
            }

            let terms: Vec<(Variable, f64)> = constraint
                .terms
                .iter()
                .map(|&(index, coef)| (vars[index], coef))
                .collect();

            if constraint.lower == constraint.upper {
                problem.add_constraint(&terms, ComparisonOp::Eq, constraint.lower);
                continue;
            }
            if constraint.lower.is_finite() {
                problem.add_constraint(&terms, ComparisonOp::Ge, constraint.lower);
            }
            if constraint.upper.is_finite() {
                problem.add_constraint(&terms, ComparisonOp::Le, constraint.upper);
            }
        }

        match problem.solve() {
            Ok(solution) => {
                let values = vars.iter().map(|&var| *solution.var_value(var)).collect();
                Ok(RelaxationOutcome::optimal(solution.objective(), values))
            }
            Err(microlp::Error::Infeasible) => Ok(RelaxationOutcome::infeasible()),
            Err(microlp::Error::Unbounded) => Err(SolverError::Unbounded),
            Err(e) => Err(SolverError::Backend(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::builder::ProcessNetworkBuilder;
    use crate::core::models::material::MaterialType;
    use crate::core::models::network::ProcessNetwork;
    use crate::engine::model::{BoundOverrides, ConstraintBuilder};

    const EPS: f64 = 1e-6;

    fn single_unit_network(demand: u32, capacity: u32) -> ProcessNetwork {
        let mut builder = ProcessNetworkBuilder::new();
        builder.add_material("A", MaterialType::RawMaterial).unwrap();
        builder.add_material("C", MaterialType::Product).unwrap();
        builder.set_lower_bound("C", demand).unwrap();
        builder.add_unit("U1", capacity, 5, 1).unwrap();
        builder.connect("U1", "A", "C").unwrap();
        builder.build().unwrap()
    }

    fn solve(network: &ProcessNetwork, mode: IntegralityMode, overrides: BoundOverrides) -> RelaxationOutcome {
        let model = ConstraintBuilder::new(network)
            .unwrap()
            .build(&overrides)
            .unwrap();
        MicrolpSolver::new(mode).solve(&model).unwrap()
    }

    #[test]
    fn relaxed_mode_returns_fractional_activation() {
        let network = single_unit_network(4, 10);
        let outcome = solve(&network, IntegralityMode::Relaxed, BoundOverrides::none(2));

        assert_eq!(outcome.status, RelaxationStatus::Optimal);
        assert!((outcome.objective - 6.0).abs() < EPS);
        assert!((outcome.values[0] - 4.0).abs() < EPS);
        assert!((outcome.values[1] - 0.4).abs() < EPS);
    }

    #[test]
    fn enforced_mode_returns_integral_activation() {
        let network = single_unit_network(4, 10);
        let outcome = solve(&network, IntegralityMode::Enforced, BoundOverrides::none(2));

        assert!(outcome.status.is_usable());
        assert!((outcome.objective - 9.0).abs() < EPS);
        assert!((outcome.values[0] - 4.0).abs() < EPS);
        assert!((outcome.values[1] - 1.0).abs() < EPS);
    }

    #[test]
    fn pinned_activation_is_respected() {
        let network = single_unit_network(4, 10);
        let outcome = solve(
            &network,
            IntegralityMode::Relaxed,
            BoundOverrides::none(2).with(1, 1),
        );
        assert!((outcome.values[1] - 1.0).abs() < EPS);
        assert!((outcome.objective - 9.0).abs() < EPS);
    }

    #[test]
    fn unmet_capacity_is_infeasible() {
        let network = single_unit_network(10, 5);
        let outcome = solve(&network, IntegralityMode::Relaxed, BoundOverrides::none(2));
        assert_eq!(outcome.status, RelaxationStatus::Infeasible);
        assert!(outcome.values.is_empty());
        assert!(!outcome.status.is_usable());
    }

    #[test]
    fn closed_activation_blocks_demand() {
        let network = single_unit_network(4, 10);
        let outcome = solve(
            &network,
            IntegralityMode::Relaxed,
            BoundOverrides::none(2).with(1, 0),
        );
        assert_eq!(outcome.status, RelaxationStatus::Infeasible);
    }
}
