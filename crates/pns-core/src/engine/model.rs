use super::error::EngineError;
use crate::core::models::network::{NetworkError, ProcessNetwork};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::trace;

/// Name of the continuous flow variable of the unit at `unit_index`.
pub fn flow_variable_name(unit_index: usize) -> String {
    format!("X{}", unit_index + 1)
}

/// Name of the binary activation variable of the unit at `unit_index`.
pub fn activation_variable_name(unit_index: usize) -> String {
    format!("Y{}", unit_index + 1)
}

/// Per-variable bound overrides, one slot per model variable in declaration order.
///
/// `Some(v)` pins both bounds of the variable to `v`; `None` leaves the variable at its
/// natural bounds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BoundOverrides(Vec<Option<i64>>);

impl BoundOverrides {
    pub fn none(len: usize) -> Self {
        Self(vec![None; len])
    }

    pub fn from_slots(slots: Vec<Option<i64>>) -> Self {
        Self(slots)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<i64> {
        self.0.get(index).copied().flatten()
    }

    pub fn is_pinned(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    pub fn pinned_count(&self) -> usize {
        self.0.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn slots(&self) -> &[Option<i64>] {
        &self.0
    }

    /// A copy of these overrides with `index` pinned to `value`.
    pub fn with(&self, index: usize, value: i64) -> Self {
        let mut slots = self.0.clone();
        if let Some(slot) = slots.get_mut(index) {
            *slot = Some(value);
        }
        Self(slots)
    }

    /// Indices whose slot differs between `self` and `other`.
    pub fn diff(&self, other: &BoundOverrides) -> Vec<usize> {
        let len = self.len().max(other.len());
        (0..len)
            .filter(|&i| self.0.get(i).copied().flatten() != other.0.get(i).copied().flatten())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VariableKind {
    Continuous,
    Binary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelVariable {
    pub name: String,
    pub kind: VariableKind,
    pub lower: f64,
    pub upper: f64,
    pub objective: f64,
}

impl ModelVariable {
    pub fn is_fixed(&self) -> bool {
        self.lower == self.upper
    }
}

/// `lower <= sum(coef * var) <= upper`; an infinite side is absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConstraint {
    pub name: String,
    pub terms: Vec<(usize, f64)>,
    pub lower: f64,
    pub upper: f64,
}

/// A minimization problem over the decision variables of one search node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinearModel {
    variables: Vec<ModelVariable>,
    constraints: Vec<ModelConstraint>,
}

impl LinearModel {
    pub fn variables(&self) -> &[ModelVariable] {
        &self.variables
    }

    pub fn constraints(&self) -> &[ModelConstraint] {
        &self.constraints
    }

    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name == name)
    }

    /// Objective value of a point given in variable declaration order.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.variables
            .iter()
            .zip(values)
            .map(|(var, value)| var.objective * value)
            .sum()
    }

    fn push_variable(&mut self, variable: ModelVariable) -> usize {
        self.variables.push(variable);
        self.variables.len() - 1
    }

    fn push_constraint(&mut self, constraint: ModelConstraint) {
        self.constraints.push(constraint);
    }
}

/// Translates a [`ProcessNetwork`] into the per-node [`LinearModel`].
///
/// Every unit contributes a flow variable `X` and an activation variable `Y`, declared
/// in that order. The builder is stateless between calls.
pub struct ConstraintBuilder<'a> {
    network: &'a ProcessNetwork,
}

impl<'a> ConstraintBuilder<'a> {
    pub fn new(network: &'a ProcessNetwork) -> Result<Self, EngineError> {
        if let Some(unit) = network.units().iter().find(|u| !u.is_linked()) {
            return Err(NetworkError::UnlinkedUnit(unit.name().to_string()).into());
        }
        Ok(Self { network })
    }

    pub fn network(&self) -> &'a ProcessNetwork {
        self.network
    }

    pub fn variable_count(&self) -> usize {
        self.network.units().len() * 2
    }

    pub fn flow_index(unit_index: usize) -> usize {
        unit_index * 2
    }

    pub fn activation_index(unit_index: usize) -> usize {
        unit_index * 2 + 1
    }

    pub fn build(&self, overrides: &BoundOverrides) -> Result<LinearModel, EngineError> {
        let expected = self.variable_count();
        if overrides.len() != expected {
            return Err(EngineError::OverrideLength {
                expected,
                found: overrides.len(),
            });
        }

        let mut model = LinearModel::default();

        for (i, unit) in self.network.units().iter().enumerate() {
            let (x_lower, x_upper) = pinned_or(overrides, Self::flow_index(i), (0.0, f64::INFINITY));
            let x = model.push_variable(ModelVariable {
                name: flow_variable_name(i),
                kind: VariableKind::Continuous,
                lower: x_lower,
                upper: x_upper,
                objective: unit.proportional_cost() as f64,
            });

            let (y_lower, y_upper) = pinned_or(overrides, Self::activation_index(i), (0.0, 1.0));
            let y = model.push_variable(ModelVariable {
                name: activation_variable_name(i),
                kind: VariableKind::Binary,
                lower: y_lower,
                upper: y_upper,
                objective: unit.fixed_cost() as f64,
            });

            model.push_constraint(ModelConstraint {
                name: format!("link_{}", unit.name()),
                terms: vec![(x, 1.0), (y, -(unit.capacity_upper_bound() as f64))],
                lower: f64::NEG_INFINITY,
                upper: 0.0,
            });
            model.push_constraint(ModelConstraint {
                name: format!("{}_nonnegative", flow_variable_name(i)),
                terms: vec![(x, 1.0)],
                lower: 0.0,
                upper: f64::INFINITY,
            });
            model.push_constraint(ModelConstraint {
                name: format!("{}_binary_range", activation_variable_name(i)),
                terms: vec![(y, 1.0)],
                lower: 0.0,
                upper: 1.0,
            });
        }

        for flow in self.network.flows() {
            if flow.producers.is_empty() {
                continue;
            }
            let Some(material) = self.network.material(flow.material) else {
                continue;
            };

            // A unit may consume what it produces; its coefficients cancel.
            let mut coefficients: BTreeMap<usize, f64> = BTreeMap::new();
            for &p in &flow.producers {
                *coefficients.entry(Self::flow_index(p)).or_default() += 1.0;
            }
            for &c in &flow.consumers {
                *coefficients.entry(Self::flow_index(c)).or_default() -= 1.0;
            }
            let terms = coefficients
                .into_iter()
                .filter(|&(_, coef)| coef != 0.0)
                .collect();

            model.push_constraint(ModelConstraint {
                name: format!("balance_{}", material.name()),
                terms,
                lower: material.lower_bound() as f64,
                upper: f64::INFINITY,
            });
        }

        trace!(
            variables = model.variables().len(),
            constraints = model.constraints().len(),
            pinned = overrides.pinned_count(),
            "Built relaxation model."
        );
        Ok(model)
    }
}

fn pinned_or(overrides: &BoundOverrides, index: usize, natural: (f64, f64)) -> (f64, f64) {
    match overrides.get(index) {
        Some(v) => (v as f64, v as f64),
        None => natural,
    }
}
