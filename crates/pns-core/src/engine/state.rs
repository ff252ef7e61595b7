use super::model::BoundOverrides;
use serde::Serialize;
use std::fmt;

/// A named variable value reported by a relaxation.
///
/// For a branching fix, `value` is the pinned integer and `previous_value` the
/// fractional value it replaced. For solution snapshots both fields are equal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableState {
    name: String,
    value: f64,
    previous_value: f64,
}

impl VariableState {
    pub fn new(name: impl Into<String>, value: f64, previous_value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            previous_value,
        }
    }

    pub fn snapshot(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, value, value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn value(&self) -> f64 {
        self.value
    }
    pub fn previous_value(&self) -> f64 {
        self.previous_value
    }

    pub fn is_integral(&self, tolerance: f64) -> bool {
        (self.value - self.value.round()).abs() <= tolerance
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeOutcome {
    /// The relaxation was fractional and two children were created.
    Branched,
    /// Every variable is integral; the node is a candidate optimum.
    Integral,
    Infeasible,
    SolverError { message: String },
    /// The relaxation bound cannot beat the incumbent.
    Pruned,
}

impl NodeOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, NodeOutcome::Branched)
    }

    pub fn label(&self) -> &'static str {
        match self {
            NodeOutcome::Branched => "branched",
            NodeOutcome::Integral => "integral",
            NodeOutcome::Infeasible => "infeasible",
            NodeOutcome::SolverError { .. } => "solver error",
            NodeOutcome::Pruned => "pruned",
        }
    }
}

impl fmt::Display for NodeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeOutcome::SolverError { message } => write!(f, "solver error: {}", message),
            other => f.write_str(other.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolutionStatus {
    value: f64,
    feasible: bool,
    best: bool,
    variables: Option<Vec<VariableState>>,
    changed: Option<VariableState>,
    outcome: NodeOutcome,
}

impl SolutionStatus {
    pub fn infeasible(changed: Option<VariableState>) -> Self {
        Self {
            value: f64::INFINITY,
            feasible: false,
            best: false,
            variables: None,
            changed,
            outcome: NodeOutcome::Infeasible,
        }
    }

    pub fn solver_error(changed: Option<VariableState>, message: impl Into<String>) -> Self {
        Self {
            value: f64::INFINITY,
            feasible: false,
            best: false,
            variables: None,
            changed,
            outcome: NodeOutcome::SolverError {
                message: message.into(),
            },
        }
    }

    pub fn solved(
        value: f64,
        variables: Vec<VariableState>,
        changed: Option<VariableState>,
        outcome: NodeOutcome,
    ) -> Self {
        Self {
            value,
            feasible: true,
            best: false,
            variables: Some(variables),
            changed,
            outcome,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }
    pub fn is_feasible(&self) -> bool {
        self.feasible
    }
    pub fn is_best(&self) -> bool {
        self.best
    }
    pub fn variables(&self) -> Option<&[VariableState]> {
        self.variables.as_deref()
    }
    pub fn changed(&self) -> Option<&VariableState> {
        self.changed.as_ref()
    }
    pub fn outcome(&self) -> &NodeOutcome {
        &self.outcome
    }

    pub fn variable(&self, name: &str) -> Option<&VariableState> {
        self.variables()?.iter().find(|v| v.name() == name)
    }

    pub(crate) fn mark_best(&mut self) {
        self.best = true;
    }
}

/// Which child of a branched node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    level: usize,
    overrides: BoundOverrides,
    status: SolutionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    left: Option<Box<Node>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    right: Option<Box<Node>>,
}

impl Node {
    pub(crate) fn leaf(level: usize, overrides: BoundOverrides, status: SolutionStatus) -> Self {
        Self {
            level,
            overrides,
            status,
            left: None,
            right: None,
        }
    }

    pub(crate) fn attach(&mut self, left: Node, right: Node) {
        self.left = Some(Box::new(left));
        self.right = Some(Box::new(right));
    }

    pub fn level(&self) -> usize {
        self.level
    }
    pub fn overrides(&self) -> &BoundOverrides {
        &self.overrides
    }
    pub fn status(&self) -> &SolutionStatus {
        &self.status
    }
    pub fn left(&self) -> Option<&Node> {
        self.left.as_deref()
    }
    pub fn right(&self) -> Option<&Node> {
        self.right.as_deref()
    }

    pub fn child(&self, branch: Branch) -> Option<&Node> {
        match branch {
            Branch::Left => self.left(),
            Branch::Right => self.right(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    fn child_mut(&mut self, branch: Branch) -> Option<&mut Node> {
        match branch {
            Branch::Left => self.left.as_deref_mut(),
            Branch::Right => self.right.as_deref_mut(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchSummary {
    pub nodes: usize,
    pub branched: usize,
    pub integral: usize,
    pub infeasible: usize,
    pub solver_errors: usize,
    pub pruned: usize,
    pub max_level: usize,
    pub best_value: Option<f64>,
}

impl SearchSummary {
    fn collect(root: &Node) -> Self {
        let mut summary = SearchSummary::default();
        for node in PreOrder::new(root) {
            summary.nodes += 1;
            summary.max_level = summary.max_level.max(node.level());
            match node.status().outcome() {
                NodeOutcome::Branched => summary.branched += 1,
                NodeOutcome::Integral => summary.integral += 1,
                NodeOutcome::Infeasible => summary.infeasible += 1,
                NodeOutcome::SolverError { .. } => summary.solver_errors += 1,
                NodeOutcome::Pruned => summary.pruned += 1,
            }
        }
        summary
    }
}

/// The completed branch-and-bound tree of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchTree {
    root: Node,
    best_path: Option<Vec<Branch>>,
    summary: SearchSummary,
}

impl SearchTree {
    /// Assembles the tree and flags the node at `best_path` as the optimum.
    pub(crate) fn new(mut root: Node, best_path: Option<Vec<Branch>>) -> Self {
        let mut best_value = None;
        if let Some(path) = &best_path {
            let mut cursor = Some(&mut root);
            for &branch in path {
                cursor = cursor.and_then(|node| node.child_mut(branch));
            }
            if let Some(node) = cursor {
                node.status.mark_best();
                best_value = Some(node.status.value());
            }
        }
        let mut summary = SearchSummary::collect(&root);
        summary.best_value = best_value;
        Self {
            root,
            best_path,
            summary,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn summary(&self) -> &SearchSummary {
        &self.summary
    }

    pub fn best_path(&self) -> Option<&[Branch]> {
        self.best_path.as_deref()
    }

    pub fn best(&self) -> Option<&Node> {
        self.node_at(self.best_path()?)
    }

    pub fn node_at(&self, path: &[Branch]) -> Option<&Node> {
        path.iter()
            .try_fold(&self.root, |node, &branch| node.child(branch))
    }

    /// Pre-order traversal, left child first.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder::new(&self.root)
    }
}

pub struct PreOrder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> PreOrder<'a> {
    fn new(root: &'a Node) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Some(right) = node.right() {
            self.stack.push(right);
        }
        if let Some(left) = node.left() {
            self.stack.push(left);
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn integral(level: usize, value: f64) -> Node {
        Node::leaf(
            level,
            BoundOverrides::none(2),
            SolutionStatus::solved(
                value,
                vec![VariableState::snapshot("X1", 1.0)],
                Some(VariableState::new("Y1", 1.0, 0.5)),
                NodeOutcome::Integral,
            ),
        )
    }

    fn sample_tree(best: Option<Vec<Branch>>) -> SearchTree {
        let mut root = Node::leaf(
            1,
            BoundOverrides::none(2),
            SolutionStatus::solved(
                3.0,
                vec![VariableState::snapshot("Y1", 0.5)],
                None,
                NodeOutcome::Branched,
            ),
        );
        let left = Node::leaf(
            2,
            BoundOverrides::none(2).with(1, 0),
            SolutionStatus::infeasible(Some(VariableState::new("Y1", 0.0, 0.5))),
        );
        root.attach(left, integral(2, 7.0));
        SearchTree::new(root, best)
    }

    #[test]
    fn preorder_visits_left_before_right() {
        let tree = sample_tree(None);
        let outcomes: Vec<_> = tree
            .iter()
            .map(|n| n.status().outcome().label())
            .collect();
        assert_eq!(outcomes, vec!["branched", "infeasible", "integral"]);
    }

    #[test]
    fn best_flag_is_applied_to_path_target_only() {
        let tree = sample_tree(Some(vec![Branch::Right]));
        let flagged: Vec<_> = tree.iter().filter(|n| n.status().is_best()).collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(tree.best().unwrap().status().value(), 7.0);
        assert_eq!(tree.summary().best_value, Some(7.0));
    }

    #[test]
    fn summary_counts_outcomes() {
        let summary = sample_tree(None).summary().clone();
        assert_eq!(summary.nodes, 3);
        assert_eq!(summary.branched, 1);
        assert_eq!(summary.infeasible, 1);
        assert_eq!(summary.integral, 1);
        assert_eq!(summary.max_level, 2);
        assert_eq!(summary.best_value, None);
    }

    #[test]
    fn node_at_follows_branches() {
        let tree = sample_tree(None);
        assert_eq!(tree.node_at(&[]).unwrap().level(), 1);
        assert!(!tree.node_at(&[Branch::Left]).unwrap().status().is_feasible());
        assert!(tree.node_at(&[Branch::Left, Branch::Left]).is_none());
    }

    #[test]
    fn infeasible_status_has_no_variables() {
        let status = SolutionStatus::infeasible(None);
        assert!(status.variables().is_none());
        assert!(status.changed().is_none());
        assert_eq!(status.value(), f64::INFINITY);
        assert!(status.outcome().is_terminal());
    }

    #[test]
    fn solver_error_outcome_displays_message() {
        let status = SolutionStatus::solver_error(None, "boom");
        assert_eq!(status.outcome().to_string(), "solver error: boom");
        assert!(!status.is_feasible());
    }

    #[test]
    fn variable_integrality_uses_tolerance() {
        assert!(VariableState::snapshot("Y1", 1.0 - 1e-12).is_integral(1e-9));
        assert!(!VariableState::snapshot("Y1", 0.4).is_integral(1e-9));
    }
}
