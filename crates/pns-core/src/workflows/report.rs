//! Plain-text rendering of search results.

use crate::core::models::network::ProcessNetwork;
use crate::engine::model::{activation_variable_name, flow_variable_name};
use crate::engine::state::{Node, NodeOutcome, SearchTree, VariableState};
use std::cmp::Ordering;
use std::fmt::Write;

/// Formats a solver value: whole numbers without decimals, others with four.
pub fn format_value(value: f64) -> String {
    if !value.is_finite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.4}", value)
    }
}

/// Orders variable names such as `Y2` before `Y10`.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    fn split(name: &str) -> (&str, Option<u64>) {
        let digits_at = name
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(name.len());
        let (prefix, digits) = name.split_at(digits_at);
        (prefix, digits.parse().ok())
    }
    split(a).cmp(&split(b)).then_with(|| a.cmp(b))
}

fn describe_fix(changed: &VariableState) -> String {
    format!(
        "changed variable [{}={:.4}] to [{}={}]",
        changed.name(),
        changed.previous_value(),
        changed.name(),
        format_value(changed.value())
    )
}

/// Describes the relaxation of one node.
///
/// Nodes with a usable relaxation get a variable table sorted by name; infeasible and
/// failed nodes get a one-line explanation.
pub fn describe_node(node: &Node) -> String {
    let status = node.status();
    let changed = status.changed();

    match status.outcome() {
        NodeOutcome::Infeasible => match changed {
            Some(fix) => format!(
                "Infeasible solution when solving the model with {}",
                describe_fix(fix)
            ),
            None => "Infeasible relaxation at the root (no branching applied)".to_string(),
        },
        NodeOutcome::SolverError { message } => match changed {
            Some(fix) => format!(
                "Solver failure when solving the model with {}: {}",
                describe_fix(fix),
                message
            ),
            None => format!(
                "Solver failure at the root (no branching applied): {}",
                message
            ),
        },
        outcome => {
            let mut out = String::new();
            let _ = writeln!(
                out,
                "Level {} | objective {} | {}{}",
                node.level(),
                format_value(status.value()),
                outcome,
                if status.is_best() { " | best" } else { "" }
            );
            if let Some(fix) = changed {
                let _ = writeln!(out, "Branch: {}", describe_fix(fix));
            }
            if outcome == &NodeOutcome::Pruned {
                let _ = writeln!(out, "Pruned: the relaxation cannot improve on the incumbent");
            }

            let mut variables: Vec<&VariableState> =
                status.variables().unwrap_or_default().iter().collect();
            variables.sort_by(|a, b| natural_cmp(a.name(), b.name()));
            let width = variables
                .iter()
                .map(|v| v.name().len())
                .max()
                .unwrap_or(0)
                .max("Name".len());
            let _ = writeln!(out, "{:<width$}  Value", "Name", width = width);
            for var in variables {
                let _ = writeln!(
                    out,
                    "{:<width$}  {}",
                    var.name(),
                    format_value(var.value()),
                    width = width
                );
            }
            out
        }
    }
}

/// Renders the objective of `node` term by term, one line per operating unit.
///
/// Returns `None` when the node has no usable relaxation.
pub fn objective_breakdown(network: &ProcessNetwork, node: &Node) -> Option<String> {
    let status = node.status();
    status.variables()?;

    let mut out = String::new();
    let mut total = 0.0;
    for (i, unit) in network.units().iter().enumerate() {
        let x_name = flow_variable_name(i);
        let y_name = activation_variable_name(i);
        let x = status.variable(&x_name).map_or(0.0, VariableState::value);
        let y = status.variable(&y_name).map_or(0.0, VariableState::value);
        let pc = unit.proportional_cost() as f64;
        let fc = unit.fixed_cost() as f64;
        let subtotal = pc * x + fc * y;
        total += subtotal;
        let _ = writeln!(
            out,
            "{}: ({} x {}) + ({} x {}) = ({} x {}) + ({} x {}) = {}",
            unit.name(),
            unit.proportional_cost(),
            x_name,
            unit.fixed_cost(),
            y_name,
            unit.proportional_cost(),
            format_value(x),
            unit.fixed_cost(),
            format_value(y),
            format_value(subtotal)
        );
    }
    let _ = writeln!(out, "Total: {}", format_value(total));
    Some(out)
}

/// Indented outline of the whole tree in pre-order, two spaces per level.
pub fn render_tree(tree: &SearchTree) -> String {
    let mut out = String::new();
    for node in tree.iter() {
        let status = node.status();
        let indent = "  ".repeat(node.level().saturating_sub(1));
        let fix = match status.changed() {
            Some(changed) => format!("{}={}", changed.name(), format_value(changed.value())),
            None => "root".to_string(),
        };
        let value = if status.variables().is_some() {
            format_value(status.value())
        } else {
            "-".to_string()
        };
        let _ = writeln!(
            out,
            "{}[L{}] {}: {} ({}){}",
            indent,
            node.level(),
            fix,
            value,
            status.outcome(),
            if status.is_best() { " *best*" } else { "" }
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::pns::PnsFile;
    use crate::core::io::traits::ProblemFile;
    use crate::engine::config::SearchConfig;
    use crate::engine::progress::ProgressReporter;
    use crate::workflows::solve;

    fn solve_text(text: &str) -> (ProcessNetwork, SearchTree) {
        let network = PnsFile::read_from_str(text).unwrap();
        let result = solve::run(&network, &SearchConfig::default(), &ProgressReporter::new()).unwrap();
        (network, result.tree)
    }

    const SINGLE_UNIT: &str = "\
materials:
A: raw_material
C: product, flow_rate_lower_bound=4

operating_units:
U1: capacity_upper_bound=10, fixed_cost=5, proportional_cost=1

material_to_operating_unit_flow_rates:
U1: A => C
";

    #[test]
    fn format_value_drops_decimals_for_integers() {
        assert_eq!(format_value(4.0), "4");
        assert_eq!(format_value(0.4), "0.4000");
        assert_eq!(format_value(-2.0), "-2");
        assert_eq!(format_value(f64::INFINITY), "inf");
    }

    #[test]
    fn natural_order_sorts_numeric_suffixes() {
        let mut names = vec!["Y10", "X2", "Y2", "X10", "X1"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["X1", "X2", "X10", "Y2", "Y10"]);
    }

    #[test]
    fn describe_infeasible_child_names_the_fix() {
        let (_, tree) = solve_text(SINGLE_UNIT);
        let left = tree.root().left().unwrap();
        assert_eq!(
            describe_node(left),
            "Infeasible solution when solving the model with changed variable [Y1=0.4000] to [Y1=0]"
        );
    }

    #[test]
    fn describe_infeasible_root_without_fix() {
        let (_, tree) = solve_text(&SINGLE_UNIT.replace("flow_rate_lower_bound=4", "flow_rate_lower_bound=40"));
        assert_eq!(
            describe_node(tree.root()),
            "Infeasible relaxation at the root (no branching applied)"
        );
    }

    #[test]
    fn describe_solved_node_lists_variables() {
        let (_, tree) = solve_text(SINGLE_UNIT);
        let text = describe_node(tree.best().unwrap());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Level 2 | objective 9 | integral | best");
        assert_eq!(lines[1], "Branch: changed variable [Y1=0.4000] to [Y1=1]");
        assert_eq!(lines[2], "Name  Value");
        assert_eq!(lines[3], "X1    4");
        assert_eq!(lines[4], "Y1    1");
    }

    #[test]
    fn breakdown_sums_every_unit() {
        let (network, tree) = solve_text(SINGLE_UNIT);
        let text = objective_breakdown(&network, tree.best().unwrap()).unwrap();
        assert_eq!(
            text,
            "U1: (1 x X1) + (5 x Y1) = (1 x 4) + (5 x 1) = 9\nTotal: 9\n"
        );
    }

    #[test]
    fn breakdown_is_absent_for_infeasible_nodes() {
        let (network, tree) = solve_text(SINGLE_UNIT);
        assert!(objective_breakdown(&network, tree.root().left().unwrap()).is_none());
    }

    #[test]
    fn tree_outline_indents_by_level() {
        let (_, tree) = solve_text(SINGLE_UNIT);
        assert_eq!(
            render_tree(&tree),
            "[L1] root: 6 (branched)\n  [L2] Y1=0: - (infeasible)\n  [L2] Y1=1: 9 (integral) *best*\n"
        );
    }
}
