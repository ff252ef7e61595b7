use super::load_network;
use crate::cli::SolveArgs;
use crate::config::builder::build_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use anyhow::Context;
use pnsynth::core::models::network::ProcessNetwork;
use pnsynth::engine::progress::ProgressReporter;
use pnsynth::engine::state::SearchTree;
use pnsynth::workflows::{self, report, solve::SolveResult};
use std::fmt::Write as _;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{info, warn};

pub fn run(args: SolveArgs) -> Result<()> {
    info!("Merging configuration from defaults, file and CLI arguments...");
    let app_config = build_config(&args)?;
    let network = load_network(&app_config.input_path)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Solving {} ({} unit(s), {} search, {} integrality)...",
        app_config.input_path.display(),
        network.units().len(),
        app_config.core_config.strategy,
        app_config.core_config.integrality
    );
    info!("Invoking the core solve workflow...");
    let result = workflows::solve::run(&network, &app_config.core_config, &reporter)?;

    if result.tree.best().is_none() {
        warn!("Search completed but found no integral solution.");
    }

    let text = render_report(&network, &result, app_config.show_tree);
    print!("{}", text);

    if let Some(path) = &app_config.report_path {
        info!("Writing report to {:?}", path);
        std::fs::write(path, &text)?;
        println!("Report written to: {}", path.display());
    }

    if let Some(path) = &app_config.json_path {
        write_json(path, &result.tree)?;
        println!("Search tree exported to: {}", path.display());
    }

    Ok(())
}

fn render_report(network: &ProcessNetwork, result: &SolveResult, show_tree: bool) -> String {
    let summary = result.tree.summary();
    let mut out = String::new();

    let _ = writeln!(out, "\n=== Search Summary ===");
    let _ = writeln!(out, "Solver:       {}", result.solver);
    let _ = writeln!(
        out,
        "Nodes:        {} (branched {}, integral {}, infeasible {}, pruned {}, solver errors {})",
        summary.nodes,
        summary.branched,
        summary.integral,
        summary.infeasible,
        summary.pruned,
        summary.solver_errors
    );
    let _ = writeln!(out, "Max level:    {}", summary.max_level);
    for material in &result.unmet_demands {
        let _ = writeln!(
            out,
            "Warning: demand of '{}' is not enforced because no unit produces it.",
            material
        );
    }

    match result.tree.best() {
        Some(best) => {
            let _ = writeln!(out, "\n=== Best Solution ===");
            out.push_str(&report::describe_node(best));
            if let Some(breakdown) = report::objective_breakdown(network, best) {
                let _ = writeln!(out, "\n=== Objective ===");
                out.push_str(&breakdown);
            }
        }
        None => {
            let _ = writeln!(out, "\nNo integral solution was found.");
            let _ = writeln!(out, "{}", report::describe_node(result.tree.root()).trim_end());
        }
    }

    if show_tree {
        let _ = writeln!(out, "\n=== Search Tree ===");
        out.push_str(&report::render_tree(&result.tree));
    }
    out
}

fn write_json(path: &Path, tree: &SearchTree) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file {}", path.display()))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, tree)
        .with_context(|| format!("Failed to write JSON to {}", path.display()))?;
    Ok(())
}
