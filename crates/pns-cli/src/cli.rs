use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "PNSynth Developers",
    version,
    about = "PNSynth CLI - Process Network Synthesis by branch-and-bound over operating-unit activations.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used by the parallel search strategy.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the branch-and-bound tree for a problem definition and report the optimum.
    Solve(SolveArgs),
    /// Parse and validate a problem definition without solving it.
    Check(CheckArgs),
    /// Rewrite a problem definition in canonical form.
    Format(FormatArgs),
}

/// Arguments for the `solve` subcommand.
#[derive(Args, Debug, Default)]
pub struct SolveArgs {
    /// Path to the problem definition file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Search Overrides ---
    /// Tree expansion strategy: 'sequential' or 'parallel'.
    #[arg(long, value_name = "STRATEGY")]
    pub strategy: Option<String>,

    /// Activation handling in the relaxation: 'relaxed' or 'enforced'.
    #[arg(long, value_name = "MODE")]
    pub integrality: Option<String>,

    /// Skip subtrees whose relaxation cannot beat the best integral solution so far.
    #[arg(long)]
    pub prune: bool,

    /// Distance from the nearest integer below which a value counts as integral.
    #[arg(long, value_name = "FLOAT")]
    pub tolerance: Option<f64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S search.strategy=parallel
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,

    // --- Output ---
    /// Print an indented outline of the whole search tree.
    #[arg(long)]
    pub tree: bool,

    /// Write the text report to a file instead of only printing it.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Export the complete search tree as JSON.
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the problem definition file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,
}

/// Arguments for the `format` subcommand.
#[derive(Args, Debug)]
pub struct FormatArgs {
    /// Path to the problem definition file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Destination of the canonical definition. Printed to stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve_arguments_are_parsed() {
        let cli = Cli::parse_from([
            "pnsynth",
            "-vv",
            "solve",
            "-i",
            "problem.pns",
            "--strategy",
            "parallel",
            "--prune",
            "-S",
            "search.integrality=enforced",
            "--tree",
        ]);

        assert_eq!(cli.verbose, 2);
        let Commands::Solve(args) = cli.command else {
            panic!("Expected 'solve' subcommand");
        };
        assert_eq!(args.input, PathBuf::from("problem.pns"));
        assert_eq!(args.strategy.as_deref(), Some("parallel"));
        assert!(args.prune);
        assert!(args.tree);
        assert_eq!(args.set_values, vec!["search.integrality=enforced"]);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["pnsynth", "-q", "-v", "check", "-i", "p.pns"]);
        assert!(result.is_err());
    }

    #[test]
    fn global_thread_flag_is_accepted_after_subcommand() {
        let cli = Cli::parse_from(["pnsynth", "format", "-i", "p.pns", "-j", "4"]);
        assert_eq!(cli.threads, Some(4));
        assert!(matches!(cli.command, Commands::Format(FormatArgs { output: None, .. })));
    }
}
