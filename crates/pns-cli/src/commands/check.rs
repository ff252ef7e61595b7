use super::load_network;
use crate::cli::CheckArgs;
use crate::error::Result;
use pnsynth::core::models::network::ProcessNetwork;

pub fn run(args: CheckArgs) -> Result<()> {
    let network = load_network(&args.input)?;
    print!("{}", summarize(&network));
    Ok(())
}

fn summarize(network: &ProcessNetwork) -> String {
    let mut lines = vec![
        format!(
            "Problem definition is valid: {} material(s), {} operating unit(s).",
            network.material_count(),
            network.units().len()
        ),
        format!(
            "The model will have {} variable(s).",
            network.units().len() * 2
        ),
    ];
    for material in network.unmet_demands() {
        lines.push(format!(
            "Warning: material '{}' requires {} but no unit produces it; the demand is not enforced.",
            material.name(),
            material.lower_bound()
        ));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{CHAINED, write_problem};
    use crate::error::CliError;

    #[test]
    fn valid_definition_is_summarized() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_problem(&dir, "chain.pns", CHAINED);
        let network = load_network(&path).unwrap();

        let text = summarize(&network);
        assert!(text.starts_with("Problem definition is valid: 3 material(s), 2 operating unit(s)."));
        assert!(text.contains("4 variable(s)"));
        assert!(!text.contains("Warning"));
        assert!(run(CheckArgs { input: path }).is_ok());
    }

    #[test]
    fn unproduced_demand_is_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let content = CHAINED.replace(
            "R: raw_material",
            "R: raw_material\nX: product, flow_rate_lower_bound=2",
        );
        let path = write_problem(&dir, "unmet.pns", &content);
        let text = summarize(&load_network(&path).unwrap());
        assert!(text.contains("Warning: material 'X' requires 2"));
    }

    #[test]
    fn broken_definition_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_problem(&dir, "broken.pns", "materials:\nA raw_material\n");
        let err = run(CheckArgs { input: path.clone() }).unwrap_err();

        assert!(matches!(err, CliError::Definition { .. }));
        assert!(err.to_string().contains("broken.pns"));
    }
}
