use crate::core::io::traits::ProblemFile;
use crate::core::models::builder::ProcessNetworkBuilder;
use crate::core::models::material::{MaterialType, ParseMaterialTypeError};
use crate::core::models::network::{NetworkError, ProcessNetwork};
use std::fmt;
use std::io::{self, BufRead, Write};
use thiserror::Error;

const MATERIALS_HEADER: &str = "materials:";
const UNITS_HEADER: &str = "operating_units:";
const FLOWS_HEADER: &str = "material_to_operating_unit_flow_rates:";

const LOWER_BOUND_KEY: &str = "flow_rate_lower_bound";
const CAPACITY_KEY: &str = "capacity_upper_bound";
const FIXED_COST_KEY: &str = "fixed_cost";
const FIXED_COST_ALIAS: &str = "fix_cost";
const PROPORTIONAL_COST_KEY: &str = "proportional_cost";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Materials,
    OperatingUnits,
    Flows,
}

impl Section {
    fn from_header(line: &str) -> Option<Self> {
        match line {
            MATERIALS_HEADER => Some(Self::Materials),
            UNITS_HEADER => Some(Self::OperatingUnits),
            FLOWS_HEADER => Some(Self::Flows),
            _ => None,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Materials => "material",
                Self::OperatingUnits => "operating unit",
                Self::Flows => "flow rate",
            }
        )
    }
}

#[derive(Debug, Error)]
pub enum PnsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PnsParseErrorKind },
    #[error("Invalid definition on line {line}: {source}")]
    Definition {
        line: usize,
        #[source]
        source: NetworkError,
    },
    #[error("Incomplete network: {0}")]
    Incomplete(#[from] NetworkError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PnsParseErrorKind {
    #[error("Invalid {section} line, expected exactly one ':' separating name and data")]
    InvalidLine { section: Section },
    #[error("Empty name in {section} line")]
    EmptyName { section: Section },
    #[error("Invalid {section} data, expected {expected} comma-separated field(s) but found {found}")]
    InvalidFieldCount {
        section: Section,
        expected: &'static str,
        found: usize,
    },
    #[error("Malformed field '{0}', expected 'key=value'")]
    MalformedField(String),
    #[error("Unknown field '{0}'")]
    UnknownField(String),
    #[error("Field '{0}' is given more than once")]
    DuplicateField(&'static str),
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),
    #[error("Invalid non-negative integer for '{field}' (value: '{value}')")]
    InvalidInteger { field: String, value: String },
    #[error(transparent)]
    InvalidMaterialType(#[from] ParseMaterialTypeError),
    #[error("Invalid flow rate data '{0}', expected 'input => output'")]
    MissingArrow(String),
}

fn parse_error(line: usize, kind: PnsParseErrorKind) -> PnsError {
    PnsError::Parse { line, kind }
}

fn split_name(line: &str, section: Section) -> Result<(&str, &str), PnsParseErrorKind> {
    let (name, data) = line
        .split_once(':')
        .ok_or(PnsParseErrorKind::InvalidLine { section })?;
    if data.contains(':') {
        return Err(PnsParseErrorKind::InvalidLine { section });
    }
    let name = name.trim();
    if name.is_empty() {
        return Err(PnsParseErrorKind::EmptyName { section });
    }
    Ok((name, data.trim()))
}

fn split_key_value(field: &str) -> Result<(&str, &str), PnsParseErrorKind> {
    let (key, value) = field
        .split_once('=')
        .ok_or_else(|| PnsParseErrorKind::MalformedField(field.to_string()))?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return Err(PnsParseErrorKind::MalformedField(field.to_string()));
    }
    Ok((key, value))
}

fn parse_u32(key: &str, value: &str) -> Result<u32, PnsParseErrorKind> {
    value
        .parse::<u32>()
        .map_err(|_| PnsParseErrorKind::InvalidInteger {
            field: key.to_string(),
            value: value.to_string(),
        })
}

#[derive(Debug, PartialEq, Eq)]
struct MaterialLine<'a> {
    name: &'a str,
    material_type: MaterialType,
    lower_bound: Option<u32>,
}

fn parse_material_line(line: &str) -> Result<MaterialLine<'_>, PnsParseErrorKind> {
    let (name, data) = split_name(line, Section::Materials)?;
    let fields: Vec<&str> = data.split(',').map(str::trim).collect();
    if fields.len() > 2 || fields[0].is_empty() {
        return Err(PnsParseErrorKind::InvalidFieldCount {
            section: Section::Materials,
            expected: "1 or 2",
            found: fields.iter().filter(|f| !f.is_empty()).count(),
        });
    }

    let material_type: MaterialType = fields[0].parse()?;
    let lower_bound = match fields.get(1) {
        Some(field) => {
            let (key, value) = split_key_value(field)?;
            if key != LOWER_BOUND_KEY {
                return Err(PnsParseErrorKind::UnknownField(key.to_string()));
            }
            Some(parse_u32(key, value)?)
        }
        None => None,
    };

    Ok(MaterialLine {
        name,
        material_type,
        lower_bound,
    })
}

#[derive(Debug, PartialEq, Eq)]
struct UnitLine<'a> {
    name: &'a str,
    capacity_upper_bound: u32,
    fixed_cost: u32,
    proportional_cost: u32,
}

fn parse_unit_line(line: &str) -> Result<UnitLine<'_>, PnsParseErrorKind> {
    let (name, data) = split_name(line, Section::OperatingUnits)?;
    let fields: Vec<&str> = data.split(',').map(str::trim).collect();
    if fields.len() != 3 {
        return Err(PnsParseErrorKind::InvalidFieldCount {
            section: Section::OperatingUnits,
            expected: "3",
            found: fields.len(),
        });
    }

    let mut capacity = None;
    let mut fixed = None;
    let mut proportional = None;
    for field in fields {
        let (key, value) = split_key_value(field)?;
        let (slot, canonical) = match key {
            CAPACITY_KEY => (&mut capacity, CAPACITY_KEY),
            FIXED_COST_KEY | FIXED_COST_ALIAS => (&mut fixed, FIXED_COST_KEY),
            PROPORTIONAL_COST_KEY => (&mut proportional, PROPORTIONAL_COST_KEY),
            _ => return Err(PnsParseErrorKind::UnknownField(key.to_string())),
        };
        if slot.is_some() {
            return Err(PnsParseErrorKind::DuplicateField(canonical));
        }
        *slot = Some(parse_u32(key, value)?);
    }

    Ok(UnitLine {
        name,
        capacity_upper_bound: capacity.ok_or(PnsParseErrorKind::MissingField(CAPACITY_KEY))?,
        fixed_cost: fixed.ok_or(PnsParseErrorKind::MissingField(FIXED_COST_KEY))?,
        proportional_cost: proportional
            .ok_or(PnsParseErrorKind::MissingField(PROPORTIONAL_COST_KEY))?,
    })
}

fn parse_flow_line(line: &str) -> Result<(&str, &str, &str), PnsParseErrorKind> {
    let (unit, data) = split_name(line, Section::Flows)?;
    let (input, output) = data
        .split_once("=>")
        .ok_or_else(|| PnsParseErrorKind::MissingArrow(data.to_string()))?;
    let input = input.trim();
    let output = output.trim();
    if input.is_empty() || output.is_empty() || output.contains("=>") {
        return Err(PnsParseErrorKind::MissingArrow(data.to_string()));
    }
    Ok((unit, input, output))
}

/// The sectioned text format listing materials, operating units and flows.
///
/// ```text
/// materials:
/// A: raw_material
/// C: product, flow_rate_lower_bound=4
///
/// operating_units:
/// U1: capacity_upper_bound=10, fixed_cost=5, proportional_cost=1
///
/// material_to_operating_unit_flow_rates:
/// U1: A => C
/// ```
pub struct PnsFile;

impl ProblemFile for PnsFile {
    type Error = PnsError;

    fn read_from(reader: &mut impl BufRead) -> Result<ProcessNetwork, Self::Error> {
        let mut builder = ProcessNetworkBuilder::new();
        let mut section: Option<Section> = None;

        for (line_num, line_res) in reader.lines().enumerate() {
            let raw = line_res?;
            let line_num = line_num + 1;
            let line = raw.trim();

            if let Some(header) = Section::from_header(line) {
                section = Some(header);
                continue;
            }
            if line.is_empty() {
                continue;
            }
            let Some(current) = section else {
                continue;
            };

            let definition_error = |source| PnsError::Definition {
                line: line_num,
                source,
            };

            match current {
                Section::Materials => {
                    let parsed = parse_material_line(line).map_err(|k| parse_error(line_num, k))?;
                    builder
                        .add_material(parsed.name, parsed.material_type)
                        .map_err(definition_error)?;
                    if let Some(lower_bound) = parsed.lower_bound {
                        builder
                            .set_lower_bound(parsed.name, lower_bound)
                            .map_err(definition_error)?;
                    }
                }
                Section::OperatingUnits => {
                    let parsed = parse_unit_line(line).map_err(|k| parse_error(line_num, k))?;
                    builder
                        .add_unit(
                            parsed.name,
                            parsed.capacity_upper_bound,
                            parsed.fixed_cost,
                            parsed.proportional_cost,
                        )
                        .map_err(definition_error)?;
                }
                Section::Flows => {
                    let (unit, input, output) =
                        parse_flow_line(line).map_err(|k| parse_error(line_num, k))?;
                    builder
                        .connect(unit, input, output)
                        .map_err(definition_error)?;
                }
            }
        }

        Ok(builder.build()?)
    }

    fn write_to(network: &ProcessNetwork, writer: &mut impl Write) -> Result<(), Self::Error> {
        writeln!(writer, "{}", MATERIALS_HEADER)?;
        for (_, material) in network.materials() {
            write!(
                writer,
                "{}: {}",
                material.name(),
                material.material_type().keyword()
            )?;
            if material.lower_bound() > 0 {
                write!(writer, ", {}={}", LOWER_BOUND_KEY, material.lower_bound())?;
            }
            writeln!(writer)?;
        }

        writeln!(writer)?;
        writeln!(writer, "{}", UNITS_HEADER)?;
        for unit in network.units() {
            writeln!(
                writer,
                "{}: {}={}, {}={}, {}={}",
                unit.name(),
                CAPACITY_KEY,
                unit.capacity_upper_bound(),
                FIXED_COST_KEY,
                unit.fixed_cost(),
                PROPORTIONAL_COST_KEY,
                unit.proportional_cost()
            )?;
        }

        writeln!(writer)?;
        writeln!(writer, "{}", FLOWS_HEADER)?;
        for unit in network.units() {
            let input = unit.input().and_then(|id| network.material(id));
            let output = unit.output().and_then(|id| network.material(id));
            if let (Some(input), Some(output)) = (input, output) {
                writeln!(
                    writer,
                    "{}: {} => {}",
                    unit.name(),
                    input.name(),
                    output.name()
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# comments before the first header are ignored
materials:
A: raw_material
B: Intermediate
C: product, flow_rate_lower_bound=4

operating_units:
U1: capacity_upper_bound=10, fixed_cost=5, proportional_cost=1
U2: proportional_cost=2, fix_cost=3, capacity_upper_bound=8

material_to_operating_unit_flow_rates:
U1: A => B
U2: B => C
";

    fn read(content: &str) -> Result<ProcessNetwork, PnsError> {
        PnsFile::read_from_str(content)
    }

    #[test]
    fn read_parses_all_sections() {
        let network = read(SAMPLE).unwrap();

        assert_eq!(network.material_count(), 3);
        let b = network.material_by_name("B").unwrap();
        assert_eq!(b.material_type(), MaterialType::Intermediate);
        assert_eq!(b.lower_bound(), 0);
        assert_eq!(network.material_by_name("C").unwrap().lower_bound(), 4);

        let u2 = network.unit(1).unwrap();
        assert_eq!(u2.name(), "U2");
        assert_eq!(u2.capacity_upper_bound(), 8);
        assert_eq!(u2.fixed_cost(), 3);
        assert_eq!(u2.proportional_cost(), 2);
        assert_eq!(u2.input(), network.material_id("B"));
        assert_eq!(u2.output(), network.material_id("C"));
    }

    #[test]
    fn write_then_read_preserves_network() {
        let network = read(SAMPLE).unwrap();
        let mut buffer = Vec::new();
        PnsFile::write_to(&network, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("C: product, flow_rate_lower_bound=4\n"));
        assert!(text.contains("A: raw_material\n"));
        assert!(text.contains("U2: capacity_upper_bound=8, fixed_cost=3, proportional_cost=2\n"));
        assert!(text.contains("U1: A => B\n"));

        let reread = read(&text).unwrap();
        assert_eq!(reread.units(), network.units());
        assert_eq!(reread.material_count(), network.material_count());
    }

    #[test]
    fn unknown_material_type_reports_line() {
        let err = read("materials:\nA: catalyst\n").unwrap_err();
        match err {
            PnsError::Parse { line, kind } => {
                assert_eq!(line, 2);
                assert!(matches!(kind, PnsParseErrorKind::InvalidMaterialType(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = read("operating_units:\nU1: capacity_upper_bound=ten, fixed_cost=1, proportional_cost=1\n")
            .unwrap_err();
        assert!(matches!(
            err,
            PnsError::Parse {
                line: 2,
                kind: PnsParseErrorKind::InvalidInteger { .. }
            }
        ));

        let err = read("materials:\nA: product, flow_rate_lower_bound=-3\n").unwrap_err();
        assert!(matches!(
            err,
            PnsError::Parse {
                kind: PnsParseErrorKind::InvalidInteger { .. },
                ..
            }
        ));
    }

    #[test]
    fn wrong_field_counts_are_rejected() {
        let err = read("operating_units:\nU1: capacity_upper_bound=1, fixed_cost=1\n").unwrap_err();
        assert!(matches!(
            err,
            PnsError::Parse {
                kind: PnsParseErrorKind::InvalidFieldCount { found: 2, .. },
                ..
            }
        ));

        let err = read("materials:\nA: product, flow_rate_lower_bound=1, extra=2\n").unwrap_err();
        assert!(matches!(
            err,
            PnsError::Parse {
                kind: PnsParseErrorKind::InvalidFieldCount { .. },
                ..
            }
        ));

        let err = read("materials:\nA product\n").unwrap_err();
        assert!(matches!(
            err,
            PnsError::Parse {
                kind: PnsParseErrorKind::InvalidLine { .. },
                ..
            }
        ));
    }

    #[test]
    fn unit_fields_must_be_known_and_unique() {
        let err = read("operating_units:\nU1: capacity_upper_bound=1, fixed_cost=1, cost=1\n")
            .unwrap_err();
        assert!(matches!(
            err,
            PnsError::Parse {
                kind: PnsParseErrorKind::UnknownField(_),
                ..
            }
        ));

        let err = read("operating_units:\nU1: fixed_cost=1, fix_cost=1, proportional_cost=1\n")
            .unwrap_err();
        assert!(matches!(
            err,
            PnsError::Parse {
                kind: PnsParseErrorKind::DuplicateField("fixed_cost"),
                ..
            }
        ));
    }

    #[test]
    fn unresolved_flow_references_are_fatal() {
        let err = read(
            "materials:\nA: raw_material\noperating_units:\nU1: capacity_upper_bound=1, fixed_cost=1, proportional_cost=1\nmaterial_to_operating_unit_flow_rates:\nU1: A => Z\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PnsError::Definition {
                line: 6,
                source: NetworkError::UnknownMaterial(_)
            }
        ));

        let err = read(
            "materials:\nA: raw_material\nmaterial_to_operating_unit_flow_rates:\nU7: A => A\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PnsError::Definition {
                source: NetworkError::UnknownUnit(_),
                ..
            }
        ));
    }

    #[test]
    fn flow_line_requires_arrow() {
        let err = read("material_to_operating_unit_flow_rates:\nU1: A -> B\n").unwrap_err();
        assert!(matches!(
            err,
            PnsError::Parse {
                kind: PnsParseErrorKind::MissingArrow(_),
                ..
            }
        ));
    }

    #[test]
    fn units_without_flows_fail_at_the_end() {
        let err = read(
            "materials:\nA: raw_material\noperating_units:\nU1: capacity_upper_bound=1, fixed_cost=1, proportional_cost=1\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PnsError::Incomplete(NetworkError::UnlinkedUnit(_))
        ));
    }

    #[test]
    fn read_from_path_uses_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("problem.txt");
        std::fs::write(&path, SAMPLE).unwrap();

        let network = PnsFile::read_from_path(&path).unwrap();
        assert_eq!(network.units().len(), 2);

        let out = dir.path().join("copy.txt");
        PnsFile::write_to_path(&network, &out).unwrap();
        let copy = PnsFile::read_from_path(&out).unwrap();
        assert_eq!(copy.units().len(), 2);
    }
}
