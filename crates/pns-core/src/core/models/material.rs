use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialType {
    RawMaterial,
    Intermediate,
    Product,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid material type '{0}'. Expected 'raw_material', 'intermediate' or 'product'")]
pub struct ParseMaterialTypeError(pub String);

impl MaterialType {
    /// Keyword used for this type in the problem-definition format.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::RawMaterial => "raw_material",
            Self::Intermediate => "intermediate",
            Self::Product => "product",
        }
    }
}

impl FromStr for MaterialType {
    type Err = ParseMaterialTypeError;

    // Case-insensitive; spaces and underscores are interchangeable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| if c == ' ' { '_' } else { c.to_ascii_lowercase() })
            .collect();
        match normalized.as_str() {
            "raw_material" => Ok(Self::RawMaterial),
            "intermediate" => Ok(Self::Intermediate),
            "product" => Ok(Self::Product),
            _ => Err(ParseMaterialTypeError(s.trim().to_string())),
        }
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::RawMaterial => "Raw Material",
                Self::Intermediate => "Intermediate",
                Self::Product => "Product",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Material {
    name: String,
    material_type: MaterialType,
    lower_bound: u32, // Minimum required net flow rate
}

impl Material {
    pub fn new(name: &str, material_type: MaterialType) -> Self {
        Self {
            name: name.to_string(),
            material_type,
            lower_bound: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn material_type(&self) -> MaterialType {
        self.material_type
    }

    pub fn lower_bound(&self) -> u32 {
        self.lower_bound
    }

    pub(crate) fn set_lower_bound(&mut self, lower_bound: u32) {
        self.lower_bound = lower_bound;
    }
}
