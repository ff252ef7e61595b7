use super::ids::MaterialId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatingUnit {
    name: String,
    capacity_upper_bound: u32,
    fixed_cost: u32,
    proportional_cost: u32,
    pub(crate) input: Option<MaterialId>,  // Set by the flow section
    pub(crate) output: Option<MaterialId>, // Set by the flow section
}

impl OperatingUnit {
    pub fn new(
        name: &str,
        capacity_upper_bound: u32,
        fixed_cost: u32,
        proportional_cost: u32,
    ) -> Self {
        Self {
            name: name.to_string(),
            capacity_upper_bound,
            fixed_cost,
            proportional_cost,
            input: None,
            output: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity_upper_bound(&self) -> u32 {
        self.capacity_upper_bound
    }

    pub fn fixed_cost(&self) -> u32 {
        self.fixed_cost
    }

    pub fn proportional_cost(&self) -> u32 {
        self.proportional_cost
    }

    pub fn input(&self) -> Option<MaterialId> {
        self.input
    }

    pub fn output(&self) -> Option<MaterialId> {
        self.output
    }

    pub fn is_linked(&self) -> bool {
        self.input.is_some() && self.output.is_some()
    }
}
