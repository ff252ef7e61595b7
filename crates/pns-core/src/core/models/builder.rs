use super::ids::MaterialId;
use super::material::{Material, MaterialType};
use super::network::{NetworkError, ProcessNetwork};
use super::unit::OperatingUnit;

/// Incremental construction of a [`ProcessNetwork`].
///
/// Names are unique keys for both materials and units. Flows may only reference names
/// that were declared earlier, and [`ProcessNetworkBuilder::build`] rejects any unit
/// that never received a flow.
pub struct ProcessNetworkBuilder {
    network: ProcessNetwork,
}

impl Default for ProcessNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessNetworkBuilder {
    pub fn new() -> Self {
        Self {
            network: ProcessNetwork::default(),
        }
    }

    pub fn add_material(
        &mut self,
        name: &str,
        material_type: MaterialType,
    ) -> Result<MaterialId, NetworkError> {
        if self.network.material_name_map.contains_key(name) {
            return Err(NetworkError::DuplicateMaterial(name.to_string()));
        }
        let id = self
            .network
            .materials
            .insert(Material::new(name, material_type));
        self.network.material_order.push(id);
        self.network.material_name_map.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn set_lower_bound(
        &mut self,
        material: &str,
        lower_bound: u32,
    ) -> Result<(), NetworkError> {
        let id = self.material_id(material)?;
        if let Some(m) = self.network.materials.get_mut(id) {
            m.set_lower_bound(lower_bound);
        }
        Ok(())
    }

    pub fn add_unit(
        &mut self,
        name: &str,
        capacity_upper_bound: u32,
        fixed_cost: u32,
        proportional_cost: u32,
    ) -> Result<usize, NetworkError> {
        if self.network.unit_name_map.contains_key(name) {
            return Err(NetworkError::DuplicateUnit(name.to_string()));
        }
        let index = self.network.units.len();
        self.network.units.push(OperatingUnit::new(
            name,
            capacity_upper_bound,
            fixed_cost,
            proportional_cost,
        ));
        self.network.unit_name_map.insert(name.to_string(), index);
        Ok(index)
    }

    /// Assigns the input and output material of a unit. A later call for the same unit
    /// replaces the earlier assignment.
    pub fn connect(&mut self, unit: &str, input: &str, output: &str) -> Result<(), NetworkError> {
        let unit_idx = self
            .network
            .unit_name_map
            .get(unit)
            .copied()
            .ok_or_else(|| NetworkError::UnknownUnit(unit.to_string()))?;
        let input_id = self.material_id(input)?;
        let output_id = self.material_id(output)?;

        let unit = &mut self.network.units[unit_idx];
        unit.input = Some(input_id);
        unit.output = Some(output_id);
        Ok(())
    }

    pub fn build(mut self) -> Result<ProcessNetwork, NetworkError> {
        if let Some(unit) = self.network.units.iter().find(|u| !u.is_linked()) {
            return Err(NetworkError::UnlinkedUnit(unit.name().to_string()));
        }
        self.network.rebuild_flows();
        Ok(self.network)
    }

    fn material_id(&self, name: &str) -> Result<MaterialId, NetworkError> {
        self.network
            .material_name_map
            .get(name)
            .copied()
            .ok_or_else(|| NetworkError::UnknownMaterial(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_produces_linked_network() {
        let mut builder = ProcessNetworkBuilder::new();
        let a = builder.add_material("A", MaterialType::RawMaterial).unwrap();
        let c = builder.add_material("C", MaterialType::Product).unwrap();
        builder.set_lower_bound("C", 4).unwrap();
        let idx = builder.add_unit("U1", 10, 5, 1).unwrap();
        builder.connect("U1", "A", "C").unwrap();
        let network = builder.build().unwrap();

        assert_eq!(idx, 0);
        let unit = network.unit(0).unwrap();
        assert_eq!(unit.input(), Some(a));
        assert_eq!(unit.output(), Some(c));
        assert_eq!(network.material(c).unwrap().lower_bound(), 4);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut builder = ProcessNetworkBuilder::new();
        builder.add_material("A", MaterialType::RawMaterial).unwrap();
        assert_eq!(
            builder.add_material("A", MaterialType::Product),
            Err(NetworkError::DuplicateMaterial("A".to_string()))
        );
        builder.add_unit("U1", 1, 1, 1).unwrap();
        assert_eq!(
            builder.add_unit("U1", 2, 2, 2),
            Err(NetworkError::DuplicateUnit("U1".to_string()))
        );
    }

    #[test]
    fn connect_rejects_unknown_names() {
        let mut builder = ProcessNetworkBuilder::new();
        builder.add_material("A", MaterialType::RawMaterial).unwrap();
        builder.add_unit("U1", 1, 1, 1).unwrap();
        assert_eq!(
            builder.connect("U2", "A", "A"),
            Err(NetworkError::UnknownUnit("U2".to_string()))
        );
        assert_eq!(
            builder.connect("U1", "A", "B"),
            Err(NetworkError::UnknownMaterial("B".to_string()))
        );
        assert_eq!(
            builder.set_lower_bound("B", 3),
            Err(NetworkError::UnknownMaterial("B".to_string()))
        );
    }

    #[test]
    fn build_rejects_unlinked_units() {
        let mut builder = ProcessNetworkBuilder::new();
        builder.add_material("A", MaterialType::RawMaterial).unwrap();
        builder.add_unit("U1", 1, 1, 1).unwrap();
        assert_eq!(
            builder.build().unwrap_err(),
            NetworkError::UnlinkedUnit("U1".to_string())
        );
    }

    #[test]
    fn empty_builder_yields_empty_network() {
        let network = ProcessNetworkBuilder::new().build().unwrap();
        assert!(network.units().is_empty());
        assert_eq!(network.material_count(), 0);
        assert!(network.flows().is_empty());
    }
}
