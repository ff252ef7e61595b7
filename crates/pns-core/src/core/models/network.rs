use super::ids::MaterialId;
use super::material::Material;
use super::unit::OperatingUnit;
use slotmap::SlotMap;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Material '{0}' is declared more than once")]
    DuplicateMaterial(String),
    #[error("Operating unit '{0}' is declared more than once")]
    DuplicateUnit(String),
    #[error("The required material was not found: '{0}'")]
    UnknownMaterial(String),
    #[error("The required operating unit was not found: '{0}'")]
    UnknownUnit(String),
    #[error("Operating unit '{0}' has no input/output flow assigned")]
    UnlinkedUnit(String),
}

/// The units attached to one material in the material-flow graph.
///
/// `producers` and `consumers` hold unit indices in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialFlow {
    pub material: MaterialId,
    pub producers: Vec<usize>,
    pub consumers: Vec<usize>,
}

/// A validated process network: every unit has both an input and an output material.
///
/// Materials and units keep their declaration order. The index of a unit in
/// [`ProcessNetwork::units`] fixes the identity of its decision variables.
#[derive(Debug, Clone, Default)]
pub struct ProcessNetwork {
    /// Primary storage for materials.
    pub(crate) materials: SlotMap<MaterialId, Material>,
    /// Material IDs in declaration order.
    pub(crate) material_order: Vec<MaterialId>,
    /// Lookup map for finding materials by name.
    pub(crate) material_name_map: HashMap<String, MaterialId>,
    /// Operating units in declaration order.
    pub(crate) units: Vec<OperatingUnit>,
    /// Lookup map for finding unit indices by name.
    pub(crate) unit_name_map: HashMap<String, usize>,
    /// Flow graph entries, one per material touched by at least one unit.
    pub(crate) flows: Vec<MaterialFlow>,
}

impl ProcessNetwork {
    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn material_id(&self, name: &str) -> Option<MaterialId> {
        self.material_name_map.get(name).copied()
    }

    pub fn material_by_name(&self, name: &str) -> Option<&Material> {
        self.material_id(name).and_then(|id| self.materials.get(id))
    }

    /// Returns an iterator over all materials in declaration order.
    pub fn materials(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.material_order
            .iter()
            .filter_map(|&id| self.materials.get(id).map(|m| (id, m)))
    }

    pub fn material_count(&self) -> usize {
        self.material_order.len()
    }

    pub fn units(&self) -> &[OperatingUnit] {
        &self.units
    }

    pub fn unit(&self, index: usize) -> Option<&OperatingUnit> {
        self.units.get(index)
    }

    pub fn unit_index(&self, name: &str) -> Option<usize> {
        self.unit_name_map.get(name).copied()
    }

    /// The material-flow graph, in material declaration order.
    pub fn flows(&self) -> &[MaterialFlow] {
        &self.flows
    }

    pub fn flow_of(&self, material: MaterialId) -> Option<&MaterialFlow> {
        self.flows.iter().find(|flow| flow.material == material)
    }

    /// Materials with a positive demand that no unit produces.
    ///
    /// The mass-balance policy emits no constraint for these, so their demand is
    /// silently unenforced.
    pub fn unmet_demands(&self) -> Vec<&Material> {
        self.materials()
            .filter(|(id, material)| {
                material.lower_bound() > 0
                    && self
                        .flow_of(*id)
                        .is_none_or(|flow| flow.producers.is_empty())
            })
            .map(|(_, material)| material)
            .collect()
    }

    pub(crate) fn rebuild_flows(&mut self) {
        let mut index: HashMap<MaterialId, MaterialFlow> = HashMap::new();
        for (unit_idx, unit) in self.units.iter().enumerate() {
            if let Some(input) = unit.input {
                index
                    .entry(input)
                    .or_insert_with(|| MaterialFlow {
                        material: input,
                        producers: Vec::new(),
                        consumers: Vec::new(),
                    })
                    .consumers
                    .push(unit_idx);
            }
            if let Some(output) = unit.output {
                index
                    .entry(output)
                    .or_insert_with(|| MaterialFlow {
                        material: output,
                        producers: Vec::new(),
                        consumers: Vec::new(),
                    })
                    .producers
                    .push(unit_idx);
            }
        }
        self.flows = self
            .material_order
            .iter()
            .filter_map(|id| index.remove(id))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::super::builder::ProcessNetworkBuilder;
    use super::super::material::MaterialType;
    use super::*;

    fn chain_network() -> ProcessNetwork {
        let mut builder = ProcessNetworkBuilder::new();
        builder.add_material("R", MaterialType::RawMaterial).unwrap();
        builder.add_material("I", MaterialType::Intermediate).unwrap();
        builder.add_material("P", MaterialType::Product).unwrap();
        builder.set_lower_bound("P", 5).unwrap();
        builder.add_unit("U1", 10, 10, 1).unwrap();
        builder.add_unit("U2", 10, 3, 2).unwrap();
        builder.connect("U1", "R", "I").unwrap();
        builder.connect("U2", "I", "P").unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn materials_iterate_in_declaration_order() {
        let network = chain_network();
        let names: Vec<&str> = network.materials().map(|(_, m)| m.name()).collect();
        assert_eq!(names, vec!["R", "I", "P"]);
        assert_eq!(network.material_count(), 3);
    }

    #[test]
    fn flows_record_producers_and_consumers() {
        let network = chain_network();
        let r = network.material_id("R").unwrap();
        let i = network.material_id("I").unwrap();
        let p = network.material_id("P").unwrap();

        let flow_r = network.flow_of(r).unwrap();
        assert!(flow_r.producers.is_empty());
        assert_eq!(flow_r.consumers, vec![0]);

        let flow_i = network.flow_of(i).unwrap();
        assert_eq!(flow_i.producers, vec![0]);
        assert_eq!(flow_i.consumers, vec![1]);

        let flow_p = network.flow_of(p).unwrap();
        assert_eq!(flow_p.producers, vec![1]);
        assert!(flow_p.consumers.is_empty());

        let order: Vec<MaterialId> = network.flows().iter().map(|f| f.material).collect();
        assert_eq!(order, vec![r, i, p]);
    }

    #[test]
    fn lookup_by_name_works_for_units_and_materials() {
        let network = chain_network();
        assert_eq!(network.unit_index("U2"), Some(1));
        assert_eq!(network.unit(1).unwrap().name(), "U2");
        assert_eq!(network.material_by_name("P").unwrap().lower_bound(), 5);
        assert!(network.material_by_name("Z").is_none());
        assert!(network.unit_index("U9").is_none());
    }

    #[test]
    fn unmet_demands_lists_unproduced_materials_with_positive_bound() {
        let mut builder = ProcessNetworkBuilder::new();
        builder.add_material("R", MaterialType::RawMaterial).unwrap();
        builder.add_material("P", MaterialType::Product).unwrap();
        builder.add_material("Q", MaterialType::Product).unwrap();
        builder.set_lower_bound("Q", 10).unwrap();
        builder.set_lower_bound("P", 1).unwrap();
        builder.add_unit("U1", 10, 1, 1).unwrap();
        builder.connect("U1", "R", "P").unwrap();
        let network = builder.build().unwrap();

        let unmet: Vec<&str> = network.unmet_demands().iter().map(|m| m.name()).collect();
        assert_eq!(unmet, vec!["Q"]);
        assert!(chain_network().unmet_demands().is_empty());
    }
}
