use crate::{
    atomic_data::ElementSymbol,
    element::Element,
    error::{EnrichError, EnrichResult},
    material::Material,
    periodic_table::PeriodicTable,
};
use std::collections::BTreeMap;

/// Elements and materials for one run.
///
/// Element fraction state is mutated in place during a sweep; call
/// [`Registry::reset`] before reusing a registry for an independent run.
#[derive(Debug, Clone)]
pub struct Registry {
    elements: BTreeMap<ElementSymbol, Element>,
    natural: BTreeMap<ElementSymbol, Element>,
    materials: BTreeMap<String, Material>,
}

impl Registry {
    pub fn from_table(table: &PeriodicTable) -> EnrichResult<Registry> {
        let mut natural = BTreeMap::new();
        for data in table.elements() {
            natural.insert(data.symb.clone(), Element::from_data(data)?);
        }
        let mut registry = Registry {
            elements: natural.clone(),
            natural,
            materials: BTreeMap::new(),
        };
        for data in table.materials() {
            registry.insert_material(Material::from_data(data))?;
        }
        Ok(registry)
    }

    pub fn standard() -> EnrichResult<Registry> {
        Registry::from_table(PeriodicTable::global())
    }

    pub fn insert_material(&mut self, material: Material) -> EnrichResult<()> {
        for constituent in &material.constituents {
            if !self.elements.contains_key(&constituent.element) {
                return Err(EnrichError::UnknownElement(constituent.element.to_string()));
            }
        }
        self.materials.insert(material.name.clone(), material);
        Ok(())
    }

    pub fn element(&self, symbol: &ElementSymbol) -> EnrichResult<&Element> {
        self.elements
            .get(symbol)
            .ok_or_else(|| EnrichError::UnknownElement(symbol.to_string()))
    }

    pub fn element_mut(&mut self, symbol: &ElementSymbol) -> EnrichResult<&mut Element> {
        self.elements
            .get_mut(symbol)
            .ok_or_else(|| EnrichError::UnknownElement(symbol.to_string()))
    }

    pub fn material(&self, name: &str) -> EnrichResult<&Material> {
        self.materials
            .get(name)
            .ok_or_else(|| EnrichError::UnknownMaterial(name.to_string()))
    }

    /// Restores the natural composition (and zero floors) of one element.
    pub fn reset_element(&mut self, symbol: &ElementSymbol) -> EnrichResult<()> {
        let natural = self
            .natural
            .get(symbol)
            .ok_or_else(|| EnrichError::UnknownElement(symbol.to_string()))?;
        self.elements.insert(symbol.clone(), natural.clone());
        Ok(())
    }

    pub fn reset(&mut self) {
        self.elements = self.natural.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{atomic_data::MassNumber, material::Constituent};

    #[test]
    fn standard_registry_holds_tabulated_materials() {
        let registry = Registry::standard().unwrap();
        let moo3 = registry.material("MoO3").unwrap();
        assert_eq!(moo3.constituents.len(), 2);
        assert_eq!(moo3.total_moles(), 4.0);
        assert!(moo3.contains(&ElementSymbol::new("O")));
        assert!(registry.material("Unobtainium").is_err());
    }

    #[test]
    fn reset_restores_natural_fractions() {
        let mut registry = Registry::standard().unwrap();
        let mo = ElementSymbol::new("Mo");
        let natural = registry.element(&mo).unwrap().clone();

        let element = registry.element_mut(&mo).unwrap();
        element.isotope_mut(MassNumber::ground(100)).unwrap().mass_fraction = 0.9;
        assert_ne!(registry.element(&mo).unwrap(), &natural);

        registry.reset_element(&mo).unwrap();
        assert_eq!(registry.element(&mo).unwrap(), &natural);

        registry.element_mut(&mo).unwrap().molar_mass = 1.0;
        registry.reset();
        assert_eq!(registry.element(&mo).unwrap(), &natural);
    }

    #[test]
    fn materials_must_use_known_elements() {
        let mut registry = Registry::standard().unwrap();
        let material = Material {
            name: "UO2".to_string(),
            constituents: vec![Constituent {
                element: ElementSymbol::new("U"),
                moles: 1.0,
            }],
            mass_density: 10.97,
            sample_mass: None,
        };
        assert!(matches!(
            registry.insert_material(material),
            Err(EnrichError::UnknownElement(_))
        ));
    }
}
