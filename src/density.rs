//! Mass and number densities at material, element and isotope granularity.
//!
//! Mass densities are g/cm^3, number densities 1/cm^3 (formula units for
//! the material, atoms for elements and isotopes).

use crate::{
    atomic_data::{ElementSymbol, NuclideKey},
    constants::AVOGADRO,
    error::{EnrichError, EnrichResult},
    material::Material,
    propagate::MaterialState,
};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Density {
    pub mass_density: f64,
    pub number_density: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Densities {
    pub material: Density,
    pub elements: BTreeMap<ElementSymbol, Density>,
    pub isotopes: BTreeMap<NuclideKey, Density>,
}

impl Densities {
    pub fn element(&self, symbol: &ElementSymbol) -> Option<&Density> {
        self.elements.get(symbol)
    }

    pub fn isotope(&self, key: &NuclideKey) -> Option<&Density> {
        self.isotopes.get(key)
    }
}

fn number_density(
    mass_density: f64,
    molar_mass: f64,
    what: &dyn std::fmt::Display,
) -> EnrichResult<f64> {
    if !(molar_mass > 0.0 && molar_mass.is_finite()) {
        return Err(EnrichError::NonPositiveMolarMass {
            nuclide: what.to_string(),
            molar_mass,
        });
    }
    Ok(mass_density * AVOGADRO / molar_mass)
}

pub fn densities(material: &Material, state: &MaterialState) -> EnrichResult<Densities> {
    let material_density = Density {
        mass_density: material.mass_density,
        number_density: number_density(material.mass_density, state.molar_mass, &material.name)?,
    };

    let mut elements = BTreeMap::new();
    for constituent in &state.constituents {
        let mass_density = constituent.mass_fraction * material.mass_density;
        elements.insert(
            constituent.element.clone(),
            Density {
                mass_density,
                number_density: number_density(
                    mass_density,
                    constituent.molar_mass,
                    &constituent.element,
                )?,
            },
        );
    }

    let mut isotopes = BTreeMap::new();
    for (key, iso) in &state.isotopes {
        let element_density = elements
            .get(&key.element)
            .map(|d: &Density| d.mass_density)
            .ok_or_else(|| EnrichError::UnknownElement(key.element.to_string()))?;
        let mass_density = iso.mass_fraction * element_density;
        isotopes.insert(
            key.clone(),
            Density {
                mass_density,
                number_density: number_density(mass_density, iso.molar_mass, key)?,
            },
        );
    }

    Ok(Densities {
        material: material_density,
        elements,
        isotopes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{atomic_data::MassNumber, propagate::propagate, registry::Registry};
    use approx::assert_relative_eq;

    fn moo3() -> (Material, Densities, MaterialState) {
        let registry = Registry::standard().unwrap();
        let material = registry.material("MoO3").unwrap().clone();
        let state = propagate(&material, &registry).unwrap();
        let densities = densities(&material, &state).unwrap();
        (material, densities, state)
    }

    #[test]
    fn element_number_density_follows_stoichiometry() {
        let (_, densities, _) = moo3();
        let n = densities.material.number_density;
        let mo = densities.element(&ElementSymbol::new("Mo")).unwrap();
        let o = densities.element(&ElementSymbol::new("O")).unwrap();
        assert_relative_eq!(mo.number_density, n, max_relative = 1e-12);
        assert_relative_eq!(o.number_density, 3.0 * n, max_relative = 1e-12);
    }

    #[test]
    fn partial_densities_add_up() {
        let (material, densities, _) = moo3();
        let elements: f64 = densities.elements.values().map(|d| d.mass_density).sum();
        assert_relative_eq!(elements, material.mass_density, max_relative = 1e-12);

        let mo = densities.element(&ElementSymbol::new("Mo")).unwrap();
        let mo_isotopes: Vec<&Density> = densities
            .isotopes
            .iter()
            .filter(|(key, _)| key.element.as_str() == "Mo")
            .map(|(_, d)| d)
            .collect();
        let mass: f64 = mo_isotopes.iter().map(|d| d.mass_density).sum();
        let number: f64 = mo_isotopes.iter().map(|d| d.number_density).sum();
        assert_relative_eq!(mass, mo.mass_density, max_relative = 1e-12);
        assert_relative_eq!(number, mo.number_density, max_relative = 1e-9);
    }

    #[test]
    fn isotope_number_density_uses_its_own_molar_mass() {
        let (_, densities, state) = moo3();
        let key = NuclideKey::new("Mo", MassNumber::ground(100));
        let iso = state.isotope(&key).unwrap();
        let d = densities.isotope(&key).unwrap();
        assert_relative_eq!(d.number_density, d.mass_density * AVOGADRO / iso.molar_mass);
    }

    #[test]
    fn molybdenum_metal_number_density() {
        let registry = Registry::standard().unwrap();
        let material = registry.material("Mo").unwrap();
        let state = propagate(material, &registry).unwrap();
        let densities = densities(material, &state).unwrap();
        // 10.28 g/cm^3 of 95.95 g/mol
        assert_relative_eq!(densities.material.number_density, 6.452e22, max_relative = 1e-3);
    }
}
