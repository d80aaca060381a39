use crate::{atomic_data::ElementSymbol, periodic_table::MaterialData};

#[derive(Debug, Clone, PartialEq)]
pub struct Constituent {
    pub element: ElementSymbol,
    /// Moles per formula unit.
    pub moles: f64,
}

/// A compound or metal target. Derived quantities live in
/// [`crate::propagate::MaterialState`] and [`crate::density::Densities`].
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub constituents: Vec<Constituent>,
    /// g/cm^3
    pub mass_density: f64,
    /// Sample mass in g; one mole of formula units when `None`.
    pub sample_mass: Option<f64>,
}

impl Material {
    pub fn from_data(data: &MaterialData) -> Material {
        Material {
            name: data.name.clone(),
            constituents: data
                .composition
                .iter()
                .map(|(element, moles)| Constituent {
                    element: element.clone(),
                    moles: *moles,
                })
                .collect(),
            mass_density: data.mass_density,
            sample_mass: None,
        }
    }

    pub fn contains(&self, element: &ElementSymbol) -> bool {
        self.constituents.iter().any(|c| &c.element == element)
    }

    pub fn total_moles(&self) -> f64 {
        self.constituents.iter().map(|c| c.moles).sum()
    }
}
