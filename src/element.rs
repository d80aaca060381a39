use crate::{
    atomic_data::{AtomicData, AtomicNumber, ElementSymbol, MassNumber, NuclideKey},
    error::{EnrichError, EnrichResult},
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// Which of the two fraction fields drives a computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FractionKind {
    Amount,
    #[default]
    Mass,
}

impl fmt::Display for FractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FractionKind::Amount => f.write_str("amount"),
            FractionKind::Mass => f.write_str("mass"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Isotope {
    pub mass: MassNumber,
    /// g/mol
    pub molar_mass: f64,
    pub amount_fraction: f64,
    pub mass_fraction: f64,
    /// Lower bound for this isotope's fraction while it donates to another.
    pub floor: f64,
    /// Seconds
    pub half_life: Option<f64>,
}

impl Isotope {
    pub fn fraction(&self, kind: FractionKind) -> f64 {
        match kind {
            FractionKind::Amount => self.amount_fraction,
            FractionKind::Mass => self.mass_fraction,
        }
    }

    pub fn fraction_mut(&mut self, kind: FractionKind) -> &mut f64 {
        match kind {
            FractionKind::Amount => &mut self.amount_fraction,
            FractionKind::Mass => &mut self.mass_fraction,
        }
    }

    /// λ = ln 2 / t½, in 1/s.
    pub fn decay_constant(&self) -> Option<f64> {
        self.half_life.map(|t| std::f64::consts::LN_2 / t)
    }
}

/// Depletion floors: one global value plus per-isotope overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Floors {
    pub global: f64,
    pub overrides: BTreeMap<MassNumber, f64>,
}

impl Floors {
    pub fn uniform(global: f64) -> Floors {
        Floors {
            global,
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_override(mut self, mass: MassNumber, floor: f64) -> Floors {
        self.overrides.insert(mass, floor);
        self
    }

    pub fn floor_for(&self, mass: MassNumber) -> f64 {
        self.overrides.get(&mass).copied().unwrap_or(self.global)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub symbol: ElementSymbol,
    pub anum: AtomicNumber,
    pub isotopes: Vec<Isotope>,
    /// Weighted-average molar mass (g/mol); refreshed by [`crate::molar_mass::reweight`].
    pub molar_mass: f64,
}

impl Element {
    /// Builds the natural composition. Abundances are renormalized so the
    /// amount fractions sum to one.
    pub fn from_data(data: &AtomicData) -> EnrichResult<Element> {
        let mut isotopes = Vec::with_capacity(data.isotopes.len());
        for iso in &data.isotopes {
            if !(iso.molar_mass > 0.0 && iso.molar_mass.is_finite()) {
                return Err(EnrichError::NonPositiveMolarMass {
                    nuclide: NuclideKey::new(data.symb.clone(), iso.mass).to_string(),
                    molar_mass: iso.molar_mass,
                });
            }
            isotopes.push(Isotope {
                mass: iso.mass,
                molar_mass: iso.molar_mass,
                amount_fraction: iso.abundance,
                mass_fraction: 0.0,
                floor: 0.0,
                half_life: iso.half_life,
            });
        }
        isotopes.sort_by_key(|iso| iso.mass);

        let total: f64 = isotopes.iter().map(|iso| iso.amount_fraction).sum();
        if total <= 0.0 {
            return Err(EnrichError::DegenerateComposition {
                element: data.symb.to_string(),
                kind: FractionKind::Amount,
            });
        }
        for iso in &mut isotopes {
            iso.amount_fraction /= total;
        }

        let mut element = Element {
            symbol: data.symb.clone(),
            anum: data.anum,
            isotopes,
            molar_mass: 0.0,
        };
        crate::molar_mass::reweight(&mut element, FractionKind::Amount)?;
        crate::fractions::convert(&mut element, FractionKind::Amount)?;
        Ok(element)
    }

    pub fn position(&self, mass: MassNumber) -> Option<usize> {
        self.isotopes.iter().position(|iso| iso.mass == mass)
    }

    pub fn isotope(&self, mass: MassNumber) -> Option<&Isotope> {
        self.isotopes.iter().find(|iso| iso.mass == mass)
    }

    pub fn isotope_mut(&mut self, mass: MassNumber) -> Option<&mut Isotope> {
        self.isotopes.iter_mut().find(|iso| iso.mass == mass)
    }

    pub fn require(&self, mass: MassNumber) -> EnrichResult<usize> {
        self.position(mass).ok_or_else(|| EnrichError::UnknownIsotope {
            element: self.symbol.to_string(),
            mass: mass.to_string(),
        })
    }

    pub fn key(&self, mass: MassNumber) -> NuclideKey {
        NuclideKey::new(self.symbol.clone(), mass)
    }

    pub fn fraction_sum(&self, kind: FractionKind) -> f64 {
        self.isotopes.iter().map(|iso| iso.fraction(kind)).sum()
    }

    /// Installs depletion floors. Each floor must lie in `[0, 1]` and the
    /// floors of one element together may not exceed 1.
    pub fn apply_floors(&mut self, floors: &Floors) -> EnrichResult<()> {
        for mass in floors.overrides.keys() {
            self.require(*mass)?;
        }
        let mut total = 0.0;
        for iso in &self.isotopes {
            let floor = floors.floor_for(iso.mass);
            if !(0.0..=1.0).contains(&floor) {
                return Err(EnrichError::InvalidFloor(format!(
                    "{} floor {} outside [0, 1]",
                    self.key(iso.mass),
                    floor
                )));
            }
            total += floor;
        }
        if total > 1.0 {
            return Err(EnrichError::InvalidFloor(format!(
                "floors of {} sum to {} > 1",
                self.symbol, total
            )));
        }
        for iso in &mut self.isotopes {
            iso.floor = floors.floor_for(iso.mass);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{constants::FRACTION_TOLERANCE, periodic_table::PeriodicTable};
    use approx::assert_relative_eq;

    fn molybdenum() -> Element {
        let data = PeriodicTable::global()
            .by_symbol(&ElementSymbol::new("Mo"))
            .unwrap();
        Element::from_data(data).unwrap()
    }

    #[test]
    fn natural_composition_is_normalized_in_both_kinds() {
        let mo = molybdenum();
        assert!((mo.fraction_sum(FractionKind::Amount) - 1.0).abs() < FRACTION_TOLERANCE);
        assert!((mo.fraction_sum(FractionKind::Mass) - 1.0).abs() < FRACTION_TOLERANCE);
        assert_relative_eq!(mo.molar_mass, 95.95, epsilon = 0.01);
    }

    #[test]
    fn isotopes_are_ordered_by_mass_number() {
        let mo = molybdenum();
        let masses: Vec<u32> = mo.isotopes.iter().map(|iso| iso.mass.a).collect();
        assert_eq!(masses, vec![92, 94, 95, 96, 97, 98, 100]);
    }

    #[test]
    fn floors_respect_overrides() {
        let mut mo = molybdenum();
        let floors = Floors::uniform(0.01).with_override(MassNumber::ground(98), 0.2);
        mo.apply_floors(&floors).unwrap();
        assert_eq!(mo.isotope(MassNumber::ground(92)).unwrap().floor, 0.01);
        assert_eq!(mo.isotope(MassNumber::ground(98)).unwrap().floor, 0.2);
    }

    #[test]
    fn invalid_floors_are_rejected() {
        let mut mo = molybdenum();
        assert!(mo.apply_floors(&Floors::uniform(-0.1)).is_err());
        assert!(mo.apply_floors(&Floors::uniform(0.2)).is_err());
        let unknown = Floors::uniform(0.0).with_override(MassNumber::ground(93), 0.1);
        assert!(matches!(
            mo.apply_floors(&unknown),
            Err(EnrichError::UnknownIsotope { .. })
        ));
        // a rejected call leaves the previous floors in place
        assert!(mo.isotopes.iter().all(|iso| iso.floor == 0.0));
    }

    #[test]
    fn decay_constant_from_half_life() {
        let mo = molybdenum();
        let mo100 = mo.isotope(MassNumber::ground(100)).unwrap();
        let lambda = mo100.decay_constant().unwrap();
        assert_relative_eq!(lambda * mo100.half_life.unwrap(), std::f64::consts::LN_2);
        assert!(mo.isotope(MassNumber::ground(98)).unwrap().decay_constant().is_none());
    }

    #[test]
    fn zero_molar_mass_is_a_configuration_error() {
        let data = AtomicData {
            anum: AtomicNumber(1),
            symb: ElementSymbol::new("H"),
            name: "Hydrogen".to_string(),
            isotopes: vec![crate::atomic_data::IsotopeData::stable(1, 0.0, 1.0)],
        };
        assert!(matches!(
            Element::from_data(&data),
            Err(EnrichError::NonPositiveMolarMass { .. })
        ));
    }
}
