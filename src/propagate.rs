//! Material-level quantities derived from the current element compositions,
//! and density change coefficients (DCC) against a captured reference.
//!
//! The reference is taken once per (material, isotope of interest) with
//! [`capture_reference`] and then passed explicitly to every later
//! comparison.
//!
//! DCC per fraction kind:
//! - amount: `(x_after / x_before) * (M_before / M_after)`, with `M` the
//!   material molar mass
//! - mass: `(w_after / w_before) * (W_after / W_before)`, with `W` the mass
//!   fraction of the parent element in the material

use crate::{
    atomic_data::{AtomicNumber, ElementSymbol, MassNumber, NuclideKey},
    element::{Element, FractionKind},
    error::{EnrichError, EnrichResult},
    material::Material,
    registry::Registry,
};
use serde::Serialize;
use std::collections::BTreeMap;

// sweep levels closer than this to the reference level are the reference level
const LEVEL_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstituentState {
    pub element: ElementSymbol,
    pub anum: AtomicNumber,
    pub moles: f64,
    /// g/mol
    pub molar_mass: f64,
    pub amount_fraction: f64,
    pub mass_fraction: f64,
    /// g
    pub mass: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IsotopeState {
    pub key: NuclideKey,
    pub anum: AtomicNumber,
    pub molar_mass: f64,
    /// Within the parent element.
    pub amount_fraction: f64,
    pub mass_fraction: f64,
    /// Within the whole material.
    pub material_amount_fraction: f64,
    pub material_mass_fraction: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialState {
    pub material: String,
    /// g/mol of formula units
    pub molar_mass: f64,
    /// g
    pub mass: f64,
    pub constituents: Vec<ConstituentState>,
    pub isotopes: BTreeMap<NuclideKey, IsotopeState>,
}

impl MaterialState {
    pub fn constituent(&self, element: &ElementSymbol) -> Option<&ConstituentState> {
        self.constituents.iter().find(|c| &c.element == element)
    }

    pub fn isotope(&self, key: &NuclideKey) -> Option<&IsotopeState> {
        self.isotopes.get(key)
    }
}

pub fn propagate(material: &Material, registry: &Registry) -> EnrichResult<MaterialState> {
    let mut elements = Vec::with_capacity(material.constituents.len());
    for constituent in &material.constituents {
        elements.push((constituent, registry.element(&constituent.element)?));
    }

    let molar_mass: f64 = elements
        .iter()
        .map(|(constituent, element)| constituent.moles * element.molar_mass)
        .sum();
    if !(molar_mass > 0.0 && molar_mass.is_finite()) {
        return Err(EnrichError::NonPositiveMolarMass {
            nuclide: material.name.clone(),
            molar_mass,
        });
    }
    let mass = material.sample_mass.unwrap_or(molar_mass);
    let total_moles = material.total_moles();

    let mut constituents = Vec::with_capacity(elements.len());
    let mut isotopes = BTreeMap::new();
    for (constituent, element) in elements {
        let mass_fraction = constituent.moles * element.molar_mass / molar_mass;
        let amount_fraction = constituent.moles / total_moles;
        constituents.push(ConstituentState {
            element: element.symbol.clone(),
            anum: element.anum,
            moles: constituent.moles,
            molar_mass: element.molar_mass,
            amount_fraction,
            mass_fraction,
            mass: mass_fraction * mass,
        });

        for iso in &element.isotopes {
            let key = element.key(iso.mass);
            isotopes.insert(
                key.clone(),
                IsotopeState {
                    key,
                    anum: element.anum,
                    molar_mass: iso.molar_mass,
                    amount_fraction: iso.amount_fraction,
                    mass_fraction: iso.mass_fraction,
                    material_amount_fraction: iso.amount_fraction * amount_fraction,
                    material_mass_fraction: iso.mass_fraction * mass_fraction,
                },
            );
        }
    }

    log::trace!("{}: molar mass {} g/mol", material.name, molar_mass);
    Ok(MaterialState {
        material: material.name.clone(),
        molar_mass,
        mass,
        constituents,
        isotopes,
    })
}

/// Material state captured at the reference enrichment level.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSnapshot {
    pub material: String,
    pub target: NuclideKey,
    pub kind: FractionKind,
    pub level: f64,
    pub molar_mass: f64,
    element_mass_fractions: BTreeMap<ElementSymbol, f64>,
    // (amount, mass) fraction within the parent element
    isotope_fractions: BTreeMap<NuclideKey, (f64, f64)>,
    composition: Element,
}

/// Propagates the current registry state of `material` and records it as the
/// reference for `target`. The target's element must already be at `level`.
pub fn capture_reference(
    material: &Material,
    registry: &Registry,
    target: MassNumber,
    element: &ElementSymbol,
    kind: FractionKind,
    level: f64,
) -> EnrichResult<ReferenceSnapshot> {
    let state = propagate(material, registry)?;
    let composition = registry.element(element)?.clone();
    composition.require(target)?;
    Ok(ReferenceSnapshot::from_state(&state, composition, target, kind, level))
}

impl ReferenceSnapshot {
    pub fn from_state(
        state: &MaterialState,
        composition: Element,
        target: MassNumber,
        kind: FractionKind,
        level: f64,
    ) -> ReferenceSnapshot {
        ReferenceSnapshot {
            material: state.material.clone(),
            target: composition.key(target),
            kind,
            level,
            molar_mass: state.molar_mass,
            element_mass_fractions: state
                .constituents
                .iter()
                .map(|c| (c.element.clone(), c.mass_fraction))
                .collect(),
            isotope_fractions: state
                .isotopes
                .iter()
                .map(|(key, iso)| (key.clone(), (iso.amount_fraction, iso.mass_fraction)))
                .collect(),
            composition,
        }
    }

    /// The element of interest exactly as it was at the reference level.
    pub fn composition(&self) -> &Element {
        &self.composition
    }

    pub fn is_reference_level(&self, level: f64) -> bool {
        (level - self.level).abs() <= LEVEL_TOLERANCE
    }

    /// `None` when the reference fraction is zero or the isotope is not part
    /// of the material.
    pub fn dcc(&self, state: &MaterialState, key: &NuclideKey) -> Option<f64> {
        let &(amount_before, mass_before) = self.isotope_fractions.get(key)?;
        let after = state.isotope(key)?;
        match self.kind {
            FractionKind::Amount => {
                if amount_before == 0.0 {
                    return None;
                }
                Some((after.amount_fraction / amount_before) * (self.molar_mass / state.molar_mass))
            }
            FractionKind::Mass => {
                let element_before = *self.element_mass_fractions.get(&key.element)?;
                let element_after = state.constituent(&key.element)?.mass_fraction;
                if mass_before == 0.0 || element_before == 0.0 {
                    return None;
                }
                Some((after.mass_fraction / mass_before) * (element_after / element_before))
            }
        }
    }

    pub fn dcc_all(&self, state: &MaterialState) -> BTreeMap<NuclideKey, Option<f64>> {
        state
            .isotopes
            .keys()
            .map(|key| (key.clone(), self.dcc(state, key)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        element::Floors,
        fractions,
        redistribute::{DepletionOrder, EnrichmentRequest, IsotopeRedistributor},
    };
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn mo() -> ElementSymbol {
        ElementSymbol::new("Mo")
    }

    fn enrich(registry: &mut Registry, goal: f64, kind: FractionKind) {
        let request = EnrichmentRequest {
            element: mo(),
            isotope: MassNumber::ground(100),
            goal,
            kind,
            order: DepletionOrder::Ascending,
            floors: Floors::default(),
        };
        let element = registry.element_mut(&mo()).unwrap();
        let outcome = IsotopeRedistributor::new()
            .redistribute(element, &request, &mut ChaCha8Rng::seed_from_u64(1))
            .unwrap();
        assert!(!outcome.is_aborted());
        fractions::reconcile(element, kind).unwrap();
    }

    fn natural_fraction(registry: &Registry, kind: FractionKind) -> f64 {
        registry
            .element(&mo())
            .unwrap()
            .isotope(MassNumber::ground(100))
            .unwrap()
            .fraction(kind)
    }

    #[test]
    fn mass_fractions_of_constituents_sum_to_one() {
        let registry = Registry::standard().unwrap();
        let state = propagate(registry.material("MoO3").unwrap(), &registry).unwrap();

        assert_relative_eq!(state.molar_mass, 95.95 + 3.0 * 15.999, epsilon = 0.01);
        let total: f64 = state.constituents.iter().map(|c| c.mass_fraction).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
        let masses: f64 = state.constituents.iter().map(|c| c.mass).sum();
        assert_relative_eq!(masses, state.mass, epsilon = 1e-9);
        let isotopes: f64 = state.isotopes.values().map(|i| i.material_mass_fraction).sum();
        assert_relative_eq!(isotopes, 1.0, epsilon = 1e-9);
        assert_eq!(state.isotopes.len(), 10);
    }

    #[test]
    fn dcc_is_exactly_one_at_the_reference_in_both_modes() {
        for kind in [FractionKind::Amount, FractionKind::Mass] {
            let mut registry = Registry::standard().unwrap();
            enrich(&mut registry, 0.15, kind);
            let material = registry.material("MoO3").unwrap().clone();
            let snapshot =
                capture_reference(&material, &registry, MassNumber::ground(100), &mo(), kind, 0.15)
                    .unwrap();

            let state = propagate(&material, &registry).unwrap();
            for (key, dcc) in snapshot.dcc_all(&state) {
                assert_eq!(dcc, Some(1.0), "{} in {} mode", key, kind);
            }
        }
    }

    #[test]
    fn mass_mode_dcc_combines_isotope_and_element_ratios() {
        let mut registry = Registry::standard().unwrap();
        let material = registry.material("MoO3").unwrap().clone();
        let key = NuclideKey::new("Mo", MassNumber::ground(100));
        let natural = natural_fraction(&registry, FractionKind::Mass);
        let snapshot = capture_reference(
            &material,
            &registry,
            MassNumber::ground(100),
            &mo(),
            FractionKind::Mass,
            natural,
        )
        .unwrap();
        let before = propagate(&material, &registry).unwrap();

        enrich(&mut registry, 0.9, FractionKind::Mass);
        let after = propagate(&material, &registry).unwrap();

        let expected = (0.9 / natural)
            * (after.constituent(&mo()).unwrap().mass_fraction
                / before.constituent(&mo()).unwrap().mass_fraction);
        assert_relative_eq!(snapshot.dcc(&after, &key).unwrap(), expected, epsilon = 1e-12);
        // heavier molybdenum raises its share of the oxide mass
        let w_after = after.constituent(&mo()).unwrap().mass_fraction;
        assert!(w_after > before.constituent(&mo()).unwrap().mass_fraction);
    }

    #[test]
    fn amount_mode_dcc_scales_with_molar_mass() {
        let mut registry = Registry::standard().unwrap();
        let material = registry.material("MoO3").unwrap().clone();
        let natural = natural_fraction(&registry, FractionKind::Amount);
        let snapshot = capture_reference(
            &material,
            &registry,
            MassNumber::ground(100),
            &mo(),
            FractionKind::Amount,
            natural,
        )
        .unwrap();

        enrich(&mut registry, 0.9, FractionKind::Amount);
        let after = propagate(&material, &registry).unwrap();

        let o16 = NuclideKey::new("O", MassNumber::ground(16));
        assert_relative_eq!(
            snapshot.dcc(&after, &o16).unwrap(),
            snapshot.molar_mass / after.molar_mass,
            epsilon = 1e-12
        );
        assert!(snapshot.dcc(&after, &o16).unwrap() < 1.0);

        let mo100 = NuclideKey::new("Mo", MassNumber::ground(100));
        let expected = (0.9 / natural) * (snapshot.molar_mass / after.molar_mass);
        assert_relative_eq!(snapshot.dcc(&after, &mo100).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn dcc_is_undefined_for_isotopes_absent_at_the_reference() {
        let mut registry = Registry::standard().unwrap();
        enrich(&mut registry, 1.0, FractionKind::Mass);
        let material = registry.material("Mo").unwrap().clone();
        let snapshot = capture_reference(
            &material,
            &registry,
            MassNumber::ground(100),
            &mo(),
            FractionKind::Mass,
            1.0,
        )
        .unwrap();

        registry.reset_element(&mo()).unwrap();
        let state = propagate(&material, &registry).unwrap();
        let mo92 = NuclideKey::new("Mo", MassNumber::ground(92));
        assert_eq!(snapshot.dcc(&state, &mo92), None);
        assert!(snapshot.dcc(&state, &NuclideKey::new("O", MassNumber::ground(16))).is_none());
    }

    #[test]
    fn sample_mass_scales_constituent_masses() {
        let registry = Registry::standard().unwrap();
        let mut material = registry.material("MoO3").unwrap().clone();
        material.sample_mass = Some(2.0);
        let state = propagate(&material, &registry).unwrap();
        let total: f64 = state.constituents.iter().map(|c| c.mass).sum();
        assert_relative_eq!(total, 2.0, epsilon = 1e-12);
    }
}
