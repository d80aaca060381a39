//! Weighted-average molar mass of an element.
//!
//! Amount fractions weight arithmetically, mass fractions harmonically. In
//! the harmonic form the numerator is the actual mass-fraction sum rather
//! than 1, so drift in the fractions shows up in the result.

use crate::{
    element::{Element, FractionKind, Isotope},
    error::{EnrichError, EnrichResult},
};

pub fn weighted_molar_mass(element: &Element, kind: FractionKind) -> EnrichResult<f64> {
    for iso in &element.isotopes {
        check_molar_mass(element, iso)?;
    }

    match kind {
        FractionKind::Amount => Ok(element
            .isotopes
            .iter()
            .map(|iso| iso.amount_fraction * iso.molar_mass)
            .sum()),
        FractionKind::Mass => {
            let numerator: f64 = element.isotopes.iter().map(|iso| iso.mass_fraction).sum();
            let denominator: f64 = element
                .isotopes
                .iter()
                .map(|iso| iso.mass_fraction / iso.molar_mass)
                .sum();
            if denominator <= 0.0 {
                return Err(EnrichError::DegenerateComposition {
                    element: element.symbol.to_string(),
                    kind,
                });
            }
            Ok(numerator / denominator)
        }
    }
}

/// Recomputes and stores the element's average molar mass.
pub fn reweight(element: &mut Element, kind: FractionKind) -> EnrichResult<f64> {
    let molar_mass = weighted_molar_mass(element, kind)?;
    if molar_mass <= 0.0 {
        return Err(EnrichError::DegenerateComposition {
            element: element.symbol.to_string(),
            kind,
        });
    }
    element.molar_mass = molar_mass;
    Ok(molar_mass)
}

fn check_molar_mass(element: &Element, iso: &Isotope) -> EnrichResult<()> {
    if iso.molar_mass > 0.0 && iso.molar_mass.is_finite() {
        Ok(())
    } else {
        Err(EnrichError::NonPositiveMolarMass {
            nuclide: element.key(iso.mass).to_string(),
            molar_mass: iso.molar_mass,
        })
    }
}
