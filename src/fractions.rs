use crate::{
    element::{Element, FractionKind},
    error::{EnrichError, EnrichResult},
    molar_mass,
};

/// Fills the non-driving fraction of every isotope from the driving one.
///
/// Uses `element.molar_mass` as is; it must already hold the average
/// weighted by `from`.
pub fn convert(element: &mut Element, from: FractionKind) -> EnrichResult<()> {
    let avg = element.molar_mass;
    if !(avg > 0.0 && avg.is_finite()) {
        return Err(EnrichError::NonPositiveMolarMass {
            nuclide: element.symbol.to_string(),
            molar_mass: avg,
        });
    }

    for iso in &mut element.isotopes {
        match from {
            FractionKind::Amount => iso.mass_fraction = iso.amount_fraction * iso.molar_mass / avg,
            FractionKind::Mass => iso.amount_fraction = iso.mass_fraction * avg / iso.molar_mass,
        }
    }
    Ok(())
}

/// Brings both fraction kinds and the average molar mass in line with the
/// driving kind after its fractions were changed.
pub fn reconcile(element: &mut Element, driving: FractionKind) -> EnrichResult<f64> {
    molar_mass::reweight(element, driving)?;
    convert(element, driving)?;
    molar_mass::reweight(element, driving)
}
