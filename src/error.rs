use crate::element::FractionKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("Non-positive molar mass {molar_mass} for {nuclide}")]
    NonPositiveMolarMass { nuclide: String, molar_mass: f64 },

    #[error("Degenerate {kind} composition for element {element}: fractions sum to zero")]
    DegenerateComposition { element: String, kind: FractionKind },

    #[error("Unknown element: {0}")]
    UnknownElement(String),

    #[error("Isotope {mass} not found in element {element}")]
    UnknownIsotope { element: String, mass: String },

    #[error("Unknown material: {0}")]
    UnknownMaterial(String),

    #[error("Material {material} does not contain element {element}")]
    ElementNotInMaterial { material: String, element: String },

    #[error("Unknown particle: {0}")]
    UnknownParticle(String),

    #[error("Invalid mass number: {0}")]
    InvalidMassNumber(String),

    #[error("Invalid sweep range: {0}")]
    InvalidRange(String),

    #[error("Invalid depletion floor: {0}")]
    InvalidFloor(String),

    #[error("Reference level {level} is below the depletion floor {floor} of {nuclide}")]
    UnreachableReference {
        nuclide: String,
        level: f64,
        floor: f64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type EnrichResult<T> = Result<T, EnrichError>;
