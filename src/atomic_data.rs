use crate::error::EnrichError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Reference data for one isotope, as supplied by the nuclide table.
#[derive(Debug, Clone, PartialEq)]
pub struct IsotopeData {
    pub mass: MassNumber,
    /// g/mol
    pub molar_mass: f64,
    /// Natural amount fraction (0 for nuclides that do not occur naturally).
    pub abundance: f64,
    /// Seconds; `None` for stable nuclides.
    pub half_life: Option<f64>,
}

impl IsotopeData {
    pub fn stable(a: u32, molar_mass: f64, abundance: f64) -> IsotopeData {
        IsotopeData {
            mass: MassNumber::ground(a),
            molar_mass,
            abundance,
            half_life: None,
        }
    }

    pub fn with_half_life(mut self, seconds: f64) -> IsotopeData {
        self.half_life = Some(seconds);
        self
    }
}

pub struct AtomicData {
    pub anum: AtomicNumber,
    pub symb: ElementSymbol,
    pub name: String,
    // ordered by ascending mass number
    pub isotopes: Vec<IsotopeData>,
}

impl AtomicData {
    pub fn isotope(&self, mass: MassNumber) -> Option<&IsotopeData> {
        self.isotopes.iter().find(|iso| iso.mass == mass)
    }

    /// Amount-weighted molar mass of the natural composition.
    pub fn standard_atomic_weight(&self) -> f64 {
        let total: f64 = self.isotopes.iter().map(|iso| iso.abundance).sum();
        self.isotopes
            .iter()
            .map(|iso| iso.abundance * iso.molar_mass)
            .sum::<f64>()
            / total
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone, Serialize, Deserialize)]
pub struct AtomicNumber(pub u32);

/// Mass number, optionally tagged as a metastable isomer (`99m`, `178m2`).
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone)]
pub struct MassNumber {
    pub a: u32,
    pub isomer: u8,
}

impl MassNumber {
    pub const fn ground(a: u32) -> MassNumber {
        MassNumber { a, isomer: 0 }
    }

    pub const fn metastable(a: u32, level: u8) -> MassNumber {
        MassNumber { a, isomer: level }
    }
}

impl fmt::Display for MassNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.isomer {
            0 => write!(f, "{}", self.a),
            1 => write!(f, "{}m", self.a),
            n => write!(f, "{}m{}", self.a, n),
        }
    }
}

impl FromStr for MassNumber {
    type Err = EnrichError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || EnrichError::InvalidMassNumber(s.to_string());
        let (digits, isomer) = match s.find(|c: char| c.eq_ignore_ascii_case(&'m')) {
            None => (s, 0),
            Some(pos) => {
                let level = &s[pos + 1..];
                let level = if level.is_empty() {
                    1
                } else {
                    level.parse::<u8>().map_err(|_| invalid())?
                };
                if level == 0 {
                    return Err(invalid());
                }
                (&s[..pos], level)
            }
        };
        let a = digits.parse::<u32>().map_err(|_| invalid())?;
        if a == 0 {
            return Err(invalid());
        }
        Ok(MassNumber { a, isomer })
    }
}

impl Serialize for MassNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MassNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Chemical element symbol, normalized to `Xx` capitalization.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ElementSymbol(String);

impl ElementSymbol {
    pub fn new(symbol: &str) -> ElementSymbol {
        let mut chars = symbol.trim().chars();
        let normalized = match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        };
        ElementSymbol(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ElementSymbol {
    fn from(value: String) -> Self {
        ElementSymbol::new(&value)
    }
}

impl From<&str> for ElementSymbol {
    fn from(value: &str) -> Self {
        ElementSymbol::new(value)
    }
}

impl From<ElementSymbol> for String {
    fn from(value: ElementSymbol) -> Self {
        value.0
    }
}

impl fmt::Display for ElementSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Composite key identifying one isotope of one element, e.g. `Mo100`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NuclideKey {
    pub element: ElementSymbol,
    pub mass: MassNumber,
}

impl NuclideKey {
    pub fn new(element: impl Into<ElementSymbol>, mass: MassNumber) -> NuclideKey {
        NuclideKey {
            element: element.into(),
            mass,
        }
    }
}

impl fmt::Display for NuclideKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.element, self.mass)
    }
}

impl Serialize for NuclideKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
