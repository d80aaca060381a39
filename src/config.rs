use crate::{
    atomic_data::{ElementSymbol, MassNumber},
    element::{Floors, FractionKind},
    error::{EnrichError, EnrichResult},
    periodic_table::PeriodicTable,
    reaction::Particle,
    redistribute::DepletionOrder,
    registry::Registry,
    sweep::{ReportWriter, SweepOrchestrator, SweepRange, SweepRequest, SweepSummary},
};
use anyhow::Context;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path};

/// Sweep bounds as written in a config file. Exactly one of `increment`
/// and `points` may be given; with neither, `begin` must equal `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeConfig {
    pub begin: f64,
    pub end: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<usize>,
}

impl RangeConfig {
    pub fn to_range(&self) -> EnrichResult<SweepRange> {
        let range = match (self.increment, self.points) {
            (Some(increment), None) => SweepRange::Stepped {
                begin: self.begin,
                increment,
                end: self.end,
            },
            (None, Some(points)) => SweepRange::Points {
                begin: self.begin,
                end: self.end,
                points,
            },
            (None, None) if self.begin == self.end => SweepRange::Single(self.begin),
            (None, None) => {
                return Err(EnrichError::InvalidRange(
                    "either increment or points is required".to_string(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(EnrichError::InvalidRange(
                    "increment and points are mutually exclusive".to_string(),
                ))
            }
        };
        range.levels()?;
        Ok(range)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub materials: Vec<String>,
    pub element: String,
    /// Mass number of the isotope of interest, e.g. `"100"` or `"99m"`.
    pub isotope: String,
    #[serde(default)]
    pub fraction: FractionKind,
    pub range: RangeConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<f64>,
    #[serde(default)]
    pub order: DepletionOrder,
    /// Seeds the generator used by the `random` order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub floor: f64,
    /// Per-isotope floors keyed by mass number.
    #[serde(default)]
    pub floors: BTreeMap<String, f64>,
    #[serde(default)]
    pub projectiles: Vec<String>,
    #[serde(default)]
    pub verbose: bool,
}

impl SweepConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> EnrichResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> EnrichResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses and checks every field that can be checked without a registry.
    pub fn to_request(&self) -> EnrichResult<SweepRequest> {
        let mut floors = Floors::uniform(self.floor);
        for (mass, floor) in &self.floors {
            floors = floors.with_override(mass.parse()?, *floor);
        }
        let projectiles = self
            .projectiles
            .iter()
            .map(|p| p.parse::<Particle>())
            .collect::<EnrichResult<Vec<_>>>()?;

        Ok(SweepRequest {
            materials: self.materials.clone(),
            element: ElementSymbol::new(&self.element),
            isotope: self.isotope.parse::<MassNumber>()?,
            kind: self.fraction,
            range: self.range.to_range()?,
            reference: self.reference,
            order: self.order,
            floors,
            projectiles,
            verbose: self.verbose,
        })
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Runs a configured sweep against the built-in reference data.
pub fn run_sweep<W: ReportWriter>(
    config: &SweepConfig,
    writer: &mut W,
) -> anyhow::Result<SweepSummary> {
    let request = config.to_request().context("invalid sweep configuration")?;
    let table = PeriodicTable::global();
    let mut registry = Registry::from_table(table).context("loading reference data")?;
    let summary = SweepOrchestrator::new(&mut registry, table, config.rng())
        .run(&request, writer)
        .with_context(|| format!("sweeping {}{}", config.element, config.isotope))?;
    log::info!(
        "{} rows written, {} points below floor, {} partial",
        summary.emitted,
        summary.aborted,
        summary.partial
    );
    Ok(summary)
}
