//! Enrichment sweeps: for every material and every level, redistribute the
//! isotope of interest, reconcile fractions, propagate to the material,
//! compute densities and (optionally) reaction channels, and hand one row
//! to the report writer.

use crate::{
    atomic_data::{ElementSymbol, MassNumber, NuclideKey},
    constants::MAX_SWEEP_LEVELS,
    density::{self, Densities},
    element::{Floors, FractionKind},
    error::{EnrichError, EnrichResult},
    fractions,
    periodic_table::PeriodicTable,
    propagate::{self, MaterialState, ReferenceSnapshot},
    reaction::{ChannelGroup, Particle, ReactionChannelGenerator, ReactionNetwork},
    redistribute::{DepletionOrder, EnrichmentRequest, IsotopeRedistributor, Redistribution},
    registry::Registry,
};
use anyhow::Context;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepRange {
    /// `begin, begin + increment, ...` up to and including `end`.
    Stepped { begin: f64, increment: f64, end: f64 },
    /// `points` evenly spaced levels from `begin` to `end` inclusive.
    Points { begin: f64, end: f64, points: usize },
    Single(f64),
}

impl SweepRange {
    fn check_level(level: f64, what: &str) -> EnrichResult<()> {
        if !level.is_finite() {
            return Err(EnrichError::InvalidRange(format!("{} is not a number", what)));
        }
        if !(0.0..=1.0).contains(&level) {
            return Err(EnrichError::InvalidRange(format!(
                "{} {} outside [0, 1]",
                what, level
            )));
        }
        Ok(())
    }

    pub fn levels(&self) -> EnrichResult<Vec<f64>> {
        match *self {
            SweepRange::Single(level) => {
                Self::check_level(level, "level")?;
                Ok(vec![level])
            }
            SweepRange::Stepped {
                begin,
                increment,
                end,
            } => {
                Self::check_level(begin, "begin")?;
                Self::check_level(end, "end")?;
                if begin > end {
                    return Err(EnrichError::InvalidRange(format!(
                        "begin {} greater than end {}",
                        begin, end
                    )));
                }
                if !(increment.is_finite() && increment > 0.0) {
                    return Err(EnrichError::InvalidRange(format!(
                        "increment {} must be positive",
                        increment
                    )));
                }
                let slack = 1e-9 * increment;
                let steps = ((end - begin + slack) / increment).floor();
                if !steps.is_finite() || steps >= MAX_SWEEP_LEVELS as f64 {
                    return Err(EnrichError::InvalidRange(format!(
                        "increment {} gives more than {} levels",
                        increment, MAX_SWEEP_LEVELS
                    )));
                }
                let steps = steps as usize;
                Ok((0..=steps)
                    .map(|i| (begin + i as f64 * increment).min(end))
                    .collect())
            }
            SweepRange::Points { begin, end, points } => {
                Self::check_level(begin, "begin")?;
                Self::check_level(end, "end")?;
                if begin > end {
                    return Err(EnrichError::InvalidRange(format!(
                        "begin {} greater than end {}",
                        begin, end
                    )));
                }
                if !(2..=MAX_SWEEP_LEVELS).contains(&points) {
                    return Err(EnrichError::InvalidRange(format!(
                        "{} points, need 2 to {}",
                        points, MAX_SWEEP_LEVELS
                    )));
                }
                let increment = (end - begin) / (points - 1) as f64;
                if increment <= 0.0 {
                    return Err(EnrichError::InvalidRange(
                        "zero increment between begin and end".to_string(),
                    ));
                }
                Ok((0..points)
                    .map(|i| {
                        if i == points - 1 {
                            end
                        } else {
                            begin + i as f64 * increment
                        }
                    })
                    .collect())
            }
        }
    }
}

/// Everything needed to run one sweep over one or more materials.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepRequest {
    pub materials: Vec<String>,
    pub element: ElementSymbol,
    pub isotope: MassNumber,
    pub kind: FractionKind,
    pub range: SweepRange,
    /// Level at which DCC is 1; the natural fraction when `None`.
    pub reference: Option<f64>,
    pub order: DepletionOrder,
    pub floors: Floors,
    /// Reaction channels are generated only when non-empty.
    pub projectiles: Vec<Particle>,
    pub verbose: bool,
}

impl SweepRequest {
    pub fn point(&self, goal: f64) -> EnrichmentRequest {
        EnrichmentRequest {
            element: self.element.clone(),
            isotope: self.isotope,
            goal,
            kind: self.kind,
            order: self.order,
            floors: self.floors.clone(),
        }
    }

    pub fn target(&self) -> NuclideKey {
        NuclideKey::new(self.element.clone(), self.isotope)
    }
}

/// One output row per (material, sweep point).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRow {
    pub material: String,
    pub isotope: NuclideKey,
    pub kind: FractionKind,
    /// Requested value of the driving fraction.
    pub level: f64,
    /// Achieved value of the driving fraction.
    pub achieved: f64,
    pub partial: bool,
    pub amount_fraction: f64,
    pub mass_fraction: f64,
    pub element_mass_fraction: f64,
    pub element_molar_mass: f64,
    pub material_molar_mass: f64,
    pub material_mass_density: f64,
    pub material_number_density: f64,
    pub element_mass_density: f64,
    pub element_number_density: f64,
    pub isotope_mass_density: f64,
    pub isotope_number_density: f64,
    pub dcc: BTreeMap<NuclideKey, Option<f64>>,
}

/// Reaction channels produced at one sweep point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelRecord {
    pub material: String,
    pub level: f64,
    pub groups: Vec<ChannelGroup>,
}

/// Receives the rows and channel records of a sweep.
pub trait ReportWriter {
    fn write_row(&mut self, row: &SweepRow) -> anyhow::Result<()>;

    fn write_channels(&mut self, _record: &ChannelRecord) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryWriter {
    pub rows: Vec<SweepRow>,
    pub channels: Vec<ChannelRecord>,
}

impl ReportWriter for MemoryWriter {
    fn write_row(&mut self, row: &SweepRow) -> anyhow::Result<()> {
        self.rows.push(row.clone());
        Ok(())
    }

    fn write_channels(&mut self, record: &ChannelRecord) -> anyhow::Result<()> {
        self.channels.push(record.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    pub emitted: usize,
    /// Points skipped because the goal was below the isotope's floor.
    pub aborted: usize,
    /// Points where donors ran out before the goal was reached.
    pub partial: usize,
}

pub struct SweepOrchestrator<'a, R: Rng> {
    registry: &'a mut Registry,
    table: &'a PeriodicTable,
    rng: R,
}

impl<'a, R: Rng> SweepOrchestrator<'a, R> {
    pub fn new(registry: &'a mut Registry, table: &'a PeriodicTable, rng: R) -> Self {
        SweepOrchestrator {
            registry,
            table,
            rng,
        }
    }

    /// Runs the sweep for every requested material. Configuration problems
    /// fail before any row is written.
    pub fn run<W: ReportWriter>(
        &mut self,
        request: &SweepRequest,
        writer: &mut W,
    ) -> anyhow::Result<SweepSummary> {
        let levels = request.range.levels().context("building sweep levels")?;
        self.validate(request)?;

        let redistributor = IsotopeRedistributor::new().verbose(request.verbose);
        let generator = ReactionChannelGenerator::new(self.table, request.projectiles.clone());
        let mut summary = SweepSummary::default();

        for name in &request.materials {
            let material = self.registry.material(name)?.clone();
            let snapshot = self
                .capture_reference(request, &redistributor, name)
                .with_context(|| format!("capturing reference state for {}", name))?;
            log::info!(
                "{}: sweeping {} over {} levels, reference {} fraction {}",
                name,
                request.target(),
                levels.len(),
                request.kind,
                snapshot.level
            );

            for &level in &levels {
                let outcome = self.enrich(request, &redistributor, &snapshot, level)?;
                let achieved = match outcome {
                    Redistribution::Aborted { goal, floor } => {
                        log::info!(
                            "{}: skipping level {}, below floor {} of {}",
                            name,
                            goal,
                            floor,
                            request.target()
                        );
                        summary.aborted += 1;
                        continue;
                    }
                    Redistribution::Applied { achieved, shortfall } => {
                        if shortfall > 0.0 {
                            summary.partial += 1;
                        }
                        achieved
                    }
                };

                let state = propagate::propagate(&material, self.registry)?;
                let dcc = snapshot.dcc_all(&state);
                let densities = density::densities(&material, &state)?;

                if !request.projectiles.is_empty() {
                    let channels = generator.generate(&state, &dcc);
                    let network = ReactionNetwork::from_state(channels, &state);
                    writer.write_channels(&ChannelRecord {
                        material: name.clone(),
                        level,
                        groups: network.grouped(),
                    })?;
                }

                let row = build_row(
                    request,
                    &state,
                    &densities,
                    dcc,
                    level,
                    achieved,
                    outcome.is_partial(),
                )?;
                writer.write_row(&row)?;
                summary.emitted += 1;
            }
        }
        Ok(summary)
    }

    fn validate(&self, request: &SweepRequest) -> EnrichResult<()> {
        let element = self.registry.element(&request.element)?;
        element.require(request.isotope)?;
        element.clone().apply_floors(&request.floors)?;
        if let Some(reference) = request.reference {
            SweepRange::check_level(reference, "reference")?;
        }
        for name in &request.materials {
            let material = self.registry.material(name)?;
            if !material.contains(&request.element) {
                return Err(EnrichError::ElementNotInMaterial {
                    material: name.clone(),
                    element: request.element.to_string(),
                });
            }
        }
        Ok(())
    }

    fn capture_reference(
        &mut self,
        request: &SweepRequest,
        redistributor: &IsotopeRedistributor,
        material: &str,
    ) -> EnrichResult<ReferenceSnapshot> {
        self.registry.reset_element(&request.element)?;
        let element = self.registry.element_mut(&request.element)?;
        let level = match request.reference {
            Some(level) => level,
            None => {
                let target = element.require(request.isotope)?;
                element.isotopes[target].fraction(request.kind)
            }
        };

        let outcome = redistributor.redistribute(element, &request.point(level), &mut self.rng)?;
        if let Redistribution::Aborted { floor, .. } = outcome {
            return Err(EnrichError::UnreachableReference {
                nuclide: request.target().to_string(),
                level,
                floor,
            });
        }
        fractions::reconcile(element, request.kind)?;

        let registry: &Registry = self.registry;
        propagate::capture_reference(
            registry.material(material)?,
            registry,
            request.isotope,
            &request.element,
            request.kind,
            level,
        )
    }

    /// Puts the element of interest at `level`, starting from its natural
    /// composition. The reference level reuses the captured composition.
    fn enrich(
        &mut self,
        request: &SweepRequest,
        redistributor: &IsotopeRedistributor,
        snapshot: &ReferenceSnapshot,
        level: f64,
    ) -> EnrichResult<Redistribution> {
        self.registry.reset_element(&request.element)?;
        let element = self.registry.element_mut(&request.element)?;

        if snapshot.is_reference_level(level) {
            *element = snapshot.composition().clone();
            let target = element.require(request.isotope)?;
            let achieved = element.isotopes[target].fraction(request.kind);
            return Ok(Redistribution::Applied {
                achieved,
                shortfall: (level - achieved).max(0.0),
            });
        }

        let outcome = redistributor.redistribute(element, &request.point(level), &mut self.rng)?;
        if !outcome.is_aborted() {
            fractions::reconcile(element, request.kind)?;
        }
        Ok(outcome)
    }
}

fn build_row(
    request: &SweepRequest,
    state: &MaterialState,
    densities: &Densities,
    dcc: BTreeMap<NuclideKey, Option<f64>>,
    level: f64,
    achieved: f64,
    partial: bool,
) -> EnrichResult<SweepRow> {
    let target = request.target();
    let unknown_isotope = || EnrichError::UnknownIsotope {
        element: request.element.to_string(),
        mass: request.isotope.to_string(),
    };
    let iso = state.isotope(&target).ok_or_else(unknown_isotope)?;
    let iso_density = densities.isotope(&target).ok_or_else(unknown_isotope)?;
    let constituent = state
        .constituent(&request.element)
        .ok_or_else(|| EnrichError::UnknownElement(request.element.to_string()))?;
    let element_density = densities
        .element(&request.element)
        .ok_or_else(|| EnrichError::UnknownElement(request.element.to_string()))?;

    Ok(SweepRow {
        material: state.material.clone(),
        isotope: target.clone(),
        kind: request.kind,
        level,
        achieved,
        partial,
        amount_fraction: iso.amount_fraction,
        mass_fraction: iso.mass_fraction,
        element_mass_fraction: constituent.mass_fraction,
        element_molar_mass: constituent.molar_mass,
        material_molar_mass: state.molar_mass,
        material_mass_density: densities.material.mass_density,
        material_number_density: densities.material.number_density,
        element_mass_density: element_density.mass_density,
        element_number_density: element_density.number_density,
        isotope_mass_density: iso_density.mass_density,
        isotope_number_density: iso_density.number_density,
        dcc,
    })
}
