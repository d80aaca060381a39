//! Driving one isotope's fraction to a goal by moving fraction to or from
//! the other isotopes of the same element.
//!
//! Donors are walked in the order given by [`DepletionOrder`]. Each donor
//! gives at most down to its floor. When the isotope of interest is being
//! depleted instead, the whole freed fraction goes to the first isotope in
//! the order.

use crate::{
    atomic_data::{ElementSymbol, MassNumber},
    constants::FRACTION_TOLERANCE,
    element::{Element, Floors, FractionKind},
    error::EnrichResult,
};
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepletionOrder {
    /// Lightest donors first.
    #[default]
    Ascending,
    Descending,
    /// A fresh permutation drawn from the caller's random source.
    Random,
}

/// One enrichment step: drive `isotope` of `element` to `goal`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentRequest {
    pub element: ElementSymbol,
    pub isotope: MassNumber,
    pub goal: f64,
    pub kind: FractionKind,
    pub order: DepletionOrder,
    pub floors: Floors,
}

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Redistribution {
    /// Fractions were moved. `shortfall > 0` when donors hit their floors
    /// before the full difference could be transferred.
    Applied { achieved: f64, shortfall: f64 },
    /// The goal lies below the isotope's own floor; nothing was touched.
    Aborted { goal: f64, floor: f64 },
}

impl Redistribution {
    pub fn is_aborted(&self) -> bool {
        matches!(self, Redistribution::Aborted { .. })
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, Redistribution::Applied { shortfall, .. } if *shortfall > 0.0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IsotopeRedistributor {
    verbose: bool,
}

impl IsotopeRedistributor {
    pub fn new() -> IsotopeRedistributor {
        IsotopeRedistributor::default()
    }

    /// Log every donor step at debug level instead of trace.
    pub fn verbose(mut self, verbose: bool) -> IsotopeRedistributor {
        self.verbose = verbose;
        self
    }

    /// Only the `request.kind` fractions are changed; the other kind and the
    /// average molar mass are stale until the element is reconciled.
    pub fn redistribute<R: Rng + ?Sized>(
        &self,
        element: &mut Element,
        request: &EnrichmentRequest,
        rng: &mut R,
    ) -> EnrichResult<Redistribution> {
        let target = element.require(request.isotope)?;
        element.apply_floors(&request.floors)?;

        let kind = request.kind;
        let goal = request.goal;
        let floor = element.isotopes[target].floor;
        if goal < floor {
            log::debug!(
                "{}: goal {} below floor {}, aborting",
                element.key(request.isotope),
                goal,
                floor
            );
            return Ok(Redistribution::Aborted { goal, floor });
        }

        let current = element.isotopes[target].fraction(kind);
        let delta = goal - current;
        let mut remaining = delta;

        for idx in donor_order(element, target, request.order, rng) {
            let donor = &mut element.isotopes[idx];
            let (mass, floor) = (donor.mass, donor.floor);
            let fraction = donor.fraction_mut(kind);

            if remaining < 0.0 {
                *fraction -= remaining;
                self.step(format_args!("{}{} receives {}", element.symbol, mass, -remaining));
                remaining = 0.0;
                continue;
            }

            let donatable = *fraction - floor;
            if donatable <= 0.0 {
                continue;
            }
            if remaining >= donatable {
                *fraction = floor;
                remaining -= donatable;
                self.step(format_args!(
                    "{}{} depleted to floor {}, {} left",
                    element.symbol, mass, floor, remaining
                ));
            } else if remaining > 0.0 {
                *fraction -= remaining;
                self.step(format_args!("{}{} donates {}", element.symbol, mass, remaining));
                remaining = 0.0;
            }
        }

        // rounding left over after donors gave exactly enough
        if remaining.abs() <= FRACTION_TOLERANCE {
            remaining = 0.0;
        }
        let achieved = if remaining == 0.0 {
            goal
        } else {
            current + (delta - remaining)
        };
        *element.isotopes[target].fraction_mut(kind) = achieved;

        let shortfall = remaining.max(0.0);
        if shortfall > 0.0 {
            log::warn!(
                "{}: donors exhausted, reached {} {} fraction instead of {}",
                element.key(request.isotope),
                achieved,
                kind,
                goal
            );
        }
        Ok(Redistribution::Applied {
            achieved,
            shortfall,
        })
    }

    fn step(&self, message: std::fmt::Arguments<'_>) {
        if self.verbose {
            log::debug!("{}", message);
        } else {
            log::trace!("{}", message);
        }
    }
}

fn donor_order<R: Rng + ?Sized>(
    element: &Element,
    target: usize,
    order: DepletionOrder,
    rng: &mut R,
) -> Vec<usize> {
    let mut donors: Vec<usize> = (0..element.isotopes.len()).filter(|&i| i != target).collect();
    donors.sort_by_key(|&i| element.isotopes[i].mass);
    match order {
        DepletionOrder::Ascending => {}
        DepletionOrder::Descending => donors.reverse(),
        DepletionOrder::Random => donors.shuffle(rng),
    }
    donors
}
