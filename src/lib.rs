//! Isotope enrichment sweeps: redistribute the fractions of one isotope,
//! propagate the change to compounds, and report densities, density
//! correction coefficients and reaction channels per enrichment level.

pub mod atomic_data;
pub mod config;
pub mod constants;
pub mod density;
pub mod element;
pub mod error;
pub mod fractions;
pub mod material;
pub mod molar_mass;
pub mod periodic_table;
pub mod propagate;
pub mod reaction;
pub mod redistribute;
pub mod registry;
pub mod sweep;

pub use atomic_data::{ElementSymbol, MassNumber, NuclideKey};
pub use config::{run_sweep, SweepConfig};
pub use element::{Element, Floors, FractionKind, Isotope};
pub use error::{EnrichError, EnrichResult};
pub use redistribute::{DepletionOrder, EnrichmentRequest, IsotopeRedistributor, Redistribution};
pub use registry::Registry;
pub use sweep::{
    MemoryWriter, ReportWriter, SweepOrchestrator, SweepRange, SweepRequest, SweepRow,
    SweepSummary,
};
