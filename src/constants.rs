/// Avogadro constant (1/mol), exact SI value.
pub const AVOGADRO: f64 = 6.022_140_76e23;

/// Julian year (s), used to express long half-lives.
pub const SECONDS_PER_YEAR: f64 = 365.25 * 86_400.0;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

pub const SECONDS_PER_HOUR: f64 = 3_600.0;

/// Tolerance for "fractions sum to one" checks.
pub const FRACTION_TOLERANCE: f64 = 1e-9;

/// Upper bound on the number of levels in one sweep.
pub const MAX_SWEEP_LEVELS: usize = 100_000;
