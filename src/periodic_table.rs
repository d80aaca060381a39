use crate::{
    atomic_data::{AtomicData, AtomicNumber, ElementSymbol, IsotopeData, MassNumber},
    constants::{SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_YEAR},
};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

const MINUTE: f64 = 60.0;

// index = atomic number
const SYMBOLS: [&str; 119] = [
    "n", "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S",
    "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge",
    "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd",
    "In", "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd",
    "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm",
    "Bk", "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn",
    "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Tabulated composition of a compound or metal target.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialData {
    pub name: String,
    /// (element, moles per formula unit)
    pub composition: Vec<(ElementSymbol, f64)>,
    /// g/cm^3
    pub mass_density: f64,
}

impl MaterialData {
    pub fn new(name: &str, composition: &[(&str, f64)], mass_density: f64) -> MaterialData {
        MaterialData {
            name: name.to_string(),
            composition: composition
                .iter()
                .map(|(symbol, moles)| (ElementSymbol::new(symbol), *moles))
                .collect(),
            mass_density,
        }
    }
}

/// Immutable nuclide and material reference tables.
///
/// The built-in tables are available through [`PeriodicTable::global`]; an
/// external loader can assemble its own with [`PeriodicTable::new`].
pub struct PeriodicTable {
    by_anum: BTreeMap<AtomicNumber, AtomicData>,
    // nuclides that are not part of any natural composition, keyed by (Z, mass)
    radionuclides: BTreeMap<(AtomicNumber, MassNumber), IsotopeData>,
    materials: Vec<MaterialData>,
}

static STANDARD: Lazy<PeriodicTable> = Lazy::new(PeriodicTable::standard);

impl PeriodicTable {
    pub fn new(
        elements: Vec<AtomicData>,
        radionuclides: Vec<(AtomicNumber, IsotopeData)>,
        materials: Vec<MaterialData>,
    ) -> PeriodicTable {
        PeriodicTable {
            by_anum: elements.into_iter().map(|data| (data.anum, data)).collect(),
            radionuclides: radionuclides
                .into_iter()
                .map(|(anum, iso)| ((anum, iso.mass), iso))
                .collect(),
            materials,
        }
    }

    pub fn global() -> &'static PeriodicTable {
        &STANDARD
    }
}

impl PeriodicTable {
    pub fn elements(&self) -> impl Iterator<Item = &AtomicData> {
        self.by_anum.values()
    }

    pub fn by_symbol(&self, symbol: &ElementSymbol) -> Option<&AtomicData> {
        self.by_anum.values().find(|data| &data.symb == symbol)
    }

    /// Symbol for any atomic number, whether or not isotope data is tabulated.
    pub fn element_symbol(&self, atomic_number: AtomicNumber) -> Option<&str> {
        if let Some(data) = self.by_anum.get(&atomic_number) {
            return Some(data.symb.as_str());
        }
        SYMBOLS.get(atomic_number.0 as usize).copied()
    }

    /// Molar mass in g/mol of a tabulated nuclide.
    pub fn mass_for_isotope(
        &self,
        atomic_number: AtomicNumber,
        mass: MassNumber,
    ) -> Option<f64> {
        self.nuclide(atomic_number, mass).map(|iso| iso.molar_mass)
    }

    /// Half-life in seconds; `None` for stable or unknown nuclides.
    pub fn half_life(&self, atomic_number: AtomicNumber, mass: MassNumber) -> Option<f64> {
        self.nuclide(atomic_number, mass).and_then(|iso| iso.half_life)
    }

    pub fn nuclide(&self, atomic_number: AtomicNumber, mass: MassNumber) -> Option<&IsotopeData> {
        self.by_anum
            .get(&atomic_number)
            .and_then(|data| data.isotope(mass))
            .or_else(|| self.radionuclides.get(&(atomic_number, mass)))
    }

    pub fn materials(&self) -> &[MaterialData] {
        &self.materials
    }
}

fn element(anum: u32, symbol: &str, name: &str, isotopes: Vec<IsotopeData>) -> AtomicData {
    AtomicData {
        anum: AtomicNumber(anum),
        symb: ElementSymbol::new(symbol),
        name: name.to_string(),
        isotopes,
    }
}

fn radionuclide(
    anum: u32,
    mass: MassNumber,
    molar_mass: f64,
    half_life: f64,
) -> (AtomicNumber, IsotopeData) {
    (
        AtomicNumber(anum),
        IsotopeData {
            mass,
            molar_mass,
            abundance: 0.0,
            half_life: Some(half_life),
        },
    )
}

impl PeriodicTable {
    // Masses: AME2020. Abundances: IUPAC representative isotopic compositions.
    fn standard() -> PeriodicTable {
        let s = IsotopeData::stable;
        let g = MassNumber::ground;
        let elements = vec![
            element(1, "H", "Hydrogen", vec![
                s(1, 1.007_825_032, 0.999_885),
                s(2, 2.014_101_778, 0.000_115),
            ]),
            element(3, "Li", "Lithium", vec![
                s(6, 6.015_122_887, 0.0759),
                s(7, 7.016_003_437, 0.9241),
            ]),
            element(5, "B", "Boron", vec![
                s(10, 10.012_936_95, 0.199),
                s(11, 11.009_305_36, 0.801),
            ]),
            element(6, "C", "Carbon", vec![
                s(12, 12.0, 0.9893),
                s(13, 13.003_354_84, 0.0107),
            ]),
            element(7, "N", "Nitrogen", vec![
                s(14, 14.003_074_00, 0.996_36),
                s(15, 15.000_108_90, 0.003_64),
            ]),
            element(8, "O", "Oxygen", vec![
                s(16, 15.994_914_62, 0.997_57),
                s(17, 16.999_131_76, 0.000_38),
                s(18, 17.999_159_61, 0.002_05),
            ]),
            element(20, "Ca", "Calcium", vec![
                s(40, 39.962_590_86, 0.969_41),
                s(42, 41.958_617_83, 0.006_47),
                s(43, 42.958_766_44, 0.001_35),
                s(44, 43.955_481_56, 0.020_86),
                s(46, 45.953_689_0, 0.000_04),
                s(48, 47.952_522_76, 0.001_87).with_half_life(5.6e19 * SECONDS_PER_YEAR),
            ]),
            element(22, "Ti", "Titanium", vec![
                s(46, 45.952_627_72, 0.0825),
                s(47, 46.951_758_79, 0.0744),
                s(48, 47.947_941_98, 0.7372),
                s(49, 48.947_865_68, 0.0541),
                s(50, 49.944_786_89, 0.0518),
            ]),
            element(28, "Ni", "Nickel", vec![
                s(58, 57.935_342_41, 0.680_77),
                s(60, 59.930_785_88, 0.262_23),
                s(61, 60.931_055_57, 0.011_399),
                s(62, 61.928_345_37, 0.036_346),
                s(64, 63.927_966_82, 0.009_255),
            ]),
            element(30, "Zn", "Zinc", vec![
                s(64, 63.929_142_01, 0.4917),
                s(66, 65.926_033_81, 0.2773),
                s(67, 66.927_127_75, 0.0404),
                s(68, 67.924_844_55, 0.1845),
                s(70, 69.925_319_2, 0.0061),
            ]),
            element(42, "Mo", "Molybdenum", vec![
                s(92, 91.906_807_96, 0.1453),
                s(94, 93.905_084_90, 0.0915),
                s(95, 94.905_838_77, 0.1584),
                s(96, 95.904_676_12, 0.1667),
                s(97, 96.906_018_12, 0.0960),
                s(98, 97.905_404_82, 0.2439),
                s(100, 99.907_471_8, 0.0982).with_half_life(7.07e18 * SECONDS_PER_YEAR),
            ]),
        ];

        let radionuclides = vec![
            radionuclide(1, g(3), 3.016_049_28, 12.32 * SECONDS_PER_YEAR),
            radionuclide(4, g(7), 7.016_928_72, 53.22 * SECONDS_PER_DAY),
            radionuclide(6, g(11), 11.011_433_6, 20.364 * MINUTE),
            radionuclide(6, g(14), 14.003_241_99, 5_700.0 * SECONDS_PER_YEAR),
            radionuclide(7, g(13), 13.005_738_61, 9.965 * MINUTE),
            radionuclide(8, g(15), 15.003_065_62, 122.24),
            radionuclide(9, g(18), 18.000_937_3, 109.77 * MINUTE),
            radionuclide(20, g(45), 44.956_186_4, 162.61 * SECONDS_PER_DAY),
            radionuclide(20, g(47), 46.954_541_1, 4.536 * SECONDS_PER_DAY),
            radionuclide(21, g(47), 46.952_403_7, 3.3492 * SECONDS_PER_DAY),
            radionuclide(27, g(58), 57.935_751_4, 70.86 * SECONDS_PER_DAY),
            radionuclide(27, g(60), 59.933_815_6, 5.2714 * SECONDS_PER_YEAR),
            radionuclide(28, g(63), 62.929_669_0, 101.2 * SECONDS_PER_YEAR),
            radionuclide(28, g(65), 64.930_084_3, 2.5175 * SECONDS_PER_HOUR),
            radionuclide(29, g(64), 63.929_764_2, 12.701 * SECONDS_PER_HOUR),
            radionuclide(29, g(67), 66.927_729_5, 61.83 * SECONDS_PER_HOUR),
            radionuclide(30, g(65), 64.929_240_7, 243.93 * SECONDS_PER_DAY),
            radionuclide(40, g(95), 94.908_040_3, 64.032 * SECONDS_PER_DAY),
            radionuclide(40, g(97), 96.910_951_0, 16.749 * SECONDS_PER_HOUR),
            radionuclide(41, g(92), 91.907_188_6, 3.47e7 * SECONDS_PER_YEAR),
            radionuclide(41, g(94), 93.907_279_0, 2.03e4 * SECONDS_PER_YEAR),
            radionuclide(41, g(95), 94.906_831_1, 34.991 * SECONDS_PER_DAY),
            radionuclide(41, g(96), 95.908_100_8, 23.35 * SECONDS_PER_HOUR),
            radionuclide(41, g(97), 96.908_101_6, 72.1 * MINUTE),
            radionuclide(42, g(91), 90.911_745_3, 15.49 * MINUTE),
            radionuclide(42, g(93), 92.906_808_8, 4.0e3 * SECONDS_PER_YEAR),
            radionuclide(42, g(99), 98.907_707_3, 65.924 * SECONDS_PER_HOUR),
            radionuclide(42, g(101), 100.910_337_6, 14.61 * MINUTE),
            radionuclide(43, g(95), 94.907_652_3, 20.0 * SECONDS_PER_HOUR),
            radionuclide(43, g(96), 95.907_866_7, 4.28 * SECONDS_PER_DAY),
            radionuclide(43, g(97), 96.906_360_7, 4.21e6 * SECONDS_PER_YEAR),
            radionuclide(43, g(98), 97.907_211_2, 4.2e6 * SECONDS_PER_YEAR),
            radionuclide(43, g(99), 98.906_250_8, 2.111e5 * SECONDS_PER_YEAR),
            radionuclide(
                43,
                MassNumber::metastable(99, 1),
                98.906_250_8,
                6.0072 * SECONDS_PER_HOUR,
            ),
            radionuclide(43, g(100), 99.907_653_9, 15.46),
            radionuclide(43, g(101), 100.907_309_0, 14.22 * MINUTE),
        ];

        let materials = vec![
            MaterialData::new("Mo", &[("Mo", 1.0)], 10.28),
            MaterialData::new("MoO2", &[("Mo", 1.0), ("O", 2.0)], 6.47),
            MaterialData::new("MoO3", &[("Mo", 1.0), ("O", 3.0)], 4.69),
            MaterialData::new("CaO", &[("Ca", 1.0), ("O", 1.0)], 3.34),
            MaterialData::new("CaCO3", &[("Ca", 1.0), ("C", 1.0), ("O", 3.0)], 2.71),
            MaterialData::new("Li2O", &[("Li", 2.0), ("O", 1.0)], 2.013),
            MaterialData::new("Li2CO3", &[("Li", 2.0), ("C", 1.0), ("O", 3.0)], 2.11),
            MaterialData::new("Ni", &[("Ni", 1.0)], 8.908),
            MaterialData::new("TiO2", &[("Ti", 1.0), ("O", 2.0)], 4.23),
            MaterialData::new("ZnO", &[("Zn", 1.0), ("O", 1.0)], 5.61),
            MaterialData::new("B4C", &[("B", 4.0), ("C", 1.0)], 2.52),
            MaterialData::new("H2O", &[("H", 2.0), ("O", 1.0)], 0.998),
        ];

        PeriodicTable::new(elements, radionuclides, materials)
    }
}
