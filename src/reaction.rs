//! Reaction channels reachable from each isotope of a material.
//!
//! A channel `parent(projectile, ejectile)product` conserves protons and
//! nucleons:
//!
//! ```text
//! Z' = Z + protons(projectile) - count * protons(ejectile)
//! A' = A + nucleons(projectile) - count * nucleons(ejectile)
//! ```

use crate::{
    atomic_data::{AtomicNumber, MassNumber, NuclideKey},
    error::EnrichError,
    periodic_table::PeriodicTable,
    propagate::MaterialState,
};
use petgraph::{
    graph::{Graph, NodeIndex},
    visit::EdgeRef,
    Direction,
};
use serde::{Serialize, Serializer};
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    str::FromStr,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Particle {
    Gamma,
    Neutron,
    Proton,
    Deuteron,
    Triton,
    Helion,
    Alpha,
}

impl Particle {
    pub const ALL: [Particle; 7] = [
        Particle::Gamma,
        Particle::Neutron,
        Particle::Proton,
        Particle::Deuteron,
        Particle::Triton,
        Particle::Helion,
        Particle::Alpha,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Particle::Gamma => "g",
            Particle::Neutron => "n",
            Particle::Proton => "p",
            Particle::Deuteron => "d",
            Particle::Triton => "t",
            Particle::Helion => "h",
            Particle::Alpha => "a",
        }
    }

    pub fn protons(self) -> u32 {
        match self {
            Particle::Gamma | Particle::Neutron => 0,
            Particle::Proton | Particle::Deuteron | Particle::Triton => 1,
            Particle::Helion | Particle::Alpha => 2,
        }
    }

    pub fn nucleons(self) -> u32 {
        match self {
            Particle::Gamma => 0,
            Particle::Neutron | Particle::Proton => 1,
            Particle::Deuteron => 2,
            Particle::Triton | Particle::Helion => 3,
            Particle::Alpha => 4,
        }
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Particle {
    type Err = EnrichError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let particle = match s.trim().to_ascii_lowercase().as_str() {
            "g" | "gamma" | "photon" => Particle::Gamma,
            "n" | "neutron" => Particle::Neutron,
            "p" | "proton" => Particle::Proton,
            "d" | "deuteron" => Particle::Deuteron,
            "t" | "triton" => Particle::Triton,
            "h" | "helion" | "he3" => Particle::Helion,
            "a" | "alpha" | "he4" => Particle::Alpha,
            _ => return Err(EnrichError::UnknownParticle(s.to_string())),
        };
        Ok(particle)
    }
}

impl Serialize for Particle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol())
    }
}

/// Largest multiplicity generated for a homogeneous ejectile.
pub fn max_multiplicity(projectile: Particle, ejectile: Particle) -> u32 {
    match ejectile {
        Particle::Neutron if projectile.nucleons() >= 2 => 4,
        Particle::Neutron => 3,
        Particle::Proton | Particle::Alpha => 2,
        Particle::Gamma | Particle::Deuteron | Particle::Triton | Particle::Helion => 1,
    }
}

/// Fixed mixed ejectile combinations, always emitted once.
const MIXED_EJECTILES: [&[Particle]; 4] = [
    &[Particle::Neutron, Particle::Proton],
    &[Particle::Neutron, Particle::Alpha],
    &[Particle::Proton, Particle::Alpha],
    &[Particle::Neutron, Particle::Deuteron],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ejectile {
    Homogeneous { particle: Particle, count: u32 },
    Mixed(&'static [Particle]),
}

impl Ejectile {
    pub fn protons(&self) -> u32 {
        match self {
            Ejectile::Homogeneous { particle, count } => count * particle.protons(),
            Ejectile::Mixed(particles) => particles.iter().map(|p| p.protons()).sum(),
        }
    }

    pub fn nucleons(&self) -> u32 {
        match self {
            Ejectile::Homogeneous { particle, count } => count * particle.nucleons(),
            Ejectile::Mixed(particles) => particles.iter().map(|p| p.nucleons()).sum(),
        }
    }
}

impl fmt::Display for Ejectile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ejectile::Homogeneous { particle, count: 1 } => write!(f, "{}", particle),
            Ejectile::Homogeneous { particle, count } => write!(f, "{}{}", count, particle),
            Ejectile::Mixed(particles) => particles.iter().try_for_each(|p| write!(f, "{}", p)),
        }
    }
}

impl Serialize for Ejectile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Product nuclide, always in its ground state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub anum: AtomicNumber,
    pub mass: u32,
    pub symbol: Option<String>,
    /// g/mol, when the nuclide is tabulated.
    pub molar_mass: Option<f64>,
    /// Seconds, when the nuclide is tabulated as radioactive.
    pub half_life: Option<f64>,
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.symbol {
            Some(symbol) => write!(f, "{}{}", symbol, self.mass),
            None => write!(f, "Z{}A{}", self.anum.0, self.mass),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReactionChannel {
    pub parent: NuclideKey,
    pub projectile: Particle,
    pub ejectile: Ejectile,
    pub product: Product,
    /// DCC of the parent isotope at the current sweep point.
    pub dcc: Option<f64>,
}

impl fmt::Display for ReactionChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({},{}){}",
            self.parent, self.projectile, self.ejectile, self.product
        )
    }
}

pub struct ReactionChannelGenerator<'t> {
    table: &'t PeriodicTable,
    projectiles: Vec<Particle>,
}

impl<'t> ReactionChannelGenerator<'t> {
    pub fn new(
        table: &'t PeriodicTable,
        projectiles: Vec<Particle>,
    ) -> ReactionChannelGenerator<'t> {
        ReactionChannelGenerator { table, projectiles }
    }

    /// Every candidate ejectile for one projectile, in generation order.
    pub fn ejectiles(projectile: Particle) -> Vec<Ejectile> {
        let mut ejectiles = Vec::new();
        for particle in Particle::ALL {
            for count in 1..=max_multiplicity(projectile, particle) {
                if particle == projectile && count == 1 {
                    continue;
                }
                ejectiles.push(Ejectile::Homogeneous { particle, count });
            }
        }
        ejectiles.extend(MIXED_EJECTILES.into_iter().map(Ejectile::Mixed));
        ejectiles
    }

    pub fn channels_for(
        &self,
        parent: &NuclideKey,
        anum: AtomicNumber,
        dcc: Option<f64>,
    ) -> Vec<ReactionChannel> {
        let mut channels = Vec::new();
        for &projectile in &self.projectiles {
            for ejectile in Self::ejectiles(projectile) {
                if let Some(product) = self.product(anum, parent.mass, projectile, &ejectile) {
                    channels.push(ReactionChannel {
                        parent: parent.clone(),
                        projectile,
                        ejectile,
                        product,
                        dcc,
                    });
                }
            }
        }
        channels
    }

    /// Channels for every isotope of the material, tagged with `dcc`.
    pub fn generate(
        &self,
        state: &MaterialState,
        dcc: &BTreeMap<NuclideKey, Option<f64>>,
    ) -> Vec<ReactionChannel> {
        let channels: Vec<ReactionChannel> = state
            .isotopes
            .values()
            .flat_map(|iso| {
                let tag = dcc.get(&iso.key).copied().flatten();
                self.channels_for(&iso.key, iso.anum, tag)
            })
            .collect();
        log::debug!("{}: {} reaction channels", state.material, channels.len());
        channels
    }

    fn product(
        &self,
        anum: AtomicNumber,
        mass: MassNumber,
        projectile: Particle,
        ejectile: &Ejectile,
    ) -> Option<Product> {
        let z = i64::from(anum.0) + i64::from(projectile.protons())
            - i64::from(ejectile.protons());
        let a = i64::from(mass.a) + i64::from(projectile.nucleons())
            - i64::from(ejectile.nucleons());
        if z < 1 || a < z {
            return None;
        }
        let anum = AtomicNumber(u32::try_from(z).ok()?);
        let a = u32::try_from(a).ok()?;
        let ground = MassNumber::ground(a);
        Some(Product {
            anum,
            mass: a,
            symbol: self.table.element_symbol(anum).map(str::to_string),
            molar_mass: self.table.mass_for_isotope(anum, ground),
            half_life: self.table.half_life(anum, ground),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct NuclideNode {
    anum: AtomicNumber,
    mass: MassNumber,
}

/// Channels that share a projectile and a product nuclide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelGroup {
    pub projectile: Particle,
    pub anum: AtomicNumber,
    pub mass: u32,
    pub channels: Vec<ReactionChannel>,
}

/// Directed graph from parent nuclides to product nuclides, one edge per
/// channel.
#[derive(Debug, Default)]
pub struct ReactionNetwork {
    graph: Graph<NuclideNode, ReactionChannel>,
    index: HashMap<NuclideNode, NodeIndex>,
}

impl ReactionNetwork {
    pub fn build(
        channels: Vec<ReactionChannel>,
        parents: &BTreeMap<NuclideKey, AtomicNumber>,
    ) -> ReactionNetwork {
        let mut network = ReactionNetwork::default();
        for channel in channels {
            let Some(&anum) = parents.get(&channel.parent) else {
                continue;
            };
            let from = network.node(NuclideNode {
                anum,
                mass: channel.parent.mass,
            });
            let to = network.node(NuclideNode {
                anum: channel.product.anum,
                mass: MassNumber::ground(channel.product.mass),
            });
            network.graph.add_edge(from, to, channel);
        }
        network
    }

    /// Builds the network straight from a material state.
    pub fn from_state(channels: Vec<ReactionChannel>, state: &MaterialState) -> ReactionNetwork {
        let parents = state
            .isotopes
            .values()
            .map(|iso| (iso.key.clone(), iso.anum))
            .collect();
        ReactionNetwork::build(channels, &parents)
    }

    fn node(&mut self, nuclide: NuclideNode) -> NodeIndex {
        let graph = &mut self.graph;
        *self
            .index
            .entry(nuclide)
            .or_insert_with(|| graph.add_node(nuclide))
    }

    pub fn nuclide_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn channel_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Channels leading away from `anum`/`mass`.
    pub fn channels_from(
        &self,
        anum: AtomicNumber,
        mass: MassNumber,
    ) -> impl Iterator<Item = &ReactionChannel> {
        self.edges(anum, mass, Direction::Outgoing)
    }

    /// Channels producing `anum`/`mass`.
    pub fn channels_into(
        &self,
        anum: AtomicNumber,
        mass: MassNumber,
    ) -> impl Iterator<Item = &ReactionChannel> {
        self.edges(anum, mass, Direction::Incoming)
    }

    fn edges(
        &self,
        anum: AtomicNumber,
        mass: MassNumber,
        direction: Direction,
    ) -> impl Iterator<Item = &ReactionChannel> {
        let node = self.index.get(&NuclideNode { anum, mass }).copied();
        node.into_iter()
            .flat_map(move |idx| self.graph.edges_directed(idx, direction))
            .map(|edge| edge.weight())
    }

    /// Groups by (projectile, product Z, product A), sorted by that key.
    pub fn grouped(&self) -> Vec<ChannelGroup> {
        let mut groups: BTreeMap<(Particle, AtomicNumber, u32), Vec<ReactionChannel>> =
            BTreeMap::new();
        for idx in self.graph.node_indices() {
            for edge in self.graph.edges_directed(idx, Direction::Incoming) {
                let channel = edge.weight();
                groups
                    .entry((channel.projectile, channel.product.anum, channel.product.mass))
                    .or_default()
                    .push(channel.clone());
            }
        }
        groups
            .into_iter()
            .map(|((projectile, anum, mass), channels)| ChannelGroup {
                projectile,
                anum,
                mass,
                channels,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        atomic_data::ElementSymbol,
        element::FractionKind,
        propagate::{capture_reference, propagate},
        registry::Registry,
    };

    fn mo100() -> NuclideKey {
        NuclideKey::new("Mo", MassNumber::ground(100))
    }

    fn generator(projectiles: Vec<Particle>) -> ReactionChannelGenerator<'static> {
        ReactionChannelGenerator::new(PeriodicTable::global(), projectiles)
    }

    #[test]
    fn n_2n_on_mo100_gives_mo99_with_parent_dcc() {
        let channels =
            generator(vec![Particle::Neutron]).channels_for(&mo100(), AtomicNumber(42), Some(1.25));
        let n2n = channels
            .iter()
            .find(|c| {
                c.ejectile
                    == Ejectile::Homogeneous {
                        particle: Particle::Neutron,
                        count: 2,
                    }
            })
            .unwrap();
        assert_eq!(n2n.product.anum, AtomicNumber(42));
        assert_eq!(n2n.product.mass, 99);
        assert_eq!(n2n.dcc, Some(1.25));
        assert!(n2n.product.half_life.is_some());
        assert_eq!(n2n.product.molar_mass, Some(98.907_707_3));
        assert_eq!(n2n.to_string(), "Mo100(n,2n)Mo99");
    }

    #[test]
    fn elastic_channel_is_skipped() {
        for projectile in Particle::ALL {
            let ejectiles = ReactionChannelGenerator::ejectiles(projectile);
            assert!(!ejectiles.contains(&Ejectile::Homogeneous {
                particle: projectile,
                count: 1
            }));
        }
    }

    #[test]
    fn proton_induced_channels_conserve_charge() {
        let channels =
            generator(vec![Particle::Proton]).channels_for(&mo100(), AtomicNumber(42), None);
        let pn = channels
            .iter()
            .find(|c| c.ejectile.to_string() == "n")
            .unwrap();
        assert_eq!((pn.product.anum, pn.product.mass), (AtomicNumber(43), 100));
        assert_eq!(pn.product.symbol.as_deref(), Some("Tc"));

        let p2n = channels.iter().find(|c| c.ejectile.to_string() == "2n").unwrap();
        assert_eq!(p2n.to_string(), "Mo100(p,2n)Tc99");

        let pa = channels.iter().find(|c| c.ejectile.to_string() == "a").unwrap();
        assert_eq!((pa.product.anum, pa.product.mass), (AtomicNumber(41), 97));
    }

    #[test]
    fn mixed_ejectiles_combine_their_content() {
        let channels =
            generator(vec![Particle::Neutron]).channels_for(&mo100(), AtomicNumber(42), None);
        let np = channels.iter().find(|c| c.ejectile.to_string() == "np").unwrap();
        assert_eq!((np.product.anum, np.product.mass), (AtomicNumber(41), 99));
        let na = channels.iter().find(|c| c.ejectile.to_string() == "na").unwrap();
        assert_eq!((na.product.anum, na.product.mass), (AtomicNumber(40), 96));
    }

    #[test]
    fn unphysical_products_are_not_generated() {
        let h1 = NuclideKey::new("H", MassNumber::ground(1));
        let channels = generator(vec![Particle::Gamma]).channels_for(&h1, AtomicNumber(1), None);
        assert!(channels
            .iter()
            .all(|c| c.product.anum.0 >= 1 && c.product.mass >= c.product.anum.0));
        // (g,p) on hydrogen leaves no nucleus
        assert!(!channels.iter().any(|c| c.ejectile.to_string() == "p"));
    }

    #[test]
    fn particles_parse_from_symbols_and_names() {
        assert_eq!("neutron".parse::<Particle>().unwrap(), Particle::Neutron);
        assert_eq!("a".parse::<Particle>().unwrap(), Particle::Alpha);
        assert_eq!(" P ".parse::<Particle>().unwrap(), Particle::Proton);
        assert!("muon".parse::<Particle>().is_err());
    }

    #[test]
    fn network_groups_channels_by_projectile_and_product() {
        let registry = Registry::standard().unwrap();
        let material = registry.material("Mo").unwrap();
        let snapshot = capture_reference(
            material,
            &registry,
            MassNumber::ground(100),
            &ElementSymbol::new("Mo"),
            FractionKind::Mass,
            0.1,
        )
        .unwrap();
        let state = propagate(material, &registry).unwrap();
        let dcc = snapshot.dcc_all(&state);

        let generator = generator(vec![Particle::Neutron, Particle::Proton]);
        let channels = generator.generate(&state, &dcc);
        let total = channels.len();
        let network = ReactionNetwork::from_state(channels, &state);
        assert_eq!(network.channel_count(), total);
        assert!(network.nuclide_count() > 7);

        let groups = network.grouped();
        assert_eq!(groups.iter().map(|g| g.channels.len()).sum::<usize>(), total);

        // Mo99 from neutrons: (n,g) on Mo98 and (n,2n) on Mo100
        let mo99 = groups
            .iter()
            .find(|g| {
                g.projectile == Particle::Neutron && g.anum == AtomicNumber(42) && g.mass == 99
            })
            .unwrap();
        let parents: Vec<String> = mo99.channels.iter().map(|c| c.parent.to_string()).collect();
        assert!(parents.contains(&"Mo98".to_string()));
        assert!(parents.contains(&"Mo100".to_string()));
        assert!(mo99.channels.iter().all(|c| c.dcc == Some(1.0)));

        let into = network.channels_into(AtomicNumber(42), MassNumber::ground(99)).count();
        let from_groups: usize = groups
            .iter()
            .filter(|g| g.anum == AtomicNumber(42) && g.mass == 99)
            .map(|g| g.channels.len())
            .sum();
        assert_eq!(into, from_groups);
        assert!(network.channels_from(AtomicNumber(42), MassNumber::ground(100)).count() > 0);
    }
}
