//! Graph generation from population parameters and attribute-pair connectivity.

use tracing::{debug, instrument};

use crate::graph::{Sex, SexedGraph, SocialGraph};
use crate::rng::RandomSource;
use crate::{Error, Result};

/// Normal distribution of how many targets a node asks for in one pool.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Connectivity {
    pub mean: f64,
    pub std_dev: f64,
}

impl Connectivity {
    pub const fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }

    /// One connection count: `max(1, floor(N(mean, std_dev)))`.
    pub fn draw(&self, rng: &mut RandomSource) -> Result<usize> {
        self.validate("connectivity")?;
        let x = rng.gaussian(self.mean, self.std_dev)?.floor();
        // Saturating float -> int cast; anything below 1 clamps to 1.
        Ok((x as i64).max(1) as usize)
    }

    fn validate(&self, label: &str) -> Result<()> {
        if !self.mean.is_finite() {
            return Err(Error::InvalidParameters(format!(
                "{label}: mean must be finite, got {}",
                self.mean
            )));
        }
        if !self.std_dev.is_finite() || self.std_dev < 0.0 {
            return Err(Error::InvalidParameters(format!(
                "{label}: std_dev must be finite and >= 0, got {}",
                self.std_dev
            )));
        }
        Ok(())
    }
}

/// Connection-count distributions keyed by `(source sex, target sex)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionSpec {
    pub male_male: Connectivity,
    pub male_female: Connectivity,
    pub female_male: Connectivity,
    pub female_female: Connectivity,
}

impl Default for ConnectionSpec {
    fn default() -> Self {
        Self {
            male_male: Connectivity::new(23.0, 5.0),
            male_female: Connectivity::new(5.0, 3.0),
            female_male: Connectivity::new(5.0, 3.0),
            female_female: Connectivity::new(12.0, 3.0),
        }
    }
}

impl ConnectionSpec {
    pub const fn get(&self, source: Sex, target: Sex) -> Connectivity {
        match (source, target) {
            (Sex::Male, Sex::Male) => self.male_male,
            (Sex::Male, Sex::Female) => self.male_female,
            (Sex::Female, Sex::Male) => self.female_male,
            (Sex::Female, Sex::Female) => self.female_female,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.male_male.validate("male_male")?;
        self.male_female.validate("male_female")?;
        self.female_male.validate("female_male")?;
        self.female_female.validate("female_female")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PopulationConfig {
    pub num_nodes: usize,
    pub male_ratio: f64,
    pub connections: ConnectionSpec,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self { num_nodes: 1000, male_ratio: 0.4, connections: ConnectionSpec::default() }
    }
}

impl PopulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_nodes == 0 {
            return Err(Error::InvalidParameters("num_nodes must be > 0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.male_ratio) {
            return Err(Error::InvalidParameters(format!(
                "male_ratio must be in [0, 1], got {}",
                self.male_ratio
            )));
        }
        self.connections.validate()
    }

    /// `floor(num_nodes * male_ratio)`: the length of the male id prefix.
    pub fn male_count(&self) -> usize {
        ((self.num_nodes as f64 * self.male_ratio).floor() as usize).min(self.num_nodes)
    }
}

/// Build a social graph.
///
/// Nodes are visited in id order. Each node draws how many male and how many female
/// targets it wants (in that order), samples them without replacement from the
/// respective pool, and links to every target other than itself. Edges are
/// undirected and deduplicated, so a node's final degree is usually larger than
/// what it asked for, and a node whose only draw was itself ends up with degree 0.
///
/// Fails with [`Error::InvalidSampleSize`] as soon as a node asks for more targets
/// than a pool holds; in particular an empty pool always fails.
#[instrument(level = "debug", skip_all, fields(num_nodes = config.num_nodes, male_ratio = config.male_ratio))]
pub fn generate(config: &PopulationConfig, rng: &mut RandomSource) -> Result<SocialGraph> {
    config.validate()?;
    let male_count = config.male_count();
    let mut graph = SocialGraph::with_population(config.num_nodes, male_count)?;
    let males = graph.pool(Sex::Male);
    let females = graph.pool(Sex::Female);

    for v in 0..config.num_nodes {
        let sex = graph.sex(v);
        let k_male = config.connections.get(sex, Sex::Male).draw(rng)?;
        let k_female = config.connections.get(sex, Sex::Female).draw(rng)?;

        let male_targets = rng.sample_without_replacement(&males, k_male, v, Sex::Male)?;
        let female_targets = rng.sample_without_replacement(&females, k_female, v, Sex::Female)?;

        for t in male_targets.into_iter().chain(female_targets) {
            graph.add_edge(v, t)?;
        }
    }

    debug!(
        male = male_count,
        female = config.num_nodes - male_count,
        edges = graph.edge_count(),
        "generated social graph"
    );
    Ok(graph)
}
