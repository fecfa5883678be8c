//! Attribute-tagged undirected graphs and the minimal adapter traits the walks read.

use std::fmt;

use crate::{Error, Result};

/// A graph view that can return **borrowed** neighbor slices.
///
/// Walks only ever touch the graph through this trait, so a step never allocates.
pub trait GraphRef {
    fn node_count(&self) -> usize;
    fn neighbors_ref(&self, node: usize) -> &[usize];
    fn degree(&self, node: usize) -> usize {
        self.neighbors_ref(node).len()
    }
}

/// A graph whose nodes carry a [`Sex`].
pub trait SexedGraph: GraphRef {
    fn sex(&self, node: usize) -> Sex;
}

/// The binary node attribute. The domain is closed, so this is a plain enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sex {
    Male,
    Female,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Male => "male",
            Self::Female => "female",
        })
    }
}

/// Male/female counts. Used both for population stats and for walk tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SexCounts {
    pub male: usize,
    pub female: usize,
}

impl SexCounts {
    pub fn record(&mut self, sex: Sex) {
        match sex {
            Sex::Male => self.male += 1,
            Sex::Female => self.female += 1,
        }
    }

    pub const fn get(&self, sex: Sex) -> usize {
        match sex {
            Sex::Male => self.male,
            Sex::Female => self.female,
        }
    }

    pub const fn total(&self) -> usize {
        self.male + self.female
    }

    /// Female share of the total; `0.0` when nothing was counted.
    pub fn female_ratio(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.get(Sex::Female) as f64 / total as f64
    }
}

/// Undirected social graph with a dense sex array and a pre-sized adjacency.
///
/// Neighbor lists keep insertion order and never hold duplicates. Symmetry and the
/// absence of self-loops are enforced by [`SocialGraph::add_edge`], the only way to
/// create an edge.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SocialGraph {
    sexes: Vec<Sex>,
    adj: Vec<Vec<usize>>,
    edges: usize,
}

impl SocialGraph {
    /// An edgeless graph with one node per entry of `sexes`, ids in order.
    pub fn from_sexes(sexes: Vec<Sex>) -> Self {
        let n = sexes.len();
        Self { sexes, adj: vec![Vec::new(); n], edges: 0 }
    }

    /// An edgeless graph whose first `male_count` ids are male and the rest female.
    pub fn with_population(num_nodes: usize, male_count: usize) -> Result<Self> {
        if male_count > num_nodes {
            return Err(Error::InvalidParameters(format!(
                "male_count {male_count} exceeds num_nodes {num_nodes}"
            )));
        }
        let sexes = (0..num_nodes)
            .map(|i| if i < male_count { Sex::Male } else { Sex::Female })
            .collect();
        Ok(Self::from_sexes(sexes))
    }

    /// Build a graph from an undirected edge list. Duplicate edges and self-loops are
    /// ignored, the same way [`SocialGraph::add_edge`] ignores them.
    pub fn from_edges(sexes: Vec<Sex>, edges: &[(usize, usize)]) -> Result<Self> {
        let mut g = Self::from_sexes(sexes);
        for &(u, v) in edges {
            g.add_edge(u, v)?;
        }
        Ok(g)
    }

    /// Insert the undirected edge `{u, v}`.
    ///
    /// Returns `Ok(true)` if the edge is new, `Ok(false)` if it already existed or
    /// `u == v` (self-loops are dropped, not rejected).
    pub fn add_edge(&mut self, u: usize, v: usize) -> Result<bool> {
        let n = self.sexes.len();
        if u >= n {
            return Err(Error::IndexOutOfBounds(u));
        }
        if v >= n {
            return Err(Error::IndexOutOfBounds(v));
        }
        if u == v || self.adj[u].contains(&v) {
            return Ok(false);
        }
        self.adj[u].push(v);
        // The reverse entry can only be missing if symmetry was already broken.
        if !self.adj[v].contains(&u) {
            self.adj[v].push(u);
        }
        self.edges += 1;
        Ok(true)
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.adj.get(u).is_some_and(|nbrs| nbrs.contains(&v))
    }

    pub fn edge_count(&self) -> usize {
        self.edges
    }

    pub fn sexes(&self) -> &[Sex] {
        &self.sexes
    }

    /// Ids of every node with the given sex, ascending.
    pub fn pool(&self, sex: Sex) -> Vec<usize> {
        self.sexes
            .iter()
            .enumerate()
            .filter(|(_, &s)| s == sex)
            .map(|(i, _)| i)
            .collect()
    }

    /// Population counts by sex.
    pub fn stats(&self) -> SexCounts {
        let mut counts = SexCounts::default();
        for &s in &self.sexes {
            counts.record(s);
        }
        counts
    }

    /// Re-check the structural invariants: neighbor ids in range, no self-loops,
    /// no duplicate neighbors, and symmetry.
    pub fn validate(&self) -> Result<()> {
        let n = self.sexes.len();
        if self.adj.len() != n {
            return Err(Error::BrokenInvariant(format!(
                "adjacency has {} rows for {n} nodes",
                self.adj.len()
            )));
        }
        let mut half_edges = 0usize;
        for (u, nbrs) in self.adj.iter().enumerate() {
            for (i, &v) in nbrs.iter().enumerate() {
                if v >= n {
                    return Err(Error::BrokenInvariant(format!("edge {u} -> {v} is out of range")));
                }
                if v == u {
                    return Err(Error::BrokenInvariant(format!("self-loop at {u}")));
                }
                if nbrs[..i].contains(&v) {
                    return Err(Error::BrokenInvariant(format!("duplicate edge {u} -> {v}")));
                }
                if !self.adj[v].contains(&u) {
                    return Err(Error::BrokenInvariant(format!(
                        "edge {u} -> {v} has no reverse entry"
                    )));
                }
            }
            half_edges += nbrs.len();
        }
        if half_edges != 2 * self.edges {
            return Err(Error::BrokenInvariant(format!(
                "edge count {} disagrees with {half_edges} adjacency entries",
                self.edges
            )));
        }
        Ok(())
    }
}

impl GraphRef for SocialGraph {
    fn node_count(&self) -> usize {
        self.sexes.len()
    }

    fn neighbors_ref(&self, node: usize) -> &[usize] {
        self.adj.get(node).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl SexedGraph for SocialGraph {
    fn sex(&self, node: usize) -> Sex {
        self.sexes[node]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_edge_is_symmetric_and_idempotent() {
        let mut g = SocialGraph::with_population(3, 1).unwrap();
        assert!(g.add_edge(0, 1).unwrap());
        assert!(!g.add_edge(1, 0).unwrap());
        assert!(!g.add_edge(0, 1).unwrap());
        assert_eq!(g.neighbors_ref(0), &[1]);
        assert_eq!(g.neighbors_ref(1), &[0]);
        assert_eq!(g.edge_count(), 1);
        g.validate().unwrap();
    }

    #[test]
    fn self_loops_are_dropped() {
        let mut g = SocialGraph::with_population(2, 1).unwrap();
        assert!(!g.add_edge(1, 1).unwrap());
        assert_eq!(g.degree(1), 0);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn out_of_range_endpoint_is_an_error() {
        let mut g = SocialGraph::with_population(2, 1).unwrap();
        assert_eq!(g.add_edge(0, 5), Err(Error::IndexOutOfBounds(5)));
        assert_eq!(g.add_edge(7, 0), Err(Error::IndexOutOfBounds(7)));
    }

    #[test]
    fn population_prefix_is_male() {
        let g = SocialGraph::with_population(5, 2).unwrap();
        assert_eq!(
            g.sexes(),
            &[Sex::Male, Sex::Male, Sex::Female, Sex::Female, Sex::Female]
        );
        assert_eq!(g.stats(), SexCounts { male: 2, female: 3 });
        assert_eq!(g.pool(Sex::Male), vec![0, 1]);
        assert_eq!(g.pool(Sex::Female), vec![2, 3, 4]);
        assert!(SocialGraph::with_population(2, 3).is_err());
    }

    #[test]
    fn validate_flags_broken_symmetry() {
        let mut g = SocialGraph::with_population(3, 1).unwrap();
        g.add_edge(0, 2).unwrap();
        g.adj[2].clear();
        assert!(matches!(g.validate(), Err(Error::BrokenInvariant(_))));
    }

    #[test]
    fn counts_ratio() {
        let mut c = SexCounts::default();
        assert_eq!(c.female_ratio(), 0.0);
        c.record(Sex::Female);
        c.record(Sex::Female);
        c.record(Sex::Male);
        c.record(Sex::Female);
        assert_eq!(c.total(), 4);
        assert_eq!(c.get(Sex::Female), 3);
        assert_eq!(c.get(Sex::Male), 1);
        assert!((c.female_ratio() - 0.75).abs() < 1e-12);
        assert_eq!(Sex::Female.to_string(), "female");
    }
}
