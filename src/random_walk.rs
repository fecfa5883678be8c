//! Simple random walk with a degree-corrected ratio estimate.

use tracing::{instrument, trace};

use crate::graph::{Sex, SexCounts, SexedGraph};
use crate::rng::RandomSource;
use crate::{Error, Result};

/// Which node of a transition `current -> next` a walk counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MeasurePoint {
    /// Count `next`, the node just entered.
    Arrival,
    /// Count `current`, the node about to be left.
    Departure,
}

/// Shared configuration for both walk samplers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WalkConfig {
    pub steps: usize,
    /// Start node; `None` picks one uniformly at random.
    pub start: Option<usize>,
    /// Overrides the sampler's native measurement point
    /// ([`MeasurePoint::Arrival`] for the simple walk,
    /// [`MeasurePoint::Departure`] for Metropolis–Hastings).
    pub measure: Option<MeasurePoint>,
    /// Also count visits per node (one `Vec<usize>` of length `node_count`).
    pub track_visits: bool,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self { steps: 200, start: None, measure: None, track_visits: false }
    }
}

impl WalkConfig {
    pub fn new(steps: usize) -> Self {
        Self { steps, ..Self::default() }
    }

    pub fn start_at(mut self, node: usize) -> Self {
        self.start = Some(node);
        self
    }

    pub fn measure_at(mut self, point: MeasurePoint) -> Self {
        self.measure = Some(point);
        self
    }

    pub fn with_visits(mut self) -> Self {
        self.track_visits = true;
        self
    }

    /// Validate against `graph` and resolve the start node.
    pub(crate) fn start_node<G: SexedGraph>(&self, graph: &G, rng: &mut RandomSource) -> Result<usize> {
        if self.steps == 0 {
            return Err(Error::InvalidParameters("steps must be > 0".to_string()));
        }
        let n = graph.node_count();
        if n == 0 {
            return Err(Error::InvalidParameters("cannot walk an empty graph".to_string()));
        }
        match self.start {
            Some(s) if s >= n => Err(Error::IndexOutOfBounds(s)),
            Some(s) => Ok(s),
            None => Ok(rng.index(n)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleWalkReport {
    pub tally: SexCounts,
    /// Female share of the tally. Biased toward high-degree nodes.
    pub biased_ratio: f64,
    /// Hansen–Hurwitz estimate: departures weighted by `1 / degree`.
    pub unbiased_ratio: f64,
    pub end_node: usize,
    /// Per-node counts at the measurement point, if requested.
    pub visits: Option<Vec<usize>>,
}

/// Running sums of `1 / degree` over departure observations.
///
/// A plain walk sits on `v` with probability proportional to `degree(v)`; weighting each
/// observation by `1 / degree(v)` cancels that.
#[derive(Debug, Clone, Copy, Default)]
struct InverseDegreeSums {
    female: f64,
    all: f64,
}

impl InverseDegreeSums {
    fn observe(&mut self, degree: usize, sex: Sex) {
        let w = 1.0 / degree as f64;
        self.all += w;
        if sex == Sex::Female {
            self.female += w;
        }
    }

    fn ratio(&self) -> f64 {
        if self.all > 0.0 {
            self.female / self.all
        } else {
            0.0
        }
    }
}

/// Walk `config.steps` uniform-neighbor transitions and estimate the female ratio.
///
/// Each step records the departure node's degree and sex, moves to a uniformly chosen
/// neighbor, then tallies the measured node (the arrival by default).
///
/// Fails with [`Error::DeadEndNode`] on reaching a node without neighbors; nothing of
/// the partial walk is returned.
#[instrument(level = "debug", skip_all, fields(steps = config.steps, start = ?config.start))]
pub fn simple_random_walk<G: SexedGraph>(
    graph: &G,
    config: &WalkConfig,
    rng: &mut RandomSource,
) -> Result<SimpleWalkReport> {
    let measure = config.measure.unwrap_or(MeasurePoint::Arrival);
    let mut curr = config.start_node(graph, rng)?;
    let mut tally = SexCounts::default();
    let mut sums = InverseDegreeSums::default();
    let mut visits = config.track_visits.then(|| vec![0usize; graph.node_count()]);

    for step in 0..config.steps {
        let nbrs = graph.neighbors_ref(curr);
        let Some(next) = rng.choose(nbrs) else {
            return Err(Error::DeadEndNode { node: curr, step });
        };
        sums.observe(nbrs.len(), graph.sex(curr));
        let measured = match measure {
            MeasurePoint::Arrival => next,
            MeasurePoint::Departure => curr,
        };
        tally.record(graph.sex(measured));
        if let Some(v) = visits.as_mut() {
            v[measured] += 1;
        }
        curr = next;
    }

    let biased_ratio = tally.female as f64 / config.steps as f64;
    let unbiased_ratio = sums.ratio();
    trace!(biased_ratio, unbiased_ratio, end = curr, "simple walk done");
    Ok(SimpleWalkReport { tally, biased_ratio, unbiased_ratio, end_node: curr, visits })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SocialGraph;

    fn path() -> SocialGraph {
        // M0 - F1 - F2
        SocialGraph::from_edges(vec![Sex::Male, Sex::Female, Sex::Female], &[(0, 1), (1, 2)])
            .unwrap()
    }

    #[test]
    fn tally_sums_to_steps() {
        let g = path();
        let cfg = WalkConfig::new(57).start_at(0);
        let r = simple_random_walk(&g, &cfg, &mut RandomSource::seed_from_u64(3)).unwrap();
        assert_eq!(r.tally.total(), 57);
        assert!((0.0..=1.0).contains(&r.biased_ratio));
        assert!((0.0..=1.0).contains(&r.unbiased_ratio));
    }

    #[test]
    fn single_step_from_leaf_is_deterministic() {
        let g = path();
        let cfg = WalkConfig::new(1).start_at(0).with_visits();
        let r = simple_random_walk(&g, &cfg, &mut RandomSource::seed_from_u64(0)).unwrap();
        assert_eq!(r.end_node, 1);
        assert_eq!(r.tally, SexCounts { male: 0, female: 1 });
        assert_eq!(r.biased_ratio, 1.0);
        // One departure from a male: no female weight.
        assert_eq!(r.unbiased_ratio, 0.0);
        assert_eq!(r.visits, Some(vec![0, 1, 0]));
    }

    #[test]
    fn departure_measure_counts_the_start() {
        let g = path();
        let cfg = WalkConfig::new(1).start_at(0).measure_at(MeasurePoint::Departure);
        let r = simple_random_walk(&g, &cfg, &mut RandomSource::seed_from_u64(0)).unwrap();
        assert_eq!(r.tally, SexCounts { male: 1, female: 0 });
    }

    #[test]
    fn dead_end_is_reported() {
        let g = SocialGraph::from_sexes(vec![Sex::Male, Sex::Female]);
        let cfg = WalkConfig::new(10).start_at(1);
        let err = simple_random_walk(&g, &cfg, &mut RandomSource::seed_from_u64(0)).unwrap_err();
        assert_eq!(err, Error::DeadEndNode { node: 1, step: 0 });
    }

    #[test]
    fn bad_configs_are_rejected() {
        let g = path();
        let mut rng = RandomSource::seed_from_u64(0);
        assert!(matches!(
            simple_random_walk(&g, &WalkConfig::new(0), &mut rng),
            Err(Error::InvalidParameters(_))
        ));
        assert_eq!(
            simple_random_walk(&g, &WalkConfig::new(5).start_at(3), &mut rng),
            Err(Error::IndexOutOfBounds(3))
        );
        let empty = SocialGraph::from_sexes(Vec::new());
        assert!(matches!(
            simple_random_walk(&empty, &WalkConfig::new(5), &mut rng),
            Err(Error::InvalidParameters(_))
        ));
    }
}
