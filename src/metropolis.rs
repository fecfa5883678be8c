//! Metropolis–Hastings random walk with a uniform stationary distribution.
//!
//! Proposal: a uniform neighbor, probability \(1/d_v\). Target: uniform over nodes.
//! The Metropolis acceptance for `v -> u` is then \(\min(1, d_v / d_u)\), so
//!
//! \[
//!   P(v \to u) = \frac{1}{d_v} \min\left(1, \frac{d_v}{d_u}\right),\qquad
//!   P(v \to v) = 1 - \sum_{u \in N(v)} P(v \to u).
//! \]
//!
//! Moves to lower- or equal-degree neighbors happen at rate \(1/d_v\); moves to
//! higher-degree neighbors are damped by \(d_v/d_u\). The kernel is symmetric
//! (\(P(v \to u) = 1/\max(d_u, d_v) = P(u \to v)\)), hence doubly stochastic, hence
//! uniform in the limit.

use tracing::{instrument, trace};

use crate::graph::{SexCounts, SexedGraph};
use crate::random_walk::{MeasurePoint, WalkConfig};
use crate::rng::RandomSource;
use crate::{Error, Result};

/// Absolute tolerance on the sum of a transition vector.
///
/// The stay probability is `max(0, 1 - Σ)`, so floating-point overshoot of at most this
/// much is absorbed by the clamp; anything larger is an error.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Fill `buf` with `[P(v -> u_1), …, P(v -> u_d), P(v -> v)]`, neighbors in
/// `neighbors_ref(node)` order.
///
/// A node without neighbors gets `[1.0]`: staying is the only move.
pub fn transition_probabilities<G: SexedGraph>(
    graph: &G,
    node: usize,
    buf: &mut Vec<f64>,
) -> Result<()> {
    buf.clear();
    let nbrs = graph.neighbors_ref(node);
    if nbrs.is_empty() {
        buf.push(1.0);
        return Ok(());
    }

    let d = nbrs.len() as f64;
    for &u in nbrs {
        let du = graph.degree(u) as f64;
        buf.push((1.0 / d) * (d / du).min(1.0));
    }
    let moving: f64 = buf.iter().sum();
    buf.push((1.0 - moving).max(0.0));

    check_probabilities(node, buf)?;
    Ok(())
}

/// Every entry finite and non-negative, sum within [`PROBABILITY_TOLERANCE`] of 1.
/// Returns the sum.
fn check_probabilities(node: usize, probs: &[f64]) -> Result<f64> {
    let sum: f64 = probs.iter().sum();
    if probs.iter().any(|p| !p.is_finite() || *p < 0.0) || (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(Error::InvalidProbabilityVector { node, sum });
    }
    Ok(sum)
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetropolisWalkReport {
    pub tally: SexCounts,
    pub female_ratio: f64,
    pub end_node: usize,
    /// Per-node counts at the measurement point, if requested.
    pub visits: Option<Vec<usize>>,
}

/// Walk `config.steps` Metropolis–Hastings transitions and report the female ratio.
///
/// By default each step tallies the node being left (the state the chain is in), then
/// draws the next state from `N(v) ∪ {v}`.
#[instrument(level = "debug", skip_all, fields(steps = config.steps, start = ?config.start))]
pub fn metropolis_hastings_walk<G: SexedGraph>(
    graph: &G,
    config: &WalkConfig,
    rng: &mut RandomSource,
) -> Result<MetropolisWalkReport> {
    let measure = config.measure.unwrap_or(MeasurePoint::Departure);
    let mut curr = config.start_node(graph, rng)?;
    let mut tally = SexCounts::default();
    let mut visits = config.track_visits.then(|| vec![0usize; graph.node_count()]);
    let mut probs: Vec<f64> = Vec::new();

    for _ in 0..config.steps {
        transition_probabilities(graph, curr, &mut probs)?;
        let nbrs = graph.neighbors_ref(curr);
        let pick = rng.categorical(&probs);
        // The last slot is "stay".
        let next = nbrs.get(pick).copied().unwrap_or(curr);

        let measured = match measure {
            MeasurePoint::Departure => curr,
            MeasurePoint::Arrival => next,
        };
        tally.record(graph.sex(measured));
        if let Some(v) = visits.as_mut() {
            v[measured] += 1;
        }
        curr = next;
    }

    let female_ratio = tally.female as f64 / config.steps as f64;
    trace!(female_ratio, end = curr, "metropolis-hastings walk done");
    Ok(MetropolisWalkReport { tally, female_ratio, end_node: curr, visits })
}
