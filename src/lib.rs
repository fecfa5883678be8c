//! `socialwalk`: attribute-conditioned social graphs and walk-based ratio estimators.
//!
//! A [`SocialGraph`] tags every node with a [`Sex`] and is built by [`generate()`] from
//! four attribute-pair connection-count distributions. Two local walks then estimate
//! the population's female ratio while only ever looking at one neighborhood at a time:
//!
//! - [`simple_random_walk`]: a plain walk. Its raw ratio is biased toward high-degree
//!   nodes; the Hansen–Hurwitz reweighting (divide each observation by its degree)
//!   removes that bias asymptotically.
//! - [`metropolis_hastings_walk`]: acceptance probabilities
//!   \(\frac{1}{d_v}\min(1, d_v / d_u)\) make the stationary distribution uniform over
//!   nodes, so its raw ratio is already unbiased.
//!
//! Public invariants (must not drift):
//! - **Node order**: males occupy the id prefix `0..floor(n * male_ratio)`.
//! - **Symmetry**: `v ∈ neighbors(u) ⇔ u ∈ neighbors(v)`; no self-loops.
//! - **Determinism**: identical seeds + configs give identical graphs and reports.
//! - **Explicit randomness**: every random draw goes through a caller-owned
//!   [`RandomSource`]; nothing reads process-global RNG state.

pub mod generate;
pub mod graph;
pub mod metropolis;
pub mod random_walk;
pub mod rng;
pub mod simulate;

pub use generate::{generate, ConnectionSpec, Connectivity, PopulationConfig};
pub use graph::{GraphRef, Sex, SexCounts, SexedGraph, SocialGraph};
pub use metropolis::{
    metropolis_hastings_walk, transition_probabilities, MetropolisWalkReport,
    PROBABILITY_TOLERANCE,
};
pub use random_walk::{simple_random_walk, MeasurePoint, SimpleWalkReport, WalkConfig};
pub use rng::RandomSource;
pub use simulate::{run, run_batch, SimulationConfig, SimulationReport};

#[cfg(feature = "parallel")]
pub use simulate::run_batch_parallel;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("index out of bounds: {0}")]
    IndexOutOfBounds(usize),
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    /// More distinct targets were requested than the pool holds.
    #[error("node {node}: cannot sample {requested} distinct {pool} nodes from a pool of {available}")]
    InvalidSampleSize {
        node: usize,
        pool: Sex,
        requested: usize,
        available: usize,
    },
    /// A simple random walk stood on a node with no neighbors.
    #[error("walk reached dead-end node {node} at step {step}")]
    DeadEndNode { node: usize, step: usize },
    #[error("transition probabilities at node {node} are invalid (sum={sum})")]
    InvalidProbabilityVector { node: usize, sum: f64 },
    #[error("graph invariant violated: {0}")]
    BrokenInvariant(String),
}

pub type Result<T> = std::result::Result<T, Error>;
