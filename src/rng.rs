//! The single, explicit source of randomness.
//!
//! Every operation that draws takes `&mut RandomSource`; there is no ambient RNG.
//! Two runs seeded identically consume the stream in the same order and therefore
//! produce identical graphs and walks.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;

use crate::graph::Sex;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: ChaCha8Rng,
}

impl RandomSource {
    pub fn seed_from_u64(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Seed from the operating system. Runs built this way are not reproducible.
    pub fn from_os_rng() -> Self {
        Self { rng: ChaCha8Rng::from_os_rng() }
    }

    /// Uniform in `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// Uniform in `[0, len)`. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }

    /// A uniformly chosen element, or `None` for an empty slice.
    pub fn choose(&mut self, items: &[usize]) -> Option<usize> {
        items.choose(&mut self.rng).copied()
    }

    /// One draw from `N(mean, std_dev)`. A zero `std_dev` returns `mean`.
    pub fn gaussian(&mut self, mean: f64, std_dev: f64) -> Result<f64> {
        // rand_distr accepts a negative std_dev (it flips the sign), so check here.
        if !mean.is_finite() || !std_dev.is_finite() || std_dev < 0.0 {
            return Err(Error::InvalidParameters(format!(
                "normal(mean={mean}, std_dev={std_dev}): mean must be finite, std_dev finite and >= 0"
            )));
        }
        let normal = Normal::new(mean, std_dev).map_err(|e| {
            Error::InvalidParameters(format!("normal(mean={mean}, std_dev={std_dev}): {e}"))
        })?;
        Ok(normal.sample(&mut self.rng))
    }

    /// Draw `k` distinct ids from `pool` without replacement.
    ///
    /// `node` and `sex` only label the error when `k > pool.len()`; the draw is never
    /// truncated to the pool size.
    pub fn sample_without_replacement(
        &mut self,
        pool: &[usize],
        k: usize,
        node: usize,
        sex: Sex,
    ) -> Result<Vec<usize>> {
        if k > pool.len() {
            return Err(Error::InvalidSampleSize {
                node,
                pool: sex,
                requested: k,
                available: pool.len(),
            });
        }
        Ok(rand::seq::index::sample(&mut self.rng, pool.len(), k)
            .into_iter()
            .map(|i| pool[i])
            .collect())
    }

    /// Draw an index from a probability vector by cumulative scan.
    ///
    /// The vector is expected to sum to 1 already. If rounding lets the draw run
    /// past the end, the last index wins.
    pub fn categorical(&mut self, probabilities: &[f64]) -> usize {
        debug_assert!(!probabilities.is_empty());
        let mut r = self.uniform();
        for (i, &p) in probabilities.iter().enumerate() {
            if r < p {
                return i;
            }
            r -= p;
        }
        probabilities.len().saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = RandomSource::seed_from_u64(7);
        let mut b = RandomSource::seed_from_u64(7);
        for _ in 0..16 {
            assert_eq!(a.uniform().to_bits(), b.uniform().to_bits());
            assert_eq!(a.index(10), b.index(10));
        }
    }

    #[test]
    fn sample_without_replacement_is_distinct_and_from_pool() {
        let mut rng = RandomSource::seed_from_u64(1);
        let pool = [10, 11, 12, 13, 14];
        let got = rng.sample_without_replacement(&pool, 5, 0, Sex::Male).unwrap();
        let mut sorted = got.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, pool);

        let got = rng.sample_without_replacement(&pool, 0, 0, Sex::Male).unwrap();
        assert!(got.is_empty());
    }

    #[test]
    fn oversized_sample_is_rejected() {
        let mut rng = RandomSource::seed_from_u64(1);
        let err = rng.sample_without_replacement(&[1, 2], 3, 9, Sex::Female).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidSampleSize { node: 9, pool: Sex::Female, requested: 3, available: 2 }
        );
    }

    #[test]
    fn choose_stays_in_slice() {
        let mut rng = RandomSource::seed_from_u64(8);
        assert_eq!(rng.choose(&[]), None);
        assert_eq!(rng.choose(&[4]), Some(4));
        for _ in 0..50 {
            assert!(matches!(rng.choose(&[1, 5, 9]), Some(1 | 5 | 9)));
        }
    }

    #[test]
    fn gaussian_rejects_negative_std_dev() {
        let mut rng = RandomSource::seed_from_u64(1);
        assert!(matches!(rng.gaussian(1.0, -1.0), Err(Error::InvalidParameters(_))));
        assert!(matches!(rng.gaussian(f64::NAN, 1.0), Err(Error::InvalidParameters(_))));
        assert!(matches!(rng.gaussian(0.0, f64::INFINITY), Err(Error::InvalidParameters(_))));
        assert_eq!(rng.gaussian(4.0, 0.0).unwrap(), 4.0);
    }

    #[test]
    fn categorical_respects_point_masses() {
        let mut rng = RandomSource::seed_from_u64(3);
        for _ in 0..100 {
            assert_eq!(rng.categorical(&[0.0, 1.0, 0.0]), 1);
            assert_eq!(rng.categorical(&[0.0, 0.0, 1.0]), 2);
        }
    }

    #[test]
    fn categorical_frequencies_track_weights() {
        let mut rng = RandomSource::seed_from_u64(5);
        let p = [0.2, 0.5, 0.3];
        let mut hits = [0usize; 3];
        let draws = 20_000;
        for _ in 0..draws {
            hits[rng.categorical(&p)] += 1;
        }
        for (h, want) in hits.iter().zip(p) {
            let freq = *h as f64 / draws as f64;
            assert!((freq - want).abs() < 0.02, "freq={freq} want={want}");
        }
    }
}
