//! Uniform selection helpers built on Fisher-Yates.
//!
//! Both functions only draw from the supplied RNG, so a seeded `StdRng`
//! reproduces the same order on every run.

use rand::Rng;

/// Returns a uniformly shuffled permutation of `0..n`.
pub fn shuffled_indices<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<usize> {
    sample_indices(rng, n, n)
}

/// Draws `k` distinct indices from `0..n` without replacement.
///
/// Runs a partial Fisher-Yates shuffle and stops after `k` swaps, so the cost
/// is O(n) for setup plus O(k) for the draw. `k` is clamped to `n`.
pub fn sample_indices<R: Rng + ?Sized>(rng: &mut R, n: usize, k: usize) -> Vec<usize> {
    let k = k.min(n);
    let mut pool: Vec<usize> = (0..n).collect();

    for i in 0..k {
        let j = rng.random_range(i..n);
        pool.swap(i, j);
    }

    pool.truncate(k);
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut order = shuffled_indices(&mut rng, 50);
        order.sort_unstable();
        assert_eq!(order, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn sample_has_no_duplicates() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let sample = sample_indices(&mut rng, 30, 15);
            assert_eq!(sample.len(), 15);
            let unique: HashSet<_> = sample.iter().copied().collect();
            assert_eq!(unique.len(), 15);
            assert!(sample.iter().all(|&i| i < 30));
        }
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let a = sample_indices(&mut StdRng::seed_from_u64(42), 100, 10);
        let b = sample_indices(&mut StdRng::seed_from_u64(42), 100, 10);
        assert_eq!(a, b);
    }

    #[test]
    fn oversized_sample_is_clamped() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(sample_indices(&mut rng, 4, 10).len(), 4);
        assert!(sample_indices(&mut rng, 0, 3).is_empty());
    }
}
