//! Bayesian sight inference: maintains a belief over the opponent's
//! reasoning depth ("sight level") and updates it from observed moves.
//!
//! Pure functions over belief vectors and a link matrix, with no dependency
//! on the search tree or game-state types: this component shares no state
//! with the search kernel, so it lives in its own crate.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Reference threshold above which a sight level is considered inferred.
pub const DEFAULT_TAU: f64 = 0.98;

/// `K×K` likelihood matrix: `L[i][j]` is the probability the opponent's
/// observed behavior looks like sight level `j` given their true sight is
/// `i`. Rows are likelihood weights, not required to sum to 1.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LinkMatrix {
    rows: Vec<Vec<f64>>,
}

impl LinkMatrix {
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        let k = rows.len();
        assert!(k > 0, "LinkMatrix must have at least one row");
        assert!(
            rows.iter().all(|row| row.len() == k),
            "LinkMatrix must be square"
        );
        Self { rows }
    }

    pub fn k(&self) -> usize {
        self.rows.len()
    }

    fn get(&self, i: usize, j: usize) -> f64 {
        self.rows[i][j]
    }

    /// The reference 5-level matrix: 0.6 mass on the diagonal, the
    /// remainder shed to neighboring sight levels (clamped at the edges).
    pub fn default_k5() -> Self {
        const K: usize = 5;
        let mut rows = vec![vec![0.0; K]; K];
        for (i, row) in rows.iter_mut().enumerate() {
            row[i] = 0.6;
            let neighbors: Vec<usize> = [i.checked_sub(1), Some(i + 1)]
                .into_iter()
                .flatten()
                .filter(|&n| n < K)
                .collect();
            let share = 0.4 / neighbors.len() as f64;
            for n in neighbors {
                row[n] += share;
            }
        }
        Self { rows }
    }
}

/// A probability vector over sight levels `1..=K` (stored 0-indexed
/// internally; all public indices in this crate are 0-indexed sight levels).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Belief {
    prior: Vec<f64>,
}

impl Belief {
    /// Uniform `1/k` belief, the per-game reset state.
    pub fn uniform(k: usize) -> Self {
        assert!(k > 0);
        Self {
            prior: vec![1.0 / k as f64; k],
        }
    }

    pub fn from_vec(prior: Vec<f64>) -> Self {
        assert!(!prior.is_empty());
        Self { prior }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.prior
    }

    pub fn k(&self) -> usize {
        self.prior.len()
    }

    /// Run one belief update in place from an observed opponent move and
    /// the sight array computed for the position before that move.
    pub fn update<M: PartialEq>(&mut self, observed_move: &M, sight_array: &[M], link: &LinkMatrix) {
        self.prior = posterior(&self.prior, observed_move, sight_array, link);
    }
}

/// Step 1: the lambda evidence vector. `λ[i] = 1` iff `sight_array[i] ==
/// observed_move`; if no entry matches, every entry is set to `1` (an
/// uninformative "no evidence" likelihood).
pub fn lambda_evidence<M: PartialEq>(observed_move: &M, sight_array: &[M]) -> Vec<f64> {
    let mut lambda: Vec<f64> = sight_array
        .iter()
        .map(|s| if s == observed_move { 1.0 } else { 0.0 })
        .collect();
    if lambda.iter().all(|&x| x == 0.0) {
        lambda.iter_mut().for_each(|x| *x = 1.0);
    }
    lambda
}

/// Steps 2-4: message-passing update and renormalization, returning the new
/// prior. `prior` and `sight_array` must agree on `K`.
pub fn posterior<M: PartialEq>(
    prior: &[f64],
    observed_move: &M,
    sight_array: &[M],
    link: &LinkMatrix,
) -> Vec<f64> {
    let k = prior.len();
    assert_eq!(k, link.k(), "prior and link matrix must agree on K");
    assert_eq!(k, sight_array.len(), "sight array must have length K");

    let lambda = lambda_evidence(observed_move, sight_array);

    // mu[j] = sum_i lambda[i] * L[i][j]
    let mu: Vec<f64> = (0..k)
        .map(|j| (0..k).map(|i| lambda[i] * link.get(i, j)).sum())
        .collect();

    let unnormalized: Vec<f64> = (0..k).map(|j| prior[j] * mu[j]).collect();
    let total: f64 = unnormalized.iter().sum();

    if total <= 0.0 {
        // Degenerate link matrix or zeroed prior: fall back to "no update"
        // rather than dividing by zero.
        debug!("posterior normalization sum was non-positive, leaving prior unchanged");
        return prior.to_vec();
    }
    unnormalized.iter().map(|&p| p / total).collect()
}

/// `true` iff some sight level's belief is at least `tau`; `k*` (0-indexed)
/// is the smallest such level. Pure function of `belief` alone.
pub fn is_inferrable(belief: &Belief, tau: f64) -> (bool, usize) {
    for (k, &p) in belief.as_slice().iter().enumerate() {
        if p >= tau {
            return (true, k);
        }
    }
    (false, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_k5_rows_sum_to_one() {
        let link = LinkMatrix::default_k5();
        for i in 0..5 {
            let sum: f64 = (0..5).map(|j| link.get(i, j)).sum();
            assert!((sum - 1.0).abs() < 1e-9, "row {i} sums to {sum}");
        }
    }

    #[test]
    fn lambda_evidence_is_one_hot_on_a_match() {
        let sight_array = [0u8, 1, 2, 3, 4];
        let lambda = lambda_evidence(&2u8, &sight_array);
        assert_eq!(lambda, vec![0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn lambda_evidence_falls_back_to_uninformative_on_no_match() {
        let sight_array = [0u8, 1, 2, 3, 4];
        let lambda = lambda_evidence(&6u8, &sight_array);
        assert_eq!(lambda, vec![1.0, 1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn update_unanimous_agreement_matches_normalized_column_sum() {
        let link = LinkMatrix::default_k5();
        let prior = vec![0.2; 5];
        let sight_array = [3u8, 3, 3, 3, 3];
        let next = posterior(&prior, &3u8, &sight_array, &link);

        let sum: f64 = next.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        // With a unanimous sight_array, every entry matches the observed move,
        // so lambda is all-ones and mu is the column sums of L; prior is
        // uniform, so the posterior is just those column sums renormalized.
        let expected: Vec<f64> = (0..5)
            .map(|j| (0..5).map(|i| link.get(i, j)).sum())
            .collect();
        let expected_sum: f64 = expected.iter().sum();
        for (a, b) in next.iter().zip(expected.iter()) {
            assert!((a - b / expected_sum).abs() < 1e-9);
        }
    }

    #[test]
    fn uniform_prior_with_no_evidence_stays_uniform_under_a_doubly_stochastic_link() {
        // A link matrix with every entry 1/K is doubly stochastic, so an
        // all-ones lambda (no evidence) leaves a uniform prior unchanged.
        let k = 5;
        let link = LinkMatrix::new(vec![vec![1.0 / k as f64; k]; k]);
        let prior = vec![1.0 / k as f64; k];
        let sight_array = [0u8, 1, 2, 3, 4];
        let next = posterior(&prior, &9u8, &sight_array, &link);
        for &p in &next {
            assert!((p - 1.0 / k as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn update_no_match_uses_row_sums_of_link_matrix() {
        let link = LinkMatrix::default_k5();
        let prior = vec![0.2; 5];
        let sight_array = [0u8, 1, 2, 3, 4];
        let next = posterior(&prior, &6u8, &sight_array, &link);

        let row_sums: Vec<f64> = (0..5)
            .map(|j| (0..5).map(|i| link.get(i, j)).sum::<f64>())
            .collect();
        let total: f64 = row_sums.iter().sum();
        for (a, b) in next.iter().zip(row_sums.iter()) {
            assert!((a - b / total).abs() < 1e-9);
        }
    }

    #[test]
    fn one_hot_prior_and_lambda_is_a_fixed_point() {
        let link = LinkMatrix::default_k5();
        let prior = vec![0.0, 0.0, 1.0, 0.0, 0.0];
        let sight_array = [9u8, 9, 2, 9, 9]; // only index 2 matches observed move 2
        let next = posterior(&prior, &2u8, &sight_array, &link);
        for (a, b) in next.iter().zip(prior.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn is_inferrable_gates_on_tau() {
        let strong = Belief::from_vec(vec![0.98, 0.02, 0.0, 0.0, 0.0]);
        assert_eq!(is_inferrable(&strong, DEFAULT_TAU), (true, 0));

        let weak = Belief::from_vec(vec![0.97, 0.03, 0.0, 0.0, 0.0]);
        assert_eq!(is_inferrable(&weak, DEFAULT_TAU), (false, 0));
    }

    #[test]
    fn belief_update_renormalizes_in_place() {
        let link = LinkMatrix::default_k5();
        let mut belief = Belief::uniform(5);
        let sight_array = [0u8, 1, 2, 3, 4];
        belief.update(&2u8, &sight_array, &link);
        let sum: f64 = belief.as_slice().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn belief_round_trips_through_json() {
        let belief = Belief::uniform(5);
        let json = serde_json::to_string(&belief).unwrap();
        let back: Belief = serde_json::from_str(&json).unwrap();
        assert_eq!(belief.as_slice(), back.as_slice());
    }
}
