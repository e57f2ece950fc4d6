// ─────────────────────────────────────────────────────────────────────
// Normscore — Exact Shapley Values
// ─────────────────────────────────────────────────────────────────────
//! φ_i = Σ_{S ⊆ N∖{i}} |S|!(n−|S|−1)!/n! · (v(S ∪ {i}) − v(S))
//!
//! Coalitions are enumerated as bitmasks and every v(S) is evaluated
//! once, so the cost is 2^n characteristic-function calls. Sets larger
//! than the configured cap are refused; those need a sampling estimator.

use std::collections::{BTreeMap, HashSet};

use normscore_types::{NormscoreError, NormscoreResult};

/// Shapley values for an infallible characteristic function.
pub fn shapley_values<F>(
    players: &[&str],
    max_players: usize,
    value: F,
) -> NormscoreResult<BTreeMap<String, f64>>
where
    F: Fn(&[&str]) -> f64,
{
    try_shapley_values(players, max_players, |coalition| Ok(value(coalition)))
}

/// Shapley values for a characteristic function that may fail.
///
/// Coalitions are passed with members in the order of `players`.
pub fn try_shapley_values<F>(
    players: &[&str],
    max_players: usize,
    value: F,
) -> NormscoreResult<BTreeMap<String, f64>>
where
    F: Fn(&[&str]) -> NormscoreResult<f64>,
{
    let n = players.len();
    if n > max_players {
        return Err(NormscoreError::Config(format!(
            "exact Shapley limited to {max_players} players, got {n}"
        )));
    }
    let mut seen = HashSet::with_capacity(n);
    if let Some(dup) = players.iter().find(|p| !seen.insert(**p)) {
        return Err(NormscoreError::Config(format!("duplicate Shapley player '{dup}'")));
    }
    if n == 0 {
        return Ok(BTreeMap::new());
    }

    let coalitions = 1usize << n;
    let mut worth = Vec::with_capacity(coalitions);
    let mut members: Vec<&str> = Vec::with_capacity(n);
    for mask in 0..coalitions {
        members.clear();
        members.extend((0..n).filter(|i| mask & (1 << i) != 0).map(|i| players[i]));
        worth.push(value(&members)?);
    }

    let mut factorial = vec![1.0f64; n + 1];
    for k in 1..=n {
        factorial[k] = factorial[k - 1] * k as f64;
    }

    let mut phi = BTreeMap::new();
    for (i, player) in players.iter().enumerate() {
        let bit = 1usize << i;
        let mut total = 0.0;
        for mask in (0..coalitions).filter(|m| m & bit == 0) {
            let size = mask.count_ones() as usize;
            let weight = factorial[size] * factorial[n - size - 1] / factorial[n];
            total += weight * (worth[mask | bit] - worth[mask]);
        }
        phi.insert(player.to_string(), total);
    }
    Ok(phi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_additive_game() {
        let phi = shapley_values(&["a", "b", "c"], 10, |s| s.len() as f64).unwrap();
        for p in ["a", "b", "c"] {
            assert!((phi[p] - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_two_player_additive_game() {
        let phi = shapley_values(&["a", "b"], 10, |s| s.len() as f64).unwrap();
        assert_eq!(phi.len(), 2);
        assert!((phi["a"] - 1.0).abs() < 1e-9);
        assert!((phi["b"] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_symmetric_players_share_equally() {
        // Only the grand coalition is worth anything.
        let phi = shapley_values(&["x", "y"], 10, |s| if s.len() == 2 { 1.0 } else { 0.0 }).unwrap();
        assert!((phi["x"] - 0.5).abs() < 1e-9);
        assert!((phi["y"] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_efficiency() {
        let weights = [("a", 0.3), ("b", 1.7), ("c", -0.4), ("d", 2.0)];
        let players: Vec<&str> = weights.iter().map(|(p, _)| *p).collect();
        let v = |s: &[&str]| -> f64 {
            let base: f64 = s
                .iter()
                .map(|p| weights.iter().find(|(q, _)| q == p).map_or(0.0, |(_, w)| *w))
                .sum();
            // Pairwise synergy.
            base + 0.1 * (s.len() * s.len()) as f64 + 5.0
        };
        let phi = shapley_values(&players, 10, v).unwrap();
        let total: f64 = phi.values().sum();
        assert!((total - (v(&players) - v(&[]))).abs() < 1e-9);
    }

    #[test]
    fn test_dummy_player_gets_zero() {
        let phi = shapley_values(&["a", "dummy"], 10, |s| {
            if s.contains(&"a") {
                2.0
            } else {
                0.0
            }
        })
        .unwrap();
        assert!((phi["a"] - 2.0).abs() < 1e-9);
        assert!(phi["dummy"].abs() < 1e-9);
    }

    #[test]
    fn test_player_cap() {
        let names: Vec<String> = (0..11).map(|i| format!("p{i}")).collect();
        let players: Vec<&str> = names.iter().map(String::as_str).collect();
        assert!(matches!(
            shapley_values(&players, 10, |_| 0.0),
            Err(NormscoreError::Config(_))
        ));
    }

    #[test]
    fn test_duplicate_players_rejected() {
        assert!(shapley_values(&["a", "a"], 10, |_| 0.0).is_err());
    }

    #[test]
    fn test_empty_player_set() {
        assert!(shapley_values(&[], 10, |_| 1.0).unwrap().is_empty());
    }

    #[test]
    fn test_value_error_propagates() {
        let result = try_shapley_values(&["a"], 10, |s| {
            if s.is_empty() {
                Ok(0.0)
            } else {
                Err(NormscoreError::Numerical("boom".to_string()))
            }
        });
        assert!(matches!(result, Err(NormscoreError::Numerical(_))));
    }
}
