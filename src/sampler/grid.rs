use std::collections::BTreeMap;

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::SamplerError;
use crate::sampler::seed::SampleSeed;

/// One concrete value per declared dimension. BTreeMap keeps iteration and
/// serialization order deterministic.
pub type Combination = BTreeMap<String, f64>;

/// How many candidates a `{min, max}` bounds-only dimension synthesizes.
pub const RANGE_SYNTH_POINTS: usize = 10;

/// Candidate pool for one dimension: either an explicit ordered list, or
/// bounds from which a linearly spaced list is synthesized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DimensionValues {
    List(Vec<f64>),
    Range { min: f64, max: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDimension {
    pub name: String,
    pub values: DimensionValues,
}

impl ParameterDimension {
    pub fn with_values(name: &str, values: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            values: DimensionValues::List(values),
        }
    }

    pub fn with_bounds(name: &str, min: f64, max: f64) -> Self {
        Self {
            name: name.to_string(),
            values: DimensionValues::Range { min, max },
        }
    }

    fn candidates(&self) -> Result<Vec<f64>, SamplerError> {
        match &self.values {
            DimensionValues::List(values) if values.is_empty() => {
                Err(SamplerError::EmptyDimension(self.name.clone()))
            }
            DimensionValues::List(values) => {
                // Selection is index-based over the sorted range, so the
                // declared extremes survive regardless of input order.
                let mut sorted = values.clone();
                sorted.sort_by(f64::total_cmp);
                Ok(sorted)
            }
            DimensionValues::Range { min, max } if min > max => {
                Err(SamplerError::InvertedBounds {
                    name: self.name.clone(),
                    min: *min,
                    max: *max,
                })
            }
            DimensionValues::Range { min, max } => Ok(linear_spacing(*min, *max)),
        }
    }
}

fn linear_spacing(min: f64, max: f64) -> Vec<f64> {
    if min == max {
        return vec![min];
    }
    let n = RANGE_SYNTH_POINTS;
    (0..n)
        .map(|i| min + (max - min) * i as f64 / (n - 1) as f64)
        .collect()
}

/// Reduce the cartesian product of `dimensions` to at most `target_total`
/// combinations, keeping each dimension's declared range representatively
/// covered (extremes always included) rather than truncating to the first
/// values. When the full product already fits the budget it is returned
/// unchanged.
pub fn sample(
    dimensions: &[ParameterDimension],
    target_total: usize,
) -> Result<Vec<Combination>, SamplerError> {
    sample_inner(dimensions, target_total, None)
}

/// Seeded variant: interior selection positions are jittered per seed so
/// entities sharing the same pools get different combination sets. The
/// extremes stay pinned and the budget ceiling is unaffected.
pub fn sample_seeded(
    dimensions: &[ParameterDimension],
    target_total: usize,
    seed: SampleSeed,
) -> Result<Vec<Combination>, SamplerError> {
    sample_inner(dimensions, target_total, Some(seed))
}

fn sample_inner(
    dimensions: &[ParameterDimension],
    target_total: usize,
    seed: Option<SampleSeed>,
) -> Result<Vec<Combination>, SamplerError> {
    if target_total == 0 {
        return Err(SamplerError::ZeroBudget);
    }
    if dimensions.is_empty() {
        return Err(SamplerError::NoDimensions);
    }

    let candidate_sets: Vec<(String, Vec<f64>)> = dimensions
        .iter()
        .map(|d| Ok((d.name.clone(), d.candidates()?)))
        .collect::<Result<_, SamplerError>>()?;

    let full_size = candidate_sets
        .iter()
        .fold(1usize, |acc, (_, v)| acc.saturating_mul(v.len()));
    if full_size <= target_total {
        return Ok(cartesian_product(&candidate_sets));
    }

    let per_dim = per_dimension_size(target_total, candidate_sets.len());
    let mut rng = seed.map(|s| s.rng());

    let reduced: Vec<(String, Vec<f64>)> = candidate_sets
        .iter()
        .map(|(name, values)| {
            let picked = if values.len() <= per_dim {
                values.clone()
            } else {
                evenly_spaced_indices(values.len(), per_dim, rng.as_mut())
                    .into_iter()
                    .map(|i| values[i])
                    .collect()
            };
            (name.clone(), picked)
        })
        .collect();

    let mut combos = cartesian_product(&reduced);

    // Ceil rounding in the per-dimension size can overshoot the budget;
    // trim with the same even spacing over the flattened combination list.
    if combos.len() > target_total {
        combos = evenly_spaced_indices(combos.len(), target_total, None)
            .into_iter()
            .map(|i| combos[i].clone())
            .collect();
    }

    Ok(combos)
}

/// `ceil(target^(1/k))`, with a guard against `powf` landing a hair above
/// an exact integer root.
fn per_dimension_size(target: usize, num_dimensions: usize) -> usize {
    let root = (target as f64).powf(1.0 / num_dimensions as f64);
    let mut size = root.ceil() as usize;
    if size > 1 && pow_saturating(size - 1, num_dimensions) >= target {
        size -= 1;
    }
    size.max(1)
}

fn pow_saturating(base: usize, exp: usize) -> usize {
    (0..exp).fold(1usize, |acc, _| acc.saturating_mul(base))
}

/// `count` index positions linearly spaced over `0..len`, first and last
/// always included. With an rng, interior positions are jittered strictly
/// inside their local gap, so the result stays sorted and distinct and the
/// extremes stay pinned.
fn evenly_spaced_indices(len: usize, count: usize, mut rng: Option<&mut StdRng>) -> Vec<usize> {
    if count >= len {
        return (0..len).collect();
    }
    if count == 1 {
        return vec![0];
    }

    let step = (len - 1) as f64 / (count - 1) as f64;
    let mut indices = Vec::with_capacity(count);
    for j in 0..count {
        let base = j as f64 * step;
        let pos = if j == 0 || j == count - 1 {
            base
        } else if let Some(rng) = rng.as_deref_mut() {
            // len > count implies step > 1, so half > 0 and neighbouring
            // jitter windows never meet
            let half = (step - 1.0) / 2.0;
            base + rng.gen_range(-half..=half)
        } else {
            base
        };
        indices.push(pos.round() as usize);
    }
    indices
}

fn cartesian_product(sets: &[(String, Vec<f64>)]) -> Vec<Combination> {
    let mut combos: Vec<Combination> = vec![Combination::new()];

    for (name, values) in sets {
        let mut next = Vec::with_capacity(combos.len() * values.len());
        for combo in &combos {
            for &value in values {
                let mut extended = combo.clone();
                extended.insert(name.clone(), value);
                next.push(extended);
            }
        }
        combos = next;
    }

    combos
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dim(name: &str, values: Vec<f64>) -> ParameterDimension {
        ParameterDimension::with_values(name, values)
    }

    #[test]
    fn test_full_product_within_budget_is_returned_unchanged() {
        // 3 * 2 = 6 combinations, budget 10 -> no sampling
        let dims = vec![
            dim("period", vec![5.0, 10.0, 15.0]),
            dim("tp", vec![20.0, 40.0]),
        ];

        let combos = sample(&dims, 10).unwrap();

        assert_eq!(combos.len(), 6);
        for period in [5.0, 10.0, 15.0] {
            for tp in [20.0, 40.0] {
                assert!(
                    combos
                        .iter()
                        .any(|c| c["period"] == period && c["tp"] == tp),
                    "missing combination period={period} tp={tp}"
                );
            }
        }
    }

    #[test]
    fn test_budget_ceiling_is_never_exceeded() {
        let dims = vec![
            dim("a", (0..40).map(|i| i as f64).collect()),
            dim("b", (0..10).map(|i| i as f64).collect()),
            dim("c", (0..8).map(|i| i as f64).collect()),
        ];

        for budget in [1, 2, 7, 50, 500, 3199] {
            let combos = sample(&dims, budget).unwrap();
            assert!(
                combos.len() <= budget,
                "budget {budget} exceeded: {}",
                combos.len()
            );
            assert!(!combos.is_empty());
        }
    }

    #[test]
    fn test_concrete_sizing_scenario_three_dimensions_budget_500() {
        // 40 * 10 * 8 = 3200 > 500 -> per_dim = ceil(500^(1/3)) = 8,
        // reduced product 8 * 8 * 8 = 512 > 500 -> trimmed to 500.
        let periods: Vec<f64> = (1..=40).map(|i| (i * 5) as f64).collect();
        let dims = vec![
            dim("period", periods),
            dim("tp", (1..=10).map(|i| (i * 10) as f64).collect()),
            dim("sl", (1..=8).map(|i| (i * 5) as f64).collect()),
        ];

        let combos = sample(&dims, 500).unwrap();

        assert!(combos.len() <= 500);
        assert!(!combos.is_empty());

        // Each dimension was reduced to at most 8 distinct values.
        for key in ["period", "tp", "sl"] {
            let mut values: Vec<f64> = combos.iter().map(|c| c[key]).collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap());
            values.dedup();
            assert!(values.len() <= 8, "{key} kept {} values", values.len());
        }
    }

    #[test]
    fn test_extremes_of_reduced_dimensions_are_preserved() {
        let periods: Vec<f64> = (1..=40).map(|i| (i * 5) as f64).collect();
        let dims = vec![
            dim("period", periods),
            dim("tp", (1..=10).map(|i| (i * 10) as f64).collect()),
            dim("sl", (1..=8).map(|i| (i * 5) as f64).collect()),
        ];

        let combos = sample(&dims, 500).unwrap();

        // period candidates span 5..=200; both ends must survive sampling.
        assert!(combos.iter().any(|c| c["period"] == 5.0));
        assert!(combos.iter().any(|c| c["period"] == 200.0));
        assert!(combos.iter().any(|c| c["tp"] == 10.0));
        assert!(combos.iter().any(|c| c["tp"] == 100.0));
    }

    #[test]
    fn test_single_dimension_reduction_is_evenly_spaced() {
        // 10 candidates, budget 4 -> indices 0, 3, 6, 9
        let dims = vec![dim("period", (0..10).map(|i| i as f64).collect())];

        let combos = sample(&dims, 4).unwrap();

        let values: Vec<f64> = combos.iter().map(|c| c["period"]).collect();
        assert_eq!(values, vec![0.0, 3.0, 6.0, 9.0]);
    }

    #[test]
    fn test_unsorted_candidates_still_preserve_extremes() {
        let dims = vec![dim(
            "a",
            vec![30.0, 5.0, 200.0, 100.0, 60.0, 10.0, 150.0, 80.0, 20.0, 40.0],
        )];

        // Budget 3 over the sorted range -> indices 0, 5, 9 -> 5, 60, 200
        let combos = sample(&dims, 3).unwrap();

        let values: Vec<f64> = combos.iter().map(|c| c["a"]).collect();
        assert_eq!(values, vec![5.0, 60.0, 200.0]);
    }

    #[test]
    fn test_sample_is_deterministic_for_identical_inputs() {
        let dims = vec![
            dim("a", (0..40).map(|i| i as f64).collect()),
            dim("b", (0..10).map(|i| i as f64).collect()),
        ];

        assert_eq!(sample(&dims, 50).unwrap(), sample(&dims, 50).unwrap());
    }

    #[test]
    fn test_seeded_sample_is_reproducible_for_same_seed() {
        let dims = vec![
            dim("a", (0..40).map(|i| i as f64).collect()),
            dim("b", (0..30).map(|i| i as f64).collect()),
        ];
        let seed = SampleSeed::for_entity("rsi_14");

        assert_eq!(
            sample_seeded(&dims, 50, seed).unwrap(),
            sample_seeded(&dims, 50, seed).unwrap()
        );
    }

    #[test]
    fn test_seeded_samples_differ_across_entities_but_keep_extremes() {
        let dims = vec![
            dim("a", (0..40).map(|i| i as f64).collect()),
            dim("b", (0..30).map(|i| i as f64).collect()),
        ];

        let first = sample_seeded(&dims, 50, SampleSeed::for_entity("rsi_14")).unwrap();
        let second = sample_seeded(&dims, 50, SampleSeed::for_entity("macd_12_26")).unwrap();

        assert_ne!(first, second);
        for combos in [&first, &second] {
            assert!(combos.len() <= 50);
            assert!(combos.iter().any(|c| c["a"] == 0.0));
            assert!(combos.iter().any(|c| c["a"] == 39.0));
        }
    }

    #[test]
    fn test_bounds_only_dimension_synthesizes_a_linear_list() {
        let dims = vec![ParameterDimension::with_bounds("tp", 10.0, 100.0)];

        let combos = sample(&dims, 100).unwrap();

        // RANGE_SYNTH_POINTS values from 10 to 100 inclusive
        assert_eq!(combos.len(), RANGE_SYNTH_POINTS);
        assert_eq!(combos[0]["tp"], 10.0);
        assert_eq!(combos[RANGE_SYNTH_POINTS - 1]["tp"], 100.0);
        assert!((combos[1]["tp"] - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_bounds_collapse_to_a_single_candidate() {
        let dims = vec![ParameterDimension::with_bounds("tp", 50.0, 50.0)];

        let combos = sample(&dims, 100).unwrap();

        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0]["tp"], 50.0);
    }

    #[test]
    fn test_zero_budget_is_rejected() {
        let dims = vec![dim("a", vec![1.0])];
        assert_eq!(sample(&dims, 0).unwrap_err(), SamplerError::ZeroBudget);
    }

    #[test]
    fn test_no_dimensions_is_rejected() {
        assert_eq!(sample(&[], 10).unwrap_err(), SamplerError::NoDimensions);
    }

    #[test]
    fn test_empty_dimension_is_rejected() {
        let dims = vec![dim("a", vec![1.0]), dim("b", vec![])];
        assert_eq!(
            sample(&dims, 10).unwrap_err(),
            SamplerError::EmptyDimension("b".to_string())
        );
    }

    #[test]
    fn test_inverted_bounds_are_rejected() {
        let dims = vec![ParameterDimension::with_bounds("tp", 100.0, 10.0)];
        assert!(matches!(
            sample(&dims, 10).unwrap_err(),
            SamplerError::InvertedBounds { .. }
        ));
    }

    #[test]
    fn test_budget_of_one_returns_a_single_combination() {
        let dims = vec![
            dim("a", (0..40).map(|i| i as f64).collect()),
            dim("b", (0..10).map(|i| i as f64).collect()),
        ];

        let combos = sample(&dims, 1).unwrap();

        assert_eq!(combos.len(), 1);
    }
}
