//! Triangle Weight Model
//!
//! Applies the multipliers of one answer to the belief vector, eliminating
//! categories that fall below the floor and handing their mass to the
//! survivors.

use crate::{EngineConfig, EngineError, Result, TriangleCategory, TriangleMultipliers, TriangleWeights};
use tracing::debug;

/// Multiplier-driven update of the triangle belief vector
#[derive(Debug, Clone, Copy)]
pub struct TriangleWeightModel<'a> {
    config: &'a EngineConfig,
}

impl<'a> TriangleWeightModel<'a> {
    /// Create a model bound to an engine configuration
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Multiplier actually applied to `category` after damping
    fn damped(&self, category: TriangleCategory, multiplier: f64, current: &TriangleWeights) -> f64 {
        match self.config.damping.get(&category) {
            Some(policy) => {
                let floor = self.config.elimination_floor;
                let contested = current
                    .iter()
                    .any(|(other, w)| other != category && w >= floor);
                policy.apply(multiplier, contested)
            }
            None => multiplier,
        }
    }

    /// Apply one answer's multipliers and return the new vector
    ///
    /// The result sums to 1 and every weight is either 0 or at least the
    /// elimination floor. Categories already below the floor stay at 0.
    ///
    /// # Errors
    /// Returns [`EngineError::DegenerateWeightState`] when no category
    /// survives the update.
    pub fn update(
        &self,
        current: &TriangleWeights,
        multipliers: &TriangleMultipliers,
    ) -> Result<TriangleWeights> {
        let floor = self.config.elimination_floor;
        let mut next = TriangleWeights::zeroed();
        let mut eliminated_mass = 0.0;

        for (category, weight) in current.iter() {
            if weight < floor {
                continue;
            }

            let multiplier = self.damped(category, multipliers.get(category), current);
            let raw = weight * multiplier;

            if raw < floor {
                debug!(%category, weight, multiplier, "Category eliminated");
                eliminated_mass += weight;
            } else {
                next.set(category, raw);
            }
        }

        let survivors_total = next.total();
        if survivors_total <= 0.0 {
            return Err(EngineError::DegenerateWeightState);
        }

        if eliminated_mass > 0.0 {
            for category in TriangleCategory::ALL {
                let weight = next.get(category);
                next.set(category, weight + eliminated_mass * weight / survivors_total);
            }
        }

        let mut next = next.normalized().ok_or(EngineError::DegenerateWeightState)?;

        // Renormalizing can push a survivor under the floor; drop it as well.
        loop {
            let stragglers: Vec<_> = next
                .iter()
                .filter(|(_, w)| *w > 0.0 && *w < floor)
                .map(|(c, _)| c)
                .collect();
            if stragglers.is_empty() {
                break;
            }
            for category in stragglers {
                debug!(%category, "Category eliminated after renormalization");
                next.set(category, 0.0);
            }
            next = next.normalized().ok_or(EngineError::DegenerateWeightState)?;
        }

        debug!(before = ?current.as_array(), after = ?next.as_array(), "Triangle weights updated");
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TriangleCategory::*;

    fn multipliers(values: [f64; 4]) -> TriangleMultipliers {
        TriangleMultipliers::from_pairs(TriangleCategory::ALL.into_iter().zip(values))
    }

    #[test]
    fn test_supporting_answer_shifts_mass() {
        let config = EngineConfig::default();
        let model = TriangleWeightModel::new(&config);

        let next = model
            .update(&TriangleWeights::uniform(), &multipliers([1.0, 2.0, 0.5, 0.5]))
            .unwrap();

        assert!(next.get(Equilateral) > 0.25);
        assert!(next.get(Isosceles) < 0.25);
        assert!(next.get(Right) < 0.25);
        assert!((next.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_eliminated_mass_is_redistributed() {
        let config = EngineConfig::default();
        let model = TriangleWeightModel::new(&config);
        let current = TriangleWeights::from_array([0.3, 0.34, 0.3, 0.06]);

        let next = model.update(&current, &multipliers([1.0, 1.0, 1.0, 0.1])).unwrap();

        assert_eq!(next.get(Right), 0.0);
        assert!((next.get(General) - 0.3 / 0.94).abs() < 1e-12);
        assert!((next.get(Equilateral) - 0.34 / 0.94).abs() < 1e-12);
        assert!((next.get(Isosceles) - 0.3 / 0.94).abs() < 1e-12);
        assert!((next.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_eliminated_category_is_not_revived() {
        let config = EngineConfig::default();
        let model = TriangleWeightModel::new(&config);
        let current = TriangleWeights::from_array([0.4, 0.6, 0.0, 0.0]);

        let next = model.update(&current, &multipliers([1.0, 1.0, 50.0, 50.0])).unwrap();

        assert_eq!(next.get(Isosceles), 0.0);
        assert_eq!(next.get(Right), 0.0);
    }

    #[test]
    fn test_general_growth_damped_while_contested() {
        let config = EngineConfig::default();
        let model = TriangleWeightModel::new(&config);

        let next = model
            .update(&TriangleWeights::uniform(), &multipliers([2.0, 1.0, 1.0, 1.0]))
            .unwrap();

        // 0.25 * 1.7 against three categories at 0.25
        let expected = 0.425 / 1.175;
        assert!((next.get(General) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_general_undamped_when_alone() {
        let config = EngineConfig::default();
        let model = TriangleWeightModel::new(&config);
        let current = TriangleWeights::from_array([1.0, 0.0, 0.0, 0.0]);

        let next = model.update(&current, &multipliers([3.0, 1.0, 1.0, 1.0])).unwrap();
        assert_eq!(next.get(General), 1.0);
    }

    #[test]
    fn test_damping_table_applies_to_any_category() {
        let mut config = EngineConfig::default();
        config.damping.clear();
        config
            .damping
            .insert(Right, crate::DampingPolicy::Growth { factor: 0.5 });
        let model = TriangleWeightModel::new(&config);

        let next = model
            .update(&TriangleWeights::uniform(), &multipliers([2.0, 1.0, 1.0, 3.0]))
            .unwrap();

        // general undamped at 0.5, right damped to 0.5
        assert!((next.get(General) - next.get(Right)).abs() < 1e-12);
    }

    #[test]
    fn test_growth_pushes_rivals_under_floor() {
        let config = EngineConfig::default();
        let model = TriangleWeightModel::new(&config);

        let next = model
            .update(&TriangleWeights::uniform(), &multipliers([1.0, 100.0, 1.0, 1.0]))
            .unwrap();

        assert_eq!(next.get(Equilateral), 1.0);
        assert_eq!(next.get(General), 0.0);
        assert_eq!(next.get(Isosceles), 0.0);
    }

    #[test]
    fn test_total_collapse_is_rejected() {
        let config = EngineConfig::default();
        let model = TriangleWeightModel::new(&config);

        let result = model.update(&TriangleWeights::uniform(), &multipliers([0.0; 4]));
        assert_eq!(result, Err(EngineError::DegenerateWeightState));
    }
}
