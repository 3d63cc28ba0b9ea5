//! Theorem Weight Model

use crate::{ConnectionStrength, EngineConfig, Theorem, TheoremId, TheoremWeights, TriangleWeights};
use std::collections::BTreeMap;

/// Derives per-theorem weights from the triangle belief vector
#[derive(Debug, Clone, Copy)]
pub struct TheoremWeightModel<'a> {
    config: &'a EngineConfig,
}

impl<'a> TheoremWeightModel<'a> {
    /// Create a model bound to an engine configuration
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Flat weight for every theorem, used before there is enough signal
    pub fn bootstrap(&self, theorems: &[Theorem]) -> TheoremWeights {
        TheoremWeights::flat(
            theorems.iter().filter(|t| t.active).map(|t| t.id),
            self.config.bootstrap_theorem_weight,
        )
    }

    /// Recompute theorem weights after `asked_count` questions
    ///
    /// A theorem's weight is the product of the weights of every category it
    /// is strongly connected to. Theorems without strong connections get 0.
    /// Exactly one asked question yields the flat bootstrap weights instead.
    pub fn derive(
        &self,
        asked_count: usize,
        triangle_weights: &TriangleWeights,
        theorems: &[Theorem],
        connections: &[ConnectionStrength],
    ) -> TheoremWeights {
        if asked_count == 1 {
            return self.bootstrap(theorems);
        }

        let threshold = self.config.strong_connection_threshold;
        let mut strong: BTreeMap<TheoremId, Vec<&ConnectionStrength>> = BTreeMap::new();
        for link in connections.iter().filter(|c| c.is_strong(threshold)) {
            strong.entry(link.theorem_id).or_default().push(link);
        }

        theorems
            .iter()
            .filter(|t| t.active)
            .map(|theorem| {
                let weight: f64 = match strong.get(&theorem.id) {
                    Some(links) => links
                        .iter()
                        .map(|link| triangle_weights.get(link.triangle))
                        .product(),
                    None => 0.0,
                };
                (theorem.id, weight)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TriangleCategory::*;

    fn theorems() -> Vec<Theorem> {
        vec![
            Theorem::new(TheoremId(1), "Pythagoras", Some(Right)),
            Theorem::new(TheoremId(2), "Base angles of an isosceles triangle", Some(Isosceles)),
            Theorem::new(TheoremId(3), "Angle sum is 180 degrees", Some(General)),
            Theorem::new(TheoremId(4), "Isosceles right triangle has 45 degree angles", None),
        ]
    }

    fn connections() -> Vec<ConnectionStrength> {
        vec![
            ConnectionStrength::new(TheoremId(1), Right, 1.0),
            ConnectionStrength::new(TheoremId(2), Isosceles, 0.95),
            ConnectionStrength::new(TheoremId(2), Equilateral, 0.6),
            ConnectionStrength::new(TheoremId(3), General, 0.5),
            ConnectionStrength::new(TheoremId(4), Isosceles, 0.9),
            ConnectionStrength::new(TheoremId(4), Right, 0.9),
        ]
    }

    #[test]
    fn test_single_strong_connection() {
        let config = EngineConfig::default();
        let model = TheoremWeightModel::new(&config);
        let weights = TriangleWeights::from_array([0.1, 0.2, 0.3, 0.4]);

        let derived = model.derive(2, &weights, &theorems(), &connections());

        assert_eq!(derived.get(TheoremId(1)), 0.4);
        assert_eq!(derived.get(TheoremId(2)), 0.3);
    }

    #[test]
    fn test_weak_only_theorem_gets_zero() {
        let config = EngineConfig::default();
        let model = TheoremWeightModel::new(&config);

        let derived = model.derive(3, &TriangleWeights::uniform(), &theorems(), &connections());
        assert_eq!(derived.get(TheoremId(3)), 0.0);
        assert_eq!(derived.len(), 4);
    }

    #[test]
    fn test_multiple_strong_connections_multiply() {
        let config = EngineConfig::default();
        let model = TheoremWeightModel::new(&config);
        let weights = TriangleWeights::from_array([0.1, 0.2, 0.3, 0.4]);

        let derived = model.derive(2, &weights, &theorems(), &connections());
        assert!((derived.get(TheoremId(4)) - 0.12).abs() < 1e-12);
    }

    #[test]
    fn test_first_answer_uses_flat_weights() {
        let config = EngineConfig::default();
        let model = TheoremWeightModel::new(&config);
        let weights = TriangleWeights::from_array([0.0, 0.0, 0.0, 1.0]);

        let derived = model.derive(1, &weights, &theorems(), &connections());
        for (_, w) in derived.iter() {
            assert_eq!(w, 0.01);
        }
        assert_eq!(derived.len(), 4);
    }

    #[test]
    fn test_inactive_theorems_skipped() {
        let config = EngineConfig::default();
        let model = TheoremWeightModel::new(&config);
        let mut list = theorems();
        list[0].active = false;

        let derived = model.derive(2, &TriangleWeights::uniform(), &list, &connections());
        assert_eq!(derived.len(), 3);
        assert_eq!(model.bootstrap(&list).len(), 3);
    }
}
