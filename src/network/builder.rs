//! BFS construction of a rooted conversion network.
//!
//! Every unit reachable from the root gets the factor converting one of it
//! into the root. Re-visits must agree with the recorded factor, otherwise the
//! rule set contains a cycle whose product is not 1 and the build fails.
use crate::error::NetworkBuildError;
use crate::number::Number;
use crate::store::{ConversionGraph, UnitIndex, WeightedMeasurement};
use indexmap::IndexMap;
use std::collections::VecDeque;
use tracing::debug;

/// Immutable once built; covers exactly the component of `root`.
#[derive(Debug, Clone)]
pub struct ConversionNetwork<T> {
    root: String,
    measurements: IndexMap<String, WeightedMeasurement<T>>,
}

impl<T: Number> ConversionNetwork<T> {
    pub fn build(graph: &ConversionGraph<T>, root: &str) -> Result<Self, NetworkBuildError> {
        let root_id = graph
            .unit_index(root)
            .ok_or_else(|| NetworkBuildError::UnknownRoot(root.to_string()))?;

        let mut coefficients: Vec<Option<T>> = vec![None; graph.unit_count()];
        let mut order = Vec::new();
        let mut queue = VecDeque::new();

        coefficients[root_id.index()] = Some(graph.one().clone());
        order.push(root_id);
        queue.push_back(root_id);

        while let Some(current) = queue.pop_front() {
            let Some(base) = coefficients[current.index()].clone() else { continue };

            for edge in graph.edges(current) {
                let candidate = base.multiply(&edge.multiplier);
                let slot = &mut coefficients[edge.target.index()];
                match slot {
                    None => {
                        *slot = Some(candidate);
                        order.push(edge.target);
                        queue.push_back(edge.target);
                    }
                    Some(existing) => {
                        if !Self::agrees(graph, &candidate, existing, root)? {
                            return Err(NetworkBuildError::InconsistentCycle {
                                root: root.to_string(),
                                from: graph.name(current).to_string(),
                                to: graph.name(edge.target).to_string(),
                                expected: existing.to_string(),
                                found: candidate.to_string(),
                            });
                        }
                    }
                }
            }
        }

        let measurements: IndexMap<_, _> = order
            .into_iter()
            .filter_map(|id: UnitIndex| {
                let coefficient = coefficients[id.index()].take()?;
                let name = graph.name(id).to_string();
                Some((name.clone(), WeightedMeasurement { unit_id: name, coefficient_from_root: coefficient }))
            })
            .collect();

        debug!(root, units = measurements.len(), "built conversion network");
        Ok(Self { root: root.to_string(), measurements })
    }

    /// `candidate / existing ≈ 1`, so the tolerance bounds the cycle's ratio.
    fn agrees(graph: &ConversionGraph<T>, candidate: &T, existing: &T, root: &str) -> Result<bool, NetworkBuildError> {
        if candidate == existing {
            return Ok(true);
        }
        let ratio = candidate
            .divide(existing)
            .map_err(|source| NetworkBuildError::Arithmetic { root: root.to_string(), source })?;
        Ok(ratio.is_nearly_equal_to(graph.one()))
    }

    pub fn root(&self) -> &str { &self.root }
    pub fn len(&self) -> usize { self.measurements.len() }
    pub fn is_empty(&self) -> bool { self.measurements.is_empty() }

    pub fn contains(&self, unit: &str) -> bool {
        self.measurements.contains_key(unit)
    }

    /// How many root units one `unit` is worth.
    pub fn coefficient(&self, unit: &str) -> Option<&T> {
        self.measurements.get(unit).map(|m| &m.coefficient_from_root)
    }

    /// Measurements in BFS discovery order, root first.
    pub fn measurements(&self) -> impl Iterator<Item = &WeightedMeasurement<T>> {
        self.measurements.values()
    }
}
