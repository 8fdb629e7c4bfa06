//! graph.rs
//! Bidirectional conversion graph in a dense columnar layout.
//!
//! Units are interned to `UnitIndex` in first-seen order. Outgoing edges are
//! stored CSR-style: one flat edge array plus an `(start, count)` range per unit,
//! so each unit's edges keep the order of the input rules.

use super::types::{ConversionRule, UnitIndex};
use crate::error::GraphBuildError;
use crate::number::{Number, NumberFactory};
use std::collections::HashMap;
use tracing::{debug, warn};

/// A directed multiplicative step: `coefficient(target) = coefficient(source) * multiplier`.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge<T> {
    pub target: UnitIndex,
    pub multiplier: T,
}

#[derive(Debug, Clone)]
pub struct ConversionGraph<T> {
    names: Vec<String>,
    ids: HashMap<String, UnitIndex>,

    // Dense topology
    edges_flat: Vec<Edge<T>>,
    edge_ranges: Vec<(u32, u32)>,

    /// Multiplicative identity in the context the graph was built with.
    one: T,
}

impl<T: Number> ConversionGraph<T> {
    pub fn unit_count(&self) -> usize { self.names.len() }
    pub fn edge_count(&self) -> usize { self.edges_flat.len() }
    pub fn one(&self) -> &T { &self.one }

    pub fn unit_index(&self, name: &str) -> Option<UnitIndex> {
        self.ids.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }

    /// `None` for an index from another graph.
    pub fn unit_name(&self, id: UnitIndex) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    pub(crate) fn name(&self, id: UnitIndex) -> &str {
        &self.names[id.index()]
    }

    /// Unit names in first-seen order.
    pub fn units(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn unit_indices(&self) -> impl Iterator<Item = UnitIndex> {
        (0..self.names.len()).map(UnitIndex::new)
    }

    /// Outgoing edges in input order; empty for an index from another graph.
    #[inline(always)]
    pub fn edges(&self, id: UnitIndex) -> &[Edge<T>] {
        match self.edge_ranges.get(id.index()) {
            Some(&(start, count)) => &self.edges_flat[start as usize..(start + count) as usize],
            None => &[],
        }
    }
}

/// Builds `ConversionGraph`s whose numbers come from one factory.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder<F> {
    factory: F,
}

impl<F: NumberFactory> GraphBuilder<F> {
    pub fn new(factory: F) -> Self { Self { factory } }

    /// For each rule `(big, small, w)` registers `small -> big` with multiplier `w`
    /// and `big -> small` with `1/w`. Duplicates are kept; consistency is checked
    /// when a network is built.
    pub fn build(&self, rules: &[ConversionRule<F::Number>]) -> Result<ConversionGraph<F::Number>, GraphBuildError> {
        // 1. Validate every rule before touching the layout
        for rule in rules {
            if rule.big_unit.trim().is_empty() || rule.small_unit.trim().is_empty() {
                return Err(GraphBuildError::InvalidArgument(format!("rule {} has an empty unit name", rule)));
            }
            if !rule.weight.is_positive() {
                return Err(GraphBuildError::NonPositiveWeight { rule: rule.to_string() });
            }
            if !rule.weight.is_approximately_positive() {
                warn!(%rule, "rule weight is below the numeric tolerance");
            }
        }

        // 2. Intern names and collect directed edges in input order
        let mut names = Vec::new();
        let mut ids = HashMap::new();
        let mut intern = |name: &str| -> UnitIndex {
            *ids.entry(name.to_string()).or_insert_with(|| {
                names.push(name.to_string());
                UnitIndex::new(names.len() - 1)
            })
        };

        let mut directed = Vec::with_capacity(rules.len() * 2);
        for rule in rules {
            let big = intern(&rule.big_unit);
            let small = intern(&rule.small_unit);
            let inverse = rule.weight.inverse().map_err(|source| GraphBuildError::Arithmetic {
                rule: rule.to_string(),
                source,
            })?;
            if !rule.weight.is_finite() || !inverse.is_finite() {
                return Err(GraphBuildError::UnrepresentableWeight { rule: rule.to_string() });
            }
            directed.push((small, Edge { target: big, multiplier: rule.weight.clone() }));
            directed.push((big, Edge { target: small, multiplier: inverse }));
        }

        // 3. Stable counting sort by source into the CSR arrays
        let mut counts = vec![0u32; names.len()];
        for (source, _) in &directed {
            counts[source.index()] += 1;
        }
        let mut edge_ranges = Vec::with_capacity(names.len());
        let mut next_slot = Vec::with_capacity(names.len());
        let mut start = 0u32;
        for &count in &counts {
            edge_ranges.push((start, count));
            next_slot.push(start as usize);
            start += count;
        }

        let mut slots: Vec<Option<Edge<F::Number>>> = vec![None; directed.len()];
        for (source, edge) in directed {
            let slot = &mut next_slot[source.index()];
            slots[*slot] = Some(edge);
            *slot += 1;
        }
        let edges_flat: Vec<_> = slots.into_iter().flatten().collect();

        debug!(units = names.len(), edges = edges_flat.len(), "built conversion graph");

        Ok(ConversionGraph { names, ids, edges_flat, edge_ranges, one: self.factory.one() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::{DecimalFactory, FloatFactory, FloatNumber, RationalFactory};

    fn rule(big: &str, small: &str, weight: f64) -> ConversionRule<FloatNumber> {
        ConversionRule::new(big, small, FloatNumber(weight))
    }

    fn names<T: Number>(graph: &ConversionGraph<T>, unit: &str) -> Vec<String> {
        let id = graph.unit_index(unit).unwrap();
        graph.edges(id).iter().map(|e| graph.name(e.target).to_string()).collect()
    }

    #[test]
    fn test_registers_both_directions() {
        let graph = GraphBuilder::new(FloatFactory).build(&[rule("км", "м", 1000.0)]).unwrap();
        assert_eq!(graph.unit_count(), 2);
        assert_eq!(graph.edge_count(), 2);

        let m = graph.unit_index("м").unwrap();
        let km = graph.unit_index("км").unwrap();
        assert_eq!(graph.edges(m), &[Edge { target: km, multiplier: FloatNumber(1000.0) }]);
        assert_eq!(graph.edges(km), &[Edge { target: m, multiplier: FloatNumber(0.001) }]);
    }

    #[test]
    fn test_edges_keep_input_order_and_duplicates() {
        let rules = [
            rule("м", "см", 100.0),
            rule("км", "м", 1000.0),
            rule("м", "мм", 1000.0),
            rule("м", "см", 100.0),
        ];
        let graph = GraphBuilder::new(FloatFactory).build(&rules).unwrap();
        assert_eq!(graph.units().collect::<Vec<_>>(), vec!["м", "см", "км", "мм"]);
        assert_eq!(names(&graph, "м"), vec!["см", "км", "мм", "см"]);
        assert_eq!(names(&graph, "см"), vec!["м", "м"]);
        assert_eq!(graph.edge_count(), 8);
    }

    #[test]
    fn test_rejects_non_positive_weights() {
        for weight in [0.0, -42.0] {
            let rules = [rule("м", "см", 100.0), rule("м", "метро", weight)];
            let err = GraphBuilder::new(FloatFactory).build(&rules).unwrap_err();
            assert!(matches!(err, GraphBuildError::NonPositiveWeight { ref rule } if rule.contains("метро")));
        }
    }

    #[test]
    fn test_rejects_weights_that_overflow() {
        let huge = FloatFactory.parse(&format!("1{}", "0".repeat(400))).unwrap();
        let tiny = FloatFactory.parse(&format!("0.{}1", "0".repeat(319))).unwrap();
        for weight in [huge, tiny] {
            let rules = [ConversionRule::new("a", "b", weight)];
            let err = GraphBuilder::new(FloatFactory).build(&rules).unwrap_err();
            assert!(matches!(err, GraphBuildError::UnrepresentableWeight { .. }), "{err:?}");
        }
        assert!(GraphBuilder::new(FloatFactory).build(&[rule("a", "b", 1e300)]).is_ok());
    }

    #[test]
    fn test_foreign_indices_do_not_panic() {
        let graph = GraphBuilder::new(FloatFactory).build(&[rule("км", "м", 1000.0)]).unwrap();
        assert_eq!(graph.unit_name(UnitIndex::new(0)), Some("км"));
        assert_eq!(graph.unit_name(UnitIndex::new(7)), None);
        assert!(graph.edges(UnitIndex::new(7)).is_empty());
    }

    #[test]
    fn test_rejects_empty_unit_names() {
        let err = GraphBuilder::new(FloatFactory).build(&[rule("", "м", 1.0)]).unwrap_err();
        assert!(matches!(err, GraphBuildError::InvalidArgument(_)));
        let err = GraphBuilder::new(FloatFactory).build(&[rule("м", "  ", 1.0)]).unwrap_err();
        assert!(matches!(err, GraphBuildError::InvalidArgument(_)));
    }

    #[test]
    fn test_empty_rule_list_gives_empty_graph() {
        let graph = GraphBuilder::new(RationalFactory).build(&[]).unwrap();
        assert_eq!(graph.unit_count(), 0);
        assert!(!graph.contains("м"));
    }

    #[test]
    fn test_inverse_weights_use_backend_arithmetic() {
        let factory = DecimalFactory::default();
        let rules = [ConversionRule::new("час", "мин", factory.parse("60").unwrap())];
        let graph = GraphBuilder::new(factory.clone()).build(&rules).unwrap();
        let hour = graph.unit_index("час").unwrap();
        assert_eq!(graph.edges(hour)[0].multiplier.to_string(), "0.01666666666666666666666666666666667");
        assert_eq!(graph.one(), &factory.one());
    }
}
