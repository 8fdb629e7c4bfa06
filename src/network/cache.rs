//! Connected-component discovery and the lazy per-component network cache.
use super::builder::ConversionNetwork;
use crate::error::NetworkBuildError;
use crate::number::Number;
use crate::store::{ConversionGraph, UnitIndex};
use petgraph::unionfind::UnionFind;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Dense component index, assigned in order of each component's first unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u32);

impl ComponentId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
}

/// Partition of the graph's units into unit families.
#[derive(Debug, Clone, Default)]
pub struct Components {
    of_unit: Vec<ComponentId>,
    roots: Vec<UnitIndex>,
}

impl Components {
    pub fn discover<T: Number>(graph: &ConversionGraph<T>) -> Self {
        let mut sets = UnionFind::<u32>::new(graph.unit_count());
        for unit in graph.unit_indices() {
            for edge in graph.edges(unit) {
                sets.union(unit.0, edge.target.0);
            }
        }

        let mut dense: HashMap<u32, ComponentId> = HashMap::new();
        let mut of_unit = Vec::with_capacity(graph.unit_count());
        let mut roots = Vec::new();
        for unit in graph.unit_indices() {
            let id = *dense.entry(sets.find(unit.0)).or_insert_with(|| {
                roots.push(unit);
                ComponentId(roots.len() as u32 - 1)
            });
            of_unit.push(id);
        }

        debug!(units = of_unit.len(), components = roots.len(), "discovered unit families");
        Self { of_unit, roots }
    }

    pub fn count(&self) -> usize { self.roots.len() }

    pub(crate) fn component_of(&self, unit: UnitIndex) -> ComponentId {
        self.of_unit[unit.index()]
    }

    /// The unit a component's network is rooted at.
    pub(crate) fn root(&self, component: ComponentId) -> UnitIndex {
        self.roots[component.index()]
    }
}

/// One slot per component, each behind its own lock.
///
/// Networks are built on first request and never evicted. A failed build
/// leaves the slot empty so the next request reports the error again.
#[derive(Debug)]
pub struct NetworkCache<T> {
    slots: Vec<Mutex<Option<Arc<ConversionNetwork<T>>>>>,
}

impl<T: Number> NetworkCache<T> {
    pub fn new(components: &Components) -> Self {
        Self { slots: (0..components.count()).map(|_| Mutex::new(None)).collect() }
    }

    pub fn get_or_build(
        &self,
        graph: &ConversionGraph<T>,
        components: &Components,
        component: ComponentId,
    ) -> Result<Arc<ConversionNetwork<T>>, NetworkBuildError> {
        let mut slot = self.slots[component.index()].lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(network) = slot.as_ref() {
            return Ok(Arc::clone(network));
        }

        let root = graph.name(components.root(component));
        debug!(root, "network cache miss");
        let network = Arc::new(ConversionNetwork::build(graph, root)?);
        *slot = Some(Arc::clone(&network));
        Ok(network)
    }

    /// Number of networks built so far.
    pub fn built(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).is_some())
            .count()
    }
}
