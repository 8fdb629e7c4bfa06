//! The generic conversion engine.
//!
//! A `MeasurementConverter<T>` owns one immutable graph, its unit families
//! and a lazily populated network cache. It is `Sync` and meant to be shared.
use crate::error::{ConversionError, ConversionFailure, ConverterBuildError};
use crate::network::{ComponentId, Components, ConversionNetwork, NetworkCache};
use crate::number::{Number, NumberFactory};
use crate::store::{ComplexFraction, ConversionGraph, ConversionRule, GraphBuilder, UnitIndex};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct MeasurementConverter<T> {
    graph: ConversionGraph<T>,
    components: Components,
    cache: NetworkCache<T>,
}

impl<T: Number> MeasurementConverter<T> {
    pub fn new(graph: ConversionGraph<T>) -> Self {
        let components = Components::discover(&graph);
        let cache = NetworkCache::new(&components);
        Self { graph, components, cache }
    }

    pub fn from_rules<F>(rules: &[ConversionRule<T>], factory: &F) -> Result<Self, ConverterBuildError>
    where
        F: NumberFactory<Number = T>,
    {
        let graph = GraphBuilder::new(factory.clone()).build(rules)?;
        let converter = Self::new(graph);
        info!(
            rules = rules.len(),
            units = converter.graph.unit_count(),
            families = converter.components.count(),
            "measurement converter ready"
        );
        Ok(converter)
    }

    /// Parses every weight with `factory`, then builds as `from_rules`.
    pub fn from_raw_rules<F>(raw: &[ConversionRule<String>], factory: &F) -> Result<Self, ConverterBuildError>
    where
        F: NumberFactory<Number = T>,
    {
        let rules = raw
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                rule.map_weight(|weight| factory.parse(weight)).map_err(|source| ConverterBuildError::Weight {
                    index,
                    weight: rule.weight.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_rules(&rules, factory)
    }

    pub fn graph(&self) -> &ConversionGraph<T> { &self.graph }
    pub fn components(&self) -> &Components { &self.components }

    /// The network of the family `unit` belongs to, built on first use.
    pub fn network_for(&self, unit: &str) -> Result<Arc<ConversionNetwork<T>>, ConversionFailure> {
        let id = self.resolve(unit)?;
        self.network_of(self.components.component_of(id))
    }

    /// `weight(from) / weight(to)`, where a fraction's weight is the product of its
    /// numerator coefficients over the product of its denominator coefficients.
    pub fn convert<S: AsRef<str>>(&self, from: &ComplexFraction<S>, to: &ComplexFraction<S>) -> Result<T, ConversionError> {
        self.try_convert(from, to).map_err(|source| ConversionError {
            from: from.to_string(),
            to: to.to_string(),
            source,
        })
    }

    /// Runs independent conversions in parallel against the shared cache.
    pub fn convert_batch<S>(&self, requests: &[(ComplexFraction<S>, ComplexFraction<S>)]) -> Vec<Result<T, ConversionError>>
    where
        S: AsRef<str> + Sync,
    {
        requests.par_iter().map(|(from, to)| self.convert(from, to)).collect()
    }

    fn try_convert<S: AsRef<str>>(&self, from: &ComplexFraction<S>, to: &ComplexFraction<S>) -> Result<T, ConversionFailure> {
        // 1. Arity must match side by side
        if from.numerator.len() != to.numerator.len() || from.denominator.len() != to.denominator.len() {
            return Err(ConversionFailure::MismatchedDimensionality {
                from_numerator: from.numerator.len(),
                from_denominator: from.denominator.len(),
                to_numerator: to.numerator.len(),
                to_denominator: to.denominator.len(),
            });
        }

        // 2. Every unit must be known
        let resolve_all = |side: &[S]| side.iter().map(|u| self.resolve(u.as_ref())).collect::<Result<Vec<_>, _>>();
        let from_num = resolve_all(from.numerator.as_slice())?;
        let from_den = resolve_all(from.denominator.as_slice())?;
        let to_num = resolve_all(to.numerator.as_slice())?;
        let to_den = resolve_all(to.denominator.as_slice())?;

        // 3. Families must cancel between `from * to^-1`
        self.check_balance(&[from_num.as_slice(), to_den.as_slice()], &[from_den.as_slice(), to_num.as_slice()])?;

        // 4. Weigh both fractions
        let weight_from = self.weight(&from_num, &from_den)?;
        let weight_to = self.weight(&to_num, &to_den)?;
        Ok(weight_from.divide(&weight_to)?)
    }

    fn resolve(&self, unit: &str) -> Result<UnitIndex, ConversionFailure> {
        self.graph.unit_index(unit).ok_or_else(|| ConversionFailure::NoSuchMeasurement(unit.to_string()))
    }

    fn network_of(&self, component: ComponentId) -> Result<Arc<ConversionNetwork<T>>, ConversionFailure> {
        Ok(self.cache.get_or_build(&self.graph, &self.components, component)?)
    }

    fn check_balance(&self, upper: &[&[UnitIndex]], lower: &[&[UnitIndex]]) -> Result<(), ConversionFailure> {
        let mut order = Vec::new();
        let mut balance: HashMap<ComponentId, i64> = HashMap::new();
        let mut tally = |sides: &[&[UnitIndex]], delta: i64| {
            for unit in sides.iter().flat_map(|side| side.iter()) {
                let component = self.components.component_of(*unit);
                let count = balance.entry(component).or_insert_with(|| {
                    order.push(component);
                    0
                });
                *count += delta;
            }
        };
        tally(upper, 1);
        tally(lower, -1);

        match order.into_iter().find(|c| balance[c] != 0) {
            Some(component) => Err(ConversionFailure::IncompatibleDimensions {
                family: self.graph.name(self.components.root(component)).to_string(),
            }),
            None => Ok(()),
        }
    }

    fn coefficient(&self, unit: UnitIndex) -> Result<T, ConversionFailure> {
        let network = self.network_of(self.components.component_of(unit))?;
        let name = self.graph.name(unit);
        network
            .coefficient(name)
            .cloned()
            .ok_or_else(|| ConversionFailure::NoSuchMeasurement(name.to_string()))
    }

    fn product(&self, units: &[UnitIndex]) -> Result<T, ConversionFailure> {
        let mut acc = self.graph.one().clone();
        for &unit in units {
            acc = acc.multiply(&self.coefficient(unit)?);
        }
        Ok(acc)
    }

    fn weight(&self, numerator: &[UnitIndex], denominator: &[UnitIndex]) -> Result<T, ConversionFailure> {
        Ok(self.product(numerator)?.divide(&self.product(denominator)?)?)
    }
}
