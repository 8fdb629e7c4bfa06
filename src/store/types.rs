use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Dense index of an interned unit name inside one `ConversionGraph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct UnitIndex(pub u32);

impl UnitIndex {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

/// `1 big_unit = weight * small_unit`.
///
/// The weight type is left open so that unparsed rules (`ConversionRule<String>`)
/// can flow from ingestion to the backend chosen by configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversionRule<W> {
    pub big_unit: String,
    pub small_unit: String,
    pub weight: W,
}

impl<W> ConversionRule<W> {
    pub fn new(big_unit: impl Into<String>, small_unit: impl Into<String>, weight: W) -> Self {
        Self { big_unit: big_unit.into(), small_unit: small_unit.into(), weight }
    }

    pub fn map_weight<V, E>(&self, f: impl FnOnce(&W) -> Result<V, E>) -> Result<ConversionRule<V>, E> {
        Ok(ConversionRule {
            big_unit: self.big_unit.clone(),
            small_unit: self.small_unit.clone(),
            weight: f(&self.weight)?,
        })
    }
}

impl<W: fmt::Display> fmt::Display for ConversionRule<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1 {} = {} {}", self.big_unit, self.weight, self.small_unit)
    }
}

/// A compound unit expression. Order is irrelevant, multiplicity is not:
/// `[m, m]` in the numerator is m².
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ComplexFraction<U> {
    pub numerator: SmallVec<[U; 4]>,
    pub denominator: SmallVec<[U; 4]>,
}

impl<U> ComplexFraction<U> {
    pub fn new(numerator: impl IntoIterator<Item = U>, denominator: impl IntoIterator<Item = U>) -> Self {
        Self { numerator: numerator.into_iter().collect(), denominator: denominator.into_iter().collect() }
    }

    pub fn empty() -> Self {
        Self { numerator: SmallVec::new(), denominator: SmallVec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.numerator.is_empty() && self.denominator.is_empty()
    }

    /// Numerator units followed by denominator units.
    pub fn units(&self) -> impl Iterator<Item = &U> {
        self.numerator.iter().chain(self.denominator.iter())
    }
}

/// `a*b/c`; an empty side renders as `1`.
impl<U: AsRef<str>> fmt::Display for ComplexFraction<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let product = |side: &[U]| -> String {
            if side.is_empty() {
                return "1".to_string();
            }
            side.iter().map(|u| u.as_ref()).collect::<Vec<_>>().join("*")
        };

        let numerator = product(self.numerator.as_slice());
        if self.denominator.is_empty() {
            f.write_str(&numerator)
        } else {
            write!(f, "{}/{}", numerator, product(self.denominator.as_slice()))
        }
    }
}

/// A unit tagged with the factor converting one of it into the network's root unit.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedMeasurement<T> {
    pub unit_id: String,
    pub coefficient_from_root: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_display_and_map() {
        let rule = ConversionRule::new("км", "м", "1000".to_string());
        assert_eq!(rule.to_string(), "1 км = 1000 м");

        let parsed = rule.map_weight(|w| w.parse::<u32>()).unwrap();
        assert_eq!(parsed.weight, 1000);
        assert!(ConversionRule::new("a", "b", "x".to_string()).map_weight(|w| w.parse::<u32>()).is_err());
    }

    #[test]
    fn test_fraction_display() {
        assert_eq!(ComplexFraction::<&str>::empty().to_string(), "1");
        assert_eq!(ComplexFraction::new(["м"], ["с"]).to_string(), "м/с");
        assert_eq!(ComplexFraction::new(["кг", "м"], ["с", "с"]).to_string(), "кг*м/с*с");
        assert_eq!(ComplexFraction::new([], ["с"]).to_string(), "1/с");
        assert_eq!(ComplexFraction::new(["м"], []).to_string(), "м");
    }

    #[test]
    fn test_fraction_units_and_emptiness() {
        let f = ComplexFraction::new(["a", "b"], ["c"]);
        assert_eq!(f.units().copied().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert!(!f.is_empty());
        assert!(ComplexFraction::<String>::default().is_empty());
    }
}
