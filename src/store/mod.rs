//! Rule and unit data model plus the bidirectional conversion graph.
pub mod graph;
pub mod types;

pub use graph::{ConversionGraph, Edge, GraphBuilder};
pub use types::{ComplexFraction, ConversionRule, UnitIndex, WeightedMeasurement};
