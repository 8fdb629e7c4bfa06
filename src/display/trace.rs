use crate::network::ConversionNetwork;
use crate::number::Number;
use crate::store::{ConversionGraph, UnitIndex};
use std::collections::VecDeque;
use std::fmt::Write;

/// Human-readable audit of a built network: every unit with its factor to the
/// root, the BFS level it was reached at and the rule step that reached it.
///
/// The listing is flat (one line per unit) so that long chains stay linear.
pub fn format_network<T: Number>(graph: &ConversionGraph<T>, network: &ConversionNetwork<T>) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "NETWORK TRACE rooted at '{}':", network.root());
    let _ = writeln!(output, "--------------------------------------------------");

    let Some(root) = graph.unit_index(network.root()) else {
        let _ = writeln!(output, "Error: root '{}' is not part of the graph", network.root());
        return output;
    };

    // 1. Rebuild the BFS spanning tree
    let mut reached: Vec<Option<Step<'_, T>>> = vec![None; graph.unit_count()];
    let mut order = vec![root];
    let mut queue = VecDeque::from([root]);
    reached[root.index()] = Some(Step { level: 1, via: None });

    while let Some(unit) = queue.pop_front() {
        let level = reached[unit.index()].as_ref().map_or(1, |s| s.level);
        for edge in graph.edges(unit) {
            if reached[edge.target.index()].is_none() {
                reached[edge.target.index()] = Some(Step { level: level + 1, via: Some((unit, &edge.multiplier)) });
                order.push(edge.target);
                queue.push_back(edge.target);
            }
        }
    }

    // 2. One line per unit
    let mut rule_edges = 0;
    for &unit in &order {
        rule_edges += graph.edges(unit).len();
        let name = graph.name(unit);
        let coefficient = match network.coefficient(name) {
            Some(c) => c.to_string(),
            None => "?".to_string(),
        };
        let Some(step) = &reached[unit.index()] else { continue };

        let _ = write!(output, "[L{}] 1 {} = {} {}", step.level, name, coefficient, network.root());
        match step.via {
            None => {
                let _ = writeln!(output, " (root)");
            }
            Some((parent, multiplier)) => {
                let _ = writeln!(output, "  <- {} x {}", graph.name(parent), multiplier);
            }
        }
    }

    let _ = writeln!(output, "--------------------------------------------------");
    let _ = writeln!(output, "{} units, {} rules", order.len(), rule_edges / 2);
    output
}

#[derive(Clone)]
struct Step<'a, T> {
    level: usize,
    via: Option<(UnitIndex, &'a T)>,
}
