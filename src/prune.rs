use crate::error::{FlameError, Result};
use crate::flow::Node;

/// Nodes that survived pruning.
#[derive(Debug)]
pub struct Pruned {
    pub nodes: Vec<Node>,
    pub max_depth: usize,
}

/// Drops every interval narrower than `min_width_time`.
///
/// The root is always kept and stretched to `total`, so an overridden total
/// still spans the whole image.
pub fn prune(nodes: Vec<Node>, min_width_time: f64, total: f64) -> Result<Pruned> {
    let mut kept = Vec::with_capacity(nodes.len());
    let mut max_depth = 0;

    for mut node in nodes {
        if !node.start.is_finite() || node.start > node.end {
            return Err(FlameError::CorruptMerge {
                name: node.name,
                depth: node.depth,
            });
        }

        if node.is_root() {
            node.end = total;
        } else if node.width() < min_width_time {
            continue;
        }

        max_depth = max_depth.max(node.depth);
        kept.push(node);
    }

    Ok(Pruned {
        nodes: kept,
        max_depth,
    })
}
