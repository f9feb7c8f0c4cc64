//! The stack merge ("flow") engine.
//!
//! Consecutive samples are compared against the current frontier: frames
//! below the shared prefix are closed at the current time and the new
//! suffix is opened. No tree is built; each closed frame becomes a flat
//! [`Node`] interval tagged with its depth.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::warn;

use crate::error::{FlameError, Result};
use crate::parse::Sample;

/// A closed frame interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub depth: usize,
    pub start: f64,
    pub end: f64,
    pub delta: Option<f64>,
}

impl Node {
    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    /// The synthetic root every stack hangs off.
    pub fn is_root(&self) -> bool {
        self.depth == 0 && self.name.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenFrame {
    start: f64,
    delta: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct NodeKey {
    name: String,
    depth: usize,
    end_bits: u64,
}

/// Output of a finished merge.
#[derive(Debug)]
pub struct Merged {
    /// Closed intervals in the order they were closed.
    pub nodes: Vec<Node>,
    /// Final value of the time counter.
    pub total: f64,
    /// Closes that met an earlier interval with the same name, depth and end time.
    pub collisions: usize,
}

/// Merge state for one build.
#[derive(Debug, Default)]
pub struct Flow {
    frontier: Vec<String>,
    open: HashMap<(String, usize), OpenFrame>,
    nodes: Vec<Node>,
    index: HashMap<NodeKey, usize>,
    time: f64,
    collisions: usize,
}

impl Flow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one sample into the frontier and advances time by its weight.
    pub fn push(&mut self, sample: &Sample) -> Result<()> {
        let stack = std::iter::once(String::new())
            .chain(sample.frames.iter().cloned())
            .collect();
        self.merge(stack, sample.delta())?;
        self.time += sample.weight;
        Ok(())
    }

    /// Closes every frame that is still open and returns the intervals.
    pub fn finish(mut self) -> Result<Merged> {
        self.merge(Vec::new(), None)?;
        Ok(Merged {
            nodes: self.nodes,
            total: self.time,
            collisions: self.collisions,
        })
    }

    /// Replaces the frontier with `next`, closing and opening frames at the current time.
    ///
    /// `delta` is added to the leaf of `next` only.
    pub fn merge(&mut self, next: Vec<String>, delta: Option<f64>) -> Result<()> {
        let common = self
            .frontier
            .iter()
            .zip(next.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let last = std::mem::take(&mut self.frontier);
        for depth in (common..last.len()).rev() {
            let name = &last[depth];
            let open = self
                .open
                .remove(&(name.clone(), depth))
                .ok_or_else(|| FlameError::CorruptMerge {
                    name: name.clone(),
                    depth,
                })?;
            self.close(name.clone(), depth, open);
        }

        let leaf = next.len().saturating_sub(1);
        for (depth, name) in next.iter().enumerate().skip(common) {
            let entry = self
                .open
                .entry((name.clone(), depth))
                .or_insert(OpenFrame {
                    start: self.time,
                    delta: delta.map(|_| 0.0),
                });
            if let Some(d) = delta.filter(|_| depth == leaf) {
                *entry.delta.get_or_insert(0.0) += d;
            }
        }

        self.frontier = next;
        Ok(())
    }

    fn close(&mut self, name: String, depth: usize, open: OpenFrame) {
        let key = NodeKey {
            name: name.clone(),
            depth,
            end_bits: self.time.to_bits(),
        };
        let node = Node {
            name,
            depth,
            start: open.start,
            end: self.time,
            delta: open.delta,
        };

        match self.index.entry(key) {
            Entry::Occupied(slot) => {
                let prev = &mut self.nodes[*slot.get()];
                // Equal widths keep the later close.
                let replace = node.width() >= prev.width();
                let (kept, dropped) = if replace {
                    (node.width(), prev.width())
                } else {
                    (prev.width(), node.width())
                };
                warn!(
                    name = %node.name,
                    depth,
                    end = node.end,
                    kept_width = kept,
                    dropped_width = dropped,
                    "frame interval collision, keeping the wider one"
                );
                self.collisions += 1;
                if replace {
                    *prev = node;
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(self.nodes.len());
                self.nodes.push(node);
            }
        }
    }
}

/// Merges every sample in order and flushes the frontier.
pub fn merge_samples(samples: &[Sample]) -> Result<Merged> {
    let mut flow = Flow::new();
    for sample in samples {
        flow.push(sample)?;
    }
    flow.finish()
}
