//! Folded stack samples in, flame graph SVG out.
//!
//! The pipeline runs strictly forward:
//! [`parse`] → [`flow`] → [`prune`] → [`layout`] / [`color`] → [`flamegraph`].

pub mod color;
pub mod error;
pub mod flamegraph;
pub mod flgutils;
pub mod flow;
pub mod input;
pub mod layout;
pub mod nameattr;
pub mod options;
pub mod palette;
pub mod parse;
pub mod prune;
pub mod svg;

pub use error::{FlameError, Result};
pub use flamegraph::{FlameGraph, build, from_lines, render};
pub use options::Options;
