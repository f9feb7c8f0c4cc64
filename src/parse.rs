//! Folded stack line parsing.
//!
//! Each input line looks like `frame1;frame2;...;frameN <weight>`, or for
//! differential input `frame1;...;frameN <baseline> <weight>`.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::{FlameError, Result};

static TRAILING_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)\s+(\d+(?:\.\d*)?)$").expect("valid regex"));

/// One stack observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Frame names, root first.
    pub frames: Vec<String>,
    /// The last numeric column; this is what advances the time axis.
    pub weight: f64,
    /// The first of two numeric columns in differential input.
    pub baseline: Option<f64>,
}

impl Sample {
    /// Difference between the current and the baseline weight.
    pub fn delta(&self) -> Option<f64> {
        self.baseline.map(|baseline| self.weight - baseline)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Swap root and leaf within every stack.
    pub reverse_stacks: bool,
    /// Keep samples in file order instead of reversing the list.
    pub flame_chart: bool,
}

/// The parsed sample list, ready for merging.
#[derive(Debug, Default)]
pub struct Samples {
    pub samples: Vec<Sample>,
    /// Largest absolute delta seen in any sample.
    pub max_delta: f64,
    /// Lines that could not be parsed.
    pub ignored: usize,
}

impl Samples {
    pub fn total_weight(&self) -> f64 {
        self.samples.iter().map(|s| s.weight).sum()
    }
}

/// Parses a single line. Returns `None` for lines without frames or counts.
pub fn parse_line(line: &str, reverse_stacks: bool) -> Option<Sample> {
    let line = line.trim_end();
    let caps = TRAILING_COUNT.captures(line)?;
    let mut stack = caps.get(1)?.as_str();
    let mut weight: f64 = caps.get(2)?.as_str().parse().ok()?;
    let mut baseline = None;

    if let Some(inner) = TRAILING_COUNT.captures(stack) {
        baseline = Some(inner.get(2)?.as_str().parse().ok()?);
        stack = inner.get(1)?.as_str();
    }

    let stack = stack.trim();
    if stack.is_empty() {
        return None;
    }

    let mut frames: Vec<String> = stack.split(';').map(str::to_string).collect();
    if reverse_stacks {
        frames.reverse();
    }

    if !weight.is_finite() {
        weight = 0.0;
    }
    Some(Sample {
        frames,
        weight,
        baseline,
    })
}

/// Parses all lines, skipping the ones that don't contain a sample.
///
/// Fails with [`FlameError::EmptyInput`] when there isn't a single non-blank line.
pub fn parse_samples<'a, I>(lines: I, opts: ParseOptions) -> Result<Samples>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut parsed = Samples::default();
    let mut seen = 0usize;

    for (lineno, line) in lines.into_iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        seen += 1;

        match parse_line(line, opts.reverse_stacks) {
            Some(sample) => {
                if let Some(delta) = sample.delta() {
                    parsed.max_delta = parsed.max_delta.max(delta.abs());
                }
                parsed.samples.push(sample);
            }
            None => {
                debug!(line = lineno + 1, "skipping unparsable line");
                parsed.ignored += 1;
            }
        }
    }

    if seen == 0 {
        return Err(FlameError::EmptyInput);
    }

    // Merge order: flame graphs consume the list back to front.
    if !opts.flame_chart {
        parsed.samples.reverse();
    }
    Ok(parsed)
}
