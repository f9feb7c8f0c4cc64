//! Flame graph SVG generator.
//!
//! Takes folded stack lines, merges them into frame intervals, prunes the
//! ones too narrow to see and draws the rest.
//!
//! # Example
//!
//! ```
//! use flamefold::flamegraph::from_lines;
//! use flamefold::options::Options;
//!
//! let opts = Options {
//!     hash: true,
//!     ..Default::default()
//! };
//! let lines = ["main;foo;bar 100", "main;foo;baz 50"];
//! let svg = from_lines(&opts, lines, None).unwrap();
//! assert!(svg.contains("Flame Graph"));
//! ```

use tracing::{debug, info, warn};

use crate::color::ColorAssigner;
use crate::error::{FlameError, Result};
use crate::flgutils::{format_count, strip_annotation, truncate_label};
use crate::flow::{Node, merge_samples};
use crate::layout::{Layout, XPAD};
use crate::nameattr::Attributes;
use crate::options::Options;
use crate::palette::PaletteStore;
use crate::parse::parse_samples;
use crate::prune::prune;
use crate::svg::{Header, SvgCanvas};

/// Pruned and laid out frames, ready to draw.
#[derive(Debug)]
pub struct FlameGraph {
    /// Retained frames in the order they were closed.
    pub nodes: Vec<Node>,
    /// Width of the time axis.
    pub total: f64,
    pub max_depth: usize,
    /// Largest absolute delta, for differential input.
    pub max_delta: f64,
    pub layout: Layout,
}

/// Runs the parse, merge and prune stages.
pub fn build<'a, I>(opts: &Options, lines: I) -> Result<FlameGraph>
where
    I: IntoIterator<Item = &'a str>,
{
    opts.validate()?;

    let parsed = parse_samples(lines, opts.parse_options())?;
    let merged = merge_samples(&parsed.samples)?;
    if merged.total <= 0.0 {
        return Err(FlameError::NoValidFrames);
    }
    debug!(
        samples = parsed.samples.len(),
        ignored = parsed.ignored,
        collisions = merged.collisions,
        "merged stacks"
    );

    let total = effective_total(opts.total, merged.total);
    let layout = Layout::new(opts, total);
    let pruned = prune(merged.nodes, layout.min_width_time(opts.min_width), total)?;
    let layout = layout.with_depth(pruned.max_depth);

    Ok(FlameGraph {
        nodes: pruned.nodes,
        total,
        max_depth: pruned.max_depth,
        max_delta: parsed.max_delta,
        layout,
    })
}

/// An explicit total only applies when it doesn't cut off any samples.
fn effective_total(requested: Option<f64>, computed: f64) -> f64 {
    match requested {
        Some(total) if total >= computed => total,
        Some(total) => {
            if (computed - total) / computed > 0.02 {
                warn!(
                    requested = total,
                    actual = computed,
                    "specified total is less than the actual total, ignoring it"
                );
            }
            computed
        }
        None => computed,
    }
}

/// Builds and renders a flame graph.
///
/// Colors come from `palette` when one is given; new names are added to it.
/// Saving the palette is up to the caller.
pub fn from_lines<'a, I>(
    opts: &Options,
    lines: I,
    palette: Option<&mut dyn PaletteStore>,
) -> Result<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let graph = build(opts, lines)?;

    let colors = ColorAssigner::for_scheme(opts.colors, opts.hash)
        .with_deltas(graph.max_delta, opts.negate);
    let mut colors = match palette {
        Some(palette) => colors.with_palette(palette),
        None => colors,
    };

    let svg = render(opts, &graph, &mut colors);
    info!(
        frames = graph.nodes.len(),
        total = graph.total,
        depth = graph.max_depth,
        "rendered flame graph"
    );
    Ok(svg)
}

/// Draws a built flame graph.
pub fn render(opts: &Options, graph: &FlameGraph, colors: &mut ColorAssigner<'_>) -> String {
    let layout = &graph.layout;
    let (width, height) = (layout.image_width, layout.image_height);
    let font_size = opts.font_size;
    let background = opts.background();

    let mut canvas = SvgCanvas::new(&Header {
        width,
        height,
        encoding: opts.encoding.as_deref(),
        notes: &opts.notes,
        font_type: &opts.font_type,
        font_size,
        background: background.gradient(),
    });

    // Settings read by the external viewer script.
    canvas.raw(&format!(
        "<script type=\"text/ecmascript\">\n<![CDATA[\n\
         \tvar nametype = '{}';\n\tvar fontsize = {};\n\tvar fontwidth = {};\n\
         \tvar xpad = {};\n\tvar inverted = {};\n\tvar searchcolor = 'rgb(230,0,230)';\n]]>\n</script>\n",
        escape_js(&opts.name_type),
        font_size,
        opts.font_width,
        XPAD,
        opts.inverted,
    ));
    canvas.filled_rect(0.0, 0.0, width, height, "url(#background)", "");
    canvas.text(Some("title"), (width / 2.0).floor(), font_size * 2.0, opts.title(), "");
    if let Some(subtitle) = &opts.subtitle {
        canvas.text(Some("subtitle"), (width / 2.0).floor(), font_size * 4.0, subtitle, "");
    }
    let footer_y = height - layout.ypad2 / 2.0;
    canvas.text(Some("details"), XPAD, footer_y, " ", "");
    canvas.text(Some("unzoom"), XPAD, font_size * 2.0, "Reset Zoom", r#"class="hide""#);
    canvas.text(Some("search"), width - XPAD - 100.0, font_size * 2.0, "Search", "");
    canvas.text(Some("ignorecase"), width - XPAD - 16.0, font_size * 2.0, "ic", "");
    canvas.text(Some("matched"), width - XPAD - 100.0, footer_y, " ", "");

    canvas.raw("<g id=\"frames\">\n");
    let char_width = font_size * opts.font_width;
    for node in &graph.nodes {
        let rect = layout.rect(node);

        let mut attrs: Attributes = opts.name_attrs.get(&node.name).cloned().unwrap_or_default();
        attrs
            .entry("title".to_string())
            .or_insert_with(|| tooltip(opts, graph.total, node));

        canvas.group_start(&attrs);
        let color = colors.color_for(&node.name, node.delta);
        canvas.frame_rect(rect.x1, rect.y1, rect.x2, rect.y2, color);

        let chars = (rect.width() / char_width).floor() as usize;
        let label = truncate_label(strip_annotation(&node.name), chars);
        canvas.text(None, rect.x1 + 3.0, 3.0 + (rect.y1 + rect.y2) / 2.0, &label, "");
        canvas.group_end(&attrs);
    }
    canvas.raw("</g>\n");

    canvas.finish()
}

fn escape_js(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// `name (count countname, pct%[, ±delta%])`
fn tooltip(opts: &Options, total: f64, node: &Node) -> String {
    let samples = (node.width() * opts.factor).round();
    let samples_txt = format_count(samples);
    if node.is_root() {
        return format!("all ({} {}, 100%)", samples_txt, opts.count_name);
    }

    let scaled_total = total * opts.factor;
    let pct = 100.0 * samples / scaled_total;
    match node.delta {
        None => format!(
            "{} ({} {}, {:.2}%)",
            node.name, samples_txt, opts.count_name, pct
        ),
        Some(delta) => {
            let d = if opts.negate { -delta } else { delta };
            let delta_pct = 100.0 * d / scaled_total;
            let sign = if d > 0.0 { "+" } else { "" };
            format!(
                "{} ({} {}, {:.2}%, {}{:.2}%)",
                node.name, samples_txt, opts.count_name, pct, sign, delta_pct
            )
        }
    }
}
