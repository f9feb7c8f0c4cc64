use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use flamefold::color::{Background, Scheme};
use flamefold::nameattr::NameAttrs;
use flamefold::{Options, Result};

/// Renders folded stack samples as interactive flame graphs
#[derive(Parser)]
#[command(name = "flamefold")]
#[command(version)]
#[command(about = "Renders folded stack samples as flame graphs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a flame graph SVG from folded stack file(s)
    Gen(GenArgs),
}

#[derive(Args)]
pub struct GenArgs {
    /// Output SVG file path ("-" for stdout)
    #[arg(short, long, default_value = "flamegraph.svg")]
    pub output: String,

    /// Input folded stack file(s); reads stdin when omitted
    pub files: Vec<PathBuf>,

    /// Width of the image in pixels
    #[arg(long, default_value_t = 1200.0)]
    pub width: f64,

    /// Height of each frame in pixels
    #[arg(long, default_value_t = 16.0)]
    pub height: f64,

    #[arg(long, default_value = "Verdana")]
    pub fonttype: String,

    #[arg(long, default_value_t = 12.0)]
    pub fontsize: f64,

    /// Average font character width, relative to the font size
    #[arg(long, default_value_t = 0.59)]
    pub fontwidth: f64,

    /// Omit frames narrower than this many pixels
    #[arg(long, default_value_t = 0.1)]
    pub minwidth: f64,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub subtitle: Option<String>,

    /// Name type label
    #[arg(long, default_value = "Function:")]
    pub nametype: String,

    /// Count type label
    #[arg(long, default_value = "samples")]
    pub countname: String,

    /// Tab-separated file of per-function SVG attributes
    #[arg(long)]
    pub nameattr: Option<PathBuf>,

    /// Override the total count
    #[arg(long)]
    pub total: Option<f64>,

    /// Multiplier applied to displayed counts
    #[arg(long, default_value_t = 1.0)]
    pub factor: f64,

    /// Color palette: hot, mem, io, java, js, perl, wakeup, chain, red, green, blue, aqua, yellow, purple, orange
    #[arg(long, default_value = "hot", value_parser = parse_scheme)]
    pub colors: Scheme,

    /// Background: yellow, blue, green, grey, or a flat #rrggbb
    #[arg(long, value_parser = parse_background)]
    pub bgcolors: Option<Background>,

    /// Derive colors from function names
    #[arg(long)]
    pub hash: bool,

    /// Reverse the frames within each stack
    #[arg(long)]
    pub reverse: bool,

    /// Icicle graph: root at the top
    #[arg(long)]
    pub inverted: bool,

    /// Keep samples in input order (time on the x axis)
    #[arg(long)]
    pub flamechart: bool,

    /// Swap the red/blue meaning of differential colors
    #[arg(long)]
    pub negate: bool,

    /// Keep colors consistent across runs in a palette file
    #[arg(long)]
    pub palette: bool,

    #[arg(long, default_value = "palette.map")]
    pub palette_file: PathBuf,

    /// Text embedded as a comment in the SVG
    #[arg(long, default_value = "")]
    pub notes: String,

    /// XML encoding declared in the SVG prolog
    #[arg(long)]
    pub encoding: Option<String>,
}

fn parse_scheme(s: &str) -> std::result::Result<Scheme, String> {
    s.parse().map_err(|e: flamefold::FlameError| e.to_string())
}

fn parse_background(s: &str) -> std::result::Result<Background, String> {
    s.parse().map_err(|e: flamefold::FlameError| e.to_string())
}

impl GenArgs {
    pub fn options(&self) -> Result<Options> {
        let name_attrs = match &self.nameattr {
            Some(path) => NameAttrs::load(path)?,
            None => NameAttrs::default(),
        };

        Ok(Options {
            image_width: self.width,
            frame_height: self.height,
            font_type: self.fonttype.clone(),
            font_size: self.fontsize,
            font_width: self.fontwidth,
            min_width: self.minwidth,
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            name_type: self.nametype.clone(),
            count_name: self.countname.clone(),
            name_attrs,
            total: self.total,
            factor: self.factor,
            colors: self.colors,
            bg_colors: self.bgcolors.clone(),
            hash: self.hash,
            reverse: self.reverse,
            inverted: self.inverted,
            flame_chart: self.flamechart,
            negate: self.negate,
            notes: self.notes.clone(),
            encoding: self.encoding.clone(),
        })
    }
}
