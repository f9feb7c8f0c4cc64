mod cli;

use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::prelude::*;

use flamefold::flamegraph;
use flamefold::input;
use flamefold::palette::{FilePalette, PaletteStore};

use cli::{Cli, Commands, GenArgs};

fn gen_svg(args: &GenArgs) -> Result<()> {
    let opts = args.options()?;
    let text = input::read_all(&args.files).context("failed to read input")?;

    let svg = if args.palette {
        let mut palette = FilePalette::open(&args.palette_file)?;
        let svg = flamegraph::from_lines(&opts, text.lines(), Some(&mut palette as &mut dyn PaletteStore))?;
        palette.save()?;
        info!(path = %palette.path().display(), "saved palette");
        svg
    } else {
        flamegraph::from_lines(&opts, text.lines(), None)?
    };

    if args.output == "-" {
        io::stdout()
            .write_all(svg.as_bytes())
            .context("failed to write to stdout")?;
    } else {
        fs::write(&args.output, svg).with_context(|| format!("failed to write {}", args.output))?;
        info!(output = %args.output, "wrote flame graph");
    }
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(fmt::layer().with_writer(io::stderr))
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Gen(args) => gen_svg(&args),
    }
}
