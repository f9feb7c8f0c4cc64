//! Persistent name → color palettes.
//!
//! Keeping colors in a palette lets several flame graphs rendered from
//! different inputs agree on the color of every function. The file format
//! is one `name->rgb(r,g,b)` record per line, sorted by name.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::color::Rgb;
use crate::error::{FlameError, Result};

/// Keyed color storage consulted by the color assigner.
pub trait PaletteStore {
    fn get(&self, name: &str) -> Option<Rgb>;
    fn put(&mut self, name: &str, color: Rgb);
    fn list_sorted(&self) -> Vec<(&str, Rgb)>;
}

/// An in-memory palette.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PaletteMap {
    colors: BTreeMap<String, Rgb>,
}

impl PaletteMap {
    /// Parses palette records, skipping lines that aren't `name->color`.
    pub fn parse(text: &str) -> Self {
        let mut colors = BTreeMap::new();
        for (lineno, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let parsed = line
                .rsplit_once("->")
                .and_then(|(name, color)| color.parse::<Rgb>().ok().map(|c| (name, c)));
            match parsed {
                Some((name, color)) => {
                    colors.insert(name.to_string(), color);
                }
                None => warn!(line = lineno + 1, "ignoring malformed palette entry"),
            }
        }
        PaletteMap { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Renders the palette in its file format.
    pub fn to_text(&self) -> String {
        self.list_sorted()
            .into_iter()
            .map(|(name, color)| format!("{name}->{color}\n"))
            .collect()
    }
}

impl PaletteStore for PaletteMap {
    fn get(&self, name: &str) -> Option<Rgb> {
        self.colors.get(name).copied()
    }

    fn put(&mut self, name: &str, color: Rgb) {
        self.colors.insert(name.to_string(), color);
    }

    fn list_sorted(&self) -> Vec<(&str, Rgb)> {
        self.colors.iter().map(|(k, v)| (k.as_str(), *v)).collect()
    }
}

/// A palette loaded from, and saved back to, a file.
#[derive(Debug)]
pub struct FilePalette {
    path: PathBuf,
    map: PaletteMap,
}

impl FilePalette {
    /// Loads the palette at `path`. A missing file yields an empty palette.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let map = match fs::read_to_string(&path) {
            Ok(text) => PaletteMap::parse(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => PaletteMap::default(),
            Err(e) => return Err(FlameError::io(path, e)),
        };
        debug!(path = %path.display(), entries = map.len(), "loaded palette");
        Ok(FilePalette { path, map })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes every entry back to the file, sorted by name.
    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, self.map.to_text()).map_err(|e| FlameError::io(&self.path, e))?;
        debug!(path = %self.path.display(), entries = self.map.len(), "saved palette");
        Ok(())
    }
}

impl PaletteStore for FilePalette {
    fn get(&self, name: &str) -> Option<Rgb> {
        self.map.get(name)
    }

    fn put(&mut self, name: &str, color: Rgb) {
        self.map.put(name, color);
    }

    fn list_sorted(&self) -> Vec<(&str, Rgb)> {
        self.map.list_sorted()
    }
}
