use crate::color::{Background, Scheme};
use crate::error::{FlameError, Result};
use crate::nameattr::NameAttrs;
use crate::parse::ParseOptions;

/// Everything that controls how a flame graph is built and drawn.
#[derive(Debug, Clone)]
pub struct Options {
    /// Width of the image in pixels.
    pub image_width: f64,
    /// Height of each frame in pixels.
    pub frame_height: f64,
    pub font_type: String,
    pub font_size: f64,
    /// Average glyph width as a fraction of the font size.
    pub font_width: f64,
    /// Frames narrower than this many pixels are omitted.
    pub min_width: f64,
    /// Overrides the mode-dependent default title.
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub name_type: String,
    pub count_name: String,
    pub name_attrs: NameAttrs,
    /// Overrides the computed total time, when larger.
    pub total: Option<f64>,
    /// Multiplier applied to displayed counts.
    pub factor: f64,
    pub colors: Scheme,
    /// Background; defaults depend on `colors`.
    pub bg_colors: Option<Background>,
    /// Derive colors from function names instead of drawing them at random.
    pub hash: bool,
    pub reverse: bool,
    pub inverted: bool,
    pub flame_chart: bool,
    pub negate: bool,
    pub notes: String,
    pub encoding: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            image_width: 1200.0,
            frame_height: 16.0,
            font_type: "Verdana".to_string(),
            font_size: 12.0,
            font_width: 0.59,
            min_width: 0.1,
            title: None,
            subtitle: None,
            name_type: "Function:".to_string(),
            count_name: "samples".to_string(),
            name_attrs: NameAttrs::default(),
            total: None,
            factor: 1.0,
            colors: Scheme::default(),
            bg_colors: None,
            hash: false,
            reverse: false,
            inverted: false,
            flame_chart: false,
            negate: false,
            notes: String::new(),
            encoding: None,
        }
    }
}

impl Options {
    pub fn validate(&self) -> Result<()> {
        if self.notes.contains(['<', '>']) {
            return Err(FlameError::InvalidConfig(
                "notes can't contain '<' or '>'".to_string(),
            ));
        }
        for (name, value) in [
            ("width", self.image_width),
            ("height", self.frame_height),
            ("fontsize", self.font_size),
            ("fontwidth", self.font_width),
            ("factor", self.factor),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(FlameError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !(self.min_width.is_finite() && self.min_width >= 0.0) {
            return Err(FlameError::InvalidConfig(format!(
                "minwidth must not be negative, got {}",
                self.min_width
            )));
        }
        Ok(())
    }

    pub fn title(&self) -> &str {
        match &self.title {
            Some(title) => title,
            None if self.flame_chart => "Flame Chart",
            None if self.inverted => "Icicle Graph",
            None => "Flame Graph",
        }
    }

    pub fn background(&self) -> Background {
        self.bg_colors
            .clone()
            .unwrap_or_else(|| Background::default_for(self.colors))
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            reverse_stacks: self.reverse,
            flame_chart: self.flame_chart,
        }
    }
}
