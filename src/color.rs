//! Frame coloring.
//!
//! A color is picked in two steps: a [`VectorSource`] turns the frame name
//! into three numbers in `[0, 1]`, and the [`Scheme`] maps those numbers to
//! an RGB triple inside a fixed hue band. Differential input bypasses both
//! and colors by delta instead.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;

use crate::error::FlameError;
use crate::palette::PaletteStore;

static JAVA_PACKAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^L?(java|javax|jdk|net|org|com|io|sun)/").expect("valid regex")
});
static JS_SOURCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/.*\.js").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = FlameError;

    /// Parses the `rgb(r,g,b)` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || FlameError::InvalidConfig(format!("invalid color {s:?}"));
        let inner = s
            .trim()
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(bad)?;
        let parts: Vec<u8> = inner
            .split(',')
            .map(|p| p.trim().parse::<u8>())
            .collect::<Result<_, _>>()
            .map_err(|_| bad())?;
        match parts.as_slice() {
            [r, g, b] => Ok(Rgb::new(*r, *g, *b)),
            _ => Err(bad()),
        }
    }
}

/// A fixed hue band; every language-aware scheme resolves to one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    Aqua,
    Orange,
}

impl Family {
    pub fn color(self, v1: f64) -> Rgb {
        match self {
            Family::Red => {
                let x = band(50, 80.0, v1);
                Rgb::new(band(200, 55.0, v1), x, x)
            }
            Family::Green => {
                let x = band(50, 60.0, v1);
                Rgb::new(x, band(200, 55.0, v1), x)
            }
            Family::Blue => {
                let x = band(80, 60.0, v1);
                Rgb::new(x, x, band(205, 50.0, v1))
            }
            Family::Yellow => {
                let x = band(175, 55.0, v1);
                Rgb::new(x, x, band(50, 20.0, v1))
            }
            Family::Purple => {
                let x = band(190, 65.0, v1);
                Rgb::new(x, band(80, 60.0, v1), x)
            }
            Family::Aqua => {
                let gb = band(165, 55.0, v1);
                Rgb::new(band(50, 60.0, v1), gb, gb)
            }
            Family::Orange => Rgb::new(band(190, 65.0, v1), band(90, 65.0, v1), 0),
        }
    }
}

/// The `colors` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    #[default]
    Hot,
    Mem,
    Io,
    Java,
    Perl,
    Js,
    Wakeup,
    Chain,
    Named(Family),
}

impl FromStr for Scheme {
    type Err = FlameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "hot" => Scheme::Hot,
            "mem" => Scheme::Mem,
            "io" => Scheme::Io,
            "java" => Scheme::Java,
            "perl" => Scheme::Perl,
            "js" => Scheme::Js,
            "wakeup" => Scheme::Wakeup,
            "chain" => Scheme::Chain,
            "red" => Scheme::Named(Family::Red),
            "green" => Scheme::Named(Family::Green),
            "blue" => Scheme::Named(Family::Blue),
            "yellow" => Scheme::Named(Family::Yellow),
            "purple" => Scheme::Named(Family::Purple),
            "aqua" => Scheme::Named(Family::Aqua),
            "orange" => Scheme::Named(Family::Orange),
            other => {
                return Err(FlameError::InvalidConfig(format!(
                    "unrecognized colors option {other:?}"
                )));
            }
        })
    }
}

impl Scheme {
    /// Computes the color of `name` from its vector.
    pub fn color(self, name: &str, (v1, v2, v3): (f64, f64, f64)) -> Rgb {
        match self {
            Scheme::Hot => Rgb::new(band(205, 50.0, v3), band(0, 230.0, v1), band(0, 55.0, v2)),
            Scheme::Mem => Rgb::new(0, band(190, 50.0, v2), band(0, 210.0, v1)),
            Scheme::Io => {
                let rg = band(80, 60.0, v1);
                Rgb::new(rg, rg, band(190, 55.0, v2))
            }
            _ => self.family(name).color(v1),
        }
    }

    /// Classifies a frame into a hue band. Base schemes have none and map to red.
    pub fn family(self, name: &str) -> Family {
        match self {
            Scheme::Named(family) => family,
            Scheme::Java => {
                if name.ends_with("_[j]") {
                    Family::Green
                } else if name.ends_with("_[i]") {
                    Family::Aqua
                } else if JAVA_PACKAGE.is_match(name) || name.contains(":::") {
                    Family::Green
                } else if name.contains("::") {
                    Family::Yellow
                } else if name.ends_with("_[k]") {
                    Family::Orange
                } else {
                    Family::Red
                }
            }
            Scheme::Perl => {
                if name.contains("::") {
                    Family::Yellow
                } else if name.contains("Perl") || name.contains(".pl") {
                    Family::Green
                } else if name.ends_with("_[k]") {
                    Family::Orange
                } else {
                    Family::Red
                }
            }
            Scheme::Js => {
                if name.ends_with("_[j]") {
                    if name.contains('/') {
                        Family::Green
                    } else {
                        Family::Aqua
                    }
                } else if name.contains("::") {
                    Family::Yellow
                } else if JS_SOURCE.is_match(name) {
                    Family::Green
                } else if name.contains(':') {
                    Family::Aqua
                } else if name == " " {
                    Family::Green
                } else if name.contains("_[k]") {
                    Family::Orange
                } else {
                    Family::Red
                }
            }
            Scheme::Wakeup => Family::Aqua,
            Scheme::Chain => {
                if name.contains("_[w]") {
                    Family::Aqua
                } else {
                    Family::Blue
                }
            }
            Scheme::Hot | Scheme::Mem | Scheme::Io => Family::Red,
        }
    }
}

/// The `bgcolors` option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Background {
    Yellow,
    Blue,
    Green,
    Grey,
    Flat(String),
}

impl Background {
    /// The background used when none is configured.
    pub fn default_for(scheme: Scheme) -> Self {
        match scheme {
            Scheme::Mem => Background::Green,
            Scheme::Io | Scheme::Wakeup | Scheme::Chain => Background::Blue,
            Scheme::Named(_) => Background::Grey,
            _ => Background::Yellow,
        }
    }

    /// Top and bottom stops of the background gradient.
    pub fn gradient(&self) -> (&str, &str) {
        match self {
            Background::Yellow => ("#eeeeee", "#eeeeb0"),
            Background::Blue => ("#eeeeee", "#e0e0ff"),
            Background::Green => ("#eef2ee", "#e0ffe0"),
            Background::Grey => ("#f8f8f8", "#e8e8e8"),
            Background::Flat(hex) => (hex.as_str(), hex.as_str()),
        }
    }
}

impl FromStr for Background {
    type Err = FlameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yellow" => Ok(Background::Yellow),
            "blue" => Ok(Background::Blue),
            "green" => Ok(Background::Green),
            "grey" | "gray" => Ok(Background::Grey),
            hex if is_hex_color(hex) => Ok(Background::Flat(hex.to_string())),
            other => Err(FlameError::InvalidConfig(format!(
                "unrecognized bgcolor option {other:?}"
            ))),
        }
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7
        && s.starts_with('#')
        && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

fn band(base: u8, span: f64, v: f64) -> u8 {
    (f64::from(base) + (span * v).floor()) as u8
}

/// Hash of a frame name into `(0, 1]`, weighting the first characters most.
///
/// Any module prefix up to a backtick is ignored, so the same function gets
/// the same color in different modules.
pub fn namehash(name: &str) -> f64 {
    let name = name.split_once('`').map_or(name, |(_, rest)| rest);

    let mut vector = 0.0;
    let mut weight = 1.0;
    let mut max = 1.0;
    let mut modulo = 10u32;

    for c in name.chars() {
        let idx = u32::from(c) % modulo;
        vector += (f64::from(idx) / f64::from(modulo - 1)) * weight;
        modulo += 1;
        max += weight;
        weight *= 0.70;
        if modulo > 12 {
            break;
        }
    }
    1.0 - vector / max
}

/// Produces the `(v1, v2, v3)` vector a scheme colors from.
pub trait VectorSource {
    fn vector_for(&mut self, name: &str) -> (f64, f64, f64);
}

/// Stable colors: derived from the name (and the reversed name).
#[derive(Debug, Default, Clone, Copy)]
pub struct HashVector;

impl VectorSource for HashVector {
    fn vector_for(&mut self, name: &str) -> (f64, f64, f64) {
        let reversed: String = name.chars().rev().collect();
        let v2 = namehash(&reversed);
        (namehash(name), v2, v2)
    }
}

/// Fresh uniform draws for every frame.
#[derive(Debug)]
pub struct RandomVector {
    rng: StdRng,
}

impl RandomVector {
    pub fn new() -> Self {
        RandomVector {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        RandomVector {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomVector {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorSource for RandomVector {
    fn vector_for(&mut self, _name: &str) -> (f64, f64, f64) {
        (self.rng.random(), self.rng.random(), self.rng.random())
    }
}

/// Differential color: white at zero, red for growth, blue for shrinkage.
pub fn color_scale(delta: f64, max_delta: f64, negate: bool) -> Rgb {
    let value = if negate { -delta } else { delta };
    if value > 0.0 {
        let gb = (210.0 * (max_delta - value) / max_delta) as u8;
        Rgb::new(255, gb, gb)
    } else if value < 0.0 {
        let rg = (210.0 * (max_delta + value) / max_delta) as u8;
        Rgb::new(rg, rg, 255)
    } else {
        Rgb::WHITE
    }
}

/// Picks the fill color of every frame for one build.
pub struct ColorAssigner<'a> {
    scheme: Scheme,
    vectors: Box<dyn VectorSource>,
    max_delta: f64,
    negate: bool,
    palette: Option<&'a mut dyn PaletteStore>,
}

impl<'a> ColorAssigner<'a> {
    pub fn new(scheme: Scheme, vectors: Box<dyn VectorSource>) -> Self {
        ColorAssigner {
            scheme,
            vectors,
            max_delta: 0.0,
            negate: false,
            palette: None,
        }
    }

    /// Hashed vectors when `hash` is set, random ones otherwise.
    pub fn for_scheme(scheme: Scheme, hash: bool) -> Self {
        let vectors: Box<dyn VectorSource> = if hash {
            Box::new(HashVector)
        } else {
            Box::new(RandomVector::new())
        };
        Self::new(scheme, vectors)
    }

    pub fn with_deltas(mut self, max_delta: f64, negate: bool) -> Self {
        self.max_delta = max_delta;
        self.negate = negate;
        self
    }

    pub fn with_palette(mut self, palette: &'a mut dyn PaletteStore) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn color_for(&mut self, name: &str, delta: Option<f64>) -> Rgb {
        match name {
            "--" => return Rgb::new(160, 160, 160),
            "-" => return Rgb::new(200, 200, 200),
            _ => {}
        }
        if let Some(delta) = delta {
            return color_scale(delta, self.max_delta, self.negate);
        }

        let scheme = self.scheme;
        match self.palette.as_deref_mut() {
            Some(palette) => match palette.get(name) {
                Some(color) => color,
                None => {
                    let color = scheme.color(name, self.vectors.vector_for(name));
                    palette.put(name, color);
                    color
                }
            },
            None => scheme.color(name, self.vectors.vector_for(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PaletteMap;

    #[test]
    fn test_namehash_is_stable_and_bounded() {
        for name in ["main", "a", "", "java/lang/Thread.run", "ünïcode"] {
            let h = namehash(name);
            assert_eq!(h, namehash(name));
            assert!(h > 0.0 && h <= 1.0, "{name}: {h}");
        }
        assert_eq!(namehash(""), 1.0);
    }

    #[test]
    fn test_namehash_known_value() {
        // 'a' = 97: 97 % 10 = 7 -> vector = 7/9, max = 2
        let expected = 1.0 - (7.0 / 9.0) / 2.0;
        assert!((namehash("a") - expected).abs() < 1e-12);
    }

    #[test]
    fn test_namehash_ignores_module_prefix() {
        assert_eq!(namehash("libc.so`malloc"), namehash("malloc"));
    }

    #[test]
    fn test_hash_vector_is_deterministic() {
        let hot = Scheme::Hot;
        let a = hot.color("do_work", HashVector.vector_for("do_work"));
        let b = hot.color("do_work", HashVector.vector_for("do_work"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_vector_is_seedable() {
        let mut a = RandomVector::seeded(7);
        let mut b = RandomVector::seeded(7);
        assert_eq!(a.vector_for("x"), b.vector_for("x"));
        let (v1, v2, v3) = a.vector_for("x");
        for v in [v1, v2, v3] {
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_base_scheme_bounds() {
        assert_eq!(Scheme::Hot.color("f", (0.0, 0.0, 0.0)), Rgb::new(205, 0, 0));
        assert_eq!(Scheme::Hot.color("f", (1.0, 1.0, 1.0)), Rgb::new(255, 230, 55));
        assert_eq!(Scheme::Mem.color("f", (1.0, 1.0, 1.0)), Rgb::new(0, 240, 210));
        assert_eq!(Scheme::Io.color("f", (0.5, 0.5, 0.5)), Rgb::new(110, 110, 217));
    }

    #[test]
    fn test_java_classification() {
        let java = Scheme::Java;
        assert_eq!(java.family("Foo.bar_[j]"), Family::Green);
        assert_eq!(java.family("Foo.bar_[i]"), Family::Aqua);
        assert_eq!(java.family("Ljava/lang/Thread;::run"), Family::Green);
        assert_eq!(java.family("org/apache/Foo.bar"), Family::Green);
        assert_eq!(java.family("Interpreter:::call"), Family::Green);
        assert_eq!(java.family("JavaCalls::call"), Family::Yellow);
        assert_eq!(java.family("do_syscall_[k]"), Family::Orange);
        assert_eq!(java.family("start_thread"), Family::Red);
    }

    #[test]
    fn test_js_and_perl_classification() {
        assert_eq!(Scheme::Js.family("LazyCompile:~foo /app/x.js:1_[j]"), Family::Green);
        assert_eq!(Scheme::Js.family("Builtin:Call_[j]"), Family::Aqua);
        assert_eq!(Scheme::Js.family("v8::internal::Run"), Family::Yellow);
        assert_eq!(Scheme::Js.family("/srv/app.js"), Family::Green);
        assert_eq!(Scheme::Js.family(" "), Family::Green);
        assert_eq!(Scheme::Js.family("epoll_wait_[k]"), Family::Orange);
        assert_eq!(Scheme::Perl.family("Foo::bar"), Family::Yellow);
        assert_eq!(Scheme::Perl.family("script.pl"), Family::Green);
        assert_eq!(Scheme::Perl.family("read"), Family::Red);
        assert_eq!(Scheme::Chain.family("waker_[w]"), Family::Aqua);
        assert_eq!(Scheme::Chain.family("sleep"), Family::Blue);
        assert_eq!(Scheme::Wakeup.family("anything"), Family::Aqua);
    }

    #[test]
    fn test_family_colors() {
        assert_eq!(Family::Red.color(0.0), Rgb::new(200, 50, 50));
        assert_eq!(Family::Red.color(1.0), Rgb::new(255, 130, 130));
        assert_eq!(Family::Orange.color(1.0), Rgb::new(255, 155, 0));
        assert_eq!(Family::Aqua.color(0.0), Rgb::new(50, 165, 165));
    }

    #[test]
    fn test_color_scale() {
        assert_eq!(color_scale(0.0, 10.0, false), Rgb::new(255, 255, 255));
        assert_eq!(color_scale(10.0, 10.0, false), Rgb::new(255, 0, 0));
        assert_eq!(color_scale(-10.0, 10.0, false), Rgb::new(0, 0, 255));
        assert_eq!(color_scale(5.0, 10.0, false), Rgb::new(255, 105, 105));
        assert_eq!(color_scale(10.0, 10.0, true), Rgb::new(0, 0, 255));
    }

    #[test]
    fn test_scheme_and_background_parsing() {
        assert_eq!("java".parse::<Scheme>().unwrap(), Scheme::Java);
        assert_eq!("aqua".parse::<Scheme>().unwrap(), Scheme::Named(Family::Aqua));
        assert!(matches!("pink".parse::<Scheme>(), Err(FlameError::InvalidConfig(_))));

        assert_eq!("#a0b1c2".parse::<Background>().unwrap().gradient(), ("#a0b1c2", "#a0b1c2"));
        assert!("#12345".parse::<Background>().is_err());
        assert!("#zzzzzz".parse::<Background>().is_err());
        assert_eq!(Background::default_for(Scheme::Mem), Background::Green);
        assert_eq!(Background::default_for(Scheme::Chain), Background::Blue);
        assert_eq!(Background::default_for(Scheme::Named(Family::Red)), Background::Grey);
        assert_eq!(Background::default_for(Scheme::Java), Background::Yellow);
    }

    #[test]
    fn test_rgb_round_trips_through_text() {
        assert_eq!("rgb(1,22,255)".parse::<Rgb>().unwrap(), Rgb::new(1, 22, 255));
        assert!("rgb(1,2)".parse::<Rgb>().is_err());
        assert!("#ffffff".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_assigner_precedence() {
        let mut palette = PaletteMap::default();
        palette.put("cached", Rgb::new(1, 2, 3));

        let mut colors = ColorAssigner::new(Scheme::Hot, Box::new(HashVector))
            .with_deltas(4.0, false)
            .with_palette(&mut palette);

        assert_eq!(colors.color_for("--", Some(4.0)), Rgb::new(160, 160, 160));
        assert_eq!(colors.color_for("cached", Some(4.0)), Rgb::new(255, 0, 0));
        assert_eq!(colors.color_for("cached", None), Rgb::new(1, 2, 3));

        let fresh = colors.color_for("fresh", None);
        assert_eq!(fresh, Scheme::Hot.color("fresh", HashVector.vector_for("fresh")));
        drop(colors);
        assert_eq!(palette.get("fresh"), Some(fresh));
    }
}
