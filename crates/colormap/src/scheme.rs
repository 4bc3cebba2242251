//! Palettes and multi-stop interpolation engine.
//!
//! A [`PaletteSpec`] is an ordered list of colours spread evenly over a
//! numeric domain. The same spec drives rendering and legend generation.

use lulcview_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// RGB color as (r, g, b) with values in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `rrggbb` or `#rrggbb`, or one of the CSS basic colour names
    /// used by the built-in palettes.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(c) = named_color(s) {
            return Ok(c);
        }
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid_color(s));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid_color(s));
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Lowercase `rrggbb`
    pub fn to_hex(&self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_rgba(&self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

fn invalid_color(s: &str) -> Error {
    Error::InvalidParameter {
        name: "color",
        value: s.to_string(),
        reason: "expected rrggbb, #rrggbb or a CSS colour name".into(),
    }
}

fn named_color(name: &str) -> Option<Rgb> {
    let c = match name.to_ascii_lowercase().as_str() {
        "black" => Rgb::new(0, 0, 0),
        "white" => Rgb::new(255, 255, 255),
        "red" => Rgb::new(255, 0, 0),
        // CSS `green` is half intensity; `lime` is the full channel
        "green" => Rgb::new(0, 128, 0),
        "lime" => Rgb::new(0, 255, 0),
        "blue" => Rgb::new(0, 0, 255),
        "yellow" => Rgb::new(255, 255, 0),
        "orange" => Rgb::new(255, 165, 0),
        "purple" => Rgb::new(128, 0, 128),
        "gray" | "grey" => Rgb::new(128, 128, 128),
        _ => return None,
    };
    Some(c)
}

/// A color stop: position in [0, 1] mapped to an RGB color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub t: f64,
    pub color: Rgb,
}

impl ColorStop {
    pub const fn new(t: f64, r: u8, g: u8, b: u8) -> Self {
        Self {
            t,
            color: Rgb::new(r, g, b),
        }
    }
}

// ─── Interpolation engine ──────────────────────────────────────────────

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_color(c1: Rgb, c2: Rgb, t: f64) -> Rgb {
    Rgb::new(
        lerp(c1.r as f64, c2.r as f64, t).round() as u8,
        lerp(c1.g as f64, c2.g as f64, t).round() as u8,
        lerp(c1.b as f64, c2.b as f64, t).round() as u8,
    )
}

fn multi_stop(stops: &[ColorStop], t: f64) -> Rgb {
    if t <= 0.0 {
        return stops[0].color;
    }
    if t >= 1.0 {
        return stops[stops.len() - 1].color;
    }
    for i in 1..stops.len() {
        if t <= stops[i].t {
            let ratio = (t - stops[i - 1].t) / (stops[i].t - stops[i - 1].t);
            return lerp_color(stops[i - 1].color, stops[i].color, ratio);
        }
    }
    stops[stops.len() - 1].color
}

// ─── Palette spec ──────────────────────────────────────────────────────

/// Ordered colours spread evenly over `[min, max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteSpec {
    colors: Vec<Rgb>,
    min: f64,
    max: f64,
}

impl PaletteSpec {
    /// At least one colour and `min < max` are required.
    pub fn new(colors: Vec<Rgb>, min: f64, max: f64) -> Result<Self> {
        if colors.is_empty() {
            return Err(Error::InvalidParameter {
                name: "colors",
                value: "[]".into(),
                reason: "palette needs at least one colour".into(),
            });
        }
        if !(min < max) || !min.is_finite() || !max.is_finite() {
            return Err(Error::InvalidParameter {
                name: "domain",
                value: format!("[{}, {}]", min, max),
                reason: "min must be finite and less than max".into(),
            });
        }
        Ok(Self { colors, min, max })
    }

    /// Build from colour strings, see [`Rgb::parse`]
    pub fn from_strs(colors: &[&str], min: f64, max: f64) -> Result<Self> {
        let parsed = colors.iter().map(|c| Rgb::parse(c)).collect::<Result<Vec<_>>>()?;
        Self::new(parsed, min, max)
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Evenly spaced stops, first at `t = 0`, last at `t = 1`
    pub fn stops(&self) -> Vec<ColorStop> {
        let n = self.colors.len();
        self.colors
            .iter()
            .enumerate()
            .map(|(i, &color)| ColorStop {
                t: if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 },
                color,
            })
            .collect()
    }

    /// Domain value where colour `index` sits
    pub fn stop_value(&self, index: usize) -> f64 {
        let n = self.colors.len();
        if n <= 1 {
            return self.min;
        }
        self.min + (self.max - self.min) * index as f64 / (n - 1) as f64
    }

    /// Colour for `value`, linearly interpolated and clamped to the domain
    pub fn color_at(&self, value: f64) -> Rgb {
        let t = (value - self.min) / (self.max - self.min);
        multi_stop(&self.stops(), t)
    }

    /// Colour for an integer class, if the palette has one at that index
    pub fn class_color(&self, class: usize) -> Option<Rgb> {
        self.colors.get(class).copied()
    }
}

// ─── Built-in palettes ─────────────────────────────────────────────────

/// Dynamic World class colours, labels 0..=8
pub const LAND_COVER_COLORS: [&str; 9] = [
    "#419BDF", "#397D49", "#88B053", "#7A87C6", "#E49635", "#DFC35A", "#C4281B", "#A59B8F",
    "#B39FE1",
];

/// Dynamic World class names, labels 0..=8
pub const LAND_COVER_CLASSES: [&str; 9] = [
    "water",
    "trees",
    "grass",
    "flooded_vegetation",
    "crops",
    "shrub_and_scrub",
    "built",
    "bare",
    "snow_and_ice",
];

/// Water-blue through browns and yellows to deep greens
pub const NDVI_COLORS: [&str; 17] = [
    "419bdf", "ce7e45", "df923d", "f1b555", "fcd163", "99b718", "74a901", "66a000", "529400",
    "3e8601", "207401", "056201", "004c00", "023b01", "012e01", "011d01", "011301",
];

pub const NDMI_COLORS: [&str; 4] = ["red", "yellow", "green", "blue"];

/// Built-in palettes, one per index or classification layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorScheme {
    /// 9 categorical Dynamic World colours over [0, 8]
    LandCover,
    /// 17 colours over [-0.1, 0.7]
    Ndvi,
    /// Red -> Yellow -> Green -> Blue over [-0.24, 0.24]
    Ndmi,
}

impl ColorScheme {
    pub const ALL: &[ColorScheme] = &[Self::LandCover, Self::Ndvi, Self::Ndmi];

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LandCover => "Land cover",
            Self::Ndvi => "NDVI",
            Self::Ndmi => "NDMI",
        }
    }

    /// Colour strings and domain backing [`ColorScheme::palette`]
    pub fn spec(&self) -> (&'static [&'static str], f64, f64) {
        match self {
            Self::LandCover => (&LAND_COVER_COLORS, 0.0, 8.0),
            Self::Ndvi => (&NDVI_COLORS, -0.1, 0.7),
            Self::Ndmi => (&NDMI_COLORS, -0.24, 0.24),
        }
    }

    pub fn palette(&self) -> Result<PaletteSpec> {
        let (colors, min, max) = self.spec();
        PaletteSpec::from_strs(colors, min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_and_names() {
        assert_eq!(Rgb::parse("#419BDF").unwrap(), Rgb::new(0x41, 0x9b, 0xdf));
        assert_eq!(Rgb::parse("011301").unwrap(), Rgb::new(1, 0x13, 1));
        assert_eq!(Rgb::parse("Yellow").unwrap(), Rgb::new(255, 255, 0));
        assert!(Rgb::parse("#12345").is_err());
        assert!(Rgb::parse("zzzzzz").is_err());
        assert_eq!(Rgb::new(0x41, 0x9b, 0xdf).to_string(), "#419bdf");
    }

    #[test]
    fn builtin_sizes_and_domains() {
        let ndvi = ColorScheme::Ndvi.palette().unwrap();
        assert_eq!(ndvi.len(), 17);
        assert_eq!((ndvi.min(), ndvi.max()), (-0.1, 0.7));

        let ndmi = ColorScheme::Ndmi.palette().unwrap();
        assert_eq!(ndmi.len(), 4);
        assert_eq!((ndmi.min(), ndmi.max()), (-0.24, 0.24));

        let lc = ColorScheme::LandCover.palette().unwrap();
        assert_eq!(lc.len(), 9);
        assert_eq!((lc.min(), lc.max()), (0.0, 8.0));
    }

    #[test]
    fn endpoints_and_clamping() {
        let p = ColorScheme::Ndmi.palette().unwrap();
        assert_eq!(p.color_at(-0.24), Rgb::new(255, 0, 0));
        assert_eq!(p.color_at(-5.0), Rgb::new(255, 0, 0));
        assert_eq!(p.color_at(0.24), Rgb::new(0, 0, 255));
        assert_eq!(p.color_at(1.0), Rgb::new(0, 0, 255));
    }

    #[test]
    fn midpoint_interpolates() {
        let p = PaletteSpec::from_strs(&["000000", "ffffff"], 0.0, 1.0).unwrap();
        assert_eq!(p.color_at(0.5), Rgb::new(128, 128, 128));
    }

    #[test]
    fn integer_labels_hit_class_colours() {
        let p = ColorScheme::LandCover.palette().unwrap();
        for label in 0..9 {
            assert_eq!(Some(p.color_at(label as f64)), p.class_color(label));
            assert_eq!(p.stop_value(label), label as f64);
        }
        assert_eq!(p.class_color(9), None);
    }

    #[test]
    fn rejects_bad_specs() {
        assert!(PaletteSpec::new(vec![], 0.0, 1.0).is_err());
        assert!(PaletteSpec::from_strs(&["red"], 1.0, 1.0).is_err());
        assert!(PaletteSpec::from_strs(&["red", "nope"], 0.0, 1.0).is_err());
    }

    #[test]
    fn builtin_palettes_keep_every_colour() {
        for scheme in ColorScheme::ALL {
            let (colors, min, max) = scheme.spec();
            let palette = scheme.palette().unwrap();
            assert_eq!(palette.len(), colors.len(), "{}", scheme.name());
            assert_eq!((palette.min(), palette.max()), (min, max));
        }
        // One bad entry fails the whole palette instead of shrinking it
        let mut broken = NDMI_COLORS.to_vec();
        broken[2] = "greenish";
        let err = PaletteSpec::from_strs(&broken, -0.24, 0.24).unwrap_err();
        assert!(err.to_string().contains("greenish"));
    }
}
