use peniko::Color;
use serde::{Deserialize, Serialize};

/// An RGBA8 color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorRgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ColorRgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Alpha as a fraction in [0, 1].
    pub fn alpha(&self) -> f64 {
        f64::from(self.a) / 255.0
    }

    /// `#rrggbb` form, without alpha.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Multiply alpha by `opacity` (clamped to [0, 1]).
    pub fn with_opacity(self, opacity: f64) -> Self {
        let a = (f64::from(self.a) * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }
}

impl From<ColorRgba> for Color {
    fn from(color: ColorRgba) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

impl From<Color> for ColorRgba {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

/// A CSS color string as exchanged in diagram documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CssColor(String);

impl CssColor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn transparent() -> Self {
        Self::new("transparent")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into RGBA8, or `None` if the string is not understood.
    pub fn parse(&self) -> Option<ColorRgba> {
        parse_css_color(&self.0)
    }

    /// Parse into RGBA8, falling back to opaque black.
    pub fn to_rgba(&self) -> ColorRgba {
        self.parse().unwrap_or_else(|| {
            log::warn!("Unrecognized color '{}', using black", self.0);
            ColorRgba::black()
        })
    }

    /// Paint color for rendering.
    pub fn to_color(&self) -> Color {
        self.to_rgba().into()
    }

    pub fn is_transparent(&self) -> bool {
        self.parse().is_some_and(|c| c.a == 0)
    }
}

impl From<&str> for CssColor {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

fn parse_css_color(color: &str) -> Option<ColorRgba> {
    let color = color.trim();
    let lower = color.to_ascii_lowercase();

    if let Some(hex) = lower.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_args(args);
    }

    match lower.as_str() {
        "transparent" => Some(ColorRgba::transparent()),
        "black" => Some(ColorRgba::new(0, 0, 0, 255)),
        "white" => Some(ColorRgba::new(255, 255, 255, 255)),
        "red" => Some(ColorRgba::new(255, 0, 0, 255)),
        "green" => Some(ColorRgba::new(0, 128, 0, 255)),
        "blue" => Some(ColorRgba::new(0, 0, 255, 255)),
        "gray" | "grey" => Some(ColorRgba::new(128, 128, 128, 255)),
        "orange" => Some(ColorRgba::new(255, 165, 0, 255)),
        "yellow" => Some(ColorRgba::new(255, 255, 0, 255)),
        "purple" => Some(ColorRgba::new(128, 0, 128, 255)),
        _ => None,
    }
}

fn parse_hex(hex: &str) -> Option<ColorRgba> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => Some(ColorRgba::new(
            channel(&hex[0..1])? * 17,
            channel(&hex[1..2])? * 17,
            channel(&hex[2..3])? * 17,
            255,
        )),
        6 => Some(ColorRgba::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            255,
        )),
        8 => Some(ColorRgba::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            channel(&hex[6..8])?,
        )),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<ColorRgba> {
    let parts: Vec<f64> = args
        .split(',')
        .map(|p| p.trim().parse::<f64>().ok())
        .collect::<Option<_>>()?;
    let byte = |v: f64| v.clamp(0.0, 255.0).round() as u8;
    match parts.as_slice() {
        [r, g, b] => Some(ColorRgba::new(byte(*r), byte(*g), byte(*b), 255)),
        [r, g, b, a] => Some(ColorRgba::new(
            byte(*r),
            byte(*g),
            byte(*b),
            (a.clamp(0.0, 1.0) * 255.0).round() as u8,
        )),
        _ => None,
    }
}
