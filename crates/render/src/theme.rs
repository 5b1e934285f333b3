//! Legible text colour for a configurable background.
//!
//! Uses WCAG 2.x relative luminance and contrast ratio: the text colour is
//! black or white, whichever contrasts more with the background.

use std::fmt;
use std::str::FromStr;

use crate::error::RenderError;

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rgb` or `#rrggbb` (the `#` is optional).
    pub fn parse_hex(input: &str) -> Result<Self, RenderError> {
        let invalid = || RenderError::InvalidColor(input.to_string());
        let hex = input.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

        match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..=i].repeat(2));
                Ok(Self::new(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }

    /// Relative luminance in `[0, 1]`.
    pub fn relative_luminance(&self) -> f64 {
        0.2126 * linearize(self.r) + 0.7152 * linearize(self.g) + 0.0722 * linearize(self.b)
    }
}

impl FromStr for Rgb {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgb::parse_hex(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// WCAG contrast ratio between two colours, in `[1, 21]`.
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let (la, lb) = (a.relative_luminance(), b.relative_luminance());
    let (light, dark) = if la >= lb { (la, lb) } else { (lb, la) };
    (light + 0.05) / (dark + 0.05)
}

/// Picks black or white text for `background`. Ties go to black.
pub fn contrast_text(background: Rgb) -> Rgb {
    if contrast_ratio(background, Rgb::BLACK) >= contrast_ratio(background, Rgb::WHITE) {
        Rgb::BLACK
    } else {
        Rgb::WHITE
    }
}

/// Parses a background colour and returns the text colour as `#rrggbb`.
pub fn contrast_text_hex(background: &str) -> Result<String, RenderError> {
    Ok(contrast_text(Rgb::parse_hex(background)?).to_string())
}

fn linearize(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
