//! Display colors for fingerprints.
//!
//! Each fingerprint maps to a pastel hue so neighbouring clusters with
//! different formulas are easy to tell apart.

use serde::Serialize;
use std::fmt;

use super::fingerprint::Fingerprint;

const SATURATION: f64 = 0.35;
const VALUE: f64 = 0.92;

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub fn color_for(fingerprint: Fingerprint) -> Color {
    rgb_from_hsv((fingerprint.0 % 360) as f64, SATURATION, VALUE)
}

/// Convert hue in `[0, 360)`, saturation and value in `[0, 1]` to RGB.
pub fn rgb_from_hsv(h: f64, s: f64, v: f64) -> Color {
    let h = h.rem_euclid(360.0);
    let hprime = h / 60.0;
    let c = v * s;
    let x = c * (1.0 - (hprime % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match hprime as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let channel = |value: f64| ((value + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Color {
        r: channel(r),
        g: channel(g),
        b: channel(b),
    }
}
