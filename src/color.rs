//! Colour scale mapping aggregate values to a multi-stop gradient.
//!
//! The scale is validated once, at configuration time; mapping a value can't fail.
//!
//! # Example
//!
//! ```rust
//! use turizem::color::{ColorScale, Curve, Rgb};
//!
//! let scale = ColorScale::new(
//!     0.0,
//!     1000.0,
//!     vec![Rgb::parse_hex("#41e786").unwrap(), Rgb::parse_hex("#d16135").unwrap()],
//!     Curve::Linear,
//!     Rgb::new(224, 224, 224),
//! )
//! .unwrap();
//!
//! // Zero visits is the no-data sentinel, not the low end of the gradient.
//! assert_eq!(scale.map_value(0.0), Rgb::new(224, 224, 224));
//! assert_eq!(scale.map_value(1000.0), Rgb::new(0xd1, 0x61, 0x35));
//! ```

use crate::error::ColorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default exponent of the power curve (square-root response).
pub const DEFAULT_EXPONENT: f64 = 0.5;

/// Opaque RGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`; the alpha byte is ignored.
    pub fn parse_hex(s: &str) -> Result<Self, ColorError> {
        let t = s.trim();
        let body = t.strip_prefix('#').unwrap_or(t);
        if !(body.len() == 6 || body.len() == 8) || !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidFormat(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&body[i..i + 2], 16)
                .map_err(|_| ColorError::InvalidFormat(s.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl fmt::Display for Rgb {
    /// CSS form: `rgb(r,g,b)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// A colour as written in configuration: hex string or `[r, g, b]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Hex(String),
    Triple([u8; 3]),
}

impl ColorSpec {
    pub fn to_rgb(&self) -> Result<Rgb, ColorError> {
        match self {
            ColorSpec::Hex(s) => Rgb::parse_hex(s),
            ColorSpec::Triple([r, g, b]) => Ok(Rgb::new(*r, *g, *b)),
        }
    }
}

impl From<&str> for ColorSpec {
    fn from(s: &str) -> Self {
        ColorSpec::Hex(s.to_string())
    }
}

/// Response curve applied to the normalized value before gradient lookup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Curve {
    Linear,
    /// `t^exponent`; exponents below 1 spread out the low end.
    Power(f64),
    /// `log10(v + 1) / log10(max + 1)`, ignoring `min`.
    Log,
}

/// One sample of the legend gradient.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LegendStop {
    /// Position along the gradient, 0..=1.
    pub t: f64,
    /// Data value that maps to `t` under the scale's curve.
    pub value: f64,
    pub color: Rgb,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColorScale {
    min: f64,
    max: f64,
    stops: Vec<Rgb>,
    curve: Curve,
    no_data: Rgb,
}

fn clamp01(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// Linear interpolation per channel, rounded to the nearest integer.
pub fn lerp(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let t = clamp01(t);
    let ch = |x: u8, y: u8| ((y as f64 - x as f64) * t + x as f64).round().clamp(0.0, 255.0) as u8;
    Rgb::new(ch(a.r, b.r), ch(a.g, b.g), ch(a.b, b.b))
}

impl ColorScale {
    pub fn new(
        min: f64,
        max: f64,
        stops: Vec<Rgb>,
        curve: Curve,
        no_data: Rgb,
    ) -> Result<Self, ColorError> {
        if stops.len() < 2 {
            return Err(ColorError::TooFewStops(stops.len()));
        }
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(ColorError::InvalidRange { min, max });
        }
        if let Curve::Power(e) = curve
            && (!e.is_finite() || e <= 0.0)
        {
            return Err(ColorError::InvalidExponent(e));
        }
        Ok(Self {
            min,
            max,
            stops,
            curve,
            no_data,
        })
    }

    /// Same stops and curve over a different value range.
    pub fn with_range(&self, min: f64, max: f64) -> Result<Self, ColorError> {
        Self::new(min, max, self.stops.clone(), self.curve, self.no_data)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn stops(&self) -> &[Rgb] {
        &self.stops
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    pub fn no_data(&self) -> Rgb {
        self.no_data
    }

    /// Gradient position of `value` after the response curve, in 0..=1.
    pub fn position(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        let linear = if span > 0.0 {
            clamp01((value - self.min) / span)
        } else if value >= self.max {
            1.0
        } else {
            0.0
        };
        match self.curve {
            Curve::Linear => linear,
            Curve::Power(e) => linear.powf(e),
            Curve::Log => {
                let denom = (self.max + 1.0).log10();
                if denom > 0.0 {
                    clamp01((value + 1.0).log10() / denom)
                } else {
                    0.0
                }
            }
        }
    }

    /// Fill colour for an aggregate value. Exactly 0 is the no-data sentinel.
    pub fn map_value(&self, value: f64) -> Rgb {
        if value == 0.0 {
            return self.no_data;
        }
        self.color_at(self.position(value))
    }

    /// Gradient colour at position `t`, independent of any data value.
    pub fn color_at(&self, t: f64) -> Rgb {
        let t = clamp01(t);
        let n = self.stops.len() - 1;
        let nf = n as f64;
        let s = ((t * nf).floor() as usize).min(n - 1);
        let local = (t - s as f64 / nf) * nf;
        lerp(self.stops[s], self.stops[s + 1], local)
    }

    /// Inverse of [`position`](Self::position): the data value placed at `t`.
    pub fn value_at(&self, t: f64) -> f64 {
        let t = clamp01(t);
        let span = self.max - self.min;
        match self.curve {
            Curve::Linear => self.min + t * span,
            Curve::Power(e) => self.min + t.powf(1.0 / e) * span,
            Curve::Log => 10f64.powf(t * (self.max + 1.0).log10()) - 1.0,
        }
    }

    /// `steps` evenly spaced samples from the low to the high end of the gradient.
    pub fn legend(&self, steps: usize) -> Vec<LegendStop> {
        let last = steps.saturating_sub(1).max(1) as f64;
        (0..steps)
            .map(|i| {
                let t = i as f64 / last;
                LegendStop {
                    t,
                    value: self.value_at(t),
                    color: self.color_at(t),
                }
            })
            .collect()
    }
}
