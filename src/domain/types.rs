//! Shared domain types.
//!
//! These types are kept small and serializable so they can be read from the
//! study configuration, flow through the fitting code and end up in exports.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Motor-side encoder position column (radians, before the gear reduction).
pub const ENCODER_POS_COLUMN: &str = "encoder_pos_rad";
/// Output torque column (Nm).
pub const OUTPUT_TORQUE_COLUMN: &str = "output_torque_Nm";

/// Columns every stiffness measurement file must provide.
pub const STIFFNESS_COLUMNS: [&str; 2] = [ENCODER_POS_COLUMN, OUTPUT_TORQUE_COLUMN];

/// Which half of the torque axis a fit covers.
///
/// Both sides are strict: a row with torque exactly `0.0` belongs to neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Positive,
    Negative,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Positive, Side::Negative];

    pub fn contains(self, x: f64) -> bool {
        match self {
            Side::Positive => x > 0.0,
            Side::Negative => x < 0.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Side::Positive => "+",
            Side::Negative => "−",
        }
    }
}

/// An sRGB color as written in the study configuration.
///
/// Accepts `#rrggbb` or one of a handful of names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLUE: Rgb = Rgb(0, 0, 255);
    pub const RED: Rgb = Rgb(255, 0, 0);

    /// Default categorical cycle (tab10), used for grouped series.
    pub const CYCLE: [Rgb; 6] = [
        Rgb(0x1f, 0x77, 0xb4),
        Rgb(0xff, 0x7f, 0x0e),
        Rgb(0x2c, 0xa0, 0x2c),
        Rgb(0xd6, 0x27, 0x28),
        Rgb(0x94, 0x67, 0xbd),
        Rgb(0x8c, 0x56, 0x4b),
    ];

    pub fn cycle(index: usize) -> Rgb {
        Self::CYCLE[index % Self::CYCLE.len()]
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let named = match s.to_ascii_lowercase().as_str() {
            "blue" => Some(Rgb::BLUE),
            "red" => Some(Rgb::RED),
            "green" => Some(Rgb(0, 128, 0)),
            "orange" => Some(Rgb(255, 165, 0)),
            "purple" => Some(Rgb(128, 0, 128)),
            "cyan" => Some(Rgb(0, 255, 255)),
            "black" => Some(Rgb(0, 0, 0)),
            "white" => Some(Rgb(255, 255, 255)),
            _ => None,
        };
        if let Some(color) = named {
            return Ok(color);
        }

        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| format!("Invalid color '{s}'. Expected #rrggbb or a color name."))?;
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Caller-supplied chart decoration.
///
/// Font sizes are in points and the line width in pixels of the rendering
/// backend; the terminal backend rounds the width to whole cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub axis_label_size: u32,
    pub tick_label_size: u32,
    pub legend_size: u32,
    pub line_width: f64,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            axis_label_size: 18,
            tick_label_size: 16,
            legend_size: 16,
            line_width: 3.0,
        }
    }
}

impl ChartStyle {
    /// Stroke width for Plotters, which only takes whole pixels.
    pub fn stroke_width(&self) -> u32 {
        if self.line_width.is_finite() {
            self.line_width.round().max(1.0) as u32
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_torque_is_on_neither_side() {
        assert!(!Side::Positive.contains(0.0));
        assert!(!Side::Negative.contains(0.0));
        assert!(!Side::Positive.contains(-0.0));
        assert!(Side::Positive.contains(1e-12));
        assert!(Side::Negative.contains(-1e-12));
        assert!(!Side::Positive.contains(f64::NAN));
        assert!(!Side::Negative.contains(f64::NAN));
    }

    #[test]
    fn rgb_parses_hex_and_names() {
        assert_eq!("#1f77b4".parse::<Rgb>().unwrap(), Rgb(0x1f, 0x77, 0xb4));
        assert_eq!("Blue".parse::<Rgb>().unwrap(), Rgb::BLUE);
        assert_eq!(Rgb(0xd6, 0x27, 0x28).to_string(), "#d62728");
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("chartreuse-ish".parse::<Rgb>().is_err());
    }

    #[test]
    fn stroke_width_rounds_to_at_least_one() {
        let mut style = ChartStyle::default();
        assert_eq!(style.stroke_width(), 3);
        style.line_width = 0.2;
        assert_eq!(style.stroke_width(), 1);
        style.line_width = f64::NAN;
        assert_eq!(style.stroke_width(), 1);
    }
}
