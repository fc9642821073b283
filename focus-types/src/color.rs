//! Background colors and the text color that contrasts with them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Black text, used on light backgrounds.
pub const BLACK: &str = "#000000";
/// White text, used on dark backgrounds and for malformed input.
pub const WHITE: &str = "#ffffff";

/// A validated `#RRGGBB` color, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    /// Parses `#RRGGBB` (case-insensitive). Surrounding whitespace is ignored.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('#')
            .ok_or_else(|| Error::InvalidColor(s.to_string()))?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidColor(s.to_string()));
        }
        Ok(Self(format!("#{}", digits.to_ascii_lowercase())))
    }

    /// The default launcher background.
    #[must_use]
    pub fn black() -> Self {
        Self(BLACK.to_string())
    }

    /// Returns the normalized `#rrggbb` string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the red, green and blue channels.
    #[must_use]
    pub fn rgb(&self) -> (u8, u8, u8) {
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&self.0[range], 16).unwrap_or_default()
        };
        (channel(1..3), channel(3..5), channel(5..7))
    }

    /// Relative luminance in `[0, 1]`: `(0.299 R + 0.587 G + 0.114 B) / 255`.
    #[must_use]
    pub fn luminance(&self) -> f64 {
        let (r, g, b) = self.rgb();
        let weighted = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
        (weighted / 255.0).clamp(0.0, 1.0)
    }

    /// Text color that contrasts with this background.
    #[must_use]
    pub fn text_color(&self) -> &'static str {
        if self.luminance() > 0.5 { BLACK } else { WHITE }
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self::black()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HexColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HexColor {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0
    }
}

/// Returns the text color for a raw background string.
///
/// Malformed input never fails: it yields white text.
#[must_use]
pub fn text_color_for(background: &str) -> &'static str {
    HexColor::parse(background).map_or(WHITE, |c| c.text_color())
}
