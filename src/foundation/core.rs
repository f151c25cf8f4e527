use crate::foundation::error::{SnapfadeError, SnapfadeResult};

pub use kurbo::{Point, Size, Vec2};

/// Opaque 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Pure magenta, the default color key.
    pub const MAGENTA: Self = Self::new(255, 0, 255);

    /// Construct a color from channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn parse_hex(s: &str) -> SnapfadeResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(SnapfadeError::validation(format!(
                "color '{s}' must be of the form #rrggbb"
            )));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| SnapfadeError::validation(format!("color '{s}': {e}")))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Lowercase `#rrggbb` representation.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// The color as a fully opaque RGBA8 pixel (identical premultiplied or straight).
    pub fn opaque(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

/// Canvas background: either left transparent or filled with an opaque color.
///
/// Serialized as the string `"transparent"` or `"#rrggbb"`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Background {
    /// No fill; the output starts fully transparent.
    #[default]
    Transparent,
    /// Opaque fill painted before any layer.
    Solid(Rgb8),
}

impl TryFrom<String> for Background {
    type Error = SnapfadeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().eq_ignore_ascii_case("transparent") {
            return Ok(Self::Transparent);
        }
        Rgb8::parse_hex(&value).map(Self::Solid)
    }
}

impl From<Background> for String {
    fn from(value: Background) -> Self {
        match value {
            Background::Transparent => "transparent".to_string(),
            Background::Solid(c) => c.to_hex(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
