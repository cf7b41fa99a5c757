use serde::{Deserialize, Serialize};

/// Opaque ink color. Ink is always painted at full opacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_rgba_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }

    /// Parse `#rrggbb`, `#rgb` or `rgb(r, g, b)`.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Some(hex) = input.strip_prefix('#') {
            return parse_hex(hex);
        }
        let inner = input
            .strip_prefix("rgb(")
            .or_else(|| input.strip_prefix("RGB("))?
            .strip_suffix(')')?;
        let mut channels = inner.split(',').map(|c| c.trim().parse::<u8>());
        let r = channels.next()?.ok()?;
        let g = channels.next()?.ok()?;
        let b = channels.next()?.ok()?;
        if channels.next().is_some() {
            return None;
        }
        Some(Self::rgb(r, g, b))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some(Color::rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        3 => {
            let expand = |s: &str| channel(s).map(|v| v * 17);
            Some(Color::rgb(
                expand(&hex[0..1])?,
                expand(&hex[1..2])?,
                expand(&hex[2..3])?,
            ))
        }
        _ => None,
    }
}

/// Pointer location in surface pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Screen position of an overlay annotation. Fractional because anchors are
/// bounding-box centers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Position {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn parses_css_rgb_and_hex_forms() {
        assert_eq!(Color::parse("rgb(255, 255, 255)"), Some(Color::WHITE));
        assert_eq!(Color::parse("#ee3333"), Some(Color::rgb(0xee, 0x33, 0x33)));
        assert_eq!(Color::parse("#fff"), Some(Color::WHITE));
        assert_eq!(Color::parse(" rgb(1,2,3) "), Some(Color::rgb(1, 2, 3)));
    }

    #[test]
    fn rejects_malformed_colors() {
        assert_eq!(Color::parse("rgb(256, 0, 0)"), None);
        assert_eq!(Color::parse("rgb(1, 2)"), None);
        assert_eq!(Color::parse("rgb(1, 2, 3, 4)"), None);
        assert_eq!(Color::parse("#12345"), None);
        assert_eq!(Color::parse("blue"), None);
    }

    #[test]
    fn ink_is_always_opaque() {
        assert_eq!(Color::rgb(10, 20, 30).to_rgba_array(), [10, 20, 30, 255]);
    }
}
