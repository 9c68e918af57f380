//! Colours for the host: engine colour tags → ratatui Color, btop-style theme files.

use blockfall::{COLOR_TAGS, ColorTag};
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Piece colours by tag plus the few UI colours the host draws with.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Indexed by colour tag: cyan, yellow, magenta, green, red, blue, orange, grey.
    pub pieces: [Color; COLOR_TAGS],
    /// Arena background.
    pub bg: Color,
    /// Border.
    pub div_line: Color,
    /// Sidebar text.
    pub main_fg: Color,
    /// Titles.
    pub title: Color,
    /// Flash colour when the arena is wiped.
    pub flash: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

/// Block colours of the classic page animation.
const CLASSIC: [Color; COLOR_TAGS] = [
    Color::Rgb(0x00, 0xFF, 0xFF),
    Color::Rgb(0xFF, 0xFF, 0x00),
    Color::Rgb(0xFF, 0x00, 0xFF),
    Color::Rgb(0x00, 0xFF, 0x00),
    Color::Rgb(0xFF, 0x00, 0x00),
    Color::Rgb(0x00, 0x00, 0xFF),
    Color::Rgb(0xFF, 0xA5, 0x00),
    Color::Rgb(0x9A, 0xA0, 0xA6),
];

impl Theme {
    pub fn classic() -> Self {
        Self {
            pieces: CLASSIC,
            bg: Color::Rgb(0x10, 0x12, 0x18),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
            flash: Color::Rgb(0xFF, 0xFF, 0xFF),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// No path or a missing file gives the built-in colours.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) if p.exists() => {
                let s = std::fs::read_to_string(p)?;
                Self::from_map(&parse_theme_file(&s))
            }
            _ => Self::classic(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    /// Override piece colours for high-contrast or colorblind use.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.pieces = [
                    Color::Rgb(0x00, 0xFF, 0xFF),
                    Color::Rgb(0xFF, 0xFF, 0x00),
                    Color::Rgb(0xFF, 0x00, 0xFF),
                    Color::Rgb(0x00, 0xFF, 0x00),
                    Color::Rgb(0xFF, 0x00, 0x00),
                    Color::Rgb(0x00, 0x88, 0xFF),
                    Color::Rgb(0xFF, 0x88, 0x00),
                    Color::Rgb(0xFF, 0xFF, 0xFF),
                ];
                self.bg = Color::Rgb(0, 0, 0);
            }
            crate::Palette::Colorblind => {
                // Tol bright/vibrant: no red/green pairs
                self.pieces = [
                    Color::Rgb(0x33, 0xBB, 0xEE),
                    Color::Rgb(0xCC, 0xBB, 0x44),
                    Color::Rgb(0xEE, 0x33, 0x77),
                    Color::Rgb(0x00, 0x99, 0x88),
                    Color::Rgb(0xCC, 0x33, 0x11),
                    Color::Rgb(0x00, 0x77, 0xBB),
                    Color::Rgb(0xEE, 0x77, 0x33),
                    Color::Rgb(0xBB, 0xBB, 0xBB),
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let base = Self::classic();
        let get = |key: &str, fallback: Color| {
            map.get(key)
                .and_then(|v| parse_hex(v).ok())
                .unwrap_or(fallback)
        };
        let mut pieces = base.pieces;
        for (tag, color) in pieces.iter_mut().enumerate() {
            *color = get(&format!("piece_{tag}"), *color);
        }
        Self {
            pieces,
            bg: get("main_bg", get("meter_bg", base.bg)),
            div_line: get("div_line", base.div_line),
            main_fg: get("main_fg", base.main_fg),
            title: get("title", base.title),
            flash: get("hi_fg", base.flash),
        }
    }

    /// Colour for an arena or piece tag.
    #[inline]
    pub fn piece_color(&self, tag: ColorTag) -> Color {
        self.pieces[(tag as usize) % COLOR_TAGS]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let bad = || ThemeError::InvalidHex(s.to_string());
    let channel = |i: usize, n: usize| u8::from_str_radix(s.get(i..i + n).ok_or_else(bad)?, 16).map_err(|_| bad());
    match s.len() {
        6 => Ok(Color::Rgb(channel(0, 2)?, channel(2, 2)?, channel(4, 2)?)),
        3 => Ok(Color::Rgb(
            channel(0, 1)? * 17,
            channel(1, 1)? * 17,
            channel(2, 1)? * 17,
        )),
        _ => Err(bad()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        assert!(matches!(parse_hex("#98C379"), Ok(Color::Rgb(0x98, 0xC3, 0x79))));
    }

    #[test]
    fn test_parse_hex_3() {
        assert!(matches!(parse_hex("#FFF"), Ok(Color::Rgb(255, 255, 255))));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12").is_err());
        assert!(parse_hex("#GGGGGG").is_err());
    }

    #[test]
    fn test_theme_file_overrides_piece_tag() {
        let map = parse_theme_file("# comment\ntheme[piece_3]=\"#112233\"\ntheme[div_line]='#445566'\n");
        let theme = Theme::from_map(&map);
        assert_eq!(theme.piece_color(3), Color::Rgb(0x11, 0x22, 0x33));
        assert_eq!(theme.div_line, Color::Rgb(0x44, 0x55, 0x66));
        assert_eq!(theme.piece_color(0), CLASSIC[0]);
    }

    #[test]
    fn test_every_tag_has_a_colour() {
        let theme = Theme::default();
        for tag in 0..COLOR_TAGS as u8 {
            assert_eq!(theme.piece_color(tag), CLASSIC[tag as usize]);
        }
    }
}
