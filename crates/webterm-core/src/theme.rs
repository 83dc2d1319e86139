//! Built-in terminal color themes.
//!
//! Each theme is a `{background, foreground, cursor}` triple applied to the
//! display. Names are the persisted form; anything that does not resolve maps
//! to [`ThemeId::DEFAULT`].

use std::fmt;

/// Storage key under which the selected theme name is persisted.
pub const THEME_STORAGE_KEY: &str = "webterm.theme";

/// 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from `0xRRGGBB`.
    #[must_use]
    pub const fn from_hex(packed: u32) -> Self {
        Self {
            r: ((packed >> 16) & 0xff) as u8,
            g: ((packed >> 8) & 0xff) as u8,
            b: (packed & 0xff) as u8,
        }
    }

    /// CSS form, `#rrggbb`.
    #[must_use]
    pub fn to_css(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// X11 color spec used by OSC 10/11/12, `rgb:rr/gg/bb`.
    #[must_use]
    pub fn to_xparse(self) -> String {
        format!("rgb:{:02x}/{:02x}/{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Colors applied to the terminal display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub background: Rgb,
    pub foreground: Rgb,
    pub cursor: Rgb,
}

/// Built-in theme identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeId {
    /// Dark gray background (default).
    Dark,
    /// Light background with dark text.
    Light,
    /// Solarized dark.
    Solarized,
    /// Classic Monokai.
    Monokai,
    /// Dracula.
    Dracula,
}

impl ThemeId {
    pub const DEFAULT: ThemeId = ThemeId::Dark;

    pub const ALL: [ThemeId; 5] = [
        ThemeId::Dark,
        ThemeId::Light,
        ThemeId::Solarized,
        ThemeId::Monokai,
        ThemeId::Dracula,
    ];

    /// Canonical persisted name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ThemeId::Dark => "dark",
            ThemeId::Light => "light",
            ThemeId::Solarized => "solarized",
            ThemeId::Monokai => "monokai",
            ThemeId::Dracula => "dracula",
        }
    }

    #[must_use]
    pub const fn palette(self) -> ThemePalette {
        match self {
            ThemeId::Dark => ThemePalette {
                background: Rgb::from_hex(0x1e1e1e),
                foreground: Rgb::from_hex(0xd4d4d4),
                cursor: Rgb::from_hex(0xffffff),
            },
            ThemeId::Light => ThemePalette {
                background: Rgb::from_hex(0xffffff),
                foreground: Rgb::from_hex(0x333333),
                cursor: Rgb::from_hex(0x000000),
            },
            ThemeId::Solarized => ThemePalette {
                background: Rgb::from_hex(0x002b36),
                foreground: Rgb::from_hex(0x839496),
                cursor: Rgb::from_hex(0x93a1a1),
            },
            ThemeId::Monokai => ThemePalette {
                background: Rgb::from_hex(0x272822),
                foreground: Rgb::from_hex(0xf8f8f2),
                cursor: Rgb::from_hex(0xf8f8f0),
            },
            ThemeId::Dracula => ThemePalette {
                background: Rgb::from_hex(0x282a36),
                foreground: Rgb::from_hex(0xf8f8f2),
                cursor: Rgb::from_hex(0xbd93f9),
            },
        }
    }

    /// Look up a theme by name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|theme| theme.name().eq_ignore_ascii_case(name))
    }

    /// Like [`ThemeId::from_name`], falling back to [`ThemeId::DEFAULT`].
    #[must_use]
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or(Self::DEFAULT)
    }

    /// Next theme in table order, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        let idx = Self::ALL
            .iter()
            .position(|&theme| theme == self)
            .unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl Default for ThemeId {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn default_is_dark() {
        assert_eq!(ThemeId::default(), ThemeId::Dark);
        assert_eq!(ThemeId::DEFAULT.name(), "dark");
    }

    #[test]
    fn names_round_trip_through_lookup() {
        for theme in ThemeId::ALL {
            assert_eq!(ThemeId::from_name(theme.name()), Some(theme));
        }
    }

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        assert_eq!(ThemeId::from_name("  Monokai "), Some(ThemeId::Monokai));
        assert_eq!(ThemeId::from_name("LIGHT"), Some(ThemeId::Light));
    }

    #[test]
    fn unknown_name_resolves_to_default_palette() {
        assert_eq!(ThemeId::from_name("neon"), None);
        assert_eq!(ThemeId::resolve("neon"), ThemeId::Dark);
        assert_eq!(ThemeId::resolve("").palette(), ThemeId::Dark.palette());
    }

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = ThemeId::ALL.iter().map(|theme| theme.name()).collect();
        assert_eq!(names.len(), ThemeId::ALL.len());
    }

    #[test]
    fn next_cycles_through_every_theme() {
        let mut theme = ThemeId::DEFAULT;
        let mut seen = Vec::new();
        for _ in 0..ThemeId::ALL.len() {
            seen.push(theme);
            theme = theme.next();
        }
        assert_eq!(theme, ThemeId::DEFAULT);
        assert_eq!(seen, ThemeId::ALL.to_vec());
    }

    #[test]
    fn rgb_formats() {
        let color = Rgb::from_hex(0x1e1e1e);
        assert_eq!(color, Rgb::new(0x1e, 0x1e, 0x1e));
        assert_eq!(color.to_css(), "#1e1e1e");
        assert_eq!(color.to_xparse(), "rgb:1e/1e/1e");
        assert_eq!(color.to_string(), "#1e1e1e");
    }

    #[test]
    fn light_theme_has_dark_text() {
        let palette = ThemeId::Light.palette();
        assert_eq!(palette.background.to_css(), "#ffffff");
        assert_eq!(palette.foreground.to_css(), "#333333");
    }
}
