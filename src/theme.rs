use crate::error::Result;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// RGB colour, written as `#rrggbb` in theme files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("expected #rrggbb, got {value:?}"));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("{value:?}: {e}"))
        };
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Weight and decoration flags of a font.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikeout: bool,
}

impl FontStyle {
    pub const REGULAR: FontStyle = FontStyle {
        bold: false,
        italic: false,
        underline: false,
        strikeout: false,
    };

    pub const fn bold() -> Self {
        FontStyle {
            bold: true,
            ..Self::REGULAR
        }
    }

    pub const fn italic() -> Self {
        FontStyle {
            italic: true,
            ..Self::REGULAR
        }
    }
}

/// A named text style: font, size, line spacing and colours.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Styler {
    pub font: String,
    pub style: FontStyle,
    pub size: f64,
    pub spacing: f64,
    pub text_color: Color,
    pub fill_color: Color,
}

impl Styler {
    /// Height of one line set in this style.
    pub fn line_height(&self) -> f64 {
        self.size + self.spacing
    }
}

impl Default for Styler {
    fn default() -> Self {
        Styler {
            font: "serif".to_string(),
            style: FontStyle::REGULAR,
            size: 11.0,
            spacing: 2.0,
            text_color: Color::BLACK,
            fill_color: Color::WHITE,
        }
    }
}

/// Built-in theme names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Light,
    Dark,
}

/// The style registry consulted by every handler.
///
/// Fields missing from a custom theme file fall back to the light theme.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: Color,
    pub normal: Styler,
    pub h1: Styler,
    pub h2: Styler,
    pub h3: Styler,
    pub h4: Styler,
    pub h5: Styler,
    pub h6: Styler,
    /// Inline code drawn as a filled box.
    pub code: Styler,
    /// Code blocks, HTML blocks and inline code drawn as plain text.
    pub backtick: Styler,
    pub link: Styler,
    pub blockquote: Styler,
    pub table_header: Styler,
    pub table_body: Styler,
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

fn heading(size: f64, color: Color, fill: Color) -> Styler {
    Styler {
        style: FontStyle::bold(),
        size,
        spacing: 5.0,
        text_color: color,
        fill_color: fill,
        ..Styler::default()
    }
}

impl Theme {
    pub fn light() -> Self {
        let page = Color::WHITE;
        let ink = Color::BLACK;
        let normal = Styler {
            text_color: ink,
            fill_color: page,
            ..Styler::default()
        };
        Self {
            background: page,
            h1: heading(24.0, ink, page),
            h2: heading(22.0, ink, page),
            h3: heading(20.0, ink, page),
            h4: heading(18.0, ink, page),
            h5: heading(16.0, ink, page),
            h6: heading(14.0, ink, page),
            code: Styler {
                font: "monospace".to_string(),
                size: 11.0,
                spacing: 2.0,
                text_color: Color::rgb(37, 27, 14),
                fill_color: Color::rgb(200, 200, 200),
                ..normal.clone()
            },
            backtick: Styler {
                font: "monospace".to_string(),
                size: 10.0,
                spacing: 2.0,
                text_color: Color::rgb(37, 27, 14),
                fill_color: Color::rgb(200, 200, 200),
                ..normal.clone()
            },
            link: Styler {
                style: FontStyle {
                    underline: true,
                    ..FontStyle::REGULAR
                },
                text_color: Color::rgb(0, 0, 255),
                ..normal.clone()
            },
            blockquote: Styler {
                style: FontStyle::italic(),
                size: 10.0,
                spacing: 2.0,
                text_color: Color::rgb(64, 64, 64),
                ..normal.clone()
            },
            table_header: Styler {
                style: FontStyle::bold(),
                fill_color: Color::rgb(180, 180, 180),
                ..normal.clone()
            },
            table_body: Styler {
                fill_color: Color::rgb(240, 240, 240),
                ..normal.clone()
            },
            normal,
        }
    }

    pub fn dark() -> Self {
        let page = Color::rgb(24, 24, 27);
        let ink = Color::rgb(235, 235, 235);
        let mut theme = Self::light();
        theme.background = page;
        for style in [
            &mut theme.normal,
            &mut theme.h1,
            &mut theme.h2,
            &mut theme.h3,
            &mut theme.h4,
            &mut theme.h5,
            &mut theme.h6,
            &mut theme.table_header,
            &mut theme.table_body,
        ] {
            style.text_color = ink;
            style.fill_color = page;
        }
        theme.table_header.fill_color = Color::rgb(60, 60, 66);
        theme.table_body.fill_color = Color::rgb(40, 40, 44);
        theme.code.text_color = Color::rgb(255, 165, 0);
        theme.code.fill_color = Color::rgb(45, 45, 50);
        theme.backtick.text_color = Color::rgb(255, 165, 0);
        theme.backtick.fill_color = Color::rgb(45, 45, 50);
        theme.link.text_color = Color::rgb(100, 149, 237);
        theme.link.fill_color = page;
        theme.blockquote.text_color = Color::rgb(180, 180, 180);
        theme.blockquote.fill_color = page;
        theme
    }

    pub fn named(name: ThemeName) -> Self {
        match name {
            ThemeName::Light => Self::light(),
            ThemeName::Dark => Self::dark(),
        }
    }

    /// Parse a custom theme from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a custom theme file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Style for a heading level; levels past 6 use the level 6 style.
    pub fn heading(&self, level: u8) -> &Styler {
        match level {
            0 | 1 => &self.h1,
            2 => &self.h2,
            3 => &self.h3,
            4 => &self.h4,
            5 => &self.h5,
            _ => &self.h6,
        }
    }
}
