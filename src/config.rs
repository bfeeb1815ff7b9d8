use crate::error::{Error, Result};
use crate::icons::IconMode;
use crate::svg_canvas::{Footer, MM_TO_PT, PageGeometry};
use crate::theme::{Theme, ThemeName};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "mdpaint";
const APPLICATION: &str = "mdpaint";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default asset directory for embedded emoji images.
pub const DEFAULT_EMOJI_DIR: &str = "assets/emoji";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            other => Err(format!("unknown orientation {other:?}")),
        }
    }
}

/// Page margins in points.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Margins {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Margins {
    pub fn uniform(value: f64) -> Self {
        Margins {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Margins::uniform(35.0 * MM_TO_PT)
    }
}

fn parse_length(s: &str) -> Result<f64> {
    let s = s.trim();
    let (number, scale) = if let Some(n) = s.strip_suffix("mm") {
        (n, MM_TO_PT)
    } else if let Some(n) = s.strip_suffix("pt") {
        (n, 1.0)
    } else {
        return Err(Error::InvalidMargins(format!(
            "margin must end with 'mm' or 'pt': {s}"
        )));
    };
    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| Error::InvalidMargins(format!("invalid margin value: {s}")))?;
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidMargins(format!("invalid margin value: {s}")));
    }
    Ok(value * scale)
}

impl FromStr for Margins {
    type Err = Error;

    /// `"35mm"` for all sides or `"left,top,right,bottom"`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').collect();
        match parts.as_slice() {
            [all] => Ok(Margins::uniform(parse_length(all)?)),
            [left, top, right, bottom] => Ok(Margins {
                left: parse_length(left)?,
                top: parse_length(top)?,
                right: parse_length(right)?,
                bottom: parse_length(bottom)?,
            }),
            _ => Err(Error::InvalidMargins(
                "margins must be a single value or left,top,right,bottom".to_string(),
            )),
        }
    }
}

impl TryFrom<String> for Margins {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Everything the renderer is configured with.
///
/// Loaded from TOML; every field is optional.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub icon_mode: IconMode,
    /// Draw a space for emoji without an image asset instead of a text badge.
    pub remove_unknown_icons: bool,
    /// Continue ordered list numbering across headings and paragraphs.
    pub keep_numbering: bool,
    /// Render `#anchor` links as links.
    pub anchor_links: bool,
    /// Start a new page at every horizontal rule.
    pub hr_page_break: bool,
    /// Directory of `<lang>.toml` keyword definitions.
    pub syntax_dir: Option<PathBuf>,
    pub emoji_dir: PathBuf,
    /// Indent unit for lists and quotes; defaults to three em.
    pub indent: Option<f64>,
    /// Base font metric; defaults to the width of `m` in the normal style.
    pub em: Option<f64>,
    /// Draw inline code as a filled box instead of backtick-style text.
    pub code_box: bool,
    /// Prefix for relative link and image destinations.
    pub base_url: Option<String>,
    /// Directory relative image paths are resolved against.
    pub base_dir: Option<PathBuf>,
    /// Download images the filesystem does not have.
    pub fetch_remote: bool,
    pub generate_toc: bool,
    /// Document title, stored in the output and shown in the footer.
    pub title: Option<String>,
    pub author: Option<String>,
    /// Print author, title and page number at the bottom of every page.
    pub footer: bool,
    pub theme: ThemeName,
    /// Custom theme file; overrides `theme`.
    pub theme_file: Option<PathBuf>,
    pub page_size: String,
    pub orientation: Orientation,
    pub margins: Margins,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            icon_mode: IconMode::Embed,
            remove_unknown_icons: true,
            keep_numbering: false,
            anchor_links: false,
            hr_page_break: true,
            syntax_dir: None,
            emoji_dir: PathBuf::from(DEFAULT_EMOJI_DIR),
            indent: None,
            em: None,
            code_box: false,
            base_url: None,
            base_dir: None,
            fetch_remote: true,
            generate_toc: false,
            title: None,
            author: None,
            footer: false,
            theme: ThemeName::Light,
            theme_file: None,
            page_size: "A4".to_string(),
            orientation: Orientation::Portrait,
            margins: Margins::default(),
        }
    }
}

impl RenderOptions {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Per-user configuration file location.
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Load the per-user configuration, or defaults if there is none.
    pub fn load_default() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => {
                log::debug!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// The style registry selected by `theme` and `theme_file`.
    pub fn resolve_theme(&self) -> Result<Theme> {
        match &self.theme_file {
            Some(path) => Theme::load(path),
            None => Ok(Theme::named(self.theme)),
        }
    }

    /// Footer contents, when footers are enabled.
    pub fn footer(&self) -> Option<Footer> {
        self.footer.then(|| Footer {
            author: self.author.clone().unwrap_or_default(),
            title: self.title.clone().unwrap_or_default(),
        })
    }

    pub fn page_geometry(&self) -> Result<PageGeometry> {
        let base = PageGeometry::named(&self.page_size).ok_or_else(|| {
            Error::InvalidPageSize(self.page_size.clone())
        })?;
        let oriented = match self.orientation {
            Orientation::Portrait => base,
            Orientation::Landscape => base.landscape(),
        };
        let m = self.margins;
        Ok(oriented.with_margins(m.left, m.top, m.right, m.bottom))
    }
}
