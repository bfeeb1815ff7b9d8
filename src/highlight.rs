// Code block highlighting
// Keyword definitions are TOML files, one per language, holding regex rules
// that assign highlight groups. Later rules win over earlier ones.

use crate::error::{Error, Result};
use crate::theme::Color;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Column at which long code lines are wrapped.
pub const WRAP_COLUMN: usize = 90;

/// Colour class of a run of code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HighlightGroup {
    /// Drawn in the normal text style.
    #[default]
    Default,
    Green,
    Blue,
    Red,
    Cyan,
    Magenta,
    Yellow,
    Comment,
}

impl HighlightGroup {
    /// Map a definition file group name to a colour class.
    pub fn from_name(name: &str) -> Self {
        match name {
            "statement" | "green" => HighlightGroup::Green,
            "identifier" | "blue" => HighlightGroup::Blue,
            "preproc" | "special" | "type.keyword" | "red" => HighlightGroup::Red,
            "constant" | "constant.number" | "constant.bool" | "symbol.brackets"
            | "identifier.var" | "cyan" => HighlightGroup::Cyan,
            "constant.specialChar" | "constant.string.url" | "constant.string" | "magenta" => {
                HighlightGroup::Magenta
            }
            "type" | "symbol.operator" | "symbol.tag.extended" | "yellow" => HighlightGroup::Yellow,
            "comment" | "high.green" => HighlightGroup::Comment,
            _ => HighlightGroup::Default,
        }
    }

    /// Text colour; `None` means the normal style.
    pub fn color(self) -> Option<Color> {
        match self {
            HighlightGroup::Default => None,
            HighlightGroup::Green => Some(Color::rgb(42, 170, 138)),
            HighlightGroup::Blue => Some(Color::rgb(137, 207, 240)),
            HighlightGroup::Red => Some(Color::rgb(255, 80, 80)),
            HighlightGroup::Cyan => Some(Color::rgb(0, 136, 163)),
            HighlightGroup::Magenta => Some(Color::rgb(255, 0, 255)),
            HighlightGroup::Yellow => Some(Color::rgb(255, 165, 0)),
            HighlightGroup::Comment => Some(Color::rgb(82, 204, 0)),
        }
    }
}

/// A run of characters sharing one group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub group: HighlightGroup,
}

/// Splits code into coloured spans, one vector per line.
pub trait SyntaxHighlighter {
    fn highlight(&self, code: &str) -> Vec<Vec<Span>>;
}

#[derive(Deserialize)]
struct DefinitionFile {
    #[serde(default)]
    rules: Vec<RuleEntry>,
}

#[derive(Deserialize)]
struct RuleEntry {
    group: String,
    pattern: String,
}

/// Regex keyword highlighter loaded from a definition file.
#[derive(Debug)]
pub struct KeywordHighlighter {
    rules: Vec<(Regex, HighlightGroup)>,
}

impl KeywordHighlighter {
    /// Parse a definition; `origin` only labels errors.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self> {
        let invalid = |reason: String| Error::SyntaxDefinition {
            path: origin.to_path_buf(),
            reason,
        };
        let file: DefinitionFile = toml::from_str(text).map_err(|e| invalid(e.to_string()))?;
        let rules = file
            .rules
            .into_iter()
            .map(|rule| {
                Regex::new(&rule.pattern)
                    .map(|re| (re, HighlightGroup::from_name(&rule.group)))
                    .map_err(|e| invalid(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(KeywordHighlighter { rules })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => Error::ResourceNotFound(path.display().to_string()),
            _ => Error::Io(err),
        })?;
        Self::from_toml(&text, path)
    }
}

impl SyntaxHighlighter for KeywordHighlighter {
    fn highlight(&self, code: &str) -> Vec<Vec<Span>> {
        code.split('\n')
            .map(|line| {
                let mut groups = vec![HighlightGroup::Default; line.len()];
                for (re, group) in &self.rules {
                    for m in re.find_iter(line) {
                        groups[m.range()].fill(*group);
                    }
                }
                spans_from_groups(line, &groups)
            })
            .collect()
    }
}

/// Collapse per-byte groups into spans on char boundaries.
fn spans_from_groups(line: &str, groups: &[HighlightGroup]) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    for (index, ch) in line.char_indices() {
        let group = groups[index];
        match spans.last_mut() {
            Some(last) if last.group == group => last.text.push(ch),
            _ => spans.push(Span {
                text: ch.to_string(),
                group,
            }),
        }
    }
    spans
}

/// Language used to look up a definition for a fenced block.
///
/// HTML blocks that open with a script element are highlighted as
/// JavaScript.
pub fn effective_language<'a>(info: &'a str, literal: &str) -> &'a str {
    let language = info.split_whitespace().next().unwrap_or("");
    if language == "html" && literal.starts_with("<script") {
        "javascript"
    } else {
        language
    }
}

/// Hard-wrap lines longer than `width` characters at spaces.
///
/// Words longer than the width stay whole.
pub fn wrap_code(code: &str, width: usize) -> String {
    let mut out = String::with_capacity(code.len());
    for (i, line) in code.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let mut column = 0;
        for word in line.split_inclusive(' ') {
            let len = word.chars().count();
            if column > 0 && column + len.min(word.trim_end().chars().count()) > width {
                // Replace the trailing space of the previous word with a break
                if out.ends_with(' ') {
                    out.pop();
                }
                out.push('\n');
                column = 0;
            }
            out.push_str(word);
            column += len;
        }
    }
    out
}

/// Definitions found in a directory, loaded on first use.
#[derive(Debug, Default)]
pub struct SyntaxRegistry {
    dir: Option<PathBuf>,
    loaded: HashMap<String, KeywordHighlighter>,
}

impl SyntaxRegistry {
    pub fn new(dir: Option<PathBuf>) -> Self {
        SyntaxRegistry {
            dir,
            loaded: HashMap::new(),
        }
    }

    /// `<dir>/<language>.toml`, when a syntax directory is configured.
    pub fn definition_path(&self, language: &str) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{language}.toml")))
    }

    /// Highlighter for `language`.
    ///
    /// `Ok(None)` when highlighting is off (no directory, no language);
    /// an error when a definition is missing or broken.
    pub fn get(&mut self, language: &str) -> Result<Option<&dyn SyntaxHighlighter>> {
        if language.is_empty() {
            return Ok(None);
        }
        if !self.dir.as_ref().is_some_and(|dir| dir.is_dir()) {
            return Ok(None);
        }
        if !self.loaded.contains_key(language) {
            let Some(path) = self.definition_path(language) else {
                return Ok(None);
            };
            let highlighter = KeywordHighlighter::load(&path)?;
            log::debug!("Loaded syntax definition {}", path.display());
            self.loaded.insert(language.to_string(), highlighter);
        }
        Ok(self
            .loaded
            .get(language)
            .map(|h| h as &dyn SyntaxHighlighter))
    }
}
