use clap::Parser;
use mdpaint::config::{Margins, Orientation, RenderOptions};
use mdpaint::icons::IconMode;
use mdpaint::theme::ThemeName;
use mdpaint::{Error, Result, render_markdown};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "markdown"];
const DOCUMENT_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Parser, Debug)]
#[command(name = "mdpaint")]
#[command(about = "Render Markdown documents to paginated SVG", long_about = None)]
struct Args {
    /// Markdown file or directory of Markdown files (default: stdin)
    input: Option<PathBuf>,

    /// Output SVG file (derived from the input name when omitted)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Theme: light, dark or the path of a TOML theme file
    #[arg(long = "theme", value_name = "THEME")]
    theme: Option<String>,

    /// Replace icons with bracketed text labels
    #[arg(long = "text-icons")]
    text_icons: bool,

    /// Replace icons with spaces
    #[arg(long = "strip-icons")]
    strip_icons: bool,

    /// Pass icons through to the font unchanged
    #[arg(long = "keep-icons")]
    keep_icons: bool,

    /// Draw a space for emoji without an image instead of a text badge
    #[arg(long = "remove-unknown-icons", value_name = "BOOL")]
    remove_unknown_icons: Option<bool>,

    /// Directory holding emoji images named after their code points
    #[arg(long = "emoji-dir", value_name = "DIRECTORY")]
    emoji_dir: Option<PathBuf>,

    /// Continue ordered list numbering across sections
    #[arg(long = "keep-numbering")]
    keep_numbering: bool,

    /// Draw horizontal rules instead of starting a new page
    #[arg(long = "no-new-page")]
    no_new_page: bool,

    /// Render internal #anchor links as links
    #[arg(long = "anchor-links")]
    anchor_links: bool,

    /// Directory of syntax definitions for code blocks
    #[arg(long = "syntax-files", value_name = "DIRECTORY")]
    syntax_files: Option<PathBuf>,

    /// Draw inline code in filled boxes
    #[arg(long = "code-box")]
    code_box: bool,

    /// Start with a table of contents page
    #[arg(long = "generate-toc")]
    generate_toc: bool,

    /// Never download remote images
    #[arg(long = "offline")]
    offline: bool,

    /// Document title, also shown in the footer
    #[arg(long = "title", value_name = "TITLE")]
    title: Option<String>,

    /// Author name shown in the footer
    #[arg(long = "author", value_name = "NAME")]
    author: Option<String>,

    /// Print author, title and page number on every page
    #[arg(long = "with-footer")]
    with_footer: bool,

    /// Base URL for relative links
    #[arg(long = "base-url", value_name = "URL")]
    base_url: Option<String>,

    /// Page margins: "35mm" or "left,top,right,bottom" in mm or pt
    #[arg(long = "margins", value_name = "MARGINS")]
    margins: Option<Margins>,

    /// Page size: A3, A4 or A5
    #[arg(long = "page-size", value_name = "SIZE")]
    page_size: Option<String>,

    /// Page orientation: portrait or landscape
    #[arg(long = "orientation", value_name = "ORIENTATION")]
    orientation: Option<Orientation>,

    /// Configuration file (default: the per-user config.toml)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write log output to this file
    #[arg(long = "log-file", value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Trace every rendered node
    #[arg(long = "debug")]
    debug: bool,
}

impl Args {
    /// Icon flags in priority order: strip, text, keep.
    fn icon_mode(&self) -> Option<IconMode> {
        if self.strip_icons {
            Some(IconMode::Strip)
        } else if self.text_icons {
            Some(IconMode::Text)
        } else if self.keep_icons {
            Some(IconMode::Keep)
        } else {
            None
        }
    }

    fn apply(&self, options: &mut RenderOptions) {
        if let Some(mode) = self.icon_mode() {
            options.icon_mode = mode;
        }
        if let Some(theme) = &self.theme {
            match theme.as_str() {
                "light" => options.theme = ThemeName::Light,
                "dark" => options.theme = ThemeName::Dark,
                path => options.theme_file = Some(PathBuf::from(path)),
            }
        }
        if let Some(remove) = self.remove_unknown_icons {
            options.remove_unknown_icons = remove;
        }
        if let Some(dir) = &self.emoji_dir {
            options.emoji_dir = dir.clone();
        }
        if let Some(dir) = &self.syntax_files {
            options.syntax_dir = Some(dir.clone());
        }
        if let Some(url) = &self.base_url {
            options.base_url = Some(url.clone());
        }
        if let Some(margins) = self.margins {
            options.margins = margins;
        }
        if let Some(size) = &self.page_size {
            options.page_size = size.clone();
        }
        if let Some(orientation) = self.orientation {
            options.orientation = orientation;
        }
        options.keep_numbering |= self.keep_numbering;
        options.anchor_links |= self.anchor_links;
        options.code_box |= self.code_box;
        options.generate_toc |= self.generate_toc;
        options.footer |= self.with_footer;
        if self.title.is_some() {
            options.title = self.title.clone();
        }
        if self.author.is_some() {
            options.author = self.author.clone();
        }
        if self.offline {
            options.fetch_remote = false;
        }
        if self.no_new_page {
            options.hr_page_break = false;
        }
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.iter().any(|m| ext.eq_ignore_ascii_case(m)))
}

/// Output path derived from the input: `doc.md` becomes `doc.svg`, a
/// directory `notes/` becomes `notes.svg`.
fn default_output(input: &Path) -> PathBuf {
    if input.is_dir() {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        return PathBuf::from(format!("{name}.svg"));
    }
    if is_markdown(input) {
        input.with_extension("svg")
    } else {
        let mut name = input.as_os_str().to_owned();
        name.push(".svg");
        PathBuf::from(name)
    }
}

fn default_log_file(output: &Path) -> PathBuf {
    output.with_extension("log")
}

/// All Markdown files directly inside `dir`, sorted by name, joined by rules.
fn read_directory(dir: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io(io::Error::other(e)))?;
        if !entry.file_type().is_file() || !is_markdown(entry.path()) {
            continue;
        }
        log::debug!("Reading {}", entry.path().display());
        parts.push(fs::read_to_string(entry.path())?);
    }
    if parts.is_empty() {
        return Err(Error::ResourceNotFound(format!(
            "no Markdown files in {}",
            dir.display()
        )));
    }
    Ok(parts.join(DOCUMENT_SEPARATOR))
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path.is_dir() => read_directory(path),
        Some(path) if path.as_os_str() != "-" => Ok(fs::read_to_string(path)?),
        _ => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

fn init_logging(args: &Args, output: &Path) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if args.debug {
        builder.filter_level(log::LevelFilter::Trace);
    }
    let log_file = match (&args.log_file, args.debug) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(default_log_file(output)),
        (None, false) => None,
    };
    if let Some(path) = log_file {
        let file = File::create(&path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let input = args.input.clone().filter(|p| p.as_os_str() != "-");
    let output = match (&args.output, &input) {
        (Some(output), _) => output.clone(),
        (None, Some(input)) => default_output(input),
        (None, None) => {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "an output file is required when reading from stdin",
            )));
        }
    };
    init_logging(&args, &output)?;

    let mut options = match &args.config {
        Some(path) => RenderOptions::load(path)?,
        None => RenderOptions::load_default()?,
    };
    args.apply(&mut options);
    if options.base_dir.is_none() {
        options.base_dir = input.as_deref().map(|path| {
            if path.is_dir() {
                path.to_path_buf()
            } else {
                path.parent().map(Path::to_path_buf).unwrap_or_default()
            }
        });
    }

    let source = read_input(input.as_deref())?;
    let (svg, report) = render_markdown(&source, &options)?;
    fs::write(&output, svg)?;

    for diagnostic in &report.diagnostics {
        eprintln!("Warning: {diagnostic}");
    }
    log::info!(
        "Wrote {} ({} events, {} diagnostics)",
        output.display(),
        report.events,
        report.diagnostics.len()
    );
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
