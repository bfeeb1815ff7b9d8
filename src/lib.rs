// Library exports for mdpaint

pub mod canvas;
pub mod config;
pub mod container;
pub mod error;
pub mod highlight;
pub mod icons;
pub mod list_layout;
pub mod markdown_ast;
pub mod markdown_parser;
pub mod markers;
pub mod renderer;
pub mod resources;
pub mod svg_canvas;
pub mod table_layout;
pub mod theme;
pub mod toc;

pub use config::RenderOptions;
pub use error::{Error, Result};
pub use renderer::{Diagnostic, RenderReport, Renderer};

use svg_canvas::SvgCanvas;

/// Parse Markdown source and render it to an SVG document.
pub fn render_markdown(source: &str, options: &RenderOptions) -> Result<(String, RenderReport)> {
    let mut doc = markdown_parser::parse_source(source);
    let theme = options.resolve_theme()?;
    let mut canvas = SvgCanvas::new(options.page_geometry()?)
        .with_background(theme.background)
        .with_title(options.title.clone());
    if let Some(footer) = options.footer() {
        canvas = canvas.with_footer(footer);
    }
    let resolver = resources::resolver_for(options)?;
    let mut renderer = Renderer::with_theme(canvas, options.clone(), theme).with_resolver(resolver);
    let report = renderer.render(&mut doc)?;
    Ok((renderer.into_canvas().finish(), report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_markdown_with_footer() {
        let options = RenderOptions {
            title: Some("Guide".to_string()),
            author: Some("Kim".to_string()),
            footer: true,
            fetch_remote: false,
            ..RenderOptions::default()
        };
        let (svg, report) = render_markdown("# Intro\n\n---\n\nMore\n", &options).unwrap();
        assert!(report.diagnostics.is_empty());
        assert!(svg.contains("<title>Guide</title>"));
        assert!(svg.contains(">Page 1</text>"));
        assert!(svg.contains(">Page 2</text>"));
    }

    #[test]
    fn test_offline_render_reports_remote_images() {
        let options = RenderOptions {
            fetch_remote: false,
            ..RenderOptions::default()
        };
        let (_, report) = render_markdown("![x](https://example.com/x.png)\n", &options).unwrap();
        assert_eq!(report.diagnostics.len(), 1);
        assert!(matches!(report.diagnostics[0].error, Error::RemoteFetch { .. }));
    }
}
