//! Render source code as a syntax-highlighted image.
//!
//! The pipeline runs in four steps:
//! - a [`Highlighter`] turns code into flat `<span class="hljs-…">` markup
//! - [`markup::parse_highlighted`] buckets that markup into colored spans per
//!   source line
//! - [`wrap::wrap_lines`] re-flows each line into display rows, keeping its
//!   indentation on continuation rows
//! - [`renderer::Canvas`] paints the rows onto a rounded background, which the
//!   [`Rasterizer`] encodes as PNG, SVG or PDF
//!
//! ```rust,ignore
//! let png = code_picture::render_code_image("fn main() {}", "rust")?;
//! std::fs::write("main.png", png)?;
//! ```

pub mod clipboard;
pub mod config;
pub mod error;
pub mod fonts;
pub mod highlight;
pub mod markup;
pub mod palette;
pub mod raster;
pub mod renderer;
pub mod types;
pub mod wrap;

pub use config::{LayoutMetrics, RenderConfig};
pub use error::{Error, Result};
pub use fonts::{CosmicTextMeasure, FixedAdvanceMeasure, TextMeasure};
pub use highlight::{Highlighter, PlainHighlighter, SyntectHighlighter};
pub use raster::{OutputFormat, Rasterizer};
pub use types::{ColorSpan, WrappedLine};

use renderer::Canvas;

/// Display rows for a piece of code, with the metrics they were laid out in.
#[derive(Debug, Clone)]
pub struct Layout {
    pub metrics: LayoutMetrics,
    pub lines: Vec<WrappedLine>,
}

impl Layout {
    pub fn size(&self) -> (f32, f32) {
        renderer::canvas_size(self.lines.len(), &self.metrics)
    }
}

/// Owns the collaborators of the pipeline so they can be reused across
/// renders.
pub struct CodeImageRenderer<H: Highlighter, T: TextMeasure> {
    config: RenderConfig,
    highlighter: H,
    measure: T,
    rasterizer: Rasterizer,
}

impl CodeImageRenderer<SyntectHighlighter, CosmicTextMeasure> {
    /// syntect grammars, system fonts for measuring and rasterizing.
    pub fn with_system_fonts(config: RenderConfig) -> Self {
        Self::new(
            config,
            SyntectHighlighter::new(),
            CosmicTextMeasure::new(),
            Rasterizer::new(),
        )
    }
}

impl<H: Highlighter, T: TextMeasure> CodeImageRenderer<H, T> {
    pub fn new(config: RenderConfig, highlighter: H, measure: T, rasterizer: Rasterizer) -> Self {
        Self {
            config,
            highlighter,
            measure,
            rasterizer,
        }
    }

    pub fn layout(&mut self, code: &str, language: &str) -> Layout {
        let metrics = LayoutMetrics::measured(&self.config, &mut self.measure);

        let markup = self.highlighter.highlight(code, language);
        let line_count = code.split('\n').count();
        let parsed = markup::parse_highlighted(&markup, line_count);
        let lines = wrap::wrap_lines(&parsed, &metrics, &mut self.measure);

        log::debug!(
            "laid out {} source lines as {} rows",
            line_count,
            lines.len()
        );
        Layout { metrics, lines }
    }

    pub fn render_svg(&mut self, code: &str, language: &str) -> String {
        let layout = self.layout(code, language);
        Canvas::new(&layout.metrics, &mut self.measure).paint(&layout.lines)
    }

    pub fn render_png(&mut self, code: &str, language: &str) -> Result<Vec<u8>> {
        self.render(code, language, OutputFormat::Png)
    }

    pub fn render(&mut self, code: &str, language: &str, format: OutputFormat) -> Result<Vec<u8>> {
        let svg = self.render_svg(code, language);
        self.rasterizer.encode(svg, format)
    }
}

/// Renders code to PNG bytes with the default configuration.
pub fn render_code_image(code: &str, language: &str) -> Result<Vec<u8>> {
    CodeImageRenderer::with_system_fonts(RenderConfig::default()).render_png(code, language)
}
