use crate::config::LayoutMetrics;
use crate::fonts::TextMeasure;
use crate::markup::escape_xml;
use crate::palette::BACKGROUND_COLOR;
use crate::types::WrappedLine;

/// Final image size for a number of display rows.
pub fn canvas_size(line_count: usize, metrics: &LayoutMetrics) -> (f32, f32) {
    let width = metrics.max_content_width + metrics.padding * 2.0;
    let height = line_count as f32 * metrics.line_height + metrics.padding * 2.0;
    (width, height)
}

/// One span placed on the canvas. `y` is the text baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextDraw {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub color: &'static str,
}

/// Paints wrapped lines into an SVG scene.
pub struct Canvas<'a, T: TextMeasure> {
    metrics: &'a LayoutMetrics,
    measure: &'a mut T,
    svg_content: String,
}

impl<'a, T: TextMeasure> Canvas<'a, T> {
    pub fn new(metrics: &'a LayoutMetrics, measure: &'a mut T) -> Self {
        Self {
            metrics,
            measure,
            svg_content: String::new(),
        }
    }

    /// Positions every span. The pen advances by the width measured now,
    /// so rounding in the layout pass does not accumulate along a row.
    pub fn plan_text(&mut self, lines: &[WrappedLine]) -> Vec<TextDraw> {
        let metrics = self.metrics;
        let mut draws = Vec::new();

        for (line_index, line) in lines.iter().enumerate() {
            let y = metrics.padding + (line_index + 1) as f32 * metrics.line_height;
            let mut x = metrics.padding;
            if line.indent > 0 {
                x += line.indent as f32 * metrics.char_width;
            }

            for span in &line.spans {
                draws.push(TextDraw {
                    x,
                    y,
                    text: span.text.clone(),
                    color: span.color,
                });
                x += self
                    .measure
                    .measure_text(&span.text, &metrics.font_family, metrics.font_size);
            }
        }

        draws
    }

    pub fn paint(mut self, lines: &[WrappedLine]) -> String {
        let (width, height) = canvas_size(lines.len(), self.metrics);
        log::debug!(
            "painting {} rows on a {:.0}x{:.0} canvas",
            lines.len(),
            width,
            height
        );

        self.draw_background(width, height);
        for draw in self.plan_text(lines) {
            // Blank runs only move the pen.
            if draw.text.trim().is_empty() {
                continue;
            }
            self.draw_text_at(&draw);
        }

        self.finalize_svg(width, height)
    }

    fn draw_background(&mut self, width: f32, height: f32) {
        self.svg_content.push_str(&format!(
            r#"<rect x="0" y="0" width="{:.2}" height="{:.2}" rx="{:.2}" ry="{:.2}" fill="{}" />"#,
            width, height, self.metrics.border_radius, self.metrics.border_radius, BACKGROUND_COLOR,
        ));
    }

    fn draw_text_at(&mut self, draw: &TextDraw) {
        self.svg_content.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" fill="{}" xml:space="preserve">{}</text>"#,
            draw.x,
            draw.y,
            draw.color,
            escape_xml(&draw.text),
        ));
    }

    fn finalize_svg(&self, width: f32, height: f32) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w:.2} {h:.2}" width="{w:.2}" height="{h:.2}"><g font-family="{family}" font-size="{size:.2}">{content}</g></svg>"#,
            w = width,
            h = height,
            family = escape_xml(&self.metrics.font_family),
            size = self.metrics.font_size,
            content = self.svg_content,
        )
    }
}
