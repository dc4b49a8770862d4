/// A run of text painted in one color.
///
/// Straight out of the markup parser `start` is a character offset within the
/// source line. After wrapping it is a pixel offset within the display line.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSpan {
    pub text: String,
    pub color: &'static str,
    pub start: f32,
}

impl ColorSpan {
    pub fn new(text: impl Into<String>, color: &'static str, start: f32) -> Self {
        Self {
            text: text.into(),
            color,
            start,
        }
    }
}

/// One row of the rendered image.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WrappedLine {
    pub spans: Vec<ColorSpan>,
    /// Leading whitespace width in characters. Only continuation rows of a
    /// wrapped source line carry it; the first row keeps its whitespace in
    /// its first span instead.
    pub indent: usize,
}

impl WrappedLine {
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}
