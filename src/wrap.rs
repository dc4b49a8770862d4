use crate::config::LayoutMetrics;
use crate::fonts::TextMeasure;
use crate::types::{ColorSpan, WrappedLine};

/// Splits text into alternating whitespace and non-whitespace runs.
pub fn split_runs(text: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut chars = text.char_indices();
    let Some((_, first_ch)) = chars.next() else {
        return runs;
    };

    let mut start = 0;
    let mut in_whitespace = first_ch.is_whitespace();
    for (idx, ch) in chars {
        if ch.is_whitespace() != in_whitespace {
            runs.push(&text[start..idx]);
            start = idx;
            in_whitespace = ch.is_whitespace();
        }
    }

    runs.push(&text[start..]);
    runs
}

/// Leading whitespace of a source line, in characters, read off its first
/// span.
pub fn leading_indent(spans: &[ColorSpan]) -> usize {
    spans
        .first()
        .map(|span| span.text.chars().take_while(|c| c.is_whitespace()).count())
        .unwrap_or(0)
}

/// Accumulator for the display row being filled.
struct WrapState {
    width: f32,
    spans: Vec<ColorSpan>,
    first_row: bool,
}

impl WrapState {
    fn new() -> Self {
        Self {
            width: 0.0,
            spans: Vec::new(),
            first_row: true,
        }
    }

    fn flush(&mut self, indent: usize, out: &mut Vec<WrappedLine>) {
        if self.spans.is_empty() {
            return;
        }

        out.push(WrappedLine {
            spans: std::mem::take(&mut self.spans),
            indent: if self.first_row { 0 } else { indent },
        });
    }
}

pub struct LineWrapper<'a, T: TextMeasure> {
    metrics: &'a LayoutMetrics,
    measure: &'a mut T,
}

impl<'a, T: TextMeasure> LineWrapper<'a, T> {
    pub fn new(metrics: &'a LayoutMetrics, measure: &'a mut T) -> Self {
        Self { metrics, measure }
    }

    /// Wraps every source line, appending display rows in order.
    pub fn wrap_all(&mut self, lines: &[Vec<ColorSpan>]) -> Vec<WrappedLine> {
        let mut out = Vec::with_capacity(lines.len());
        for spans in lines {
            self.wrap_line(spans, &mut out);
        }
        out
    }

    pub fn wrap_line(&mut self, spans: &[ColorSpan], out: &mut Vec<WrappedLine>) {
        if spans.is_empty() {
            // Blank source lines keep their row.
            out.push(WrappedLine::default());
            return;
        }

        let indent = leading_indent(spans);
        let max_width = self.metrics.max_content_width;
        let mut state = WrapState::new();

        for span in spans {
            for run in split_runs(&span.text) {
                let run_width = self.measure.measure_text(
                    run,
                    &self.metrics.font_family,
                    self.metrics.font_size,
                );

                // A run that overflows an empty row stays on it: runs are
                // never split.
                if state.width + run_width > max_width && !state.spans.is_empty() {
                    state.flush(indent, out);
                    state.width = indent as f32 * self.metrics.char_width;
                    state.first_row = false;
                }

                state
                    .spans
                    .push(ColorSpan::new(run, span.color, state.width));
                state.width += run_width;
            }
        }

        state.flush(indent, out);
    }
}

/// Re-flows parsed source lines into display rows no wider than the
/// metrics' content width.
pub fn wrap_lines<T: TextMeasure>(
    lines: &[Vec<ColorSpan>],
    metrics: &LayoutMetrics,
    measure: &mut T,
) -> Vec<WrappedLine> {
    LineWrapper::new(metrics, measure).wrap_all(lines)
}
