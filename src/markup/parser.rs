use super::entities::decode_html_entities;
use crate::palette::color_for_class;
use crate::types::ColorSpan;

const SPAN_OPEN: &str = "<span class=\"";
const SPAN_CLOSE: &str = "</span>";

/// One piece of highlight markup, still entity-encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment<'a> {
    Highlighted { class: &'a str, text: &'a str },
    Plain(&'a str),
}

impl<'a> Fragment<'a> {
    fn class(&self) -> Option<&'a str> {
        match *self {
            Fragment::Highlighted { class, .. } => Some(class),
            Fragment::Plain(_) => None,
        }
    }

    fn raw_text(&self) -> &'a str {
        match *self {
            Fragment::Highlighted { text, .. } => text,
            Fragment::Plain(text) => text,
        }
    }
}

/// Splits markup into highlighted elements and plain runs, in document order.
pub struct FragmentScanner<'a> {
    markup: &'a str,
    pos: usize,
}

impl<'a> FragmentScanner<'a> {
    pub fn new(markup: &'a str) -> Self {
        Self { markup, pos: 0 }
    }
}

impl<'a> Iterator for FragmentScanner<'a> {
    type Item = Fragment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let markup: &'a str = self.markup;
        let rest = &markup[self.pos..];
        if rest.is_empty() {
            return None;
        }

        if let Some((fragment, consumed)) = match_highlighted(rest) {
            self.pos += consumed;
            return Some(fragment);
        }

        // Plain run up to the next element start. A `<` that did not open a
        // valid element is kept as text, so every step consumes something.
        let skip = if rest.starts_with('<') { 1 } else { 0 };
        let end = rest[skip..]
            .find('<')
            .map(|idx| idx + skip)
            .unwrap_or(rest.len());
        self.pos += end;
        Some(Fragment::Plain(&rest[..end]))
    }
}

fn is_class_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn match_highlighted(input: &str) -> Option<(Fragment<'_>, usize)> {
    let after_open = input.strip_prefix(SPAN_OPEN)?;
    let quote = after_open.find('"')?;
    let class = &after_open[..quote];
    if class.is_empty() || !class.chars().all(is_class_char) {
        return None;
    }

    let body = after_open[quote + 1..].strip_prefix('>')?;
    let close = body.find(SPAN_CLOSE)?;
    let text = &body[..close];

    let consumed = SPAN_OPEN.len() + quote + 2 + close + SPAN_CLOSE.len();
    Some((Fragment::Highlighted { class, text }, consumed))
}

/// Running position of the parser within the source code.
#[derive(Debug, Default)]
struct LineCursor {
    line: usize,
    column: usize,
}

impl LineCursor {
    fn push_text(&mut self, text: &str, color: &'static str, buckets: &mut Vec<Vec<ColorSpan>>) {
        let mut segments = text.split('\n').peekable();
        let mut first = true;

        while let Some(segment) = segments.next() {
            if !first {
                self.line += 1;
                self.column = 0;
            }
            first = false;

            // `\r\n` line endings: the `\r` belongs to the break, not the line.
            let segment = if segments.peek().is_some() {
                segment.strip_suffix('\r').unwrap_or(segment)
            } else {
                segment
            };
            if segment.is_empty() {
                continue;
            }

            if buckets.len() <= self.line {
                buckets.resize_with(self.line + 1, Vec::new);
            }

            buckets[self.line].push(ColorSpan::new(segment, color, self.column as f32));
            self.column += segment.chars().count();
        }
    }
}

/// Buckets highlight markup into per-line color spans.
///
/// Returns at least `line_count` buckets, one per source line, each holding
/// that line's spans in order. Empty lines get empty buckets.
pub fn parse_highlighted(markup: &str, line_count: usize) -> Vec<Vec<ColorSpan>> {
    let mut buckets: Vec<Vec<ColorSpan>> = Vec::new();
    buckets.resize_with(line_count.max(1), Vec::new);

    let mut cursor = LineCursor::default();
    for fragment in FragmentScanner::new(markup) {
        let text = decode_html_entities(fragment.raw_text());
        let color = color_for_class(fragment.class());
        cursor.push_text(&text, color, &mut buckets);
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::{Fragment, FragmentScanner, parse_highlighted};
    use crate::palette::{DEFAULT_COLOR, color_for_class};
    use proptest::prelude::*;

    #[test]
    fn test_scan_mixed_markup() {
        let fragments: Vec<_> =
            FragmentScanner::new(r#"<span class="hljs-keyword">fn</span> main()"#).collect();
        assert_eq!(
            fragments,
            vec![
                Fragment::Highlighted {
                    class: "hljs-keyword",
                    text: "fn"
                },
                Fragment::Plain(" main()"),
            ]
        );
    }

    #[test]
    fn test_two_plain_lines() {
        let buckets = parse_highlighted("a\nb", 2);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].len(), 1);
        assert_eq!(buckets[1].len(), 1);
        assert_eq!(buckets[0][0].text, "a");
        assert_eq!(buckets[1][0].text, "b");
        assert!(buckets.iter().flatten().all(|s| s.color == DEFAULT_COLOR));
    }

    #[test]
    fn test_spans_track_character_offsets() {
        let markup = r#"<span class="hljs-keyword">let</span> x = <span class="hljs-number">42</span>;"#;
        let buckets = parse_highlighted(markup, 1);
        let line = &buckets[0];

        let texts: Vec<_> = line.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["let", " x = ", "42", ";"]);

        let starts: Vec<_> = line.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![0.0, 3.0, 8.0, 10.0]);

        assert_eq!(line[0].color, color_for_class(Some("hljs-keyword")));
        assert_eq!(line[2].color, color_for_class(Some("hljs-number")));
        assert_eq!(line[3].color, DEFAULT_COLOR);
    }

    #[test]
    fn test_multiline_span_advances_lines() {
        let markup = "<span class=\"hljs-comment\">/* one\ntwo */</span> x";
        let buckets = parse_highlighted(markup, 2);
        assert_eq!(buckets[0][0].text, "/* one");
        assert_eq!(buckets[1][0].text, "two */");
        assert_eq!(buckets[1][0].start, 0.0);
        assert_eq!(buckets[1][1].text, " x");
        assert_eq!(buckets[1][1].start, 6.0);
        assert_eq!(buckets[1][1].color, DEFAULT_COLOR);
    }

    #[test]
    fn test_entities_are_decoded() {
        let markup = r#"<span class="hljs-string">&quot;&lt;b&gt;&quot;</span> &amp;&amp; ok"#;
        let buckets = parse_highlighted(markup, 1);
        assert_eq!(buckets[0][0].text, "\"<b>\"");
        assert_eq!(buckets[0][1].text, " && ok");
        assert_eq!(buckets[0][1].start, 5.0);
    }

    #[test]
    fn test_empty_lines_keep_their_bucket() {
        let buckets = parse_highlighted("a\n\n\nb", 4);
        assert_eq!(buckets.len(), 4);
        assert!(buckets[1].is_empty());
        assert!(buckets[2].is_empty());
        assert_eq!(buckets[3][0].text, "b");
    }

    #[test]
    fn test_crlf_line_endings() {
        let buckets = parse_highlighted("a\r\nb\r\n", 3);
        assert_eq!(buckets[0][0].text, "a");
        assert_eq!(buckets[1][0].text, "b");
        assert!(buckets[2].is_empty());
    }

    #[test]
    fn test_malformed_markup_is_plain_text() {
        let buckets = parse_highlighted(r#"<span class="hljs-keyword">fn x <b"#, 1);
        let text: String = buckets[0].iter().map(|s| s.text.as_str()).collect();
        assert_eq!(text, r#"<span class="hljs-keyword">fn x <b"#);
        assert!(buckets[0].iter().all(|s| s.color == DEFAULT_COLOR));
    }

    #[test]
    fn test_invalid_class_name_is_plain_text() {
        let markup = r#"<span class="a b">x</span>"#;
        let text: String = parse_highlighted(markup, 1)[0]
            .iter()
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(text, markup);
    }

    #[test]
    fn test_unknown_class_uses_default_color() {
        let buckets = parse_highlighted(r#"<span class="hljs-section">x</span>"#, 1);
        assert_eq!(buckets[0][0].color, DEFAULT_COLOR);
    }

    #[test]
    fn test_extra_line_breaks_grow_buckets() {
        let buckets = parse_highlighted("a\nb\nc", 1);
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[2][0].text, "c");
    }

    proptest! {
        #[test]
        fn plain_text_survives_parsing(lines in prop::collection::vec("[a-z (){};=]{0,24}", 1..6)) {
            let code = lines.join("\n");
            let markup = crate::markup::escape_html(&code);
            let buckets = parse_highlighted(&markup, lines.len());

            prop_assert_eq!(buckets.len(), lines.len());
            for (bucket, line) in buckets.iter().zip(&lines) {
                let text: String = bucket.iter().map(|s| s.text.as_str()).collect();
                prop_assert_eq!(&text, line);
                prop_assert!(bucket.iter().all(|s| !s.text.is_empty()));
            }
        }
    }
}
