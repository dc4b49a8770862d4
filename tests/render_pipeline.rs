use code_picture::palette::DEFAULT_COLOR;
use code_picture::{
    CodeImageRenderer, FixedAdvanceMeasure, OutputFormat, PlainHighlighter, Rasterizer,
    RenderConfig, SyntectHighlighter,
};
use resvg::usvg::fontdb::Database;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn renderer(config: RenderConfig) -> CodeImageRenderer<SyntectHighlighter, FixedAdvanceMeasure> {
    CodeImageRenderer::new(
        config,
        SyntectHighlighter::new(),
        FixedAdvanceMeasure::default(),
        Rasterizer::with_database(Database::new()),
    )
}

fn png_size(png: &[u8]) -> (u32, u32) {
    let width = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
    let height = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
    (width, height)
}

#[test]
fn renders_png_sized_by_rows() {
    let mut renderer = renderer(RenderConfig::default());
    let code = "fn main() {\n    println!(\"hi\");\n}";
    let png = renderer.render_png(code, "rust").expect("render png");

    assert_eq!(png[..8], PNG_SIGNATURE);
    let (width, height) = png_size(&png);
    // 120 columns of 16.8px plus 48px padding on each side.
    assert!((2112..=2113).contains(&width), "width {}", width);
    // 3 rows of 42px plus padding.
    assert_eq!(height, 3 * 42 + 2 * 48);
}

#[test]
fn rendering_is_deterministic() {
    let code = "def f(x):\n    return x * 2  # double\n";
    let first = renderer(RenderConfig::default())
        .render_png(code, "python")
        .expect("first render");
    let second = renderer(RenderConfig::default())
        .render_png(code, "python")
        .expect("second render");
    assert_eq!(first, second);
}

#[test]
fn empty_code_is_a_single_blank_row() {
    let mut renderer = renderer(RenderConfig::default());
    let layout = renderer.layout("", "rust");
    assert_eq!(layout.lines.len(), 1);
    assert!(layout.lines[0].spans.is_empty());

    let png = renderer.render_png("", "rust").expect("render empty");
    assert_eq!(png_size(&png).1, 42 + 2 * 48);
}

#[test]
fn unknown_language_renders_in_default_color() {
    let mut renderer = renderer(RenderConfig::default());
    let layout = renderer.layout("a\nb", "not-a-language");

    assert_eq!(layout.lines.len(), 2);
    assert!(
        layout
            .lines
            .iter()
            .flat_map(|line| &line.spans)
            .all(|span| span.color == DEFAULT_COLOR)
    );
    assert!(renderer.render_png("a\nb", "not-a-language").is_ok());
}

#[test]
fn long_lines_wrap_and_keep_indentation() {
    let config = RenderConfig {
        max_chars_per_line: 8,
        ..RenderConfig::default()
    };
    let mut renderer = CodeImageRenderer::new(
        config,
        PlainHighlighter,
        FixedAdvanceMeasure::default(),
        Rasterizer::with_database(Database::new()),
    );
    let layout = renderer.layout("  foo(bar)\nx", "plaintext");

    assert_eq!(layout.lines.len(), 3);
    assert_eq!(layout.lines[0].text(), "  ");
    assert_eq!(layout.lines[1].text(), "foo(bar)");
    assert_eq!(layout.lines[1].indent, 2);
    assert_eq!(layout.lines[2].text(), "x");
    assert_eq!(layout.lines[2].indent, 0);

    let (_, height) = layout.size();
    assert_eq!(height, 3.0 * layout.metrics.line_height + 2.0 * layout.metrics.padding);
}

#[test]
fn rows_never_fewer_than_source_lines() {
    let mut renderer = renderer(RenderConfig {
        max_chars_per_line: 10,
        ..RenderConfig::default()
    });
    let code = "let value = compute(first, second, third);\n\n// tail\n";
    let layout = renderer.layout(code, "rust");

    assert!(layout.lines.len() >= code.split('\n').count());
    let text: String = layout.lines.iter().map(|line| line.text()).collect();
    assert_eq!(text, code.replace('\n', ""));
}

#[test]
fn svg_output_is_a_document() {
    let mut renderer = renderer(RenderConfig::default());
    let svg = renderer
        .render("let a = 1 < 2;", "rust", OutputFormat::Svg)
        .expect("render svg");
    let svg = String::from_utf8(svg).expect("utf-8 svg");

    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("&lt;"));
    assert!(svg.ends_with("</svg>"));
}

#[test]
fn pdf_output_has_pdf_header() {
    let mut renderer = renderer(RenderConfig::default());
    let pdf = renderer
        .render("fn main() {}\n", "rust", OutputFormat::Pdf)
        .expect("render pdf");
    assert!(pdf.starts_with(b"%PDF-"));
}
