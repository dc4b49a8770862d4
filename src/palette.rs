//! Fixed One Dark palette keyed by highlight token class.

/// Canvas background.
pub const BACKGROUND_COLOR: &str = "#282C34";
/// Plain text and any class missing from [`TOKEN_COLORS`].
pub const DEFAULT_COLOR: &str = "#ABB2BF";

const TOKEN_COLORS: &[(&str, &str)] = &[
    ("hljs-keyword", "#C678DD"),
    ("hljs-string", "#98C379"),
    ("hljs-number", "#D19A66"),
    ("hljs-comment", "#5C6370"),
    ("hljs-function", "#61AFEF"),
    ("hljs-title", "#61AFEF"),
    ("hljs-params", "#ABB2BF"),
    ("hljs-built_in", "#E6C07B"),
    ("hljs-literal", "#56B6C2"),
    ("hljs-type", "#E6C07B"),
    ("hljs-meta", "#ABB2BF"),
    ("hljs-operator", "#56B6C2"),
    ("hljs-property", "#E06C75"),
    ("hljs-variable", "#E06C75"),
];

/// Looks up the display color for a token class. `None` is plain text.
pub fn color_for_class(class: Option<&str>) -> &'static str {
    let Some(class) = class else {
        return DEFAULT_COLOR;
    };

    TOKEN_COLORS
        .iter()
        .find(|(name, _)| *name == class)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_COLOR)
}
