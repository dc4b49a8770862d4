//! Highlighters turn code into flat `<span class="hljs-…">` markup, the
//! format [`crate::markup::parse_highlighted`] reads back.
//!
//! A highlighter never fails: languages it cannot handle come back as
//! escaped plain text, which renders in the default color.

use std::str::FromStr;

use log::{debug, warn};
use syntect::easy::ScopeRegionIterator;
use syntect::highlighting::ScopeSelectors;
use syntect::parsing::{ParseState, ScopeStack, SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::error::{Error, Result};
use crate::markup::escape_html;

pub trait Highlighter {
    fn highlight(&self, code: &str, language: &str) -> String;
}

/// Leaves everything unhighlighted.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, code: &str, _language: &str) -> String {
        escape_html(code)
    }
}

/// Editor language ids that syntect knows under another token.
const LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("javascriptreact", "js"),
    ("typescript", "js"),
    ("typescriptreact", "js"),
    ("shellscript", "sh"),
    ("csharp", "cs"),
    ("objective-c", "m"),
    ("objective-cpp", "mm"),
    ("jsonc", "json"),
    ("plaintext", "txt"),
];

/// Scope selectors per highlight class. When several match, the most
/// specific selector wins; ties go to the earlier entry.
const CLASS_SELECTORS: &[(&str, &str)] = &[
    ("comment", "hljs-comment"),
    ("string, constant.character", "hljs-string"),
    ("constant.numeric", "hljs-number"),
    ("constant.language", "hljs-literal"),
    ("keyword.operator, punctuation.accessor", "hljs-operator"),
    ("keyword, storage", "hljs-keyword"),
    (
        "entity.name.function, entity.name.class, entity.name.struct, entity.name.enum, entity.name.trait",
        "hljs-title",
    ),
    ("variable.function, meta.function-call", "hljs-function"),
    ("variable.parameter", "hljs-params"),
    ("support.function, support.macro, support.constant", "hljs-built_in"),
    ("entity.name.type, support.type, support.class, storage.type.numeric", "hljs-type"),
    ("meta.preprocessor, meta.annotation, meta.attribute, entity.name.tag", "hljs-meta"),
    (
        "variable.other.member, variable.other.property, meta.property-name, support.type.property-name, entity.other.attribute-name",
        "hljs-property",
    ),
    ("variable.other.constant, variable.language", "hljs-variable"),
];

/// Highlighting backed by syntect's bundled grammars.
pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
    selectors: Vec<(ScopeSelectors, &'static str)>,
}

impl SyntectHighlighter {
    pub fn new() -> Self {
        Self::with_syntax_set(SyntaxSet::load_defaults_newlines())
    }

    pub fn with_syntax_set(syntax_set: SyntaxSet) -> Self {
        let selectors = CLASS_SELECTORS
            .iter()
            .filter_map(|(selector, class)| match ScopeSelectors::from_str(selector) {
                Ok(parsed) => Some((parsed, *class)),
                Err(e) => {
                    warn!("ignoring scope selector '{}': {:?}", selector, e);
                    None
                }
            })
            .collect();

        Self {
            syntax_set,
            selectors,
        }
    }

    /// Names of the languages the bundled grammars cover.
    pub fn languages(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .syntax_set
            .syntaxes()
            .iter()
            .map(|syntax| syntax.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn find_syntax(&self, language: &str) -> Option<&SyntaxReference> {
        let normalized = language.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return None;
        }

        let token = LANGUAGE_ALIASES
            .iter()
            .find(|(id, _)| *id == normalized)
            .map(|(_, token)| *token)
            .unwrap_or(normalized.as_str());

        self.syntax_set
            .find_syntax_by_token(token)
            .or_else(|| self.syntax_set.find_syntax_by_extension(token))
    }

    fn classify(&self, stack: &ScopeStack) -> Option<&'static str> {
        let scopes = stack.as_slice();
        let mut best = None;

        for (selector, class) in &self.selectors {
            if let Some(power) = selector.does_match(scopes) {
                match best {
                    Some((best_power, _)) if best_power >= power => {}
                    _ => best = Some((power, *class)),
                }
            }
        }

        best.map(|(_, class)| class)
    }

    fn highlight_with(&self, code: &str, syntax: &SyntaxReference) -> Result<String> {
        let mut state = ParseState::new(syntax);
        let mut stack = ScopeStack::new();
        let mut writer = MarkupWriter::default();

        for line in LinesWithEndings::from(code) {
            let ops = state
                .parse_line(line, &self.syntax_set)
                .map_err(|e| Error::Highlight(e.to_string()))?;

            for (region, op) in ScopeRegionIterator::new(&ops, line) {
                stack
                    .apply(op)
                    .map_err(|e| Error::Highlight(format!("{:?}", e)))?;
                if region.is_empty() {
                    continue;
                }
                writer.push(self.classify(&stack), region);
            }
        }

        Ok(writer.finish())
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, language: &str) -> String {
        let Some(syntax) = self.find_syntax(language) else {
            debug!("no grammar for language '{}', rendering plain text", language);
            return escape_html(code);
        };

        match self.highlight_with(code, syntax) {
            Ok(markup) => markup,
            Err(e) => {
                warn!("{} ({}), rendering plain text", e, syntax.name);
                escape_html(code)
            }
        }
    }
}

/// Collects regions into markup, merging neighbours of the same class.
#[derive(Default)]
struct MarkupWriter {
    out: String,
    pending: String,
    pending_class: Option<&'static str>,
}

impl MarkupWriter {
    fn push(&mut self, class: Option<&'static str>, text: &str) {
        // Whitespace looks the same in every color; folding it into the
        // neighbouring class keeps the markup short.
        let class = if text.trim().is_empty() {
            self.pending_class
        } else {
            class
        };

        if class != self.pending_class {
            self.flush();
            self.pending_class = class;
        }
        self.pending.push_str(text);
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        let escaped = escape_html(&self.pending);
        match self.pending_class {
            Some(class) => {
                self.out.push_str("<span class=\"");
                self.out.push_str(class);
                self.out.push_str("\">");
                self.out.push_str(&escaped);
                self.out.push_str("</span>");
            }
            None => self.out.push_str(&escaped),
        }
        self.pending.clear();
    }

    fn finish(mut self) -> String {
        self.flush();
        self.out
    }
}
