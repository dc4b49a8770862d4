use std::collections::HashMap;
use std::num::NonZeroUsize;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};
use lru::LruCache;

const MEASURE_CACHE_CAPACITY: usize = 4096;

#[derive(Hash, PartialEq, Eq, Clone)]
struct MeasureKey {
    text: String,
    font_family: String,
    font_size_bits: u32,
}

/// Width of a run of text set in a given font.
///
/// Layout and painting must share one implementation so wrap decisions and
/// pixel positions agree.
pub trait TextMeasure {
    fn measure_text(&mut self, text: &str, font_family: &str, font_size: f32) -> f32;
}

/// Splits a CSS-style family list such as
/// `JetBrains Mono, Consolas, "Courier New", monospace`.
pub fn parse_font_stack(stack: &str) -> Vec<String> {
    stack
        .split(',')
        .map(|family| family.trim().trim_matches(|c| c == '"' || c == '\''))
        .filter(|family| !family.is_empty())
        .map(str::to_string)
        .collect()
}

/// Measures with cosmic-text against the installed system fonts.
pub struct CosmicTextMeasure {
    font_system: FontSystem,
    cache: LruCache<MeasureKey, f32>,
    resolved_families: HashMap<String, ResolvedFamily>,
}

#[derive(Clone)]
enum ResolvedFamily {
    Named(String),
    Monospace,
    SansSerif,
    Serif,
}

impl CosmicTextMeasure {
    pub fn new() -> Self {
        Self::with_font_system(FontSystem::new())
    }

    pub fn with_font_system(font_system: FontSystem) -> Self {
        Self {
            font_system,
            cache: LruCache::new(
                NonZeroUsize::new(MEASURE_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            ),
            resolved_families: HashMap::new(),
        }
    }

    /// Picks the first family of the stack that is installed, the way a
    /// browser would, so measurements follow the face that gets painted.
    fn resolve_family(&mut self, stack: &str) -> ResolvedFamily {
        if let Some(resolved) = self.resolved_families.get(stack) {
            return resolved.clone();
        }

        let mut resolved = ResolvedFamily::Monospace;
        for family in parse_font_stack(stack) {
            let generic = match family.to_ascii_lowercase().as_str() {
                "monospace" => Some(ResolvedFamily::Monospace),
                "sans-serif" => Some(ResolvedFamily::SansSerif),
                "serif" => Some(ResolvedFamily::Serif),
                _ => None,
            };
            if let Some(generic) = generic {
                resolved = generic;
                break;
            }

            let installed = self.font_system.db().faces().any(|face| {
                face.families
                    .iter()
                    .any(|(name, _)| name.eq_ignore_ascii_case(&family))
            });
            if installed {
                resolved = ResolvedFamily::Named(family);
                break;
            }
        }

        log::debug!("font stack '{}' resolved", stack);
        self.resolved_families
            .insert(stack.to_string(), resolved.clone());
        resolved
    }
}

impl TextMeasure for CosmicTextMeasure {
    fn measure_text(&mut self, text: &str, font_family: &str, font_size: f32) -> f32 {
        if text.is_empty() {
            return 0.0;
        }

        let key = MeasureKey {
            text: text.to_string(),
            font_family: font_family.to_string(),
            font_size_bits: font_size.to_bits(),
        };

        if let Some(cached) = self.cache.get(&key) {
            return *cached;
        }

        let resolved = self.resolve_family(font_family);
        let family = match &resolved {
            ResolvedFamily::Named(name) => Family::Name(name),
            ResolvedFamily::Monospace => Family::Monospace,
            ResolvedFamily::SansSerif => Family::SansSerif,
            ResolvedFamily::Serif => Family::Serif,
        };

        let mut buffer = Buffer::new(
            &mut self.font_system,
            Metrics {
                font_size,
                line_height: font_size * 1.5,
            },
        );
        buffer.set_size(&mut self.font_system, None, None);

        let attrs = Attrs::new().family(family);
        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);

        // Summing glyph advances keeps whitespace-only runs at their real
        // width.
        let width: f32 = buffer
            .layout_runs()
            .map(|run| run.glyphs.iter().map(|glyph| glyph.w).sum::<f32>())
            .sum();

        self.cache.put(key, width);
        width
    }
}

impl Default for CosmicTextMeasure {
    fn default() -> Self {
        Self::new()
    }
}

/// Every character advances by the same amount, scaled with the font size.
///
/// `advance_ratio` is the advance as a fraction of the font size; monospace
/// faces sit around 0.6.
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvanceMeasure {
    pub advance_ratio: f32,
}

impl FixedAdvanceMeasure {
    pub fn new(advance_ratio: f32) -> Self {
        Self { advance_ratio }
    }
}

impl Default for FixedAdvanceMeasure {
    fn default() -> Self {
        Self::new(0.6)
    }
}

impl TextMeasure for FixedAdvanceMeasure {
    fn measure_text(&mut self, text: &str, _font_family: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * self.advance_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::{FixedAdvanceMeasure, TextMeasure, parse_font_stack};

    #[test]
    fn font_stack_strips_quotes_and_blanks() {
        assert_eq!(
            parse_font_stack(r#"JetBrains Mono, Consolas, "Courier New", monospace"#),
            vec!["JetBrains Mono", "Consolas", "Courier New", "monospace"]
        );
        assert_eq!(parse_font_stack(" 'Fira Code' ,, "), vec!["Fira Code"]);
        assert!(parse_font_stack("").is_empty());
    }

    #[test]
    fn fixed_advance_counts_chars() {
        let mut measure = FixedAdvanceMeasure::new(0.5);
        assert_eq!(measure.measure_text("abcd", "monospace", 10.0), 20.0);
        assert_eq!(measure.measure_text("é ", "monospace", 10.0), 10.0);
        assert_eq!(measure.measure_text("", "monospace", 10.0), 0.0);
    }
}
