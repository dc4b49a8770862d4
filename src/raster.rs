use std::path::Path;
use std::sync::Arc;

use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

use crate::error::{Error, Result};

/// Output encodings for a rendered scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Svg,
    Pdf,
}

impl OutputFormat {
    /// Picks the format from a file extension (`png`, `svg`, `pdf`).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "svg" => Some(Self::Svg),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Generic families to point at installed faces.
#[derive(Debug, Default, PartialEq)]
struct FallbackFamilies {
    sans: Option<String>,
    serif: Option<String>,
    mono: Option<String>,
}

fn pick_fallback_families<'a>(families: impl Iterator<Item = &'a str>) -> FallbackFamilies {
    let mut sans_family: Option<&str> = None;
    let mut serif_family: Option<&str> = None;
    let mut mono_family: Option<&str> = None;
    let mut first_family: Option<&str> = None;

    for family in families {
        if first_family.is_none() {
            first_family = Some(family);
        }

        let lower = family.to_ascii_lowercase();
        if sans_family.is_none() && lower.contains("sans") {
            sans_family = Some(family);
        }
        if serif_family.is_none() && lower.contains("serif") && !lower.contains("sans") {
            serif_family = Some(family);
        }
        if mono_family.is_none() && (lower.contains("mono") || lower.contains("code")) {
            mono_family = Some(family);
        }
    }

    FallbackFamilies {
        sans: sans_family.or(first_family).map(str::to_string),
        serif: serif_family.or(first_family).map(str::to_string),
        mono: mono_family
            .or(sans_family)
            .or(first_family)
            .map(str::to_string),
    }
}

fn configure_font_fallbacks(fontdb: &mut usvg::fontdb::Database) {
    let picked = pick_fallback_families(
        fontdb
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.as_str())),
    );

    if let Some(family) = picked.sans {
        fontdb.set_sans_serif_family(family);
    }
    if let Some(family) = picked.serif {
        fontdb.set_serif_family(family);
    }
    if let Some(family) = picked.mono {
        fontdb.set_monospace_family(family);
    }
}

fn configure_font_fallbacks_svg2pdf(fontdb: &mut svg2pdf::usvg::fontdb::Database) {
    let picked = pick_fallback_families(
        fontdb
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.as_str())),
    );

    if let Some(family) = picked.sans {
        fontdb.set_sans_serif_family(family);
    }
    if let Some(family) = picked.serif {
        fontdb.set_serif_family(family);
    }
    if let Some(family) = picked.mono {
        fontdb.set_monospace_family(family);
    }
}

/// Turns SVG scenes into image bytes. Holds the font databases so repeated
/// renders do not rescan the system fonts. svg2pdf parses with its own usvg,
/// so PDF output keeps a second database.
pub struct Rasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
    pdf_fontdb: Arc<svg2pdf::usvg::fontdb::Database>,
}

impl Rasterizer {
    /// Loads system fonts plus any faces in a local `fonts/` directory.
    pub fn new() -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();

        let mut pdf_fontdb = svg2pdf::usvg::fontdb::Database::new();
        pdf_fontdb.load_system_fonts();

        let local_fonts = Path::new("fonts");
        if local_fonts.is_dir() {
            fontdb.load_fonts_dir(local_fonts);
            pdf_fontdb.load_fonts_dir(local_fonts);
        }

        configure_font_fallbacks(&mut fontdb);
        configure_font_fallbacks_svg2pdf(&mut pdf_fontdb);
        log::debug!("rasterizer loaded {} font faces", fontdb.len());

        Self {
            fontdb: Arc::new(fontdb),
            pdf_fontdb: Arc::new(pdf_fontdb),
        }
    }

    /// Rasterizes with the given faces only. PDF output gets no faces, so its
    /// text is dropped.
    pub fn with_database(fontdb: usvg::fontdb::Database) -> Self {
        Self {
            fontdb: Arc::new(fontdb),
            pdf_fontdb: Arc::new(svg2pdf::usvg::fontdb::Database::new()),
        }
    }

    fn parse(&self, svg: &str) -> Result<usvg::Tree> {
        let mut opts = usvg::Options::default();
        opts.fontdb = Arc::clone(&self.fontdb);

        usvg::Tree::from_str(svg, &opts)
            .map_err(|e| Error::Encoding(format!("Failed to parse SVG: {}", e)))
    }

    pub fn to_png(&self, svg: &str) -> Result<Vec<u8>> {
        let tree = self.parse(svg)?;

        let width = tree.size().width().ceil() as u32;
        let height = tree.size().height().ceil() as u32;

        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            Error::Encoding(format!("Failed to create {}x{} pixmap", width, height))
        })?;

        resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

        pixmap
            .encode_png()
            .map_err(|e| Error::Encoding(format!("Failed to encode PNG: {}", e)))
    }

    pub fn to_pdf(&self, svg: &str) -> Result<Vec<u8>> {
        let mut opts = svg2pdf::usvg::Options::default();
        opts.fontdb = Arc::clone(&self.pdf_fontdb);

        let tree = svg2pdf::usvg::Tree::from_str(svg, &opts)
            .map_err(|e| Error::Encoding(format!("Failed to parse SVG: {}", e)))?;

        // Text as paths, so viewers without the font still show the code.
        let mut options = svg2pdf::ConversionOptions::default();
        options.embed_text = false;
        let page_options = svg2pdf::PageOptions::default();

        svg2pdf::to_pdf(&tree, options, page_options)
            .map_err(|e| Error::Encoding(format!("Failed to convert SVG to PDF: {}", e)))
    }

    pub fn encode(&self, svg: String, format: OutputFormat) -> Result<Vec<u8>> {
        match format {
            OutputFormat::Svg => Ok(svg.into_bytes()),
            OutputFormat::Png => self.to_png(&svg),
            OutputFormat::Pdf => self.to_pdf(&svg),
        }
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}
