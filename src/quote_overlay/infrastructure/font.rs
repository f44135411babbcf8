use std::fs;
use std::path::Path;

use rusttype::{point, Font, Scale};
use tracing::debug;

use super::error::InfrastructureError;
use crate::domain::error::DomainError;
use crate::domain::layout::{TextMeasurer, TextStyle};
use crate::domain::text_overlay::QuoteText;

/// Faces used for the quote and the attribution. Loaded once at startup and
/// shared read-only between requests.
pub struct FontSet {
    quote: Font<'static>,
    attribution: Font<'static>,
}

impl FontSet {
    pub fn load(font_dir: &Path, quote_file: &str, attribution_file: &str) -> Result<Self, InfrastructureError> {
        Ok(Self {
            quote: load_font(&font_dir.join(quote_file))?,
            attribution: load_font(&font_dir.join(attribution_file))?,
        })
    }

    pub fn font(&self, style: TextStyle) -> &Font<'static> {
        match style {
            TextStyle::Quote => &self.quote,
            TextStyle::Attribution => &self.attribution,
        }
    }

    /// Fails on the first character the corresponding face has no glyph for.
    pub fn check_glyphs(&self, text: &QuoteText) -> Result<(), DomainError> {
        let quote = text.quote().chars().map(|c| (c, TextStyle::Quote));
        let attribution = text
            .attribution()
            .into_iter()
            .flat_map(|a| a.chars())
            .map(|c| (c, TextStyle::Attribution));

        for (c, style) in quote.chain(attribution) {
            // 改行やタブは折り返しで消えるので描画されない
            if c.is_whitespace() {
                continue;
            }
            // GlyphId(0) は .notdef。制御文字も豆腐として描かれる
            if c.is_control() || self.font(style).glyph(c).id().0 == 0 {
                return Err(DomainError::UnsupportedGlyph(c));
            }
        }
        Ok(())
    }
}

impl TextMeasurer for FontSet {
    fn text_width(&self, text: &str, px: f32, style: TextStyle) -> f32 {
        self.font(style)
            .layout(text, Scale::uniform(px), point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    fn line_height(&self, px: f32, style: TextStyle) -> f32 {
        let v_metrics = self.font(style).v_metrics(Scale::uniform(px));
        v_metrics.ascent - v_metrics.descent + v_metrics.line_gap
    }
}

fn load_font(path: &Path) -> Result<Font<'static>, InfrastructureError> {
    let data = fs::read(path).map_err(|e| InfrastructureError::FontLoadError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let font = Font::try_from_vec(data).ok_or_else(|| InfrastructureError::FontLoadError {
        path: path.to_path_buf(),
        reason: "not a valid TrueType/OpenType font".to_string(),
    })?;
    debug!(path = %path.display(), glyphs = font.glyph_count(), "font loaded");
    Ok(font)
}
