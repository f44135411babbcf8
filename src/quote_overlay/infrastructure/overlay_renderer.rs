use crate::domain::image::{OutputFormat, RenderedImage};
use crate::domain::layout::{self, TextLayout};
use crate::domain::overlay_renderer_trait::OverlayRenderer;
use crate::domain::render_options::RenderOptions;
use crate::domain::text_overlay::QuoteText;
use super::compositor::fill_translucent_rect;
use super::error::InfrastructureError;
use super::font::FontSet;
use image::io::{Limits, Reader};
use image::{DynamicImage, ImageError, ImageFormat as InnerImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rusttype::Scale;
use std::io::Cursor;
use std::sync::Arc;
use tracing::debug;

// decode → layout → composite → encode を一度に行う OverlayRenderer の実装
pub struct RusttypeOverlayRenderer {
    fonts: Arc<FontSet>,
    max_image_dimension: u32,
}

impl RusttypeOverlayRenderer {
    pub fn new(fonts: Arc<FontSet>, max_image_dimension: u32) -> Self {
        Self {
            fonts,
            max_image_dimension,
        }
    }

    /// Lays out `text` for an image of the given size without touching pixels.
    pub fn plan(
        &self,
        width: u32,
        height: u32,
        text: &QuoteText,
        options: &RenderOptions,
    ) -> Result<TextLayout, InfrastructureError> {
        self.fonts.check_glyphs(text)?;
        Ok(layout::plan(width, height, text, options, self.fonts.as_ref()))
    }

    fn decode(&self, image_bytes: &[u8]) -> Result<RgbaImage, InfrastructureError> {
        let mut reader = Reader::new(Cursor::new(image_bytes))
            .with_guessed_format()
            .map_err(|e| InfrastructureError::InvalidImage(ImageError::IoError(e)))?;

        let mut limits = Limits::default();
        limits.max_image_width = Some(self.max_image_dimension);
        limits.max_image_height = Some(self.max_image_dimension);
        reader.limits(limits);

        debug!(format = ?reader.format(), "decoding source image");
        // インデックスカラーやグレースケールもここで RGBA8 に揃える
        let img = reader.decode().map_err(InfrastructureError::InvalidImage)?;
        Ok(img.to_rgba8())
    }

    fn encode(img: RgbaImage, format: OutputFormat) -> Result<Vec<u8>, InfrastructureError> {
        let mut buffer = Cursor::new(Vec::new());
        match format {
            OutputFormat::Png => img.write_to(&mut buffer, InnerImageFormat::Png),
            // JPEG はアルファを持てない
            OutputFormat::Jpeg => DynamicImage::ImageRgba8(img)
                .to_rgb8()
                .write_to(&mut buffer, InnerImageFormat::Jpeg),
        }
        .map_err(InfrastructureError::EncodeError)?;
        Ok(buffer.into_inner())
    }
}

impl OverlayRenderer for RusttypeOverlayRenderer {
    fn render(
        &self,
        image_bytes: &[u8],
        text: &QuoteText,
        options: &RenderOptions,
    ) -> Result<RenderedImage, InfrastructureError> {
        let mut img = self.decode(image_bytes)?;
        let (width, height) = img.dimensions();

        let layout = self.plan(width, height, text, options)?;
        debug_assert!(layout.overlay_box.fits_within(width, height));
        debug!(
            width,
            height,
            overlay_box = ?layout.overlay_box,
            quote_lines = layout.quote_line_count(),
            attribution_lines = layout.attribution_line_count(),
            quote_px = layout.quote_px,
            truncated = layout.truncated,
            "overlay laid out"
        );

        fill_translucent_rect(&mut img, &layout.overlay_box, options.box_color, options.box_opacity);

        let color = Rgba([
            options.text_color.r,
            options.text_color.g,
            options.text_color.b,
            options.text_color.a,
        ]);
        for line in &layout.lines {
            let font = self.fonts.font(line.style);
            draw_text_mut(&mut img, color, line.x, line.y, Scale::uniform(line.px), font, &line.text);
        }

        let data = Self::encode(img, options.output_format)?;
        Ok(RenderedImage::new(data, width, height, options.output_format))
    }
}
