use super::color::Color;
use super::image::OutputFormat;
use super::position::BoxAnchor;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub text_color: Color,
    pub box_color: Color,
    /// 0.0 (invisible) ..= 1.0 (opaque)
    pub box_opacity: f32,
    pub anchor: BoxAnchor,
    pub output_format: OutputFormat,
    /// Initial quote size as a fraction of the image width.
    pub font_scale: f32,
    pub min_font_px: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            text_color: Color::WHITE,
            box_color: Color::BLACK,
            box_opacity: 0.6,
            anchor: BoxAnchor::Center,
            output_format: OutputFormat::Png,
            font_scale: 0.05,
            min_font_px: 12.0,
        }
    }
}
