use crate::domain::image::RenderedImage;
use crate::domain::render_options::RenderOptions;
use crate::domain::text_overlay::QuoteText;
use crate::infrastructure::error::InfrastructureError;

// 入力画像のバイト列とテキストから、合成済み画像を作る
#[cfg_attr(test, mockall::automock)]
pub trait OverlayRenderer {
    fn render(
        &self,
        image_bytes: &[u8],
        text: &QuoteText,
        options: &RenderOptions,
    ) -> Result<RenderedImage, InfrastructureError>;
}
