use std::sync::Arc;
use std::time::Instant;
use super::error::ApplicationError;
use tracing::{info, instrument};

use crate::domain::color::Color;
use crate::domain::image::{OutputFormat, RenderedImage};
use crate::domain::overlay_renderer_trait::OverlayRenderer;
use crate::domain::render_options::RenderOptions;
use crate::domain::text_overlay::{QuoteText, DEFAULT_MAX_TEXT_CHARS};

/// One overlay request as received from the HTTP layer.
#[derive(Debug, Clone, Default)]
pub struct OverlayRequest {
    pub image: Vec<u8>,
    pub quote: String,
    pub attribution: Option<String>,
    pub output_format: Option<String>,
    pub text_color: Option<String>,
}

pub struct OverlayService {
    renderer: Arc<dyn OverlayRenderer + Send + Sync>, // トレイトオブジェクトとして保持
    defaults: RenderOptions,
    max_text_chars: usize,
}

impl OverlayService {
    pub fn new(renderer: Arc<dyn OverlayRenderer + Send + Sync>, defaults: RenderOptions) -> Self {
        Self {
            renderer,
            defaults,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
        }
    }

    pub fn with_max_text_chars(mut self, max_text_chars: usize) -> Self {
        self.max_text_chars = max_text_chars;
        self
    }

    /// Applies per-request overrides on top of the configured defaults.
    fn resolve_options(&self, request: &OverlayRequest) -> Result<RenderOptions, ApplicationError> {
        let mut options = self.defaults.clone();
        if let Some(format) = request.output_format.as_deref().filter(|f| !f.trim().is_empty()) {
            options.output_format = OutputFormat::parse(format)?;
        }
        if let Some(color) = request.text_color.as_deref().filter(|c| !c.trim().is_empty()) {
            options.text_color = Color::parse_hex(color)?;
        }
        Ok(options)
    }

    #[instrument(skip_all, fields(image_bytes = request.image.len(), quote_chars = request.quote.chars().count()))]
    pub async fn render_overlay(&self, request: OverlayRequest) -> Result<RenderedImage, ApplicationError> {
        let text = QuoteText::with_max_chars(&request.quote, request.attribution.as_deref(), self.max_text_chars)?;
        let options = self.resolve_options(&request)?;
        if request.image.is_empty() {
            return Err(ApplicationError::BadRequest("image is required".to_string()));
        }

        // 画像処理は CPU バウンドなのでブロッキングプールで実行する
        let renderer = Arc::clone(&self.renderer);
        let started = Instant::now();
        let rendered = tokio::task::spawn_blocking(move || renderer.render(&request.image, &text, &options))
            .await
            .map_err(|e| ApplicationError::RenderFailed(format!("render task failed: {}", e)))??;

        info!(
            width = rendered.width,
            height = rendered.height,
            format = rendered.format.content_type(),
            output_bytes = rendered.data.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "overlay rendered"
        );
        Ok(rendered)
    }
}
