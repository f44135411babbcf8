use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::application::error::ApplicationError;
use crate::domain::color::Color;
use crate::domain::image::OutputFormat;
use crate::domain::position::BoxAnchor;
use crate::domain::render_options::RenderOptions;
use crate::domain::text_overlay::DEFAULT_MAX_TEXT_CHARS;

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub font_dir: PathBuf,
    pub quote_font: String,
    pub attribution_font: String,
    pub render_defaults: RenderOptions,
    pub max_upload_bytes: usize,
    pub max_image_dimension: u32,
    pub max_text_chars: usize,
    pub request_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ApplicationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApplicationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let color = |key: &str, default: &str| Color::parse_hex(&var(key, default)).map_err(|e| invalid(key, e));

        let box_opacity: f32 = parse(&lookup, "BOX_OPACITY", 0.6)?;
        if !(0.0..=1.0).contains(&box_opacity) {
            return Err(invalid("BOX_OPACITY", "must be between 0.0 and 1.0"));
        }
        let font_scale: f32 = parse(&lookup, "FONT_SCALE", 0.05)?;
        if !(font_scale > 0.0 && font_scale <= 1.0) {
            return Err(invalid("FONT_SCALE", "must be in (0.0, 1.0]"));
        }
        let min_font_px: f32 = parse(&lookup, "MIN_FONT_PX", 12.0)?;
        if !(min_font_px >= 1.0) {
            return Err(invalid("MIN_FONT_PX", "must be at least 1"));
        }

        let render_defaults = RenderOptions {
            text_color: color("TEXT_COLOR", "#FFFFFF")?,
            box_color: color("BOX_COLOR", "#000000")?,
            box_opacity,
            anchor: BoxAnchor::parse(&var("BOX_ANCHOR", "center")).map_err(|e| invalid("BOX_ANCHOR", e))?,
            output_format: OutputFormat::parse(&var("OUTPUT_FORMAT", "png")).map_err(|e| invalid("OUTPUT_FORMAT", e))?,
            font_scale,
            min_font_px,
        };

        let max_image_dimension: u32 = parse(&lookup, "MAX_IMAGE_DIMENSION", 8192)?;
        if max_image_dimension == 0 {
            return Err(invalid("MAX_IMAGE_DIMENSION", "must be positive"));
        }
        let max_text_chars: usize = parse(&lookup, "MAX_QUOTE_CHARS", DEFAULT_MAX_TEXT_CHARS)?;
        if max_text_chars == 0 {
            return Err(invalid("MAX_QUOTE_CHARS", "must be positive"));
        }

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port: parse(&lookup, "PORT", 8000)?,
            font_dir: PathBuf::from(var("FONT_DIR", "DejaVu_Sans")),
            quote_font: var("QUOTE_FONT", "DejaVuSans-Bold.ttf"),
            attribution_font: var("ATTRIBUTION_FONT", "DejaVuSans-Oblique.ttf"),
            render_defaults,
            max_upload_bytes: parse(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            max_image_dimension,
            max_text_chars,
            request_timeout: Duration::from_secs(parse(&lookup, "REQUEST_TIMEOUT_SECS", 30)?),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ApplicationError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| invalid(key, e)),
        None => Ok(default),
    }
}

fn invalid(key: &str, reason: impl Display) -> ApplicationError {
    ApplicationError::ConfigurationError(format!("{}: {}", key, reason))
}
