pub mod axum_handler;
pub mod compositor;
pub mod config;
pub mod error;
pub mod font;
pub mod image_source;
pub mod overlay_renderer;
