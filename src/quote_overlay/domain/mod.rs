pub mod color;
pub mod error;
pub mod image;
pub mod layout;
pub mod overlay_box;
pub mod overlay_renderer_trait;
pub mod position;
pub mod render_options;
pub mod text_overlay;
