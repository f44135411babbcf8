pub mod error;
pub mod overlay_service;
