//! Embedia Core Library
//!
//! This crate provides configuration, error types, and the embed renderer
//! that are shared across all Embedia components.

pub mod config;
pub mod embed;
pub mod error;

// Re-export commonly used types
pub use config::Config;
pub use embed::{
    attribute_string, render_iframe_embed, render_single_element_embed, resolve_embed_url,
    style_string, EmbedSpec,
};
pub use error::{AppError, ErrorMetadata, LogLevel};
