//! Folio core domain logic
//!
//! This crate contains:
//! - Configuration
//! - Command ids
//! - Error types
//! - Image catalog
//! - Image loading and the decode cache
//! - Lightbox controller and drag gesture
//! - Crossfade presentation state

pub mod catalog;
pub mod command;
pub mod config;
pub mod crossfade;
pub mod decode_cache;
pub mod error;
pub mod gesture;
pub mod image_loader;
pub mod lightbox;

pub use catalog::{Catalog, ImageRecord, ImageSource, SourceKind};
pub use command::{Command, CommandId, CommandParams};
pub use config::{AppConfig, GalleryConfig, GeneralConfig, ViewerConfig};
pub use crossfade::{fit_size, Crossfade, Layer, LayerRole, TickReport};
pub use decode_cache::{DecodeCache, DecodeCompletion, Decoded, ImageDecoder};
pub use error::AppError;
pub use gesture::{DragGesture, DragState, Point, Swipe};
pub use image_loader::{decode_bytes, is_supported_image, DecodedImage, ImageLoader};
pub use lightbox::{DragFeedback, Lightbox, LightboxEvent, PointerKind, PointerResponse};
