//! Folio UI layer
//!
//! Provides:
//! - egui gallery components (thumbnail grid, lightbox)
//! - Decoded image to texture upload
//! - wgpu rendering pipeline
//! - Input handling

pub mod components;
pub mod input;
pub mod renderer;
pub mod textures;
pub mod theme;

pub use input::InputHandler;
pub use renderer::Renderer;
pub use textures::{TextureState, TextureStore};
pub use theme::Theme;
