//! Upload of decoded images to egui textures

use app_core::{DecodeCache, Decoded, ImageSource};
use egui::{ColorImage, TextureHandle, TextureOptions};
use std::collections::HashMap;
use std::time::Duration;

/// How often to look again at a source whose decode is still running
pub const PENDING_POLL: Duration = Duration::from_millis(100);

/// Texture availability for one source
#[derive(Clone)]
pub enum TextureState {
    Ready(TextureHandle),
    /// Decode not finished yet
    Pending,
    /// Decode failed or the source was empty
    Unavailable,
}

/// Lazily turns finished cache entries into GPU textures, once per source
pub struct TextureStore {
    cache: DecodeCache,
    textures: HashMap<ImageSource, Option<TextureHandle>>,
}

impl TextureStore {
    pub fn new(cache: DecodeCache) -> Self {
        Self {
            cache,
            textures: HashMap::new(),
        }
    }

    pub fn get(&mut self, ctx: &egui::Context, src: &ImageSource) -> TextureState {
        if let Some(uploaded) = self.textures.get(src) {
            return match uploaded {
                Some(handle) => TextureState::Ready(handle.clone()),
                None => TextureState::Unavailable,
            };
        }

        let Some(decoded) = self.cache.resolved(src) else {
            return TextureState::Pending;
        };

        let handle = match decoded {
            Decoded::Ready(image) => {
                let size = [image.width as usize, image.height as usize];
                let color = ColorImage::from_rgba_unmultiplied(size, &image.pixels);
                tracing::trace!("Uploading texture for {} ({}x{})", src, size[0], size[1]);
                Some(ctx.load_texture(src.as_str(), color, TextureOptions::LINEAR))
            }
            Decoded::Failed | Decoded::Empty => None,
        };

        self.textures.insert(src.clone(), handle.clone());
        match handle {
            Some(handle) => TextureState::Ready(handle),
            None => TextureState::Unavailable,
        }
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}
