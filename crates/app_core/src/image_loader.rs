//! Image fetching and decoding service

use crate::catalog::{ImageSource, SourceKind};
use crate::decode_cache::ImageDecoder;
use crate::AppError;
use async_trait::async_trait;
use crossbeam_channel::{unbounded, Sender};
use image::{GenericImageView, ImageReader};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tokio::sync::oneshot;

/// Threads serving remote fetches
const FETCH_WORKERS: usize = 3;

/// Decoded RGBA8 image ready for texture upload
#[derive(Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Load request
#[derive(Debug)]
struct LoadRequest {
    src: ImageSource,
    callback: oneshot::Sender<Result<DecodedImage, AppError>>,
}

/// Image loader service backed by worker threads.
///
/// Local assets and remote URLs are served by separate workers, so a slow
/// download never holds up an asset read.
pub struct ImageLoader {
    /// Asset reads, one worker
    local_tx: Sender<LoadRequest>,
    /// HTTP fetches, shared by the fetch pool
    remote_tx: Sender<LoadRequest>,
}

impl ImageLoader {
    /// Create a new image loader.
    ///
    /// Relative asset sources resolve against `assets_dir`; images wider or taller
    /// than `max_dimension` are downscaled.
    pub fn new(assets_dir: PathBuf, max_dimension: Option<u32>) -> Self {
        Self {
            local_tx: Self::spawn_lane("image-loader", 1, &assets_dir, max_dimension),
            remote_tx: Self::spawn_lane("image-fetch", FETCH_WORKERS, &assets_dir, max_dimension),
        }
    }

    /// Start `workers` threads draining one request channel.
    ///
    /// If no thread starts, the receiver is dropped here and every load on this
    /// lane reports SystemResource.
    fn spawn_lane(
        name: &str,
        workers: usize,
        assets_dir: &Path,
        max_dimension: Option<u32>,
    ) -> Sender<LoadRequest> {
        let (request_tx, request_rx) = unbounded::<LoadRequest>();

        // Blocking I/O and decode stay off the async runtime
        for i in 0..workers {
            let request_rx = request_rx.clone();
            let assets_dir = assets_dir.to_path_buf();
            let spawned = std::thread::Builder::new()
                .name(format!("{}-{}", name, i))
                .spawn(move || {
                    while let Ok(request) = request_rx.recv() {
                        let result = Self::load_sync(&request.src, &assets_dir, max_dimension);
                        let _ = request.callback.send(result);
                    }
                    tracing::debug!("Image loader worker stopped");
                });

            if let Err(e) = spawned {
                tracing::error!("Failed to spawn {} worker {}: {}", name, i, e);
            }
        }

        request_tx
    }

    /// Load and decode an image asynchronously
    pub async fn load(&self, src: &ImageSource) -> Result<DecodedImage, AppError> {
        let (tx, rx) = oneshot::channel();
        let lane = match src.kind() {
            SourceKind::Remote(_) => &self.remote_tx,
            SourceKind::Asset(_) => &self.local_tx,
        };

        lane.send(LoadRequest {
            src: src.clone(),
            callback: tx,
        })
        .map_err(|_| AppError::SystemResource("Image loader channel closed".into()))?;

        rx.await
            .map_err(|_| AppError::SystemResource("Image loader response failed".into()))?
    }

    /// Fetch and decode (called from the worker thread)
    fn load_sync(
        src: &ImageSource,
        assets_dir: &Path,
        max_dimension: Option<u32>,
    ) -> Result<DecodedImage, AppError> {
        tracing::debug!("Loading image: {}", src);

        let data = Self::fetch_bytes(src, assets_dir)?;
        let image = decode_bytes(&data, max_dimension)?;

        tracing::debug!("Decoded {} ({}x{})", src, image.width, image.height);
        Ok(image)
    }

    fn fetch_bytes(src: &ImageSource, assets_dir: &Path) -> Result<Vec<u8>, AppError> {
        match src.kind() {
            SourceKind::Remote(url) => {
                let response = reqwest::blocking::get(url)?.error_for_status()?;
                Ok(response.bytes()?.to_vec())
            }
            SourceKind::Asset(_) => {
                let path = src
                    .asset_path(assets_dir)
                    .ok_or_else(|| AppError::AssetNotFound(src.to_string()))?;

                if !path.exists() {
                    return Err(AppError::AssetNotFound(path.display().to_string()));
                }
                if !is_supported_image(&path) {
                    return Err(AppError::UnsupportedFormat(path.display().to_string()));
                }

                Ok(std::fs::read(&path)?)
            }
        }
    }
}

#[async_trait]
impl ImageDecoder for ImageLoader {
    async fn decode(&self, src: &ImageSource) -> Result<DecodedImage, AppError> {
        self.load(src).await
    }
}

/// Decode an encoded image buffer into RGBA8, downscaling past `max_dimension`
pub fn decode_bytes(data: &[u8], max_dimension: Option<u32>) -> Result<DecodedImage, AppError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| AppError::ImageDecode(e.to_string()))?;

    let img = reader.decode()?;

    let img = match max_dimension {
        Some(max) => {
            let (w, h) = img.dimensions();
            if w > max || h > max {
                img.thumbnail(max, max)
            } else {
                img
            }
        }
        None => img,
    };

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(DecodedImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

/// Check if a file is a supported image format
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            matches!(
                e.to_lowercase().as_str(),
                "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp"
            )
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 10, 10, 255]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_is_supported_image() {
        assert!(is_supported_image(Path::new("test.jpg")));
        assert!(is_supported_image(Path::new("test.PNG")));
        assert!(is_supported_image(Path::new("test.WebP")));
        assert!(!is_supported_image(Path::new("test.txt")));
        assert!(!is_supported_image(Path::new("test.mp4")));
    }

    #[test]
    fn test_decode_bytes_downscales() {
        let decoded = decode_bytes(&png_bytes(64, 32), Some(16)).unwrap();
        assert_eq!(decoded.size(), (16, 8));
        assert_eq!(decoded.pixels.len(), 16 * 8 * 4);

        let full = decode_bytes(&png_bytes(64, 32), None).unwrap();
        assert_eq!(full.size(), (64, 32));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_bytes(b"not an image", None).is_err());
    }

    #[tokio::test]
    async fn test_stalled_fetch_does_not_block_assets() {
        // Accepts connections into the backlog but never answers
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/slow.png", listener.local_addr().unwrap());

        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images/red.png"), png_bytes(4, 3)).unwrap();

        let loader = std::sync::Arc::new(ImageLoader::new(dir.path().to_path_buf(), None));
        let remote = {
            let loader = loader.clone();
            tokio::spawn(async move { loader.load(&ImageSource::new(url)).await })
        };
        tokio::task::yield_now().await;

        let local = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            loader.load(&ImageSource::new("images/red.png")),
        )
        .await
        .expect("asset load waited on the remote fetch")
        .unwrap();
        assert_eq!(local.size(), (4, 3));

        remote.abort();
        drop(listener);
    }

    #[tokio::test]
    async fn test_loader_reads_assets() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images/red.png"), png_bytes(4, 3)).unwrap();

        let loader = ImageLoader::new(dir.path().to_path_buf(), None);
        let decoded = loader.load(&ImageSource::new("images/red.png")).await.unwrap();
        assert_eq!(decoded.size(), (4, 3));

        let missing = loader.load(&ImageSource::new("images/absent.png")).await;
        assert!(matches!(missing, Err(AppError::AssetNotFound(_))));
    }
}
