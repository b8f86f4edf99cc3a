//! Memoized decode-ahead cache
//!
//! Every distinct [`ImageSource`] is decoded at most once for the lifetime of
//! the cache. Requesters receive a shared completion future; concurrent
//! requests for the same source await the same decode. Entries are never
//! evicted; the gallery is small and fixed.

use crate::catalog::ImageSource;
use crate::image_loader::DecodedImage;
use crate::AppError;
use async_trait::async_trait;
use dashmap::DashMap;
use futures::future::{self, BoxFuture, FutureExt, Shared};
use std::sync::Arc;

/// Seam between the cache and whatever produces pixels
#[async_trait]
pub trait ImageDecoder: Send + Sync {
    async fn decode(&self, src: &ImageSource) -> Result<DecodedImage, AppError>;
}

/// Outcome of a decode completion. Failures still complete.
#[derive(Debug, Clone)]
pub enum Decoded {
    Ready(Arc<DecodedImage>),
    /// Load or decode failed; the caller proceeds anyway
    Failed,
    /// Empty source, nothing to decode
    Empty,
}

impl Decoded {
    pub fn image(&self) -> Option<&Arc<DecodedImage>> {
        match self {
            Decoded::Ready(image) => Some(image),
            Decoded::Failed | Decoded::Empty => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Decoded::Failed)
    }
}

/// Shared, memoized completion handed to every requester of a source
pub type DecodeCompletion = Shared<BoxFuture<'static, Decoded>>;

struct CacheInner {
    decoder: Arc<dyn ImageDecoder>,
    entries: DashMap<ImageSource, DecodeCompletion>,
}

/// Process-lifetime decode cache. Cloning yields another handle to the same cache.
#[derive(Clone)]
pub struct DecodeCache {
    inner: Arc<CacheInner>,
}

impl DecodeCache {
    pub fn new(decoder: Arc<dyn ImageDecoder>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                decoder,
                entries: DashMap::new(),
            }),
        }
    }

    /// Get the completion for `src`, starting a decode only on first request.
    ///
    /// The entry is inserted before anything is awaited, so a second caller in
    /// the same turn already sees it.
    pub fn ensure_decoded(&self, src: &ImageSource) -> DecodeCompletion {
        if src.is_empty() {
            return future::ready(Decoded::Empty).boxed().shared();
        }

        self.inner
            .entries
            .entry(src.clone())
            .or_insert_with(|| {
                tracing::trace!("Decode requested: {}", src);
                let decoder = Arc::clone(&self.inner.decoder);
                let src = src.clone();

                async move {
                    match decoder.decode(&src).await {
                        Ok(image) => Decoded::Ready(Arc::new(image)),
                        Err(e) if e.is_recoverable() => {
                            tracing::debug!("Decode failed for {}, continuing: {}", src, e);
                            Decoded::Failed
                        }
                        Err(e) => {
                            tracing::warn!("Decode failed for {}: {}", src, e);
                            Decoded::Failed
                        }
                    }
                }
                .boxed()
                .shared()
            })
            .value()
            .clone()
    }

    /// Drive the decode for `src` in the background so a later request is instant.
    ///
    /// Must be called from within a tokio runtime.
    pub fn prefetch(&self, src: &ImageSource) {
        if src.is_empty() || self.resolved(src).is_some() {
            return;
        }

        let completion = self.ensure_decoded(src);
        tokio::spawn(async move {
            completion.await;
        });
    }

    /// Outcome for `src` if its decode has already finished
    pub fn resolved(&self, src: &ImageSource) -> Option<Decoded> {
        self.inner
            .entries
            .get(src)
            .and_then(|entry| entry.value().peek().cloned())
    }

    pub fn is_cached(&self, src: &ImageSource) -> bool {
        self.inner.entries.contains_key(src)
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fake decoders shared by the cache and presentation tests

    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    pub fn tiny_image() -> DecodedImage {
        DecodedImage {
            width: 2,
            height: 1,
            pixels: vec![0; 8],
        }
    }

    /// Resolves immediately; counts decodes per source
    #[derive(Default)]
    pub struct CountingDecoder {
        calls: Mutex<HashMap<ImageSource, usize>>,
        total: AtomicUsize,
        fail_on: Option<ImageSource>,
    }

    impl CountingDecoder {
        pub fn failing_on(src: &str) -> Self {
            Self {
                fail_on: Some(ImageSource::new(src)),
                ..Default::default()
            }
        }

        pub fn calls_for(&self, src: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .get(&ImageSource::new(src))
                .copied()
                .unwrap_or(0)
        }

        pub fn total(&self) -> usize {
            self.total.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageDecoder for CountingDecoder {
        async fn decode(&self, src: &ImageSource) -> Result<DecodedImage, AppError> {
            *self.calls.lock().unwrap().entry(src.clone()).or_default() += 1;
            self.total.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;

            if self.fail_on.as_ref() == Some(src) {
                return Err(AppError::ImageDecode("corrupt".into()));
            }
            Ok(tiny_image())
        }
    }

    /// Holds every decode until the test releases that source
    #[derive(Default)]
    pub struct GatedDecoder {
        gates: Mutex<HashMap<ImageSource, Arc<Notify>>>,
    }

    impl GatedDecoder {
        fn gate(&self, src: &ImageSource) -> Arc<Notify> {
            Arc::clone(
                self.gates
                    .lock()
                    .unwrap()
                    .entry(src.clone())
                    .or_insert_with(|| Arc::new(Notify::new())),
            )
        }

        pub fn release(&self, src: &str) {
            // notify_one stores a permit, so releasing before the decode starts is fine
            self.gate(&ImageSource::new(src)).notify_one();
        }
    }

    #[async_trait]
    impl ImageDecoder for GatedDecoder {
        async fn decode(&self, src: &ImageSource) -> Result<DecodedImage, AppError> {
            let gate = self.gate(src);
            gate.notified().await;
            Ok(tiny_image())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[tokio::test]
    async fn test_concurrent_requests_share_one_decode() {
        let decoder = Arc::new(CountingDecoder::default());
        let cache = DecodeCache::new(decoder.clone());
        let src = ImageSource::new("images/a.png");

        let completions: Vec<_> = (0..8).map(|_| cache.ensure_decoded(&src)).collect();
        let outcomes = future::join_all(completions).await;

        assert_eq!(decoder.calls_for("images/a.png"), 1);
        assert!(outcomes.iter().all(|o| o.image().is_some()));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_repeat_request_is_instant() {
        let decoder = Arc::new(CountingDecoder::default());
        let cache = DecodeCache::new(decoder.clone());
        let src = ImageSource::new("images/a.png");

        cache.ensure_decoded(&src).await;
        assert!(cache.resolved(&src).is_some());

        let again = cache.ensure_decoded(&src);
        assert!(again.peek().is_some());
        again.await;
        assert_eq!(decoder.total(), 1);
    }

    #[tokio::test]
    async fn test_empty_source_completes_without_decoding() {
        let decoder = Arc::new(CountingDecoder::default());
        let cache = DecodeCache::new(decoder.clone());

        let outcome = cache.ensure_decoded(&ImageSource::new("")).await;
        assert!(matches!(outcome, Decoded::Empty));
        assert_eq!(decoder.total(), 0);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_failure_resolves_and_is_memoized() {
        let decoder = Arc::new(CountingDecoder::failing_on("broken.png"));
        let cache = DecodeCache::new(decoder.clone());
        let src = ImageSource::new("broken.png");

        assert!(cache.ensure_decoded(&src).await.is_failed());
        assert!(cache.ensure_decoded(&src).await.is_failed());
        assert_eq!(decoder.calls_for("broken.png"), 1);
    }

    #[tokio::test]
    async fn test_dropped_requester_does_not_restart_decode() {
        let decoder = Arc::new(GatedDecoder::default());
        let cache = DecodeCache::new(decoder.clone());
        let src = ImageSource::new("slow.png");

        let first = cache.ensure_decoded(&src);
        let abandoned = tokio::spawn(first);
        tokio::task::yield_now().await;
        abandoned.abort();

        decoder.release("slow.png");
        let outcome = cache.ensure_decoded(&src).await;
        assert!(outcome.image().is_some());
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_prefetch_warms_entry() {
        let decoder = Arc::new(CountingDecoder::default());
        let cache = DecodeCache::new(decoder.clone());
        let src = ImageSource::new("images/b.png");

        cache.prefetch(&src);
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }

        assert!(cache.resolved(&src).is_some());
        cache.prefetch(&src);
        assert_eq!(decoder.total(), 1);
    }
}
