//! Two-layer crossfade presentation
//!
//! The visible image is the `base` layer. A new target is decoded through the
//! [`DecodeCache`] first, mounted as the `overlay` at opacity 0, faded in over
//! the configured duration on the following frames, then promoted to `base`.
//! Time is supplied by the caller's frame clock, see [`Crossfade::tick`].
//!
//! Retargeting mid-fade freezes the old overlay's opacity; the next overlay
//! starts from that opacity and still gets the full duration.

use crate::catalog::ImageSource;
use crate::decode_cache::{DecodeCache, Decoded};
use crate::lightbox::DragFeedback;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_CROSSFADE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerRole {
    Base,
    Overlay,
}

/// One layer to draw, bottom to top
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub role: LayerRole,
    pub src: ImageSource,
    pub opacity: f32,
    pub scale: f32,
}

/// What a frame tick changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Another frame is needed (animation running or state changed)
    pub repaint: bool,
    /// Source that became the base during this tick
    pub promoted: Option<ImageSource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Waiting on the decode completion
    Decoding,
    /// Overlay mounted at opacity 0; the fade starts next tick
    Mounted,
    Fading { deadline: Instant },
}

/// Running fade: overlay opacity climbs from `from` to 1 starting at `started`
#[derive(Debug, Clone, Copy)]
struct FadeClock {
    from: f32,
    started: Instant,
}

#[derive(Debug)]
struct Transition {
    generation: u64,
    src: ImageSource,
    token: CancellationToken,
    phase: Phase,
}

/// Decode completion forwarded from a transition task to the UI thread
#[derive(Debug)]
struct DecodeReady {
    generation: u64,
    src: ImageSource,
    outcome: Decoded,
}

pub struct Crossfade {
    cache: DecodeCache,
    duration: Duration,
    base: Option<ImageSource>,
    overlay: Option<ImageSource>,
    fade: Option<FadeClock>,
    /// Overlay opacity while no fade clock runs
    held: f32,
    transition: Option<Transition>,
    generation: u64,
    ready_tx: mpsc::UnboundedSender<DecodeReady>,
    ready_rx: mpsc::UnboundedReceiver<DecodeReady>,
    feedback: DragFeedback,
    shut_down: bool,
}

impl Crossfade {
    pub fn new(cache: DecodeCache, duration: Duration) -> Self {
        let (ready_tx, ready_rx) = mpsc::unbounded_channel();
        Self {
            cache,
            duration,
            base: None,
            overlay: None,
            fade: None,
            held: 0.0,
            transition: None,
            generation: 0,
            ready_tx,
            ready_rx,
            feedback: DragFeedback::NONE,
            shut_down: false,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn base(&self) -> Option<&ImageSource> {
        self.base.as_ref()
    }

    pub fn overlay(&self) -> Option<&ImageSource> {
        self.overlay.as_ref()
    }

    /// Source the presentation is heading to
    pub fn target(&self) -> Option<&ImageSource> {
        self.transition
            .as_ref()
            .map(|t| &t.src)
            .or(self.base.as_ref())
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// No transition in progress and nothing stacked above the base
    pub fn is_settled(&self) -> bool {
        self.transition.is_none() && self.overlay.is_none()
    }

    /// Show `src` at once, abandoning any transition
    pub fn reset_to(&mut self, src: ImageSource) {
        if self.shut_down || src.is_empty() {
            return;
        }

        self.cancel_transition();
        self.clear_overlay();
        self.cache.prefetch(&src);
        self.base = Some(src);
    }

    /// Change the target image. Must be called from within a tokio runtime.
    pub fn set_target(&mut self, src: ImageSource) {
        if self.shut_down || src.is_empty() {
            return;
        }

        let Some(base) = &self.base else {
            self.reset_to(src);
            return;
        };

        if self.transition.as_ref().is_some_and(|t| t.src == src) {
            return;
        }

        if *base == src {
            // Back to what is already applied: drop the incoming layer
            self.cancel_transition();
            self.clear_overlay();
            return;
        }

        // The old overlay stays visible until the new one is mounted.
        // Its fade is frozen on the next tick.
        self.cancel_transition();
        self.generation += 1;

        let token = CancellationToken::new();
        let mut transition = Transition {
            generation: self.generation,
            src: src.clone(),
            token: token.clone(),
            phase: Phase::Decoding,
        };

        if self.cache.resolved(&src).is_some() {
            self.overlay = Some(src);
            transition.phase = Phase::Mounted;
        } else {
            self.spawn_decode(src, self.generation, token);
        }

        tracing::trace!("Crossfade transition {} started", self.generation);
        self.transition = Some(transition);
    }

    fn spawn_decode(&self, src: ImageSource, generation: u64, token: CancellationToken) {
        let completion = self.cache.ensure_decoded(&src);
        let ready_tx = self.ready_tx.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::trace!("Decode wait for {} cancelled", src);
                }
                outcome = completion => {
                    let _ = ready_tx.send(DecodeReady { generation, src, outcome });
                }
            }
        });
    }

    fn cancel_transition(&mut self) {
        if let Some(transition) = self.transition.take() {
            transition.token.cancel();
        }
    }

    fn clear_overlay(&mut self) {
        self.overlay = None;
        self.fade = None;
        self.held = 0.0;
    }

    /// Drag feedback applied to both layers while a gesture is active
    pub fn set_drag_feedback(&mut self, feedback: DragFeedback) {
        self.feedback = feedback;
    }

    /// Advance the state machine to `now`. Call once per frame.
    pub fn tick(&mut self, now: Instant) -> TickReport {
        let mut report = TickReport::default();
        if self.shut_down {
            return report;
        }

        if let Some(promoted) = self.advance(now) {
            report.promoted = Some(promoted);
            report.repaint = true;
        }

        while let Ok(ready) = self.ready_rx.try_recv() {
            if self.mount(ready) {
                report.repaint = true;
            }
        }

        if self.transition.is_some() || self.fade.is_some() {
            report.repaint = true;
        }
        report
    }

    fn advance(&mut self, now: Instant) -> Option<ImageSource> {
        let transition = self.transition.as_ref()?;
        if transition.token.is_cancelled() {
            return None;
        }

        let phase = transition.phase;
        match phase {
            Phase::Decoding => {
                // A superseded fade holds its opacity until the new overlay mounts
                if self.fade.is_some() {
                    self.held = self.fade_progress(now);
                    self.fade = None;
                }
                None
            }
            Phase::Mounted => {
                // Every transition gets the full duration from the frame after mounting
                let from = self.fade_progress(now);
                let transition = self.transition.as_mut()?;
                transition.phase = Phase::Fading {
                    deadline: now + self.duration,
                };
                self.fade = Some(FadeClock { from, started: now });
                None
            }
            Phase::Fading { deadline } if now >= deadline => {
                let finished = self.transition.take()?;
                self.base = Some(finished.src.clone());
                self.clear_overlay();
                tracing::debug!("Crossfade promoted {}", finished.src);
                Some(finished.src)
            }
            Phase::Fading { .. } => None,
        }
    }

    fn mount(&mut self, ready: DecodeReady) -> bool {
        let Some(transition) = self.transition.as_mut() else {
            tracing::trace!("Discarding decode of {} (no transition)", ready.src);
            return false;
        };

        if transition.generation != ready.generation
            || transition.token.is_cancelled()
            || transition.phase != Phase::Decoding
        {
            tracing::trace!(
                "Discarding stale decode of {} (generation {}, current {})",
                ready.src,
                ready.generation,
                transition.generation
            );
            return false;
        }

        if ready.outcome.is_failed() {
            tracing::debug!("Crossfading to {} without decoded pixels", ready.src);
        }

        transition.phase = Phase::Mounted;
        self.overlay = Some(ready.src);
        true
    }

    /// Overlay opacity in [0, 1] before drag feedback
    pub fn fade_progress(&self, now: Instant) -> f32 {
        if self.overlay.is_none() {
            return 0.0;
        }
        let Some(FadeClock { from, started }) = self.fade else {
            return self.held;
        };
        if self.duration.is_zero() {
            return 1.0;
        }

        let t = now.saturating_duration_since(started).as_secs_f32() / self.duration.as_secs_f32();
        from + (1.0 - from) * ease_out(t.clamp(0.0, 1.0))
    }

    /// Layers to draw at `now`, bottom first
    pub fn layers(&self, now: Instant) -> Vec<Layer> {
        let t = self.fade_progress(now);
        let DragFeedback { scale, opacity: dim } = self.feedback;

        let mut layers = Vec::with_capacity(2);
        if let Some(base) = &self.base {
            layers.push(Layer {
                role: LayerRole::Base,
                src: base.clone(),
                opacity: (1.0 - t) * dim,
                scale,
            });
        }
        if let Some(overlay) = &self.overlay {
            layers.push(Layer {
                role: LayerRole::Overlay,
                src: overlay.clone(),
                opacity: t * dim,
                scale,
            });
        }
        layers
    }

    /// Cancel everything; later calls are no-ops
    pub fn shutdown(&mut self) {
        self.cancel_transition();
        self.shut_down = true;
        self.ready_rx.close();
    }
}

impl Drop for Crossfade {
    fn drop(&mut self) {
        self.cancel_transition();
    }
}

fn ease_out(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// Size of an image fitted inside `area`: uniform scale, never cropped, never upscaled
pub fn fit_size(image: (u32, u32), area: (f32, f32)) -> (f32, f32) {
    let (w, h) = (image.0 as f32, image.1 as f32);
    if w <= 0.0 || h <= 0.0 || area.0 <= 0.0 || area.1 <= 0.0 {
        return (0.0, 0.0);
    }

    let scale = (area.0 / w).min(area.1 / h).min(1.0);
    (w * scale, h * scale)
}
