//! Drag/swipe paging gesture

/// Horizontal distance (px) a drag must exceed to change page
pub const DEFAULT_SWIPE_THRESHOLD: f32 = 50.0;

/// Pointer position in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Paging direction produced by a committed swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    /// Dragged right: previous image
    Prev,
    /// Dragged left: next image
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        start: Point,
        /// Normalized distance toward the threshold, in [0, 1]
        progress: f32,
    },
}

/// Two-state drag machine: `Idle` ⇄ `Dragging`.
///
/// A swipe commits the moment the horizontal delta crosses the threshold and
/// the machine drops back to `Idle`, so one continuous drag pages once.
#[derive(Debug, Clone)]
pub struct DragGesture {
    state: DragState,
    threshold: f32,
}

impl Default for DragGesture {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD)
    }
}

impl DragGesture {
    pub fn new(threshold: f32) -> Self {
        Self {
            state: DragState::Idle,
            threshold: threshold.max(1.0),
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Drag progress in [0, 1]; 0 when idle
    pub fn progress(&self) -> f32 {
        match self.state {
            DragState::Dragging { progress, .. } => progress,
            DragState::Idle => 0.0,
        }
    }

    /// Pointer/touch pressed
    pub fn press(&mut self, at: Point) {
        self.state = DragState::Dragging {
            start: at,
            progress: 0.0,
        };
    }

    /// Pointer/touch moved. Returns the page change when the threshold is crossed.
    pub fn motion(&mut self, at: Point) -> Option<Swipe> {
        let DragState::Dragging { start, .. } = self.state else {
            return None;
        };

        let delta_x = at.x - start.x;
        let distance = delta_x.abs();

        if distance > self.threshold {
            self.reset();
            return Some(if delta_x > 0.0 { Swipe::Prev } else { Swipe::Next });
        }

        self.state = DragState::Dragging {
            start,
            progress: (distance / self.threshold).min(1.0),
        };
        None
    }

    /// Pointer/touch released or left the surface
    pub fn release(&mut self) {
        self.reset();
    }

    pub fn reset(&mut self) {
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_threshold_does_not_page() {
        let mut gesture = DragGesture::default();
        gesture.press(Point::new(100.0, 10.0));

        assert_eq!(gesture.motion(Point::new(51.0, 10.0)), None); // 49px left
        assert!(gesture.is_dragging());
        assert!((gesture.progress() - 0.98).abs() < 1e-6);

        gesture.release();
        assert_eq!(gesture.state(), DragState::Idle);
        assert_eq!(gesture.progress(), 0.0);
    }

    #[test]
    fn test_crossing_threshold_pages_once() {
        let mut gesture = DragGesture::default();
        gesture.press(Point::new(100.0, 0.0));

        assert_eq!(gesture.motion(Point::new(49.0, 0.0)), Some(Swipe::Next)); // 51px left
        assert!(!gesture.is_dragging());
        assert_eq!(gesture.progress(), 0.0);

        // Continuing the same drag never fires again
        assert_eq!(gesture.motion(Point::new(-200.0, 0.0)), None);
    }

    #[test]
    fn test_drag_right_is_prev() {
        let mut gesture = DragGesture::default();
        gesture.press(Point::new(0.0, 0.0));
        assert_eq!(gesture.motion(Point::new(51.0, 40.0)), Some(Swipe::Prev));
    }

    #[test]
    fn test_exact_threshold_does_not_page() {
        let mut gesture = DragGesture::default();
        gesture.press(Point::new(0.0, 0.0));
        assert_eq!(gesture.motion(Point::new(50.0, 0.0)), None);
        assert_eq!(gesture.progress(), 1.0);
    }

    #[test]
    fn test_vertical_motion_is_ignored() {
        let mut gesture = DragGesture::new(50.0);
        gesture.press(Point::new(0.0, 0.0));
        assert_eq!(gesture.motion(Point::new(0.0, 300.0)), None);
        assert_eq!(gesture.progress(), 0.0);
    }

    #[test]
    fn test_motion_while_idle() {
        let mut gesture = DragGesture::default();
        assert_eq!(gesture.motion(Point::new(500.0, 0.0)), None);
    }
}
