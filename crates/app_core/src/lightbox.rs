//! Lightbox controller: open/closed state, active index, paging input

use crate::catalog::{Catalog, ImageRecord};
use crate::command::{Command, CommandId};
use crate::gesture::{DragGesture, Point, Swipe};

/// Scale applied to the image at full drag progress is `1 - DRAG_SCALE`
pub const DRAG_SCALE: f32 = 0.05;
/// Opacity lost at full drag progress
pub const DRAG_DIM: f32 = 0.3;

/// State change the presentation layer has to follow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxEvent {
    Opened { index: usize },
    Moved { from: usize, to: usize },
    Closed,
}

/// Input device behind a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// Result of feeding a pointer move to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerResponse {
    pub event: Option<LightboxEvent>,
    /// Suppress the platform's default scroll/back-swipe handling
    pub prevent_default: bool,
}

/// Visual feedback while a drag is in progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragFeedback {
    pub scale: f32,
    pub opacity: f32,
}

impl DragFeedback {
    pub const NONE: Self = Self {
        scale: 1.0,
        opacity: 1.0,
    };

    pub fn from_progress(progress: f32) -> Self {
        let progress = progress.clamp(0.0, 1.0);
        Self {
            scale: 1.0 - progress * DRAG_SCALE,
            opacity: 1.0 - progress * DRAG_DIM,
        }
    }
}

/// Full-screen viewer over a fixed, ordered catalog
#[derive(Debug, Clone)]
pub struct Lightbox {
    catalog: Catalog,
    open: bool,
    active_index: usize,
    gesture: DragGesture,
}

impl Lightbox {
    pub fn new(catalog: Catalog, swipe_threshold: f32) -> Self {
        Self {
            catalog,
            open: false,
            active_index: 0,
            gesture: DragGesture::new(swipe_threshold),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn current(&self) -> Option<&ImageRecord> {
        self.catalog.get(self.active_index)
    }

    pub fn gesture(&self) -> &DragGesture {
        &self.gesture
    }

    /// "4 of 9" pagination text
    pub fn position_label(&self) -> String {
        format!("{} of {}", self.active_index + 1, self.catalog.len())
    }

    /// Open the viewer on a thumbnail. Out-of-range indices are rejected.
    pub fn open_at(&mut self, index: usize) -> Option<LightboxEvent> {
        if index >= self.catalog.len() {
            tracing::warn!("Ignoring open at {} (catalog has {})", index, self.catalog.len());
            return None;
        }

        self.active_index = index;
        self.open = true;
        self.gesture.reset();
        tracing::debug!("Lightbox opened at {}", index);
        Some(LightboxEvent::Opened { index })
    }

    pub fn close(&mut self) -> Option<LightboxEvent> {
        if !self.open {
            return None;
        }

        self.open = false;
        self.gesture.reset();
        tracing::debug!("Lightbox closed");
        Some(LightboxEvent::Closed)
    }

    pub fn next(&mut self) -> Option<LightboxEvent> {
        let len = self.catalog.len();
        if !self.open || len == 0 {
            return None;
        }
        self.move_to((self.active_index + 1) % len)
    }

    pub fn prev(&mut self) -> Option<LightboxEvent> {
        let len = self.catalog.len();
        if !self.open || len == 0 {
            return None;
        }
        self.move_to((self.active_index + len - 1) % len)
    }

    fn move_to(&mut self, to: usize) -> Option<LightboxEvent> {
        let from = self.active_index;
        self.active_index = to;
        Some(LightboxEvent::Moved { from, to })
    }

    /// Execute a lightbox command. Paging and close only apply while open.
    pub fn execute(&mut self, cmd: &Command) -> Option<LightboxEvent> {
        match cmd.id.as_str() {
            CommandId::LIGHTBOX_OPEN => cmd.params.index.and_then(|index| self.open_at(index)),
            CommandId::LIGHTBOX_CLOSE => self.close(),
            CommandId::LIGHTBOX_NEXT => self.next(),
            CommandId::LIGHTBOX_PREV => self.prev(),
            other => {
                tracing::trace!("Lightbox ignores command {}", other);
                None
            }
        }
    }

    pub fn pointer_down(&mut self, at: Point) {
        if self.open {
            self.gesture.press(at);
        }
    }

    pub fn pointer_move(&mut self, at: Point, kind: PointerKind) -> PointerResponse {
        if !self.open || !self.gesture.is_dragging() {
            return PointerResponse::default();
        }

        let event = match self.gesture.motion(at) {
            Some(Swipe::Prev) => self.prev(),
            Some(Swipe::Next) => self.next(),
            None => None,
        };

        PointerResponse {
            event,
            prevent_default: kind == PointerKind::Touch,
        }
    }

    /// Pointer released, or left the image area
    pub fn pointer_up(&mut self) {
        self.gesture.release();
    }

    pub fn drag_feedback(&self) -> DragFeedback {
        if self.gesture.is_dragging() {
            DragFeedback::from_progress(self.gesture.progress())
        } else {
            DragFeedback::NONE
        }
    }

    /// Indices within `radius` of the active image, nearest first, without the active one
    pub fn neighbours(&self, radius: usize) -> Vec<usize> {
        let len = self.catalog.len();
        let mut out = Vec::new();
        for step in 1..=radius.min(len / 2) {
            for idx in [(self.active_index + step) % len, (self.active_index + len - step) % len] {
                if idx != self.active_index && !out.contains(&idx) {
                    out.push(idx);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::DragState;

    fn lightbox() -> Lightbox {
        Lightbox::new(Catalog::builtin(), 50.0)
    }

    #[test]
    fn test_next_cycles_back() {
        let mut lb = lightbox();
        for start in 0..lb.catalog().len() {
            lb.open_at(start);
            for _ in 0..lb.catalog().len() {
                lb.next();
            }
            assert_eq!(lb.active_index(), start);
        }
    }

    #[test]
    fn test_wraps_both_directions() {
        let mut lb = lightbox();
        lb.open_at(0);
        assert_eq!(lb.prev(), Some(LightboxEvent::Moved { from: 0, to: 8 }));
        assert_eq!(lb.next(), Some(LightboxEvent::Moved { from: 8, to: 0 }));
    }

    #[test]
    fn test_navigation_requires_open() {
        let mut lb = lightbox();
        assert_eq!(lb.next(), None);
        assert_eq!(lb.execute(&Command::new(CommandId::LIGHTBOX_PREV)), None);
        assert_eq!(lb.active_index(), 0);
        assert_eq!(lb.close(), None);
    }

    #[test]
    fn test_open_rejects_out_of_range() {
        let mut lb = lightbox();
        assert_eq!(lb.open_at(9), None);
        assert!(!lb.is_open());
        assert_eq!(lb.open_at(4), Some(LightboxEvent::Opened { index: 4 }));
        assert_eq!(lb.position_label(), "5 of 9");
    }

    #[test]
    fn test_execute_commands() {
        let mut lb = lightbox();
        assert_eq!(lb.execute(&Command::open(2)), Some(LightboxEvent::Opened { index: 2 }));
        assert_eq!(
            lb.execute(&Command::new(CommandId::LIGHTBOX_NEXT)),
            Some(LightboxEvent::Moved { from: 2, to: 3 })
        );
        assert_eq!(lb.execute(&Command::new(CommandId::APP_EXIT)), None);
        assert_eq!(lb.execute(&Command::new(CommandId::LIGHTBOX_CLOSE)), Some(LightboxEvent::Closed));
        assert!(!lb.is_open());
    }

    #[test]
    fn test_drag_below_threshold_keeps_index() {
        let mut lb = lightbox();
        lb.open_at(3);
        lb.pointer_down(Point::new(200.0, 100.0));

        let response = lb.pointer_move(Point::new(151.0, 100.0), PointerKind::Mouse);
        assert_eq!(response.event, None);
        assert!(lb.gesture().is_dragging());

        lb.pointer_up();
        assert_eq!(lb.active_index(), 3);
        assert_eq!(lb.gesture().state(), DragState::Idle);
    }

    #[test]
    fn test_drag_past_threshold_steps_once() {
        let mut lb = lightbox();
        lb.open_at(3);
        lb.pointer_down(Point::new(200.0, 100.0));

        let response = lb.pointer_move(Point::new(149.0, 100.0), PointerKind::Mouse);
        assert_eq!(response.event, Some(LightboxEvent::Moved { from: 3, to: 4 }));
        assert_eq!(lb.gesture().progress(), 0.0);
        assert!(!lb.gesture().is_dragging());
    }

    #[test]
    fn test_drag_left_sixty_from_three() {
        let mut lb = lightbox();
        lb.open_at(3);
        lb.pointer_down(Point::new(300.0, 0.0));
        lb.pointer_move(Point::new(270.0, 0.0), PointerKind::Touch);
        lb.pointer_move(Point::new(240.0, 0.0), PointerKind::Touch);
        lb.pointer_up();

        assert_eq!(lb.active_index(), 4);
        assert!(!lb.gesture().is_dragging());
    }

    #[test]
    fn test_drag_right_from_first_wraps_to_last() {
        let mut lb = lightbox();
        lb.open_at(0);
        lb.pointer_down(Point::new(0.0, 0.0));
        lb.pointer_move(Point::new(80.0, 0.0), PointerKind::Mouse);
        assert_eq!(lb.active_index(), 8);
    }

    #[test]
    fn test_touch_moves_prevent_default_while_dragging() {
        let mut lb = lightbox();
        lb.open_at(0);
        assert!(!lb.pointer_move(Point::new(10.0, 0.0), PointerKind::Touch).prevent_default);

        lb.pointer_down(Point::new(0.0, 0.0));
        assert!(lb.pointer_move(Point::new(10.0, 0.0), PointerKind::Touch).prevent_default);
        assert!(!lb.pointer_move(Point::new(12.0, 0.0), PointerKind::Mouse).prevent_default);
    }

    #[test]
    fn test_drag_feedback() {
        let mut lb = lightbox();
        lb.open_at(0);
        assert_eq!(lb.drag_feedback(), DragFeedback::NONE);

        lb.pointer_down(Point::new(0.0, 0.0));
        lb.pointer_move(Point::new(-25.0, 0.0), PointerKind::Mouse);
        let feedback = lb.drag_feedback();
        assert!((feedback.scale - 0.975).abs() < 1e-6);
        assert!((feedback.opacity - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_close_resets_gesture() {
        let mut lb = lightbox();
        lb.open_at(1);
        lb.pointer_down(Point::new(0.0, 0.0));
        lb.close();
        assert!(!lb.gesture().is_dragging());
        lb.pointer_down(Point::new(0.0, 0.0));
        assert!(!lb.gesture().is_dragging());
    }

    #[test]
    fn test_neighbours() {
        let mut lb = lightbox();
        lb.open_at(0);
        assert_eq!(lb.neighbours(1), vec![1, 8]);
        assert_eq!(lb.neighbours(2), vec![1, 8, 2, 7]);
        assert!(lb.neighbours(0).is_empty());

        let two = Catalog::new(vec![
            crate::catalog::ImageRecord::new(1, "a.png", "A", &[]),
            crate::catalog::ImageRecord::new(2, "b.png", "B", &[]),
        ])
        .unwrap();
        let mut small = Lightbox::new(two, 50.0);
        small.open_at(0);
        assert_eq!(small.neighbours(3), vec![1]);
    }
}
