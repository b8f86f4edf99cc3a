//! Thumbnail grid for the gallery page
//! Cards with a 16:9 cover-cropped image, caption, and tag chips

use crate::textures::{TextureState, TextureStore, PENDING_POLL};
use crate::theme::Theme;
use app_core::{Catalog, ImageRecord};
use egui::{pos2, vec2, Align2, Color32, FontId, Rect, Response, Sense, Stroke, Ui, Vec2};

const THUMB_ASPECT: f32 = 16.0 / 9.0;
const CAPTION_HEIGHT: f32 = 64.0;
const HOVER_ZOOM: f32 = 1.03;

/// Action returned from grid interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridAction {
    /// Open the lightbox at this index
    Open(usize),
}

/// Responsive thumbnail grid
pub struct ThumbnailGrid {
    /// Minimum card width; columns fill the row
    pub min_card_width: f32,
    /// Gutter between cards
    pub spacing: f32,
    columns: usize,
}

impl ThumbnailGrid {
    pub fn new(min_card_width: f32, spacing: f32) -> Self {
        Self {
            min_card_width: min_card_width.max(64.0),
            spacing: spacing.max(0.0),
            columns: 1,
        }
    }

    /// Get current column count
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Render the grid
    pub fn ui(
        &mut self,
        ui: &mut Ui,
        catalog: &Catalog,
        textures: &mut TextureStore,
        theme: &Theme,
    ) -> Option<GridAction> {
        let mut action = None;

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let available = ui.available_width();
                self.columns = grid_columns(available, self.min_card_width, self.spacing);
                let card_width = card_width(available, self.columns, self.spacing);
                let card_size = vec2(card_width, card_width / THUMB_ASPECT + CAPTION_HEIGHT);

                egui::Grid::new("thumbnail_grid")
                    .num_columns(self.columns)
                    .spacing(Vec2::splat(self.spacing))
                    .show(ui, |ui| {
                        for (idx, record) in catalog.iter().enumerate() {
                            let response = self.card(ui, record, card_size, textures, theme);

                            // Click, or Enter/Space on the focused card
                            if response.clicked() {
                                action = Some(GridAction::Open(idx));
                            }

                            if (idx + 1) % self.columns == 0 {
                                ui.end_row();
                            }
                        }
                    });
            });

        action
    }

    fn card(
        &self,
        ui: &mut Ui,
        record: &ImageRecord,
        size: Vec2,
        textures: &mut TextureStore,
        theme: &Theme,
    ) -> Response {
        let (rect, response) = ui.allocate_exact_size(size, Sense::click());
        let response = response.on_hover_text(format!("Open {} in lightbox", record.alt));

        if !ui.is_rect_visible(rect) {
            return response;
        }

        let painter = ui.painter_at(rect);
        let rounding = 8.0;
        painter.rect_filled(rect, rounding, theme.surface);

        let thumb_rect = Rect::from_min_size(rect.min, vec2(rect.width(), rect.width() / THUMB_ASPECT));

        match textures.get(ui.ctx(), &record.src) {
            TextureState::Ready(texture) => {
                let zoom = if response.hovered() { HOVER_ZOOM } else { 1.0 };
                let uv = cover_uv(texture.size_vec2(), THUMB_ASPECT, zoom);
                painter.image(texture.id(), thumb_rect, uv, Color32::WHITE);
            }
            TextureState::Pending => {
                painter.rect_filled(thumb_rect, 0.0, theme.primary);
                painter.text(
                    thumb_rect.center(),
                    Align2::CENTER_CENTER,
                    "…",
                    FontId::proportional(24.0),
                    theme.text_secondary,
                );
                ui.ctx().request_repaint_after(PENDING_POLL);
            }
            TextureState::Unavailable => {
                painter.rect_filled(thumb_rect, 0.0, theme.primary);
                painter.text(
                    thumb_rect.center(),
                    Align2::CENTER_CENTER,
                    "🖼",
                    FontId::proportional(32.0),
                    theme.text_secondary,
                );
            }
        }

        // Caption
        let caption_top = thumb_rect.max.y + 12.0;
        let caption = painter.layout_no_wrap(
            truncate(&record.alt, rect.width() - 40.0, 7.5),
            FontId::proportional(14.0),
            theme.text,
        );
        painter.galley(pos2(rect.min.x + 12.0, caption_top), caption, theme.text);
        painter.text(
            pos2(rect.max.x - 12.0, caption_top),
            Align2::RIGHT_TOP,
            "⛶",
            FontId::proportional(14.0),
            theme.text_secondary,
        );

        // Tag chips
        let mut chip_x = rect.min.x + 12.0;
        let chip_y = caption_top + 24.0;
        for tag in &record.tags {
            let galley = painter.layout_no_wrap(tag.clone(), FontId::proportional(11.0), theme.text);
            let chip = Rect::from_min_size(pos2(chip_x, chip_y), galley.size() + vec2(12.0, 6.0));
            if chip.max.x > rect.max.x - 12.0 {
                break;
            }
            painter.rect_filled(chip, 6.0, theme.badge);
            painter.galley(chip.min + vec2(6.0, 3.0), galley, theme.text);
            chip_x = chip.max.x + 4.0;
        }

        if response.has_focus() {
            painter.rect_stroke(rect.shrink(1.0), rounding, Stroke::new(2.0, theme.accent));
        } else if response.hovered() {
            painter.rect_stroke(rect.shrink(0.5), rounding, Stroke::new(1.0, theme.primary));
        }

        response
    }
}

/// Number of columns of at least `min_width` fitting in `available`
pub fn grid_columns(available: f32, min_width: f32, spacing: f32) -> usize {
    if available <= min_width {
        return 1;
    }
    (((available + spacing) / (min_width + spacing)).floor() as usize).max(1)
}

/// Card width when `columns` cards share the row
pub fn card_width(available: f32, columns: usize, spacing: f32) -> f32 {
    let columns = columns.max(1) as f32;
    ((available - spacing * (columns - 1.0)) / columns).max(1.0)
}

/// UV rect cropping a texture of `size` to `aspect` around its centre, then zooming in
pub fn cover_uv(size: Vec2, aspect: f32, zoom: f32) -> Rect {
    if size.x <= 0.0 || size.y <= 0.0 {
        return Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
    }

    let image_aspect = size.x / size.y;
    let (mut w, mut h) = if image_aspect > aspect {
        (aspect / image_aspect, 1.0)
    } else {
        (1.0, image_aspect / aspect)
    };
    w /= zoom.max(1.0);
    h /= zoom.max(1.0);

    Rect::from_center_size(pos2(0.5, 0.5), vec2(w, h))
}

/// Truncate text to roughly `max_width` px at `char_width` px per char
fn truncate(text: &str, max_width: f32, char_width: f32) -> String {
    let max_chars = (max_width / char_width).max(4.0) as usize;
    if text.chars().count() > max_chars {
        let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", kept)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_columns() {
        assert_eq!(grid_columns(200.0, 240.0, 20.0), 1);
        assert_eq!(grid_columns(500.0, 240.0, 20.0), 2);
        assert_eq!(grid_columns(759.0, 240.0, 20.0), 2);
        assert_eq!(grid_columns(760.0, 240.0, 20.0), 3);
    }

    #[test]
    fn test_card_width_fills_row() {
        let width = card_width(780.0, 3, 20.0);
        assert!((width * 3.0 + 40.0 - 780.0).abs() < 1e-3);
        assert!(width >= 240.0);
    }

    #[test]
    fn test_cover_uv_crops_long_side() {
        // Square image into 16:9: keep full width, crop height
        let uv = cover_uv(vec2(100.0, 100.0), THUMB_ASPECT, 1.0);
        assert!((uv.width() - 1.0).abs() < 1e-6);
        assert!((uv.height() - 9.0 / 16.0).abs() < 1e-6);
        assert_eq!(uv.center(), pos2(0.5, 0.5));

        // Panorama: crop width
        let uv = cover_uv(vec2(400.0, 100.0), THUMB_ASPECT, 1.0);
        assert!((uv.height() - 1.0).abs() < 1e-6);
        assert!(uv.width() < 1.0);
    }

    #[test]
    fn test_cover_uv_zoom() {
        let uv = cover_uv(vec2(160.0, 90.0), THUMB_ASPECT, HOVER_ZOOM);
        assert!((uv.width() - 1.0 / HOVER_ZOOM).abs() < 1e-6);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Short", 100.0, 10.0), "Short");
        assert_eq!(truncate("A long caption here", 60.0, 10.0), "A lon…");
    }
}
