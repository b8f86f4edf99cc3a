//! Full-window lightbox: crossfade layers, paging controls, pagination badge

use crate::textures::{TextureState, TextureStore, PENDING_POLL};
use crate::theme::Theme;
use app_core::{
    fit_size, Command, CommandId, Crossfade, Layer, Lightbox, LightboxEvent, Point, PointerKind,
};
use egui::{pos2, vec2, Align2, Button, Color32, FontId, Pos2, Rect, RichText, Sense, Ui};
use std::time::Instant;

const BUTTON_SIZE: f32 = 44.0;
const EDGE_MARGIN: f32 = 12.0;

/// Lightbox view component
pub struct LightboxView;

impl LightboxView {
    /// Render the open lightbox. Returns the state changes caused by pointer
    /// input and the on-screen buttons.
    pub fn ui(
        ui: &mut Ui,
        lightbox: &mut Lightbox,
        crossfade: &Crossfade,
        textures: &mut TextureStore,
        theme: &Theme,
        now: Instant,
    ) -> Vec<LightboxEvent> {
        let mut events = Vec::new();
        let area = ui.max_rect();

        ui.painter().rect_filled(area, 0.0, theme.backdrop);

        let layers = crossfade.layers(now);
        let image_rect = Self::paint_layers(ui, area, &layers, lightbox, textures, theme);

        // Drag surface first so the buttons added below sit on top of it
        let response = ui.allocate_rect(area, Sense::click_and_drag());
        events.extend(Self::handle_pointer(ui, &response, image_rect, lightbox));

        let close_rect = Rect::from_min_size(
            pos2(area.max.x - EDGE_MARGIN - BUTTON_SIZE, area.min.y + EDGE_MARGIN),
            vec2(BUTTON_SIZE, BUTTON_SIZE),
        );
        if Self::nav_button(ui, close_rect, "✕", 128, "Close") {
            events.extend(lightbox.execute(&Command::new(CommandId::LIGHTBOX_CLOSE)));
        }

        let prev_rect = Rect::from_center_size(
            pos2(area.min.x + EDGE_MARGIN + BUTTON_SIZE / 2.0, area.center().y),
            vec2(BUTTON_SIZE, BUTTON_SIZE),
        );
        if Self::nav_button(ui, prev_rect, "‹", 77, "Previous") {
            events.extend(lightbox.execute(&Command::new(CommandId::LIGHTBOX_PREV)));
        }

        let next_rect = Rect::from_center_size(
            pos2(area.max.x - EDGE_MARGIN - BUTTON_SIZE / 2.0, area.center().y),
            vec2(BUTTON_SIZE, BUTTON_SIZE),
        );
        if Self::nav_button(ui, next_rect, "›", 77, "Next") {
            events.extend(lightbox.execute(&Command::new(CommandId::LIGHTBOX_NEXT)));
        }

        if lightbox.is_open() {
            Self::pagination(ui, area, &lightbox.position_label(), theme);
        }

        events
    }

    /// Draw the crossfade layers bottom first; returns the area covered by the image
    fn paint_layers(
        ui: &Ui,
        area: Rect,
        layers: &[Layer],
        lightbox: &Lightbox,
        textures: &mut TextureStore,
        theme: &Theme,
    ) -> Rect {
        let painter = ui.painter_at(area);
        let mut image_rect = None;

        for layer in layers {
            match textures.get(ui.ctx(), &layer.src) {
                TextureState::Ready(texture) => {
                    let [w, h] = texture.size();
                    let (fit_w, fit_h) = fit_size((w as u32, h as u32), (area.width(), area.height()));
                    let rect = Rect::from_center_size(
                        area.center(),
                        vec2(fit_w * layer.scale, fit_h * layer.scale),
                    );
                    let uv = Rect::from_min_max(Pos2::ZERO, pos2(1.0, 1.0));
                    painter.image(texture.id(), rect, uv, Color32::WHITE.gamma_multiply(layer.opacity));

                    // The top layer decides where drags may start
                    image_rect = Some(rect);
                }
                TextureState::Pending => {
                    ui.ctx().request_repaint_after(PENDING_POLL);
                }
                TextureState::Unavailable => {
                    let alt = lightbox
                        .catalog()
                        .iter()
                        .find(|record| record.src == layer.src)
                        .map(|record| record.alt.as_str())
                        .unwrap_or("Image unavailable");
                    painter.text(
                        area.center(),
                        Align2::CENTER_CENTER,
                        alt,
                        FontId::proportional(20.0),
                        theme.text_secondary.gamma_multiply(layer.opacity),
                    );
                }
            }
        }

        image_rect.unwrap_or(area)
    }

    fn handle_pointer(
        ui: &mut Ui,
        response: &egui::Response,
        image_rect: Rect,
        lightbox: &mut Lightbox,
    ) -> Option<LightboxEvent> {
        let kind = if ui.input(|i| i.any_touches()) {
            PointerKind::Touch
        } else {
            PointerKind::Mouse
        };

        if response.drag_started() {
            // egui reports drags after a few pixels; start from the press position
            if let Some(origin) = ui.input(|i| i.pointer.press_origin()) {
                if image_rect.contains(origin) {
                    lightbox.pointer_down(to_point(origin));
                }
            }
        }

        let mut event = None;
        if response.dragged() && lightbox.gesture().is_dragging() {
            match ui.input(|i| i.pointer.latest_pos()) {
                Some(pos) if image_rect.contains(pos) => {
                    let moved = lightbox.pointer_move(to_point(pos), kind);
                    if moved.prevent_default {
                        ui.input_mut(|i| i.smooth_scroll_delta = egui::Vec2::ZERO);
                    }
                    event = moved.event;
                }
                // Left the image: same as releasing
                _ => lightbox.pointer_up(),
            }
        }

        if response.drag_stopped() {
            lightbox.pointer_up();
        }

        if lightbox.gesture().is_dragging() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
        } else if response.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
        }

        event
    }

    fn nav_button(ui: &mut Ui, rect: Rect, icon: &str, alpha: u8, label: &str) -> bool {
        let button = Button::new(RichText::new(icon).size(24.0).color(Color32::WHITE))
            .fill(Color32::from_black_alpha(alpha))
            .rounding(BUTTON_SIZE / 2.0);
        ui.put(rect, button).on_hover_text(label).clicked()
    }

    fn pagination(ui: &Ui, area: Rect, label: &str, theme: &Theme) {
        let painter = ui.painter();
        let galley = painter.layout_no_wrap(
            label.to_string(),
            FontId::proportional(14.0),
            Color32::WHITE,
        );
        let size = galley.size() + vec2(32.0, 16.0);
        let badge = Rect::from_center_size(
            pos2(area.center().x, area.max.y - 16.0 - size.y / 2.0),
            size,
        );

        painter.rect_filled(badge, size.y / 2.0, theme.accent.gamma_multiply(0.9));
        painter.galley(badge.min + vec2(16.0, 8.0), galley, Color32::WHITE);
    }
}

fn to_point(pos: Pos2) -> Point {
    Point::new(pos.x, pos.y)
}
