//! Input handling and keybinding resolution

use app_core::{Command, CommandId};
use std::collections::HashMap;
use winit::event::{ElementState, KeyEvent, MouseButton};
use winit::keyboard::{Key, ModifiersState, NamedKey};

/// Input handler that maps keys/mouse to commands
pub struct InputHandler {
    /// Key bindings: key string -> command ID
    bindings: HashMap<String, String>,

    /// Current modifier state
    modifiers: ModifiersState,
}

impl InputHandler {
    /// Create a new input handler from the config's command -> keys table
    pub fn new(bindings: HashMap<String, Vec<String>>) -> Self {
        // Invert the bindings map: command -> keys becomes key -> command
        let mut key_to_command = HashMap::new();

        for (command, keys) in bindings {
            for key in keys {
                if let Some(previous) = key_to_command.insert(key.to_lowercase(), command.clone()) {
                    tracing::warn!("Key {} bound to both {} and {}", key, previous, command);
                }
            }
        }

        Self {
            bindings: key_to_command,
            modifiers: ModifiersState::empty(),
        }
    }

    /// Update modifier state
    pub fn update_modifiers(&mut self, modifiers: ModifiersState) {
        self.modifiers = modifiers;
    }

    /// Handle a key event and return the corresponding command
    pub fn handle_key(&self, event: &KeyEvent) -> Option<Command> {
        if event.state != ElementState::Pressed {
            return None;
        }
        self.resolve(&event.logical_key)
    }

    /// Look up the command bound to `key` under the current modifiers
    pub fn resolve(&self, key: &Key) -> Option<Command> {
        let key_str = key_to_string(key)?;
        let full_key = self.build_key_string(&key_str);

        tracing::trace!("Key pressed: {}", full_key);

        self.bindings
            .get(&full_key.to_lowercase())
            .map(|cmd_id| Command::new(cmd_id))
    }

    /// Build a key string with modifiers
    fn build_key_string(&self, key: &str) -> String {
        let mut parts = Vec::new();

        if self.modifiers.control_key() {
            parts.push("Ctrl");
        }
        if self.modifiers.alt_key() {
            parts.push("Alt");
        }
        if self.modifiers.shift_key() {
            parts.push("Shift");
        }
        if self.modifiers.super_key() {
            parts.push("Super");
        }

        parts.push(key);
        parts.join("+")
    }

    /// Mouse back/forward buttons page the lightbox
    pub fn handle_mouse_button(&self, button: MouseButton, state: ElementState) -> Option<Command> {
        if state != ElementState::Pressed {
            return None;
        }

        match button {
            MouseButton::Back => Some(Command::new(CommandId::LIGHTBOX_PREV)),
            MouseButton::Forward => Some(Command::new(CommandId::LIGHTBOX_NEXT)),
            _ => None,
        }
    }
}

/// Convert a logical key to its binding name
fn key_to_string(key: &Key) -> Option<String> {
    let name = match key {
        Key::Named(named) => match named {
            NamedKey::Space => "Space".to_string(),
            NamedKey::Enter => "Return".to_string(),
            NamedKey::Escape => "Escape".to_string(),
            NamedKey::Home => "Home".to_string(),
            NamedKey::End => "End".to_string(),
            NamedKey::ArrowUp => "Up".to_string(),
            NamedKey::ArrowDown => "Down".to_string(),
            NamedKey::ArrowLeft => "Left".to_string(),
            NamedKey::ArrowRight => "Right".to_string(),
            _ => format!("{:?}", named),
        },
        Key::Character(c) => c.to_string(),
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> InputHandler {
        InputHandler::new(app_core::AppConfig::default().keybindings)
    }

    #[test]
    fn test_arrow_keys_page() {
        let input = handler();
        let next = input.resolve(&Key::Named(NamedKey::ArrowRight)).unwrap();
        assert!(next.is(CommandId::LIGHTBOX_NEXT));
        let prev = input.resolve(&Key::Named(NamedKey::ArrowLeft)).unwrap();
        assert!(prev.is(CommandId::LIGHTBOX_PREV));
        let close = input.resolve(&Key::Named(NamedKey::Escape)).unwrap();
        assert!(close.is(CommandId::LIGHTBOX_CLOSE));
    }

    #[test]
    fn test_modifiers_are_part_of_the_binding() {
        let mut input = handler();
        assert!(input.resolve(&Key::Character("q".into())).is_none());

        input.update_modifiers(ModifiersState::CONTROL);
        let exit = input.resolve(&Key::Character("q".into())).unwrap();
        assert!(exit.is(CommandId::APP_EXIT));
        assert!(input.resolve(&Key::Named(NamedKey::ArrowRight)).is_none());
    }

    #[test]
    fn test_custom_binding() {
        let mut bindings = HashMap::new();
        bindings.insert(CommandId::LIGHTBOX_NEXT.to_string(), vec!["l".to_string(), "Space".to_string()]);
        let input = InputHandler::new(bindings);

        assert!(input.resolve(&Key::Character("L".into())).unwrap().is(CommandId::LIGHTBOX_NEXT));
        assert!(input.resolve(&Key::Named(NamedKey::Space)).is_some());
        assert!(input.resolve(&Key::Named(NamedKey::ArrowRight)).is_none());
    }

    #[test]
    fn test_mouse_buttons() {
        let input = handler();
        let back = input.handle_mouse_button(MouseButton::Back, ElementState::Pressed).unwrap();
        assert!(back.is(CommandId::LIGHTBOX_PREV));
        assert!(input.handle_mouse_button(MouseButton::Back, ElementState::Released).is_none());
        assert!(input.handle_mouse_button(MouseButton::Left, ElementState::Pressed).is_none());
    }
}
