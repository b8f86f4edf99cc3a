//! Command system for user actions

use serde::{Deserialize, Serialize};

/// Command identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandId(pub String);

impl CommandId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Lightbox commands
    pub const LIGHTBOX_OPEN: &'static str = "lightbox.open";
    pub const LIGHTBOX_CLOSE: &'static str = "lightbox.close";
    pub const LIGHTBOX_NEXT: &'static str = "lightbox.next";
    pub const LIGHTBOX_PREV: &'static str = "lightbox.prev";

    // App commands
    pub const APP_EXIT: &'static str = "app.exit";
}

/// Command with optional parameters
#[derive(Debug, Clone)]
pub struct Command {
    pub id: CommandId,
    pub params: CommandParams,
}

/// Command parameters
#[derive(Debug, Clone, Default)]
pub struct CommandParams {
    /// Target image index (`lightbox.open`)
    pub index: Option<usize>,
}

impl Command {
    pub fn new(id: &str) -> Self {
        Self {
            id: CommandId::new(id),
            params: CommandParams::default(),
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.params.index = Some(index);
        self
    }

    pub fn open(index: usize) -> Self {
        Self::new(CommandId::LIGHTBOX_OPEN).with_index(index)
    }

    pub fn is(&self, id: &str) -> bool {
        self.id.as_str() == id
    }
}
