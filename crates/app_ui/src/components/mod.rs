//! UI Components

pub mod lightbox_view;
pub mod thumbnail_grid;

pub use lightbox_view::LightboxView;
pub use thumbnail_grid::{card_width, cover_uv, grid_columns, GridAction, ThumbnailGrid};
