// Application state module
// Shared by every connection of the front door

use crate::render::{fallback, RenderEntry};

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,
    pub entry: RenderEntry,
    /// Fallback page, rendered once since every request gets the same bytes
    pub fallback_page: String,
}

impl AppState {
    pub fn new(config: Config, entry: RenderEntry) -> Self {
        let fallback_page =
            fallback::fallback_html(&config.render.client_entry, &config.render.title);
        Self {
            config,
            entry,
            fallback_page,
        }
    }
}
