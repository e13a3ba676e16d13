//! Shared application state.

use palaver_conversation::ConversationService;

/// State shared by all request handlers.
///
/// Holds no per-request data; every handler call is independent.
pub struct AppState {
    /// The conversation service.
    pub conversation: ConversationService,
}

impl AppState {
    /// Creates the state around a ready service.
    pub fn new(conversation: ConversationService) -> Self {
        Self { conversation }
    }
}
