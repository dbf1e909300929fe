/// Fixed reply texts and crew output post-processing
pub mod formatting;
/// Command and text message handlers
pub mod handlers;
/// Long message splitting and sending
pub mod messaging;
/// Resilient messaging with automatic retry for Telegram API operations
pub mod resilient;
