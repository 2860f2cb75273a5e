mod core;
pub use self::core::{NO_REPLY_TEXT, OutboundMessage, completion, extract_reply};
