//! Discord message-limit helpers
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Truncation helpers for user-supplied text in replies

/// Discord message content limit
pub const MESSAGE_LIMIT: usize = 2000;

/// Truncate text to the given byte length at a UTF-8 boundary, adding an
/// ellipsis when anything was cut.
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }
    let mut end = max_len.saturating_sub(3);
    while !text.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// Truncate text to fit a single message
pub fn truncate_for_message(text: &str) -> String {
    truncate(text, MESSAGE_LIMIT)
}
