//! Text helpers and retry utilities shared by the core and the transport.

use anyhow::Result;
use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;
use tracing::warn;
use unicode_segmentation::UnicodeSegmentation;

/// Splits a reply into chunks no longer than `max_length` bytes.
///
/// Chunks break on line boundaries when possible. A single line longer than
/// the limit is cut on grapheme boundaries so multi-byte text is never split
/// inside a character.
///
/// # Examples
///
/// ```
/// use crewbot_core::utils::split_long_message;
/// let long_msg = "A fairly long line of text\n".repeat(300);
/// let parts = split_long_message(&long_msg, 4000);
/// assert!(parts.len() > 1);
/// ```
#[must_use]
pub fn split_long_message(message: &str, max_length: usize) -> Vec<String> {
    if message.is_empty() {
        return Vec::new();
    }

    if message.len() <= max_length {
        return vec![message.to_string()];
    }

    let mut parts = Vec::new();
    let mut current = String::new();

    for line in message.lines() {
        if line.len() > max_length {
            if !current.is_empty() {
                parts.push(current.trim_end().to_string());
                current.clear();
            }

            let mut chunk = String::new();
            for grapheme in line.graphemes(true) {
                if chunk.len() + grapheme.len() > max_length {
                    parts.push(std::mem::take(&mut chunk));
                }
                chunk.push_str(grapheme);
            }
            current.push_str(&chunk);
            current.push('\n');
            continue;
        }

        if current.len() + line.len() + 1 > max_length && !current.is_empty() {
            parts.push(current.trim_end().to_string());
            current.clear();
        }
        current.push_str(line);
        current.push('\n');
    }

    let tail = current.trim_end();
    if !tail.is_empty() {
        parts.push(tail.to_string());
    }

    parts
}

/// Truncates a string to at most `max_chars` characters (not bytes).
///
/// # Examples
///
/// ```
/// use crewbot_core::utils::truncate_str;
/// assert_eq!(truncate_str("Größe", 3), "Grö");
/// ```
pub fn truncate_str(s: impl AsRef<str>, max_chars: usize) -> String {
    let s = s.as_ref();
    s.char_indices()
        .nth(max_chars)
        .map_or_else(|| s.to_string(), |(pos, _)| s[..pos].to_string())
}

/// Retry a transport API call with exponential backoff and jitter.
///
/// Used for outbound Telegram calls: 500ms initial delay, 4s ceiling,
/// 3 attempts (see the `TELEGRAM_API_*` constants in `config`).
///
/// # Errors
///
/// Returns the last error if every attempt fails.
pub async fn retry_transport_operation<F, Fut, T>(operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    use crate::config::{
        TELEGRAM_API_INITIAL_BACKOFF_MS, TELEGRAM_API_MAX_BACKOFF_MS, TELEGRAM_API_MAX_RETRIES,
    };

    let retry_strategy = ExponentialBackoff::from_millis(TELEGRAM_API_INITIAL_BACKOFF_MS)
        .max_delay(Duration::from_millis(TELEGRAM_API_MAX_BACKOFF_MS))
        .map(jitter)
        .take(TELEGRAM_API_MAX_RETRIES);

    Retry::spawn(retry_strategy, operation).await.map_err(|e| {
        warn!(
            attempts = TELEGRAM_API_MAX_RETRIES,
            error = %e,
            "Transport operation failed"
        );
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_truncate_str_unicode() {
        assert_eq!(truncate_str("Größe", 3), "Grö");
        assert_eq!(truncate_str("short", 50), "short");
    }

    #[test]
    fn test_split_long_message_on_lines() {
        let parts = split_long_message("Line 1\nLine 2\nLine 3", 13);
        assert_eq!(parts, vec!["Line 1", "Line 2", "Line 3"]);
    }

    #[test]
    fn test_split_long_message_empty() {
        assert!(split_long_message("", 10).is_empty());
    }

    #[test]
    fn test_split_long_line_keeps_graphemes_whole() {
        let line = "é".repeat(20);
        let parts = split_long_message(&line, 7);
        assert!(parts.iter().all(|p| p.len() <= 7));
        assert_eq!(parts.concat(), line);
    }

    #[tokio::test]
    async fn test_retry_recovers_after_transient_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let result = retry_transport_operation(|| {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    anyhow::bail!("connection reset");
                }
                Ok("sent")
            }
        })
        .await;

        assert_eq!(result.ok(), Some("sent"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
