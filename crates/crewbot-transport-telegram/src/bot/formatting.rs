//! Reply texts and clean-up of the crew's raw answer.

// lazy_regex! statics
#![allow(clippy::non_std_lazy_statics)]

use lazy_regex::lazy_regex;

/// Reply to `/start`
pub const START_MESSAGE: &str = "Hi! I am your AI assistant. How can I help you today?";

/// Reply to `/help`
pub const HELP_MESSAGE: &str = "Available commands:\n\
/start - Start the bot\n\
/help - Show this help message\n\
Just send me any message, and I'll help you with your query!";

/// Reply when the crew run fails
pub const ERROR_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

/// Reply when nothing is left after clean-up
pub const EMPTY_RESPONSE_MESSAGE: &str = "Sorry, I couldn't process your request.";

/// Header prepended when the user asked about appointments
pub const APPOINTMENTS_HEADER: &str = "Here are your scheduled appointments:";

static RE_FINAL_ANSWER: lazy_regex::Lazy<lazy_regex::Regex> =
    lazy_regex!(r"(?:##\s*)?Final Answer:");

/// Turn the crew's raw answer into the text sent to the user.
///
/// Keeps only what follows the last `Final Answer:` marker, drops heading
/// lines, strips bold markers and list dashes, and prefixes
/// [`APPOINTMENTS_HEADER`] when `user_message` mentions appointments.
///
/// # Examples
///
/// ```
/// use crewbot_transport_telegram::bot::formatting::format_response;
/// let reply = format_response("Thought: done\n## Final Answer:\n**Sunny** today", "weather?");
/// assert_eq!(reply, "Sunny today");
/// ```
#[must_use]
pub fn format_response(raw: &str, user_message: &str) -> String {
    let answer = RE_FINAL_ANSWER
        .find_iter(raw)
        .last()
        .map_or(raw, |m| &raw[m.end()..])
        .trim();

    let cleaned: Vec<String> = answer
        .lines()
        .filter(|line| !line.starts_with('#'))
        .map(|line| {
            let line = line.replace("**", "");
            let trimmed = line.trim();
            trimmed
                .strip_prefix('-')
                .map_or(trimmed, str::trim)
                .to_string()
        })
        .collect();

    let body = cleaned.join("\n");
    if body.trim().is_empty() {
        return EMPTY_RESPONSE_MESSAGE.to_string();
    }

    if user_message.to_lowercase().contains("appointment") {
        format!("{APPOINTMENTS_HEADER}\n\n{body}")
    } else {
        body
    }
}
