//! Intent classification

use crate::llm::{LlmClient, LlmError};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

const CLASSIFIER_PROMPT: &str = "You route messages sent to a personal assistant bot. \
Classify the user's message into exactly one category:\n\
- appointment: scheduling, listing, rescheduling or cancelling appointments\n\
- general: anything else (questions, weather, news, small talk)\n\n\
Reply with the single word `general` or `appointment` and nothing else.";

/// Kind of request a message represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// General question
    General,
    /// Appointment management request
    Appointment,
    /// The oracle answered with no recognisable label
    Unknown,
}

impl Intent {
    /// Interpret the oracle's free-text answer.
    ///
    /// An exact label wins. Otherwise the answer is searched for the labels:
    /// only `appointment` gives [`Intent::Appointment`], `general` (alone or
    /// together with `appointment`) gives [`Intent::General`], and neither
    /// gives [`Intent::Unknown`].
    #[must_use]
    pub fn from_oracle(text: &str) -> Self {
        let normalized = text.trim().to_lowercase();
        let label = normalized.trim_matches(|c: char| !c.is_alphanumeric());

        match label {
            "general" => return Self::General,
            "appointment" => return Self::Appointment,
            _ => {}
        }

        match (
            normalized.contains("general"),
            normalized.contains("appointment"),
        ) {
            (true, _) => Self::General,
            (false, true) => Self::Appointment,
            (false, false) => Self::Unknown,
        }
    }

    /// Lower-case label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Appointment => "appointment",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies messages with one call to the reasoning endpoint
pub struct IntentRouter {
    llm: Arc<LlmClient>,
}

impl IntentRouter {
    /// Create a router sharing `llm`
    #[must_use]
    pub fn new(llm: Arc<LlmClient>) -> Self {
        Self { llm }
    }

    /// Classify `message`
    ///
    /// # Errors
    ///
    /// Returns the `LlmError` of the classification call; it is not retried.
    pub async fn classify(&self, message: &str) -> Result<Intent, LlmError> {
        let answer = self
            .llm
            .chat_completion(CLASSIFIER_PROMPT, &[], message, &self.llm.router_model)
            .await?;

        let intent = Intent::from_oracle(&answer);
        debug!(answer = %answer.trim(), "Router answer");
        info!(intent = %intent, "Message classified");
        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_labels() {
        assert_eq!(Intent::from_oracle("general"), Intent::General);
        assert_eq!(Intent::from_oracle("  Appointment.\n"), Intent::Appointment);
        assert_eq!(Intent::from_oracle("\"appointment\""), Intent::Appointment);
    }

    #[test]
    fn test_substring_fallback() {
        assert_eq!(
            Intent::from_oracle("This is an appointment request"),
            Intent::Appointment
        );
        assert_eq!(
            Intent::from_oracle("general, not an appointment"),
            Intent::General
        );
        assert_eq!(Intent::from_oracle("weather"), Intent::Unknown);
        assert_eq!(Intent::from_oracle(""), Intent::Unknown);
    }

    #[tokio::test]
    async fn test_classify_uses_router_model() -> Result<(), LlmError> {
        let client = crate::testing::client_with(crate::testing::mock_llm_simple("Appointment"));
        let router = IntentRouter::new(Arc::new(client));
        assert_eq!(router.classify("book me at 10").await?, Intent::Appointment);
        Ok(())
    }
}
