//! Appointment management tool
//!
//! Adapts the [`AppointmentStore`] to the tool contract. Replies are plain
//! sentences the agent can relay to the user.

use super::{Tool, ToolError};
use crate::appointments::{AppointmentBackend, AppointmentError, AppointmentStore};
use crate::llm::ToolDefinition;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// Tool managing the shared appointment store
pub struct AppointmentTool<B> {
    store: Arc<AppointmentStore<B>>,
}

impl<B> AppointmentTool<B> {
    /// Wrap a shared store
    #[must_use]
    pub fn new(store: Arc<AppointmentStore<B>>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Deserialize)]
struct AppointmentArgs {
    action: String,
    #[serde(default)]
    details: Option<Value>,
}

impl From<AppointmentError> for ToolError {
    fn from(e: AppointmentError) -> Self {
        match e {
            AppointmentError::InvalidPayload(msg) => Self::InvalidArguments(msg),
            other => Self::Storage(other.to_string()),
        }
    }
}

/// Normalise `details`, which models send either as an object or as a JSON string.
///
/// Returns `None` when no details were given.
fn parse_details(details: Option<Value>) -> Result<Option<Map<String, Value>>, ToolError> {
    let value = match details {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => serde_json::from_str(&s)
            .map_err(|e| ToolError::InvalidArguments(format!("details: {e}")))?,
        Some(other) => other,
    };

    match value {
        Value::Object(map) => Ok(Some(map)),
        _ => Err(ToolError::InvalidArguments(
            "details must be a JSON object".to_string(),
        )),
    }
}

fn get_str<'a>(details: &'a Map<String, Value>, keys: &[&str]) -> Result<&'a str, ToolError> {
    keys.iter()
        .find_map(|key| details.get(*key).and_then(Value::as_str))
        .ok_or_else(|| ToolError::InvalidArguments(format!("missing field `{}`", keys[0])))
}

impl<B: AppointmentBackend> AppointmentTool<B> {
    async fn list(&self) -> String {
        let appointments = self.store.list().await;
        if appointments.is_empty() {
            return "No appointments scheduled".to_string();
        }

        let lines: Vec<String> = appointments
            .iter()
            .map(|apt| format!("- {}: {}", apt.time, apt.description))
            .collect();
        format!("Current appointments:\n{}", lines.join("\n"))
    }

    async fn schedule(&self, details: Option<Map<String, Value>>) -> Result<String, ToolError> {
        let Some(details) = details else {
            return Ok("Please provide appointment details (time and description)".to_string());
        };
        let time = get_str(&details, &["appointment_time", "time"])?;
        let description = get_str(&details, &["description"])?;

        let apt = self.store.schedule(time, description).await?;
        Ok(format!(
            "Appointment scheduled for {}: {}",
            apt.time, apt.description
        ))
    }

    async fn reschedule(&self, details: Option<Map<String, Value>>) -> Result<String, ToolError> {
        let Some(details) = details else {
            return Ok("Please provide old and new appointment details".to_string());
        };
        let old_time = get_str(&details, &["old_time"])?;
        let new_time = get_str(&details, &["new_time"])?;

        match self.store.reschedule(old_time, new_time).await {
            Ok(apt) => Ok(format!("Appointment rescheduled to {}", apt.time)),
            Err(AppointmentError::NotFound { .. }) => {
                Ok("Original appointment not found".to_string())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn cancel(&self, details: Option<Map<String, Value>>) -> Result<String, ToolError> {
        let Some(details) = details else {
            return Ok("Please provide appointment time to cancel".to_string());
        };
        let time = get_str(&details, &["appointment_time", "time"])?.trim();

        match self.store.cancel(time).await {
            Ok(_) => Ok(format!("Appointment at {time} cancelled")),
            Err(AppointmentError::NotFound { .. }) => {
                Ok("No appointment found at the specified time".to_string())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl<B: AppointmentBackend + 'static> Tool for AppointmentTool<B> {
    fn name(&self) -> &'static str {
        "manage_appointments"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: "Manage appointments: schedule new ones, list all current ones, \
                          reschedule or cancel existing ones."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "action": {
                        "type": "string",
                        "enum": ["list", "schedule", "reschedule", "cancel"],
                        "description": "The action to perform"
                    },
                    "details": {
                        "type": "string",
                        "description": "JSON string with appointment details. \
                            schedule: {\"appointment_time\": \"YYYY-MM-DD HH:MM\", \"description\": \"...\"}; \
                            reschedule: {\"old_time\": \"...\", \"new_time\": \"...\"}; \
                            cancel: {\"appointment_time\": \"...\"}; list: not needed"
                    }
                },
                "required": ["action"]
            }),
        }
    }

    fn error_label(&self) -> &'static str {
        "Error managing appointment"
    }

    async fn run(&self, arguments: &str) -> Result<String, ToolError> {
        let args: AppointmentArgs = serde_json::from_str(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        let action = args
            .action
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .to_lowercase();

        info!(action = %action, "Managing appointments");

        match action.as_str() {
            "list" => Ok(self.list().await),
            "schedule" => self.schedule(parse_details(args.details)?).await,
            "reschedule" => self.reschedule(parse_details(args.details)?).await,
            "cancel" => self.cancel(parse_details(args.details)?).await,
            _ => {
                warn!(action = %action, "Unknown appointment action");
                Ok(format!("Unknown action: {action}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointments::InMemoryBackend;

    async fn tool() -> Result<AppointmentTool<InMemoryBackend>, AppointmentError> {
        let store = AppointmentStore::open(InMemoryBackend::new()).await?;
        Ok(AppointmentTool::new(Arc::new(store)))
    }

    #[tokio::test]
    async fn test_action_is_normalised() -> Result<(), Box<dyn std::error::Error>> {
        let tool = tool().await?;
        let reply = tool.run(r#"{"action": "  \"LIST\" "}"#).await?;
        assert_eq!(reply, "No appointments scheduled");
        Ok(())
    }

    #[tokio::test]
    async fn test_details_accepts_string_or_object() -> Result<(), Box<dyn std::error::Error>> {
        let tool = tool().await?;

        let as_string = json!({
            "action": "schedule",
            "details": r#"{"appointment_time": "2025-01-01 10:00", "description": "Dentist"}"#
        });
        let as_object = json!({
            "action": "schedule",
            "details": {"time": "2025-01-01 09:00", "description": "Gym"}
        });

        assert_eq!(
            tool.run(&as_string.to_string()).await?,
            "Appointment scheduled for 2025-01-01 10:00: Dentist"
        );
        assert_eq!(
            tool.run(&as_object.to_string()).await?,
            "Appointment scheduled for 2025-01-01 09:00: Gym"
        );
        assert_eq!(
            tool.run(r#"{"action": "list"}"#).await?,
            "Current appointments:\n- 2025-01-01 09:00: Gym\n- 2025-01-01 10:00: Dentist"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_details_is_error() -> Result<(), Box<dyn std::error::Error>> {
        let tool = tool().await?;
        let result = tool
            .run(r#"{"action": "cancel", "details": "{not json"}"#)
            .await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_action() -> Result<(), Box<dyn std::error::Error>> {
        let tool = tool().await?;
        assert_eq!(
            tool.run(r#"{"action": "delete"}"#).await?,
            "Unknown action: delete"
        );
        Ok(())
    }
}
