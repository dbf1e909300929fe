//! Agent personas and task templates

/// Placeholder replaced by the user's message in task descriptions
pub const MESSAGE_PLACEHOLDER: &str = "{message}";

/// Persona and tool set of one agent
#[derive(Debug, Clone)]
pub struct AgentProfile {
    /// Short role title
    pub role: String,
    /// What the agent tries to achieve
    pub goal: String,
    /// Background shaping the agent's tone
    pub backstory: String,
    /// Names of the tools this agent may call
    pub tools: Vec<&'static str>,
}

impl AgentProfile {
    /// Assistant answering general questions with weather and web search
    #[must_use]
    pub fn general() -> Self {
        Self {
            role: "General Assistant".to_string(),
            goal: "Answer the user's questions accurately and concisely, \
                   looking up live information when needed"
                .to_string(),
            backstory: "You are a friendly assistant in a Telegram chat. You check the \
                        current weather and search the web instead of guessing facts \
                        that may have changed."
                .to_string(),
            tools: vec!["get_weather", "web_search"],
        }
    }

    /// Assistant keeping the user's appointment book
    #[must_use]
    pub fn appointment() -> Self {
        Self {
            role: "Appointment Manager".to_string(),
            goal: "Schedule, list, reschedule and cancel the user's appointments".to_string(),
            backstory: "You keep the user's calendar. Always use the appointment tool to \
                        read or change appointments, write times as YYYY-MM-DD HH:MM, and \
                        report exactly what the tool returned."
                .to_string(),
            tools: vec!["manage_appointments"],
        }
    }

    /// Returns true if the agent may call `tool`
    #[must_use]
    pub fn allows(&self, tool: &str) -> bool {
        self.tools.iter().any(|t| *t == tool)
    }

    /// System prompt built from the persona
    #[must_use]
    pub fn system_prompt(&self) -> String {
        format!(
            "You are the {}.\n\nGoal: {}\n\n{}\n\n\
             Use the available tools when they help. When you are done, reply with \
             your final answer as plain text.",
            self.role, self.goal, self.backstory
        )
    }
}

/// Task given to an agent for one message
#[derive(Debug, Clone)]
pub struct TaskSpec {
    /// Description template containing `{message}`
    pub description: String,
    /// Shape of the expected answer
    pub expected_output: String,
}

impl TaskSpec {
    /// The single task every handler runs
    #[must_use]
    pub fn handle_query() -> Self {
        Self {
            description: "Handle the following user message: {message}".to_string(),
            expected_output: "A helpful, concise reply addressed to the user".to_string(),
        }
    }

    /// User message sent to the agent
    #[must_use]
    pub fn render(&self, message: &str) -> String {
        format!(
            "{}\n\nExpected output: {}",
            self.description.replace(MESSAGE_PLACEHOLDER, message),
            self.expected_output
        )
    }
}

/// Agent plus task executed for one intent
#[derive(Debug, Clone)]
pub struct Handler {
    /// Who runs the task
    pub profile: AgentProfile,
    /// What they are asked to do
    pub task: TaskSpec,
}

impl Handler {
    /// Handler for general queries
    #[must_use]
    pub fn general() -> Self {
        Self {
            profile: AgentProfile::general(),
            task: TaskSpec::handle_query(),
        }
    }

    /// Handler for appointment requests
    #[must_use]
    pub fn appointment() -> Self {
        Self {
            profile: AgentProfile::appointment(),
            task: TaskSpec::handle_query(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_renders_message() {
        let rendered = TaskSpec::handle_query().render("What's the weather in Oslo?");
        assert!(rendered.contains("Handle the following user message: What's the weather in Oslo?"));
        assert!(!rendered.contains(MESSAGE_PLACEHOLDER));
    }

    #[test]
    fn test_tool_sets_are_disjoint() {
        let general = AgentProfile::general();
        let appointment = AgentProfile::appointment();
        assert!(general.allows("web_search"));
        assert!(!general.allows("manage_appointments"));
        assert!(appointment.allows("manage_appointments"));
        assert!(!appointment.allows("get_weather"));
    }
}
