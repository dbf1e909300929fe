//! Dispatcher mapping intents to handlers

use super::profile::Handler;
use super::router::{Intent, IntentRouter};
use super::runner::AgentRunner;
use super::CrewError;
use crate::appointments::{AppointmentBackend, AppointmentStore};
use crate::config::AgentSettings;
use crate::llm::LlmClient;
use crate::tools::{AppointmentTool, ToolRegistry, WeatherTool, WebSearchTool};
use std::sync::Arc;
use tracing::{info, instrument};

/// Router plus the handlers it dispatches to
pub struct Crew {
    llm: Arc<LlmClient>,
    router: IntentRouter,
    runner: AgentRunner,
    general: Handler,
    appointment: Handler,
}

impl Crew {
    /// Assemble a crew from a client and a tool table
    #[must_use]
    pub fn new(llm: LlmClient, tools: ToolRegistry, max_iterations: usize) -> Self {
        let llm = Arc::new(llm);
        Self {
            router: IntentRouter::new(Arc::clone(&llm)),
            runner: AgentRunner::new(Arc::clone(&llm), Arc::new(tools), max_iterations),
            llm,
            general: Handler::general(),
            appointment: Handler::appointment(),
        }
    }

    /// Build the standard crew: weather, search and appointment tools over `store`
    #[must_use]
    pub fn from_settings<B>(settings: &AgentSettings, store: Arc<AppointmentStore<B>>) -> Self
    where
        B: AppointmentBackend + 'static,
    {
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(WeatherTool::new(
            settings.openweather_api_key.clone(),
            &settings.weather_api_base(),
        )));
        tools.register(Arc::new(WebSearchTool::new(
            settings.serpapi_key.clone(),
            &settings.search_api_base(),
        )));
        tools.register(Arc::new(AppointmentTool::new(store)));

        Self::new(
            LlmClient::new(settings),
            tools,
            settings.agent_max_iterations(),
        )
    }

    /// Returns true if the reasoning endpoint is configured
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.llm.is_available()
    }

    /// Handler serving `intent`; unknown intents go to the general handler
    #[must_use]
    pub fn handler_for(&self, intent: Intent) -> &Handler {
        match intent {
            Intent::Appointment => &self.appointment,
            Intent::General | Intent::Unknown => &self.general,
        }
    }

    /// Run the handler for `intent` once on `message`
    ///
    /// # Errors
    ///
    /// Returns any `CrewError` from the agent run.
    pub async fn dispatch(&self, intent: Intent, message: &str) -> Result<String, CrewError> {
        let handler = self.handler_for(intent);
        info!(intent = %intent, role = %handler.profile.role, "Dispatching message");
        self.runner
            .run(&handler.profile, &handler.task.render(message))
            .await
    }

    /// Classify `message` and dispatch it
    ///
    /// # Errors
    ///
    /// Returns `CrewError::Llm` if classification fails, or any error of the run.
    #[instrument(skip(self, message))]
    pub async fn kickoff(&self, message: &str) -> Result<String, CrewError> {
        let intent = self.router.classify(message).await?;
        self.dispatch(intent, message).await
    }
}
