use crate::llm_client::LlmClient;
use crate::session::Session;
use crate::tool_registry::{Capability, DETERMINE_VENTILATION_STATUS, MEASURE_CO2, ToolRegistry};
use crate::tools::sensor::{Co2Source, SensorError};
use crate::tools::ventilation;
use crate::types::{Message, ToolCall};
use crate::utils::normalize_answer;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

#[async_trait]
pub trait LlmClientTrait: Send + Sync {
    async fn chat_once(&self, messages: &[Message], tools: Option<&Value>)
    -> anyhow::Result<Message>;
}

// Implement trait for real LlmClient
#[async_trait]
impl LlmClientTrait for LlmClient {
    async fn chat_once(
        &self,
        messages: &[Message],
        tools: Option<&Value>,
    ) -> anyhow::Result<Message> {
        LlmClient::chat_once(self, messages, tools).await
    }
}

pub struct Agent {
    llm: Box<dyn LlmClientTrait>,
    sensor: Arc<dyn Co2Source>,
    tools: ToolRegistry,
}

impl Agent {
    pub fn new(llm: Box<dyn LlmClientTrait>, sensor: Arc<dyn Co2Source>, tools: ToolRegistry) -> Self {
        Self { llm, sensor, tools }
    }

    // One full conversational turn: at most two model round trips. The first
    // offers the capability schemas; if the model requests calls, they are
    // executed strictly in the order returned, their results appended, and
    // the follow-up request (no schemas) produces the final answer.
    //
    // Capability failures become readable tool-message content. Only a model
    // service failure aborts the turn.
    pub async fn turn(&self, session: &mut Session, user_text: &str) -> anyhow::Result<String> {
        if !user_text.trim().is_empty() {
            session.add_message(Message::user(user_text.trim()));
        }

        let first = self
            .llm
            .chat_once(&session.messages, Some(self.tools.schemas()))
            .await?;
        session.add_message(first.clone());

        let calls = match first.tool_calls {
            Some(calls) if !calls.is_empty() => calls,
            _ => {
                let text = first.content.unwrap_or_default().trim().to_string();
                return Ok(text);
            }
        };

        self.execute_calls(session, &calls).await;

        let second = self.llm.chat_once(&session.messages, None).await?;
        let text = normalize_answer(&second.content.unwrap_or_default());
        session.add_message(Message::assistant(&text));
        Ok(text)
    }

    async fn execute_calls(&self, session: &mut Session, calls: &[ToolCall]) {
        let mut i = 0;
        while i < calls.len() {
            let call = &calls[i];
            match self.tools.resolve(&call.function.name) {
                Err(e) => {
                    warn!(capability = %call.function.name, "model requested unknown capability");
                    session.add_message(Message::tool(
                        &call.id,
                        &call.function.name,
                        format!("Error: {}", e),
                    ));
                }
                Ok(Capability::MeasureCo2) => {
                    // A successful reading is fed straight into the
                    // classifier: one combined tool result instead of two.
                    // A classification request immediately following with no
                    // explicit ppm belongs to the same chain and is answered
                    // by the combined result.
                    let paired = calls.get(i + 1).filter(|next| {
                        next.function.name == DETERMINE_VENTILATION_STATUS
                            && !has_explicit_ppm(next)
                    });
                    let result_id = paired.map_or(call.id.as_str(), |next| next.id.as_str());

                    match self.read_sensor().await {
                        Ok(ppm) => {
                            let status = ventilation::classify(ppm);
                            debug!(ppm, tier = ?status.status, "reading classified");
                            session.add_message(Message::tool(
                                result_id,
                                DETERMINE_VENTILATION_STATUS,
                                status.to_content(),
                            ));
                        }
                        Err(e) => {
                            warn!(error = %e, "sensor read failed");
                            session.add_message(Message::tool(
                                result_id,
                                MEASURE_CO2,
                                format!("Error: sensor read failed: {}", e),
                            ));
                        }
                    }
                    if paired.is_some() {
                        i += 1;
                    }
                }
                Ok(Capability::DetermineVentilationStatus) => {
                    let args: Value = serde_json::from_str(&call.function.arguments)
                        .unwrap_or_else(|_| serde_json::json!({}));
                    let content = match ventilation::classify_arg(&args) {
                        Ok(status) => status.to_content(),
                        Err(e) => format!("Error: {}", e),
                    };
                    session.add_message(Message::tool(
                        &call.id,
                        DETERMINE_VENTILATION_STATUS,
                        content,
                    ));
                }
            }
            i += 1;
        }
    }

    // The serial exchange blocks on the settle delay, so it runs on the
    // blocking pool; awaited immediately, keeping call execution sequential.
    async fn read_sensor(&self) -> Result<u32, SensorError> {
        let sensor = Arc::clone(&self.sensor);
        match tokio::task::spawn_blocking(move || sensor.read()).await {
            Ok(reading) => reading,
            Err(e) => Err(SensorError::Transport(format!("sensor task failed: {}", e))),
        }
    }
}

fn has_explicit_ppm(call: &ToolCall) -> bool {
    serde_json::from_str::<Value>(&call.function.arguments)
        .map(|v| v.get("ppm").is_some())
        .unwrap_or(false)
}
