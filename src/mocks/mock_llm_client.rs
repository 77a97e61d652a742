use crate::agent::LlmClientTrait;
use crate::types::{FunctionCall, Message, ToolCall};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};

// One recorded model request: the history that was sent and whether the
// capability schemas were offered alongside it.
#[derive(Clone)]
pub struct RecordedCall {
    pub messages: Vec<Message>,
    pub tools_offered: bool,
}

enum MockResponse {
    Message(Message),
    ServiceFailure(String),
}

#[derive(Clone)]
pub struct MockLlmClient {
    responses: Arc<Mutex<Vec<MockResponse>>>,
    call_history: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn add_text_response(&mut self, content: &str) {
        let response = Message {
            role: "assistant".to_string(),
            content: Some(content.to_string()),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        };
        self.responses
            .lock()
            .unwrap()
            .push(MockResponse::Message(response));
    }

    pub fn add_tool_call_response(&mut self, tool_name: &str, args: &str) {
        self.add_tool_calls_response(&[(tool_name, args)]);
    }

    // Ids are call-1, call-2, ... in request order.
    pub fn add_tool_calls_response(&mut self, calls: &[(&str, &str)]) {
        let tool_calls = calls
            .iter()
            .enumerate()
            .map(|(i, (name, args))| ToolCall {
                id: format!("call-{}", i + 1),
                call_type: "function".to_string(),
                function: FunctionCall {
                    name: (*name).to_string(),
                    arguments: (*args).to_string(),
                },
            })
            .collect();

        let response = Message {
            role: "assistant".to_string(),
            content: None,
            tool_calls: Some(tool_calls),
            tool_call_id: None,
            name: None,
        };
        self.responses
            .lock()
            .unwrap()
            .push(MockResponse::Message(response));
    }

    pub fn add_service_failure(&mut self, error_msg: &str) {
        self.responses
            .lock()
            .unwrap()
            .push(MockResponse::ServiceFailure(error_msg.to_string()));
    }

    pub fn get_call_history(&self) -> Vec<RecordedCall> {
        self.call_history.lock().unwrap().clone()
    }

    fn pop_response(&self) -> MockResponse {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            MockResponse::Message(Message {
                role: "assistant".to_string(),
                content: Some("No more mock responses configured".to_string()),
                tool_calls: None,
                tool_call_id: None,
                name: None,
            })
        } else {
            responses.remove(0)
        }
    }
}

#[async_trait]
impl LlmClientTrait for MockLlmClient {
    async fn chat_once(&self, messages: &[Message], tools: Option<&Value>) -> Result<Message> {
        // Store the call for verification
        self.call_history.lock().unwrap().push(RecordedCall {
            messages: messages.to_vec(),
            tools_offered: tools.is_some(),
        });

        match self.pop_response() {
            MockResponse::Message(m) => Ok(m),
            MockResponse::ServiceFailure(e) => Err(anyhow::anyhow!("API error: {}", e)),
        }
    }
}
