use crate::types::Message;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct LlmClient {
    base_url: String,
    api_key: String,
    model: String,
    http: reqwest::Client,
}

impl LlmClient {
    pub fn new(base_url: String, api_key: String, model: String) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(8)
            .tcp_keepalive(Duration::from_secs(30))
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            base_url,
            api_key,
            model,
            http,
        })
    }

    // One chat completion round trip. `tools` is the capability schema array
    // offered on the first request of a turn; the follow-up after tool
    // results passes None so the model has to answer in free text.
    pub async fn chat_once(
        &self,
        messages: &[Message],
        tools: Option<&Value>,
    ) -> anyhow::Result<Message> {
        let url = format!("{}/chat/completions", self.base_url);
        let mut req = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "stream": false
        });
        if let Some(tools) = tools {
            req["tools"] = tools.clone();
            req["tool_choice"] = Value::from("auto");
        }

        debug!(model = %self.model, tools_offered = tools.is_some(), "requesting chat completion");

        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await?;

        let response_text = resp.text().await?;
        let response_json: Value = serde_json::from_str(&response_text)
            .map_err(|e| anyhow::anyhow!("Failed to parse JSON response: {}", e))?;

        if let Some(error) = response_json.get("error") {
            anyhow::bail!("API error: {}", error);
        }

        let choice = response_json["choices"]
            .as_array()
            .and_then(|choices| choices.first())
            .ok_or_else(|| anyhow::anyhow!("No choices in response"))?;

        let message: Message = serde_json::from_value(choice["message"].clone())
            .map_err(|e| anyhow::anyhow!("Failed to parse message: {}", e))?;

        Ok(message)
    }
}
