use std::env;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::agent::Agent;
use crate::llm_client::LlmClient;
use crate::session::Session;
use crate::tool_registry::ToolRegistry;
use crate::tools::SensorReader;
use crate::types::Message;

mod agent;
mod llm_client;
mod session;
mod tool_registry;
mod tools;
mod types;
mod utils;

#[cfg(test)]
mod mocks;
#[cfg(test)]
mod tests;

const SYSTEM_PROMPT: &str = "You are an indoor air quality assistant. You can measure the ambient \
CO2 concentration with the connected sensor and classify it into a ventilation recommendation. \
Report readings in ppm and keep answers short.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let base_url = env::var("OPENAI_BASE_URL").context("OPENAI_BASE_URL not set")?;
    let api_key = env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?;
    let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

    let llm = LlmClient::new(base_url, api_key, model.clone())?;
    let agent = Agent::new(
        Box::new(llm),
        Arc::new(SensorReader::from_env()),
        ToolRegistry::new(),
    );

    let mut session = Session::new(Some("air quality chat"), Some(&model));
    session.add_message(Message::system(SYSTEM_PROMPT));

    println!("\u{001b}[94mCO2 assistant ready. Ask about the air, 'quit' to exit.\u{001b}[0m");

    loop {
        print!("\u{001b}[93mYou:\u{001b}[0m ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" {
            break;
        }

        match agent.turn(&mut session, input).await {
            Ok(reply) => println!("\u{001b}[96mAgent:\u{001b}[0m {}", reply),
            Err(e) => eprintln!("\u{001b}[91mError:\u{001b}[0m {:#}", e),
        }
    }

    Ok(())
}
