//! Ask command implementation.

use crate::chat::ChatRequest;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::ChatOrchestrator;
use anyhow::Result;
use futures::StreamExt;
use std::io::Write;

/// Run the ask command: one question, streamed grounded answer.
pub async fn run_ask(question: &str, model: Option<String>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Chat, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Set OPENAI_API_KEY or add completion.api_key to your config.");
        return Err(e.into());
    }

    let model = model.unwrap_or_else(|| settings.completion.model.clone());
    let temperature = settings.completion.temperature;

    let orchestrator = ChatOrchestrator::new(settings)?;

    let request = ChatRequest {
        query: Some(question.to_string()),
        ..Default::default()
    };
    let turn = request.normalize(&model, temperature)?;

    let spinner = Output::spinner("Retrieving insights...");
    let outcome = match orchestrator.chat(turn).await {
        Ok(outcome) => {
            spinner.finish_and_clear();
            outcome
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to start answer: {}", e));
            return Err(e.into());
        }
    };

    let mut stream = outcome.stream;
    while let Some(token) = stream.next().await {
        match token {
            Ok(token) => {
                print!("{}", token);
                std::io::stdout().flush().ok();
            }
            Err(e) => {
                println!();
                Output::error(&format!("Stream interrupted: {}", e));
                return Err(e.into());
            }
        }
    }
    println!();

    match outcome.skip_reason {
        Some(reason) => Output::kv("Insights", &format!("none ({})", reason)),
        None => Output::kv("Insights", &outcome.insights_used.to_string()),
    }

    Ok(())
}
