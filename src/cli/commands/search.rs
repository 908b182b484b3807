//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::ChatOrchestrator;
use anyhow::Result;

/// Run the search command: raw ranked retrieval, no completion.
pub async fn run_search(query: &str, limit: usize, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Search, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Set OPENAI_API_KEY or add completion.api_key to your config.");
        return Err(e.into());
    }

    let orchestrator = ChatOrchestrator::new(settings)?;

    let spinner = Output::spinner("Searching insight base...");
    let results = match orchestrator.retrieve(query, limit).await {
        Ok(results) => {
            spinner.finish_and_clear();
            results
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    };

    if results.is_empty() {
        Output::info("No matching insights found.");
        return Ok(());
    }

    for (idx, record) in results.iter().enumerate() {
        let tags: Vec<&str> = [
            record.primary_tag.as_deref(),
            record.secondary_tag.as_deref(),
            record.tertiary_tag.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();

        Output::insight_result(
            idx + 1,
            &tags.join(" / "),
            record.id,
            record.similarity,
            &record.problem_statement,
        );
    }

    Ok(())
}
