use anyhow::Result;
use std::sync::Arc;

use foreman::create_supervisor;
use foreman::travel::{flight_assistant, hotel_assistant, DEFAULT_QUERY, SUPERVISOR_PROMPT};

use super::{build_provider, print_answer};
use crate::configuration::Settings;

/// Book travel through the hotel and flight assistants
pub async fn execute(settings: Settings, query: Option<String>) -> Result<()> {
    let options = settings.agent.loop_options();
    let provider = build_provider(settings.provider)?;

    let agents = vec![
        Arc::new(hotel_assistant(Arc::clone(&provider))?.with_options(options)),
        Arc::new(flight_assistant(Arc::clone(&provider))?.with_options(options)),
    ];
    let prompt = settings
        .supervisor
        .prompt
        .unwrap_or_else(|| SUPERVISOR_PROMPT.to_string());
    let supervisor = create_supervisor(agents, provider, prompt)
        .with_options(options)
        .compile()?;

    let query = query.unwrap_or_else(|| DEFAULT_QUERY.to_string());
    let answer = supervisor.invoke(&query).await?;
    print_answer(&query, &answer);
    Ok(())
}
