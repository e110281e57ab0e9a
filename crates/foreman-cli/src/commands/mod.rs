use anyhow::Result;
use console::style;
use std::sync::Arc;

use foreman::providers::base::Provider;
use foreman::providers::openai::OpenAiProvider;

use crate::configuration::ProviderSettings;

pub mod run;
pub mod tools;
pub mod travel;

fn build_provider(settings: ProviderSettings) -> Result<Arc<dyn Provider>> {
    let provider = OpenAiProvider::new(settings.into_config())?;
    tracing::info!(model = provider.model(), "model gateway ready");
    Ok(Arc::new(provider))
}

fn print_answer(query: &str, answer: &str) {
    println!("{} {}", style("user:").bold().cyan(), query);
    println!("{} {}", style("answer:").bold().green(), answer);
}
