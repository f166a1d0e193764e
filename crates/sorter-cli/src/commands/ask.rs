//! Ask command implementation.

use crate::cli::AskArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use sorter_llm::{AnthropicClient, ChatMessage, LlmError, LlmProvider};

/// Execute the ask command.
pub async fn execute_ask(args: AskArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    config.validate_anthropic()?;

    let provider = AnthropicClient::new(config.anthropic.clone())?;
    let reply = ask(&provider, &args.prompt).await?;

    println!("{}", formatter.format_reply(&reply)?);
    Ok(())
}

/// Send one user turn and return the reply text.
pub async fn ask<P: LlmProvider>(provider: &P, prompt: &str) -> Result<String> {
    if prompt.trim().is_empty() {
        return Err(CliError::InvalidInput("Prompt must not be empty".into()));
    }

    let response = provider.ask_chat(vec![ChatMessage::user(prompt)]).await?;
    response
        .text()
        .map(str::to_string)
        .ok_or_else(|| CliError::Llm(LlmError::Protocol("expected a text reply".into())))
}
