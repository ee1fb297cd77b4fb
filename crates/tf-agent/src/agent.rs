//! The Claude-backed generation/fixer oracle.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use tf_core::{AgentError, FixerOracle, GenerateParams, RepairParams, TestExample};

use crate::client::{ClaudeClient, Message};
use crate::logger::PromptLogger;
use crate::prompts;

/// Implements [`FixerOracle`] against the Anthropic Messages API.
///
/// Code-producing calls prefill the assistant turn with an opening
/// ```` ```<language> ```` fence so the model answers with bare code,
/// then reattach the prefill and strip the fence from the result.
pub struct ClaudeAgent {
    client: ClaudeClient,
    logger: PromptLogger,
}

impl ClaudeAgent {
    #[must_use]
    pub fn new(client: ClaudeClient, logger: PromptLogger) -> Self {
        Self { client, logger }
    }

    /// Build an agent from `ANTHROPIC_API_KEY`.
    pub fn from_env(logger: PromptLogger) -> Result<Self, AgentError> {
        Ok(Self::new(ClaudeClient::from_env()?, logger))
    }

    /// Run one code-producing completion with a fence prefill.
    async fn complete_code(
        &self,
        operation: &'static str,
        prompt: String,
        language: &str,
    ) -> Result<String, AgentError> {
        info!(
            operation,
            model = self.client.model(),
            "completion started"
        );

        let fence = format!("```{language}");
        let messages = vec![Message::user(&prompt), Message::assistant(&fence)];

        match self.client.complete(&messages).await {
            Ok(reply) => {
                // The reply continues the prefilled fence; reattach it so
                // fence stripping sees the complete block.
                let code = prompts::strip_code_fences(&format!("{fence}{reply}"));
                debug!(operation, response_length = code.len(), "received response");
                self.logger.log(operation, &prompt, &code);
                Ok(code)
            }
            Err(err) => {
                self.logger.log(operation, &prompt, "");
                Err(err)
            }
        }
    }
}

/// Prefill for example selection; the model completes the JSON object.
const PICK_EXAMPLE_PREFILL: &str = r#"{"exampleIndex":"#;

#[derive(Deserialize)]
struct ExampleChoice {
    #[serde(rename = "exampleIndex")]
    example_index: usize,
}

#[async_trait]
impl FixerOracle for ClaudeAgent {
    async fn generate_test(&self, params: GenerateParams<'_>) -> Result<String, AgentError> {
        debug!(
            function = %params.function.name,
            source_length = params.source_code.len(),
            "preparing test generation prompt"
        );
        let prompt = prompts::generation_prompt(&params);
        self.complete_code("generate_test", prompt, params.language)
            .await
    }

    async fn fix_static_errors(&self, params: RepairParams<'_>) -> Result<String, AgentError> {
        let prompt = prompts::static_fix_prompt(&params);
        self.complete_code("fix_static_errors", prompt, params.language)
            .await
    }

    async fn fix_test_failures(&self, params: RepairParams<'_>) -> Result<String, AgentError> {
        let prompt = prompts::execution_fix_prompt(&params);
        self.complete_code("fix_test_failures", prompt, params.language)
            .await
    }

    async fn pick_example(
        &self,
        source_code: &str,
        examples: &[TestExample],
    ) -> Result<usize, AgentError> {
        if examples.is_empty() {
            return Err(AgentError::Request("no test examples provided".to_string()));
        }

        let prompt = prompts::pick_example_prompt(source_code, examples);
        info!(
            operation = "pick_example",
            model = self.client.model(),
            "completion started"
        );

        let messages = vec![
            Message::user(&prompt),
            Message::assistant(PICK_EXAMPLE_PREFILL),
        ];
        let reply = match self.client.complete(&messages).await {
            Ok(reply) => reply,
            Err(err) => {
                self.logger.log("pick_example", &prompt, "");
                return Err(err);
            }
        };

        let raw = format!("{PICK_EXAMPLE_PREFILL}{reply}");
        self.logger.log("pick_example", &prompt, &raw);

        let choice: ExampleChoice = serde_json::from_str(&raw)
            .map_err(|err| AgentError::Request(format!("invalid example choice: {err}")))?;

        if choice.example_index >= examples.len() {
            return Err(AgentError::ExampleOutOfRange {
                index: choice.example_index,
                count: examples.len(),
            });
        }
        Ok(choice.example_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_choice_parses_prefilled_json() {
        let raw = format!("{PICK_EXAMPLE_PREFILL}2}}");
        let choice: ExampleChoice = serde_json::from_str(&raw).unwrap();
        assert_eq!(choice.example_index, 2);
    }
}
