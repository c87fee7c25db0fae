//! OpenAI chat-completion summary model.

use super::{SummaryBounds, SummaryModel};
use crate::config::Prompts;
use crate::error::{Result, TubedeckError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Words per request. Well inside the context window of current chat models.
const MAX_INPUT_WORDS: usize = 6000;

pub struct OpenAIModel {
    client: Client<OpenAIConfig>,
    model: String,
    prompts: Prompts,
}

impl OpenAIModel {
    pub fn new(model: &str, prompts: Prompts) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            model: model.to_string(),
            prompts,
        })
    }

    /// Render the user prompt for one window.
    fn user_prompt(&self, text: &str, bounds: SummaryBounds) -> String {
        let mut vars = HashMap::new();
        vars.insert("min_words".to_string(), bounds.min_words.to_string());
        vars.insert("max_words".to_string(), bounds.max_words.to_string());
        vars.insert("transcript".to_string(), text.to_string());

        self.prompts
            .render_with_custom(&self.prompts.summarize.user, &vars)
    }
}

#[async_trait]
impl SummaryModel for OpenAIModel {
    fn name(&self) -> &str {
        &self.model
    }

    fn max_input_words(&self) -> usize {
        MAX_INPUT_WORDS
    }

    #[instrument(skip(self, text), fields(model = %self.model))]
    async fn summarize_window(&self, text: &str, bounds: SummaryBounds) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.summarize.system.clone())
                .build()
                .map_err(|e| TubedeckError::Summarization(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(self.user_prompt(text, bounds))
                .build()
                .map_err(|e| TubedeckError::Summarization(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.0)
            .build()
            .map_err(|e| TubedeckError::Summarization(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| TubedeckError::Summarization(format!("OpenAI request failed: {}", e)))?;

        let summary = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| TubedeckError::Summarization("Empty response from model".to_string()))?
            .trim()
            .to_string();

        debug!("Model returned {} words", super::word_count(&summary));

        Ok(summary)
    }
}
