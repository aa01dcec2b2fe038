//! # LLM endpoints
//! The completion service is anything that implements [ChatCompletion].
//!
//! [OpenAIChat] talks to the OpenAI chat completion API, or any API compatible with it, through `async_openai`.

use anyhow::{anyhow, Result};
use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
    CreateChatCompletionResponse,
};
use async_trait::async_trait;
use log::debug;
use url::Url;

use crate::config::{ApiKey, Settings};
use crate::exchange::{ChatMessage, ChatRequest, Role};

/// Trait for sending a chat request to an LLM and getting the reply text back.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, request: &ChatRequest, credential: &ApiKey) -> Result<String>;
}

/// Chat completion endpoint of the OpenAI API.
#[derive(Clone, Debug, Default)]
pub struct OpenAIChat {
    pub api_base: Option<Url>,
    pub organization: Option<String>,
}

impl OpenAIChat {
    pub fn new(api_base: Option<Url>, organization: Option<String>) -> Self {
        Self {
            api_base,
            organization,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.api_base.clone(), settings.organization.clone())
    }

    fn client(&self, credential: &ApiKey) -> Client<OpenAIConfig> {
        let mut config = OpenAIConfig::new().with_api_key(credential.expose());
        if let Some(api_base) = &self.api_base {
            // async_openai appends paths starting with "/"
            config = config.with_api_base(api_base.as_str().trim_end_matches('/'));
        }
        if let Some(organization) = &self.organization {
            config = config.with_org_id(organization.as_str());
        }
        Client::with_config(config)
    }
}

fn to_openai_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let message: ChatCompletionRequestMessage = match message.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(message.content.as_str())
            .build()?
            .into(),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(message.content.as_str())
            .build()?
            .into(),
    };
    Ok(message)
}

#[async_trait]
impl ChatCompletion for OpenAIChat {
    async fn complete(&self, request: &ChatRequest, credential: &ApiKey) -> Result<String> {
        let messages = request.messages
            .iter()
            .map(to_openai_message)
            .collect::<Result<Vec<_>>>()?;
        let openai_request = CreateChatCompletionRequestArgs::default()
            .model(request.model.as_str())
            .messages(messages)
            .temperature(request.temperature)
            .build()?;
        debug!("sending chat completion request, model = {}, messages = {}", request.model, request.messages.len());
        let response = self.client(credential).chat().create(openai_request).await?;
        if let Some(usage) = &response.usage {
            debug!("chat completion usage: prompt = {}, completion = {}", usage.prompt_tokens, usage.completion_tokens);
        }
        answer_from_response(response)
    }
}

/// Text of the first choice. A choice without content is an empty answer, a response without choices is an error.
fn answer_from_response(response: CreateChatCompletionResponse) -> Result<String> {
    let choice = response.choices
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("chat completion response has no choices"))?;
    Ok(choice.message.content.unwrap_or_default())
}
