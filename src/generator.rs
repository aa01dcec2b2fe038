//! # Answer Generator
//! Turns a question and a persona name into an answer from the LLM.
//!
//! The generator owns nothing but what it is given: the [PromptRegistry] to resolve instructions, the
//! credential, and the [ChatCompletion] endpoint. Each call to [AnswerGenerator::generate] builds its
//! own request and keeps nothing afterwards.

use std::sync::Arc;
use log::{debug, error, info};
use crate::config::{ApiKey, DEFAULT_MODEL};
use crate::exchange::{ChatRequest, Exchange};
use crate::generator::errors::GenerateError;
use crate::persona::PromptRegistry;
use crate::utils::llm::ChatCompletion;

pub struct AnswerGenerator<C: ChatCompletion> {
    registry: Arc<PromptRegistry>,
    credential: Option<ApiKey>,
    client: C,
    model: String,
}

impl<C: ChatCompletion> AnswerGenerator<C> {
    pub fn new(registry: Arc<PromptRegistry>, credential: Option<ApiKey>, client: C) -> Self {
        Self {
            registry,
            credential,
            client,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[inline]
    pub fn registry(&self) -> &PromptRegistry {
        &self.registry
    }

    #[inline]
    pub fn client(&self) -> &C {
        &self.client
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the request for a question without sending it.
    pub fn build_request(&self, user_text: &str, persona_name: &str) -> ChatRequest {
        let instruction = self.registry.lookup(persona_name);
        Exchange::new(instruction, user_text).into_request(self.model.as_str())
    }

    /// Ask the LLM `user_text` framed by the persona `persona_name`, and return its reply verbatim.
    ///
    /// Returns [GenerateError::MissingCredential] without contacting the LLM if there is no credential,
    /// and [GenerateError::Service] if the LLM call fails. Failures are not retried.
    pub async fn generate(&self, user_text: &str, persona_name: &str) -> Result<String, GenerateError> {
        let credential = self.credential.as_ref().ok_or(GenerateError::MissingCredential)?;
        let request = self.build_request(user_text, persona_name);
        debug!("generating answer as persona {:?} with model {}", persona_name, request.model);
        match self.client.complete(&request, credential).await {
            Ok(answer) => {
                info!("answer generated, {} chars", answer.chars().count());
                Ok(answer)
            }
            Err(e) => {
                error!("chat completion failed: {:#}", e);
                Err(GenerateError::Service(e))
            }
        }
    }
}

pub mod errors {
    use std::error::Error;
    use std::fmt;
    use std::fmt::Formatter;
    use crate::config::API_KEY_VAR;

    #[derive(Debug)]
    pub enum GenerateError {
        /// No API credential is configured.
        MissingCredential,
        /// The completion service failed or returned something unusable.
        Service(anyhow::Error),
    }

    impl fmt::Display for GenerateError {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            match self {
                GenerateError::MissingCredential =>
                    write!(f, "ConfigurationError: {} is not set", API_KEY_VAR),
                GenerateError::Service(e) =>
                    write!(f, "ServiceError: {:#}", e),
            }
        }
    }

    impl Error for GenerateError {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            match self {
                GenerateError::MissingCredential => None,
                GenerateError::Service(e) => Some(&**e),
            }
        }
    }
}
