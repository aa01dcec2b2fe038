//! # Configuration
//! Settings come from the process environment, the same variables the OpenAI clients read:
//! * `OPENAI_API_KEY`: the credential. An empty value counts as missing.
//! * `OPENAI_API_BASE`: optional endpoint of an OpenAI-compatible API.
//! * `OPENAI_ORGANIZATION`: optional organization id.
//!
//! A missing credential is not an error here. It is carried as `None` so the
//! [AnswerGenerator](crate::generator::AnswerGenerator) can report it when a question is asked.

use std::fmt;
use url::Url;
use crate::config::errors::ConfigError;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const API_BASE_VAR: &str = "OPENAI_API_BASE";
pub const ORGANIZATION_VAR: &str = "OPENAI_ORGANIZATION";

/// Chat model used when none is given.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// API credential. Its debug output never shows the key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for an empty or blank key.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    #[inline]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: Option<ApiKey>,
    pub api_base: Option<Url>,
    pub organization: Option<String>,
    pub model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: None,
            organization: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(API_KEY_VAR).and_then(|key| ApiKey::new(key));
        let api_base = match lookup(API_BASE_VAR).filter(|v| !v.trim().is_empty()) {
            Some(raw) => Some(Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidApiBase { raw, source })?),
            None => None,
        };
        let organization = lookup(ORGANIZATION_VAR).filter(|v| !v.trim().is_empty());
        Ok(Self {
            api_key,
            api_base,
            organization,
            ..Self::default()
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[inline]
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

pub mod errors {
    use std::error::Error;
    use std::fmt;
    use std::fmt::Formatter;
    use super::API_BASE_VAR;

    #[derive(Debug)]
    pub enum ConfigError {
        /// `OPENAI_API_BASE` is set but is not a URL.
        InvalidApiBase { raw: String, source: url::ParseError },
    }

    impl fmt::Display for ConfigError {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            match self {
                ConfigError::InvalidApiBase { raw, source } =>
                    write!(f, "ConfigError: {} = {:?} is not a valid URL: {}", API_BASE_VAR, raw, source),
            }
        }
    }

    impl Error for ConfigError {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            match self {
                ConfigError::InvalidApiBase { source, .. } => Some(source),
            }
        }
    }
}
