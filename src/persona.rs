//! # Persona
//! A persona is a named system instruction that frames how the LLM answers.
//!
//! ## PromptRegistry
//! A prompt registry is an ordered, immutable collection of personas plus a fallback instruction.
//! It is built once at start-up and handed to whoever needs it, usually wrapped in an [Arc](std::sync::Arc).
//!
//! Looking up an instruction via [PromptRegistry::lookup] never fails: names that are not in the registry
//! (including the empty string) resolve to the fallback instruction.
//!
//! Besides the built-in registry ([PromptRegistry::builtin]), a registry can be loaded from JSON like
//! ```json
//! {
//!   "fallback": "You are a helpful assistant.",
//!   "personas": [
//!     {"name": "Rust mentor", "instruction": "You are a patient Rust mentor."}
//!   ]
//! }
//! ```
//! where `fallback` is optional.

use std::collections::HashMap;
use std::path::Path;
use log::debug;
use serde::{Deserialize, Serialize};
use crate::persona::errors::RegistryError;

/// Instruction used when the requested persona is not in the registry.
pub const FALLBACK_INSTRUCTION: &str = "あなたは有能なアシスタントです。";

const BUILTIN_PERSONAS: [(&str, &str); 3] = [
    (
        "高校生専門教育アドバイザー",
        "あなたは経験豊富な教育アドバイザーです。\
        高校生の悩みや、高校生を持つ親の悩みに対し、親身にかつ適切なアドバイスをしてください。",
    ),
    (
        "晩御飯専門料理アドバイザー",
        "あなたは晩御飯の専門料理アドバイザーです。\
        家庭で簡単に作れるレシピや、栄養バランスを考えた食事提案をしてください。",
    ),
    (
        "AI活用アドバイザー",
        "あなたは統計解析、機械学習、データ可視化に長けたAI活用アドバイザーです。\
        最新のAIの詳細な説明、手法や具体的な導入事例を、初心者向けに丁寧に提供してください。",
    ),
];

/// A named system instruction.
#[readonly::make]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Unique name of the persona, readonly
    pub name: String,
    /// System instruction sent to the LLM, readonly
    pub instruction: String,
}

impl Persona {
    pub fn new(name: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instruction: instruction.into(),
        }
    }
}

#[derive(Deserialize)]
struct RegistryFile {
    #[serde(default)]
    fallback: Option<String>,
    personas: Vec<Persona>,
}

/// Ordered, immutable mapping from persona name to instruction.
#[derive(Debug, Clone)]
pub struct PromptRegistry {
    personas: Vec<Persona>,
    name_to_idx: HashMap<String, usize>,
    fallback: String,
}

impl PromptRegistry {
    /// Create a registry from personas in display order.
    /// Returns an error if a name is empty or appears twice.
    pub fn new(personas: Vec<Persona>, fallback: impl Into<String>) -> Result<Self, RegistryError> {
        let mut name_to_idx = HashMap::with_capacity(personas.len());
        for (idx, persona) in personas.iter().enumerate() {
            if persona.name.trim().is_empty() {
                return Err(RegistryError::EmptyName { position: idx });
            }
            if name_to_idx.insert(persona.name.clone(), idx).is_some() {
                return Err(RegistryError::DuplicateName { name: persona.name.clone() });
            }
        }
        Ok(Self {
            personas,
            name_to_idx,
            fallback: fallback.into(),
        })
    }

    /// The three built-in expert personas with [FALLBACK_INSTRUCTION].
    pub fn builtin() -> Self {
        let personas = BUILTIN_PERSONAS
            .iter()
            .map(|(name, instruction)| Persona::new(*name, *instruction))
            .collect::<Vec<_>>();
        let name_to_idx = personas.iter().enumerate().map(|(idx, p)| (p.name.clone(), idx)).collect();
        Self {
            personas,
            name_to_idx,
            fallback: FALLBACK_INSTRUCTION.to_string(),
        }
    }

    /// Parse a registry from JSON. The fallback defaults to [FALLBACK_INSTRUCTION] when omitted.
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = serde_json::from_str(json).map_err(RegistryError::Malformed)?;
        let fallback = file.fallback.unwrap_or_else(|| FALLBACK_INSTRUCTION.to_string());
        Self::new(file.personas, fallback)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RegistryError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Resolve the instruction of a persona. Unknown names resolve to the fallback instruction.
    pub fn lookup(&self, persona_name: &str) -> &str {
        match self.get(persona_name) {
            Some(persona) => persona.instruction.as_str(),
            None => {
                debug!("persona {:?} is not registered, using the fallback instruction", persona_name);
                self.fallback.as_str()
            }
        }
    }

    #[inline]
    pub fn get(&self, persona_name: &str) -> Option<&Persona> {
        self.name_to_idx.get(persona_name).map(|idx| &self.personas[*idx])
    }

    #[inline]
    pub fn contains(&self, persona_name: &str) -> bool {
        self.name_to_idx.contains_key(persona_name)
    }

    /// Personas in display order.
    #[inline]
    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    pub fn names(&self) -> impl Iterator<Item=&str> {
        self.personas.iter().map(|p| p.name.as_str())
    }

    #[inline]
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.personas.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}

pub mod errors {
    use std::error::Error;
    use std::fmt;
    use std::fmt::Formatter;

    /// Error when building a [PromptRegistry](super::PromptRegistry) from custom personas.
    #[derive(Debug)]
    pub enum RegistryError {
        /// Two personas share a name.
        DuplicateName { name: String },
        /// A persona at the given position has an empty or blank name.
        EmptyName { position: usize },
        /// The registry JSON could not be parsed.
        Malformed(serde_json::Error),
        /// The registry file could not be read.
        Unreadable { path: String, source: std::io::Error },
    }

    impl fmt::Display for RegistryError {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            match self {
                RegistryError::DuplicateName { name } =>
                    write!(f, "RegistryError: persona name {:?} is registered more than once", name),
                RegistryError::EmptyName { position } =>
                    write!(f, "RegistryError: persona at position {} has an empty name", position),
                RegistryError::Malformed(e) =>
                    write!(f, "RegistryError: malformed registry JSON: {}", e),
                RegistryError::Unreadable { path, source } =>
                    write!(f, "RegistryError: cannot read registry file {}: {}", path, source),
            }
        }
    }

    impl Error for RegistryError {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            match self {
                RegistryError::Malformed(e) => Some(e),
                RegistryError::Unreadable { source, .. } => Some(source),
                _ => None,
            }
        }
    }
}

#[cfg(test)]
mod test_persona {
    use super::errors::RegistryError;
    use super::{FALLBACK_INSTRUCTION, Persona, PromptRegistry};

    #[test]
    fn test_builtin_lookup() {
        let registry = PromptRegistry::builtin();
        assert_eq!(3, registry.len());
        assert_eq!(
            "あなたは経験豊富な教育アドバイザーです。高校生の悩みや、高校生を持つ親の悩みに対し、親身にかつ適切なアドバイスをしてください。",
            registry.lookup("高校生専門教育アドバイザー")
        );
        assert_eq!(
            "あなたは晩御飯の専門料理アドバイザーです。家庭で簡単に作れるレシピや、栄養バランスを考えた食事提案をしてください。",
            registry.lookup("晩御飯専門料理アドバイザー")
        );
        assert_eq!(
            "あなたは統計解析、機械学習、データ可視化に長けたAI活用アドバイザーです。最新のAIの詳細な説明、手法や具体的な導入事例を、初心者向けに丁寧に提供してください。",
            registry.lookup("AI活用アドバイザー")
        );
    }

    #[test]
    fn test_builtin_order() {
        let registry = PromptRegistry::builtin();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(vec!["高校生専門教育アドバイザー", "晩御飯専門料理アドバイザー", "AI活用アドバイザー"], names);
    }

    #[test]
    fn test_unknown_falls_back() {
        let registry = PromptRegistry::builtin();
        assert_eq!(FALLBACK_INSTRUCTION, registry.lookup(""));
        assert_eq!(FALLBACK_INSTRUCTION, registry.lookup("料理"));
        assert_eq!(FALLBACK_INSTRUCTION, registry.lookup(" AI活用アドバイザー"));
        assert!(registry.get("料理").is_none());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let personas = vec![Persona::new("a", "first"), Persona::new("a", "second")];
        let err = PromptRegistry::new(personas, "fallback").expect_err("duplicate names should be rejected");
        assert!(matches!(err, RegistryError::DuplicateName { ref name } if name == "a"));

        let personas = vec![Persona::new("a", "first"), Persona::new("  ", "blank")];
        let err = PromptRegistry::new(personas, "fallback").expect_err("blank names should be rejected");
        assert!(matches!(err, RegistryError::EmptyName { position: 1 }));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "fallback": "You are a helpful assistant.",
            "personas": [
                {"name": "mentor", "instruction": "You are a patient Rust mentor."},
                {"name": "chef", "instruction": "You are a chef."}
            ]
        }"#;
        let registry = PromptRegistry::from_json_str(json).expect("valid registry JSON");
        assert_eq!("You are a patient Rust mentor.", registry.lookup("mentor"));
        assert_eq!("You are a helpful assistant.", registry.lookup("unknown"));
        assert_eq!(vec!["mentor", "chef"], registry.names().collect::<Vec<_>>());

        let json = r#"{"personas": [{"name": "chef", "instruction": "You are a chef."}]}"#;
        let registry = PromptRegistry::from_json_str(json).expect("valid registry JSON");
        assert_eq!(FALLBACK_INSTRUCTION, registry.fallback());

        let err = PromptRegistry::from_json_str("{\"personas\": 3}").expect_err("malformed JSON");
        assert!(matches!(err, RegistryError::Malformed(_)));

        let registry = PromptRegistry::from_json_str(r#"{"personas": []}"#).expect("valid registry JSON");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_from_missing_file() {
        let path = std::env::temp_dir().join("expert-qa-no-such-personas.json");
        let err = PromptRegistry::from_json_file(&path).expect_err("missing file should fail");
        assert!(matches!(err, RegistryError::Unreadable { .. }));
        assert!(err.to_string().contains("expert-qa-no-such-personas.json"));
    }
}
