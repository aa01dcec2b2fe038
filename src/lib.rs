//! # expert-qa
//!
//! Ask a question to an LLM that answers as one of a few expert personas.
//!
//! ## Usage
//! ```text
//! export OPENAI_API_KEY=sk-...
//! expert-qa personas
//! expert-qa ask --persona 2 "今夜の献立を考えてください"
//! echo "進路に悩んでいます" | expert-qa ask --persona 高校生専門教育アドバイザー
//! ```
//!
//! ## Concepts and Design
//! Everything is explicit and passed in by the caller. There is no global state: the registry and the
//! credential are built once at start-up and handed to the generator.
//!
//! ### Persona and Prompt Registry
//!
//! A persona is a name and a system instruction. The [PromptRegistry](crate::persona::PromptRegistry) is the
//! ordered, immutable set of personas. Looking up a name that is not registered gives a fallback instruction
//! instead of an error.
//!
//! ### Exchange
//!
//! An [Exchange](crate::exchange::Exchange) is an instruction plus the user's text. It becomes a
//! [ChatRequest](crate::exchange::ChatRequest) of exactly two messages, system then user, sampled at a fixed
//! temperature of 0.7.
//!
//! ### Answer Generator
//!
//! The [AnswerGenerator](crate::generator::AnswerGenerator) resolves the instruction, sends the request to a
//! [ChatCompletion](crate::utils::llm::ChatCompletion) endpoint and hands back the reply as it is. No retries, no
//! post-processing. Without a credential it refuses before anything is sent.
//!
//! ### Form and Surface
//!
//! The [QaForm](crate::form::QaForm) is what a user interface drives: it rejects blank questions, turns
//! generator errors into user-facing messages, and shows the answer on a [Surface](crate::form::Surface).
//! With the `terminal_printing` feature, [TerminalSurface](crate::terminal::TerminalSurface) renders all of it
//! in a terminal.
//!
//! ## Attribution
//! * `async_openai`: [OpenAIChat](crate::utils::llm::OpenAIChat) is a thin layer over its chat completion API.
//! * `termimad`: answers are rendered as markdown with it.

pub mod config;
pub mod exchange;
pub mod form;
pub mod generator;
pub mod persona;
#[cfg(feature = "terminal_printing")]
pub mod terminal;
pub mod utils;
