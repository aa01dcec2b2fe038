pub mod llm;
#[cfg(feature = "terminal_printing")]
pub mod printing;
