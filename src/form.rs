//! # Form
//! The question form: pick a persona, type a question, submit.
//!
//! The form does not draw anything itself. It reports to a [Surface], which may be a terminal
//! ([TerminalSurface](crate::terminal::TerminalSurface)) or anything else that can show a warning, an error,
//! a busy indicator and an answer.
//!
//! On [QaForm::submit]:
//! * a blank question is rejected with a warning and nothing is sent
//! * a missing credential is reported as an error and the answer is empty
//! * a failing LLM call is reported as an error
//! * otherwise the answer is shown under [ANSWER_HEADING]

use log::warn;
use crate::generator::AnswerGenerator;
use crate::generator::errors::GenerateError;
use crate::persona::PromptRegistry;
use crate::utils::llm::ChatCompletion;

pub const TITLE: &str = "AI Q&A アプリ";
pub const DESCRIPTION: &str = "このアプリはテキストを入力し、選択した専門家の立場でLLMによる回答を生成します。";
pub const PERSONA_LABEL: &str = "専門家を選択してください:";
pub const QUESTION_LABEL: &str = "質問を入力してください:";
pub const EMPTY_QUESTION_WARNING: &str = "質問を入力してください。";
pub const MISSING_CREDENTIAL_ERROR: &str = "OPENAI_API_KEYが設定されていません。環境変数にAPIキーを設定してください。";
pub const SERVICE_ERROR_PREFIX: &str = "回答の生成に失敗しました";
pub const BUSY_MESSAGE: &str = "LLM による回答を生成中...";
pub const ANSWER_HEADING: &str = "回答結果";

/// Where the form shows its results.
pub trait Surface {
    fn warning(&mut self, message: &str);
    fn error(&mut self, message: &str);
    /// Start showing that an answer is being generated.
    fn busy(&mut self, message: &str);
    /// Stop the busy indicator.
    fn idle(&mut self);
    fn answer(&mut self, heading: &str, text: &str);
}

/// What happened to a submitted question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The question was blank, nothing was sent.
    Rejected,
    /// No credential, nothing was sent.
    Unconfigured,
    /// The LLM call failed.
    Failed,
    Answered(String),
}

impl Outcome {
    /// The answer text, empty unless the question was answered.
    pub fn answer(&self) -> &str {
        match self {
            Outcome::Answered(text) => text,
            _ => "",
        }
    }

    #[inline]
    pub fn is_answered(&self) -> bool {
        matches!(self, Outcome::Answered(_))
    }
}

pub struct QaForm<C: ChatCompletion> {
    generator: AnswerGenerator<C>,
}

impl<C: ChatCompletion> QaForm<C> {
    pub fn new(generator: AnswerGenerator<C>) -> Self {
        Self { generator }
    }

    #[inline]
    pub fn registry(&self) -> &PromptRegistry {
        self.generator.registry()
    }

    #[inline]
    pub fn generator(&self) -> &AnswerGenerator<C> {
        &self.generator
    }

    /// Resolve a persona selector: a 1-based position in the registry or a persona name.
    /// Selectors that match neither are returned as they are, so the fallback instruction applies.
    pub fn select_persona<'a>(&'a self, selector: &'a str) -> &'a str {
        let registry = self.registry();
        if let Ok(position) = selector.trim().parse::<usize>() {
            if let Some(persona) = position.checked_sub(1).and_then(|idx| registry.personas().get(idx)) {
                return persona.name.as_str();
            }
        }
        if !registry.contains(selector) {
            warn!("persona {:?} is not one of {:?}", selector, registry.names().collect::<Vec<_>>());
        }
        selector
    }

    /// Submit `question` to the persona `persona_name` and report the result on `surface`.
    pub async fn submit<S: Surface>(&self, surface: &mut S, persona_name: &str, question: &str) -> Outcome {
        if question.trim().is_empty() {
            warn!("blank question rejected");
            surface.warning(EMPTY_QUESTION_WARNING);
            return Outcome::Rejected;
        }
        surface.busy(BUSY_MESSAGE);
        let result = self.generator.generate(question, persona_name).await;
        surface.idle();
        match result {
            Ok(answer) => {
                surface.answer(ANSWER_HEADING, &answer);
                Outcome::Answered(answer)
            }
            Err(GenerateError::MissingCredential) => {
                surface.error(MISSING_CREDENTIAL_ERROR);
                Outcome::Unconfigured
            }
            Err(GenerateError::Service(e)) => {
                surface.error(&format!("{}: {:#}", SERVICE_ERROR_PREFIX, e));
                Outcome::Failed
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::Surface;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Notice {
        Warning(String),
        Error(String),
        Busy(String),
        Idle,
        Answer(String, String),
    }

    #[derive(Debug, Default)]
    pub(crate) struct RecordingSurface {
        pub(crate) notices: Vec<Notice>,
    }

    impl RecordingSurface {
        pub(crate) fn warnings(&self) -> Vec<&str> {
            self.notices.iter().filter_map(|n| match n {
                Notice::Warning(m) => Some(m.as_str()),
                _ => None,
            }).collect()
        }

        pub(crate) fn errors(&self) -> Vec<&str> {
            self.notices.iter().filter_map(|n| match n {
                Notice::Error(m) => Some(m.as_str()),
                _ => None,
            }).collect()
        }

        pub(crate) fn answers(&self) -> Vec<(&str, &str)> {
            self.notices.iter().filter_map(|n| match n {
                Notice::Answer(h, t) => Some((h.as_str(), t.as_str())),
                _ => None,
            }).collect()
        }
    }

    impl Surface for RecordingSurface {
        fn warning(&mut self, message: &str) {
            self.notices.push(Notice::Warning(message.to_string()));
        }

        fn error(&mut self, message: &str) {
            self.notices.push(Notice::Error(message.to_string()));
        }

        fn busy(&mut self, message: &str) {
            self.notices.push(Notice::Busy(message.to_string()));
        }

        fn idle(&mut self) {
            self.notices.push(Notice::Idle);
        }

        fn answer(&mut self, heading: &str, text: &str) {
            self.notices.push(Notice::Answer(heading.to_string(), text.to_string()));
        }
    }
}

#[cfg(test)]
mod test_form {
    use std::sync::Arc;
    use crate::config::ApiKey;
    use crate::generator::AnswerGenerator;
    use crate::persona::PromptRegistry;
    use crate::utils::llm::mock::MockChat;
    use super::recording::{Notice, RecordingSurface};
    use super::{ANSWER_HEADING, BUSY_MESSAGE, EMPTY_QUESTION_WARNING, MISSING_CREDENTIAL_ERROR, Outcome, QaForm};

    fn form(credential: Option<&str>, client: MockChat) -> QaForm<MockChat> {
        let generator = AnswerGenerator::new(
            Arc::new(PromptRegistry::builtin()),
            credential.and_then(|key| ApiKey::new(key)),
            client,
        );
        QaForm::new(generator)
    }

    #[tokio::test]
    async fn test_blank_question_warns() {
        let form = form(Some("sk-test"), MockChat::replying("answer"));
        let mut surface = RecordingSurface::default();
        let outcome = form.submit(&mut surface, "AI活用アドバイザー", "   ").await;
        assert_eq!(Outcome::Rejected, outcome);
        assert_eq!(vec![Notice::Warning(EMPTY_QUESTION_WARNING.to_string())], surface.notices);
        assert_eq!(0, form.generator().client().call_count());

        let outcome = form.submit(&mut surface, "AI活用アドバイザー", "").await;
        assert_eq!(Outcome::Rejected, outcome);
        assert_eq!(0, form.generator().client().call_count());
    }

    #[tokio::test]
    async fn test_missing_credential_reports_once() {
        let form = form(None, MockChat::replying("answer"));
        let mut surface = RecordingSurface::default();
        let outcome = form.submit(&mut surface, "晩御飯専門料理アドバイザー", "今夜の献立は？").await;
        assert_eq!(Outcome::Unconfigured, outcome);
        assert_eq!("", outcome.answer());
        assert_eq!(vec![MISSING_CREDENTIAL_ERROR], surface.errors());
        assert!(surface.answers().is_empty());
        assert_eq!(0, form.generator().client().call_count());
    }

    #[tokio::test]
    async fn test_answer_shown() {
        let form = form(Some("sk-test"), MockChat::replying("肉じゃがはいかがでしょう。"));
        let mut surface = RecordingSurface::default();
        let outcome = form.submit(&mut surface, "晩御飯専門料理アドバイザー", "今夜の献立は？").await;
        assert!(outcome.is_answered());
        assert_eq!("肉じゃがはいかがでしょう。", outcome.answer());
        assert_eq!(vec![
            Notice::Busy(BUSY_MESSAGE.to_string()),
            Notice::Idle,
            Notice::Answer(ANSWER_HEADING.to_string(), "肉じゃがはいかがでしょう。".to_string()),
        ], surface.notices);
        assert_eq!(1, form.generator().client().call_count());
    }

    #[tokio::test]
    async fn test_service_failure_reported() {
        let form = form(Some("sk-test"), MockChat::failing("connection refused"));
        let mut surface = RecordingSurface::default();
        let outcome = form.submit(&mut surface, "AI活用アドバイザー", "機械学習とは？").await;
        assert_eq!(Outcome::Failed, outcome);
        let errors = surface.errors();
        assert_eq!(1, errors.len());
        assert!(errors[0].contains("connection refused"));
        assert!(surface.answers().is_empty());
        assert!(surface.warnings().is_empty());
    }

    #[test]
    fn test_select_persona() {
        let form = form(None, MockChat::replying(""));
        assert_eq!("高校生専門教育アドバイザー", form.select_persona("1"));
        assert_eq!("AI活用アドバイザー", form.select_persona("3"));
        assert_eq!("AI活用アドバイザー", form.select_persona("AI活用アドバイザー"));
        assert_eq!("4", form.select_persona("4"));
        assert_eq!("0", form.select_persona("0"));
        assert_eq!("占い師", form.select_persona("占い師"));
    }
}
