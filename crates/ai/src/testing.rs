//! Canned generators for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::{AiError, ChatMessage, TextGenerator};

/// Always fails as if the provider were down.
pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn complete(&self, _: &[ChatMessage], _: bool) -> Result<String, AiError> {
        Err(AiError::Api {
            status: 502,
            body: "upstream unavailable".to_string(),
        })
    }
}

/// Returns scripted answers in order, then fails once they run out.
pub struct ScriptedGenerator {
    answers: Mutex<VecDeque<Result<String, AiError>>>,
    pub prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedGenerator {
    pub fn new(answers: Vec<Result<String, AiError>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn ok(answers: &[&str]) -> Self {
        Self::new(answers.iter().map(|a| Ok(a.to_string())).collect())
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, messages: &[ChatMessage], _: bool) -> Result<String, AiError> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(AiError::EmptyResponse))
    }
}
