#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use minpair_backend::engine::types::TrialResponse;
use minpair_backend::services::word_source::{GenerationError, WordRequest, WordSource};

/// Replies from a fixed queue, then fails once the queue runs dry.
#[derive(Clone, Default)]
pub struct ScriptedWordSource {
    replies: Arc<Mutex<VecDeque<Result<String, GenerationError>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedWordSource {
    pub fn new<I, W>(words: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<String>,
    {
        let source = Self::default();
        for word in words {
            source.push(Ok(word.into()));
        }
        source
    }

    pub fn push(&self, reply: Result<String, GenerationError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl WordSource for ScriptedWordSource {
    async fn propose(&self, request: &WordRequest<'_>) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(request.prompt.to_string());
        let reply = self.replies.lock().unwrap().pop_front();
        reply.unwrap_or(Err(GenerationError::Disabled))
    }
}

/// Never produces a word.
#[derive(Clone, Default)]
pub struct FailingWordSource;

impl WordSource for FailingWordSource {
    async fn propose(&self, _request: &WordRequest<'_>) -> Result<String, GenerationError> {
        Err(GenerationError::Malformed("scripted failure".to_string()))
    }
}

/// Answers only after `delay`, long past any sensible timeout.
#[derive(Clone)]
pub struct SlowWordSource {
    pub delay: Duration,
    pub word: String,
}

impl WordSource for SlowWordSource {
    async fn propose(&self, _request: &WordRequest<'_>) -> Result<String, GenerationError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.word.clone())
    }
}

pub fn response(word: &str, correct: bool, reaction_time: f64) -> TrialResponse {
    TrialResponse::new(word, word, correct, reaction_time)
}
