use crate::core::completion::{CompletionClient, CompletionError};
use crate::core::message::History;
use crate::core::persona::Persona;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Completion client that replays canned replies and records every call.
pub struct StubClient {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    calls: Mutex<Vec<(String, History)>>,
}

impl StubClient {
    pub fn new(replies: Vec<Result<String, CompletionError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn calls(&self) -> Vec<(String, History)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for StubClient {
    async fn complete(&self, model: &str, history: &History) -> Result<String, CompletionError> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), history.clone()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(CompletionError::EmptyResponse))
    }
}

pub fn create_test_persona(name: &str, model: &str, system_prompt: &str) -> Persona {
    Persona {
        name: name.to_string(),
        model: model.to_string(),
        system_prompt: system_prompt.to_string(),
    }
}

pub fn archie() -> Persona {
    create_test_persona("archie", "gpt-4", "You are Archie.")
}

pub fn summer_slug() -> Persona {
    create_test_persona("summer-slug", "gpt-3.5-turbo", "Reply with a short slug.")
}
