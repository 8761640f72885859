//! In-memory provider for router tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::providers::{Prompt, ProviderError, TextProvider};

enum Behavior {
    Reply(String),
    Fail(ProviderError),
    Hang,
}

pub struct MockProvider {
    name: String,
    credential: bool,
    timeout: Duration,
    behavior: Behavior,
    calls: AtomicU32,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    fn with(name: &str, behavior: Behavior) -> Self {
        Self {
            name: name.to_string(),
            credential: true,
            timeout: Duration::from_secs(5),
            behavior,
            calls: AtomicU32::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn ok(name: &str, reply: &str) -> Self {
        Self::with(name, Behavior::Reply(reply.to_string()))
    }

    pub fn failing(name: &str, error: ProviderError) -> Self {
        Self::with(name, Behavior::Fail(error))
    }

    /// Never answers; only a timeout ends the call.
    pub fn hanging(name: &str, timeout: Duration) -> Self {
        let mut p = Self::with(name, Behavior::Hang);
        p.timeout = timeout;
        p
    }

    pub fn without_credential(mut self) -> Self {
        self.credential = false;
        self
    }

    pub fn arc(self) -> Arc<dyn TextProvider> {
        Arc::new(self)
    }

    pub fn shared(self) -> Arc<MockProvider> {
        Arc::new(self)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_credential(&self) -> bool {
        self.credential
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn attempt(
        &self,
        prompt: &Prompt<'_>,
        _timeout: Duration,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.text.to_string());
        match &self.behavior {
            Behavior::Reply(text) => Ok(text.clone()),
            Behavior::Fail(err) => Err(err.clone()),
            Behavior::Hang => std::future::pending().await,
        }
    }

    async fn probe(&self, _timeout: Duration) -> Result<String, ProviderError> {
        match &self.behavior {
            Behavior::Fail(err) => Err(err.clone()),
            _ => Ok("ok".to_string()),
        }
    }
}
