use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{
    error::{AgentError, Result},
    inference::InferenceClient,
};

/// Inference client that answers from a fixed script and records prompts.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    reply: Option<String>,
    prompts: Mutex<Vec<(String, f32)>>,
}

impl ScriptedClient {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(text.to_string()),
            ..Default::default()
        })
    }

    /// Every call fails with an HTTP 500.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn prompts(&self) -> Vec<(String, f32)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceClient for ScriptedClient {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), temperature));
        self.reply
            .clone()
            .ok_or_else(|| AgentError::http(500, "scripted failure"))
    }
}
