//! Scripted stand-ins for the completion model and the mail relay.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::llm_client::{CompletionModel, CompletionParams, LlmError};
use crate::screening::notifier::{Mailer, OutgoingMessage};
use crate::screening::session::SenderCredentials;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub api_key: String,
    pub system: String,
    pub prompt: String,
    pub params: CompletionParams,
}

/// Returns queued replies in order; `Err` entries become API errors.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<&str, &str>>) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionModel for ScriptedModel {
    async fn complete(
        &self,
        api_key: &str,
        system: &str,
        prompt: &str,
        params: CompletionParams,
    ) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            api_key: api_key.to_string(),
            system: system.to_string(),
            prompt: prompt.to_string(),
            params,
        });

        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(LlmError::Api {
                status: 500,
                message,
            }),
            None => Err(LlmError::EmptyContent),
        }
    }
}

/// Records every message; optionally fails every send with a fixed reason.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMessage>>,
    failure: Option<String>,
}

impl RecordingMailer {
    pub fn failing(reason: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failure: Some(reason.to_string()),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(
        &self,
        _sender: &SenderCredentials,
        message: &OutgoingMessage,
    ) -> Result<(), AppError> {
        if let Some(reason) = &self.failure {
            return Err(AppError::Mail(reason.clone()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
