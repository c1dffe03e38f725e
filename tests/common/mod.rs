#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chat_proxy::services::completion::{
    CompletionProvider, CompletionRequest, ContentBlock, ProviderError, ProviderResponse, TokenUsage,
};
use chat_proxy::services::exchange_log::{CompletedExchange, ExchangeLog, FailedExchange};

pub enum StubReply {
    Blocks(Vec<ContentBlock>),
    Status(u16, &'static str),
    Malformed,
    Panic,
}

/// Provider double that counts calls and remembers what it was sent.
pub struct StubProvider {
    reply: StubReply,
    calls: AtomicUsize,
    seen: Mutex<Vec<CompletionRequest>>,
}

impl StubProvider {
    pub fn new(reply: StubReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn text(text: &str) -> Arc<Self> {
        Self::new(StubReply::Blocks(vec![ContentBlock::Text { text: text.to_string() }]))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.seen.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionProvider for StubProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request);

        match &self.reply {
            StubReply::Blocks(blocks) => Ok(ProviderResponse {
                content: blocks.clone(),
                usage: Some(TokenUsage { input_tokens: 5, output_tokens: 1 }),
            }),
            StubReply::Status(status, message) => Err(ProviderError::Status {
                status: *status,
                message: message.to_string(),
            }),
            StubReply::Malformed => Err(ProviderError::Malformed("missing field `content`".to_string())),
            StubReply::Panic => panic!("provider exploded"),
        }
    }
}

/// In-memory exchange log.
#[derive(Default)]
pub struct RecordingLog {
    pub completed: Mutex<Vec<CompletedExchange>>,
    pub failed: Mutex<Vec<FailedExchange>>,
}

impl ExchangeLog for RecordingLog {
    fn completed(&self, record: &CompletedExchange) {
        self.completed.lock().unwrap().push(record.clone());
    }

    fn failed(&self, record: &FailedExchange) {
        self.failed.lock().unwrap().push(record.clone());
    }
}
