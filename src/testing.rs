//! Test support: a scripted gateway that replays canned replies and records
//! every call, so pipeline call-count bounds can be asserted exactly.

use crate::llm::{Gateway, GatewayError, PromptKind};
use crate::pipeline::CancelToken;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct CallCount(Arc<AtomicUsize>);

impl CallCount {
    pub(crate) fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
pub(crate) struct KindLog(Arc<Mutex<Vec<PromptKind>>>);

impl KindLog {
    pub(crate) fn get(&self) -> Vec<PromptKind> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Clone)]
pub(crate) struct PromptLog(Arc<Mutex<Vec<String>>>);

impl PromptLog {
    pub(crate) fn get(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Gateway that pops pre-scripted replies in order. Runs out of script ⇒
/// `EmptyResponse`, which conveniently also fails tests that over-call.
pub(crate) struct ScriptedGateway {
    replies: Mutex<VecDeque<Result<String, GatewayError>>>,
    calls: Arc<AtomicUsize>,
    kinds: Arc<Mutex<Vec<PromptKind>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    cancel_on_call: Option<CancelToken>,
}

impl ScriptedGateway {
    pub(crate) fn replying(replies: Vec<Result<String, GatewayError>>) -> Self {
        ScriptedGateway {
            replies: Mutex::new(replies.into()),
            calls: Arc::new(AtomicUsize::new(0)),
            kinds: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            cancel_on_call: None,
        }
    }

    /// Cancel the given token from inside `invoke`, simulating the caller
    /// tearing down while the request is in flight.
    pub(crate) fn cancelling(mut self, token: CancelToken) -> Self {
        self.cancel_on_call = Some(token);
        self
    }

    pub(crate) fn call_count_handle(&self) -> CallCount {
        CallCount(Arc::clone(&self.calls))
    }

    pub(crate) fn kinds_handle(&self) -> KindLog {
        KindLog(Arc::clone(&self.kinds))
    }

    #[allow(dead_code)]
    pub(crate) fn prompts_handle(&self) -> PromptLog {
        PromptLog(Arc::clone(&self.prompts))
    }
}

impl Gateway for ScriptedGateway {
    async fn invoke(&self, kind: PromptKind, prompt: &str) -> Result<String, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.kinds.lock().unwrap().push(kind);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(token) = &self.cancel_on_call {
            token.cancel();
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GatewayError::EmptyResponse))
    }
}
