//! Scripted executor shared by unit tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Semaphore;

use super::{CallError, CallOutcome, RemoteExecutor, RemoteRequest, TransportError};

type Responder = Box<dyn Fn(&RemoteRequest) -> CallOutcome<Value> + Send + Sync>;

/// Plays queued outcomes first, then answers with the responder.
pub(crate) struct ScriptedExecutor {
    script: Mutex<VecDeque<CallOutcome<Value>>>,
    responder: Responder,
    calls: AtomicU32,
    paths: Mutex<Vec<String>>,
    gate: Option<Semaphore>,
}

impl ScriptedExecutor {
    pub(crate) fn new() -> Self {
        Self::with(|_| Err(TransportError::Request("script exhausted".into()).into()))
    }

    pub(crate) fn with(
        responder: impl Fn(&RemoteRequest) -> CallOutcome<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            responder: Box::new(responder),
            calls: AtomicU32::new(0),
            paths: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub(crate) fn failing(err: TransportError) -> Self {
        Self::with(move |_| Err(CallError::Transport(err.clone())))
    }

    pub(crate) fn succeeding(payload: Value) -> Self {
        Self::with(move |_| Ok(payload.clone()))
    }

    /// Every call blocks until [`open_gate`](Self::open_gate) lets it through.
    pub(crate) fn gated(payload: Value) -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::succeeding(payload)
        }
    }

    pub(crate) fn push_ok(&self, payload: Value) {
        self.script.lock().unwrap().push_back(Ok(payload));
    }

    pub(crate) fn push_err(&self, err: TransportError) {
        self.script.lock().unwrap().push_back(Err(err.into()));
    }

    pub(crate) fn open_gate(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteExecutor for ScriptedExecutor {
    async fn execute(&self, request: &RemoteRequest) -> CallOutcome<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.paths.lock().unwrap().push(request.path.clone());

        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| (self.responder)(request))
    }
}
