use async_trait::async_trait;
use cname_finalizer_application::ports::{
    DownstreamHandler, FinalizeEvent, FinalizeMetricsPort, ResponseWriter, UpstreamLookup,
};
use cname_finalizer_application::RequestContext;
use cname_finalizer_domain::DomainError;
use hickory_proto::op::Message;
use hickory_proto::rr::{Name, Record, RecordType};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
enum MockAnswer {
    Records(Vec<Record>),
    Error(DomainError),
    Hang,
}

/// Upstream keyed by lower-cased name. Unknown names answer with no records.
#[derive(Default)]
pub struct MockUpstreamLookup {
    answers: Mutex<HashMap<String, MockAnswer>>,
    calls: Mutex<Vec<(Name, RecordType)>>,
}

impl MockUpstreamLookup {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(name: &str) -> String {
        name.to_ascii_lowercase()
    }

    pub fn set_records(&self, name: &str, records: Vec<Record>) {
        self.answers
            .lock()
            .unwrap()
            .insert(Self::key(name), MockAnswer::Records(records));
    }

    pub fn set_error(&self, name: &str, error: DomainError) {
        self.answers
            .lock()
            .unwrap()
            .insert(Self::key(name), MockAnswer::Error(error));
    }

    /// The lookup for `name` never completes on its own.
    pub fn set_hang(&self, name: &str) {
        self.answers
            .lock()
            .unwrap()
            .insert(Self::key(name), MockAnswer::Hang);
    }

    pub fn calls(&self) -> Vec<(Name, RecordType)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl UpstreamLookup for MockUpstreamLookup {
    async fn lookup(
        &self,
        _ctx: &RequestContext,
        name: &Name,
        query_type: RecordType,
    ) -> Result<Vec<Record>, DomainError> {
        self.calls.lock().unwrap().push((name.clone(), query_type));

        let answer = self
            .answers
            .lock()
            .unwrap()
            .get(&Self::key(&name.to_string()))
            .cloned();

        match answer {
            Some(MockAnswer::Records(records)) => Ok(records),
            Some(MockAnswer::Error(error)) => Err(error),
            Some(MockAnswer::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(vec![])
            }
            None => Ok(vec![]),
        }
    }
}

/// Stands in for the rest of the pipeline: returns a canned reply.
pub struct MockDownstreamHandler {
    reply: Mutex<Option<Message>>,
    error: Mutex<Option<DomainError>>,
}

impl MockDownstreamHandler {
    pub fn replying(message: Message) -> Self {
        Self {
            reply: Mutex::new(Some(message)),
            error: Mutex::new(None),
        }
    }

    pub fn silent() -> Self {
        Self {
            reply: Mutex::new(None),
            error: Mutex::new(None),
        }
    }

    pub fn failing(error: DomainError) -> Self {
        Self {
            reply: Mutex::new(None),
            error: Mutex::new(Some(error)),
        }
    }
}

#[async_trait]
impl DownstreamHandler for MockDownstreamHandler {
    async fn handle(
        &self,
        _ctx: &RequestContext,
        _request: &Message,
    ) -> Result<Option<Message>, DomainError> {
        if let Some(error) = self.error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.reply.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct RecordingWriter {
    written: Mutex<Vec<Message>>,
    fail: AtomicBool,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let writer = Self::default();
        writer.fail.store(true, Ordering::Relaxed);
        writer
    }

    pub fn written(&self) -> Vec<Message> {
        self.written.lock().unwrap().clone()
    }

    pub fn last_answers(&self) -> Vec<Record> {
        self.written
            .lock()
            .unwrap()
            .last()
            .map(|m| m.answers().to_vec())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ResponseWriter for RecordingWriter {
    async fn write_message(&self, message: &Message) -> Result<(), DomainError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(DomainError::WriteFailed("client went away".to_string()));
        }
        self.written.lock().unwrap().push(message.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MockFinalizeMetrics {
    events: Mutex<Vec<(String, FinalizeEvent)>>,
    durations: AtomicUsize,
}

impl MockFinalizeMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self, event: FinalizeEvent) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, e)| *e == event)
            .count()
    }

    pub fn total_events(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn servers(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(s, _)| s.clone())
            .collect()
    }

    pub fn duration_observations(&self) -> usize {
        self.durations.load(Ordering::Relaxed)
    }
}

impl FinalizeMetricsPort for MockFinalizeMetrics {
    fn record(&self, server: &str, event: FinalizeEvent) {
        self.events
            .lock()
            .unwrap()
            .push((server.to_string(), event));
    }

    fn observe_duration(&self, _server: &str, _elapsed: Duration) {
        self.durations.fetch_add(1, Ordering::Relaxed);
    }
}
