// ─────────────────────────────────────────────────────────────────────
// Normscore — Trace Store
// ─────────────────────────────────────────────────────────────────────
//! Where the orchestrator loads traces from.
//!
//! The in-memory backend is for tests and embedding; anything else
//! (database, object storage, a host-language callback) plugs in through
//! [`TraceStore`] or the closure-backed [`ExternalTraceStore`].

use std::collections::HashMap;

use parking_lot::RwLock;

use normscore_types::{NormscoreResult, SurgicalTrace};

/// Trait for trace persistence backends.
pub trait TraceStore: Send + Sync {
    /// Fetch the trace stored under `trace_id`, if any.
    fn fetch(&self, trace_id: &str) -> Option<SurgicalTrace>;

    /// Store `trace` under its `procedure_id`, replacing any previous one.
    fn persist(&self, trace: SurgicalTrace) -> NormscoreResult<()>;
}

/// Traces keyed by `procedure_id`, guarded by a `parking_lot::RwLock`.
#[derive(Default)]
pub struct InMemoryTraceStore {
    traces: RwLock<HashMap<String, SurgicalTrace>>,
}

impl InMemoryTraceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_traces(traces: impl IntoIterator<Item = SurgicalTrace>) -> Self {
        let traces = traces
            .into_iter()
            .map(|t| (t.procedure_id.clone(), t))
            .collect();
        Self {
            traces: RwLock::new(traces),
        }
    }

    pub fn len(&self) -> usize {
        self.traces.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.read().is_empty()
    }
}

impl TraceStore for InMemoryTraceStore {
    fn fetch(&self, trace_id: &str) -> Option<SurgicalTrace> {
        self.traces.read().get(trace_id).cloned()
    }

    fn persist(&self, trace: SurgicalTrace) -> NormscoreResult<()> {
        let mut traces = self.traces.write();
        if traces.insert(trace.procedure_id.clone(), trace).is_some() {
            log::debug!("InMemoryTraceStore: replaced existing trace");
        }
        Ok(())
    }
}

type FetchFn = Box<dyn Fn(&str) -> Option<SurgicalTrace> + Send + Sync>;
type PersistFn = Box<dyn Fn(SurgicalTrace) -> NormscoreResult<()> + Send + Sync>;

/// Store that delegates to caller-supplied closures.
pub struct ExternalTraceStore {
    fetch_fn: FetchFn,
    persist_fn: PersistFn,
}

impl ExternalTraceStore {
    pub fn new(
        fetch_fn: impl Fn(&str) -> Option<SurgicalTrace> + Send + Sync + 'static,
        persist_fn: impl Fn(SurgicalTrace) -> NormscoreResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            fetch_fn: Box::new(fetch_fn),
            persist_fn: Box::new(persist_fn),
        }
    }
}

impl TraceStore for ExternalTraceStore {
    fn fetch(&self, trace_id: &str) -> Option<SurgicalTrace> {
        (self.fetch_fn)(trace_id)
    }

    fn persist(&self, trace: SurgicalTrace) -> NormscoreResult<()> {
        (self.persist_fn)(trace)
    }
}
