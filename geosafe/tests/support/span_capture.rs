//! Capture layer for verifying tracing instrumentation.
//!
//! Records span creations and events into a thread-safe [`SpanStore`] so
//! tests can assert on operation spans (`geo_parse`, `geo_union`, ...) and on
//! warnings without a real subscriber backend.
//!
//! Uses `tracing::subscriber::set_default()`, so only work done on the
//! installing thread is captured.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;

/// A captured span creation.
#[derive(Debug, Clone)]
pub struct CapturedSpan {
    pub name: &'static str,
    pub level: tracing::Level,
    pub fields: HashMap<String, String>,
}

/// A captured event, with the name of the span it was emitted in.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: tracing::Level,
    pub fields: HashMap<String, String>,
    pub span_name: Option<&'static str>,
}

impl CapturedEvent {
    pub fn message(&self) -> &str {
        self.fields.get("message").map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Default)]
struct Captured {
    spans: Vec<CapturedSpan>,
    events: Vec<CapturedEvent>,
}

/// Thread-safe store of captured spans and events.
#[derive(Debug, Clone, Default)]
pub struct SpanStore(Arc<Mutex<Captured>>);

impl SpanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if any span with the given name was captured.
    pub fn has_span(&self, name: &str) -> bool {
        self.0.lock().unwrap().spans.iter().any(|s| s.name == name)
    }

    /// Find the first span with the given name.
    pub fn find_span(&self, name: &str) -> Option<CapturedSpan> {
        self.0
            .lock()
            .unwrap()
            .spans
            .iter()
            .find(|s| s.name == name)
            .cloned()
    }

    /// All captured span names in order of creation.
    pub fn span_names(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().spans.iter().map(|s| s.name).collect()
    }

    /// Events at exactly `level`.
    pub fn events_at(&self, level: tracing::Level) -> Vec<CapturedEvent> {
        self.0
            .lock()
            .unwrap()
            .events
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }
}

/// Records span creations and events into a [`SpanStore`].
pub struct CaptureLayer {
    store: SpanStore,
}

impl CaptureLayer {
    pub fn new(store: SpanStore) -> Self {
        Self { store }
    }
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: Context<'_, S>,
    ) {
        let mut fields = FieldVisitor(HashMap::new());
        attrs.record(&mut fields);
        let meta = attrs.metadata();
        self.store.0.lock().unwrap().spans.push(CapturedSpan {
            name: meta.name(),
            level: *meta.level(),
            fields: fields.0,
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: Context<'_, S>) {
        let mut fields = FieldVisitor(HashMap::new());
        event.record(&mut fields);
        let span_name = ctx.event_span(event).map(|span| span.name());
        self.store.0.lock().unwrap().events.push(CapturedEvent {
            level: *event.metadata().level(),
            fields: fields.0,
            span_name,
        });
    }
}

struct FieldVisitor(HashMap<String, String>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0
            .insert(field.name().to_string(), format!("{:?}", value));
    }
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

/// Capture everything on the current thread while the guard is alive.
pub fn init_test_tracing() -> (SpanStore, tracing::subscriber::DefaultGuard) {
    let store = SpanStore::new();
    let layer = CaptureLayer::new(store.clone());
    let subscriber = tracing_subscriber::registry::Registry::default().with(layer);
    let guard = tracing::subscriber::set_default(subscriber);
    (store, guard)
}
