//! Shared fakes for the engine integration tests: a deterministic rendering
//! engine, a JSON encoder that resolves `module://` references through the
//! injected callback, a JSON reply decoder and an in-memory action table.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use arbor_common::{
    byte_stream_from, ArborError, ByteStream, Elements, FormData, FormValue, Result,
};
use arbor_engine::{
    ClientEntryResolver, ModuleResolverFn, RenderEngine, RenderStore, ReplyDecoder,
    RerenderHandle, ResolvedClientEntry, SearchParams, ServerAction, ServerFnTable,
    StreamEncoder,
};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use futures::StreamExt;
use serde_json::{json, Value};

/// Marker prefix for client-module references inside test element trees.
pub const MODULE_PREFIX: &str = "module://";

/// Rendering engine backed by a fixed input-to-tree table.
pub struct StaticEngine {
    trees: HashMap<String, Elements>,
    calls: AtomicUsize,
}

impl StaticEngine {
    pub fn new() -> Self {
        Self {
            trees: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_tree(mut self, input: &str, tree: Elements) -> Self {
        self.trees.insert(input.to_string(), tree);
        self
    }

    pub fn render_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RenderEngine for StaticEngine {
    async fn render_entries(
        &self,
        _store: &RenderStore,
        input: &str,
        _search_params: &SearchParams,
        _build_config: Option<&Value>,
    ) -> Result<Option<Elements>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.trees.get(input).cloned())
    }
}

/// Encoder serializing the tree as JSON, replacing `module://` string values
/// with the descriptor obtained from the resolver callback.
pub struct JsonEncoder {
    encode_calls: AtomicUsize,
}

impl JsonEncoder {
    pub fn new() -> Self {
        Self {
            encode_calls: AtomicUsize::new(0),
        }
    }

    pub fn encode_calls(&self) -> usize {
        self.encode_calls.load(Ordering::SeqCst)
    }
}

impl StreamEncoder for JsonEncoder {
    fn encode(&self, elements: Elements, resolve_module: ModuleResolverFn) -> Result<ByteStream> {
        self.encode_calls.fetch_add(1, Ordering::SeqCst);
        let tree = serde_json::to_value(&elements)?;
        let resolved = resolve_refs(&tree, &resolve_module)?;
        let text = serde_json::to_string(&resolved)?;

        // Two chunks, so consumers actually stream.
        let mid = text.len() / 2;
        let (head, tail) = text.split_at(mid);
        Ok(byte_stream_from(vec![
            Bytes::copy_from_slice(head.as_bytes()),
            Bytes::copy_from_slice(tail.as_bytes()),
        ]))
    }
}

fn resolve_refs(value: &Value, resolve_module: &ModuleResolverFn) -> Result<Value> {
    match value {
        Value::String(text) => match text.strip_prefix(MODULE_PREFIX) {
            Some(encoded_id) => {
                let descriptor = resolve_module(encoded_id)?;
                Ok(serde_json::to_value(descriptor)?)
            }
            None => Ok(value.clone()),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| resolve_refs(item, resolve_module))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(entries) => entries
            .iter()
            .map(|(key, item)| Ok((key.clone(), resolve_refs(item, resolve_module)?)))
            .collect::<Result<serde_json::Map<_, _>>>()
            .map(Value::Object),
        other => Ok(other.clone()),
    }
}

/// Encoder whose stream aborts mid-way, for abort-propagation tests.
pub struct AbortingEncoder;

impl StreamEncoder for AbortingEncoder {
    fn encode(&self, _elements: Elements, _resolve_module: ModuleResolverFn) -> Result<ByteStream> {
        Ok(stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(ArborError::Network {
                message: "stream aborted".into(),
                url: "/render".into(),
            }),
        ])
        .boxed())
    }
}

/// Reply decoder: text payloads parse as a JSON array; form fields map to
/// plain strings (text) or `{filename, contentType, content}` objects
/// (files).
pub struct JsonReplyDecoder;

#[async_trait]
impl ReplyDecoder for JsonReplyDecoder {
    async fn decode_text(
        &self,
        payload: String,
        _resolve_module: ModuleResolverFn,
    ) -> Result<Vec<Value>> {
        let value: Value = serde_json::from_str(&payload)?;
        match value {
            Value::Array(args) => Ok(args),
            other => Ok(vec![other]),
        }
    }

    async fn decode_form_data(
        &self,
        form: FormData,
        _resolve_module: ModuleResolverFn,
    ) -> Result<Vec<Value>> {
        Ok(form
            .iter()
            .map(|(_, value)| match value {
                FormValue::Text(text) => Value::String(text.clone()),
                FormValue::File {
                    filename,
                    content_type,
                    content,
                } => json!({
                    "filename": filename,
                    "contentType": content_type,
                    "content": String::from_utf8_lossy(content),
                }),
            })
            .collect())
    }
}

/// In-memory server-action table.
#[derive(Default)]
pub struct FnTable {
    actions: HashMap<String, Arc<dyn ServerAction>>,
}

impl FnTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, id: &str, action: Arc<dyn ServerAction>) -> Self {
        self.actions.insert(id.to_string(), action);
        self
    }
}

impl ServerFnTable for FnTable {
    fn lookup(&self, action_id: &str) -> Option<Arc<dyn ServerAction>> {
        self.actions.get(action_id).cloned()
    }

    fn debug_description(&self) -> String {
        let mut ids: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        ids.sort_unstable();
        format!("Registered actions: [{}]", ids.join(", "))
    }
}

/// Returns its arguments as a JSON array.
pub struct EchoAction;

#[async_trait]
impl ServerAction for EchoAction {
    async fn call(&self, _store: &RenderStore, args: Vec<Value>) -> Result<Value> {
        Ok(Value::Array(args))
    }
}

/// Rerenders each target in order, then returns a marker value.
pub struct RerenderAction {
    pub targets: Vec<String>,
}

#[async_trait]
impl ServerAction for RerenderAction {
    async fn call(&self, store: &RenderStore, _args: Vec<Value>) -> Result<Value> {
        for target in &self.targets {
            store.rerender(target.clone(), Vec::new())?;
        }
        Ok(json!("rerendered"))
    }
}

/// Stashes the store's rerender handle so a test can call it after the
/// action scope has settled.
pub struct StashHandleAction {
    pub slot: Arc<Mutex<Option<RerenderHandle>>>,
}

#[async_trait]
impl ServerAction for StashHandleAction {
    async fn call(&self, store: &RenderStore, _args: Vec<Value>) -> Result<Value> {
        *self.slot.lock().unwrap() = Some(store.rerender_handle());
        Ok(json!(null))
    }
}

/// Client-entry resolver mapping every path deterministically.
pub struct StaticEntries;

impl ClientEntryResolver for StaticEntries {
    fn resolve_client_entry(&self, path: &str) -> Result<ResolvedClientEntry> {
        Ok(ResolvedClientEntry {
            id: format!("entry:{path}"),
            urls: vec![format!("/modules/{path}")],
        })
    }
}
