//! Collaborator seams.
//!
//! The engine orchestrates four external collaborators: the rendering engine
//! that turns an entry-point input into an element tree, the encoder that
//! turns a tree plus a module resolver into a byte stream, the decoder that
//! turns a serialized argument payload back into call arguments, and the
//! lookup table mapping a server-action id to its callable. Each is injected
//! into the [`Renderer`](crate::dispatcher::Renderer) at construction; none
//! are reached through ambient state.

use std::sync::Arc;

use arbor_common::{ByteStream, Elements, FormData, ModuleDescriptor, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::store::RenderStore;

/// Request search parameters, in submission order.
pub type SearchParams = Vec<(String, String)>;

/// Callback reporting each distinct resolved module during discovery.
pub type ModuleIdCallback = Arc<dyn Fn(&ModuleDescriptor) + Send + Sync>;

/// The resolver callback handed to the encoder in place of inline module
/// resolution.
pub type ModuleResolverFn = Arc<dyn Fn(&str) -> Result<ModuleDescriptor> + Send + Sync>;

/// The rendering engine: resolves an entry-point input to an element tree.
///
/// `render_entries` returning `Ok(None)` means no component exists for the
/// input; the dispatcher classifies that as a not-found failure on GET and
/// as a silent no-op inside a rerender.
#[async_trait]
pub trait RenderEngine: Send + Sync {
    async fn render_entries(
        &self,
        store: &RenderStore,
        input: &str,
        search_params: &SearchParams,
        build_config: Option<&Value>,
    ) -> Result<Option<Elements>>;

    /// Deployment-wide build configuration threaded into every render.
    fn build_config(&self) -> Option<Value> {
        None
    }
}

/// The encoder: serializes an element tree into the wire format, replacing
/// client-module references with descriptors obtained from `resolve_module`.
pub trait StreamEncoder: Send + Sync {
    fn encode(&self, elements: Elements, resolve_module: ModuleResolverFn) -> Result<ByteStream>;
}

/// The argument decoder: turns a serialized function-argument payload back
/// into call arguments. Fully buffered; this contract does not stream.
#[async_trait]
pub trait ReplyDecoder: Send + Sync {
    async fn decode_text(
        &self,
        payload: String,
        resolve_module: ModuleResolverFn,
    ) -> Result<Vec<Value>>;

    async fn decode_form_data(
        &self,
        form: FormData,
        resolve_module: ModuleResolverFn,
    ) -> Result<Vec<Value>>;
}

/// A server-side callable invocable by a client-submitted opaque id.
///
/// The action receives the current render store and may call
/// [`RenderStore::rerender`] zero or more times before or after returning.
#[async_trait]
pub trait ServerAction: Send + Sync {
    async fn call(&self, store: &RenderStore, args: Vec<Value>) -> Result<Value>;
}

/// The read-only lookup table for server actions.
pub trait ServerFnTable: Send + Sync {
    fn lookup(&self, action_id: &str) -> Option<Arc<dyn ServerAction>>;

    /// Human-readable description of the registered actions, carried on
    /// lookup failures for diagnostics.
    fn debug_description(&self) -> String;
}

/// A resolved client entry from a live bundler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedClientEntry {
    pub id: String,
    pub urls: Vec<String>,
}

/// Resolves a client module path against a live dev bundler.
pub trait ClientEntryResolver: Send + Sync {
    fn resolve_client_entry(&self, path: &str) -> Result<ResolvedClientEntry>;
}

/// Collects every client module a given entry point may transitively
/// reference. Implemented by the renderer itself; handed to
/// [`BuildConfigHook`] so build orchestration can enumerate modules per
/// entry.
#[async_trait]
pub trait ClientModuleCollector: Send + Sync {
    async fn collect(&self, input: &str) -> Result<Vec<String>>;
}

/// Optional build-config hook supplied by the entries module.
#[async_trait]
pub trait BuildConfigHook: Send + Sync {
    async fn get_build_config(
        &self,
        collector: &dyn ClientModuleCollector,
    ) -> Result<Vec<Value>>;
}

/// SSR configuration returned by the optional provider: a body tree to
/// re-encode plus passthrough fields for the HTML renderer.
#[derive(Debug, Clone, Default)]
pub struct SsrConfig {
    pub body: Elements,
    pub extra: serde_json::Map<String, Value>,
}

/// Optional provider for the SSR fallback path.
#[async_trait]
pub trait SsrConfigProvider: Send + Sync {
    async fn get_ssr_config(
        &self,
        pathname: &str,
        search_params: &SearchParams,
    ) -> Result<Option<SsrConfig>>;
}
