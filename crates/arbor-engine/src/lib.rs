//! Arbor Render Engine
//!
//! This crate implements the arbor render protocol. It turns render trees
//! into encoded byte streams and dispatches server actions, resolving
//! module references through per-request state so that concurrent requests
//! cannot leak into each other.
//!
//! # Architecture
//!
//! An inbound request enters the [`Renderer`] with a method, an input
//! reference, search parameters and an optional body. The dispatcher
//! establishes a [`RenderStore`] scoped to the call, drives the external
//! rendering engine to an element tree (GET) or invokes a resolved server
//! action plus any rerenders it triggers (POST), and finally hands the tree
//! to the external encoder together with a per-request [`ModuleResolver`],
//! producing a byte stream.
//!
//! The build-time collector wraps the same GET path, substituting a
//! discovery callback into the resolver and draining the stream to
//! exhaustion to enumerate every client module an entry point references.
//!
//! # Components
//!
//! - [`dispatcher`] - GET/POST request orchestration
//! - [`resolver`] - Encoded module id to descriptor resolution
//! - [`store`] - Per-request context and rerender scope
//! - [`reply`] - Action payload decoding (text and multipart)
//! - [`collect`] - Build-time client module discovery
//! - [`ssr`] - SSR fallback body re-encoding
//! - [`traits`] - Collaborator seams injected into the dispatcher

pub mod collect;
pub mod dispatcher;
pub mod reply;
pub mod resolver;
pub mod ssr;
pub mod store;
pub mod traits;

pub use dispatcher::{RenderMethod, RenderOptions, RenderRequest, Renderer};
pub use reply::decode_action_args;
pub use resolver::ModuleResolver;
pub use ssr::SsrPayload;
pub use store::{RenderContext, RenderStore, RerenderHandle};
pub use traits::{
    BuildConfigHook, ClientEntryResolver, ClientModuleCollector, ModuleIdCallback,
    ModuleResolverFn, RenderEngine, ReplyDecoder, ResolvedClientEntry, SearchParams,
    ServerAction, ServerFnTable, SsrConfig, SsrConfigProvider, StreamEncoder,
};
