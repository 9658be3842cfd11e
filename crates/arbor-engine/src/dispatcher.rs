//! Render dispatcher.
//!
//! Orchestrates one inbound render request end to end: a GET is a pure
//! render of the input reference; a POST invokes a server action by opaque
//! id, folds in any rerenders the action triggered, injects the action's
//! return value and re-streams the result. Both paths finish by encoding the
//! element tree through a per-request module resolver.
//!
//! # Architecture
//!
//! The dispatcher owns its collaborators explicitly: rendering engine,
//! encoder, reply decoder and server-action table are injected at
//! construction, never reached through process-wide registries. Each render
//! call builds a fresh [`ModuleResolver`] and [`RenderStore`], so nothing is
//! shared between concurrently-processing requests.

use std::sync::Arc;

use arbor_common::{ArborError, ByteStream, Elements, Result, ACTION_VALUE_KEY};
use percent_encoding::percent_decode_str;

use crate::reply::decode_action_args;
use crate::resolver::ModuleResolver;
use crate::store::{RenderContext, RenderStore, RerenderQueue};
use crate::traits::{
    ClientEntryResolver, ModuleIdCallback, RenderEngine, ReplyDecoder, SearchParams,
    ServerFnTable, StreamEncoder,
};

/// Entry protocol for one render request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMethod {
    /// Pure render of the input reference.
    Get,
    /// Server-action invocation; the input carries the action id.
    Post,
}

/// One inbound render request.
pub struct RenderRequest {
    pub method: RenderMethod,
    /// Entry-point reference (GET) or percent-encoded action id (POST).
    pub input: String,
    pub search_params: SearchParams,
    pub context: Option<RenderContext>,
    pub body: Option<ByteStream>,
    pub content_type: Option<String>,
    /// Discovery callback; set by the build-time module collector.
    pub module_id_callback: Option<ModuleIdCallback>,
}

impl RenderRequest {
    /// A plain GET render with no context, body or discovery callback.
    pub fn get(input: impl Into<String>, search_params: SearchParams) -> Self {
        Self {
            method: RenderMethod::Get,
            input: input.into(),
            search_params,
            context: None,
            body: None,
            content_type: None,
            module_id_callback: None,
        }
    }
}

/// Per-request rendering mode.
///
/// Outside export mode a client-entry resolver is required; module
/// resolution fails without one.
#[derive(Clone, Default)]
pub struct RenderOptions {
    pub exporting: bool,
    pub client_entries: Option<Arc<dyn ClientEntryResolver>>,
}

/// The render dispatcher.
pub struct Renderer {
    engine: Arc<dyn RenderEngine>,
    encoder: Arc<dyn StreamEncoder>,
    reply_decoder: Arc<dyn ReplyDecoder>,
    server_fns: Arc<dyn ServerFnTable>,
}

impl Renderer {
    pub fn new(
        engine: Arc<dyn RenderEngine>,
        encoder: Arc<dyn StreamEncoder>,
        reply_decoder: Arc<dyn ReplyDecoder>,
        server_fns: Arc<dyn ServerFnTable>,
    ) -> Self {
        Self {
            engine,
            encoder,
            reply_decoder,
            server_fns,
        }
    }

    /// Dispatches one render request, yielding the encoded byte stream.
    ///
    /// Errors propagate unmodified; the HTTP boundary maps them to status
    /// codes via [`ArborError::status_code`].
    pub async fn render(&self, request: RenderRequest, options: &RenderOptions) -> Result<ByteStream> {
        let resolver = ModuleResolver::new(options, request.module_id_callback.clone());
        match request.method {
            RenderMethod::Get => self.render_get(request, resolver).await,
            RenderMethod::Post => self.render_post(request, resolver).await,
        }
    }

    async fn render_get(
        &self,
        request: RenderRequest,
        resolver: Arc<ModuleResolver>,
    ) -> Result<ByteStream> {
        let build_config = self.engine.build_config();
        let store = RenderStore::read_only(request.context.unwrap_or_default());

        let rendered = self
            .engine
            .render_entries(
                &store,
                &request.input,
                &request.search_params,
                build_config.as_ref(),
            )
            .await?;
        let Some(elements) = rendered else {
            return Err(ArborError::EntryNotFound {
                input: request.input,
            });
        };

        self.encode_checked(elements, &resolver)
    }

    async fn render_post(
        &self,
        request: RenderRequest,
        resolver: Arc<ModuleResolver>,
    ) -> Result<ByteStream> {
        let action_id = percent_decode_str(&request.input)
            .decode_utf8()
            .map_err(|e| {
                ArborError::InvalidRequest(format!(
                    "Malformed action id \"{}\": {e}",
                    request.input
                ))
            })?
            .into_owned();

        let args = decode_action_args(
            &self.reply_decoder,
            request.body,
            request.content_type.as_deref(),
            resolver.as_callback(),
        )
        .await?;

        tracing::debug!(action = %action_id, args = args.len(), "invoking server action");
        let action = self
            .server_fns
            .lookup(&action_id)
            .ok_or_else(|| ArborError::ActionNotFound {
                id: action_id.clone(),
                detail: self.server_fns.debug_description(),
            })?;

        let queue = RerenderQueue::new(
            Arc::clone(&self.engine),
            self.engine.build_config(),
            request.context.unwrap_or_default(),
        );
        let store = RenderStore::for_action(Arc::clone(&queue));

        let action_value = action.call(&store, args).await?;
        let mut elements = queue.drain().await?;
        if elements.has_reserved_key() {
            return Err(ArborError::ReservedKey);
        }
        elements.insert(ACTION_VALUE_KEY, action_value);
        self.encoder.encode(elements, resolver.as_callback())
    }

    /// Rejects reserved keys, then hands the tree to the encoder with this
    /// request's resolver.
    fn encode_checked(&self, elements: Elements, resolver: &Arc<ModuleResolver>) -> Result<ByteStream> {
        if elements.has_reserved_key() {
            return Err(ArborError::ReservedKey);
        }
        self.encoder.encode(elements, resolver.as_callback())
    }

    pub(crate) fn encoder(&self) -> &Arc<dyn StreamEncoder> {
        &self.encoder
    }
}
