//! Render store.
//!
//! One store exists per request-processing scope. It carries the request's
//! ambient context and the rerender callback, and is handed explicitly to
//! the rendering engine and to server actions rather than living in any
//! task-local or global slot, so concurrently-processing requests cannot
//! observe each other's state.
//!
//! # Rerender ordering
//!
//! Inside a POST action scope, each `rerender` call queues a fresh render of
//! its input. The queue is drained sequentially after the action settles, so
//! merges apply in call order, not completion order, with later entries
//! overwriting earlier keys. Once the scope is finalized further rerender
//! calls fail with [`ArborError::AlreadyRendered`].

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use arbor_common::{ArborError, Elements, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;

use crate::traits::{RenderEngine, SearchParams};

/// Ambient context for one request.
pub type RenderContext = HashMap<String, Value>;

/// Per-request scope handed to the rendering engine and to server actions.
pub struct RenderStore {
    context: RenderContext,
    rerender: RerenderHandle,
}

impl RenderStore {
    /// A store for GET renders: context only, rerender always fails.
    pub(crate) fn read_only(context: RenderContext) -> Self {
        Self {
            context,
            rerender: RerenderHandle(Rerender::Unsupported),
        }
    }

    /// A store for a POST action scope backed by a rerender queue.
    pub(crate) fn for_action(queue: Arc<RerenderQueue>) -> Self {
        Self {
            context: queue.context.clone(),
            rerender: RerenderHandle(Rerender::Queue(queue)),
        }
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Requests that a fresh render of `input` be folded into the response.
    ///
    /// Only valid inside a POST action scope, and only until the scope is
    /// finalized.
    pub fn rerender(&self, input: impl Into<String>, search_params: SearchParams) -> Result<()> {
        self.rerender.rerender(input, search_params)
    }

    /// A detachable handle to this store's rerender callback.
    ///
    /// Lets an action hand the callback to work it spawns; calls made after
    /// the scope finalizes still fail with [`ArborError::AlreadyRendered`].
    pub fn rerender_handle(&self) -> RerenderHandle {
        self.rerender.clone()
    }
}

/// Cloneable rerender callback, detached from the store's lifetime.
#[derive(Clone)]
pub struct RerenderHandle(Rerender);

#[derive(Clone)]
enum Rerender {
    Unsupported,
    Queue(Arc<RerenderQueue>),
}

impl RerenderHandle {
    pub fn rerender(&self, input: impl Into<String>, search_params: SearchParams) -> Result<()> {
        match &self.0 {
            Rerender::Unsupported => Err(ArborError::RerenderNotSupported),
            Rerender::Queue(queue) => queue.push(input.into(), search_params),
        }
    }
}

/// Accumulates rerender requests for one POST action scope.
pub(crate) struct RerenderQueue {
    engine: Arc<dyn RenderEngine>,
    build_config: Option<Value>,
    context: RenderContext,
    pending: Mutex<VecDeque<BoxFuture<'static, Result<Option<Elements>>>>>,
    finalized: AtomicBool,
}

impl RerenderQueue {
    pub(crate) fn new(
        engine: Arc<dyn RenderEngine>,
        build_config: Option<Value>,
        context: RenderContext,
    ) -> Arc<Self> {
        Arc::new(Self {
            engine,
            build_config,
            context,
            pending: Mutex::new(VecDeque::new()),
            finalized: AtomicBool::new(false),
        })
    }

    fn push(self: &Arc<Self>, input: String, search_params: SearchParams) -> Result<()> {
        if self.finalized.load(Ordering::SeqCst) {
            return Err(ArborError::AlreadyRendered);
        }
        let queue = Arc::clone(self);
        let render = async move {
            let store = RenderStore::for_action(Arc::clone(&queue));
            queue
                .engine
                .render_entries(&store, &input, &search_params, queue.build_config.as_ref())
                .await
        }
        .boxed();
        self.pending
            .lock()
            .unwrap()
            .push_back(render);
        Ok(())
    }

    /// Awaits every queued render in call order, folding the results into
    /// one tree (last write wins), then finalizes the scope.
    ///
    /// A render that yields no tree contributes nothing; see the dispatcher
    /// notes on null rerender targets. The scope finalizes even when a
    /// render fails, and any still-queued renders are dropped; the queued
    /// futures hold an `Arc` back to this queue, so leaving them pending
    /// would keep the scope alive.
    pub(crate) async fn drain(&self) -> Result<Elements> {
        let mut merged = Elements::new();
        let outcome = loop {
            let next = self.pending.lock().unwrap().pop_front();
            match next {
                Some(render) => match render.await {
                    Ok(Some(elements)) => merged.merge(elements),
                    Ok(None) => {}
                    Err(err) => break Err(err),
                },
                None => break Ok(()),
            }
        };
        self.finalized.store(true, Ordering::SeqCst);
        self.pending.lock().unwrap().clear();
        outcome?;
        Ok(merged)
    }
}
