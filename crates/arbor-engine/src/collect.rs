//! Build-time module discovery.
//!
//! Ahead-of-time bundling needs to know every client module an entry point
//! may transitively reference. Discovery runs a full GET render in export
//! mode with a callback wired into the module resolver, then drains the
//! resulting stream to exhaustion: a partially-drained stream under-reports
//! references, which is a correctness defect rather than a performance
//! trade-off.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use arbor_common::Result;
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;

use crate::dispatcher::{RenderOptions, Renderer, RenderRequest};
use crate::traits::{BuildConfigHook, ClientModuleCollector, ModuleIdCallback};

impl Renderer {
    /// Enumerates every client module id the entry point touches.
    ///
    /// The walk is idempotent: with a deterministic rendering engine, two
    /// runs over the same entry yield identical sets. A stream abort
    /// propagates as the abort reason; the set is only returned on a normal
    /// close.
    pub async fn collect_client_modules(&self, input: &str) -> Result<BTreeSet<String>> {
        let ids = Arc::new(Mutex::new(BTreeSet::new()));
        let callback: ModuleIdCallback = {
            let ids = Arc::clone(&ids);
            Arc::new(move |descriptor| {
                ids.lock().unwrap().insert(descriptor.id.clone());
            })
        };

        let mut request = RenderRequest::get(input, Vec::new());
        request.module_id_callback = Some(callback);
        let options = RenderOptions {
            exporting: true,
            client_entries: None,
        };

        let mut stream = self.render(request, &options).await?;
        while let Some(chunk) = stream.next().await {
            chunk?;
        }

        let collected = ids.lock().unwrap().clone();
        Ok(collected)
    }

    /// Invokes the optional build-config hook with a module collector backed
    /// by [`Renderer::collect_client_modules`].
    ///
    /// A missing hook is the one recoverable condition in this engine: it
    /// warns and yields an empty manifest.
    pub async fn get_build_config(
        &self,
        hook: Option<&dyn BuildConfigHook>,
    ) -> Result<Vec<Value>> {
        match hook {
            Some(hook) => hook.get_build_config(self).await,
            None => {
                tracing::warn!(
                    "get_build_config hook is undefined; it's recommended for optimization and sometimes required"
                );
                Ok(Vec::new())
            }
        }
    }
}

#[async_trait]
impl ClientModuleCollector for Renderer {
    async fn collect(&self, input: &str) -> Result<Vec<String>> {
        Ok(self
            .collect_client_modules(input)
            .await?
            .into_iter()
            .collect())
    }
}
