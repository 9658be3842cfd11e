//! SSR fallback path.
//!
//! When a pathname is served as plain HTML rather than through the render
//! protocol, the optional SSR config provider supplies a body tree for it.
//! That body is re-encoded through the same module-resolution contract as a
//! normal render before being handed back, so client references inside it
//! stay loadable.

use arbor_common::{ByteStream, Result};
use serde_json::{Map, Value};

use crate::dispatcher::{RenderOptions, Renderer};
use crate::resolver::ModuleResolver;
use crate::traits::{SearchParams, SsrConfigProvider};

/// An SSR config with its body already encoded.
pub struct SsrPayload {
    pub body: ByteStream,
    /// Provider fields passed through untouched.
    pub extra: Map<String, Value>,
}

impl Renderer {
    /// Consults the SSR provider for `pathname` and encodes the returned
    /// body, if any.
    ///
    /// `None` from the provider passes through unchanged. The body is
    /// resolved with a resolver built from `options`, so serving mode still
    /// requires a client-entry resolver here.
    pub async fn get_ssr_config(
        &self,
        provider: Option<&dyn SsrConfigProvider>,
        pathname: &str,
        search_params: &SearchParams,
        options: &RenderOptions,
    ) -> Result<Option<SsrPayload>> {
        let Some(provider) = provider else {
            return Ok(None);
        };
        let Some(config) = provider.get_ssr_config(pathname, search_params).await? else {
            return Ok(None);
        };

        let resolver = ModuleResolver::new(options, None);
        let body = self.encoder().encode(config.body, resolver.as_callback())?;
        Ok(Some(SsrPayload {
            body,
            extra: config.extra,
        }))
    }
}
