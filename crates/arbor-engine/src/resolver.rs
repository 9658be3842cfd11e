//! Module reference resolver.
//!
//! Turns an encoded client-module id (`"<path>#<exportName>"`) into a
//! [`ModuleDescriptor`]. The encoder receives this as a plain callback
//! injected per render call; a fresh resolver is constructed per request so
//! no resolver state is shared across requests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use arbor_common::module::{file_url_to_path, is_file_url};
use arbor_common::{ArborError, EncodedModuleId, ModuleDescriptor, Result};

use crate::dispatcher::RenderOptions;
use crate::traits::{ClientEntryResolver, ModuleIdCallback, ModuleResolverFn};

/// Per-request module resolver.
///
/// Resolution is pure for a fixed mode and client-entry resolver: the same
/// encoded id always yields the same descriptor. When a discovery callback
/// is registered, each distinct encoded id is reported through it exactly
/// once; duplicates collapse.
pub struct ModuleResolver {
    exporting: bool,
    client_entries: Option<Arc<dyn ClientEntryResolver>>,
    module_id_callback: Option<ModuleIdCallback>,
    seen: Mutex<HashSet<String>>,
}

impl ModuleResolver {
    pub fn new(options: &RenderOptions, module_id_callback: Option<ModuleIdCallback>) -> Arc<Self> {
        Arc::new(Self {
            exporting: options.exporting,
            client_entries: options.client_entries.clone(),
            module_id_callback,
            seen: Mutex::new(HashSet::new()),
        })
    }

    /// Resolves an encoded id to a module descriptor.
    ///
    /// Outside export mode a client-entry resolver is a required argument of
    /// the render call; resolution without one fails with
    /// [`ArborError::InvalidReference`].
    pub fn resolve(&self, encoded_id: &str) -> Result<ModuleDescriptor> {
        let descriptor = self.resolve_inner(encoded_id)?;
        if let Some(callback) = &self.module_id_callback {
            let mut seen = self.seen.lock().unwrap();
            if seen.insert(encoded_id.to_string()) {
                callback(&descriptor);
            }
        }
        Ok(descriptor)
    }

    fn resolve_inner(&self, encoded_id: &str) -> Result<ModuleDescriptor> {
        let EncodedModuleId { path, name } = EncodedModuleId::parse(encoded_id);

        // Server-action ids recursively appearing as data resolve to
        // themselves as both id and sole chunk.
        if EncodedModuleId::is_self_describing_action(encoded_id) {
            return Ok(ModuleDescriptor {
                id: encoded_id.to_string(),
                chunks: vec![encoded_id.to_string()],
                name: name.to_string(),
                async_module: true,
            });
        }

        let file_path = if is_file_url(path) {
            file_url_to_path(path)?
        } else {
            path.to_string()
        };

        if let Some(client_entries) = &self.client_entries {
            let resolved = client_entries.resolve_client_entry(&file_path)?;
            return Ok(ModuleDescriptor {
                id: resolved.id,
                chunks: resolved.urls,
                name: name.to_string(),
                async_module: true,
            });
        }

        if self.exporting {
            // Provisional identity for discovery bookkeeping; final bundle
            // naming happens in the build pipeline.
            return Ok(ModuleDescriptor {
                id: file_path.clone(),
                chunks: vec![format!("chunk:{file_path}")],
                name: name.to_string(),
                async_module: true,
            });
        }

        Err(ArborError::InvalidReference(format!(
            "No client entry resolver supplied for \"{encoded_id}\" outside export mode"
        )))
    }

    /// Wraps this resolver as the callback the encoder consumes.
    pub fn as_callback(self: &Arc<Self>) -> ModuleResolverFn {
        let resolver = Arc::clone(self);
        Arc::new(move |encoded_id| resolver.resolve(encoded_id))
    }
}
