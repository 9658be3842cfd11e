//! Action payload decoding.
//!
//! Extracts server-action call arguments from a request body. The body is
//! fully buffered before decoding; incremental multipart parsing is an
//! explicit non-goal of this layer.

use std::sync::Arc;

use arbor_common::{stream_to_string, ByteStream, FormData, Result};
use serde_json::Value;

use crate::traits::{ModuleResolverFn, ReplyDecoder};

const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data";

/// Decodes action arguments from an optional request body.
///
/// No body yields an empty argument sequence. A `multipart/form-data` body
/// is parsed into a [`FormData`] mapping and handed to the decoder's form
/// path; any other non-empty body goes to the decoder's text path verbatim.
pub async fn decode_action_args(
    decoder: &Arc<dyn ReplyDecoder>,
    body: Option<ByteStream>,
    content_type: Option<&str>,
    resolve_module: ModuleResolverFn,
) -> Result<Vec<Value>> {
    let payload = match body {
        Some(stream) => stream_to_string(stream).await?,
        None => String::new(),
    };

    match content_type {
        Some(content_type) if content_type.starts_with(MULTIPART_CONTENT_TYPE) => {
            let form = FormData::parse(&payload, content_type)?;
            decoder.decode_form_data(form, resolve_module).await
        }
        _ if !payload.is_empty() => decoder.decode_text(payload, resolve_module).await,
        _ => Ok(Vec::new()),
    }
}
