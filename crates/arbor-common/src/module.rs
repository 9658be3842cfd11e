//! Module references and descriptors.
//!
//! A client-executable module is referenced on the wire as a single encoded
//! string `"<path>#<exportName>"`. Resolution turns that string into a
//! [`ModuleDescriptor`] identifying the loadable bundle(s) for the module.

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

use crate::error::{ArborError, Result};

const FILE_URL_SCHEME: &str = "file://";

/// Resolved identity of a client-loadable code reference.
///
/// The encoder emits this in place of inline code so the client can load the
/// module from its bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Canonical module id.
    pub id: String,
    /// The loadable bundle(s) containing the module.
    pub chunks: Vec<String>,
    /// The export name within the module. Empty means the sole/default
    /// export.
    pub name: String,
    /// Whether loading the module requires an asynchronous import.
    #[serde(rename = "async")]
    pub async_module: bool,
}

/// A parsed `"<path>#<exportName>"` wire string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedModuleId<'a> {
    pub path: &'a str,
    pub name: &'a str,
}

impl<'a> EncodedModuleId<'a> {
    /// Splits an encoded id on the first `#`.
    ///
    /// A missing `#` means an empty export name, as does a trailing `#`.
    pub fn parse(encoded_id: &'a str) -> Self {
        match encoded_id.split_once('#') {
            Some((path, name)) => Self { path, name },
            None => Self {
                path: encoded_id,
                name: "",
            },
        }
    }

    /// Whether this id is a self-describing server-action reference: a
    /// 40-character hexadecimal prefix followed by `#`.
    ///
    /// Such ids appear when action references recur inside serialized data;
    /// they resolve to themselves as both id and sole chunk.
    pub fn is_self_describing_action(encoded_id: &str) -> bool {
        let bytes = encoded_id.as_bytes();
        bytes.len() > 40
            && bytes[40] == b'#'
            && bytes[..40].iter().all(|b| b.is_ascii_hexdigit())
    }
}

/// Converts a `file://` URL to a plain file path, percent-decoding it.
///
/// Fails with [`ArborError::InvalidReference`] when the scheme prefix is
/// absent or the decoded path is not valid UTF-8.
pub fn file_url_to_path(file_url: &str) -> Result<String> {
    let path = file_url
        .strip_prefix(FILE_URL_SCHEME)
        .ok_or_else(|| ArborError::InvalidReference(format!("Not a file URL: {file_url}")))?;
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map_err(|e| ArborError::InvalidReference(format!("Malformed file URL {file_url}: {e}")))?;
    Ok(decoded.into_owned())
}

/// Whether an encoded module path carries the `file://` scheme.
pub fn is_file_url(path: &str) -> bool {
    path.starts_with(FILE_URL_SCHEME)
}
