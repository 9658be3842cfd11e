//! Minimal multipart/form-data boundary adapter.
//!
//! Server-action invocations submitted as forms arrive as a multipart body.
//! This parser is deliberately minimal: it buffers the full body and splits
//! it on the boundary token, which is all the action boundary needs. It is
//! not a general multipart implementation and does not stream.

use bytes::Bytes;

use crate::error::{ArborError, Result};

const DEFAULT_FILE_CONTENT_TYPE: &str = "application/octet-stream";

/// A decoded form field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    /// A plain text field, trimmed of surrounding whitespace.
    Text(String),
    /// A binary attachment from a filename-bearing part.
    File {
        filename: String,
        content_type: String,
        content: Bytes,
    },
}

/// An ordered name-to-value mapping decoded from a multipart body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, FormValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: impl Into<String>, value: FormValue) {
        self.entries.push((name.into(), value));
    }

    /// First value recorded under `name`, if any.
    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, FormValue)> {
        self.entries.iter()
    }

    /// Parses a buffered multipart body.
    ///
    /// The boundary token is taken from the `boundary=` parameter of
    /// `content_type`. Each non-empty, non-terminal part is split into
    /// headers and content at the blank-line separator; `Content-Disposition`
    /// supplies the field name and optional filename. Filename-bearing parts
    /// become [`FormValue::File`] attachments tagged with the part's
    /// `Content-Type` (defaulting to `application/octet-stream`), everything
    /// else becomes a trimmed [`FormValue::Text`].
    pub fn parse(body: &str, content_type: &str) -> Result<FormData> {
        let boundary = content_type
            .split("boundary=")
            .nth(1)
            .map(|b| b.trim_matches('"'))
            .filter(|b| !b.is_empty())
            .ok_or_else(|| {
                ArborError::InvalidRequest(format!(
                    "Missing multipart boundary in content type: {content_type}"
                ))
            })?;

        let delimiter = format!("--{boundary}");
        let mut form = FormData::new();

        for part in body.split(&delimiter) {
            let trimmed = part.trim();
            if trimmed.is_empty() || trimmed == "--" {
                continue;
            }
            let Some((raw_headers, content)) = part.split_once("\r\n\r\n") else {
                continue;
            };

            let disposition = raw_headers
                .split("\r\n")
                .find_map(|line| strip_header(line, "content-disposition"));
            let Some(disposition) = disposition else {
                continue;
            };
            let Some(name) = disposition_param(disposition, "name") else {
                continue;
            };

            if let Some(filename) = disposition_param(disposition, "filename") {
                let part_content_type = raw_headers
                    .split("\r\n")
                    .find_map(|line| strip_header(line, "content-type"))
                    .unwrap_or(DEFAULT_FILE_CONTENT_TYPE);
                // The final CRLF belongs to the following boundary line, not
                // to the attachment.
                let content = content.strip_suffix("\r\n").unwrap_or(content);
                form.append(
                    name,
                    FormValue::File {
                        filename: filename.to_string(),
                        content_type: part_content_type.to_string(),
                        content: Bytes::copy_from_slice(content.as_bytes()),
                    },
                );
            } else {
                form.append(name, FormValue::Text(content.trim().to_string()));
            }
        }

        Ok(form)
    }
}

/// Case-insensitive header match, returning the header value.
fn strip_header<'a>(line: &'a str, header: &str) -> Option<&'a str> {
    let (key, value) = line.split_once(':')?;
    if key.trim().eq_ignore_ascii_case(header) {
        Some(value.trim())
    } else {
        None
    }
}

/// Extracts a quoted `key="value"` parameter from a Content-Disposition
/// header value.
fn disposition_param<'a>(disposition: &'a str, key: &str) -> Option<&'a str> {
    disposition.split(';').find_map(|segment| {
        let (segment_key, value) = segment.trim().split_once('=')?;
        if segment_key == key {
            Some(value.trim_matches('"'))
        } else {
            None
        }
    })
}
