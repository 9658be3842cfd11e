//! Arbor Common Types
//!
//! This crate provides the wire-level definitions shared by every component
//! of the arbor render protocol: the error taxonomy, module reference
//! descriptors, element trees, byte streams and the minimal multipart form
//! model used at the action boundary.
//!
//! # Overview
//!
//! Arbor is a server-side rendering and remote-invocation protocol engine.
//! An entry-point reference is resolved to a tree of renderable elements,
//! the tree is serialized into a streamable wire format where references to
//! client-executable code are replaced by opaque module descriptors, and
//! inbound invocations of server-side functions are dispatched by opaque id
//! with their results merged back into a render.
//!
//! # Components
//!
//! - [`error`] - The [`ArborError`] taxonomy and `Result` alias
//! - [`module`] - Module references, descriptors and encoded-id parsing
//! - [`elements`] - Element trees produced by the rendering engine
//! - [`stream`] - The [`ByteStream`] type and buffering helpers
//! - [`form`] - Minimal multipart/form-data boundary adapter

pub mod elements;
pub mod error;
pub mod form;
pub mod module;
pub mod stream;

pub use elements::{Element, Elements, ACTION_VALUE_KEY, RESERVED_PREFIX};
pub use error::{ArborError, Result};
pub use form::{FormData, FormValue};
pub use module::{EncodedModuleId, ModuleDescriptor};
pub use stream::{byte_stream_from, stream_to_string, ByteStream};
