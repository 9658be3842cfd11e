//! Arbor HTTP Boundary
//!
//! This crate exposes the render protocol engine over HTTP/1.1 using hyper.
//! It is a thin adapter: inbound requests become
//! [`RenderRequest`](arbor_engine::RenderRequest)s, engine errors become
//! status codes, and the encoded byte stream becomes the response body. All
//! protocol semantics live in `arbor-engine`.
//!
//! # Components
//!
//! - [`http_router`] - Request-to-engine mapping and error classification
//! - [`http_server`] - TCP accept loop and per-connection tasks

pub mod http_router;
pub mod http_server;

pub use http_router::RenderRouter;
pub use http_server::HttpServer;
