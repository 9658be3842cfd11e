//! HTTP router for the render protocol.
//!
//! Maps inbound HTTP requests to render requests and engine errors to
//! status codes: an `EntryNotFound` becomes 404, a `RenderServer` error
//! keeps its origin status, everything else is 500. The encoded byte stream
//! is forwarded as the response body without buffering.

use std::sync::Arc;

use arbor_common::{byte_stream_from, ArborError, ByteStream};
use arbor_engine::{RenderMethod, RenderOptions, RenderRequest, Renderer, SearchParams};
use bytes::Bytes;
use futures::StreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full, StreamBody};
use hyper::body::{Body, Frame};
use hyper::{header, Method, Request, Response, StatusCode};
use percent_encoding::percent_decode_str;

/// Response body type: either a forwarded engine stream or a short error
/// message.
pub type ResponseBody = UnsyncBoxBody<Bytes, ArborError>;

const RENDER_CONTENT_TYPE: &str = "text/x-component; charset=utf-8";

/// HTTP router for the render protocol engine.
pub struct RenderRouter {
    renderer: Arc<Renderer>,
    options: RenderOptions,
}

impl RenderRouter {
    /// Creates a router serving `renderer` under the given per-deployment
    /// render options.
    pub fn new(renderer: Arc<Renderer>, options: RenderOptions) -> Self {
        Self { renderer, options }
    }

    /// Handles one HTTP request.
    ///
    /// The URI path (sans leading slash) is the entry-point input on GET and
    /// the encoded action id on POST; the query string becomes search
    /// parameters. Any other method is rejected with 405.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<ResponseBody>
    where
        B: Body + Send,
        B::Error: std::fmt::Display,
    {
        let method = match *req.method() {
            Method::GET => RenderMethod::Get,
            Method::POST => RenderMethod::Post,
            _ => {
                return error_response(
                    StatusCode::METHOD_NOT_ALLOWED,
                    "Only GET and POST are supported",
                );
            }
        };

        let input = req.uri().path().trim_start_matches('/').to_string();
        let search_params = parse_search_params(req.uri().query());
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = match method {
            RenderMethod::Get => None,
            RenderMethod::Post => match req.into_body().collect().await {
                Ok(collected) => Some(byte_stream_from(vec![collected.to_bytes()])),
                Err(e) => {
                    tracing::error!("Failed to read request body: {e}");
                    return error_response(StatusCode::BAD_REQUEST, "Failed to read request body");
                }
            },
        };

        let request = RenderRequest {
            method,
            input,
            search_params,
            context: None,
            body,
            content_type,
            module_id_callback: None,
        };

        match self.renderer.render(request, &self.options).await {
            Ok(stream) => stream_response(stream),
            Err(err) => {
                tracing::error!("Render failed: {err}");
                let status = StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                error_response(status, &err.to_string())
            }
        }
    }
}

fn parse_search_params(query: Option<&str>) -> SearchParams {
    let Some(query) = query else {
        return Vec::new();
    };
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(component: &str) -> String {
    let unplussed = component.replace('+', " ");
    percent_decode_str(&unplussed)
        .decode_utf8_lossy()
        .into_owned()
}

fn stream_response(stream: ByteStream) -> Response<ResponseBody> {
    let body = StreamBody::new(stream.map(|chunk| chunk.map(Frame::data)));
    let mut response = Response::new(BodyExt::boxed_unsync(body));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static(RENDER_CONTENT_TYPE),
    );
    response
}

fn error_response(status: StatusCode, message: &str) -> Response<ResponseBody> {
    let body = Full::new(Bytes::copy_from_slice(message.as_bytes()))
        .map_err(|never| match never {})
        .boxed_unsync();
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
}
