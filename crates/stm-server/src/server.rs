//! HTTP front end: `tiny_http` accept loop, one worker thread per request.
//!
//! Workers drive the async pipeline with [`tokio::runtime::Handle::block_on`],
//! so every request blocks its own thread until its transaction finishes.

use std::io::Read;
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::api::{ApiRequest, Method};
use crate::pipeline::Pipeline;
use crate::reply::HttpReply;

/// Accept requests on `address` until the listener fails.
///
/// Blocks the calling thread; run it via `spawn_blocking` from async code.
///
/// # Errors
///
/// Returns an error if the address cannot be bound.
pub fn serve(pipeline: Arc<Pipeline>, address: &str, runtime: Handle) -> anyhow::Result<()> {
    let server = tiny_http::Server::http(address)
        .map_err(|e| anyhow::anyhow!("failed to bind {address}: {e}"))?;
    tracing::info!(address, "listening");

    for request in server.incoming_requests() {
        let pipeline = Arc::clone(&pipeline);
        let runtime = runtime.clone();
        std::thread::spawn(move || handle_request(&pipeline, &runtime, request));
    }
    Ok(())
}

fn handle_request(pipeline: &Pipeline, runtime: &Handle, mut request: tiny_http::Request) {
    let mut body = String::new();
    let reply = match request.as_reader().read_to_string(&mut body) {
        Ok(_) => {
            let api_request = to_api_request(&request, body);
            tracing::debug!(method = ?api_request.method, path = %api_request.path, "request");
            runtime.block_on(pipeline.handle(&api_request))
        }
        Err(error) => {
            tracing::warn!(%error, "failed to read request body");
            HttpReply::status(400)
        }
    };
    respond(request, reply);
}

fn to_api_request(request: &tiny_http::Request, body: String) -> ApiRequest {
    let authorization = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Authorization"))
        .map(|h| h.value.as_str().to_string());

    let mut api_request =
        ApiRequest::new(Method::parse(&request.method().to_string()), request.url()).with_body(body);
    api_request.authorization = authorization;
    api_request
}

fn respond(request: tiny_http::Request, reply: HttpReply) {
    let mut response =
        tiny_http::Response::from_string(reply.body.unwrap_or_default()).with_status_code(reply.status);
    for (name, value) in reply.headers {
        match tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            Ok(header) => response.add_header(header),
            Err(()) => tracing::warn!(name, "invalid response header"),
        }
    }
    if let Err(error) = request.respond(response) {
        tracing::warn!(%error, "failed to write response");
    }
}
