use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use http::{header, Method};
use percent_encoding::percent_decode_str;
use pingora::prelude::*;
use pingora::{Custom, Error};
use pingora_http::{RequestHeader, ResponseHeader};
use tokio::io::AsyncReadExt;

use crate::envelope::{RequestEnvelope, ResponseBody};
use crate::pipeline::Pipeline;

/// Static-only gateway: every request is answered in `request_filter`
/// by the serving pipeline; nothing is ever proxied.
pub struct StaticGateway {
    pub pipeline: Arc<Pipeline>,
}

#[async_trait]
impl ProxyHttp for StaticGateway {
    type CTX = ();

    fn new_ctx(&self) -> Self::CTX {}

    async fn upstream_peer(
        &self,
        _session: &mut Session,
        _ctx: &mut Self::CTX,
    ) -> Result<Box<HttpPeer>> {
        // request_filter short-circuits every request.
        Err(Error::new(Custom("static service has no upstream")))
    }

    async fn request_filter(&self, session: &mut Session, _ctx: &mut Self::CTX) -> Result<bool> {
        let req = session.req_header();
        let method = req.method.clone();
        let envelope = build_envelope(req);

        let response = self.pipeline.handle(&envelope).await;

        // Build response header
        let mut resp = ResponseHeader::build(response.status, None)?;
        for (name, value) in &response.headers {
            resp.insert_header(name, value)?;
        }

        // Write headers (not end-of-stream yet)
        session.write_response_header(Box::new(resp), false).await?;

        if method == Method::HEAD {
            // Short-circuit the body write step for HEAD requests.
            session.write_response_body(None, true).await?;
            return Ok(true);
        }

        match response.body {
            ResponseBody::Empty => {
                session.write_response_body(None, true).await?;
            }

            ResponseBody::Bytes(bytes) => {
                session.write_response_body(Some(bytes), true).await?;
            }

            ResponseBody::File(mut file) => {
                const CHUNK_SIZE: usize = 32 * 1024;

                // Allocate once per request.
                let mut buf = BytesMut::with_capacity(CHUNK_SIZE);

                loop {
                    // Ensure we have space to read into.
                    buf.resize(CHUNK_SIZE, 0);

                    let n = file
                        .read(&mut buf[..])
                        .await
                        .map_err(|_| Error::new(Custom("static file read error")))?;

                    if n == 0 {
                        break;
                    }

                    // Shrink to actual read size and freeze the chunk.
                    buf.truncate(n);
                    let chunk: Bytes = buf.split().freeze();

                    session.write_response_body(Some(chunk), false).await?;
                }

                // End-of-stream.
                session.write_response_body(None, true).await?;
            }
        }

        Ok(true)
    }
}

/// Extract the request envelope the pipeline consumes. The URI path is
/// percent-decoded exactly once; NUL and traversal rejection happen in
/// the pipeline itself.
fn build_envelope(req: &RequestHeader) -> RequestEnvelope {
    let path = percent_decode_str(req.uri.path())
        .decode_utf8_lossy()
        .into_owned();

    RequestEnvelope {
        method: req.method.clone(),
        path,
        accept_encoding: header_string(req, header::ACCEPT_ENCODING),
        if_modified_since: header_string(req, header::IF_MODIFIED_SINCE),
        if_none_match: header_string(req, header::IF_NONE_MATCH),
    }
}

fn header_string(req: &RequestHeader, name: header::HeaderName) -> Option<String> {
    req.headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
