use bytes::Bytes;
use http::{HeaderName, HeaderValue, Method, StatusCode};
use tokio::fs;

/// Request envelope handed to the pipeline by the surrounding transport.
///
/// `path` is the percent-decoded request path (`PATH_INFO`). The core
/// treats `GET` and `HEAD` alike and always produces a body; the
/// transport is responsible for stripping it on `HEAD`.
#[derive(Debug, Default)]
pub struct RequestEnvelope {
    pub method: Method,
    pub path: String,
    pub accept_encoding: Option<String>,
    pub if_modified_since: Option<String>,
    pub if_none_match: Option<String>,
}

pub enum ResponseBody {
    Empty,
    /// Small generated bodies (error pages).
    Bytes(Bytes),
    /// An open handle streamed by the transport.
    File(fs::File),
}

/// Response envelope produced by the pipeline.
///
/// Headers are an ordered list; the emission order is part of the
/// response contract.
pub struct ResponseEnvelope {
    pub status: StatusCode,
    pub headers: Vec<(HeaderName, HeaderValue)>,
    pub body: ResponseBody,
}

impl ResponseEnvelope {
    pub fn header(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}
