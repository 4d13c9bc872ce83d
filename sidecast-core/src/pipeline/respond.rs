use std::io;
use std::time::{Duration, UNIX_EPOCH};

use bytes::Bytes;
use http::{header, HeaderName, HeaderValue, StatusCode};
use httpdate::fmt_http_date;
use tokio::fs;

use crate::config::ServeConfig;
use crate::envelope::{ResponseBody, ResponseEnvelope};
use crate::pipeline::Representation;

/// Assemble the `200 OK` response for the selected representation.
///
/// The header order is part of the contract: Content-Encoding (if
/// any), Content-Length, Content-Type, Last-Modified, Expires,
/// Cache-Control, ETag (if any), Vary.
pub(crate) async fn build_ok(
    config: &ServeConfig,
    rep: &Representation,
    etag: Option<&str>,
) -> io::Result<ResponseEnvelope> {
    let file = fs::File::open(&rep.current_file).await?;
    let metadata = file.metadata().await?;
    let mtime = metadata.modified()?;

    let mut headers: Vec<(HeaderName, HeaderValue)> = Vec::new();

    if let Some(encoding) = rep.content_encoding {
        headers.push((header::CONTENT_ENCODING, HeaderValue::from_static(encoding)));
    }

    headers.push((header::CONTENT_LENGTH, HeaderValue::from(metadata.len())));

    let content_type = full_content_type(config, &rep.content_type);
    headers.push((
        header::CONTENT_TYPE,
        HeaderValue::from_str(&content_type).unwrap(),
    ));

    headers.push((
        header::LAST_MODIFIED,
        HeaderValue::from_str(&fmt_http_date(mtime)).unwrap(),
    ));

    // Expires derives from the file's mtime, not from "now"; clients
    // honoring max-age recompute freshness correctly either way.
    let expires = if rep.valid_for >= 0 {
        mtime + Duration::from_secs(rep.valid_for as u64)
    } else {
        UNIX_EPOCH
    };
    headers.push((
        header::EXPIRES,
        HeaderValue::from_str(&fmt_http_date(expires)).unwrap(),
    ));

    headers.push((
        header::CACHE_CONTROL,
        HeaderValue::from_str(&rep.cache_control.join(", ")).unwrap(),
    ));

    if let Some(tag) = etag {
        headers.push((header::ETAG, HeaderValue::from_str(tag).unwrap()));
    }

    headers.push((header::VARY, HeaderValue::from_static("Accept-Encoding")));

    Ok(ResponseEnvelope {
        status: StatusCode::OK,
        headers,
        body: ResponseBody::File(file),
    })
}

fn full_content_type(config: &ServeConfig, base: &str) -> String {
    let texty = base.starts_with("text/")
        || matches!(
            base,
            "application/json" | "application/xml" | "application/javascript"
        );
    if texty {
        format!("{base}; charset={}", config.encoding)
    } else {
        base.to_string()
    }
}

/// `304 Not Modified`: empty body, no headers.
pub(crate) fn not_modified() -> ResponseEnvelope {
    ResponseEnvelope {
        status: StatusCode::NOT_MODIFIED,
        headers: Vec::new(),
        body: ResponseBody::Empty,
    }
}

/// Error response carrying the canonical reason phrase as a
/// `text/plain` body.
pub(crate) fn error_response(status: StatusCode) -> ResponseEnvelope {
    let reason = status.canonical_reason().unwrap_or("Error");

    ResponseEnvelope {
        status,
        headers: vec![
            (
                header::CONTENT_LENGTH,
                HeaderValue::from(reason.len() as u64),
            ),
            (header::CONTENT_TYPE, HeaderValue::from_static("text/plain")),
        ],
        body: ResponseBody::Bytes(Bytes::from(reason)),
    }
}
