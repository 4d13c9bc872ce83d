use integration_tests::{server_root, start_server, url, ADDR};

use std::io::{Read, Write};
use std::net::TcpStream;

#[test]
fn serves_files_with_cache_headers() {
    // Arrange
    start_server();

    // Act
    let res = reqwest::blocking::get(url("/hello.txt")).expect("request failed");

    // Assert
    assert_eq!(res.status(), 200);

    let headers = res.headers();
    assert!(
        headers.contains_key(reqwest::header::CACHE_CONTROL),
        "Cache-Control header missing"
    );
    assert!(
        headers.contains_key(reqwest::header::ETAG),
        "ETag header missing"
    );
    assert!(
        headers.contains_key(reqwest::header::LAST_MODIFIED),
        "Last-Modified header missing"
    );
    assert_eq!(
        headers.get(reqwest::header::VARY).unwrap(),
        "Accept-Encoding"
    );

    let body = res.text().expect("failed to read response body");
    assert_eq!(body, "hello over http\n");
}

#[test]
fn serves_index_html_for_the_root() {
    // Arrange
    start_server();

    // Act
    let res = reqwest::blocking::get(url("/")).expect("request failed");

    // Assert
    assert_eq!(res.status(), 200);
    let body = res.text().expect("failed to read response body");
    assert!(body.contains("sidecast"), "unexpected body: {body}");
}

#[test]
fn missing_file_returns_404_with_reason_phrase() {
    // Arrange
    start_server();

    // Act
    let res = reqwest::blocking::get(url("/i_dont_exist.txt")).expect("request failed");

    // Assert
    assert_eq!(res.status(), 404);
    assert_eq!(res.text().unwrap(), "Not Found");
}

#[test]
fn if_none_match_returns_304() {
    // Arrange
    start_server();

    let initial = reqwest::blocking::get(url("/hello.txt")).expect("initial request failed");
    let etag = initial
        .headers()
        .get(reqwest::header::ETAG)
        .expect("ETag missing")
        .to_str()
        .unwrap()
        .to_string();

    // Act
    let client = reqwest::blocking::Client::new();
    let res = client
        .get(url("/hello.txt"))
        .header(reqwest::header::IF_NONE_MATCH, etag)
        .send()
        .expect("conditional request failed");

    // Assert
    assert_eq!(
        res.status(),
        reqwest::StatusCode::NOT_MODIFIED,
        "expected 304 Not Modified"
    );

    // 304 responses must not include a body
    let body = res.text().unwrap();
    assert!(body.is_empty(), "expected empty body for 304 response");
}

#[test]
fn gzip_negotiation_persists_sidecars() {
    // Arrange
    start_server();

    // Act
    let client = reqwest::blocking::Client::new();
    let res = client
        .get(url("/style.css"))
        .header(reqwest::header::ACCEPT_ENCODING, "gzip")
        .send()
        .expect("request failed");

    // Assert
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers()
            .get(reqwest::header::CONTENT_ENCODING)
            .expect("Content-Encoding missing"),
        "gzip"
    );
    assert_eq!(
        res.headers().get(reqwest::header::CONTENT_TYPE).unwrap(),
        "text/css; charset=UTF-8"
    );

    // The derived artifacts survive on disk for the next request.
    assert!(server_root().join("style.min.css").is_file());
    assert!(server_root().join("style.min.css.gz").is_file());
}

#[test]
fn head_request_strips_the_body() {
    // Arrange
    start_server();

    // Act
    let client = reqwest::blocking::Client::new();
    let res = client.head(url("/hello.txt")).send().expect("request failed");

    // Assert
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers()
            .get(reqwest::header::CONTENT_LENGTH)
            .unwrap(),
        "16"
    );
    assert!(res.text().unwrap().is_empty());
}

/// Clients normalize dot segments away, so the traversal attempt has
/// to go over a raw socket.
#[test]
fn traversal_is_rejected_with_403() {
    // Arrange
    start_server();

    let mut stream = TcpStream::connect(ADDR).expect("connect failed");
    write!(
        stream,
        "GET /../../etc/passwd HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n"
    )
    .unwrap();

    // Act
    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();

    // Assert
    assert!(
        response.starts_with("HTTP/1.1 403"),
        "unexpected response: {}",
        response.lines().next().unwrap_or("")
    );
    assert!(response.ends_with("Forbidden"), "body should be the reason phrase");
}
