//! HTTP request/response types and the transport seam.
//!
//! # Design
//! Requests and responses are plain data. `PagientClient` builds an
//! `HttpRequest`, hands it to a `Transport`, and classifies the returned
//! `HttpResponse`. The transport only moves bytes: it never interprets
//! status codes, so 4xx/5xx responses come back as data rather than `Err`.
//!
//! `UreqTransport` is the default implementation. Tests substitute their own
//! `Transport` to run without a network.

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data. The body has already been read
/// in full, so the underlying connection is released by the time a caller
/// sees this value. It is kept as raw bytes; interpreting them is the
/// caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Success range accepted by the service protocol: every status up to
    /// and including 300.
    pub fn is_success(&self) -> bool {
        self.status <= 300
    }
}

/// Executes one HTTP round trip.
///
/// Implementations must return `Ok` for every response that arrived,
/// whatever its status, and `ApiError::Transport` only when no response was
/// received.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport backed by a `ureq` agent.
///
/// The agent pools connections and is cheap to share between threads.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let result = match method {
            HttpMethod::Get | HttpMethod::Delete => {
                let mut builder = if method == HttpMethod::Get {
                    self.agent.get(&url)
                } else {
                    self.agent.delete(&url)
                };
                for (name, value) in &headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post | HttpMethod::Put => {
                let mut builder = if method == HttpMethod::Post {
                    self.agent.post(&url)
                } else {
                    self.agent.put(&url)
                };
                for (name, value) in &headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(ApiError::transport)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        // No size cap: the body is kept as bytes whatever it contains.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(ApiError::transport)?;

        debug!(%method, url = %url, status, "response received");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Serve exactly one raw HTTP reply on a random port and return the
    /// base URL.
    fn serve_once(reply: Vec<u8>) -> String {
        use std::io::{BufRead, BufReader, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            loop {
                line.clear();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
            }
            let mut stream = stream;
            stream.write_all(&reply).unwrap();
            stream.flush().unwrap();
        });
        format!("http://{addr}")
    }

    fn raw_reply(status_line: &str, body: &[u8]) -> Vec<u8> {
        let mut reply = format!(
            "HTTP/1.1 {status_line}\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n",
            body.len()
        )
        .into_bytes();
        reply.extend_from_slice(body);
        reply
    }

    fn get(url: String) -> Result<HttpResponse, ApiError> {
        UreqTransport::new(Duration::from_secs(5)).execute(HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
        })
    }

    #[test]
    fn non_utf8_body_is_delivered_as_bytes() {
        let base = serve_once(raw_reply("404 Not Found", b"{\xff}"));
        let response = get(format!("{base}/patients/1")).unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.body, b"{\xff}".to_vec());
        assert_eq!(response.header("content-type"), Some("application/json"));
    }

    #[test]
    fn non_utf8_failure_body_keeps_its_status() {
        use crate::api::PagientApi;
        use crate::client::PagientClient;

        let base = serve_once(raw_reply("404 Not Found", b"{\xff}"));
        let err = PagientClient::new(&base).patient_get(1).unwrap_err();
        assert!(matches!(err, ApiError::Decode { status: Some(404), .. }), "{err:?}");
        assert!(err.is_not_found());
        assert!(err.is_http_error());
    }

    #[test]
    fn non_utf8_success_body_is_decode_error() {
        use crate::api::PagientApi;
        use crate::client::PagientClient;

        let base = serve_once(raw_reply("200 OK", b"\xff\xfe"));
        let err = PagientClient::new(&base).patient_get(1).unwrap_err();
        assert!(matches!(err, ApiError::Decode { status: None, .. }), "{err:?}");
        assert!(!err.is_transport());
    }

    #[test]
    fn success_boundary_includes_300() {
        assert!(response(200).is_success());
        assert!(response(204).is_success());
        assert!(response(300).is_success());
        assert!(!response(301).is_success());
        assert!(!response(404).is_success());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost/clients".to_string(),
            headers: vec![("User-Agent".to_string(), "test".to_string())],
            body: None,
        };
        assert_eq!(req.header("user-agent"), Some("test"));
        assert_eq!(req.header("content-type"), None);
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        // Grab a free port, then close it again so nothing is listening.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let transport = UreqTransport::new(Duration::from_secs(2));
        let err = transport
            .execute(HttpRequest {
                method: HttpMethod::Get,
                url: format!("http://{addr}/clients"),
                headers: Vec::new(),
                body: None,
            })
            .unwrap_err();
        assert!(err.is_transport());
        assert!(!err.is_http_error());
    }
}
