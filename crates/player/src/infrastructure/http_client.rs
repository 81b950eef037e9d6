//! HTTP adapter for the event backend (reqwest).

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use url::Url;

use crate::ports::outbound::{ApiError, RawApiPort};

/// `RawApiPort` over HTTP.
///
/// Paths are appended to the base URL as-is, so a base such as
/// `https://host/api` keeps its path prefix.
#[derive(Clone)]
pub struct HttpApiAdapter {
    client: Client,
    base_url: String,
}

impl HttpApiAdapter {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ApiError::RequestFailed(format!("Invalid API URL {}: {}", base_url, e)))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        tracing::debug!(base_url = %parsed, timeout_ms = timeout.as_millis() as u64, "HTTP API adapter ready");

        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(ApiError::HttpError {
            status: status.as_u16(),
            message: if message.is_empty() {
                status.canonical_reason().unwrap_or("error").to_string()
            } else {
                message
            },
        })
    }

    async fn read_json(response: Response) -> Result<Value, ApiError> {
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;
        parse_body(&text)
    }
}

/// An empty body reads as `null`.
fn parse_body(text: &str) -> Result<Value, ApiError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| ApiError::ParseError(e.to_string()))
}

#[async_trait::async_trait]
impl RawApiPort for HttpApiAdapter {
    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let response = self.send(self.client.get(self.url(path))).await?;
        Self::read_json(response).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let response = self.send(self.client.post(self.url(path)).json(body)).await?;
        Self::read_json(response).await
    }

    async fn post_no_response_json(&self, path: &str, body: &Value) -> Result<(), ApiError> {
        self.send(self.client.post(self.url(path)).json(body))
            .await
            .map(|_| ())
    }

    async fn put_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let response = self.send(self.client.put(self.url(path)).json(body)).await?;
        Self::read_json(response).await
    }

    async fn patch_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let response = self.send(self.client.patch(self.url(path)).json(body)).await?;
        Self::read_json(response).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.client.delete(self.url(path))).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one canned HTTP response and report the request line.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::sync::oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            let request_line = request.lines().next().unwrap_or_default().to_string();
            let _ = tx.send(request_line);

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        (format!("http://{}/api", addr), rx)
    }

    #[test]
    fn test_url_keeps_base_path() {
        let adapter =
            HttpApiAdapter::new("http://localhost:3000/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(adapter.base_url(), "http://localhost:3000/api");
        assert_eq!(
            adapter.url("/events/abc/parties"),
            "http://localhost:3000/api/events/abc/parties"
        );
        assert_eq!(
            adapter.url("characters/upsert"),
            "http://localhost:3000/api/characters/upsert"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(HttpApiAdapter::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_empty_body_is_null() {
        assert_eq!(parse_body("").unwrap(), Value::Null);
        assert_eq!(parse_body("  \n").unwrap(), Value::Null);
        assert_eq!(parse_body("[1]").unwrap(), json!([1]));
        assert!(matches!(parse_body("{"), Err(ApiError::ParseError(_))));
    }

    #[tokio::test]
    async fn get_json_reads_body() {
        let (base, request_line) = serve_once("200 OK", r#"{"code":"abc"}"#).await;
        let adapter = HttpApiAdapter::new(&base, Duration::from_secs(5)).unwrap();

        let value = adapter.get_json("/events/abc").await.unwrap();

        assert_eq!(value, json!({ "code": "abc" }));
        assert_eq!(request_line.await.unwrap(), "GET /api/events/abc HTTP/1.1");
    }

    #[tokio::test]
    async fn error_status_becomes_http_error() {
        let (base, _request_line) = serve_once("404 Not Found", "").await;
        let adapter = HttpApiAdapter::new(&base, Duration::from_secs(5)).unwrap();

        let err = adapter.delete("/characters/9").await.unwrap_err();

        assert!(err.is_not_found());
    }
}
