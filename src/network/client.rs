//! HTTP client wrapper - one configured reqwest client bound to the backend

use std::time::Instant;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::constants::{REQUEST_TIMEOUT, VIACEP_URL};
use crate::error::{ApiError, ApiResult};

/// Client for the CRM backend (and the public ViaCEP service).
///
/// Cheap to clone: the inner reqwest client shares its connection pool.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    cep_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_cep_url(base_url, VIACEP_URL)
    }

    /// Point postal code lookups somewhere else (tests, mirrors)
    pub fn with_cep_url(base_url: impl Into<String>, cep_url: impl Into<String>) -> Self {
        ApiClient {
            http: create_client(),
            base_url: trim_slash(base_url.into()),
            cep_url: trim_slash(cep_url.into()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn cep_url(&self, cep: &str) -> String {
        format!("{}/{}/json/", self.cep_url, cep)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let builder = self.http.get(self.url(path));
        self.send(Method::GET, path, builder).await
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.http.post(self.url(path)).json(body);
        self.send(Method::POST, path, builder).await
    }

    pub(crate) async fn put<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.http.put(self.url(path)).json(body);
        self.send(Method::PUT, path, builder).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let builder = self.http.delete(self.url(path));
        self.send(Method::DELETE, path, builder).await
    }

    /// GET against a full URL outside the backend
    pub(crate) async fn get_external<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let builder = self.http.get(url);
        self.send(Method::GET, url, builder).await
    }

    /// Send a request, check the status and decode the JSON body.
    ///
    /// An empty body decodes as JSON `null` so callers can ask for
    /// `serde_json::Value` or `Option<T>` from endpoints that answer 204.
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
    ) -> ApiResult<T> {
        let start = Instant::now();
        let result = builder.send().await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let resp = result.map_err(|e| ApiError::from_reqwest(e, REQUEST_TIMEOUT.as_secs()))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("Error reading body: {}", e)))?;

        tracing::debug!(%method, path, status = status.as_u16(), elapsed_ms, "Request completed");

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: error_message(&body),
            });
        }

        let text = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(text).map_err(|e| ApiError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

/// Pull a readable message out of an error body (`{"error": ..}` or `{"message": ..}`)
fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message", "mensagem", "erro"] {
            if let Some(msg) = json.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        String::from("(empty body)")
    } else {
        trimmed.chars().take(200).collect()
    }
}

fn trim_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

/// Create an HTTP client with default configuration
pub fn create_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining_trims_trailing_slash() {
        let client = ApiClient::with_cep_url("http://localhost:3000/", "https://viacep.com.br/ws/");
        assert_eq!(client.url("/compras"), "http://localhost:3000/compras");
        assert_eq!(client.cep_url("01001000"), "https://viacep.com.br/ws/01001000/json/");
    }

    #[test]
    fn test_error_message_prefers_json_fields() {
        assert_eq!(error_message(r#"{"error":"Cliente não encontrado"}"#), "Cliente não encontrado");
        assert_eq!(error_message(r#"{"message":"bad cep"}"#), "bad cep");
        assert_eq!(error_message("  "), "(empty body)");
        assert_eq!(error_message("Internal Server Error"), "Internal Server Error");
    }
}
