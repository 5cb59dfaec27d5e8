use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;

use crate::cli::config::{load_session, require_server, ServerInfo};

/// HTTP client bound to the configured server and, optionally, a bearer token.
pub struct ApiClient {
    http: reqwest::Client,
    server: ServerInfo,
    token: Option<String>,
}

impl ApiClient {
    /// Client without credentials.
    pub fn anonymous() -> anyhow::Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            server: require_server()?,
            token: None,
        })
    }

    /// Client carrying the stored session token.
    pub fn authenticated() -> anyhow::Result<Self> {
        let session = load_session()?;
        let token = session
            .token
            .ok_or_else(|| anyhow::anyhow!("Not logged in; run `opsdesk auth login <tenant> <user>`"))?;
        Ok(Self {
            token: Some(token),
            ..Self::anonymous()?
        })
    }

    /// Same server, different token (used for sudo).
    pub fn with_token(&self, token: String) -> Self {
        Self {
            http: self.http.clone(),
            server: self.server.clone(),
            token: Some(token),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.server.endpoint(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<Value> {
        send(self.request(Method::GET, path)).await
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> anyhow::Result<Value> {
        send(self.request(Method::POST, path).json(body)).await
    }

    /// POST with an `Idempotency-Key` so a retried command is not applied twice.
    pub async fn post_idempotent<B: Serialize>(&self, path: &str, body: &B, key: &str) -> anyhow::Result<Value> {
        send(self.request(Method::POST, path).header("Idempotency-Key", key).json(body)).await
    }
}

/// Send and unwrap the response envelope.
///
/// `{success: true, data}` yields `data`; action envelopes are returned whole.
/// Error envelopes become an `anyhow` error carrying the server's message.
async fn send(builder: RequestBuilder) -> anyhow::Result<Value> {
    let response = builder.send().await?;
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .map_err(|e| anyhow::anyhow!("Server answered {} with a non-JSON body: {}", status, e))?;
    unwrap_envelope(status.as_u16(), body)
}

fn unwrap_envelope(status: u16, body: Value) -> anyhow::Result<Value> {
    if body.get("success").and_then(Value::as_bool) == Some(true) {
        if body.get("reload_table").is_some() {
            return Ok(body);
        }
        return Ok(body.get("data").cloned().unwrap_or(Value::Null));
    }

    let message = body
        .get("message")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .unwrap_or("request failed");
    anyhow::bail!("{} ({})", message, status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn data_envelope_is_unwrapped() {
        let value = unwrap_envelope(200, json!({"success": true, "data": [1, 2]})).unwrap();
        assert_eq!(value, json!([1, 2]));
    }

    #[test]
    fn action_envelope_is_kept() {
        let body = json!({"success": true, "status": 201, "title": "Asset assigned", "reload_table": true, "data": {}});
        let value = unwrap_envelope(201, body.clone()).unwrap();
        assert_eq!(value, body);
    }

    #[test]
    fn error_envelope_becomes_error() {
        let err = unwrap_envelope(409, json!({"success": false, "message": "Asset is already assigned"})).unwrap_err();
        assert_eq!(err.to_string(), "Asset is already assigned (409)");
    }
}
