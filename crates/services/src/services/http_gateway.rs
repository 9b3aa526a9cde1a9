//! [`FormGateway`] implementation backed by the `/api` surface.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::warn;
use utils::CALLER_ID_HEADER;
use uuid::Uuid;

use super::form_session::{FormGateway, GatewayError};

/// Talks to `{base_url}/api/{collection}` on behalf of one caller.
/// Every request carries the caller id header.
#[derive(Debug, Clone)]
pub struct HttpFormGateway {
    client: Client,
    base_url: String,
    caller_id: Uuid,
}

impl HttpFormGateway {
    pub fn new(base_url: impl Into<String>, caller_id: Uuid) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            caller_id,
        }
    }

    async fn send(
        &self,
        method: Method,
        path: String,
        body: Option<Value>,
    ) -> Result<Value, GatewayError> {
        let url = format!("{}/api/{path}", self.base_url);
        let mut request = self
            .client
            .request(method, &url)
            .header(CALLER_ID_HEADER, self.caller_id.to_string());
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        let status = response.status();

        if status.is_success() {
            return response
                .json::<Value>()
                .await
                .map_err(|err| GatewayError::Transport(err.to_string()));
        }

        // Error bodies are plain text.
        let message = response.text().await.unwrap_or_default();
        warn!(%status, %url, "api request rejected: {message}");
        Err(match status {
            StatusCode::UNAUTHORIZED => GatewayError::Unauthorized,
            StatusCode::NOT_FOUND => GatewayError::NotFound,
            StatusCode::BAD_REQUEST => GatewayError::Rejected(message),
            StatusCode::CONFLICT => GatewayError::Conflict(message),
            _ => GatewayError::Internal,
        })
    }
}

#[async_trait]
impl FormGateway for HttpFormGateway {
    async fn create(&self, collection: &str, body: Value) -> Result<Value, GatewayError> {
        self.send(Method::POST, collection.to_string(), Some(body)).await
    }

    async fn update(
        &self,
        collection: &str,
        id: Uuid,
        body: Value,
    ) -> Result<Value, GatewayError> {
        self.send(Method::PATCH, format!("{collection}/{id}"), Some(body)).await
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<Value, GatewayError> {
        self.send(Method::DELETE, format!("{collection}/{id}"), None).await
    }
}
