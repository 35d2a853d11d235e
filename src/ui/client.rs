use async_trait::async_trait;
use reqwest::StatusCode;

#[cfg(test)]
use mockall::automock;

use super::UiError;
use crate::api::types::{
    ApiErrorResponse, ApiErrorType, CreateKeyResponse, VerifyKeyRequest, VerifyKeyResponse,
};
use crate::domain::PlaintextKey;

/// The two key endpoints as seen from the client
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KeysApi: Send + Sync {
    /// Mint a key for the signed-in user
    async fn create_key(&self) -> Result<PlaintextKey, UiError>;

    /// `Ok(false)` when the server reports the key invalid
    async fn verify_key(&self, api_key: &str) -> Result<bool, UiError>;
}

/// `KeysApi` over HTTP, sending the session token as a Bearer header
#[derive(Debug, Clone)]
pub struct KeysHttpClient {
    client: reqwest::Client,
    base_url: String,
    session_token: Option<String>,
}

impl KeysHttpClient {
    /// `base_url` is the prefix the `/keys/*` routes hang off, e.g.
    /// `http://localhost:8080` or `http://localhost:3000/api`
    pub fn new(base_url: impl Into<String>, session_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_token,
        }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.client.post(format!("{}{}", self.base_url, path));

        match &self.session_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Error envelope of a failed response, or its raw text
async fn rejected(response: reqwest::Response) -> UiError {
    let status = response.status().as_u16();
    let message = match response.text().await {
        Ok(text) => serde_json::from_str::<ApiErrorResponse>(&text)
            .map(|envelope| envelope.error.message)
            .unwrap_or(text),
        Err(e) => e.to_string(),
    };

    UiError::Rejected { status, message }
}

#[async_trait]
impl KeysApi for KeysHttpClient {
    async fn create_key(&self) -> Result<PlaintextKey, UiError> {
        let response = self
            .post("/keys/create")
            .send()
            .await
            .map_err(|e| UiError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        let created: CreateKeyResponse = response
            .json()
            .await
            .map_err(|e| UiError::Request(format!("Invalid create response: {}", e)))?;

        if created.key.is_empty() {
            return Err(UiError::Request("Server returned an empty key".to_string()));
        }

        Ok(PlaintextKey::new(created.key))
    }

    async fn verify_key(&self, api_key: &str) -> Result<bool, UiError> {
        let response = self
            .post("/keys/verify")
            .json(&VerifyKeyRequest::new(api_key))
            .send()
            .await
            .map_err(|e| UiError::Request(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let verified: VerifyKeyResponse = response
                    .json()
                    .await
                    .map_err(|e| UiError::Request(format!("Invalid verify response: {}", e)))?;
                Ok(verified.valid)
            }
            StatusCode::BAD_REQUEST => {
                let status = response.status().as_u16();
                let text = response
                    .text()
                    .await
                    .map_err(|e| UiError::Request(e.to_string()))?;

                match serde_json::from_str::<ApiErrorResponse>(&text) {
                    Ok(envelope) if envelope.error.error_type == ApiErrorType::InvalidKeyError => {
                        Ok(false)
                    }
                    Ok(envelope) => Err(UiError::Rejected {
                        status,
                        message: envelope.error.message,
                    }),
                    Err(_) => Err(UiError::Rejected { status, message: text }),
                }
            }
            _ => Err(rejected(response).await),
        }
    }
}
