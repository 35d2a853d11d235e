//! Wire types for the key endpoints

use serde::{Deserialize, Serialize};

/// `POST /keys/verify` body
///
/// `apiKey` is optional on the wire so a missing field is reported as a
/// validation error rather than a JSON data error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyKeyRequest {
    #[serde(rename = "apiKey", default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl VerifyKeyRequest {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
        }
    }
}

/// `POST /keys/create` success body; the only place a plaintext key leaves the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateKeyResponse {
    pub key: String,
}

/// `POST /keys/verify` success body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyKeyResponse {
    pub valid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_verify_request_field_name() {
        let request: VerifyKeyRequest = serde_json::from_value(json!({"apiKey": "k"})).unwrap();
        assert_eq!(request.api_key.as_deref(), Some("k"));

        let request: VerifyKeyRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.api_key.is_none());

        assert_eq!(serde_json::to_value(VerifyKeyRequest::new("k")).unwrap(), json!({"apiKey": "k"}));
    }

    #[test]
    fn test_verify_request_ignores_snake_case() {
        let request: VerifyKeyRequest = serde_json::from_value(json!({"api_key": "k"})).unwrap();
        assert!(request.api_key.is_none());
    }
}
