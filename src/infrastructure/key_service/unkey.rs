use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    DomainError, IssuedApiKey, KeyService, KeyVerification, NewApiKey, PlaintextKey,
    VerificationCode,
};
use crate::infrastructure::http_client::{HttpClientTrait, JsonResponse};

const DEFAULT_UNKEY_BASE_URL: &str = "https://api.unkey.dev";
const SERVICE_NAME: &str = "unkey";

/// Unkey v1 HTTP API client
#[derive(Debug)]
pub struct UnkeyKeyService<C: HttpClientTrait> {
    client: C,
    api_id: String,
    auth_header: String,
    base_url: String,
}

impl<C: HttpClientTrait> UnkeyKeyService<C> {
    pub fn new(client: C, root_key: impl Into<String>, api_id: impl Into<String>) -> Self {
        Self::with_base_url(client, root_key, api_id, DEFAULT_UNKEY_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        root_key: impl Into<String>,
        api_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", root_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            api_id: api_id.into(),
            auth_header,
            base_url,
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/v1/{}", self.base_url, endpoint)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse<T: serde::de::DeserializeOwned>(
        &self,
        response: JsonResponse,
        operation: &str,
    ) -> Result<T, DomainError> {
        if !response.is_success() {
            return Err(upstream_error(response));
        }

        serde_json::from_value(response.body).map_err(|e| {
            DomainError::upstream(
                SERVICE_NAME,
                format!("Failed to parse {} response: {}", operation, e),
            )
        })
    }
}

/// Turn a non-2xx response into an upstream error, keeping the service's code
fn upstream_error(response: JsonResponse) -> DomainError {
    match serde_json::from_value::<UnkeyErrorEnvelope>(response.body.clone()) {
        Ok(envelope) => {
            let detail = envelope.error;
            let message = match detail.request_id {
                Some(request_id) => format!("{} (request {})", detail.message, request_id),
                None => detail.message,
            };

            DomainError::upstream_with_code(SERVICE_NAME, detail.code, message)
        }
        Err(_) => DomainError::upstream(
            SERVICE_NAME,
            format!("HTTP {}: {}", response.status, response.body),
        ),
    }
}

#[async_trait]
impl<C: HttpClientTrait> KeyService for UnkeyKeyService<C> {
    async fn create_key(&self, request: NewApiKey) -> Result<IssuedApiKey, DomainError> {
        let body = serde_json::to_value(CreateKeyRequest {
            api_id: &self.api_id,
            external_id: request.external_id.as_str(),
            prefix: &request.prefix,
            enabled: request.enabled,
        })
        .map_err(|e| DomainError::internal(format!("Failed to encode request: {}", e)))?;

        let response = self
            .client
            .post_json(&self.url("keys.createKey"), self.headers(), &body)
            .await?;

        let created: CreateKeyResponse = self.parse(response, "createKey")?;

        if created.key.is_empty() {
            return Err(DomainError::upstream(SERVICE_NAME, "createKey returned an empty key"));
        }

        debug!(key_id = %created.key_id, "Key created");

        Ok(IssuedApiKey {
            key_id: created.key_id,
            key: PlaintextKey::new(created.key),
        })
    }

    async fn verify_key(&self, key: &str) -> Result<KeyVerification, DomainError> {
        let body = serde_json::to_value(VerifyKeyRequest {
            api_id: &self.api_id,
            key,
        })
        .map_err(|e| DomainError::internal(format!("Failed to encode request: {}", e)))?;

        let response = self
            .client
            .post_json(&self.url("keys.verifyKey"), self.headers(), &body)
            .await?;

        let verified: VerifyKeyResponse = self.parse(response, "verifyKey")?;

        let code = verified
            .code
            .map(VerificationCode::from)
            .unwrap_or(if verified.valid {
                VerificationCode::Valid
            } else {
                VerificationCode::NotFound
            });

        Ok(KeyVerification {
            valid: verified.valid,
            code,
            key_id: verified.key_id,
            external_id: verified.identity.map(|identity| identity.external_id),
        })
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        let response = self.client.get_json(&self.url("liveness"), vec![]).await?;

        if response.is_success() {
            Ok(())
        } else {
            Err(upstream_error(response))
        }
    }

    fn service_name(&self) -> &'static str {
        SERVICE_NAME
    }
}

// Wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateKeyRequest<'a> {
    api_id: &'a str,
    external_id: &'a str,
    prefix: &'a str,
    enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateKeyResponse {
    key_id: String,
    key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyKeyRequest<'a> {
    api_id: &'a str,
    key: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyKeyResponse {
    valid: bool,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    key_id: Option<String>,
    #[serde(default)]
    identity: Option<VerifiedIdentity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifiedIdentity {
    external_id: String,
}

#[derive(Debug, Deserialize)]
struct UnkeyErrorEnvelope {
    error: UnkeyErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnkeyErrorDetail {
    code: String,
    message: String,
    #[serde(default)]
    request_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use crate::infrastructure::http_client::mock::MockHttpClient;
    use crate::infrastructure::http_client::HttpClient;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BASE: &str = "http://unkey.test";

    fn new_key() -> NewApiKey {
        NewApiKey::for_owner(UserId::new("user_42").unwrap(), "rhr_scouting")
    }

    fn service(client: MockHttpClient) -> UnkeyKeyService<MockHttpClient> {
        UnkeyKeyService::with_base_url(client, "unkey_root", "api_123", BASE)
    }

    #[tokio::test]
    async fn test_create_key_sends_owner_prefix_and_enabled() {
        let client = MockHttpClient::new().with_response(
            format!("{}/v1/keys.createKey", BASE),
            200,
            json!({"keyId": "key_1", "key": "rhr_scouting_abc"}),
        );
        let service = service(client);

        let issued = service.create_key(new_key()).await.unwrap();

        assert_eq!(issued.key_id, "key_1");
        assert_eq!(issued.key.expose(), "rhr_scouting_abc");

        let requests = service.client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].1,
            json!({
                "apiId": "api_123",
                "externalId": "user_42",
                "prefix": "rhr_scouting",
                "enabled": true
            })
        );
    }

    #[tokio::test]
    async fn test_create_key_error_keeps_upstream_detail() {
        let client = MockHttpClient::new().with_response(
            format!("{}/v1/keys.createKey", BASE),
            403,
            json!({"error": {
                "code": "INSUFFICIENT_PERMISSIONS",
                "message": "root key lacks api.*.create_key",
                "docs": "https://unkey.dev/docs/api-reference/errors/code/INSUFFICIENT_PERMISSIONS",
                "requestId": "req_9"
            }}),
        );

        let err = service(client).create_key(new_key()).await.unwrap_err();

        match err {
            DomainError::Upstream { service, code, message } => {
                assert_eq!(service, "unkey");
                assert_eq!(code.as_deref(), Some("INSUFFICIENT_PERMISSIONS"));
                assert!(message.contains("root key lacks"));
                assert!(message.contains("req_9"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_key_rejects_empty_key() {
        let client = MockHttpClient::new().with_response(
            format!("{}/v1/keys.createKey", BASE),
            200,
            json!({"keyId": "key_1", "key": ""}),
        );

        assert!(service(client).create_key(new_key()).await.unwrap_err().is_upstream());
    }

    #[tokio::test]
    async fn test_create_key_transport_failure() {
        let client = MockHttpClient::new()
            .with_error(format!("{}/v1/keys.createKey", BASE), "connection reset");

        assert!(service(client).create_key(new_key()).await.unwrap_err().is_upstream());
    }

    #[tokio::test]
    async fn test_verify_valid_key() {
        let client = MockHttpClient::new().with_response(
            format!("{}/v1/keys.verifyKey", BASE),
            200,
            json!({
                "valid": true,
                "code": "VALID",
                "keyId": "key_1",
                "enabled": true,
                "identity": {"id": "id_1", "externalId": "user_42"}
            }),
        );
        let service = service(client);

        let verification = service.verify_key("rhr_scouting_abc").await.unwrap();

        assert!(verification.valid);
        assert_eq!(verification.code, VerificationCode::Valid);
        assert_eq!(verification.key_id.as_deref(), Some("key_1"));
        assert_eq!(verification.external_id.as_deref(), Some("user_42"));

        let requests = service.client.requests();
        assert_eq!(requests[0].1, json!({"apiId": "api_123", "key": "rhr_scouting_abc"}));
    }

    #[tokio::test]
    async fn test_verify_invalid_key() {
        let client = MockHttpClient::new().with_response(
            format!("{}/v1/keys.verifyKey", BASE),
            200,
            json!({"valid": false, "code": "NOT_FOUND"}),
        );

        let verification = service(client).verify_key("nope").await.unwrap();

        assert!(!verification.valid);
        assert_eq!(verification.code, VerificationCode::NotFound);
        assert!(verification.external_id.is_none());
    }

    #[tokio::test]
    async fn test_verify_without_code_defaults_by_validity() {
        let client = MockHttpClient::new().with_response(
            format!("{}/v1/keys.verifyKey", BASE),
            200,
            json!({"valid": false}),
        );

        let verification = service(client).verify_key("nope").await.unwrap();
        assert_eq!(verification.code, VerificationCode::NotFound);
    }

    #[tokio::test]
    async fn test_verify_unparseable_body() {
        let client = MockHttpClient::new().with_response(
            format!("{}/v1/keys.verifyKey", BASE),
            200,
            json!("<html>maintenance</html>"),
        );

        assert!(service(client).verify_key("k").await.unwrap_err().is_upstream());
    }

    #[tokio::test]
    async fn test_non_envelope_error_body() {
        let client = MockHttpClient::new().with_response(
            format!("{}/v1/keys.verifyKey", BASE),
            502,
            json!("bad gateway"),
        );

        match service(client).verify_key("k").await.unwrap_err() {
            DomainError::Upstream { code, message, .. } => {
                assert!(code.is_none());
                assert!(message.contains("502"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let healthy = MockHttpClient::new().with_response(
            format!("{}/v1/liveness", BASE),
            200,
            json!({"status": "we're so back"}),
        );
        assert!(service(healthy).health_check().await.is_ok());

        let down = MockHttpClient::new().with_response(
            format!("{}/v1/liveness", BASE),
            503,
            serde_json::Value::Null,
        );
        assert!(service(down).health_check().await.is_err());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let service = UnkeyKeyService::with_base_url(
            MockHttpClient::new(),
            "root",
            "api",
            "http://localhost:1234/",
        );
        assert_eq!(service.url("liveness"), "http://localhost:1234/v1/liveness");
        assert_eq!(service.service_name(), "unkey");
    }

    #[tokio::test]
    async fn test_create_key_over_http() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/keys.createKey"))
            .and(header("authorization", "Bearer unkey_root"))
            .and(body_json(json!({
                "apiId": "api_123",
                "externalId": "user_42",
                "prefix": "rhr_scouting",
                "enabled": true
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"keyId": "key_w", "key": "rhr_scouting_wire"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let service =
            UnkeyKeyService::with_base_url(HttpClient::new(), "unkey_root", "api_123", server.uri());

        let issued = service.create_key(new_key()).await.unwrap();
        assert_eq!(issued.key.expose(), "rhr_scouting_wire");
    }

    #[tokio::test]
    async fn test_verify_key_over_http_error_envelope() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/keys.verifyKey"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": {"code": "INTERNAL_SERVER_ERROR", "message": "db down"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service =
            UnkeyKeyService::with_base_url(HttpClient::new(), "unkey_root", "api_123", server.uri());

        match service.verify_key("k").await.unwrap_err() {
            DomainError::Upstream { code, message, .. } => {
                assert_eq!(code.as_deref(), Some("INTERNAL_SERVER_ERROR"));
                assert_eq!(message, "db down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
