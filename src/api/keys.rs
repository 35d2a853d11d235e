//! Key endpoints: mint a key for the signed-in user, verify a candidate key

use std::time::Instant;

use axum::{extract::State, routing::post, Router};
use sha2::{Digest, Sha256};
use tracing::{error, info};

use crate::api::middleware::RequireSession;
use crate::api::state::AppState;
use crate::api::types::{ApiError, CreateKeyResponse, Json, VerifyKeyRequest, VerifyKeyResponse};
use crate::domain::{validate_candidate_key, DomainError, NewApiKey};
use crate::infrastructure::observability::{record_key_operation, KeyOperation, KeyOperationOutcome};

/// Hex characters of the candidate key digest written to logs
const FINGERPRINT_LENGTH: usize = 12;

/// Routes mounted under `/keys`
pub fn create_keys_router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_key))
        .route("/verify", post(verify_key))
}

/// POST /keys/create
///
/// The plaintext key is returned exactly once and never logged.
pub async fn create_key(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
) -> Result<Json<CreateKeyResponse>, ApiError> {
    let owner = session.user_id().clone();
    let request = NewApiKey::for_owner(owner.clone(), state.key_prefix.as_str());

    let start = Instant::now();
    let result = state.key_service.create_key(request).await;
    let elapsed = start.elapsed();

    match result {
        Ok(issued) => {
            record_key_operation(KeyOperation::Create, KeyOperationOutcome::Issued, elapsed);
            info!(user_id = %owner, key_id = %issued.key_id, "API key issued");

            Ok(Json(CreateKeyResponse {
                key: issued.key.into_inner(),
            }))
        }
        Err(e) => {
            record_key_operation(KeyOperation::Create, KeyOperationOutcome::UpstreamError, elapsed);
            error!(user_id = %owner, error = %e, "Failed to create API key");

            Err(e.into())
        }
    }
}

/// POST /keys/verify
///
/// Key service failures are logged and answered with an opaque 500.
pub async fn verify_key(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    Json(body): Json<VerifyKeyRequest>,
) -> Result<Json<VerifyKeyResponse>, ApiError> {
    let candidate = validate_candidate_key(body.api_key.as_deref()).map_err(DomainError::from)?;
    let fingerprint = key_fingerprint(candidate);
    let user_id = session.user_id();

    let start = Instant::now();
    let result = state.key_service.verify_key(candidate).await;
    let elapsed = start.elapsed();

    match result {
        Ok(verification) if verification.valid => {
            record_key_operation(KeyOperation::Verify, KeyOperationOutcome::Valid, elapsed);
            info!(
                user_id = %user_id,
                key = %fingerprint,
                key_id = verification.key_id.as_deref().unwrap_or("-"),
                "API key verified"
            );

            Ok(Json(VerifyKeyResponse { valid: true }))
        }
        Ok(verification) => {
            record_key_operation(KeyOperation::Verify, KeyOperationOutcome::Invalid, elapsed);
            info!(
                user_id = %user_id,
                key = %fingerprint,
                code = %verification.code,
                "API key rejected"
            );

            Err(DomainError::invalid_key(verification.code.as_str()).into())
        }
        Err(e) => {
            record_key_operation(KeyOperation::Verify, KeyOperationOutcome::UpstreamError, elapsed);
            error!(user_id = %user_id, key = %fingerprint, error = %e, "Failed to verify API key");

            Err(ApiError::opaque())
        }
    }
}

/// Short SHA-256 digest used to correlate a candidate key across log lines
fn key_fingerprint(key: &str) -> String {
    let digest = hex::encode(Sha256::digest(key.as_bytes()));
    digest[..FINGERPRINT_LENGTH].to_string()
}
