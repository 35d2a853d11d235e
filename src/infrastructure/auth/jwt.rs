//! Session JWT verification with JWKS support

use std::fmt::Debug;

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::domain::{DomainError, Session, SessionVerifier, UserId};

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Authorized party (origin that requested the token)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,
    /// Identity provider session ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
}

/// JWK fields needed for verification
#[derive(Debug, Clone, Deserialize)]
struct JwkKey {
    /// Key type (RSA, EC, oct)
    kty: String,
    kid: Option<String>,
    alg: Option<String>,
    /// Intended use; `enc` keys are skipped
    #[serde(rename = "use")]
    key_use: Option<String>,
    /// RSA modulus (base64url)
    n: Option<String>,
    /// RSA public exponent (base64url)
    e: Option<String>,
    /// Symmetric key value (base64url) for oct keys
    k: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct Jwks {
    keys: Vec<JwkKey>,
}

#[derive(Clone)]
struct VerificationKey {
    kid: Option<String>,
    algorithm: Algorithm,
    key: DecodingKey,
}

/// Verifies identity-provider session tokens
#[derive(Clone)]
pub struct JwtSessionVerifier {
    keys: Vec<VerificationKey>,
    issuer: Option<String>,
    authorized_parties: Vec<String>,
    leeway_secs: u64,
}

impl Debug for JwtSessionVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<String> = self
            .keys
            .iter()
            .map(|k| format!("{:?}:{}", k.algorithm, k.kid.as_deref().unwrap_or("-")))
            .collect();

        f.debug_struct("JwtSessionVerifier")
            .field("keys", &keys)
            .field("issuer", &self.issuer)
            .field("authorized_parties", &self.authorized_parties)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

impl JwtSessionVerifier {
    /// Build a verifier from every key source present in the configuration
    pub fn from_config(config: &SessionConfig) -> Result<Self, DomainError> {
        if !config.has_key_material() {
            return Err(DomainError::configuration(
                "Session verification needs session.secret, session.public_key_pem or session.jwks_json",
            ));
        }

        let mut keys = Vec::new();

        if let Some(secret) = non_blank(&config.secret) {
            keys.push(VerificationKey {
                kid: None,
                algorithm: Algorithm::HS256,
                key: DecodingKey::from_secret(secret.as_bytes()),
            });
        }

        if let Some(pem) = non_blank(&config.public_key_pem) {
            let key = DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
                DomainError::configuration(format!("Invalid session public key: {}", e))
            })?;

            keys.push(VerificationKey {
                kid: None,
                algorithm: Algorithm::RS256,
                key,
            });
        }

        if let Some(jwks_json) = non_blank(&config.jwks_json) {
            keys.extend(parse_jwks(jwks_json)?);
        }

        Ok(Self {
            keys,
            issuer: non_blank(&config.issuer).map(str::to_string),
            authorized_parties: config.authorized_parties.clone(),
            leeway_secs: config.leeway_secs,
        })
    }

    /// Keys that may have signed a token with this header
    fn candidates<'a>(&'a self, header: &'a Header) -> impl Iterator<Item = &'a VerificationKey> {
        self.keys.iter().filter(move |key| {
            key.algorithm == header.alg
                && match (&header.kid, &key.kid) {
                    (Some(wanted), Some(kid)) => wanted == kid,
                    _ => true,
                }
        })
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.leeway = self.leeway_secs;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        validation
    }

    /// Validate a token and return its claims
    pub fn validate(&self, token: &str) -> Result<SessionClaims, DomainError> {
        let header = decode_header(token)
            .map_err(|e| DomainError::unauthenticated(format!("Malformed session token: {}", e)))?;

        let validation = self.validation(header.alg);
        let mut last_error = None;

        for key in self.candidates(&header) {
            match decode::<SessionClaims>(token, &key.key, &validation) {
                Ok(data) => {
                    self.check_authorized_party(&data.claims)?;
                    return Ok(data.claims);
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(match last_error {
            Some(e) => DomainError::unauthenticated(format!("Invalid session token: {}", e)),
            None => DomainError::unauthenticated(format!(
                "No verification key for algorithm {:?}",
                header.alg
            )),
        })
    }

    fn check_authorized_party(&self, claims: &SessionClaims) -> Result<(), DomainError> {
        if self.authorized_parties.is_empty() {
            return Ok(());
        }

        match &claims.azp {
            Some(azp) if !self.authorized_parties.iter().any(|p| p == azp) => Err(
                DomainError::unauthenticated(format!("Unauthorized party: {}", azp)),
            ),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl SessionVerifier for JwtSessionVerifier {
    async fn verify(&self, token: &str) -> Result<Session, DomainError> {
        let claims = self.validate(token)?;

        let user_id = UserId::new(claims.sub)?;
        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0)
            .ok_or_else(|| DomainError::unauthenticated("Session expiry out of range"))?;

        let session = Session::new(user_id, expires_at)
            .with_leeway(Duration::seconds(i64::try_from(self.leeway_secs).unwrap_or(i64::MAX)));

        Ok(match claims.sid {
            Some(sid) => session.with_session_id(sid),
            None => session,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_jwks(jwks_json: &str) -> Result<Vec<VerificationKey>, DomainError> {
    let jwks: Jwks = serde_json::from_str(jwks_json)
        .map_err(|e| DomainError::configuration(format!("Failed to parse JWKS: {}", e)))?;

    let mut keys = Vec::new();

    for jwk in &jwks.keys {
        if jwk.key_use.as_deref() == Some("enc") {
            continue;
        }

        match jwk.kty.as_str() {
            "RSA" => keys.push(rsa_jwk(jwk)?),
            "oct" => keys.push(symmetric_jwk(jwk)?),
            other => {
                warn!(kty = %other, kid = ?jwk.kid, "Skipping unsupported JWK key type");
            }
        }
    }

    if keys.is_empty() {
        return Err(DomainError::configuration("JWKS contains no usable keys"));
    }

    debug!(count = keys.len(), "Loaded session verification keys from JWKS");

    Ok(keys)
}

fn rsa_jwk(jwk: &JwkKey) -> Result<VerificationKey, DomainError> {
    let algorithm = match jwk.alg.as_deref() {
        Some("RS256") | None => Algorithm::RS256,
        Some("RS384") => Algorithm::RS384,
        Some("RS512") => Algorithm::RS512,
        Some(alg) => {
            return Err(DomainError::configuration(format!(
                "Unsupported RSA algorithm: {}",
                alg
            )))
        }
    };

    let n = jwk
        .n
        .as_deref()
        .ok_or_else(|| DomainError::configuration("RSA key missing 'n' (modulus)"))?;
    let e = jwk
        .e
        .as_deref()
        .ok_or_else(|| DomainError::configuration("RSA key missing 'e' (public exponent)"))?;

    let key = DecodingKey::from_rsa_components(n, e)
        .map_err(|e| DomainError::configuration(format!("Invalid RSA JWK: {}", e)))?;

    Ok(VerificationKey {
        kid: jwk.kid.clone(),
        algorithm,
        key,
    })
}

fn symmetric_jwk(jwk: &JwkKey) -> Result<VerificationKey, DomainError> {
    let algorithm = match jwk.alg.as_deref() {
        Some("HS256") | None => Algorithm::HS256,
        Some("HS384") => Algorithm::HS384,
        Some("HS512") => Algorithm::HS512,
        Some(alg) => {
            return Err(DomainError::configuration(format!(
                "Unsupported symmetric algorithm: {}",
                alg
            )))
        }
    };

    let k = jwk
        .k
        .as_deref()
        .ok_or_else(|| DomainError::configuration("Symmetric key missing 'k' value"))?;

    let secret = URL_SAFE_NO_PAD
        .decode(k)
        .map_err(|e| DomainError::configuration(format!("Invalid base64url in JWK 'k': {}", e)))?;

    Ok(VerificationKey {
        kid: jwk.kid.clone(),
        algorithm,
        key: DecodingKey::from_secret(&secret),
    })
}

/// Issues HS256 session tokens for local development
#[derive(Clone)]
pub struct SessionTokenIssuer {
    encoding_key: EncodingKey,
    issuer: Option<String>,
}

impl Debug for SessionTokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenIssuer")
            .field("encoding_key", &"[hidden]")
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl SessionTokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            issuer: None,
        }
    }

    /// Issuer for tokens signed with the configured session secret
    pub fn from_config(config: &SessionConfig) -> Result<Self, DomainError> {
        let secret = non_blank(&config.secret).ok_or_else(|| {
            DomainError::configuration("session.secret is required to issue development sessions")
        })?;

        let mut issuer = Self::new(secret);
        issuer.issuer = non_blank(&config.issuer).map(str::to_string);

        Ok(issuer)
    }

    pub fn issue(&self, user_id: &UserId, ttl: Duration) -> Result<String, DomainError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.as_str().to_string(),
            exp: (now + ttl).timestamp(),
            iat: Some(now.timestamp()),
            nbf: Some(now.timestamp()),
            iss: self.issuer.clone(),
            azp: None,
            sid: Some(format!("sess_{}", uuid::Uuid::new_v4().simple())),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to sign session token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSA_PRIVATE_PEM: &str = include_str!("testdata/rsa_private.pem");
    const RSA_PUBLIC_PEM: &str = include_str!("testdata/rsa_public.pem");
    const RSA_MODULUS: &str = "rD1L2JceJHYevVqWNvmQoN3ql_tTMoZ2RfmjSB0VwIo6BV3hUWOE9ykqokiy6JadT1rhEoHFLTdDWmjo4LcT9Md01CraOyaZ-vUYO_q1itYi805t8CXYCvSLsxvl2jWJftLlhWpIsW39EeW0adTzQtVpxrVRFx5edVBU0c4vqEMOXaRiphaX7aLLMrSxUtdMGDfrFJq22wNRPLCp42S_gGN0qFmMHolglKKdORJHawD31naLtuZqZNRgLFucGfFxOPXin6RLGW7dLSISaT9twTpQl-_5iv0ZHblMdkD0Mm9iXMdKegw2sK1Lwlzu2iTQ6_X8-Vp5Ea9f3CCY4_OsRQ";

    fn secret_config(secret: &str) -> SessionConfig {
        SessionConfig {
            secret: Some(secret.to_string()),
            ..SessionConfig::default()
        }
    }

    fn claims_for(sub: &str, exp_offset: Duration) -> SessionClaims {
        SessionClaims {
            sub: sub.to_string(),
            exp: (Utc::now() + exp_offset).timestamp(),
            iat: Some(Utc::now().timestamp()),
            nbf: None,
            iss: None,
            azp: None,
            sid: None,
        }
    }

    fn sign_hs256(claims: &SessionClaims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn sign_rs256(claims: &SessionClaims, kid: Option<&str>) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = kid.map(str::to_string);

        encode(
            &header,
            claims,
            &EncodingKey::from_rsa_pem(RSA_PRIVATE_PEM.as_bytes()).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_issue_and_verify_roundtrip() {
        let config = secret_config("test-secret-key-12345");
        let issuer = SessionTokenIssuer::from_config(&config).unwrap();
        let verifier = JwtSessionVerifier::from_config(&config).unwrap();

        let user = UserId::new("user_2abc").unwrap();
        let token = issuer.issue(&user, Duration::hours(1)).unwrap();

        let session = verifier.verify(&token).await.unwrap();
        assert_eq!(session.user_id(), &user);
        assert!(session.session_id().unwrap().starts_with("sess_"));
        assert!(!session.is_expired());
    }

    #[test]
    fn test_wrong_secret() {
        let verifier = JwtSessionVerifier::from_config(&secret_config("secret-1")).unwrap();
        let token = sign_hs256(&claims_for("user_1", Duration::hours(1)), "secret-2");

        let err = verifier.validate(&token).unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated { .. }));
    }

    #[test]
    fn test_expired_token() {
        let verifier = JwtSessionVerifier::from_config(&secret_config("test-secret")).unwrap();
        let token = sign_hs256(&claims_for("user_1", Duration::hours(-1)), "test-secret");

        assert!(verifier.validate(&token).is_err());
    }

    #[test]
    fn test_not_yet_valid_token() {
        let verifier = JwtSessionVerifier::from_config(&secret_config("test-secret")).unwrap();
        let mut claims = claims_for("user_1", Duration::hours(2));
        claims.nbf = Some((Utc::now() + Duration::hours(1)).timestamp());

        assert!(verifier.validate(&sign_hs256(&claims, "test-secret")).is_err());
    }

    #[test]
    fn test_garbage_token() {
        let verifier = JwtSessionVerifier::from_config(&secret_config("test-secret")).unwrap();
        assert!(verifier.validate("not-a-token").is_err());
    }

    #[tokio::test]
    async fn test_empty_subject_is_rejected() {
        let verifier = JwtSessionVerifier::from_config(&secret_config("test-secret")).unwrap();
        let token = sign_hs256(&claims_for("", Duration::hours(1)), "test-secret");

        let err = verifier.verify(&token).await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated { .. }));
    }

    #[test]
    fn test_issuer_must_match() {
        let mut config = secret_config("test-secret");
        config.issuer = Some("https://clerk.example.com".to_string());
        let verifier = JwtSessionVerifier::from_config(&config).unwrap();

        let mut claims = claims_for("user_1", Duration::hours(1));
        claims.iss = Some("https://evil.example.com".to_string());
        assert!(verifier.validate(&sign_hs256(&claims, "test-secret")).is_err());

        claims.iss = Some("https://clerk.example.com".to_string());
        assert!(verifier.validate(&sign_hs256(&claims, "test-secret")).is_ok());
    }

    #[test]
    fn test_authorized_parties() {
        let mut config = secret_config("test-secret");
        config.authorized_parties = vec!["http://localhost:8080".to_string()];
        let verifier = JwtSessionVerifier::from_config(&config).unwrap();

        let mut claims = claims_for("user_1", Duration::hours(1));
        claims.azp = Some("https://elsewhere.example.com".to_string());
        assert!(verifier.validate(&sign_hs256(&claims, "test-secret")).is_err());

        claims.azp = Some("http://localhost:8080".to_string());
        assert!(verifier.validate(&sign_hs256(&claims, "test-secret")).is_ok());
    }

    #[test]
    fn test_rs256_public_key() {
        let config = SessionConfig {
            public_key_pem: Some(RSA_PUBLIC_PEM.to_string()),
            ..SessionConfig::default()
        };
        let verifier = JwtSessionVerifier::from_config(&config).unwrap();

        let token = sign_rs256(&claims_for("user_rsa", Duration::hours(1)), None);
        let claims = verifier.validate(&token).unwrap();

        assert_eq!(claims.sub, "user_rsa");
    }

    #[test]
    fn test_hs256_token_rejected_by_rsa_only_verifier() {
        let config = SessionConfig {
            public_key_pem: Some(RSA_PUBLIC_PEM.to_string()),
            ..SessionConfig::default()
        };
        let verifier = JwtSessionVerifier::from_config(&config).unwrap();

        let token = sign_hs256(&claims_for("user_1", Duration::hours(1)), RSA_PUBLIC_PEM);
        assert!(verifier.validate(&token).is_err());
    }

    #[test]
    fn test_jwks_rsa_selected_by_kid() {
        let jwks_json = format!(
            r#"{{
            "keys": [
                {{ "kty": "oct", "kid": "other", "alg": "HS256", "k": "{}" }},
                {{ "kty": "RSA", "kid": "ins_1", "alg": "RS256", "use": "sig", "n": "{}", "e": "AQAB" }}
            ]
        }}"#,
            URL_SAFE_NO_PAD.encode("some-other-secret"),
            RSA_MODULUS
        );

        let config = SessionConfig {
            jwks_json: Some(jwks_json),
            ..SessionConfig::default()
        };
        let verifier = JwtSessionVerifier::from_config(&config).unwrap();

        let token = sign_rs256(&claims_for("user_jwks", Duration::hours(1)), Some("ins_1"));
        assert_eq!(verifier.validate(&token).unwrap().sub, "user_jwks");

        let unknown_kid = sign_rs256(&claims_for("user_jwks", Duration::hours(1)), Some("ins_2"));
        assert!(verifier.validate(&unknown_kid).is_err());
    }

    #[test]
    fn test_jwks_oct_key() {
        let secret = "super-secret-key-for-testing-purposes-12345678";
        let jwks_json = format!(
            r#"{{ "keys": [ {{ "kty": "oct", "kid": "k1", "alg": "HS256", "k": "{}" }} ] }}"#,
            URL_SAFE_NO_PAD.encode(secret)
        );

        let config = SessionConfig {
            jwks_json: Some(jwks_json),
            ..SessionConfig::default()
        };
        let verifier = JwtSessionVerifier::from_config(&config).unwrap();

        let token = sign_hs256(&claims_for("user_oct", Duration::hours(1)), secret);
        assert_eq!(verifier.validate(&token).unwrap().sub, "user_oct");
    }

    #[test]
    fn test_jwks_invalid_json() {
        let config = SessionConfig {
            jwks_json: Some("not valid json".to_string()),
            ..SessionConfig::default()
        };
        assert!(JwtSessionVerifier::from_config(&config).is_err());
    }

    #[test]
    fn test_jwks_without_usable_keys() {
        let config = SessionConfig {
            jwks_json: Some(r#"{"keys": [{"kty": "EC", "kid": "ec1"}]}"#.to_string()),
            ..SessionConfig::default()
        };
        assert!(JwtSessionVerifier::from_config(&config).is_err());
    }

    #[test]
    fn test_missing_key_material() {
        let err = JwtSessionVerifier::from_config(&SessionConfig::default()).unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));

        let err = JwtSessionVerifier::from_config(&secret_config("   ")).unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_expiry_within_leeway_is_live() {
        let config = SessionConfig {
            leeway_secs: 5,
            ..secret_config("test-secret")
        };
        let verifier = JwtSessionVerifier::from_config(&config).unwrap();
        let token = sign_hs256(&claims_for("user_1", Duration::seconds(-2)), "test-secret");

        let session = verifier.verify(&token).await.unwrap();
        assert!(!session.is_expired());
    }

    #[test]
    fn test_issuer_requires_secret() {
        assert!(SessionTokenIssuer::from_config(&SessionConfig::default()).is_err());
    }

    #[test]
    fn test_debug_hides_key_material() {
        let verifier = JwtSessionVerifier::from_config(&secret_config("hidden-secret")).unwrap();
        let rendered = format!("{:?}", verifier);

        assert!(!rendered.contains("hidden-secret"));
        assert!(rendered.contains("HS256"));
    }
}
