use axum::http::{HeaderMap, header::AUTHORIZATION};
use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while issuing, verifying or locating a session token.
#[derive(Error, Debug)]
pub enum TokenError {
    /// No `Authorization` header on the request.
    #[error("Authorization header missing")]
    MissingHeader,

    /// The header is not `Bearer <token>`.
    #[error("Authorization header must be in the format 'Bearer <token>'")]
    MalformedHeader,

    /// Wrong signature, or signed with an algorithm other than HS256.
    #[error("Invalid token signature")]
    InvalidSignature,

    /// The token could not be decoded.
    #[error("Malformed token")]
    MalformedToken,

    /// The `matricula` claim is absent or not a number.
    #[error("Claim 'matricula' missing or invalid")]
    MissingClaim,

    /// The token failed verification while reading its claims.
    #[error("Invalid token")]
    InvalidToken,

    /// The token could not be signed.
    #[error("Failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// Claims carried by a session token.
#[derive(Debug, Serialize)]
struct Claims {
    matricula: i32,
    /// Issue time in unix nanoseconds.
    criacao: i64,
}

/// Claims as read back from a token, tolerating a missing or mistyped subject.
#[derive(Debug, Deserialize)]
struct RawClaims {
    #[serde(default)]
    matricula: Option<SubjectClaim>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SubjectClaim {
    Integer(i64),
    Float(f64),
    Other(serde::de::IgnoredAny),
}

impl SubjectClaim {
    fn as_subject(&self) -> Option<i32> {
        match self {
            SubjectClaim::Integer(n) => i32::try_from(*n).ok(),
            SubjectClaim::Float(f) if f.is_finite() => i32::try_from(f.trunc() as i64).ok(),
            _ => None,
        }
    }
}

/// Issues and verifies HS256 session tokens.
///
/// The key is fixed for the life of the process.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Creates a new `TokenService` signing with `secret`.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Session tokens carry no expiry; the whitelist decides their lifetime.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issues a token for `subject_id`.
    ///
    /// # Arguments
    ///
    /// * `subject_id` - The `matricula` of the logged-in user.
    ///
    /// # Returns
    ///
    /// A `Result` containing the signed token.
    pub fn issue(&self, subject_id: i32) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            matricula: subject_id,
            criacao: now
                .timestamp_nanos_opt()
                .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1_000)),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)
    }

    /// Verifies the algorithm and signature of `token`.
    pub fn validate(&self, token: &str) -> Result<(), TokenError> {
        self.decode(token).map(|_| ())
    }

    /// Verifies `token` and returns the subject id it carries.
    pub fn extract_subject(&self, token: &str) -> Result<i32, TokenError> {
        let claims = self.decode(token).map_err(|e| {
            tracing::debug!("Token verification failed while reading claims: {}", e);
            TokenError::InvalidToken
        })?;

        claims
            .matricula
            .as_ref()
            .and_then(SubjectClaim::as_subject)
            .ok_or(TokenError::MissingClaim)
    }

    fn decode(&self, token: &str) -> Result<RawClaims, TokenError> {
        decode::<RawClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                _ => TokenError::MalformedToken,
            })
    }
}

/// Extracts the bearer token from the `Authorization` header.
pub fn extract_from_request(headers: &HeaderMap) -> Result<String, TokenError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(TokenError::MissingHeader)?
        .to_str()
        .map_err(|_| TokenError::MalformedHeader)?;

    if value.is_empty() {
        return Err(TokenError::MissingHeader);
    }

    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] => Ok((*token).to_string()),
        _ => Err(TokenError::MalformedHeader),
    }
}
