use std::fmt;

use serde_json::{Map, Value};
use tracing::debug;

use super::domain::{RoleId, UserId};

/// Decoded token payload.
pub type Claims = Map<String, Value>;

const USER_CLAIM: &str = "userId";
const ROLE_CLAIM: &str = "roleId";
const BEARER_PREFIX: &str = "Bearer ";

/// Key material used to verify claims. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(String);

impl SigningKey {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// Verifies a raw token against the signing key and returns its claims.
///
/// Token cryptography lives behind this seam, outside the engine.
pub trait ClaimsDecoder: Send + Sync {
    fn decode(&self, token: &str, key: &SigningKey) -> Result<Claims, AuthError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("need to login as admin to perform this action")]
    MissingCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("user does not have role yet")]
    MissingRole,
    #[error("invalid token claims")]
    InvalidClaims,
}

/// Authenticated caller. Only the guard can produce one, so holding a
/// `Principal` is proof that both identifiers were extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    user_id: UserId,
    role_id: RoleId,
}

impl Principal {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role_id(&self) -> RoleId {
        self.role_id
    }
}

/// Extract the numeric user and role identifiers from claims.
pub fn resolve_principal(claims: &Claims) -> Result<Principal, AuthError> {
    let role_id = numeric_claim(claims, ROLE_CLAIM).ok_or(AuthError::MissingRole)?;
    let user_id = numeric_claim(claims, USER_CLAIM).ok_or(AuthError::InvalidClaims)?;

    Ok(Principal {
        user_id: UserId(user_id),
        role_id: RoleId(role_id),
    })
}

/// JSON numbers only; integral floats such as `7.0` are accepted.
fn numeric_claim(claims: &Claims, name: &str) -> Option<i64> {
    match claims.get(name)? {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|value| value.fract() == 0.0 && value.abs() < i64::MAX as f64)
                .map(|value| value as i64)
        }),
        _ => None,
    }
}

/// Gate in front of every admin operation.
pub struct AccessGuard<D> {
    key: SigningKey,
    decoder: D,
}

impl<D> AccessGuard<D>
where
    D: ClaimsDecoder,
{
    pub fn new(key: SigningKey, decoder: D) -> Self {
        Self { key, decoder }
    }

    /// Authorize from an `Authorization` header value; the `Bearer ` prefix is optional.
    pub fn authorize(&self, authorization: Option<&str>) -> Result<Principal, AuthError> {
        let header = authorization
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(AuthError::MissingCredentials)?;
        let token = header.strip_prefix(BEARER_PREFIX).unwrap_or(header).trim();
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let claims = self.decoder.decode(token, &self.key)?;
        let principal = resolve_principal(&claims).map_err(|err| {
            debug!(error = %err, "claims rejected");
            err
        })?;

        debug!(
            user_id = principal.user_id.0,
            role_id = principal.role_id.0,
            "principal resolved"
        );
        Ok(principal)
    }

    pub fn resolve_principal(&self, claims: &Claims) -> Result<Principal, AuthError> {
        resolve_principal(claims)
    }
}
