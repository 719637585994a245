use onboarding::error::AppError;
use onboarding::workflows::onboarding::{AuthError, Claims, ClaimsDecoder, SigningKey, Submission};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Opaque tokens issued in-process for the demo. Each token remembers the
/// key it was minted under and only decodes against that key.
#[derive(Default)]
pub(crate) struct DemoTokens {
    issued: Mutex<HashMap<String, (SigningKey, Claims)>>,
}

impl DemoTokens {
    pub(crate) fn issue(&self, key: &SigningKey, claims: Value) -> Result<String, AuthError> {
        let Value::Object(claims) = claims else {
            return Err(AuthError::InvalidClaims);
        };
        let mut issued = self.issued.lock().map_err(|_| AuthError::InvalidToken)?;
        let token = format!("demo.{}", issued.len() + 1);
        issued.insert(token.clone(), (key.clone(), claims));
        Ok(token)
    }
}

impl ClaimsDecoder for DemoTokens {
    fn decode(&self, token: &str, key: &SigningKey) -> Result<Claims, AuthError> {
        let issued = self.issued.lock().map_err(|_| AuthError::InvalidToken)?;
        match issued.get(token) {
            Some((minted_with, claims)) if minted_with == key => Ok(claims.clone()),
            _ => Err(AuthError::InvalidToken),
        }
    }
}

pub(crate) fn read_submission(path: &Path) -> Result<Submission, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
