//! # Basic Authorizer
//!
//! A TOKEN authorizer for API Gateway. The token is `Basic base64(user:password)`; the
//! expected password for `user` comes from a [`CredentialSource`] (the process
//! environment in production, where user `alice` is the variable `AUTH__alice`).
//!
//! | Input | Result |
//! |-------|--------|
//! | non-`TOKEN` request, missing or undecodable token | `Err(AuthError::Unauthorized)` (401) |
//! | unknown user or wrong password | `Deny` policy (403) |
//! | matching credentials | `Allow` policy |

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, instrument, warn};

const POLICY_VERSION: &str = "2012-10-17";
const INVOKE_ACTION: &str = "execute-api:Invoke";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Unauthorized")]
    Unauthorized,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAuthorizerRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub authorization_token: Option<String>,
    pub method_arn: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub action: String,
    pub effect: Effect,
    pub resource: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<PolicyStatement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
}

impl AuthorizerResponse {
    pub fn new(principal_id: impl Into<String>, effect: Effect, resource: impl Into<String>) -> Self {
        Self {
            principal_id: principal_id.into(),
            policy_document: PolicyDocument {
                version: POLICY_VERSION.to_string(),
                statement: vec![PolicyStatement {
                    action: INVOKE_ACTION.to_string(),
                    effect,
                    resource: resource.into(),
                }],
            },
        }
    }

    pub fn effect(&self) -> Option<Effect> {
        self.policy_document.statement.first().map(|s| s.effect)
    }
}

/// Looks up the expected password for a user name.
pub trait CredentialSource: Send + Sync {
    fn password(&self, user: &str) -> Option<String>;
}

/// Prefix of the environment variables holding passwords.
pub const CREDENTIAL_ENV_PREFIX: &str = "AUTH__";

/// Passwords stored as `AUTH__<user>` environment variables. Other variables are never
/// read, so configuration values cannot be used as credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn password(&self, user: &str) -> Option<String> {
        if user.is_empty() || user.contains(['=', '\0']) {
            return None;
        }
        std::env::var(format!("{CREDENTIAL_ENV_PREFIX}{user}")).ok()
    }
}

impl CredentialSource for HashMap<String, String> {
    fn password(&self, user: &str) -> Option<String> {
        self.get(user).cloned()
    }
}

/// Compares every byte regardless of where the first mismatch is.
fn passwords_match(supplied: &[u8], expected: &[u8]) -> bool {
    if supplied.len() != expected.len() {
        return false;
    }
    supplied
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

fn decode_credentials(token: &str) -> Result<(String, String), AuthError> {
    let encoded = token.strip_prefix("Basic ").unwrap_or(token).trim();
    let bytes = STANDARD.decode(encoded).map_err(|_| AuthError::Unauthorized)?;
    let decoded = String::from_utf8(bytes).map_err(|_| AuthError::Unauthorized)?;
    let (user, password) = decoded.split_once(':').ok_or(AuthError::Unauthorized)?;
    Ok((user.to_string(), password.to_string()))
}

/// Evaluate one TOKEN authorizer request.
#[instrument(skip_all, fields(method_arn = %request.method_arn))]
pub fn authorize(
    request: &TokenAuthorizerRequest,
    credentials: &dyn CredentialSource,
) -> Result<AuthorizerResponse, AuthError> {
    if request.kind != "TOKEN" {
        warn!(kind = %request.kind, "Not a TOKEN authorizer request");
        return Err(AuthError::Unauthorized);
    }
    let token = match request.authorization_token.as_deref() {
        Some(token) if !token.is_empty() => token,
        _ => {
            info!("No authorization token provided");
            return Err(AuthError::Unauthorized);
        }
    };

    let (user, password) = decode_credentials(token)?;
    let effect = match credentials.password(&user) {
        None => {
            info!(%user, "Unknown user");
            Effect::Deny
        }
        Some(expected) if !passwords_match(password.as_bytes(), expected.as_bytes()) => {
            info!(%user, "Invalid password");
            Effect::Deny
        }
        Some(_) => {
            info!(%user, "Authenticated");
            Effect::Allow
        }
    };

    Ok(AuthorizerResponse::new(user, effect, request.method_arn.clone()))
}
