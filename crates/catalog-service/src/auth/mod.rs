//! API Gateway authorizers.

pub mod basic;

pub use basic::{
    authorize, AuthError, AuthorizerResponse, CredentialSource, Effect, EnvCredentials,
    CREDENTIAL_ENV_PREFIX,
    TokenAuthorizerRequest,
};
