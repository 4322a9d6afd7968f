use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

/// Claims carried by an identity-provider ID token.
///
/// Only `exp` is mandatory; every identity attribute is optional and
/// defaulted later by [`crate::services::identity::Identity::from_claims`].
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(
        rename = "cognito:username",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        rename = "custom:role",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub exp: usize,
}

pub fn create_jwt(
    sub: &str,
    email: Option<&str>,
    role: Option<&str>,
    ttl: Duration,
    secret: &str,
) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| anyhow::anyhow!("token expiry overflows"))?
        .timestamp();

    let claims = Claims {
        sub: Some(sub.to_owned()),
        email: email.map(str::to_owned),
        custom_role: role.map(str::to_owned),
        exp: expiration as usize,
        ..Default::default()
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;

    Ok(token)
}

/// Verifies signature and expiry. Audience is not checked so tokens minted
/// for any client of the identity provider are accepted.
pub fn validate_jwt(token: &str, config: &AppConfig) -> Result<Claims> {
    let (decoding_key, mut validation) = if let Some(public_key) = &config.jwt_public_key {
        (
            DecodingKey::from_rsa_pem(public_key.as_bytes())?,
            Validation::new(Algorithm::RS256),
        )
    } else {
        if config.jwt_secret.is_empty() {
            anyhow::bail!("no token verification key configured");
        }
        (
            DecodingKey::from_secret(config.jwt_secret.as_ref()),
            Validation::default(),
        )
    };
    validation.validate_aud = false;

    let token_data = decode::<Claims>(token, &decoding_key, &validation)?;

    Ok(token_data.claims)
}
