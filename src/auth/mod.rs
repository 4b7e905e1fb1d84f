pub mod password;
pub mod role;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{SecurityConfig, MAX_JWT_EXPIRY_HOURS};

pub use password::{hash_password, verify_password};
pub use role::{parse_allowed_groups, Capabilities, Role};

/// Session token claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub allowed_groups: BTreeSet<String>,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Token expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Signing and verification keys, built once from configuration
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    expiry: Duration,
}

impl JwtKeys {
    pub fn from_config(security: &SecurityConfig) -> Self {
        let secret = security.jwt_secret.as_bytes();
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret)),
            decoding: Arc::new(DecodingKey::from_secret(secret)),
            expiry: token_lifetime(security.jwt_expiry_hours),
        }
    }

    /// Token lifetime in seconds
    pub fn expires_in(&self) -> i64 {
        self.expiry.num_seconds()
    }

    pub fn claims_for(
        &self,
        id: i32,
        username: impl Into<String>,
        role: Role,
        allowed_groups: BTreeSet<String>,
    ) -> Claims {
        let now = Utc::now();
        Claims {
            id,
            username: username.into(),
            role,
            allowed_groups,
            exp: (now + self.expiry).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })
    }
}

/// Token lifetime, clamped to the configured maximum so it cannot overflow
fn token_lifetime(hours: u64) -> Duration {
    let hours = hours.clamp(1, MAX_JWT_EXPIRY_HOURS);
    i64::try_from(hours)
        .ok()
        .and_then(Duration::try_hours)
        .unwrap_or_else(|| Duration::days(366))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn keys(secret: &str) -> JwtKeys {
        let mut security = AppConfig::development().security;
        security.jwt_secret = secret.to_string();
        JwtKeys::from_config(&security)
    }

    fn groups(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn claims_round_trip() {
        let keys = keys("unit-test-secret");
        let claims = keys.claims_for(7, "operator1", Role::EntryAdmin, groups(&["Pabrik", "BKS"]));
        assert_eq!(claims.exp - claims.iat, 3600);

        let token = keys.sign(&claims).unwrap();
        let decoded = keys.verify(&token).unwrap();
        assert_eq!(decoded, claims);
        assert!(decoded.allowed_groups.contains("BKS"));
        assert_eq!(keys.expires_in(), 3600);
    }

    #[test]
    fn rejects_foreign_signature() {
        let token = keys("secret-a")
            .sign(&keys("secret-a").claims_for(1, "a", Role::Admin, BTreeSet::new()))
            .unwrap();
        assert!(matches!(keys("secret-b").verify(&token), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let keys = keys("unit-test-secret");
        let mut claims = keys.claims_for(1, "a", Role::Superuser, BTreeSet::new());
        claims.iat -= 7200;
        claims.exp -= 7200;
        let token = keys.sign(&claims).unwrap();
        assert!(matches!(keys.verify(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(keys("s").verify("not.a.token"), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn oversized_expiry_is_clamped() {
        let mut security = AppConfig::development().security;
        security.jwt_expiry_hours = 10_000_000_000_000_000;
        let keys = JwtKeys::from_config(&security);
        assert_eq!(keys.expires_in(), (MAX_JWT_EXPIRY_HOURS * 3600) as i64);

        security.jwt_expiry_hours = u64::MAX;
        assert_eq!(JwtKeys::from_config(&security).expires_in(), (MAX_JWT_EXPIRY_HOURS * 3600) as i64);

        security.jwt_expiry_hours = 0;
        assert_eq!(JwtKeys::from_config(&security).expires_in(), 3600);
    }
}
