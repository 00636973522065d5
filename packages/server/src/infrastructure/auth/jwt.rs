//! JWT を使った AuthService 実装
//!
//! トークンのクレームは `{ id, username, iat, exp }`。`username` が表示名になる。

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use hiroba_shared::time::Clock;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{AuthError, AuthService, DisplayName, Identity, IdentityToken, UserId};

/// Default token lifetime
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(2 * 60 * 60);

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    id: String,
    username: String,
    iat: i64,
    exp: i64,
}

/// HS256 で署名・検証する AuthService
pub struct JwtAuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtAuthService {
    pub fn new(secret: &str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl,
            clock,
        }
    }
}

#[async_trait]
impl AuthService for JwtAuthService {
    fn issue(&self, identity: &Identity) -> Result<IdentityToken, AuthError> {
        let iat = self.clock.now_millis() / 1000;
        let ttl = i64::try_from(self.ttl.as_secs()).map_err(|e| AuthError::Issue(e.to_string()))?;
        let claims = Claims {
            id: identity.user_id.as_str().to_string(),
            username: identity.display_name.as_str().to_string(),
            iat,
            exp: iat.saturating_add(ttl),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map(IdentityToken::new)
            .map_err(|e| AuthError::Issue(e.to_string()))
    }

    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                AuthError::InvalidToken
            })?;

        let user_id = UserId::new(data.claims.id).map_err(|_| AuthError::InvalidToken)?;
        let display_name =
            DisplayName::new(data.claims.username).map_err(|_| AuthError::InvalidToken)?;
        Ok(Identity::new(user_id, display_name))
    }
}
