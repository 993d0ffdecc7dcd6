use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Claims carried by an access token issued by the hosted auth service.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid, // user id
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64, // expiration timestamp
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Read the claims of an access token handed to us in a recovery link.
///
/// The signing secret stays with the hosted service, so only expiry is
/// checked here; the service verifies the signature again when the token is
/// used to change the password.
pub fn read_claims(token: &str) -> AppResult<Claims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_aud = false;

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| AppError::Unauthorized(format!("Invalid recovery token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(exp_offset: Duration) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            email: Some("ada@example.com".to_string()),
            exp: (now + exp_offset).timestamp(),
            iat: Some(now.timestamp()),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"hosted-service-secret"),
        )
        .unwrap();
        (user_id, token)
    }

    #[test]
    fn test_reads_claims_without_the_secret() {
        let (user_id, token) = token(Duration::hours(1));
        let claims = read_claims(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_rejects_expired_token() {
        let (_, token) = token(Duration::hours(-2));
        assert!(matches!(read_claims(&token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(read_claims("not-a-token").is_err());
    }
}
