use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::config::JwtConfig;
use crate::error::AppError;

use super::Claims;

pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(secret: &str, config: &JwtConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        // HS256 by default
        let mut validation = Validation::default();

        if let Some(ref issuer) = config.issuer {
            validation.set_issuer(&[issuer]);
        }

        if let Some(ref audience) = config.audience {
            validation.set_audience(&[audience]);
        }

        Self {
            decoding_key,
            validation,
        }
    }

    /// Build a validator when a secret is configured.
    pub fn from_config(config: &JwtConfig) -> Option<Self> {
        config
            .secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|secret| Self::new(secret, config))
    }

    pub fn validate(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::Auth(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret-key-for-testing";

    fn create_test_config() -> JwtConfig {
        JwtConfig {
            secret: Some(SECRET.to_string()),
            issuer: None,
            audience: None,
        }
    }

    fn create_test_token(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(exp_offset: i64) -> Claims {
        let now = chrono::Utc::now().timestamp();
        Claims {
            user_id: 7,
            exp: now + exp_offset,
            iat: Some(now),
        }
    }

    #[test]
    fn test_valid_token() {
        let validator = JwtValidator::from_config(&create_test_config()).unwrap();

        let token = create_test_token(&claims(3600), SECRET);
        let validated = validator.validate(&token).unwrap();

        assert_eq!(validated.user_id, 7);
    }

    #[test]
    fn test_invalid_token() {
        let validator = JwtValidator::from_config(&create_test_config()).unwrap();

        assert!(validator.validate("invalid-token").is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let validator = JwtValidator::from_config(&create_test_config()).unwrap();

        let token = create_test_token(&claims(3600), "another-secret");
        assert!(matches!(validator.validate(&token), Err(AppError::Auth(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let validator = JwtValidator::from_config(&create_test_config()).unwrap();

        // Past the default 60s leeway
        let token = create_test_token(&claims(-3600), SECRET);
        assert!(validator.validate(&token).is_err());
    }

    #[test]
    fn test_disabled_without_secret() {
        assert!(JwtValidator::from_config(&JwtConfig::default()).is_none());

        let empty = JwtConfig {
            secret: Some(String::new()),
            ..Default::default()
        };
        assert!(JwtValidator::from_config(&empty).is_none());
    }
}
