use crate::{
    config::Config,
    middleware::auth::Claims,
    utils::error::{internal, AppError},
};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

// Generate JWT token binding the user id and email
pub fn generate_jwt(user_id: &str, email: &str, config: &Config) -> Result<String, AppError> {
    let now = Utc::now();
    let iat = now.timestamp() as usize;
    let exp = (now + Duration::hours(config.token_ttl_hours)).timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        iat,
        exp,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_ref()),
    )
    .map_err(|e| {
        log::error!("❌ Failed to generate token: {}", e);
        AppError::Internal("Could not issue token, please try again later".to_string())
    })
}

// Verify JWT token (signature + expiry)
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &validation)
        .map(|data| data.claims)
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

/// bcrypt is CPU bound, so both helpers run on the blocking pool.
pub async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash(password, cost))
        .await
        .map_err(internal("Password hashing task failed"))?
        .map_err(internal("Could not create user, please try again later"))
}

pub async fn verify_password(password: String, hashed: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify(password, &hashed))
        .await
        .map_err(internal("Password check task failed"))?
        .map_err(internal("Logging in failed, please try again later"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let config = Config::for_tests();
        let token = generate_jwt("65f0c0ffee0000000000beef", "a@x.com", &config).unwrap();

        let claims = verify_token(&token, &config.jwt_secret).unwrap();
        assert_eq!(claims.sub, "65f0c0ffee0000000000beef");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_tokens_are_unique() {
        let config = Config::for_tests();
        let first = generate_jwt("id", "a@x.com", &config).unwrap();
        let second = generate_jwt("id", "a@x.com", &config).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let config = Config::for_tests();
        let issued = Utc::now() - Duration::hours(3);
        let claims = Claims {
            sub: "id".to_string(),
            email: "a@x.com".to_string(),
            iat: issued.timestamp() as usize,
            exp: (issued + Duration::hours(1)).timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_ref()),
        )
        .unwrap();

        let err = verify_token(&token, &config.jwt_secret).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let config = Config::for_tests();
        let token = generate_jwt("id", "a@x.com", &config).unwrap();
        assert!(verify_token(&token, "some-other-secret").is_err());
    }

    #[tokio::test]
    async fn test_password_hash_and_verify() {
        let hashed = hash_password("pw123456".to_string(), 4).await.unwrap();
        assert_ne!(hashed, "pw123456");
        assert!(verify_password("pw123456".to_string(), hashed.clone()).await.unwrap());
        assert!(!verify_password("wrong-password".to_string(), hashed).await.unwrap());
    }
}
