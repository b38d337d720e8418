//! Utilidades JWT
//!
//! Emisión y verificación de los tokens de sesión (HS256).

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::environment::EnvironmentConfig,
    models::role::Role,
    utils::errors::AppError,
};

/// Claims del JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,   // user_id
    pub email: String,
    pub role: Role,
    pub exp: usize,    // expiration timestamp
    pub iat: usize,    // issued at timestamp
}

/// Configuración de JWT
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration: u64,
}

impl From<&EnvironmentConfig> for JwtConfig {
    fn from(config: &EnvironmentConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expiration: config.jwt_expiration,
        }
    }
}

/// Token emitido junto con su fecha de expiración
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Generar JWT token para un usuario
pub fn generate_token(
    user_id: Uuid,
    email: &str,
    role: Role,
    config: &JwtConfig,
) -> Result<IssuedToken, AppError> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::seconds(config.expiration as i64);

    let claims = JwtClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    let encoding_key = EncodingKey::from_secret(config.secret.as_ref());

    let token = encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| AppError::Jwt(format!("Error generando token: {}", e)))?;

    Ok(IssuedToken { token, expires_at })
}

/// Verificar y decodificar JWT token
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<JwtClaims, AppError> {
    let decoding_key = DecodingKey::from_secret(config.secret.as_ref());
    let token_data = decode::<JwtClaims>(token, &decoding_key, &Validation::default())?;
    Ok(token_data.claims)
}

/// Extraer token del header Authorization
pub fn extract_token_from_header(auth_header: &str) -> Result<&str, AppError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Header Authorization debe comenzar con 'Bearer '".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AppError::Unauthorized("Token no puede estar vacío".to_string()));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            expiration: 3600,
        }
    }

    #[test]
    fn test_generate_and_verify_token() {
        let user_id = Uuid::new_v4();
        let issued = generate_token(user_id, "owner@example.com", Role::Owner, &config()).unwrap();

        let claims = verify_token(&issued.token, &config()).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "owner@example.com");
        assert_eq!(claims.role, Role::Owner);
        assert!(issued.expires_at > Utc::now());
    }

    #[test]
    fn test_verify_rejects_other_secret() {
        let issued = generate_token(Uuid::new_v4(), "a@b.com", Role::Customer, &config()).unwrap();
        let other = JwtConfig {
            secret: "another-secret".to_string(),
            expiration: 3600,
        };
        assert!(matches!(verify_token(&issued.token, &other), Err(AppError::Jwt(_))));
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let claims = JwtClaims {
            sub: Uuid::new_v4().to_string(),
            email: "a@b.com".to_string(),
            role: Role::Customer,
            exp: (Utc::now().timestamp() - 3600) as usize,
            iat: (Utc::now().timestamp() - 7200) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(verify_token(&token, &config()).is_err());
    }

    #[test]
    fn test_extract_token_from_header() {
        assert_eq!(extract_token_from_header("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
        assert!(extract_token_from_header("Basic abc").is_err());
        assert!(extract_token_from_header("Bearer ").is_err());
    }
}
