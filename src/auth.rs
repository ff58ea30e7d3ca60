use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::models::{AuthClaims, User};

/// Token lifetime in seconds.
const TOKEN_TTL_SECS: i64 = 24 * 3600;

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, DEFAULT_COST)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hash)
}

pub fn create_jwt(user: &User, secret: &[u8]) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = AuthClaims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        exp: (Utc::now().timestamp() + TOKEN_TTL_SECS) as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
}

pub fn validate_jwt(token: &str, secret: &[u8]) -> Result<AuthClaims, jsonwebtoken::errors::Error> {
    let token_data = decode::<AuthClaims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(token_data.claims)
}
