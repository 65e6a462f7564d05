use crate::models::Claims;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

/// Verify an HS256 token issued by the identity provider.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}
