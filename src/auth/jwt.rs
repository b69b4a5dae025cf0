use crate::core::errors::CarebookError;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // admin email or user record id
    pub role: Role,
    pub iat: u64,
    pub exp: u64,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

fn now_secs() -> Result<u64, CarebookError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| CarebookError::InternalServerError(format!("Time error: {}", e)))
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        JwtService {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue_token(&self, subject: &str, role: Role, ttl: Duration) -> Result<String, CarebookError> {
        let iat = now_secs()?;
        self.encode_claims(&Claims {
            sub: subject.to_string(),
            role,
            iat,
            exp: iat + ttl.as_secs(),
        })
    }

    pub fn encode_claims(&self, claims: &Claims) -> Result<String, CarebookError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| CarebookError::InternalServerError(format!("JWT encoding error: {}", e)))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, CarebookError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| CarebookError::InvalidToken(e.to_string()))?;
        Ok(token_data.claims)
    }
}
