use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Account id. The token carries nothing else about the account.
    sub: i32,
    iat: i64,
    exp: i64,
}

/// Issues and verifies signed, time-limited bearer tokens. Stateless: a
/// token stays valid until its encoded expiry; there is no revocation list.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry: chrono::Duration,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &str, expiry_days: i64) -> Self {
        Self::with_expiry(secret, chrono::Duration::days(expiry_days))
    }

    #[must_use]
    pub fn with_expiry(secret: &str, expiry: chrono::Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry,
        }
    }

    pub fn issue(&self, account_id: i32) -> Result<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.expiry)
            .context("Invalid expiry timestamp")?;

        let claims = Claims {
            sub: account_id,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).context("Failed to sign token")
    }

    /// Fail-closed verification: parse failure, signature mismatch, and
    /// expiry all collapse to `None`. The reason is logged at debug level
    /// and never surfaced to callers.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<i32> {
        match decode::<Claims>(token, &self.decoding, &Validation::default()) {
            Ok(data) => Some(data.claims.sub),
            Err(e) => {
                debug!("Token rejected: {e}");
                None
            }
        }
    }

    #[must_use]
    pub const fn expiry_seconds(&self) -> i64 {
        self.expiry.num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_round_trip() {
        let tokens = TokenService::new("test-secret-key-12345", 7);

        let token = tokens.issue(42).unwrap();
        assert!(!token.is_empty());

        assert_eq!(tokens.verify(&token), Some(42));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let tokens = TokenService::new("test-secret-key-12345", 7);
        assert_eq!(tokens.verify("not.a.token"), None);
        assert_eq!(tokens.verify(""), None);
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let tokens = TokenService::new("test-secret-key-12345", 7);
        let token = tokens.issue(7).unwrap();

        // Flip one byte inside the signature segment.
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });
        assert_ne!(token, tampered);

        assert_eq!(tokens.verify(&tampered), None);
    }

    #[test]
    fn test_expired_token_rejected() {
        // Expiry far enough in the past to clear default validation leeway.
        let tokens =
            TokenService::with_expiry("test-secret-key-12345", chrono::Duration::minutes(-5));
        let token = tokens.issue(7).unwrap();

        assert_eq!(tokens.verify(&token), None);
    }

    #[test]
    fn test_different_secrets_reject() {
        let issuer = TokenService::new("secret-one", 7);
        let verifier = TokenService::new("secret-two", 7);

        let token = issuer.issue(7).unwrap();
        assert_eq!(verifier.verify(&token), None);
    }
}
