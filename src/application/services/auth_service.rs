//! Signed user identity cookies.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::utils::id_generator::random_id;

type HmacSha256 = Hmac<Sha256>;

/// Name of the cookie carrying the signed user ID.
pub const AUTH_COOKIE: &str = "auth_token";

/// Issues and verifies user identity tokens.
///
/// A token has the form `<user_id>.<signature>`, where the signature is the
/// hex-encoded HMAC-SHA256 of the user ID keyed by the server secret. Users
/// are anonymous: a client without a valid token simply gets a new ID.
pub struct UserAuthService {
    signing_secret: String,
}

impl UserAuthService {
    pub fn new(signing_secret: impl Into<String>) -> Self {
        Self {
            signing_secret: signing_secret.into(),
        }
    }

    fn mac(&self, user_id: &str) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(user_id.as_bytes());
        mac
    }

    /// Generates a fresh anonymous user ID.
    pub fn new_user_id() -> String {
        random_id()
    }

    /// Builds the signed token for `user_id`.
    pub fn issue_token(&self, user_id: &str) -> String {
        let signature = hex::encode(self.mac(user_id).finalize().into_bytes());
        format!("{user_id}.{signature}")
    }

    /// Returns the user ID carried by `token` if its signature is valid.
    ///
    /// The comparison is constant-time.
    pub fn verify_token(&self, token: &str) -> Option<String> {
        let (user_id, signature) = token.rsplit_once('.')?;
        if user_id.is_empty() {
            return None;
        }

        let signature = hex::decode(signature).ok()?;
        self.mac(user_id)
            .verify_slice(&signature)
            .ok()
            .map(|()| user_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> UserAuthService {
        UserAuthService::new("test-signing-secret")
    }

    #[test]
    fn test_issued_token_verifies() {
        let svc = service();
        let token = svc.issue_token("user-1");

        assert!(token.starts_with("user-1."));
        assert_eq!(svc.verify_token(&token).as_deref(), Some("user-1"));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let svc = service();
        let token = svc.issue_token("user-1");
        let forged = token.replacen("user-1", "user-2", 1);

        assert!(svc.verify_token(&forged).is_none());
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let svc = service();

        assert!(svc.verify_token("").is_none());
        assert!(svc.verify_token("no-signature").is_none());
        assert!(svc.verify_token("user.not-hex").is_none());
        assert!(svc.verify_token(".abcdef").is_none());
    }

    #[test]
    fn test_secret_matters() {
        let token = UserAuthService::new("secret-a").issue_token("user-1");
        assert!(UserAuthService::new("secret-b").verify_token(&token).is_none());
    }

    #[test]
    fn test_new_user_ids_differ() {
        assert_ne!(UserAuthService::new_user_id(), UserAuthService::new_user_id());
    }
}
