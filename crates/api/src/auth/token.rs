//! Bearer tokens issued by the account service.
//!
//! The gallery never signs tokens. It checks the HS256 signature, the expiry
//! and, when `JWT_ISSUER` is set, the issuer, then turns the claims into a
//! [`Caller`].

use gallery_core::error::CoreError;
use gallery_core::roles::Role;
use gallery_core::types::DbId;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims the gallery reads from a token. Anything else is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Id of the user row the token speaks for.
    pub sub: DbId,
    pub role: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Shared-secret settings for token validation.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub secret: String,
    /// Expected `iss` claim. Unchecked when `None`.
    pub issuer: Option<String>,
    /// Clock skew tolerated on `exp`, in seconds.
    pub leeway_secs: u64,
}

const DEFAULT_LEEWAY_SECS: u64 = 60;

impl TokenSettings {
    /// Load token settings from environment variables.
    ///
    /// | Env Var           | Required | Default |
    /// |-------------------|----------|---------|
    /// | `JWT_SECRET`      | **yes**  | --      |
    /// | `JWT_ISSUER`      | no       | unset   |
    /// | `JWT_LEEWAY_SECS` | no       | `60`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let issuer = std::env::var("JWT_ISSUER")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let leeway_secs = std::env::var("JWT_LEEWAY_SECS")
            .ok()
            .map(|s| s.parse().expect("JWT_LEEWAY_SECS must be a valid u64"))
            .unwrap_or(DEFAULT_LEEWAY_SECS);

        Self {
            secret,
            issuer,
            leeway_secs,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation
    }
}

/// The user a request acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: DbId,
    pub role: Role,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Missing Authorization header")]
    Missing,
    #[error("Invalid Authorization format. Expected: Bearer <token>")]
    Malformed,
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
    #[error("Token carries unknown role '{0}'")]
    UnknownRole(String),
}

impl From<TokenError> for CoreError {
    fn from(err: TokenError) -> Self {
        CoreError::Unauthorized(err.to_string())
    }
}

/// Pull the token out of an `Authorization` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, TokenError> {
    let header = header.ok_or(TokenError::Missing)?;
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(TokenError::Malformed)
}

/// Verify `token` and resolve the caller it names.
pub fn authenticate(token: &str, settings: &TokenSettings) -> Result<Caller, TokenError> {
    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &settings.validation(),
    )
    .map_err(|err| match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })?;

    let claims = data.claims;
    let role = Role::parse(&claims.role).map_err(|_| TokenError::UnknownRole(claims.role))?;
    Ok(Caller {
        user_id: claims.sub,
        role,
    })
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{encode, EncodingKey, Header};

    use super::*;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

    fn settings(issuer: Option<&str>) -> TokenSettings {
        TokenSettings {
            secret: SECRET.to_string(),
            issuer: issuer.map(str::to_string),
            leeway_secs: DEFAULT_LEEWAY_SECS,
        }
    }

    fn sign(sub: DbId, role: &str, exp_offset: i64, iss: Option<&str>, secret: &str) -> String {
        let claims = TokenClaims {
            sub,
            role: role.to_string(),
            exp: chrono::Utc::now().timestamp() + exp_offset,
            iss: iss.map(str::to_string),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encoding should succeed")
    }

    #[test]
    fn valid_token_names_the_caller() {
        let token = sign(42, "admin", 600, None, SECRET);
        let caller = authenticate(&token, &settings(None)).expect("token should validate");
        assert_eq!(
            caller,
            Caller {
                user_id: 42,
                role: Role::Admin
            }
        );
    }

    #[test]
    fn expiry_beyond_leeway_is_reported() {
        let token = sign(1, "user", -300, None, SECRET);
        assert!(matches!(
            authenticate(&token, &settings(None)),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let token = sign(1, "user", 600, None, "another-secret");
        assert!(matches!(
            authenticate(&token, &settings(None)),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn issuer_is_checked_when_configured() {
        let expected = settings(Some("accounts"));
        let good = sign(1, "user", 600, Some("accounts"), SECRET);
        let wrong = sign(1, "user", 600, Some("elsewhere"), SECRET);

        assert!(authenticate(&good, &expected).is_ok());
        assert!(matches!(
            authenticate(&wrong, &expected),
            Err(TokenError::Invalid)
        ));
        assert!(authenticate(&wrong, &settings(None)).is_ok());
    }

    #[test]
    fn unknown_role_is_rejected() {
        let token = sign(1, "superuser", 600, None, SECRET);
        assert!(matches!(
            authenticate(&token, &settings(None)),
            Err(TokenError::UnknownRole(role)) if role == "superuser"
        ));
    }

    #[test]
    fn bearer_header_parsing() {
        assert!(matches!(bearer_token(None), Err(TokenError::Missing)));
        assert!(matches!(
            bearer_token(Some("Basic abc")),
            Err(TokenError::Malformed)
        ));
        assert!(matches!(
            bearer_token(Some("Bearer ")),
            Err(TokenError::Malformed)
        ));
        assert_eq!(bearer_token(Some("Bearer abc.def")).unwrap(), "abc.def");
    }
}
