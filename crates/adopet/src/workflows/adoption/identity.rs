use axum::http::{header, HeaderMap};

use super::domain::Identity;

/// Opaque bearer credential presented by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential(pub String);

impl Credential {
    /// Extract the bearer token from an `Authorization` header.
    pub fn from_headers(headers: &HeaderMap) -> Result<Option<Self>, AuthError> {
        let Some(value) = headers.get(header::AUTHORIZATION) else {
            return Ok(None);
        };
        let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;
        let (scheme, token) = value
            .trim()
            .split_once(' ')
            .ok_or(AuthError::MalformedHeader)?;
        let token = token.trim();
        if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
            return Err(AuthError::MalformedHeader);
        }
        Ok(Some(Self(token.to_string())))
    }
}

/// Resolves a caller's identity from a credential.
pub trait IdentityProvider: Send + Sync {
    fn resolve(&self, credential: &Credential) -> Result<Identity, AuthError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("access denied: credential required")]
    MissingCredential,
    #[error("access denied: expected 'Authorization: Bearer <token>'")]
    MalformedHeader,
    #[error("access denied: credential is invalid or expired")]
    InvalidCredential,
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(value).expect("valid header"),
        );
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        let credential = Credential::from_headers(&headers("Bearer abc123"))
            .expect("header parses")
            .expect("credential present");
        assert_eq!(credential, Credential("abc123".to_string()));
    }

    #[test]
    fn absent_header_yields_none() {
        assert_eq!(Credential::from_headers(&HeaderMap::new()), Ok(None));
    }

    #[test]
    fn malformed_headers_are_rejected() {
        for value in ["abc123", "Basic abc123", "Bearer   "] {
            assert_eq!(
                Credential::from_headers(&headers(value)),
                Err(AuthError::MalformedHeader),
                "header {value:?}"
            );
        }
    }
}
