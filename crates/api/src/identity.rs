//! Caller identity extraction.
//!
//! Authentication is handled upstream by an identity-aware proxy, which
//! injects the verified caller email as a request header. Requests that
//! arrive without the header (local development, health probes) fall
//! back to the anonymous identity.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Header set by the fronting proxy after authenticating the caller.
pub const CALLER_HEADER: &str = "x-user-email";

/// Identity used when the proxy header is absent.
pub const ANONYMOUS: &str = "anonymous";

/// The authenticated caller, as asserted by the fronting proxy.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub email: String,
}

impl CallerIdentity {
    /// Object-storage folder segment for this caller: lowercased, with
    /// anything outside `[A-Za-z0-9_.-]` replaced by underscores.
    pub fn storage_folder(&self) -> String {
        self.email
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-' {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let email = parts
            .headers
            .get(CALLER_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .unwrap_or(ANONYMOUS)
            .to_string();

        Ok(CallerIdentity { email })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_folder_sanitizes_email() {
        let caller = CallerIdentity {
            email: "Alice.Smith+test@Example.com".to_string(),
        };
        assert_eq!(caller.storage_folder(), "alice.smith_test_example.com");
    }
}
