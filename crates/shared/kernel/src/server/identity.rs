use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sf_domain::constants::{ADMIN, USER, USER_ID_HEADER, USER_ROLE_HEADER};
use std::convert::Infallible;

/// Caller identity forwarded by the authenticating gateway.
///
/// Authentication itself happens upstream; this only reads the headers it sets.
/// A missing or blank role falls back to `user`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Option<String>,
    pub role: String,
}

impl Identity {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(ToOwned::to_owned)
        };

        Ok(Self {
            user_id: header(USER_ID_HEADER),
            role: header(USER_ROLE_HEADER).unwrap_or_else(|| USER.to_owned()),
        })
    }
}
