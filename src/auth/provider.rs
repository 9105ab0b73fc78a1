use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName};
use axum_extra::extract::CookieJar;

use crate::app::AppState;
use crate::auth::demo_auth::{demo_identity, DEMO_COOKIE};
use crate::auth::models::Identity;

/// Resolves the caller's identity from request headers.
///
/// Returning `None` means the request is anonymous; the engine decides
/// per operation whether that is acceptable.
pub trait IdentityProvider: Send + Sync {
    fn identify(&self, headers: &HeaderMap) -> Option<Identity>;
}

/// Reads the demo login cookie set by `POST /api/auth/login`.
#[derive(Debug, Default, Clone)]
pub struct DemoCookieProvider;

impl IdentityProvider for DemoCookieProvider {
    fn identify(&self, headers: &HeaderMap) -> Option<Identity> {
        let jar = CookieJar::from_headers(headers);
        let username = jar.get(DEMO_COOKIE)?.value().to_string();
        demo_identity(&username)
    }
}

/// Trusts a subject header injected by an authenticating reverse proxy.
#[derive(Debug, Clone)]
pub struct TrustedHeaderProvider {
    header: HeaderName,
}

impl TrustedHeaderProvider {
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }
}

impl IdentityProvider for TrustedHeaderProvider {
    fn identify(&self, headers: &HeaderMap) -> Option<Identity> {
        let subject = headers.get(&self.header)?.to_str().ok()?.trim();
        if subject.is_empty() {
            return None;
        }
        Some(Identity::new(subject))
    }
}

/// Axum extractor for the optional caller identity.
///
/// Never rejects: anonymous requests yield `Caller(None)`.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<Identity>);

impl Caller {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Caller(state.identity_provider.identify(&parts.headers)))
    }
}
