use serde::{Deserialize, Serialize};

use crate::auth::models::Identity;
use crate::error::AppError;

/// Name of the cookie carrying the logged-in demo username.
pub const DEMO_COOKIE: &str = "jotter_demo_user";

/// Built-in demo user definition.
#[derive(Debug, Clone)]
struct DemoUser {
    username: &'static str,
    password: &'static str,
    email: &'static str,
}

/// The hard-coded demo users available when `auth.mode = "demo"`.
const DEMO_USERS: &[DemoUser] = &[
    DemoUser {
        username: "alice",
        password: "alice",
        email: "alice@demo.jotter.dev",
    },
    DemoUser {
        username: "bob",
        password: "bob",
        email: "bob@demo.jotter.dev",
    },
];

impl DemoUser {
    fn identity(&self) -> Identity {
        Identity::new(format!("demo-{}", self.username)).with_email(self.email)
    }
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: Identity,
}

/// Validate demo credentials and return the corresponding identity.
pub fn authenticate_demo_user(username: &str, password: &str) -> Result<Identity, AppError> {
    DEMO_USERS
        .iter()
        .find(|u| u.username == username && u.password == password)
        .map(DemoUser::identity)
        .ok_or_else(|| AppError::Unauthenticated("Invalid username or password".into()))
}

/// Identity of a known demo user, looked up by username.
pub fn demo_identity(username: &str) -> Option<Identity> {
    DEMO_USERS
        .iter()
        .find(|u| u.username == username)
        .map(DemoUser::identity)
}

/// `POST /api/auth/login`: demo login handler.
///
/// Validates credentials against the built-in user table.
/// On success, sets the demo cookie and returns the user's identity.
#[cfg(feature = "server")]
pub async fn login_handler(
    jar: axum_extra::extract::CookieJar,
    axum::Json(req): axum::Json<LoginRequest>,
) -> Result<(axum_extra::extract::CookieJar, axum::Json<LoginResponse>), AppError> {
    let user = authenticate_demo_user(&req.username, &req.password)?;

    let cookie = axum_extra::extract::cookie::Cookie::build((DEMO_COOKIE, req.username))
        .path("/")
        .http_only(true)
        .same_site(axum_extra::extract::cookie::SameSite::Lax)
        .build();

    tracing::info!(subject = %user.subject, "Demo user logged in");

    Ok((
        jar.add(cookie),
        axum::Json(LoginResponse {
            message: "Login successful".to_string(),
            user,
        }),
    ))
}

/// `GET /api/auth/me`: returns the caller's identity.
#[cfg(feature = "server")]
pub async fn me_handler(
    crate::auth::provider::Caller(caller): crate::auth::provider::Caller,
) -> Result<axum::Json<Identity>, AppError> {
    caller
        .map(axum::Json)
        .ok_or_else(|| AppError::Unauthenticated("Not logged in".into()))
}

/// `POST /api/auth/logout`: clears the demo session cookie.
#[cfg(feature = "server")]
pub async fn logout_handler(
    jar: axum_extra::extract::CookieJar,
) -> axum_extra::extract::CookieJar {
    let cookie = axum_extra::extract::cookie::Cookie::build((DEMO_COOKIE, ""))
        .path("/")
        .removal()
        .build();

    jar.remove(cookie)
}
