//! Cookie-backed session identifiers.
//!
//! The first request of a browser gets a freshly generated user ID stored in a
//! signed cookie; later requests resolve the same ID from it.

use axum_extra::extract::{
    SignedCookieJar,
    cookie::{Cookie, SameSite},
};

use crate::domain::{UserId, UserIdFactory};

/// Name of the session cookie
pub const SESSION_COOKIE_NAME: &str = "tsubu_session";

/// Resolve the user of this request, issuing a new session if needed.
///
/// Returns the jar to send back (with the cookie added when it was issued).
pub fn resolve_user(jar: SignedCookieJar) -> (SignedCookieJar, UserId) {
    if let Some(user_id) = jar
        .get(SESSION_COOKIE_NAME)
        .and_then(|cookie| UserId::try_from(cookie.value().to_string()).ok())
    {
        return (jar, user_id);
    }

    let user_id = UserIdFactory::generate();
    tracing::debug!("Issued new session for user '{}'", user_id);
    let cookie = Cookie::build((SESSION_COOKIE_NAME, user_id.as_str().to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    (jar.add(cookie), user_id)
}
