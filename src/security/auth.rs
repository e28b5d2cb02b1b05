use chrono::{DateTime, Utc};
use rocket::http::{Cookie, CookieJar, Status};
use rocket::request::{FromRequest, Outcome, Request};
use rocket::State;

use super::session::SessionRegistry;
use crate::config::SiteConfig;

pub const SESSION_COOKIE: &str = "easel_session";

// ── Client IP request guard ──

/// Extracts the client IP used to key login rate limits.
///
/// By default this is the socket peer address. With `TRUST_PROXY_HEADERS`
/// set, headers are checked in priority order first:
///   1. CF-Connecting-IP (Cloudflare)
///   2. X-Real-IP (nginx proxy_set_header)
///   3. X-Forwarded-For (first IP in the chain = original client)
pub struct ClientIp(pub String);

fn forwarded_ip(request: &Request<'_>) -> Option<String> {
    let headers = request.headers();

    for header in ["CF-Connecting-IP", "X-Real-IP"] {
        if let Some(ip) = headers.get_one(header) {
            let ip = ip.trim();
            if !ip.is_empty() {
                return Some(ip.to_string());
            }
        }
    }

    headers
        .get_one("X-Forwarded-For")
        .and_then(|forwarded| forwarded.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(String::from)
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClientIp {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let trusted = request
            .rocket()
            .state::<SiteConfig>()
            .map_or(false, |c| c.trust_proxy_headers);

        if trusted {
            if let Some(ip) = forwarded_ip(request) {
                return Outcome::Success(ClientIp(ip));
            }
        }

        let ip = request
            .client_ip()
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Outcome::Success(ClientIp(ip))
    }
}

// ── Admin session guard ──

/// Proof that the request carries a live admin session.
/// Routes that mutate content take this as a parameter.
pub struct AdminSession {
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminSession {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let registry = match request.guard::<&State<SessionRegistry>>().await {
            Outcome::Success(r) => r,
            _ => return Outcome::Forward(Status::Unauthorized),
        };

        let cookies = request.cookies();
        let session_id = match cookies.get_private(SESSION_COOKIE) {
            Some(c) => c.value().to_string(),
            None => return Outcome::Forward(Status::Unauthorized),
        };

        match registry.validate(&session_id) {
            Some(expires_at) => Outcome::Success(AdminSession {
                session_id,
                expires_at,
            }),
            None => {
                clear_session_cookie(cookies);
                Outcome::Forward(Status::Unauthorized)
            }
        }
    }
}

// ── Password utilities ──

pub fn hash_password(password: &str) -> Result<String, String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| e.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

// ── Session cookie ──

pub fn set_session_cookie(cookies: &CookieJar<'_>, session_id: &str) {
    let mut cookie = Cookie::new(SESSION_COOKIE, session_id.to_string());
    cookie.set_http_only(true);
    cookie.set_same_site(rocket::http::SameSite::Strict);
    cookie.set_path("/");
    cookies.add_private(cookie);
}

pub fn clear_session_cookie(cookies: &CookieJar<'_>) {
    cookies.remove_private(Cookie::from(SESSION_COOKIE));
}
