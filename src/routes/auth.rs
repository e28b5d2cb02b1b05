use rocket::form::Form;
use rocket::http::CookieJar;
use rocket::response::Redirect;
use rocket::State;
use rocket_dyn_templates::Template;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::page_context;
use crate::config::SiteConfig;
use crate::rate_limit::RateLimiter;
use crate::security::auth::{self, AdminSession, ClientIp};
use crate::security::session::SessionRegistry;
use crate::store::Store;

#[derive(Debug, FromForm, Deserialize)]
pub struct LoginForm {
    pub password: String,
}

fn login_template(store: &dyn Store, error: Option<&str>) -> Template {
    let context = page_context(
        store,
        json!({
            "page_title": "Admin Login",
            "error": error,
        }),
    );
    Template::render("admin/login", &context)
}

#[get("/login")]
pub fn login_page(
    session: Option<AdminSession>,
    store: &State<Arc<dyn Store>>,
) -> Result<Template, Redirect> {
    if session.is_some() {
        return Err(Redirect::to("/admin"));
    }
    Ok(login_template(&**store.inner(), None))
}

#[post("/login", data = "<form>")]
pub fn login_submit(
    form: Form<LoginForm>,
    store: &State<Arc<dyn Store>>,
    config: &State<SiteConfig>,
    sessions: &State<SessionRegistry>,
    limiter: &State<RateLimiter>,
    cookies: &CookieJar<'_>,
    client_ip: ClientIp,
) -> Result<Redirect, Template> {
    let s: &dyn Store = &**store.inner();
    let rate_key = format!("login:{}", client_ip.0);
    limiter.cleanup();

    if !limiter.allows(&rate_key) {
        log::warn!("Login blocked for {}: too many failed attempts", client_ip.0);
        return Err(login_template(
            s,
            Some("Too many login attempts. Please try again in 15 minutes."),
        ));
    }

    if !auth::verify_password(&form.password, &config.admin_password_hash) {
        limiter.record_failure(&rate_key);
        log::warn!("Failed admin login from {}", client_ip.0);
        return Err(login_template(s, Some("Invalid password")));
    }

    limiter.reset(&rate_key);
    let swept = sessions.cleanup_expired();
    if swept > 0 {
        log::info!("Dropped {} expired session(s)", swept);
    }
    let (session_id, expires_at) = sessions.create();
    auth::set_session_cookie(cookies, &session_id);
    log::info!(
        "Admin logged in from {} (session expires {})",
        client_ip.0,
        expires_at.format("%Y-%m-%d %H:%M UTC")
    );
    Ok(Redirect::to("/admin"))
}

#[get("/logout")]
pub fn logout(
    session: Option<AdminSession>,
    sessions: &State<SessionRegistry>,
    cookies: &CookieJar<'_>,
) -> Redirect {
    if let Some(session) = session {
        sessions.destroy(&session.session_id);
        log::info!("Admin logged out");
    }
    auth::clear_session_cookie(cookies);
    Redirect::to("/admin/login")
}

/// Catch-all for any /admin/* page that failed the AdminSession guard.
#[get("/<_path..>", rank = 99)]
pub fn admin_redirect_to_login(_path: std::path::PathBuf) -> Redirect {
    Redirect::to("/admin/login")
}

pub fn routes() -> Vec<rocket::Route> {
    routes![login_page, login_submit, logout, admin_redirect_to_login]
}
