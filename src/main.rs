#[macro_use]
extern crate rocket;

use std::sync::Arc;

use rocket::fairing::{Fairing, Info, Kind};
use rocket::fs::FileServer;
use rocket::http::Header;
use rocket::response::content::RawHtml;
use rocket::response::Redirect;
use rocket::{Build, Rocket};
use rocket_dyn_templates::Template;

mod boot;
mod config;
mod media;
mod models;
mod rate_limit;
mod routes;
mod security;
mod store;

#[cfg(test)]
mod tests;

use config::SiteConfig;
use media::cloudinary::CloudinaryStorage;
use media::local::LocalStorage;
use media::MediaLibrary;
use rate_limit::RateLimiter;
use security::session::SessionRegistry;
use store::json::JsonFileStore;
use store::Store;

pub struct NoCacheAdmin;

#[rocket::async_trait]
impl Fairing for NoCacheAdmin {
    fn info(&self) -> Info {
        Info { name: "No-Cache Admin Pages", kind: Kind::Response }
    }

    async fn on_response<'r>(&self, req: &'r rocket::Request<'_>, res: &mut rocket::Response<'r>) {
        let path = req.uri().path();
        if path.starts_with("/admin") || path.starts_with("/api") {
            res.set_header(Header::new("Cache-Control", "no-store, no-cache, must-revalidate, max-age=0"));
            res.set_header(Header::new("Pragma", "no-cache"));
        }
    }
}

#[catch(401)]
fn unauthorized() -> Redirect {
    Redirect::to("/admin/login")
}

#[catch(404)]
fn not_found() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>404</h1><p>Page not found.</p><a href='/'>← Home</a></body></html>".to_string())
}

#[catch(500)]
fn server_error() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>500</h1><p>Internal server error.</p><a href='/'>← Home</a></body></html>".to_string())
}

/// Assemble the server around an already-opened store and media library.
pub fn build_rocket(
    config: SiteConfig,
    store: Arc<dyn Store>,
    media: Arc<MediaLibrary>,
) -> Rocket<Build> {
    let mut figment = rocket::Config::figment()
        .merge(("secret_key", config.secret_key_hex()))
        .merge(("template_dir", boot::TEMPLATE_DIR));
    if let Some(port) = config.port {
        figment = figment.merge(("port", port));
    }
    if !config.trust_proxy_headers {
        figment = figment.merge(("ip_header", false));
    }

    let uploads = FileServer::from(&config.uploads_dir);
    let sessions = SessionRegistry::new(config.session_ttl_hours);
    let limiter = RateLimiter::for_login(config.login_rate_limit);

    rocket::custom(figment)
        .manage(store)
        .manage(media)
        .manage(sessions)
        .manage(limiter)
        .manage(config)
        .attach(Template::fairing())
        .attach(NoCacheAdmin)
        .mount("/static", FileServer::from(boot::STATIC_DIR))
        .mount("/uploads", uploads)
        .mount("/", routes::public::routes())
        .mount("/api", routes::api::routes())
        .mount("/admin", routes::admin::routes())
        .mount("/admin", routes::auth::routes())
        .register("/", catchers![unauthorized, not_found, server_error])
}

#[launch]
fn rocket() -> _ {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to read .env: {}", e);
        }
    }
    env_logger::init();

    let config = SiteConfig::from_env().expect("Invalid configuration");

    // Boot check: create directories, check permissions and templates
    boot::run(&config);

    let store = JsonFileStore::new(config.data_dir.clone()).expect("Failed to open data directory");
    store::seed_defaults(&store).expect("Failed to seed default content");
    log::info!("Content files in {}", store.dir().display());
    let store: Arc<dyn Store> = Arc::new(store);

    let remote = match config.cloudinary.clone() {
        Some(c) => match CloudinaryStorage::new(c) {
            Ok(storage) => Some(storage),
            Err(e) => {
                log::error!("Cloudinary unavailable, falling back to local uploads: {}", e);
                None
            }
        },
        None => None,
    };
    let media = MediaLibrary::with_cloudinary(LocalStorage::new(config.uploads_dir.clone()), remote);
    log::info!(
        "Store: {} · uploads: {}",
        store.backend_name(),
        media.active_backend().as_str()
    );

    build_rocket(config, store, Arc::new(media))
}
