use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::{json, Value};
use std::sync::Arc;

use super::page_context;
use crate::media::MediaLibrary;
use crate::models::about::AboutPage;
use crate::models::commission::{CommissionRequest, INITIAL_STATUS, REQUEST_STATUSES};
use crate::models::gallery::GalleryImage;
use crate::models::link::Link;
use crate::models::post::Post;
use crate::models::settings::{
    SiteSettings, CAROUSEL_HEIGHT_RANGE, CAROUSEL_TIMER_RANGE,
};
use crate::security::auth::AdminSession;
use crate::security::session::SessionRegistry;
use crate::store::Store;

fn admin_page(store: &dyn Store, template: &'static str, extra: Value) -> Template {
    Template::render(template, &page_context(store, extra))
}

#[get("/")]
pub fn dashboard(
    session: AdminSession,
    store: &State<Arc<dyn Store>>,
    media: &State<Arc<MediaLibrary>>,
    sessions: &State<SessionRegistry>,
) -> Template {
    let s: &dyn Store = &**store.inner();
    admin_page(
        s,
        "admin/dashboard",
        json!({
            "page_title": "Dashboard",
            "post_count": Post::count(s),
            "gallery_count": GalleryImage::count(s),
            "link_count": Link::count(s),
            "request_count": CommissionRequest::count(s),
            "open_request_count": CommissionRequest::count_by_status(s, INITIAL_STATUS),
            "recent_posts": Post::recent(s, 5),
            "storage_backend": media.active_backend().as_str(),
            "store_backend": s.backend_name(),
            "session_expires": session.expires_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            "active_sessions": sessions.active_count(),
        }),
    )
}

#[get("/posts")]
pub fn posts(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    media: &State<Arc<MediaLibrary>>,
) -> Template {
    let s: &dyn Store = &**store.inner();
    let posts: Vec<Value> = Post::list(s)
        .iter()
        .map(|p| {
            json!({
                "post": p,
                "image_url": p.owned_media().first().map(|m| media.url(m)),
            })
        })
        .collect();
    admin_page(s, "admin/posts", json!({ "page_title": "Posts", "posts": posts }))
}

#[get("/gallery")]
pub fn gallery(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    media: &State<Arc<MediaLibrary>>,
) -> Template {
    let s: &dyn Store = &**store.inner();
    let images: Vec<Value> = GalleryImage::list(s)
        .iter()
        .map(|i| json!({ "image": i, "url": media.url(&i.media()) }))
        .collect();
    admin_page(
        s,
        "admin/gallery",
        json!({ "page_title": "Gallery", "images": images }),
    )
}

#[get("/links")]
pub fn links(_admin: AdminSession, store: &State<Arc<dyn Store>>) -> Template {
    let s: &dyn Store = &**store.inner();
    admin_page(
        s,
        "admin/links",
        json!({ "page_title": "Links", "links": Link::list(s) }),
    )
}

#[get("/requests")]
pub fn requests(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    media: &State<Arc<MediaLibrary>>,
) -> Template {
    let s: &dyn Store = &**store.inner();
    let requests: Vec<Value> = CommissionRequest::list(s)
        .iter()
        .map(|r| {
            let urls: Vec<String> = r.owned_media().iter().map(|m| media.url(m)).collect();
            json!({ "request": r, "image_urls": urls })
        })
        .collect();
    admin_page(
        s,
        "admin/requests",
        json!({
            "page_title": "Commission Requests",
            "requests": requests,
            "statuses": REQUEST_STATUSES,
        }),
    )
}

#[get("/settings")]
pub fn settings(_admin: AdminSession, store: &State<Arc<dyn Store>>) -> Template {
    let s: &dyn Store = &**store.inner();
    admin_page(
        s,
        "admin/settings",
        json!({
            "page_title": "Settings",
            "current": SiteSettings::load(s),
            "timer_range": [CAROUSEL_TIMER_RANGE.0, CAROUSEL_TIMER_RANGE.1],
            "height_range": [CAROUSEL_HEIGHT_RANGE.0, CAROUSEL_HEIGHT_RANGE.1],
        }),
    )
}

#[get("/about")]
pub fn about(_admin: AdminSession, store: &State<Arc<dyn Store>>) -> Template {
    let s: &dyn Store = &**store.inner();
    admin_page(
        s,
        "admin/about",
        json!({
            "page_title": "About Page",
            "about": AboutPage::load(s),
            "section_keys": AboutPage::SECTION_KEYS,
        }),
    )
}

pub fn routes() -> Vec<rocket::Route> {
    routes![dashboard, posts, gallery, links, requests, settings, about]
}
