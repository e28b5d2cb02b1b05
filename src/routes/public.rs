use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::{json, Value};
use std::sync::Arc;

use super::page_context;
use crate::media::MediaLibrary;
use crate::models::about::AboutPage;
use crate::models::gallery::GalleryImage;
use crate::models::link::Link;
use crate::models::post::Post;
use crate::store::Store;

const HOME_POST_COUNT: usize = 3;

/// Template view of a post: the record plus rendered HTML and image URL.
fn post_view(post: &Post, media: &MediaLibrary) -> Value {
    json!({
        "post": post,
        "content_html": post.content_html(),
        "image_url": post.owned_media().first().map(|m| media.url(m)),
    })
}

fn gallery_view(image: &GalleryImage, media: &MediaLibrary) -> Value {
    json!({
        "image": image,
        "url": media.url(&image.media()),
    })
}

// ── Homepage ───────────────────────────────────────────

#[get("/")]
pub fn homepage(store: &State<Arc<dyn Store>>, media: &State<Arc<MediaLibrary>>) -> Template {
    let s: &dyn Store = &**store.inner();
    let posts: Vec<Value> = Post::recent(s, HOME_POST_COUNT)
        .iter()
        .map(|p| post_view(p, media))
        .collect();
    let carousel: Vec<Value> = GalleryImage::carousel(s)
        .iter()
        .map(|i| gallery_view(i, media))
        .collect();

    let context = page_context(
        s,
        json!({
            "page_type": "home",
            "posts": posts,
            "carousel": carousel,
        }),
    );
    Template::render("index", &context)
}

// ── Blog ───────────────────────────────────────────────

#[get("/blogroll")]
pub fn blogroll(store: &State<Arc<dyn Store>>, media: &State<Arc<MediaLibrary>>) -> Template {
    let s: &dyn Store = &**store.inner();
    let posts: Vec<Value> = Post::list(s).iter().map(|p| post_view(p, media)).collect();
    let context = page_context(
        s,
        json!({
            "page_type": "blogroll",
            "page_title": "Blog",
            "posts": posts,
        }),
    );
    Template::render("blogroll", &context)
}

// ── Gallery ────────────────────────────────────────────

#[get("/gallery")]
pub fn gallery(store: &State<Arc<dyn Store>>, media: &State<Arc<MediaLibrary>>) -> Template {
    let s: &dyn Store = &**store.inner();
    let images: Vec<Value> = GalleryImage::list(s)
        .iter()
        .map(|i| gallery_view(i, media))
        .collect();
    let context = page_context(
        s,
        json!({
            "page_type": "gallery",
            "page_title": "Gallery",
            "images": images,
        }),
    );
    Template::render("gallery", &context)
}

// ── Static-ish pages ───────────────────────────────────

#[get("/links")]
pub fn links(store: &State<Arc<dyn Store>>) -> Template {
    let s: &dyn Store = &**store.inner();
    let context = page_context(
        s,
        json!({
            "page_type": "links",
            "page_title": "Links",
            "links": Link::list(s),
        }),
    );
    Template::render("links", &context)
}

#[get("/contact")]
pub fn contact(store: &State<Arc<dyn Store>>) -> Template {
    let context = page_context(
        &**store.inner(),
        json!({ "page_type": "contact", "page_title": "Contact" }),
    );
    Template::render("contact", &context)
}

#[get("/about")]
pub fn about(store: &State<Arc<dyn Store>>) -> Template {
    let s: &dyn Store = &**store.inner();
    let page = AboutPage::load(s);
    let context = page_context(
        s,
        json!({
            "page_type": "about",
            "page_title": page.heading,
            "journey_items": page.journey_items(),
            "about": page,
        }),
    );
    Template::render("about", &context)
}

/// The commission request form. Submitted requests are never listed here.
#[get("/requests")]
pub fn requests(store: &State<Arc<dyn Store>>) -> Template {
    let context = page_context(
        &**store.inner(),
        json!({
            "page_type": "requests",
            "page_title": "Commission Requests",
            "max_images": crate::models::commission::MAX_REQUEST_IMAGES,
        }),
    );
    Template::render("requests", &context)
}

pub fn routes() -> Vec<rocket::Route> {
    routes![homepage, blogroll, gallery, links, contact, about, requests]
}
