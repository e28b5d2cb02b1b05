#![cfg(test)]

use std::path::Path;
use std::sync::Arc;

use rocket::http::{ContentType, Header, Status};
use rocket::local::blocking::{Client, LocalResponse};
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::SiteConfig;
use crate::media::local::LocalStorage;
use crate::media::{MediaLibrary, StoredMedia};
use crate::models::about::{AboutForm, AboutPage};
use crate::models::commission::{CommissionForm, CommissionRequest};
use crate::models::gallery::{GalleryForm, GalleryImage};
use crate::models::link::{Link, LinkForm};
use crate::models::post::{Post, PostForm};
use crate::models::settings::{SettingsForm, SiteSettings};
use crate::models::ImageChange;
use crate::store::memory::MemoryStore;
use crate::store::{self, Store};

const TEST_PASSWORD: &str = "brushstroke";
const BOUNDARY: &str = "easel-test-boundary";
const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot really a png";

/// Fast bcrypt hash for tests (cost=4 instead of DEFAULT_COST).
fn fast_hash(password: &str) -> String {
    bcrypt::hash(password, 4).unwrap()
}

fn test_config(uploads: &Path) -> SiteConfig {
    SiteConfig {
        admin_password_hash: fast_hash(TEST_PASSWORD),
        session_secret: "test session secret".to_string(),
        session_ttl_hours: 1,
        login_rate_limit: 3,
        data_dir: uploads.join("data"),
        uploads_dir: uploads.to_path_buf(),
        port: None,
        trust_proxy_headers: false,
        cloudinary: None,
    }
}

struct TestSite {
    client: Client,
    store: Arc<dyn Store>,
    uploads: TempDir,
}

/// A full Rocket instance over an empty in-memory store and local uploads
/// in a temporary directory.
fn test_site() -> TestSite {
    test_site_with(|_| {})
}

fn test_site_with(adjust: fn(&mut SiteConfig)) -> TestSite {
    let uploads = tempfile::tempdir().unwrap();
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let media = Arc::new(MediaLibrary::new(LocalStorage::new(uploads.path()), None));
    let mut config = test_config(uploads.path());
    adjust(&mut config);
    let rocket = crate::build_rocket(config, store.clone(), media);
    let client = Client::tracked(rocket).expect("valid rocket instance");
    TestSite {
        client,
        store,
        uploads,
    }
}

fn logged_in_site() -> TestSite {
    let site = test_site();
    login(&site.client);
    site
}

fn login(client: &Client) {
    let res = client
        .post("/admin/login")
        .header(ContentType::Form)
        .body(format!("password={}", TEST_PASSWORD))
        .dispatch();
    assert_eq!(res.status(), Status::SeeOther);
    assert_eq!(res.headers().get_one("Location"), Some("/admin"));
}

fn assert_redirects_to_login(res: LocalResponse<'_>) {
    assert_eq!(res.status(), Status::SeeOther);
    assert_eq!(res.headers().get_one("Location"), Some("/admin/login"));
}

fn json_body(res: LocalResponse<'_>) -> Value {
    res.into_json::<Value>().expect("JSON response body")
}

/// Non-hidden files in the uploads directory, sorted.
fn uploaded_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|n| !n.starts_with('.'))
        .collect();
    names.sort();
    names
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart(parts: &[Part<'_>]) -> (ContentType, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, filename, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    let ct = ContentType::new("multipart", "form-data").with_params(("boundary", BOUNDARY));
    (ct, body)
}

fn post_multipart<'c>(client: &'c Client, uri: &str, parts: &[Part<'_>]) -> LocalResponse<'c> {
    let (ct, body) = multipart(parts);
    client.post(uri.to_string()).header(ct).body(body).dispatch()
}

fn patch_multipart<'c>(client: &'c Client, uri: &str, parts: &[Part<'_>]) -> LocalResponse<'c> {
    let (ct, body) = multipart(parts);
    client.patch(uri.to_string()).header(ct).body(body).dispatch()
}

fn link_form(title: &str) -> LinkForm {
    LinkForm {
        title: Some(title.to_string()),
        url: Some("example.com".to_string()),
        description: None,
    }
}

// ═══════════════════════════════════════════════════════════
// Ids
// ═══════════════════════════════════════════════════════════

#[test]
fn ids_start_at_one_and_follow_the_max() {
    let s = MemoryStore::new();
    let a = Link::create(&s, &link_form("a")).unwrap();
    let b = Link::create(&s, &link_form("b")).unwrap();
    let c = Link::create(&s, &link_form("c")).unwrap();
    assert_eq!((a.id, b.id, c.id), (1, 2, 3));

    Link::delete(&s, 2).unwrap();
    assert_eq!(Link::create(&s, &link_form("d")).unwrap().id, 4);
}

#[test]
fn deleting_the_max_id_frees_it() {
    let s = MemoryStore::new();
    Link::create(&s, &link_form("a")).unwrap();
    Link::create(&s, &link_form("b")).unwrap();
    Link::delete(&s, 2).unwrap();
    assert_eq!(Link::create(&s, &link_form("c")).unwrap().id, 2);
}

#[test]
fn seeded_posts_continue_numbering() {
    let s = MemoryStore::new();
    store::seed_defaults(&s).unwrap();
    let post = Post::create(&s, &PostForm::default(), None).unwrap();
    assert_eq!(post.id, 4);
}

// ═══════════════════════════════════════════════════════════
// Posts
// ═══════════════════════════════════════════════════════════

fn dated(date: &str) -> PostForm {
    PostForm {
        title: Some(format!("post {}", date)),
        date: Some(date.to_string()),
        ..Default::default()
    }
}

#[test]
fn posts_list_newest_date_first() {
    let s = MemoryStore::new();
    Post::create(&s, &dated("2025-01-20"), None).unwrap();
    Post::create(&s, &dated("not a date"), None).unwrap();
    Post::create(&s, &dated("2025-03-01"), None).unwrap();
    Post::create(&s, &dated("2024-12-31"), None).unwrap();

    let dates: Vec<String> = Post::list(&s)
        .into_iter()
        .map(|p| p.date.unwrap())
        .collect();
    assert_eq!(dates, vec!["2025-03-01", "2025-01-20", "2024-12-31", "not a date"]);
}

#[test]
fn posts_recent_takes_the_newest() {
    let s = MemoryStore::new();
    store::seed_defaults(&s).unwrap();
    let recent = Post::recent(&s, 2);
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].title.as_deref(), Some("Studio Update"));
}

#[test]
fn post_update_image_changes() {
    let s = MemoryStore::new();
    let post = Post::create(&s, &dated("2025-01-01"), Some(StoredMedia::local("a.png"))).unwrap();

    let (kept, discarded) = Post::update(&s, post.id, &PostForm::default(), ImageChange::Keep)
        .unwrap()
        .unwrap();
    assert_eq!(kept.image.as_deref(), Some("a.png"));
    assert_eq!(discarded, None);

    let (replaced, discarded) = Post::update(
        &s,
        post.id,
        &PostForm::default(),
        ImageChange::Replace(StoredMedia::local("b.png")),
    )
    .unwrap()
    .unwrap();
    assert_eq!(replaced.image.as_deref(), Some("b.png"));
    assert_eq!(discarded, Some(StoredMedia::local("a.png")));

    let (removed, discarded) = Post::update(&s, post.id, &PostForm::default(), ImageChange::Remove)
        .unwrap()
        .unwrap();
    assert_eq!(removed.image, None);
    assert_eq!(discarded, Some(StoredMedia::local("b.png")));
    assert!(removed.updated_at.is_some());
}

#[test]
fn post_update_unknown_id() {
    let s = MemoryStore::new();
    assert!(Post::update(&s, 42, &PostForm::default(), ImageChange::Keep)
        .unwrap()
        .is_none());
}

#[test]
fn post_content_renders_markdown() {
    let s = MemoryStore::new();
    let post = Post::create(
        &s,
        &PostForm {
            content: Some("Some *new* work".into()),
            ..Default::default()
        },
        None,
    )
    .unwrap();
    assert_eq!(post.content_html().trim(), "<p>Some <em>new</em> work</p>");
}

#[test]
fn post_delete_is_idempotent() {
    let s = MemoryStore::new();
    let post = Post::create(&s, &dated("2025-01-01"), Some(StoredMedia::local("a.png"))).unwrap();
    let removed = Post::delete(&s, post.id).unwrap().unwrap();
    assert_eq!(removed.owned_media(), vec![StoredMedia::local("a.png")]);
    assert!(Post::delete(&s, post.id).unwrap().is_none());
    assert_eq!(Post::count(&s), 0);
}

// ═══════════════════════════════════════════════════════════
// Gallery
// ═══════════════════════════════════════════════════════════

#[test]
fn gallery_create_update_and_carousel() {
    let s = MemoryStore::new();
    let first = GalleryImage::create(&s, &GalleryForm::default(), StoredMedia::local("1.png")).unwrap();
    let second = GalleryImage::create(
        &s,
        &GalleryForm {
            title: Some("Harbour".into()),
            in_carousel: Some(true),
            ..Default::default()
        },
        StoredMedia::local("2.png"),
    )
    .unwrap();
    assert!(!first.in_carousel);

    let ids: Vec<i64> = GalleryImage::list(&s).iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert_eq!(GalleryImage::carousel(&s).len(), 1);

    let (updated, replaced) = GalleryImage::update(
        &s,
        first.id,
        &GalleryForm {
            description: Some("Oil on board".into()),
            ..Default::default()
        },
        Some(StoredMedia::local("3.png")),
    )
    .unwrap()
    .unwrap();
    assert_eq!(updated.filename, "3.png");
    assert_eq!(updated.description.as_deref(), Some("Oil on board"));
    assert_eq!(replaced, Some(StoredMedia::local("1.png")));
}

// ═══════════════════════════════════════════════════════════
// Commission requests
// ═══════════════════════════════════════════════════════════

fn request_form() -> CommissionForm {
    CommissionForm {
        name: Some("Ada".into()),
        email: Some("ada@example.com".into()),
        kind: Some("Painting".into()),
        description: Some("A portrait of my cat".into()),
        ..Default::default()
    }
}

#[test]
fn commission_request_with_two_images_and_no_budget() {
    let s = MemoryStore::new();
    let images = vec![StoredMedia::local("1.png"), StoredMedia::local("2.png")];
    let request = CommissionRequest::create(&s, &request_form(), images).unwrap();

    assert_eq!(request.id, 1);
    assert_eq!(request.status, "incomplete");
    assert_eq!(request.images, vec!["1.png", "2.png"]);
    assert_eq!(request.budget, None);

    let stored = serde_json::to_value(&request).unwrap();
    assert!(stored.get("budget").is_none());
    assert_eq!(stored["type"], "Painting");
}

#[test]
fn commission_request_keeps_first_five_images() {
    let s = MemoryStore::new();
    let images: Vec<StoredMedia> = (1..=7)
        .map(|n| StoredMedia::local(format!("{}.png", n)))
        .collect();
    let request = CommissionRequest::create(&s, &request_form(), images).unwrap();
    assert_eq!(
        request.images,
        vec!["1.png", "2.png", "3.png", "4.png", "5.png"]
    );
}

#[test]
fn commission_request_status_ignored_on_create() {
    let s = MemoryStore::new();
    let form = CommissionForm {
        status: Some("complete".into()),
        ..request_form()
    };
    let request = CommissionRequest::create(&s, &form, Vec::new()).unwrap();
    assert_eq!(request.status, "incomplete");

    let updated = CommissionRequest::update(
        &s,
        request.id,
        &CommissionForm {
            status: Some("in progress".into()),
            ..Default::default()
        },
    )
    .unwrap()
    .unwrap();
    assert_eq!(updated.status, "in progress");
    assert_eq!(updated.name.as_deref(), Some("Ada"));
    assert_eq!(CommissionRequest::count_by_status(&s, "in progress"), 1);
}

// ═══════════════════════════════════════════════════════════
// Settings & about
// ═══════════════════════════════════════════════════════════

#[test]
fn settings_update_falls_back_out_of_range() {
    let s = MemoryStore::new();
    let saved = SiteSettings::update(
        &s,
        &SettingsForm {
            carousel_timer: Some("45".into()),
            carousel_height: Some("5".into()),
            post_color: Some("#eeeeee".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!((saved.carousel_timer, saved.carousel_height), (5, 25));
    assert_eq!(SiteSettings::load(&s).post_color, "#eeeeee");
}

#[test]
fn about_update_persists_partial_changes() {
    let s = MemoryStore::new();
    AboutPage::update(
        &s,
        &AboutForm {
            journey_body: Some("Art school\nFirst show".into()),
            ..Default::default()
        },
    )
    .unwrap();
    let page = AboutPage::load(&s);
    assert_eq!(page.journey_items(), vec!["Art school", "First show"]);
    assert_eq!(page.heading, AboutPage::default().heading);
}

// ═══════════════════════════════════════════════════════════
// Auth routes
// ═══════════════════════════════════════════════════════════

#[test]
fn admin_pages_redirect_without_session() {
    let site = test_site();
    for uri in ["/admin", "/admin/posts", "/admin/settings", "/admin/anything/else"] {
        assert_redirects_to_login(site.client.get(uri).dispatch());
    }
}

#[test]
fn mutations_redirect_without_session() {
    let site = test_site();
    let c = &site.client;

    assert_redirects_to_login(
        c.post("/api/links")
            .header(ContentType::JSON)
            .body(json!({ "title": "x" }).to_string())
            .dispatch(),
    );
    assert_redirects_to_login(
        c.post("/api/links")
            .header(ContentType::Form)
            .body("title=x")
            .dispatch(),
    );
    assert_redirects_to_login(post_multipart(c, "/api/posts", &[Part::Text("title", "x")]));
    assert_redirects_to_login(c.delete("/api/posts/1").dispatch());
    assert_redirects_to_login(c.get("/api/requests").dispatch());
    assert_redirects_to_login(
        c.post("/api/settings")
            .header(ContentType::Form)
            .body("carousel_timer=10")
            .dispatch(),
    );

    assert!(Link::list(&*site.store).is_empty());
}

#[test]
fn login_rejects_wrong_password() {
    let site = test_site();
    let res = site
        .client
        .post("/admin/login")
        .header(ContentType::Form)
        .body("password=wrong")
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
    assert!(res.into_string().unwrap().contains("Invalid password"));
    assert_redirects_to_login(site.client.get("/admin").dispatch());
}

#[test]
fn login_rate_limited_after_failures() {
    let site = test_site();
    for _ in 0..3 {
        site.client
            .post("/admin/login")
            .header(ContentType::Form)
            .body("password=wrong")
            .dispatch();
    }
    let res = site
        .client
        .post("/admin/login")
        .header(ContentType::Form)
        .body(format!("password={}", TEST_PASSWORD))
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
    assert!(res.into_string().unwrap().contains("Too many login attempts"));
}

fn failed_login_from(client: &Client, forwarded_for: String) -> String {
    client
        .post("/admin/login")
        .header(ContentType::Form)
        .header(Header::new("X-Forwarded-For", forwarded_for))
        .body("password=wrong")
        .dispatch()
        .into_string()
        .unwrap()
}

#[test]
fn login_rate_limit_ignores_forwarded_for_by_default() {
    let site = test_site();
    let blocked: Vec<bool> = (0..10)
        .map(|i| failed_login_from(&site.client, format!("10.0.0.{}", i)))
        .map(|body| body.contains("Too many login attempts"))
        .collect();
    assert_eq!(&blocked[..3], &[false, false, false]);
    assert!(blocked[3..].iter().all(|b| *b));
}

#[test]
fn login_rate_limit_keys_on_forwarded_for_when_trusted() {
    let site = test_site_with(|c| c.trust_proxy_headers = true);
    for _ in 0..3 {
        failed_login_from(&site.client, "10.0.0.1".to_string());
    }
    let body = failed_login_from(&site.client, "10.0.0.1".to_string());
    assert!(body.contains("Too many login attempts"));
    let body = failed_login_from(&site.client, "10.0.0.2".to_string());
    assert!(body.contains("Invalid password"));
}

#[test]
fn login_and_logout() {
    let site = logged_in_site();
    let res = site.client.get("/admin").dispatch();
    assert_eq!(res.status(), Status::Ok);
    assert_eq!(
        res.headers().get_one("Cache-Control"),
        Some("no-store, no-cache, must-revalidate, max-age=0")
    );

    let res = site.client.get("/admin/login").dispatch();
    assert_eq!(res.status(), Status::SeeOther);
    assert_eq!(res.headers().get_one("Location"), Some("/admin"));

    let res = site.client.get("/admin/logout").dispatch();
    assert_redirects_to_login(res);
    assert_redirects_to_login(site.client.get("/admin").dispatch());
}

// ═══════════════════════════════════════════════════════════
// Links API
// ═══════════════════════════════════════════════════════════

#[test]
fn links_api_crud() {
    let site = logged_in_site();
    let c = &site.client;

    let res = c
        .post("/api/links")
        .header(ContentType::JSON)
        .body(json!({ "title": "Shop", "url": "shop.example.com" }).to_string())
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
    assert_eq!(json_body(res), json!({ "id": 1 }));

    let res = c
        .post("/api/links")
        .header(ContentType::Form)
        .body("title=Blog&url=https%3A%2F%2Fblog.example.com")
        .dispatch();
    assert_eq!(json_body(res), json!({ "id": 2 }));

    let res = c
        .patch("/api/links/1")
        .header(ContentType::JSON)
        .body(json!({ "description": "Prints and originals" }).to_string())
        .dispatch();
    let link = json_body(res);
    assert_eq!(link["title"], "Shop");
    assert_eq!(link["url"], "https://shop.example.com");
    assert_eq!(link["description"], "Prints and originals");

    let res = c
        .patch("/api/links/99")
        .header(ContentType::JSON)
        .body(json!({ "title": "nope" }).to_string())
        .dispatch();
    assert_eq!(res.status(), Status::NotFound);
    assert!(json_body(res)["error"].is_string());

    let listed = json_body(c.get("/api/links").dispatch());
    assert_eq!(listed.as_array().unwrap().len(), 2);
    assert_eq!(listed[0]["id"], 1);

    for _ in 0..2 {
        let res = c.delete("/api/links/1").dispatch();
        assert_eq!(res.status(), Status::Ok);
        assert_eq!(json_body(res), json!({ "success": true }));
    }
    assert_eq!(Link::count(&*site.store), 1);
    assert!(Link::find_by_id(&*site.store, 1).is_none());
    assert_eq!(
        Link::find_by_id(&*site.store, 2).unwrap().url.as_deref(),
        Some("https://blog.example.com")
    );
}

// ═══════════════════════════════════════════════════════════
// Posts API
// ═══════════════════════════════════════════════════════════

#[test]
fn posts_api_image_lifecycle() {
    let site = logged_in_site();
    let c = &site.client;
    let dir = site.uploads.path();

    let res = post_multipart(
        c,
        "/api/posts",
        &[
            Part::Text("title", "Spring show"),
            Part::Text("date", "2025-04-01"),
            Part::Text("content", "Opening night"),
            Part::File("image", "poster.png", PNG_BYTES),
        ],
    );
    assert_eq!(res.status(), Status::Ok);
    let id = json_body(res)["id"].as_i64().unwrap();
    let original = Post::find_by_id(&*site.store, id).unwrap().image.unwrap();
    assert!(original.ends_with(".png"));
    assert_eq!(uploaded_files(dir), vec![original.clone()]);

    // Fields only: the image stays.
    let res = patch_multipart(c, &format!("/api/posts/{}", id), &[Part::Text("title", "Spring show!")]);
    let post = json_body(res);
    assert_eq!(post["title"], "Spring show!");
    assert_eq!(post["image"], original.as_str());

    // A new file replaces and deletes the old one.
    let res = patch_multipart(
        c,
        &format!("/api/posts/{}", id),
        &[Part::File("image", "poster2.png", PNG_BYTES)],
    );
    let replacement = json_body(res)["image"].as_str().unwrap().to_string();
    assert_ne!(replacement, original);
    assert_eq!(uploaded_files(dir), vec![replacement.clone()]);

    // remove_image clears and deletes it.
    let res = patch_multipart(
        c,
        &format!("/api/posts/{}", id),
        &[Part::Text("remove_image", "true")],
    );
    assert!(json_body(res).get("image").is_none());
    assert!(uploaded_files(dir).is_empty());
    assert_eq!(Post::find_by_id(&*site.store, id).unwrap().image, None);
}

#[test]
fn posts_api_json_and_delete() {
    let site = logged_in_site();
    let c = &site.client;

    let res = c
        .post("/api/posts")
        .header(ContentType::JSON)
        .body(json!({ "title": "Note", "date": "2025-05-05", "content": "Short" }).to_string())
        .dispatch();
    let id = json_body(res)["id"].as_i64().unwrap();

    let res = c
        .patch(format!("/api/posts/{}", id))
        .header(ContentType::JSON)
        .body(json!({ "content": "Longer" }).to_string())
        .dispatch();
    assert_eq!(json_body(res)["content"], "Longer");

    let res = post_multipart(c, "/api/posts", &[Part::File("image", "a.png", PNG_BYTES)]);
    let with_image = json_body(res)["id"].as_i64().unwrap();
    assert_eq!(uploaded_files(site.uploads.path()).len(), 1);

    c.delete(format!("/api/posts/{}", with_image)).dispatch();
    assert!(uploaded_files(site.uploads.path()).is_empty());
    assert!(Post::find_by_id(&*site.store, with_image).is_none());

    let res = c.delete(format!("/api/posts/{}", with_image)).dispatch();
    assert_eq!(json_body(res), json!({ "success": true }));

    let res = patch_multipart(c, "/api/posts/999", &[Part::Text("title", "ghost")]);
    assert_eq!(res.status(), Status::NotFound);
}

// ═══════════════════════════════════════════════════════════
// Gallery API
// ═══════════════════════════════════════════════════════════

#[test]
fn gallery_api_requires_an_image() {
    let site = logged_in_site();
    let res = post_multipart(&site.client, "/api/gallery", &[Part::Text("title", "Empty")]);
    assert_eq!(res.status(), Status::BadRequest);
    assert_eq!(json_body(res)["error"], "An image file is required");

    let res = post_multipart(
        &site.client,
        "/api/gallery",
        &[Part::Text("title", "Empty"), Part::File("image", "empty.png", b"")],
    );
    assert_eq!(res.status(), Status::BadRequest);
    assert_eq!(GalleryImage::count(&*site.store), 0);
}

#[test]
fn gallery_api_update_without_file_keeps_image() {
    let site = logged_in_site();
    let dir = site.uploads.path();
    let created = json_body(post_multipart(
        &site.client,
        "/api/gallery",
        &[Part::Text("title", "Dune"), Part::File("image", "dune.png", PNG_BYTES)],
    ));
    let id = created["id"].as_i64().unwrap();
    let filename = created["filename"].as_str().unwrap().to_string();

    let res = patch_multipart(
        &site.client,
        &format!("/api/gallery/{}", id),
        &[Part::Text("title", "Dunes"), Part::Text("remove_image", "true")],
    );
    assert_eq!(res.status(), Status::Ok);
    let updated = json_body(res);
    assert_eq!(updated["title"], "Dunes");
    assert_eq!(updated["filename"], filename.as_str());
    assert_eq!(uploaded_files(dir), vec![filename]);
}

#[test]
fn gallery_api_upload_replace_delete() {
    let site = logged_in_site();
    let c = &site.client;
    let dir = site.uploads.path();

    let res = post_multipart(
        c,
        "/api/gallery",
        &[
            Part::Text("title", "Tide"),
            Part::Text("in_carousel", "true"),
            Part::File("image", "tide.png", PNG_BYTES),
        ],
    );
    let created = json_body(res);
    let id = created["id"].as_i64().unwrap();
    let filename = created["filename"].as_str().unwrap().to_string();
    assert_eq!(uploaded_files(dir), vec![filename.clone()]);

    let listed = json_body(c.get("/api/gallery").dispatch());
    assert_eq!(listed[0]["storage"], "local");
    assert_eq!(listed[0]["in_carousel"], true);

    let res = patch_multipart(
        c,
        &format!("/api/gallery/{}", id),
        &[
            Part::Text("in_carousel", "false"),
            Part::File("image", "tide2.png", PNG_BYTES),
        ],
    );
    let updated = json_body(res);
    let new_name = updated["filename"].as_str().unwrap().to_string();
    assert_ne!(new_name, filename);
    assert_eq!(updated["in_carousel"], false);
    assert_eq!(updated["title"], "Tide");
    assert_eq!(uploaded_files(dir), vec![new_name]);

    let res = c.delete(format!("/api/gallery/{}", id)).dispatch();
    assert_eq!(json_body(res), json!({ "success": true }));
    assert!(uploaded_files(dir).is_empty());
    assert_eq!(GalleryImage::count(&*site.store), 0);
}

// ═══════════════════════════════════════════════════════════
// Commission requests API
// ═══════════════════════════════════════════════════════════

#[test]
fn public_commission_request_submission() {
    let site = test_site();
    let c = &site.client;

    let res = post_multipart(
        c,
        "/api/requests",
        &[
            Part::Text("name", "Grace"),
            Part::Text("email", "grace@example.com"),
            Part::Text("type", "Drawing"),
            Part::Text("budget", ""),
            Part::Text("description", "Two birds on a wire"),
            Part::File("images", "ref1.png", PNG_BYTES),
            Part::File("images", "ref2.png", PNG_BYTES),
        ],
    );
    assert_eq!(res.status(), Status::Ok);
    assert_eq!(json_body(res), json!({ "success": true, "id": 1 }));

    let stored = CommissionRequest::find_by_id(&*site.store, 1).unwrap();
    assert_eq!(stored.status, "incomplete");
    assert_eq!(stored.images.len(), 2);
    assert_eq!(stored.budget, None);
    assert_eq!(stored.kind.as_deref(), Some("Drawing"));
    assert_eq!(uploaded_files(site.uploads.path()).len(), 2);

    // Listing exposes emails, so it is admin-only.
    assert_redirects_to_login(c.get("/api/requests").dispatch());
}

#[test]
fn commission_request_admin_update_and_delete() {
    let site = logged_in_site();
    let c = &site.client;

    post_multipart(
        c,
        "/api/requests",
        &[
            Part::Text("name", "Grace"),
            Part::File("images", "ref1.png", PNG_BYTES),
        ],
    );

    let listed = json_body(c.get("/api/requests").dispatch());
    assert_eq!(listed[0]["status"], "incomplete");

    let res = c
        .patch("/api/requests/1")
        .header(ContentType::Form)
        .body("status=complete")
        .dispatch();
    assert_eq!(json_body(res)["status"], "complete");

    let res = c
        .patch("/api/requests/1")
        .header(ContentType::JSON)
        .body(json!({ "status": "declined", "type": "Mural" }).to_string())
        .dispatch();
    let updated = json_body(res);
    assert_eq!(updated["status"], "declined");
    assert_eq!(updated["type"], "Mural");

    c.delete("/api/requests/1").dispatch();
    assert!(uploaded_files(site.uploads.path()).is_empty());
    assert_eq!(CommissionRequest::count(&*site.store), 0);
}

// ═══════════════════════════════════════════════════════════
// Settings & about API
// ═══════════════════════════════════════════════════════════

#[test]
fn settings_api_normalises_values() {
    let site = logged_in_site();
    let c = &site.client;

    let res = c
        .post("/api/settings")
        .header(ContentType::Form)
        .body("carousel_timer=2&carousel_height=95&background_color=%23101010")
        .dispatch();
    let saved = json_body(res);
    assert_eq!(saved["carousel_timer"], 5);
    assert_eq!(saved["carousel_height"], 25);
    assert_eq!(saved["background_color"], "#101010");

    let res = c
        .post("/api/settings")
        .header(ContentType::JSON)
        .body(json!({ "carousel_timer": 12 }).to_string())
        .dispatch();
    assert_eq!(json_body(res)["carousel_timer"], 12);

    let current = json_body(c.get("/api/settings").dispatch());
    assert_eq!(current["carousel_timer"], 12);
    assert_eq!(current["background_color"], "#101010");
}

#[test]
fn about_api_round_trip() {
    let site = logged_in_site();
    let res = site
        .client
        .post("/api/about")
        .header(ContentType::Form)
        .body("heading=Hi&studio_title=Workshop")
        .dispatch();
    assert_eq!(res.status(), Status::Ok);

    let about = json_body(site.client.get("/api/about").dispatch());
    assert_eq!(about["heading"], "Hi");
    assert_eq!(about["studio"]["title"], "Workshop");
    assert_eq!(about["journey"]["title"], AboutPage::default().journey.title);
}

// ═══════════════════════════════════════════════════════════
// Pages
// ═══════════════════════════════════════════════════════════

#[test]
fn public_pages_render() {
    let site = test_site();
    store::seed_defaults(&*site.store).unwrap();
    for uri in ["/", "/blogroll", "/gallery", "/links", "/contact", "/about", "/requests"] {
        let res = site.client.get(uri).dispatch();
        assert_eq!(res.status(), Status::Ok, "GET {}", uri);
    }

    let home = site.client.get("/").dispatch().into_string().unwrap();
    assert!(home.contains("Studio Update"));
    assert!(home.contains("--background-color: #faf7f2"));
}

#[test]
fn admin_pages_render() {
    let site = logged_in_site();
    store::seed_defaults(&*site.store).unwrap();
    CommissionRequest::create(&*site.store, &request_form(), Vec::new()).unwrap();
    for uri in [
        "/admin",
        "/admin/posts",
        "/admin/gallery",
        "/admin/links",
        "/admin/requests",
        "/admin/settings",
        "/admin/about",
    ] {
        let res = site.client.get(uri).dispatch();
        assert_eq!(res.status(), Status::Ok, "GET {}", uri);
    }
}

#[test]
fn unknown_page_is_404() {
    let site = test_site();
    let res = site.client.get("/no-such-page").dispatch();
    assert_eq!(res.status(), Status::NotFound);
}
