use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::json;
use std::sync::Arc;

use super::{deleted, not_found, storage_failed, ApiResult};
use crate::media::MediaLibrary;
use crate::models::post::{Post, PostForm};
use crate::models::ImageChange;
use crate::security::auth::AdminSession;
use crate::store::Store;

#[derive(FromForm)]
pub struct PostUpload<'f> {
    pub title: Option<String>,
    pub content: Option<String>,
    pub date: Option<String>,
    pub image_position: Option<String>,
    pub image: Option<TempFile<'f>>,
    pub remove_image: Option<bool>,
}

impl PostUpload<'_> {
    fn form(&self) -> PostForm {
        PostForm {
            title: self.title.clone(),
            content: self.content.clone(),
            date: self.date.clone(),
            image_position: self.image_position.clone(),
        }
    }
}

#[get("/posts")]
pub fn posts_list(store: &State<Arc<dyn Store>>) -> Json<Vec<Post>> {
    Json(Post::list(&**store.inner()))
}

#[post("/posts", format = "json", data = "<body>")]
pub fn posts_create_json(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    body: Json<PostForm>,
) -> ApiResult {
    let post = Post::create(&**store.inner(), &body, None)
        .map_err(|e| storage_failed("create post", e))?;
    log::info!("Created post {}", post.id);
    Ok(Json(json!({ "id": post.id })))
}

#[post("/posts", data = "<upload>", rank = 2)]
pub async fn posts_create(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    media: &State<Arc<MediaLibrary>>,
    mut upload: Form<PostUpload<'_>>,
) -> ApiResult {
    let image = match upload.image.as_mut() {
        Some(file) => media
            .store(file)
            .await
            .map_err(|e| storage_failed("store post image", e))?,
        None => None,
    };

    match Post::create(&**store.inner(), &upload.form(), image.clone()) {
        Ok(post) => {
            log::info!("Created post {}", post.id);
            Ok(Json(json!({ "id": post.id })))
        }
        Err(e) => {
            if let Some(orphan) = image {
                media.delete_all(&[orphan]).await;
            }
            Err(storage_failed("create post", e))
        }
    }
}

#[patch("/posts/<id>", format = "json", data = "<body>")]
pub fn posts_update_json(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    id: i64,
    body: Json<PostForm>,
) -> ApiResult {
    match Post::update(&**store.inner(), id, &body, ImageChange::Keep) {
        Ok(Some((post, _))) => {
            log::info!("Updated post {}", id);
            Ok(Json(json!(post)))
        }
        Ok(None) => Err(not_found("post", id)),
        Err(e) => Err(storage_failed("update post", e)),
    }
}

/// Multipart edit. A new `image` replaces the current one; `remove_image`
/// clears it. The file that is no longer referenced is deleted after the
/// post has been saved.
#[patch("/posts/<id>", data = "<upload>", rank = 2)]
pub async fn posts_update(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    media: &State<Arc<MediaLibrary>>,
    id: i64,
    mut upload: Form<PostUpload<'_>>,
) -> ApiResult {
    let s: &dyn Store = &**store.inner();
    if Post::find_by_id(s, id).is_none() {
        return Err(not_found("post", id));
    }

    let new_image = match upload.image.as_mut() {
        Some(file) => media
            .store(file)
            .await
            .map_err(|e| storage_failed("store post image", e))?,
        None => None,
    };
    let change = ImageChange::from_parts(new_image.clone(), upload.remove_image.unwrap_or(false));

    let result = Post::update(s, id, &upload.form(), change);
    match result {
        Ok(Some((post, discarded))) => {
            if let Some(old) = discarded {
                media.delete_all(&[old]).await;
            }
            log::info!("Updated post {}", id);
            Ok(Json(json!(post)))
        }
        Ok(None) => {
            if let Some(orphan) = new_image {
                media.delete_all(&[orphan]).await;
            }
            Err(not_found("post", id))
        }
        Err(e) => {
            if let Some(orphan) = new_image {
                media.delete_all(&[orphan]).await;
            }
            Err(storage_failed("update post", e))
        }
    }
}

#[delete("/posts/<id>")]
pub async fn posts_delete(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    media: &State<Arc<MediaLibrary>>,
    id: i64,
) -> ApiResult {
    let removed = Post::delete(&**store.inner(), id).map_err(|e| storage_failed("delete post", e))?;
    if let Some(post) = removed {
        media.delete_all(&post.owned_media()).await;
        log::info!("Deleted post {}", id);
    }
    Ok(deleted())
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        posts_list,
        posts_create_json,
        posts_create,
        posts_update_json,
        posts_update,
        posts_delete,
    ]
}
