use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::json;
use std::sync::Arc;

use super::{api_error, deleted, not_found, storage_failed, ApiResult};
use crate::media::MediaLibrary;
use crate::models::gallery::{GalleryForm, GalleryImage};
use crate::security::auth::AdminSession;
use crate::store::Store;

#[derive(FromForm)]
pub struct GalleryUpload<'f> {
    pub title: Option<String>,
    pub description: Option<String>,
    pub in_carousel: Option<bool>,
    pub image: Option<TempFile<'f>>,
}

impl GalleryUpload<'_> {
    fn form(&self) -> GalleryForm {
        GalleryForm {
            title: self.title.clone(),
            description: self.description.clone(),
            in_carousel: self.in_carousel,
        }
    }
}

#[get("/gallery")]
pub fn gallery_list(store: &State<Arc<dyn Store>>) -> Json<Vec<GalleryImage>> {
    Json(GalleryImage::list(&**store.inner()))
}

#[post("/gallery", data = "<upload>")]
pub async fn gallery_create(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    media: &State<Arc<MediaLibrary>>,
    mut upload: Form<GalleryUpload<'_>>,
) -> ApiResult {
    let stored = match upload.image.as_mut() {
        Some(file) => media
            .store(file)
            .await
            .map_err(|e| storage_failed("store gallery image", e))?,
        None => None,
    };
    let stored = stored.ok_or_else(|| api_error(Status::BadRequest, "An image file is required"))?;

    match GalleryImage::create(&**store.inner(), &upload.form(), stored.clone()) {
        Ok(image) => {
            log::info!("Added gallery image {} ({})", image.id, image.filename);
            Ok(Json(json!({ "id": image.id, "filename": image.filename })))
        }
        Err(e) => {
            media.delete_all(&[stored]).await;
            Err(storage_failed("save gallery image", e))
        }
    }
}

#[patch("/gallery/<id>", format = "json", data = "<body>")]
pub fn gallery_update_json(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    id: i64,
    body: Json<GalleryForm>,
) -> ApiResult {
    match GalleryImage::update(&**store.inner(), id, &body, None) {
        Ok(Some((image, _))) => {
            log::info!("Updated gallery image {}", id);
            Ok(Json(json!(image)))
        }
        Ok(None) => Err(not_found("gallery image", id)),
        Err(e) => Err(storage_failed("update gallery image", e)),
    }
}

/// Edit the caption fields, optionally swapping in a new file. The old file
/// is deleted once the record points at the new one.
#[patch("/gallery/<id>", data = "<upload>", rank = 2)]
pub async fn gallery_update(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    media: &State<Arc<MediaLibrary>>,
    id: i64,
    mut upload: Form<GalleryUpload<'_>>,
) -> ApiResult {
    let s: &dyn Store = &**store.inner();
    if GalleryImage::find_by_id(s, id).is_none() {
        return Err(not_found("gallery image", id));
    }

    let replacement = match upload.image.as_mut() {
        Some(file) => media
            .store(file)
            .await
            .map_err(|e| storage_failed("store gallery image", e))?,
        None => None,
    };

    let result = GalleryImage::update(s, id, &upload.form(), replacement.clone());
    let orphan = match &result {
        Ok(Some(_)) => None,
        _ => replacement,
    };
    if let Some(orphan) = orphan {
        media.delete_all(&[orphan]).await;
    }

    match result {
        Ok(Some((image, replaced))) => {
            if let Some(old) = replaced {
                media.delete_all(&[old]).await;
            }
            log::info!("Updated gallery image {}", id);
            Ok(Json(json!(image)))
        }
        Ok(None) => Err(not_found("gallery image", id)),
        Err(e) => Err(storage_failed("update gallery image", e)),
    }
}

#[delete("/gallery/<id>")]
pub async fn gallery_delete(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    media: &State<Arc<MediaLibrary>>,
    id: i64,
) -> ApiResult {
    let removed = GalleryImage::delete(&**store.inner(), id)
        .map_err(|e| storage_failed("delete gallery image", e))?;
    if let Some(image) = removed {
        media.delete_all(&[image.media()]).await;
        log::info!("Deleted gallery image {}", id);
    }
    Ok(deleted())
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        gallery_list,
        gallery_create,
        gallery_update_json,
        gallery_update,
        gallery_delete,
    ]
}
