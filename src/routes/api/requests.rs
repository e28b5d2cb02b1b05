use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::json;
use std::sync::Arc;

use super::{deleted, non_empty, not_found, storage_failed, ApiResult};
use crate::media::MediaLibrary;
use crate::models::commission::{CommissionForm, CommissionRequest, MAX_REQUEST_IMAGES};
use crate::security::auth::AdminSession;
use crate::store::Store;

/// The public commission form. Reference images arrive as repeated
/// `images` fields.
#[derive(FromForm)]
pub struct CommissionUpload<'f> {
    pub name: Option<String>,
    pub email: Option<String>,
    #[field(name = "type")]
    pub kind: Option<String>,
    pub size: Option<String>,
    pub budget: Option<String>,
    pub description: Option<String>,
    pub timeline: Option<String>,
    pub images: Vec<TempFile<'f>>,
}

impl CommissionUpload<'_> {
    /// Blank inputs are treated as not answered.
    fn form(&self) -> CommissionForm {
        CommissionForm {
            name: non_empty(&self.name),
            email: non_empty(&self.email),
            kind: non_empty(&self.kind),
            size: non_empty(&self.size),
            budget: non_empty(&self.budget),
            description: non_empty(&self.description),
            timeline: non_empty(&self.timeline),
            status: None,
        }
    }
}

fn update(store: &dyn Store, id: i64, form: &CommissionForm) -> ApiResult {
    match CommissionRequest::update(store, id, form) {
        Ok(Some(request)) => {
            log::info!("Updated commission request {} ({})", id, request.status);
            Ok(Json(json!(request)))
        }
        Ok(None) => Err(not_found("commission request", id)),
        Err(e) => Err(storage_failed("update commission request", e)),
    }
}

#[post("/requests", data = "<upload>")]
pub async fn requests_create(
    store: &State<Arc<dyn Store>>,
    media: &State<Arc<MediaLibrary>>,
    mut upload: Form<CommissionUpload<'_>>,
) -> ApiResult {
    let images = media
        .store_many(&mut upload.images, MAX_REQUEST_IMAGES)
        .await
        .map_err(|e| storage_failed("store request images", e))?;

    match CommissionRequest::create(&**store.inner(), &upload.form(), images.clone()) {
        Ok(request) => {
            log::info!(
                "Received commission request {} with {} image(s)",
                request.id,
                request.images.len()
            );
            Ok(Json(json!({ "success": true, "id": request.id })))
        }
        Err(e) => {
            media.delete_all(&images).await;
            Err(storage_failed("save commission request", e))
        }
    }
}

#[get("/requests")]
pub fn requests_list(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
) -> Json<Vec<CommissionRequest>> {
    Json(CommissionRequest::list(&**store.inner()))
}

#[patch("/requests/<id>", format = "json", data = "<body>")]
pub fn requests_update_json(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    id: i64,
    body: Json<CommissionForm>,
) -> ApiResult {
    update(&**store.inner(), id, &body)
}

#[patch("/requests/<id>", data = "<form>", rank = 2)]
pub fn requests_update(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    id: i64,
    form: Form<CommissionForm>,
) -> ApiResult {
    update(&**store.inner(), id, &form)
}

#[delete("/requests/<id>")]
pub async fn requests_delete(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    media: &State<Arc<MediaLibrary>>,
    id: i64,
) -> ApiResult {
    let removed = CommissionRequest::delete(&**store.inner(), id)
        .map_err(|e| storage_failed("delete commission request", e))?;
    if let Some(request) = removed {
        media.delete_all(&request.owned_media()).await;
        log::info!("Deleted commission request {}", id);
    }
    Ok(deleted())
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        requests_create,
        requests_list,
        requests_update_json,
        requests_update,
        requests_delete,
    ]
}
