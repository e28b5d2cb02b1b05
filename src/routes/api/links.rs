use rocket::form::Form;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::json;
use std::sync::Arc;

use super::{deleted, not_found, storage_failed, ApiResult};
use crate::models::link::{Link, LinkForm};
use crate::security::auth::AdminSession;
use crate::store::Store;

fn create(store: &dyn Store, form: &LinkForm) -> ApiResult {
    let link = Link::create(store, form).map_err(|e| storage_failed("create link", e))?;
    log::info!("Created link {}", link.id);
    Ok(Json(json!({ "id": link.id })))
}

fn update(store: &dyn Store, id: i64, form: &LinkForm) -> ApiResult {
    match Link::update(store, id, form) {
        Ok(Some(link)) => {
            log::info!("Updated link {}", id);
            Ok(Json(json!(link)))
        }
        Ok(None) => Err(not_found("link", id)),
        Err(e) => Err(storage_failed("update link", e)),
    }
}

#[get("/links")]
pub fn links_list(store: &State<Arc<dyn Store>>) -> Json<Vec<Link>> {
    Json(Link::list(&**store.inner()))
}

#[post("/links", format = "json", data = "<body>")]
pub fn links_create_json(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    body: Json<LinkForm>,
) -> ApiResult {
    create(&**store.inner(), &body)
}

#[post("/links", data = "<form>", rank = 2)]
pub fn links_create(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    form: Form<LinkForm>,
) -> ApiResult {
    create(&**store.inner(), &form)
}

#[patch("/links/<id>", format = "json", data = "<body>")]
pub fn links_update_json(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    id: i64,
    body: Json<LinkForm>,
) -> ApiResult {
    update(&**store.inner(), id, &body)
}

#[patch("/links/<id>", data = "<form>", rank = 2)]
pub fn links_update(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    id: i64,
    form: Form<LinkForm>,
) -> ApiResult {
    update(&**store.inner(), id, &form)
}

#[delete("/links/<id>")]
pub fn links_delete(_admin: AdminSession, store: &State<Arc<dyn Store>>, id: i64) -> ApiResult {
    let removed =
        Link::delete(&**store.inner(), id).map_err(|e| storage_failed("delete link", e))?;
    if removed.is_some() {
        log::info!("Deleted link {}", id);
    }
    Ok(deleted())
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        links_list,
        links_create_json,
        links_create,
        links_update_json,
        links_update,
        links_delete,
    ]
}
