use rocket::form::Form;
use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;

use super::{storage_failed, ApiResult};
use crate::models::about::{AboutForm, AboutPage};
use crate::security::auth::AdminSession;
use crate::store::Store;

fn save(store: &dyn Store, form: &AboutForm) -> ApiResult {
    let page = AboutPage::update(store, form).map_err(|e| storage_failed("save about page", e))?;
    log::info!("Saved about page");
    Ok(Json(serde_json::json!(page)))
}

#[get("/about")]
pub fn about_get(store: &State<Arc<dyn Store>>) -> Json<AboutPage> {
    Json(AboutPage::load(&**store.inner()))
}

#[post("/about", format = "json", data = "<body>")]
pub fn about_save_json(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    body: Json<AboutForm>,
) -> ApiResult {
    save(&**store.inner(), &body)
}

#[post("/about", data = "<form>", rank = 2)]
pub fn about_save(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    form: Form<AboutForm>,
) -> ApiResult {
    save(&**store.inner(), &form)
}

pub fn routes() -> Vec<rocket::Route> {
    routes![about_get, about_save_json, about_save]
}
