use rocket::form::Form;
use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;

use super::{storage_failed, ApiResult};
use crate::models::settings::{SettingsForm, SiteSettings};
use crate::security::auth::AdminSession;
use crate::store::Store;

fn save(store: &dyn Store, form: &SettingsForm) -> ApiResult {
    let settings =
        SiteSettings::update(store, form).map_err(|e| storage_failed("save settings", e))?;
    log::info!(
        "Saved settings (carousel {}s, {}vh)",
        settings.carousel_timer,
        settings.carousel_height
    );
    Ok(Json(serde_json::json!(settings)))
}

#[get("/settings")]
pub fn settings_get(store: &State<Arc<dyn Store>>) -> Json<SiteSettings> {
    Json(SiteSettings::load(&**store.inner()))
}

#[post("/settings", format = "json", data = "<body>")]
pub fn settings_save_json(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    body: Json<SettingsForm>,
) -> ApiResult {
    save(&**store.inner(), &body)
}

#[post("/settings", data = "<form>", rank = 2)]
pub fn settings_save(
    _admin: AdminSession,
    store: &State<Arc<dyn Store>>,
    form: Form<SettingsForm>,
) -> ApiResult {
    save(&**store.inner(), &form)
}

pub fn routes() -> Vec<rocket::Route> {
    routes![settings_get, settings_save_json, settings_save]
}
