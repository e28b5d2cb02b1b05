use rocket::http::Status;
use rocket::serde::json::Json;
use serde_json::{json, Value};

pub mod about;
pub mod gallery;
pub mod links;
pub mod posts;
pub mod requests;
pub mod settings;

/// JSON body on success, or a status with an `{"error": ...}` body.
pub type ApiResult = Result<Json<Value>, (Status, Json<Value>)>;

pub(crate) fn api_error(status: Status, message: impl Into<String>) -> (Status, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}

pub(crate) fn not_found(what: &str, id: i64) -> (Status, Json<Value>) {
    api_error(Status::NotFound, format!("{} {} not found", what, id))
}

/// Log a persistence failure and turn it into a 500.
pub(crate) fn storage_failed(action: &str, err: String) -> (Status, Json<Value>) {
    log::error!("Failed to {}: {}", action, err);
    api_error(Status::InternalServerError, format!("Failed to {}", action))
}

pub(crate) fn deleted() -> Json<Value> {
    Json(json!({ "success": true }))
}

/// Empty text fields from HTML forms count as "not supplied".
pub(crate) fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

pub fn routes() -> Vec<rocket::Route> {
    let mut all = Vec::new();
    all.extend(posts::routes());
    all.extend(gallery::routes());
    all.extend(links::routes());
    all.extend(requests::routes());
    all.extend(settings::routes());
    all.extend(about::routes());
    all
}
