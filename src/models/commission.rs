use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::set_if_some;
use crate::media::StoredMedia;
use crate::store::{self, Record, Store};

/// Most reference images a visitor can attach to one request.
pub const MAX_REQUEST_IMAGES: usize = 5;

/// Status given to freshly submitted requests.
pub const INITIAL_STATUS: &str = "incomplete";

/// Statuses offered in the admin. Any other string is still accepted.
pub const REQUEST_STATUSES: &[&str] = &[INITIAL_STATUS, "in progress", "complete", "declined"];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CommissionRequest {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub status: String,
}

#[derive(Debug, Default, Deserialize, FromForm, Clone)]
pub struct CommissionForm {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "type")]
    #[field(name = "type")]
    pub kind: Option<String>,
    pub size: Option<String>,
    pub budget: Option<String>,
    pub description: Option<String>,
    pub timeline: Option<String>,
    pub status: Option<String>,
}

impl Record for CommissionRequest {
    const COLLECTION: &'static str = "requests";

    fn id(&self) -> i64 {
        self.id
    }
}

impl CommissionRequest {
    /// Every request, most recently submitted first.
    pub fn list(store: &dyn Store) -> Vec<Self> {
        let mut requests: Vec<CommissionRequest> = store::load(store);
        requests.sort_by(|a, b| {
            b.submitted_at
                .cmp(&a.submitted_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        requests
    }

    pub fn count(store: &dyn Store) -> usize {
        store::load::<CommissionRequest>(store).len()
    }

    pub fn count_by_status(store: &dyn Store, status: &str) -> usize {
        store::load::<CommissionRequest>(store)
            .iter()
            .filter(|r| r.status == status)
            .count()
    }

    pub fn find_by_id(store: &dyn Store, id: i64) -> Option<Self> {
        store::load::<CommissionRequest>(store)
            .into_iter()
            .find(|r| r.id == id)
    }

    /// Record a visitor's submission. The form's `status` is ignored; new
    /// requests always start as `incomplete`. At most five images are kept.
    pub fn create(
        store: &dyn Store,
        form: &CommissionForm,
        images: Vec<StoredMedia>,
    ) -> Result<Self, String> {
        store::modify(store, |requests: &mut Vec<CommissionRequest>| {
            let request = CommissionRequest {
                id: store::next_id(requests),
                name: form.name.clone(),
                email: form.email.clone(),
                kind: form.kind.clone(),
                size: form.size.clone(),
                budget: form.budget.clone(),
                description: form.description.clone(),
                timeline: form.timeline.clone(),
                images: images
                    .into_iter()
                    .take(MAX_REQUEST_IMAGES)
                    .map(|m| m.reference)
                    .collect(),
                submitted_at: Utc::now(),
                updated_at: None,
                status: INITIAL_STATUS.to_string(),
            };
            requests.push(request.clone());
            Ok(request)
        })
    }

    /// Admin edit: status and any other supplied field.
    pub fn update(
        store: &dyn Store,
        id: i64,
        form: &CommissionForm,
    ) -> Result<Option<Self>, String> {
        store::modify(store, |requests: &mut Vec<CommissionRequest>| {
            let request = match requests.iter_mut().find(|r| r.id == id) {
                Some(r) => r,
                None => return Ok(None),
            };
            set_if_some(&mut request.name, &form.name);
            set_if_some(&mut request.email, &form.email);
            set_if_some(&mut request.kind, &form.kind);
            set_if_some(&mut request.size, &form.size);
            set_if_some(&mut request.budget, &form.budget);
            set_if_some(&mut request.description, &form.description);
            set_if_some(&mut request.timeline, &form.timeline);
            if let Some(status) = &form.status {
                request.status = status.clone();
            }
            request.updated_at = Some(Utc::now());
            Ok(Some(request.clone()))
        })
    }

    pub fn delete(store: &dyn Store, id: i64) -> Result<Option<Self>, String> {
        store::modify(store, |requests: &mut Vec<CommissionRequest>| {
            let removed = requests
                .iter()
                .position(|r| r.id == id)
                .map(|idx| requests.remove(idx));
            Ok(removed)
        })
    }

    pub fn owned_media(&self) -> Vec<StoredMedia> {
        self.images
            .iter()
            .map(|r| StoredMedia::from_reference(r))
            .collect()
    }
}
