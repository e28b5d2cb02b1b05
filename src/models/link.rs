use serde::{Deserialize, Serialize};

use super::set_if_some;
use crate::store::{self, Record, Store};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Link {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, FromForm, Clone)]
pub struct LinkForm {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
}

impl Record for Link {
    const COLLECTION: &'static str = "links";

    fn id(&self) -> i64 {
        self.id
    }
}

/// Prefix `https://` onto bare hostnames so stored links are absolute.
/// Anything else is kept as typed.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || url::Url::parse(trimmed).is_ok() {
        return trimmed.to_string();
    }
    let candidate = format!("https://{}", trimmed);
    match url::Url::parse(&candidate) {
        Ok(u) if u.host_str().map_or(false, |h| h.contains('.')) => candidate,
        _ => trimmed.to_string(),
    }
}

impl Link {
    /// Links in the order they were added.
    pub fn list(store: &dyn Store) -> Vec<Self> {
        store::load(store)
    }

    pub fn count(store: &dyn Store) -> usize {
        store::load::<Link>(store).len()
    }

    pub fn find_by_id(store: &dyn Store, id: i64) -> Option<Self> {
        store::load::<Link>(store).into_iter().find(|l| l.id == id)
    }

    pub fn create(store: &dyn Store, form: &LinkForm) -> Result<Self, String> {
        store::modify(store, |links: &mut Vec<Link>| {
            let link = Link {
                id: store::next_id(links),
                title: form.title.clone(),
                url: form.url.as_deref().map(normalize_url),
                description: form.description.clone(),
            };
            links.push(link.clone());
            Ok(link)
        })
    }

    pub fn update(store: &dyn Store, id: i64, form: &LinkForm) -> Result<Option<Self>, String> {
        store::modify(store, |links: &mut Vec<Link>| {
            let link = match links.iter_mut().find(|l| l.id == id) {
                Some(l) => l,
                None => return Ok(None),
            };
            set_if_some(&mut link.title, &form.title);
            set_if_some(&mut link.url, &form.url.as_deref().map(normalize_url));
            set_if_some(&mut link.description, &form.description);
            Ok(Some(link.clone()))
        })
    }

    pub fn delete(store: &dyn Store, id: i64) -> Result<Option<Self>, String> {
        store::modify(store, |links: &mut Vec<Link>| {
            let removed = links
                .iter()
                .position(|l| l.id == id)
                .map(|idx| links.remove(idx));
            Ok(removed)
        })
    }
}
