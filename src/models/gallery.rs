use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::set_if_some;
use crate::media::{StorageBackend, StoredMedia};
use crate::store::{self, Record, Store};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GalleryImage {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Local filename, or the hosted URL for remote storage.
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
    #[serde(default)]
    pub storage: StorageBackend,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub in_carousel: bool,
}

#[derive(Debug, Default, Deserialize, FromForm, Clone)]
pub struct GalleryForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub in_carousel: Option<bool>,
}

impl Record for GalleryImage {
    const COLLECTION: &'static str = "gallery";

    fn id(&self) -> i64 {
        self.id
    }
}

impl GalleryImage {
    /// Every image, most recently uploaded first.
    pub fn list(store: &dyn Store) -> Vec<Self> {
        let mut images: Vec<GalleryImage> = store::load(store);
        images.sort_by(|a, b| {
            b.uploaded_at
                .cmp(&a.uploaded_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        images
    }

    /// Images flagged for the home-page carousel.
    pub fn carousel(store: &dyn Store) -> Vec<Self> {
        Self::list(store)
            .into_iter()
            .filter(|i| i.in_carousel)
            .collect()
    }

    pub fn count(store: &dyn Store) -> usize {
        store::load::<GalleryImage>(store).len()
    }

    pub fn find_by_id(store: &dyn Store, id: i64) -> Option<Self> {
        store::load::<GalleryImage>(store)
            .into_iter()
            .find(|i| i.id == id)
    }

    pub fn media(&self) -> StoredMedia {
        StoredMedia {
            reference: self.filename.clone(),
            public_id: self.public_id.clone(),
            backend: self.storage,
        }
    }

    fn set_media(&mut self, media: StoredMedia) {
        self.filename = media.reference;
        self.public_id = media.public_id;
        self.storage = media.backend;
    }

    pub fn create(
        store: &dyn Store,
        form: &GalleryForm,
        media: StoredMedia,
    ) -> Result<Self, String> {
        store::modify(store, |images: &mut Vec<GalleryImage>| {
            let image = GalleryImage {
                id: store::next_id(images),
                title: form.title.clone(),
                description: form.description.clone(),
                filename: media.reference,
                public_id: media.public_id,
                storage: media.backend,
                uploaded_at: Utc::now(),
                updated_at: None,
                in_carousel: form.in_carousel.unwrap_or(false),
            };
            images.push(image.clone());
            Ok(image)
        })
    }

    /// Update supplied fields; a new file replaces the current one.
    /// Returns `None` for an unknown id, otherwise the updated image and the
    /// replaced file (to be deleted by the caller).
    pub fn update(
        store: &dyn Store,
        id: i64,
        form: &GalleryForm,
        replacement: Option<StoredMedia>,
    ) -> Result<Option<(Self, Option<StoredMedia>)>, String> {
        store::modify(store, |images: &mut Vec<GalleryImage>| {
            let image = match images.iter_mut().find(|i| i.id == id) {
                Some(i) => i,
                None => return Ok(None),
            };
            set_if_some(&mut image.title, &form.title);
            set_if_some(&mut image.description, &form.description);
            if let Some(flag) = form.in_carousel {
                image.in_carousel = flag;
            }
            let replaced = replacement.map(|media| {
                let old = image.media();
                image.set_media(media);
                old
            });
            image.updated_at = Some(Utc::now());
            Ok(Some((image.clone(), replaced)))
        })
    }

    pub fn delete(store: &dyn Store, id: i64) -> Result<Option<Self>, String> {
        store::modify(store, |images: &mut Vec<GalleryImage>| {
            let removed = images
                .iter()
                .position(|i| i.id == id)
                .map(|idx| images.remove(idx));
            Ok(removed)
        })
    }
}
