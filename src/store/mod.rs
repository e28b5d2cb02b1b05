use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::models::about::AboutPage;
use crate::models::commission::CommissionRequest;
use crate::models::gallery::GalleryImage;
use crate::models::link::Link;
use crate::models::post::Post;
use crate::models::settings::SiteSettings;

pub mod json;
pub mod memory;

/// Unified data-access trait. Every collection file goes through here.
/// Implementations: `JsonFileStore` (one JSON file per collection) and
/// `MemoryStore` (in-process map, used by tests).
pub trait Store: Send + Sync {
    /// Short name for logs and the admin dashboard.
    fn backend_name(&self) -> &'static str;

    /// Whether the named collection has ever been written.
    fn exists(&self, name: &str) -> bool;

    /// Read a collection. `None` when it is missing or cannot be parsed.
    fn read(&self, name: &str) -> Option<Value>;

    /// Overwrite a collection wholesale.
    fn write(&self, name: &str, value: &Value) -> Result<(), String>;

    /// Read-modify-write under the store's write lock. `f` receives the
    /// current value (`None` if missing/corrupt) and returns the value to write.
    fn update(
        &self,
        name: &str,
        f: &mut dyn FnMut(Option<Value>) -> Result<Value, String>,
    ) -> Result<(), String>;
}

/// A row in a collection file.
pub trait Record: Serialize + DeserializeOwned + Clone {
    const COLLECTION: &'static str;

    fn id(&self) -> i64;
}

/// A singleton record stored as one JSON object.
pub trait Document: Serialize + DeserializeOwned + Default {
    const NAME: &'static str;
}

fn decode_all<T: Record>(value: Option<Value>) -> Vec<T> {
    match value {
        Some(v) => serde_json::from_value(v).unwrap_or_else(|e| {
            log::warn!(
                "Collection '{}' has unreadable records, treating as empty: {}",
                T::COLLECTION,
                e
            );
            Vec::new()
        }),
        None => Vec::new(),
    }
}

/// Load every record of a collection. Missing or corrupt data yields an empty list.
pub fn load<T: Record>(store: &dyn Store) -> Vec<T> {
    decode_all(store.read(T::COLLECTION))
}

/// Overwrite a collection with `records`.
pub fn save<T: Record>(store: &dyn Store, records: &[T]) -> Result<(), String> {
    let value = serde_json::to_value(records).map_err(|e| e.to_string())?;
    store.write(T::COLLECTION, &value)
}

/// Load, mutate and persist a collection as one step under the store's write lock.
/// Nothing is written when `f` fails.
pub fn modify<T, R, F>(store: &dyn Store, f: F) -> Result<R, String>
where
    T: Record,
    F: FnOnce(&mut Vec<T>) -> Result<R, String>,
{
    let mut f = Some(f);
    let mut out = None;
    store.update(T::COLLECTION, &mut |current| {
        let f = f.take().ok_or_else(|| "collection update re-entered".to_string())?;
        let mut records = decode_all::<T>(current);
        out = Some(f(&mut records)?);
        serde_json::to_value(&records).map_err(|e| e.to_string())
    })?;
    out.ok_or_else(|| format!("update of '{}' produced no result", T::COLLECTION))
}

/// Next id for a collection: one past the largest id, or 1 when empty.
pub fn next_id<T: Record>(records: &[T]) -> i64 {
    records.iter().map(Record::id).max().map_or(1, |max| max + 1)
}

fn decode_document<D: Document>(value: Option<Value>) -> D {
    value
        .and_then(|v| match serde_json::from_value(v) {
            Ok(doc) => Some(doc),
            Err(e) => {
                log::warn!("Document '{}' is unreadable, using defaults: {}", D::NAME, e);
                None
            }
        })
        .unwrap_or_default()
}

/// Load a singleton document, falling back to its default.
pub fn load_document<D: Document>(store: &dyn Store) -> D {
    decode_document(store.read(D::NAME))
}

/// Load, mutate and persist a document under the store's write lock.
/// Returns the document as written.
pub fn modify_document<D, F>(store: &dyn Store, f: F) -> Result<D, String>
where
    D: Document + Clone,
    F: FnOnce(&mut D),
{
    let mut f = Some(f);
    let mut out = None;
    store.update(D::NAME, &mut |current| {
        let f = f.take().ok_or_else(|| "document update re-entered".to_string())?;
        let mut doc = decode_document::<D>(current);
        f(&mut doc);
        let value = serde_json::to_value(&doc).map_err(|e| e.to_string())?;
        out = Some(doc);
        Ok(value)
    })?;
    out.ok_or_else(|| format!("update of '{}' produced no result", D::NAME))
}

pub fn save_document<D: Document>(store: &dyn Store, doc: &D) -> Result<(), String> {
    let value = serde_json::to_value(doc).map_err(|e| e.to_string())?;
    store.write(D::NAME, &value)
}

/// First-boot seeding: sample posts plus empty collections and default documents.
/// Existing collections are never touched.
pub fn seed_defaults(store: &dyn Store) -> Result<(), String> {
    if !store.exists(Post::COLLECTION) {
        save(store, &Post::samples())?;
        log::info!("Seeded {} sample posts", Post::samples().len());
    }
    seed_empty::<GalleryImage>(store)?;
    seed_empty::<Link>(store)?;
    seed_empty::<CommissionRequest>(store)?;
    seed_document::<SiteSettings>(store)?;
    seed_document::<AboutPage>(store)?;
    Ok(())
}

fn seed_empty<T: Record>(store: &dyn Store) -> Result<(), String> {
    if !store.exists(T::COLLECTION) {
        save::<T>(store, &[])?;
        log::info!("Created empty collection '{}'", T::COLLECTION);
    }
    Ok(())
}

fn seed_document<D: Document>(store: &dyn Store) -> Result<(), String> {
    if !store.exists(D::NAME) {
        save_document(store, &D::default())?;
        log::info!("Wrote default document '{}'", D::NAME);
    }
    Ok(())
}
