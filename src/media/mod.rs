use rocket::fs::TempFile;
use serde::{Deserialize, Serialize};

pub mod cloudinary;
pub mod local;

use cloudinary::CloudinaryStorage;
use local::LocalStorage;

/// Where an uploaded file lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Local,
    Cloudinary,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Local => "local",
            StorageBackend::Cloudinary => "cloudinary",
        }
    }
}

/// A stored file as records reference it.
/// `reference` is a local filename or a hosted URL; `public_id` is the remote host's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredMedia {
    pub reference: String,
    pub public_id: Option<String>,
    pub backend: StorageBackend,
}

impl StoredMedia {
    pub fn local(filename: impl Into<String>) -> Self {
        StoredMedia {
            reference: filename.into(),
            public_id: None,
            backend: StorageBackend::Local,
        }
    }

    /// Recover the backend (and remote id) from a bare reference string.
    /// URLs were stored remotely; anything else is a local filename.
    pub fn from_reference(reference: &str) -> Self {
        if reference.starts_with("https://") || reference.starts_with("http://") {
            StoredMedia {
                reference: reference.to_string(),
                public_id: cloudinary::public_id_from_url(reference),
                backend: StorageBackend::Cloudinary,
            }
        } else {
            StoredMedia::local(reference)
        }
    }
}

/// A place uploaded files can be written to and removed from.
#[rocket::async_trait]
pub trait MediaStorage: Send + Sync {
    fn backend(&self) -> StorageBackend;

    async fn store(&self, file: &mut TempFile<'_>) -> Result<StoredMedia, String>;

    async fn delete(&self, media: &StoredMedia) -> Result<(), String>;

    /// Public URL for a stored file.
    fn url(&self, media: &StoredMedia) -> String;
}

/// Picks the configured backend for new uploads and routes deletes to
/// whichever backend created the file.
pub struct MediaLibrary {
    local: LocalStorage,
    remote: Option<Box<dyn MediaStorage>>,
}

impl MediaLibrary {
    pub fn new(local: LocalStorage, remote: Option<Box<dyn MediaStorage>>) -> Self {
        MediaLibrary { local, remote }
    }

    pub fn with_cloudinary(local: LocalStorage, remote: Option<CloudinaryStorage>) -> Self {
        Self::new(
            local,
            remote.map(|r| Box::new(r) as Box<dyn MediaStorage>),
        )
    }

    /// Backend that receives new uploads.
    pub fn active_backend(&self) -> StorageBackend {
        self.active().backend()
    }

    fn active(&self) -> &dyn MediaStorage {
        if let Some(remote) = &self.remote {
            return remote.as_ref();
        }
        &self.local
    }

    fn backend_for(&self, backend: StorageBackend) -> Option<&dyn MediaStorage> {
        if backend == StorageBackend::Local {
            return Some(&self.local as &dyn MediaStorage);
        }
        self.remote
            .as_deref()
            .filter(|remote| remote.backend() == backend)
    }

    /// Store one upload. Empty file fields yield `Ok(None)`.
    pub async fn store(&self, file: &mut TempFile<'_>) -> Result<Option<StoredMedia>, String> {
        if file.len() == 0 {
            return Ok(None);
        }
        let stored = self.active().store(file).await?;
        log::info!(
            "Stored upload {} via {}",
            stored.reference,
            stored.backend.as_str()
        );
        Ok(Some(stored))
    }

    /// Store up to `limit` uploads, skipping empty fields. On failure the files
    /// already stored by this call are removed again.
    pub async fn store_many(
        &self,
        files: &mut [TempFile<'_>],
        limit: usize,
    ) -> Result<Vec<StoredMedia>, String> {
        let mut stored = Vec::new();
        for file in files.iter_mut() {
            if stored.len() >= limit {
                log::warn!("Upload limit of {} files reached, ignoring the rest", limit);
                break;
            }
            match self.store(file).await {
                Ok(Some(media)) => stored.push(media),
                Ok(None) => {}
                Err(e) => {
                    self.delete_all(&stored).await;
                    return Err(e);
                }
            }
        }
        Ok(stored)
    }

    pub async fn delete(&self, media: &StoredMedia) -> Result<(), String> {
        let storage = self.backend_for(media.backend).ok_or_else(|| {
            format!(
                "cannot delete {}: {} storage is not configured",
                media.reference,
                media.backend.as_str()
            )
        })?;
        storage.delete(media).await
    }

    /// Delete every file, logging (not returning) failures. Used after the
    /// owning record is already gone, where a failure only leaves an orphan.
    pub async fn delete_all(&self, media: &[StoredMedia]) {
        for m in media {
            if let Err(e) = self.delete(m).await {
                log::warn!("Failed to delete {}: {}", m.reference, e);
            }
        }
    }

    pub fn url(&self, media: &StoredMedia) -> String {
        match self.backend_for(media.backend) {
            Some(storage) => storage.url(media),
            None => media.reference.clone(),
        }
    }
}

/// File extension for an upload: content type first, then the client's file
/// name, then `bin`.
pub(crate) fn upload_extension(file: &TempFile<'_>) -> String {
    file.content_type()
        .and_then(|ct| ct.extension())
        .map(|e| e.to_string().to_lowercase())
        .or_else(|| {
            file.raw_name().and_then(|rn| {
                let s = rn.dangerous_unsafe_unsanitized_raw().as_str();
                s.rsplit_once('.')
                    .map(|(_, ext)| ext.to_lowercase())
                    .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            })
        })
        .unwrap_or_else(|| "bin".to_string())
}
